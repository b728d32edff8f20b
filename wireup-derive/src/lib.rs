use crate::attributes::ProviderAttributes;
use crate::injectable::expand_injectable;
use crate::provider::expand_provider;
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, Item};

mod attributes;
mod injectable;
mod provider;

#[proc_macro_derive(Injectable, attributes(inject))]
pub fn generate_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_injectable(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

#[proc_macro_attribute]
pub fn provider(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut attributes = ProviderAttributes::default();
    let parser = syn::meta::parser(|meta| attributes.parse(meta));
    parse_macro_input!(attr with parser);

    let item = parse_macro_input!(item as Item);
    expand_provider(&item, &attributes)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
