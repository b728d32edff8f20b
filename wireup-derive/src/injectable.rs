use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DataStruct, DeriveInput, Error, Field, Fields, Index, Member, Result, Type};

const INJECT: &str = "inject";

struct InjectedField<'a> {
    member: Member,
    name: String,
    ty: &'a Type,
}

fn extract_injected_field(index: usize, field: &Field) -> Result<Option<InjectedField<'_>>> {
    let Some(attr) = field
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident(INJECT))
    else {
        return Ok(None);
    };

    attr.meta.require_path_only()?;

    let (member, name) = match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
        None => (
            Member::Unnamed(Index {
                index: index as u32,
                span: field.span(),
            }),
            index.to_string(),
        ),
    };

    Ok(Some(InjectedField {
        member,
        name,
        ty: &field.ty,
    }))
}

fn extract_injected_fields(fields: &Fields) -> Result<Vec<InjectedField<'_>>> {
    let fields: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(index, field)| extract_injected_field(index, field))
        .try_collect()?;

    Ok(fields.into_iter().flatten().collect())
}

fn slot_target(ty: &Type) -> TokenStream {
    quote! {
        <#ty as ::wireup::injectable::InjectionSlot>::Target
    }
}

fn generate_injection(field: &InjectedField) -> TokenStream {
    let InjectedField { member, name, ty } = field;
    let target = slot_target(ty);
    quote! {
        ::wireup::injectable::InjectionSlot::inject(
            &mut self.#member,
            resolver.resolve_dependency::<#target>(::std::any::type_name::<Self>(), #name)?,
        );
    }
}

fn generate_descriptor(field: &InjectedField) -> TokenStream {
    let InjectedField { name, ty, .. } = field;
    let target = slot_target(ty);
    quote! {
        ::wireup::metadata::DependencyField {
            owner: ::std::any::type_name::<Self>(),
            name: #name,
            type_id: ::std::any::TypeId::of::<#target>(),
            type_name: ::std::any::type_name::<#target>(),
        }
    }
}

pub fn expand_injectable(input: &DeriveInput) -> Result<TokenStream> {
    if let Data::Struct(DataStruct { fields, .. }) = &input.data {
        let ident = &input.ident;
        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
        let fields = extract_injected_fields(fields)?;
        let injections = fields.iter().map(generate_injection);
        let descriptors = fields.iter().map(generate_descriptor);

        // generic types have no single TypeId to describe
        let registration = if input.generics.params.is_empty() {
            quote! {
                const _: () = {
                    fn register() -> ::wireup::metadata::TypeMetadata {
                        ::wireup::metadata::TypeMetadata {
                            type_id: ::std::any::TypeId::of::<#ident>(),
                            type_name: ::std::any::type_name::<#ident>(),
                            dependency_fields: <#ident as ::wireup::injectable::Injectable>::dependency_fields(),
                        }
                    }

                    ::wireup::metadata::internal::submit! {
                        ::wireup::metadata::internal::TypeMetadataRegisterer {
                            register
                        }
                    };
                };
            }
        } else {
            quote!()
        };

        Ok(quote! {
            #[automatically_derived]
            impl #impl_generics ::wireup::injectable::Injectable for #ident #ty_generics #where_clause {
                #[allow(unused_variables)]
                fn build_up(
                    &mut self,
                    resolver: &mut ::wireup::Resolver<'_>,
                ) -> ::std::result::Result<(), ::wireup::ResolutionError> {
                    #(#injections)*
                    Ok(())
                }

                fn dependency_fields() -> ::std::vec::Vec<::wireup::metadata::DependencyField> {
                    ::std::vec![#(#descriptors),*]
                }
            }

            #registration
        })
    } else {
        Err(Error::new(
            input.span(),
            "Can only derive Injectable on structs!",
        ))
    }
}
