use crate::attributes::ProviderAttributes;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Error, Item, Result};

pub fn expand_provider(item: &Item, attributes: &ProviderAttributes) -> Result<TokenStream> {
    if let Item::Impl(item_impl) = item {
        let trait_path = item_impl
            .trait_
            .as_ref()
            .map(|(_, path, ..)| path)
            .ok_or_else(|| Error::new(item.span(), "Missing trait identifier!"))?;

        if !item_impl.generics.params.is_empty() {
            return Err(Error::new(
                item_impl.generics.span(),
                "Generic implementations cannot be providers!",
            ));
        }

        let target_type = &item_impl.self_ty;

        let registration = if attributes.is_manual {
            quote!()
        } else {
            let is_primary = attributes.is_primary;
            let priority = attributes
                .priority
                .as_ref()
                .map(|priority| quote!(#priority))
                .unwrap_or_else(|| quote!(0));

            quote! {
                const _: () = {
                    fn register() -> ::wireup::metadata::ProviderMarker {
                        use ::std::any::{type_name, TypeId};
                        ::wireup::metadata::ProviderMarker {
                            declaring_type: TypeId::of::<#target_type>(),
                            declaring_type_name: type_name::<#target_type>(),
                            resolves_to: TypeId::of::<dyn #trait_path>(),
                            resolves_to_name: type_name::<dyn #trait_path>(),
                            is_primary: #is_primary,
                            priority: #priority,
                            constructor: ::wireup::metadata::internal::construct_provider::<#target_type, dyn #trait_path>,
                        }
                    }

                    ::wireup::metadata::internal::submit! {
                        ::wireup::metadata::internal::ProviderRegisterer {
                            register
                        }
                    };
                };
            }
        };

        Ok(quote! {
            #item

            #[automatically_derived]
            impl ::wireup::instance::CastFrom<#target_type> for dyn #trait_path {
                #[inline]
                fn cast_from(
                    instance: ::wireup::instance::InstancePtr<#target_type>,
                ) -> ::wireup::instance::InstancePtr<Self> {
                    instance
                }
            }

            #registration
        })
    } else {
        Err(Error::new(
            item.span(),
            "Providers can only be declared on trait implementations!",
        ))
    }
}
