mod decode_entity;
mod decode_field;

use decode_entity::decode_entity;
use decode_field::{FieldMetadata, decode_field};
use orma_core::Marker;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Implements `orma::Entity` for a struct with named fields.
///
/// ```ignore
/// #[derive(Default, Entity)]
/// #[orma(entity = "Animal")]
/// struct Animal {
///     #[orma(id)]
///     id: Option<i64>,
///     #[orma(column = "Fullname")]
///     name: String,
///     #[orma(column)]
///     age: i32,
///     #[orma(ignore)]
///     scratch: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(orma))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let Fields::Named(..) = &item.fields else {
        panic!("Entity `{}` must have named fields", name);
    };
    let entity_name = match decode_entity(&item) {
        Some(v) => quote!(Some(#v)),
        None => quote!(None),
    };
    let fields: Vec<FieldMetadata> = item.fields.iter().map(decode_field).collect();
    let field_defs = fields.iter().map(|f| {
        let field_name = f.ident.to_string();
        let column_name = &f.column_name;
        let type_name = &f.type_name;
        let value = &f.value;
        let marker = match f.marker {
            Marker::None => quote!(::orma::Marker::None),
            Marker::Column => quote!(::orma::Marker::Column),
            Marker::Identity => quote!(::orma::Marker::Identity),
        };
        quote! {
            ::orma::FieldDef {
                name: #field_name,
                column_name: #column_name,
                type_name: #type_name,
                value: #value,
                marker: #marker,
            }
        }
    });
    let field_values = fields.iter().map(|f| {
        let ident = &f.ident;
        if f.marker == Marker::None {
            quote!(::orma::Value::Null)
        } else {
            quote!(::orma::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let set_fields = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.marker != Marker::None)
        .map(|(i, f)| {
            let ident = &f.ident;
            let ty = &f.ty;
            quote! {
                #i => {
                    self.#ident = <#ty as ::orma::AsValue>::try_from_value(value)?;
                }
            }
        });
    quote! {
        impl #impl_generics ::orma::Entity for #name #ty_generics #where_clause {
            fn entity_name() -> Option<&'static str> {
                #entity_name
            }

            fn fields() -> &'static [::orma::FieldDef] {
                static RESULT: ::std::sync::LazyLock<Box<[::orma::FieldDef]>> =
                    ::std::sync::LazyLock::new(|| vec![#(#field_defs),*].into_boxed_slice());
                &RESULT
            }

            fn field_values(&self) -> Vec<::orma::Value> {
                vec![#(#field_values),*]
            }

            #[allow(unused_variables, unreachable_code)]
            fn set_field(&mut self, index: usize, value: ::orma::Value) -> ::orma::anyhow::Result<()> {
                match index {
                    #(#set_fields)*
                    _ => ::orma::anyhow::bail!(
                        "Entity `{}` has no mapped field at index {}",
                        stringify!(#name),
                        index
                    ),
                }
                Ok(())
            }
        }
    }
    .into()
}
