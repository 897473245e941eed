use quote::ToTokens;
use syn::{ItemStruct, LitStr, parse::ParseBuffer};

/// Entity name declared on the struct, `None` when it carries no marker.
///
/// `#[orma(entity = "Animal")]` names the table, a bare `#[orma(entity)]`
/// uses the struct name.
pub(crate) fn decode_entity(item: &ItemStruct) -> Option<String> {
    let mut result = None;
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("orma") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `orma`, use it like: `#[orma(entity = \"Name\")]`");
        };
        let parsed = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("entity") {
                result = Some(if arg.input.peek(syn::Token![=]) {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `entity`, use it like: `#[orma(entity = \"Name\")]`"
                        );
                    };
                    v.value()
                } else {
                    item.ident.to_string()
                });
            } else {
                panic!(
                    "Unknown attribute `{}` inside orma macro on a struct",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
        if let Err(e) = parsed {
            panic!(
                "Error while parsing `orma` on `{}`: {e}, use it like: `#[orma(entity = \"Name\")]`",
                item.ident
            );
        }
    }
    if let Some(name) = &result {
        if name.is_empty() {
            panic!("The entity name of `{}` cannot be empty", item.ident);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::decode_entity;
    use syn::{ItemStruct, parse_quote};

    #[test]
    fn decode_names() {
        let item: ItemStruct = parse_quote! {
            #[derive(Default)]
            #[orma(entity = "Animal")]
            struct Pet {}
        };
        assert_eq!(decode_entity(&item).as_deref(), Some("Animal"));
        let item: ItemStruct = parse_quote! {
            #[orma(entity)]
            struct Pet {}
        };
        assert_eq!(decode_entity(&item).as_deref(), Some("Pet"));
        let item: ItemStruct = parse_quote! {
            struct Pet {}
        };
        assert_eq!(decode_entity(&item), None);
    }

    #[test]
    #[should_panic(expected = "Error while parsing `orma` on `Pet`")]
    fn missing_equals() {
        let item: ItemStruct = parse_quote! {
            #[orma(entity "Animal")]
            struct Pet {}
        };
        decode_entity(&item);
    }

    #[test]
    #[should_panic(expected = "cannot be empty")]
    fn empty_name() {
        let item: ItemStruct = parse_quote! {
            #[orma(entity = "")]
            struct Pet {}
        };
        decode_entity(&item);
    }
}
