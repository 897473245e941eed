use orma_core::{Marker, Value, decode_type};
use quote::ToTokens;
use syn::{Field, Ident, LitStr, Type, parse::ParseBuffer};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) column_name: String,
    pub(crate) type_name: String,
    pub(crate) value: Value,
    pub(crate) marker: Marker,
}

/// Optional `= "NAME"` following a marker.
fn decode_name(arg: &syn::meta::ParseNestedMeta, attribute: &str) -> String {
    if !arg.input.peek(syn::Token![=]) {
        return String::new();
    }
    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
        panic!(
            "Error while parsing `{attribute}`, use it like: `#[orma({attribute})]` or `#[orma({attribute} = \"NAME\")]`"
        );
    };
    let name = v.value();
    if name.is_empty() {
        panic!("The name given to `{attribute}` cannot be empty");
    }
    name
}

pub(crate) fn decode_field(field: &Field) -> FieldMetadata {
    let value = decode_type(&field.ty);
    let ident = field
        .ident
        .clone()
        .expect("Entity fields are expected to have a name");
    let mut metadata = FieldMetadata {
        ident,
        ty: field.ty.clone(),
        column_name: String::new(),
        type_name: field.ty.to_token_stream().to_string().replace(' ', ""),
        value,
        marker: Marker::None,
    };
    let mut ignored = false;
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("orma") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `orma`, use it like: `#[orma(column = \"NAME\")]`");
        };
        let parsed = list.parse_nested_meta(|arg| {
            let marker = if arg.path.is_ident("id") {
                Marker::Identity
            } else if arg.path.is_ident("column") {
                Marker::Column
            } else if arg.path.is_ident("ignore") {
                ignored = true;
                return Ok(());
            } else {
                panic!(
                    "Unknown attribute `{}` inside orma macro on field `{}`",
                    arg.path.to_token_stream(),
                    metadata.ident,
                );
            };
            if metadata.marker != Marker::None {
                panic!(
                    "Field `{}` can be either `id` or `column`, not both",
                    metadata.ident
                );
            }
            metadata.marker = marker;
            metadata.column_name = decode_name(&arg, &arg.path.to_token_stream().to_string());
            Ok(())
        });
        if let Err(e) = parsed {
            panic!(
                "Error while parsing `orma` on field `{}`: {e}, use it like: `#[orma(column = \"NAME\")]`",
                metadata.ident
            );
        }
    }
    if ignored && metadata.marker != Marker::None {
        panic!(
            "Field `{}` is marked `ignore` together with a mapping",
            metadata.ident
        );
    }
    metadata
}
