use crate::{Value, matches_path};
use syn::{GenericArgument, PathArguments, Type, TypePath};

fn first_generic(path: &syn::Path) -> Option<&Type> {
    let PathArguments::AngleBracketed(arguments) = &path.segments.last()?.arguments else {
        return None;
    };
    arguments.args.iter().find_map(|v| match v {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

/// Decodes the semantic type of a field from its syntactic type.
///
/// Returns an empty value describing the type. `Option<T>` and `Box<T>` are
/// transparent. Unknown types decode to `Value::Null`, the type mapper
/// rejects them later.
pub fn decode_type(ty: &Type) -> Value {
    'data_type: {
        let Type::Path(TypePath { path, .. }) = ty else {
            break 'data_type Value::Null;
        };
        if let Some(ident) = path.get_ident() {
            if ident == "bool" {
                break 'data_type Value::Boolean(None);
            } else if ident == "i8" {
                break 'data_type Value::Int8(None);
            } else if ident == "i16" {
                break 'data_type Value::Int16(None);
            } else if ident == "i32" {
                break 'data_type Value::Int32(None);
            } else if ident == "i64" {
                break 'data_type Value::Int64(None);
            } else if ident == "u8" {
                break 'data_type Value::UInt8(None);
            } else if ident == "u16" {
                break 'data_type Value::UInt16(None);
            } else if ident == "u32" {
                break 'data_type Value::UInt32(None);
            } else if ident == "u64" {
                break 'data_type Value::UInt64(None);
            } else if ident == "f32" {
                break 'data_type Value::Float32(None);
            } else if ident == "f64" {
                break 'data_type Value::Float64(None);
            } else if ident == "char" {
                break 'data_type Value::Char(None);
            }
        }
        if matches_path(path, &["std", "string", "String"]) {
            break 'data_type Value::Varchar(None);
        } else if matches_path(path, &["std", "option", "Option"])
            || matches_path(path, &["std", "boxed", "Box"])
        {
            if let Some(inner) = first_generic(path) {
                break 'data_type decode_type(inner);
            }
        } else if matches_path(path, &["std", "vec", "Vec"]) {
            if let Some(Type::Path(inner)) = first_generic(path) {
                if inner.path.is_ident("u8") {
                    break 'data_type Value::Blob(None);
                }
            }
        }
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::decode_type;
    use crate::Value;
    use syn::{Type, parse_quote};

    #[test]
    fn decode_plain_types() {
        let ty: Type = parse_quote!(i32);
        assert_eq!(decode_type(&ty), Value::Int32(None));
        let ty: Type = parse_quote!(String);
        assert_eq!(decode_type(&ty), Value::Varchar(None));
        let ty: Type = parse_quote!(::std::string::String);
        assert_eq!(decode_type(&ty), Value::Varchar(None));
        let ty: Type = parse_quote!(f64);
        assert_eq!(decode_type(&ty), Value::Float64(None));
    }

    #[test]
    fn decode_wrapped_types() {
        let ty: Type = parse_quote!(Option<i64>);
        assert_eq!(decode_type(&ty), Value::Int64(None));
        let ty: Type = parse_quote!(Box<Option<String>>);
        assert_eq!(decode_type(&ty), Value::Varchar(None));
        let ty: Type = parse_quote!(Option<Box<i32>>);
        assert_eq!(decode_type(&ty), Value::Int32(None));
        let ty: Type = parse_quote!(Vec<u8>);
        assert_eq!(decode_type(&ty), Value::Blob(None));
    }

    #[test]
    fn decode_unknown_type() {
        let ty: Type = parse_quote!(std::sync::Mutex<i32>);
        assert_eq!(decode_type(&ty), Value::Null);
        let ty: Type = parse_quote!((i32, i32));
        assert_eq!(decode_type(&ty), Value::Null);
    }
}
