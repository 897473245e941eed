use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt, quote};

/// Dynamically typed value moved between entities, statements and rows.
///
/// Every variant wraps an `Option`: `Some` carries a live value, `None` is the
/// typed absence of a value. A `None` payload is also how a field declares its
/// semantic type in [`FieldDef::value`](crate::FieldDef).
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Char(Option<char>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Char(l), Self::Char(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    /// True for [`Value::Null`] and for any variant holding `None`.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int8(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::UInt8(None)
            | Value::UInt16(None)
            | Value::UInt32(None)
            | Value::UInt64(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Char(None)
            | Value::Varchar(None)
            | Value::Blob(None) => true,
            _ => false,
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

impl ToTokens for Value {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let ts = match self {
            Value::Null => quote! { ::orma::Value::Null },
            Value::Boolean(..) => quote! { ::orma::Value::Boolean(None) },
            Value::Int8(..) => quote! { ::orma::Value::Int8(None) },
            Value::Int16(..) => quote! { ::orma::Value::Int16(None) },
            Value::Int32(..) => quote! { ::orma::Value::Int32(None) },
            Value::Int64(..) => quote! { ::orma::Value::Int64(None) },
            Value::UInt8(..) => quote! { ::orma::Value::UInt8(None) },
            Value::UInt16(..) => quote! { ::orma::Value::UInt16(None) },
            Value::UInt32(..) => quote! { ::orma::Value::UInt32(None) },
            Value::UInt64(..) => quote! { ::orma::Value::UInt64(None) },
            Value::Float32(..) => quote! { ::orma::Value::Float32(None) },
            Value::Float64(..) => quote! { ::orma::Value::Float64(None) },
            Value::Char(..) => quote! { ::orma::Value::Char(None) },
            Value::Varchar(..) => quote! { ::orma::Value::Varchar(None) },
            Value::Blob(..) => quote! { ::orma::Value::Blob(None) },
        };
        tokens.append_all(ts);
    }
}
