use crate::truncate_long;
use thiserror::Error;

/// Failures surfaced by the metadata reader, the SQL writer and the [`EntityManager`](crate::EntityManager).
///
/// Store and conversion failures keep the underlying `anyhow::Error` as their
/// source, so `{:#}` prints the whole chain.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Type `{type_name}` does not declare an entity marker, use #[orma(entity = \"Name\")]")]
    MissingEntityMarker { type_name: &'static str },

    #[error("Entity `{entity}` does not declare an identity field, use #[orma(id)]")]
    MissingIdentityField { entity: &'static str },

    #[error("Entity `{entity}` marks both `{first}` and `{second}` as identity, only one field can carry #[orma(id)]")]
    DuplicateIdentityField {
        entity: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("Field `{field}` of entity `{entity}` has type `{type_name}` which cannot be mapped to a column")]
    UnsupportedType {
        entity: &'static str,
        field: &'static str,
        type_name: &'static str,
    },

    #[error("Could not prepare the table of entity `{entity}` using:\n{}", truncate_long(.sql))]
    SchemaError {
        entity: &'static str,
        sql: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Could not execute the query:\n{}", truncate_long(.sql))]
    ExecutionError {
        sql: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("The store did not report a generated key after inserting into `{entity}`")]
    NoGeneratedKey { entity: &'static str, sql: String },

    #[error("Could not map column `{column}` of entity `{entity}`")]
    RowMappingError {
        entity: &'static str,
        column: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },
}

impl Error {
    /// SQL text involved in the failure, when one was produced.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::SchemaError { sql, .. }
            | Error::ExecutionError { sql, .. }
            | Error::NoGeneratedKey { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
