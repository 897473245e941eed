use crate::{Connection, SqlWriter};

/// Entry point of a store backend: names it and hands out its SQL dialect.
pub trait Driver {
    type Connection: Connection;
    type SqlWriter: SqlWriter;

    /// Scheme expected in front of connection urls, e.g. `sqlite`.
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
