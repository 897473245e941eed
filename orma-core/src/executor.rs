use crate::{Driver, RowLabeled, Value};

/// Sends SQL text to a store.
///
/// Parameters are bound positionally to the `?` placeholders of `sql`. All the
/// methods block until the store answers, failures come back as
/// [`anyhow::Error`] with the driver message attached.
pub trait Executor {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// Runs every statement contained in `sql`, one after the other.
    fn execute_batch(&mut self, sql: &str) -> anyhow::Result<()>;

    /// Runs a single statement and returns the number of rows it changed.
    fn execute(&mut self, sql: &str, params: &[Value]) -> anyhow::Result<u64>;

    /// Runs a single insert and returns the key generated by the store, if any.
    fn insert(&mut self, sql: &str, params: &[Value]) -> anyhow::Result<Option<i64>>;

    /// Runs a query and collects every row.
    fn fetch(&mut self, sql: &str) -> anyhow::Result<Vec<RowLabeled>>;
}
