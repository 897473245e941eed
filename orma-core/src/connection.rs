use crate::Executor;

pub trait Connection: Executor + Sized {
    /// Opens a connection to the store identified by `url`.
    fn connect(url: &str) -> anyhow::Result<Self>;

    /// Releases the underlying handle. Further calls on the connection fail.
    fn close(&mut self) -> anyhow::Result<()>;

    fn is_open(&self) -> bool;
}
