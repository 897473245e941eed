mod as_value;
mod config;
mod connection;
mod decode_type;
mod descriptor;
mod driver;
mod entity;
mod error;
mod executor;
mod manager;
mod row;
mod sql_writer;
mod util;
mod value;

pub use ::anyhow::{self, Context};
pub use as_value::*;
pub use config::*;
pub use connection::*;
pub use decode_type::*;
pub use descriptor::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use manager::*;
pub use row::*;
pub use sql_writer::*;
pub use util::*;
pub use value::*;
