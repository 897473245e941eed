//! Orma derives tables from annotated structs and turns CRUD calls into SQL.
//!
//! ```ignore
//! use orma::{Entity, EntityManager, Properties};
//!
//! #[derive(Default, Entity)]
//! #[orma(entity = "Animal")]
//! struct Animal {
//!     #[orma(id)]
//!     id: Option<i64>,
//!     #[orma(column = "Fullname")]
//!     name: String,
//!     #[orma(column)]
//!     age: i32,
//! }
//!
//! let properties = Properties::load("orma.toml")?;
//! let mut manager = EntityManager::<SqliteConnection>::open(&properties, "db")?;
//! manager.prepare_repository_for::<Animal>()?;
//! ```
pub use orma_core::*;
pub use orma_macros::*;
