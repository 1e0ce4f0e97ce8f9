//! Loading, validation, lookup and re-serialization of Qt Linguist `.ts`
//! translation catalogs.

pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use error::{Error, Result};
pub use model::catalog::{Catalog, Context};
pub use model::entry::{Location, Message, TranslationStatus};
pub use services::lookup::Translator;
