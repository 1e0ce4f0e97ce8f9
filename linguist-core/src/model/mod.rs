pub mod catalog;
pub mod entry;
pub mod settings;
