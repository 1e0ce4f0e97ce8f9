pub mod encoding;
pub mod lookup;
pub mod persist;
pub mod pipeline;
pub mod plural;
pub mod qa;
pub mod rebuild;
pub mod settings;
pub mod stats;
pub mod translation_memory;
