//! Persistent (source -> translation) pairs harvested from finished catalog entries.

pub mod hash;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod store;

use crate::model::catalog::Catalog;
use crate::model::entry::TranslationStatus;
use model::TmEntry;

/// Finished, non-numerus entries of a catalog as memory entries.
pub fn harvest(catalog: &Catalog, source_lang: &str, target_lang: &str) -> Vec<TmEntry> {
    catalog
        .entries()
        .filter(|(_, m)| {
            m.status == TranslationStatus::Finished
                && !m.numerus
                && !m.source.trim().is_empty()
                && !m.translation.trim().is_empty()
        })
        .map(|(_, m)| TmEntry::new(source_lang, target_lang, &m.source, &m.translation))
        .collect()
}
