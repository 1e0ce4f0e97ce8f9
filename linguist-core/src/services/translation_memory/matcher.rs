use super::model::TmEntry;
use super::{hash, normalize};

pub fn exact_match<'a>(
    entries: &'a [TmEntry],
    source_lang: &str,
    target_lang: &str,
    original: &str,
) -> Option<&'a TmEntry> {
    if original.trim().is_empty() {
        return None;
    }

    let norm = normalize::normalize(original);
    let h = hash::fingerprint(&norm);

    entries.iter().find(|e| {
        e.source_lang == source_lang
            && e.target_lang == target_lang
            && e.hash == h
            && e.normalized == norm
            && !e.translation.trim().is_empty()
    })
}
