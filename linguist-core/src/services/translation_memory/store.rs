use super::model::TmEntry;
use super::{hash, normalize};
use crate::error::Result;
use crate::services::persist;
use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs,
    path::Path,
};
use tracing::{info, warn};

/// Load a memory file, repairing missing keys and duplicates.
///
/// A missing or unreadable file yields an empty memory.
pub fn load(path: &Path) -> Vec<TmEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read translation memory");
            return Vec::new();
        }
    };

    let mut stored: Vec<TmEntry> = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse translation memory");
            return Vec::new();
        }
    };

    let repaired = stored.iter_mut().map(fill_keys).filter(|&r| r).count();
    let (entries, dropped) = collapse(stored);

    if repaired + dropped > 0 {
        info!(path = %path.display(), repaired, dropped, "migrating translation memory");
        if let Err(e) = save(path, &entries) {
            warn!(path = %path.display(), error = %e, "failed to persist memory migration");
        }
    }

    entries
}

pub fn save(path: &Path, entries: &[TmEntry]) -> Result<()> {
    let (entries, dropped) = collapse(entries.to_vec());

    let json = serde_json::to_string_pretty(&entries)?;
    persist::write_atomic(path, json.as_bytes())?;

    info!(
        path = %path.display(),
        entries = entries.len(),
        duplicates = dropped,
        "translation memory saved"
    );
    Ok(())
}

/// Add entries to a memory, keeping the better translation per source.
pub fn merge(existing: Vec<TmEntry>, incoming: Vec<TmEntry>) -> Vec<TmEntry> {
    collapse(existing.into_iter().chain(incoming)).0
}

/// (source language, target language, fingerprint)
type Key = (String, String, String);

/// One entry per key, the best ranked, sorted for writing. Also returns how many were dropped.
fn collapse(entries: impl IntoIterator<Item = TmEntry>) -> (Vec<TmEntry>, usize) {
    let mut best: BTreeMap<Key, TmEntry> = BTreeMap::new();
    let mut seen = 0usize;

    for mut e in entries {
        seen += 1;
        fill_keys(&mut e);
        let key = (e.source_lang.clone(), e.target_lang.clone(), e.hash.clone());
        match best.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(e);
            }
            Entry::Occupied(mut slot) => {
                if rank(&e) > rank(slot.get()) {
                    slot.insert(e);
                }
            }
        }
    }

    let dropped = seen - best.len();
    let mut out: Vec<TmEntry> = best.into_values().collect();
    out.sort_by(|a, b| file_order(a).cmp(&file_order(b)));
    (out, dropped)
}

/// Non-empty beats empty, then longer beats shorter; ties keep the earlier entry.
fn rank(e: &TmEntry) -> (bool, usize) {
    (!e.translation.trim().is_empty(), e.translation.len())
}

fn file_order(e: &TmEntry) -> (&str, &str, &str, &str, &str) {
    (
        e.source_lang.as_str(),
        e.target_lang.as_str(),
        e.normalized.as_str(),
        e.original.as_str(),
        e.translation.as_str(),
    )
}

/// Recompute `normalized`/`hash` for entries written without them.
fn fill_keys(e: &mut TmEntry) -> bool {
    if !e.normalized.is_empty() && !e.hash.is_empty() {
        return false;
    }
    if e.normalized.is_empty() {
        e.normalized = normalize::normalize(&e.original);
    }
    e.hash = hash::fingerprint(&e.normalized);
    true
}
