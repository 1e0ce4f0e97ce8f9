use crate::model::catalog::Catalog;
use crate::model::entry::TranslationStatus;
use crate::services::translation_memory::{matcher, model::TmEntry};
use tracing::info;

pub struct PipelineConfig<'a> {
    pub source_lang: &'a str,
    pub target_lang: &'a str,
    /// Mark memory-filled entries finished instead of leaving them for review.
    pub mark_finished: bool,
}

#[derive(Debug, serde::Serialize, PartialEq, Eq)]
pub struct PipelineReport {
    pub used_tm: usize,
    pub still_unfinished: usize,
}

/// Fill unfinished, empty, non-numerus entries from the translation memory.
pub fn pretranslate(catalog: &mut Catalog, tm: &[TmEntry], cfg: &PipelineConfig) -> PipelineReport {
    let mut used_tm = 0usize;
    let mut still_unfinished = 0usize;

    for (_, m) in catalog.entries_mut() {
        if m.status != TranslationStatus::Unfinished {
            continue;
        }

        if m.numerus || !m.translation.is_empty() {
            still_unfinished += 1;
            continue;
        }

        match matcher::exact_match(tm, cfg.source_lang, cfg.target_lang, &m.source) {
            Some(hit) => {
                m.translation = hit.translation.clone();
                used_tm += 1;
                if cfg.mark_finished {
                    m.status = TranslationStatus::Finished;
                } else {
                    still_unfinished += 1;
                }
            }
            None => still_unfinished += 1,
        }
    }

    info!(used_tm, still_unfinished, "pretranslation finished");

    PipelineReport {
        used_tm,
        still_unfinished,
    }
}
