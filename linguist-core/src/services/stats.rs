use serde::Serialize;

use crate::model::catalog::{Catalog, Context};
use crate::model::entry::TranslationStatus;

#[derive(Debug, Serialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
    /// Obsolete and vanished.
    pub obsolete: usize,
}

impl Counts {
    fn add(&mut self, status: TranslationStatus) {
        self.total += 1;
        match status {
            TranslationStatus::Finished => self.finished += 1,
            TranslationStatus::Unfinished => self.unfinished += 1,
            TranslationStatus::Obsolete | TranslationStatus::Vanished => self.obsolete += 1,
        }
    }

    fn merge(&mut self, other: &Counts) {
        self.total += other.total;
        self.finished += other.finished;
        self.unfinished += other.unfinished;
        self.obsolete += other.obsolete;
    }

    /// Finished share of the live (non-obsolete) messages; 1.0 when there are none.
    pub fn completion(&self) -> f64 {
        let live = self.finished + self.unfinished;
        if live == 0 {
            1.0
        } else {
            self.finished as f64 / live as f64
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ContextStats {
    pub name: String,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Serialize, Clone)]
pub struct CatalogStats {
    pub language: String,
    pub contexts: Vec<ContextStats>,
    pub totals: Counts,
    pub completion: f64,
}

fn context_counts(context: &Context) -> Counts {
    let mut counts = Counts::default();
    for m in &context.messages {
        counts.add(m.status);
    }
    counts
}

pub fn compute(catalog: &Catalog) -> CatalogStats {
    let mut totals = Counts::default();
    let mut contexts = Vec::with_capacity(catalog.contexts.len());

    for context in &catalog.contexts {
        let counts = context_counts(context);
        totals.merge(&counts);
        contexts.push(ContextStats {
            name: context.name.clone(),
            counts,
        });
    }

    CatalogStats {
        language: catalog.language.clone(),
        contexts,
        completion: totals.completion(),
        totals,
    }
}
