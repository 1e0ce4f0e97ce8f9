//! Read-only translation lookup over a loaded catalog.
//!
//! Missing keys are not errors: every lookup falls back to the source text.
//! Only finished entries with non-empty text are served; unfinished,
//! obsolete and vanished entries behave as if absent.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::catalog::Catalog;
use crate::model::entry::TranslationStatus;
use crate::services::plural::PluralRule;

#[derive(Debug, Clone)]
enum Served {
    Single(String),
    Plural(Vec<String>),
}

#[derive(Debug, Clone)]
struct Candidate {
    comment: String,
    served: Served,
}

/// Index built once from a catalog: context -> source -> candidates by comment.
#[derive(Debug, Clone)]
pub struct Translator {
    language: String,
    rule: PluralRule,
    index: HashMap<String, HashMap<String, Vec<Candidate>>>,
}

impl Translator {
    pub fn new(catalog: &Catalog) -> Self {
        let mut index: HashMap<String, HashMap<String, Vec<Candidate>>> = HashMap::new();

        for (context, m) in catalog.entries() {
            if m.status != TranslationStatus::Finished || !m.has_translation() {
                continue;
            }

            let served = if m.numerus {
                Served::Plural(m.numerus_forms.clone())
            } else {
                Served::Single(m.translation.clone())
            };

            let candidates = index
                .entry(context.to_string())
                .or_default()
                .entry(m.source.clone())
                .or_default();

            // first occurrence wins, like the runtime loader
            if candidates.iter().all(|c| c.comment != m.comment_key()) {
                candidates.push(Candidate {
                    comment: m.comment_key().to_string(),
                    served,
                });
            }
        }

        Self {
            language: catalog.language.clone(),
            rule: PluralRule::for_language(&catalog.language),
            index,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn plural_rule(&self) -> PluralRule {
        self.rule
    }

    /// Number of servable (context, source, comment) keys.
    pub fn len(&self) -> usize {
        self.index
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Served> {
        let candidates = self.index.get(context)?.get(source)?;
        let comment = comment.unwrap_or("");

        candidates
            .iter()
            .find(|c| c.comment == comment)
            .or_else(|| candidates.iter().find(|c| c.comment.is_empty()))
            .map(|c| &c.served)
    }

    /// Translation of `source` in `context`, or `source` itself.
    pub fn translate<'a>(&'a self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        match self.find(context, source, comment) {
            Some(Served::Single(text)) => text,
            Some(Served::Plural(forms)) => forms.first().map_or(source, String::as_str),
            None => source,
        }
    }

    /// Plural-aware lookup: picks the numerus form for `n` and substitutes `%n`.
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: i64,
    ) -> String {
        let text = match self.find(context, source, comment) {
            Some(Served::Plural(forms)) if !forms.is_empty() => {
                let idx = self.rule.index(n).min(forms.len() - 1);
                forms[idx].as_str()
            }
            Some(Served::Single(text)) => text.as_str(),
            _ => source,
        };
        replace_count(text, n)
    }
}

fn count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%L?n").expect("static regex"))
}

fn arg_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%L?([0-9]{1,2})").expect("static regex"))
}

fn replace_count(text: &str, n: i64) -> String {
    count_re().replace_all(text, n.to_string()).into_owned()
}

/// Replace every occurrence of the lowest-numbered `%N` placeholder with `value`.
///
/// Text without placeholders is returned unchanged.
pub fn arg(template: &str, value: impl std::fmt::Display) -> String {
    let lowest = arg_re()
        .captures_iter(template)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
        .min();

    let Some(lowest) = lowest else {
        return template.to_string();
    };

    let value = value.to_string();
    arg_re()
        .replace_all(template, |caps: &regex::Captures| {
            if caps[1].parse::<u32>().ok() == Some(lowest) {
                value.clone()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
