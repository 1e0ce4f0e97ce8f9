use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;
use crate::model::entry::{Message, TranslationStatus};
use crate::services::plural::PluralRule;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub context: String,
    pub source: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%L?([0-9]{1,2}|n)").expect("static regex"))
}

/// `%1`, `%L1` and `%n` tokens, with the locale marker dropped.
fn placeholders(text: &str) -> BTreeSet<String> {
    placeholder_re()
        .captures_iter(text)
        .map(|c| format!("%{}", &c[1]))
        .collect()
}

/// A single `&` marks a keyboard accelerator; `&&` is a literal ampersand.
fn has_accelerator(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            continue;
        }
        match chars.peek() {
            Some('&') => {
                chars.next();
            }
            Some(next) if !next.is_whitespace() => return true,
            _ => {}
        }
    }
    false
}

fn edges(text: &str) -> (&str, &str) {
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];
    (lead, trail)
}

pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let forms = PluralRule::for_language(&catalog.language).form_count();

    for context in &catalog.contexts {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for m in &context.messages {
            let mut push = |code: &str, severity: Severity, message: String| {
                issues.push(QaIssue {
                    context: context.name.clone(),
                    source: m.source.clone(),
                    code: code.to_string(),
                    severity,
                    message,
                });
            };

            if m.source.is_empty() {
                push("EMPTY_SOURCE", Severity::Error, "Source text is empty".into());
            }

            if !seen.insert((m.source.as_str(), m.comment_key())) {
                push(
                    "DUPLICATE_SOURCE",
                    Severity::Error,
                    format!("Source text repeated in context {}", context.name),
                );
            }

            // the remaining checks only look at translations a loader would serve
            if m.status != TranslationStatus::Finished {
                continue;
            }

            if !m.has_translation() {
                push(
                    "FINISHED_BUT_EMPTY",
                    Severity::Error,
                    "Marked finished but the translation is empty".into(),
                );
                continue;
            }

            if m.numerus && m.numerus_forms.len() != forms {
                push(
                    "NUMERUS_FORM_COUNT",
                    Severity::Warning,
                    format!(
                        "{} plural forms for {}, expected {forms}",
                        m.numerus_forms.len(),
                        catalog.language
                    ),
                );
            }

            check_translation(m, &mut push);
        }
    }

    issues
}

fn check_translation(m: &Message, push: &mut impl FnMut(&str, Severity, String)) {
    let expected = placeholders(&m.source);

    for text in m.translated_texts() {
        let found = placeholders(text);
        // a numerus form may drop %n, e.g. singular "one track"
        let comparable = if m.numerus {
            let mut e = expected.clone();
            e.remove("%n");
            let mut f = found.clone();
            f.remove("%n");
            e == f
        } else {
            expected == found
        };
        if !comparable {
            push(
                "PLACEHOLDER_MISMATCH",
                Severity::Warning,
                format!("Placeholders {expected:?} in source but {found:?} in translation"),
            );
        }

        if has_accelerator(&m.source) != has_accelerator(text) {
            push(
                "ACCELERATOR_MISMATCH",
                Severity::Warning,
                "Keyboard accelerator (&) present on only one side".into(),
            );
        }

        if edges(&m.source) != edges(text) {
            push(
                "WHITESPACE_MISMATCH",
                Severity::Warning,
                "Leading or trailing whitespace differs from source".into(),
            );
        }

        if text == m.source && m.source.chars().any(char::is_alphabetic) {
            push(
                "SAME_AS_ORIGINAL",
                Severity::Warning,
                "Translation is identical to the source text".into(),
            );
        }
    }
}

/// No error-severity issue.
pub fn is_valid(issues: &[QaIssue]) -> bool {
    issues.iter().all(|i| i.severity != Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::Context;

    fn finished(source: &str, translation: &str) -> Message {
        let mut m = Message::new(source);
        m.translation = translation.into();
        m.status = TranslationStatus::Finished;
        m
    }

    fn codes(catalog: &Catalog) -> Vec<String> {
        run(catalog).into_iter().map(|i| i.code).collect()
    }

    fn single(messages: Vec<Message>) -> Catalog {
        let mut catalog = Catalog::new("es_ES");
        let mut ctx = Context::new("QHiMDMainWindow");
        ctx.messages = messages;
        catalog.contexts.push(ctx);
        catalog
    }

    #[test]
    fn clean_entries_raise_nothing() {
        let catalog = single(vec![
            finished("&Close", "&Cerrar"),
            finished("Track %1", "Pista %1"),
            finished("&?", "&?"),
            Message::new("Version:"),
        ]);
        assert!(run(&catalog).is_empty());
    }

    #[test]
    fn structural_errors() {
        let catalog = single(vec![
            finished("", "vacío"),
            finished("Format", "Formato"),
            finished("Format", "Formatear"),
            finished("Cancel", ""),
        ]);
        let issues = run(&catalog);
        let got: Vec<&str> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(got, vec!["EMPTY_SOURCE", "DUPLICATE_SOURCE", "FINISHED_BUT_EMPTY"]);
        assert!(!is_valid(&issues));
        assert_eq!(issues[1].source, "Format");
        assert_eq!(issues[1].context, "QHiMDMainWindow");
    }

    #[test]
    fn same_source_with_other_comment_is_not_a_duplicate() {
        let mut menu = finished("Format", "Formato");
        menu.comment = Some("menu".into());
        let catalog = single(vec![finished("Format", "Formato"), menu]);
        assert!(!codes(&catalog).contains(&"DUPLICATE_SOURCE".to_string()));
    }

    #[test]
    fn translation_warnings() {
        let catalog = single(vec![
            finished("current track: %1 - %2", "Pista actual: %1"),
            finished("Re&name", "Renombrar"),
            finished("Error opening track: ", "Error de apertura de pista:"),
            finished("Title", "Title"),
        ]);
        let issues = run(&catalog);
        assert_eq!(
            issues.iter().map(|i| i.code.as_str()).collect::<Vec<_>>(),
            vec![
                "PLACEHOLDER_MISMATCH",
                "ACCELERATOR_MISMATCH",
                "WHITESPACE_MISMATCH",
                "SAME_AS_ORIGINAL",
            ]
        );
        assert!(is_valid(&issues));
    }

    #[test]
    fn numerus_forms_may_omit_count() {
        let mut m = Message::new("%n track(s) could not be uploaded");
        m.numerus = true;
        m.numerus_forms = vec![
            "una pista no pudo subirse".into(),
            "%n pistas no pudieron subirse".into(),
        ];
        m.status = TranslationStatus::Finished;
        assert!(run(&single(vec![m.clone()])).is_empty());

        m.numerus_forms.push("%n pistas más".into());
        assert_eq!(codes(&single(vec![m])), vec!["NUMERUS_FORM_COUNT"]);
    }

    #[test]
    fn unfinished_and_obsolete_skip_translation_checks() {
        let mut obsolete = finished("Title", "Title");
        obsolete.status = TranslationStatus::Obsolete;
        let catalog = single(vec![Message::new("Build Date:"), obsolete]);
        assert!(run(&catalog).is_empty());
    }

    #[test]
    fn accelerator_detection() {
        assert!(has_accelerator("D&elete selected"));
        assert!(has_accelerator("&?"));
        assert!(!has_accelerator("Rock && Roll"));
        assert!(!has_accelerator("A & B"));
    }
}
