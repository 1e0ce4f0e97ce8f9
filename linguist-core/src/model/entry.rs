use serde::{Deserialize, Serialize};

/// A `(file, line)` citation where a string is used. Provenance only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Location {
    #[serde(default)]
    pub filename: String,

    #[serde(default)]
    pub line: Option<u32>,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self {
            filename: filename.into(),
            line: Some(line),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    #[serde(default)]
    pub id: Option<String>,

    pub source: String,

    /// Disambiguation comment; part of the lookup key.
    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub extra_comment: Option<String>,

    #[serde(default)]
    pub translator_comment: Option<String>,

    #[serde(default)]
    pub locations: Vec<Location>,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub numerus: bool,

    #[serde(default)]
    pub numerus_forms: Vec<String>,

    #[serde(default)]
    pub status: TranslationStatus,
}

impl Message {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            comment: None,
            extra_comment: None,
            translator_comment: None,
            locations: Vec::new(),
            translation: String::new(),
            numerus: false,
            numerus_forms: Vec::new(),
            status: TranslationStatus::Unfinished,
        }
    }

    /// Disambiguation comment, empty when absent.
    pub fn comment_key(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    /// Whether the entry carries text a loader may serve.
    pub fn has_translation(&self) -> bool {
        if self.numerus {
            !self.numerus_forms.is_empty() && self.numerus_forms.iter().all(|f| !f.is_empty())
        } else {
            !self.translation.is_empty()
        }
    }

    /// Every translated string of the entry: the numerus forms or the single translation.
    pub fn translated_texts(&self) -> Vec<&str> {
        if self.numerus {
            self.numerus_forms.iter().map(String::as_str).collect()
        } else {
            vec![self.translation.as_str()]
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Finished,
    #[default]
    Unfinished,
    Obsolete,
    Vanished,
}

impl TranslationStatus {
    /// Value of the `type` attribute on `<translation>`, `None` for finished entries.
    pub fn type_attr(self) -> Option<&'static str> {
        match self {
            TranslationStatus::Finished => None,
            TranslationStatus::Unfinished => Some("unfinished"),
            TranslationStatus::Obsolete => Some("obsolete"),
            TranslationStatus::Vanished => Some("vanished"),
        }
    }

    pub fn from_type_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("") => Some(TranslationStatus::Finished),
            Some("unfinished") => Some(TranslationStatus::Unfinished),
            Some("obsolete") => Some(TranslationStatus::Obsolete),
            Some("vanished") => Some(TranslationStatus::Vanished),
            Some(_) => None,
        }
    }
}
