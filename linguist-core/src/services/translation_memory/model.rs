use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TmEntry {
    pub source_lang: String,
    pub target_lang: String,

    pub original: String,
    pub translation: String,

    #[serde(default)]
    pub normalized: String,

    #[serde(default)]
    pub hash: String,
}

impl TmEntry {
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        original: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        let original = original.into();
        let normalized = super::normalize::normalize(&original);
        let hash = super::hash::fingerprint(&normalized);
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            original,
            translation: translation.into(),
            normalized,
            hash,
        }
    }
}
