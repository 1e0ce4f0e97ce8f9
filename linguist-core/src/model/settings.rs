use serde::{Deserialize, Serialize};

fn default_source_language() -> String {
    "en".to_string()
}

fn default_tm_path() -> String {
    "translation_memory.json".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_source_language", alias = "source_lang")]
    pub source_language: String,

    #[serde(default, alias = "target_lang")]
    pub target_language: String,

    /// Translation memory file, relative to the data directory unless absolute.
    #[serde(default = "default_tm_path")]
    pub tm_path: String,

    #[serde(default)]
    pub mark_pretranslated_finished: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: String::new(),
            tm_path: default_tm_path(),
            mark_pretranslated_finished: false,
        }
    }
}
