use serde::{Deserialize, Serialize};

use super::entry::Message;

fn default_version() -> String {
    "2.0".to_string()
}

/// Messages of one UI component, in document order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Context {
    pub name: String,

    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    /// First message matching `source` and disambiguation `comment` (empty for none).
    pub fn find(&self, source: &str, comment: &str) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.source == source && m.comment_key() == comment)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub source_language: Option<String>,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            version: default_version(),
            language: String::new(),
            source_language: None,
            contexts: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Flat view of every message with the name of its context, in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &mut Message)> {
        self.contexts.iter_mut().flat_map(|c| {
            let name = c.name.as_str();
            c.messages.iter_mut().map(move |m| (name, m))
        })
    }

    pub fn len(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
