//! Localized player-facing messages.
//!
//! Messages are keyed by name and locale. Lookup falls back to the English
//! registration, then to the key itself so a missing registration is visible
//! in chat rather than silently dropped.

use std::collections::HashMap;

pub const WARNING_MESSAGE_KEY: &str = "Warning Message Text";

const DEFAULT_LOCALE: &str = "en";

const DEFAULT_WARNING_TEXT: &str =
    "<color=#FF7900>You can only run a single resource extractor at any given time.</color>";

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    // (locale, key) -> text
    messages: HashMap<(String, String), String>,
}

impl MessageCatalog {
    /// Catalog pre-loaded with the English defaults.
    pub fn with_defaults() -> Self {
        let mut catalog = Self {
            messages: HashMap::new(),
        };
        catalog.register(DEFAULT_LOCALE, WARNING_MESSAGE_KEY, DEFAULT_WARNING_TEXT);
        catalog
    }

    /// Register or override a message for a locale. Hosts call this before
    /// the plugin initializes to ship translations.
    pub fn register(&mut self, locale: &str, key: &str, text: &str) {
        self.messages
            .insert((locale.to_string(), key.to_string()), text.to_string());
    }

    pub fn get<'a>(&'a self, key: &'a str, locale: &str) -> &'a str {
        if let Some(text) = self.messages.get(&(locale.to_string(), key.to_string())) {
            return text;
        }
        self.messages
            .get(&(DEFAULT_LOCALE.to_string(), key.to_string()))
            .map(String::as_str)
            .unwrap_or(key)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}
