//! Runtime resolver: pure lookups of dotted key paths against a loaded store.
//!
//! Resolution never fails. A path missing from the requested language is
//! retried against the default language, and a path missing from both (or
//! ending on anything but a string) resolves to the path itself.

use crate::content::ContentNode;
use crate::i18n::LanguageRegistry;
use crate::store::LocalizedStore;
use std::sync::Arc;

pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone)]
pub struct Resolver {
    store: Arc<LocalizedStore>,
}

impl Resolver {
    pub fn new(store: Arc<LocalizedStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LocalizedStore {
        &self.store
    }

    /// Resolve `path` (e.g. `home.hero.title`) for `lang`.
    ///
    /// Unknown languages resolve against the default tree.
    pub fn resolve(&self, path: &str, lang: &str) -> String {
        let keys: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let default = self.store.default_tree();
        let tree = self.store.get(lang).unwrap_or(default);

        match tree.lookup(&keys).or_else(|| default.lookup(&keys)) {
            Some(ContentNode::Text(value)) => value.clone(),
            _ => path.to_string(),
        }
    }

    /// Language named by the first segment of a URL path, if the store has it.
    ///
    /// `/ar/hotels` gives `ar`; `/hotels` gives the default language.
    pub fn language_from_path(&self, url_path: &str) -> String {
        url_path
            .split('/')
            .find(|segment| !segment.is_empty())
            .filter(|segment| self.store.contains(segment))
            .unwrap_or(self.store.default_language())
            .to_string()
    }

    pub fn is_rtl(&self, lang: &str) -> bool {
        LanguageRegistry::get()
            .get_by_code(lang)
            .is_some_and(|language| language.is_rtl())
    }

    /// A lookup handle bound to one language.
    pub fn translator(&self, lang: &str) -> Translator<'_> {
        Translator {
            resolver: self,
            lang: lang.to_string(),
        }
    }
}

/// Resolver bound to a single language, as handed to page renderers.
#[derive(Debug, Clone)]
pub struct Translator<'a> {
    resolver: &'a Resolver,
    lang: String,
}

impl Translator<'_> {
    pub fn t(&self, path: &str) -> String {
        self.resolver.resolve(path, &self.lang)
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn is_rtl(&self) -> bool {
        self.resolver.is_rtl(&self.lang)
    }
}
