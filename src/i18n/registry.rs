//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is static data. It uses a singleton pattern with `OnceLock` for
//! the built-in language table, and can also be constructed from an explicit
//! list for tests or alternative deployments.

use crate::error::LocalizeError;
use crate::i18n::{Direction, LanguageDescriptor, LanguageFamily};
use crate::providers::ProviderId;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Registry of every language the pipeline knows about.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageDescriptor>,
    default_code: &'static str,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Build a registry from an explicit language table.
    ///
    /// # Arguments
    /// * `languages` - Descriptors, one per unique code
    /// * `default_code` - Code of the canonical language; must be in `languages`
    pub fn new(
        languages: Vec<LanguageDescriptor>,
        default_code: &'static str,
    ) -> Result<Self, LocalizeError> {
        if !languages.iter().any(|lang| lang.code == default_code) {
            return Err(LocalizeError::UnknownLanguage(default_code.to_string()));
        }
        Ok(Self {
            languages,
            default_code,
        })
    }

    /// Get the built-in language registry.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
            default_code: "en",
        })
    }

    /// Look up a language by its code.
    ///
    /// # Returns
    /// * `Ok(&LanguageDescriptor)` if the language exists
    /// * `Err(LocalizeError::UnknownLanguage)` otherwise
    pub fn describe(&self, code: &str) -> Result<&LanguageDescriptor, LocalizeError> {
        self.get_by_code(code)
            .ok_or_else(|| LocalizeError::UnknownLanguage(code.to_string()))
    }

    pub fn get_by_code(&self, code: &str) -> Option<&LanguageDescriptor> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// All languages, in registration order.
    pub fn list_all(&self) -> Vec<&LanguageDescriptor> {
        self.languages.iter().collect()
    }

    /// The canonical language every localization run starts from.
    pub fn default_language(&self) -> &LanguageDescriptor {
        self.languages
            .iter()
            .find(|lang| lang.code == self.default_code)
            .unwrap_or(&self.languages[0])
    }

    pub fn default_code(&self) -> &'static str {
        self.default_code
    }

    /// Codes of all right-to-left languages.
    pub fn rtl_languages(&self) -> Vec<&'static str> {
        self.languages
            .iter()
            .filter(|lang| lang.direction == Direction::Rtl)
            .map(|lang| lang.code)
            .collect()
    }

    pub fn by_family(&self, family: LanguageFamily) -> Vec<&LanguageDescriptor> {
        self.languages
            .iter()
            .filter(|lang| lang.family == family)
            .collect()
    }

    /// Group language codes by "family (preferred provider)".
    ///
    /// Used to log the provider distribution at the start of a run.
    pub fn providers_summary(&self) -> BTreeMap<String, Vec<&'static str>> {
        let mut summary: BTreeMap<String, Vec<&'static str>> = BTreeMap::new();
        for lang in &self.languages {
            let key = format!("{} ({})", lang.family, lang.preferred_provider);
            summary.entry(key).or_default().push(lang.code);
        }
        summary
    }
}

const fn lang(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    direction: Direction,
    family: LanguageFamily,
    preferred_provider: ProviderId,
) -> LanguageDescriptor {
    LanguageDescriptor {
        code,
        name,
        native_name,
        direction,
        family,
        preferred_provider,
    }
}

/// Built-in language table.
///
/// CJK languages prefer DeepSeek, right-to-left and Slavic languages prefer
/// Claude, everything else prefers OpenAI.
fn default_languages() -> Vec<LanguageDescriptor> {
    use Direction::{Ltr, Rtl};
    use LanguageFamily::*;
    use ProviderId::{Claude, DeepSeek, OpenAi};

    vec![
        lang("en", "English", "English", Ltr, European, OpenAi),
        // CJK
        lang("zh", "Chinese", "中文", Ltr, Cjk, DeepSeek),
        lang("ja", "Japanese", "日本語", Ltr, Cjk, DeepSeek),
        lang("ko", "Korean", "한국어", Ltr, Cjk, DeepSeek),
        // Right-to-left
        lang("ar", "Arabic", "العربية", Rtl, LanguageFamily::Rtl, Claude),
        lang("he", "Hebrew", "עברית", Rtl, LanguageFamily::Rtl, Claude),
        lang("fa", "Persian", "فارسی", Rtl, LanguageFamily::Rtl, Claude),
        lang("ur", "Urdu", "اردو", Rtl, LanguageFamily::Rtl, Claude),
        // European
        lang("de", "German", "Deutsch", Ltr, European, OpenAi),
        lang("fr", "French", "Français", Ltr, European, OpenAi),
        lang("es", "Spanish", "Español", Ltr, European, OpenAi),
        lang("it", "Italian", "Italiano", Ltr, European, OpenAi),
        lang("pt", "Portuguese", "Português", Ltr, European, OpenAi),
        lang("nl", "Dutch", "Nederlands", Ltr, European, OpenAi),
        lang("sv", "Swedish", "Svenska", Ltr, European, OpenAi),
        lang("da", "Danish", "Dansk", Ltr, European, OpenAi),
        lang("no", "Norwegian", "Norsk", Ltr, European, OpenAi),
        lang("el", "Greek", "Ελληνικά", Ltr, European, OpenAi),
        lang("cs", "Czech", "Čeština", Ltr, European, OpenAi),
        // Slavic
        lang("ru", "Russian", "Русский", Ltr, Slavic, Claude),
        lang("pl", "Polish", "Polski", Ltr, Slavic, Claude),
        lang("uk", "Ukrainian", "Українська", Ltr, Slavic, Claude),
        // South Asian
        lang("hi", "Hindi", "हिन्दी", Ltr, SouthAsian, OpenAi),
        lang("bn", "Bengali", "বাংলা", Ltr, SouthAsian, OpenAi),
        // Southeast Asian
        lang("th", "Thai", "ไทย", Ltr, SoutheastAsian, OpenAi),
        lang("vi", "Vietnamese", "Tiếng Việt", Ltr, SoutheastAsian, OpenAi),
        lang("id", "Indonesian", "Bahasa Indonesia", Ltr, SoutheastAsian, OpenAi),
        lang("ms", "Malay", "Bahasa Melayu", Ltr, SoutheastAsian, OpenAi),
        lang("fil", "Filipino", "Filipino", Ltr, SoutheastAsian, OpenAi),
        lang("tr", "Turkish", "Türkçe", Ltr, SoutheastAsian, OpenAi),
    ]
}
