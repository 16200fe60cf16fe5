//! Localization quality validation module.
//!
//! Checks that elements which must survive localization verbatim
//! (placeholders, URLs, HTML tags) are still present in provider output.
//! Validation never rejects output; it only reports.

use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a localized leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that almost certainly mean the output is wrong
    pub errors: Vec<String>,

    /// Non-critical warnings about potential issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for localized leaf strings.
pub struct LeafValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static PREAMBLE_REGEX: OnceLock<Regex> = OnceLock::new();

impl LeafValidator {
    /// Validate that a localized string preserves what the source requires.
    ///
    /// # Arguments
    /// * `original` - The source-language leaf
    /// * `localized` - The provider's output for that leaf
    pub fn validate(original: &str, localized: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        if !original.trim().is_empty() && localized.trim().is_empty() {
            report
                .errors
                .push("Localized text is empty for non-empty source".to_string());
            return report;
        }

        let mut orig_placeholders = Self::extract_placeholders(original);
        let mut loc_placeholders = Self::extract_placeholders(localized);
        orig_placeholders.sort();
        loc_placeholders.sort();
        if orig_placeholders != loc_placeholders {
            report.errors.push(format!(
                "Placeholder mismatch: original has {:?}, localized has {:?}",
                orig_placeholders, loc_placeholders
            ));
        }

        let orig_urls = Self::extract_urls(original);
        let loc_urls = Self::extract_urls(localized);
        if orig_urls.iter().any(|url| !loc_urls.contains(url)) {
            report.warnings.push(format!(
                "URL mismatch: original has {} URLs, localized has {} URLs",
                orig_urls.len(),
                loc_urls.len()
            ));
        }

        let orig_tags = Self::extract_html_tags(original).len();
        let loc_tags = Self::extract_html_tags(localized).len();
        if orig_tags != loc_tags {
            report.warnings.push(format!(
                "HTML tag count mismatch: original has {}, localized has {}",
                orig_tags, loc_tags
            ));
        }

        if Self::has_preamble(localized) && !Self::has_preamble(original) {
            report
                .warnings
                .push("Localized text looks wrapped in explanatory prose".to_string());
        }

        report
    }

    /// Extract `{name}` and `{{name}}` placeholders
    fn extract_placeholders(text: &str) -> Vec<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{\{?\s*[A-Za-z0-9_.]+\s*\}\}?").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn extract_urls(text: &str) -> Vec<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r#"https?://[^\s)\]"'<>]+"#).unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn extract_html_tags(text: &str) -> Vec<String> {
        let regex = HTML_TAG_REGEX.get_or_init(|| Regex::new(r"</?[a-zA-Z][^<>]*>").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn has_preamble(text: &str) -> bool {
        let regex = PREAMBLE_REGEX.get_or_init(|| {
            Regex::new(r"(?i)^\s*(here is|here's|sure[,!]|translation:|localized text:)").unwrap()
        });
        regex.is_match(text)
    }
}
