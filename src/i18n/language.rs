//! Language metadata types.
//!
//! A `LanguageDescriptor` is pure data: identifiers, display names, text
//! direction, a family tag used only to group provider preferences, and the
//! preferred provider for the language.

use crate::providers::ProviderId;
use serde::Serialize;
use std::fmt;

/// Text direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form classification used for provider-preference grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageFamily {
    Cjk,
    Rtl,
    European,
    Slavic,
    SouthAsian,
    SoutheastAsian,
}

impl LanguageFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageFamily::Cjk => "cjk",
            LanguageFamily::Rtl => "rtl",
            LanguageFamily::European => "european",
            LanguageFamily::Slavic => "slavic",
            LanguageFamily::SouthAsian => "south-asian",
            LanguageFamily::SoutheastAsian => "southeast-asian",
        }
    }
}

impl fmt::Display for LanguageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable metadata for one supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageDescriptor {
    /// Short language identifier (e.g., "ar", "zh", "fil")
    pub code: &'static str,

    /// English display name (e.g., "Arabic")
    pub name: &'static str,

    /// Name of the language in itself (e.g., "العربية")
    pub native_name: &'static str,

    pub direction: Direction,

    pub family: LanguageFamily,

    /// Provider tried first when localizing into this language
    pub preferred_provider: ProviderId,
}

impl LanguageDescriptor {
    /// Check if this language is written right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.direction == Direction::Rtl
    }
}

impl fmt::Display for LanguageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.native_name, self.code)
    }
}
