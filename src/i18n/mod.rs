//! Language metadata, run metrics and output validation.
//!
//! # Architecture
//!
//! - `language`: `LanguageDescriptor` and its direction/family tags
//! - `registry`: Single source of truth for all supported languages
//! - `validator`: Checks provider output keeps placeholders, URLs and markup
//! - `metrics`: Per-run localization counters
//!
//! # Example
//!
//! ```rust,ignore
//! use content_localizer::i18n::LanguageRegistry;
//!
//! let registry = LanguageRegistry::get();
//! let arabic = registry.describe("ar")?;
//! assert!(arabic.is_rtl());
//! ```

mod language;
mod metrics;
mod registry;
mod validator;

pub use language::{Direction, LanguageDescriptor, LanguageFamily};
pub use metrics::{LocalizationMetrics, MetricsReport};
pub use registry::LanguageRegistry;
pub use validator::{LeafValidator, ValidationReport};
