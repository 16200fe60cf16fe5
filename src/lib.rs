//! Content localization: a canonical content tree is localized into many
//! languages through AI providers with ordered fallback, published as a
//! per-language store, and resolved at runtime by dotted key path.

pub mod chunker;
pub mod config;
pub mod content;
pub mod error;
pub mod i18n;
pub mod orchestrator;
pub mod pacing;
pub mod pipeline;
pub mod providers;
pub mod resolver;
pub mod store;
pub mod walker;
