//! Resolve a key path against a published store.
//!
//! Usage:
//!   cargo run --bin resolve -- home.hero.title          # every stored language
//!   cargo run --bin resolve -- home.hero.title ar fr    # selected languages
//!
//! Optional:
//! - STORE_DIR (defaults to content/i18n)

use anyhow::{Context, Result};
use content_localizer::resolver::Resolver;
use content_localizer::store::LocalizedStore;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_localizer=warn".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("Usage: resolve <key.path> [lang...]")?;
    let requested: Vec<String> = args.collect();

    let store_dir: PathBuf = std::env::var("STORE_DIR")
        .unwrap_or_else(|_| "content/i18n".to_string())
        .into();

    // A store that fails to load must never be served from
    let store = LocalizedStore::load(&store_dir)
        .with_context(|| format!("Failed to load store from {}", store_dir.display()))?;
    let resolver = Resolver::new(Arc::new(store));

    let languages: Vec<String> = if requested.is_empty() {
        resolver
            .store()
            .languages()
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        requested
    };

    for lang in &languages {
        let marker = if resolver.is_rtl(lang) { " (rtl)" } else { "" };
        println!("{}{}: {}", lang, marker, resolver.resolve(&path, lang));
    }

    Ok(())
}
