use anyhow::{bail, Context, Result};
use content_localizer::config::Config;
use content_localizer::content::ContentMap;
use content_localizer::i18n::LocalizationMetrics;
use content_localizer::orchestrator::Orchestrator;
use content_localizer::pipeline::LocalizationPipeline;
use content_localizer::providers::ProviderSet;
use content_localizer::store::StoreWriter;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in CI)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_localizer=info".parse()?),
        )
        .init();

    info!("Starting content localization run");

    let config = Config::from_env()?;

    let configured = config.require_providers()?;
    info!(
        "Configured providers: {}",
        configured
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Step 1: Read the canonical tree
    let raw = std::fs::read_to_string(&config.canonical_content).with_context(|| {
        format!(
            "Failed to read canonical content {}",
            config.canonical_content.display()
        )
    })?;
    let canonical: ContentMap = serde_json::from_str(&raw).with_context(|| {
        format!(
            "Canonical content {} is not a JSON object",
            config.canonical_content.display()
        )
    })?;
    info!("Loaded {} top-level keys from canonical content", canonical.len());

    // Step 2: Localize
    let orchestrator = Orchestrator::new(
        ProviderSet::from_config(&config)?,
        config.fallback_chains.clone(),
        Arc::new(LocalizationMetrics::new()),
    );
    let pipeline = LocalizationPipeline::from_config(Arc::new(orchestrator), &config);
    let targets = config
        .target_languages
        .clone()
        .unwrap_or_else(|| pipeline.default_targets());

    let (store, report) = pipeline.run(&canonical, &targets).await;

    // Step 3: Publish
    let manifest = StoreWriter::publish(&store, &config.store_dir)
        .with_context(|| format!("Failed to publish store to {}", config.store_dir.display()))?;

    info!(
        "Run complete: {} localized, {} aliased, {} skipped",
        report.completed.len(),
        report.aliased.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        warn!("Skipped {}: {}", skipped.code, skipped.reason);
    }
    info!(
        "Provider attempts: {}, success rate: {:.1}%, fallbacks: {}, exhausted: {}",
        report.metrics.provider_attempts,
        report.metrics.provider_success_rate,
        report.metrics.fallbacks_used,
        report.metrics.exhausted
    );
    info!(
        "Manifest written at {} with {} documents",
        manifest.generated_at,
        manifest.documents.len()
    );

    if report.produced_nothing() && !targets.is_empty() {
        bail!("No language could be produced");
    }

    Ok(())
}
