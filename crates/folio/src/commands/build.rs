//! Static site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use folio_render::{BuildConfig, StaticBuilder};

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(config: ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let build_config = BuildConfig {
        output_dir: output.unwrap_or_else(|| PathBuf::from(&config.build.output)),
        minify: minify.unwrap_or(config.build.minify),
    };

    let builder = StaticBuilder::new(config.site(), build_config);

    // Rendering is synchronous and parallel
    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("Build task panicked")??;

    tracing::info!(
        "Built {} pages from {} posts in {}ms",
        result.pages,
        result.posts,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
