//! Development server command.

use std::time::Duration;

use anyhow::Result;
use folio_server::{BlogServer, ServerConfig};

use crate::config::ConfigFile;

/// Run the dev server: no caching, live reload on content changes.
pub async fn run(config: ConfigFile, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let site = config.site_with_scripts(vec![reload_script_url(&config.site.base_url)]);

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port,
        revalidate: Duration::ZERO,
        prerender: false,
        watch: true,
        open,
    };

    BlogServer::new(site, server_config).start().await?;

    Ok(())
}

fn reload_script_url(base_url: &str) -> String {
    format!("{}/__reload.js", base_url.trim_end_matches('/'))
}
