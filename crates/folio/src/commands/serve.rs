//! Production server command.

use anyhow::Result;
use folio_server::{BlogServer, ServerConfig};

use crate::config::ConfigFile;

/// Run the blog server.
pub async fn run(config: ConfigFile, port: Option<u16>, prerender: bool) -> Result<()> {
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: port.unwrap_or(config.server.port),
        revalidate: config.revalidate(),
        prerender: prerender && config.server.prerender,
        watch: false,
        open: false,
    };

    tracing::info!(
        "Starting blog server on port {} serving {}",
        server_config.port,
        config.content.dir
    );

    BlogServer::new(config.site(), server_config).start().await?;

    Ok(())
}
