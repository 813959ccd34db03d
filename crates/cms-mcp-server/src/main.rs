use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use cms_mcp_server::graphql::GraphClient;
use cms_mcp_server::server::Server;
use cms_schema_discovery::cache::SchemaCache;
use cms_schema_discovery::service::ContentService;
use runtime::Config;
use tracing::info;

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, Parser)]
#[command(
    version,
    styles = STYLES,
    about = "CMS MCP Server - expose headless CMS content to AI agents through schema-driven GraphQL queries"
)]
struct Args {
    /// Path to the config file
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: Config = match Args::parse().config {
        Some(config_path) => runtime::read_config(config_path)?,
        None => runtime::read_config_from_env()?,
    };

    // Hold the guard so buffered file logs are flushed on exit
    let _guard = runtime::setup_logging(&config.logging)?;

    info!(
        "CMS MCP Server v{} // (c) CMS MCP Contributors // Licensed under MIT",
        std::env!("CARGO_PKG_VERSION")
    );

    let endpoint = config.endpoint.into_inner();
    info!(
        %endpoint,
        ttl = ?config.cache.ttl,
        max_fields = config.synthesis.max_fields,
        "Using content endpoint"
    );

    let client = GraphClient::builder()
        .endpoint(endpoint)
        .headers(config.headers)
        .maybe_single_key(config.single_key)
        .maybe_timeout(config.timeout)
        .build()?;
    let cache = SchemaCache::in_memory((&config.cache).into());
    let service = ContentService::new(Arc::new(client), cache, (&config.synthesis).into());

    Ok(Server::builder()
        .transport(config.transport)
        .service(Arc::new(service))
        .build()
        .start()
        .await?)
}
