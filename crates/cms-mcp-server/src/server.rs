use crate::errors::ServerError;
use crate::server_handler::CmsMcpServerHandler;
use bon::bon;
use cms_schema_discovery::service::ContentService;
use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::{StreamableHttpService, stdio};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info, warn};

/// A CMS MCP Server
pub struct Server {
    transport: Transport,
    service: Arc<ContentService>,
}

/// How clients connect to the server
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transport {
    /// Read requests from stdin and write responses to stdout
    #[default]
    Stdio,

    /// Serve streamable HTTP at `/mcp`
    StreamableHttp {
        #[serde(default = "defaults::address")]
        address: IpAddr,

        #[serde(default = "defaults::port")]
        port: u16,
    },
}

mod defaults {
    use super::*;

    pub(super) fn address() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    pub(super) fn port() -> u16 {
        5000
    }
}

#[bon]
impl Server {
    #[builder]
    pub fn new(transport: Transport, service: Arc<ContentService>) -> Self {
        Self { transport, service }
    }
}

impl Server {
    /// Serve until the client disconnects or the process is signalled to stop.
    ///
    /// The schema is fetched up front when possible; if the endpoint is unreachable
    /// the server still starts and tools retry on first use.
    pub async fn start(self) -> Result<(), ServerError> {
        match self.service.introspector().initialize().await {
            Ok(schema) => info!(types = schema.types().count(), "Loaded content schema"),
            Err(e) => warn!(error = %e, "Could not load the content schema; it will be fetched on first use"),
        }

        let handler = CmsMcpServerHandler::new(self.service);
        match self.transport {
            Transport::StreamableHttp { address, port } => {
                serve_streamable_http(address, port, handler).await
            }
            Transport::Stdio => {
                info!("Starting MCP server in stdio mode");
                let service = handler
                    .serve(stdio())
                    .await
                    .inspect_err(|e| {
                        error!("serving error: {:?}", e);
                    })
                    .map_err(|e| ServerError::McpInitializeError(e.into()))?;
                service.waiting().await.map_err(ServerError::StartupError)?;
                Ok(())
            }
        }
    }
}

async fn serve_streamable_http(
    address: IpAddr,
    port: u16,
    handler: CmsMcpServerHandler,
) -> Result<(), ServerError> {
    info!(port = ?port, address = ?address, "Starting MCP server in Streamable HTTP mode");
    let listen_address = SocketAddr::new(address, port);
    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let tcp_listener = tokio::net::TcpListener::bind(listen_address).await?;
    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("MCP server stopped");
    Ok(())
}

#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
