//! Daemon entry point for the InfraNodus MCP server.
//!
//! Loads configuration from CLI arguments and the environment, builds one
//! gateway shared by every surface, and serves MCP over stdio and/or
//! streamable HTTP alongside the optional REST/SSE surface.

mod config;

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use infranodus_core::{GraphGateway, InfraNodusClient, StreamRegistry};
use infranodus_http::AppState;
use infranodus_mcp::server::{serve_stdio, serve_streamable_http};
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::DaemonConfig;

type SurfaceResult = (&'static str, Result<(), Box<dyn Error + Send + Sync>>);

const DEFAULT_LOG_FILTER: &str = "infranodus=info";

fn init_tracing() {
    // Stdout carries MCP frames when stdio is enabled.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match DaemonConfig::from_args() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "configuration error");
            return ExitCode::FAILURE;
        }
    };

    let gateway: Arc<dyn GraphGateway> = match InfraNodusClient::new(config.api.clone()) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!(error = %err, "failed to build InfraNodus client");
            return ExitCode::FAILURE;
        }
    };
    let streams = StreamRegistry::new();
    info!(api_base = %config.api.api_base, "starting infranodus-mcpd");

    let mut surfaces = spawn_surfaces(&config, &gateway, &streams);

    tokio::select! {
        finished = surfaces.join_next() => match finished {
            Some(Ok((name, Ok(())))) => {
                info!(surface = name, "surface stopped");
                ExitCode::SUCCESS
            }
            Some(Ok((name, Err(err)))) => {
                error!(surface = name, error = %err, "surface failed");
                ExitCode::FAILURE
            }
            Some(Err(err)) => {
                error!(error = %err, "surface task panicked");
                ExitCode::FAILURE
            }
            None => ExitCode::SUCCESS,
        },
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            ExitCode::SUCCESS
        }
    }
}

fn spawn_surfaces(
    config: &DaemonConfig,
    gateway: &Arc<dyn GraphGateway>,
    streams: &StreamRegistry,
) -> JoinSet<SurfaceResult> {
    let mut surfaces = JoinSet::new();

    if config.enable_stdio {
        let (gateway, streams) = (Arc::clone(gateway), streams.clone());
        surfaces.spawn(async move { ("mcp-stdio", serve_stdio(gateway, streams).await) });
    }

    if config.mcp_serve {
        let (gateway, streams) = (Arc::clone(gateway), streams.clone());
        let mcp_config = config.mcp_http.clone();
        surfaces.spawn(async move {
            (
                "mcp-http",
                serve_streamable_http(gateway, streams, mcp_config).await,
            )
        });
    }

    if config.http_serve {
        let state = AppState::new(Arc::clone(gateway), streams.clone());
        let addr = config.http_addr;
        surfaces.spawn(async move { ("rest-sse", infranodus_http::serve(state, addr).await) });
    }

    surfaces
}
