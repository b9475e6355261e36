use clap::{Parser, builder::BoolishValueParser};
use infranodus_core::ApiConfig;
use infranodus_core::config::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use infranodus_mcp::server::McpHttpServerConfig;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MCP_SSE_KEEP_ALIVE_SECS: u64 = 15;
const DEFAULT_MCP_SSE_RETRY_SECS: u64 = 3;

#[derive(Parser, Debug)]
#[command(name = "infranodus-mcpd", version, about = "InfraNodus MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "INFRANODUS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "INFRANODUS_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[arg(
        long,
        env = "INFRANODUS_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs()
    )]
    timeout_secs: u64,

    #[arg(
        long = "stdio",
        env = "INFRANODUS_ENABLE_STDIO",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "INFRANODUS_MCP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "INFRANODUS_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "INFRANODUS_MCP_STATEFUL",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_stateful: bool,

    /// Seconds between SSE keep-alive frames on `/mcp`; 0 disables them.
    #[arg(
        long,
        env = "INFRANODUS_MCP_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_MCP_SSE_KEEP_ALIVE_SECS
    )]
    mcp_sse_keep_alive_secs: u64,

    /// SSE reconnect delay advertised to clients on `/mcp`; 0 omits it.
    #[arg(
        long,
        env = "INFRANODUS_MCP_SSE_RETRY_SECS",
        default_value_t = DEFAULT_MCP_SSE_RETRY_SECS
    )]
    mcp_sse_retry_secs: u64,

    #[arg(
        long,
        env = "INFRANODUS_HTTP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    http_serve: bool,

    #[arg(long, env = "INFRANODUS_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub api: ApiConfig,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http: McpHttpServerConfig,
    pub http_serve: bool,
    pub http_addr: SocketAddr,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl DaemonConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for DaemonConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let api_key = args
            .api_key
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingSetting("INFRANODUS_API_KEY"))?;

        let api_base = args.api_base.trim();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidSetting {
                name: "INFRANODUS_API_BASE",
                value: args.api_base,
            });
        }

        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "INFRANODUS_TIMEOUT_SECS",
                value: args.timeout_secs.to_string(),
            });
        }

        if !(args.enable_stdio || args.mcp_serve || args.http_serve) {
            return Err(ConfigError::InvalidSetting {
                name: "INFRANODUS_ENABLE_STDIO",
                value: "false (no MCP or HTTP surface enabled either)".to_string(),
            });
        }

        let mcp_http = McpHttpServerConfig::new(args.mcp_http_addr)
            .with_stateful_mode(args.mcp_stateful)
            .with_sse_keep_alive(seconds(args.mcp_sse_keep_alive_secs))
            .with_sse_retry(seconds(args.mcp_sse_retry_secs));

        let api = ApiConfig::new(api_key)
            .with_api_base(api_base)
            .with_request_timeout(Duration::from_secs(args.timeout_secs));

        Ok(Self {
            api,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http,
            http_serve: args.http_serve,
            http_addr: args.http_addr,
        })
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then_some(Duration::from_secs(secs))
}
