use bcrp_core::client::metadata::{cache_path_in, default_cache_path};
use bcrp_core::search::{ResolutionPolicy, SimilarityMode};
use bcrp_store::schema::{API_BASE_URL, METADATA_URL};
use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 120;
const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
const DEFAULT_RESOLUTION_POLICY: &str = "strict";
const DEFAULT_SIMILARITY: &str = "fuzzy";

#[derive(Parser, Debug)]
#[command(name = "bcrp-mcpd", version, about = "BCRP statistics MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "BCRP_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[arg(long, env = "BCRP_METADATA_URL", default_value = METADATA_URL)]
    metadata_url: String,

    #[arg(long, env = "BCRP_API_BASE_URL", default_value = API_BASE_URL)]
    api_base_url: String,

    #[arg(
        long,
        env = "BCRP_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS
    )]
    http_timeout_secs: u64,

    #[arg(
        long,
        env = "BCRP_METADATA_TIMEOUT_SECS",
        default_value_t = DEFAULT_METADATA_TIMEOUT_SECS
    )]
    metadata_timeout_secs: u64,

    #[arg(
        long,
        env = "BCRP_REQUEST_DELAY_MS",
        default_value_t = DEFAULT_REQUEST_DELAY_MS
    )]
    request_delay_ms: u64,

    #[arg(
        long,
        env = "BCRP_RESOLUTION_POLICY",
        default_value = DEFAULT_RESOLUTION_POLICY
    )]
    resolution_policy: String,

    #[arg(long, env = "BCRP_SIMILARITY", default_value = DEFAULT_SIMILARITY)]
    similarity: String,

    #[arg(
        long = "stdio",
        env = "BCRP_ENABLE_STDIO",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "BCRP_MCP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "BCRP_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct BcrpConfig {
    /// `None` when no cache directory is configured and the platform has none.
    pub cache_path: Option<PathBuf>,
    pub metadata_url: String,
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub metadata_timeout: Duration,
    pub request_delay: Duration,
    pub policy: ResolutionPolicy,
    pub similarity: SimilarityMode,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
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

impl BcrpConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

fn http_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidSetting { name, value })
    }
}

fn positive_secs(name: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidSetting {
            name,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

impl TryFrom<CliArgs> for BcrpConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::MissingSetting(
                "BCRP_ENABLE_STDIO or BCRP_MCP_SERVE",
            ));
        }

        let cache_path = args
            .cache_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| cache_path_in(&dir))
            .or_else(default_cache_path);

        let policy = args.resolution_policy.parse::<ResolutionPolicy>().map_err(|_| {
            ConfigError::InvalidSetting {
                name: "BCRP_RESOLUTION_POLICY",
                value: args.resolution_policy.clone(),
            }
        })?;
        let similarity = args.similarity.parse::<SimilarityMode>().map_err(|_| {
            ConfigError::InvalidSetting {
                name: "BCRP_SIMILARITY",
                value: args.similarity.clone(),
            }
        })?;

        Ok(Self {
            cache_path,
            metadata_url: http_url("BCRP_METADATA_URL", args.metadata_url)?,
            api_base_url: http_url("BCRP_API_BASE_URL", args.api_base_url)?,
            http_timeout: positive_secs("BCRP_HTTP_TIMEOUT_SECS", args.http_timeout_secs)?,
            metadata_timeout: positive_secs(
                "BCRP_METADATA_TIMEOUT_SECS",
                args.metadata_timeout_secs,
            )?,
            request_delay: Duration::from_millis(args.request_delay_ms),
            policy,
            similarity,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
        })
    }
}
