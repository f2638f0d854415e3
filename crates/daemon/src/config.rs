//! Daemon configuration, read once from the environment at startup

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use waitline_api_rpc::server::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};

const DEFAULT_DB_PATH: &str = "~/.waitline/queue.db";

/// Console log rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("Unknown log format '{}' (expected 'pretty' or 'json')", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: PathBuf,
    pub rpc_host: String,
    pub rpc_port: u16,
    /// External ids promoted to staff when they register
    pub staff_ids: Vec<i64>,
    pub log_format: LogFormat,
    /// Daily rolling log files are written here when set
    pub log_dir: Option<PathBuf>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = expand(&get("WAITLINE_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()));

        let rpc_host = get("WAITLINE_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string());

        let rpc_port = match get("WAITLINE_RPC_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("WAITLINE_RPC_PORT is not a valid port: {}", raw))?,
            None => DEFAULT_RPC_PORT,
        };

        let staff_ids = match get("WAITLINE_STAFF_IDS") {
            Some(raw) => parse_staff_ids(&raw)?,
            None => Vec::new(),
        };

        let log_format = match get("WAITLINE_LOG_FORMAT") {
            Some(raw) => raw.trim().parse()?,
            None => LogFormat::Pretty,
        };

        let log_dir = get("WAITLINE_LOG_DIR").map(|raw| expand(&raw));

        Ok(Self {
            db_path,
            rpc_host,
            rpc_port,
            staff_ids,
            log_format,
            log_dir,
        })
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).into_owned())
}

fn parse_staff_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("WAITLINE_STAFF_IDS contains an invalid id: {}", s))
        })
        .collect()
}
