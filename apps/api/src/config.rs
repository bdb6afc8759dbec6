use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::jobs::assembler::SelectionMode;

pub const DEFAULT_UPSTREAM_URL: &str = "https://remoteok.com/api";
pub const DEFAULT_USER_AGENT: &str = "jobbot/1.0";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_STATE_FILE: &str = "job_state.json";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_url: String,
    pub user_agent: String,
    pub upstream_timeout: Duration,
    pub state_backend: StateBackend,
    pub selection: SelectionMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            upstream_url: env_or("REMOTEOK_API_URL", DEFAULT_UPSTREAM_URL),
            user_agent: env_or("UPSTREAM_USER_AGENT", DEFAULT_USER_AGENT),
            upstream_timeout: Duration::from_secs(
                env_or("UPSTREAM_TIMEOUT_SECS", &DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())
                    .parse::<u64>()
                    .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            state_backend: StateBackend::from_setting(&env_or("JOB_STATE_FILE", DEFAULT_STATE_FILE)),
            selection: env_or("JOB_SELECTION", "scan-order")
                .parse::<SelectionMode>()
                .context("JOB_SELECTION is invalid")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            state_backend: StateBackend::File(PathBuf::from(DEFAULT_STATE_FILE)),
            selection: SelectionMode::default(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

/// Where saved/applied state lives. `JOB_STATE_FILE=:memory:` keeps it in process memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateBackend {
    File(PathBuf),
    Memory,
}

impl StateBackend {
    fn from_setting(value: &str) -> Self {
        match value.trim() {
            ":memory:" => StateBackend::Memory,
            path => StateBackend::File(PathBuf::from(path)),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scan-order" | "scan_order" => Ok(SelectionMode::ScanOrder),
            "top-scored" | "top_scored" => Ok(SelectionMode::TopScored),
            other => bail!("unknown selection mode '{other}' (expected 'scan-order' or 'top-scored')"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
