//! Diagnostics output for drivers built on kres.
//!
//! `KRES_LOG` holds `EnvFilter` directives and falls back to `RUST_LOG`;
//! with neither set no subscriber is installed. `KRES_LOG_FORMAT` picks
//! the output:
//!
//! - `text` (default): compact one-line events
//! - `tree`: `tracing-tree` output indented by span, which follows session
//!   construction steps and the stages of each candidate
//! - `json`: one object per event
//!
//! ```bash
//! KRES_LOG="kres_session=debug,kres_resolve=trace" KRES_LOG_FORMAT=tree my-driver project.json
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub const LOG_ENV: &str = "KRES_LOG";
pub const LOG_FORMAT_ENV: &str = "KRES_LOG_FORMAT";
const FALLBACK_LOG_ENV: &str = "RUST_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown values fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        match self {
            Self::Text => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
            Self::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
            Self::Tree => tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .boxed(),
        }
    }
}

/// What [`init_tracing`] installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub directives: String,
    pub format: LogFormat,
}

impl TracingConfig {
    /// `None` when logging was not asked for.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let directives = lookup(LOG_ENV).or_else(|| lookup(FALLBACK_LOG_ENV))?;
        let format = lookup(LOG_FORMAT_ENV)
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();
        Some(Self { directives, format })
    }

    /// Install as the global subscriber. Returns `false` when another
    /// subscriber was already installed; that one stays.
    pub fn install(&self) -> bool {
        let filter = EnvFilter::builder().parse_lossy(&self.directives);
        Registry::default()
            .with(self.format.layer().with_filter(filter))
            .try_init()
            .is_ok()
    }
}

/// Install the subscriber described by the environment, if any. Safe to
/// call more than once.
pub fn init_tracing() {
    if let Some(config) = TracingConfig::from_env() {
        config.install();
    }
}

#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tests;
