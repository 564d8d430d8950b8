//! Configuration management for cdx.
//!
//! Settings are layered: built-in defaults, then `.cdx.yaml` in the home
//! directory, then `.cdx.yaml` in the current directory, then `CDX_*`
//! environment variables. Command-line flags override all of them.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::patterns::Language;
use crate::service::SearchOptions;

/// Name of the per-user and per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".cdx.yaml";

/// Command-line arguments for cdx.
#[derive(Parser, Debug, Clone)]
#[command(name = "cdx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fast codebase exploration CLI")]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable color output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "CDX_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Find where a symbol is defined
    Def(DefArgs),
    /// Print version information
    Version,
}

/// Arguments of `cdx def`.
#[derive(clap::Args, Debug, Clone)]
pub struct DefArgs {
    /// Symbol to look up
    pub symbol: String,

    /// Force language (go, ts, js, py, rust)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Include test files and show all results (no limit)
    #[arg(short, long)]
    pub all: bool,

    /// Lines of context around each definition
    #[arg(short = 'C', long = "context")]
    pub context: Option<usize>,

    /// Directory to search (defaults to the current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Search timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl DefArgs {
    /// Search options from these flags, falling back to `config`.
    pub fn search_options(&self, config: &Config) -> SearchOptions {
        let root = self.dir.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });

        SearchOptions {
            language: self.lang.as_deref().map(Language::from_hint),
            context_lines: self.context.unwrap_or(config.context_lines),
            include_tests: self.all,
            root,
            max_results: if self.all { 0 } else { config.max_results },
            max_file_size: config.max_file_size,
        }
    }

    pub fn timeout(&self, config: &Config) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(config.timeout_secs))
    }
}

/// How results are rendered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human when stdout is a terminal, plain otherwise
    #[default]
    Auto,
    Human,
    Json,
    Plain,
}

/// cdx configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output format
    pub output_format: OutputFormat,
    /// Context lines shown around each definition
    pub context_lines: usize,
    /// Force color on or off; unset means auto-detect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
    /// Result limit (0 = unlimited)
    pub max_results: usize,
    /// Search timeout in seconds
    pub timeout_secs: u64,
    /// Files larger than this (bytes) are not scanned
    pub max_file_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Auto,
            context_lines: 2,
            color: None,
            max_results: 10,
            timeout_secs: 30,
            max_file_size: crate::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// One configuration file; absent keys leave the current value alone.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    output_format: Option<OutputFormat>,
    context_lines: Option<usize>,
    color: Option<bool>,
    max_results: Option<usize>,
    timeout_secs: Option<u64>,
    max_file_size: Option<u64>,
}

impl Config {
    /// Load from the user's home directory, the current directory and the environment.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir();
        let cwd = std::env::current_dir().ok();
        let mut config = Self::load_from(home.as_deref(), cwd.as_deref())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults overlaid with `.cdx.yaml` from `home`, then from `cwd`.
    pub fn load_from(home: Option<&Path>, cwd: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        for dir in [home, cwd].into_iter().flatten() {
            let path = dir.join(CONFIG_FILE_NAME);
            if let Some(layer) = read_layer(&path)? {
                debug!("Loaded configuration from {:?}", path);
                config.merge(layer);
            }
        }
        Ok(config)
    }

    /// Overlay `CDX_*` variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CDX_OUTPUT_FORMAT") {
            self.output_format = OutputFormat::from_str(value.trim(), true)
                .map_err(|_| invalid_env("CDX_OUTPUT_FORMAT", &value))?;
        }
        if let Some(value) = lookup("CDX_CONTEXT_LINES") {
            self.context_lines = parse_env("CDX_CONTEXT_LINES", &value)?;
        }
        if let Some(value) = lookup("CDX_COLOR") {
            self.color = Some(parse_bool("CDX_COLOR", &value)?);
        }
        if let Some(value) = lookup("CDX_MAX_RESULTS") {
            self.max_results = parse_env("CDX_MAX_RESULTS", &value)?;
        }
        if let Some(value) = lookup("CDX_TIMEOUT_SECS") {
            self.timeout_secs = parse_env("CDX_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("CDX_MAX_FILE_SIZE") {
            self.max_file_size = parse_env("CDX_MAX_FILE_SIZE", &value)?;
        }
        Ok(())
    }

    /// Apply the global command-line flags.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(format) = cli.output {
            self.output_format = format;
        }
        if cli.no_color {
            self.color = Some(false);
        }
    }

    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.output_format {
            self.output_format = v;
        }
        if let Some(v) = layer.context_lines {
            self.context_lines = v;
        }
        if let Some(v) = layer.color {
            self.color = Some(v);
        }
        if let Some(v) = layer.max_results {
            self.max_results = v;
        }
        if let Some(v) = layer.timeout_secs {
            self.timeout_secs = v;
        }
        if let Some(v) = layer.max_file_size {
            self.max_file_size = v;
        }
    }
}

/// The user's cdx configuration directory (`~/.config/cdx`).
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".config").join("cdx"))
        .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

fn invalid_env(key: &str, value: &str) -> Error {
    Error::Config(format!("invalid value for {}: {:?}", key, value))
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid_env(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_env(key, value)),
    }
}
