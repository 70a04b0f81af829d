//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::infra::{remote::DEFAULT_REMOTE_BASE_URL, slot::DEFAULT_SLOT_KEY};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blogdeck";
const ENV_PREFIX: &str = "BLOGDECK";
const DEFAULT_STORAGE_DIR: &str = ".blogdeck";

/// Command-line arguments for the blogdeck binary.
#[derive(Debug, Parser)]
#[command(name = "blogdeck", version, about = "Blog post store")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BLOGDECK_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub enum Command {
    /// List posts, newest first, optionally filtered by a search term.
    List {
        /// Case-insensitive text matched against titles and bodies.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single post.
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Create a post.
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Edit a post; omitted fields keep their current value.
    Edit {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Delete a post.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::List { search: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Local,
    Remote,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CliOverrides {
    /// Override the storage backend.
    #[arg(long = "backend", value_enum, value_name = "KIND", global = true)]
    pub backend: Option<BackendKind>,

    /// Override the directory holding the local slot.
    #[arg(long = "storage-directory", value_name = "PATH", global = true)]
    pub storage_directory: Option<PathBuf>,

    /// Override the local slot key.
    #[arg(long = "storage-key", value_name = "KEY", global = true)]
    pub storage_key: Option<String>,

    /// Override the REST base URL.
    #[arg(long = "remote-base-url", value_name = "URL", global = true)]
    pub remote_base_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Local { directory: PathBuf, key: String },
    Remote { base_url: Url },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    storage: RawStorageSettings,
    remote: RawRemoteSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(backend) = overrides.backend {
            self.storage.backend = Some(backend);
        }
        if let Some(directory) = overrides.storage_directory.as_ref() {
            self.storage.directory = Some(directory.clone());
        }
        if let Some(key) = overrides.storage_key.as_ref() {
            self.storage.key = Some(key.clone());
        }
        if let Some(url) = overrides.remote_base_url.as_ref() {
            self.remote.base_url = Some(url.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            storage,
            remote,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let storage = build_storage_settings(storage, remote)?;

        Ok(Self { logging, storage })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_storage_settings(
    storage: RawStorageSettings,
    remote: RawRemoteSettings,
) -> Result<StorageSettings, LoadError> {
    let backend = match storage.backend.unwrap_or(BackendKind::Local) {
        BackendKind::Local => {
            let directory = storage
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
            if directory.as_os_str().is_empty() {
                return Err(LoadError::invalid(
                    "storage.directory",
                    "path must not be empty",
                ));
            }

            let key = storage
                .key
                .map(|value| value.trim().to_string())
                .unwrap_or_else(|| DEFAULT_SLOT_KEY.to_string());
            validate_slot_key(&key)?;

            StorageBackend::Local { directory, key }
        }
        BackendKind::Remote => {
            let candidate = remote
                .base_url
                .unwrap_or_else(|| DEFAULT_REMOTE_BASE_URL.to_string());
            let base_url = Url::parse(candidate.trim()).map_err(|err| {
                LoadError::invalid("remote.base_url", format!("invalid URL `{candidate}`: {err}"))
            })?;
            if !matches!(base_url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "remote.base_url",
                    "scheme must be http or https",
                ));
            }

            StorageBackend::Remote { base_url }
        }
    };

    Ok(StorageSettings { backend })
}

fn validate_slot_key(key: &str) -> Result<(), LoadError> {
    if key.is_empty() {
        return Err(LoadError::invalid("storage.key", "must not be empty"));
    }
    if key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(LoadError::invalid(
            "storage.key",
            "must not contain path separators",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    backend: Option<BackendKind>,
    directory: Option<PathBuf>,
    key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRemoteSettings {
    base_url: Option<String>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
