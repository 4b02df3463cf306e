pub mod env;
pub mod toml_config;

use crate::core::classifier::{MODEL_FILE, VECTORIZER_FILE};
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use self::env::EnvOverrides;
use self::toml_config::{is_unresolved, TomlConfig};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "ticket-triage")]
#[command(about = "Support ticket category prediction service")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long, help = "Directory holding the model and vectorizer artifacts")]
    pub model_dir: Option<String>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub dir: String,
    pub model_file: String,
    pub vectorizer_file: String,
}

#[derive(Clone, PartialEq)]
pub struct HistorySettings {
    pub url: String,
    /// Service-role key; bypasses row-level security, never logged.
    pub service_key: String,
    pub table: String,
    pub schema: String,
    pub timeout_seconds: u64,
}

const REDACTED: &str = "[REDACTED]";

impl fmt::Debug for HistorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistorySettings")
            .field("url", &self.url)
            .field("service_key", &REDACTED)
            .field("table", &self.table)
            .field("schema", &self.schema)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// A file value counts only when it is non-blank and every `${VAR}` in it resolved.
fn file_value(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty() && !is_unresolved(value))
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse a comma-separated list; `*` means any origin.
    pub fn parse(value: &str) -> Self {
        if value.trim() == "*" {
            return Self::Any;
        }
        Self::from_list(value.split(','))
    }

    fn from_list<'a>(origins: impl IntoIterator<Item = &'a str>) -> Self {
        let origins: Vec<String> = origins
            .into_iter()
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        if origins.iter().any(|origin| origin == "*") {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub model: ModelSettings,
    /// `None` when no database URL/key pair is configured.
    pub history: Option<HistorySettings>,
    pub allowed_origins: AllowedOrigins,
    pub log_format: LogFormat,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            model: ModelSettings {
                dir: "models".to_string(),
                model_file: MODEL_FILE.to_string(),
                vectorizer_file: VECTORIZER_FILE.to_string(),
            },
            history: None,
            allowed_origins: AllowedOrigins::Any,
            log_format: LogFormat::Compact,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file named by `--config`, then the environment, then flags.
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        Ok(Self::resolve(file, EnvOverrides::from_env(), cli))
    }

    pub fn resolve(file: TomlConfig, env: EnvOverrides, cli: &CliConfig) -> Self {
        let mut config = Self::default();

        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
        }

        if let Some(model) = file.model {
            if let Some(dir) = model.dir {
                config.model.dir = dir;
            }
            if let Some(model_file) = model.model_file {
                config.model.model_file = model_file;
            }
            if let Some(vectorizer_file) = model.vectorizer_file {
                config.model.vectorizer_file = vectorizer_file;
            }
        }

        let history = file.history.unwrap_or_default();
        let url = env.supabase_url.or(file_value(history.url));
        let service_key = env.supabase_service_key.or(file_value(history.service_key));
        config.history = match (url, service_key) {
            (Some(url), Some(service_key)) => Some(HistorySettings {
                url,
                service_key,
                table: file_value(history.table).unwrap_or_else(|| "history".to_string()),
                schema: file_value(history.schema).unwrap_or_else(|| "public".to_string()),
                timeout_seconds: history.timeout_seconds.unwrap_or(10),
            }),
            _ => None,
        };

        config.allowed_origins = match env.allowed_origins {
            Some(value) => AllowedOrigins::parse(&value),
            None => match file.cors.and_then(|cors| cors.allowed_origins) {
                Some(origins) => AllowedOrigins::from_list(origins.iter().map(String::as_str)),
                None => AllowedOrigins::Any,
            },
        };

        if let Some(format) = file.logging.and_then(|logging| logging.format) {
            config.log_format = format;
        }

        if let Some(host) = &cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(dir) = &cli.model_dir {
            config.model.dir = dir.clone();
        }
        if let Some(format) = cli.log_format {
            config.log_format = format;
        }
        config.verbose = cli.verbose;

        config
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validate_path("model.dir", &self.model.dir)?;
        validate_path("model.model_file", &self.model.model_file)?;
        validate_path("model.vectorizer_file", &self.model.vectorizer_file)?;
        Ok(())
    }
}

impl Validate for HistorySettings {
    fn validate(&self) -> Result<()> {
        validate_url("history.url", &self.url)?;
        validate_non_empty_string("history.service_key", &self.service_key)?;
        validate_non_empty_string("history.table", &self.table)?;
        validate_non_empty_string("history.schema", &self.schema)?;
        validate_range("history.timeout_seconds", self.timeout_seconds, 1, 300)?;
        Ok(())
    }
}
