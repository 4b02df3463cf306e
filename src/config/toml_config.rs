use crate::utils::error::{Result, TriageError};
use crate::utils::logger::LogFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// On-disk service configuration. Every section and key is optional;
/// unset values fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub model: Option<ModelSection>,
    pub history: Option<HistorySection>,
    pub cors: Option<CorsSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSection {
    pub dir: Option<String>,
    pub model_file: Option<String>,
    pub vectorizer_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySection {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub table: Option<String>,
    pub schema: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsSection {
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub format: Option<LogFormat>,
}

impl TomlConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TriageError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TriageError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` references with environment values; unknown variables are left as written.
    /// See [`is_unresolved`].
    fn substitute_env_vars(content: &str) -> String {
        ENV_REFERENCE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

/// True when `value` still carries a `${VAR}` reference whose variable was not set.
pub fn is_unresolved(value: &str) -> bool {
    ENV_REFERENCE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 9000

[model]
dir = "/srv/models"
model_file = "svc.json"

[history]
url = "https://abc.supabase.co"
service_key = "secret"
table = "ticket_history"
timeout_seconds = 3

[cors]
allowed_origins = ["https://app.example.com"]

[logging]
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(9000));
        let model = config.model.unwrap();
        assert_eq!(model.dir.as_deref(), Some("/srv/models"));
        assert_eq!(model.vectorizer_file, None);
        let history = config.history.unwrap();
        assert_eq!(history.table.as_deref(), Some("ticket_history"));
        assert_eq!(history.schema, None);
        assert_eq!(config.logging.unwrap().format, Some(LogFormat::Json));
    }

    #[test]
    fn test_empty_config() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.server.is_none());
        assert!(config.history.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TICKET_TRIAGE_TEST_SUPABASE_KEY", "from-env");

        let toml_content = r#"
[history]
url = "https://abc.supabase.co"
service_key = "${TICKET_TRIAGE_TEST_SUPABASE_KEY}"
table = "${TICKET_TRIAGE_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let history = config.history.unwrap();
        assert_eq!(history.service_key.as_deref(), Some("from-env"));
        assert_eq!(
            history.table.as_deref(),
            Some("${TICKET_TRIAGE_TEST_UNSET_VAR}")
        );

        std::env::remove_var("TICKET_TRIAGE_TEST_SUPABASE_KEY");
    }

    #[test]
    fn test_is_unresolved() {
        assert!(is_unresolved("${SUPABASE_SERVICE_KEY}"));
        assert!(is_unresolved("https://${PROJECT}.supabase.co"));
        assert!(!is_unresolved("https://abc.supabase.co"));
        assert!(!is_unresolved("$HOME"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = TomlConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, TriageError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 8081\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.unwrap().port, Some(8081));
    }
}
