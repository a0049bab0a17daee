//! Configuration file parsing for the web application.
//!
//! Loads settings from a TOML file: bind address, data file locations,
//! session cookie policy, user credentials, report retention and the PDF
//! program.

use raices_domain::SelectionMode;
use raices_report::{PdfCommandConfig, DEFAULT_AFFIRMATIONS};
use raices_store::RetentionConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8501)
    pub bind_port: u16,

    /// Relationship dataset (JSON)
    pub dataset_path: PathBuf,

    /// Optional taxonomy override (TOML)
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,

    /// Proposal log (JSON-Lines)
    #[serde(default = "default_proposals_path")]
    pub proposals_path: PathBuf,

    /// Directory receiving exported reports
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Optional report template; the built-in one is used otherwise
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    /// How focus edges are emitted for diagrams
    #[serde(default)]
    pub selection_mode: SelectionMode,

    /// Affirmations printed in every report
    #[serde(default = "default_affirmations")]
    pub affirmations: Vec<String>,

    /// Session cookie policy
    pub cookie: CookieConfig,

    /// Known users
    pub credentials: CredentialsConfig,

    /// Report retention
    #[serde(default)]
    pub retention: RetentionConfig,

    /// External PDF program
    #[serde(default)]
    pub pdf: PdfCommandConfig,
}

/// Session cookie policy
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Cookie name
    pub name: String,

    /// Secret used to sign session tokens
    pub key: String,

    /// Session lifetime in days
    #[serde(default = "default_expiry_days")]
    pub expiry_days: u64,
}

/// Credentials table: `[credentials.usernames.<user>]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    /// Users keyed by login name
    #[serde(default)]
    pub usernames: HashMap<String, UserConfig>,
}

/// One user
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Display name
    pub name: String,

    /// Argon2 PHC-format password hash
    pub password: String,

    /// Contact address
    #[serde(default)]
    pub email: Option<String>,
}

fn default_proposals_path() -> PathBuf {
    PathBuf::from("data/propuestas.jsonl")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_expiry_days() -> u64 {
    30
}

fn default_affirmations() -> Vec<String> {
    DEFAULT_AFFIRMATIONS.iter().map(|s| s.to_string()).collect()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie.key.is_empty() {
            return Err(ConfigError::MissingField("cookie.key".to_string()));
        }
        if self.cookie.name.is_empty() {
            return Err(ConfigError::MissingField("cookie.name".to_string()));
        }
        if self.dataset_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("dataset_path".to_string()));
        }
        if self.credentials.usernames.is_empty() {
            return Err(ConfigError::Invalid("no users configured".to_string()));
        }
        if self.cookie.expiry_days == 0 {
            return Err(ConfigError::Invalid("cookie.expiry_days must be positive".to_string()));
        }
        Ok(())
    }

    /// Create a default configuration for testing
    ///
    /// The single user `ana` has the given password hash.
    pub fn default_test_config(password_hash: &str) -> Self {
        let mut usernames = HashMap::new();
        usernames.insert(
            "ana".to_string(),
            UserConfig {
                name: "Ana".to_string(),
                password: password_hash.to_string(),
                email: None,
            },
        );

        AppConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8501,
            dataset_path: PathBuf::from("conexiones.json"),
            taxonomy_path: None,
            proposals_path: default_proposals_path(),
            reports_dir: default_reports_dir(),
            template_path: None,
            selection_mode: SelectionMode::default(),
            affirmations: default_affirmations(),
            cookie: CookieConfig {
                name: "raices_session".to_string(),
                key: "test-secret-key-do-not-use-in-production".to_string(),
                expiry_days: default_expiry_days(),
            },
            credentials: CredentialsConfig { usernames },
            retention: RetentionConfig::default(),
            pdf: PdfCommandConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Session lifetime in seconds
    pub fn session_expiry_secs(&self) -> u64 {
        self.cookie.expiry_days * 86_400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        bind_address = "0.0.0.0"
        bind_port = 9000
        dataset_path = "conexiones.json"

        [cookie]
        name = "raices"
        key = "my-secret"

        [credentials.usernames.ana]
        name = "Ana"
        password = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"
    "#;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default_test_config("hash");
        assert_eq!(config.bind_addr(), "127.0.0.1:8501");
        assert_eq!(config.cookie.expiry_days, 30);
        assert_eq!(config.session_expiry_secs(), 30 * 86_400);
        assert_eq!(config.credentials.usernames["ana"].name, "Ana");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.cookie.expiry_days, 30);
        assert_eq!(config.proposals_path, PathBuf::from("data/propuestas.jsonl"));
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.selection_mode, SelectionMode::Deduplicated);
        assert_eq!(config.affirmations.len(), 3);
        assert_eq!(config.retention, RetentionConfig::default());
        assert_eq!(config.pdf.command, "weasyprint");
        assert!(config.taxonomy_path.is_none());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            dataset_path = "conexiones.json"
            taxonomy_path = "config/taxonomy.toml"
            selection_mode = "mirrored"

            [cookie]
            name = "raices"
            key = "my-secret"
            expiry_days = 7

            [credentials.usernames.ana]
            name = "Ana"
            password = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"
            email = "ana@example.org"

            [retention]
            max_age_hours = 48
            dry_run = true

            [pdf]
            command = "wkhtmltopdf"
            args = ["-", "{output}"]
        "#;

        let config = AppConfig::from_toml(toml).unwrap();
        assert_eq!(config.selection_mode, SelectionMode::Mirrored);
        assert_eq!(config.taxonomy_path, Some(PathBuf::from("config/taxonomy.toml")));
        assert_eq!(config.cookie.expiry_days, 7);
        assert_eq!(
            config.credentials.usernames["ana"].email.as_deref(),
            Some("ana@example.org")
        );
        assert_eq!(config.retention.max_age_hours, 48);
        assert_eq!(config.retention.max_reports, 500);
        assert!(config.retention.dry_run);
        assert_eq!(config.pdf.command, "wkhtmltopdf");
        assert_eq!(config.pdf.args, vec!["-", "{output}"]);
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let toml = MINIMAL.replace("key = \"my-secret\"", "key = \"my-secret\"\nexpiry_days = 0");
        let result = AppConfig::from_toml(&toml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_cookie_key_rejected() {
        let toml = MINIMAL.replace("key = \"my-secret\"", "key = \"\"");
        let result = AppConfig::from_toml(&toml);
        assert!(matches!(result, Err(ConfigError::MissingField(f)) if f == "cookie.key"));
    }

    #[test]
    fn test_no_users_rejected() {
        let toml = MINIMAL
            .split("[credentials.usernames.ana]")
            .next()
            .unwrap()
            .to_string();
        let result = AppConfig::from_toml(&toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file("/nonexistent/raices.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
