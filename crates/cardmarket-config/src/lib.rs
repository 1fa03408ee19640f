//! Configuration management for the Cardmarket client.
//!
//! Parses `cardmarket.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `api.work_dir`
//! - `credentials.app_token`
//! - `credentials.app_secret`
//! - `credentials.access_token`
//! - `credentials.access_secret`
//!
//! Optional credential fields that expand to an empty string are treated as unset.

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cardmarket.toml";

/// Working directory used when `api.work_dir` is not set.
const DEFAULT_WORK_DIR: &str = "~/.cardmarket-request";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override API environment.
    pub environment: Option<Environment>,
    /// Override response format.
    pub response_format: Option<ResponseFormat>,
    /// Override dry-run flag.
    pub dry_run: Option<bool>,
    /// Override working directory for downloads.
    pub work_dir: Option<PathBuf>,
}

/// API host selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live API at `api.cardmarket.com`.
    #[default]
    Production,
    /// Sandbox API at `sandbox.cardmarket.com`.
    Sandbox,
}

impl Environment {
    /// Host name serving this environment.
    #[must_use]
    pub fn host(self) -> &'static str {
        match self {
            Self::Production => "api.cardmarket.com",
            Self::Sandbox => "sandbox.cardmarket.com",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Sandbox => f.write_str("sandbox"),
        }
    }
}

/// Response body format requested from the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// `output.json` endpoints, body parsed as JSON.
    #[default]
    Json,
    /// `output.xml` endpoints, body kept as raw text.
    Xml,
}

impl ResponseFormat {
    /// URL segment suffix (`json` or `xml`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration.
    pub api: ApiConfig,
    /// OAuth credentials (optional section).
    pub credentials: Option<CredentialsConfig>,

    /// Resolved absolute working directory (set after loading).
    #[serde(skip)]
    pub work_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// API configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Production or sandbox host.
    pub environment: Environment,
    /// JSON or XML responses.
    pub response_format: ResponseFormat,
    /// Sign and log requests without sending them.
    pub dry_run: bool,
    /// Working directory as written in TOML (resolved into [`Config::work_dir`]).
    work_dir: Option<String>,
}

/// OAuth credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    /// Application token (OAuth consumer key).
    pub app_token: String,
    /// Application secret (OAuth consumer secret).
    pub app_secret: String,
    /// Access token for dedicated or widget apps.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Access token secret.
    #[serde(default)]
    pub access_secret: Option<String>,
}

impl CredentialsConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.app_token, "credentials.app_token")?;
        require_non_empty(&self.app_secret, "credentials.app_secret")?;
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`credentials.app_secret`").
        field: String,
        /// Error message (e.g., "${`CARDMARKET_APP_SECRET`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cardmarket.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(environment) = settings.environment {
            self.api.environment = environment;
        }
        if let Some(response_format) = settings.response_format {
            self.api.response_format = response_format;
        }
        if let Some(dry_run) = settings.dry_run {
            self.api.dry_run = dry_run;
        }
        if let Some(work_dir) = &settings.work_dir {
            self.work_dir.clone_from(work_dir);
        }
    }

    /// Get validated credentials.
    ///
    /// Returns the credentials if the `[credentials]` section is present
    /// and all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_credentials(&self) -> Result<&CredentialsConfig, ConfigError> {
        let creds = self.credentials.as_ref().ok_or_else(|| {
            ConfigError::Validation("[credentials] section required in config".into())
        })?;
        creds.validate()?;
        Ok(creds)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            api: ApiConfig::default(),
            credentials: None,
            work_dir: resolve_work_dir(base, None),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.work_dir = resolve_work_dir(config_dir, config.api.work_dir.as_deref());
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref work_dir) = self.api.work_dir {
            self.api.work_dir = Some(expand::expand_env(work_dir, "api.work_dir")?);
        }

        if let Some(ref mut creds) = self.credentials {
            creds.app_token = expand::expand_env(&creds.app_token, "credentials.app_token")?;
            creds.app_secret = expand::expand_env(&creds.app_secret, "credentials.app_secret")?;
            creds.access_token =
                expand_optional(creds.access_token.as_deref(), "credentials.access_token")?;
            creds.access_secret =
                expand_optional(creds.access_secret.as_deref(), "credentials.access_secret")?;
        }

        Ok(())
    }
}

/// Expand an optional field, mapping an empty result to `None`.
fn expand_optional(value: Option<&str>, field: &str) -> Result<Option<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let expanded = expand::expand_env(value, field)?;
    Ok((!expanded.is_empty()).then_some(expanded))
}

/// Resolve the working directory: expand `~`, then anchor relative paths at `base`.
fn resolve_work_dir(base: &Path, raw: Option<&str>) -> PathBuf {
    let expanded = shellexpand::tilde(raw.unwrap_or(DEFAULT_WORK_DIR));
    base.join(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.api.environment, Environment::Production);
        assert_eq!(config.api.response_format, ResponseFormat::Json);
        assert!(!config.api.dry_run);
        assert!(config.credentials.is_none());
        assert!(config.work_dir.ends_with(".cardmarket-request"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.environment, Environment::Production);
        assert_eq!(config.api.response_format, ResponseFormat::Json);
    }

    #[test]
    fn test_parse_api_config() {
        let toml = r#"
[api]
environment = "sandbox"
response_format = "xml"
dry_run = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.environment, Environment::Sandbox);
        assert_eq!(config.api.response_format, ResponseFormat::Xml);
        assert!(config.api.dry_run);
    }

    #[test]
    fn test_parse_unknown_environment_fails() {
        let toml = r#"
[api]
environment = "staging"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_credentials_config() {
        let toml = r#"
[credentials]
app_token = "xFAKEkFAKEL8FAKE"
app_secret = "kgFAKEfVxp8xFAKENWEaY15FAKE8fM8G"
access_token = "token"
access_secret = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let creds = config.credentials.unwrap();
        assert_eq!(creds.app_token, "xFAKEkFAKEL8FAKE");
        assert_eq!(creds.app_secret, "kgFAKEfVxp8xFAKENWEaY15FAKE8fM8G");
        assert_eq!(creds.access_token.as_deref(), Some("token"));
        assert_eq!(creds.access_secret.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parse_credentials_without_access_token() {
        let toml = r#"
[credentials]
app_token = "app"
app_secret = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let creds = config.credentials.unwrap();
        assert!(creds.access_token.is_none());
        assert!(creds.access_secret.is_none());
    }

    #[test]
    fn test_environment_hosts() {
        assert_eq!(Environment::Production.host(), "api.cardmarket.com");
        assert_eq!(Environment::Sandbox.host(), "sandbox.cardmarket.com");
    }

    #[test]
    fn test_response_format_segment() {
        assert_eq!(ResponseFormat::Json.to_string(), "json");
        assert_eq!(ResponseFormat::Xml.to_string(), "xml");
    }

    #[test]
    fn test_resolve_relative_work_dir() {
        let dir = resolve_work_dir(Path::new("/project"), Some("downloads"));
        assert_eq!(dir, PathBuf::from("/project/downloads"));
    }

    #[test]
    fn test_resolve_absolute_work_dir() {
        let dir = resolve_work_dir(Path::new("/project"), Some("/var/cardmarket"));
        assert_eq!(dir, PathBuf::from("/var/cardmarket"));
    }

    #[test]
    fn test_load_from_file_resolves_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[api]
work_dir = "exports"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.work_dir, dir.path().join("exports"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/cardmarket.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_apply_cli_settings_environment() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            environment: Some(Environment::Sandbox),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.api.environment, Environment::Sandbox);
        assert_eq!(config.api.response_format, ResponseFormat::Json); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            response_format: Some(ResponseFormat::Xml),
            dry_run: Some(true),
            work_dir: Some(PathBuf::from("/custom/work")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.api.response_format, ResponseFormat::Xml);
        assert!(config.api.dry_run);
        assert_eq!(config.work_dir, PathBuf::from("/custom/work"));
        assert_eq!(config.api.environment, Environment::Production); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let config_before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.api.environment, config_before.api.environment);
        assert_eq!(config.api.dry_run, config_before.api.dry_run);
        assert_eq!(config.work_dir, config_before.work_dir);
    }

    #[test]
    fn test_expand_env_vars_credentials() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_CM_APP_TOKEN", "env-token");
            std::env::set_var("TEST_CM_APP_SECRET", "env-secret");
            std::env::set_var("TEST_CM_ACCESS_TOKEN", "");
        }

        let toml = r#"
[credentials]
app_token = "${TEST_CM_APP_TOKEN}"
app_secret = "${TEST_CM_APP_SECRET}"
access_token = "${TEST_CM_ACCESS_TOKEN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let creds = config.credentials.unwrap();
        assert_eq!(creds.app_token, "env-token");
        assert_eq!(creds.app_secret, "env-secret");
        assert!(creds.access_token.is_none());

        unsafe {
            std::env::remove_var("TEST_CM_APP_TOKEN");
            std::env::remove_var("TEST_CM_APP_SECRET");
            std::env::remove_var("TEST_CM_ACCESS_TOKEN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_CM_CONFIG_TEST");
        }

        let toml = r#"
[credentials]
app_token = "app"
app_secret = "${MISSING_VAR_CM_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_CM_CONFIG_TEST"));
        assert!(err.to_string().contains("credentials.app_secret"));
    }

    /// Create valid credentials for testing.
    fn valid_credentials() -> CredentialsConfig {
        CredentialsConfig {
            app_token: "app".to_owned(),
            app_secret: "secret".to_owned(),
            access_token: None,
            access_secret: None,
        }
    }

    #[test]
    fn test_credentials_validate_valid() {
        assert!(valid_credentials().validate().is_ok());
    }

    #[test]
    fn test_credentials_validate_empty_app_secret() {
        let creds = CredentialsConfig {
            app_secret: String::new(),
            ..valid_credentials()
        };
        let err = creds.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("credentials.app_secret"));
    }

    #[test]
    fn test_require_credentials_missing_section() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_credentials().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[credentials]"));
    }

    #[test]
    fn test_require_credentials_returns_validated() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.credentials = Some(valid_credentials());
        let creds = config.require_credentials().unwrap();
        assert_eq!(creds.app_token, "app");
    }

    #[test]
    fn test_require_credentials_invalid() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.credentials = Some(CredentialsConfig {
            app_token: String::new(),
            ..valid_credentials()
        });
        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("app_token"));
    }
}
