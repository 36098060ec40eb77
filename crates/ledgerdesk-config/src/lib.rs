//! Configuration management for ledgerdesk
//!
//! This module handles loading, validation, and management of
//! ledgerdesk configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root URL of the accounting REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://localhost:44326/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// File holding the bearer token between runs
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

fn default_token_file() -> PathBuf {
    PathBuf::from(".ledgerdesk/token")
}

/// How an account group's representative balance is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Balance of the last row seen for the account, in input order
    LastSeen,
    /// Total debit minus total credit of the account's rows
    NetMovement,
}

impl Default for BalancePolicy {
    fn default() -> Self {
        BalancePolicy::LastSeen
    }
}

impl std::str::FromStr for BalancePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last_seen" => Ok(BalancePolicy::LastSeen),
            "net_movement" => Ok(BalancePolicy::NetMovement),
            _ => Err(format!("Invalid balance policy: {}", s)),
        }
    }
}

impl std::fmt::Display for BalancePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalancePolicy::LastSeen => write!(f, "last_seen"),
            BalancePolicy::NetMovement => write!(f, "net_movement"),
        }
    }
}

/// Time range enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Current month
    Month,
    /// Current quarter
    Quarter,
    /// Current year
    Year,
    /// All time
    All,
    /// Custom range
    Custom,
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::All
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            "custom" => Ok(TimeRange::Custom),
            _ => Err(format!("Invalid time range: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Month => write!(f, "month"),
            TimeRange::Quarter => write!(f, "quarter"),
            TimeRange::Year => write!(f, "year"),
            TimeRange::All => write!(f, "all"),
            TimeRange::Custom => write!(f, "custom"),
        }
    }
}

/// General ledger view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Allowed page sizes
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
    /// Group balance attribution
    #[serde(default)]
    pub balance_policy: BalancePolicy,
    /// Default period for ledger and income statement queries
    #[serde(default)]
    pub default_range: TimeRange,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            balance_policy: BalancePolicy::default(),
            default_range: TimeRange::default(),
        }
    }
}

fn default_page_size() -> usize {
    5
}

fn default_page_size_options() -> Vec<usize> {
    vec![5, 10, 20, 50]
}

/// Workbook export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Lay sheets out right-to-left
    #[serde(default = "default_true")]
    pub right_to_left: bool,
    /// Directory for exported workbooks
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Excel number format for amounts
    #[serde(default = "default_number_format")]
    pub number_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            right_to_left: true,
            output_dir: default_output_dir(),
            number_format: default_number_format(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_number_format() -> String {
    "#,##0.00".to_string()
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Default currency
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
        }
    }
}

fn default_currency() -> String {
    "EGP".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Authentication settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// General ledger settings
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        Self::from_yaml(&content)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api.base_url".to_string(),
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.ledger.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ledger.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if !self.ledger.page_size_options.is_empty()
            && !self.ledger.page_size_options.contains(&self.ledger.page_size)
        {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "ledger.page_size {} is not one of {:?}",
                    self.ledger.page_size, self.ledger.page_size_options
                ),
            });
        }

        if self.ledger.default_range == TimeRange::Custom {
            return Err(ConfigError::InvalidValue {
                field: "ledger.default_range".to_string(),
                reason: "Custom ranges need explicit dates and cannot be a default".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// API root without a trailing slash
    pub fn api_root(&self) -> String {
        self.api.base_url.trim().trim_end_matches('/').to_string()
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.ledger.page_size, 5);
        assert_eq!(config.ledger.balance_policy, BalancePolicy::LastSeen);
        assert!(config.export.right_to_left);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ledger.page_size_options, vec![5, 10, 20, 50]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Config::from_yaml("api:\n  base_url: ftp://example.com\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "api.base_url"));
    }

    #[test]
    fn test_page_size_must_be_an_option() {
        let err = Config::from_yaml("ledger:\n  page_size: 7\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_custom_default_range_rejected() {
        let err = Config::from_yaml("ledger:\n  default_range: custom\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("api: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(Config::load_or_default(Path::new("/definitely/not/here.yaml")).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ledger:\n  balance_policy: net_movement\n  page_size: 10").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ledger.balance_policy, BalancePolicy::NetMovement);
        assert_eq!(config.ledger.page_size, 10);
    }

    #[test]
    fn test_api_root_trims_slash() {
        let config = Config::from_yaml("api:\n  base_url: \"http://host/api/\"\n").unwrap();
        assert_eq!(config.api_root(), "http://host/api");
    }

    #[test]
    fn test_balance_policy_from_str() {
        assert_eq!("last-seen".parse::<BalancePolicy>().unwrap(), BalancePolicy::LastSeen);
        assert_eq!("NET_MOVEMENT".parse::<BalancePolicy>().unwrap(), BalancePolicy::NetMovement);
        assert!("average".parse::<BalancePolicy>().is_err());
    }
}
