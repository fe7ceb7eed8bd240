//! Shroud Configuration
//!
//! Shared configuration crate for the Shroud prover and tools.
//!
//! Handles loading configuration from:
//! 1. SHROUD_CONFIG env var (explicit path)
//! 2. ./shroud.toml (current directory)
//! 3. ~/.shroud/config.toml (user home)
//!
//! Environment variables take precedence over TOML config. The loaded value is
//! handed to the components that need it; there is no process-wide instance.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

const CONFIG_FILE_NAME: &str = "shroud.toml";
const CONFIG_DIR_NAME: &str = ".shroud";
const HOME_CONFIG_FILE_NAME: &str = "config.toml";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_PROVE_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_VERIFY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShroudConfig {
    #[serde(default)]
    pub prover: ProverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key locations and per-call budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProverConfig {
    #[serde(default)]
    pub proving_key_path: Option<String>,
    #[serde(default)]
    pub verifying_key_path: Option<String>,
    #[serde(default = "default_prove_timeout")]
    pub prove_timeout_ms: u64,
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_ms: u64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            proving_key_path: None,
            verifying_key_path: None,
            prove_timeout_ms: DEFAULT_PROVE_TIMEOUT_MS,
            verify_timeout_ms: DEFAULT_VERIFY_TIMEOUT_MS,
        }
    }
}

impl ProverConfig {
    pub fn prove_timeout(&self) -> Duration {
        Duration::from_millis(self.prove_timeout_ms)
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_millis(self.verify_timeout_ms)
    }
}

fn default_prove_timeout() -> u64 {
    DEFAULT_PROVE_TIMEOUT_MS
}
fn default_verify_timeout() -> u64 {
    DEFAULT_VERIFY_TIMEOUT_MS
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"shroud_prover=debug"`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.into()
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present
fn env_string(key: &str, field: &mut String) {
    if let Ok(v) = env::var(key) {
        *field = v;
    }
}

/// Set Option<String> from env var if present
fn env_option_string(key: &str, field: &mut Option<String>) {
    if let Ok(v) = env::var(key) {
        *field = Some(v);
    }
}

/// Set field from env var if present and parseable
fn env_parse<T: std::str::FromStr>(key: &str, field: &mut T) {
    if let Ok(v) = env::var(key) {
        match v.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => log::warn!("Ignoring unparseable {}={:?}", key, v),
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl ShroudConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::parse_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::parse_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check SHROUD_CONFIG env var
        if let Ok(path) = env::var("SHROUD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!("SHROUD_CONFIG points at missing file: {}", path.display());
        }

        // 2. Check ./shroud.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.shroud/config.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        env_option_string("SHROUD_PROVING_KEY", &mut self.prover.proving_key_path);
        env_option_string("SHROUD_VERIFYING_KEY", &mut self.prover.verifying_key_path);
        env_parse("SHROUD_PROVE_TIMEOUT_MS", &mut self.prover.prove_timeout_ms);
        env_parse("SHROUD_VERIFY_TIMEOUT_MS", &mut self.prover.verify_timeout_ms);
        env_string("SHROUD_LOG", &mut self.logging.filter);
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(HOME_CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        let mut sample = Self::default();
        sample.prover.proving_key_path = Some("./keys/proving.key".into());
        sample.prover.verifying_key_path = Some("./keys/verifying.key".into());
        toml::to_string_pretty(&sample).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ShroudConfig::default();
        assert_eq!(config.prover.prove_timeout(), Duration::from_secs(30));
        assert_eq!(config.prover.verify_timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.filter, "info");
        assert!(config.prover.proving_key_path.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ShroudConfig = toml::from_str(
            r#"
            [prover]
            proving_key_path = "/keys/pk.bin"
            prove_timeout_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.prover.proving_key_path.as_deref(), Some("/keys/pk.bin"));
        assert_eq!(config.prover.prove_timeout(), Duration::from_millis(1500));
        assert_eq!(config.prover.verify_timeout_ms, DEFAULT_VERIFY_TIMEOUT_MS);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_sample_parses_back() {
        let sample = ShroudConfig::generate_sample();
        let parsed: ShroudConfig = toml::from_str(&sample).unwrap();
        assert_eq!(
            parsed.prover.verifying_key_path.as_deref(),
            Some("./keys/verifying.key")
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[prover]\nverifying_key_path = \"/tmp/vk\"\nverify_timeout_ms = 250\n\n[logging]\nfilter = \"debug\""
        )
        .unwrap();

        let config = ShroudConfig::load_from(file.path()).unwrap();
        assert_eq!(config.prover.verifying_key_path.as_deref(), Some("/tmp/vk"));
        assert_eq!(config.prover.verify_timeout_ms, 250);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ShroudConfig::load_from(Path::new("/nonexistent/shroud.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[prover\nbroken").unwrap();

        let err = ShroudConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
