//! Configuration for the native clarity-cli provider
//!
//! Resolved from environment variables or a `Clarigen.toml` file.
use clarigen_core::PrincipalData;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_BIN: &str = "clarity-cli";
pub const DEFAULT_CONFIG_FILE: &str = "Clarigen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to parse allocations: {0}")]
    Allocations(#[from] serde_json::Error),
}

/// Initial STX balance granted to a principal when the VM database is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub principal: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClarityBinConfig {
    pub bin_path: PathBuf,
    /// VM state database; a scratch file is used when unset
    pub db_path: Option<PathBuf>,
    pub allocations: Vec<Allocation>,
}

impl Default for ClarityBinConfig {
    fn default() -> Self {
        Self {
            bin_path: PathBuf::from(DEFAULT_BIN),
            db_path: None,
            allocations: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    clarity: Option<ClaritySection>,
}

#[derive(Debug, Deserialize, Default)]
struct ClaritySection {
    bin: Option<PathBuf>,
    db: Option<PathBuf>,
    #[serde(default)]
    allocations: Vec<Allocation>,
}

impl ClarityBinConfig {
    /// Load from `CLARITY_BIN`, `CLARITY_DB` and `CLARITY_ALLOCATIONS`
    /// (path to a JSON array of `{principal, amount}`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let bin_path = env::var("CLARITY_BIN")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BIN));

        let db_path = env::var("CLARITY_DB").ok().map(PathBuf::from);

        let allocations = match env::var("CLARITY_ALLOCATIONS") {
            Ok(path) => {
                let path = PathBuf::from(path);
                let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&content)?
            }
            Err(_) => Vec::new(),
        };

        let config = Self {
            bin_path,
            db_path,
            allocations,
        };
        config.validate()?;

        info!(
            "Clarity configuration loaded: bin={}, allocations={}",
            config.bin_path.display(),
            config.allocations.len()
        );

        Ok(config)
    }

    /// Load from the given file, or `./Clarigen.toml` if present, else the environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.exists() {
                    debug!("No {} found, reading environment", DEFAULT_CONFIG_FILE);
                    return Self::from_env();
                }
                local
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let section = file.clarity.unwrap_or_default();

        let config = Self {
            bin_path: section.bin.unwrap_or_else(|| PathBuf::from(DEFAULT_BIN)),
            db_path: section.db,
            allocations: section.allocations,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_allocations(mut self, allocations: Vec<Allocation>) -> Self {
        self.allocations = allocations;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bin_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig("clarity binary path is empty".to_string()));
        }
        for allocation in &self.allocations {
            allocation
                .principal
                .parse::<PrincipalData>()
                .map_err(|e| ConfigError::InvalidConfig(format!("allocation: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // env is process-global; tests touching it take this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 3] = ["CLARITY_BIN", "CLARITY_DB", "CLARITY_ALLOCATIONS"];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClarityBinConfig::default();
        assert_eq!(config.bin_path, PathBuf::from("clarity-cli"));
        assert!(config.db_path.is_none());
        assert!(config.allocations.is_empty());
    }

    #[test]
    fn test_from_toml() {
        let config = ClarityBinConfig::from_toml(
            r#"
            [clarity]
            bin = "/opt/clarity/clarity-cli"

            [[clarity.allocations]]
            principal = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"
            amount = 1000000
            "#,
        )
        .unwrap();
        assert_eq!(config.bin_path, PathBuf::from("/opt/clarity/clarity-cli"));
        assert_eq!(config.allocations.len(), 1);
        assert_eq!(config.allocations[0].amount, 1_000_000);
    }

    #[test]
    fn test_invalid_allocation_principal() {
        let result = ClarityBinConfig::from_toml(
            r#"
            [[clarity.allocations]]
            principal = "not-an-address"
            amount = 1
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[clarity]\ndb = \"/tmp/vm.db\"").unwrap();

        let config = ClarityBinConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/vm.db")));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClarityBinConfig::load(Some(Path::new("/nonexistent/Clarigen.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_from_env_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = ClarityBinConfig::from_env().unwrap();
        assert_eq!(config, ClarityBinConfig::default());
    }

    #[test]
    fn test_from_env_reads_variables() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let mut allocations = NamedTempFile::new().unwrap();
        write!(
            allocations,
            r#"[{{ "principal": "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM", "amount": 500 }}]"#
        )
        .unwrap();

        env::set_var("CLARITY_BIN", "/opt/bin/clarity-cli");
        env::set_var("CLARITY_DB", "/tmp/clarigen-env.db");
        env::set_var("CLARITY_ALLOCATIONS", allocations.path());
        let result = ClarityBinConfig::from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.bin_path, PathBuf::from("/opt/bin/clarity-cli"));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/clarigen-env.db")));
        assert_eq!(
            config.allocations,
            vec![Allocation {
                principal: "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".to_string(),
                amount: 500,
            }]
        );
    }

    #[test]
    fn test_from_env_bad_allocations() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let mut malformed = NamedTempFile::new().unwrap();
        write!(malformed, "{{ not json").unwrap();
        env::set_var("CLARITY_ALLOCATIONS", malformed.path());
        let result = ClarityBinConfig::from_env();
        assert!(matches!(result, Err(ConfigError::Allocations(_))));

        env::set_var("CLARITY_ALLOCATIONS", "/nonexistent/allocations.json");
        let result = ClarityBinConfig::from_env();
        assert!(matches!(result, Err(ConfigError::Read { .. })));

        let mut bad_principal = NamedTempFile::new().unwrap();
        write!(bad_principal, r#"[{{ "principal": "nobody", "amount": 1 }}]"#).unwrap();
        env::set_var("CLARITY_ALLOCATIONS", bad_principal.path());
        let result = ClarityBinConfig::from_env();
        clear_env();
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_without_file_reads_environment() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        // the crate root carries no Clarigen.toml
        assert!(!Path::new(DEFAULT_CONFIG_FILE).exists());

        env::set_var("CLARITY_BIN", "/usr/local/bin/clarity-cli");
        let result = ClarityBinConfig::load(None);
        clear_env();

        assert_eq!(result.unwrap().bin_path, PathBuf::from("/usr/local/bin/clarity-cli"));
    }
}
