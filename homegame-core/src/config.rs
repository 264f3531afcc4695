use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::result::Result;

pub const CONFIG_ENV: &str = "HOMEGAME_CONFIG";
pub const SEED_ENV: &str = "HOMEGAME_SEED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquityConfig {
    /// Largest deal count that is still enumerated exactly.
    pub exact_limit: u64,
    /// Monte Carlo deals when the spot is too large to enumerate.
    pub trials: u64,
    pub seed: Option<u64>,
}

impl Default for EquityConfig {
    fn default() -> Self {
        Self {
            exact_limit: 25_000_000,
            trials: 50_000,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub equity: EquityConfig,
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            equity: EquityConfig::default(),
            history_limit: 50,
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Defaults, or the file named by `HOMEGAME_CONFIG`, with the seed
    /// replaced by `HOMEGAME_SEED` when that is set.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                log::debug!("config: loading {}", path.to_string_lossy());
                Self::from_path(path)?
            }
            None => Self::default(),
        };
        if let Ok(raw) = std::env::var(SEED_ENV) {
            config.equity.seed = Some(parse_seed(&raw)?);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.equity.trials == 0 {
            return Err("config: equity.trials must be positive".into());
        }
        if self.history_limit == 0 {
            return Err("config: history_limit must be positive".into());
        }
        Ok(())
    }
}

fn parse_seed(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| format!("config: {SEED_ENV} is not an unsigned integer: '{raw}'").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert_eq!(Config::default().equity.trials, 50_000);
        assert_eq!(Config::default().history_limit, 50);
    }

    #[test]
    fn partial_documents_keep_other_defaults() {
        let config = Config::from_json(r#"{"equity": {"seed": 7}}"#).unwrap();
        assert_eq!(config.equity.seed, Some(7));
        assert_eq!(config.equity.exact_limit, 25_000_000);
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn bad_documents_are_rejected() {
        assert!(Config::from_json(r#"{"equity": {"trials": 0}}"#)
            .unwrap_err()
            .is_invalid_input());
        assert!(Config::from_json(r#"{"history_limit": 0}"#).is_err());
        assert!(Config::from_json(r#"{"trails": 10}"#).is_err());
        assert!(Config::from_json("[").is_err());
    }

    #[test]
    fn seed_parsing() {
        assert_eq!(parse_seed(" 42 ").unwrap(), 42);
        assert!(parse_seed("-1").is_err());
    }
}
