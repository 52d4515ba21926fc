use crate::errors::{ProcessingError, ProcessingResult};
use kaspa_hashes::Hash;
use kgi_core::log::{LogError, init_logger};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_NETWORK: &str = "mainnet";
const DEFAULT_APP_DIR: &str = "kgi-data";
const DATABASE_DIR: &str = "graph-db";

const MB: usize = 1024 * 1024;

/// Kaspa mainnet genesis hash
pub const MAINNET_GENESIS_HASH: Hash = Hash::from_bytes([
    0x58, 0xc2, 0xd4, 0x19, 0x9e, 0x21, 0xf9, 0x10, 0xd1, 0x57, 0x1d, 0x11, 0x49, 0x69, 0xce, 0xce, 0xf4, 0x8f, 0x09, 0xf9, 0x34, 0xd4,
    0x2c, 0xcb, 0x6a, 0x28, 0x1a, 0x15, 0x86, 0x8f, 0x29, 0x99,
]);
pub const MAINNET_GENESIS_TIMESTAMP: i64 = 1637609671037;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GenesisConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub hash: Hash,
    pub timestamp: i64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self { hash: MAINNET_GENESIS_HASH, timestamp: MAINNET_GENESIS_TIMESTAMP }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DbConfig {
    pub parallelism: usize,
    pub mem_budget: usize,
    pub files_limit: i32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { parallelism: 1, mem_budget: 64 * MB, files_limit: 256 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub appdir: PathBuf,
    pub network: String,
    pub genesis: GenesisConfig,
    pub db: DbConfig,
    pub logdir: Option<String>,
    #[serde(rename = "loglevel")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appdir: PathBuf::from(DEFAULT_APP_DIR),
            network: DEFAULT_NETWORK.to_string(),
            genesis: GenesisConfig::default(),
            db: DbConfig::default(),
            logdir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> ProcessingResult<Self> {
        toml::from_str(s).map_err(|err| ProcessingError::Config(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ProcessingResult<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|err| ProcessingError::Config(format!("cannot read {}: {err}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Directory of the graph database, one per network
    pub fn database_dir(&self) -> PathBuf {
        self.appdir.join(&self.network).join(DATABASE_DIR)
    }

    pub fn init_logger(&self) -> Result<(), LogError> {
        init_logger(self.logdir.as_deref(), &self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.genesis.hash.to_string(), "58c2d4199e21f910d1571d114969cecef48f09f934d42ccb6a281a15868f2999");
        assert_eq!(config.database_dir(), PathBuf::from("kgi-data").join("mainnet").join("graph-db"));
    }

    #[test]
    fn test_parse() {
        let config = Config::from_toml_str(
            r#"
            appdir = "/var/lib/kgi"
            network = "testnet-10"
            loglevel = "info,kgi_processing=trace"

            [genesis]
            hash = "0000000000000000000000000000000000000000000000000000000000000001"
            timestamp = 1000

            [db]
            files-limit = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.network, "testnet-10");
        assert_eq!(config.log_level, "info,kgi_processing=trace");
        assert_eq!(config.genesis.timestamp, 1000);
        assert_eq!(config.db.files_limit, 64);
        assert_eq!(config.db.parallelism, 1);
        assert_eq!(config.database_dir(), PathBuf::from("/var/lib/kgi/testnet-10/graph-db"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(Config::from_toml_str("colour = \"blue\""), Err(ProcessingError::Config(_))));
        assert!(matches!(Config::from_toml_str("[genesis]\nhash = \"xyz\""), Err(ProcessingError::Config(_))));
        assert!(matches!(Config::load("/nonexistent/kgi.toml"), Err(ProcessingError::Config(_))));
    }
}
