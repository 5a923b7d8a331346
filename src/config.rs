//! Configuration file handling.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json`. It holds the validation
//! limits used by the transaction form and, optionally, a custom location for the data file.

use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Amount, Limits, DEFAULT_MAX_AMOUNT, DEFAULT_MAX_ITEM_NAME_LEN};
use crate::store::{State, Store};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const LEDGER_JSON: &str = "ledger.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    data_path: PathBuf,
}

impl Config {
    /// Creates the data directory, writes a default `config.json` and an empty data file.
    ///
    /// # Errors
    /// - Returns an error if `dir` already holds a `config.json`.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")
            .pub_result(ErrorType::Config)?;
        let root = utils::canonicalize(&maybe_relative)
            .await
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            return Err(Error::new(
                ErrorType::Config,
                anyhow::anyhow!("A config file already exists at '{}'", config_path.display()),
            ));
        }

        let config_file = ConfigFile::default();
        config_file
            .save(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        let config = Self::from_parts(root, config_path, config_file);
        config.store().save(&State::default()).await?;
        Ok(config)
    }

    /// Validates that `ledger_home` and its config file exist, then loads the config file.
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(ledger_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> anyhow::Result<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Ledger home is missing, run 'ledger init' first")?;
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self::from_parts(root, config_path, config_file))
    }

    fn from_parts(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Self {
        let data_path = config_file.data_path();
        let data_path = if data_path.is_absolute() {
            data_path
        } else {
            root.join(data_path)
        };
        Self {
            root,
            config_path,
            config_file,
            data_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// The limits that transaction input is validated against.
    pub fn limits(&self) -> Limits {
        Limits {
            max_amount: self.config_file.max_amount,
            max_item_name_len: self.config_file.max_item_name_len,
        }
    }

    pub fn store(&self) -> Store {
        Store::new(&self.data_path)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "max_amount": "9999999999",
///   "max_item_name_len": 25,
///   "data_path": "ledger.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The largest amount or worth a transaction may carry
    #[serde(default = "default_max_amount")]
    max_amount: Amount,

    /// The longest item name, in characters
    #[serde(default = "default_max_item_name_len")]
    max_item_name_len: usize,

    /// Path to the data file (optional, relative to the ledger home or absolute)
    /// Defaults to $LEDGER_HOME/ledger.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    data_path: Option<PathBuf>,
}

fn default_max_amount() -> Amount {
    DEFAULT_MAX_AMOUNT
}

fn default_max_item_name_len() -> usize {
    DEFAULT_MAX_ITEM_NAME_LEN
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            max_amount: DEFAULT_MAX_AMOUNT,
            max_item_name_len: DEFAULT_MAX_ITEM_NAME_LEN,
            data_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks its `app_name`.
    async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }

    fn data_path(&self) -> PathBuf {
        self.data_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LEDGER_JSON))
    }
}
