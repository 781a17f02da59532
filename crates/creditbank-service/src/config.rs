//! Settings for creditbankd

use creditbank_adapters::ConfigBackendConfig;
use creditbank_core::LocalBank;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Environment variable prefix; nested keys use `__`, e.g. `CREDITBANK_BANK__NAME`.
pub const ENV_PREFIX: &str = "CREDITBANK";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default)]
    pub server: ServerSettings,

    /// The bank this instance quotes for
    #[serde(default)]
    pub bank: BankSettings,

    #[serde(default)]
    pub config_backend: ConfigBackendConfig,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Path prefix of every route
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            api_version: default_api_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSettings {
    /// Id of the bank record in the config backend
    #[serde(default = "default_bank_id")]
    pub id: String,

    /// Key of this bank in each group's stats
    #[serde(default = "default_bank_name")]
    pub name: String,
}

impl Default for BankSettings {
    fn default() -> Self {
        Self {
            id: default_bank_id(),
            name: default_bank_name(),
        }
    }
}

impl From<&BankSettings> for LocalBank {
    fn from(settings: &BankSettings) -> Self {
        LocalBank {
            id: settings.id.clone(),
            name: settings.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_bank_id() -> String {
    "vbank".to_string()
}

fn default_bank_name() -> String {
    "vbank".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceSettings {
    /// Defaults, then the optional file, then `CREDITBANK_*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ServiceSettings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn local_bank(&self) -> LocalBank {
        LocalBank::from(&self.bank)
    }
}
