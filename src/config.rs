use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::flow::FlowSettings;
use crate::polling::{FetchErrorPolicy, PollSettings};

/// Main configuration structure for wallet flows
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WalletFlowsConfig {
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Flow controller settings
    pub flows: FlowConfig,
    /// Default polling settings
    pub polling: PollingConfig,
    /// Card activation polling
    pub cards: CardConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human readable output
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowConfig {
    /// Capacity of each flow's action channel
    pub action_buffer: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollingConfig {
    pub timeout_seconds: u64,
    pub interval_millis: u64,
    /// Keep polling past failed fetches instead of aborting
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CardConfig {
    pub activation_timeout_seconds: u64,
    pub activation_interval_millis: u64,
}

impl Default for WalletFlowsConfig {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            flows: FlowConfig { action_buffer: 16 },
            polling: PollingConfig {
                timeout_seconds: 60,
                interval_millis: 1000,
                continue_on_error: true,
            },
            cards: CardConfig {
                activation_timeout_seconds: 60,
                activation_interval_millis: 2000,
            },
        }
    }
}

impl PollingConfig {
    fn error_policy(&self) -> FetchErrorPolicy {
        if self.continue_on_error {
            FetchErrorPolicy::Continue
        } else {
            FetchErrorPolicy::Abort
        }
    }
}

impl WalletFlowsConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (wallet-flows.toml)
    /// 3. Environment variables (prefixed with WALLET_FLOWS__)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("wallet-flows.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("WALLET_FLOWS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Writes the configuration as TOML, in the layout `load_from` reads back
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Exports `.env` entries so `WALLET_FLOWS__*` overrides can live there
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Exported WALLET_FLOWS overrides from .env");
        }
        Ok(())
    }

    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings {
            action_buffer: self.flows.action_buffer,
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            timeout: Duration::from_secs(self.polling.timeout_seconds),
            interval: Duration::from_millis(self.polling.interval_millis),
            on_error: self.polling.error_policy(),
        }
    }

    pub fn card_activation_settings(&self) -> PollSettings {
        PollSettings {
            timeout: Duration::from_secs(self.cards.activation_timeout_seconds),
            interval: Duration::from_millis(self.cards.activation_interval_millis),
            on_error: self.polling.error_policy(),
        }
    }
}

/// Process-wide configuration, loaded on first use
static CONFIG: std::sync::LazyLock<Result<WalletFlowsConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // .env must be exported before the environment source is read
        if let Err(e) = WalletFlowsConfig::load_env_file() {
            eprintln!("⚠️  Ignoring unreadable .env file: {e}");
        }
        WalletFlowsConfig::load()
    });

/// Configuration shared by the CLI, loaded once from `wallet-flows.toml` and the environment
pub fn config() -> Result<&'static WalletFlowsConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load wallet flows configuration: {}", e))
}
