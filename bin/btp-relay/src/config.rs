//! Configuration surface for the relay binary (§6, §11): mirrors the Sender/Link
//! configuration plus the wallet and endpoint details an out-of-scope RPC client would need.

use std::{fs, path::Path, time::Duration};

use format_serde_error::SerdeError;
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};

fn default_step_limit() -> u64 {
    btp_relay_sender::constants::DEFAULT_STEP_LIMIT
}

fn default_interval_ms() -> u64 {
    1000
}

/// Top-level relay configuration, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `stepLimit` attached to every submitted transaction (§6).
    #[serde(default = "default_step_limit")]
    pub step_limit: u64,

    /// When true, the Link runs `successFlow` on every `SUCCESS` result, not just finalized
    /// ones (§4.3.6).
    #[serde(default)]
    pub latest_result: bool,

    pub src: EndpointConfig,
    pub dst: EndpointConfig,

    /// Destination RPC endpoint.
    pub endpoint: String,

    pub wallet: WalletConfig,

    /// Wait between tx-pool-overflow retries, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub relay_resend_interval_ms: u64,

    /// Wait between result-polling attempts, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub get_result_interval_ms: u64,

    /// Subtracted from the Sender's `tx_size_limit` to compute the Link's working budget.
    #[serde(default)]
    pub limit_margin: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub key_path: String,
}

impl Config {
    /// Parses the config at `path`, wrapping parse errors with the offending source so the
    /// operator sees exactly where the TOML is malformed.
    pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str::<Config>(&contents).map_err(|e| SerdeError::new(contents, e))?;
        Ok(config)
    }

    pub fn relay_resend_interval(&self) -> Duration {
        Duration::from_millis(self.relay_resend_interval_ms)
    }

    pub fn get_result_interval(&self) -> Duration {
        Duration::from_millis(self.get_result_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let toml_str = r#"
            endpoint = "https://dst.example/api/v3"

            [src]
            address = "btp://0x1.src/cx0000000000000000000000000000000000000"

            [dst]
            address = "btp://0x2.dst/cx0000000000000000000000000000000000001"

            [wallet]
            key_path = "/etc/btp-relay/wallet.json"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.step_limit, btp_relay_sender::constants::DEFAULT_STEP_LIMIT);
        assert!(!config.latest_result);
        assert_eq!(config.relay_resend_interval_ms, 1000);
        assert_eq!(config.limit_margin, 0);
    }

    #[test]
    fn malformed_toml_reports_via_serde_error() {
        let path = std::env::temp_dir().join(format!("btp-relay-config-test-{}.toml", std::process::id()));
        fs::write(&path, "endpoint = [").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedConfig(_)));
        let _ = fs::remove_file(&path);
    }
}
