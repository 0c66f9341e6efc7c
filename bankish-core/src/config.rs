//! Configuration management
//!
//! Settings live in `settings.json` inside the Bankish directory:
//! ```json
//! {
//!   "app": {
//!     "apiBaseUrl": "https://bankishbackend.onrender.com/api",
//!     "feePolicy": "live",
//!     "processingDelayMs": 2000,
//!     ...
//!   }
//! }
//! ```
//! Unknown keys are ignored.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::adapters::fees::{FeeEndpoints, DEFAULT_BTC_FEE_URL, DEFAULT_ETH_FEE_URL, DEFAULT_TRON_FEE_URL};
use crate::adapters::http_api::BANKISH_PRODUCTION_URL;
use crate::adapters::rates::DEFAULT_RATES_URL;
use crate::domain::result::{Error, Result};

const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_PROCESSING_DELAY_MS: u64 = 2000;
const DEFAULT_DISPLAY_CURRENCY: &str = "USD";

/// Raw settings.json structure
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    rates_url: Option<String>,
    #[serde(default)]
    fee_policy: Option<FeePolicy>,
    #[serde(default)]
    btc_fee_url: Option<String>,
    #[serde(default)]
    eth_fee_url: Option<String>,
    #[serde(default)]
    tron_fee_url: Option<String>,
    #[serde(default)]
    processing_delay_ms: Option<u64>,
    #[serde(default)]
    display_currency: Option<String>,
}

/// Where crypto network fee estimates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeePolicy {
    /// Public chain endpoints
    #[default]
    Live,
    /// Random figure, no network
    Placeholder,
}

impl FromStr for FeePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(FeePolicy::Live),
            "placeholder" => Ok(FeePolicy::Placeholder),
            other => Err(Error::config(format!(
                "unknown fee policy '{}' (expected live or placeholder)",
                other
            ))),
        }
    }
}

/// Bankish configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub rates_url: String,
    pub fee_policy: FeePolicy,
    pub fee_endpoints: FeeEndpoints,
    /// Pause between accepting the form and asking for the code
    pub processing_delay: Duration,
    pub display_currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: BANKISH_PRODUCTION_URL.to_string(),
            rates_url: DEFAULT_RATES_URL.to_string(),
            fee_policy: FeePolicy::default(),
            fee_endpoints: FeeEndpoints::default(),
            processing_delay: Duration::from_millis(DEFAULT_PROCESSING_DELAY_MS),
            display_currency: DEFAULT_DISPLAY_CURRENCY.to_string(),
        }
    }
}

impl Config {
    /// Load config from the Bankish directory
    ///
    /// Environment overrides (for CI and scripting):
    /// `BANKISH_API_URL`, `BANKISH_FEE_POLICY`, `BANKISH_PROCESSING_DELAY_MS`
    pub fn load(bankish_dir: &Path) -> Result<Self> {
        Self::load_with_env(bankish_dir, |key| std::env::var(key).ok())
    }

    fn load_with_env(bankish_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = read_settings(bankish_dir)?;
        let app = &raw.app;

        let api_base_url = env("BANKISH_API_URL")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| app.api_base_url.clone())
            .unwrap_or_else(|| BANKISH_PRODUCTION_URL.to_string());

        let fee_policy = match env("BANKISH_FEE_POLICY").filter(|v| !v.trim().is_empty()) {
            Some(value) => value.parse()?,
            None => app.fee_policy.unwrap_or_default(),
        };

        let processing_delay_ms = match env("BANKISH_PROCESSING_DELAY_MS").filter(|v| !v.trim().is_empty()) {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                Error::config(format!("BANKISH_PROCESSING_DELAY_MS must be a whole number, got '{}'", value))
            })?,
            None => app.processing_delay_ms.unwrap_or(DEFAULT_PROCESSING_DELAY_MS),
        };

        let config = Self {
            api_base_url,
            rates_url: app.rates_url.clone().unwrap_or_else(|| DEFAULT_RATES_URL.to_string()),
            fee_policy,
            fee_endpoints: FeeEndpoints {
                btc: app.btc_fee_url.clone().unwrap_or_else(|| DEFAULT_BTC_FEE_URL.to_string()),
                eth: app.eth_fee_url.clone().unwrap_or_else(|| DEFAULT_ETH_FEE_URL.to_string()),
                tron: app.tron_fee_url.clone().unwrap_or_else(|| DEFAULT_TRON_FEE_URL.to_string()),
            },
            processing_delay: Duration::from_millis(processing_delay_ms),
            display_currency: app
                .display_currency
                .clone()
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_DISPLAY_CURRENCY.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("apiBaseUrl", &self.api_base_url),
            ("ratesUrl", &self.rates_url),
            ("btcFeeUrl", &self.fee_endpoints.btc),
            ("ethFeeUrl", &self.fee_endpoints.eth),
            ("tronFeeUrl", &self.fee_endpoints.tron),
        ] {
            let url = Url::parse(value).map_err(|e| Error::config(format!("{} '{}' is not a valid URL: {}", key, value, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::config(format!("{} must use http or https", key)));
            }
        }
        Ok(())
    }
}

fn read_settings(bankish_dir: &Path) -> Result<SettingsFile> {
    let settings_path = bankish_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::config(format!("{} is not valid: {}", settings_path.display(), e)))
}
