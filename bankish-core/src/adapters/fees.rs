//! Crypto network fee sources
//!
//! Two implementations of [`FeeSource`]:
//! - `PlaceholderFeeSource` returns a random figure, for offline use
//! - `LiveFeeSource` asks one public endpoint per chain for the current
//!   fee level and prices a typical transfer with it
//!
//! Both are estimates for display. Nothing here is used for settlement.

use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use super::http_api::{check_response_status, map_request_error};
use crate::domain::result::{Error, Result};
use crate::domain::CryptoCurrency;
use crate::ports::FeeSource;

pub const DEFAULT_BTC_FEE_URL: &str = "https://mempool.space/api/v1/fees/recommended";
pub const DEFAULT_ETH_FEE_URL: &str = "https://api.etherscan.io/api?module=gastracker&action=gasoracle";
pub const DEFAULT_TRON_FEE_URL: &str = "https://api.trongrid.io/wallet/getchainparameters";

/// Virtual size of a one-input, two-output segwit transaction
const BTC_TX_VBYTES: u32 = 140;
/// Gas used by a plain ETH transfer
const ETH_TRANSFER_GAS: u32 = 21_000;
/// Energy burnt by a TRC20 `transfer` call to a funded address
const TRC20_TRANSFER_ENERGY: u32 = 65_000;

const FEE_TIMEOUT_SECS: u64 = 10;

/// Random fee in `0..0.0005`, six decimals
#[derive(Debug, Default, Clone)]
pub struct PlaceholderFeeSource;

impl PlaceholderFeeSource {
    pub fn new() -> Self {
        Self
    }
}

impl FeeSource for PlaceholderFeeSource {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn estimate(&self, currency: CryptoCurrency, _amount: &str) -> Result<String> {
        let fee: f64 = rand::thread_rng().gen_range(0.0..0.0005);
        Ok(format!("{:.6} {}", fee, currency.code()))
    }
}

/// Per-chain fee endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeEndpoints {
    pub btc: String,
    pub eth: String,
    pub tron: String,
}

impl Default for FeeEndpoints {
    fn default() -> Self {
        Self {
            btc: DEFAULT_BTC_FEE_URL.to_string(),
            eth: DEFAULT_ETH_FEE_URL.to_string(),
            tron: DEFAULT_TRON_FEE_URL.to_string(),
        }
    }
}

/// Fee estimates from public chain data
#[derive(Debug, Clone)]
pub struct LiveFeeSource {
    client: Client,
    endpoints: FeeEndpoints,
}

impl LiveFeeSource {
    pub fn new(endpoints: FeeEndpoints) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FEE_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, endpoints })
    }

    fn fetch(&self, url: &str) -> Result<JsonValue> {
        let response = self.client.get(url).send().map_err(map_request_error)?;
        let response = check_response_status(response)?;
        response
            .json()
            .map_err(|e| Error::http(format!("Failed to parse fee response: {}", e)))
    }
}

impl FeeSource for LiveFeeSource {
    fn name(&self) -> &str {
        "live"
    }

    fn estimate(&self, currency: CryptoCurrency, _amount: &str) -> Result<String> {
        match currency {
            CryptoCurrency::Btc => {
                let body = self.fetch(&self.endpoints.btc)?;
                Ok(format!("{:.8} BTC", btc_fee_from(&body)?))
            }
            CryptoCurrency::Eth => {
                let body = self.fetch(&self.endpoints.eth)?;
                Ok(format!("{:.6} ETH", eth_fee_from(&body)?))
            }
            // USDT moves on TRC20; the fee is paid in TRX
            CryptoCurrency::Usdt => {
                let body = self.fetch(&self.endpoints.tron)?;
                Ok(format!("{:.2} TRX", tron_fee_from(&body)?))
            }
        }
    }
}

/// `{"fastestFee": 12, ...}` in sat/vB, priced for a typical transaction
fn btc_fee_from(body: &JsonValue) -> Result<Decimal> {
    let sat_per_vbyte = body
        .get("fastestFee")
        .and_then(json_decimal)
        .ok_or_else(|| Error::http("BTC fee response has no fastestFee"))?;
    scale_fee(sat_per_vbyte, BTC_TX_VBYTES, 100_000_000, 8, "BTC")
}

/// Etherscan-style gas oracle: `{"result": {"ProposeGasPrice": "23.1"}}` in gwei
fn eth_fee_from(body: &JsonValue) -> Result<Decimal> {
    let gwei = body
        .get("result")
        .and_then(|r| r.get("ProposeGasPrice"))
        .and_then(json_decimal)
        .ok_or_else(|| Error::http("ETH gas oracle response has no ProposeGasPrice"))?;
    scale_fee(gwei, ETH_TRANSFER_GAS, 1_000_000_000, 6, "ETH")
}

/// TronGrid chain parameters: `getEnergyFee` in sun per unit of energy
fn tron_fee_from(body: &JsonValue) -> Result<Decimal> {
    let sun_per_energy = body
        .get("chainParameter")
        .and_then(|p| p.as_array())
        .and_then(|params| {
            params
                .iter()
                .find(|p| p.get("key").and_then(|k| k.as_str()) == Some("getEnergyFee"))
        })
        .and_then(|p| p.get("value"))
        .and_then(json_decimal)
        .ok_or_else(|| Error::http("TRON chain parameters have no getEnergyFee"))?;
    scale_fee(sun_per_energy, TRC20_TRANSFER_ENERGY, 1_000_000, 2, "TRON")
}

/// `rate * units / per_coin`, rounded; endpoint values that overflow are errors
fn scale_fee(rate: Decimal, units: u32, per_coin: u64, dp: u32, chain: &str) -> Result<Decimal> {
    rate.checked_mul(Decimal::from(units))
        .and_then(|total| total.checked_div(Decimal::from(per_coin)))
        .map(|fee| fee.round_dp(dp))
        .ok_or_else(|| Error::http(format!("{} fee response is out of range", chain)))
}

fn json_decimal(value: &JsonValue) -> Option<Decimal> {
    match value {
        JsonValue::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        JsonValue::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_placeholder_format_and_range() {
        let source = PlaceholderFeeSource::new();
        for currency in CryptoCurrency::ALL {
            let fee = source.estimate(currency, "0.01").unwrap();
            let (value, code) = fee.split_once(' ').unwrap();
            assert_eq!(code, currency.code());
            assert_eq!(value.split('.').nth(1).unwrap().len(), 6);
            let value: f64 = value.parse().unwrap();
            assert!((0.0..=0.0005).contains(&value));
        }
    }

    #[test]
    fn test_btc_fee() {
        let body = json!({"fastestFee": 10, "halfHourFee": 8, "hourFee": 5});
        // 10 sat/vB * 140 vB = 1400 sats
        assert_eq!(btc_fee_from(&body).unwrap(), dec("0.000014"));
    }

    #[test]
    fn test_eth_fee_from_string_gwei() {
        let body = json!({"status": "1", "result": {"ProposeGasPrice": "20"}});
        // 20 gwei * 21000 = 420000 gwei
        assert_eq!(eth_fee_from(&body).unwrap(), dec("0.00042"));
    }

    #[test]
    fn test_tron_fee() {
        let body = json!({"chainParameter": [
            {"key": "getMaintenanceTimeInterval", "value": 21600000},
            {"key": "getEnergyFee", "value": 420}
        ]});
        // 420 sun * 65000 energy = 27.3 TRX
        assert_eq!(tron_fee_from(&body).unwrap(), dec("27.3"));
    }

    #[test]
    fn test_malformed_fee_responses() {
        assert!(btc_fee_from(&json!({})).is_err());
        assert!(eth_fee_from(&json!({"result": "Max rate limit reached"})).is_err());
        assert!(tron_fee_from(&json!({"chainParameter": []})).is_err());
    }

    #[test]
    fn test_oversized_fee_values_are_errors() {
        let huge = "79228162514264337593543950335";
        assert!(btc_fee_from(&json!({"fastestFee": huge})).is_err());
        assert!(eth_fee_from(&json!({"result": {"ProposeGasPrice": huge}})).is_err());
        assert!(tron_fee_from(&json!({"chainParameter": [{"key": "getEnergyFee", "value": huge}]})).is_err());
    }
}
