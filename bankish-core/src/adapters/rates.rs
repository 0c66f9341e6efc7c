//! Exchange rate client
//!
//! Talks to an exchangerate.host-compatible endpoint:
//! `GET <url>?base=USD&symbols=USD,GBP,EUR` returning `{"rates": {...}}`.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

use super::http_api::{check_response_status, map_request_error};
use crate::domain::result::{Error, Result};
use crate::ports::RateSource;

pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate.host/latest";

const RATES_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: HashMap<String, JsonValue>,
}

/// Unauthenticated exchange rate client
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    client: Client,
    url: Url,
}

impl ExchangeRateClient {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url.trim())
            .map_err(|e| Error::config(format!("Invalid rates URL '{}': {}", url, e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(RATES_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, url })
    }

    fn request_url(&self, base: &str, symbols: &[&str]) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("base", base)
            .append_pair("symbols", &symbols.join(","));
        url
    }
}

impl RateSource for ExchangeRateClient {
    fn latest(&self, base: &str, symbols: &[&str]) -> Result<HashMap<String, Decimal>> {
        let url = self.request_url(base, symbols);
        let response = self.client.get(url).send().map_err(map_request_error)?;
        let response = check_response_status(response)?;
        let body: RatesResponse = response
            .json()
            .map_err(|e| Error::http(format!("Failed to parse rates response: {}", e)))?;
        parse_rates(body, base)
    }
}

fn parse_rates(body: RatesResponse, base: &str) -> Result<HashMap<String, Decimal>> {
    let mut rates: HashMap<String, Decimal> = body
        .rates
        .into_iter()
        .filter_map(|(code, value)| {
            let rate = match value {
                JsonValue::Number(n) => Decimal::from_str(&n.to_string()).ok(),
                JsonValue::String(s) => Decimal::from_str(&s).ok(),
                _ => None,
            }?;
            Some((code.to_uppercase(), rate))
        })
        .collect();

    if rates.is_empty() {
        return Err(Error::http("Exchange rate response contained no rates"));
    }
    rates.insert(base.to_uppercase(), Decimal::ONE);
    Ok(rates)
}
