//! Bankish backend HTTP client
//!
//! Blocking reqwest client for the Bankish REST API. Every request carries
//! `Authorization: Bearer <token>` taken from the caller's credentials.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AdminUser, Card, DashboardStats, ManualTransaction, Transaction, UserProfile};
use crate::ports::{Acknowledgement, BankingApi, Credentials};

/// Default production API URL
pub const BANKISH_PRODUCTION_URL: &str = "https://bankishbackend.onrender.com/api";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Bankish API client
#[derive(Debug, Clone)]
pub struct BankishClient {
    client: Client,
    base_url: String,
}

impl BankishClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::config("API base URL cannot be empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, credentials: &Credentials) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .header("Authorization", credentials.authorization())
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, credentials: &Credentials) -> Result<T> {
        let response = self
            .request(Method::GET, path, credentials)
            .send()
            .map_err(map_request_error)?;

        let response = check_response_status(response)?;
        response
            .json()
            .map_err(|e| Error::http(format!("Failed to parse response from {}: {}", path, e)))
    }

    fn send_json(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
        body: &JsonValue,
    ) -> Result<Acknowledgement> {
        let response = self
            .request(method, path, credentials)
            .json(body)
            .send()
            .map_err(map_request_error)?;

        let response = check_response_status(response)?;

        // Some endpoints answer with an empty body
        let text = response.text().unwrap_or_default();
        let message = serde_json::from_str::<JsonValue>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

        Ok(Acknowledgement { message })
    }
}

impl BankingApi for BankishClient {
    fn get_accounts(&self, credentials: &Credentials) -> Result<Vec<Account>> {
        self.get_json("/accounts", credentials)
    }

    fn get_profile(&self, credentials: &Credentials) -> Result<UserProfile> {
        self.get_json("/auth/me", credentials)
    }

    fn submit_transfer(&self, credentials: &Credentials, payload: &JsonValue) -> Result<Acknowledgement> {
        self.send_json(Method::POST, "/transactions/transfer", credentials, payload)
    }

    fn get_transactions(&self, credentials: &Credentials) -> Result<Vec<Transaction>> {
        self.get_json("/transactions", credentials)
    }

    fn get_cards(&self, credentials: &Credentials) -> Result<Vec<Card>> {
        self.get_json("/cards", credentials)
    }

    fn get_dashboard_stats(&self, credentials: &Credentials) -> Result<DashboardStats> {
        self.get_json("/dashboard/stats", credentials)
    }

    fn admin_list_users(&self, credentials: &Credentials) -> Result<Vec<AdminUser>> {
        self.get_json("/admin/users", credentials)
    }

    fn admin_update_balance(
        &self,
        credentials: &Credentials,
        account_id: &str,
        balance: Decimal,
    ) -> Result<Acknowledgement> {
        let balance = balance
            .to_f64()
            .ok_or_else(|| Error::validation("balance is out of range"))?;
        let body = serde_json::json!({ "balance": balance });
        self.send_json(
            Method::PATCH,
            &format!("/admin/accounts/{}", account_id),
            credentials,
            &body,
        )
    }

    fn admin_add_transaction(
        &self,
        credentials: &Credentials,
        transaction: &ManualTransaction,
    ) -> Result<Acknowledgement> {
        let body = serde_json::to_value(transaction)?;
        self.send_json(Method::POST, "/admin/transactions", credentials, &body)
    }
}

/// Map request errors to user-friendly messages
pub(crate) fn map_request_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::http(format!("Connection timed out after {} seconds", REQUEST_TIMEOUT_SECS))
    } else if error.is_connect() {
        Error::http("Unable to connect to the server")
    } else {
        Error::http(format!("Request failed: {}", error))
    }
}

/// Pass successful responses through; turn the rest into typed errors,
/// preferring the backend's own `message` (or `error`) text
pub(crate) fn check_response_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let body = response.text().unwrap_or_default();
    let message = extract_message(&body);

    match code {
        401 => Err(Error::Unauthorized),
        403 => Err(Error::api(
            code,
            message.unwrap_or_else(|| "Access denied".to_string()),
        )),
        404 => Err(Error::not_found(
            message.unwrap_or_else(|| "resource not found".to_string()),
        )),
        429 => Err(Error::api(
            code,
            message.unwrap_or_else(|| "Rate limit exceeded. Please wait a moment and try again.".to_string()),
        )),
        _ => Err(Error::api(
            code,
            message.unwrap_or_else(|| format!("Request failed with HTTP {}", code)),
        )),
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_backend::{MockBackend, MockConfig};

    #[test]
    fn test_reject_empty_base_url() {
        let result = BankishClient::new("  ");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BankishClient::new("http://localhost/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost/api");
    }

    #[test]
    fn test_extract_message_prefers_message_field() {
        assert_eq!(
            extract_message(r#"{"message": "Insufficient funds", "error": "x"}"#),
            Some("Insufficient funds".to_string())
        );
        assert_eq!(extract_message(r#"{"error": "Bad IBAN"}"#), Some("Bad IBAN".to_string()));
        assert_eq!(extract_message(r#"{"message": ""}"#), None);
        assert_eq!(extract_message("<html>oops</html>"), None);
    }

    fn creds() -> Credentials {
        Credentials::bearer("valid_token").unwrap()
    }

    #[test]
    fn test_get_accounts_sends_bearer_and_preserves_order() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let client = BankishClient::new(&server.base_url()).unwrap();

        let accounts = client.get_accounts(&creds()).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, "acc-1");
        assert_eq!(accounts[1].id, "acc-2");
        assert_eq!(server.hits("GET /accounts"), 1);

        // Repeating the read changes nothing
        let again = client.get_accounts(&creds()).unwrap();
        assert_eq!(accounts, again);
        assert_eq!(server.hits("GET /accounts"), 2);
    }

    #[test]
    fn test_invalid_token_is_unauthorized() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let client = BankishClient::new(&server.base_url()).unwrap();

        let bad = Credentials::bearer("expired").unwrap();
        let err = client.get_profile(&bad).unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn test_server_error_surfaces_backend_message() {
        let config = MockConfig {
            server_error: true,
            ..Default::default()
        };
        let server = MockBackend::start(config).unwrap();
        let client = BankishClient::new(&server.base_url()).unwrap();

        let err = client.get_cards(&creds()).unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Something went wrong");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_submit_transfer_posts_payload() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let client = BankishClient::new(&server.base_url()).unwrap();

        let payload = serde_json::json!({"transferType": "internal", "amount": "10", "toAccount": "42"});
        let ack = client.submit_transfer(&creds(), &payload).unwrap();
        assert_eq!(ack.message.as_deref(), Some("Transfer successful"));
        assert_eq!(server.hits("POST /transactions/transfer"), 1);
        assert_eq!(server.last_body(), Some(payload));
    }

    #[test]
    fn test_rejected_transfer_message() {
        let config = MockConfig {
            reject_transfer: Some("Insufficient funds".to_string()),
            ..Default::default()
        };
        let server = MockBackend::start(config).unwrap();
        let client = BankishClient::new(&server.base_url()).unwrap();

        let err = client
            .submit_transfer(&creds(), &serde_json::json!({"transferType": "internal"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient funds");
    }

    #[test]
    fn test_admin_update_balance_sends_number() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let client = BankishClient::new(&server.base_url()).unwrap();

        client
            .admin_update_balance(&creds(), "acc-1", Decimal::new(150050, 2))
            .unwrap();
        assert_eq!(server.hits("PATCH /admin/accounts/acc-1"), 1);
        assert_eq!(server.last_body(), Some(serde_json::json!({"balance": 1500.5})));
    }

    #[test]
    fn test_profile_and_dashboard_parse() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let client = BankishClient::new(&server.base_url()).unwrap();

        let profile = client.get_profile(&creds()).unwrap();
        assert_eq!(profile.awc_code.as_deref(), Some("1234"));
        assert_eq!(profile.full_name(), "Ada Lovelace");

        let stats = client.get_dashboard_stats(&creds()).unwrap();
        assert_eq!(stats.account_count, 2);
        assert_eq!(stats.recent_transactions.len(), 1);
    }
}
