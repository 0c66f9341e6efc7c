//! Transfer draft and request models
//!
//! A [`TransferDraft`] holds the editable field groups of every transfer
//! variant at once, so switching the transfer type never loses input. Only
//! the active variant is turned into a [`TransferRequest`] for submission.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::account::Account;
use super::money::decimal_places;
use super::result::{Error, Result};

/// Transfer category, exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferType {
    /// Between the caller's own accounts
    Internal,
    /// International wire (SWIFT)
    Wire,
    /// Regional bank transfer (SEPA)
    Regional,
    Crypto,
}

impl TransferType {
    pub const ALL: [TransferType; 4] = [
        TransferType::Internal,
        TransferType::Wire,
        TransferType::Regional,
        TransferType::Crypto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Internal => "internal",
            TransferType::Wire => "wire",
            TransferType::Regional => "regional",
            TransferType::Crypto => "crypto",
        }
    }

    /// Tag the backend expects in the `transferType` field
    pub fn wire_tag(&self) -> &'static str {
        match self {
            TransferType::Internal => "internal",
            TransferType::Wire => "swift",
            TransferType::Regional => "sepa",
            TransferType::Crypto => "crypto",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransferType::Internal => "My Accounts",
            TransferType::Wire => "SWIFT",
            TransferType::Regional => "SEPA",
            TransferType::Crypto => "Crypto",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "internal" => Ok(TransferType::Internal),
            "wire" | "swift" => Ok(TransferType::Wire),
            "regional" | "sepa" => Ok(TransferType::Regional),
            "crypto" => Ok(TransferType::Crypto),
            other => Err(Error::validation(format!(
                "unknown transfer type '{}' (expected internal, wire, regional or crypto)",
                other
            ))),
        }
    }
}

/// Cryptocurrencies the crypto variant can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CryptoCurrency {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "USDT")]
    Usdt,
}

impl CryptoCurrency {
    pub const ALL: [CryptoCurrency; 3] = [CryptoCurrency::Btc, CryptoCurrency::Eth, CryptoCurrency::Usdt];

    pub fn code(&self) -> &'static str {
        match self {
            CryptoCurrency::Btc => "BTC",
            CryptoCurrency::Eth => "ETH",
            CryptoCurrency::Usdt => "USDT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CryptoCurrency::Btc => "Bitcoin",
            CryptoCurrency::Eth => "Ethereum",
            CryptoCurrency::Usdt => "Tether",
        }
    }

    /// Network the transfer settles on
    pub fn network(&self) -> &'static str {
        match self {
            CryptoCurrency::Btc => "BTC",
            CryptoCurrency::Eth => "ERC20",
            CryptoCurrency::Usdt => "TRC20",
        }
    }
}

impl Default for CryptoCurrency {
    fn default() -> Self {
        CryptoCurrency::Btc
    }
}

impl fmt::Display for CryptoCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CryptoCurrency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "BTC" => Ok(CryptoCurrency::Btc),
            "ETH" => Ok(CryptoCurrency::Eth),
            "USDT" => Ok(CryptoCurrency::Usdt),
            other => Err(Error::validation(format!(
                "unsupported currency '{}' (expected BTC, ETH or USDT)",
                other
            ))),
        }
    }
}

// =============================================================================
// Field groups
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalFields {
    pub from_account_id: String,
    /// Account number of the destination account
    pub to_account: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFields {
    pub from_account_id: String,
    pub beneficiary_name: String,
    pub beneficiary_iban: String,
    pub swift_code: String,
    pub beneficiary_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalFields {
    pub from_account_id: String,
    pub beneficiary_name: String,
    pub beneficiary_iban: String,
    pub reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoFields {
    pub from_account_id: String,
    pub currency: CryptoCurrency,
    pub to_address: String,
    /// Crypto keeps its own amount instead of the shared one
    pub amount: String,
    /// Display-only estimate, sent as-is and never authoritative
    pub network_fee: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    pub amount: String,
    pub description: String,
}

/// Field group addressed by [`TransferDraft::set_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Internal,
    Wire,
    Regional,
    Crypto,
    Common,
}

impl From<TransferType> for Section {
    fn from(t: TransferType) -> Self {
        match t {
            TransferType::Internal => Section::Internal,
            TransferType::Wire => Section::Wire,
            TransferType::Regional => Section::Regional,
            TransferType::Crypto => Section::Crypto,
        }
    }
}

fn unknown_field(section: Section, field: &str) -> Error {
    Error::validation(format!("unknown field '{}' for {:?} section", field, section))
}

// =============================================================================
// Draft
// =============================================================================

/// Editable state of the transfer form
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub transfer_type: TransferType,
    pub internal: InternalFields,
    pub wire: WireFields,
    pub regional: RegionalFields,
    pub crypto: CryptoFields,
    pub common: CommonFields,
}

impl Default for TransferDraft {
    fn default() -> Self {
        Self {
            transfer_type: TransferType::Internal,
            internal: InternalFields::default(),
            wire: WireFields::default(),
            regional: RegionalFields::default(),
            crypto: CryptoFields::default(),
            common: CommonFields::default(),
        }
    }
}

impl TransferDraft {
    /// Fresh draft with the first account preselected as "from" in every variant
    pub fn with_defaults(accounts: &[Account]) -> Self {
        let mut draft = Self::default();
        if let Some(first) = accounts.first() {
            draft.set_from_account_everywhere(&first.id);
        }
        draft
    }

    fn set_from_account_everywhere(&mut self, account_id: &str) {
        self.internal.from_account_id = account_id.to_string();
        self.wire.from_account_id = account_id.to_string();
        self.regional.from_account_id = account_id.to_string();
        self.crypto.from_account_id = account_id.to_string();
    }

    /// Switch the active variant; the other groups keep their values
    pub fn set_transfer_type(&mut self, transfer_type: TransferType) {
        self.transfer_type = transfer_type;
    }

    /// Update one field of one group, using the backend's field names
    pub fn set_field(&mut self, section: Section, field: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match section {
            Section::Internal => match field {
                "fromAccountId" => self.internal.from_account_id = value,
                "toAccount" => self.internal.to_account = value,
                _ => return Err(unknown_field(section, field)),
            },
            Section::Wire => match field {
                "fromAccountId" => self.wire.from_account_id = value,
                "beneficiaryName" => self.wire.beneficiary_name = value,
                "beneficiaryIban" => self.wire.beneficiary_iban = value,
                "swiftCode" => self.wire.swift_code = value,
                "beneficiaryAddress" => self.wire.beneficiary_address = value,
                _ => return Err(unknown_field(section, field)),
            },
            Section::Regional => match field {
                "fromAccountId" => self.regional.from_account_id = value,
                "beneficiaryName" => self.regional.beneficiary_name = value,
                "beneficiaryIban" => self.regional.beneficiary_iban = value,
                "reference" => self.regional.reference = value,
                _ => return Err(unknown_field(section, field)),
            },
            Section::Crypto => match field {
                "fromAccountId" => self.crypto.from_account_id = value,
                "currency" => self.crypto.currency = value.parse()?,
                "toAddress" => self.crypto.to_address = value,
                "amount" => self.crypto.amount = value,
                "networkFee" => self.crypto.network_fee = value,
                _ => return Err(unknown_field(section, field)),
            },
            Section::Common => match field {
                "amount" => self.common.amount = value,
                "description" => self.common.description = value,
                _ => return Err(unknown_field(section, field)),
            },
        }
        Ok(())
    }

    /// "From" account of the active variant
    pub fn from_account_id(&self) -> &str {
        match self.transfer_type {
            TransferType::Internal => &self.internal.from_account_id,
            TransferType::Wire => &self.wire.from_account_id,
            TransferType::Regional => &self.regional.from_account_id,
            TransferType::Crypto => &self.crypto.from_account_id,
        }
    }

    /// Amount field shown for the active variant
    pub fn amount(&self) -> &str {
        match self.transfer_type {
            TransferType::Crypto => &self.crypto.amount,
            _ => &self.common.amount,
        }
    }

    /// Destination choices for an internal transfer, excluding the "from" account
    pub fn to_account_candidates<'a>(&self, accounts: &'a [Account]) -> Vec<&'a Account> {
        accounts
            .iter()
            .filter(|a| a.id != self.internal.from_account_id)
            .collect()
    }

    /// Same checks a browser applies to `type=number step=0.01 required` inputs
    pub fn check_input_constraints(&self) -> Result<()> {
        let amount = self.amount().trim();
        if amount.is_empty() {
            return Err(Error::validation("amount is required"));
        }
        let value = amount
            .parse::<Decimal>()
            .map_err(|_| Error::validation(format!("amount '{}' is not a number", amount)))?;
        if self.transfer_type != TransferType::Crypto && decimal_places(value) > 2 {
            return Err(Error::validation("amount must have at most two decimal places"));
        }
        Ok(())
    }

    /// Build the request for the active variant only
    pub fn request(&self) -> TransferRequest {
        let common = self.common.clone();
        match self.transfer_type {
            TransferType::Internal => TransferRequest::Internal {
                common,
                fields: self.internal.clone(),
            },
            TransferType::Wire => TransferRequest::Wire {
                common,
                fields: self.wire.clone(),
            },
            TransferType::Regional => TransferRequest::Regional {
                common,
                fields: self.regional.clone(),
            },
            TransferType::Crypto => TransferRequest::Crypto {
                common,
                fields: self.crypto.clone(),
            },
        }
    }
}

// =============================================================================
// Request
// =============================================================================

/// A submittable transfer: one constructor per transfer type
#[derive(Debug, Clone, PartialEq)]
pub enum TransferRequest {
    Internal { common: CommonFields, fields: InternalFields },
    Wire { common: CommonFields, fields: WireFields },
    Regional { common: CommonFields, fields: RegionalFields },
    Crypto { common: CommonFields, fields: CryptoFields },
}

impl TransferRequest {
    pub fn transfer_type(&self) -> TransferType {
        match self {
            TransferRequest::Internal { .. } => TransferType::Internal,
            TransferRequest::Wire { .. } => TransferType::Wire,
            TransferRequest::Regional { .. } => TransferType::Regional,
            TransferRequest::Crypto { .. } => TransferType::Crypto,
        }
    }

    /// Destination the backend sees in `toAccount`
    pub fn destination(&self) -> &str {
        match self {
            TransferRequest::Internal { fields, .. } => &fields.to_account,
            TransferRequest::Wire { fields, .. } => &fields.beneficiary_iban,
            TransferRequest::Regional { fields, .. } => &fields.beneficiary_iban,
            TransferRequest::Crypto { fields, .. } => &fields.to_address,
        }
    }

    /// Flatten into the JSON body of `POST /transactions/transfer`
    ///
    /// Order of precedence: tag, shared fields, variant fields (crypto's own
    /// amount replaces the shared one), then the derived `toAccount`.
    pub fn to_payload(&self) -> Result<JsonValue> {
        let mut body = Map::new();
        body.insert(
            "transferType".to_string(),
            JsonValue::String(self.transfer_type().wire_tag().to_string()),
        );

        let (common, fields) = match self {
            TransferRequest::Internal { common, fields } => (common, serde_json::to_value(fields)?),
            TransferRequest::Wire { common, fields } => (common, serde_json::to_value(fields)?),
            TransferRequest::Regional { common, fields } => (common, serde_json::to_value(fields)?),
            TransferRequest::Crypto { common, fields } => (common, serde_json::to_value(fields)?),
        };

        merge_object(&mut body, serde_json::to_value(common)?);
        merge_object(&mut body, fields);
        body.insert(
            "toAccount".to_string(),
            JsonValue::String(self.destination().to_string()),
        );

        Ok(JsonValue::Object(body))
    }
}

fn merge_object(target: &mut Map<String, JsonValue>, source: JsonValue) {
    if let JsonValue::Object(map) = source {
        for (key, value) in map {
            target.insert(key, value);
        }
    }
}

/// Outcome shown on the terminal screen of the wizard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResult {
    pub success: bool,
    pub message: Option<String>,
}

impl TransferResult {
    pub fn succeeded(message: Option<String>) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
