//! Bill pay
//!
//! Payees and scheduled payments are kept on this machine only, in
//! `payees.json` inside the Bankish directory. Nothing is sent to the
//! backend. A missing file starts from the default payee list.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::domain::money::decimal_places;
use crate::domain::result::{Error, Result};

const PAYEES_FILE: &str = "payees.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayeeCategory {
    Utilities,
    Housing,
    Transportation,
    Insurance,
    Other,
}

impl PayeeCategory {
    pub const ALL: [PayeeCategory; 5] = [
        PayeeCategory::Utilities,
        PayeeCategory::Housing,
        PayeeCategory::Transportation,
        PayeeCategory::Insurance,
        PayeeCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayeeCategory::Utilities => "Utilities",
            PayeeCategory::Housing => "Housing",
            PayeeCategory::Transportation => "Transportation",
            PayeeCategory::Insurance => "Insurance",
            PayeeCategory::Other => "Other",
        }
    }
}

impl fmt::Display for PayeeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PayeeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PayeeCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::validation(format!(
                    "unknown category '{}' (expected Utilities, Housing, Transportation, Insurance or Other)",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub id: u32,
    pub name: String,
    pub category: PayeeCategory,
    #[serde(default)]
    pub next_due: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Decimal,
}

/// Payment form as entered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillPayment {
    pub payee_id: String,
    pub amount: String,
    /// `YYYY-MM-DD`
    pub payment_date: String,
    /// Paying account id
    pub account: String,
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPayment {
    pub id: Uuid,
    pub payee_id: u32,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BookFile {
    #[serde(default)]
    payees: Vec<Payee>,
    #[serde(default)]
    scheduled: Vec<ScheduledPayment>,
}

fn default_payees() -> Vec<Payee> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
    vec![
        Payee {
            id: 1,
            name: "Electric Company".to_string(),
            category: PayeeCategory::Utilities,
            next_due: date(2024, 1, 15),
            amount: Decimal::new(12550, 2),
        },
        Payee {
            id: 2,
            name: "Mortgage Payment".to_string(),
            category: PayeeCategory::Housing,
            next_due: date(2024, 1, 1),
            amount: Decimal::new(185000, 2),
        },
        Payee {
            id: 3,
            name: "Car Insurance".to_string(),
            category: PayeeCategory::Transportation,
            next_due: date(2024, 1, 10),
            amount: Decimal::new(8999, 2),
        },
        Payee {
            id: 4,
            name: "Mobile Phone".to_string(),
            category: PayeeCategory::Utilities,
            next_due: date(2024, 1, 5),
            amount: Decimal::new(6500, 2),
        },
    ]
}

/// Payees and scheduled payments, saved after every change
pub struct BillPayBook {
    path: PathBuf,
    book: BookFile,
}

impl BillPayBook {
    pub fn open(bankish_dir: &Path) -> Result<Self> {
        let path = bankish_dir.join(PAYEES_FILE);
        let book = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BookFile {
                payees: default_payees(),
                scheduled: Vec::new(),
            }
        };
        Ok(Self { path, book })
    }

    pub fn payees(&self) -> &[Payee] {
        &self.book.payees
    }

    pub fn scheduled(&self) -> &[ScheduledPayment] {
        &self.book.scheduled
    }

    pub fn payee(&self, id: u32) -> Option<&Payee> {
        self.book.payees.iter().find(|p| p.id == id)
    }

    /// New payee with the next free id; no due date or amount yet
    pub fn add_payee(&mut self, name: &str, category: PayeeCategory) -> Result<Payee> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("payee name is required"));
        }
        let id = self.book.payees.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let payee = Payee {
            id,
            name: name.to_string(),
            category,
            next_due: None,
            amount: Decimal::ZERO,
        };
        let mut next = self.book.clone();
        next.payees.push(payee.clone());
        self.commit(next)?;
        Ok(payee)
    }

    pub fn remove_payee(&mut self, id: u32) -> Result<Payee> {
        let index = self
            .book
            .payees
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::not_found(format!("payee {}", id)))?;
        let mut next = self.book.clone();
        let removed = next.payees.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    /// Validate the form and record the payment locally
    pub fn schedule_payment(&mut self, payment: &BillPayment) -> Result<ScheduledPayment> {
        let payee_id: u32 = required(&payment.payee_id, "payee")?
            .parse()
            .map_err(|_| Error::validation(format!("payee '{}' is not a valid id", payment.payee_id)))?;
        if self.payee(payee_id).is_none() {
            return Err(Error::not_found(format!("payee {}", payee_id)));
        }

        let amount_text = required(&payment.amount, "amount")?;
        let amount: Decimal = amount_text
            .parse()
            .map_err(|_| Error::validation(format!("amount '{}' is not a number", amount_text)))?;
        if decimal_places(amount) > 2 {
            return Err(Error::validation("amount must have at most two decimal places"));
        }

        let date_text = required(&payment.payment_date, "payment date")?;
        let payment_date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
            .map_err(|_| Error::validation(format!("payment date '{}' must be YYYY-MM-DD", date_text)))?;

        let account = required(&payment.account, "account")?.to_string();
        let memo = Some(payment.memo.trim().to_string()).filter(|m| !m.is_empty());

        let scheduled = ScheduledPayment {
            id: Uuid::new_v4(),
            payee_id,
            amount,
            payment_date,
            account,
            memo,
            created_at: Utc::now(),
        };
        let mut next = self.book.clone();
        next.scheduled.push(scheduled.clone());
        self.commit(next)?;
        Ok(scheduled)
    }

    /// Write `next` to disk, then adopt it; a failed write changes nothing
    fn commit(&mut self, next: BookFile) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::config("payees file has no parent directory"))?;
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(&next)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        self.book = next;
        Ok(())
    }
}

fn required<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} is required", name)));
    }
    Ok(value)
}
