//! Cards view

use std::sync::Arc;

use serde::Serialize;

use crate::domain::money::format_currency;
use crate::domain::result::Result;
use crate::domain::Card;
use crate::ports::{BankingApi, Credentials};

/// One card as shown to its holder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: String,
    pub card_type: String,
    pub number: String,
    pub expiry: String,
    pub status: String,
    pub credit_limit: Option<String>,
    pub holder: String,
}

impl CardView {
    pub fn new(card: &Card, holder: &str, reveal: bool, currency: &str) -> Self {
        Self {
            id: card.id.clone(),
            card_type: card.card_type.as_str().to_string(),
            number: if reveal {
                card.formatted_number()
            } else {
                card.masked_number()
            },
            expiry: card.expiry_date.clone().unwrap_or_else(|| "--/--".to_string()),
            status: card.status.as_str().to_string(),
            credit_limit: card.display_limit().map(|l| format_currency(l, currency)),
            holder: holder.to_uppercase(),
        }
    }
}

pub struct CardService {
    api: Arc<dyn BankingApi>,
}

impl CardService {
    pub fn new(api: Arc<dyn BankingApi>) -> Self {
        Self { api }
    }

    pub fn list(&self, credentials: &Credentials) -> Result<Vec<Card>> {
        self.api.get_cards(credentials)
    }

    /// Cards with the holder's name from the profile; a missing profile
    /// leaves the name blank rather than failing the view
    pub fn views(&self, credentials: &Credentials, reveal: bool, currency: &str) -> Result<Vec<CardView>> {
        let cards = self.list(credentials)?;
        let holder = self
            .api
            .get_profile(credentials)
            .map(|p| p.full_name())
            .unwrap_or_default();
        Ok(cards
            .iter()
            .map(|c| CardView::new(c, &holder, reveal, currency))
            .collect())
    }
}
