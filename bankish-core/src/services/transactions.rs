//! Transaction history: fetch, filter, paginate

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{Transaction, TransactionKind};
use crate::ports::{BankingApi, Credentials};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Type filter: everything, or one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(TransactionKind),
}

impl FromStr for KindFilter {
    type Err = crate::domain::result::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(KindFilter::All);
        }
        Ok(KindFilter::Only(s.parse()?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Case-insensitive match on description or recipient
    pub search: String,
    pub kind: KindFilter,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        let kind_ok = match self.kind {
            KindFilter::All => true,
            KindFilter::Only(kind) => tx.kind == kind,
        };
        kind_ok && tx.matches_search(&self.search)
    }

    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).collect()
    }
}

/// One page of results, 1-based
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    /// 1-based index of the first item shown (0 when empty)
    pub start: usize,
    /// 1-based index of the last item shown
    pub end: usize,
}

/// Slice `items` into pages; out-of-range pages clamp to the last one
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let offset = (page - 1) * per_page;
    let slice: Vec<T> = items.iter().skip(offset).take(per_page).cloned().collect();
    let (start, end) = if slice.is_empty() {
        (0, 0)
    } else {
        (offset + 1, offset + slice.len())
    };

    Page {
        items: slice,
        page,
        total_pages,
        total,
        start,
        end,
    }
}

pub struct TransactionService {
    api: Arc<dyn BankingApi>,
}

impl TransactionService {
    pub fn new(api: Arc<dyn BankingApi>) -> Self {
        Self { api }
    }

    pub fn list(&self, credentials: &Credentials) -> Result<Vec<Transaction>> {
        self.api.get_transactions(credentials)
    }

    /// Fetch, filter, and return one page
    pub fn browse(
        &self,
        credentials: &Credentials,
        filter: &TransactionFilter,
        page: usize,
    ) -> Result<Page<Transaction>> {
        let all = self.list(credentials)?;
        let matching: Vec<Transaction> = filter.apply(&all).into_iter().cloned().collect();
        Ok(paginate(&matching, page, DEFAULT_PAGE_SIZE))
    }
}
