//! End-to-end tests for the transfer wizard
//!
//! The backend is an in-memory `BankingApi` fake that records every call,
//! so ordering and call counts can be asserted exactly.
//!
//! Run with: cargo test --test transfer_flow_test -- --nocapture

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use bankish_core::domain::result::Result;
use bankish_core::domain::{AccountType, CryptoCurrency, ManualTransaction, Section, TransferType};
use bankish_core::ports::{Acknowledgement, BankingApi, Credentials, FeeSource};
use bankish_core::services::{
    AccountService, AccountsView, FeeStatus, TransferWizard, WizardState, INVALID_CODE_MESSAGE,
};
use bankish_core::{Account, AdminUser, Card, DashboardStats, Error, Transaction, TransferResult, UserProfile};

// ============================================================================
// Test Helpers
// ============================================================================

/// Scripted backend. Each `get_accounts` call takes the next list from
/// `account_lists`; the last list repeats.
struct FakeBank {
    account_lists: Mutex<Vec<Vec<Account>>>,
    awc_code: Option<String>,
    fail_accounts: bool,
    transfer_error: Option<String>,
    calls: Mutex<Vec<String>>,
    payloads: Mutex<Vec<JsonValue>>,
}

impl FakeBank {
    fn new(account_lists: Vec<Vec<Account>>) -> Self {
        Self {
            account_lists: Mutex::new(account_lists),
            awc_code: Some("1234".to_string()),
            fail_accounts: false,
            transfer_error: None,
            calls: Mutex::new(Vec::new()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn payloads(&self) -> Vec<JsonValue> {
        self.payloads.lock().unwrap().clone()
    }
}

impl BankingApi for FakeBank {
    fn get_accounts(&self, _credentials: &Credentials) -> Result<Vec<Account>> {
        self.record("accounts");
        if self.fail_accounts {
            return Err(Error::http("Unable to connect to the server"));
        }
        let mut lists = self.account_lists.lock().unwrap();
        if lists.len() > 1 {
            Ok(lists.remove(0))
        } else {
            Ok(lists.first().cloned().unwrap_or_default())
        }
    }

    fn get_profile(&self, _credentials: &Credentials) -> Result<UserProfile> {
        self.record("profile");
        let mut profile: UserProfile =
            serde_json::from_str(r#"{"_id": "u1", "firstName": "Ada", "lastName": "Lovelace"}"#).unwrap();
        profile.awc_code = self.awc_code.clone();
        Ok(profile)
    }

    fn submit_transfer(
        &self,
        _credentials: &Credentials,
        payload: &JsonValue,
    ) -> Result<Acknowledgement> {
        self.record("transfer");
        self.payloads.lock().unwrap().push(payload.clone());
        match &self.transfer_error {
            Some(message) => Err(Error::api(400, message.clone())),
            None => Ok(Acknowledgement {
                message: Some("Transfer successful".to_string()),
            }),
        }
    }

    fn get_transactions(&self, _: &Credentials) -> Result<Vec<Transaction>> {
        Ok(Vec::new())
    }

    fn get_cards(&self, _: &Credentials) -> Result<Vec<Card>> {
        Ok(Vec::new())
    }

    fn get_dashboard_stats(&self, _: &Credentials) -> Result<DashboardStats> {
        Ok(DashboardStats::default())
    }

    fn admin_list_users(&self, _: &Credentials) -> Result<Vec<AdminUser>> {
        Ok(Vec::new())
    }

    fn admin_update_balance(
        &self,
        _: &Credentials,
        _: &str,
        _: Decimal,
    ) -> Result<Acknowledgement> {
        Ok(Acknowledgement::default())
    }

    fn admin_add_transaction(
        &self,
        _: &Credentials,
        _: &ManualTransaction,
    ) -> Result<Acknowledgement> {
        Ok(Acknowledgement::default())
    }
}

struct FixedFee;

impl FeeSource for FixedFee {
    fn name(&self) -> &str {
        "fixed"
    }

    fn estimate(&self, currency: CryptoCurrency, _amount: &str) -> Result<String> {
        Ok(format!("0.000140 {}", currency.code()))
    }
}

fn account(id: &str, kind: AccountType, number: &str, balance: i64) -> Account {
    Account::new(id, kind, number, Decimal::new(balance, 0))
}

fn two_accounts() -> Vec<Account> {
    vec![
        account("A", AccountType::Checking, "1111222233334444", 1000),
        account("B", AccountType::Savings, "5555666677778888", 500),
    ]
}

fn mounted(bank: Arc<FakeBank>) -> TransferWizard {
    let mut wizard = TransferWizard::new(bank, Arc::new(FixedFee), Credentials::bearer("tok").unwrap())
        .with_processing_delay(Duration::ZERO);
    wizard.mount();
    wizard
}

fn fill_internal(wizard: &mut TransferWizard, amount: &str) {
    wizard
        .set_field(Section::Internal, "toAccount", "5555666677778888")
        .unwrap();
    wizard.set_field(Section::Common, "amount", amount).unwrap();
}

// ============================================================================
// Mount
// ============================================================================

#[test]
fn test_mount_loads_accounts_and_code_once() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let wizard = mounted(bank.clone());

    assert_eq!(bank.calls(), vec!["accounts", "profile"]);
    assert_eq!(wizard.accounts().len(), 2);
    assert!(wizard.has_expected_code());
    assert_eq!(wizard.draft().from_account_id(), "A");
    assert_eq!(wizard.state(), &WizardState::Editing { error: None });
}

#[test]
fn test_account_failure_leaves_empty_selectors() {
    let mut bank = FakeBank::new(vec![two_accounts()]);
    bank.fail_accounts = true;
    let wizard = mounted(Arc::new(bank));

    assert!(wizard.accounts().is_empty());
    assert_eq!(wizard.draft().from_account_id(), "");
    assert_eq!(wizard.state(), &WizardState::Editing { error: None });
}

#[test]
fn test_to_account_candidates_exclude_from_account() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank);

    let ids: Vec<&str> = wizard.to_account_candidates().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["B"]);

    wizard.set_field(Section::Internal, "fromAccountId", "B").unwrap();
    let candidates = wizard.to_account_candidates();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "A");
    assert_eq!(candidates[0].selector_label(), "checking (••••4444)");
}

#[test]
fn test_loading_accounts_twice_gives_the_same_lists() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let credentials = Credentials::bearer("tok").unwrap();

    let service = AccountService::new(bank.clone());
    let first = AccountsView::new(&service.load(&credentials), "USD", true);
    let second = AccountsView::new(&service.load(&credentials), "USD", true);
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.total, second.total);
    assert_eq!(first.rows.len(), 2);

    let mut wizard = mounted(bank.clone());
    let view = AccountsView::new(wizard.accounts(), "USD", true);
    let candidates: Vec<String> = wizard.to_account_candidates().iter().map(|a| a.id.clone()).collect();

    wizard.mount();
    let remounted: Vec<String> = wizard.to_account_candidates().iter().map(|a| a.id.clone()).collect();
    assert_eq!(AccountsView::new(wizard.accounts(), "USD", true).rows, view.rows);
    assert_eq!(remounted, candidates);
    assert_eq!(remounted, vec!["B"]);
    assert_eq!(wizard.accounts().len(), 2);
    assert_eq!(bank.count("accounts"), 4);
}

// ============================================================================
// Form State
// ============================================================================

#[test]
fn test_switching_types_keeps_every_group() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank);

    wizard.set_transfer_type(TransferType::Wire).unwrap();
    wizard.set_field(Section::Wire, "beneficiaryName", "Jane Doe").unwrap();
    wizard.set_field(Section::Wire, "swiftCode", "DEUTDEFF").unwrap();
    wizard.set_transfer_type(TransferType::Regional).unwrap();
    wizard.set_field(Section::Regional, "reference", "INV-7").unwrap();
    wizard.set_transfer_type(TransferType::Wire).unwrap();

    assert_eq!(wizard.draft().wire.beneficiary_name, "Jane Doe");
    assert_eq!(wizard.draft().wire.swift_code, "DEUTDEFF");
    assert_eq!(wizard.draft().regional.reference, "INV-7");
}

#[test]
fn test_unknown_field_is_rejected() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank);

    let err = wizard.set_field(Section::Internal, "swiftCode", "X").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_submit_requires_amount() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank.clone());

    assert!(matches!(wizard.submit(), Err(Error::Validation(_))));
    wizard.set_field(Section::Common, "amount", "12.345").unwrap();
    assert!(matches!(wizard.submit(), Err(Error::Validation(_))));
    assert_eq!(wizard.state(), &WizardState::Editing { error: None });
    assert_eq!(bank.count("transfer"), 0);
}

// ============================================================================
// Confirmation Gate
// ============================================================================

#[test]
fn test_wrong_code_then_right_code() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank.clone());
    fill_internal(&mut wizard, "100");

    wizard.submit().unwrap();
    assert!(matches!(wizard.state(), WizardState::AwaitingCode { .. }));

    wizard.enter_code("0000").unwrap();
    let state = wizard.confirm().unwrap().clone();
    assert_eq!(
        state,
        WizardState::AwaitingCode {
            entered: String::new(),
            error: Some(INVALID_CODE_MESSAGE.to_string()),
        }
    );
    assert_eq!(bank.count("transfer"), 0);

    wizard.enter_code("1234").unwrap();
    wizard.confirm().unwrap();
    assert_eq!(
        wizard.state(),
        &WizardState::Success(TransferResult::succeeded(Some("Transfer successful".to_string())))
    );
    assert_eq!(bank.count("transfer"), 1);
    // The code was never re-read
    assert_eq!(bank.count("profile"), 1);
}

#[test]
fn test_code_compare_is_exact() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank.clone());
    fill_internal(&mut wizard, "5");
    wizard.submit().unwrap();

    for attempt in [" 1234", "1234 ", "12345", ""] {
        wizard.enter_code(attempt).unwrap();
        wizard.confirm().unwrap();
        assert!(matches!(wizard.state(), WizardState::AwaitingCode { error: Some(_), .. }));
    }
    assert_eq!(bank.count("transfer"), 0);
}

#[test]
fn test_missing_code_rejects_every_attempt() {
    let mut bank = FakeBank::new(vec![two_accounts()]);
    bank.awc_code = None;
    let bank = Arc::new(bank);
    let mut wizard = mounted(bank.clone());
    assert!(!wizard.has_expected_code());

    fill_internal(&mut wizard, "5");
    wizard.submit().unwrap();
    for attempt in ["", "1234", "0000"] {
        wizard.enter_code(attempt).unwrap();
        wizard.confirm().unwrap();
    }
    assert!(matches!(wizard.state(), WizardState::AwaitingCode { error: Some(_), .. }));
    assert_eq!(bank.count("transfer"), 0);
}

#[test]
fn test_cancel_keeps_draft_and_discard_resets_it() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank.clone());
    fill_internal(&mut wizard, "42");
    wizard.submit().unwrap();
    wizard.enter_code("99").unwrap();

    wizard.cancel().unwrap();
    assert_eq!(wizard.state(), &WizardState::Editing { error: None });
    assert_eq!(wizard.draft().common.amount, "42");
    assert_eq!(bank.count("transfer"), 0);

    // Reopening starts with an empty code
    wizard.submit().unwrap();
    assert_eq!(
        wizard.state(),
        &WizardState::AwaitingCode {
            entered: String::new(),
            error: None
        }
    );

    wizard.discard().unwrap();
    assert_eq!(wizard.draft().common.amount, "");
    assert_eq!(wizard.draft().from_account_id(), "A");
}

#[test]
fn test_out_of_order_actions_are_rejected() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank.clone());

    assert!(matches!(wizard.confirm(), Err(Error::InvalidState(_))));
    assert!(matches!(wizard.enter_code("1234"), Err(Error::InvalidState(_))));
    assert!(matches!(wizard.open_code_prompt(), Err(Error::InvalidState(_))));
    assert!(matches!(wizard.start_another(), Err(Error::InvalidState(_))));

    fill_internal(&mut wizard, "1");
    wizard.submit().unwrap();
    // A second submit while the prompt is open is refused
    assert!(matches!(wizard.submit(), Err(Error::InvalidState(_))));
    assert!(matches!(
        wizard.set_field(Section::Common, "amount", "2"),
        Err(Error::InvalidState(_))
    ));
}

#[test]
fn test_processing_delay_before_prompt() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = TransferWizard::new(bank, Arc::new(FixedFee), Credentials::bearer("tok").unwrap())
        .with_processing_delay(Duration::from_millis(50));
    wizard.mount();
    fill_internal(&mut wizard, "1");

    assert_eq!(wizard.submit().unwrap(), &WizardState::Processing);
    let started = std::time::Instant::now();
    wizard.open_code_prompt().unwrap();
    assert!(started.elapsed() <= Duration::from_millis(1000));
    assert!(matches!(wizard.state(), WizardState::AwaitingCode { .. }));
}

// ============================================================================
// Submission
// ============================================================================

#[test]
fn test_success_refreshes_accounts_once_and_resets_form() {
    let refreshed = vec![
        account("B", AccountType::Savings, "5555666677778888", 600),
        account("A", AccountType::Checking, "1111222233334444", 900),
    ];
    let bank = Arc::new(FakeBank::new(vec![two_accounts(), refreshed]));
    let mut wizard = mounted(bank.clone());
    fill_internal(&mut wizard, "100");
    wizard.set_field(Section::Common, "description", "Savings top-up").unwrap();

    wizard.submit().unwrap();
    wizard.enter_code("1234").unwrap();
    wizard.confirm().unwrap();

    // Refresh strictly after the transfer, exactly once
    assert_eq!(bank.calls(), vec!["accounts", "profile", "transfer", "accounts"]);
    assert_eq!(wizard.accounts()[0].balance, Decimal::new(600, 0));
    // Defaults follow the first account of the new list
    assert_eq!(wizard.draft().from_account_id(), "B");
    assert_eq!(wizard.draft().common.amount, "");

    let payload = &bank.payloads()[0];
    assert_eq!(payload["transferType"], "internal");
    assert_eq!(payload["fromAccountId"], "A");
    assert_eq!(payload["toAccount"], "5555666677778888");
    assert_eq!(payload["amount"], "100");
    assert_eq!(payload["description"], "Savings top-up");

    wizard.start_another().unwrap();
    assert_eq!(wizard.state(), &WizardState::Editing { error: None });
}

#[test]
fn test_failure_returns_to_form_without_refresh() {
    let mut bank = FakeBank::new(vec![two_accounts()]);
    bank.transfer_error = Some("Insufficient funds".to_string());
    let bank = Arc::new(bank);
    let mut wizard = mounted(bank.clone());
    fill_internal(&mut wizard, "5000");

    wizard.submit().unwrap();
    wizard.enter_code("1234").unwrap();
    wizard.confirm().unwrap();

    assert_eq!(
        wizard.state(),
        &WizardState::Editing {
            error: Some("Insufficient funds".to_string())
        }
    );
    assert_eq!(bank.count("accounts"), 1);
    assert_eq!(wizard.draft().common.amount, "5000");
}

#[test]
fn test_wire_payload_uses_iban_as_destination() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank.clone());

    wizard.set_transfer_type(TransferType::Wire).unwrap();
    wizard.set_field(Section::Wire, "beneficiaryName", "Jane Doe").unwrap();
    wizard
        .set_field(Section::Wire, "beneficiaryIban", "DE89370400440532013000")
        .unwrap();
    wizard.set_field(Section::Wire, "swiftCode", "COBADEFFXXX").unwrap();
    wizard.set_field(Section::Common, "amount", "250.00").unwrap();
    // Filled earlier, must not leak into a wire transfer
    wizard.set_field(Section::Internal, "toAccount", "5555666677778888").unwrap();

    wizard.submit().unwrap();
    wizard.enter_code("1234").unwrap();
    wizard.confirm().unwrap();

    let payload = &bank.payloads()[0];
    assert_eq!(payload["transferType"], "swift");
    assert_eq!(payload["toAccount"], "DE89370400440532013000");
    assert_eq!(payload["beneficiaryName"], "Jane Doe");
    assert!(payload.get("reference").is_none());
    assert!(payload.get("toAddress").is_none());
}

#[test]
fn test_crypto_transfer_carries_fee_estimate() {
    let bank = Arc::new(FakeBank::new(vec![two_accounts()]));
    let mut wizard = mounted(bank.clone());

    wizard.set_transfer_type(TransferType::Crypto).unwrap();
    assert_eq!(wizard.fees().status(), &FeeStatus::Idle);

    wizard.set_field(Section::Crypto, "currency", "BTC").unwrap();
    wizard.set_field(Section::Crypto, "toAddress", "bc1qexampleaddress").unwrap();
    wizard.set_field(Section::Crypto, "amount", "0.01").unwrap();
    // Shared amount from another variant is overridden by crypto's own
    wizard.set_field(Section::Common, "amount", "999").unwrap();

    assert_eq!(wizard.wait_for_fee(Duration::from_secs(5)), "0.000140 BTC");

    wizard.submit().unwrap();
    wizard.enter_code("1234").unwrap();
    wizard.confirm().unwrap();

    let payload = &bank.payloads()[0];
    assert_eq!(payload["transferType"], "crypto");
    assert_eq!(payload["currency"], "BTC");
    assert_eq!(payload["amount"], "0.01");
    assert_eq!(payload["networkFee"], "0.000140 BTC");
    assert_eq!(payload["toAccount"], "bc1qexampleaddress");
}
