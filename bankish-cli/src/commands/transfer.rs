//! Transfer command - drive the transfer wizard from the terminal
//!
//! Field flags pre-fill the form; anything missing is prompted for when
//! stdin is a terminal. The confirmation code is always asked for last.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use bankish_core::domain::{CryptoCurrency, Section, TransferType};
use bankish_core::services::{TransferWizard, WizardState};
use bankish_core::{OperationResult, TransferResult};

use super::{get_context, interactive};
use crate::output::{success, warning};

const FEE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Args)]
pub struct TransferArgs {
    /// Transfer type: internal, wire, regional or crypto
    pub transfer_type: String,
    /// Source account ID (defaults to the first account)
    #[arg(long)]
    pub from: Option<String>,
    /// Destination account number (internal)
    #[arg(long)]
    pub to: Option<String>,
    /// Beneficiary name (wire, regional)
    #[arg(long)]
    pub beneficiary_name: Option<String>,
    /// Beneficiary IBAN (wire, regional)
    #[arg(long)]
    pub iban: Option<String>,
    /// SWIFT/BIC code (wire)
    #[arg(long)]
    pub swift: Option<String>,
    /// Beneficiary address (wire)
    #[arg(long)]
    pub address: Option<String>,
    /// Payment reference (regional)
    #[arg(long)]
    pub reference: Option<String>,
    /// Cryptocurrency: BTC, ETH or USDT (crypto)
    #[arg(long)]
    pub currency: Option<String>,
    /// Destination wallet address (crypto)
    #[arg(long)]
    pub wallet: Option<String>,
    /// Amount to send
    #[arg(long)]
    pub amount: Option<String>,
    /// Description
    #[arg(long)]
    pub description: Option<String>,
    /// Confirmation code (prompted for when omitted)
    #[arg(long)]
    pub code: Option<String>,
    /// Skip the review prompt
    #[arg(long, short)]
    pub yes: bool,
    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TransferArgs) -> Result<()> {
    let transfer_type: TransferType = args.transfer_type.parse()?;
    let ctx = get_context("transfer")?;
    let mut wizard = ctx.transfer_wizard(ctx.credentials()?);
    let prompt = interactive() && !args.json;

    if wizard.accounts().is_empty() {
        bail!("No accounts available to send from.");
    }

    wizard.set_transfer_type(transfer_type)?;
    fill_form(&mut wizard, &args, prompt)?;

    if !args.json {
        print_review(&mut wizard);
    }
    if prompt && !args.yes && !Confirm::new().with_prompt("Send this transfer?").default(true).interact()? {
        wizard.discard()?;
        println!("Cancelled.");
        return Ok(());
    }

    process(&mut wizard, args.json)?;

    let mut flag_code = args.code.clone();
    loop {
        let code = match flag_code.take() {
            Some(code) => code,
            None if prompt => Password::new()
                .with_prompt("Confirmation code (leave empty to cancel)")
                .allow_empty_password(true)
                .interact()?,
            None => {
                wizard.cancel()?;
                bail!("A confirmation code is required. Pass --code or run interactively.");
            }
        };
        if code.is_empty() {
            wizard.cancel()?;
            println!("Cancelled. Your entries were kept but not sent.");
            return Ok(());
        }

        wizard.enter_code(&code)?;
        match wizard.confirm()? {
            WizardState::AwaitingCode { error: Some(message), .. } => {
                let message = message.clone();
                if !prompt {
                    wizard.cancel()?;
                    fail(args.json, &message)?;
                }
                warning(&message);
            }
            WizardState::Success(result) => {
                if args.json {
                    return crate::output::json(&OperationResult::ok(result.clone()));
                }
                success(&format!(
                    "✓ {}",
                    result.message.as_deref().unwrap_or("Transfer submitted successfully.")
                ));
                return Ok(());
            }
            WizardState::Editing { error: Some(message) } => {
                let message = format!("Transfer failed: {}", message);
                fail(args.json, &message)?;
            }
            other => bail!("Unexpected wizard state: {:?}", other),
        }
    }
}

/// Report a failed transfer; with `--json` the result goes to stdout
fn fail(json: bool, message: &str) -> Result<()> {
    if json {
        crate::output::json(&OperationResult::<TransferResult>::fail(message))?;
        std::process::exit(1);
    }
    bail!("{}", message)
}

/// Fill the active section from flags, prompting for what is missing
fn fill_form(wizard: &mut TransferWizard, args: &TransferArgs, prompt: bool) -> Result<()> {
    let transfer_type = wizard.draft().transfer_type;
    let section = Section::from(transfer_type);

    match &args.from {
        Some(id) => wizard.set_field(section, "fromAccountId", id.as_str())?,
        None if prompt && wizard.accounts().len() > 1 => {
            let labels: Vec<String> = wizard.accounts().iter().map(|a| a.selector_label()).collect();
            let current = wizard.draft().from_account_id().to_string();
            let default = wizard.accounts().iter().position(|a| a.id == current).unwrap_or(0);
            let index = Select::new()
                .with_prompt("From account")
                .items(&labels)
                .default(default)
                .interact()?;
            let id = wizard.accounts()[index].id.clone();
            wizard.set_field(section, "fromAccountId", id)?;
        }
        None => {}
    }

    match transfer_type {
        TransferType::Internal => {
            if args.to.is_none() && prompt {
                let candidates: Vec<(String, String)> = wizard
                    .to_account_candidates()
                    .iter()
                    .map(|a| (a.account_number.clone(), a.selector_label()))
                    .collect();
                if !candidates.is_empty() {
                    let labels: Vec<&str> = candidates.iter().map(|(_, label)| label.as_str()).collect();
                    let index = Select::new().with_prompt("To account").items(&labels).default(0).interact()?;
                    wizard.set_field(section, "toAccount", candidates[index].0.clone())?;
                }
            } else {
                field(wizard, section, "toAccount", "To account number", &args.to, prompt, false)?;
            }
        }
        TransferType::Wire => {
            field(wizard, section, "beneficiaryName", "Beneficiary name", &args.beneficiary_name, prompt, false)?;
            field(wizard, section, "beneficiaryIban", "IBAN / account number", &args.iban, prompt, false)?;
            field(wizard, section, "swiftCode", "SWIFT/BIC code", &args.swift, prompt, false)?;
            field(wizard, section, "beneficiaryAddress", "Beneficiary address", &args.address, prompt, true)?;
        }
        TransferType::Regional => {
            field(wizard, section, "beneficiaryName", "Beneficiary name", &args.beneficiary_name, prompt, false)?;
            field(wizard, section, "beneficiaryIban", "IBAN", &args.iban, prompt, false)?;
            field(wizard, section, "reference", "Reference", &args.reference, prompt, true)?;
        }
        TransferType::Crypto => {
            match &args.currency {
                Some(c) => wizard.set_field(section, "currency", c.as_str())?,
                None if prompt => {
                    let labels: Vec<String> = CryptoCurrency::ALL
                        .iter()
                        .map(|c| format!("{} ({})", c.name(), c.network()))
                        .collect();
                    let index = Select::new().with_prompt("Currency").items(&labels).default(0).interact()?;
                    wizard.set_field(section, "currency", CryptoCurrency::ALL[index].code())?;
                }
                None => {}
            }
            field(wizard, section, "toAddress", "Wallet address", &args.wallet, prompt, false)?;
            field(wizard, section, "amount", "Amount", &args.amount, prompt, false)?;
        }
    }

    if transfer_type != TransferType::Crypto {
        field(wizard, Section::Common, "amount", "Amount", &args.amount, prompt, false)?;
    }
    field(wizard, Section::Common, "description", "Description", &args.description, prompt, true)?;
    Ok(())
}

fn field(
    wizard: &mut TransferWizard,
    section: Section,
    name: &str,
    label: &str,
    flag: &Option<String>,
    prompt: bool,
    optional: bool,
) -> Result<()> {
    let value = match flag {
        Some(v) => v.clone(),
        None if prompt => Input::<String>::new()
            .with_prompt(label)
            .allow_empty(optional)
            .interact_text()?,
        None => return Ok(()),
    };
    wizard.set_field(section, name, value)?;
    Ok(())
}

fn print_review(wizard: &mut TransferWizard) {
    let draft = wizard.draft().clone();
    println!();
    println!("{} {}", "Transfer:".bold(), draft.transfer_type.label());
    if let Some(account) = wizard.accounts().iter().find(|a| a.id == draft.from_account_id()) {
        println!("  From:   {}", account.selector_label());
    }
    println!("  Amount: {}", draft.amount());
    if draft.transfer_type == TransferType::Crypto {
        println!("  Currency: {}", draft.crypto.currency.code());
        println!("  Network fee: {}", wizard.wait_for_fee(FEE_TIMEOUT).dimmed());
    }
    if !draft.common.description.is_empty() {
        println!("  Description: {}", draft.common.description);
    }
    println!();
}

/// Submit the form and wait out processing behind a spinner
fn process(wizard: &mut TransferWizard, quiet: bool) -> Result<()> {
    wizard.submit()?;
    if *wizard.state() != WizardState::Processing {
        return Ok(());
    }

    let spinner = if quiet { ProgressBar::hidden() } else { ProgressBar::new_spinner() };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Processing transfer...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let opened = wizard.open_code_prompt().map(|_| ());
    spinner.finish_and_clear();
    opened?;
    Ok(())
}
