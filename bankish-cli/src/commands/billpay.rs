//! Bill pay commands - payees and scheduled payments

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use bankish_core::domain::money::format_currency;
use bankish_core::services::{BillPayment, PayeeCategory};

use super::{get_context, interactive};
use crate::output::create_table;

#[derive(Subcommand)]
pub enum BillpayCommands {
    /// List payees
    Payees {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a payee
    AddPayee {
        /// Payee name
        name: String,
        /// Utilities, Housing, Transportation, Insurance or Other
        #[arg(long, default_value = "Other")]
        category: String,
    },
    /// Remove a payee
    RemovePayee {
        /// Payee ID
        id: u32,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// Schedule a payment to a payee
    Pay {
        /// Payee ID
        #[arg(long)]
        payee: Option<String>,
        /// Amount to pay
        #[arg(long)]
        amount: Option<String>,
        /// Payment date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Account ID to pay from
        #[arg(long)]
        account: Option<String>,
        /// Memo
        #[arg(long, default_value = "")]
        memo: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List scheduled payments
    Scheduled {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: BillpayCommands) -> Result<()> {
    let ctx = get_context("billpay")?;
    let mut book = ctx.bill_pay()?;
    let currency = ctx.config.display_currency.clone();

    match command {
        BillpayCommands::Payees { json } => {
            if json {
                return crate::output::json(&book.payees());
            }
            if book.payees().is_empty() {
                println!("No payees. Add one with 'bk billpay add-payee'.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["ID", "Name", "Category", "Next Due", "Amount"]);
            for payee in book.payees() {
                table.add_row(vec![
                    payee.id.to_string(),
                    payee.name.clone(),
                    payee.category.to_string(),
                    payee.next_due.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                    format_currency(payee.amount, &currency),
                ]);
            }
            println!("{}", table);
        }
        BillpayCommands::AddPayee { name, category } => {
            let category: PayeeCategory = category.parse()?;
            let payee = book.add_payee(&name, category)?;
            println!("{} Added payee {} ({})", "✓".green(), payee.name, payee.id);
        }
        BillpayCommands::RemovePayee { id, force } => {
            let name = match book.payee(id) {
                Some(p) => p.name.clone(),
                None => anyhow::bail!("Payee {} not found", id),
            };
            if !force
                && interactive()
                && !Confirm::new()
                    .with_prompt(format!("Remove payee '{}'?", name))
                    .default(false)
                    .interact()?
            {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            book.remove_payee(id)?;
            println!("{} Removed payee '{}'", "✓".green(), name);
        }
        BillpayCommands::Pay { payee, amount, date, account, memo, json } => {
            let prompt = interactive() && !json;
            let ask = |value: Option<String>, label: &str| -> Result<String> {
                match value {
                    Some(v) => Ok(v),
                    None if prompt => Ok(Input::<String>::new().with_prompt(label).interact_text()?),
                    None => Ok(String::new()),
                }
            };

            let payment = BillPayment {
                payee_id: ask(payee, "Payee ID")?,
                amount: ask(amount, "Amount")?,
                payment_date: ask(date, "Payment date (YYYY-MM-DD)")?,
                account: ask(account, "From account ID")?,
                memo,
            };
            let scheduled = book.schedule_payment(&payment)?;

            if json {
                return crate::output::json(&scheduled);
            }
            let payee_name = book
                .payee(scheduled.payee_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            println!(
                "{} Scheduled {} to {} on {}",
                "✓".green(),
                format_currency(scheduled.amount, &currency),
                payee_name,
                scheduled.payment_date
            );
        }
        BillpayCommands::Scheduled { json } => {
            if json {
                return crate::output::json(&book.scheduled());
            }
            if book.scheduled().is_empty() {
                println!("No scheduled payments.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["Date", "Payee", "Amount", "Account", "Memo"]);
            for payment in book.scheduled() {
                let payee = book
                    .payee(payment.payee_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| payment.payee_id.to_string());
                table.add_row(vec![
                    payment.payment_date.to_string(),
                    payee,
                    format_currency(payment.amount, &currency),
                    payment.account.clone(),
                    payment.memo.clone().unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
