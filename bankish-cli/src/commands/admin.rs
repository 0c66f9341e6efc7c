//! Admin commands - user list and account corrections

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use bankish_core::domain::money::format_currency;
use bankish_core::domain::TransactionKind;
use bankish_core::AdminUser;

use super::get_context;
use crate::output::create_table;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List users and their accounts
    Users {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Overwrite an account balance
    SetBalance {
        /// Account ID
        account_id: String,
        /// New balance
        balance: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Post a manual transaction to an account
    AddTransaction {
        /// Owner's user ID
        #[arg(long)]
        user: String,
        /// Account ID
        #[arg(long)]
        account: String,
        /// deposit, withdrawal, transfer or payment
        #[arg(long = "type", default_value = "deposit")]
        kind: String,
        /// Amount
        #[arg(long)]
        amount: String,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AdminCommands) -> Result<()> {
    let ctx = get_context("admin")?;
    let credentials = ctx.credentials()?;
    let currency = ctx.config.display_currency.clone();

    let (users, json) = match command {
        AdminCommands::Users { json } => (ctx.admin_service.users(&credentials)?, json),
        AdminCommands::SetBalance { account_id, balance, json } => {
            let users = ctx.admin_service.set_balance(&credentials, &account_id, &balance)?;
            if !json {
                println!("{} Balance updated for {}\n", "✓".green(), account_id);
            }
            (users, json)
        }
        AdminCommands::AddTransaction { user, account, kind, amount, description, json } => {
            let kind: TransactionKind = kind.parse()?;
            let users = ctx
                .admin_service
                .add_transaction(&credentials, &user, &account, kind, &amount, &description)?;
            if !json {
                println!("{} Transaction added to {}\n", "✓".green(), account);
            }
            (users, json)
        }
    };

    if json {
        return crate::output::json(&users);
    }
    print_users(&users, &currency);
    Ok(())
}

fn print_users(users: &[AdminUser], currency: &str) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["User", "Email", "User ID", "Account", "Account ID", "Balance"]);
    for user in users {
        if user.accounts.is_empty() {
            table.add_row(vec![user.full_name(), user.email.clone(), user.id.clone(), "-".into(), "-".into(), "-".into()]);
        }
        for account in &user.accounts {
            table.add_row(vec![
                user.full_name(),
                user.email.clone(),
                user.id.clone(),
                format!("{} {}", account.account_type.display_name(), account.masked_number()),
                account.id.clone(),
                format_currency(account.balance, currency),
            ]);
        }
    }
    println!("{}", table);
}
