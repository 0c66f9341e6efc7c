//! Bankish CLI - retail banking in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{accounts, admin, billpay, cards, dashboard, logs, session, transactions, transfer};

/// Bankish - retail banking in your terminal
#[derive(Parser)]
#[command(name = "bk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an access token for later commands
    Login {
        /// Bearer token (prompted for when omitted)
        #[arg(long, env = "BANKISH_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Show the signed-in user
    Me {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List accounts and balances
    Accounts {
        /// Mask balances
        #[arg(long)]
        hide_balances: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse transaction history
    Transactions {
        /// Case-insensitive match on description or recipient
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only show one kind (deposit, withdrawal, transfer, payment, ...)
        #[arg(long = "type", default_value = "all")]
        kind: String,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send money (internal, wire, regional, crypto)
    Transfer(transfer::TransferArgs),

    /// List payment cards
    Cards {
        /// Show full card numbers
        #[arg(long)]
        reveal: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage payees and schedule bill payments
    Billpay {
        #[command(subcommand)]
        command: billpay::BillpayCommands,
    },

    /// Overview of balances, spending and recent activity
    Dashboard {
        /// Display currency (USD, GBP, EUR)
        #[arg(short, long)]
        currency: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Administrator console
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { token } => session::login(token),
        Commands::Logout => session::logout(),
        Commands::Me { json } => session::me(json),
        Commands::Accounts { hide_balances, json } => accounts::run(hide_balances, json),
        Commands::Transactions { search, kind, page, json } => transactions::run(&search, &kind, page, json),
        Commands::Transfer(args) => transfer::run(args),
        Commands::Cards { reveal, json } => cards::run(reveal, json),
        Commands::Billpay { command } => billpay::run(command),
        Commands::Dashboard { currency, json } => dashboard::run(currency, json),
        Commands::Admin { command } => admin::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
