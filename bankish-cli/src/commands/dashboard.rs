//! Dashboard command - balances, spending and recent activity

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table};

use bankish_core::domain::money::format_currency;

use super::get_context;
use crate::output::{amount_cell, create_table, warning};

pub fn run(currency: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context("dashboard")?;
    let credentials = ctx.credentials()?;
    let currency = currency
        .unwrap_or_else(|| ctx.config.display_currency.clone())
        .to_uppercase();

    let dashboard = ctx.dashboard_service.load(&credentials)?;
    let total = dashboard.rates.convert(dashboard.stats.total_balance, &currency)?;
    let spending = dashboard.rates.convert(dashboard.stats.monthly_spending, &currency)?;

    if json {
        return crate::output::json(&serde_json::json!({
            "currency": currency,
            "totalBalance": total,
            "monthlySpending": spending,
            "dashboard": dashboard,
        }));
    }

    println!("{}", "Dashboard".bold());
    println!();

    let mut summary = Table::new();
    summary.set_content_arrangement(ContentArrangement::Dynamic);
    summary.add_row(vec!["Total balance", &format_currency(total, &currency)]);
    summary.add_row(vec!["Accounts", &dashboard.stats.account_count.to_string()]);
    summary.add_row(vec!["Spending this month", &format_currency(spending, &currency)]);
    println!("{}", summary);

    if dashboard.rates.fallback && currency != "USD" {
        warning("Live exchange rates unavailable; using built-in rates.");
    }

    if !dashboard.accounts.is_empty() {
        println!();
        println!("{}", "Accounts".bold());
        let mut table = create_table();
        table.set_header(vec!["Account", "Number", "Balance"]);
        for account in &dashboard.accounts {
            let balance = dashboard.rates.convert(account.balance, &currency)?;
            table.add_row(vec![
                Cell::new(account.account_type.display_name()),
                Cell::new(account.masked_number()),
                Cell::new(format_currency(balance, &currency)),
            ]);
        }
        println!("{}", table);
    }

    if !dashboard.stats.recent_transactions.is_empty() {
        println!();
        println!("{}", "Recent Transactions".bold());
        let mut table = create_table();
        table.set_header(vec!["Description", "Type", "Amount"]);
        for tx in &dashboard.stats.recent_transactions {
            let amount = dashboard.rates.convert(tx.signed_amount(), &currency)?;
            table.add_row(vec![
                Cell::new(tx.description.as_deref().unwrap_or("-")),
                Cell::new(tx.kind.as_str()),
                amount_cell(amount, &currency),
            ]);
        }
        println!("{}", table);
    }

    Ok(())
}
