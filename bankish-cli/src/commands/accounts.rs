//! Accounts command - list accounts and balances

use anyhow::Result;
use colored::Colorize;

use bankish_core::services::AccountsView;

use super::get_context;
use crate::output::create_table;

pub fn run(hide_balances: bool, json: bool) -> Result<()> {
    let ctx = get_context("accounts")?;
    let credentials = ctx.credentials()?;
    let accounts = ctx.account_service.list(&credentials)?;
    let view = AccountsView::new(&accounts, &ctx.config.display_currency, !hide_balances);

    if json {
        return crate::output::json(&view);
    }

    if view.rows.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Account", "Number", "Balance", "Status", "ID"]);
    for row in &view.rows {
        table.add_row(vec![
            row.account_type.as_str(),
            row.number.as_str(),
            row.balance.as_str(),
            row.status.as_str(),
            row.id.as_str(),
        ]);
    }

    println!("{}", table);
    println!("{} {}", "Total:".bold(), view.total);
    Ok(())
}
