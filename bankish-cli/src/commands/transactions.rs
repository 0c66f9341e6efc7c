//! Transactions command - filter and page through history

use anyhow::Result;
use colored::Colorize;

use bankish_core::services::{KindFilter, TransactionFilter};

use super::get_context;
use crate::output::{amount_cell, create_table};

pub fn run(search: &str, kind: &str, page: usize, json: bool) -> Result<()> {
    let ctx = get_context("transactions")?;
    let credentials = ctx.credentials()?;

    let filter = TransactionFilter {
        search: search.to_string(),
        kind: kind.parse::<KindFilter>()?,
    };
    let page = ctx.transaction_service.browse(&credentials, &filter, page)?;

    if json {
        return crate::output::json(&page);
    }

    if page.items.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Date", "Description", "Type", "Amount", "Status"]);
    for tx in &page.items {
        let date = tx
            .created_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let description = tx
            .description
            .as_deref()
            .or(tx.recipient_name.as_deref())
            .unwrap_or("-");
        table.add_row(vec![
            date.into(),
            description.into(),
            tx.kind.as_str().into(),
            amount_cell(tx.signed_amount(), &ctx.config.display_currency),
            tx.status.as_str().into(),
        ]);
    }

    println!("{}", table);
    println!(
        "{}",
        format!(
            "Showing {}-{} of {} (page {} of {})",
            page.start, page.end, page.total, page.page, page.total_pages
        )
        .dimmed()
    );
    Ok(())
}
