//! Cards command - list payment cards

use anyhow::Result;

use super::get_context;
use crate::output::create_table;

pub fn run(reveal: bool, json: bool) -> Result<()> {
    let ctx = get_context("cards")?;
    let credentials = ctx.credentials()?;
    let views = ctx
        .card_service
        .views(&credentials, reveal, &ctx.config.display_currency)?;

    if json {
        return crate::output::json(&views);
    }

    if views.is_empty() {
        println!("No cards found.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Type", "Number", "Holder", "Expires", "Limit", "Status"]);
    for card in &views {
        table.add_row(vec![
            card.card_type.as_str(),
            card.number.as_str(),
            card.holder.as_str(),
            card.expiry.as_str(),
            card.credit_limit.as_deref().unwrap_or("-"),
            card.status.as_str(),
        ]);
    }

    println!("{}", table);
    Ok(())
}
