//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use rust_decimal::Decimal;

use bankish_core::domain::money::format_currency;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Amount cell, green for money in and red for money out
pub fn amount_cell(signed: Decimal, currency: &str) -> Cell {
    let cell = Cell::new(format_currency(signed, currency));
    if signed.is_sign_negative() && !signed.is_zero() {
        cell.fg(Color::Red)
    } else {
        cell.fg(Color::Green)
    }
}

/// Print a value as pretty JSON
pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
