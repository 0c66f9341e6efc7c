//! Money helpers: lenient decimal deserialization and display formatting

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Deserialize an amount that can be a JSON number or a string
pub fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    parse_json_amount(&value)
        .ok_or_else(|| D::Error::custom(format!("expected number or string for amount, got {}", value)))
}

/// Deserialize an optional amount; `null` and missing both map to `None`
pub fn deserialize_optional_amount<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => parse_json_amount(&v)
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected number or string for amount")),
    }
}

fn parse_json_amount(value: &JsonValue) -> Option<Decimal> {
    match value {
        JsonValue::Number(n) => n.to_string().parse::<Decimal>().ok().or_else(|| {
            n.as_f64().and_then(|f| Decimal::try_from(f).ok())
        }),
        JsonValue::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Currency symbol for the handful of currencies the app displays
pub fn currency_symbol(currency: &str) -> &'static str {
    match currency.to_uppercase().as_str() {
        "USD" => "$",
        "GBP" => "£",
        "EUR" => "€",
        _ => "",
    }
}

/// Format an amount as en-US currency, e.g. `$1,234.56` or `-$12.00`
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let text = format!("{:.2}", abs);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let symbol = currency_symbol(currency);
    let body = if symbol.is_empty() {
        format!("{}.{} {}", grouped, frac_part, currency.to_uppercase())
    } else {
        format!("{}{}.{}", symbol, grouped, frac_part)
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Significant digits after the decimal point; trailing zeros don't count
pub fn decimal_places(amount: Decimal) -> u32 {
    amount.normalize().scale()
}
