use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::Price;

// Currency prefix, then a plain decimal amount. Thousands separators are not
// accepted because they would not survive the round trip through `Decimal`.
static PRICE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^\d\s.,+-]+)\s*(\d+(?:\.\d+)?)$")
        .expect("Invalid price regex")
});

/// Parse a currency-prefixed price such as `£51.77`.
pub fn parse_price(text: &str) -> Option<Price> {
    let text = text.trim();
    let captures = PRICE_REGEX.captures(text)?;
    let currency = captures.get(1)?.as_str().trim().to_string();
    let amount = Decimal::from_str(captures.get(2)?.as_str()).ok()?;

    Some(Price { currency, amount })
}
