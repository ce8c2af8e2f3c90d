//! Pipe-delimited record parsing.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of fields in a sales record.
pub const FIELD_COUNT: usize = 8;

/// Reasons a line is rejected by the parser.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected 8 fields, found {0}")]
    FieldCount(usize),
    #[error("quantity is not an integer: {0:?}")]
    InvalidQuantity(String),
    #[error("unit price is not a number: {0:?}")]
    InvalidPrice(String),
}

/// A parsed but not yet validated sales record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub customer_id: String,
    pub region: String,
}

impl RawTransaction {
    pub fn line_amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Strip thousands separators from a numeric field.
fn clean_number(field: &str) -> String {
    field.replace(',', "").trim().to_string()
}

/// Parse one `|`-separated line.
pub fn parse_line(line: &str) -> Result<RawTransaction, ParseError> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount(fields.len()));
    }

    let quantity = clean_number(fields[4]);
    let quantity = quantity
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidQuantity(quantity))?;

    let unit_price = clean_number(fields[5]);
    let unit_price = unit_price
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or(ParseError::InvalidPrice(unit_price))?;

    Ok(RawTransaction {
        transaction_id: fields[0].to_string(),
        date: fields[1].to_string(),
        product_id: fields[2].to_string(),
        product_name: fields[3].replace(',', ""),
        quantity,
        unit_price,
        customer_id: fields[6].to_string(),
        region: fields[7].to_string(),
    })
}

/// Parse every line, silently dropping malformed ones.
pub fn parse_transactions<S: AsRef<str>>(lines: &[S]) -> Vec<RawTransaction> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| match parse_line(line.as_ref()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Dropping line {}: {}", i + 1, e);
                None
            }
        })
        .collect()
}
