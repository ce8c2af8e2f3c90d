//! Record validation and filtering.
//!
//! Turns parsed records into [`Transaction`]s the aggregation functions can
//! trust, then applies the optional region and amount filters.

use crate::ingest::parser::RawTransaction;
use crate::models::{Transaction, DATE_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Why a parsed record was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("{field} {value:?} does not start with '{prefix}'")]
    BadPrefix {
        field: &'static str,
        value: String,
        prefix: char,
    },
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
    #[error("quantity {0} is too large")]
    QuantityOutOfRange(i64),
    #[error("unit price must be positive, got {0}")]
    NonPositivePrice(f64),
    #[error("invalid date {0:?}")]
    InvalidDate(String),
}

/// Optional filters applied after validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Keep only this region (exact match).
    pub region: Option<String>,
    /// Drop records whose amount is below this value.
    pub min_amount: Option<f64>,
    /// Drop records whose amount is above this value.
    pub max_amount: Option<f64>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.min_amount.is_none() && self.max_amount.is_none()
    }
}

/// Counts describing what validation and filtering removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total_input: usize,
    pub invalid: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
}

/// Result of [`validate_and_filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub transactions: Vec<Transaction>,
    pub invalid_count: usize,
    pub summary: FilterSummary,
}

/// Values offered to the user when choosing filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChoices {
    /// Distinct regions, sorted.
    pub regions: Vec<String>,
    /// Smallest and largest line amount.
    pub amount_range: Option<(f64, f64)>,
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_prefix(value: &str, field: &'static str, prefix: char) -> Result<(), ValidationError> {
    require(value, field)?;
    if value.starts_with(prefix) {
        Ok(())
    } else {
        Err(ValidationError::BadPrefix {
            field,
            value: value.to_string(),
            prefix,
        })
    }
}

/// Check one record and convert it into a [`Transaction`].
pub fn validate_record(raw: &RawTransaction) -> Result<Transaction, ValidationError> {
    require_prefix(&raw.transaction_id, "transaction id", 'T')?;
    require_prefix(&raw.product_id, "product id", 'P')?;
    require_prefix(&raw.customer_id, "customer id", 'C')?;
    require(&raw.product_name, "product name")?;
    require(&raw.region, "region")?;
    require(&raw.date, "date")?;

    if raw.quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity(raw.quantity));
    }
    let quantity = u32::try_from(raw.quantity)
        .map_err(|_| ValidationError::QuantityOutOfRange(raw.quantity))?;

    if raw.unit_price <= 0.0 {
        return Err(ValidationError::NonPositivePrice(raw.unit_price));
    }

    // the date must already be in canonical zero-padded form
    let date = NaiveDate::parse_from_str(&raw.date, DATE_FORMAT)
        .ok()
        .filter(|d| d.format(DATE_FORMAT).to_string() == raw.date)
        .ok_or_else(|| ValidationError::InvalidDate(raw.date.clone()))?;

    Ok(Transaction {
        transaction_id: raw.transaction_id.clone(),
        date,
        product_id: raw.product_id.clone(),
        product_name: raw.product_name.clone(),
        quantity,
        unit_price: raw.unit_price,
        customer_id: raw.customer_id.clone(),
        region: raw.region.clone(),
    })
}

/// Validate every record, then apply `filters` to the valid ones.
///
/// Amount bounds are inclusive: a record equal to `min_amount` or
/// `max_amount` is kept.
pub fn validate_and_filter(records: &[RawTransaction], filters: &FilterOptions) -> ValidationOutcome {
    let mut summary = FilterSummary {
        total_input: records.len(),
        ..FilterSummary::default()
    };
    let mut transactions = Vec::with_capacity(records.len());

    for raw in records {
        let tx = match validate_record(raw) {
            Ok(tx) => tx,
            Err(e) => {
                debug!("Invalid record {}: {}", raw.transaction_id, e);
                summary.invalid += 1;
                continue;
            }
        };

        if let Some(ref region) = filters.region {
            if &tx.region != region {
                summary.filtered_by_region += 1;
                continue;
            }
        }

        let amount = tx.line_amount();
        let below = filters.min_amount.is_some_and(|min| amount < min);
        let above = filters.max_amount.is_some_and(|max| amount > max);
        if below || above {
            summary.filtered_by_amount += 1;
            continue;
        }

        transactions.push(tx);
    }

    summary.final_count = transactions.len();

    if !filters.is_empty() {
        info!(
            "Filters removed {} by region and {} by amount",
            summary.filtered_by_region, summary.filtered_by_amount
        );
    }

    ValidationOutcome {
        invalid_count: summary.invalid,
        transactions,
        summary,
    }
}

/// Collect the regions and amount range present in `records`.
pub fn filter_choices(records: &[RawTransaction]) -> FilterChoices {
    let mut regions: Vec<String> = records.iter().map(|r| r.region.clone()).collect();
    regions.sort();
    regions.dedup();

    let amount_range = records.iter().map(RawTransaction::line_amount).fold(
        None,
        |range: Option<(f64, f64)>, amount| match range {
            Some((lo, hi)) => Some((lo.min(amount), hi.max(amount))),
            None => Some((amount, amount)),
        },
    );

    FilterChoices {
        regions,
        amount_range,
    }
}
