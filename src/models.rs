//! Data models for sales analytics.
//!
//! This module contains the core data structures used throughout
//! the application: validated transactions, the aggregate views computed
//! from them, and enriched records produced by the catalog lookup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire format of transaction dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated sales transaction.
///
/// Produced by [`crate::ingest::validate_and_filter`]; the aggregation
/// functions trust every field constraint and never re-validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier, prefixed with `T`.
    pub transaction_id: String,
    /// Calendar date of the sale.
    pub date: NaiveDate,
    /// Product identifier, prefixed with `P`.
    pub product_id: String,
    /// Product name with commas stripped.
    pub product_name: String,
    /// Units sold (always positive).
    pub quantity: u32,
    /// Price per unit (always positive).
    pub unit_price: f64,
    /// Customer identifier, prefixed with `C`.
    pub customer_id: String,
    /// Sales region.
    pub region: String,
}

impl Transaction {
    /// Quantity times unit price.
    pub fn line_amount(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }

    /// The date in its `YYYY-MM-DD` wire form.
    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Sales rolled up for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub region: String,
    pub total_sales: f64,
    pub transaction_count: usize,
    /// Share of the grand total, in percent.
    pub percentage: f64,
}

/// Volume and revenue for one product name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub product_name: String,
    pub total_quantity: u64,
    pub total_revenue: f64,
}

/// Spending behaviour of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub customer_id: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub average_order_value: f64,
    /// Distinct product names, in first-purchased order.
    pub products_bought: Vec<String>,
}

/// Sales activity on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub revenue: f64,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

/// The day with the highest revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakDay {
    pub date: NaiveDate,
    pub revenue: f64,
    pub transaction_count: usize,
}

impl fmt::Display for PeakDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (₹{:.2} across {} transactions)",
            self.date.format(DATE_FORMAT),
            self.revenue,
            self.transaction_count
        )
    }
}

/// Product metadata returned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// A transaction with catalog metadata attached.
///
/// Field order and names match the persisted pipe-delimited layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "ProductID")]
    pub product_id: String,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "API_Category")]
    pub api_category: String,
    #[serde(rename = "API_Brand")]
    pub api_brand: String,
    #[serde(rename = "API_Rating")]
    pub api_rating: Option<f64>,
    #[serde(rename = "API_Match")]
    pub api_match: bool,
}

impl EnrichedTransaction {
    /// Wraps a transaction without any catalog match.
    pub fn unmatched(tx: &Transaction) -> Self {
        Self {
            transaction_id: tx.transaction_id.clone(),
            date: tx.date_str(),
            product_id: tx.product_id.clone(),
            product_name: tx.product_name.clone(),
            quantity: tx.quantity,
            unit_price: tx.unit_price,
            customer_id: tx.customer_id.clone(),
            region: tx.region.clone(),
            api_category: String::new(),
            api_brand: String::new(),
            api_rating: None,
            api_match: false,
        }
    }

    /// Wraps a transaction with the metadata of its catalog product.
    pub fn matched(tx: &Transaction, product: &CatalogProduct) -> Self {
        Self {
            api_category: product.category.clone(),
            api_brand: product.brand.clone().unwrap_or_default(),
            api_rating: product.rating,
            api_match: true,
            ..Self::unmatched(tx)
        }
    }
}

/// How well the catalog lookup covered the data set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub total: usize,
    pub matched: usize,
    /// Matched share, in percent.
    pub success_rate: f64,
    /// Product IDs without a catalog match, in first-seen order.
    pub unmatched_products: Vec<String>,
}

impl EnrichmentSummary {
    /// Creates a summary from a list of enriched records.
    pub fn from_enriched(enriched: &[EnrichedTransaction]) -> Self {
        let total = enriched.len();
        let matched = enriched.iter().filter(|e| e.api_match).count();
        let success_rate = if total > 0 {
            matched as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let mut unmatched_products: Vec<String> = Vec::new();
        for record in enriched.iter().filter(|e| !e.api_match) {
            if !unmatched_products.contains(&record.product_id) {
                unmatched_products.push(record.product_id.clone());
            }
        }

        Self {
            total,
            matched,
            success_rate,
            unmatched_products,
        }
    }
}
