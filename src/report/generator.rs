//! Sales report generation.
//!
//! This module renders the plain-text sales report with fixed section
//! banners, and a JSON variant carrying the same figures.

use crate::analysis::SalesAnalysis;
use crate::models::{EnrichedTransaction, EnrichmentSummary, Transaction, DATE_FORMAT};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

const WIDTH: usize = 60;

/// Knobs for the report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    /// Rows in the top products and top customers tables.
    pub top_n: usize,
    /// Quantity below which a product counts as low performing.
    pub low_threshold: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_n: crate::analysis::DEFAULT_TOP_N,
            low_threshold: crate::analysis::DEFAULT_LOW_THRESHOLD,
        }
    }
}

/// Format an amount as rupees with thousands separators.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₹{}.{}", sign, grouped, cents)
}

fn banner(title: &str) -> String {
    format!("{}\n{}\n", title, "-".repeat(WIDTH))
}

/// Generate the complete text report.
///
/// Every aggregate is recomputed from `transactions`.
pub fn generate_sales_report(
    transactions: &[Transaction],
    enriched: &[EnrichedTransaction],
    settings: &ReportSettings,
    generated_at: DateTime<Utc>,
) -> String {
    let analysis = SalesAnalysis::compute(transactions, settings.top_n, settings.low_threshold);
    let enrichment = EnrichmentSummary::from_enriched(enriched);

    let mut output = String::new();

    output.push_str(&generate_header(&analysis, generated_at));
    output.push_str(&generate_overall_summary(&analysis));
    output.push_str(&generate_region_section(&analysis));
    output.push_str(&generate_top_products_section(&analysis, settings.top_n));
    output.push_str(&generate_top_customers_section(&analysis, settings.top_n));
    output.push_str(&generate_daily_trend_section(&analysis));
    output.push_str(&generate_performance_section(&analysis, settings.low_threshold));
    output.push_str(&generate_enrichment_section(&enrichment));

    output
}

fn generate_header(analysis: &SalesAnalysis, generated_at: DateTime<Utc>) -> String {
    let rule = "=".repeat(WIDTH);
    let mut section = String::new();

    section.push_str(&format!("{}\n", rule));
    section.push_str(&format!("{:^WIDTH$}\n", "SALES ANALYTICS REPORT"));
    section.push_str(&format!(
        "{:^WIDTH$}\n",
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))
    ));
    section.push_str(&format!(
        "{:^WIDTH$}\n",
        format!("Records Processed: {}", analysis.transaction_count)
    ));
    section.push_str(&format!("{}\n\n", rule));

    section
}

fn generate_overall_summary(analysis: &SalesAnalysis) -> String {
    let mut section = banner("OVERALL SUMMARY");

    section.push_str(&format!(
        "Total Revenue:        {}\n",
        format_currency(analysis.total_revenue)
    ));
    section.push_str(&format!(
        "Total Transactions:   {}\n",
        analysis.transaction_count
    ));
    section.push_str(&format!(
        "Average Order Value:  {}\n",
        format_currency(analysis.average_order_value())
    ));
    match analysis.date_range() {
        Some((first, last)) => section.push_str(&format!(
            "Date Range:           {} to {}\n",
            first.format(DATE_FORMAT),
            last.format(DATE_FORMAT)
        )),
        None => section.push_str("Date Range:           No data\n"),
    }
    section.push('\n');

    section
}

fn generate_region_section(analysis: &SalesAnalysis) -> String {
    let mut section = banner("REGION-WISE PERFORMANCE");

    if analysis.regions.is_empty() {
        section.push_str("No data\n\n");
        return section;
    }

    section.push_str(&format!(
        "{:<12}{:>18}{:>12}{:>14}\n",
        "Region", "Sales", "% of Total", "Transactions"
    ));
    for region in &analysis.regions {
        section.push_str(&format!(
            "{:<12}{:>18}{:>11.2}%{:>14}\n",
            region.region,
            format_currency(region.total_sales),
            region.percentage,
            region.transaction_count
        ));
    }
    section.push('\n');

    section
}

fn generate_top_products_section(analysis: &SalesAnalysis, top_n: usize) -> String {
    let mut section = banner(&format!("TOP {} PRODUCTS", top_n));

    if analysis.top_products.is_empty() {
        section.push_str("No data\n\n");
        return section;
    }

    section.push_str(&format!(
        "{:<6}{:<24}{:>10}{:>18}\n",
        "Rank", "Product Name", "Quantity", "Revenue"
    ));
    for (i, product) in analysis.top_products.iter().enumerate() {
        section.push_str(&format!(
            "{:<6}{:<24}{:>10}{:>18}\n",
            i + 1,
            product.product_name,
            product.total_quantity,
            format_currency(product.total_revenue)
        ));
    }
    section.push('\n');

    section
}

fn generate_top_customers_section(analysis: &SalesAnalysis, top_n: usize) -> String {
    let mut section = banner(&format!("TOP {} CUSTOMERS", top_n));

    if analysis.customers.is_empty() {
        section.push_str("No data\n\n");
        return section;
    }

    section.push_str(&format!(
        "{:<6}{:<14}{:>18}{:>8}{:>14}\n",
        "Rank", "Customer ID", "Total Spent", "Orders", "Avg Order"
    ));
    for (i, customer) in analysis.customers.iter().take(top_n).enumerate() {
        section.push_str(&format!(
            "{:<6}{:<14}{:>18}{:>8}{:>14}\n",
            i + 1,
            customer.customer_id,
            format_currency(customer.total_spent),
            customer.purchase_count,
            format_currency(customer.average_order_value)
        ));
    }
    section.push('\n');

    section
}

fn generate_daily_trend_section(analysis: &SalesAnalysis) -> String {
    let mut section = banner("DAILY SALES TREND");

    if analysis.daily_trend.is_empty() {
        section.push_str("No data\n\n");
        return section;
    }

    section.push_str(&format!(
        "{:<12}{:>18}{:>14}{:>16}\n",
        "Date", "Revenue", "Transactions", "Unique Cust."
    ));
    for day in &analysis.daily_trend {
        section.push_str(&format!(
            "{:<12}{:>18}{:>14}{:>16}\n",
            day.date.format(DATE_FORMAT).to_string(),
            format_currency(day.revenue),
            day.transaction_count,
            day.unique_customers
        ));
    }
    section.push('\n');

    section
}

fn generate_performance_section(analysis: &SalesAnalysis, low_threshold: u64) -> String {
    let mut section = banner("PRODUCT PERFORMANCE ANALYSIS");

    match analysis.peak_day {
        Some(ref peak) => section.push_str(&format!("Best Selling Day: {}\n\n", peak)),
        None => section.push_str("Best Selling Day: No data\n\n"),
    }

    section.push_str(&format!(
        "Low Performing Products (quantity < {}):\n",
        low_threshold
    ));
    if analysis.low_performers.is_empty() {
        section.push_str("  None\n");
    } else {
        for product in &analysis.low_performers {
            section.push_str(&format!(
                "  - {}: {} units, {}\n",
                product.product_name,
                product.total_quantity,
                format_currency(product.total_revenue)
            ));
        }
    }
    section.push('\n');

    section.push_str("Average Transaction Value per Region:\n");
    if analysis.regions.is_empty() {
        section.push_str("  No data\n");
    }
    for region in &analysis.regions {
        let average = if region.transaction_count > 0 {
            region.total_sales / region.transaction_count as f64
        } else {
            0.0
        };
        section.push_str(&format!(
            "  - {}: {}\n",
            region.region,
            format_currency(average)
        ));
    }
    section.push('\n');

    section
}

fn generate_enrichment_section(summary: &EnrichmentSummary) -> String {
    let mut section = banner("API ENRICHMENT SUMMARY");

    section.push_str(&format!(
        "Total Records Enriched: {}/{}\n",
        summary.matched, summary.total
    ));
    section.push_str(&format!("Success Rate: {:.1}%\n", summary.success_rate));

    if summary.unmatched_products.is_empty() {
        section.push_str("Products Not Enriched: None\n");
    } else {
        section.push_str(&format!(
            "Products Not Enriched: {}\n",
            summary.unmatched_products.join(", ")
        ));
    }

    section
}

/// JSON form of the report.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    analysis: &'a SalesAnalysis,
    enrichment: &'a EnrichmentSummary,
}

/// Generate a JSON report.
pub fn generate_json_report(
    transactions: &[Transaction],
    enriched: &[EnrichedTransaction],
    settings: &ReportSettings,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let analysis = SalesAnalysis::compute(transactions, settings.top_n, settings.low_threshold);
    let enrichment = EnrichmentSummary::from_enriched(enriched);

    let report = JsonReport {
        generated_at,
        analysis: &analysis,
        enrichment: &enrichment,
    };

    serde_json::to_string_pretty(&report).map_err(Into::into)
}
