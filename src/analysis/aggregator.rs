//! Sales aggregation and statistics.
//!
//! Every function here is a fresh, independent pass over the input slice.
//! Grouping goes through [`Accumulator`], which keeps keys in first-seen
//! order, and all sorts are stable, so equal keys always come out in the
//! order they first appeared in the data.

use crate::models::{CustomerStats, DailyStats, PeakDay, ProductStats, RegionStats, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Default number of entries returned by [`top_selling_products`].
pub const DEFAULT_TOP_N: usize = 5;

/// Default quantity threshold for [`low_performing_products`].
pub const DEFAULT_LOW_THRESHOLD: u64 = 10;

/// Errors raised by the aggregation functions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("no transactions to analyze")]
    NoData,
}

/// Insertion-ordered grouping map.
struct Accumulator<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K: Hash + Eq + Clone, V: Default> Accumulator<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Get the value for `key`, inserting a default on first sight.
    fn entry<Q>(&mut self, key: &Q) -> &mut V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                let owned = key.to_owned();
                self.entries.push((owned.clone(), V::default()));
                self.index.insert(owned, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

/// Sum of `quantity * unit_price` over all transactions.
pub fn total_revenue(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::line_amount).sum()
}

/// Region rollup sorted by total sales, highest first.
pub fn region_wise_sales(transactions: &[Transaction]) -> Vec<RegionStats> {
    let mut regions: Accumulator<String, (f64, usize)> = Accumulator::new();
    let mut grand_total = 0.0;

    for tx in transactions {
        let amount = tx.line_amount();
        grand_total += amount;

        let (sales, count) = regions.entry(tx.region.as_str());
        *sales += amount;
        *count += 1;
    }

    let mut stats: Vec<RegionStats> = regions
        .into_entries()
        .into_iter()
        .map(|(region, (total_sales, transaction_count))| RegionStats {
            region,
            total_sales,
            transaction_count,
            percentage: if grand_total > 0.0 {
                total_sales / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    stats.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    stats
}

/// Per-product quantity and revenue, in first-seen order.
fn product_totals(transactions: &[Transaction]) -> Vec<ProductStats> {
    let mut products: Accumulator<String, (u64, f64)> = Accumulator::new();

    for tx in transactions {
        let (quantity, revenue) = products.entry(tx.product_name.as_str());
        *quantity += u64::from(tx.quantity);
        *revenue += tx.line_amount();
    }

    products
        .into_entries()
        .into_iter()
        .map(|(product_name, (total_quantity, total_revenue))| ProductStats {
            product_name,
            total_quantity,
            total_revenue,
        })
        .collect()
}

/// The `n` best-selling products by quantity.
///
/// Ranking is by volume; revenue is carried along for display only.
pub fn top_selling_products(transactions: &[Transaction], n: usize) -> Vec<ProductStats> {
    let mut products = product_totals(transactions);
    products.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    products.truncate(n);
    products
}

/// Customer rollup sorted by total spent, highest first.
pub fn customer_analysis(transactions: &[Transaction]) -> Vec<CustomerStats> {
    #[derive(Default)]
    struct Spend {
        spent: f64,
        count: usize,
        products: Vec<String>,
    }

    let mut customers: Accumulator<String, Spend> = Accumulator::new();

    for tx in transactions {
        let spend = customers.entry(tx.customer_id.as_str());
        spend.spent += tx.line_amount();
        spend.count += 1;
        if !spend.products.contains(&tx.product_name) {
            spend.products.push(tx.product_name.clone());
        }
    }

    let mut stats: Vec<CustomerStats> = customers
        .into_entries()
        .into_iter()
        .map(|(customer_id, spend)| CustomerStats {
            customer_id,
            total_spent: spend.spent,
            purchase_count: spend.count,
            average_order_value: if spend.count > 0 {
                spend.spent / spend.count as f64
            } else {
                0.0
            },
            products_bought: spend.products,
        })
        .collect();

    stats.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    stats
}

/// Daily revenue, transaction count and unique customers, oldest day first.
pub fn daily_sales_trend(transactions: &[Transaction]) -> Vec<DailyStats> {
    let mut days: BTreeMap<NaiveDate, (f64, usize, HashSet<&str>)> = BTreeMap::new();

    for tx in transactions {
        let (revenue, count, customers) = days.entry(tx.date).or_default();
        *revenue += tx.line_amount();
        *count += 1;
        customers.insert(tx.customer_id.as_str());
    }

    days.into_iter()
        .map(|(date, (revenue, transaction_count, customers))| DailyStats {
            date,
            revenue,
            transaction_count,
            unique_customers: customers.len(),
        })
        .collect()
}

/// The date with the highest revenue.
///
/// When several dates tie, the one that appears first in the input wins.
pub fn find_peak_sales_day(transactions: &[Transaction]) -> Result<PeakDay, AnalysisError> {
    let mut days: Accumulator<NaiveDate, (f64, usize)> = Accumulator::new();

    for tx in transactions {
        let (revenue, count) = days.entry(&tx.date);
        *revenue += tx.line_amount();
        *count += 1;
    }

    days.into_entries()
        .into_iter()
        .fold(None, |best: Option<PeakDay>, (date, (revenue, transaction_count))| {
            match best {
                Some(best) if best.revenue >= revenue => Some(best),
                _ => Some(PeakDay {
                    date,
                    revenue,
                    transaction_count,
                }),
            }
        })
        .ok_or(AnalysisError::NoData)
}

/// Products whose total quantity is strictly below `threshold`, lowest first.
pub fn low_performing_products(transactions: &[Transaction], threshold: u64) -> Vec<ProductStats> {
    let mut products: Vec<ProductStats> = product_totals(transactions)
        .into_iter()
        .filter(|p| p.total_quantity < threshold)
        .collect();

    products.sort_by_key(|p| p.total_quantity);
    products
}

/// Every aggregate view over one transaction set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesAnalysis {
    pub transaction_count: usize,
    pub total_revenue: f64,
    pub regions: Vec<RegionStats>,
    pub top_products: Vec<ProductStats>,
    pub customers: Vec<CustomerStats>,
    pub daily_trend: Vec<DailyStats>,
    pub peak_day: Option<PeakDay>,
    pub low_performers: Vec<ProductStats>,
}

impl SalesAnalysis {
    /// Run every aggregation over `transactions`.
    pub fn compute(transactions: &[Transaction], top_n: usize, low_threshold: u64) -> Self {
        Self {
            transaction_count: transactions.len(),
            total_revenue: total_revenue(transactions),
            regions: region_wise_sales(transactions),
            top_products: top_selling_products(transactions, top_n),
            customers: customer_analysis(transactions),
            daily_trend: daily_sales_trend(transactions),
            peak_day: find_peak_sales_day(transactions).ok(),
            low_performers: low_performing_products(transactions, low_threshold),
        }
    }

    /// Mean line amount, 0 for an empty set.
    pub fn average_order_value(&self) -> f64 {
        if self.transaction_count > 0 {
            self.total_revenue / self.transaction_count as f64
        } else {
            0.0
        }
    }

    /// First and last sale dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.daily_trend.first()?;
        let last = self.daily_trend.last()?;
        Some((first.date, last.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(
        id: &str,
        date: &str,
        product: &str,
        qty: u32,
        price: f64,
        customer: &str,
        region: &str,
    ) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            product_id: "P101".to_string(),
            product_name: product.to_string(),
            quantity: qty,
            unit_price: price,
            customer_id: customer.to_string(),
            region: region.to_string(),
        }
    }

    fn two_region_sample() -> Vec<Transaction> {
        vec![
            tx("T001", "2024-01-01", "A", 2, 100.0, "C1", "North"),
            tx("T002", "2024-01-02", "B", 1, 50.0, "C2", "South"),
        ]
    }

    fn mixed_sample() -> Vec<Transaction> {
        vec![
            tx("T001", "2024-12-03", "Laptop", 2, 45000.0, "C001", "North"),
            tx("T002", "2024-12-01", "Mouse", 12, 500.0, "C002", "South"),
            tx("T003", "2024-12-03", "Mouse", 3, 500.0, "C001", "North"),
            tx("T004", "2024-12-02", "Keyboard", 4, 1500.0, "C003", "East"),
            tx("T005", "2024-12-01", "Monitor", 1, 12000.0, "C002", "West"),
            tx("T006", "2024-12-02", "Webcam", 5, 2000.0, "C004", "South"),
        ]
    }

    #[test]
    fn test_total_revenue() {
        assert_eq!(total_revenue(&two_region_sample()), 250.0);
        assert_eq!(total_revenue(&[]), 0.0);
    }

    #[test]
    fn test_region_wise_sales() {
        let regions = region_wise_sales(&two_region_sample());

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, "North");
        assert_eq!(regions[0].total_sales, 200.0);
        assert_eq!(regions[0].transaction_count, 1);
        assert!((regions[0].percentage - 80.0).abs() < 1e-9);
        assert_eq!(regions[1].region, "South");
        assert_eq!(regions[1].total_sales, 50.0);
        assert!((regions[1].percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_region_ties_keep_first_seen_order() {
        let data = vec![
            tx("T001", "2024-01-01", "A", 1, 10.0, "C1", "West"),
            tx("T002", "2024-01-01", "A", 1, 10.0, "C1", "East"),
            tx("T003", "2024-01-01", "A", 1, 30.0, "C1", "North"),
        ];
        let names: Vec<_> = region_wise_sales(&data)
            .into_iter()
            .map(|r| r.region)
            .collect();
        assert_eq!(names, vec!["North", "West", "East"]);
    }

    #[test]
    fn test_region_percentages_sum_to_100() {
        let total: f64 = region_wise_sales(&mixed_sample())
            .iter()
            .map(|r| r.percentage)
            .sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_views_agree_on_grand_total() {
        let data = mixed_sample();
        let grand = total_revenue(&data);

        let regions: f64 = region_wise_sales(&data).iter().map(|r| r.total_sales).sum();
        let products: f64 = top_selling_products(&data, usize::MAX)
            .iter()
            .map(|p| p.total_revenue)
            .sum();
        let days: f64 = daily_sales_trend(&data).iter().map(|d| d.revenue).sum();

        assert!((regions - grand).abs() < 1e-6);
        assert!((products - grand).abs() < 1e-6);
        assert!((days - grand).abs() < 1e-6);
    }

    #[test]
    fn test_counts_cover_every_transaction() {
        let data = mixed_sample();
        let regions: usize = region_wise_sales(&data).iter().map(|r| r.transaction_count).sum();
        let customers: usize = customer_analysis(&data).iter().map(|c| c.purchase_count).sum();
        let days: usize = daily_sales_trend(&data).iter().map(|d| d.transaction_count).sum();

        assert_eq!(regions, data.len());
        assert_eq!(customers, data.len());
        assert_eq!(days, data.len());
    }

    #[test]
    fn test_top_selling_products() {
        let top = top_selling_products(&mixed_sample(), 3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].product_name, "Mouse");
        assert_eq!(top[0].total_quantity, 15);
        assert_eq!(top[0].total_revenue, 7500.0);
        assert_eq!(top[1].product_name, "Webcam");
        assert_eq!(top[2].product_name, "Keyboard");
    }

    #[test]
    fn test_top_selling_products_tie_keeps_first_seen() {
        let data = vec![
            tx("T001", "2024-01-01", "Gadget", 5, 1.0, "C1", "North"),
            tx("T002", "2024-01-01", "Widget", 5, 100.0, "C1", "North"),
        ];
        let top = top_selling_products(&data, DEFAULT_TOP_N);

        assert_eq!(top[0].product_name, "Gadget");
        assert_eq!(top[1].product_name, "Widget");
    }

    #[test]
    fn test_top_selling_products_is_repeatable() {
        let data = mixed_sample();
        assert_eq!(
            top_selling_products(&data, DEFAULT_TOP_N),
            top_selling_products(&data, DEFAULT_TOP_N)
        );
    }

    #[test]
    fn test_product_keys_are_exact() {
        let data = vec![
            tx("T001", "2024-01-01", "Mouse", 1, 1.0, "C1", "North"),
            tx("T002", "2024-01-01", "mouse", 1, 1.0, "C1", "North"),
            tx("T003", "2024-01-01", "Mouse ", 1, 1.0, "C1", "North"),
        ];
        assert_eq!(top_selling_products(&data, 10).len(), 3);
    }

    #[test]
    fn test_customer_analysis() {
        let customers = customer_analysis(&mixed_sample());

        assert_eq!(customers[0].customer_id, "C001");
        assert_eq!(customers[0].total_spent, 91500.0);
        assert_eq!(customers[0].purchase_count, 2);
        assert_eq!(customers[0].average_order_value, 45750.0);
        assert_eq!(customers[0].products_bought, vec!["Laptop", "Mouse"]);

        assert_eq!(customers[1].customer_id, "C002");
        assert_eq!(customers[1].total_spent, 18000.0);
    }

    #[test]
    fn test_customer_ties_keep_first_seen_order() {
        let data = vec![
            tx("T001", "2024-01-01", "Mouse", 2, 50.0, "C9", "North"),
            tx("T002", "2024-01-01", "Cable", 1, 100.0, "C1", "South"),
            tx("T003", "2024-01-02", "Laptop", 1, 500.0, "C5", "East"),
        ];
        let ids: Vec<_> = customer_analysis(&data)
            .into_iter()
            .map(|c| c.customer_id)
            .collect();
        assert_eq!(ids, vec!["C5", "C9", "C1"]);
    }

    #[test]
    fn test_customer_keys_are_exact() {
        let data = vec![
            tx("T001", "2024-01-01", "Mouse", 1, 10.0, "C1", "North"),
            tx("T002", "2024-01-01", "Mouse", 1, 10.0, "c1", "North"),
        ];
        let customers = customer_analysis(&data);
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].customer_id, "C1");
        assert_eq!(customers[1].customer_id, "c1");
        assert!(customers.iter().all(|c| c.purchase_count == 1));
    }

    #[test]
    fn test_customer_products_are_distinct() {
        let data = vec![
            tx("T001", "2024-01-01", "Mouse", 1, 1.0, "C1", "North"),
            tx("T002", "2024-01-02", "Mouse", 1, 1.0, "C1", "North"),
        ];
        let customers = customer_analysis(&data);
        assert_eq!(customers[0].products_bought, vec!["Mouse"]);
        assert_eq!(customers[0].purchase_count, 2);
    }

    #[test]
    fn test_daily_sales_trend_is_chronological() {
        let trend = daily_sales_trend(&mixed_sample());
        let dates: Vec<_> = trend.iter().map(|d| d.date.to_string()).collect();

        assert_eq!(dates, vec!["2024-12-01", "2024-12-02", "2024-12-03"]);
        assert_eq!(trend[0].revenue, 18000.0);
        assert_eq!(trend[0].transaction_count, 2);
        assert_eq!(trend[0].unique_customers, 1);
        assert_eq!(trend[1].unique_customers, 2);
    }

    #[test]
    fn test_find_peak_sales_day() {
        let peak = find_peak_sales_day(&two_region_sample()).unwrap();
        assert_eq!(peak.date.to_string(), "2024-01-01");
        assert_eq!(peak.revenue, 200.0);
        assert_eq!(peak.transaction_count, 1);
    }

    #[test]
    fn test_peak_day_matches_trend_maximum() {
        let data = mixed_sample();
        let peak = find_peak_sales_day(&data).unwrap();
        let max = daily_sales_trend(&data)
            .iter()
            .map(|d| d.revenue)
            .fold(f64::MIN, f64::max);
        assert_eq!(peak.revenue, max);
    }

    #[test]
    fn test_peak_day_tie_keeps_first_encountered() {
        let data = vec![
            tx("T001", "2024-03-05", "A", 1, 100.0, "C1", "North"),
            tx("T002", "2024-03-01", "A", 1, 100.0, "C1", "North"),
        ];
        let peak = find_peak_sales_day(&data).unwrap();
        assert_eq!(peak.date.to_string(), "2024-03-05");
    }

    #[test]
    fn test_peak_day_empty_input() {
        assert_eq!(find_peak_sales_day(&[]), Err(AnalysisError::NoData));
    }

    #[test]
    fn test_low_performing_products() {
        let low = low_performing_products(&mixed_sample(), DEFAULT_LOW_THRESHOLD);
        let names: Vec<_> = low.iter().map(|p| p.product_name.as_str()).collect();

        assert_eq!(names, vec!["Monitor", "Laptop", "Keyboard", "Webcam"]);
        assert!(low.iter().all(|p| p.total_quantity < DEFAULT_LOW_THRESHOLD));
    }

    #[test]
    fn test_low_performers_grow_with_threshold() {
        let data = mixed_sample();
        let narrow = low_performing_products(&data, 3);
        let wide = low_performing_products(&data, 20);

        assert!(narrow.iter().all(|p| wide.contains(p)));
        assert!(wide.len() > narrow.len());
    }

    #[test]
    fn test_low_performers_can_be_empty() {
        let data = vec![tx("T001", "2024-01-01", "A", 50, 1.0, "C1", "North")];
        assert!(low_performing_products(&data, DEFAULT_LOW_THRESHOLD).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(total_revenue(&[]), 0.0);
        assert!(region_wise_sales(&[]).is_empty());
        assert!(top_selling_products(&[], DEFAULT_TOP_N).is_empty());
        assert!(customer_analysis(&[]).is_empty());
        assert!(daily_sales_trend(&[]).is_empty());
        assert!(low_performing_products(&[], DEFAULT_LOW_THRESHOLD).is_empty());
    }

    #[test]
    fn test_sales_analysis_compute() {
        let analysis = SalesAnalysis::compute(&mixed_sample(), 2, DEFAULT_LOW_THRESHOLD);

        assert_eq!(analysis.transaction_count, 6);
        assert_eq!(analysis.top_products.len(), 2);
        assert_eq!(analysis.average_order_value(), analysis.total_revenue / 6.0);
        let (first, last) = analysis.date_range().unwrap();
        assert_eq!(first.to_string(), "2024-12-01");
        assert_eq!(last.to_string(), "2024-12-03");
        assert_eq!(analysis.peak_day.unwrap().date.to_string(), "2024-12-03");
    }

    #[test]
    fn test_sales_analysis_empty() {
        let analysis = SalesAnalysis::compute(&[], DEFAULT_TOP_N, DEFAULT_LOW_THRESHOLD);
        assert_eq!(analysis.average_order_value(), 0.0);
        assert!(analysis.peak_day.is_none());
        assert!(analysis.date_range().is_none());
    }
}
