//! Product catalog client and transaction enrichment.
//!
//! Product metadata comes from a DummyJSON-style REST catalog:
//! - `GET {base}/products?limit=N` for the bulk list
//! - `GET {base}/products/{id}` for a single product
//!
//! Transactions are matched to catalog entries through the numeric suffix of
//! their product id (`P101` looks up product `101`).

use crate::models::{CatalogProduct, EnrichedTransaction, Transaction};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Catalog products keyed by numeric id.
pub type ProductMapping = HashMap<u32, CatalogProduct>;

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Page size of the bulk product request.
    pub limit: usize,
    pub timeout_seconds: u64,
    /// Maximum single-product requests in flight.
    pub concurrency: usize,
    /// Look up products missing from the bulk list one by one.
    pub lookup_missing: bool,
    pub show_progress: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dummyjson.com".to_string(),
            limit: 100,
            timeout_seconds: 10,
            concurrency: 4,
            lookup_missing: true,
            show_progress: true,
        }
    }
}

/// Bulk list response.
#[derive(Debug, Deserialize)]
struct ProductListResponse {
    #[serde(default)]
    products: Vec<CatalogProduct>,
}

/// HTTP client for the product catalog.
pub struct CatalogClient {
    config: CatalogConfig,
    http_client: reqwest::Client,
}

impl CatalogClient {
    /// Create a new client.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn describe_error(&self, e: reqwest::Error) -> anyhow::Error {
        if e.is_timeout() {
            anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
        } else if e.is_connect() {
            anyhow::anyhow!("Cannot connect to catalog at {}", self.config.base_url)
        } else {
            anyhow::anyhow!("Failed to send request: {}", e)
        }
    }

    async fn try_fetch_all(&self) -> Result<Vec<CatalogProduct>> {
        let url = self.url(&format!("products?limit={}", self.config.limit));
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.describe_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Catalog API error {}: {}", status, body));
        }

        let list: ProductListResponse = response
            .json()
            .await
            .context("Failed to parse catalog response")?;

        Ok(list.products)
    }

    /// Fetch the bulk product list.
    ///
    /// Failures are logged and produce an empty list so the run can continue
    /// with unmatched records.
    pub async fn fetch_all_products(&self) -> Vec<CatalogProduct> {
        match self.try_fetch_all().await {
            Ok(products) => {
                info!("Fetched {} products from catalog", products.len());
                products
            }
            Err(e) => {
                warn!("Bulk catalog fetch failed: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Fetch one product. Returns `Ok(None)` when the catalog has no such id.
    pub async fn fetch_product(&self, id: u32) -> Result<Option<CatalogProduct>> {
        let url = self.url(&format!("products/{}", id));
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.describe_error(e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Catalog API error {}", response.status()));
        }

        let product = response
            .json()
            .await
            .with_context(|| format!("Failed to parse catalog product {}", id))?;

        Ok(Some(product))
    }

    /// Look up products referenced by `transactions` but absent from `mapping`.
    ///
    /// Hits are inserted into `mapping`. Returns the number of products added.
    pub async fn fill_missing(&self, mapping: &mut ProductMapping, transactions: &[Transaction]) -> usize {
        if !self.config.lookup_missing {
            return 0;
        }

        let missing = missing_product_numbers(transactions, mapping);
        if missing.is_empty() {
            return 0;
        }
        info!("Looking up {} products missing from the bulk list", missing.len());

        let progress = if self.config.show_progress {
            let pb = ProgressBar::new(missing.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} products")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let results: Vec<(u32, Result<Option<CatalogProduct>>)> = stream::iter(missing)
            .map(|id| async move { (id, self.fetch_product(id).await) })
            .buffer_unordered(self.config.concurrency.max(1))
            .inspect(|_| {
                if let Some(ref pb) = progress {
                    pb.inc(1);
                }
            })
            .collect()
            .await;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let mut added = 0;
        for (id, result) in results {
            match result {
                Ok(Some(product)) => {
                    mapping.insert(id, product);
                    added += 1;
                }
                Ok(None) => debug!("Product {} not in catalog", id),
                Err(e) => warn!("Lookup of product {} failed: {:#}", id, e),
            }
        }

        added
    }
}

/// Index catalog products by id.
pub fn create_product_mapping(products: Vec<CatalogProduct>) -> ProductMapping {
    products.into_iter().map(|p| (p.id, p)).collect()
}

/// Numeric part of a product id: `P101` gives `101`.
pub fn product_number(product_id: &str) -> Option<u32> {
    product_id.strip_prefix('P')?.trim().parse().ok()
}

/// Product numbers used by `transactions` that `mapping` lacks, first-seen order.
pub fn missing_product_numbers(transactions: &[Transaction], mapping: &ProductMapping) -> Vec<u32> {
    let mut seen = HashSet::new();
    transactions
        .iter()
        .filter_map(|tx| product_number(&tx.product_id))
        .filter(|id| !mapping.contains_key(id) && seen.insert(*id))
        .collect()
}

/// Attach catalog metadata to every transaction.
pub fn enrich_sales_data(transactions: &[Transaction], mapping: &ProductMapping) -> Vec<EnrichedTransaction> {
    transactions
        .iter()
        .map(|tx| {
            match product_number(&tx.product_id).and_then(|id| mapping.get(&id)) {
                Some(product) => EnrichedTransaction::matched(tx, product),
                None => EnrichedTransaction::unmatched(tx),
            }
        })
        .collect()
}
