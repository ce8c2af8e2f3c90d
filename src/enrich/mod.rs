//! Catalog enrichment.
//!
//! This module provides the product catalog client and the pure mapping
//! from transactions to enriched records.

pub mod catalog;

pub use catalog::{
    create_product_mapping, enrich_sales_data, product_number, CatalogClient, CatalogConfig,
    ProductMapping,
};
