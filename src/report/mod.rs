//! Report generation and output files.

pub mod generator;
pub mod writer;

pub use generator::{format_currency, generate_json_report, generate_sales_report, ReportSettings};
pub use writer::{save_enriched_data, write_report, ENRICHED_HEADER};
