//! Sales log ingestion.
//!
//! Reading, parsing and validation happen here, before any aggregation runs.

pub mod parser;
pub mod reader;
pub mod validate;

pub use parser::{parse_transactions, RawTransaction};
pub use reader::read_sales_data;
pub use validate::{
    filter_choices, validate_and_filter, FilterChoices, FilterOptions, FilterSummary,
    ValidationOutcome,
};
