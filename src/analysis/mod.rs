//! Analysis modules.
//!
//! Pure aggregation over validated transactions. Nothing here performs I/O
//! or keeps state between calls.

pub mod aggregator;

pub use aggregator::*;
