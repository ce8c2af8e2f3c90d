//! Sales Analytics - batch analysis of pipe-delimited sales logs.
//!
//! The pipeline reads a sales log ([`ingest`]), validates and filters it,
//! aggregates it ([`analysis`]), attaches product catalog metadata
//! ([`enrich`]) and renders the results ([`report`]).

pub mod analysis;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod ingest;
pub mod models;
pub mod report;
