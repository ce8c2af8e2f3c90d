//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sales-analytics.toml` files.

use crate::enrich::CatalogConfig;
use crate::ingest::FilterOptions;
use crate::report::ReportSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sales-analytics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Product catalog settings.
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Default filters.
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Sales log to read.
    #[serde(default = "default_input")]
    pub input: String,

    /// Where the enriched pipe-delimited data goes.
    #[serde(default = "default_enriched_output")]
    pub enriched_output: String,

    /// Where the report goes.
    #[serde(default = "default_report_output")]
    pub report_output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            enriched_output: default_enriched_output(),
            report_output: default_report_output(),
            verbose: false,
        }
    }
}

fn default_input() -> String {
    "data/sales_data.txt".to_string()
}

fn default_enriched_output() -> String {
    "data/enriched_sales_data.txt".to_string()
}

fn default_report_output() -> String {
    "output/sales_report.txt".to_string()
}

/// Product catalog API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Fetch catalog data at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Catalog base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size of the bulk product request.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Concurrent single-product lookups.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Look up products missing from the bulk list individually.
    #[serde(default = "default_true")]
    pub lookup_missing: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            limit: default_limit(),
            timeout_seconds: default_timeout(),
            concurrency: default_concurrency(),
            lookup_missing: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://dummyjson.com".to_string()
}

fn default_limit() -> usize {
    100
}

fn default_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    4
}

/// Report tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Rows in the top products/customers tables.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Products selling fewer units than this are flagged.
    #[serde(default = "default_low_threshold")]
    pub low_stock_threshold: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            low_stock_threshold: default_low_threshold(),
        }
    }
}

fn default_top_n() -> usize {
    crate::analysis::DEFAULT_TOP_N
}

fn default_low_threshold() -> u64 {
    crate::analysis::DEFAULT_LOW_THRESHOLD
}

/// Filters applied when none are given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
}

impl From<&FilterConfig> for FilterOptions {
    fn from(config: &FilterConfig) -> Self {
        Self {
            region: config.region.clone(),
            min_amount: config.min_amount,
            max_amount: config.max_amount,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = input.display().to_string();
        }
        if let Some(ref path) = args.enriched_output {
            self.general.enriched_output = path.display().to_string();
        }
        if let Some(ref path) = args.report_output {
            self.general.report_output = path.display().to_string();
        }

        if let Some(ref url) = args.catalog_url {
            self.catalog.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.catalog.timeout_seconds = timeout;
        }
        if args.offline {
            self.catalog.enabled = false;
        }

        if let Some(top_n) = args.top_n {
            self.analysis.top_n = top_n;
        }
        if let Some(threshold) = args.low_threshold {
            self.analysis.low_stock_threshold = threshold;
        }

        // Filters from the command line replace the configured ones individually
        if args.region.is_some() {
            self.filter.region = args.region.clone();
        }
        if args.min_amount.is_some() {
            self.filter.min_amount = args.min_amount;
        }
        if args.max_amount.is_some() {
            self.filter.max_amount = args.max_amount;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Catalog client settings derived from this configuration.
    pub fn catalog_config(&self, show_progress: bool) -> CatalogConfig {
        CatalogConfig {
            base_url: self.catalog.base_url.clone(),
            limit: self.catalog.limit,
            timeout_seconds: self.catalog.timeout_seconds,
            concurrency: self.catalog.concurrency,
            lookup_missing: self.catalog.lookup_missing,
            show_progress,
        }
    }

    /// Report settings derived from this configuration.
    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            top_n: self.analysis.top_n,
            low_threshold: self.analysis.low_stock_threshold,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
