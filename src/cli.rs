//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Sales Analytics - batch sales log analysis with catalog enrichment
///
/// Reads a pipe-delimited sales log, validates and filters it, computes
/// regional, product, customer and daily statistics, enriches every record
/// with product catalog metadata, and writes an enriched data file plus a
/// text report.
///
/// Examples:
///   sales-analytics
///   sales-analytics --input data/sales_data.txt --region North
///   sales-analytics --min-amount 1000 --max-amount 50000 --offline
///   sales-analytics --interactive
///   sales-analytics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Sales log to analyze
    ///
    /// Defaults to the configured input (data/sales_data.txt).
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file for the enriched pipe-delimited data
    #[arg(long, value_name = "FILE")]
    pub enriched_output: Option<PathBuf>,

    /// Output file for the report
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub report_output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sales-analytics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep only transactions from this region (exact match)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Drop transactions whose amount is below this value
    #[arg(long, value_name = "AMOUNT")]
    pub min_amount: Option<f64>,

    /// Drop transactions whose amount is above this value
    #[arg(long, value_name = "AMOUNT")]
    pub max_amount: Option<f64>,

    /// Prompt for filters on the terminal
    #[arg(long)]
    pub interactive: bool,

    /// Number of rows in the top products and customers tables
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Quantity below which a product is reported as low performing
    #[arg(long, value_name = "QTY")]
    pub low_threshold: Option<u64>,

    /// Product catalog base URL
    #[arg(long, value_name = "URL", env = "SALES_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Catalog request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the product catalog; every record is written unmatched
    #[arg(long)]
    pub offline: bool,

    /// Report format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .sales-analytics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text with section banners (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(format!(
                    "Minimum amount {} is greater than maximum amount {}",
                    min, max
                ));
            }
        }

        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        if let Some(ref url) = self.catalog_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Catalog URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref input) = self.input {
            if input.is_dir() {
                return Err(format!("Input path is a directory: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Builds the log filter.
    ///
    /// `RUST_LOG` directives win when set. Otherwise the level comes from the
    /// flags, with `config_verbose` raising it to DEBUG unless `--quiet` is given.
    pub fn log_filter(&self, config_verbose: bool) -> EnvFilter {
        let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
        self.log_filter_with(config_verbose, &directives)
    }

    fn log_filter_with(&self, config_verbose: bool, directives: &str) -> EnvFilter {
        let level = if config_verbose && !self.quiet {
            tracing::Level::DEBUG
        } else {
            self.log_level()
        };

        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(level).into())
            .parse_lossy(directives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args::parse_from(["sales-analytics"])
    }

    #[test]
    fn test_defaults() {
        let args = make_args();
        assert!(args.input.is_none());
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.offline);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_filters() {
        let args = Args::parse_from([
            "sales-analytics",
            "--region",
            "East",
            "--min-amount",
            "100",
            "--max-amount",
            "5000.5",
            "--format",
            "json",
        ]);
        assert_eq!(args.region.as_deref(), Some("East"));
        assert_eq!(args.min_amount, Some(100.0));
        assert_eq!(args.max_amount, Some(5000.5));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validation_min_above_max() {
        let mut args = make_args();
        args.min_amount = Some(10.0);
        args.max_amount = Some(5.0);
        assert!(args.validate().is_err());

        args.max_amount = Some(10.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.catalog_url = Some("dummyjson.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.top_n = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_filter_levels() {
        let mut args = make_args();
        assert_eq!(args.log_filter_with(false, "").max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(args.log_filter_with(true, "").max_level_hint(), Some(LevelFilter::DEBUG));

        args.quiet = true;
        assert_eq!(args.log_filter_with(true, "").max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_log_filter_env_directives_win() {
        let args = make_args();
        assert_eq!(args.log_filter_with(true, "warn").max_level_hint(), Some(LevelFilter::WARN));
    }
}
