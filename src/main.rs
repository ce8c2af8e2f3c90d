//! Sales Analytics - command-line driver.
//!
//! Runs the ten-step pipeline: read, parse, choose filters, validate,
//! analyze, fetch the catalog, enrich, save enriched data, write the report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing input, unwritable output, bad config, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use sales_analytics::analysis::SalesAnalysis;
use sales_analytics::cli::{Args, OutputFormat};
use sales_analytics::config::{Config, CONFIG_FILE_NAME};
use sales_analytics::enrich::{self, CatalogClient, ProductMapping};
use sales_analytics::ingest::{self, FilterChoices, FilterOptions};
use sales_analytics::report::{self, format_currency};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the file can turn on verbose output
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, config.general.verbose);

    info!("Sales Analytics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_pipeline(&args, config).await {
        error!("Pipeline failed: {:#}", e);
        println!("\nAn error occurred:");
        println!("{:#}", e);
        println!("The program was unable to complete the process.\n");
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .sales-analytics.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize paths, catalog, filters, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings and `RUST_LOG`.
fn init_logging(args: &Args, verbose: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(args.log_filter(verbose))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete pipeline.
async fn run_pipeline(args: &Args, config: Config) -> Result<()> {
    println!("========================================");
    println!("        SALES ANALYTICS SYSTEM");
    println!("========================================\n");

    // Step 1: Read
    println!("[1/10] Reading sales data...");
    let raw_lines = ingest::read_sales_data(Path::new(&config.general.input))?;
    println!("✓ Successfully read {} raw lines\n", raw_lines.len());

    // Step 2: Parse
    println!("[2/10] Parsing and cleaning data...");
    let records = ingest::parse_transactions(&raw_lines);
    println!("✓ Parsed {} records\n", records.len());

    // Step 3: Filter options
    println!("[3/10] Filter Options Available:");
    let choices = ingest::filter_choices(&records);
    print_filter_choices(&choices);

    let filters = if args.interactive {
        prompt_filters(&choices)?
    } else {
        FilterOptions::from(&config.filter)
    };
    if !filters.is_empty() {
        debug!("Active filters: {:?}", filters);
    }
    println!();

    // Step 4: Validate + filter
    println!("[4/10] Validating transactions...");
    let outcome = ingest::validate_and_filter(&records, &filters);
    println!(
        "✓ Valid: {} | Invalid: {}\n",
        outcome.transactions.len(),
        outcome.invalid_count
    );
    let transactions = outcome.transactions;

    // Step 5: Analysis pass
    println!("[5/10] Analyzing sales data...");
    let settings = config.report_settings();
    let analysis = SalesAnalysis::compute(&transactions, settings.top_n, settings.low_threshold);
    info!(
        "Total revenue {} over {} regions, {} customers, {} days",
        format_currency(analysis.total_revenue),
        analysis.regions.len(),
        analysis.customers.len(),
        analysis.daily_trend.len()
    );
    match analysis.peak_day {
        Some(ref peak) => info!("Peak sales day: {}", peak),
        None => warn!("No valid transactions; peak day unavailable"),
    }
    println!("✓ Analysis complete\n");

    // Step 6: Catalog
    println!("[6/10] Fetching product data from API...");
    let client = if config.catalog.enabled {
        Some(CatalogClient::new(config.catalog_config(!args.quiet))?)
    } else {
        info!("Catalog disabled, skipping fetch");
        None
    };
    let mut mapping = match client {
        Some(ref client) => enrich::create_product_mapping(client.fetch_all_products().await),
        None => ProductMapping::new(),
    };
    println!("✓ Fetched {} products\n", mapping.len());

    // Step 7: Enrich
    println!("[7/10] Enriching sales data...");
    if let Some(ref client) = client {
        let added = client.fill_missing(&mut mapping, &transactions).await;
        if added > 0 {
            info!("Added {} products from individual lookups", added);
        }
    }
    let enriched = enrich::enrich_sales_data(&transactions, &mapping);
    let matched = enriched.iter().filter(|e| e.api_match).count();
    let total = enriched.len();
    let pct = if total > 0 {
        matched as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    println!("✓ Enriched {}/{} transactions ({:.1}%)\n", matched, total, pct);

    // Step 8: Save enriched data
    println!("[8/10] Saving enriched data...");
    let enriched_path = Path::new(&config.general.enriched_output);
    report::save_enriched_data(&enriched, enriched_path)?;
    println!("✓ Saved to: {}\n", enriched_path.display());

    // Step 9: Report
    println!("[9/10] Generating report...");
    let generated_at = Utc::now();
    let content = match args.format {
        OutputFormat::Text => {
            report::generate_sales_report(&transactions, &enriched, &settings, generated_at)
        }
        OutputFormat::Json => {
            report::generate_json_report(&transactions, &enriched, &settings, generated_at)?
        }
    };
    let report_path = Path::new(&config.general.report_output);
    report::write_report(&content, report_path)?;
    println!("✓ Report saved to: {}\n", report_path.display());

    // Step 10: Done
    println!("[10/10] Process Complete!");
    println!("========================================");

    Ok(())
}

fn print_filter_choices(choices: &FilterChoices) {
    println!("Regions: {}", choices.regions.join(", "));
    match choices.amount_range {
        Some((min, max)) => println!(
            "Amount Range: {} - {}",
            format_currency(min),
            format_currency(max)
        ),
        None => println!("Amount Range: No data"),
    }
    println!();
}

fn read_answer(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Ask for filters on the terminal.
///
/// Unknown regions are ignored; an unparseable amount discards both amount
/// filters.
fn prompt_filters(choices: &FilterChoices) -> Result<FilterOptions> {
    let mut filters = FilterOptions::default();

    if !read_answer("Do you want to filter data? (y/n): ")?.eq_ignore_ascii_case("y") {
        return Ok(filters);
    }
    println!("\n--- APPLY FILTERS ---");

    let region = read_answer("Enter region to filter (or press Enter to skip): ")?;
    if choices.regions.contains(&region) {
        filters.region = Some(region);
    } else if !region.is_empty() {
        println!("Unknown region '{}'. Region filter ignored.", region);
    }

    let min = read_answer("Minimum amount (or press Enter to skip): ")?;
    let max = read_answer("Maximum amount (or press Enter to skip): ")?;
    match (parse_amount(&min), parse_amount(&max)) {
        (Ok(min), Ok(max)) => {
            filters.min_amount = min;
            filters.max_amount = max;
        }
        _ => println!("Invalid amount entered. Filters ignored."),
    }

    Ok(filters)
}

fn parse_amount(answer: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    if answer.is_empty() {
        Ok(None)
    } else {
        answer.parse().map(Some)
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
