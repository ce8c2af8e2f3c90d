//! Output persistence.

use crate::models::EnrichedTransaction;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Column header of the enriched data file.
pub const ENRICHED_HEADER: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Write enriched records as a pipe-delimited file with a header row.
pub fn save_enriched_data(enriched: &[EnrichedTransaction], path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        // fields never contain '|', so values are written verbatim
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    // written explicitly so an empty data set still gets its header
    writer.write_record(ENRICHED_HEADER)?;
    for record in enriched {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("Saved {} enriched records to {}", enriched.len(), path.display());
    Ok(())
}

/// Write a rendered report to `path`.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogProduct, Transaction};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample() -> Vec<EnrichedTransaction> {
        let tx = Transaction {
            transaction_id: "T001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            product_id: "P101".to_string(),
            product_name: "Laptop".to_string(),
            quantity: 2,
            unit_price: 45000.0,
            customer_id: "C001".to_string(),
            region: "North".to_string(),
        };
        let product = CatalogProduct {
            id: 101,
            title: "Laptop".to_string(),
            category: "laptops".to_string(),
            brand: Some("Apple".to_string()),
            rating: Some(4.5),
        };
        vec![
            EnrichedTransaction::matched(&tx, &product),
            EnrichedTransaction::unmatched(&Transaction {
                transaction_id: "T002".to_string(),
                product_id: "P999".to_string(),
                ..tx
            }),
        ]
    }

    #[test]
    fn test_save_enriched_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("enriched.txt");

        save_enriched_data(&sample(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ENRICHED_HEADER.join("|"));
        assert_eq!(
            lines[1],
            "T001|2024-12-01|P101|Laptop|2|45000.0|C001|North|laptops|Apple|4.5|true"
        );
        assert_eq!(lines[2], "T002|2024-12-01|P999|Laptop|2|45000.0|C001|North|||false");
    }

    #[test]
    fn test_save_enriched_data_round_trips_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("enriched.txt");
        save_enriched_data(&sample(), &path).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .from_path(&path)
            .unwrap();
        let records: Vec<EnrichedTransaction> =
            reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records, sample());
    }

    #[test]
    fn test_save_enriched_data_keeps_quotes_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("enriched.txt");

        let tx = Transaction {
            transaction_id: "T001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            product_id: "P101".to_string(),
            product_name: "Monitor 24\"".to_string(),
            quantity: 1,
            unit_price: 1.0,
            customer_id: "C001".to_string(),
            region: "North".to_string(),
        };
        save_enriched_data(&[EnrichedTransaction::unmatched(&tx)], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().nth(1).unwrap(),
            "T001|2024-01-05|P101|Monitor 24\"|1|1.0|C001|North|||false"
        );
    }

    #[test]
    fn test_save_empty_keeps_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("enriched.txt");
        save_enriched_data(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), ENRICHED_HEADER.join("|"));
    }

    #[test]
    fn test_write_report_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output").join("sales_report.txt");

        write_report("REPORT", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "REPORT");
    }
}
