//! Sales log reading.
//!
//! Loads the raw log from disk, decoding it as UTF-8 and falling back to
//! Latin-1 for files exported by legacy tools.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Text encodings tried in order when decoding the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

/// Decode raw bytes, returning the text and the encoding that worked.
pub fn decode(bytes: &[u8]) -> (String, Encoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), Encoding::Utf8),
        // every byte is a valid Latin-1 code point
        Err(_) => (bytes.iter().map(|&b| char::from(b)).collect(), Encoding::Latin1),
    }
}

/// Split decoded text into data lines, dropping the header and blank lines.
pub fn data_lines(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect()
}

/// Read the sales log at `path` and return its data lines.
pub fn read_sales_data(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read sales data: {}", path.display()))?;

    let (text, encoding) = decode(&bytes);
    if encoding != Encoding::Utf8 {
        warn!("{} is not valid UTF-8, decoded as {:?}", path.display(), encoding);
    }

    let lines = data_lines(&text);
    debug!("Read {} data lines from {}", lines.len(), path.display());

    Ok(lines)
}
