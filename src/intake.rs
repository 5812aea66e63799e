//! CSV intake - reads an exported order sheet into raw rows.
//!
//! The reader stays deliberately dumb: every cell comes through as text keyed
//! by its column label, exactly as exported. All validation (required headers,
//! container extraction, quantity parsing) belongs to the cleaning stage, so a
//! malformed sheet produces cleaning diagnostics rather than a read failure.

use crate::core::clean::RawRow;
use crate::errors::Result;
use std::path::Path;
use tracing::debug;

/// Reads an order-sheet CSV into raw rows keyed by column label.
///
/// Cells beyond the header width are dropped; short records leave their
/// trailing columns absent, which the cleaning stage treats as empty.
pub fn read_order_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    debug!("Read {} order row(s) from {:?}", rows.len(), path.as_ref());
    Ok(rows)
}
