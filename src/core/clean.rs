//! Order cleaning - turns raw uploaded rows into typed, validated orders.
//!
//! This is the first stage of the pipeline. It verifies that the uploaded sheet
//! carries every required column, then walks the rows in input order extracting
//! the container size and total weight from the free-text item name, resolving
//! flavor synonyms through the flavor mapping, and normalizing the protein label
//! into a canonical key. A row that cannot be cleaned is recorded as a
//! [`CleaningError`] and skipped - one bad line never aborts the upload - while
//! a flavor label missing from the reference mapping aborts the batch, since
//! that means the reference data is stale rather than the sheet being wrong.

use crate::errors::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error as ThisError;
use tracing::debug;

/// One uploaded row: raw CSV column label to cell text.
pub type RawRow = HashMap<String, String>;

/// The container tiers a line item can be packed in.
///
/// Everything except [`ContainerSize::Bulk`] is a fixed ounce size; bulk items
/// are ordered by the pound and converted to ounces during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerSize {
    /// 2.5 ounce cup
    #[serde(rename = "2.5oz")]
    Oz2_5,
    /// 4 ounce container
    #[serde(rename = "4oz")]
    Oz4,
    /// 6 ounce container
    #[serde(rename = "6oz")]
    Oz6,
    /// 8 ounce container
    #[serde(rename = "8oz")]
    Oz8,
    /// 10 ounce container
    #[serde(rename = "10oz")]
    Oz10,
    /// Pound-denominated bulk order
    #[serde(rename = "bulk")]
    Bulk,
}

impl ContainerSize {
    /// The literal size tag used on order sheets and in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Oz2_5 => "2.5oz",
            Self::Oz4 => "4oz",
            Self::Oz6 => "6oz",
            Self::Oz8 => "8oz",
            Self::Oz10 => "10oz",
            Self::Bulk => "bulk",
        }
    }

    /// Parses a space-stripped, lowercased size tag like `"8oz"`.
    ///
    /// Only the fixed ounce tiers are recognized here; bulk is decided by the
    /// unit in the item name, not by a size tag.
    fn from_size_tag(tag: &str) -> Option<Self> {
        match tag {
            "2.5oz" => Some(Self::Oz2_5),
            "4oz" => Some(Self::Oz4),
            "6oz" => Some(Self::Oz6),
            "8oz" => Some(Self::Oz8),
            "10oz" => Some(Self::Oz10),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One logical order field bound to a raw CSV column label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    /// Human-readable label for settings screens
    pub label: String,
    /// Exact column label expected in the uploaded CSV
    pub raw_label: String,
}

/// Mapping from logical field names to their raw CSV column labels.
///
/// Backed by a `BTreeMap` so missing-header diagnostics always come out in the
/// same order regardless of how the mapping was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    fields: BTreeMap<String, HeaderField>,
}

impl HeaderMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a logical field name to a header field.
    pub fn insert(&mut self, logical: impl Into<String>, field: HeaderField) {
        self.fields.insert(logical.into(), field);
    }

    /// Looks up the raw CSV column label for a logical field name.
    pub fn raw_label(&self, logical: &str) -> Result<&str> {
        self.fields
            .get(logical)
            .map(|f| f.raw_label.as_str())
            .ok_or_else(|| Error::Config {
                message: format!("Order header mapping has no entry for logical field {logical:?}"),
            })
    }

    /// Iterates every raw column label the upload must carry, in sorted order.
    pub fn raw_labels(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(|f| f.raw_label.as_str())
    }
}

impl FromIterator<(String, HeaderField)> for HeaderMapping {
    fn from_iter<I: IntoIterator<Item = (String, HeaderField)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Resolution target for one raw flavor label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorTarget {
    /// Canonical flavor key (e.g., `"bbq"`)
    pub flavor: String,
    /// Display label (e.g., `"BBQ"`)
    pub flavor_label: String,
}

/// Mapping from canonical raw flavor label to its resolution target.
pub type FlavorMapping = HashMap<String, FlavorTarget>;

/// One cleaned order line item. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Customer's full name, first and last joined with one space
    pub full_name: String,
    /// Free-text item name as it appeared on the sheet
    pub item_name: String,
    /// Container tier the item ships in
    pub container: ContainerSize,
    /// Total weight in ounces across the whole quantity
    pub weight: f64,
    /// Canonical flavor key, empty for no-protein items
    pub flavor: String,
    /// Flavor display label
    pub flavor_label: String,
    /// Canonical protein key, empty for veggie/carb items
    pub protein: String,
    /// Protein display label
    pub protein_label: String,
    /// Number of units ordered
    pub quantity: u32,
}

/// A row-level cleaning problem. These are data carried in the batch result,
/// serialized for the staff-facing error list, never a hard failure on their own.
#[derive(Debug, Clone, PartialEq, Eq, ThisError, Serialize, Deserialize)]
pub enum CleaningError {
    /// The upload contained no rows at all
    #[error("No order rows were found in the upload")]
    NoRows,

    /// A required column label was absent from the sheet
    #[error("Missing required header {raw_label:?}")]
    MissingHeader {
        /// The raw column label that was not found
        raw_label: String,
    },

    /// No container/weight pattern could be extracted from the item name
    #[error("Row {row}: could not extract container size from item name {item_name:?}")]
    ContainerExtraction {
        /// Zero-based row index
        row: usize,
        /// The item name that failed the pattern match
        item_name: String,
    },

    /// The item name matched a size that is not one of the offered tiers
    #[error("Row {row}: unexpected container size {size:?}")]
    UnexpectedContainerSize {
        /// Zero-based row index
        row: usize,
        /// The size tag that was matched but not recognized
        size: String,
    },

    /// The quantity cell was not a positive integer
    #[error("Row {row}: quantity {value:?} is not a positive whole number")]
    InvalidQuantity {
        /// Zero-based row index
        row: usize,
        /// The offending quantity text
        value: String,
    },
}

/// Result of cleaning one uploaded batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedOrders {
    /// Successfully cleaned orders, in input order
    pub orders: Vec<Order>,
    /// Every row-level problem encountered; the caller decides whether any block progression
    pub cleaning_errors: Vec<CleaningError>,
}

lazy_static! {
    // Captures, e.g., "2 lbs", "4.5oz", "3lb", and "17 oz"
    static ref CONTAINER_RE: Regex =
        Regex::new(r"(?i)\b(\d+(\.\d+)?)\s?(lb|lbs|oz)\b").unwrap();
}

/// Remaps order-sheet flavor text to its canonical raw label before lookup.
///
/// An empty flavor cell and the bare `"100% PLAIN-PLAIN"` both mean the
/// competitor-prep plain item; `"SPICY BISON"` is the sheet's shorthand for
/// spicy beef bison. Everything else passes through unchanged.
#[must_use]
pub fn resolve_flavor_raw_label(raw: &str) -> &str {
    match raw {
        "" | "100% PLAIN-PLAIN" => "COMPETITOR-PREP (100% PLAIN-PLAIN)",
        "SPICY BISON" => "SPICY BEEF BISON",
        other => other,
    }
}

/// Derives the canonical protein key from an order-sheet protein label.
///
/// The three two-word proteins collapse to a single concatenated key
/// (`"Beef Bison"` becomes `"beefbison"`); every other label is simply
/// lowercased. An empty label yields an empty key, marking a veggie/carb item.
#[must_use]
pub fn derive_protein_key(label: &str) -> String {
    match label {
        "Beef Bison" | "Egg Whites" | "Mahi Mahi" => label
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<String>(),
        other => other.to_lowercase(),
    }
}

/// Verifies the upload is non-empty and that every required raw column label
/// exists on the first row. All missing headers are reported together so staff
/// can fix the sheet in one pass; no row processing happens when any are missing.
#[must_use]
pub fn check_required_headers(rows: &[RawRow], headers: &HeaderMapping) -> Vec<CleaningError> {
    if rows.is_empty() {
        debug!("Order upload contained no rows");
        return vec![CleaningError::NoRows];
    }

    let first_row = &rows[0];
    let mut errors = Vec::new();
    for raw_label in headers.raw_labels() {
        if !first_row.contains_key(raw_label) {
            debug!("Uploaded sheet is missing required header {raw_label:?}");
            errors.push(CleaningError::MissingHeader {
                raw_label: raw_label.to_string(),
            });
        }
    }
    errors
}

/// Extracts the container tier and total weight in ounces from an item name.
///
/// The pattern match is case-insensitive with word boundaries. A pound unit
/// means a bulk order (pounds x 16 x quantity ounces); an ounce unit must be
/// one of the offered fixed tiers, in which case the weight is the tier's
/// ounce size times the quantity.
fn extract_container_and_weight(
    item_name: &str,
    quantity: u32,
    row: usize,
) -> std::result::Result<(ContainerSize, f64), CleaningError> {
    let Some(caps) = CONTAINER_RE.captures(item_name) else {
        debug!("Could not extract container size from item name {item_name:?}");
        return Err(CleaningError::ContainerExtraction {
            row,
            item_name: item_name.to_string(),
        });
    };

    let amount: f64 = caps[1].parse().map_err(|_| CleaningError::ContainerExtraction {
        row,
        item_name: item_name.to_string(),
    })?;
    let unit = caps[3].to_lowercase();

    if unit.starts_with("lb") {
        let weight_in_oz = 16.0 * amount;
        return Ok((ContainerSize::Bulk, weight_in_oz * f64::from(quantity)));
    }

    let tag = caps[0].replace(' ', "").to_lowercase();
    match ContainerSize::from_size_tag(&tag) {
        Some(container) => Ok((container, amount * f64::from(quantity))),
        None => {
            debug!("Unexpected container size: {tag}");
            Err(CleaningError::UnexpectedContainerSize { row, size: tag })
        }
    }
}

/// Cleans one uploaded batch of raw rows into typed [`Order`] records.
///
/// Rows are processed in input order. Row-level problems (bad container
/// pattern, unlisted size, bad quantity) drop the row into the error list and
/// processing continues; a flavor label with no mapping entry aborts the whole
/// batch with [`Error::UnknownFlavor`] because the reference data is stale.
pub fn clean_order_rows(
    rows: &[RawRow],
    headers: &HeaderMapping,
    flavors: &FlavorMapping,
) -> Result<CleanedOrders> {
    let mut cleaning_errors = check_required_headers(rows, headers);
    if !cleaning_errors.is_empty() {
        return Ok(CleanedOrders {
            orders: Vec::new(),
            cleaning_errors,
        });
    }

    let first_name_col = headers.raw_label("first_name")?;
    let last_name_col = headers.raw_label("last_name")?;
    let item_name_col = headers.raw_label("item_name")?;
    let quantity_col = headers.raw_label("quantity")?;
    let flavor_col = headers.raw_label("flavor")?;
    let protein_col = headers.raw_label("protein")?;

    let cell = |row: &RawRow, col: &str| row.get(col).cloned().unwrap_or_default();

    let mut orders = Vec::new();
    for (row_idx, row) in rows.iter().enumerate() {
        let full_name = format!("{} {}", cell(row, first_name_col), cell(row, last_name_col));

        let quantity_text = cell(row, quantity_col);
        let quantity = match quantity_text.trim().parse::<u32>() {
            Ok(q) if q > 0 => q,
            _ => {
                cleaning_errors.push(CleaningError::InvalidQuantity {
                    row: row_idx,
                    value: quantity_text,
                });
                continue;
            }
        };

        let item_name = cell(row, item_name_col);
        let (container, weight) = match extract_container_and_weight(&item_name, quantity, row_idx)
        {
            Ok(extracted) => extracted,
            Err(e) => {
                cleaning_errors.push(e);
                continue;
            }
        };

        let raw_flavor_text = cell(row, flavor_col);
        let raw_flavor_label = resolve_flavor_raw_label(&raw_flavor_text);
        let target = flavors
            .get(raw_flavor_label)
            .ok_or_else(|| Error::UnknownFlavor {
                raw_label: raw_flavor_label.to_string(),
                row: row_idx,
            })?;

        let protein_label = cell(row, protein_col);
        let protein = derive_protein_key(&protein_label);

        orders.push(Order {
            full_name,
            item_name,
            container,
            weight,
            flavor: target.flavor.clone(),
            flavor_label: target.flavor_label.clone(),
            protein,
            protein_label,
            quantity,
        });
    }

    Ok(CleanedOrders {
        orders,
        cleaning_errors,
    })
}
