//! Reference-data snapshots for one pipeline run.
//!
//! The pipeline never touches the database mid-run: the caller loads immutable
//! snapshots of the protein, flavor, and header reference tables up front and
//! hands them to the pure stages as plain maps. Missing keys during a run are
//! typed errors rather than panics, so a stale menu shows up as a diagnostic
//! instead of a crash.

use crate::core::clean::{FlavorMapping, FlavorTarget, HeaderField, HeaderMapping};
use crate::entities::{Flavor, OrderHeader, Protein};
use crate::errors::Result;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cooking metadata for one protein, keyed by canonical protein key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinInfo {
    /// Display label (e.g., `"Beef Bison"`)
    pub label: String,
    /// Expected cooking weight loss percentage
    pub shrink: f64,
    /// Raw pounds purchased per unit
    pub lbs_per: f64,
    /// Optional display color for report rows
    pub display_color: Option<String>,
}

/// Fallback metadata for one flavor, keyed by canonical flavor key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorInfo {
    /// Display label (e.g., `"BBQ"`)
    pub label: String,
    /// Base flavor key this flavor can net against, None when there is no fallback
    pub base_flavor: Option<String>,
}

/// Loads the protein reference table into a snapshot map keyed by protein key.
pub async fn load_protein_info(db: &DatabaseConnection) -> Result<HashMap<String, ProteinInfo>> {
    let rows = Protein::find().all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.name,
                ProteinInfo {
                    label: row.label,
                    shrink: row.shrink,
                    lbs_per: row.lbs_per,
                    display_color: row.display_color,
                },
            )
        })
        .collect())
}

/// Loads the flavor reference table into a snapshot map keyed by flavor key.
pub async fn load_flavor_info(db: &DatabaseConnection) -> Result<HashMap<String, FlavorInfo>> {
    let rows = Flavor::find().all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.name,
                FlavorInfo {
                    label: row.label,
                    base_flavor: row.base_flavor,
                },
            )
        })
        .collect())
}

/// Builds the cleaning step's flavor mapping: order-sheet raw label to
/// canonical flavor key and display label.
pub async fn load_flavor_mapping(db: &DatabaseConnection) -> Result<FlavorMapping> {
    let rows = Flavor::find().all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.raw_label,
                FlavorTarget {
                    flavor: row.name,
                    flavor_label: row.label,
                },
            )
        })
        .collect())
}

/// Loads the order-sheet header mapping: logical field name to raw column label.
pub async fn load_header_mapping(db: &DatabaseConnection) -> Result<HeaderMapping> {
    let rows = OrderHeader::find().all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.name,
                HeaderField {
                    label: row.label,
                    raw_label: row.raw_label,
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_test_menu, setup_test_db};

    #[tokio::test]
    async fn test_load_protein_info() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_menu(&db).await?;

        let info = load_protein_info(&db).await?;
        let chicken = info.get("chicken").ok_or_else(|| crate::errors::Error::Config {
            message: "chicken missing from snapshot".to_string(),
        })?;
        assert_eq!(chicken.label, "Chicken");
        assert!((chicken.shrink - 20.0).abs() < f64::EPSILON);

        Ok(())
    }

    #[tokio::test]
    async fn test_load_flavor_mapping_keys_by_raw_label() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_menu(&db).await?;

        let mapping = load_flavor_mapping(&db).await?;
        let plain = mapping
            .get("COMPETITOR-PREP (100% PLAIN-PLAIN)")
            .ok_or_else(|| crate::errors::Error::Config {
                message: "plain missing from mapping".to_string(),
            })?;
        assert_eq!(plain.flavor, "plain");

        Ok(())
    }

    #[tokio::test]
    async fn test_load_flavor_info_carries_base_flavor() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_menu(&db).await?;

        let info = load_flavor_info(&db).await?;
        assert_eq!(
            info.get("spicybbq").and_then(|f| f.base_flavor.as_deref()),
            Some("bbq")
        );
        assert_eq!(info.get("plain").and_then(|f| f.base_flavor.as_deref()), None);

        Ok(())
    }

    #[tokio::test]
    async fn test_load_header_mapping() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_menu(&db).await?;

        let mapping = load_header_mapping(&db).await?;
        assert_eq!(mapping.raw_label("first_name")?, "First Name");
        assert_eq!(mapping.raw_label("item_name")?, "Item Name");
        assert!(mapping.raw_label("not_a_field").is_err());

        Ok(())
    }
}
