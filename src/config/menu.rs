//! Menu reference-data loading from menu.toml
//!
//! This module loads the kitchen's menu reference data - proteins, flavors, and
//! the order-sheet header mapping - from a TOML file and seeds the database with
//! it. Seeding only runs against empty tables, so an existing installation keeps
//! whatever the staff has edited through the settings screens.

use crate::entities::{Backstock, Flavor, OrderHeader, Protein, backstock, flavor, order_header, protein};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire menu.toml file
#[derive(Debug, Deserialize)]
pub struct MenuConfig {
    /// Protein reference entries to seed
    pub proteins: Vec<ProteinConfig>,
    /// Flavor reference entries to seed
    pub flavors: Vec<FlavorConfig>,
    /// Order-sheet header mapping entries to seed
    pub order_headers: Vec<OrderHeaderConfig>,
    /// Backstock lots to seed, usually empty outside of test installs
    #[serde(default)]
    pub backstock: Vec<BackstockConfig>,
}

/// Configuration for a single protein
#[derive(Debug, Deserialize, Clone)]
pub struct ProteinConfig {
    /// Canonical protein key (e.g., `"beefbison"`)
    pub name: String,
    /// Order-sheet display label (e.g., `"Beef Bison"`)
    pub label: String,
    /// Expected cooking shrink percentage
    pub shrink: f64,
    /// Raw pounds purchased per unit
    pub lbs_per: f64,
    /// Optional display color for report rows
    pub display_color: Option<String>,
}

/// Configuration for a single flavor
#[derive(Debug, Deserialize, Clone)]
pub struct FlavorConfig {
    /// Canonical flavor key (e.g., `"bbq"`)
    pub name: String,
    /// Display label
    pub label: String,
    /// Exact order-sheet flavor text
    pub raw_label: String,
    /// Base flavor key for fungible backstock, omitted when none
    pub base_flavor: Option<String>,
}

/// Configuration for one order-sheet header binding
#[derive(Debug, Deserialize, Clone)]
pub struct OrderHeaderConfig {
    /// Logical field name (e.g., `"first_name"`)
    pub name: String,
    /// Label for settings screens
    pub label: String,
    /// Raw CSV column label
    pub raw_label: String,
}

/// Configuration for one seeded backstock lot
#[derive(Debug, Deserialize, Clone)]
pub struct BackstockConfig {
    /// Protein key or veggie/carb name
    pub name: String,
    /// Flavor key the lot is labeled with, omitted for unflavored stock
    pub sub_name: Option<String>,
    /// Lot weight in ounces
    pub weight: f64,
    /// Whether the lot is a protein
    #[serde(default = "default_true")]
    pub is_protein: bool,
}

fn default_true() -> bool {
    true
}

/// Loads menu configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the menu.toml file
///
/// # Returns
/// * `Ok(MenuConfig)` - Successfully parsed configuration
/// * `Err(Error)` - Failed to read or parse the configuration file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MenuConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read menu config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse menu.toml: {e}"),
    })
}

/// Loads menu configuration from the default location (./menu.toml)
pub fn load_default_config() -> Result<MenuConfig> {
    load_config("menu.toml")
}

/// Seeds the reference tables from a loaded menu configuration.
///
/// Each table is only seeded when it is empty so repeated startups never
/// duplicate rows or clobber staff edits. Returns the number of rows inserted
/// across all tables.
pub async fn seed_menu(db: &DatabaseConnection, config: &MenuConfig) -> Result<u64> {
    let mut inserted = 0;

    if Protein::find().count(db).await? == 0 && !config.proteins.is_empty() {
        let models = config.proteins.iter().map(|p| protein::ActiveModel {
            name: Set(p.name.clone()),
            label: Set(p.label.clone()),
            shrink: Set(p.shrink),
            lbs_per: Set(p.lbs_per),
            display_color: Set(p.display_color.clone()),
            ..Default::default()
        });
        Protein::insert_many(models).exec(db).await?;
        inserted += config.proteins.len() as u64;
    }

    if Flavor::find().count(db).await? == 0 && !config.flavors.is_empty() {
        let models = config.flavors.iter().map(|f| flavor::ActiveModel {
            name: Set(f.name.clone()),
            label: Set(f.label.clone()),
            raw_label: Set(f.raw_label.clone()),
            base_flavor: Set(f.base_flavor.clone()),
            ..Default::default()
        });
        Flavor::insert_many(models).exec(db).await?;
        inserted += config.flavors.len() as u64;
    }

    if OrderHeader::find().count(db).await? == 0 && !config.order_headers.is_empty() {
        let models = config.order_headers.iter().map(|h| order_header::ActiveModel {
            name: Set(h.name.clone()),
            label: Set(h.label.clone()),
            raw_label: Set(h.raw_label.clone()),
            ..Default::default()
        });
        OrderHeader::insert_many(models).exec(db).await?;
        inserted += config.order_headers.len() as u64;
    }

    if Backstock::find().count(db).await? == 0 && !config.backstock.is_empty() {
        let now = chrono::Utc::now();
        let models = config.backstock.iter().map(|b| backstock::ActiveModel {
            name: Set(b.name.clone()),
            sub_name: Set(b.sub_name.clone()),
            weight: Set(b.weight),
            is_protein: Set(b.is_protein),
            available: Set(true),
            created_at: Set(now),
            deleted_on: Set(None),
            ..Default::default()
        });
        Backstock::insert_many(models).exec(db).await?;
        inserted += config.backstock.len() as u64;
    }

    info!("Menu seeding complete, {} rows inserted", inserted);
    Ok(inserted)
}
