//! Shared helpers for unit tests: in-memory databases, a small seeded menu,
//! and builders for the pipeline's value types.

use crate::config::database::create_tables;
use crate::config::menu::{
    FlavorConfig, MenuConfig, OrderHeaderConfig, ProteinConfig, seed_menu,
};
use crate::core::backstock::BackstockLot;
use crate::core::clean::{
    ContainerSize, FlavorMapping, FlavorTarget, HeaderField, HeaderMapping, Order, RawRow,
};
use crate::core::meals::{Meal, format_lb_oz, shrink_multiplier};
use crate::core::reference::{FlavorInfo, ProteinInfo};
use crate::errors::Result;
use sea_orm::{Database, DatabaseConnection};
use std::collections::HashMap;

/// Creates a fresh in-memory SQLite database with all tables created.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Seeds the test database with a small but realistic menu.
///
/// Mirrors [`test_header_mapping`], [`test_flavor_mapping`],
/// [`test_protein_info`], and [`test_flavor_info`] so database-backed tests
/// and pure tests agree on the reference data.
pub async fn seed_test_menu(db: &DatabaseConnection) -> Result<u64> {
    let protein = |name: &str, label: &str, shrink: f64| ProteinConfig {
        name: name.to_string(),
        label: label.to_string(),
        shrink,
        lbs_per: 2.0,
        display_color: None,
    };
    let flavor = |name: &str, label: &str, raw_label: &str, base: Option<&str>| FlavorConfig {
        name: name.to_string(),
        label: label.to_string(),
        raw_label: raw_label.to_string(),
        base_flavor: base.map(str::to_string),
    };
    let header = |name: &str, label: &str| OrderHeaderConfig {
        name: name.to_string(),
        label: label.to_string(),
        raw_label: label.to_string(),
    };

    let config = MenuConfig {
        proteins: vec![
            protein("chicken", "Chicken", 20.0),
            protein("beef", "Beef", 10.0),
            protein("beefbison", "Beef Bison", 10.0),
        ],
        flavors: vec![
            flavor("plain", "Plain", "COMPETITOR-PREP (100% PLAIN-PLAIN)", None),
            flavor("bbq", "BBQ", "BBQ", None),
            flavor("spicybbq", "Spicy BBQ", "SPICY BBQ", Some("bbq")),
            flavor("teriyaki", "Teriyaki", "TERIYAKI", None),
            flavor(
                "spicybeefbison",
                "Spicy Beef Bison",
                "SPICY BEEF BISON",
                Some("plain"),
            ),
        ],
        order_headers: vec![
            header("first_name", "First Name"),
            header("last_name", "Last Name"),
            header("item_name", "Item Name"),
            header("quantity", "Quantity"),
            header("flavor", "Flavor"),
            header("protein", "Protein"),
        ],
        backstock: Vec::new(),
    };

    seed_menu(db, &config).await
}

/// Header mapping matching the seeded test menu.
#[must_use]
pub fn test_header_mapping() -> HeaderMapping {
    [
        ("first_name", "First Name"),
        ("last_name", "Last Name"),
        ("item_name", "Item Name"),
        ("quantity", "Quantity"),
        ("flavor", "Flavor"),
        ("protein", "Protein"),
    ]
    .into_iter()
    .map(|(logical, label)| {
        (
            logical.to_string(),
            HeaderField {
                label: label.to_string(),
                raw_label: label.to_string(),
            },
        )
    })
    .collect()
}

/// Flavor mapping matching the seeded test menu.
#[must_use]
pub fn test_flavor_mapping() -> FlavorMapping {
    [
        ("COMPETITOR-PREP (100% PLAIN-PLAIN)", "plain", "Plain"),
        ("BBQ", "bbq", "BBQ"),
        ("SPICY BBQ", "spicybbq", "Spicy BBQ"),
        ("TERIYAKI", "teriyaki", "Teriyaki"),
        ("SPICY BEEF BISON", "spicybeefbison", "Spicy Beef Bison"),
    ]
    .into_iter()
    .map(|(raw, flavor, label)| {
        (
            raw.to_string(),
            FlavorTarget {
                flavor: flavor.to_string(),
                flavor_label: label.to_string(),
            },
        )
    })
    .collect()
}

/// Protein snapshot matching the seeded test menu.
#[must_use]
pub fn test_protein_info() -> HashMap<String, ProteinInfo> {
    [
        ("chicken", "Chicken", 20.0),
        ("beef", "Beef", 10.0),
        ("beefbison", "Beef Bison", 10.0),
    ]
    .into_iter()
    .map(|(name, label, shrink)| {
        (
            name.to_string(),
            ProteinInfo {
                label: label.to_string(),
                shrink,
                lbs_per: 2.0,
                display_color: None,
            },
        )
    })
    .collect()
}

/// Flavor snapshot matching the seeded test menu.
#[must_use]
pub fn test_flavor_info() -> HashMap<String, FlavorInfo> {
    [
        ("plain", "Plain", None),
        ("bbq", "BBQ", None),
        ("spicybbq", "Spicy BBQ", Some("bbq")),
        ("teriyaki", "Teriyaki", None),
        ("spicybeefbison", "Spicy Beef Bison", Some("plain")),
    ]
    .into_iter()
    .map(|(name, label, base): (&str, &str, Option<&str>)| {
        (
            name.to_string(),
            FlavorInfo {
                label: label.to_string(),
                base_flavor: base.map(str::to_string),
            },
        )
    })
    .collect()
}

/// Builds one raw upload row keyed by the test menu's CSV column labels.
#[must_use]
pub fn order_row(
    first: &str,
    last: &str,
    item_name: &str,
    quantity: &str,
    flavor: &str,
    protein: &str,
) -> RawRow {
    [
        ("First Name", first),
        ("Last Name", last),
        ("Item Name", item_name),
        ("Quantity", quantity),
        ("Flavor", flavor),
        ("Protein", protein),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Builds a cleaned order with the given weight already totaled over quantity.
#[must_use]
pub fn make_order(
    protein: &str,
    protein_label: &str,
    flavor: &str,
    flavor_label: &str,
    weight: f64,
    quantity: u32,
) -> Order {
    Order {
        full_name: "Test Customer".to_string(),
        item_name: format!("{protein_label} 8oz"),
        container: ContainerSize::Oz8,
        weight,
        flavor: flavor.to_string(),
        flavor_label: flavor_label.to_string(),
        protein: protein.to_string(),
        protein_label: protein_label.to_string(),
        quantity,
    }
}

/// Builds an inventory lot snapshot.
#[must_use]
pub fn make_lot(id: i64, name: &str, sub_name: Option<&str>, weight: f64) -> BackstockLot {
    BackstockLot {
        id,
        name: name.to_string(),
        sub_name: sub_name.map(str::to_string),
        weight,
    }
}

/// Builds an un-netted meal as the aggregation stage would emit it.
#[must_use]
pub fn make_meal(protein: &str, flavor: &str, ordered_weight: f64, shrink: f64) -> Meal {
    let final_weight = ordered_weight * shrink_multiplier(shrink);
    Meal {
        protein: protein.to_string(),
        protein_label: protein.to_string(),
        flavor: flavor.to_string(),
        flavor_label: flavor.to_string(),
        ordered_weight,
        weight_after_backstock: ordered_weight,
        final_weight,
        weight_lb_oz: format_lb_oz(final_weight),
        backstock_weight: 0.0,
        display_color: None,
    }
}
