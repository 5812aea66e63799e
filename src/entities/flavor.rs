//! Flavor entity - Reference data for every flavor offered on the menu.
//!
//! The `raw_label` column is the exact flavor text that appears on uploaded
//! order sheets; the cleaning step resolves raw text through it to obtain the
//! canonical flavor key. `base_flavor` names the generic flavor category this
//! flavor can fall back to when netting against fungible backstock, or None
//! when no fallback exists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Flavor reference database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flavors")]
pub struct Model {
    /// Unique identifier for the flavor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Canonical flavor key (e.g., `"bbq"`, `"plain"`)
    #[sea_orm(unique)]
    pub name: String,
    /// Human-readable display label (e.g., `"BBQ"`)
    pub label: String,
    /// Exact flavor text as it appears on order sheets (e.g., `"SPICY BEEF BISON"`)
    pub raw_label: String,
    /// Base flavor key this flavor is fungible with, None when there is no fallback
    pub base_flavor: Option<String>,
}

/// Flavors have no modeled relationships; backstock references them by key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
