//! Protein entity - Reference data for every protein the kitchen cooks.
//!
//! Each protein carries the cooking metadata the pipeline needs: the expected
//! shrink percentage applied when projecting raw ordered weight into cooked
//! weight, the pounds-per-unit figure used by shopping views, and an optional
//! display color for the report UI.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Protein reference database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proteins")]
pub struct Model {
    /// Unique identifier for the protein
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Canonical protein key (e.g., `"chicken"`, `"beefbison"`)
    #[sea_orm(unique)]
    pub name: String,
    /// Human-readable label as it appears on order sheets (e.g., `"Beef Bison"`)
    pub label: String,
    /// Expected cooking weight loss percentage (e.g., 10.0 for 10%)
    pub shrink: f64,
    /// Raw pounds purchased per unit, used by shopping projections
    pub lbs_per: f64,
    /// Optional display color for report rows, None for the default
    pub display_color: Option<String>,
}

/// Proteins have no modeled relationships; flavors reference them by key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
