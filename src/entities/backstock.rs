//! Backstock entity - One physical inventory lot of previously prepared food.
//!
//! Lots are keyed by protein (`name`) and optionally by flavor (`sub_name`).
//! Consuming a lot during an order run is a soft operation: the lot is marked
//! unavailable and stamped with `deleted_on` so the data survives for history
//! views and can be undone by a backstock reset.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Backstock lot database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "backstock")]
pub struct Model {
    /// Unique identifier for the lot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Protein key this lot holds (e.g., `"chicken"`), or a veggie/carb name
    pub name: String,
    /// Flavor key the lot is labeled with, None for unflavored stock
    pub sub_name: Option<String>,
    /// Lot weight in ounces
    pub weight: f64,
    /// Whether this lot is a protein (true) or a veggie/carb side (false)
    pub is_protein: bool,
    /// Whether the lot is still available to be pulled
    pub available: bool,
    /// When the lot was entered into inventory
    pub created_at: DateTimeUtc,
    /// Soft-delete timestamp - set when the lot is consumed, None while live
    pub deleted_on: Option<DateTimeUtc>,
}

/// Backstock has no modeled relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
