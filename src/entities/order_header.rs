//! Order header entity - Maps logical order fields to raw CSV column labels.
//!
//! Uploaded order sheets come from an external ordering platform whose column
//! labels change independently of this system. Each row here binds one logical
//! field the pipeline needs (e.g., `"first_name"`) to the column label found
//! in the raw file, so a vendor-side rename is a data fix rather than a code fix.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order header mapping database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_headers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Logical field name the pipeline uses (e.g., `"item_name"`)
    #[sea_orm(unique)]
    pub name: String,
    /// Human-readable label for settings screens
    pub label: String,
    /// Exact column label expected in the uploaded CSV
    pub raw_label: String,
}

/// Order headers have no modeled relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
