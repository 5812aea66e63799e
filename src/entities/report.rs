//! Report entity - One persisted order report.
//!
//! The computed report is stored as a JSON body so the UI can reload past runs
//! without recomputing them. Saving a report and marking its consumed backstock
//! lots unavailable happen in the same database transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persisted order report database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    /// Unique identifier for the report
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable title (e.g., the order week)
    pub title: String,
    /// Full `OrderReportInfo` serialized as JSON
    pub body: String,
    /// When the report was computed and saved
    pub created_at: DateTimeUtc,
}

/// Reports have no modeled relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
