//! Order report assembly and persistence.
//!
//! The report is the pipeline's end product: the cleaned orders, every
//! row-level cleaning problem, the netted meal list, the consumed backstock
//! ids, and summary stats, bundled into one serializable value. Reports are
//! stored as JSON bodies in the reports table; saving a report and marking its
//! consumed backstock happen in one transaction so inventory can never drift
//! out of step with what the report claims was pulled.

use crate::core::backstock::{BackstockLot, allocate_backstock, mark_backstock_used};
use crate::core::clean::{
    CleaningError, FlavorMapping, HeaderMapping, Order, RawRow, clean_order_rows,
};
use crate::core::meals::{Meal, aggregate_meals};
use crate::core::reference::{FlavorInfo, ProteinInfo};
use crate::entities::{Report, report};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

/// Summary numbers shown at the top of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    /// Cleaned order line items in the batch
    pub num_orders: usize,
    /// Distinct (protein, flavor) meals to cook
    pub num_meals: usize,
    /// Total shrink-adjusted cooking weight across all meals, in ounces
    pub total_protein_weight: f64,
    /// Unit counts per container tier label, sorted by label
    pub containers: BTreeMap<String, u32>,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderReportInfo {
    /// Cleaned orders, in upload order
    pub orders: Vec<Order>,
    /// Row-level problems found during cleaning
    pub order_errors: Vec<CleaningError>,
    /// Ids of backstock lots the allocation consumed
    pub used_backstock_ids: BTreeSet<i64>,
    /// Netted meal list, sorted by protein then flavor
    pub meals: Vec<Meal>,
    /// Summary stats over the batch
    pub stats: OrderStats,
}

/// An empty report shell, used to render the report screen before any upload.
#[must_use]
pub fn blank_report_info() -> OrderReportInfo {
    OrderReportInfo::default()
}

/// Computes batch summary stats from the cleaned orders and netted meals.
#[must_use]
pub fn compute_stats(orders: &[Order], meals: &[Meal]) -> OrderStats {
    let mut containers: BTreeMap<String, u32> = BTreeMap::new();
    for order in orders {
        *containers.entry(order.container.label().to_string()).or_insert(0) += order.quantity;
    }

    OrderStats {
        num_orders: orders.len(),
        num_meals: meals.len(),
        total_protein_weight: meals.iter().map(|m| m.final_weight).sum(),
        containers,
    }
}

/// Runs the full pipeline over one uploaded batch and assembles the report.
///
/// Cleaning problems do not abort the build, but they do block everything
/// downstream: a report with a non-empty error list carries the surviving
/// orders and the errors only, with no meals and no backstock consumption, so
/// nothing gets cooked or pulled off a sheet staff have not fixed yet.
pub fn build_order_report(
    rows: &[RawRow],
    headers: &HeaderMapping,
    flavors: &FlavorMapping,
    protein_info: &HashMap<String, ProteinInfo>,
    flavor_info: &HashMap<String, FlavorInfo>,
    lots: &[BackstockLot],
) -> Result<OrderReportInfo> {
    let cleaned = clean_order_rows(rows, headers, flavors)?;

    if !cleaned.cleaning_errors.is_empty() {
        info!(
            "Order batch has {} cleaning error(s); skipping aggregation",
            cleaned.cleaning_errors.len()
        );
        let stats = compute_stats(&cleaned.orders, &[]);
        return Ok(OrderReportInfo {
            orders: cleaned.orders,
            order_errors: cleaned.cleaning_errors,
            used_backstock_ids: BTreeSet::new(),
            meals: Vec::new(),
            stats,
        });
    }

    let meals = aggregate_meals(&cleaned.orders, protein_info)?;
    let outcome = allocate_backstock(meals, lots, protein_info, flavor_info)?;
    let stats = compute_stats(&cleaned.orders, &outcome.meals);

    info!(
        "Built order report: {} orders, {} meals, {} backstock lot(s) consumed",
        stats.num_orders,
        stats.num_meals,
        outcome.used_backstock_ids.len()
    );

    Ok(OrderReportInfo {
        orders: cleaned.orders,
        order_errors: Vec::new(),
        used_backstock_ids: outcome.used_backstock_ids,
        meals: outcome.meals,
        stats,
    })
}

/// Persists a report and marks its consumed backstock, atomically.
///
/// The insert and the inventory update share one transaction: either the
/// report exists and its lots are gone from inventory, or neither happened.
pub async fn save_report(
    db: &DatabaseConnection,
    title: &str,
    info: &OrderReportInfo,
) -> Result<report::Model> {
    let body = serde_json::to_string(info)?;

    let txn = db.begin().await?;

    let saved = report::ActiveModel {
        title: Set(title.to_string()),
        body: Set(body),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let marked = mark_backstock_used(&txn, &info.used_backstock_ids).await?;
    txn.commit().await?;

    info!(
        "Saved report {} ({:?}); {} backstock lot(s) marked used",
        saved.id, saved.title, marked
    );
    Ok(saved)
}

/// Loads a saved report and deserializes its body.
pub async fn load_report(
    db: &DatabaseConnection,
    id: i64,
) -> Result<(report::Model, OrderReportInfo)> {
    let row = Report::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::ReportNotFound { id })?;
    let info: OrderReportInfo = serde_json::from_str(&row.body)?;
    Ok((row, info))
}

/// Lists every saved report, newest first.
pub async fn list_reports(db: &DatabaseConnection) -> Result<Vec<report::Model>> {
    Report::find()
        .order_by_desc(report::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
