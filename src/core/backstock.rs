//! Backstock allocation - nets aggregated meals against existing inventory.
//!
//! Allocation runs in two sequential passes over the sorted meal list. Pass 1
//! draws lots whose protein and flavor match the meal exactly; pass 2 gives
//! flavors that have a configured base flavor a second chance against the
//! fungible base stock. A single ordered used-id set is shared across all
//! meals and both passes, so a physical lot can never be pulled twice in one
//! run, and every tie-break in lot selection is explicit - running the
//! allocator twice on the same snapshot yields byte-identical output.
//!
//! The database helpers alongside the allocator handle the inventory side of
//! the story: loading the available-lot snapshot, entering new lots, marking
//! consumed lots unavailable, and undoing a run with a full reset.

use crate::core::meals::{Meal, format_lb_oz, shrink_multiplier};
use crate::core::reference::{FlavorInfo, ProteinInfo};
use crate::entities::{Backstock, backstock};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Immutable snapshot of one available inventory lot for an allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackstockLot {
    /// Lot id, unique across the inventory table
    pub id: i64,
    /// Protein key the lot holds
    pub name: String,
    /// Flavor key the lot is labeled with, None for unflavored stock
    pub sub_name: Option<String>,
    /// Lot weight in ounces
    pub weight: f64,
}

impl From<backstock::Model> for BackstockLot {
    fn from(model: backstock::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sub_name: model.sub_name,
            weight: model.weight,
        }
    }
}

/// Result of one allocation run: the netted meals and every consumed lot id.
///
/// The id set is handed back to the caller so persisting the report and
/// marking the lots unavailable can happen in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// Meals with backstock applied, still in sorted order
    pub meals: Vec<Meal>,
    /// Ids of every lot consumed across both passes, in ascending order
    pub used_backstock_ids: BTreeSet<i64>,
}

/// Chooses which unconsumed lots to pull for one meal.
///
/// Candidates are the lots matching the protein and flavor exactly that are
/// not already in the used set, ordered by weight descending with id ascending
/// breaking ties. Selection is greedy: each lot that fits inside the remaining
/// target is taken, and if the target is still unmet afterwards one cover lot
/// - the smallest candidate left, which necessarily overshoots the least - is
/// added to finish it. No lot is ever taken once the target is met.
///
/// Returns `None` when nothing matches, leaving the meal untouched.
#[must_use]
pub fn choose_backstock_lots<'a>(
    lots: &'a [BackstockLot],
    protein: &str,
    flavor: &str,
    target_weight: f64,
    used: &BTreeSet<i64>,
) -> Option<Vec<&'a BackstockLot>> {
    if target_weight <= 0.0 {
        return None;
    }

    let mut candidates: Vec<&BackstockLot> = lots
        .iter()
        .filter(|lot| {
            !used.contains(&lot.id)
                && lot.name == protein
                && lot.sub_name.as_deref() == Some(flavor)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    // Largest lot first; id breaks ties so equal weights always drain in the same order.
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight).then(a.id.cmp(&b.id)));

    let mut selected: Vec<&BackstockLot> = Vec::new();
    let mut remaining = target_weight;
    for lot in &candidates {
        if remaining <= 0.0 {
            break;
        }
        if lot.weight <= remaining {
            selected.push(lot);
            remaining -= lot.weight;
        }
    }

    if remaining > 0.0 {
        // Every skipped candidate is bigger than what is left, so the smallest
        // of them covers the residual with the least overshoot.
        let cover = candidates
            .iter()
            .copied()
            .filter(|lot| !selected.iter().any(|s| s.id == lot.id))
            .min_by(|a, b| a.weight.total_cmp(&b.weight).then(a.id.cmp(&b.id)));
        if let Some(cover) = cover {
            selected.push(cover);
        }
    }

    if selected.is_empty() { None } else { Some(selected) }
}

/// Applies a chosen lot set to a meal and records the consumed ids.
fn apply_lots(meal: &mut Meal, chosen: &[&BackstockLot], multiplier: f64, used: &mut BTreeSet<i64>) {
    for lot in chosen {
        used.insert(lot.id);
        meal.weight_after_backstock -= lot.weight;
        meal.backstock_weight += lot.weight;
    }
    meal.final_weight = meal.weight_after_backstock * multiplier;
    meal.weight_lb_oz = format_lb_oz(meal.final_weight);
}

/// Nets every meal's ordered weight against the available backstock snapshot.
///
/// Pass 1 matches lots on the meal's exact protein and flavor, targeting the
/// full ordered weight. Pass 2 runs only for meals still carrying weight whose
/// flavor has a configured base flavor, and matches lots labeled with that
/// base flavor against the remaining weight. Consumed ids accumulate in one
/// shared ordered set across everything.
///
/// A cover-lot overshoot can leave `weight_after_backstock` slightly negative;
/// the arithmetic keeps the true value (the report shows exactly how much
/// backstock went out) while the display string clamps at `"0lbs 0oz"`.
pub fn allocate_backstock(
    mut meals: Vec<Meal>,
    lots: &[BackstockLot],
    protein_info: &HashMap<String, ProteinInfo>,
    flavor_info: &HashMap<String, FlavorInfo>,
) -> Result<AllocationOutcome> {
    let mut used: BTreeSet<i64> = BTreeSet::new();

    // Pass 1: exact flavor match against the full ordered weight
    for meal in &mut meals {
        let info = protein_info
            .get(&meal.protein)
            .ok_or_else(|| Error::UnknownProtein {
                key: meal.protein.clone(),
            })?;

        if let Some(chosen) =
            choose_backstock_lots(lots, &meal.protein, &meal.flavor, meal.ordered_weight, &used)
        {
            debug!(
                "Meal {}/{}: pass 1 pulled {} lot(s)",
                meal.protein,
                meal.flavor,
                chosen.len()
            );
            apply_lots(meal, &chosen, shrink_multiplier(info.shrink), &mut used);
        }
    }

    // Pass 2: base-flavor fallback for whatever pass 1 left uncovered
    for meal in &mut meals {
        let flavor = flavor_info
            .get(&meal.flavor)
            .ok_or_else(|| Error::UnknownFlavorKey {
                key: meal.flavor.clone(),
            })?;
        let Some(base_flavor) = flavor.base_flavor.as_deref() else {
            continue;
        };
        if meal.final_weight <= 0.0 {
            continue;
        }

        let info = protein_info
            .get(&meal.protein)
            .ok_or_else(|| Error::UnknownProtein {
                key: meal.protein.clone(),
            })?;

        if let Some(chosen) = choose_backstock_lots(
            lots,
            &meal.protein,
            base_flavor,
            meal.weight_after_backstock,
            &used,
        ) {
            debug!(
                "Meal {}/{}: pass 2 pulled {} base-flavor lot(s)",
                meal.protein,
                meal.flavor,
                chosen.len()
            );
            apply_lots(meal, &chosen, shrink_multiplier(info.shrink), &mut used);
        }
    }

    Ok(AllocationOutcome {
        meals,
        used_backstock_ids: used,
    })
}

/// Loads the available protein backstock snapshot for an allocation run.
///
/// Only lots that are available, not soft-deleted, and flagged as protein stock
/// participate in allocation. Ordered by id so the snapshot itself is stable.
pub async fn load_available_backstock(db: &DatabaseConnection) -> Result<Vec<BackstockLot>> {
    let rows = Backstock::find()
        .filter(backstock::Column::Available.eq(true))
        .filter(backstock::Column::IsProtein.eq(true))
        .filter(backstock::Column::DeletedOn.is_null())
        .order_by_asc(backstock::Column::Id)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Enters a new lot into inventory, available immediately.
pub async fn add_backstock_lot(
    db: &DatabaseConnection,
    name: &str,
    sub_name: Option<&str>,
    weight: f64,
    is_protein: bool,
) -> Result<backstock::Model> {
    let lot = backstock::ActiveModel {
        name: Set(name.to_string()),
        sub_name: Set(sub_name.map(str::to_string)),
        weight: Set(weight),
        is_protein: Set(is_protein),
        available: Set(true),
        created_at: Set(Utc::now()),
        deleted_on: Set(None),
        ..Default::default()
    };

    lot.insert(db).await.map_err(Into::into)
}

/// Marks consumed lots unavailable and stamps their soft-delete timestamp.
///
/// Generic over the connection so the caller can run it inside the same
/// transaction that persists the order report. Returns the number of lots
/// updated.
pub async fn mark_backstock_used<C>(db: &C, ids: &BTreeSet<i64>) -> Result<u64>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let result = Backstock::update_many()
        .col_expr(backstock::Column::Available, Expr::value(false))
        .col_expr(backstock::Column::DeletedOn, Expr::value(Some(Utc::now())))
        .filter(backstock::Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Restores every lot to available and clears soft-delete timestamps.
///
/// The undo button for an order run that should not have been confirmed.
pub async fn reset_backstock(db: &DatabaseConnection) -> Result<u64> {
    let result = Backstock::update_many()
        .col_expr(backstock::Column::Available, Expr::value(true))
        .col_expr(
            backstock::Column::DeletedOn,
            Expr::value(Option::<chrono::DateTime<Utc>>::None),
        )
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{
        make_lot, make_meal, seed_test_menu, setup_test_db, test_flavor_info, test_protein_info,
    };

    #[test]
    fn test_choose_takes_largest_lots_first() {
        let lots = vec![
            make_lot(1, "chicken", Some("bbq"), 10.0),
            make_lot(2, "chicken", Some("bbq"), 30.0),
            make_lot(3, "chicken", Some("bbq"), 20.0),
        ];
        let used = BTreeSet::new();

        let chosen = choose_backstock_lots(&lots, "chicken", "bbq", 60.0, &used).unwrap();
        let ids: Vec<i64> = chosen.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_choose_stops_once_target_met() {
        let lots = vec![
            make_lot(1, "chicken", Some("bbq"), 30.0),
            make_lot(2, "chicken", Some("bbq"), 20.0),
            make_lot(3, "chicken", Some("bbq"), 10.0),
        ];
        let used = BTreeSet::new();

        // 30 + 20 covers the 50oz target; the 10oz lot must stay untouched
        let chosen = choose_backstock_lots(&lots, "chicken", "bbq", 50.0, &used).unwrap();
        let ids: Vec<i64> = chosen.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_choose_cover_lot_minimizes_overshoot() {
        let lots = vec![
            make_lot(1, "chicken", Some("bbq"), 100.0),
            make_lot(2, "chicken", Some("bbq"), 40.0),
        ];
        let used = BTreeSet::new();

        // Nothing fits inside 25oz, so the smallest candidate covers it
        let chosen = choose_backstock_lots(&lots, "chicken", "bbq", 25.0, &used).unwrap();
        let ids: Vec<i64> = chosen.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_choose_equal_weights_break_ties_by_id() {
        let lots = vec![
            make_lot(7, "chicken", Some("bbq"), 20.0),
            make_lot(3, "chicken", Some("bbq"), 20.0),
        ];
        let used = BTreeSet::new();

        let chosen = choose_backstock_lots(&lots, "chicken", "bbq", 20.0, &used).unwrap();
        let ids: Vec<i64> = chosen.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_choose_skips_consumed_lots() {
        let lots = vec![
            make_lot(1, "chicken", Some("bbq"), 30.0),
            make_lot(2, "chicken", Some("bbq"), 20.0),
        ];
        let used: BTreeSet<i64> = [1].into_iter().collect();

        let chosen = choose_backstock_lots(&lots, "chicken", "bbq", 30.0, &used).unwrap();
        let ids: Vec<i64> = chosen.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_choose_none_when_nothing_matches() {
        let lots = vec![
            make_lot(1, "beef", Some("bbq"), 30.0),
            make_lot(2, "chicken", Some("teriyaki"), 20.0),
            make_lot(3, "chicken", None, 20.0),
        ];
        let used = BTreeSet::new();

        assert!(choose_backstock_lots(&lots, "chicken", "bbq", 30.0, &used).is_none());
        assert!(choose_backstock_lots(&lots, "beef", "bbq", 0.0, &used).is_none());
    }

    #[test]
    fn test_allocate_exact_flavor_pass() {
        // One 20oz exact-flavor lot against an 80oz meal
        let meals = vec![make_meal("chicken", "bbq", 80.0, 20.0)];
        let lots = vec![make_lot(1, "chicken", Some("bbq"), 20.0)];

        let outcome =
            allocate_backstock(meals, &lots, &test_protein_info(), &test_flavor_info()).unwrap();

        let meal = &outcome.meals[0];
        assert_eq!(meal.weight_after_backstock, 60.0);
        assert_eq!(meal.backstock_weight, 20.0);
        assert_eq!(meal.final_weight, 72.0); // 60oz at 20% shrink
        assert!(outcome.used_backstock_ids.contains(&1));
    }

    #[test]
    fn test_allocate_never_reuses_a_lot() {
        // Both meals want the same chicken/bbq lot; only the first gets it
        let meals = vec![
            make_meal("chicken", "bbq", 30.0, 20.0),
            make_meal("chicken", "spicybbq", 30.0, 20.0),
        ];
        let lots = vec![
            make_lot(1, "chicken", Some("bbq"), 30.0),
            make_lot(2, "chicken", Some("bbq"), 10.0),
        ];

        let outcome =
            allocate_backstock(meals, &lots, &test_protein_info(), &test_flavor_info()).unwrap();

        // bbq meal consumed lot 1 exactly in pass 1; spicybbq fell back to
        // base-flavor bbq stock in pass 2 and could only take lot 2
        assert_eq!(outcome.meals[0].backstock_weight, 30.0);
        assert_eq!(outcome.meals[1].backstock_weight, 10.0);
        let ids: Vec<i64> = outcome.used_backstock_ids.iter().copied().collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_allocate_base_flavor_fallback() {
        let meals = vec![make_meal("chicken", "spicybbq", 40.0, 20.0)];
        let lots = vec![
            make_lot(1, "chicken", Some("spicybbq"), 15.0),
            make_lot(2, "chicken", Some("bbq"), 25.0),
        ];

        let outcome =
            allocate_backstock(meals, &lots, &test_protein_info(), &test_flavor_info()).unwrap();

        let meal = &outcome.meals[0];
        // Pass 1 took the exact spicybbq lot, pass 2 the base bbq lot
        assert_eq!(meal.backstock_weight, 40.0);
        assert_eq!(meal.weight_after_backstock, 0.0);
        assert_eq!(meal.final_weight, 0.0);
        assert_eq!(meal.weight_lb_oz, "0lbs 0oz");
        assert_eq!(outcome.used_backstock_ids.len(), 2);
    }

    #[test]
    fn test_allocate_skips_pass_two_without_base_flavor() {
        // plain has no base flavor; the bbq-labeled lot must not be touched
        let meals = vec![make_meal("chicken", "plain", 40.0, 20.0)];
        let lots = vec![make_lot(1, "chicken", Some("bbq"), 25.0)];

        let outcome =
            allocate_backstock(meals, &lots, &test_protein_info(), &test_flavor_info()).unwrap();

        assert_eq!(outcome.meals[0].backstock_weight, 0.0);
        assert!(outcome.used_backstock_ids.is_empty());
    }

    #[test]
    fn test_allocate_skips_pass_two_when_fully_covered() {
        let meals = vec![make_meal("chicken", "spicybbq", 30.0, 20.0)];
        let lots = vec![
            make_lot(1, "chicken", Some("spicybbq"), 30.0),
            make_lot(2, "chicken", Some("bbq"), 25.0),
        ];

        let outcome =
            allocate_backstock(meals, &lots, &test_protein_info(), &test_flavor_info()).unwrap();

        // Fully covered in pass 1: the base lot stays in inventory
        assert_eq!(outcome.meals[0].final_weight, 0.0);
        let ids: Vec<i64> = outcome.used_backstock_ids.iter().copied().collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_allocate_is_idempotent_over_a_snapshot() {
        let meals = vec![
            make_meal("beef", "bbq", 50.0, 10.0),
            make_meal("chicken", "spicybbq", 40.0, 20.0),
        ];
        let lots = vec![
            make_lot(1, "beef", Some("bbq"), 20.0),
            make_lot(2, "beef", Some("bbq"), 20.0),
            make_lot(3, "chicken", Some("bbq"), 25.0),
            make_lot(4, "chicken", Some("spicybbq"), 15.0),
        ];

        let first = allocate_backstock(
            meals.clone(),
            &lots,
            &test_protein_info(),
            &test_flavor_info(),
        )
        .unwrap();
        let second =
            allocate_backstock(meals, &lots, &test_protein_info(), &test_flavor_info()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_allocate_unknown_flavor_key_is_fatal() {
        let meals = vec![make_meal("chicken", "mystery", 40.0, 20.0)];
        let result = allocate_backstock(meals, &[], &test_protein_info(), &test_flavor_info());
        assert!(matches!(
            result.unwrap_err(),
            Error::UnknownFlavorKey { key } if key == "mystery"
        ));
    }

    #[tokio::test]
    async fn test_load_available_backstock_filters() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_menu(&db).await?;

        let protein = add_backstock_lot(&db, "chicken", Some("bbq"), 20.0, true).await?;
        let veggie = add_backstock_lot(&db, "broccoli", None, 16.0, false).await?;
        let consumed = add_backstock_lot(&db, "chicken", Some("bbq"), 10.0, true).await?;
        mark_backstock_used(&db, &[consumed.id].into_iter().collect()).await?;

        let snapshot = load_available_backstock(&db).await?;
        let ids: Vec<i64> = snapshot.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![protein.id]);
        assert!(!ids.contains(&veggie.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_and_reset_backstock() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_menu(&db).await?;

        let a = add_backstock_lot(&db, "chicken", Some("bbq"), 20.0, true).await?;
        let b = add_backstock_lot(&db, "beef", Some("bbq"), 30.0, true).await?;

        let marked =
            mark_backstock_used(&db, &[a.id, b.id].into_iter().collect()).await?;
        assert_eq!(marked, 2);
        assert!(load_available_backstock(&db).await?.is_empty());

        let restored = reset_backstock(&db).await?;
        assert_eq!(restored, 2);
        assert_eq!(load_available_backstock(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_backstock_used_empty_set_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        let marked = mark_backstock_used(&db, &BTreeSet::new()).await?;
        assert_eq!(marked, 0);
        Ok(())
    }
}
