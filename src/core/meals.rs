//! Meal aggregation - sums cleaned orders into per-protein cooking weights.
//!
//! Orders collapse into one [`Meal`] per (protein, flavor) pair. Both levels
//! are accumulated in `BTreeMap`s so meals always come out in lexicographic
//! protein-then-flavor order: the report must be reproducible run to run, and
//! permuting the input orders must not change the output.

use crate::core::clean::Order;
use crate::core::reference::ProteinInfo;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One protein/flavor combination to cook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Canonical protein key
    pub protein: String,
    /// Protein display label
    pub protein_label: String,
    /// Canonical flavor key
    pub flavor: String,
    /// Flavor display label
    pub flavor_label: String,
    /// Total ordered weight in ounces, before backstock netting
    pub ordered_weight: f64,
    /// Ordered weight minus every backstock ounce applied so far
    pub weight_after_backstock: f64,
    /// Shrink-adjusted weight to actually cook, in ounces
    pub final_weight: f64,
    /// `final_weight` formatted for the pull list (e.g., `"5lbs 8oz"`)
    pub weight_lb_oz: String,
    /// Total backstock ounces applied across both allocation passes
    pub backstock_weight: f64,
    /// Display color from the protein reference, None for the default
    pub display_color: Option<String>,
}

/// Running weight total for one (protein, flavor) pair during aggregation.
#[derive(Debug, Clone, Default)]
struct FlavorTotal {
    protein_label: String,
    flavor_label: String,
    weight: f64,
}

/// Multiplier that projects raw ordered weight into post-shrink cooking weight.
#[must_use]
pub(crate) fn shrink_multiplier(shrink: f64) -> f64 {
    1.0 + shrink / 100.0
}

/// Formats an ounce weight as a pull-list `"Xlb(s) Yoz"` string.
///
/// Pounds are floored, the ounce remainder is ceiled, and a remainder that
/// rounds up to exactly 16oz carries into the next pound. Non-positive weights
/// (a meal fully covered by backstock, including a small overshoot) display as
/// `"0lbs 0oz"`.
#[must_use]
pub fn format_lb_oz(oz: f64) -> String {
    if oz <= 0.0 {
        return "0lbs 0oz".to_string();
    }

    // Cast safety: positive finite weights, far below i64 range.
    #[allow(clippy::cast_possible_truncation)]
    let lbs = (oz / 16.0).floor() as i64;
    #[allow(clippy::cast_possible_truncation)]
    let remaining_oz = (oz % 16.0).ceil() as i64;

    if remaining_oz == 16 {
        return if lbs == 0 {
            "1lb 0oz".to_string()
        } else {
            format!("{}lbs 0oz", lbs + 1)
        };
    }

    if lbs == 1 {
        format!("1lb {remaining_oz}oz")
    } else {
        format!("{lbs}lbs {remaining_oz}oz")
    }
}

/// Aggregates cleaned orders into the full sorted meal list.
///
/// Orders with an empty protein key (pure veggie/carb items) are skipped -
/// there is nothing to cook for them here. Each order's `weight` already
/// includes its quantity (the cleaning step multiplies it in), so totals are a
/// plain sum; multiplying by quantity again would double-count every
/// multi-unit line.
pub fn aggregate_meals(
    orders: &[Order],
    protein_info: &HashMap<String, ProteinInfo>,
) -> Result<Vec<Meal>> {
    let mut weights: BTreeMap<String, BTreeMap<String, FlavorTotal>> = BTreeMap::new();

    for order in orders {
        if order.protein.is_empty() {
            continue;
        }

        let total = weights
            .entry(order.protein.clone())
            .or_default()
            .entry(order.flavor.clone())
            .or_insert_with(|| FlavorTotal {
                protein_label: order.protein_label.clone(),
                flavor_label: order.flavor_label.clone(),
                weight: 0.0,
            });
        total.weight += order.weight;
    }

    let mut meals = Vec::new();
    for (protein, flavors) in &weights {
        let info = protein_info
            .get(protein)
            .ok_or_else(|| Error::UnknownProtein {
                key: protein.clone(),
            })?;
        let multiplier = shrink_multiplier(info.shrink);

        for (flavor, total) in flavors {
            let final_weight = total.weight * multiplier;
            meals.push(Meal {
                protein: protein.clone(),
                protein_label: total.protein_label.clone(),
                flavor: flavor.clone(),
                flavor_label: total.flavor_label.clone(),
                ordered_weight: total.weight,
                weight_after_backstock: total.weight,
                final_weight,
                weight_lb_oz: format_lb_oz(final_weight),
                backstock_weight: 0.0,
                display_color: info.display_color.clone(),
            });
        }
    }

    Ok(meals)
}
