//! Merit-order allocation of the residual load over dispatchable units.

use tracing::{debug, instrument};

use super::error::DispatchError;
use super::types::{
    DispatchableUnit, FuelPrices, POWER_TOLERANCE_MW, UnitCategory, UnitDispatch,
};

/// Allocates `residual_load_mw` over `units` in ascending marginal-cost order.
///
/// Single forward pass over the merit order:
/// - nothing left to cover: the unit stays off;
/// - minimum above what is left: the unit stays off and is not revisited;
/// - maximum within what is left: the unit runs at maximum;
/// - otherwise the unit covers exactly what is left.
///
/// Equal costs keep input order. The returned records follow the merit order
/// and contain every unit, running or not.
///
/// # Errors
///
/// Returns [`DispatchError::InsufficientCapacity`] if load is still uncovered
/// after the last unit. No partial plan is returned.
#[instrument(skip_all, fields(units = units.len(), residual_load_mw = residual_load_mw))]
pub fn allocate(
    units: &[DispatchableUnit],
    prices: &FuelPrices,
    residual_load_mw: f64,
) -> Result<Vec<UnitDispatch>, DispatchError> {
    let mut ranked: Vec<(&DispatchableUnit, f64)> = units
        .iter()
        .map(|u| (u, u.marginal_cost(prices)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| a.total_cmp(b));

    let mut remaining_mw = residual_load_mw;
    let mut dispatch = Vec::with_capacity(ranked.len());

    for (unit, marginal_cost) in ranked {
        let output_mw = if remaining_mw <= POWER_TOLERANCE_MW {
            0.0
        } else if unit.min_output_mw > remaining_mw {
            debug!(
                unit = %unit.name,
                min_output_mw = unit.min_output_mw,
                remaining_mw,
                "skipping unit, minimum output above remaining load"
            );
            0.0
        } else if unit.max_output_mw <= remaining_mw {
            unit.max_output_mw
        } else {
            remaining_mw
        };
        remaining_mw -= output_mw;

        dispatch.push(UnitDispatch {
            name: unit.name.clone(),
            category: UnitCategory::Dispatchable(unit.fuel),
            output_mw,
            marginal_cost,
        });
    }

    if remaining_mw > POWER_TOLERANCE_MW {
        debug!(shortfall_mw = remaining_mw, "merit order exhausted");
        return Err(DispatchError::InsufficientCapacity {
            shortfall_mw: remaining_mw,
        });
    }

    Ok(dispatch)
}
