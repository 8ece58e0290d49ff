//! Post-hoc plan summary from a finished production plan.

use std::fmt;

use super::types::{DispatchPlan, DispatchRequest, UnitCategory};

/// Aggregate figures derived from a finished plan.
///
/// Computed post-hoc from the plan and its request so the report can never
/// disagree with the per-unit outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    /// Requested load (MW).
    pub load_mw: f64,
    /// Output of connected intermittent units (MW).
    pub intermittent_mw: f64,
    /// Output of dispatchable units (MW).
    pub dispatchable_mw: f64,
    /// Intermittent output left unused to avoid overshooting the load (MW).
    pub curtailed_mw: f64,
    /// Generation cost of the plan (EUR/h).
    pub hourly_cost: f64,
    /// Number of units with non-zero output.
    pub running_units: usize,
    /// Dispatchable unit running strictly between its bounds, if any.
    pub partially_loaded: Option<String>,
}

impl PlanSummary {
    pub fn from_plan(request: &DispatchRequest, plan: &DispatchPlan) -> Self {
        let mut intermittent_mw = 0.0;
        let mut dispatchable_mw = 0.0;
        let mut hourly_cost = 0.0;
        let mut running_units = 0;

        for unit in plan {
            match unit.category {
                UnitCategory::Intermittent => intermittent_mw += unit.output_mw,
                UnitCategory::Dispatchable(_) => dispatchable_mw += unit.output_mw,
            }
            hourly_cost += unit.output_mw * unit.marginal_cost;
            if unit.output_mw > 0.0 {
                running_units += 1;
            }
        }

        let available_mw: f64 = request
            .intermittent
            .iter()
            .map(|u| u.candidate_output_mw(request.fuel_prices.wind_percent))
            .sum();

        let partially_loaded = request
            .dispatchable
            .iter()
            .find(|u| {
                plan.output_of(&u.name)
                    .is_some_and(|p| p > u.min_output_mw && p < u.max_output_mw)
            })
            .map(|u| u.name.clone());

        Self {
            load_mw: request.load_mw,
            intermittent_mw,
            dispatchable_mw,
            curtailed_mw: (available_mw - intermittent_mw).max(0.0),
            hourly_cost,
            running_units,
            partially_loaded,
        }
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Plan Summary ---")?;
        writeln!(f, "Load:                  {:.1} MW", self.load_mw)?;
        writeln!(f, "Intermittent output:   {:.1} MW", self.intermittent_mw)?;
        writeln!(f, "Dispatchable output:   {:.1} MW", self.dispatchable_mw)?;
        writeln!(f, "Curtailed wind:        {:.1} MW", self.curtailed_mw)?;
        writeln!(f, "Generation cost:       {:.2} EUR/h", self.hourly_cost)?;
        writeln!(f, "Running units:         {}", self.running_units)?;
        write!(
            f,
            "Partially loaded:      {}",
            self.partially_loaded.as_deref().unwrap_or("-")
        )
    }
}
