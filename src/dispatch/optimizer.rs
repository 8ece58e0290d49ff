//! Orchestrates selection and allocation into a production plan.

use tracing::{debug, instrument};

use super::allocator::allocate;
use super::error::DispatchError;
use super::selector::{SearchSettings, select};
use super::types::{DispatchPlan, DispatchRequest, UnitCategory, UnitDispatch};

/// Stateless production-plan optimizer.
///
/// Holds only search settings, so one instance can serve any number of
/// concurrent requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Optimizer {
    settings: SearchSettings,
}

impl Optimizer {
    /// Creates an optimizer with the given curtailment search settings.
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Computes the production plan for `request`.
    ///
    /// The plan lists intermittent units in input order followed by
    /// dispatchable units in merit order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InsufficientCapacity`] if the dispatchable
    /// fleet cannot cover the load left by the intermittent units.
    ///
    /// # Panics
    ///
    /// Panics if the request violates a numeric precondition
    /// (see [`DispatchRequest::check_preconditions`]).
    #[instrument(skip_all, fields(load_mw = request.load_mw))]
    pub fn optimize(&self, request: &DispatchRequest) -> Result<DispatchPlan, DispatchError> {
        request.check_preconditions();
        let prices = &request.fuel_prices;

        let selection = select(
            &request.intermittent,
            prices.wind_percent,
            request.load_mw,
            &self.settings,
        );

        let mut units: Vec<UnitDispatch> = request
            .intermittent
            .iter()
            .enumerate()
            .map(|(i, unit)| UnitDispatch {
                name: unit.name.clone(),
                category: UnitCategory::Intermittent,
                output_mw: selection.output_mw(i),
                marginal_cost: 0.0,
            })
            .collect();

        let residual_load_mw = request.load_mw - selection.total_mw;
        debug!(
            intermittent_mw = selection.total_mw,
            residual_load_mw, "intermittent units selected"
        );

        units.extend(allocate(&request.dispatchable, prices, residual_load_mw)?);

        Ok(DispatchPlan { units })
    }
}

/// Computes a production plan with default search settings.
///
/// # Errors
///
/// See [`Optimizer::optimize`].
pub fn optimize(request: &DispatchRequest) -> Result<DispatchPlan, DispatchError> {
    Optimizer::default().optimize(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::types::{DispatchableUnit, FuelKind, FuelPrices, IntermittentUnit};

    fn request(load_mw: f64, wind_percent: f64) -> DispatchRequest {
        DispatchRequest {
            load_mw,
            fuel_prices: FuelPrices {
                gas_per_mwh: 13.4,
                kerosine_per_mwh: 50.8,
                co2_per_ton: 20.0,
                wind_percent,
            },
            intermittent: vec![
                IntermittentUnit::new("windpark1", 150.0),
                IntermittentUnit::new("windpark2", 36.0),
            ],
            dispatchable: vec![
                DispatchableUnit::new("gasfiredbig1", FuelKind::GasFired, 0.53, 100.0, 460.0),
                DispatchableUnit::new("gasfiredbig2", FuelKind::GasFired, 0.53, 100.0, 460.0),
                DispatchableUnit::new(
                    "gasfiredsomewhatsmaller",
                    FuelKind::GasFired,
                    0.37,
                    40.0,
                    210.0,
                ),
                DispatchableUnit::new("tj1", FuelKind::TurboJet, 0.3, 0.0, 16.0),
            ],
        }
    }

    #[test]
    fn wind_then_merit_order() {
        let plan = optimize(&request(910.0, 60.0)).expect("should be feasible");
        let names: Vec<&str> = plan.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "windpark1",
                "windpark2",
                "gasfiredbig1",
                "gasfiredbig2",
                "gasfiredsomewhatsmaller",
                "tj1"
            ]
        );
        assert!((plan.output_of("windpark1").unwrap_or_default() - 90.0).abs() < 1e-9);
        assert!((plan.output_of("windpark2").unwrap_or_default() - 21.6).abs() < 1e-9);
        assert_eq!(plan.output_of("gasfiredbig1"), Some(460.0));
        assert!((plan.output_of("gasfiredbig2").unwrap_or_default() - 338.4).abs() < 1e-9);
        assert_eq!(plan.output_of("tj1"), Some(0.0));
        assert!((plan.total_output_mw() - 910.0).abs() < 1e-6);
    }

    #[test]
    fn insufficient_capacity_propagates() {
        let err = optimize(&request(480.0, 0.0)).expect_err("should be infeasible");
        assert!(matches!(err, DispatchError::InsufficientCapacity { .. }));
    }

    #[test]
    fn no_intermittent_units() {
        let mut req = request(300.0, 50.0);
        req.intermittent.clear();
        req.dispatchable = vec![DispatchableUnit::new(
            "g1",
            FuelKind::GasFired,
            1.0,
            0.0,
            500.0,
        )];
        let plan = optimize(&req).expect("should be feasible");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.output_of("g1"), Some(300.0));
    }

    #[test]
    fn custom_settings_are_kept() {
        let settings = SearchSettings {
            exhaustive_limit: 4,
            resolution_mw: 0.5,
        };
        let optimizer = Optimizer::new(settings.clone());
        assert_eq!(optimizer.settings(), &settings);
    }
}
