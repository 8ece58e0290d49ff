//! Seeded randomized checks of plan invariants over generated fleets.

mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use merit_dispatch::dispatch::{
    DispatchError, DispatchPlan, DispatchRequest, DispatchableUnit, FuelKind, IntermittentUnit,
    UnitCategory, optimize,
};

use common::{TOLERANCE_MW, assert_conserves_load, assert_within_bounds};

const CASES: u64 = 300;

fn random_request(rng: &mut StdRng) -> DispatchRequest {
    let wind_count = if rng.random_bool(0.1) {
        rng.random_range(21..30)
    } else {
        rng.random_range(0..7)
    };
    let intermittent = (0..wind_count)
        .map(|i| IntermittentUnit::new(format!("wind{i}"), rng.random_range(0.0..200.0)))
        .collect();

    let thermal_count = rng.random_range(0..7);
    let dispatchable = (0..thermal_count)
        .map(|i| {
            let fuel = if rng.random_bool(0.7) {
                FuelKind::GasFired
            } else {
                FuelKind::TurboJet
            };
            let min = if rng.random_bool(0.3) {
                0.0
            } else {
                rng.random_range(0.0..150.0)
            };
            let max = min + rng.random_range(0.0..400.0);
            DispatchableUnit::new(
                format!("thermal{i}"),
                fuel,
                rng.random_range(0.2..=1.0),
                min,
                max,
            )
        })
        .collect();

    common::request(
        rng.random_range(0.0..1500.0),
        rng.random_range(0.0..=100.0),
        intermittent,
        dispatchable,
    )
}

fn for_each_case(mut check: impl FnMut(&DispatchRequest, Result<DispatchPlan, DispatchError>)) {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..CASES {
        let req = random_request(&mut rng);
        let result = optimize(&req);
        check(&req, result);
    }
}

#[test]
fn feasible_plans_conserve_load_within_bounds() {
    for_each_case(|req, result| {
        if let Ok(plan) = result {
            assert_eq!(plan.len(), req.intermittent.len() + req.dispatchable.len());
            assert_conserves_load(req, &plan);
            assert_within_bounds(req, &plan);
        }
    });
}

#[test]
fn wind_output_never_exceeds_load() {
    for_each_case(|req, result| {
        if let Ok(plan) = result {
            let wind_mw: f64 = plan
                .iter()
                .filter(|u| u.category == UnitCategory::Intermittent)
                .map(|u| u.output_mw)
                .sum();
            assert!(wind_mw <= req.load_mw + TOLERANCE_MW);
        }
    });
}

#[test]
fn wind_is_not_curtailed_when_it_fits() {
    for_each_case(|req, result| {
        let wind = req.fuel_prices.wind_percent;
        let candidate: f64 = req
            .intermittent
            .iter()
            .map(|u| u.candidate_output_mw(wind))
            .sum();
        if candidate > req.load_mw {
            return;
        }
        if let Ok(plan) = result {
            for unit in &req.intermittent {
                assert_eq!(plan.output_of(&unit.name), Some(unit.candidate_output_mw(wind)));
            }
        }
    });
}

#[test]
fn at_most_one_unit_is_partially_loaded() {
    for_each_case(|req, result| {
        let Ok(plan) = result else { return };
        let thermal: Vec<_> = plan
            .iter()
            .filter(|u| u.category != UnitCategory::Intermittent)
            .collect();

        let costs: Vec<f64> = thermal.iter().map(|u| u.marginal_cost).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]), "costs {costs:?}");

        let partial = thermal.iter().position(|u| {
            let unit = req
                .dispatchable
                .iter()
                .find(|d| d.name == u.name)
                .expect("plan unit comes from the request");
            u.output_mw > 0.0 && u.output_mw < unit.max_output_mw
        });
        if let Some(index) = partial {
            assert!(
                thermal[index + 1..].iter().all(|u| u.output_mw == 0.0),
                "units after the partial one must be off"
            );
        }
    });
}

#[test]
fn shortfall_is_positive_and_bounded_by_load() {
    for_each_case(|req, result| {
        if let Err(DispatchError::InsufficientCapacity { shortfall_mw }) = result {
            assert!(shortfall_mw > 0.0);
            assert!(shortfall_mw <= req.load_mw + TOLERANCE_MW);
        }
    });
}

#[test]
fn load_above_total_capacity_is_infeasible() {
    let mut checked = 0;
    for_each_case(|req, result| {
        let wind = req.fuel_prices.wind_percent;
        let capacity_mw: f64 = req
            .intermittent
            .iter()
            .map(|u| u.candidate_output_mw(wind))
            .chain(req.dispatchable.iter().map(|u| u.max_output_mw))
            .sum();
        if capacity_mw + TOLERANCE_MW < req.load_mw {
            checked += 1;
            assert!(
                matches!(result, Err(DispatchError::InsufficientCapacity { .. })),
                "load {} above capacity {capacity_mw} must be infeasible",
                req.load_mw
            );
        }
    });
    assert!(checked > 0, "no generated fleet fell short of its load");
}

#[test]
fn optimize_is_deterministic() {
    for_each_case(|req, result| {
        assert_eq!(optimize(req), result);
    });
}
