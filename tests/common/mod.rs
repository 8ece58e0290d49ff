//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use merit_dispatch::dispatch::{
    DispatchPlan, DispatchRequest, DispatchableUnit, FuelKind, FuelPrices, IntermittentUnit,
};
use merit_dispatch::payload::Payload;

/// Absolute tolerance for conservation checks (MW).
pub const TOLERANCE_MW: f64 = 1e-6;

/// Path of a JSON fixture under `tests/data/`.
pub fn data_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(file_name)
}

/// Raw contents of a JSON fixture.
pub fn data_str(file_name: &str) -> String {
    std::fs::read_to_string(data_path(file_name)).expect("fixture should be readable")
}

/// Parsed and validated request from a JSON fixture.
pub fn fixture_request(file_name: &str) -> DispatchRequest {
    Payload::from_json_file(&data_path(file_name))
        .and_then(Payload::into_request)
        .expect("fixture should be a valid payload")
}

/// Market prices used by hand-built requests (gas 10, kerosine 40).
pub fn prices(wind_percent: f64) -> FuelPrices {
    FuelPrices {
        gas_per_mwh: 10.0,
        kerosine_per_mwh: 40.0,
        co2_per_ton: 0.0,
        wind_percent,
    }
}

/// Request with the given units and load.
pub fn request(
    load_mw: f64,
    wind_percent: f64,
    intermittent: Vec<IntermittentUnit>,
    dispatchable: Vec<DispatchableUnit>,
) -> DispatchRequest {
    DispatchRequest {
        load_mw,
        fuel_prices: prices(wind_percent),
        intermittent,
        dispatchable,
    }
}

/// Gas-fired unit with the given efficiency and bounds.
pub fn gas(name: &str, efficiency: f64, min_mw: f64, max_mw: f64) -> DispatchableUnit {
    DispatchableUnit::new(name, FuelKind::GasFired, efficiency, min_mw, max_mw)
}

/// Asserts the plan output sums to the requested load.
pub fn assert_conserves_load(request: &DispatchRequest, plan: &DispatchPlan) {
    let total = plan.total_output_mw();
    assert!(
        (total - request.load_mw).abs() < TOLERANCE_MW,
        "plan output {total} should equal load {}",
        request.load_mw
    );
}

/// Asserts every unit output lies within its admissible set.
pub fn assert_within_bounds(request: &DispatchRequest, plan: &DispatchPlan) {
    for unit in &request.intermittent {
        let p = plan.output_of(&unit.name).expect("every unit is in the plan");
        assert!(
            (0.0..=unit.max_output_mw + TOLERANCE_MW).contains(&p),
            "{}: {p} outside [0, {}]",
            unit.name,
            unit.max_output_mw
        );
    }
    for unit in &request.dispatchable {
        let p = plan.output_of(&unit.name).expect("every unit is in the plan");
        assert!(
            p == 0.0
                || (unit.min_output_mw - TOLERANCE_MW..=unit.max_output_mw + TOLERANCE_MW)
                    .contains(&p),
            "{}: {p} outside {{0}} ∪ [{}, {}]",
            unit.name,
            unit.min_output_mw,
            unit.max_output_mw
        );
    }
}
