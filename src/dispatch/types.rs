//! Core dispatch types: unit descriptors, fuel prices, requests and plans.

use std::fmt;

/// Absolute tolerance (MW) used when comparing power sums against a load.
pub const POWER_TOLERANCE_MW: f64 = 1e-9;

/// Returns `true` if `value_mw` does not exceed `limit_mw` beyond the tolerance.
pub fn fits_within(value_mw: f64, limit_mw: f64) -> bool {
    value_mw <= limit_mw + POWER_TOLERANCE_MW
}

/// Fuel burned by a dispatchable unit.
///
/// Adding a fuel means extending this enum and [`FuelKind::price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelKind {
    /// Gas-fired plant, priced at the gas rate.
    GasFired,
    /// Turbojet, priced at the kerosine rate.
    TurboJet,
}

impl FuelKind {
    /// Fuel price (EUR/MWh) that applies to this kind of unit.
    pub fn price(self, prices: &FuelPrices) -> f64 {
        match self {
            Self::GasFired => prices.gas_per_mwh,
            Self::TurboJet => prices.kerosine_per_mwh,
        }
    }

    /// Short label used in reports and exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::GasFired => "gasfired",
            Self::TurboJet => "turbojet",
        }
    }
}

/// Market inputs for one request. Immutable while a request is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelPrices {
    /// Gas price (EUR/MWh).
    pub gas_per_mwh: f64,
    /// Kerosine price (EUR/MWh).
    pub kerosine_per_mwh: f64,
    /// Emission allowance price (EUR/ton). Not part of the marginal cost.
    pub co2_per_ton: f64,
    /// Wind availability in percent, `[0, 100]`.
    pub wind_percent: f64,
}

/// Wind turbine (or wind park) whose output depends on wind availability only.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermittentUnit {
    /// Unit name, unique within a request.
    pub name: String,
    /// Rated output (MW).
    pub max_output_mw: f64,
}

impl IntermittentUnit {
    /// Creates an intermittent unit descriptor.
    ///
    /// # Panics
    ///
    /// Panics if `max_output_mw` is negative or not finite.
    pub fn new(name: impl Into<String>, max_output_mw: f64) -> Self {
        let unit = Self {
            name: name.into(),
            max_output_mw,
        };
        unit.check();
        unit
    }

    /// Output the unit delivers when connected at the given wind availability.
    pub fn candidate_output_mw(&self, wind_percent: f64) -> f64 {
        self.max_output_mw * wind_percent / 100.0
    }

    fn check(&self) {
        assert!(
            self.max_output_mw.is_finite() && self.max_output_mw >= 0.0,
            "intermittent unit `{}`: max output must be finite and >= 0, got {}",
            self.name,
            self.max_output_mw
        );
    }
}

/// Fuel-burning unit that can be scheduled anywhere in `{0} ∪ [min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchableUnit {
    /// Unit name, unique within a request.
    pub name: String,
    /// Fuel burned by this unit.
    pub fuel: FuelKind,
    /// Fuel-to-power conversion efficiency, `(0, 1]`.
    pub efficiency: f64,
    /// Minimum stable output when running (MW).
    pub min_output_mw: f64,
    /// Maximum output (MW).
    pub max_output_mw: f64,
}

impl DispatchableUnit {
    /// Creates a dispatchable unit descriptor.
    ///
    /// # Panics
    ///
    /// Panics if efficiency is outside `(0, 1]`, or if the output bounds are
    /// negative, not finite, or `min_output_mw > max_output_mw`.
    pub fn new(
        name: impl Into<String>,
        fuel: FuelKind,
        efficiency: f64,
        min_output_mw: f64,
        max_output_mw: f64,
    ) -> Self {
        let unit = Self {
            name: name.into(),
            fuel,
            efficiency,
            min_output_mw,
            max_output_mw,
        };
        unit.check();
        unit
    }

    /// Fuel price divided by efficiency (EUR/MWh of output).
    pub fn marginal_cost(&self, prices: &FuelPrices) -> f64 {
        self.fuel.price(prices) / self.efficiency
    }

    fn check(&self) {
        assert!(
            self.efficiency > 0.0 && self.efficiency <= 1.0,
            "dispatchable unit `{}`: efficiency must be in (0, 1], got {}",
            self.name,
            self.efficiency
        );
        assert!(
            self.min_output_mw.is_finite()
                && self.max_output_mw.is_finite()
                && self.min_output_mw >= 0.0
                && self.min_output_mw <= self.max_output_mw,
            "dispatchable unit `{}`: bounds must satisfy 0 <= min <= max, got [{}, {}]",
            self.name,
            self.min_output_mw,
            self.max_output_mw
        );
    }
}

/// Already-validated input to the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// Total load to cover (MW).
    pub load_mw: f64,
    /// Fuel prices and wind availability.
    pub fuel_prices: FuelPrices,
    /// Intermittent units in input order.
    pub intermittent: Vec<IntermittentUnit>,
    /// Dispatchable units in input order.
    pub dispatchable: Vec<DispatchableUnit>,
}

impl DispatchRequest {
    /// Asserts every numeric precondition the optimizer relies on.
    ///
    /// # Panics
    ///
    /// Panics on the first violated precondition.
    pub fn check_preconditions(&self) {
        assert!(
            self.load_mw.is_finite() && self.load_mw >= 0.0,
            "load must be finite and >= 0, got {}",
            self.load_mw
        );
        let prices = &self.fuel_prices;
        assert!(
            (0.0..=100.0).contains(&prices.wind_percent),
            "wind availability must be in [0, 100], got {}",
            prices.wind_percent
        );
        assert!(
            prices.gas_per_mwh >= 0.0 && prices.kerosine_per_mwh >= 0.0,
            "fuel prices must be >= 0"
        );
        self.intermittent.iter().for_each(IntermittentUnit::check);
        self.dispatchable.iter().for_each(DispatchableUnit::check);
    }
}

/// Which side of the orchestration a plan entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCategory {
    Intermittent,
    Dispatchable(FuelKind),
}

impl UnitCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Intermittent => "windturbine",
            Self::Dispatchable(fuel) => fuel.label(),
        }
    }
}

/// Result record for one unit, built once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDispatch {
    /// Unit name.
    pub name: String,
    /// Unit category.
    pub category: UnitCategory,
    /// Assigned output (MW).
    pub output_mw: f64,
    /// Marginal cost (EUR/MWh); zero for intermittent units.
    pub marginal_cost: f64,
}

/// Ordered production plan: intermittent units in input order, then
/// dispatchable units in merit order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchPlan {
    pub units: Vec<UnitDispatch>,
}

impl DispatchPlan {
    /// Sum of all assigned outputs (MW).
    pub fn total_output_mw(&self) -> f64 {
        self.units.iter().map(|u| u.output_mw).sum()
    }

    /// Assigned output of the named unit, if present.
    pub fn output_of(&self, name: &str) -> Option<f64> {
        self.units
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.output_mw)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitDispatch> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<'a> IntoIterator for &'a DispatchPlan {
    type Item = &'a UnitDispatch;
    type IntoIter = std::slice::Iter<'a, UnitDispatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl fmt::Display for DispatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<28} {:<12} {:>10} {:>12}",
            "unit", "category", "output_mw", "eur_per_mwh"
        )?;
        for u in &self.units {
            writeln!(
                f,
                "{:<28} {:<12} {:>10.1} {:>12.2}",
                u.name,
                u.category.label(),
                u.output_mw,
                u.marginal_cost
            )?;
        }
        write!(f, "{:<28} {:<12} {:>10.1}", "total", "", self.total_output_mw())
    }
}
