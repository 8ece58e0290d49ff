//! Production planning: intermittent selection, merit-order allocation and
//! the optimizer that composes them.

pub mod allocator;
pub mod error;
pub mod optimizer;
pub mod selector;
pub mod summary;
pub mod types;

pub use error::DispatchError;
pub use optimizer::{Optimizer, optimize};
pub use selector::SearchSettings;
pub use summary::PlanSummary;
pub use types::{
    DispatchPlan, DispatchRequest, DispatchableUnit, FuelKind, FuelPrices, IntermittentUnit,
    UnitCategory, UnitDispatch,
};
