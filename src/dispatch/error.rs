//! Dispatch failure taxonomy.

use thiserror::Error;

/// Failure of a dispatch computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The merit order was exhausted with load still uncovered.
    #[error("insufficient capacity to meet load: {shortfall_mw:.1} MW uncovered")]
    InsufficientCapacity {
        /// Load left uncovered after the last unit (MW).
        shortfall_mw: f64,
    },
}
