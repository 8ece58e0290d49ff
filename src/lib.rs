//! Merit-order production planning for wind and thermal generation fleets.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
/// Intermittent selection, merit-order allocation, and the optimizer.
pub mod dispatch;
pub mod io;
pub mod logging;
pub mod payload;
