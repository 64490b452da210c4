//! Forecasts ICU demand during an epidemic surge from Gompertz growth curves and builds the
//! integer program that allocates patients across locations over a rolling horizon.
//!
//! ```text
//! growth parameters -> ForecastEngine -> (beta, alpha) -> ModelBuilder -> AssembledSystem
//!                                                                  -> SolverAdapter -> Allocation
//! ```

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod scenario;
pub mod solver;

#[cfg(feature = "python")]
pub mod python;

pub use config::PlanningConfig;
pub use error::{Error, Result};
pub use forecast::{Forecast, ForecastEngine, GrowthParameters};
pub use model::{AssembledSystem, ModelBuilder, ModelInputs};
pub use scenario::Scenario;
pub use solver::{solve, Allocation, SolveLimits, SolveStatus, SolverAdapter};
