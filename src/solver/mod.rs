#[cfg(feature = "gurobi")]
pub mod gurobi;

#[cfg(feature = "gurobi")]
pub use gurobi::GurobiAdapter;

use std::time::Duration;

use log::{info, warn};
use ndarray::{Array2, Array3};
use typed_index_collections::TiVec;

use crate::error::{Error, Result};
use crate::model::vars::ConvertVars;
use crate::model::{AssembledSystem, VarId};

/// The termination status reported by a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The time limit was reached before optimality was proven
    TimeLimit,
    /// Any other solver specific status code
    Other(i32),
}

/// Limits every adapter must respect
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolveLimits {
    pub time_limit: Option<Duration>,
}

/// What a solver returns. `values` may be present even when the status is not optimal.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    pub status: SolveStatus,
    pub values: TiVec<VarId, f64>,
    pub objective: Option<f64>,
}

/// A general integer/linear optimization procedure. Solving blocks the caller until the
/// solver terminates or the time limit in `limits` is hit.
pub trait SolverAdapter {
    fn solve(&mut self, system: &AssembledSystem, limits: &SolveLimits) -> Result<SolverOutput>;
}

/// The resolved decision variables of an optimal solution
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Patients transferred, indexed `(from, to, day)`
    pub transfers: Array3<f64>,
    /// Idle capacity, indexed `(location, day)`
    pub idle: Array2<f64>,
    /// Unmet demand, indexed `(location, day)`
    pub backlog: Array2<f64>,
    pub objective: Option<f64>,
}

impl Allocation {
    /// Reads the solution of `system` from `output`. Only an optimal status yields an allocation.
    pub fn from_output(system: &AssembledSystem, output: SolverOutput) -> Result<Allocation> {
        if output.status != SolveStatus::Optimal {
            warn!(
                "Solver finished run {} with status {:?}",
                system.run_id(),
                output.status
            );
            return Err(Error::SolverStatus(output.status));
        }

        let expected = system.vars().len();
        if output.values.len() != expected {
            return Err(Error::ShapeMismatch {
                what: "solution values",
                expected: vec![expected],
                actual: vec![output.values.len()],
            });
        }

        let vars = system.variables();
        Ok(Allocation {
            transfers: vars.a.convert(&output.values),
            idle: vars.d.convert(&output.values),
            backlog: vars.h.convert(&output.values),
            objective: output.objective,
        })
    }

    /// Transfers with a non-zero value on `day`, as `(from, to, patients)`
    pub fn nonzero_transfers(&self, day: usize) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.transfers
            .indexed_iter()
            .filter(move |((_, _, t), value)| *t == day && **value > 0.0)
            .map(|((i, j, _), value)| (i, j, *value))
    }
}

/// Solves `system` with `adapter` and reads the allocation. The status alone decides
/// whether the result is usable.
pub fn solve<S: SolverAdapter>(
    adapter: &mut S,
    system: &AssembledSystem,
    limits: &SolveLimits,
) -> Result<Allocation> {
    info!(
        "Solving run {} (time limit: {:?})",
        system.run_id(),
        limits.time_limit
    );
    let output = adapter.solve(system, limits)?;
    let allocation = Allocation::from_output(system, output)?;
    info!(
        "Run {} solved to optimality, objective = {:?}",
        system.run_id(),
        allocation.objective
    );
    Ok(allocation)
}
