use grb::prelude::*;
use grb::{Status, VarType as GrbVarType};
use log::{debug, trace};
use typed_index_collections::TiVec;

use super::{SolveLimits, SolveStatus, SolverAdapter, SolverOutput};
use crate::error::Result;
use crate::model::{AssembledSystem, LinExpr, VarId, VarType};

/// Solves assembled systems with Gurobi
#[derive(Debug, Clone, Default)]
pub struct GurobiAdapter {
    /// Whether Gurobi may print its log to stdout
    pub verbose: bool,
}

impl GurobiAdapter {
    fn expr(vars: &TiVec<VarId, Var>, expr: &LinExpr) -> grb::expr::LinExpr {
        let mut out = grb::expr::LinExpr::new();
        for (var, coeff) in expr.terms() {
            out.add_term(*coeff, vars[*var]);
        }
        out.add_constant(expr.constant());
        out
    }

    /// Translates the system into a Gurobi model
    fn build(&self, system: &AssembledSystem) -> grb::Result<(Model, TiVec<VarId, Var>)> {
        let mut model = Model::new(system.name())?;
        model.set_param(param::OutputFlag, i32::from(self.verbose))?;

        let mut vars: TiVec<VarId, Var> = TiVec::with_capacity(system.vars().len());
        for def in system.vars().iter() {
            let vtype = match def.vtype {
                VarType::Integer => GrbVarType::Integer,
                VarType::Continuous => GrbVarType::Continuous,
            };
            vars.push(model.add_var(
                &def.name,
                vtype,
                0.0,
                def.lower,
                def.upper,
                std::iter::empty(),
            )?);
        }

        // variables must be integrated before they appear in constraints
        model.update()?;

        for constr in system.constraints() {
            let lhs = Self::expr(&vars, &constr.lhs);
            model.add_constr(&constr.name, c!(lhs == constr.rhs))?;
        }

        model.set_objective(Self::expr(&vars, system.objective()), Minimize)?;
        model.update()?;

        debug!("Translated run {} into a Gurobi model", system.run_id());
        Ok((model, vars))
    }

    fn status(status: Status) -> SolveStatus {
        match status {
            Status::Optimal => SolveStatus::Optimal,
            Status::Infeasible => SolveStatus::Infeasible,
            Status::Unbounded => SolveStatus::Unbounded,
            Status::TimeLimit => SolveStatus::TimeLimit,
            other => SolveStatus::Other(other as i32),
        }
    }
}

impl SolverAdapter for GurobiAdapter {
    fn solve(&mut self, system: &AssembledSystem, limits: &SolveLimits) -> Result<SolverOutput> {
        let (mut model, vars) = self.build(system)?;
        if let Some(limit) = limits.time_limit {
            model.set_param(param::TimeLimit, limit.as_secs_f64())?;
        }

        model.optimize()?;
        let status = Self::status(model.status()?);
        trace!("Gurobi status for run {}: {:?}", system.run_id(), status);

        // values are only available when at least one feasible solution was found
        if model.get_attr(attr::SolCount)? == 0 {
            return Ok(SolverOutput {
                status,
                values: TiVec::new(),
                objective: None,
            });
        }

        let values = vars
            .iter()
            .map(|var| model.get_obj_attr(attr::X, var))
            .collect::<grb::Result<Vec<f64>>>()?;

        Ok(SolverOutput {
            status,
            values: values.into(),
            objective: Some(model.get_attr(attr::ObjVal)?),
        })
    }
}
