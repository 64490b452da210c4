use itertools::iproduct;
use log::{debug, info};
use ndarray::{Array1, Array2};
use typed_index_collections::TiVec;

use super::vars::AddVars;
use super::{AssembledSystem, Constraint, LinExpr, LinSum, Phase, VarKind, Variables};
use crate::config::PlanningConfig;
use crate::error::{check_shape, Error, Result};
use crate::forecast::Forecast;

/// The data a model is built from
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInputs {
    /// Cost of moving one patient from `i` to `j`, `(N, N)`
    pub costs: Array2<f64>,
    /// Free capacity on the first day, `(N,)`
    pub sigma: Array1<f64>,
    /// Unassigned patients on the first day, `(N,)`
    pub theta: Array1<f64>,
    /// New demand before the turnover cutoff, `(N, T)`
    pub alpha: Array2<f64>,
    /// New backlog inflow, `(N, T)`
    pub beta: Array2<f64>,
}

impl ModelInputs {
    pub fn new(
        costs: Array2<f64>,
        sigma: Array1<f64>,
        theta: Array1<f64>,
        forecast: Forecast,
    ) -> ModelInputs {
        ModelInputs {
            costs,
            sigma,
            theta,
            alpha: forecast.alpha,
            beta: forecast.beta,
        }
    }

    /// Takes the nested vectors produced by a loader. Only the cost matrix is reshaped
    /// here; dimensions are checked against the configuration by `ModelBuilder::build`.
    pub fn from_raw(
        costs: &[Vec<f64>],
        sigma: &[f64],
        theta: &[f64],
        forecast: Forecast,
    ) -> Result<ModelInputs> {
        let rows = costs.len();
        let cols = costs.first().map(|row| row.len()).unwrap_or(0);
        if costs.iter().any(|row| row.len() != cols) {
            return Err(Error::InvalidParameter(
                "the rows of the cost matrix differ in length".to_string(),
            ));
        }
        let flat = costs.iter().flatten().copied().collect();
        let costs = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|err| Error::InvalidParameter(err.to_string()))?;

        Ok(ModelInputs::new(
            costs,
            Array1::from(sigma.to_vec()),
            Array1::from(theta.to_vec()),
            forecast,
        ))
    }
}

pub struct ModelBuilder {
    config: PlanningConfig,
}

#[allow(non_snake_case)]
impl ModelBuilder {
    pub fn new(config: &PlanningConfig) -> ModelBuilder {
        ModelBuilder {
            config: config.clone(),
        }
    }

    /// Builds the allocation model. Every input is validated before anything is generated.
    pub fn build(&self, inputs: &ModelInputs) -> Result<AssembledSystem> {
        self.validate(inputs)?;

        let N = self.config.locations();
        let T = self.config.days();
        info!(
            "Building allocation model for {} locations over {} days (epsilon = {})",
            N,
            T,
            self.config.epsilon()
        );

        //*************CREATE VARIABLES*************//
        let mut store = TiVec::new();
        let vars = Variables {
            a: (N, N, T).integer(&mut store, "A", VarKind::Transfer),
            d: (N, T).integer(&mut store, "D", VarKind::Idle),
            h: (N, T).integer(&mut store, "H", VarKind::Backlog),
        };
        debug!("Declared {} variables", store.len());

        let objective = self.objective(&vars, &inputs.costs);

        // ******************** ADD CONSTRAINTS ********************
        let mut constraints = Vec::new();
        Self::initial_capacity(&mut constraints, &vars, &inputs.sigma);
        Self::initial_backlog(&mut constraints, &vars, &inputs.theta);
        self.capacity_balance(&mut constraints, &vars, &inputs.alpha);
        Self::backlog_balance(&mut constraints, &vars, &inputs.beta);

        let system = AssembledSystem::new("patient_allocation", store, vars, objective, constraints);
        info!(
            "Successfully built allocation model {} with {} variables and {} constraints",
            system.run_id(),
            system.vars().len(),
            system.constraints().len()
        );
        Ok(system)
    }

    fn validate(&self, inputs: &ModelInputs) -> Result<()> {
        let N = self.config.locations();
        let T = self.config.days();

        let (rows, cols) = inputs.costs.dim();
        if rows != cols {
            return Err(Error::InvalidParameter(format!(
                "the cost matrix must be square, got {} x {}",
                rows, cols
            )));
        }
        check_shape("costs", &[N, N], inputs.costs.shape())?;
        check_shape("sigma", &[N], inputs.sigma.shape())?;
        check_shape("theta", &[N], inputs.theta.shape())?;
        check_shape("alpha", &[N, T], inputs.alpha.shape())?;
        check_shape("beta", &[N, T], inputs.beta.shape())?;

        for (name, values) in [("sigma", &inputs.sigma), ("theta", &inputs.theta)] {
            if let Some((i, v)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !(v.is_finite() && **v >= 0.0 && v.fract() == 0.0))
            {
                return Err(Error::InvalidParameter(format!(
                    "{}[{}] = {} must be a non-negative integer",
                    name, i, v
                )));
            }
        }

        if let Some(((i, j), c)) = inputs
            .costs
            .indexed_iter()
            .find(|(_, c)| !(c.is_finite() && **c >= 0.0))
        {
            return Err(Error::InvalidParameter(format!(
                "cost[{}][{}] = {} must be finite and non-negative",
                i, j, c
            )));
        }

        for (name, values) in [("alpha", &inputs.alpha), ("beta", &inputs.beta)] {
            if let Some(((i, t), v)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
                return Err(Error::InvalidParameter(format!(
                    "{}[{}][{}] = {} is not finite",
                    name, i, t, v
                )));
            }
        }

        let epsilon = self.config.epsilon();
        if let Some(((i, t), v)) = inputs
            .alpha
            .indexed_iter()
            .find(|((_, t), v)| *t >= epsilon && **v != 0.0)
        {
            return Err(Error::InvalidParameter(format!(
                "alpha[{}][{}] = {} must be zero from day epsilon = {} on",
                i, t, v, epsilon
            )));
        }

        Ok(())
    }

    /// Backlog is weighted by the number of remaining days, so it is resolved as early as
    /// possible. Transfers are weighted by their cost.
    fn objective(&self, vars: &Variables, costs: &Array2<f64>) -> LinExpr {
        let T = self.config.days();
        let W = self.config.backlog_weight();

        let backlog = vars
            .h
            .indexed_iter()
            .map(|((_, t), h)| *h * ((T - t) as f64 * W))
            .lin_sum();

        let transfers = vars
            .a
            .indexed_iter()
            .map(|((i, j, _), a)| *a * costs[(i, j)])
            .lin_sum();

        backlog + transfers
    }

    /// `D[i][0] + A[i][i][0] == sigma[i]`
    fn initial_capacity(constraints: &mut Vec<Constraint>, vars: &Variables, sigma: &Array1<f64>) {
        for (i, s) in sigma.indexed_iter() {
            constraints.push(Constraint::equality(
                format!("init_cap_{}", i),
                Phase::InitialCapacity,
                vars.d[(i, 0)] + vars.a[(i, i, 0)],
                *s,
            ));
        }
    }

    /// `H[i][0] + sum_j A[i][j][0] == theta[i]`
    fn initial_backlog(constraints: &mut Vec<Constraint>, vars: &Variables, theta: &Array1<f64>) {
        let N = theta.len();
        for (i, th) in theta.indexed_iter() {
            let assigned = (0..N).map(|j| vars.a[(i, j, 0)]).lin_sum();
            constraints.push(Constraint::equality(
                format!("init_backlog_{}", i),
                Phase::InitialBacklog,
                vars.h[(i, 0)] + assigned,
                *th,
            ));
        }
    }

    /// Idle capacity evolves with the forecasted demand and the patients received. When the
    /// horizon exceeds epsilon, beds taken by transfers made epsilon days earlier are
    /// freed again.
    fn capacity_balance(
        &self,
        constraints: &mut Vec<Constraint>,
        vars: &Variables,
        alpha: &Array2<f64>,
    ) {
        let N = self.config.locations();
        let T = self.config.days();
        let epsilon = self.config.epsilon();
        let received = |j: usize, t: usize| (0..N).map(|i| vars.a[(i, j, t)]).lin_sum();

        let before_turnover = if self.config.recycles_capacity() {
            debug!("Horizon exceeds epsilon, adding recycling balance");
            1..epsilon
        } else {
            1..T
        };

        for (j, t) in iproduct!(0..N, before_turnover) {
            let lhs = vars.d[(j, t)] - vars.d[(j, t - 1)] + received(j, t);
            constraints.push(Constraint::equality(
                format!("cap_bal_{}_{}", j, t),
                Phase::CapacityBalance,
                lhs,
                alpha[(j, t)],
            ));
        }

        if self.config.recycles_capacity() {
            for (j, t) in iproduct!(0..N, epsilon..T) {
                let rhs = vars.d[(j, t - 1)] + alpha[(j, t)] + received(j, t - epsilon)
                    - received(j, t);
                constraints.push(Constraint::equality(
                    format!("cap_recycle_{}_{}", j, t),
                    Phase::CapacityBalance,
                    vars.d[(j, t)],
                    rhs,
                ));
            }
        }
    }

    /// `H[i][t] == H[i][t-1] + beta[i][t] - sum_j A[i][j][t]` for `t >= 1`
    fn backlog_balance(constraints: &mut Vec<Constraint>, vars: &Variables, beta: &Array2<f64>) {
        let (N, T) = beta.dim();
        for (i, t) in iproduct!(0..N, 1..T) {
            let assigned = (0..N).map(|j| vars.a[(i, j, t)]).lin_sum();
            constraints.push(Constraint::equality(
                format!("backlog_bal_{}_{}", i, t),
                Phase::BacklogBalance,
                vars.h[(i, t)],
                vars.h[(i, t - 1)] + beta[(i, t)] - assigned,
            ));
        }
    }
}
