pub mod builder;
pub mod expr;
pub mod lp_format;
pub mod vars;

pub use builder::{ModelBuilder, ModelInputs};
pub use expr::{LinExpr, LinSum};

use derive_more::{Display, From, Into};
use ndarray::{Array2, Array3};
use typed_index_collections::{TiSlice, TiVec};
use uuid::Uuid;

/// Index of a decision variable within an `AssembledSystem`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into, Display)]
pub struct VarId(usize);

/// Which family of decision variables a variable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `A[i][j][t]`: patients transferred from `i` to `j` on day `t`
    Transfer,
    /// `D[i][t]`: idle capacity at `i` on day `t`
    Idle,
    /// `H[i][t]`: unmet demand at `i` on day `t`
    Backlog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Integer,
    Continuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub kind: VarKind,
    pub vtype: VarType,
    pub lower: f64,
    pub upper: f64,
}

/// The decision variables, densely indexed
#[derive(Debug, Clone)]
pub struct Variables {
    /// Transfers, indexed `(from, to, day)`
    pub a: Array3<VarId>,
    /// Idle capacity, indexed `(location, day)`
    pub d: Array2<VarId>,
    /// Backlog, indexed `(location, day)`
    pub h: Array2<VarId>,
}

/// The generation phase a constraint stems from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Free capacity on the first day
    InitialCapacity,
    /// Unassigned patients on the first day
    InitialBacklog,
    /// Capacity balance for the remaining days, including recycled capacity
    CapacityBalance,
    /// Backlog balance for the remaining days
    BacklogBalance,
}

/// An equality constraint `lhs == rhs`, with every variable on the left hand side
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub phase: Phase,
    pub lhs: LinExpr,
    pub rhs: f64,
}

impl Constraint {
    /// Moves all variables of `lhs == rhs` to the left and all constants to the right
    pub fn equality(
        name: String,
        phase: Phase,
        lhs: impl Into<LinExpr>,
        rhs: impl Into<LinExpr>,
    ) -> Constraint {
        let (terms, constant) = (lhs.into() - rhs.into()).compact().into_parts();
        let mut lhs = LinExpr::new();
        for (var, coeff) in terms {
            lhs.add_term(coeff, var);
        }
        Constraint {
            name,
            phase,
            lhs,
            rhs: -constant,
        }
    }
}

/// A minimization problem ready to be handed to a solver
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    run_id: Uuid,
    name: String,
    vars: TiVec<VarId, VariableDef>,
    variables: Variables,
    objective: LinExpr,
    constraints: Vec<Constraint>,
}

impl AssembledSystem {
    pub fn new(
        name: &str,
        vars: TiVec<VarId, VariableDef>,
        variables: Variables,
        objective: LinExpr,
        constraints: Vec<Constraint>,
    ) -> AssembledSystem {
        AssembledSystem {
            run_id: Uuid::new_v4(),
            name: name.to_string(),
            vars,
            variables,
            objective,
            constraints,
        }
    }

    /// Identifies this optimization run in logs and exports
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every declared variable, indexed by id
    pub fn vars(&self) -> &TiSlice<VarId, VariableDef> {
        &self.vars
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// The objective, to be minimized
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraints_in(&self, phase: Phase) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.phase == phase)
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// The number of declared variables of the given kind
    pub fn count_vars(&self, kind: VarKind) -> usize {
        self.vars.iter().filter(|v| v.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_moves_variables_left_and_constants_right() {
        let (x, y) = (VarId::from(0), VarId::from(1));
        // x == y + 4 - x
        let c = Constraint::equality("c".to_string(), Phase::CapacityBalance, x, y + 4.0 - x);
        assert_eq!(c.lhs.terms(), &[(x, 2.0), (y, -1.0)]);
        assert_eq!(c.rhs, 4.0);
    }
}
