use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use super::VarId;

/// A linear expression `sum(coeff * var) + constant`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinExpr {
    pub fn new() -> LinExpr {
        LinExpr::default()
    }

    pub fn add_term(&mut self, coeff: f64, var: VarId) -> &mut LinExpr {
        self.terms.push((var, coeff));
        self
    }

    pub fn add_constant(&mut self, constant: f64) -> &mut LinExpr {
        self.constant += constant;
        self
    }

    /// The variable terms, in insertion order. May contain repeated variables unless compacted.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// The total coefficient of `var` in the expression
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| *v == var)
            .map(|(_, c)| c)
            .sum()
    }

    /// Merges repeated variables into a single term, ordered by variable id
    pub fn compact(self) -> LinExpr {
        let mut merged: BTreeMap<VarId, f64> = BTreeMap::new();
        for (var, coeff) in self.terms {
            *merged.entry(var).or_insert(0.0) += coeff;
        }
        LinExpr {
            terms: merged.into_iter().collect(),
            constant: self.constant,
        }
    }

    /// Splits the expression into its variable part and its constant
    pub fn into_parts(self) -> (Vec<(VarId, f64)>, f64) {
        (self.terms, self.constant)
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> LinExpr {
        LinExpr {
            terms: vec![(var, 1.0)],
            constant: 0.0,
        }
    }
}

impl From<f64> for LinExpr {
    fn from(constant: f64) -> LinExpr {
        LinExpr {
            terms: Vec::new(),
            constant,
        }
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        self + (-rhs.into())
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self * -1.0
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, rhs: f64) -> LinExpr {
        for (_, coeff) in self.terms.iter_mut() {
            *coeff *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl<T: Into<LinExpr>> Add<T> for VarId {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for VarId {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Mul<f64> for VarId {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        LinExpr {
            terms: vec![(self, rhs)],
            constant: 0.0,
        }
    }
}

impl Mul<VarId> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: VarId) -> LinExpr {
        rhs * self
    }
}

/// Sums anything convertible into a linear expression
pub trait LinSum {
    fn lin_sum(self) -> LinExpr;
}

impl<I, T> LinSum for I
where
    I: IntoIterator<Item = T>,
    T: Into<LinExpr>,
{
    fn lin_sum(self) -> LinExpr {
        self.into_iter().fold(LinExpr::new(), |acc, e| acc + e)
    }
}
