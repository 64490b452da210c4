use derive_more::Display;

use crate::solver::SolveStatus;

/// The dimensions of an input array, e.g. `[N]`, `[N, N]` or `[N, T]`
pub type Shape = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Error {
    /// The dimensions of `what` do not match the configured number of locations and days
    #[display(fmt = "{} has shape {:?}, expected {:?}", what, actual, expected)]
    ShapeMismatch {
        what: &'static str,
        expected: Shape,
        actual: Shape,
    },
    /// The growth parameter table has the wrong number of rows, or a row is too short.
    /// `location` is `None` when the row count itself is wrong.
    #[display(
        fmt = "growth parameters for location {:?} have {} entries, expected {}",
        location,
        actual,
        expected
    )]
    InvalidParameterShape {
        location: Option<usize>,
        expected: usize,
        actual: usize,
    },
    /// A scalar parameter is out of its allowed range
    #[display(fmt = "invalid parameter: {}", _0)]
    InvalidParameter(String),
    /// The solver finished, but not with an optimal solution
    #[display(fmt = "solver returned status {:?}", _0)]
    SolverStatus(SolveStatus),
    /// The solver failed before producing a status
    #[display(fmt = "solver failure: {}", _0)]
    Solver(String),
    /// The scenario could not be read or decoded
    #[display(fmt = "scenario error: {}", _0)]
    Scenario(String),
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Scenario(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Scenario(err.to_string())
    }
}

#[cfg(feature = "gurobi")]
impl From<grb::Error> for Error {
    fn from(err: grb::Error) -> Self {
        Error::Solver(format!("{:?}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with `ShapeMismatch` unless `actual == expected`
pub(crate) fn check_shape(what: &'static str, expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_is_reported_with_both_shapes() {
        let err = check_shape("sigma", &[2], &[1]).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                what: "sigma",
                expected: vec![2],
                actual: vec![1]
            }
        );
        assert_eq!(err.to_string(), "sigma has shape [1], expected [2]");
    }

    #[test]
    fn matching_shapes_pass() {
        assert!(check_shape("alpha", &[3, 4], &[3, 4]).is_ok());
    }
}
