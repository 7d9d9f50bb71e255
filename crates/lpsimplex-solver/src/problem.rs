use thiserror::Error;

use crate::solution::Status;

/// Tolerance for the sign check on the right-hand side
const RHS_TOLERANCE: f64 = 1e-12;

/// Why a problem was rejected before any tableau was built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Constraint matrix A is empty")]
    Empty,
    #[error("Constraint matrix A has no columns")]
    NoColumns,
    #[error("Row {row} of A has {found} entries, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("Length of b ({found}) does not match the number of rows of A ({expected})")]
    RhsLength { expected: usize, found: usize },
    #[error("Length of c ({found}) does not match the number of columns of A ({expected})")]
    CostLength { expected: usize, found: usize },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
    #[error("b[{row}] = {value} is negative; the slack starting basis requires b >= 0")]
    NegativeRhs { row: usize, value: f64 },
}

impl ProblemError {
    /// Status reported for a problem rejected with this error
    pub fn status(&self) -> Status {
        match self {
            ProblemError::NegativeRhs { .. } => Status::Infeasible,
            _ => Status::Malformed,
        }
    }
}

/// A linear program in canonical maximization form:
///
/// maximize cᵀx subject to Ax <= b, x >= 0, with b >= 0.
///
/// Only constructible through [`LpProblem::new`], so every value satisfies the
/// shape and sign invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Constraint matrix, one row per constraint
    a: Vec<Vec<f64>>,
    /// Right-hand side, one entry per constraint
    b: Vec<f64>,
    /// Objective coefficients, one entry per variable
    c: Vec<f64>,
}

impl LpProblem {
    pub fn new(a: Vec<Vec<f64>>, b: Vec<f64>, c: Vec<f64>) -> Result<Self, ProblemError> {
        validate(&a, &b, &c)?;
        Ok(Self { a, b, c })
    }

    pub fn num_variables(&self) -> usize {
        self.c.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.a
    }

    pub fn rhs(&self) -> &[f64] {
        &self.b
    }

    pub fn costs(&self) -> &[f64] {
        &self.c
    }

    /// cᵀx for a point of length `num_variables()`
    pub fn objective_at(&self, x: &[f64]) -> f64 {
        self.c.iter().zip(x).map(|(c, x)| c * x).sum()
    }

    /// Left-hand side Aᵢx of every constraint
    pub fn activity(&self, x: &[f64]) -> Vec<f64> {
        self.a
            .iter()
            .map(|row| row.iter().zip(x).map(|(a, x)| a * x).sum())
            .collect()
    }

    /// Whether `x` satisfies x >= 0 and Ax <= b within `tolerance`
    pub fn is_feasible(&self, x: &[f64], tolerance: f64) -> bool {
        if x.len() != self.num_variables() || x.iter().any(|&v| v < -tolerance) {
            return false;
        }
        self.activity(x)
            .iter()
            .zip(&self.b)
            .all(|(lhs, rhs)| *lhs <= rhs + tolerance)
    }
}

/// Check shape and sign of a dense problem, in the order the checks are
/// reported: emptiness, row lengths, length of b, length of c, finiteness and
/// finally the sign of b.
pub fn validate(a: &[Vec<f64>], b: &[f64], c: &[f64]) -> Result<(), ProblemError> {
    let Some(first) = a.first() else {
        return Err(ProblemError::Empty);
    };
    let n = first.len();
    if n == 0 {
        return Err(ProblemError::NoColumns);
    }

    if let Some((row, found)) = a
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, len)| len != n)
    {
        return Err(ProblemError::RaggedRow { row, expected: n, found });
    }
    if b.len() != a.len() {
        return Err(ProblemError::RhsLength {
            expected: a.len(),
            found: b.len(),
        });
    }
    if c.len() != n {
        return Err(ProblemError::CostLength {
            expected: n,
            found: c.len(),
        });
    }

    if a.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ProblemError::NonFinite("A".to_string()));
    }
    if b.iter().any(|v| !v.is_finite()) {
        return Err(ProblemError::NonFinite("b".to_string()));
    }
    if c.iter().any(|v| !v.is_finite()) {
        return Err(ProblemError::NonFinite("c".to_string()));
    }

    if let Some((row, &value)) = b.iter().enumerate().find(|&(_, &v)| v < -RHS_TOLERANCE) {
        return Err(ProblemError::NegativeRhs { row, value });
    }

    Ok(())
}
