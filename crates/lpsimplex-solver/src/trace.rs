//! Step-by-step trace of a solve.
//!
//! A solve reports the initial tableau and the tableau after every pivot to a
//! [`TraceSink`] owned by the caller, so concurrent solves never share trace
//! state.

use std::fmt;

use crate::tableau::Tableau;

/// Snapshot of the tableau and basis at one point of a solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    /// Pivots performed so far; 0 for the initial tableau
    pub iteration: usize,
    /// Column that entered the basis in this step
    pub entering: Option<usize>,
    /// Row in which the pivot happened
    pub leaving_row: Option<usize>,
    /// Variable that left the basis
    pub leaving: Option<usize>,
    pub tableau: Vec<Vec<f64>>,
    pub basis: Vec<usize>,
}

impl TraceStep {
    pub(crate) fn initial(tableau: &Tableau) -> Self {
        Self {
            iteration: 0,
            entering: None,
            leaving_row: None,
            leaving: None,
            tableau: tableau.rows().to_vec(),
            basis: tableau.basis().to_vec(),
        }
    }

    pub(crate) fn after_pivot(tableau: &Tableau, iteration: usize, row: usize, col: usize, leaving: usize) -> Self {
        Self {
            iteration,
            entering: Some(col),
            leaving_row: Some(row),
            leaving: Some(leaving),
            tableau: tableau.rows().to_vec(),
            basis: tableau.basis().to_vec(),
        }
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.entering, self.leaving) {
            (Some(entering), Some(leaving)) => writeln!(
                f,
                "Iteration {}: column {} enters, column {} leaves",
                self.iteration, entering, leaving
            )?,
            _ => writeln!(f, "Initial tableau:")?,
        }
        for row in &self.tableau {
            let cells: Vec<String> = row.iter().map(|v| format!("{:10.4}", v)).collect();
            writeln!(f, "  {}", cells.join("  "))?;
        }
        write!(f, "Basis: {:?}", self.basis)
    }
}

/// Receiver of trace steps
pub trait TraceSink {
    fn record(&mut self, step: TraceStep);

    /// Whether snapshots should be taken at all
    fn enabled(&self) -> bool {
        true
    }
}

/// Sink that discards everything and disables snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn record(&mut self, _step: TraceStep) {}

    fn enabled(&self) -> bool {
        false
    }
}

impl TraceSink for Vec<TraceStep> {
    fn record(&mut self, step: TraceStep) {
        self.push(step);
    }
}

impl<F: FnMut(TraceStep)> TraceSink for F {
    fn record(&mut self, step: TraceStep) {
        self(step)
    }
}
