mod problem;
mod simplex;
mod solution;
mod tableau;
mod trace;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use problem::{validate, LpProblem, ProblemError};
pub use simplex::{solve, Solver};
pub use solution::{Analysis, ReducedCost, ShadowPrice, SimplexResult, Status};
pub use tableau::{LeavingRule, Tableau};
pub use trace::{NoTrace, TraceSink, TraceStep};
