use crate::trace::TraceStep;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexResult {
    /// Terminal status
    pub status: Status,
    /// Optimal objective value z*
    pub objective_value: Option<f64>,
    /// Optimal point x*, structural variables only
    pub values: Option<Vec<f64>>,
    /// Number of pivots performed
    pub iterations: usize,
    /// Human-readable diagnostic
    pub message: String,
    /// Post-optimal analysis (populated when optimal)
    pub analysis: Option<Analysis>,
    /// Tableau snapshots (populated when tracing is enabled)
    pub trace: Vec<TraceStep>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// An optimal vertex was found
    Optimal,
    /// The objective grows without bound
    Unbounded,
    /// Some bᵢ < 0, so the slack basis is not a feasible start
    Infeasible,
    /// Shape or value check failed
    Malformed,
    /// The configured iteration cap was reached
    IterationLimit,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Optimal => "optimal",
            Status::Unbounded => "unbounded",
            Status::Infeasible => "infeasible",
            Status::Malformed => "malformed",
            Status::IterationLimit => "iteration_limit",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-optimal analysis read from the final tableau
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Column index of the basic variable of each constraint row
    pub basis: Vec<usize>,

    /// Dual value of each constraint
    /// Indicates how much the objective would grow per unit of extra RHS
    pub shadow_prices: Vec<ShadowPrice>,

    /// Reduced cost of each structural variable
    pub reduced_costs: Vec<ReducedCost>,

    /// Slack bᵢ - Aᵢx* of each constraint
    pub slacks: Vec<f64>,

    /// Constraints that hold with equality at the optimum
    pub binding_constraints: Vec<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPrice {
    /// Constraint index
    pub constraint: usize,
    /// Shadow price value
    pub value: f64,
    /// Interpretation
    pub interpretation: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCost {
    /// Variable index
    pub variable: usize,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

impl SimplexResult {
    pub fn optimal(objective_value: f64, values: Vec<f64>, iterations: usize, analysis: Analysis) -> Self {
        Self {
            status: Status::Optimal,
            objective_value: Some(objective_value),
            values: Some(values),
            iterations,
            message: "Optimal solution found.".to_string(),
            analysis: Some(analysis),
            trace: Vec::new(),
        }
    }

    pub fn unbounded(iterations: usize, column: usize) -> Self {
        Self::terminal(
            Status::Unbounded,
            iterations,
            format!("The objective function can grow indefinitely along column {} (unbounded).", column),
        )
    }

    pub fn iteration_limit(iterations: usize) -> Self {
        Self::terminal(
            Status::IterationLimit,
            iterations,
            format!("Iteration limit of {} reached without optimality; cycling suspected.", iterations),
        )
    }

    /// A result without a point or objective value
    pub fn terminal(status: Status, iterations: usize, message: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            values: None,
            iterations,
            message: message.into(),
            analysis: None,
            trace: Vec::new(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }
}
