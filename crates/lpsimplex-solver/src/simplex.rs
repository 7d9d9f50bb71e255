use log::{debug, trace};

use crate::problem::LpProblem;
use crate::solution::{Analysis, ReducedCost, ShadowPrice, SimplexResult};
use crate::tableau::{LeavingRule, Tableau};
use crate::trace::{NoTrace, TraceSink, TraceStep};

/// Simplex solver for linear programs in canonical maximization form
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum number of pivots before giving up; `None` runs until termination
    max_iterations: Option<usize>,
    /// Tolerance for entering candidates, ratio eligibility and ratio ties
    tolerance: f64,
    /// Elimination factors at or below this magnitude are skipped
    zero_tolerance: f64,
    /// Tie-break of the minimum ratio test
    leaving_rule: LeavingRule,
    /// Collect a snapshot after every pivot into the result
    trace: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: None,
            tolerance: 1e-12,
            zero_tolerance: 1e-9,
            leaving_rule: LeavingRule::RowOrder,
            trace: false,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_zero_tolerance(mut self, tol: f64) -> Self {
        self.zero_tolerance = tol;
        self
    }

    pub fn with_leaving_rule(mut self, rule: LeavingRule) -> Self {
        self.leaving_rule = rule;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Validate a dense problem and solve it.
    ///
    /// Rejected problems come back as a `Malformed` or `Infeasible` result with
    /// zero iterations and the violated check as message.
    pub fn solve_dense(&self, a: &[Vec<f64>], b: &[f64], c: &[f64]) -> SimplexResult {
        match LpProblem::new(a.to_vec(), b.to_vec(), c.to_vec()) {
            Ok(problem) => self.solve(&problem),
            Err(e) => {
                debug!("rejected problem: {}", e);
                SimplexResult::terminal(e.status(), 0, e.to_string())
            }
        }
    }

    /// Solve a validated problem, collecting the trace into the result when enabled
    pub fn solve(&self, problem: &LpProblem) -> SimplexResult {
        if self.trace {
            let mut steps: Vec<TraceStep> = Vec::new();
            let mut result = self.solve_with_sink(problem, &mut steps);
            result.trace = steps;
            result
        } else {
            self.solve_with_sink(problem, &mut NoTrace)
        }
    }

    /// Solve a validated problem, streaming trace steps to `sink`
    pub fn solve_with_sink<S: TraceSink + ?Sized>(&self, problem: &LpProblem, sink: &mut S) -> SimplexResult {
        debug!(
            "solving: vars: {}, constraints: {}, leaving rule: {:?}, max iterations: {:?}",
            problem.num_variables(),
            problem.num_constraints(),
            self.leaving_rule,
            self.max_iterations,
        );

        let mut tableau = Tableau::new(problem);
        if sink.enabled() {
            sink.record(TraceStep::initial(&tableau));
        }

        let mut iterations = 0;
        loop {
            let Some(pivot_col) = tableau.entering_column(self.tolerance) else {
                debug!(
                    "found optimum in {} iterations, obj.: {}",
                    iterations,
                    tableau.objective_value()
                );
                return self.extract_solution(&tableau, iterations);
            };

            let Some(pivot_row) = tableau.leaving_row(pivot_col, self.tolerance, self.leaving_rule) else {
                debug!("unbounded along column {} after {} iterations", pivot_col, iterations);
                return SimplexResult::unbounded(iterations, pivot_col);
            };

            // The cap only stops a pivot that would actually happen
            if self.max_iterations.is_some_and(|max| iterations >= max) {
                debug!("iteration limit reached after {} iterations", iterations);
                return SimplexResult::iteration_limit(iterations);
            }

            let leaving = tableau.basis()[pivot_row];
            tableau.pivot(pivot_row, pivot_col, self.zero_tolerance);
            iterations += 1;

            trace!(
                "iter {}: column {} enters in row {}, column {} leaves, obj.: {}",
                iterations,
                pivot_col,
                pivot_row,
                leaving,
                tableau.objective_value()
            );
            if sink.enabled() {
                sink.record(TraceStep::after_pivot(&tableau, iterations, pivot_row, pivot_col, leaving));
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, iterations: usize) -> SimplexResult {
        let values = tableau.point();
        let analysis = self.analyze(tableau, &values);
        SimplexResult::optimal(tableau.objective_value(), values, iterations, analysis)
    }

    fn analyze(&self, tableau: &Tableau, values: &[f64]) -> Analysis {
        let n_vars = tableau.n_vars();
        let reduced = tableau.reduced_costs();

        // Shadow prices: objective row entries of the slack columns
        let shadow_prices = (0..tableau.n_constraints())
            .map(|i| {
                let value = reduced[n_vars + i];
                let interpretation = if value.abs() < self.zero_tolerance {
                    "Non-binding constraint".to_string()
                } else {
                    format!("Increasing RHS by 1 unit would increase the objective by {:.4}", value)
                };
                ShadowPrice {
                    constraint: i,
                    value,
                    interpretation,
                }
            })
            .collect();

        let reduced_costs = values
            .iter()
            .enumerate()
            .map(|(j, &value)| {
                let is_basic = tableau.basis().contains(&j);
                ReducedCost {
                    variable: j,
                    value,
                    reduced_cost: if is_basic { 0.0 } else { reduced[j] },
                    is_basic,
                }
            })
            .collect();

        let slacks = tableau.slacks();
        let binding_constraints = slacks
            .iter()
            .enumerate()
            .filter(|(_, s)| s.abs() <= self.zero_tolerance)
            .map(|(i, _)| i)
            .collect();

        Analysis {
            basis: tableau.basis().to_vec(),
            shadow_prices,
            reduced_costs,
            slacks,
            binding_constraints,
        }
    }
}

/// Solve max cᵀx s.t. Ax <= b, x >= 0 with the default solver settings
pub fn solve(a: &[Vec<f64>], b: &[f64], c: &[f64]) -> SimplexResult {
    Solver::new().solve_dense(a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::Status;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const EPS: f64 = 1e-9;

    fn beale() -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
        // Beale's degenerate example, optimal at x = (1, 0, 1, 0) with z = 5/4
        (
            vec![
                vec![0.25, -8.0, -1.0, 9.0],
                vec![0.5, -12.0, -0.5, 3.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            vec![0.0, 0.0, 1.0],
            vec![0.75, -20.0, 0.5, -6.0],
        )
    }

    fn sample_problems() -> Vec<(Vec<Vec<f64>>, Vec<f64>, Vec<f64>)> {
        vec![
            (vec![vec![2.0, 1.0], vec![1.0, 2.0]], vec![8.0, 8.0], vec![3.0, 5.0]),
            (
                vec![vec![1.0, 1.0, 1.0], vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
                vec![4.0, 3.0, 3.0],
                vec![3.0, 2.0, 1.0],
            ),
            (
                vec![vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0], vec![2.0, 3.0, 1.0]],
                vec![10.0, 15.0, 12.0],
                vec![2.0, 3.0, 4.0],
            ),
            beale(),
        ]
    }

    #[test]
    fn test_bounded_optimum() {
        // Maximize: 3x + 5y
        // Subject to:
        //   2x +  y <= 8
        //    x + 2y <= 8
        // Optimal: x = y = 8/3, obj = 64/3
        let result = solve(&[vec![2.0, 1.0], vec![1.0, 2.0]], &[8.0, 8.0], &[3.0, 5.0]);

        assert_eq!(result.status, Status::Optimal);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.message, "Optimal solution found.");
        let values = result.values.unwrap();
        assert_relative_eq!(values[0], 8.0 / 3.0, epsilon = EPS);
        assert_relative_eq!(values[1], 8.0 / 3.0, epsilon = EPS);
        assert_relative_eq!(result.objective_value.unwrap(), 64.0 / 3.0, epsilon = EPS);
    }

    #[test]
    fn test_unbounded() {
        let result = solve(&[vec![1.0, -1.0]], &[10.0], &[1.0, 1.0]);

        assert_eq!(result.status, Status::Unbounded);
        assert_eq!(result.iterations, 1);
        assert!(result.objective_value.is_none());
        assert!(result.values.is_none());
        assert!(result.analysis.is_none());
        assert!(result.message.contains("unbounded"), "message: {}", result.message);
    }

    #[test]
    fn test_negative_rhs_rejected() {
        let result = solve(&[vec![1.0, 1.0]], &[-5.0], &[1.0, 1.0]);

        assert_eq!(result.status, Status::Infeasible);
        assert_eq!(result.iterations, 0);
        assert!(result.message.contains("b[0]"), "message: {}", result.message);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = solve(&[vec![1.0, 1.0], vec![1.0]], &[8.0, 8.0], &[1.0, 1.0]);

        assert_eq!(result.status, Status::Malformed);
        assert_eq!(result.iterations, 0);
        assert!(result.message.contains("Row 1"), "message: {}", result.message);
    }

    #[test]
    fn test_malformed_inputs_never_trace() {
        let solver = Solver::new().with_trace(true);
        let cases: Vec<(Vec<Vec<f64>>, Vec<f64>, Vec<f64>)> = vec![
            (vec![], vec![], vec![]),
            (vec![vec![]], vec![1.0], vec![]),
            (vec![vec![1.0]], vec![1.0, 2.0], vec![1.0]),
            (vec![vec![1.0]], vec![1.0], vec![1.0, 2.0]),
            (vec![vec![1.0]], vec![-1.0], vec![1.0]),
            (vec![vec![1.0]], vec![1.0], vec![f64::NAN]),
            (vec![vec![1.0]], vec![1.0], vec![f64::INFINITY]),
        ];
        for (a, b, c) in cases {
            let result = solver.solve_dense(&a, &b, &c);
            assert_ne!(result.status, Status::Optimal);
            assert_eq!(result.iterations, 0);
            assert!(result.trace.is_empty());
        }
    }

    #[test]
    fn test_non_finite_costs_rejected() {
        for cost in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = solve(&[vec![1.0, 1.0]], &[4.0], &[1.0, cost]);

            assert_eq!(result.status, Status::Malformed);
            assert_eq!(result.iterations, 0);
            assert!(result.message.contains("Non-finite value in c"), "message: {}", result.message);
        }
    }

    #[test]
    fn test_origin_is_optimal() {
        let result = solve(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[5.0, 5.0], &[0.0, -1.0]);

        assert_eq!(result.status, Status::Optimal);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.values, Some(vec![0.0, 0.0]));
        assert_eq!(result.objective_value, Some(0.0));
    }

    #[test]
    fn test_degenerate_problem_terminates_with_both_rules() {
        let (a, b, c) = beale();
        for rule in [LeavingRule::RowOrder, LeavingRule::SmallestIndex] {
            let result = Solver::new()
                .with_leaving_rule(rule)
                .with_max_iterations(100)
                .solve_dense(&a, &b, &c);

            assert_eq!(result.status, Status::Optimal, "rule {:?}", rule);
            assert_relative_eq!(result.objective_value.unwrap(), 1.25, epsilon = EPS);
            let values = result.values.unwrap();
            assert_abs_diff_eq!(values[0], 1.0, epsilon = EPS);
            assert_abs_diff_eq!(values[2], 1.0, epsilon = EPS);
        }
    }

    #[test]
    fn test_iteration_limit() {
        let solver = Solver::new().with_max_iterations(1);
        let result = solver.solve_dense(&[vec![2.0, 1.0], vec![1.0, 2.0]], &[8.0, 8.0], &[3.0, 5.0]);

        assert_eq!(result.status, Status::IterationLimit);
        assert_eq!(result.iterations, 1);
        assert!(result.values.is_none());

        // A cap equal to the pivots needed still reaches the optimum
        let solver = Solver::new().with_max_iterations(2);
        let result = solver.solve_dense(&[vec![2.0, 1.0], vec![1.0, 2.0]], &[8.0, 8.0], &[3.0, 5.0]);
        assert_eq!(result.status, Status::Optimal);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_iteration_limit_keeps_unbounded_status() {
        // The second step finds no leaving row, so no pivot is cut off
        let a = [vec![1.0, -1.0]];
        let plain = solve(&a, &[10.0], &[1.0, 1.0]);
        let capped = Solver::new().with_max_iterations(1).solve_dense(&a, &[10.0], &[1.0, 1.0]);

        assert_eq!(plain.status, Status::Unbounded);
        assert_eq!(capped.status, Status::Unbounded);
        assert_eq!(capped.iterations, 1);
        assert_eq!(capped.message, plain.message);

        // A zero cap still stops the first pivot
        let result = Solver::new().with_max_iterations(0).solve_dense(&a, &[10.0], &[1.0, 1.0]);
        assert_eq!(result.status, Status::IterationLimit);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_trace_does_not_change_result() {
        let _ = env_logger::builder().is_test(true).try_init();

        for (a, b, c) in sample_problems() {
            let plain = Solver::new().solve_dense(&a, &b, &c);
            let traced = Solver::new().with_trace(true).solve_dense(&a, &b, &c);

            assert_eq!(plain.status, traced.status);
            assert_eq!(plain.iterations, traced.iterations);
            assert_eq!(plain.values, traced.values);
            assert_eq!(plain.objective_value, traced.objective_value);
            assert!(plain.trace.is_empty());
            assert_eq!(traced.trace.len(), traced.iterations + 1);
            assert_eq!(traced.trace[0].iteration, 0);
            assert!(traced.trace[0].entering.is_none());
        }
    }

    #[test]
    fn test_trace_steps_follow_pivots() {
        let problem = LpProblem::new(vec![vec![2.0, 1.0], vec![1.0, 2.0]], vec![8.0, 8.0], vec![3.0, 5.0]).unwrap();
        let mut steps: Vec<TraceStep> = Vec::new();
        let result = Solver::new().solve_with_sink(&problem, &mut steps);

        assert_eq!(result.iterations, 2);
        assert!(result.trace.is_empty());
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].basis, vec![2, 3]);
        assert_eq!((steps[1].entering, steps[1].leaving_row, steps[1].leaving), (Some(0), Some(0), Some(2)));
        assert_eq!(steps[1].basis, vec![0, 3]);
        assert_eq!((steps[2].entering, steps[2].leaving_row, steps[2].leaving), (Some(1), Some(1), Some(3)));
        assert_eq!(steps[2].basis, vec![0, 1]);
    }

    #[test]
    fn test_closure_sink_counts_steps() {
        let problem = LpProblem::new(vec![vec![1.0, -1.0]], vec![10.0], vec![1.0, 1.0]).unwrap();
        let mut count = 0;
        let result = Solver::new().solve_with_sink(&problem, &mut |_step: TraceStep| count += 1);

        assert_eq!(result.status, Status::Unbounded);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_deterministic() {
        for (a, b, c) in sample_problems() {
            let first = solve(&a, &b, &c);
            let second = solve(&a, &b, &c);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_feasibility_and_certificate() {
        let solver = Solver::new();
        for (a, b, c) in sample_problems() {
            let problem = LpProblem::new(a, b, c).unwrap();
            let result = solver.solve(&problem);
            assert_eq!(result.status, Status::Optimal);

            let x = result.values.as_ref().unwrap();
            assert!(problem.is_feasible(x, EPS), "infeasible point {:?}", x);

            let z = result.objective_value.unwrap();
            assert_abs_diff_eq!(problem.objective_at(x), z, epsilon = EPS);

            // No improving direction remains in the objective row
            let analysis = result.analysis.as_ref().unwrap();
            for rc in &analysis.reduced_costs {
                assert!(rc.reduced_cost >= -1e-12, "reduced cost {:?}", rc);
            }
            for sp in &analysis.shadow_prices {
                assert!(sp.value >= -1e-12, "shadow price {:?}", sp);
            }
        }
    }

    #[test]
    fn test_analysis() {
        // Maximize: 3x + 2y + z
        // Subject to:
        //   x + y + z <= 4
        //   x         <= 3
        //       y     <= 3
        // Optimal: x = 3, y = 1, z = 0, obj = 11
        let result = solve(
            &[vec![1.0, 1.0, 1.0], vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
            &[4.0, 3.0, 3.0],
            &[3.0, 2.0, 1.0],
        );

        assert_eq!(result.status, Status::Optimal);
        assert_relative_eq!(result.objective_value.unwrap(), 11.0, epsilon = EPS);
        let analysis = result.analysis.unwrap();

        assert_eq!(analysis.binding_constraints, vec![0, 1]);
        assert_abs_diff_eq!(analysis.slacks[2], 2.0, epsilon = EPS);

        assert_abs_diff_eq!(analysis.shadow_prices[0].value, 2.0, epsilon = EPS);
        assert_abs_diff_eq!(analysis.shadow_prices[1].value, 1.0, epsilon = EPS);
        assert_abs_diff_eq!(analysis.shadow_prices[2].value, 0.0, epsilon = EPS);
        assert_eq!(analysis.shadow_prices[2].interpretation, "Non-binding constraint");

        assert!(analysis.reduced_costs[0].is_basic);
        assert!(analysis.reduced_costs[1].is_basic);
        assert!(!analysis.reduced_costs[2].is_basic);
        assert_abs_diff_eq!(analysis.reduced_costs[2].reduced_cost, 1.0, epsilon = EPS);
    }
}
