use crate::problem::LpProblem;

/// How ties in the minimum ratio test are broken
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeavingRule {
    /// First row in row order wins a tie
    #[default]
    RowOrder,
    /// Row whose basic variable has the smallest index wins a tie (full Bland's rule)
    SmallestIndex,
}

/// Dense simplex tableau with its basis.
///
/// Layout is `m + 1` rows by `n + m + 1` columns: structural variables, then one
/// slack per constraint, then the right-hand side. The last row is the
/// objective row, holding reduced costs in the "non-negative at optimum"
/// convention. After every pivot, column `basis[i]` is the unit vector `e_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basis: Vec<usize>,
    n_vars: usize,
    n_constraints: usize,
}

impl Tableau {
    /// Build `[A | I | b]` over `[-c | 0 | 0]` with the slacks as starting basis
    pub fn new(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();
        let total_cols = n_vars + n_constraints + 1;

        let mut data = vec![vec![0.0; total_cols]; n_constraints + 1];

        for (i, (row, &rhs)) in problem.matrix().iter().zip(problem.rhs()).enumerate() {
            data[i][..n_vars].copy_from_slice(row);
            data[i][n_vars + i] = 1.0;
            data[i][total_cols - 1] = rhs;
        }

        for (j, &cost) in problem.costs().iter().enumerate() {
            data[n_constraints][j] = -cost;
        }

        Self {
            data,
            basis: (n_vars..n_vars + n_constraints).collect(),
            n_vars,
            n_constraints,
        }
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn n_constraints(&self) -> usize {
        self.n_constraints
    }

    pub fn rhs_col(&self) -> usize {
        self.n_vars + self.n_constraints
    }

    pub fn objective_row(&self) -> usize {
        self.n_constraints
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    /// Non-RHS entries of the objective row
    pub fn reduced_costs(&self) -> &[f64] {
        &self.data[self.objective_row()][..self.rhs_col()]
    }

    /// Entering column by Bland's rule: the smallest index whose reduced cost is
    /// below `-tolerance`. `None` means the tableau is optimal.
    pub fn entering_column(&self, tolerance: f64) -> Option<usize> {
        self.reduced_costs().iter().position(|&v| v < -tolerance)
    }

    /// Leaving row by the minimum ratio test on column `col`.
    ///
    /// Rows with a coefficient at or below `tolerance` are ineligible. A ratio
    /// only replaces the incumbent when it is smaller by more than `tolerance`;
    /// anything closer is a tie, resolved by `rule`. `None` means the objective
    /// is unbounded along `col`.
    pub fn leaving_row(&self, col: usize, tolerance: f64, rule: LeavingRule) -> Option<usize> {
        let rhs_col = self.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..self.n_constraints {
            let val = self.data[i][col];
            if val <= tolerance {
                continue;
            }
            let ratio = self.data[i][rhs_col] / val;

            match min_row {
                Some(best) if ratio >= min_ratio - tolerance => {
                    let tied = ratio <= min_ratio + tolerance;
                    // Ties keep the incumbent ratio so near-ties cannot drift
                    if tied && rule == LeavingRule::SmallestIndex && self.basis[i] < self.basis[best] {
                        min_row = Some(i);
                    }
                }
                _ => {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row
    }

    /// Gauss-Jordan step on `(row, col)`: scale the pivot row to a unit pivot,
    /// eliminate `col` from every other row (objective row included) and make
    /// `col` the basic variable of `row`. Rows whose factor is within
    /// `zero_tolerance` of zero are left untouched.
    pub fn pivot(&mut self, row: usize, col: usize, zero_tolerance: f64) {
        let pivot_val = self.data[row][col];
        for v in self.data[row].iter_mut() {
            *v /= pivot_val;
        }

        let pivot_row = self.data[row].clone();
        for (i, target) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = target[col];
            if factor.abs() <= zero_tolerance {
                continue;
            }
            for (v, p) in target.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
        }

        self.basis[row] = col;
    }

    /// Current basic solution restricted to the structural variables
    pub fn point(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        let mut values = vec![0.0; self.n_vars];
        for (i, &basic) in self.basis.iter().enumerate() {
            if basic < self.n_vars {
                values[basic] = self.data[i][rhs_col];
            }
        }
        values
    }

    /// Current slack values bᵢ - Aᵢx, read from the rows where slacks are basic
    pub fn slacks(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        let mut values = vec![0.0; self.n_constraints];
        for (i, &basic) in self.basis.iter().enumerate() {
            if basic >= self.n_vars {
                values[basic - self.n_vars] = self.data[i][rhs_col];
            }
        }
        values
    }

    /// Objective value of the current basic solution
    pub fn objective_value(&self) -> f64 {
        self.data[self.objective_row()][self.rhs_col()]
    }
}
