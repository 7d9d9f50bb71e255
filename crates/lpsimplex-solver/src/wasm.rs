//! WASM bindings for the solver
//!
//! Requests are plain JS objects `{ a, b, c, trace?, maxIterations?, bland? }`.

use wasm_bindgen::prelude::*;

use crate::simplex::Solver;
use crate::solution::SimplexResult;
use crate::tableau::LeavingRule;

/// Problem and solver options as sent from JavaScript
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolveRequest {
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
    #[serde(default)]
    trace: bool,
    #[serde(default)]
    max_iterations: Option<usize>,
    #[serde(default)]
    bland: bool,
}

impl SolveRequest {
    fn solver(&self) -> Solver {
        let mut solver = Solver::new().with_trace(self.trace);
        if let Some(max) = self.max_iterations {
            solver = solver.with_max_iterations(max);
        }
        if self.bland {
            solver = solver.with_leaving_rule(LeavingRule::SmallestIndex);
        }
        solver
    }

    fn run(&self) -> SimplexResult {
        self.solver().solve_dense(&self.a, &self.b, &self.c)
    }
}

/// Solve a problem and return the result as a JS object
#[wasm_bindgen]
pub fn solve(request: JsValue) -> Result<JsValue, JsValue> {
    let request: SolveRequest =
        serde_wasm_bindgen::from_value(request).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let result = request.run();
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Validate a problem; returns `null` when valid, otherwise the violated check
#[wasm_bindgen]
pub fn validate(request: JsValue) -> Result<JsValue, JsValue> {
    let request: SolveRequest =
        serde_wasm_bindgen::from_value(request).map_err(|e| JsValue::from_str(&e.to_string()))?;
    match crate::problem::validate(&request.a, &request.b, &request.c) {
        Ok(()) => Ok(JsValue::NULL),
        Err(e) => Ok(JsValue::from_str(&e.to_string())),
    }
}
