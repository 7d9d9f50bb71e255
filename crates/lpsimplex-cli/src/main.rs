use clap::{Parser, Subcommand};
use lpsimplex_solver::{LeavingRule, LpProblem, SimplexResult, Solver, Status, TraceStep};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lpsimplex")]
#[command(about = "Tableau simplex solver for max cᵀx s.t. Ax <= b, x >= 0", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the result
    Solve {
        /// JSON file with `a`, `b` and `c`
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Print the tableau after every pivot
        #[arg(short, long)]
        trace: bool,
        /// Stop after this many pivots
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Break ratio ties by smallest basic variable index
        #[arg(long)]
        bland: bool,
    },
    /// Check a problem file for shape and sign errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Solve the built-in example: max 3x1 + 5x2 s.t. 2x1 + x2 <= 8, x1 + 2x2 <= 8
    Demo {
        /// Print the tableau after every pivot
        #[arg(short, long)]
        trace: bool,
    },
}

/// Problem file contents, validated only when turned into an `LpProblem`
#[derive(Debug, Deserialize)]
struct ProblemFile {
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
    /// Optional variable names for the report
    #[serde(default)]
    variables: Vec<String>,
    /// Optional constraint names for the report
    #[serde(default)]
    constraints: Vec<String>,
}

impl ProblemFile {
    fn demo() -> Self {
        Self {
            a: vec![vec![2.0, 1.0], vec![1.0, 2.0]],
            b: vec![8.0, 8.0],
            c: vec![3.0, 5.0],
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    fn variable_name(&self, j: usize) -> String {
        self.variables.get(j).cloned().unwrap_or_else(|| format!("x{}", j + 1))
    }

    fn constraint_name(&self, i: usize) -> String {
        self.constraints.get(i).cloned().unwrap_or_else(|| format!("c{}", i + 1))
    }
}

fn load(file: &Path) -> ProblemFile {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::from_str(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_result(problem: &ProblemFile, result: &SimplexResult) {
    println!("Status: {}", result.status.as_str().to_uppercase());
    println!("Iterations: {}", result.iterations);
    println!("Message: {}", result.message);

    if let (Some(z), Some(values)) = (result.objective_value, result.values.as_ref()) {
        println!("Optimal value z* = {:.6}", z);
        println!();
        println!("Variables:");
        for (j, v) in values.iter().enumerate() {
            println!("  {:20} {:14.6}", problem.variable_name(j), v);
        }
    }

    if let Some(analysis) = &result.analysis {
        println!();
        println!("Constraints:");
        for (i, sp) in analysis.shadow_prices.iter().enumerate() {
            let binding = if analysis.binding_constraints.contains(&i) { "binding" } else { "" };
            println!(
                "  {:20} slack {:12.6}  shadow price {:10.4}  {}",
                problem.constraint_name(i),
                analysis.slacks[i],
                sp.value,
                binding
            );
        }
    }
}

fn run(problem: &ProblemFile, solver: &Solver, format: &str, trace: bool) {
    let validated = match LpProblem::new(problem.a.clone(), problem.b.clone(), problem.c.clone()) {
        Ok(p) => p,
        Err(e) => {
            let result = SimplexResult::terminal(e.status(), 0, e.to_string());
            report(problem, &result, format);
            std::process::exit(1);
        }
    };

    let result = if trace && format != "json" {
        let mut print_step = |step: TraceStep| {
            println!("{}", step);
            println!();
        };
        solver.solve_with_sink(&validated, &mut print_step)
    } else {
        solver.clone().with_trace(trace).solve(&validated)
    };

    report(problem, &result, format);
    if result.status != Status::Optimal {
        std::process::exit(1);
    }
}

fn report(problem: &ProblemFile, result: &SimplexResult, format: &str) {
    if format == "json" {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_result(problem, result);
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            format,
            trace,
            max_iterations,
            bland,
        } => {
            if format != "json" && format != "pretty" {
                eprintln!("Unknown format: {} (expected json or pretty)", format);
                std::process::exit(1);
            }

            let problem = load(&file);
            log::debug!("loaded {}", file.display());

            let mut solver = Solver::new();
            if let Some(max) = max_iterations {
                solver = solver.with_max_iterations(max);
            }
            if bland {
                solver = solver.with_leaving_rule(LeavingRule::SmallestIndex);
            }

            run(&problem, &solver, &format, trace);
        }
        Commands::Check { file } => {
            let problem = load(&file);
            match lpsimplex_solver::validate(&problem.a, &problem.b, &problem.c) {
                Ok(()) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} constraints", problem.b.len());
                    println!("  {} variables", problem.c.len());
                }
                Err(e) => {
                    eprintln!("✗ {} is {}:", file.display(), e.status());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Demo { trace } => {
            run(&ProblemFile::demo(), &Solver::new(), "pretty", trace);
        }
    }
}
