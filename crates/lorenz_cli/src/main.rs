mod plot;

use anyhow::{Context, Result};
use clap::Parser;
use lorenz_core::{
    run_comparison, LorenzParameters, ReferenceSettings, RunConfig, StepConfig,
};
use std::path::PathBuf;
use std::time::Instant;

/// Integrate the Lorenz system with Euler and Runge-Kutta 4 and compare both
/// against an adaptive reference solver.
#[derive(Parser, Debug)]
#[command(name = "lorenz", version, about)]
struct Args {
    #[arg(long, default_value_t = 28.0)]
    rho: f64,

    #[arg(long, default_value_t = 10.0)]
    sigma: f64,

    #[arg(long, default_value_t = 8.0 / 3.0)]
    beta: f64,

    /// Initial state as three values: X Y Z
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        default_values_t = [-1.0, 3.0, 4.0]
    )]
    initial: Vec<f64>,

    /// Fixed step size shared by every method
    #[arg(long, default_value_t = 0.025)]
    step_size: f64,

    /// Number of trajectory points, including the initial state
    #[arg(long, default_value_t = 3000)]
    steps: usize,

    /// Relative tolerance of the reference solver
    #[arg(long, default_value_t = 1e-10)]
    rel_tol: f64,

    /// Absolute tolerance of the reference solver
    #[arg(long, default_value_t = 1e-10)]
    abs_tol: f64,

    /// Directory the SVG figures are written to
    #[arg(long, default_value = "figures")]
    output_dir: PathBuf,

    /// Skip rendering and only print the run summary
    #[arg(long)]
    no_plot: bool,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        let initial_state: [f64; 3] = self
            .initial
            .as_slice()
            .try_into()
            .with_context(|| format!("Expected 3 initial values, got {}", self.initial.len()))?;

        Ok(RunConfig {
            parameters: LorenzParameters {
                rho: self.rho,
                sigma: self.sigma,
                beta: self.beta,
            },
            initial_state,
            step: StepConfig {
                step_size: self.step_size,
                steps: self.steps,
            },
            reference: ReferenceSettings {
                rel_tol: self.rel_tol,
                abs_tol: self.abs_tol,
                ..ReferenceSettings::default()
            },
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.run_config()?;
    config.validate().context("Invalid run configuration")?;

    println!(
        "Integrating {} points with step size {} (t = 0 .. {})",
        config.step.steps,
        config.step.step_size,
        config.step.span()
    );

    let started = Instant::now();
    let comparison = run_comparison(&config).context("Integration failed")?;
    println!("Finished in {:.2?}", started.elapsed());

    for series in &comparison.series {
        let last = series.last().unwrap_or([f64::NAN; 3]);
        println!(
            "  {:<14} {:>8} evaluations, final state ({:.6}, {:.6}, {:.6})",
            series.label, series.evaluations, last[0], last[1], last[2]
        );
        let skipped = plot::non_finite_points(series);
        if skipped > 0 {
            println!(
                "  {:<14} {} of {} points are non-finite",
                series.label,
                skipped,
                series.points.len()
            );
        }
    }
    for (method, error) in comparison.endpoint_errors() {
        println!("  {:<14} endpoint deviation from reference: {:.3e}", method.label(), error);
    }

    if args.no_plot {
        return Ok(());
    }

    let paths = plot::render_all(&comparison, &args.output_dir)?;
    for path in paths {
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}
