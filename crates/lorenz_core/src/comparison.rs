//! Runs the fixed-step schemes and the reference solver side by side on one time grid.

use crate::error::Result;
use crate::integrate::integrate;
use crate::lorenz::{Lorenz, LorenzParameters};
use crate::reference::{self, ReferenceSettings};
use crate::solvers::FixedStepMethod;
use crate::trajectory::{StepConfig, Trajectory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const REFERENCE_LABEL: &str = "ODE Integrate";

/// Everything needed for one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub parameters: LorenzParameters,
    pub initial_state: [f64; 3],
    pub step: StepConfig,
    pub reference: ReferenceSettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parameters: LorenzParameters::default(),
            initial_state: [-1.0, 3.0, 4.0],
            step: StepConfig::default(),
            reference: ReferenceSettings::default(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        self.step.validate()?;
        self.reference.validate()
    }

    pub fn system(&self) -> Lorenz<f64> {
        Lorenz::from_parameters(&self.parameters)
    }
}

/// A trajectory source taking part in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Fixed(FixedStepMethod),
    Reference,
}

impl Method {
    pub const ALL: [Method; 3] = [
        Method::Fixed(FixedStepMethod::Euler),
        Method::Fixed(FixedStepMethod::RungeKutta4),
        Method::Reference,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Method::Fixed(method) => method.label(),
            Method::Reference => REFERENCE_LABEL,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "reference" | "ode" | "odeint" => Ok(Method::Reference),
            _ => name
                .parse::<FixedStepMethod>()
                .map(Method::Fixed)
                .map_err(|_| format!("Unknown method '{name}'")),
        }
    }
}

/// One labelled trajectory ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub method: Method,
    pub evaluations: usize,
    pub points: Vec<[f64; 3]>,
}

impl Series {
    fn from_trajectory(method: Method, trajectory: &Trajectory<f64>, evaluations: usize) -> Self {
        Self {
            label: method.label().to_string(),
            method,
            evaluations,
            points: trajectory.iter().map(|p| [p[0], p[1], p[2]]).collect(),
        }
    }

    pub fn last(&self) -> Option<[f64; 3]> {
        self.points.last().copied()
    }
}

/// Trajectories of every method on a shared time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub times: Vec<f64>,
    pub series: Vec<Series>,
}

impl Comparison {
    pub fn series(&self, method: Method) -> Option<&Series> {
        self.series.iter().find(|s| s.method == method)
    }

    pub fn reference(&self) -> Option<&Series> {
        self.series(Method::Reference)
    }

    /// Largest componentwise deviation from the reference over the first `points` points.
    /// NaN once either trajectory has left the finite range.
    pub fn max_deviation(&self, method: Method, points: usize) -> Option<f64> {
        let series = self.series(method)?;
        let reference = self.reference()?;
        Some(
            series
                .points
                .iter()
                .zip(&reference.points)
                .take(points)
                .map(|(a, b)| max_abs_difference(a, b))
                .fold(0.0, nan_max),
        )
    }

    /// Final-point deviation from the reference for every non-reference series.
    pub fn endpoint_errors(&self) -> Vec<(Method, f64)> {
        let Some(reference) = self.reference().and_then(Series::last) else {
            return Vec::new();
        };
        self.series
            .iter()
            .filter(|s| s.method != Method::Reference)
            .filter_map(|s| s.last().map(|p| (s.method, max_abs_difference(&p, &reference))))
            .collect()
    }
}

fn max_abs_difference(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, nan_max)
}

/// Like `f64::max`, but a NaN operand wins.
fn nan_max(acc: f64, value: f64) -> f64 {
    if acc.is_nan() || value.is_nan() {
        f64::NAN
    } else {
        acc.max(value)
    }
}

/// Runs a single method on the configured grid.
pub fn run_method(config: &RunConfig, method: Method) -> Result<Series> {
    config.validate()?;
    let system = config.system();
    match method {
        Method::Fixed(scheme) => {
            let solution = integrate(scheme, &system, &config.initial_state, &config.step)?;
            Ok(Series::from_trajectory(
                method,
                &solution.trajectory,
                solution.evaluations,
            ))
        }
        Method::Reference => {
            let times = config.step.times();
            let solution =
                reference::solve(&system, &config.initial_state, &times, config.reference)?;
            Ok(Series::from_trajectory(
                method,
                &solution.trajectory,
                solution.evaluations,
            ))
        }
    }
}

/// Runs Euler, Runge-Kutta and the reference solver on the configured grid.
///
/// With the `parallel` feature the three runs execute concurrently; they share
/// nothing but the read-only configuration.
pub fn run_comparison(config: &RunConfig) -> Result<Comparison> {
    config.validate()?;
    let [euler, rk4, reference] = Method::ALL;

    #[cfg(feature = "parallel")]
    let ((euler, rk4), reference) = rayon::join(
        || {
            rayon::join(
                || run_method(config, euler),
                || run_method(config, rk4),
            )
        },
        || run_method(config, reference),
    );

    #[cfg(not(feature = "parallel"))]
    let (euler, rk4, reference) = (
        run_method(config, euler),
        run_method(config, rk4),
        run_method(config, reference),
    );

    Ok(Comparison {
        times: config.step.times(),
        series: vec![euler?, rk4?, reference?],
    })
}
