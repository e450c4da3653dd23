//! Adaptive Dormand-Prince 5(4) solver used as the comparison oracle.
//!
//! Every requested output time is hit exactly by shortening the step that
//! would cross it, so the result lines up point for point with a fixed-step
//! trajectory on the same grid.

use crate::error::{IntegrationError, Result};
use crate::integrate::validate_initial_state;
use crate::traits::DynamicalSystem;
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};

const STAGES: usize = 7;

const C: [f64; STAGES] = [0., 1. / 5., 3. / 10., 4. / 5., 8. / 9., 1., 1.];

const A: [[f64; STAGES]; STAGES] = [
    [0., 0., 0., 0., 0., 0., 0.],
    [1. / 5., 0., 0., 0., 0., 0., 0.],
    [3. / 40., 9. / 40., 0., 0., 0., 0., 0.],
    [44. / 45., -56. / 15., 32. / 9., 0., 0., 0., 0.],
    [
        19372. / 6561.,
        -25360. / 2187.,
        64448. / 6561.,
        -212. / 729.,
        0.,
        0.,
        0.,
    ],
    [
        9017. / 3168.,
        -355. / 33.,
        46732. / 5247.,
        49. / 176.,
        -5103. / 18656.,
        0.,
        0.,
    ],
    [
        35. / 384.,
        0.,
        500. / 1113.,
        125. / 192.,
        -2187. / 6784.,
        11. / 84.,
        0.,
    ],
];

/// 5th order weights.
const B: [f64; STAGES] = [
    35. / 384.,
    0.,
    500. / 1113.,
    125. / 192.,
    -2187. / 6784.,
    11. / 84.,
    0.,
];

/// Embedded 4th order weights.
const B_STAR: [f64; STAGES] = [
    5179. / 57600.,
    0.,
    7571. / 16695.,
    393. / 640.,
    -92097. / 339200.,
    187. / 2100.,
    1. / 40.,
];

const ORDER: f64 = 5.0;
const SAFETY: f64 = 0.9;
const MIN_GROWTH: f64 = 0.2;
const MAX_GROWTH: f64 = 5.0;

/// Tolerances and work limit for the reference solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    pub rel_tol: f64,
    pub abs_tol: f64,
    /// Upper bound on attempted steps (accepted plus rejected).
    pub max_steps: usize,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            rel_tol: 1e-10,
            abs_tol: 1e-10,
            max_steps: 1_000_000,
        }
    }
}

impl ReferenceSettings {
    pub fn validate(&self) -> Result<()> {
        for tol in [self.rel_tol, self.abs_tol] {
            if !(tol > 0.0) || !tol.is_finite() {
                return Err(IntegrationError::InvalidTolerance(tol));
            }
        }
        if self.max_steps == 0 {
            return Err(IntegrationError::InvalidMaxSteps);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSolution {
    pub trajectory: Trajectory<f64>,
    pub evaluations: usize,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

/// Dormand-Prince 5(4) Solver with embedded error control
pub struct DormandPrince {
    settings: ReferenceSettings,
    k: [Vec<f64>; STAGES],
    tmp: Vec<f64>,
    next: Vec<f64>,
}

impl DormandPrince {
    pub fn new(dim: usize, settings: ReferenceSettings) -> Self {
        Self {
            settings,
            k: std::array::from_fn(|_| vec![0.0; dim]),
            tmp: vec![0.0; dim],
            next: vec![0.0; dim],
        }
    }

    /// Attempts one step of size `dt` from `(t, y)`.
    /// Leaves the 5th order result in `self.next` and returns the RMS-normalised error.
    fn attempt(&mut self, system: &impl DynamicalSystem<f64>, t: f64, y: &[f64], dt: f64) -> f64 {
        let dim = y.len();

        system.apply(t, y, &mut self.k[0]);
        for s in 1..STAGES {
            for i in 0..dim {
                let mut sum = 0.0;
                for j in 0..s {
                    sum += A[s][j] * self.k[j][i];
                }
                self.tmp[i] = y[i] + dt * sum;
            }
            system.apply(t + C[s] * dt, &self.tmp, &mut self.k[s]);
        }

        let mut sum_squares = 0.0;
        for i in 0..dim {
            let mut high = 0.0;
            let mut diff = 0.0;
            for s in 0..STAGES {
                high += B[s] * self.k[s][i];
                diff += (B[s] - B_STAR[s]) * self.k[s][i];
            }
            self.next[i] = y[i] + dt * high;
            let scale =
                self.settings.abs_tol + self.settings.rel_tol * y[i].abs().max(self.next[i].abs());
            sum_squares += (dt * diff / scale).powi(2);
        }
        (sum_squares / dim as f64).sqrt()
    }

    /// Integrates from `initial_state` at `times[0]`, recording the state at every entry of `times`.
    pub fn solve(
        &mut self,
        system: &impl DynamicalSystem<f64>,
        initial_state: &[f64],
        times: &[f64],
    ) -> Result<ReferenceSolution> {
        self.settings.validate()?;
        validate_initial_state(system, initial_state)?;
        validate_times(times)?;
        if self.tmp.len() != initial_state.len() {
            *self = Self::new(initial_state.len(), self.settings);
        }

        let mut trajectory = Trajectory::with_initial(initial_state, times.len());
        let mut y = initial_state.to_vec();
        let mut t = times[0];
        let mut h = times.get(1).map_or(0.0, |next| next - t);
        let mut accepted_steps = 0usize;
        let mut rejected_steps = 0usize;

        for (index, &target) in times.iter().enumerate().skip(1) {
            while t < target {
                if accepted_steps + rejected_steps >= self.settings.max_steps {
                    return Err(IntegrationError::MaxStepsExceeded {
                        max_steps: self.settings.max_steps,
                        time: t,
                    });
                }

                let remaining = target - t;
                let landing = h >= remaining;
                let dt = if landing { remaining } else { h };
                if !landing && dt <= f64::EPSILON * t.abs().max(1.0) {
                    return Err(IntegrationError::StepSizeUnderflow { time: t });
                }

                let error = self.attempt(system, t, &y, dt);
                let factor = growth_factor(error);

                // NaN fails every comparison, so non-finite estimates are accepted here.
                if !(error > 1.0) || error.is_infinite() {
                    y.copy_from_slice(&self.next);
                    accepted_steps += 1;
                    if landing {
                        t = target;
                        h = h.max(dt * factor);
                    } else {
                        t += dt;
                        h = dt * factor;
                    }
                } else {
                    rejected_steps += 1;
                    h = dt * factor;
                }
            }
            trajectory.point_mut(index).copy_from_slice(&y);
        }

        Ok(ReferenceSolution {
            trajectory,
            evaluations: STAGES * (accepted_steps + rejected_steps),
            accepted_steps,
            rejected_steps,
        })
    }
}

fn validate_times(times: &[f64]) -> Result<()> {
    if times.is_empty() || times.iter().any(|t| !t.is_finite()) {
        return Err(IntegrationError::InvalidTimeGrid);
    }
    if times.windows(2).any(|pair| !(pair[1] > pair[0])) {
        return Err(IntegrationError::InvalidTimeGrid);
    }
    Ok(())
}

/// Step size multiplier for a normalised error estimate.
fn growth_factor(error: f64) -> f64 {
    if !error.is_finite() {
        1.0
    } else if error == 0.0 {
        MAX_GROWTH
    } else {
        (SAFETY * error.powf(-1.0 / ORDER)).clamp(MIN_GROWTH, MAX_GROWTH)
    }
}

/// Solves `system` on the output grid `times` with a fresh [`DormandPrince`] solver.
pub fn solve(
    system: &impl DynamicalSystem<f64>,
    initial_state: &[f64],
    times: &[f64],
    settings: ReferenceSettings,
) -> Result<ReferenceSolution> {
    DormandPrince::new(initial_state.len(), settings).solve(system, initial_state, times)
}
