use crate::traits::{constant, DynamicalSystem, Scalar, Steppable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Explicit (forward) Euler Solver
pub struct Euler<T: Scalar> {
    rate: Vec<T>,
}

impl<T: Scalar> Euler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            rate: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Euler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;

        // y_next = y + dt * f(t, y)
        system.apply(t0, state, &mut self.rate);
        for i in 0..state.len() {
            state[i] = state[i] + dt * self.rate[i];
        }

        *t = t0 + dt;
    }

    fn evaluations_per_step(&self) -> usize {
        1
    }
}

/// Classic Runge-Kutta 4th Order Solver
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            k3: vec![T::zero(); dim],
            k4: vec![T::zero(); dim],
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let two: T = constant(2.0);
        let six: T = constant(6.0);

        let t0 = *t;
        let half_dt = dt / two;

        // k1 = f(t, y)
        system.apply(t0, state, &mut self.k1);

        // k2 = f(t + dt/2, y + dt*k1/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k1[i] / two;
        }
        system.apply(t0 + half_dt, &self.tmp, &mut self.k2);

        // k3 = f(t + dt/2, y + dt*k2/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k2[i] / two;
        }
        system.apply(t0 + half_dt, &self.tmp, &mut self.k3);

        // k4 = f(t + dt, y + dt*k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(t0 + dt, &self.tmp, &mut self.k4);

        // y_next = y + dt * (k1 + 2k2 + 2k3 + k4) / 6
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]) / six;
        }

        *t = t0 + dt;
    }

    fn evaluations_per_step(&self) -> usize {
        4
    }
}

/// The fixed-step schemes available to [`crate::integrate::integrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedStepMethod {
    Euler,
    RungeKutta4,
}

impl FixedStepMethod {
    pub const ALL: [FixedStepMethod; 2] = [FixedStepMethod::Euler, FixedStepMethod::RungeKutta4];

    /// Display label used in plot legends.
    pub fn label(self) -> &'static str {
        match self {
            FixedStepMethod::Euler => "Euler",
            FixedStepMethod::RungeKutta4 => "Runge Kutta",
        }
    }

    /// Formal order of accuracy of the global error.
    pub fn order(self) -> u32 {
        match self {
            FixedStepMethod::Euler => 1,
            FixedStepMethod::RungeKutta4 => 4,
        }
    }

    pub(crate) fn build<T: Scalar>(self, dim: usize) -> FixedStepper<T> {
        match self {
            FixedStepMethod::Euler => FixedStepper::Euler(Euler::new(dim)),
            FixedStepMethod::RungeKutta4 => FixedStepper::Rk4(RK4::new(dim)),
        }
    }
}

impl fmt::Display for FixedStepMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FixedStepMethod {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "euler" => Ok(FixedStepMethod::Euler),
            "rk4" | "runge_kutta4" | "runge-kutta" => Ok(FixedStepMethod::RungeKutta4),
            _ => Err(format!("Unknown fixed-step method '{name}'")),
        }
    }
}

pub(crate) enum FixedStepper<T: Scalar> {
    Euler(Euler<T>),
    Rk4(RK4<T>),
}

impl<T: Scalar> FixedStepper<T> {
    pub(crate) fn step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: &mut T,
        state: &mut [T],
        dt: T,
    ) {
        match self {
            FixedStepper::Euler(s) => s.step(system, t, state, dt),
            FixedStepper::Rk4(s) => s.step(system, t, state, dt),
        }
    }

    pub(crate) fn evaluations_per_step(&self) -> usize {
        match self {
            FixedStepper::Euler(s) => s.evaluations_per_step(),
            FixedStepper::Rk4(s) => s.evaluations_per_step(),
        }
    }
}
