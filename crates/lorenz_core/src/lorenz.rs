use crate::traits::{constant, DynamicalSystem, Scalar};
use serde::{Deserialize, Serialize};

/// Parameters of the Lorenz system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzParameters {
    pub rho: f64,
    pub sigma: f64,
    pub beta: f64,
}

impl Default for LorenzParameters {
    fn default() -> Self {
        Self {
            rho: 28.0,
            sigma: 10.0,
            beta: 8.0 / 3.0,
        }
    }
}

/// The Lorenz vector field
///
/// ```text
/// dx/dt = sigma * (y - x)
/// dy/dt = x * (rho - z) - y
/// dz/dt = x * y - beta * z
/// ```
///
/// The field is autonomous: the time argument of `apply` is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lorenz<T: Scalar> {
    pub rho: T,
    pub sigma: T,
    pub beta: T,
}

impl<T: Scalar> Lorenz<T> {
    pub fn new(rho: T, sigma: T, beta: T) -> Self {
        Self { rho, sigma, beta }
    }

    pub fn from_parameters(parameters: &LorenzParameters) -> Self {
        Self {
            rho: constant(parameters.rho),
            sigma: constant(parameters.sigma),
            beta: constant(parameters.beta),
        }
    }

    /// Derivative at `state`, for callers holding a fixed-size state.
    pub fn derivative(&self, state: [T; 3]) -> [T; 3] {
        let mut out = [T::zero(); 3];
        self.apply(T::zero(), &state, &mut out);
        out
    }
}

impl Default for Lorenz<f64> {
    fn default() -> Self {
        Self::from_parameters(&LorenzParameters::default())
    }
}

impl<T: Scalar> DynamicalSystem<T> for Lorenz<T> {
    fn dimension(&self) -> usize {
        3
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let (x, y, z) = (x[0], x[1], x[2]);
        out[0] = self.sigma * (y - x);
        out[1] = x * (self.rho - z) - y;
        out[2] = x * y - self.beta * z;
    }
}
