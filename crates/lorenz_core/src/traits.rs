use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in our dynamical systems.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + Send + Sync + 'static {}

impl<T: Float + FromPrimitive + Debug + Send + Sync + 'static> Scalar for T {}

/// Converts an `f64` constant into the scalar type.
/// Every `Float` type accepts an `f64`, so the NaN fallback is never hit for `f32`/`f64`.
pub(crate) fn constant<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// Simulated time of step `index` on a uniform grid, computed as `index * step_size`
/// so that long runs do not accumulate rounding from repeated addition.
pub(crate) fn grid_time<T: Scalar>(index: usize, step_size: T) -> T {
    T::from_usize(index).unwrap_or_else(T::nan) * step_size
}

/// Represents a continuous-time dynamical system.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// t: current time
    /// x: current state
    /// out: buffer to write dx/dt into
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    /// dt: step size
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);

    /// Number of vector-field evaluations one call to `step` performs.
    fn evaluations_per_step(&self) -> usize;
}
