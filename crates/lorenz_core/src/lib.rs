pub mod comparison;
pub mod error;
pub mod integrate;
pub mod lorenz;
pub mod reference;
pub mod solvers;
pub mod trajectory;
/// The `lorenz_core` crate integrates the Lorenz system with fixed-step schemes.
/// The vector field and the integrators are generic over the scalar type, so
/// `f32` and `f64` both work.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (ODEs), `Steppable` (Solvers).
/// - **Lorenz**: the vector field and its parameters.
/// - **Solvers**: Euler and RK4 steppers behind the `FixedStepMethod` tag.
/// - **Reference**: an adaptive Dormand-Prince solver that serves as the comparison oracle.
/// - **Comparison**: runs every method on one time grid and labels the results for plotting.
pub mod traits;

pub use comparison::{run_comparison, run_method, Comparison, Method, RunConfig, Series};
pub use error::IntegrationError;
pub use integrate::{euler, integrate, runge_kutta4, Solution};
pub use lorenz::{Lorenz, LorenzParameters};
pub use reference::{DormandPrince, ReferenceSettings, ReferenceSolution};
pub use solvers::FixedStepMethod;
pub use trajectory::{StepConfig, Trajectory};
