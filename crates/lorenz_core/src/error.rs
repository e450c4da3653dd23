use thiserror::Error;

/// Failures raised before or during an integration run.
///
/// Everything up to `InvalidTimeGrid` rejects invalid arguments up front. The
/// remaining variants only come from the adaptive reference solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    #[error("step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    #[error("step count must be at least 1")]
    InvalidStepCount,

    #[error("initial state has dimension {found}, but the system expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("state space must have positive dimension")]
    EmptyState,

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("step limit must be at least 1")]
    InvalidMaxSteps,

    #[error("output times must be non-empty, finite and strictly increasing")]
    InvalidTimeGrid,

    #[error("step size underflow at t = {time}")]
    StepSizeUnderflow { time: f64 },

    #[error("exceeded {max_steps} solver steps before reaching t = {time}")]
    MaxStepsExceeded { max_steps: usize, time: f64 },
}

impl IntegrationError {
    /// True for errors caused by the caller's arguments rather than by the solve itself.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            IntegrationError::InvalidStepSize(_)
                | IntegrationError::InvalidStepCount
                | IntegrationError::DimensionMismatch { .. }
                | IntegrationError::EmptyState
                | IntegrationError::InvalidTolerance(_)
                | IntegrationError::InvalidMaxSteps
                | IntegrationError::InvalidTimeGrid
        )
    }
}

pub type Result<T, E = IntegrationError> = std::result::Result<T, E>;
