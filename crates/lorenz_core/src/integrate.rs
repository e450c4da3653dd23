use crate::error::{IntegrationError, Result};
use crate::solvers::FixedStepMethod;
use crate::traits::{DynamicalSystem, Scalar};
use crate::trajectory::{StepConfig, Trajectory};

/// A completed integration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<T> {
    pub trajectory: Trajectory<T>,
    /// Number of vector-field evaluations performed.
    pub evaluations: usize,
}

pub(crate) fn validate_initial_state<T: Scalar>(
    system: &impl DynamicalSystem<T>,
    initial_state: &[T],
) -> Result<()> {
    let expected = system.dimension();
    if initial_state.len() != expected {
        return Err(IntegrationError::DimensionMismatch {
            expected,
            found: initial_state.len(),
        });
    }
    if expected == 0 {
        return Err(IntegrationError::EmptyState);
    }
    Ok(())
}

/// Integrates `system` from `initial_state` with a fixed-step scheme.
///
/// The returned trajectory holds exactly `config.steps` points. Point `i` is
/// computed from point `i - 1` at time `(i - 1) * step_size`. Non-finite values
/// are not trapped and carry through the rest of the trajectory.
pub fn integrate<T, S>(
    method: FixedStepMethod,
    system: &S,
    initial_state: &[T],
    config: &StepConfig<T>,
) -> Result<Solution<T>>
where
    T: Scalar,
    S: DynamicalSystem<T>,
{
    config.validate()?;
    validate_initial_state(system, initial_state)?;

    let mut trajectory = Trajectory::with_initial(initial_state, config.steps);
    let mut stepper = method.build(initial_state.len());

    for index in 1..config.steps {
        let mut t = config.time_at(index - 1);
        let (previous, next) = trajectory.split_step(index);
        next.copy_from_slice(previous);
        stepper.step(system, &mut t, next, config.step_size);
    }

    Ok(Solution {
        trajectory,
        evaluations: (config.steps - 1) * stepper.evaluations_per_step(),
    })
}

pub fn euler<T, S>(system: &S, initial_state: &[T], config: &StepConfig<T>) -> Result<Solution<T>>
where
    T: Scalar,
    S: DynamicalSystem<T>,
{
    integrate(FixedStepMethod::Euler, system, initial_state, config)
}

pub fn runge_kutta4<T, S>(
    system: &S,
    initial_state: &[T],
    config: &StepConfig<T>,
) -> Result<Solution<T>>
where
    T: Scalar,
    S: DynamicalSystem<T>,
{
    integrate(FixedStepMethod::RungeKutta4, system, initial_state, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lorenz::Lorenz;
    use approx::assert_relative_eq;
    use std::cell::{Cell, RefCell};

    const INITIAL: [f64; 3] = [-1.0, 3.0, 4.0];

    /// Lorenz field that counts evaluations and records the times it was called at.
    struct Recording {
        inner: Lorenz<f64>,
        calls: Cell<usize>,
        times: RefCell<Vec<f64>>,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                inner: Lorenz::default(),
                calls: Cell::new(0),
                times: RefCell::new(Vec::new()),
            }
        }
    }

    impl DynamicalSystem<f64> for Recording {
        fn dimension(&self) -> usize {
            3
        }

        fn apply(&self, t: f64, x: &[f64], out: &mut [f64]) {
            self.calls.set(self.calls.get() + 1);
            self.times.borrow_mut().push(t);
            self.inner.apply(t, x, out);
        }
    }

    fn config(step_size: f64, steps: usize) -> StepConfig {
        StepConfig { step_size, steps }
    }

    #[test]
    fn first_point_is_initial_state_for_every_step_count() {
        let lorenz = Lorenz::default();
        for method in FixedStepMethod::ALL {
            for steps in [1, 2, 7, 100] {
                let solution = integrate(method, &lorenz, &INITIAL, &config(0.025, steps))
                    .expect("integration should succeed");
                assert_eq!(solution.trajectory.len(), steps);
                assert_eq!(solution.trajectory.first(), &INITIAL);
            }
        }
    }

    #[test]
    fn single_step_count_evaluates_nothing() {
        for method in FixedStepMethod::ALL {
            let system = Recording::new();
            let solution = integrate(method, &system, &INITIAL, &config(0.025, 1))
                .expect("integration should succeed");
            assert_eq!(system.calls.get(), 0);
            assert_eq!(solution.evaluations, 0);
            assert_eq!(solution.trajectory.len(), 1);
            assert_eq!(solution.trajectory.first(), &INITIAL);
        }
    }

    #[test]
    fn evaluation_counts_match_scheme() {
        let system = Recording::new();
        let solution = euler(&system, &INITIAL, &config(0.01, 11)).expect("euler");
        assert_eq!(system.calls.get(), 10);
        assert_eq!(solution.evaluations, 10);

        let system = Recording::new();
        let solution = runge_kutta4(&system, &INITIAL, &config(0.01, 11)).expect("rk4");
        assert_eq!(system.calls.get(), 40);
        assert_eq!(solution.evaluations, 40);
    }

    #[test]
    fn steps_are_evaluated_at_grid_times() {
        let system = Recording::new();
        euler(&system, &INITIAL, &config(0.1, 4)).expect("euler");
        assert_eq!(*system.times.borrow(), vec![0.0, 0.1, 2.0 * 0.1]);

        let system = Recording::new();
        runge_kutta4(&system, &INITIAL, &config(0.1, 2)).expect("rk4");
        assert_eq!(*system.times.borrow(), vec![0.0, 0.05, 0.05, 0.1]);
    }

    #[test]
    fn euler_first_step_matches_hand_computation() {
        let lorenz = Lorenz::default();
        let solution = euler(&lorenz, &INITIAL, &config(0.025, 2)).expect("euler");
        let step = solution.trajectory.point(1).expect("second point");

        // dx/dt = 10 * (3 - (-1)) = 40, so x = -1 + 0.025 * 40 = 0.
        assert_eq!(step[0], 0.0);
        // dy/dt = -1 * (28 - 4) - 3 = -27
        assert_relative_eq!(step[1], 3.0 - 0.025 * 27.0, epsilon = 1e-15);
        // dz/dt = -1 * 3 - 8/3 * 4
        assert_relative_eq!(step[2], 4.0 + 0.025 * (-3.0 - 32.0 / 3.0), epsilon = 1e-15);
        assert_relative_eq!(step[1], 2.325, epsilon = 1e-12);
        assert_relative_eq!(step[2], 3.658_333_333_333_333, epsilon = 1e-12);
    }

    #[test]
    fn rk4_first_step_combines_four_stages() {
        let lorenz = Lorenz::default();
        let h = 0.025;
        let solution = runge_kutta4(&lorenz, &INITIAL, &config(h, 2)).expect("rk4");

        let add = |a: [f64; 3], b: [f64; 3], scale: f64| {
            [a[0] + scale * b[0], a[1] + scale * b[1], a[2] + scale * b[2]]
        };
        let k1 = lorenz.derivative(INITIAL);
        let k2 = lorenz.derivative(add(INITIAL, k1, h / 2.0));
        let k3 = lorenz.derivative(add(INITIAL, k2, h / 2.0));
        let k4 = lorenz.derivative(add(INITIAL, k3, h));

        let step = solution.trajectory.point(1).expect("second point");
        for i in 0..3 {
            let expected = INITIAL[i] + h * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]) / 6.0;
            assert_relative_eq!(step[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let lorenz = Lorenz::default();
        for method in FixedStepMethod::ALL {
            let a = integrate(method, &lorenz, &INITIAL, &config(0.025, 3000)).expect("first");
            let b = integrate(method, &lorenz, &INITIAL, &config(0.025, 3000)).expect("second");
            let a_bits: Vec<u64> = a.trajectory.as_slice().iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u64> = b.trajectory.as_slice().iter().map(|v| v.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn rejects_invalid_arguments() {
        let lorenz = Lorenz::default();
        for method in FixedStepMethod::ALL {
            let err = integrate(method, &lorenz, &INITIAL, &config(0.0, 10)).unwrap_err();
            assert_eq!(err, IntegrationError::InvalidStepSize(0.0));
            assert!(err.is_invalid_argument());

            let err = integrate(method, &lorenz, &INITIAL, &config(-0.5, 10)).unwrap_err();
            assert_eq!(err, IntegrationError::InvalidStepSize(-0.5));

            let err = integrate(method, &lorenz, &INITIAL, &config(0.025, 0)).unwrap_err();
            assert_eq!(err, IntegrationError::InvalidStepCount);
            assert!(err.is_invalid_argument());

            let err = integrate(method, &lorenz, &[1.0, 2.0], &config(0.025, 10)).unwrap_err();
            assert_eq!(
                err,
                IntegrationError::DimensionMismatch {
                    expected: 3,
                    found: 2
                }
            );
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn non_finite_values_propagate_without_halting() {
        let lorenz = Lorenz::default();
        for method in FixedStepMethod::ALL {
            let solution = integrate(method, &lorenz, &[f64::NAN, 1.0, 1.0], &config(0.01, 5))
                .expect("non-finite input is not an error");
            assert_eq!(solution.trajectory.len(), 5);
            assert!(solution.trajectory.first()[0].is_nan());
            assert!(solution.trajectory.last().iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn huge_steps_blow_up_to_non_finite_values() {
        let lorenz = Lorenz::default();
        let solution = euler(&lorenz, &INITIAL, &config(10.0, 200)).expect("euler");
        assert_eq!(solution.trajectory.len(), 200);
        assert!(solution
            .trajectory
            .last()
            .iter()
            .any(|v| !v.is_finite()));
    }

    #[test]
    fn single_precision_trajectory() {
        let lorenz = Lorenz::<f32>::new(28.0, 10.0, 8.0 / 3.0);
        let config = StepConfig::<f32>::new(0.025, 4).expect("valid config");
        let solution = euler(&lorenz, &[-1.0_f32, 3.0, 4.0], &config).expect("euler");
        assert_eq!(solution.trajectory.point(1).map(|p| p[0]), Some(0.0_f32));
    }
}
