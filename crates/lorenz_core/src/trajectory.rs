use crate::error::{IntegrationError, Result};
use crate::traits::{grid_time, Scalar};
use serde::{Deserialize, Serialize};
use std::slice::ChunksExact;

/// Fixed step size and number of trajectory points.
///
/// A run with `steps` points covers `step_size * (steps - 1)` units of time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepConfig<T = f64> {
    pub step_size: T,
    pub steps: usize,
}

impl Default for StepConfig<f64> {
    fn default() -> Self {
        Self {
            step_size: 0.025,
            steps: 3000,
        }
    }
}

impl<T: Scalar> StepConfig<T> {
    pub fn new(step_size: T, steps: usize) -> Result<Self> {
        let config = Self { step_size, steps };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.step_size > T::zero()) || !self.step_size.is_finite() {
            return Err(IntegrationError::InvalidStepSize(
                self.step_size.to_f64().unwrap_or(f64::NAN),
            ));
        }
        if self.steps == 0 {
            return Err(IntegrationError::InvalidStepCount);
        }
        Ok(())
    }

    /// Time of point `index`.
    pub fn time_at(&self, index: usize) -> T {
        grid_time(index, self.step_size)
    }

    /// Output grid `0, h, 2h, ..., (steps - 1) h`.
    pub fn times(&self) -> Vec<T> {
        (0..self.steps).map(|i| self.time_at(i)).collect()
    }

    /// Total simulated time.
    pub fn span(&self) -> T {
        self.time_at(self.steps.saturating_sub(1))
    }
}

/// An ordered sequence of states stored row-major in one preallocated buffer.
///
/// Point 0 is always the initial condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<T> {
    dimension: usize,
    data: Vec<T>,
}

impl<T: Scalar> Trajectory<T> {
    /// Allocates room for `steps` points and writes `initial` into slot 0.
    pub(crate) fn with_initial(initial: &[T], steps: usize) -> Self {
        let dimension = initial.len();
        let mut data = vec![T::zero(); dimension * steps];
        data[..dimension].copy_from_slice(initial);
        Self { dimension, data }
    }

    /// Returns `(previous, next)` for filling point `index` from point `index - 1`.
    pub(crate) fn split_step(&mut self, index: usize) -> (&[T], &mut [T]) {
        let dim = self.dimension;
        let (head, tail) = self.data.split_at_mut(index * dim);
        (&head[(index - 1) * dim..], &mut tail[..dim])
    }

    pub(crate) fn point_mut(&mut self, index: usize) -> &mut [T] {
        let dim = self.dimension;
        &mut self.data[index * dim..(index + 1) * dim]
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<&[T]> {
        let dim = self.dimension;
        self.data.get(index * dim..(index + 1) * dim)
    }

    pub fn first(&self) -> &[T] {
        &self.data[..self.dimension]
    }

    pub fn last(&self) -> &[T] {
        &self.data[self.data.len() - self.dimension..]
    }

    pub fn iter(&self) -> ChunksExact<'_, T> {
        self.data.chunks_exact(self.dimension)
    }

    /// Flat row-major view of every point.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Points of a three-dimensional trajectory as `[x, y, z]` triples.
    /// Returns `None` for any other dimension.
    pub fn to_points3(&self) -> Option<Vec<[T; 3]>> {
        if self.dimension != 3 {
            return None;
        }
        Some(self.iter().map(|p| [p[0], p[1], p[2]]).collect())
    }
}
