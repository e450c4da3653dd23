//! WASM bindings for running the Lorenz comparison from a JavaScript front end.
//!
//! The front end owns all plotting; this crate only hands it labelled trajectories.

use anyhow::{Context, Result};
use lorenz_core::{run_comparison, run_method, Comparison, Method, RunConfig, Series};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmLorenz {
    config: RunConfig,
}

/// Endpoint deviation of one method from the reference solver.
#[derive(Debug, Serialize)]
struct EndpointError {
    label: &'static str,
    error: f64,
}

/// Run metadata sent alongside the trajectories.
#[derive(Debug, Serialize)]
struct RunSummary {
    steps: usize,
    step_size: f64,
    span: f64,
    endpoint_errors: Vec<EndpointError>,
}

#[wasm_bindgen]
impl WasmLorenz {
    /// Builds a runner from a (possibly partial) run config object.
    /// `undefined` or `null` selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmLorenz, JsValue> {
        console_error_panic_hook::set_once();

        let config = if config.is_undefined() || config.is_null() {
            RunConfig::default()
        } else {
            from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid run config: {}", e)))?
        };

        WasmLorenz::from_config(config).map_err(to_js_error)
    }

    /// Runs every method and returns `{ times, series: [{ label, method, evaluations, points }] }`.
    pub fn compare(&self) -> Result<JsValue, JsValue> {
        let comparison = self.comparison().map_err(to_js_error)?;
        serialize(&comparison)
    }

    /// Runs one method ("euler", "rk4" or "reference") and returns its labelled series.
    pub fn integrate(&self, method: &str) -> Result<JsValue, JsValue> {
        let series = self.series(method).map_err(to_js_error)?;
        serialize(&series)
    }

    /// Runs one method and returns its points as a flat `[x0, y0, z0, x1, ...]` array.
    pub fn integrate_flat(&self, method: &str) -> Result<Vec<f64>, JsValue> {
        let series = self.series(method).map_err(to_js_error)?;
        Ok(series.points.into_iter().flatten().collect())
    }

    /// Runs every method and returns grid size, span and endpoint deviations.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        let summary = self.run_summary().map_err(to_js_error)?;
        serialize(&summary)
    }

    pub fn times(&self) -> Vec<f64> {
        self.config.step.times()
    }

    pub fn step_count(&self) -> usize {
        self.config.step.steps
    }

    pub fn step_size(&self) -> f64 {
        self.config.step.step_size
    }
}

impl WasmLorenz {
    fn from_config(config: RunConfig) -> Result<Self> {
        config.validate().context("Invalid run config")?;
        Ok(Self { config })
    }

    fn comparison(&self) -> Result<Comparison> {
        run_comparison(&self.config).context("Comparison run failed")
    }

    fn series(&self, method: &str) -> Result<Series> {
        let method: Method = method.parse().map_err(anyhow::Error::msg)?;
        run_method(&self.config, method).with_context(|| format!("{method} integration failed"))
    }

    fn run_summary(&self) -> Result<RunSummary> {
        let comparison = self.comparison()?;
        Ok(RunSummary {
            steps: self.config.step.steps,
            step_size: self.config.step.step_size,
            span: self.config.step.span(),
            endpoint_errors: comparison
                .endpoint_errors()
                .into_iter()
                .map(|(method, error)| EndpointError {
                    label: method.label(),
                    error,
                })
                .collect(),
        })
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorenz_core::{FixedStepMethod, StepConfig};

    fn short_config() -> RunConfig {
        RunConfig {
            step: StepConfig {
                step_size: 0.01,
                steps: 50,
            },
            ..RunConfig::default()
        }
    }

    #[test]
    fn from_config_rejects_invalid_step_count() {
        let mut config = RunConfig::default();
        config.step.steps = 0;
        let err = WasmLorenz::from_config(config).err().expect("should reject");
        let message = format!("{err:#}");
        assert!(message.contains("Invalid run config"), "{message}");
        assert!(message.contains("step count"), "{message}");
    }

    #[test]
    fn series_resolves_method_names() {
        let runner = WasmLorenz::from_config(short_config()).expect("runner");
        let euler = runner.series("euler").expect("euler");
        assert_eq!(euler.label, "Euler");
        assert_eq!(euler.method, Method::Fixed(FixedStepMethod::Euler));
        assert_eq!(euler.points.len(), 50);

        let reference = runner.series("reference").expect("reference");
        assert_eq!(reference.label, "ODE Integrate");
        assert_eq!(reference.points.len(), 50);
    }

    #[test]
    fn series_rejects_unknown_method() {
        let runner = WasmLorenz::from_config(short_config()).expect("runner");
        let err = runner.series("leapfrog").err().expect("should reject");
        assert!(format!("{err}").contains("Unknown method"));
    }

    #[test]
    fn integrate_flat_is_row_major() {
        let runner = WasmLorenz::from_config(short_config()).expect("runner");
        let flat = runner.integrate_flat("rk4").expect("rk4");
        assert_eq!(flat.len(), 150);
        assert_eq!(&flat[..3], &[-1.0, 3.0, 4.0]);
    }

    #[test]
    fn summary_reports_both_fixed_step_methods() {
        let runner = WasmLorenz::from_config(short_config()).expect("runner");
        let summary = runner.run_summary().expect("summary");
        assert_eq!(summary.steps, 50);
        assert!((summary.span - 0.49).abs() < 1e-12);
        let labels: Vec<&str> = summary.endpoint_errors.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["Euler", "Runge Kutta"]);
        assert!(summary.endpoint_errors[1].error < summary.endpoint_errors[0].error);
    }

    #[test]
    fn accessors_expose_grid() {
        let runner = WasmLorenz::from_config(short_config()).expect("runner");
        assert_eq!(runner.step_count(), 50);
        assert_eq!(runner.step_size(), 0.01);
        assert_eq!(runner.times().len(), 50);
    }
}
