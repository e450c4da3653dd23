//! SVG rendering of trajectories as 3D line plots.

use anyhow::{Context, Result};
use lorenz_core::{Comparison, Method, Series};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

const FIGURE_SIZE: (u32, u32) = (900, 800);

/// A figure title together with the series drawn on it.
pub struct Figure<'a> {
    pub title: &'static str,
    pub file_name: &'static str,
    pub series: Vec<&'a Series>,
}

/// One figure per method followed by an overlay of all three.
pub fn figures(comparison: &Comparison) -> Vec<Figure<'_>> {
    let single = |method: Method, title, file_name| Figure {
        title,
        file_name,
        series: comparison.series(method).into_iter().collect(),
    };

    let [euler, rk4, reference] = Method::ALL;
    vec![
        single(euler, "Euler Integration", "euler.svg"),
        single(rk4, "Runge Kutta Integration", "runge_kutta.svg"),
        single(reference, "ODE Integrate", "ode_integrate.svg"),
        Figure {
            title: "Comparison",
            file_name: "comparison.svg",
            series: comparison.series.iter().collect(),
        },
    ]
}

/// Renders every figure into `output_dir` and returns the written paths.
pub fn render_all(comparison: &Comparison, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    figures(comparison)
        .iter()
        .map(|figure| {
            let path = output_dir.join(figure.file_name);
            render(&path, figure)
                .with_context(|| format!("Failed to render '{}'", figure.title))?;
            Ok(path)
        })
        .collect()
}

pub fn render(path: &Path, figure: &Figure<'_>) -> Result<()> {
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let bounds = Bounds::of(&figure.series);
    // plotters draws the second axis vertically, so z goes in the middle slot.
    let mut chart = ChartBuilder::on(&root)
        .caption(figure.title, ("sans-serif", 28))
        .margin(20)
        .build_cartesian_3d(bounds.x, bounds.z, bounds.y)?;

    chart.with_projection(|mut projection| {
        projection.yaw = 0.6;
        projection.pitch = 0.25;
        projection.scale = 0.85;
        projection.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()?;

    for (index, series) in figure.series.iter().enumerate() {
        let skipped = non_finite_points(series);
        if skipped > 0 {
            eprintln!(
                "Warning: '{}' in {}: {} of {} points are non-finite and were not drawn",
                series.label,
                figure.file_name,
                skipped,
                series.points.len()
            );
        }

        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                series
                    .points
                    .iter()
                    .filter(|p| is_finite(p))
                    .map(|p| (p[0], p[2], p[1])),
                &color,
            ))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if figure.series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Axis ranges covering every finite point of a set of series.
#[derive(Debug, Clone, PartialEq)]
struct Bounds {
    x: Range<f64>,
    y: Range<f64>,
    z: Range<f64>,
}

impl Bounds {
    fn of(series: &[&Series]) -> Self {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for point in series.iter().flat_map(|s| &s.points) {
            if !is_finite(point) {
                continue;
            }
            for i in 0..3 {
                lo[i] = lo[i].min(point[i]);
                hi[i] = hi[i].max(point[i]);
            }
        }
        Self {
            x: padded(lo[0], hi[0]),
            y: padded(lo[1], hi[1]),
            z: padded(lo[2], hi[2]),
        }
    }
}

/// Number of points the plots leave out because a coordinate is NaN or infinite.
pub fn non_finite_points(series: &Series) -> usize {
    series.points.iter().filter(|p| !is_finite(p)).count()
}

fn is_finite(point: &[f64; 3]) -> bool {
    point.iter().all(|v| v.is_finite())
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return -1.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad)..(hi + pad)
}
