//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Coherence surface over (alpha, beta) for one topic count.
//!
//! Plotters is built without a font backend, so the image holds no text.
//! Axes are fixed: x is alpha, the vertical axis is coherence, depth is beta.
//! Their ranges go to the log next to the output path.

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::cache::read_table;
use crate::config::PlotConfig;
use crate::error::{LdaError, Result};
use crate::sweep::SweepTable;

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub fn surface_file_name(topics: usize) -> String {
    format!("Coherence_Surface_k={}.png", topics)
}

pub fn render_surface_from_file(
    path: impl AsRef<Path>,
    topics: usize,
    config: &PlotConfig,
) -> Result<PathBuf> {
    let table = read_table(path)?;
    render_surface(&table, topics, config)
}

/// Tags are drawn at `config.placeholder`; rows sharing a coordinate are averaged.
pub fn render_surface(table: &SweepTable, topics: usize, config: &PlotConfig) -> Result<PathBuf> {
    let points: Vec<(f64, f64, f64)> = table
        .with_topics(topics)
        .map(|r| {
            (
                r.alpha.plot_coordinate(config.placeholder),
                r.beta.plot_coordinate(config.placeholder),
                r.coherence,
            )
        })
        .filter(|p| p.2.is_finite())
        .collect();
    if points.is_empty() {
        return Err(LdaError::NoResults(format!("no rows with {} topics", topics)));
    }

    std::fs::create_dir_all(&config.output_dir)?;
    let out = config.output_dir.join(surface_file_name(topics));
    let axes = Axes::new(&points);
    draw(&out, &SurfaceGrid::new(&points), &points, &axes, config)
        .map_err(|e| LdaError::Plot(e.to_string()))?;

    info!(
        path = %out.display(),
        topics,
        points = points.len(),
        alpha = ?axes.alpha,
        beta = ?axes.beta,
        coherence = ?axes.coherence,
        "coherence surface written"
    );
    Ok(out)
}

struct SurfaceGrid {
    xs: Vec<f64>,
    ys: Vec<f64>,
    z: Vec<Vec<Option<f64>>>,
}

impl SurfaceGrid {
    fn new(points: &[(f64, f64, f64)]) -> Self {
        let axis = |pick: fn(&(f64, f64, f64)) -> f64| {
            let mut v: Vec<f64> = points.iter().map(pick).collect();
            v.sort_by(f64::total_cmp);
            v.dedup();
            v
        };
        let xs = axis(|p| p.0);
        let ys = axis(|p| p.1);

        let mut sums = vec![vec![(0.0f64, 0u32); ys.len()]; xs.len()];
        for &(x, y, z) in points {
            let i = xs.partition_point(|v| *v < x);
            let j = ys.partition_point(|v| *v < y);
            sums[i][j].0 += z;
            sums[i][j].1 += 1;
        }
        let z = sums
            .into_iter()
            .map(|col| {
                col.into_iter()
                    .map(|(s, n)| if n == 0 { None } else { Some(s / n as f64) })
                    .collect()
            })
            .collect();

        Self { xs, ys, z }
    }

    /// Two triangles per grid cell whose four corners all have a value.
    fn triangles(&self) -> Vec<[(f64, f64, f64); 3]> {
        let mut out = Vec::new();
        for i in 0..self.xs.len().saturating_sub(1) {
            for j in 0..self.ys.len().saturating_sub(1) {
                let corner = |a: usize, b: usize| self.z[a][b].map(|z| (self.xs[a], self.ys[b], z));
                if let (Some(c00), Some(c10), Some(c11), Some(c01)) =
                    (corner(i, j), corner(i + 1, j), corner(i + 1, j + 1), corner(i, j + 1))
                {
                    out.push([c00, c10, c11]);
                    out.push([c00, c11, c01]);
                }
            }
        }
        out
    }
}

fn span(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if hi - lo < 1e-9 {
        (lo - 0.5)..(hi + 0.5)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad)..(hi + pad)
    }
}

// blue (low) to red (high)
fn heat(z: f64, range: &Range<f64>) -> HSLColor {
    let t = ((z - range.start) / (range.end - range.start)).clamp(0.0, 1.0);
    HSLColor((1.0 - t) * 240.0 / 360.0, 0.85, 0.5)
}

fn draw(
    out: &Path,
    grid: &SurfaceGrid,
    points: &[(f64, f64, f64)],
    axes: &Axes,
    config: &PlotConfig,
) -> DrawResult<()> {
    let root = BitMapBackend::new(out, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    // plotters' vertical axis is the second one; no caption or labels
    let mut chart = ChartBuilder::on(&root).margin(20).build_cartesian_3d(
        axes.alpha.clone(),
        axes.coherence.clone(),
        axes.beta.clone(),
    )?;

    chart.with_projection(|mut pb| {
        pb.pitch = 0.5;
        pb.yaw = 0.6;
        pb.scale = 0.8;
        pb.into_matrix()
    });

    for edge in axes.frame() {
        chart.draw_series(LineSeries::new(edge, BLACK.mix(0.4).stroke_width(1)))?;
    }

    for tri in grid.triangles() {
        let level = (tri[0].2 + tri[1].2 + tri[2].2) / 3.0;
        let vertices: Vec<(f64, f64, f64)> = tri.iter().map(|&(x, y, z)| (x, z, y)).collect();
        chart.draw_series(std::iter::once(Polygon::new(
            vertices,
            heat(level, &axes.coherence).filled(),
        )))?;
    }

    chart.draw_series(points.iter().map(|&(x, y, z)| {
        Circle::new((x, z, y), 3, heat(z, &axes.coherence).filled())
    }))?;

    root.present()?;
    Ok(())
}

// (alpha, coherence, beta) in chart order
struct Axes {
    alpha: Range<f64>,
    beta: Range<f64>,
    coherence: Range<f64>,
}

impl Axes {
    fn new(points: &[(f64, f64, f64)]) -> Self {
        Self {
            alpha: span(points.iter().map(|p| p.0)),
            beta: span(points.iter().map(|p| p.1)),
            coherence: span(points.iter().map(|p| p.2)),
        }
    }

    /// Floor rectangle plus the vertical edge at the origin corner.
    fn frame(&self) -> Vec<Vec<(f64, f64, f64)>> {
        let (a0, a1) = (self.alpha.start, self.alpha.end);
        let (b0, b1) = (self.beta.start, self.beta.end);
        let (c0, c1) = (self.coherence.start, self.coherence.end);
        vec![
            vec![(a0, c0, b0), (a1, c0, b0), (a1, c0, b1), (a0, c0, b1), (a0, c0, b0)],
            vec![(a0, c0, b0), (a0, c1, b0)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{HyperParams, Prior};
    use crate::sweep::SweepRow;
    use tempfile::TempDir;

    fn table() -> SweepTable {
        let mut table = SweepTable::default();
        let priors = [
            Prior::Value(0.01),
            Prior::Value(0.31),
            Prior::Symmetric,
            Prior::Asymmetric,
        ];
        for (i, a) in priors.iter().enumerate() {
            for (j, b) in priors[..3].iter().enumerate() {
                table.push(SweepRow::new(
                    HyperParams::new(6, *a, *b),
                    0.3 + 0.01 * (i + j) as f64,
                ));
            }
        }
        table.push(SweepRow::new(HyperParams::new(7, 0.5, 0.5), 0.9));
        table
    }

    #[test]
    fn test_tags_share_the_placeholder_cell() {
        let points: Vec<(f64, f64, f64)> = vec![(0.1, 0.1, 0.2), (0.1, 0.1, 0.4), (0.3, 0.1, 0.5)];
        let grid = SurfaceGrid::new(&points);
        assert_eq!(grid.xs, vec![0.1, 0.3]);
        assert_eq!(grid.ys, vec![0.1]);
        assert!((grid.z[0][0].unwrap() - 0.3).abs() < 1e-12);
        assert!(grid.triangles().is_empty());
    }

    #[test]
    fn test_full_grid_triangulates() {
        let points: Vec<(f64, f64, f64)> = vec![
            (0.0, 0.0, 0.1),
            (1.0, 0.0, 0.2),
            (0.0, 1.0, 0.3),
            (1.0, 1.0, 0.4),
        ];
        assert_eq!(SurfaceGrid::new(&points).triangles().len(), 2);
    }

    #[test]
    fn test_writes_named_image() {
        let dir = TempDir::new().unwrap();
        let config = PlotConfig {
            output_dir: dir.path().to_path_buf(),
            ..PlotConfig::default()
        };
        let out = render_surface(&table(), 6, &config).unwrap();
        assert_eq!(out, dir.path().join("Coherence_Surface_k=6.png"));
        assert!(out.is_file());
    }

    #[test]
    fn test_single_point_renders_png() {
        let dir = TempDir::new().unwrap();
        let config = PlotConfig {
            output_dir: dir.path().join("nested"),
            width: 320,
            height: 240,
            ..PlotConfig::default()
        };
        let table = SweepTable::from_rows(vec![SweepRow::new(
            HyperParams::new(3, Prior::Symmetric, Prior::Symmetric),
            0.42,
        )]);
        let out = render_surface(&table, 3, &config).unwrap();
        let bytes = std::fs::read(out).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_frame_spans_every_axis() {
        let axes = Axes::new(&[(0.0, 0.0, 0.2), (1.0, 1.0, 0.4)]);
        let frame = axes.frame();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0].first(), frame[0].last());
        assert!(axes.coherence.start < 0.2 && axes.coherence.end > 0.4);
    }

    #[test]
    fn test_unknown_topic_count() {
        let dir = TempDir::new().unwrap();
        let config = PlotConfig {
            output_dir: dir.path().to_path_buf(),
            ..PlotConfig::default()
        };
        assert!(matches!(
            render_surface(&table(), 8, &config),
            Err(LdaError::NoResults(_))
        ));
    }
}
