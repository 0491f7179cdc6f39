//! Contour lines (marching squares) and level bands for filled contours

use crate::errors::{AcdError, Result};
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};

/// One connected contour line at a level, in data coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub points: Vec<(f64, f64)>,
}

impl ContourLine {
    /// First and last points coincide
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }
}

/// Grid edge a crossing lies on: horizontal edges run from `(j, i)` to
/// `(j, i + 1)`, vertical edges from `(j, i)` to `(j + 1, i)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    H(usize, usize),
    V(usize, usize),
}

fn check_grid(xs: &[f64], ys: &[f64], z: &ArrayView2<f64>) -> Result<()> {
    if z.dim() != (ys.len(), xs.len()) {
        return Err(AcdError::ShapeMismatch {
            message: format!(
                "contour grid is {:?} but coordinates are {} (y) by {} (x)",
                z.dim(),
                ys.len(),
                xs.len()
            ),
        });
    }
    Ok(())
}

fn cell_segments(z: &ArrayView2<f64>, j: usize, i: usize, level: f64) -> Vec<(Edge, Edge)> {
    let a = z[[j, i]];
    let b = z[[j, i + 1]];
    let c = z[[j + 1, i + 1]];
    let d = z[[j + 1, i]];
    if [a, b, c, d].iter().any(|v| v.is_nan()) {
        return Vec::new();
    }
    let bottom = Edge::H(j, i);
    let right = Edge::V(j, i + 1);
    let top = Edge::H(j + 1, i);
    let left = Edge::V(j, i);
    let case = (a >= level) as u8
        | ((b >= level) as u8) << 1
        | ((c >= level) as u8) << 2
        | ((d >= level) as u8) << 3;
    let centre_high = (a + b + c + d) / 4.0 >= level;
    match case {
        1 | 14 => vec![(left, bottom)],
        2 | 13 => vec![(bottom, right)],
        3 | 12 => vec![(left, right)],
        4 | 11 => vec![(right, top)],
        6 | 9 => vec![(bottom, top)],
        7 | 8 => vec![(left, top)],
        5 if centre_high => vec![(left, top), (bottom, right)],
        5 => vec![(left, bottom), (right, top)],
        10 if centre_high => vec![(left, bottom), (right, top)],
        10 => vec![(bottom, right), (left, top)],
        _ => Vec::new(),
    }
}

fn crossing(xs: &[f64], ys: &[f64], z: &ArrayView2<f64>, edge: Edge, level: f64) -> (f64, f64) {
    let (p1, p2) = match edge {
        Edge::H(j, i) => ((j, i), (j, i + 1)),
        Edge::V(j, i) => ((j, i), (j + 1, i)),
    };
    let v1 = z[[p1.0, p1.1]];
    let v2 = z[[p2.0, p2.1]];
    let t = if v2 == v1 { 0.5 } else { (level - v1) / (v2 - v1) };
    let x = xs[p1.1] + (xs[p2.1] - xs[p1.1]) * t;
    let y = ys[p1.0] + (ys[p2.0] - ys[p1.0]) * t;
    (x, y)
}

/// Join segments sharing an edge into polylines
fn chain(segments: &[(Edge, Edge)]) -> Vec<Vec<Edge>> {
    let mut by_edge: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (k, (e1, e2)) in segments.iter().enumerate() {
        by_edge.entry(*e1).or_default().push(k);
        by_edge.entry(*e2).or_default().push(k);
    }
    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    let next = |edge: Edge, used: &[bool]| -> Option<usize> {
        by_edge
            .get(&edge)
            .and_then(|ks| ks.iter().copied().find(|&k| !used[k]))
    };

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut line: VecDeque<Edge> = VecDeque::from([segments[start].0, segments[start].1]);

        while let Some(&tail) = line.back() {
            let Some(k) = next(tail, &used) else { break };
            used[k] = true;
            let (e1, e2) = segments[k];
            line.push_back(if e1 == tail { e2 } else { e1 });
        }
        while let Some(&head) = line.front() {
            let Some(k) = next(head, &used) else { break };
            used[k] = true;
            let (e1, e2) = segments[k];
            line.push_front(if e1 == head { e2 } else { e1 });
        }
        lines.push(line.into_iter().collect());
    }
    lines
}

/// Contour lines of `z` (rows along `ys`, columns along `xs`) at each level
///
/// Cells touching a `NaN` are skipped. Levels are traced in parallel.
///
/// # Errors
///
/// Returns [`AcdError::ShapeMismatch`] if the grid and coordinates disagree.
pub fn contour_lines(
    xs: &[f64],
    ys: &[f64],
    z: ArrayView2<f64>,
    levels: &[f64],
) -> Result<Vec<ContourLine>> {
    check_grid(xs, ys, &z)?;
    if xs.len() < 2 || ys.len() < 2 {
        return Ok(Vec::new());
    }

    let lines: Vec<Vec<ContourLine>> = levels
        .par_iter()
        .map(|&level| {
            let mut segments = Vec::new();
            for j in 0..ys.len() - 1 {
                for i in 0..xs.len() - 1 {
                    segments.extend(cell_segments(&z, j, i, level));
                }
            }
            chain(&segments)
                .into_iter()
                .map(|edges| ContourLine {
                    level,
                    points: edges
                        .into_iter()
                        .map(|e| crossing(xs, ys, &z, e, level))
                        .collect(),
                })
                .collect()
        })
        .collect();

    let lines: Vec<ContourLine> = lines.into_iter().flatten().collect();
    tracing::debug!(levels = levels.len(), lines = lines.len(), "traced contours");
    Ok(lines)
}

/// Index of the band `[levels[k], levels[k + 1])` containing `value`
///
/// The top level is included in the last band; values outside the levels
/// and `NaN` have no band.
pub fn band_index(value: f64, levels: &[f64]) -> Option<usize> {
    if levels.len() < 2 || value.is_nan() {
        return None;
    }
    let last = levels.len() - 1;
    if value < levels[0] || value > levels[last] {
        return None;
    }
    if value == levels[last] {
        return Some(last - 1);
    }
    levels.windows(2).position(|w| value >= w[0] && value < w[1])
}

/// Cell boundaries around point coordinates: midpoints, with the outer
/// edges extrapolated by half a step
pub fn cell_edges(centres: &[f64]) -> Vec<f64> {
    match centres.len() {
        0 => Vec::new(),
        1 => vec![centres[0] - 0.5, centres[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centres[0] - (centres[1] - centres[0]) / 2.0);
            edges.extend(centres.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(centres[n - 1] + (centres[n - 1] - centres[n - 2]) / 2.0);
            edges
        }
    }
}
