//! Cubic trend over daily mean temperatures
//!
//! The independent variable is the day index, the number of days since the
//! first observation of the series. Gaps are not interpolated; missing days
//! just contribute no training point. The cubic is fitted by ordinary least
//! squares using a Householder QR decomposition of the Vandermonde matrix.
//! Day indices are centred and scaled to `[-1, 1]` before the decomposition,
//! which keeps the columns well conditioned for windows of a few hundred days.

use crate::models::HistorySeries;
use crate::{Result, TempcastError};
use chrono::NaiveDate;
use tracing::debug;

/// Polynomial degree of the trend
pub const DEGREE: usize = 3;

const TERMS: usize = DEGREE + 1;

/// Relative size below which a diagonal entry of R counts as zero
const RANK_TOLERANCE: f64 = 1e-10;

/// A fitted cubic trend, ready to be evaluated at any date
#[derive(Debug, Clone, PartialEq)]
pub struct TrendModel {
    origin: NaiveDate,
    center: f64,
    scale: f64,
    /// Coefficients over the normalised abscissa `(x - center) / scale`
    normalized: [f64; TERMS],
}

impl TrendModel {
    /// Fit the trend to `series`.
    ///
    /// # Errors
    /// `EmptyHistory` for an empty series and `InsufficientHistory` when fewer
    /// than four distinct days are available, since a cubic is then not
    /// uniquely determined.
    pub fn fit(series: &HistorySeries) -> Result<Self> {
        let origin = series.first_date().ok_or(TempcastError::EmptyHistory)?;
        let points: Vec<(f64, f64)> = series
            .training_points()
            .map(|(x, y)| (x as f64, y))
            .collect();

        // Series dates are unique, so every point has its own day index.
        if points.len() < TERMS {
            return Err(TempcastError::InsufficientHistory {
                required: TERMS,
                distinct: points.len(),
            });
        }

        let n = points.len() as f64;
        let center = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let spread = points
            .iter()
            .map(|(x, _)| (x - center).abs())
            .fold(0.0_f64, f64::max);
        let scale = if spread > 0.0 { spread } else { 1.0 };

        let mut design: Vec<[f64; TERMS]> = points
            .iter()
            .map(|(x, _)| powers((x - center) / scale))
            .collect();
        let mut rhs: Vec<f64> = points.iter().map(|(_, y)| *y).collect();

        let normalized = solve_least_squares(&mut design, &mut rhs).ok_or(
            TempcastError::InsufficientHistory {
                required: TERMS,
                distinct: points.len(),
            },
        )?;

        debug!(
            "Fitted cubic trend over {} days from {} (coefficients {:?})",
            points.len(),
            origin,
            normalized
        );

        Ok(Self {
            origin,
            center,
            scale,
            normalized,
        })
    }

    /// Date of day index zero
    #[must_use]
    pub fn origin(&self) -> NaiveDate {
        self.origin
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        DEGREE
    }

    /// Day index of `date` relative to the first observation
    #[must_use]
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        date.signed_duration_since(self.origin).num_days()
    }

    /// Evaluate the curve at a day index. Negative indices and indices past
    /// the training range are evaluated as fitted, without clamping.
    #[must_use]
    pub fn evaluate(&self, day_index: i64) -> f64 {
        let t = (day_index as f64 - self.center) / self.scale;
        self.normalized
            .iter()
            .rev()
            .fold(0.0, |acc, coefficient| acc * t + coefficient)
    }

    /// Predicted mean temperature for `date`
    #[must_use]
    pub fn predict(&self, date: NaiveDate) -> f64 {
        self.evaluate(self.day_index(date))
    }

    /// Coefficients `[c0, c1, c2, c3]` of `c0 + c1 x + c2 x² + c3 x³` where
    /// `x` is the raw day index.
    #[must_use]
    pub fn coefficients(&self) -> [f64; TERMS] {
        let mut expanded = [0.0; TERMS];
        let shift = -self.center;
        for (j, coefficient) in self.normalized.iter().enumerate() {
            // ((x + shift) / scale)^j expanded binomially
            let factor = coefficient / self.scale.powi(j as i32);
            for (k, slot) in expanded.iter_mut().enumerate().take(j + 1) {
                *slot += factor * binomial(j, k) * shift.powi((j - k) as i32);
            }
        }
        expanded
    }
}

/// Fit a cubic trend to `series` and evaluate it at `target_date`.
///
/// # Errors
/// See [`TrendModel::fit`].
pub fn predict(series: &HistorySeries, target_date: NaiveDate) -> Result<f64> {
    Ok(TrendModel::fit(series)?.predict(target_date))
}

fn powers(t: f64) -> [f64; TERMS] {
    let mut row = [1.0; TERMS];
    for j in 1..TERMS {
        row[j] = row[j - 1] * t;
    }
    row
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Solve `min |A c - b|` in place with Householder reflections.
/// Returns `None` when `A` is rank deficient.
fn solve_least_squares(a: &mut [[f64; TERMS]], b: &mut [f64]) -> Option<[f64; TERMS]> {
    let rows = a.len();

    for k in 0..TERMS {
        let norm = (k..rows).map(|i| a[i][k] * a[i][k]).sum::<f64>().sqrt();
        if norm == 0.0 {
            return None;
        }
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (k..rows).map(|i| a[i][k]).collect();
        v[0] -= alpha;
        let v_norm_sq: f64 = v.iter().map(|x| x * x).sum();

        if v_norm_sq > 0.0 {
            for j in k..TERMS {
                let dot: f64 = (k..rows).map(|i| v[i - k] * a[i][j]).sum();
                let f = 2.0 * dot / v_norm_sq;
                for i in k..rows {
                    a[i][j] -= f * v[i - k];
                }
            }
            let dot: f64 = (k..rows).map(|i| v[i - k] * b[i]).sum();
            let f = 2.0 * dot / v_norm_sq;
            for i in k..rows {
                b[i] -= f * v[i - k];
            }
        }
    }

    let largest = (0..TERMS).map(|k| a[k][k].abs()).fold(0.0_f64, f64::max);
    if (0..TERMS).any(|k| a[k][k].abs() <= RANK_TOLERANCE * largest) {
        return None;
    }

    let mut coefficients = [0.0; TERMS];
    for k in (0..TERMS).rev() {
        let tail: f64 = (k + 1..TERMS).map(|j| a[k][j] * coefficients[j]).sum();
        coefficients[k] = (b[k] - tail) / a[k][k];
    }
    Some(coefficients)
}
