//! Descriptive statistics, correlation, and least squares fit.
//!
//! Every function returns `None` when the statistic is undefined for its
//! input (empty samples, mismatched lengths, zero variance).

#![allow(clippy::cast_precision_loss)]

use city_monitor_analytics_models::{LinearFit, StatsSummary};

/// Arithmetic mean.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median. Even-length samples average the two middle values.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    })
}

/// Sample standard deviation with Bessel's correction. Needs at least two
/// values.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Count, mean, median, sample standard deviation, min, and max.
#[must_use]
pub fn summarize(values: &[f64]) -> Option<StatsSummary> {
    Some(StatsSummary {
        count: values.len(),
        mean: mean(values)?,
        median: median(values)?,
        std_dev: sample_std_dev(values),
        min: values.iter().copied().reduce(f64::min)?,
        max: values.iter().copied().reduce(f64::max)?,
    })
}

/// Centered sums `(sxx, syy, sxy)` and means of paired samples.
fn centered_sums(xs: &[f64], ys: &[f64]) -> Option<(f64, f64, f64, f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let (sxx, syy, sxy) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), (x, y)| {
            let dx = x - mx;
            let dy = y - my;
            (dx.mul_add(dx, sxx), dy.mul_add(dy, syy), dx.mul_add(dy, sxy))
        });

    Some((sxx, syy, sxy, mx, my))
}

/// Pearson correlation coefficient of paired samples.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let (sxx, syy, sxy, _, _) = centered_sums(xs, ys)?;
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Ordinary least squares fit of `ys` against `xs`.
#[must_use]
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let (sxx, syy, sxy, mx, my) = centered_sums(xs, ys)?;
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };

    Some(LinearFit {
        slope,
        intercept: slope.mul_add(-mx, my),
        r_squared,
    })
}
