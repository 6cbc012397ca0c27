//! Rank and frequency-distribution helpers shared by the two-sample tests.

use anyhow::{Result, bail};
use ndarray::Array1;
use num_traits::ToPrimitive;
use std::cmp::Ordering;

/// Converts a generic numeric sample to `f64` for the test kernels.
/// Unrepresentable values become NaN and propagate like any other NaN.
pub(crate) fn to_f64_vec<T: ToPrimitive>(values: &[T]) -> Vec<f64> {
    values
        .iter()
        .map(|v| v.to_f64().unwrap_or(f64::NAN))
        .collect()
}

/// Assigns pooled ranks with ties averaged (midrank convention): tied values
/// all receive the mean of the positions they occupy, 1-based.
pub fn rankdata(values: &[f64]) -> Array1<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = Array1::zeros(n);
    let mut i = 0;
    while i < n {
        // Extend over the run of tied values.
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        let midrank = (i + j - 1) as f64 / 2.0 + 1.0;
        for &idx in &order[i..j] {
            ranks[idx] = midrank;
        }
        i = j;
    }
    ranks
}

/// Tie correction factor for the normal approximation of rank statistics:
/// `1 - sum(t^3 - t) / (n^3 - n)` over tie groups of size `t`. Returns 0
/// when every value is tied (degenerate variance).
pub fn tie_correction(ranks: &Array1<f64>) -> f64 {
    let n = ranks.len();
    if n < 2 {
        return 1.0;
    }
    let mut sorted: Vec<f64> = ranks.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut tie_sum = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        tie_sum += t * t * t - t;
        i = j;
    }
    let n = n as f64;
    1.0 - tie_sum / (n * n * n - n)
}

/// Builds aligned frequency distributions for two integer-valued samples
/// over the shared axis `[min, max]` of the pooled data. The returned axis
/// and count vectors all have the same length, so the counts feed directly
/// into the frequency-mode KS test.
pub fn frequency_distributions(
    sample1: &[i64],
    sample2: &[i64],
) -> Result<(Vec<i64>, Vec<f64>, Vec<f64>)> {
    if sample1.is_empty() || sample2.is_empty() {
        bail!("both samples must be non-empty to build frequency distributions");
    }
    let min = sample1.iter().chain(sample2).copied().min().unwrap();
    let max = sample1.iter().chain(sample2).copied().max().unwrap();

    let axis: Vec<i64> = (min..=max).collect();
    let mut fd1 = vec![0.0; axis.len()];
    let mut fd2 = vec![0.0; axis.len()];
    for &v in sample1 {
        fd1[(v - min) as usize] += 1.0;
    }
    for &v in sample2 {
        fd2[(v - min) as usize] += 1.0;
    }
    Ok((axis, fd1, fd2))
}

/// Regenerates raw data from a `(value, frequency)` pair, optionally scaling
/// every frequency by `scaler` first. Scaled frequencies are rounded half
/// away from zero before expansion.
pub fn expand_frequency_distribution(
    x: &[f64],
    fd: &[f64],
    scaler: f64,
) -> Result<Vec<f64>> {
    if x.len() != fd.len() {
        bail!(
            "values and frequencies should be the same lengths of arrays: {} != {}",
            x.len(),
            fd.len()
        );
    }
    let counts: Vec<f64> = fd.iter().map(|&f| (f * scaler).round()).collect();
    if counts.iter().any(|&c| c < 0.0 || !c.is_finite()) {
        bail!("frequencies must be finite and non-negative");
    }

    let mut data = Vec::with_capacity(counts.iter().sum::<f64>() as usize);
    for (&value, &count) in x.iter().zip(&counts) {
        for _ in 0..count as usize {
            data.push(value);
        }
    }
    Ok(data)
}
