//! Two-sample nonparametric tests.
//!
//! Every function here is a pure computation over in-memory samples: no
//! internal state, no I/O. Degenerate inputs (an empty sample for the rank
//! tests) produce NaN sentinel results instead of errors; invalid inputs
//! (empty or mismatched KS data) are reported immediately.

use crate::testing::{Alternative, Distribution, TestResult};
use crate::testing::inference::kolmogorov::{ks_z, qks};
use crate::testing::utils::{rankdata, tie_correction, to_f64_vec};
use anyhow::{Result, bail};
use ndarray::{Array1, s};
use num_traits::ToPrimitive;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use std::cmp::Ordering;

// ── Kolmogorov-Smirnov ────────────────────────────────────────────────

/// Two-sample Kolmogorov-Smirnov test on raw observations.
///
/// Both empirical CDFs are right-continuous step functions evaluated at
/// every value of the pooled, sorted sample; the statistic `D` is the
/// largest unsigned distance between them. The p-value is asymptotic,
/// via the Kolmogorov survival function at
/// `(sqrt(ne) + 0.12 + 0.11 / sqrt(ne)) * D`.
///
/// Errors when either sample is empty. A numerical failure in the
/// probability evaluation degrades to p = 1.0 (maximally non-significant)
/// rather than propagating.
pub fn ks_2samp<T: ToPrimitive>(data1: &[T], data2: &[T]) -> Result<TestResult> {
    let mut data1 = to_f64_vec(data1);
    let mut data2 = to_f64_vec(data2);
    if data1.is_empty() || data2.is_empty() {
        bail!("input data1 and data2 must both be non-empty");
    }
    data1.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    data2.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n1 = data1.len() as f64;
    let n2 = data2.len() as f64;

    let mut data_all: Vec<f64> = data1.iter().chain(&data2).copied().collect();
    data_all.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    // Right-continuous ECDF: count of sample values <= query point.
    let cdf1 = Array1::from_iter(
        data_all.iter().map(|&v| data1.partition_point(|&x| x <= v) as f64 / n1),
    );
    let cdf2 = Array1::from_iter(
        data_all.iter().map(|&v| data2.partition_point(|&x| x <= v) as f64 / n2),
    );

    Ok(ks_result(&cdf1, &cdf2, n1, n2))
}

/// Two-sample Kolmogorov-Smirnov test on pre-aggregated frequency
/// distributions, positionally aligned over the same implicit value axis.
///
/// Errors when the vectors differ in length, contain a negative count, or
/// have a zero total.
pub fn ks_2samp_fd(fd1: &[f64], fd2: &[f64]) -> Result<TestResult> {
    if fd1.len() != fd2.len() {
        bail!("frequency distributions should be the same lengths of arrays");
    }
    if fd1.is_empty() {
        bail!("input fd1 and fd2 must both be non-empty");
    }
    if fd1.iter().chain(fd2).any(|&f| f < 0.0 || !f.is_finite()) {
        bail!("frequencies must be finite and non-negative");
    }

    let n1: f64 = fd1.iter().sum();
    let n2: f64 = fd2.iter().sum();
    if n1 == 0.0 || n2 == 0.0 {
        bail!("frequency distributions must have a positive total count");
    }

    let cdf1 = cumulative(fd1) / n1;
    let cdf2 = cumulative(fd2) / n2;
    Ok(ks_result(&cdf1, &cdf2, n1, n2))
}

fn cumulative(fd: &[f64]) -> Array1<f64> {
    let mut running = 0.0;
    Array1::from_iter(fd.iter().map(|&f| {
        running += f;
        running
    }))
}

fn ks_result(cdf1: &Array1<f64>, cdf2: &Array1<f64>, n1: f64, n2: f64) -> TestResult {
    // D is the absolute, not signed, distance.
    let d = (cdf1 - cdf2).mapv(f64::abs).fold(0.0, |m, &v| f64::max(m, v));
    let ne = n1 * n2 / (n1 + n2);
    // Conservative fallback: any failure in the probability evaluation
    // reports p = 1.0 instead of aborting the analysis.
    let prob = match qks(ks_z(d, ne)) {
        Ok(p) if p.is_finite() => p.clamp(0.0, 1.0),
        _ => 1.0,
    };
    TestResult::new(d, prob)
}

// ── Brunner-Munzel ────────────────────────────────────────────────────

/// Brunner-Munzel test on samples `x` and `y`.
///
/// Tests the null hypothesis that values drawn one by one from each group
/// are equally likely to be the larger, without assuming equal variances.
/// The statistic `W` compares mean pooled ranks, studentized by the
/// placement variances of the two samples; the p-value comes from a t
/// distribution with Satterthwaite degrees of freedom
/// ([`Distribution::StudentT`], recommended for n <= 50) or from the
/// standard normal.
///
/// Returns a NaN sentinel when either sample is empty.
///
/// # Example
///
/// ```
/// use table_statistics::testing::{Alternative, Distribution};
/// use table_statistics::testing::inference::nonparametric::brunner_munzel;
///
/// let x = [1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 2, 4, 1, 1];
/// let y = [3, 3, 4, 3, 1, 2, 3, 1, 1, 5, 4];
/// let res = brunner_munzel(&x, &y, Alternative::TwoSided, Distribution::StudentT);
/// assert!((res.statistic - 3.1374674823029505).abs() < 1e-10);
/// ```
pub fn brunner_munzel<T: ToPrimitive>(
    x: &[T],
    y: &[T],
    alternative: Alternative,
    distribution: Distribution,
) -> TestResult {
    brunner_munzel_kernel(&to_f64_vec(x), &to_f64_vec(y), 1.0, alternative, distribution)
}

/// Brunner-Munzel with the raw statistic divided by `sqrt(scaler)` before
/// significance evaluation. Used to deflate test power when the samples are
/// known to be inflated (e.g. pooled pseudo-replicates); the returned
/// statistic is the scaled one.
pub fn brunner_munzel_scaled<T: ToPrimitive>(
    x: &[T],
    y: &[T],
    scaler: f64,
    alternative: Alternative,
    distribution: Distribution,
) -> TestResult {
    brunner_munzel_kernel(&to_f64_vec(x), &to_f64_vec(y), scaler, alternative, distribution)
}

fn brunner_munzel_kernel(
    x: &[f64],
    y: &[f64],
    scaler: f64,
    alternative: Alternative,
    distribution: Distribution,
) -> TestResult {
    let nx = x.len();
    let ny = y.len();
    if nx == 0 || ny == 0 {
        return TestResult::nan();
    }
    let nx_f = nx as f64;
    let ny_f = ny as f64;

    let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    let rankc = rankdata(&pooled);
    let rankcx = rankc.slice(s![..nx]).to_owned();
    let rankcy = rankc.slice(s![nx..]).to_owned();
    let rankx = rankdata(x);
    let ranky = rankdata(y);

    let rankcx_mean = rankcx.sum() / nx_f;
    let rankcy_mean = rankcy.sum() / ny_f;
    let rankx_mean = rankx.sum() / nx_f;
    let ranky_mean = ranky.sum() / ny_f;

    // Placement variances: squared deviations of (pooled rank - own rank).
    let dx = &rankcx - &rankx + (rankx_mean - rankcx_mean);
    let dy = &rankcy - &ranky + (ranky_mean - rankcy_mean);
    let sx = dx.mapv(|v| v * v).sum() / (nx_f - 1.0);
    let sy = dy.mapv(|v| v * v).sum() / (ny_f - 1.0);

    let pooled_variance = nx_f * sx + ny_f * sy;
    let mut w = nx_f * ny_f * (rankcy_mean - rankcx_mean)
        / ((nx_f + ny_f) * pooled_variance.sqrt());
    w /= scaler.sqrt();

    let (p, df) = match distribution {
        Distribution::StudentT => {
            let df_numer = pooled_variance * pooled_variance;
            let df_denom = (nx_f * sx).powi(2) / (nx_f - 1.0)
                + (ny_f * sy).powi(2) / (ny_f - 1.0);
            let df = df_numer / df_denom;
            let p = match StudentsT::new(0.0, 1.0, df) {
                Ok(dist) => dist.cdf(w),
                Err(_) => f64::NAN,
            };
            (p, Some(df))
        }
        Distribution::Normal => {
            let normal = Normal::new(0.0, 1.0).unwrap();
            (normal.cdf(w), None)
        }
    };

    let result = TestResult::new(w, apply_alternative(p, alternative));
    match df {
        Some(df) => result.with_degrees_of_freedom(df),
        None => result,
    }
}

/// One-/two-sided adjustment of a lower-tail CDF value.
fn apply_alternative(p: f64, alternative: Alternative) -> f64 {
    match alternative {
        Alternative::Greater => p,
        Alternative::Less => 1.0 - p,
        Alternative::TwoSided => 2.0 * p.min(1.0 - p),
    }
}

// ── Mann-Whitney ──────────────────────────────────────────────────────

/// Mann-Whitney rank test with tie correction and a continuity correction
/// of 1/2, p-value from the asymptotic normal distribution. The returned
/// statistic is `U` for `y`.
///
/// Returns a NaN sentinel when either sample is empty or when every pooled
/// value is identical (the tie-corrected variance degenerates to zero).
pub fn mann_whitney<T: ToPrimitive>(x: &[T], y: &[T], alternative: Alternative) -> TestResult {
    mann_whitney_kernel(&to_f64_vec(x), &to_f64_vec(y), 1.0, alternative)
}

/// Mann-Whitney with the z-score divided by `sqrt(scaler)` before the tail
/// evaluation, mirroring [`brunner_munzel_scaled`].
pub fn mann_whitney_scaled<T: ToPrimitive>(
    x: &[T],
    y: &[T],
    scaler: f64,
    alternative: Alternative,
) -> TestResult {
    mann_whitney_kernel(&to_f64_vec(x), &to_f64_vec(y), scaler, alternative)
}

fn mann_whitney_kernel(
    x: &[f64],
    y: &[f64],
    scaler: f64,
    alternative: Alternative,
) -> TestResult {
    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    if x.is_empty() || y.is_empty() {
        return TestResult::nan();
    }

    let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    let ranked = rankdata(&pooled);
    let rank_sum_x: f64 = ranked.slice(s![..x.len()]).sum();

    let u1 = n1 * n2 + n1 * (n1 + 1.0) / 2.0 - rank_sum_x;
    let u2 = n1 * n2 - u1;

    let t = tie_correction(&ranked);
    if t == 0.0 {
        // All pooled values identical; the variance is zero.
        return TestResult::nan();
    }
    let sd = (t * n1 * n2 * (n1 + n2 + 1.0) / 12.0).sqrt();
    let mean_rank = n1 * n2 / 2.0 + 0.5;

    let big_u = match alternative {
        Alternative::TwoSided => u1.max(u2),
        Alternative::Less => u1,
        Alternative::Greater => u2,
    };
    let z = (big_u - mean_rank) / sd / scaler.sqrt();

    let normal = Normal::new(0.0, 1.0).unwrap();
    let p = match alternative {
        Alternative::TwoSided => 2.0 * (1.0 - normal.cdf(z.abs())),
        _ => 1.0 - normal.cdf(z),
    };

    TestResult::new(u2, p)
}
