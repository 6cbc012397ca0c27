//! Closed-form evaluation of the Kolmogorov distribution.
//!
//! Neither statrs nor the rest of this crate's stack ships the limiting
//! distribution of the KS statistic, so the CDF and survival function are
//! computed from the series in Press et al., Numerical Recipes (3rd ed.),
//! section 14.3. Two branches: below `z = 1.18` the `pks` series converges
//! in four terms and `qks` is its complement; at or above 1.18 the `qks`
//! tail series converges in three terms. The crossover keeps both branches
//! accurate to well beyond 1e-6 over the practical range `z` in `[0, 5]`.

use anyhow::{Result, bail};
use std::f64::consts::PI;

/// CDF of the Kolmogorov distribution, `P(K <= z)`.
pub fn pks(z: f64) -> Result<f64> {
    if z < 0.0 {
        bail!("bad z for Kolmogorov distribution: {}", z);
    }
    if z == 0.0 {
        return Ok(0.0);
    }
    if z < 1.18 {
        let y = (-PI * PI / (8.0 * z * z)).exp();
        let series = y + y.powi(9) + y.powi(25) + y.powi(49);
        Ok((4.0 / PI.sqrt()) * (-y.ln()).sqrt() * series)
    } else {
        Ok(1.0 - qks_tail(z))
    }
}

/// Survival function of the Kolmogorov distribution, `P(K > z)`. This is
/// the asymptotic p-value of the two-sample KS statistic after the
/// effective-sample-size transform of [`ks_z`].
pub fn qks(z: f64) -> Result<f64> {
    if z < 0.0 {
        bail!("bad z for Kolmogorov distribution: {}", z);
    }
    if z == 0.0 {
        return Ok(1.0);
    }
    if z < 1.18 {
        Ok(1.0 - pks(z)?)
    } else {
        Ok(qks_tail(z))
    }
}

fn qks_tail(z: f64) -> f64 {
    let x = (-2.0 * z * z).exp();
    2.0 * (x - x.powi(4) + x.powi(9))
}

/// Maps a KS statistic `d` onto the Kolmogorov axis with the small-sample
/// correction `(sqrt(ne) + 0.12 + 0.11 / sqrt(ne)) * d`.
pub fn ks_z(d: f64, ne: f64) -> f64 {
    let en = ne.sqrt();
    (en + 0.12 + 0.11 / en) * d
}

/// Effective sample size of a two-sample comparison, `n1 * n2 / (n1 + n2)`.
pub fn effective_n(n1: usize, n2: usize) -> f64 {
    let (n1, n2) = (n1 as f64, n2 as f64);
    n1 * n2 / (n1 + n2)
}
