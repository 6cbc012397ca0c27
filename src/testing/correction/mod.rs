//! Multiple testing correction for batches of p-values.

use anyhow::{Result, anyhow};
use std::cmp::Ordering;

/// Bonferroni adjustment: each p-value multiplied by the number of tests,
/// capped at 1.0. Simple and conservative.
pub fn bonferroni(p_values: &[f64]) -> Result<Vec<f64>> {
    validate(p_values)?;
    let n = p_values.len() as f64;
    Ok(p_values.iter().map(|&p| (p * n).min(1.0)).collect())
}

/// Benjamini-Hochberg adjustment, controlling the false discovery rate.
///
/// P-values are ranked ascending; walking from the largest down, each
/// adjusted value is `min(p * n / rank, 1)` clamped to the running minimum
/// so the adjusted sequence stays monotone in the ranks.
pub fn benjamini_hochberg(p_values: &[f64]) -> Result<Vec<f64>> {
    validate(p_values)?;
    let n = p_values.len();

    let mut by_rank: Vec<(usize, f64)> = p_values.iter().copied().enumerate().collect();
    by_rank.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut adjusted = vec![0.0; n];
    let mut running_min = 1.0_f64;
    for (i, &(original_index, p)) in by_rank.iter().enumerate().rev() {
        let rank = (i + 1) as f64;
        running_min = running_min.min((p * n as f64 / rank).min(1.0));
        adjusted[original_index] = running_min;
    }
    Ok(adjusted)
}

fn validate(p_values: &[f64]) -> Result<()> {
    if p_values.is_empty() {
        return Err(anyhow!("empty p-value array"));
    }
    for (i, &p) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(anyhow!("invalid p-value at index {}: {}", i, p));
        }
    }
    Ok(())
}
