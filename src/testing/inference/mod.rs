use crate::table::Table;
use crate::testing::{Alternative, MultipleTestResults, TestMethod, TestResult, correction};
use anyhow::{Result, bail};
use rayon::prelude::*;

pub mod kolmogorov;
pub mod nonparametric;

/// Column-wise two-sample testing between two tables, typically two filtered
/// subsets of one source table.
pub trait TableStatTests {
    /// Runs `method` once per named column, comparing this table's numeric
    /// values against `other`'s. An empty `columns` slice selects every
    /// column shared by both tables that yields numeric data. Adjusted
    /// p-values are Benjamini-Hochberg.
    fn compare_columns(
        &self,
        other: &Table,
        columns: &[&str],
        method: TestMethod,
    ) -> Result<MultipleTestResults>;
}

impl TableStatTests for Table {
    fn compare_columns(
        &self,
        other: &Table,
        columns: &[&str],
        method: TestMethod,
    ) -> Result<MultipleTestResults> {
        let columns: Vec<String> = if columns.is_empty() {
            self.columns()
                .iter()
                .filter(|c| other.column_index(c).is_some())
                .filter(|c| self.numeric_column(c).is_ok() && other.numeric_column(c).is_ok())
                .cloned()
                .collect()
        } else {
            columns.iter().map(|c| c.to_string()).collect()
        };
        if columns.is_empty() {
            bail!("no shared numeric columns to compare");
        }

        let results: Result<Vec<TestResult>> = columns
            .par_iter()
            .map(|column| {
                let sample1 = self.numeric_column(column)?;
                let sample2 = other.numeric_column(column)?;
                run_method(&sample1, &sample2, method)
            })
            .collect();
        let results = results?;

        let statistics: Vec<f64> = results.iter().map(|r| r.statistic).collect();
        let p_values: Vec<f64> = results.iter().map(|r| r.p_value).collect();

        // Degenerate columns carry a NaN p-value; they adjust as maximally
        // non-significant so one bad column cannot abort the batch.
        let for_adjustment: Vec<f64> = p_values
            .iter()
            .map(|&p| if p.is_finite() { p } else { 1.0 })
            .collect();
        let adjusted = correction::benjamini_hochberg(&for_adjustment)?;

        Ok(MultipleTestResults::new(columns, statistics, p_values)
            .with_adjusted_p_values(adjusted))
    }
}

fn run_method(sample1: &[f64], sample2: &[f64], method: TestMethod) -> Result<TestResult> {
    match method {
        TestMethod::KolmogorovSmirnov => nonparametric::ks_2samp(sample1, sample2),
        TestMethod::BrunnerMunzel(distribution) => Ok(nonparametric::brunner_munzel(
            sample1,
            sample2,
            Alternative::TwoSided,
            distribution,
        )),
        TestMethod::MannWhitney(alternative) => {
            Ok(nonparametric::mann_whitney(sample1, sample2, alternative))
        }
    }
}
