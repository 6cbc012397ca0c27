use anyhow::anyhow;
use std::str::FromStr;

pub mod correction;
pub mod inference;
pub mod utils;

/// Which two-sample test the batch driver runs per column.
#[derive(Debug, Clone, Copy)]
pub enum TestMethod {
    KolmogorovSmirnov,
    BrunnerMunzel(Distribution),
    MannWhitney(Alternative),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    TwoSided,
    Less,
    Greater,
}

impl FromStr for Alternative {
    type Err = anyhow::Error;

    /// Accepts the historical string spellings. Anything else is fatal and
    /// names the offending value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-sided" => Ok(Alternative::TwoSided),
            "less" => Ok(Alternative::Less),
            "greater" => Ok(Alternative::Greater),
            _ => Err(anyhow!(
                "alternative should be 'less', 'greater' or 'two-sided', got '{}'",
                s
            )),
        }
    }
}

/// Null distribution used to turn a rank statistic into a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Student's t with Satterthwaite-approximated degrees of freedom.
    /// Recommended for sample sizes of 50 or less.
    StudentT,
    Normal,
}

impl FromStr for Distribution {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "t" => Ok(Distribution::StudentT),
            "normal" => Ok(Distribution::Normal),
            _ => Err(anyhow!("distribution should be 't' or 'normal', got '{}'", s)),
        }
    }
}

/// Outcome of a single two-sample test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// The test statistic (D, W, or U depending on the test).
    pub statistic: f64,
    /// The p-value, in `[0, 1]`, or NaN when undefined.
    pub p_value: f64,
    /// Degrees of freedom, for tests evaluated against a t distribution.
    pub degrees_of_freedom: Option<f64>,
}

impl TestResult {
    pub fn new(statistic: f64, p_value: f64) -> Self {
        TestResult {
            statistic,
            p_value,
            degrees_of_freedom: None,
        }
    }

    /// Sentinel for degenerate inputs (e.g. an empty sample).
    pub fn nan() -> Self {
        TestResult::new(f64::NAN, f64::NAN)
    }

    pub fn with_degrees_of_freedom(mut self, df: f64) -> Self {
        self.degrees_of_freedom = Some(df);
        self
    }

    /// Whether the result is significant at the given threshold. NaN
    /// p-values are never significant.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Results of one test applied across many columns.
#[derive(Debug, Clone)]
pub struct MultipleTestResults {
    /// Column names, aligned with the value vectors.
    pub columns: Vec<String>,
    /// Test statistic per column.
    pub statistics: Vec<f64>,
    /// Raw (unadjusted) p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values after multiple testing correction.
    pub adjusted_p_values: Option<Vec<f64>>,
}

impl MultipleTestResults {
    pub fn new(columns: Vec<String>, statistics: Vec<f64>, p_values: Vec<f64>) -> Self {
        MultipleTestResults {
            columns,
            statistics,
            p_values,
            adjusted_p_values: None,
        }
    }

    pub fn with_adjusted_p_values(mut self, adjusted: Vec<f64>) -> Self {
        self.adjusted_p_values = Some(adjusted);
        self
    }

    /// Indices of columns significant at `alpha`, judged on adjusted
    /// p-values when present.
    pub fn significant_indices(&self, alpha: f64) -> Vec<usize> {
        self.effective_p_values()
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| if p < alpha { Some(i) } else { None })
            .collect()
    }

    /// The `n` column names with the smallest p-values, ascending.
    pub fn top_columns(&self, n: usize) -> Vec<&str> {
        let p_values = self.effective_p_values();
        let mut indices: Vec<usize> = (0..p_values.len()).collect();
        indices.sort_by(|&a, &b| {
            p_values[a]
                .partial_cmp(&p_values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        indices.truncate(n);
        indices.into_iter().map(|i| self.columns[i].as_str()).collect()
    }

    fn effective_p_values(&self) -> &[f64] {
        self.adjusted_p_values.as_deref().unwrap_or(&self.p_values)
    }
}
