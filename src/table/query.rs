//! String-encoded predicate language and the table filter.
//!
//! Queries are built from per-column operand strings in the mini-language the
//! analysis scripts have always used:
//!
//! | operand        | meaning                         |
//! |----------------|---------------------------------|
//! | `gt100`        | column > 100                    |
//! | `gte100`       | column >= 100                   |
//! | `lt100`        | column < 100                    |
//! | `lte100`       | column <= 100                   |
//! | `ne100`        | column != 100                   |
//! | `c/pat/`       | string column contains `pat`    |
//! | `nc/pat/`      | string column excludes `pat`    |
//! | `*`            | always true                     |
//! | anything else  | literal equality                |
//!
//! Operands are turned into a tagged [`Predicate`] by an explicit parse step,
//! so evaluation never re-inspects strings. Alternatives combine two ways:
//! list form ([`Query::any_of`]) is a disjunction, tuple form
//! ([`Query::all_of`]) narrows successively, e.g. `("gte10", "lt50")` for a
//! half-open range. Distinct columns always combine by AND.

use anyhow::{Result, bail};

use super::{Table, Value};

// ── Predicate ─────────────────────────────────────────────────────────

/// One filter condition on one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Literal equality against a number or string.
    Eq(Value),
    /// Numeric inequality.
    Ne(f64),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
    /// String cell contains the pattern.
    Contains(String),
    /// String cell does not contain the pattern.
    NotContains(String),
    /// Trivially true for every row.
    Wildcard,
}

impl Predicate {
    /// Parses an operand string. This is total: an operand that matches no
    /// recognized operator form degrades to literal string equality, even
    /// when it merely resembles one (`"gt"` alone, `"gt-5"`). That silent
    /// fallthrough is a long-standing sharp edge of the mini-language and is
    /// kept for compatibility with existing query strings.
    pub fn parse(operand: &str) -> Predicate {
        if operand == "*" {
            return Predicate::Wildcard;
        }
        // Longer prefixes first so "gte"/"lte"/"nc/" never lose to their
        // two-character cousins.
        if let Some(v) = operand.strip_prefix("gte").and_then(parse_unsigned) {
            return Predicate::Gte(v);
        }
        if let Some(v) = operand.strip_prefix("gt").and_then(parse_unsigned) {
            return Predicate::Gt(v);
        }
        if let Some(v) = operand.strip_prefix("lte").and_then(parse_unsigned) {
            return Predicate::Lte(v);
        }
        if let Some(v) = operand.strip_prefix("lt").and_then(parse_unsigned) {
            return Predicate::Lt(v);
        }
        if let Some(v) = operand.strip_prefix("ne").and_then(parse_unsigned) {
            return Predicate::Ne(v);
        }
        if let Some(pat) = strip_slashes(operand, "nc/") {
            return Predicate::NotContains(pat.to_string());
        }
        if let Some(pat) = strip_slashes(operand, "c/") {
            return Predicate::Contains(pat.to_string());
        }
        Predicate::Eq(Value::Str(operand.to_string()))
    }

    /// Numeric equality against a scalar query value.
    pub fn eq_num(v: f64) -> Predicate {
        Predicate::Eq(Value::Num(v))
    }

    /// Evaluates the predicate against one cell. Numeric operators only
    /// match numeric cells, substring operators only string cells; a missing
    /// cell matches nothing but the wildcard.
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            Predicate::Wildcard => true,
            Predicate::Eq(expected) => cell == expected,
            Predicate::Ne(v) => cell.as_num().is_some_and(|c| c != *v),
            Predicate::Gt(v) => cell.as_num().is_some_and(|c| c > *v),
            Predicate::Gte(v) => cell.as_num().is_some_and(|c| c >= *v),
            Predicate::Lt(v) => cell.as_num().is_some_and(|c| c < *v),
            Predicate::Lte(v) => cell.as_num().is_some_and(|c| c <= *v),
            Predicate::Contains(pat) => cell.as_str().is_some_and(|s| s.contains(pat)),
            Predicate::NotContains(pat) => cell.as_str().is_some_and(|s| !s.contains(pat)),
        }
    }
}

/// The operand grammar only admits unsigned decimals (`\d+\.*\d*`): a
/// leading digit, then digits and dots. No sign, no exponent.
fn parse_unsigned(s: &str) -> Option<f64> {
    let mut chars = s.chars();
    if !chars.next()?.is_ascii_digit() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    s.parse().ok()
}

/// `c/pat/` and `nc/pat/` need both delimiters and a non-empty pattern.
fn strip_slashes<'a>(operand: &'a str, prefix: &str) -> Option<&'a str> {
    let pat = operand.strip_prefix(prefix)?.strip_suffix('/')?;
    if pat.is_empty() { None } else { Some(pat) }
}

// ── Clause / Query ────────────────────────────────────────────────────

/// How one column's predicates combine.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    One(Predicate),
    /// Disjunction: a row matches if any alternative matches (list form).
    Any(Vec<Predicate>),
    /// Conjunction: alternatives narrow the row set in order (tuple form).
    All(Vec<Predicate>),
}

impl Clause {
    fn matches(&self, cell: &Value) -> bool {
        match self {
            Clause::One(p) => p.matches(cell),
            Clause::Any(ps) => ps.iter().any(|p| p.matches(cell)),
            Clause::All(ps) => ps.iter().all(|p| p.matches(cell)),
        }
    }
}

/// A set of per-column clauses, combined by AND across columns, with an
/// optional sort key.
#[derive(Debug, Clone)]
pub struct Query {
    clauses: Vec<(String, Clause)>,
    sort_by: Option<String>,
    ascending: bool,
}

impl Default for Query {
    fn default() -> Self {
        Query::new()
    }
}

impl Query {
    pub fn new() -> Query {
        Query {
            clauses: Vec::new(),
            sort_by: None,
            ascending: true,
        }
    }

    /// Adds a parsed-operand clause for `column`.
    pub fn and(mut self, column: &str, operand: &str) -> Query {
        self.clauses
            .push((column.to_string(), Clause::One(Predicate::parse(operand))));
        self
    }

    /// Adds a numeric-equality clause for `column`.
    pub fn and_num(mut self, column: &str, value: f64) -> Query {
        self.clauses
            .push((column.to_string(), Clause::One(Predicate::eq_num(value))));
        self
    }

    /// Adds a disjunctive (list-form) clause: rows matching any operand.
    pub fn any_of<'a, I>(mut self, column: &str, operands: I) -> Query
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ps = operands.into_iter().map(Predicate::parse).collect();
        self.clauses.push((column.to_string(), Clause::Any(ps)));
        self
    }

    /// Adds a conjunctive (tuple-form) clause: every operand must hold, e.g.
    /// `("gte10", "lt50")` for 10 <= column < 50.
    pub fn all_of<'a, I>(mut self, column: &str, operands: I) -> Query
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ps = operands.into_iter().map(Predicate::parse).collect();
        self.clauses.push((column.to_string(), Clause::All(ps)));
        self
    }

    /// Sorts the filtered rows by `column`. The sort is stable: ties keep
    /// their original row order.
    pub fn sort_by(mut self, column: &str) -> Query {
        self.sort_by = Some(column.to_string());
        self
    }

    /// Sort direction; ascending by default.
    pub fn ascending(mut self, ascending: bool) -> Query {
        self.ascending = ascending;
        self
    }
}

impl Table {
    /// Returns a new table containing exactly the rows for which every
    /// clause of `query` holds, optionally sorted. The receiver is never
    /// mutated. An empty query selects every row.
    ///
    /// Errors on column names (clause or sort key) the table does not have.
    pub fn filter(&self, query: &Query) -> Result<Table> {
        let mut resolved = Vec::with_capacity(query.clauses.len());
        for (column, clause) in &query.clauses {
            let Some(col) = self.column_index(column) else {
                bail!("column '{}' not found", column);
            };
            resolved.push((col, clause));
        }

        let mut kept: Vec<usize> = (0..self.len()).collect();
        for (col, clause) in resolved {
            kept.retain(|&i| clause.matches(&self.rows[i][col]));
        }

        if let Some(sort_column) = &query.sort_by {
            let Some(col) = self.column_index(sort_column) else {
                bail!("sort column '{}' not found", sort_column);
            };
            kept.sort_by(|&a, &b| {
                let ord = self.rows[a][col].sort_cmp(&self.rows[b][col]);
                if query.ascending { ord } else { ord.reverse() }
            });
        }

        Ok(self.subset(&kept))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_operators() {
        assert_eq!(Predicate::parse("*"), Predicate::Wildcard);
        assert_eq!(Predicate::parse("gt100"), Predicate::Gt(100.0));
        assert_eq!(Predicate::parse("gte100"), Predicate::Gte(100.0));
        assert_eq!(Predicate::parse("lt2.5"), Predicate::Lt(2.5));
        assert_eq!(Predicate::parse("lte2.5"), Predicate::Lte(2.5));
        assert_eq!(Predicate::parse("ne0"), Predicate::Ne(0.0));
        assert_eq!(
            Predicate::parse("c/adh/"),
            Predicate::Contains("adh".into())
        );
        assert_eq!(
            Predicate::parse("nc/adh/"),
            Predicate::NotContains("adh".into())
        );
    }

    #[test]
    fn parse_falls_through_to_equality() {
        // Documented sharp edge: near-miss operands are literals.
        assert_eq!(Predicate::parse("gt"), Predicate::Eq(Value::Str("gt".into())));
        assert_eq!(
            Predicate::parse("gt-5"),
            Predicate::Eq(Value::Str("gt-5".into()))
        );
        assert_eq!(
            Predicate::parse("c/unclosed"),
            Predicate::Eq(Value::Str("c/unclosed".into()))
        );
        assert_eq!(
            Predicate::parse("c//"),
            Predicate::Eq(Value::Str("c//".into()))
        );
        assert_eq!(
            Predicate::parse("plain"),
            Predicate::Eq(Value::Str("plain".into()))
        );
    }

    #[test]
    fn numeric_predicates_ignore_strings_and_missing() {
        let p = Predicate::Gte(10.0);
        assert!(p.matches(&Value::Num(10.0)));
        assert!(!p.matches(&Value::Num(9.9)));
        assert!(!p.matches(&Value::Str("10".into())));
        assert!(!p.matches(&Value::Missing));
        assert!(Predicate::Wildcard.matches(&Value::Missing));
    }

    #[test]
    fn contains_predicates_only_match_strings() {
        let p = Predicate::Contains("dh".into());
        assert!(p.matches(&Value::Str("adh1".into())));
        assert!(!p.matches(&Value::Num(1.0)));
        let n = Predicate::NotContains("dh".into());
        assert!(n.matches(&Value::Str("gpx".into())));
        assert!(!n.matches(&Value::Num(1.0)));
    }
}
