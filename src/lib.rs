//! # table-statistics
//!
//! A small library for filtering in-memory tables with a string-encoded
//! predicate language and for comparing the resulting samples with two-sample
//! nonparametric tests.
//!
//! The crate grew out of interactive analysis scripts: a caller holds a table
//! of parsed records (produced by external file parsers), narrows it down with
//! [`table::Table::filter`], extracts numeric columns, and hands the samples
//! to the tests in [`testing::inference`]. The two halves never call each
//! other; composition happens in calling code.
//!
//! ## Core Features
//!
//! - **Query engine**: per-column predicates (`gt`/`gte`/`lt`/`lte`/`ne`,
//!   substring contains/not-contains, wildcard), OR over list-form
//!   alternatives, AND over tuple-form alternatives, stable sorting
//! - **Two-sample tests**: Kolmogorov-Smirnov (raw samples or frequency
//!   distributions, with a from-scratch asymptotic p-value), Brunner-Munzel
//!   and Mann-Whitney rank tests, each with a scaled variant
//! - **Batch comparison**: column-wise tests between two filtered tables with
//!   Benjamini-Hochberg adjusted p-values
//!
//! ## Module Organization
//!
//! - **[`table`]**: the table data model and the query/filter engine
//! - **[`testing`]**: statistical tests, shared result types, and multiple
//!   testing correction

pub mod table;
pub mod testing;
