//! End-to-end coverage: filter a table with the query mini-language, extract
//! numeric samples, and run the two-sample tests on the result.

use approx::assert_abs_diff_eq;
use table_statistics::table::{Query, Selection, Table, Value};
use table_statistics::testing::inference::TableStatTests;
use table_statistics::testing::inference::nonparametric::{ks_2samp, ks_2samp_fd};
use table_statistics::testing::utils::frequency_distributions;
use table_statistics::testing::{Alternative, Distribution, TestMethod};

fn scores_table() -> Table {
    let mut t = Table::new(vec!["gene".into(), "score".into(), "class".into()]);
    let rows: [(&str, &str, f64, &str); 6] = [
        ("r1", "adh1", 5.0, "enzyme"),
        ("r2", "adh2", 10.0, "enzyme"),
        ("r3", "gpdh", 15.0, "enzyme"),
        ("r4", "hsp70", 40.0, "chaperone"),
        ("r5", "hsp83", 60.0, "chaperone"),
        ("r6", "adh3", 25.0, "enzyme"),
    ];
    for (label, gene, score, class) in rows {
        t.push_row(
            label,
            vec![Value::from(gene), Value::from(score), Value::from(class)],
        )
        .unwrap();
    }
    t
}

mod query_engine {
    use super::*;

    #[test]
    fn gte_keeps_exactly_the_matching_rows_in_order() {
        let mut t = Table::new(vec!["score".into()]);
        t.push_row("a", vec![Value::from(5.0)]).unwrap();
        t.push_row("b", vec![Value::from(10.0)]).unwrap();
        t.push_row("c", vec![Value::from(15.0)]).unwrap();

        let filtered = t.filter(&Query::new().and("score", "gte10")).unwrap();
        assert_eq!(filtered.labels(), &["b", "c"]);
        assert_eq!(filtered.numeric_column("score").unwrap(), vec![10.0, 15.0]);
        // The input table is untouched.
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = scores_table();
        let query = Query::new().and("score", "gte10");
        let once = t.filter(&query).unwrap();
        let twice = once.filter(&query).unwrap();
        assert_eq!(once.labels(), twice.labels());
    }

    #[test]
    fn tuple_form_intersects_and_list_form_unions() {
        let t = scores_table();

        // ("gte10", "lt50") = 10 <= score < 50.
        let range = t
            .filter(&Query::new().all_of("score", ["gte10", "lt50"]))
            .unwrap();
        let lower = t.filter(&Query::new().and("score", "gte10")).unwrap();
        let upper = t.filter(&Query::new().and("score", "lt50")).unwrap();
        let intersection: Vec<&String> = lower
            .labels()
            .iter()
            .filter(|l| upper.labels().contains(*l))
            .collect();
        assert_eq!(range.labels().iter().collect::<Vec<_>>(), intersection);

        // ["adh1", "gpdh"] = either gene name.
        let either = t
            .filter(&Query::new().any_of("gene", ["adh1", "gpdh"]))
            .unwrap();
        assert_eq!(either.labels(), &["r1", "r3"]);
    }

    #[test]
    fn distinct_columns_combine_by_and() {
        let t = scores_table();
        let filtered = t
            .filter(&Query::new().and("class", "enzyme").and("score", "gte10"))
            .unwrap();
        assert_eq!(filtered.labels(), &["r2", "r3", "r6"]);
    }

    #[test]
    fn scalar_query_values_mean_numeric_equality() {
        let t = scores_table();
        let hit = t.filter(&Query::new().and_num("score", 10.0)).unwrap();
        assert_eq!(hit.labels(), &["r2"]);
    }

    #[test]
    fn contains_and_not_contains() {
        let t = scores_table();
        let adh = t.filter(&Query::new().and("gene", "c/adh/")).unwrap();
        assert_eq!(adh.labels(), &["r1", "r2", "r6"]);
        let rest = t.filter(&Query::new().and("gene", "nc/adh/")).unwrap();
        assert_eq!(rest.labels(), &["r3", "r4", "r5"]);
    }

    #[test]
    fn wildcard_selects_every_row() {
        let t = scores_table();
        let all = t.filter(&Query::new().and("score", "*")).unwrap();
        assert_eq!(all.len(), t.len());
    }

    #[test]
    fn sorting_is_stable_both_directions() {
        let mut t = Table::new(vec!["k".into(), "v".into()]);
        t.push_row("a", vec![Value::from(1.0), Value::from("first")]).unwrap();
        t.push_row("b", vec![Value::from(2.0), Value::from("x")]).unwrap();
        t.push_row("c", vec![Value::from(1.0), Value::from("second")]).unwrap();

        let asc = t.filter(&Query::new().sort_by("k")).unwrap();
        assert_eq!(asc.labels(), &["a", "c", "b"]);

        let desc = t.filter(&Query::new().sort_by("k").ascending(false)).unwrap();
        // Ties keep their original order under the reversed comparator too.
        assert_eq!(desc.labels(), &["b", "a", "c"]);
    }

    #[test]
    fn unknown_columns_are_fatal() {
        let t = scores_table();
        assert!(t.filter(&Query::new().and("nope", "gte10")).is_err());
        assert!(t.filter(&Query::new().sort_by("nope")).is_err());
    }

    #[test]
    fn malformed_operand_degrades_to_literal_equality() {
        let mut t = Table::new(vec!["tag".into()]);
        t.push_row("a", vec![Value::from("gt")]).unwrap();
        t.push_row("b", vec![Value::from("gt5x")]).unwrap();

        // "gt" alone is not an operator, so it matches the literal cell.
        let hit = t.filter(&Query::new().and("tag", "gt")).unwrap();
        assert_eq!(hit.labels(), &["a"]);
    }

    #[test]
    fn star_key_returns_whole_table() {
        let t = scores_table();
        match t.get("*") {
            Some(Selection::All(whole)) => assert_eq!(whole.len(), 6),
            _ => panic!("expected the whole table"),
        }
    }
}

mod ks_equivalence {
    use super::*;

    #[test]
    fn raw_and_frequency_modes_agree() {
        let sample1: Vec<i64> = vec![104, 109, 112, 114, 116, 118, 118, 119, 121, 123, 125, 126];
        let sample2: Vec<i64> = vec![100, 105, 107, 107, 108, 111, 116, 120, 121, 123];

        let raw = ks_2samp(&sample1, &sample2).unwrap();
        let (_, fd1, fd2) = frequency_distributions(&sample1, &sample2).unwrap();
        let freq = ks_2samp_fd(&fd1, &fd2).unwrap();

        assert_abs_diff_eq!(raw.statistic, freq.statistic, epsilon = 1e-12);
        assert_abs_diff_eq!(raw.p_value, freq.p_value, epsilon = 1e-12);
    }
}

mod batch_comparison {
    use super::*;

    fn grouped_table() -> Table {
        let mut t = Table::new(vec!["group".into(), "expr".into(), "length".into()]);
        let rows: [(&str, &str, f64, f64); 8] = [
            ("r1", "a", 1.0, 300.0),
            ("r2", "a", 2.0, 310.0),
            ("r3", "a", 1.5, 295.0),
            ("r4", "a", 2.5, 305.0),
            ("r5", "b", 8.0, 301.0),
            ("r6", "b", 9.0, 299.0),
            ("r7", "b", 7.5, 308.0),
            ("r8", "b", 8.5, 297.0),
        ];
        for (label, group, expr, length) in rows {
            t.push_row(
                label,
                vec![Value::from(group), Value::from(expr), Value::from(length)],
            )
            .unwrap();
        }
        t
    }

    #[test]
    fn filter_then_compare_columns() {
        let t = grouped_table();
        let group_a = t.filter(&Query::new().and("group", "a")).unwrap();
        let group_b = t.filter(&Query::new().and("group", "b")).unwrap();

        let results = group_a
            .compare_columns(&group_b, &[], TestMethod::MannWhitney(Alternative::TwoSided))
            .unwrap();

        // "group" is a string column, so only the two numeric columns run.
        assert_eq!(results.columns, vec!["expr".to_string(), "length".to_string()]);
        assert_eq!(results.statistics.len(), 2);
        let adjusted = results.adjusted_p_values.as_ref().expect("BH attached");
        assert_eq!(adjusted.len(), 2);
        for &p in adjusted {
            assert!((0.0..=1.0).contains(&p));
        }

        // expr separates the groups completely; length does not.
        assert_eq!(results.top_columns(1), vec!["expr"]);
    }

    #[test]
    fn explicit_column_list_and_other_methods() {
        let t = grouped_table();
        let group_a = t.filter(&Query::new().and("group", "a")).unwrap();
        let group_b = t.filter(&Query::new().and("group", "b")).unwrap();

        let ks = group_a
            .compare_columns(&group_b, &["expr"], TestMethod::KolmogorovSmirnov)
            .unwrap();
        assert_eq!(ks.statistics[0], 1.0);

        let bm = group_a
            .compare_columns(
                &group_b,
                &["expr"],
                TestMethod::BrunnerMunzel(Distribution::StudentT),
            )
            .unwrap();
        assert_eq!(bm.columns, vec!["expr".to_string()]);
    }

    #[test]
    fn string_only_overlap_is_an_error() {
        let mut a = Table::new(vec!["name".into()]);
        a.push_row("x", vec![Value::from("foo")]).unwrap();
        let mut b = Table::new(vec!["name".into()]);
        b.push_row("y", vec![Value::from("bar")]).unwrap();
        assert!(a.compare_columns(&b, &[], TestMethod::KolmogorovSmirnov).is_err());
    }
}
