// tests/decision.rs

mod common;
use crate::common::{ids, row};

use proptest::prelude::*;
use sqlbranch::branch::{BranchDecision, ResultRow, Value, decide, skip_set};

#[test]
fn count_of_matching_rows_passes() {
    let r = row([3i64]);
    assert_eq!(decide(Some(&r), "pass", "fail"), BranchDecision::Pass("pass".into()));
}

#[test]
fn zero_count_fails() {
    let r = row([0i64]);
    assert_eq!(decide(Some(&r), "pass", "fail"), BranchDecision::Fail("fail".into()));
}

#[test]
fn no_rows_fails() {
    assert_eq!(decide(None, "pass", "fail"), BranchDecision::Fail("fail".into()));
}

#[test]
fn zero_column_row_fails() {
    let r = ResultRow::default();
    assert_eq!(decide(Some(&r), "pass", "fail").task_id(), "fail");
}

#[test]
fn one_empty_string_fails_the_whole_row() {
    let r = ResultRow::new(vec![Value::Int(1), Value::Text(String::new())]);
    assert_eq!(decide(Some(&r), "pass", "fail").task_id(), "fail");
}

#[test]
fn truthiness_table() {
    let falsy = [
        Value::Null,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::Float(-0.0),
        Value::Text(String::new()),
        Value::List(vec![]),
        Value::Record(vec![]),
    ];
    for v in falsy.iter() {
        assert!(!v.is_truthy(), "{v:?} should be falsy");
    }

    let truthy = [
        Value::Bool(true),
        Value::Int(-1),
        Value::Float(0.5),
        Value::Float(f64::NAN),
        Value::Text("0".into()),
        Value::Text("false".into()),
        Value::List(vec![Value::Null]),
        Value::Record(vec![("a".into(), Value::Int(0))]),
    ];
    for v in truthy.iter() {
        assert!(v.is_truthy(), "{v:?} should be truthy");
    }
}

#[test]
fn none_converts_to_null() {
    let r = row([Some(1i64), None]);
    assert_eq!(r.values()[1], Value::Null);
    assert_eq!(decide(Some(&r), "pass", "fail").task_id(), "fail");
}

#[test]
fn skip_set_excludes_followed_branch() {
    let downstream = ids(&["A", "B", "C"]);
    let decision = BranchDecision::Pass("B".into());
    assert_eq!(skip_set(&downstream, &decision), ids(&["A", "C"]));
}

#[test]
fn skip_set_skips_everything_when_branch_is_not_downstream() {
    let downstream = ids(&["A", "C"]);
    let decision = BranchDecision::Fail("B".into());
    assert_eq!(skip_set(&downstream, &decision), downstream);
}

fn truthy_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Bool(true)),
        any::<i64>().prop_filter("non-zero", |n| *n != 0).prop_map(Value::Int),
        "[a-z0-9]{1,8}".prop_map(Value::Text),
    ]
}

fn falsy_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::Bool(false)),
        Just(Value::Int(0)),
        Just(Value::Float(0.0)),
        Just(Value::Text(String::new())),
        Just(Value::List(vec![])),
    ]
}

proptest! {
    #[test]
    fn all_truthy_rows_pass(values in proptest::collection::vec(truthy_value(), 1..8)) {
        let r = ResultRow::new(values);
        prop_assert_eq!(decide(Some(&r), "p", "f"), BranchDecision::Pass("p".into()));
    }

    #[test]
    fn any_falsy_value_fails(
        mut values in proptest::collection::vec(truthy_value(), 0..8),
        bad in falsy_value(),
        at in any::<prop::sample::Index>(),
    ) {
        let pos = at.index(values.len() + 1);
        values.insert(pos, bad);
        let r = ResultRow::new(values);
        prop_assert_eq!(decide(Some(&r), "p", "f"), BranchDecision::Fail("f".into()));
    }

    #[test]
    fn decide_is_idempotent(
        values in proptest::collection::vec(prop_oneof![truthy_value(), falsy_value()], 0..6),
    ) {
        let r = ResultRow::new(values);
        prop_assert_eq!(decide(Some(&r), "p", "f"), decide(Some(&r), "p", "f"));
    }

    #[test]
    fn skip_set_is_downstream_minus_choice(
        downstream in proptest::collection::btree_set("[A-E]", 0..5),
        chosen in "[A-E]",
    ) {
        let downstream: Vec<String> = downstream.into_iter().collect();
        let decision = BranchDecision::Pass(chosen.clone());
        let skip = skip_set(&downstream, &decision);

        prop_assert!(!skip.contains(&chosen));
        let expected: Vec<&String> = downstream.iter().filter(|t| **t != chosen).collect();
        prop_assert_eq!(skip.iter().collect::<Vec<_>>(), expected);
    }
}
