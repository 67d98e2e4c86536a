mod common;

use bcf_core::commands::{CommandError, Dispatch, Value};
use common::{call, record, shop, Recorder};

fn dispatch(line: &str) -> (Option<Dispatch>, Vec<(String, Vec<Value>)>) {
    let registry = shop();
    let recorder = Recorder::default();
    let outcome = registry
        .dispatch(&recorder, line, &[])
        .map(|result| result.unwrap());
    (outcome, recorder.take())
}

#[test]
fn buy_with_and_without_default() {
    assert_eq!(
        dispatch("s buy apple 3"),
        (
            Some(Dispatch::Execute),
            vec![call("buy", vec![Value::from("apple"), Value::Integer(3)])]
        )
    );
    assert_eq!(
        dispatch("shop buy apple"),
        (
            Some(Dispatch::Execute),
            vec![call("buy", vec![Value::from("apple"), Value::Integer(1)])]
        )
    );
}

#[test]
fn out_of_range_reaches_root_error_handler() {
    assert_eq!(
        dispatch("shop buy apple 99"),
        (
            Some(Dispatch::Error),
            vec![call("error", vec![Value::from("99 is greater than 64")])]
        )
    );
}

#[test]
fn nearest_error_handler_wins() {
    assert_eq!(
        dispatch("shop price set apple x"),
        (
            Some(Dispatch::Error),
            vec![call("price-error", vec![Value::from("'x' is not a valid number")])]
        )
    );
}

#[test]
fn switch_may_appear_anywhere() {
    let expected = vec![call(
        "sell",
        vec![Value::from("silver"), Value::from("apple"), Value::Integer(5)],
    )];
    for line in [
        "shop sell -c silver apple 5",
        "shop sell apple -currency silver 5",
        "shop sell apple 5 -c silver",
    ] {
        assert_eq!(dispatch(line), (Some(Dispatch::Execute), expected.clone()), "{line}");
    }

    assert_eq!(
        dispatch("shop sell apple 5").1,
        vec![call(
            "sell",
            vec![Value::from("gold"), Value::from("apple"), Value::Integer(5)],
        )]
    );
}

#[test]
fn unsuppressed_literal_is_passed_on() {
    assert_eq!(
        dispatch("shop price add apple 2.5").1,
        vec![call(
            "price",
            vec![Value::from("add"), Value::from("apple"), Value::Double(2.5)],
        )]
    );
}

#[test]
fn dead_ends_fall_back_to_help() {
    for line in ["shop", "shop   ", "shop sell", "shop buy", "shop refund now"] {
        assert_eq!(
            dispatch(line),
            (Some(Dispatch::Default), vec![call("help", vec![])]),
            "{line}"
        );
    }
}

#[test]
fn leading_dash_is_read_as_a_switch() {
    // "-1" is taken for a flag, no switch answers to it, so the path ends at
    // the item name.
    assert_eq!(
        dispatch("shop price set apple -1"),
        (Some(Dispatch::Default), vec![call("help", vec![])])
    );
}

#[test]
fn tokens_after_a_leaf_are_ignored() {
    assert_eq!(
        dispatch("shop list everything"),
        (Some(Dispatch::Execute), vec![call("list", vec![])])
    );
}

#[test]
fn unknown_label() {
    let registry = shop();
    let recorder = Recorder::default();
    assert!(registry.dispatch(&recorder, "market list", &[]).is_none());
    assert!(!registry.execute(&recorder, "market list"));
    assert!(recorder.calls().is_empty());
}

#[test]
fn base_arguments_come_first() {
    let registry = shop();
    let recorder = Recorder::default();
    registry
        .dispatch(&recorder, "shop buy pear", &[Value::from("console")])
        .unwrap()
        .unwrap();
    assert_eq!(
        recorder.take(),
        vec![call(
            "buy",
            vec![Value::from("console"), Value::from("pear"), Value::Integer(1)],
        )]
    );
}

#[test]
fn failing_handler_is_reported() {
    let mut registry = shop();
    registry
        .command("shop")
        .on_execute("close", 0, |_| Err(CommandError::runtime("shop is busy")));
    let recorder = Recorder::default();

    assert!(matches!(
        registry.dispatch(&recorder, "shop close", &[]),
        Some(Err(CommandError::Runtime(_)))
    ));
    assert!(!registry.execute(&recorder, "shop close"));
    assert!(registry.execute(&recorder, "shop list"));
}

#[test]
fn registry_is_shared_between_threads() {
    let registry = shop();
    std::thread::scope(|scope| {
        for item in ["apple", "pear", "plum", "fig"] {
            let registry = &registry;
            scope.spawn(move || {
                let recorder = Recorder::default();
                for amount in 1..=20 {
                    let line = format!("shop sell {item} {amount} -c copper");
                    assert!(registry.execute(&recorder, &line));
                }
                let calls = recorder.take();
                assert_eq!(calls.len(), 20);
                for (amount, (name, args)) in (1..=20).zip(calls) {
                    assert_eq!(name, "sell");
                    assert_eq!(
                        args,
                        [Value::from("copper"), Value::from(item), Value::Integer(amount)]
                    );
                }
            });
        }
    });
}

#[test]
fn handlers_bound_on_aliases_share_the_tree() {
    let mut registry = shop();
    registry.command("s").on_execute("stock", 0, record("stock"));
    let recorder = Recorder::default();
    assert!(registry.execute(&recorder, "shop stock"));
    assert_eq!(recorder.take(), vec![call("stock", vec![])]);
}
