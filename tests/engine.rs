//! End-to-end tests for the splicing interpreter.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use blockscript::adapter::{IntAdapter, StringAdapter};
use blockscript::{AdapterMap, Error, Interpreter, ProcessOptions, block};

fn engine() -> Interpreter {
    Interpreter::new(block::defaults())
}

fn process(engine: &Interpreter, message: &str, variables: AdapterMap) -> blockscript::Response {
    engine
        .process(message, variables, ProcessOptions::default())
        .expect("pass should succeed")
}

#[test]
fn plain_text_passes_through() {
    let engine = engine();
    let response = process(&engine, "no blocks here at all", AdapterMap::new());
    assert_eq!(response.body(), "no blocks here at all");
}

#[test]
fn escaped_braces_are_literal_text() {
    let engine = engine();
    let response = process(&engine, "stay \\{literal\\} stay", AdapterMap::new());
    assert_eq!(response.body(), "stay \\{literal\\} stay");
}

#[test]
fn if_block_picks_payload_half() {
    let engine = engine();
    assert_eq!(
        process(&engine, "{if(1==1):yes|no}", AdapterMap::new()).body(),
        "yes"
    );
    assert_eq!(
        process(&engine, "{if(1==2):yes|no}", AdapterMap::new()).body(),
        "no"
    );
}

#[test]
fn nested_conditionals_resolve_innermost_first() {
    let engine = engine();
    let script = "{if({a}==1):{if({b}==2):AA|AB}|{if({b}==2):BA|BB}}";
    let cases = [((1, 2), "AA"), ((1, 3), "AB"), ((2, 2), "BA"), ((2, 3), "BB")];
    for ((a, b), expected) in cases {
        let mut variables = AdapterMap::new();
        variables.insert("a".to_string(), Arc::new(IntAdapter::new(a)));
        variables.insert("b".to_string(), Arc::new(IntAdapter::new(b)));
        let response = process(&engine, script, variables);
        assert_eq!(response.body(), expected, "a={a} b={b}");
    }
}

#[test]
fn unknown_declaration_passes_through_unchanged() {
    let engine = engine();
    let response = process(&engine, "{totally_unknown_block:x}", AdapterMap::new());
    assert_eq!(response.body(), "{totally_unknown_block:x}");
}

#[test]
fn growing_and_shrinking_substitutions_keep_siblings_aligned() {
    let engine = engine();
    let mut variables = AdapterMap::new();
    variables.insert(
        "long".to_string(),
        Arc::new(StringAdapter::new("a much longer replacement")),
    );
    variables.insert("s".to_string(), Arc::new(StringAdapter::new("x")));
    let response = process(&engine, "[{long}] [{s}] [{long}]", variables);
    assert_eq!(
        response.body(),
        "[a much longer replacement] [x] [a much longer replacement]"
    );
}

#[test]
fn stop_discards_everything_after_the_node() {
    let engine = engine();
    let response = process(
        &engine,
        "{stop(true):STOP HERE}trailing text {if(1==1):gone}",
        AdapterMap::new(),
    );
    assert_eq!(response.body(), "STOP HERE");
}

#[test]
fn stop_keeps_text_resolved_before_the_node() {
    let engine = engine();
    let response = process(&engine, "kept {stop(1==1):done}", AdapterMap::new());
    assert_eq!(response.body(), "kept done");
}

#[test]
fn false_stop_is_erased_and_the_pass_continues() {
    let engine = engine();
    let response = process(&engine, "a{stop(1==2):never}b", AdapterMap::new());
    assert_eq!(response.body(), "ab");
}

#[test]
fn workload_fails_exactly_on_the_overflowing_substitution() {
    let engine = engine();
    let mut variables = AdapterMap::new();
    // Ten characters per substitution: 10, 20, then 30 > 25.
    variables.insert("v".to_string(), Arc::new(StringAdapter::new("0123456789")));
    let options = ProcessOptions {
        charlimit: Some(25),
        ..ProcessOptions::default()
    };
    let err = engine
        .process("{v}{v}{v}", variables, options)
        .expect_err("third substitution should overflow");
    match err {
        Error::WorkloadExceeded { attempted, limit } => {
            assert_eq!(attempted, 30);
            assert_eq!(limit, 25);
        }
        other => panic!("expected WorkloadExceeded, got {other:?}"),
    }
}

#[test]
fn workload_under_the_limit_succeeds() {
    let engine = engine();
    let mut variables = AdapterMap::new();
    variables.insert("v".to_string(), Arc::new(StringAdapter::new("0123456789")));
    let options = ProcessOptions {
        charlimit: Some(25),
        ..ProcessOptions::default()
    };
    let response = engine
        .process("{v}{v}", variables, options)
        .expect("two substitutions fit the budget");
    assert_eq!(response.body(), "01234567890123456789");
}

#[test]
fn seeded_random_is_deterministic() {
    let engine = engine();
    let first = process(&engine, "{random(pick):A,B,C}", AdapterMap::new());
    for _ in 0..10 {
        let again = process(&engine, "{random(pick):A,B,C}", AdapterMap::new());
        assert_eq!(again.body(), first.body());
    }
    assert!(["A", "B", "C"].contains(&first.body()));
}

#[test]
fn dot_parameter_mode_resolves_attribute_access() {
    let engine = engine();
    let mut variables = AdapterMap::new();
    variables.insert(
        "user".to_string(),
        Arc::new(
            blockscript::adapter::AttributeAdapter::new("Carl").attribute("id", 12345_i64),
        ),
    );
    let options = ProcessOptions {
        dot_parameter: true,
        ..ProcessOptions::default()
    };
    let response = engine
        .process("{user.id}", variables, options)
        .expect("pass should succeed");
    assert_eq!(response.body(), "12345");
}

#[test]
fn process_wraps_block_failures_with_the_partial_response() {
    use blockscript::{Block, Context, Result};

    struct FailingBlock;

    impl Block for FailingBlock {
        fn accepted_names(&self) -> &'static [&'static str] {
            &["boom"]
        }

        fn process(&self, _ctx: &mut Context<'_>) -> Result<Option<String>> {
            Err(Error::unexpected("backend offline"))
        }
    }

    let mut blocks = block::defaults();
    blocks.push(Box::new(FailingBlock));
    let engine = Interpreter::new(blocks);
    let err = engine
        .process(
            "{=(mark):set}{boom}",
            AdapterMap::new(),
            ProcessOptions::default(),
        )
        .expect_err("the failing block should abort the pass");
    match err {
        Error::Process { response, .. } => {
            // The assignment before the failure is still visible.
            assert!(response.variables.contains_key("mark"));
        }
        other => panic!("expected Process, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn brace_free_input_round_trips(input in "[a-zA-Z0-9 .,!?-]*") {
        let engine = engine();
        let response = engine
            .process(&input, HashMap::new(), ProcessOptions::default())
            .expect("pass should succeed");
        prop_assert_eq!(response.body(), input.trim());
    }
}
