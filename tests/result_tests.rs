// tests/result_tests.rs

mod common;

use common::{lights, lights_builder};
use vakya::{literals, one_or_more, pattern, rule, sequence, ActionError, ErrorCategory, Grammar, Value};

fn colors_and_lights() -> Grammar {
    Grammar::builder()
        .define("color", pattern("red|yellow|blue"))
        .define("light", literals(["top", "middle", "bottom"]))
        .define("inner", sequence([rule("light"), rule("color")]))
        .define("GOAL", sequence([rule("color"), rule("inner")]))
        .build()
        .unwrap()
}

// ---
// Flattening
// ---

#[test]
fn test_child_names_float_to_parent() {
    let grammar = colors_and_lights();
    let outcome = grammar.parse("red then top blue").unwrap();

    assert_eq!(outcome.get("light"), Some(&Value::from("top")));
    assert_eq!(outcome.result.get_path("inner.light"), Some(&Value::from("top")));
}

#[test]
fn test_direct_binding_wins_over_floated_name() {
    let grammar = colors_and_lights();
    let outcome = grammar.parse("red then top blue").unwrap();

    // the scope's own color is not merged with the one inside `inner`
    assert_eq!(outcome.get("color"), Some(&Value::from("red")));
    assert_eq!(outcome.result.get_path("inner.color"), Some(&Value::from("blue")));
}

#[test]
fn test_explicit_sequence_nests_in_list_view() {
    let grammar = colors_and_lights();
    let outcome = grammar.parse("red top blue").unwrap();

    assert_eq!(outcome.result.len(), 2);
    assert_eq!(outcome.result[0], Value::from("red"));
    assert_eq!(outcome.result[1].text(), "top blue");
}

#[test]
fn test_implicit_sequence_splices_into_list_view() {
    let grammar = Grammar::builder()
        .define("GOAL", sequence([literals(["set"]), sequence([literals(["top"]), pattern("red")])]))
        .build()
        .unwrap();
    let outcome = grammar.parse("set top red").unwrap();

    let items: Vec<String> = outcome.result.iter().map(Value::text).collect();
    assert_eq!(items, vec!["set", "top", "red"]);
    assert_eq!(outcome.get("Set(top)"), Some(&Value::from("top")));
}

#[test]
fn test_alias_binds_both_names() {
    let grammar = Grammar::builder()
        .define("color", pattern("red|blue"))
        .define("hue", rule("color"))
        .define("GOAL", sequence([literals(["paint"]), rule("hue")]))
        .build()
        .unwrap();
    let outcome = grammar.parse("paint it blue").unwrap();

    assert_eq!(outcome.get("hue"), Some(&Value::from("blue")));
    assert_eq!(outcome.get("color"), Some(&Value::from("blue")));
}

// ---
// Multiplicity
// ---

#[test]
fn test_repeated_name_becomes_list() {
    let grammar = Grammar::builder()
        .define("color", pattern("red|yellow|blue"))
        .define("GOAL", one_or_more(rule("color")))
        .build()
        .unwrap();

    let many = grammar.parse("red and blue or yellow").unwrap();
    assert_eq!(
        many.get("color"),
        Some(&Value::List(vec![Value::from("red"), Value::from("blue"), Value::from("yellow")]))
    );
    assert_eq!(many.result.len(), 3);

    let one = grammar.parse("just red").unwrap();
    assert_eq!(one.get("color"), Some(&Value::from("red")));
}

#[test]
fn test_occurrences_keep_match_order_across_clauses() {
    let grammar = lights();
    let outcome = grammar
        .parse("blink bottom blue then set top light red and change middle yellow")
        .unwrap();

    let actions = outcome.get("action").and_then(Value::as_list).unwrap();
    let actions: Vec<&str> = actions.iter().filter_map(Value::as_text).collect();
    assert_eq!(actions, vec!["blink", "set", "change"]);
}

// ---
// Post-processing actions
// ---

fn dimmer() -> Grammar {
    Grammar::builder()
        .define("GOAL", sequence([literals(["dim"]), pattern("[0-9]+|high|low").named("level")]))
        .action("level", |value| {
            value
                .as_text()
                .and_then(|t| t.parse::<f64>().ok())
                .map(Value::Number)
                .ok_or_else(|| ActionError::new("not a number"))
        })
        .build()
        .unwrap()
}

#[test]
fn test_action_transforms_value() {
    let grammar = dimmer();
    let outcome = grammar.parse("dim to 40").unwrap();

    assert_eq!(outcome.get("level"), Some(&Value::Number(40.0)));
    assert!(outcome.result.failures().is_empty());
}

#[test]
fn test_action_failure_is_isolated_to_its_key() {
    let grammar = dimmer();
    let outcome = grammar.parse("dim to high").unwrap();

    assert_eq!(outcome.get("level"), Some(&Value::from("high")));
    assert_eq!(outcome.get("Set(dim)"), Some(&Value::from("dim")));

    let failure = outcome.result.failure("level").unwrap();
    assert_eq!(failure.message, "not a number");
    assert_eq!(failure.raw, Value::from("high"));
    assert_eq!(outcome.result.failures().len(), 1);

    let err = failure.to_error();
    assert_eq!(err.category(), ErrorCategory::PostProcessing);
    assert_eq!(err.diagnostic_info.error_code, "vakya::post_processing::post_processing");
}

#[test]
fn test_action_on_composite_element() {
    let grammar = lights_builder()
        .action("one_parse", |value| Ok(Value::from(value.text().to_uppercase())))
        .build()
        .unwrap();
    let outcome = grammar.parse("set the top light to red").unwrap();

    assert_eq!(outcome.get("one_parse"), Some(&Value::from("SET TOP RED")));
    // names inside the clause are still reachable
    assert_eq!(outcome.get("light"), Some(&Value::from("top")));
    assert_eq!(outcome.result[0], Value::from("SET TOP RED"));
}

#[test]
fn test_action_runs_per_occurrence() {
    let grammar = lights_builder()
        .action("color", |value| Ok(Value::from(format!("#{}", value.text()))))
        .build()
        .unwrap();
    let outcome = grammar.parse("set top red and blink bottom blue").unwrap();

    assert_eq!(
        outcome.get("color"),
        Some(&Value::List(vec![Value::from("#red"), Value::from("#blue")]))
    );
}

// ---
// Serialization
// ---

#[test]
fn test_result_to_json() {
    let grammar = lights();
    let outcome = grammar.parse("set my top light to red").unwrap();
    let json = outcome.result.to_json().unwrap();

    assert_eq!(json["named"]["color"], "red");
    assert_eq!(json["named"]["one_parse"]["named"]["light"], "top");
    assert_eq!(json["items"][0]["items"][2], "red");
}

#[test]
fn test_result_to_yaml() {
    let grammar = lights();
    let outcome = grammar.parse("set my top light to red").unwrap();
    let yaml = outcome.result.to_yaml().unwrap();
    assert!(yaml.contains("color: red"));
}

#[test]
fn test_reparse_is_identical() {
    let grammar = lights();
    let text = "set my top light to red and flash bottom light 2 times blue";
    let first = grammar.parse(text).unwrap();
    let second = grammar.parse(text).unwrap();
    assert_eq!(first, second);
}
