//! Grammar construction errors and their rendered diagnostics.

mod common;

use miette::Diagnostic;
use vakya::{
    literals, one_or_more, optional, pattern, render_error, repeat, rule, sequence, ErrorCategory, ErrorKind, Grammar,
    GrammarOptions, MatchConfig, VakyaError,
};

fn build_err(builder: vakya::GrammarBuilder) -> VakyaError {
    builder.build().unwrap_err()
}

#[test]
fn test_light_grammar_builds() {
    let grammar = common::lights();
    assert_eq!(grammar.goal_name(), "GOAL");
    assert!(grammar.lookup("Optional(times)").is_some());
    assert!(grammar.lookup("OneOrMore(one_parse)").is_none());
}

#[test]
fn test_missing_goal_code() {
    let err = build_err(Grammar::builder().define("color", pattern("red")));
    assert_eq!(err.kind, ErrorKind::MissingGoal { goal: "GOAL".into() });
    assert_eq!(err.category(), ErrorCategory::Grammar);
    assert_eq!(err.code().map(|c| c.to_string()), Some("vakya::grammar::missing_goal".to_string()));
}

#[test]
fn test_undefined_reference_has_help() {
    let err = build_err(
        common::lights_builder().define("extra", sequence([rule("action"), rule("brightness")])),
    );
    assert_eq!(
        err.kind,
        ErrorKind::UndefinedReference {
            rule: "extra".into(),
            reference: "brightness".into()
        }
    );
    assert!(err.help().map(|h| h.to_string()).unwrap_or_default().contains("brightness"));
}

#[test]
fn test_cycle_is_rejected() {
    let err = build_err(
        Grammar::builder()
            .define("clause", sequence([literals(["set"]), optional(rule("GOAL"))]))
            .define("GOAL", one_or_more(rule("clause"))),
    );
    assert!(matches!(err.kind, ErrorKind::CyclicGrammar { .. }));
    assert!(err.to_string().contains("->"));
}

#[test]
fn test_invalid_pattern_rendering() {
    let err = build_err(
        Grammar::builder().define("GOAL", sequence([literals(["set"]), pattern("red|(blue")])),
    );
    assert!(matches!(err.kind, ErrorKind::InvalidPattern { .. }));

    let rendered = render_error(err);
    assert!(rendered.contains("vakya::grammar::invalid_pattern"));
    assert!(rendered.contains("invalid pattern"));
}

#[test]
fn test_invalid_repeat_bounds() {
    let err = build_err(Grammar::builder().define("GOAL", repeat(3, Some(1), literals(["a"]))));
    assert!(matches!(err.kind, ErrorKind::InvalidRepeat { .. }));
}

#[test]
fn test_no_parse_rendering_shows_input() {
    let grammar = common::lights();
    let err = grammar.parser().try_parse("set to red").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoParse { goal: "GOAL".into(), tokens: 3 });

    let rendered = render_error(err);
    assert!(rendered.contains("set to red"));
}

#[test]
fn test_config_errors() {
    let err = MatchConfig::from_yaml_str("skip_budget: sometimes\n").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Config);

    let err = GrammarOptions::from_json_str(r#"{"case": "loud"}"#).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidConfig { .. }));
}

#[test]
fn test_case_sensitive_grammar() {
    let grammar = Grammar::builder()
        .with_options(GrammarOptions::case_sensitive())
        .define("GOAL", sequence([literals(["Set"]), pattern("Red")]))
        .build()
        .unwrap();
    assert!(grammar.parse("set red").is_none());
    assert!(grammar.parse("Set red Red").is_some());
}
