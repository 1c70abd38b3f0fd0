//! Shared grammars for the integration tests.

#![allow(dead_code)]

use vakya::{literals, one_of, one_or_more, optional, pattern, rule, sequence, Grammar, GrammarBuilder, ParseOutcome};

/// Declarations of the light-control grammar, before `build()`.
pub fn lights_builder() -> GrammarBuilder {
    Grammar::builder()
        .define("action", literals(["change", "flash", "set", "blink"]))
        .define("light", literals(["top", "middle", "bottom"]))
        .define("color", pattern("red|yellow|blue"))
        .define(
            "times",
            one_of([
                literals(["once", "twice", "three times"]),
                sequence([pattern("[0-9]+"), literals(["times"])]),
            ]),
        )
        .define(
            "one_parse",
            sequence([rule("action"), rule("light"), optional(rule("times")), rule("color")]),
        )
        .define("GOAL", one_or_more(rule("one_parse")))
}

pub fn lights() -> Grammar {
    lights_builder().build().expect("light grammar builds")
}

/// Text of every value bound to `name`, one entry per occurrence.
pub fn texts(outcome: &ParseOutcome, name: &str) -> Vec<String> {
    match outcome.result.get(name) {
        Some(vakya::Value::List(values)) => values.iter().map(|v| v.text()).collect(),
        Some(value) => vec![value.text()],
        None => Vec::new(),
    }
}
