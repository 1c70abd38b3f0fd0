//! Property-based tests for noise-tolerant matching over the light grammar.
//!
//! Inputs are generated as clauses of known terminals, optionally salted with
//! filler words the grammar does not model.

mod common;

use common::lights;
use proptest::prelude::*;
use vakya::tokens_from_words;

const FILLERS: &[&str] = &["please", "the", "now", "um", "light", "to", "and"];

/// One clause as word units: action, light, optional times, color. A
/// multi-word times phrase ("three times") is a single unit.
fn clause() -> impl Strategy<Value = Vec<String>> {
    let action = prop::sample::select(vec!["change", "flash", "set", "blink"]);
    let light = prop::sample::select(vec!["top", "middle", "bottom"]);
    let times = prop::option::of(prop::sample::select(vec!["once", "twice", "three times", "2 times", "10 times"]));
    let color = prop::sample::select(vec!["red", "yellow", "blue"]);

    (action, light, times, color).prop_map(|(action, light, times, color)| {
        let mut units = vec![action.to_string(), light.to_string()];
        units.extend(times.map(str::to_string));
        units.push(color.to_string());
        units
    })
}

fn clauses() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(clause(), 1..4)
}

/// The input words of some units.
fn words<'a>(units: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    units
        .into_iter()
        .flat_map(|unit| unit.split(' '))
        .map(str::to_string)
        .collect()
}

/// Clause words with fillers inserted before some units, never inside one;
/// returns the words and the fillers in input order.
fn salted(clauses: &[Vec<String>], fillers: &[Option<usize>]) -> (Vec<String>, Vec<String>) {
    let mut salted = Vec::new();
    let mut inserted = Vec::new();
    for (i, unit) in clauses.iter().flatten().enumerate() {
        if let Some(Some(f)) = fillers.get(i) {
            let filler = FILLERS[f % FILLERS.len()].to_string();
            inserted.push(filler.clone());
            salted.push(filler);
        }
        salted.extend(words([unit]));
    }
    (salted, inserted)
}

proptest! {
    #[test]
    fn exact_input_has_no_noise(clauses in clauses()) {
        let grammar = lights();
        let exact = words(clauses.iter().flatten());
        let outcome = grammar.parser().parse_tokens(tokens_from_words(exact.clone())).unwrap();

        prop_assert!(outcome.tree.noise().is_empty());
        prop_assert_eq!(outcome.tree.leaf_words(), exact.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn reparse_is_deterministic(clauses in clauses()) {
        let grammar = lights();
        let text = clauses.iter().flatten().cloned().collect::<Vec<_>>().join(" ");
        prop_assert_eq!(grammar.parse(&text), grammar.parse(&text));
    }

    #[test]
    fn fillers_are_skipped_as_noise(
        clauses in clauses(),
        fillers in prop::collection::vec(prop::option::of(0usize..16), 0..20),
    ) {
        let grammar = lights();
        let exact = words(clauses.iter().flatten());
        let (words, inserted) = salted(&clauses, &fillers);
        let outcome = grammar.parser().parse_tokens(tokens_from_words(words)).unwrap();

        prop_assert_eq!(outcome.tree.leaf_words(), exact.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(outcome.noise(), inserted.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn one_occurrence_per_clause(clauses in clauses()) {
        let grammar = lights();
        let text = clauses.iter().flatten().cloned().collect::<Vec<_>>().join(" ");
        let outcome = grammar.parse(&text).unwrap();

        let occurrences = common::texts(&outcome, "one_parse");
        let expected: Vec<String> = clauses.iter().map(|c| c.join(" ")).collect();
        prop_assert_eq!(occurrences, expected);
    }

    #[test]
    fn missing_color_prevents_match(clause in clause()) {
        let grammar = lights();
        let without_color = words(&clause[..clause.len() - 1]);
        prop_assert!(grammar.parse(&without_color.join(" ")).is_none());
    }
}
