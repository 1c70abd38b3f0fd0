//! Parser facade: text in, parse tree and structured result out.
//!
//! A [`Parser`] borrows an immutable [`Grammar`] and owns only its
//! configuration and tokenizer, so any number of parsers (on any number of
//! threads) can share one grammar. Each call gets its own memo, tokens and
//! results.

use serde::Serialize;
use tracing::debug;

use crate::config::MatchConfig;
use crate::engine::{Matcher, ParseTree, RootMatches};
use crate::errors::{no_parse, VakyaError};
use crate::grammar::Grammar;
use crate::result::{ParseResult, ResultBuilder, Value};
use crate::tokenizer::{Token, Tokenizer, WordTokenizer};

/// One successful parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub tree: ParseTree,
    pub result: ParseResult,
}

impl ParseOutcome {
    fn build(grammar: &Grammar, tree: ParseTree) -> Self {
        let result = ResultBuilder::new(grammar).build(&tree);
        Self { tree, result }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.result.get(name)
    }

    /// Input words no grammar element consumed.
    pub fn noise(&self) -> Vec<&str> {
        self.tree.noise_words()
    }
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    config: MatchConfig,
    tokenizer: Box<dyn Tokenizer>,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, MatchConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, config: MatchConfig) -> Self {
        Self {
            grammar,
            config,
            tokenizer: Box::new(WordTokenizer),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenizer.tokenize(text)
    }

    /// The preferred parse of `text`, or `None` when the start symbol cannot match.
    pub fn parse(&self, text: &str) -> Option<ParseOutcome> {
        self.parse_tokens(self.tokenize(text))
    }

    /// Like [`Parser::parse`], but a failed match is a `NoParse` error
    /// carrying the input for diagnostics.
    pub fn try_parse(&self, text: &str) -> Result<ParseOutcome, VakyaError> {
        let tokens = self.tokenize(text);
        let count = tokens.len();
        self.parse_tokens(tokens)
            .ok_or_else(|| no_parse(self.grammar.goal_name(), text, count))
    }

    pub fn parse_tokens(&self, tokens: Vec<Token>) -> Option<ParseOutcome> {
        let outcome = self.parse_all_tokens(tokens).next();
        debug!(
            goal = %self.grammar.goal_name(),
            matched = outcome.is_some(),
            "parse finished"
        );
        outcome
    }

    /// Every distinct parse of `text`, preferred first, up to `max_parses`.
    pub fn parse_all(&self, text: &str) -> Parses<'g> {
        self.parse_all_tokens(self.tokenize(text))
    }

    pub fn parse_all_tokens(&self, tokens: Vec<Token>) -> Parses<'g> {
        let matches = Matcher::new(self.grammar, &self.config, tokens).run();
        Parses {
            grammar: self.grammar,
            matches,
            remaining: self.config.max_parses,
        }
    }
}

/// Parses of one input, built lazily from the root matches.
pub struct Parses<'g> {
    grammar: &'g Grammar,
    matches: RootMatches<'g>,
    remaining: Option<usize>,
}

impl Parses<'_> {
    pub fn tokens(&self) -> &[Token] {
        self.matches.tokens()
    }
}

impl Iterator for Parses<'_> {
    type Item = ParseOutcome;

    fn next(&mut self) -> Option<ParseOutcome> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let tree = self.matches.next()?;
        Some(ParseOutcome::build(self.grammar, tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{literals, one_or_more, pattern, rule, sequence};
    use crate::tokenizer::WhitespaceTokenizer;

    fn grammar() -> Grammar {
        Grammar::builder()
            .define("action", literals(["set", "blink"]))
            .define("color", pattern("red|blue"))
            .define("GOAL", one_or_more(sequence([rule("action"), rule("color")])))
            .build()
            .unwrap()
    }

    #[test]
    fn test_try_parse_reports_no_parse() {
        let grammar = grammar();
        let err = grammar.parser().try_parse("nothing to see").unwrap_err();
        assert!(err.is_no_parse());
    }

    #[test]
    fn test_max_parses_caps_enumeration() {
        let grammar = grammar();
        let text = "set red blink blue";
        let all = grammar.parser().parse_all(text).count();
        assert!(all > 1);

        let parser = Parser::with_config(&grammar, MatchConfig::default().with_max_parses(1));
        assert_eq!(parser.parse_all(text).count(), 1);
    }

    #[test]
    fn test_custom_tokenizer() {
        let grammar = grammar();
        let parser = grammar.parser().with_tokenizer(WhitespaceTokenizer);
        // punctuation stays attached, so "red," is not a color
        let outcome = parser.parse("set red, blink blue").unwrap();
        assert_eq!(outcome.get("action"), Some(&Value::from("blink")));
        assert_eq!(outcome.get("color"), Some(&Value::from("blue")));
        assert_eq!(outcome.noise(), vec!["set", "red,"]);
    }
}
