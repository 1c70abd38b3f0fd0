//! Terminal matchers: literal sets and compiled patterns.
//!
//! Both are built once, when the grammar is built, and only read while
//! matching. A pattern is compiled into a dense DFA anchored at both ends, so
//! testing a token is a single forward scan with no per-token compilation.

use std::fmt;
use std::ops::Range;

use regex_automata::dfa::{dense, Automaton};
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};

use crate::config::CaseSensitivity;

// ============================================================================
// LITERAL SETS
// ============================================================================

/// A fixed set of literal strings. Members with spaces ("three times") match a
/// window of consecutive tokens.
#[derive(Debug, Clone)]
pub struct LiteralSet {
    /// Members as declared, sorted and deduplicated.
    members: Vec<String>,
    /// Normalized word sequences, longest first.
    words: Vec<Vec<String>>,
}

impl LiteralSet {
    pub fn new<I, S>(members: I, case: CaseSensitivity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut declared: Vec<String> = members
            .into_iter()
            .map(|m| m.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|m| !m.is_empty())
            .collect();
        declared.sort();
        declared.dedup();

        let mut words: Vec<Vec<String>> = declared
            .iter()
            .map(|m| m.split(' ').map(|w| fold_case(w, case)).collect())
            .collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();

        Self {
            members: declared,
            words,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// End positions of every member matching at token `at`, longest first.
    ///
    /// `folded` holds the token texts already normalized with [`fold_case`].
    pub fn match_ends(&self, folded: &[String], at: usize) -> Vec<usize> {
        let mut ends = Vec::new();
        for member in &self.words {
            let end = at + member.len();
            if end > folded.len() || ends.contains(&end) {
                continue;
            }
            if folded[at..end].iter().zip(member).all(|(t, w)| t == w) {
                ends.push(end);
            }
        }
        ends
    }
}

/// Normalizes token text for literal comparison.
pub fn fold_case(text: &str, case: CaseSensitivity) -> String {
    match case {
        CaseSensitivity::Insensitive => text.to_lowercase(),
        CaseSensitivity::Sensitive => text.to_string(),
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

/// Why a pattern failed to compile, with the offending range of the pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternError {
    pub reason: String,
    pub span: Option<Range<usize>>,
}

/// A whole-token pattern compiled to a DFA.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    dfa: dense::DFA<Vec<u32>>,
}

impl Pattern {
    pub fn compile(source: &str, case: CaseSensitivity) -> Result<Self, PatternError> {
        let insensitive = case == CaseSensitivity::Insensitive;

        // regex-syntax reports where in the pattern the problem is
        regex_syntax::ParserBuilder::new()
            .case_insensitive(insensitive)
            .build()
            .parse(source)
            .map_err(|e| syntax_error(&e))?;

        let anchored = format!("^(?:{})$", source);
        let dfa = dense::Builder::new()
            .syntax(syntax::Config::new().case_insensitive(insensitive))
            .build(&anchored)
            .map_err(|e| PatternError {
                reason: e.to_string(),
                span: None,
            })?;

        Ok(Self {
            source: source.to_string(),
            dfa,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `text` is accepted.
    pub fn is_match(&self, text: &str) -> bool {
        let input = Input::new(text).anchored(Anchored::Yes);
        matches!(self.dfa.try_search_fwd(&input), Ok(Some(_)))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern").field("source", &self.source).finish()
    }
}

fn syntax_error(err: &regex_syntax::Error) -> PatternError {
    match err {
        regex_syntax::Error::Parse(e) => PatternError {
            reason: e.kind().to_string(),
            span: Some(e.span().start.offset..e.span().end.offset),
        },
        regex_syntax::Error::Translate(e) => PatternError {
            reason: e.kind().to_string(),
            span: Some(e.span().start.offset..e.span().end.offset),
        },
        other => PatternError {
            reason: other.to_string(),
            span: None,
        },
    }
}
