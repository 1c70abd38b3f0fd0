//! # Structured Parse Results
//!
//! A [`ParseResult`] is the name-addressable projection of a parse tree. It
//! offers two views of the same scope:
//!
//! - **list view**: the scope's direct values in match order (`items`, `[i]`)
//! - **named view**: every name bound in the scope (`get`, `["name"]`,
//!   `get_path("a.0.b")`)
//!
//! A name bound once holds a bare value; a name bound `k > 1` times holds a
//! `Value::List` of the `k` values in match order.

use std::ops::Index;

use im::OrdMap;
use serde::Serialize;
use thiserror::Error;

use crate::errors::{ErrorKind, ErrorReporting, PhaseContext, SourceContext, VakyaError};

pub mod builder;
pub mod value;

pub use builder::ResultBuilder;
pub use value::Value;

// ============================================================================
// POST-PROCESSING ERRORS
// ============================================================================

/// Returned by a post-processing action that cannot transform its value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// An action failure recorded against the key whose value it was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostProcessingFailure {
    pub key: String,
    pub message: String,
    /// The untransformed value, which stays in the result.
    pub raw: Value,
}

impl PostProcessingFailure {
    pub fn to_error(&self) -> VakyaError {
        let ctx = PhaseContext::new(SourceContext::new(self.key.clone(), self.raw.text()), "post_processing");
        ctx.report(
            ErrorKind::PostProcessing {
                key: self.key.clone(),
                message: self.message.clone(),
            },
            ctx.source.full_span(),
        )
    }
}

// ============================================================================
// PARSE RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParseResult {
    items: Vec<Value>,
    named: OrdMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<PostProcessingFailure>,
}

impl ParseResult {
    pub fn new(items: Vec<Value>, named: OrdMap<String, Value>) -> Self {
        Self {
            items,
            named,
            failures: Vec::new(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: Vec<PostProcessingFailure>) -> Self {
        self.failures = failures;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Dotted access: each segment is a name, or an index into a list.
    ///
    /// `"one_parse.1.color"` is `result["one_parse"][1]["color"]`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = match (current, segment.parse::<usize>()) {
                (Value::List(items), Ok(i)) => items.get(i)?,
                (Value::Map(result), Ok(i)) => match result.get(segment) {
                    Some(v) => v,
                    None => result.items.get(i)?,
                },
                (Value::Map(result), Err(_)) => result.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// The scope's direct values, in match order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Number of items in the list view.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list view is empty. Bound names are counted by [`ParseResult::keys`].
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bound names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.named.keys()
    }

    pub fn named(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.named.iter()
    }

    pub fn failures(&self) -> &[PostProcessingFailure] {
        &self.failures
    }

    pub fn failure(&self, key: &str) -> Option<&PostProcessingFailure> {
        self.failures.iter().find(|f| f.key == key)
    }

    /// The matched words of the list view, space separated.
    pub fn text(&self) -> String {
        Value::List(self.items.clone()).text()
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl<'a> Index<&'a str> for ParseResult {
    type Output = Value;

    fn index(&self, name: &'a str) -> &Value {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no value named '{}' in parse result", name),
        }
    }
}

impl Index<usize> for ParseResult {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a ParseResult {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
