//! Parse tree to structured result.
//!
//! Applied bottom-up over the tree. Zero-width spans contribute nothing.
//!
//! - a terminal's value is its matched text
//! - a sequence or repetition becomes a [`ParseResult`]: each child's name is
//!   bound to the child's value, and every name in a child's scope floats up
//!   unless this scope binds that name directly
//! - a choice or optional is transparent: its value is its matched child's
//! - a post-processing action replaces an element's value once it is built
//!
//! Names bound more than once in one scope hold a list of values.

use im::OrdMap;
use tracing::warn;

use crate::engine::{MatchSpan, ParseTree};
use crate::grammar::{ElementKind, Grammar};
use crate::result::{ParseResult, PostProcessingFailure, Value};

/// Values bound to each name in one scope, in match order.
type Scope = OrdMap<String, Vec<Value>>;

struct Built {
    value: Value,
    scope: Scope,
    /// The value is a map from an explicitly named element and nests as one item.
    grouped: bool,
}

pub struct ResultBuilder<'g> {
    grammar: &'g Grammar,
    failures: Vec<PostProcessingFailure>,
}

impl<'g> ResultBuilder<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            failures: Vec::new(),
        }
    }

    /// The top-level result: the root's scope plus the root bound under its own name.
    pub fn build(mut self, tree: &ParseTree) -> ParseResult {
        let root = &tree.root;
        if root.is_empty() {
            return ParseResult::default();
        }

        let built = self.visit(root);
        let items = match &built.value {
            Value::Map(result) => result.items().to_vec(),
            Value::Nil => Vec::new(),
            other => vec![other.clone()],
        };

        let mut scope = Scope::new();
        bind(&mut scope, &root.name, built.value);
        float(&mut scope, built.scope, &[root.name.as_str()]);

        ParseResult::new(items, finalize(scope)).with_failures(self.failures)
    }

    fn visit(&mut self, span: &MatchSpan) -> Built {
        let grammar = self.grammar;
        let element = grammar.element(span.element);
        let built = match element.kind() {
            ElementKind::Literals(_) | ElementKind::Pattern(_) => Built {
                value: Value::Text(span.text.clone().unwrap_or_default()),
                scope: Scope::new(),
                grouped: false,
            },

            ElementKind::Choice(_) | ElementKind::Optional(_) => {
                match span.children.iter().find(|c| !c.is_empty()) {
                    Some(child) => {
                        let inner = self.visit(child);
                        let mut scope = Scope::new();
                        bind(&mut scope, &child.name, inner.value.clone());
                        float(&mut scope, inner.scope, &[child.name.as_str()]);
                        Built {
                            value: inner.value,
                            scope,
                            grouped: element.is_explicit() || inner.grouped,
                        }
                    }
                    None => Built {
                        value: Value::Nil,
                        scope: Scope::new(),
                        grouped: false,
                    },
                }
            }

            ElementKind::Sequence(_) | ElementKind::Repeat { .. } => {
                let children: Vec<(&MatchSpan, Built)> = span
                    .children
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(|c| (c, self.visit(c)))
                    .collect();
                let direct: Vec<&str> = children.iter().map(|(c, _)| c.name.as_str()).collect();

                let mut scope = Scope::new();
                let mut items = Vec::new();
                for (child, built) in &children {
                    bind(&mut scope, &child.name, built.value.clone());
                    match &built.value {
                        Value::Map(result) if !built.grouped => items.extend(result.items().iter().cloned()),
                        Value::Nil => {}
                        value => items.push(value.clone()),
                    }
                }
                for (_, built) in children {
                    float(&mut scope, built.scope, &direct);
                }

                Built {
                    value: Value::Map(ParseResult::new(items, finalize(scope.clone()))),
                    scope,
                    grouped: element.is_explicit(),
                }
            }
        };
        self.apply_action(span, built)
    }

    fn apply_action(&mut self, span: &MatchSpan, mut built: Built) -> Built {
        let grammar = self.grammar;
        let Some(action) = grammar.action(span.element) else {
            return built;
        };
        match action(&built.value) {
            Ok(value) => built.value = value,
            Err(e) => {
                warn!(key = %span.name, error = %e, "post-processing action failed");
                self.failures.push(PostProcessingFailure {
                    key: span.name.clone(),
                    message: e.message,
                    raw: built.value.clone(),
                });
            }
        }
        built
    }
}

fn bind(scope: &mut Scope, name: &str, value: Value) {
    match scope.get_mut(name) {
        Some(values) => values.push(value),
        None => {
            scope.insert(name.to_string(), vec![value]);
        }
    }
}

/// Moves a child's bindings into `scope`, except names listed in `shadowed`.
fn float(scope: &mut Scope, child: Scope, shadowed: &[&str]) {
    for (name, values) in child {
        if shadowed.contains(&name.as_str()) {
            continue;
        }
        match scope.get_mut(&name) {
            Some(existing) => existing.extend(values),
            None => {
                scope.insert(name, values);
            }
        }
    }
}

fn finalize(scope: Scope) -> OrdMap<String, Value> {
    scope
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 {
                values.pop().unwrap_or_default()
            } else {
                Value::List(values)
            };
            (name, value)
        })
        .collect()
}
