//! # Grammar Registry
//!
//! A [`Grammar`] owns an arena of [`Element`]s addressed by [`ElementId`]. It is
//! produced by [`GrammarBuilder`], never changes afterwards, and can be shared
//! by reference between any number of parse calls and threads.
//!
//! ## Invariants
//! - Every element has a name unique within the grammar
//! - The element graph is acyclic and rooted at the start symbol (`GOAL`)
//! - Terminals are compiled; matching never compiles anything

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::GrammarOptions;
use crate::parser::{ParseOutcome, Parser};
use crate::result::{ActionError, Value};

pub mod builder;
pub mod expr;
pub mod naming;
pub mod terminal;

pub use builder::GrammarBuilder;
pub use expr::{literals, one_of, one_or_more, optional, pattern, repeat, rule, sequence, zero_or_more, Expr};
pub use terminal::{LiteralSet, Pattern};

/// Name of the start symbol unless the builder is told otherwise.
pub const GOAL: &str = "GOAL";

/// Post-processing hook run on an element's value while the result is built.
pub type Action = Arc<dyn Fn(&Value) -> Result<Value, ActionError> + Send + Sync>;

// ============================================================================
// ELEMENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Literals(LiteralSet),
    Pattern(Pattern),
    Sequence(Vec<ElementId>),
    Choice(Vec<ElementId>),
    Optional(ElementId),
    Repeat {
        inner: ElementId,
        min: usize,
        max: Option<usize>,
    },
}

impl ElementKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ElementKind::Literals(_) => "Literal-Set",
            ElementKind::Pattern(_) => "Pattern",
            ElementKind::Sequence(_) => "Sequence",
            ElementKind::Choice(_) => "Alternation",
            ElementKind::Optional(_) => "Optional",
            ElementKind::Repeat { .. } => "Repetition",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) explicit: bool,
    pub(crate) kind: ElementKind,
    /// Whether some match of this element consumes no tokens.
    pub(crate) nullable: bool,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the author bound this name (as opposed to a derived one).
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ElementKind::Literals(_) | ElementKind::Pattern(_))
    }

    pub fn children(&self) -> Vec<ElementId> {
        match &self.kind {
            ElementKind::Literals(_) | ElementKind::Pattern(_) => Vec::new(),
            ElementKind::Sequence(children) | ElementKind::Choice(children) => children.clone(),
            ElementKind::Optional(inner) | ElementKind::Repeat { inner, .. } => vec![*inner],
        }
    }
}

// ============================================================================
// GRAMMAR
// ============================================================================

pub struct Grammar {
    pub(crate) elements: Vec<Element>,
    pub(crate) names: HashMap<String, ElementId>,
    pub(crate) root: ElementId,
    pub(crate) actions: HashMap<ElementId, Action>,
    pub(crate) options: GrammarOptions,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn goal_name(&self) -> &str {
        self.element(self.root).name()
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Looks up an element by its explicit or derived name.
    pub fn lookup(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, element)| (ElementId(i), element))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn options(&self) -> &GrammarOptions {
        &self.options
    }

    pub fn action(&self, id: ElementId) -> Option<&Action> {
        self.actions.get(&id)
    }

    /// A parser over this grammar with default configuration.
    pub fn parser(&self) -> Parser<'_> {
        Parser::new(self)
    }

    /// Parses `text` with default configuration.
    pub fn parse(&self, text: &str) -> Option<ParseOutcome> {
        self.parser().parse(text)
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&str> = self
            .actions
            .keys()
            .map(|id| self.element(*id).name())
            .collect();
        actions.sort();
        f.debug_struct("Grammar")
            .field("root", &self.goal_name())
            .field("elements", &self.elements)
            .field("actions", &actions)
            .field("options", &self.options)
            .finish()
    }
}
