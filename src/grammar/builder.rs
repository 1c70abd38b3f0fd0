//! Grammar construction and validation.
//!
//! [`GrammarBuilder`] collects named bindings and post-processing actions, then
//! `build()` checks the whole declaration before lowering it into elements:
//!
//! 1. no name is bound twice
//! 2. the start symbol is bound
//! 3. every `rule(..)` reference names a binding
//! 4. the reference graph has no cycle
//! 5. terminals compile and combinator bounds make sense
//! 6. every action targets an existing element
//!
//! Any failure aborts the build; no partial grammar is returned.

use std::collections::HashMap;
use std::sync::Arc;

use miette::SourceSpan;
use tracing::debug;

use crate::config::GrammarOptions;
use crate::errors::{unspanned, ErrorKind, ErrorReporting, PhaseContext, SourceContext, VakyaError};
use crate::grammar::terminal::{LiteralSet, Pattern};
use crate::grammar::{naming, Action, Element, ElementId, ElementKind, Expr, Grammar, GOAL};
use crate::result::{ActionError, Value};

pub struct GrammarBuilder {
    bindings: Vec<(String, Expr)>,
    actions: Vec<(String, Action)>,
    options: GrammarOptions,
    goal: String,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            actions: Vec::new(),
            options: GrammarOptions::default(),
            goal: GOAL.to_string(),
        }
    }

    pub fn with_options(mut self, options: GrammarOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses a start symbol other than `GOAL`.
    pub fn goal(mut self, name: impl Into<String>) -> Self {
        self.goal = name.into();
        self
    }

    /// Binds `expr` under `name`.
    pub fn define(mut self, name: impl Into<String>, expr: Expr) -> Self {
        self.bindings.push((name.into(), expr));
        self
    }

    /// Registers a post-processing action for the element called `name`.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.actions.push((name.into(), Arc::new(action)));
        self
    }

    pub fn build(self) -> Result<Grammar, VakyaError> {
        let index = self.check_bindings()?;
        check_references(&self.bindings)?;
        check_cycles(&self.bindings, &index)?;

        let mut lowering = Lowering {
            bindings: &self.bindings,
            index: &index,
            options: &self.options,
            elements: Vec::new(),
            names: HashMap::new(),
            bound: HashMap::new(),
        };
        for (name, _) in &self.bindings {
            lowering.lower_binding(name)?;
        }
        let root = lowering.bound[self.goal.as_str()];
        let Lowering { elements, names, .. } = lowering;

        let mut actions = HashMap::new();
        for (name, action) in self.actions {
            let Some(&id) = names.get(&name) else {
                let ctx = PhaseContext::grammar(&name, name.clone());
                return Err(ctx.report(ErrorKind::UnknownActionTarget { name }, unspanned()));
            };
            actions.insert(id, action);
        }

        debug!(
            bindings = self.bindings.len(),
            elements = elements.len(),
            actions = actions.len(),
            root = %self.goal,
            "grammar built"
        );

        Ok(Grammar {
            elements,
            names,
            root,
            actions,
            options: self.options,
        })
    }

    /// Rejects duplicate bindings and a missing start symbol.
    fn check_bindings(&self) -> Result<HashMap<&str, usize>, VakyaError> {
        let mut index = HashMap::new();
        for (i, (name, expr)) in self.bindings.iter().enumerate() {
            if index.insert(name.as_str(), i).is_some() {
                let ctx = binding_context(name, expr);
                return Err(ctx.report(ErrorKind::DuplicateBinding { name: name.clone() }, ctx.source.full_span()));
            }
        }
        if !index.contains_key(self.goal.as_str()) {
            let declared: Vec<&str> = self.bindings.iter().map(|(n, _)| n.as_str()).collect();
            let ctx = PhaseContext::grammar("bindings", declared.join(", "));
            return Err(ctx
                .report(ErrorKind::MissingGoal { goal: self.goal.clone() }, unspanned())
                .with_help(format!("bind the start symbol with define(\"{}\", ...)", self.goal)));
        }
        Ok(index)
    }
}

fn binding_context(name: &str, expr: &Expr) -> PhaseContext {
    PhaseContext::grammar(name, format!("{} = {}", name, expr))
}

fn check_references(bindings: &[(String, Expr)]) -> Result<(), VakyaError> {
    let declared: Vec<&str> = bindings.iter().map(|(n, _)| n.as_str()).collect();
    for (name, expr) in bindings {
        for reference in expr.references() {
            if declared.contains(&reference) {
                continue;
            }
            let ctx = binding_context(name, expr);
            let span = find_span(&ctx.source, reference);
            return Err(ctx.undefined_reference(name, reference, span));
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

/// Depth-first search over `rule(..)` references; reports the first cycle found.
fn check_cycles(bindings: &[(String, Expr)], index: &HashMap<&str, usize>) -> Result<(), VakyaError> {
    fn visit<'a>(
        name: &'a str,
        bindings: &'a [(String, Expr)],
        index: &HashMap<&str, usize>,
        state: &mut HashMap<&'a str, Visit>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), VakyaError> {
        match state.get(name) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::InProgress) => {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                let (_, expr) = &bindings[index[name]];
                let ctx = binding_context(name, expr);
                return Err(ctx
                    .report(ErrorKind::CyclicGrammar { cycle }, ctx.source.full_span())
                    .with_help("grammars must be acyclic; use repeat() for recursion over a list"));
            }
            None => {}
        }

        state.insert(name, Visit::InProgress);
        path.push(name);
        let (_, expr) = &bindings[index[name]];
        for reference in expr.references() {
            visit(reference, bindings, index, state, path)?;
        }
        path.pop();
        state.insert(name, Visit::Done);
        Ok(())
    }

    let mut state = HashMap::new();
    let mut path = Vec::new();
    for (name, _) in bindings {
        visit(name, bindings, index, &mut state, &mut path)?;
    }
    Ok(())
}

fn find_span(source: &SourceContext, needle: &str) -> SourceSpan {
    match source.content.find(needle) {
        Some(start) => SourceSpan::from(start..start + needle.len()),
        None => source.full_span(),
    }
}

// ============================================================================
// LOWERING - expressions to elements
// ============================================================================

struct Lowering<'b> {
    bindings: &'b [(String, Expr)],
    index: &'b HashMap<&'b str, usize>,
    options: &'b GrammarOptions,
    elements: Vec<Element>,
    /// Every element name, explicit or derived.
    names: HashMap<String, ElementId>,
    /// Binding name to its element.
    bound: HashMap<String, ElementId>,
}

impl Lowering<'_> {
    fn lower_binding(&mut self, name: &str) -> Result<ElementId, VakyaError> {
        if let Some(&id) = self.bound.get(name) {
            return Ok(id);
        }
        let bindings = self.bindings;
        let (_, expr) = &bindings[self.index[name]];
        let id = self.lower(expr, Some(name), name)?;
        self.bound.insert(name.to_string(), id);
        Ok(id)
    }

    fn lower(&mut self, expr: &Expr, explicit: Option<&str>, rule: &str) -> Result<ElementId, VakyaError> {
        match expr {
            Expr::Named(name, inner) => match explicit {
                None => self.lower(inner, Some(name.as_str()), rule),
                Some(outer) => {
                    let id = self.lower(inner, Some(name.as_str()), rule)?;
                    self.alias(outer, id, rule)
                }
            },

            Expr::Rule(target) => {
                let id = self.lower_binding(target)?;
                match explicit {
                    None => Ok(id),
                    Some(name) => self.alias(name, id, rule),
                }
            }

            Expr::Literals(members) => {
                let set = LiteralSet::new(members, self.options.case);
                if set.is_empty() {
                    let ctx = self.context(rule);
                    return Err(ctx.report(ErrorKind::EmptyLiteralSet { rule: rule.to_string() }, ctx.source.full_span()));
                }
                let implicit = naming::literal_set(set.members());
                self.intern(explicit, implicit, ElementKind::Literals(set), rule)
            }

            Expr::Pattern(source) => {
                let pattern = Pattern::compile(source, self.options.case).map_err(|e| {
                    let ctx = PhaseContext::new(SourceContext::new(format!("{} pattern", rule), source.clone()), "grammar");
                    let span = match e.span {
                        Some(range) => SourceSpan::from(range),
                        None => ctx.source.full_span(),
                    };
                    ctx.invalid_pattern(source, &e.reason, span)
                })?;
                self.intern(explicit, naming::pattern(source), ElementKind::Pattern(pattern), rule)
            }

            Expr::Sequence(children) | Expr::Choice(children) => {
                if children.is_empty() {
                    let ctx = self.context(rule);
                    return Err(ctx.report(ErrorKind::EmptyCombinator { rule: rule.to_string() }, ctx.source.full_span()));
                }
                let ids = children
                    .iter()
                    .map(|child| self.lower(child, None, rule))
                    .collect::<Result<Vec<_>, _>>()?;
                let child_names: Vec<&str> = ids.iter().map(|id| self.elements[id.0].name.as_str()).collect();
                let (implicit, kind) = match expr {
                    Expr::Sequence(_) => (naming::sequence(&child_names), ElementKind::Sequence(ids)),
                    _ => (naming::choice(&child_names), ElementKind::Choice(ids)),
                };
                self.intern(explicit, implicit, kind, rule)
            }

            Expr::Optional(inner) => {
                let id = self.lower(inner, None, rule)?;
                let implicit = naming::optional(&self.elements[id.0].name);
                self.intern(explicit, implicit, ElementKind::Optional(id), rule)
            }

            Expr::Repeat { inner, min, max } => {
                if let Some(max) = *max {
                    let reason = if max == 0 {
                        Some("maximum count must be at least 1".to_string())
                    } else if *min > max {
                        Some(format!("minimum {} exceeds maximum {}", min, max))
                    } else {
                        None
                    };
                    if let Some(reason) = reason {
                        let ctx = self.context(rule);
                        return Err(ctx.invalid_repeat(rule, &reason, ctx.source.full_span()));
                    }
                }
                let id = self.lower(inner, None, rule)?;
                let implicit = naming::repeat(&self.elements[id.0].name, *min, *max);
                let kind = ElementKind::Repeat {
                    inner: id,
                    min: *min,
                    max: *max,
                };
                self.intern(explicit, implicit, kind, rule)
            }
        }
    }

    /// Gives an existing element a second, explicit name through a one-way choice.
    fn alias(&mut self, name: &str, target: ElementId, rule: &str) -> Result<ElementId, VakyaError> {
        let implicit = naming::choice(&[self.elements[target.0].name.as_str()]);
        self.intern(Some(name), implicit, ElementKind::Choice(vec![target]), rule)
    }

    /// Adds an element. Derived names are shared: the same shape yields the same element.
    fn intern(
        &mut self,
        explicit: Option<&str>,
        implicit: String,
        kind: ElementKind,
        rule: &str,
    ) -> Result<ElementId, VakyaError> {
        let (name, is_explicit) = match explicit {
            Some(name) => (name.to_string(), true),
            None => (implicit, false),
        };

        if let Some(&existing) = self.names.get(&name) {
            if !is_explicit && !self.elements[existing.0].explicit {
                return Ok(existing);
            }
            let ctx = self.context(rule);
            let span = find_span(&ctx.source, &name);
            return Err(ctx
                .report(ErrorKind::DuplicateBinding { name }, span)
                .with_help("reuse a shared element with rule(..) instead of naming it twice"));
        }

        let id = ElementId(self.elements.len());
        let nullable = self.nullable(&kind);
        self.elements.push(Element {
            name: name.clone(),
            explicit: is_explicit,
            kind,
            nullable,
        });
        self.names.insert(name, id);
        Ok(id)
    }

    /// Children are lowered before their parent, so their flags are already known.
    fn nullable(&self, kind: &ElementKind) -> bool {
        match kind {
            ElementKind::Literals(_) | ElementKind::Pattern(_) => false,
            ElementKind::Sequence(children) => children.iter().all(|c| self.elements[c.0].nullable),
            ElementKind::Choice(children) => children.iter().any(|c| self.elements[c.0].nullable),
            ElementKind::Optional(_) => true,
            ElementKind::Repeat { inner, min, .. } => *min == 0 || self.elements[inner.0].nullable,
        }
    }

    fn context(&self, rule: &str) -> PhaseContext {
        match self.index.get(rule) {
            Some(&i) => binding_context(rule, &self.bindings[i].1),
            None => PhaseContext::grammar(rule, rule.to_string()),
        }
    }
}
