//! # Matching Engine
//!
//! Noise-tolerant, memoized search over a token sequence.
//!
//! Every `(element, position)` pair is solved at most once per parse call. The
//! solution is a candidate list in preference order, holding at most one
//! candidate per distinct end position. When two candidates reach the same
//! end, the one consuming more tokens is kept, then the one with fewer noise
//! tokens inside its span; otherwise the earlier one wins. That keeps each
//! entry bounded by the input length, so a call does polynomial work however
//! ambiguous the grammar.
//!
//! ## Preference Order
//!
//! - **terminals** skip noise up to the configured budget, nearest match first
//! - **sequences** extend partial matches child by child, earlier partials first
//! - **choices** follow declared order (or longest first, if configured)
//! - **optionals** try the child before the empty match
//! - **repetitions** try the highest occurrence count first
//!
//! The root may begin at any token. Noise before it is never charged to the
//! skip budget.
//!
//! Candidates are shared `Rc` nodes; a [`MatchSpan`] tree is only built for
//! the root matches a caller actually asks for.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::{ChoiceOrder, MatchConfig, ParseMode, SkipBudget};
use crate::grammar::terminal::fold_case;
use crate::grammar::{ElementId, ElementKind, Grammar};
use crate::tokenizer::Token;

pub mod span;

pub use span::{MatchSpan, ParseTree};

/// One match of one element. Shared between every candidate that contains it.
#[derive(Debug)]
pub(crate) struct Node {
    element: ElementId,
    start: usize,
    end: usize,
    /// Tokens consumed by terminals below this node.
    consumed: usize,
    children: Vec<Rc<Node>>,
}

impl Node {
    fn new(element: ElementId, pos: usize, children: Vec<Rc<Node>>) -> Self {
        let start = children
            .iter()
            .find(|c| c.end > c.start)
            .map_or(pos, |c| c.start);
        let end = children.last().map_or(pos, |c| c.end);
        let consumed = children.iter().map(|c| c.consumed).sum();
        Self {
            element,
            start: if end == pos { pos } else { start },
            end,
            consumed,
            children,
        }
    }

    fn terminal(element: ElementId, start: usize, end: usize) -> Self {
        Self {
            element,
            start,
            end,
            consumed: end - start,
            children: Vec::new(),
        }
    }
}

/// Anything competing for one end position in a candidate list.
trait Ranked {
    fn end(&self) -> usize;
    fn start(&self) -> usize;
    fn consumed(&self) -> usize;

    /// Higher is better: more tokens consumed, then less noise inside the span.
    fn rank(&self) -> (usize, Reverse<usize>) {
        let inner_noise = self.end() - self.start() - self.consumed();
        (self.consumed(), Reverse(inner_noise))
    }
}

impl Ranked for Rc<Node> {
    fn end(&self) -> usize {
        self.end
    }

    fn start(&self) -> usize {
        self.start
    }

    fn consumed(&self) -> usize {
        self.consumed
    }
}

/// Adds `candidate`, or lets it replace a worse candidate with the same end.
/// The replaced slot keeps its place in preference order.
fn admit<T: Ranked>(found: &mut Vec<T>, candidate: T) {
    match found.iter().position(|f| f.end() == candidate.end()) {
        Some(i) => {
            if candidate.rank() > found[i].rank() {
                found[i] = candidate;
            }
        }
        None => found.push(candidate),
    }
}

type Candidates = Rc<Vec<Rc<Node>>>;

/// Counters for one parse call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub memo_entries: usize,
    pub memo_hits: usize,
    pub terminal_tests: usize,
}

/// A partial sequence or repetition match.
#[derive(Clone)]
struct Partial {
    /// Start of the first non-empty child, once there is one.
    start: Option<usize>,
    end: usize,
    consumed: usize,
    children: Vec<Rc<Node>>,
}

impl Partial {
    fn empty(pos: usize) -> Self {
        Self {
            start: None,
            end: pos,
            consumed: 0,
            children: Vec::new(),
        }
    }

    fn extend(&self, candidate: &Rc<Node>) -> Self {
        let mut extended = self.clone();
        if extended.start.is_none() && candidate.end > candidate.start {
            extended.start = Some(candidate.start);
        }
        extended.end = candidate.end;
        extended.consumed += candidate.consumed;
        extended.children.push(Rc::clone(candidate));
        extended
    }
}

impl Ranked for Partial {
    fn end(&self) -> usize {
        self.end
    }

    fn start(&self) -> usize {
        self.start.unwrap_or(self.end)
    }

    fn consumed(&self) -> usize {
        self.consumed
    }
}

// ============================================================================
// MATCHER
// ============================================================================

pub struct Matcher<'g> {
    grammar: &'g Grammar,
    config: MatchConfig,
    tokens: Vec<Token>,
    /// Token texts normalized for literal comparison.
    folded: Vec<String>,
    memo: HashMap<(ElementId, usize), Candidates>,
    stats: MatchStats,
    exhausted: bool,
}

impl<'g> Matcher<'g> {
    pub fn new(grammar: &'g Grammar, config: &MatchConfig, tokens: Vec<Token>) -> Self {
        let case = grammar.options().case;
        let folded = tokens.iter().map(|t| fold_case(&t.text, case)).collect();
        Self {
            grammar,
            config: config.clone(),
            tokens,
            folded,
            memo: HashMap::new(),
            stats: MatchStats::default(),
            exhausted: false,
        }
    }

    /// Whether the memo limit cut the search short.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Runs the search and returns the root matches in the order the
    /// configured [`ParseMode`] prefers them.
    pub fn run(mut self) -> RootMatches<'g> {
        let roots = self.root_candidates();

        if self.exhausted {
            warn!(
                limit = ?self.config.max_memo_entries,
                "memo limit reached; search was cut short"
            );
        }
        debug!(
            goal = %self.grammar.goal_name(),
            tokens = self.tokens.len(),
            matches = roots.len(),
            memo_entries = self.stats.memo_entries,
            memo_hits = self.stats.memo_hits,
            terminal_tests = self.stats.terminal_tests,
            "search finished"
        );

        RootMatches {
            grammar: self.grammar,
            tokens: self.tokens,
            roots,
            next: 0,
        }
    }

    /// Root matches from every start position. With an unlimited budget the
    /// search from position 0 already reaches every later start.
    fn root_candidates(&mut self) -> Vec<Rc<Node>> {
        let root = self.grammar.root();
        let mut roots: Vec<Rc<Node>> = self.candidates(root, 0).iter().cloned().collect();

        if let SkipBudget::Limited(_) = self.config.skip_budget {
            for pos in 1..self.tokens.len() {
                for candidate in self.candidates(root, pos).iter() {
                    if candidate.end > candidate.start {
                        admit(&mut roots, Rc::clone(candidate));
                    }
                }
            }
        }

        if self.config.mode == ParseMode::Widest {
            roots.sort_by_key(|node| Reverse(node.rank()));
        }
        roots
    }

    fn candidates(&mut self, id: ElementId, pos: usize) -> Candidates {
        if let Some(found) = self.memo.get(&(id, pos)) {
            self.stats.memo_hits += 1;
            return Rc::clone(found);
        }
        if let Some(limit) = self.config.max_memo_entries {
            if self.memo.len() >= limit {
                self.exhausted = true;
                return Rc::new(Vec::new());
            }
        }

        let grammar = self.grammar;
        let element = grammar.element(id);
        let found = match element.kind() {
            ElementKind::Literals(_) | ElementKind::Pattern(_) => self.match_terminal(id, pos),
            ElementKind::Sequence(children) => self.match_sequence(id, children, pos),
            ElementKind::Choice(children) => self.match_choice(id, children, pos),
            ElementKind::Optional(inner) => self.match_optional(id, *inner, pos),
            ElementKind::Repeat { inner, min, max } => self.match_repeat(id, *inner, *min, *max, pos),
        };
        trace!(element = %element.name(), pos, candidates = found.len(), "solved");

        let found = Rc::new(found);
        self.memo.insert((id, pos), Rc::clone(&found));
        self.stats.memo_entries += 1;
        found
    }

    fn match_terminal(&mut self, id: ElementId, pos: usize) -> Vec<Rc<Node>> {
        let limit = self.config.skip_budget.search_limit(pos, self.tokens.len());
        let mut found: Vec<Rc<Node>> = Vec::new();
        for at in pos..limit {
            self.stats.terminal_tests += 1;
            let ends = match self.grammar.element(id).kind() {
                ElementKind::Literals(set) => set.match_ends(&self.folded, at),
                ElementKind::Pattern(pattern) if pattern.is_match(&self.tokens[at].text) => vec![at + 1],
                _ => Vec::new(),
            };
            for end in ends {
                admit(&mut found, Rc::new(Node::terminal(id, at, end)));
            }
        }
        found
    }

    fn match_sequence(&mut self, id: ElementId, children: &[ElementId], pos: usize) -> Vec<Rc<Node>> {
        let mut frontier = vec![Partial::empty(pos)];
        for &child in children {
            let mut next: Vec<Partial> = Vec::new();
            for partial in &frontier {
                for candidate in self.candidates(child, partial.end).iter() {
                    admit(&mut next, partial.extend(candidate));
                }
            }
            if next.is_empty() {
                return Vec::new();
            }
            frontier = next;
        }
        frontier
            .into_iter()
            .map(|p| Rc::new(Node::new(id, pos, p.children)))
            .collect()
    }

    fn match_choice(&mut self, id: ElementId, children: &[ElementId], pos: usize) -> Vec<Rc<Node>> {
        let mut found: Vec<Rc<Node>> = Vec::new();
        for &child in children {
            for candidate in self.candidates(child, pos).iter() {
                admit(&mut found, Rc::new(Node::new(id, pos, vec![Rc::clone(candidate)])));
            }
        }
        if self.config.choice_order == ChoiceOrder::Longest {
            found.sort_by(|a, b| b.end.cmp(&a.end));
        }
        found
    }

    fn match_optional(&mut self, id: ElementId, inner: ElementId, pos: usize) -> Vec<Rc<Node>> {
        let mut found: Vec<Rc<Node>> = self
            .candidates(inner, pos)
            .iter()
            .map(|c| Rc::new(Node::new(id, pos, vec![Rc::clone(c)])))
            .collect();
        if !found.iter().any(|n| n.end == pos) {
            found.push(Rc::new(Node::new(id, pos, Vec::new())));
        }
        found
    }

    fn match_repeat(
        &mut self,
        id: ElementId,
        inner: ElementId,
        min: usize,
        max: Option<usize>,
        pos: usize,
    ) -> Vec<Rc<Node>> {
        // A nullable inner can pad any shortfall with empty occurrences, which
        // leave no trace in the tree, so the minimum is already met.
        let min = if self.grammar.element(inner).is_nullable() { 0 } else { min };
        let mut levels: Vec<Vec<Partial>> = vec![vec![Partial::empty(pos)]];

        // Past `min`, every occurrence consumes a token, so unbounded
        // repetition stops after at most `min + len` levels.
        while max.map_or(true, |m| levels.len() <= m) {
            let count = levels.len();
            let mut next: Vec<Partial> = Vec::new();
            for partial in &levels[count - 1] {
                for candidate in self.candidates(inner, partial.end).iter() {
                    let zero_width = candidate.end == partial.end;
                    if zero_width && count > min {
                        continue;
                    }
                    admit(&mut next, partial.extend(candidate));
                }
            }
            if next.is_empty() {
                break;
            }
            levels.push(next);
        }

        let mut found: Vec<Partial> = Vec::new();
        for level in levels.into_iter().skip(min).rev() {
            for partial in level {
                admit(&mut found, partial);
            }
        }
        found
            .into_iter()
            .map(|p| Rc::new(Node::new(id, pos, p.children)))
            .collect()
    }
}

// ============================================================================
// ROOT MATCHES
// ============================================================================

/// The root's candidates for one parse call, materialized into trees on demand.
pub struct RootMatches<'g> {
    grammar: &'g Grammar,
    tokens: Vec<Token>,
    roots: Vec<Rc<Node>>,
    next: usize,
}

impl RootMatches<'_> {
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn materialize(&self, node: &Node) -> MatchSpan {
        let element = self.grammar.element(node.element);
        let text = element.is_terminal().then(|| {
            self.tokens[node.start..node.end]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        });

        let mut skipped = Vec::new();
        let mut previous_end: Option<usize> = None;
        for child in node.children.iter().filter(|c| c.end > c.start) {
            if let Some(prev) = previous_end {
                skipped.extend(prev..child.start);
            }
            previous_end = Some(child.end);
        }

        MatchSpan {
            element: node.element,
            name: element.name().to_string(),
            start: node.start,
            end: node.end,
            text,
            skipped,
            children: node.children.iter().map(|c| self.materialize(c)).collect(),
        }
    }
}

impl Iterator for RootMatches<'_> {
    type Item = ParseTree;

    fn next(&mut self) -> Option<ParseTree> {
        let node = Rc::clone(self.roots.get(self.next)?);
        self.next += 1;
        Some(ParseTree::new(self.materialize(&node), self.tokens.clone()))
    }
}
