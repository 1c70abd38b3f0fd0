//! The concrete parse tree returned to callers.

use serde::Serialize;

use crate::grammar::ElementId;
use crate::tokenizer::Token;

/// One matched element: the tokens it covers and the matches of its children.
///
/// Zero-width matches (an empty optional, zero repetitions) have
/// `start == end` and consume nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSpan {
    pub element: ElementId,
    pub name: String,
    /// First consumed token.
    pub start: usize,
    /// One past the last consumed token.
    pub end: usize,
    /// Matched words, for terminals only.
    pub text: Option<String>,
    /// Noise positions between this span's children.
    pub skipped: Vec<usize>,
    pub children: Vec<MatchSpan>,
}

impl MatchSpan {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_terminal(&self) -> bool {
        self.text.is_some()
    }

    /// Terminal spans in match order.
    pub fn leaves(&self) -> Vec<&MatchSpan> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a MatchSpan>) {
        if self.is_terminal() {
            leaves.push(self);
            return;
        }
        for child in &self.children {
            child.collect_leaves(leaves);
        }
    }

    /// Number of tokens consumed by terminals.
    pub fn consumed(&self) -> usize {
        self.leaves().iter().map(|leaf| leaf.end - leaf.start).sum()
    }

    /// Every noise position inside this span, sorted.
    pub fn noise(&self) -> Vec<usize> {
        let mut noise = self.skipped.clone();
        for child in &self.children {
            noise.extend(child.noise());
        }
        noise.sort_unstable();
        noise
    }
}

/// A complete match of the start symbol over a token sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseTree {
    pub root: MatchSpan,
    pub tokens: Vec<Token>,
    /// Noise before the root's first consumed token.
    pub leading_noise: Vec<usize>,
    /// Noise after the root's last consumed token.
    pub trailing_noise: Vec<usize>,
}

impl ParseTree {
    pub(crate) fn new(root: MatchSpan, tokens: Vec<Token>) -> Self {
        let (leading_noise, trailing_noise) = if root.is_empty() {
            (Vec::new(), (0..tokens.len()).collect())
        } else {
            ((0..root.start).collect(), (root.end..tokens.len()).collect())
        };
        Self {
            root,
            tokens,
            leading_noise,
            trailing_noise,
        }
    }

    /// Words consumed by terminals, one entry per token, in order.
    pub fn leaf_words(&self) -> Vec<&str> {
        self.root
            .leaves()
            .iter()
            .flat_map(|leaf| self.tokens[leaf.start..leaf.end].iter())
            .map(|token| token.text.as_str())
            .collect()
    }

    /// Every noise position: leading, internal and trailing, sorted.
    pub fn noise(&self) -> Vec<usize> {
        let mut noise = self.leading_noise.clone();
        noise.extend(self.root.noise());
        noise.extend(self.trailing_noise.iter().copied());
        noise.sort_unstable();
        noise
    }

    pub fn noise_words(&self) -> Vec<&str> {
        self.noise()
            .into_iter()
            .map(|i| self.tokens[i].text.as_str())
            .collect()
    }
}
