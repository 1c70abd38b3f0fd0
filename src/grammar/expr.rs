//! The combinator algebra grammar authors write.
//!
//! An [`Expr`] is a plain description of a grammar element. Nothing is
//! compiled or checked until the expressions are handed to
//! [`GrammarBuilder`](crate::grammar::GrammarBuilder). Constructor functions
//! take the place of operators: `a | b + c` is written
//! `one_of([a, sequence([b, c])])`.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Any one of a set of literal words or phrases.
    Literals(Vec<String>),
    /// A single token accepted by a pattern.
    Pattern(String),
    Sequence(Vec<Expr>),
    Choice(Vec<Expr>),
    Optional(Box<Expr>),
    Repeat {
        inner: Box<Expr>,
        min: usize,
        max: Option<usize>,
    },
    /// A reference to another binding of the grammar, by name.
    Rule(String),
    /// An inline expression with an explicit name.
    Named(String, Box<Expr>),
}

pub fn literals<I, S>(members: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expr::Literals(members.into_iter().map(Into::into).collect())
}

pub fn pattern(source: impl Into<String>) -> Expr {
    Expr::Pattern(source.into())
}

pub fn sequence(children: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Sequence(children.into_iter().collect())
}

pub fn one_of(children: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Choice(children.into_iter().collect())
}

pub fn optional(inner: Expr) -> Expr {
    Expr::Optional(Box::new(inner))
}

/// Between `min` and `max` occurrences; `None` leaves the count unbounded.
pub fn repeat(min: usize, max: Option<usize>, inner: Expr) -> Expr {
    Expr::Repeat {
        inner: Box::new(inner),
        min,
        max,
    }
}

pub fn one_or_more(inner: Expr) -> Expr {
    repeat(1, None, inner)
}

pub fn zero_or_more(inner: Expr) -> Expr {
    repeat(0, None, inner)
}

pub fn rule(name: impl Into<String>) -> Expr {
    Expr::Rule(name.into())
}

impl Expr {
    pub fn named(self, name: impl Into<String>) -> Expr {
        Expr::Named(name.into(), Box::new(self))
    }

    /// Names of the bindings this expression refers to, in order of appearance.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a str>) {
        match self {
            Expr::Rule(name) => refs.push(name),
            Expr::Literals(_) | Expr::Pattern(_) => {}
            Expr::Sequence(children) | Expr::Choice(children) => {
                for child in children {
                    child.collect_references(refs);
                }
            }
            Expr::Optional(inner) | Expr::Repeat { inner, .. } | Expr::Named(_, inner) => {
                inner.collect_references(refs)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, children: &[Expr], sep: &str) -> fmt::Result {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", sep)?;
                }
                write!(f, "{}", child)?;
            }
            Ok(())
        }

        match self {
            Expr::Literals(members) => {
                let quoted: Vec<String> = members.iter().map(|m| format!("{:?}", m)).collect();
                write!(f, "{{{}}}", quoted.join(", "))
            }
            Expr::Pattern(source) => write!(f, "/{}/", source),
            Expr::Sequence(children) => {
                write!(f, "(")?;
                list(f, children, " + ")?;
                write!(f, ")")
            }
            Expr::Choice(children) => {
                write!(f, "(")?;
                list(f, children, " | ")?;
                write!(f, ")")
            }
            Expr::Optional(inner) => write!(f, "[{}]", inner),
            Expr::Repeat { inner, min, max } => match max {
                Some(max) => write!(f, "{}{{{},{}}}", inner, min, max),
                None => write!(f, "{}{{{},}}", inner, min),
            },
            Expr::Rule(name) => write!(f, "{}", name),
            Expr::Named(name, inner) => write!(f, "{}:{}", name, inner),
        }
    }
}
