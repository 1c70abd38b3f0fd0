//! Implicit names for elements the grammar author did not name.
//!
//! Names are derived from the element's kind and its children's names, so two
//! elements with the same derived name have the same shape. The builder uses
//! this to share one element between every place the shape appears.

pub fn literal_set(members: &[String]) -> String {
    format!("Set({})", members.join("|"))
}

pub fn pattern(source: &str) -> String {
    format!("Pattern({})", source)
}

pub fn sequence(children: &[&str]) -> String {
    format!("And({})", children.join(", "))
}

pub fn choice(children: &[&str]) -> String {
    format!("Or({})", children.join(", "))
}

pub fn optional(child: &str) -> String {
    format!("Optional({})", child)
}

pub fn repeat(child: &str, min: usize, max: Option<usize>) -> String {
    match (min, max) {
        (0, None) => format!("ZeroOrMore({})", child),
        (1, None) => format!("OneOrMore({})", child),
        (min, None) => format!("Repeat({}, {}, *)", child, min),
        (min, Some(max)) => format!("Repeat({}, {}, {})", child, min, max),
    }
}
