use serde::Serialize;

use crate::result::ParseResult;

/// A value held by a [`ParseResult`].
///
/// # Examples
///
/// ```rust
/// use vakya::Value;
/// let v = Value::from("red");
/// assert_eq!(v.type_name(), "Text");
/// assert_eq!(v.as_text(), Some("red"));
/// assert!(Value::default().is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Nil,
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
    Map(ParseResult),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Text(_) => "Text",
            Value::Number(_) => "Number",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ParseResult> {
        match self {
            Value::Map(result) => Some(result),
            _ => None,
        }
    }

    /// Name-keyed lookup into a `Map`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_map().and_then(|r| r.get(name))
    }

    /// Index into a `List`, or into the list view of a `Map`.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Value::List(items) => items.get(index),
            Value::Map(result) => result.items().get(index),
            _ => None,
        }
    }

    /// The matched words, space separated, in match order.
    pub fn text(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::List(items) => join_text(items),
            Value::Map(result) => join_text(result.items()),
        }
    }
}

fn join_text(items: &[Value]) -> String {
    items
        .iter()
        .map(Value::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ParseResult> for Value {
    fn from(result: ParseResult) -> Self {
        Value::Map(result)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}
