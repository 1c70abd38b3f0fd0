//! Noise-tolerant grammar combinators for short natural-language commands.
//!
//! ```rust
//! use vakya::{literals, one_or_more, pattern, rule, sequence, Grammar};
//!
//! let grammar = Grammar::builder()
//!     .define("action", literals(["set", "change", "flash"]))
//!     .define("light", literals(["top", "bottom"]))
//!     .define("color", pattern("red|yellow|blue"))
//!     .define("one_parse", sequence([rule("action"), rule("light"), rule("color")]))
//!     .define("GOAL", one_or_more(rule("one_parse")))
//!     .build()
//!     .unwrap();
//!
//! let outcome = grammar.parse("please set my top light to red").unwrap();
//! assert_eq!(outcome.result["color"], "red");
//! assert_eq!(outcome.noise(), vec!["please", "my", "light", "to"]);
//! ```

pub use crate::config::{CaseSensitivity, ChoiceOrder, GrammarOptions, MatchConfig, ParseMode, SkipBudget};
pub use crate::engine::{MatchSpan, ParseTree};
pub use crate::errors::{print_error, render_error, ErrorCategory, ErrorKind, VakyaError};
pub use crate::grammar::{
    literals, one_of, one_or_more, optional, pattern, repeat, rule, sequence, zero_or_more, Expr, Grammar,
    GrammarBuilder, GOAL,
};
pub use crate::parser::{ParseOutcome, Parser, Parses};
pub use crate::result::{ActionError, ParseResult, PostProcessingFailure, Value};
pub use crate::tokenizer::{tokens_from_words, Token, Tokenizer, WhitespaceTokenizer, WordTokenizer};

pub mod config;
pub mod engine;
pub mod errors;
pub mod grammar;
pub mod parser;
pub mod result;
pub mod tokenizer;
