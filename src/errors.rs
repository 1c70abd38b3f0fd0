//! Vakya Error Handling - Unified Encapsulated API
//!
//! Every failure the engine can report is a [`VakyaError`]: a kind (what went
//! wrong), source information (where), and diagnostic information (how to help).
//! Errors are created through the [`ErrorReporting`] trait so that each phase
//! (grammar construction, matching, post-processing, configuration) attaches its
//! own source and error code.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Text an error points into: a rendered rule, a pattern, or the parsed input.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from named text.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }

    /// Span covering the whole content.
    pub fn full_span(&self) -> SourceSpan {
        SourceSpan::from(0..self.content.len())
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The single error type: what went wrong, where, and how to help.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct VakyaError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

/// All error kinds as a flat enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Grammar construction errors - fatal to the grammar being built
    #[error("Grammar error: invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Grammar error: no binding for the start symbol '{goal}'")]
    MissingGoal { goal: String },
    #[error("Grammar error: '{rule}' references undefined element '{reference}'")]
    UndefinedReference { rule: String, reference: String },
    #[error("Grammar error: cyclic reference {}", .cycle.join(" -> "))]
    CyclicGrammar { cycle: Vec<String> },
    #[error("Grammar error: '{name}' is bound more than once")]
    DuplicateBinding { name: String },
    #[error("Grammar error: literal set in '{rule}' has no usable members")]
    EmptyLiteralSet { rule: String },
    #[error("Grammar error: invalid repetition bounds in '{rule}': {reason}")]
    InvalidRepeat { rule: String, reason: String },
    #[error("Grammar error: '{rule}' combines no elements")]
    EmptyCombinator { rule: String },
    #[error("Grammar error: action registered for unknown element '{name}'")]
    UnknownActionTarget { name: String },

    // Matching outcome - recoverable, never a crash
    #[error("No parse: '{goal}' could not be matched anywhere in {tokens} token(s)")]
    NoParse { goal: String, tokens: usize },

    // Post-processing - isolated to one key of the result
    #[error("Action error on '{key}': {message}")]
    PostProcessing { key: String, message: String },

    // Configuration
    #[error("Config error: {message}")]
    InvalidConfig { message: String },
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Grammar,
    Match,
    PostProcessing,
    Config,
}

impl ErrorKind {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPattern { .. }
            | Self::MissingGoal { .. }
            | Self::UndefinedReference { .. }
            | Self::CyclicGrammar { .. }
            | Self::DuplicateBinding { .. }
            | Self::EmptyLiteralSet { .. }
            | Self::InvalidRepeat { .. }
            | Self::EmptyCombinator { .. }
            | Self::UnknownActionTarget { .. } => ErrorCategory::Grammar,

            Self::NoParse { .. } => ErrorCategory::Match,

            Self::PostProcessing { .. } => ErrorCategory::PostProcessing,

            Self::InvalidConfig { .. } => ErrorCategory::Config,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::MissingGoal { .. } => "missing_goal",
            Self::UndefinedReference { .. } => "undefined_reference",
            Self::CyclicGrammar { .. } => "cyclic_grammar",
            Self::DuplicateBinding { .. } => "duplicate_binding",
            Self::EmptyLiteralSet { .. } => "empty_literal_set",
            Self::InvalidRepeat { .. } => "invalid_repeat",
            Self::EmptyCombinator { .. } => "empty_combinator",
            Self::UnknownActionTarget { .. } => "unknown_action_target",
            Self::NoParse { .. } => "no_parse",
            Self::PostProcessing { .. } => "post_processing",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "invalid pattern",
            Self::MissingGoal { .. } => "start symbol missing",
            Self::UndefinedReference { .. } => "undefined reference",
            Self::CyclicGrammar { .. } => "cycle starts here",
            Self::DuplicateBinding { .. } => "bound again here",
            Self::EmptyLiteralSet { .. } => "empty literal set",
            Self::InvalidRepeat { .. } => "invalid bounds",
            Self::EmptyCombinator { .. } => "nothing to combine",
            Self::UnknownActionTarget { .. } => "unknown element",
            Self::NoParse { .. } => "no match in this input",
            Self::PostProcessing { .. } => "action failed on this value",
            Self::InvalidConfig { .. } => "invalid configuration",
        }
    }
}

impl VakyaError {
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn is_no_parse(&self) -> bool {
        matches!(self.kind, ErrorKind::NoParse { .. })
    }

    /// Attach a help message.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }
}

impl Diagnostic for VakyaError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// ERROR CONTEXTS
// ============================================================================

/// Context-aware error creation - each phase knows how to create its errors
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> VakyaError;

    fn undefined_reference(&self, rule: &str, reference: &str, span: SourceSpan) -> VakyaError {
        self.report(
            ErrorKind::UndefinedReference {
                rule: rule.into(),
                reference: reference.into(),
            },
            span,
        )
        .with_help(format!("define '{}' with GrammarBuilder::define", reference))
    }

    fn invalid_pattern(&self, pattern: &str, reason: &str, span: SourceSpan) -> VakyaError {
        self.report(
            ErrorKind::InvalidPattern {
                pattern: pattern.into(),
                reason: reason.into(),
            },
            span,
        )
    }

    fn invalid_repeat(&self, rule: &str, reason: &str, span: SourceSpan) -> VakyaError {
        self.report(
            ErrorKind::InvalidRepeat {
                rule: rule.into(),
                reason: reason.into(),
            },
            span,
        )
    }
}

/// Error context for one phase over one piece of source text.
pub struct PhaseContext {
    pub source: SourceContext,
    pub phase: String,
}

impl PhaseContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }

    /// Context for errors in grammar construction, pointing into `rule`.
    pub fn grammar(rule: &str, rendered: impl Into<String>) -> Self {
        Self::new(SourceContext::new(rule, rendered), "grammar")
    }
}

impl ErrorReporting for PhaseContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> VakyaError {
        let error_code = format!("vakya::{}::{}", self.phase, kind.code_suffix());

        VakyaError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

/// Creates a placeholder span for errors not tied to a specific location.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// Builds a `NoParse` error whose source is the parsed input.
pub fn no_parse(goal: &str, input: &str, tokens: usize) -> VakyaError {
    let ctx = PhaseContext::new(SourceContext::new("input", input), "match");
    ctx.report(
        ErrorKind::NoParse {
            goal: goal.into(),
            tokens,
        },
        SourceSpan::from(0..input.len()),
    )
    .with_help("the input lacks a terminal the start symbol requires")
}

/// Builds a configuration error from a deserializer message.
pub fn invalid_config(format: &str, content: &str, message: impl Into<String>) -> VakyaError {
    let ctx = PhaseContext::new(SourceContext::new(format, content), "config");
    ctx.report(
        ErrorKind::InvalidConfig {
            message: message.into(),
        },
        SourceSpan::from(0..content.len()),
    )
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a VakyaError with full miette diagnostics to stderr.
pub fn print_error(error: VakyaError) {
    eprintln!("{}", render_error(error));
}

/// Renders a VakyaError with full miette diagnostics.
pub fn render_error(error: VakyaError) -> String {
    let report = miette::Report::new(error);
    format!("{report:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_and_category() {
        let ctx = PhaseContext::grammar("color", "Pattern(red|(blue)");
        let err = ctx.invalid_pattern("red|(blue", "unclosed group", unspanned());
        assert_eq!(err.category(), ErrorCategory::Grammar);
        assert_eq!(err.diagnostic_info.error_code, "vakya::grammar::invalid_pattern");
        assert!(err.to_string().contains("invalid pattern 'red|(blue'"));
    }

    #[test]
    fn test_report_renders_help_and_label() {
        let err = no_parse("GOAL", "set to red", 3);
        assert!(err.is_no_parse());
        let output = render_error(err);
        assert!(output.contains("No parse"));
        assert!(output.contains("no match in this input"));
        assert!(output.contains("lacks a terminal"));
    }

    #[test]
    fn test_cycle_display_joins_path() {
        let kind = ErrorKind::CyclicGrammar {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(kind.to_string(), "Grammar error: cyclic reference a -> b -> a");
    }
}
