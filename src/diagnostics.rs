//! Unified, `miette`-based diagnostics for stub parsing.
//!
//! Every failure the library reports is a [`StubError`]. Two kinds reach
//! users: syntax errors from the recognizer, and structural inconsistencies
//! that the builder accepted but strict mode rejects. `Internal` is reserved
//! for tree shapes the grammar rules out.
//!
//! Errors carry the named source, a primary span, an optional help line and
//! related labels (for example, the earlier declaration that a duplicate
//! overwrote), so a `miette::Report` renders them with source snippets.
//!
//! Construct context-carrying errors with [`err_ctx!`](crate::err_ctx):
//!
//! - `err_ctx!(Internal, "missing name", src, span)`
//! - `err_ctx!(Inconsistency, msg, src, span, help)`
//! - `err_ctx!(Inconsistency, msg, src, span, help, related)`

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe classification of a [`StubError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Text does not match the grammar.
    Syntax,
    /// Field/parameter mismatch or duplicate declaration.
    Inconsistency,
    /// The parse tree had a shape the grammar does not produce.
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Syntax => "syntax",
            ErrorType::Inconsistency => "inconsistency",
            ErrorType::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An additional label for multi-span diagnostics.
#[derive(Debug, Clone)]
pub struct RelatedLabel {
    pub span: Span,
    pub label: String,
}

/// Source, span and help attached to an error.
#[derive(Debug, Default)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
    pub related: Vec<RelatedLabel>,
}

impl ErrorContext {
    pub fn with_source(source: SourceArc) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            ..Self::default()
        }
    }

    pub fn with_all(source: SourceArc, span: Span, help: String) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: Some(help),
            related: vec![],
        }
    }
}

/// Error type for all stub parsing failure modes.
#[derive(Debug, Error)]
pub enum StubError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
        /// Productions the recognizer would have accepted here.
        expected: Vec<String>,
        found: String,
        ctx: ErrorContext,
    },
    #[error("Structural inconsistency: {message}")]
    Inconsistency { message: String, ctx: ErrorContext },
    #[error("Internal error: {message}")]
    Internal { message: String, ctx: ErrorContext },
}

impl StubError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            StubError::Syntax { ctx, .. } => ctx,
            StubError::Inconsistency { ctx, .. } => ctx,
            StubError::Internal { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            StubError::Syntax { .. } => ErrorType::Syntax,
            StubError::Inconsistency { .. } => ErrorType::Inconsistency,
            StubError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// Primary span of the error, if any.
    pub fn span(&self) -> Option<Span> {
        self.get_ctx().span
    }

    /// Line and column of a syntax error.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            StubError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }

    fn label_text(&self) -> String {
        match self {
            StubError::Syntax { expected, .. } if !expected.is_empty() => {
                format!("expected {}", expected.join(" | "))
            }
            StubError::Syntax { .. } => "unexpected input".to_string(),
            StubError::Inconsistency { message, .. } => message.clone(),
            StubError::Internal { message, .. } => message.clone(),
        }
    }
}

impl Diagnostic for StubError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("thriftstub::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        let mut labels = Vec::new();
        if let Some(span) = ctx.span {
            labels.push(LabeledSpan::new(
                Some(self.label_text()),
                span.start,
                span.len().max(1),
            ));
        }
        for rel in &ctx.related {
            labels.push(LabeledSpan::new(
                Some(rel.label.clone()),
                rel.span.start,
                rel.span.len().max(1),
            ));
        }
        if labels.is_empty() {
            None
        } else {
            Some(Box::new(labels.into_iter()))
        }
    }
}

/// Wraps source text for use in error contexts.
pub fn to_error_source<S: AsRef<str>>(name: &str, source: S) -> SourceArc {
    Arc::new(NamedSource::new(name, source.as_ref().to_string()))
}

/// Constructs a `StubError` variant that has `message` and `ctx` fields,
/// attaching source, span and optionally help and related labels.
#[macro_export]
macro_rules! err_ctx {
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr, $related:expr) => {
        $crate::diagnostics::StubError::$variant {
            message: $msg.to_string(),
            ctx: $crate::diagnostics::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
                related: $related,
            },
        }
    };
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::err_ctx!($variant, $msg, $src, $span, $help, vec![])
    };
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::diagnostics::StubError::$variant {
            message: $msg.to_string(),
            ctx: $crate::diagnostics::ErrorContext::with_source_and_span(
                $crate::diagnostics::SourceArc::clone($src),
                $span,
            ),
        }
    };
}
