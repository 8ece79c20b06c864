//! Structural consistency checks.
//!
//! The builder accepts any tree the grammar produces. What it accepts but a
//! consumer may trip over is reported here as an [`Inconsistency`]:
//! constructors that disagree with their fields, and duplicate keys that an
//! ordered map silently collapses.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::{ErrorContext, RelatedLabel, SourceArc, StubError};
use crate::err_ctx;
use crate::model::{Document, Record, RecordKind};
use crate::syntax::Span;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum InconsistencyKind {
    #[error("declares {fields} field(s) but its constructor takes {params} parameter(s)")]
    CountMismatch { fields: usize, params: usize },
    #[error("field `{field}` at position {position} does not match constructor parameter `{param}`")]
    NameMismatch {
        position: usize,
        field: String,
        param: String,
    },
    #[error("method `{name}` is declared more than once; the last declaration wins")]
    DuplicateMethod { name: String },
    #[error("field `{name}` is declared more than once; the last declaration wins")]
    DuplicateField { name: String },
    #[error("package `{name}` is imported on more than one line; the last line wins")]
    DuplicatePackage { name: String },
}

impl InconsistencyKind {
    fn help(&self) -> &'static str {
        match self {
            InconsistencyKind::CountMismatch { .. } | InconsistencyKind::NameMismatch { .. } => {
                "constructor parameters must list the fields in the same order"
            }
            InconsistencyKind::DuplicateMethod { .. } | InconsistencyKind::DuplicateField { .. } => {
                "rename or remove one of the declarations"
            }
            InconsistencyKind::DuplicatePackage { .. } => {
                "list every module of a package on a single import line"
            }
        }
    }
}

/// A structural observation about a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inconsistency {
    /// What the finding is about, e.g. ``struct `User` ``.
    pub owner: String,
    pub kind: InconsistencyKind,
    /// Where the offending declaration is, when built from text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// The earlier declaration a duplicate replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Span>,
}

impl Inconsistency {
    pub fn new(owner: impl Into<String>, kind: InconsistencyKind) -> Self {
        Self {
            owner: owner.into(),
            kind,
            span: None,
            previous: None,
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn replacing(mut self, previous: Span) -> Self {
        self.previous = Some(previous);
        self
    }

    /// Upgrades the finding to an error against `source`.
    pub fn to_error(&self, source: &SourceArc) -> StubError {
        let Some(span) = self.span else {
            return StubError::Inconsistency {
                message: self.to_string(),
                ctx: ErrorContext {
                    help: Some(self.kind.help().to_string()),
                    ..ErrorContext::with_source(SourceArc::clone(source))
                },
            };
        };
        let related = self
            .previous
            .map(|prev| RelatedLabel {
                span: prev,
                label: "previously declared here".to_string(),
            })
            .into_iter()
            .collect();
        err_ctx!(Inconsistency, self, source, span, self.kind.help(), related)
    }
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.owner, self.kind)
    }
}

/// Label for a record-like class, as used in [`Inconsistency::owner`].
pub fn record_owner(kind: RecordKind, name: &str) -> String {
    format!("{} `{}`", kind.label(), name)
}

/// Compares a record's fields against its constructor parameters.
pub fn check_record(record: &Record) -> Vec<InconsistencyKind> {
    let mut found = Vec::new();
    if record.fields.len() != record.init.len() {
        found.push(InconsistencyKind::CountMismatch {
            fields: record.fields.len(),
            params: record.init.len(),
        });
    }
    for (position, (field, param)) in record.fields.values().zip(&record.init).enumerate() {
        if field.name != param.name() {
            found.push(InconsistencyKind::NameMismatch {
                position: position + 1,
                field: field.name.clone(),
                param: param.name().to_string(),
            });
        }
    }
    found
}

/// Field/parameter correspondence check over a whole document.
///
/// Duplicates cannot be seen here: the model has already collapsed them.
/// They are reported by the builder when parsing.
pub fn check(document: &Document) -> Vec<Inconsistency> {
    document
        .record_like()
        .flat_map(|(kind, record)| {
            check_record(record)
                .into_iter()
                .map(move |k| Inconsistency::new(record_owner(kind, &record.name), k))
        })
        .collect()
}
