//! Thriftstub: parser and canonical renderer for generated Thrift type-stub
//! files.
//!
//! [`parse`] turns stub text into a [`Document`]; [`compose`] turns a
//! document back into canonical text. The two are inverses on canonical
//! input.

pub use crate::config::ParseOptions;
pub use crate::consistency::{check, Inconsistency, InconsistencyKind};
pub use crate::diagnostics::{to_error_source, ErrorContext, ErrorType, SourceArc, StubError};
pub use crate::model::Document;
pub use crate::render::compose;
pub use crate::syntax::parser::{parse, parse_with};
pub use crate::syntax::{ParseReport, Span};

pub mod cli;
pub mod config;
pub mod consistency;
pub mod diagnostics;
pub mod model;
pub mod render;
pub mod syntax;
