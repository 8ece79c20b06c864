//! Syntax module for stub files.
//!
//! Recognition lives in [`parser`] (a pest grammar producing the concrete
//! parse tree) and tree-to-model construction in [`builder`]. This module
//! holds what both sides share: byte spans and the fixed literal lines that
//! the grammar matches and the renderer reproduces.

use serde::{Deserialize, Serialize};

pub mod builder;
pub mod parser;

pub use builder::{build, ParseReport};
pub use parser::{recognize, ParseTree, Rule};

/// Fixed literal text of the format.
pub mod literal {
    pub const HEADER: &str = "# coding:utf-8";
    pub const CLASS_PREFIX: &str = "# noinspection PyPep8Naming, PyShadowingNames";
    pub const INDENT: &str = "    ";
    pub const BODY: &str = "        ...";
    /// Lines up constructor parameters under the first one after `__init__(`.
    pub const CONTINUATION: &str = "                 ";
    pub const INIT_OPEN: &str = "    def __init__(self,";
    pub const INIT_CLOSE: &str = ") -> None:";
}

/// Byte range in the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-based line and column of `start` within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let start = self.start.min(source.len());
        let before = &source[..floor_char_boundary(source, start)];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::from(span.start..span.end)
    }
}

fn floor_char_boundary(source: &str, mut index: usize) -> usize {
    while index > 0 && !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}
