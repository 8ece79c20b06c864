//! Stub parser: recognition against the fixed grammar.
//!
//! Converts stub text into a concrete parse tree ([`ParseTree`]). This stage
//! is purely syntactic; model construction happens in
//! [`builder`](crate::syntax::builder).

use pest::error::{Error, ErrorVariant, InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::{debug, warn};

use crate::config::ParseOptions;
use crate::diagnostics::{to_error_source, ErrorContext, RelatedLabel, SourceArc, StubError};
use crate::model::Document;
use crate::syntax::builder::{build, ParseReport};
use crate::syntax::Span;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct StubParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Concrete parse tree of one stub file.
///
/// The root is the `document` rule; its children are the header followed by
/// the seven sections in grammar order.
#[derive(Debug, Clone)]
pub struct ParseTree<'i> {
    root: Pair<'i, Rule>,
    source: SourceArc,
}

impl<'i> ParseTree<'i> {
    pub fn root(&self) -> &Pair<'i, Rule> {
        &self.root
    }

    /// Header and section nodes, without the end-of-input marker.
    pub fn sections(&self) -> impl Iterator<Item = Pair<'i, Rule>> {
        self.root
            .clone()
            .into_inner()
            .filter(|p| p.as_rule() != Rule::EOI)
    }

    /// Source used for diagnostics raised against this tree.
    pub fn source(&self) -> &SourceArc {
        &self.source
    }
}

/// Parse stub text into a [`Document`].
///
/// Duplicates and field/parameter mismatches are accepted (last declaration
/// wins) and logged; use [`parse_with`] to inspect or reject them.
pub fn parse(text: &str) -> Result<Document, StubError> {
    parse_with(text, &ParseOptions::default()).map(|report| report.document)
}

/// Parse stub text, returning the document and every structural
/// inconsistency found while building it.
///
/// With `options.strict` the first inconsistency is returned as an error.
pub fn parse_with(text: &str, options: &ParseOptions) -> Result<ParseReport, StubError> {
    let tree = recognize_named(text, &options.source_name)?;
    let source = tree.source().clone();
    let report = build(tree)?;

    if options.strict {
        if let Some(first) = report.inconsistencies.first() {
            return Err(first.to_error(&source));
        }
    }
    for finding in &report.inconsistencies {
        warn!(source = %options.source_name, "{}", finding);
    }
    Ok(report)
}

/// Recognize `text` against the grammar, producing the concrete tree.
pub fn recognize(text: &str) -> Result<ParseTree<'_>, StubError> {
    recognize_named(text, "source")
}

/// Like [`recognize`], naming the source for diagnostics.
pub fn recognize_named<'i>(text: &'i str, name: &str) -> Result<ParseTree<'i>, StubError> {
    let source = to_error_source(name, text);
    let mut pairs =
        StubParser::parse(Rule::document, text).map_err(|e| convert_parse_error(e, &source, text))?;

    let root = pairs.next().ok_or_else(|| StubError::Internal {
        message: "grammar produced no document node".into(),
        ctx: ErrorContext::with_source(source.clone()),
    })?;
    debug!(source = name, bytes = text.len(), "recognized stub text");
    Ok(ParseTree { root, source })
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, source: &SourceArc, text: &str) -> StubError {
    let (start, end) = match error.location {
        InputLocation::Pos(pos) => (pos, pos),
        InputLocation::Span((start, end)) => (start, end),
    };
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };

    let expected = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            let mut names: Vec<String> = Vec::new();
            for rule in positives {
                let name = describe(*rule).to_string();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            names
        }
        ErrorVariant::CustomError { message } => vec![message.clone()],
    };
    let stray = stray_char(text, start);
    let found = match stray {
        Some((_, c)) => format!("`{}`", c),
        None => found_token(text, start),
    };

    let message = if expected.is_empty() {
        format!("unexpected {}", found)
    } else {
        format!("expected {}, found {}", join_expected(&expected), found)
    };

    let span = Span::new(start, end.max(start));
    let mut ctx = ErrorContext::with_all(source.clone(), span, help_for(text, start));
    if let Some((offset, c)) = stray {
        ctx.related.push(RelatedLabel {
            span: Span::new(offset, offset + c.len_utf8()),
            label: "no token may contain this character".to_string(),
        });
    }
    StubError::Syntax {
        message,
        line,
        column,
        expected,
        found,
        ctx,
    }
}

/// First character on the failing line that no token of the format can
/// contain. Backtracking reports failures at the start of the line, so this
/// is usually the real culprit.
fn stray_char(text: &str, pos: usize) -> Option<(usize, char)> {
    let pos = pos.min(text.len());
    let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
    text.get(pos..line_end)?
        .char_indices()
        .find(|(_, c)| !is_token_char(*c))
        .map(|(i, c)| (pos + i, c))
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || "_.-'\"{}[]()=:,>#".contains(c)
}

/// Human-readable name of a grammar rule, used in "expected ..." messages.
pub fn describe(rule: Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of input",
        Rule::document => "document",
        Rule::header => "the `# coding:utf-8` header",
        Rule::imports | Rule::from_import => "an import line",
        Rule::module => "an imported module",
        Rule::module_name => "a module name",
        Rule::module_alias => "a module alias",
        Rule::package => "a package name",
        Rule::constants | Rule::constant => "a constant",
        Rule::enums | Rule::enum_class => "an enum class",
        Rule::enum_member => "an enum member",
        Rule::records | Rule::record => "a struct class",
        Rule::unions | Rule::union_class => "a union class",
        Rule::exceptions | Rule::exception => "an exception class",
        Rule::fields | Rule::field => "a field annotation",
        Rule::init => "an `__init__` constructor",
        Rule::enum_base => "`(Enum):`",
        Rule::object_base => "`(object):`",
        Rule::exception_base => "`(TException):`",
        Rule::body => "an indented `...` body",
        Rule::init_params | Rule::method_params | Rule::param => "a parameter",
        Rule::services | Rule::service => "a service class",
        Rule::method => "a service method",
        Rule::name => "a name",
        Rule::type_text => "a type",
        Rule::value => "a value",
        Rule::class_prefix => "a class declaration",
        Rule::identifier => "a name",
        Rule::word_char => "a word character",
        Rule::INDENT | Rule::BODY_INDENT | Rule::CONTINUATION => "indentation",
        Rule::sp | Rule::gap => "whitespace",
        Rule::eol => "end of line",
    }
}

fn join_expected(expected: &[String]) -> String {
    match expected {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// The offending token: the rest of the word at `pos`, or a description of
/// what sits there.
fn found_token(text: &str, pos: usize) -> String {
    let rest = text.get(pos..).unwrap_or("");
    match rest.chars().next() {
        None => "end of input".to_string(),
        Some('\n') | Some('\r') => "end of line".to_string(),
        Some(' ') | Some('\t') => "whitespace".to_string(),
        Some(_) => {
            let token: String = rest.chars().take_while(|c| !c.is_whitespace()).take(32).collect();
            format!("`{}`", token)
        }
    }
}

fn help_for(text: &str, pos: usize) -> String {
    let line_start = text[..pos.min(text.len())].rfind('\n').map_or(0, |i| i + 1);
    let indent = text[line_start..]
        .chars()
        .take_while(|c| *c == ' ')
        .count();
    match indent {
        0 | 4 | 8 | 17 => {
            "stub files follow a fixed layout; compare with the output of `thriftstub format`".into()
        }
        n => format!(
            "this line is indented by {} spaces; members use 4, bodies 8 and constructor parameters 17",
            n
        ),
    }
}
