//! Builds a [`Document`] from the concrete parse tree.
//!
//! The walk is structural: each grammar node maps to one construction step
//! and order is preserved throughout. Nothing is validated beyond shape;
//! duplicates and constructor mismatches are recorded as
//! [`Inconsistency`] findings next to the document.

use std::collections::HashMap;

use pest::iterators::{Pair, Pairs};
use serde::Serialize;
use tracing::debug;

use crate::consistency::{check_record, record_owner, Inconsistency, InconsistencyKind};
use crate::diagnostics::{SourceArc, StubError};
use crate::err_ctx;
use crate::model::{
    Constant, Document, Enum, EnumMember, Field, FromImport, ImportedModule, Method, Parameter,
    Record, RecordKind, Service,
};
use crate::syntax::parser::{describe, ParseTree, Rule};
use crate::syntax::Span;

/// A built document plus what the builder noticed along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub document: Document,
    pub inconsistencies: Vec<Inconsistency>,
}

impl ParseReport {
    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// Walk `tree` into a [`Document`].
pub fn build(tree: ParseTree<'_>) -> Result<ParseReport, StubError> {
    let mut builder = DocumentBuilder::new(tree.source().clone());
    for section in tree.sections() {
        builder.section(section)?;
    }
    let report = builder.finish();
    debug!(
        imports = report.document.imports.len(),
        constants = report.document.constants.len(),
        enums = report.document.enums.len(),
        records = report.document.records.len(),
        exceptions = report.document.error_types.len(),
        services = report.document.services.len(),
        inconsistencies = report.inconsistencies.len(),
        "built document"
    );
    Ok(report)
}

struct DocumentBuilder {
    source: SourceArc,
    document: Document,
    findings: Vec<Inconsistency>,
}

impl DocumentBuilder {
    fn new(source: SourceArc) -> Self {
        Self {
            source,
            document: Document::default(),
            findings: Vec::new(),
        }
    }

    fn finish(self) -> ParseReport {
        ParseReport {
            document: self.document,
            inconsistencies: self.findings,
        }
    }

    fn section(&mut self, pair: Pair<'_, Rule>) -> Result<(), StubError> {
        match pair.as_rule() {
            Rule::header => {}
            Rule::imports => self.imports(pair)?,
            Rule::constants => {
                for item in pair.into_inner() {
                    let constant = self.constant(item)?;
                    self.document.constants.push(constant);
                }
            }
            Rule::enums => {
                for item in pair.into_inner() {
                    let parsed = self.enum_class(item)?;
                    self.document.enums.push(parsed);
                }
            }
            Rule::records => {
                for item in pair.into_inner() {
                    let record = self.record(item, RecordKind::Struct)?;
                    self.document.records.push(record);
                }
            }
            Rule::unions => {
                for item in pair.into_inner() {
                    let record = self.record(item, RecordKind::Union)?;
                    self.document.unions.push(record);
                }
            }
            Rule::exceptions => {
                for item in pair.into_inner() {
                    let record = self.record(item, RecordKind::Exception)?;
                    self.document.error_types.push(record);
                }
            }
            Rule::services => {
                for item in pair.into_inner() {
                    let service = self.service(item)?;
                    self.document.services.push(service);
                }
            }
            rule => return Err(self.unexpected(rule, "a document section", span_of(&pair))),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------------

    fn imports(&mut self, pair: Pair<'_, Rule>) -> Result<(), StubError> {
        let mut seen: HashMap<String, Span> = HashMap::new();
        for line in pair.into_inner() {
            let mut inner = self.children(line, Rule::from_import)?;
            let package_pair = self.expect(&mut inner, Rule::package)?;
            let package_span = span_of(&package_pair);
            let package = package_pair.as_str().to_string();

            let mut from_import = FromImport::new(&package);
            for module in inner {
                from_import.modules.push(self.module(module)?);
            }

            if let Some(previous) = seen.insert(package.clone(), package_span) {
                self.findings.push(
                    Inconsistency::new(
                        "imports",
                        InconsistencyKind::DuplicatePackage {
                            name: package.clone(),
                        },
                    )
                    .at(package_span)
                    .replacing(previous),
                );
            }
            // Replaces in place: a repeated package keeps its first position.
            self.document.imports.insert(package, from_import);
        }
        Ok(())
    }

    fn module(&self, pair: Pair<'_, Rule>) -> Result<ImportedModule, StubError> {
        let mut inner = self.children(pair, Rule::module)?;
        let name = self.expect(&mut inner, Rule::module_name)?.as_str();
        match inner.next() {
            Some(alias) if alias.as_rule() == Rule::module_alias => {
                Ok(ImportedModule::aliased(name, alias.as_str()))
            }
            Some(other) => Err(self.unexpected(other.as_rule(), "a module alias", span_of(&other))),
            None => Ok(ImportedModule::new(name)),
        }
    }

    fn constant(&self, pair: Pair<'_, Rule>) -> Result<Constant, StubError> {
        let mut inner = self.children(pair, Rule::constant)?;
        let name = self.expect(&mut inner, Rule::name)?.as_str();
        Ok(Constant::new(name, optional_value(&mut inner)))
    }

    fn enum_class(&self, pair: Pair<'_, Rule>) -> Result<Enum, StubError> {
        let mut inner = self.children(pair, Rule::enum_class)?;
        let mut parsed = Enum::new(self.expect(&mut inner, Rule::name)?.as_str());
        self.expect(&mut inner, Rule::enum_base)?;
        for member in inner {
            let mut kv = self.children(member, Rule::enum_member)?;
            let key = self.expect(&mut kv, Rule::name)?.as_str().to_string();
            parsed.members.push(EnumMember {
                key,
                value: optional_value(&mut kv),
            });
        }
        Ok(parsed)
    }

    fn record(&mut self, pair: Pair<'_, Rule>, kind: RecordKind) -> Result<Record, StubError> {
        let (rule, base) = match kind {
            RecordKind::Struct => (Rule::record, Rule::object_base),
            RecordKind::Union => (Rule::union_class, Rule::object_base),
            RecordKind::Exception => (Rule::exception, Rule::exception_base),
        };
        let mut inner = self.children(pair, rule)?;
        let name_pair = self.expect(&mut inner, Rule::name)?;
        self.expect(&mut inner, base)?;
        let name_span = span_of(&name_pair);
        let mut record = Record::new(name_pair.as_str());
        let owner = record_owner(kind, &record.name);

        let fields = self.expect(&mut inner, Rule::fields)?;
        let mut seen: HashMap<String, Span> = HashMap::new();
        for field in fields.into_inner() {
            let mut parts = self.children(field, Rule::field)?;
            let field_name = self.expect(&mut parts, Rule::name)?;
            let field_span = span_of(&field_name);
            let type_text = self.expect(&mut parts, Rule::type_text)?.as_str();
            let field = Field::new(field_name.as_str(), type_text);

            if let Some(previous) = seen.insert(field.name.clone(), field_span) {
                self.findings.push(
                    Inconsistency::new(
                        owner.clone(),
                        InconsistencyKind::DuplicateField {
                            name: field.name.clone(),
                        },
                    )
                    .at(field_span)
                    .replacing(previous),
                );
            }
            record.fields.insert(field.name.clone(), field);
        }

        let init = self.expect(&mut inner, Rule::init)?;
        let mut init_inner = init.into_inner();
        let params = self.expect(&mut init_inner, Rule::init_params)?;
        record.init = self.params(params)?;

        for mismatch in check_record(&record) {
            self.findings
                .push(Inconsistency::new(owner.clone(), mismatch).at(name_span));
        }
        Ok(record)
    }

    fn service(&mut self, pair: Pair<'_, Rule>) -> Result<Service, StubError> {
        let mut inner = self.children(pair, Rule::service)?;
        let mut service = Service::new(self.expect(&mut inner, Rule::name)?.as_str());
        self.expect(&mut inner, Rule::object_base)?;
        let owner = format!("service `{}`", service.name);

        let mut seen: HashMap<String, Span> = HashMap::new();
        for method in inner {
            let mut parts = self.children(method, Rule::method)?;
            let name_pair = self.expect(&mut parts, Rule::name)?;
            let name_span = span_of(&name_pair);
            let params = self.expect(&mut parts, Rule::method_params)?;
            let params = self.params(params)?;
            let returns = self.expect(&mut parts, Rule::type_text)?.as_str();

            let method = Method {
                name: name_pair.as_str().to_string(),
                params,
                returns: returns.to_string(),
            };
            let name = method.name.clone();
            if service.add_method(method).is_some() {
                let kind = InconsistencyKind::DuplicateMethod { name: name.clone() };
                let mut finding = Inconsistency::new(owner.clone(), kind).at(name_span);
                if let Some(previous) = seen.get(&name) {
                    finding = finding.replacing(*previous);
                }
                self.findings.push(finding);
            }
            seen.insert(name, name_span);
        }
        Ok(service)
    }

    fn params(&self, pair: Pair<'_, Rule>) -> Result<Vec<Parameter>, StubError> {
        pair.into_inner()
            .map(|param| -> Result<Parameter, StubError> {
                let mut parts = self.children(param, Rule::param)?;
                let name = self.expect(&mut parts, Rule::name)?.as_str();
                let type_text = self.expect(&mut parts, Rule::type_text)?.as_str();
                Ok(Parameter::new(name, type_text, optional_value(&mut parts)))
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Tree access
    // ------------------------------------------------------------------------

    /// Children of `pair`, after checking it is a `rule` node.
    fn children<'i>(&self, pair: Pair<'i, Rule>, rule: Rule) -> Result<Pairs<'i, Rule>, StubError> {
        if pair.as_rule() != rule {
            return Err(self.unexpected(pair.as_rule(), describe(rule), span_of(&pair)));
        }
        Ok(pair.into_inner())
    }

    /// Next child, which must be a `rule` node.
    fn expect<'i>(&self, inner: &mut Pairs<'i, Rule>, rule: Rule) -> Result<Pair<'i, Rule>, StubError> {
        match inner.next() {
            Some(pair) if pair.as_rule() == rule => Ok(pair),
            Some(pair) => Err(self.unexpected(pair.as_rule(), describe(rule), span_of(&pair))),
            None => Err(err_ctx!(
                Internal,
                format!("parse tree ended before {}", describe(rule)),
                &self.source,
                Span::default()
            )),
        }
    }

    fn unexpected(&self, found: Rule, wanted: &str, span: Span) -> StubError {
        err_ctx!(
            Internal,
            format!("parse tree has {:?} where {} belongs", found, wanted),
            &self.source,
            span
        )
    }
}

fn optional_value(inner: &mut Pairs<'_, Rule>) -> String {
    match inner.peek() {
        Some(pair) if pair.as_rule() == Rule::value => {
            inner.next();
            pair.as_str().to_string()
        }
        _ => String::new(),
    }
}

fn span_of(pair: &Pair<'_, Rule>) -> Span {
    let span = pair.as_span();
    Span::new(span.start(), span.end())
}
