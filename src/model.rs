//! Typed document model for stub files.
//!
//! A [`Document`] is what the builder produces from a parse tree and what the
//! renderer consumes. Types and values are kept as opaque text; nothing here
//! interprets them.
//!
//! Every container is ordered. Iteration order is part of the render
//! contract, so keyed collections use [`IndexMap`] rather than a hash map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Imports keyed by package name, in first-declaration order.
pub type Imports = IndexMap<String, FromImport>;

/// Fields keyed by field name, in first-declaration order.
pub type Fields = IndexMap<String, Field>;

/// Service methods keyed by method name.
pub type Methods = IndexMap<String, Method>;

/// One parsed stub file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub imports: Imports,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub enums: Vec<Enum>,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub unions: Vec<Record>,
    #[serde(default)]
    pub error_types: Vec<Record>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every section is empty (renders to the header line only).
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.constants.is_empty()
            && self.enums.is_empty()
            && self.records.is_empty()
            && self.unions.is_empty()
            && self.error_types.is_empty()
            && self.services.is_empty()
    }

    /// Records the import of `module` from `package`, appending to the
    /// package entry if it already exists.
    pub fn add_import(&mut self, package: &str, module: ImportedModule) {
        self.imports
            .entry(package.to_string())
            .or_insert_with(|| FromImport::new(package))
            .modules
            .push(module);
    }

    /// Iterates the three record-like sections together with their kind.
    pub fn record_like(&self) -> impl Iterator<Item = (RecordKind, &Record)> {
        self.records
            .iter()
            .map(|r| (RecordKind::Struct, r))
            .chain(self.unions.iter().map(|r| (RecordKind::Union, r)))
            .chain(self.error_types.iter().map(|r| (RecordKind::Exception, r)))
    }
}

/// A `from <package> import ...` line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FromImport {
    pub package: String,
    pub modules: Vec<ImportedModule>,
}

impl FromImport {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            modules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportedModule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportedModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// A module-level `<name> = <value>` line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: String,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    /// Members in declaration order. Duplicate keys are kept.
    pub members: Vec<EnumMember>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.members.push(EnumMember {
            key: key.into(),
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumMember {
    pub key: String,
    pub value: String,
}

/// A `name: type` pair, used both for class fields and parameter annotations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
}

impl Field {
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
        }
    }
}

/// A `name: type = default` parameter. `default` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    pub annotation: Field,
    #[serde(default)]
    pub default: String,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        type_text: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            annotation: Field::new(name, type_text),
            default: default.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.annotation.name
    }

    pub fn type_text(&self) -> &str {
        &self.annotation.type_text
    }
}

/// The three structurally identical class categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Union,
    Exception,
}

impl RecordKind {
    /// The base marker written in the class line.
    pub const fn base_marker(self) -> &'static str {
        match self {
            RecordKind::Struct | RecordKind::Union => "object",
            RecordKind::Exception => "TException",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RecordKind::Struct => "struct",
            RecordKind::Union => "union",
            RecordKind::Exception => "exception",
        }
    }
}

/// A struct, union or exception: annotated fields plus an `__init__`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub fields: Fields,
    /// Constructor parameters; expected to mirror `fields`.
    pub init: Vec<Parameter>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a field and its matching constructor parameter.
    pub fn with_member(
        mut self,
        name: impl Into<String>,
        type_text: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        let param = Parameter::new(name, type_text, default);
        self.fields
            .insert(param.name().to_string(), param.annotation.clone());
        self.init.push(param);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub params: Vec<Parameter>,
    /// Return type text.
    pub returns: String,
}

impl Method {
    pub fn new(name: impl Into<String>, returns: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: returns.into(),
        }
    }

    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub methods: Methods,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Methods::new(),
        }
    }

    /// Inserts `method` under its name. A method with the same name is
    /// replaced and the entry moves to the end, so the surviving definition
    /// sits where it was last declared. Returns the replaced method.
    pub fn add_method(&mut self, method: Method) -> Option<Method> {
        let previous = self.methods.shift_remove(&method.name);
        self.methods.insert(method.name.clone(), method);
        previous
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.add_method(method);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_method_moves_redefinition_to_end() {
        let mut service = Service::new("Calc")
            .with_method(Method::new("add", "int"))
            .with_method(Method::new("sub", "int"));

        let replaced = service.add_method(Method::new("add", "float"));

        assert_eq!(replaced.map(|m| m.returns), Some("int".to_string()));
        let names: Vec<_> = service.methods.keys().cloned().collect();
        assert_eq!(names, vec!["sub", "add"]);
        assert_eq!(service.methods["add"].returns, "float");
    }

    #[test]
    fn add_import_groups_by_package_in_order() {
        let mut doc = Document::new();
        doc.add_import("b.pkg", ImportedModule::new("Y"));
        doc.add_import("a.pkg", ImportedModule::new("X"));
        doc.add_import("b.pkg", ImportedModule::aliased("Z", "Zed"));

        let packages: Vec<_> = doc.imports.keys().cloned().collect();
        assert_eq!(packages, vec!["b.pkg", "a.pkg"]);
        assert_eq!(doc.imports["b.pkg"].modules.len(), 2);
    }

    #[test]
    fn record_with_member_keeps_fields_and_init_aligned() {
        let record = Record::new("User")
            .with_member("id", "int", "None")
            .with_member("name", "str", "None");

        assert_eq!(record.fields.len(), record.init.len());
        for (field, param) in record.fields.values().zip(&record.init) {
            assert_eq!(field.name, param.name());
        }
    }

    #[test]
    fn empty_document_reports_empty() {
        assert!(Document::new().is_empty());
        let mut doc = Document::new();
        doc.constants.push(Constant::new("X", "1"));
        assert!(!doc.is_empty());
    }
}
