//! Canonical text rendering of a [`Document`].
//!
//! Rendering is the structural inverse of building: every section maps to a
//! single emission rule, empty sections are skipped together with their
//! separating blank line, and the result is right-trimmed to end in exactly
//! one newline.

use tracing::debug;

use crate::model::{Document, FromImport, ImportedModule, Method, Parameter, Record, RecordKind, Service};
use crate::syntax::literal::{BODY, CLASS_PREFIX, CONTINUATION, HEADER, INDENT, INIT_CLOSE, INIT_OPEN};

/// Render `document` as canonical stub text. Total for any document.
pub fn compose(document: &Document) -> String {
    let mut out = String::new();
    push_line(&mut out, HEADER);

    // A package with no modules has no valid import line.
    let imports: Vec<_> = document
        .imports
        .iter()
        .filter(|(_, from_import)| !from_import.modules.is_empty())
        .collect();
    if !imports.is_empty() {
        for (package, from_import) in imports {
            push_line(&mut out, &import_line(package, from_import));
        }
        out.push('\n');
    }

    if !document.constants.is_empty() {
        for constant in &document.constants {
            push_line(&mut out, &format!("{} = {}", constant.name, constant.value));
        }
        out.push('\n');
    }

    for parsed in &document.enums {
        push_class_line(&mut out, &parsed.name, "Enum");
        for member in &parsed.members {
            push_line(&mut out, &format!("{INDENT}{} = {}", member.key, member.value));
        }
        out.push('\n');
    }

    for (kind, record) in document.record_like() {
        push_record(&mut out, kind, record);
    }

    for service in &document.services {
        push_service(&mut out, service);
    }

    let mut text = out.trim_end().to_string();
    text.push('\n');
    debug!(bytes = text.len(), "composed stub text");
    text
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn push_class_line(out: &mut String, name: &str, base: &str) {
    push_line(out, CLASS_PREFIX);
    push_line(out, &format!("class {}({}):", name, base));
}

fn import_line(package: &str, from_import: &FromImport) -> String {
    let modules: Vec<String> = from_import.modules.iter().map(module_text).collect();
    format!("from {} import {}", package, modules.join(", "))
}

fn module_text(module: &ImportedModule) -> String {
    match module.alias.as_deref() {
        Some(alias) if !alias.is_empty() => format!("{} as {}", module.name, alias),
        _ => module.name.clone(),
    }
}

fn param_text(param: &Parameter) -> String {
    format!("{}: {} = {}", param.name(), param.type_text(), param.default)
}

fn push_record(out: &mut String, kind: RecordKind, record: &Record) {
    push_class_line(out, &record.name, kind.base_marker());
    for (name, field) in &record.fields {
        push_line(out, &format!("{INDENT}{}: {}", name, field.type_text));
    }
    out.push('\n');
    push_line(out, INIT_OPEN);

    if record.init.is_empty() {
        out.push_str(CONTINUATION);
    } else {
        let params: Vec<String> = record
            .init
            .iter()
            .map(|p| format!("{CONTINUATION}{}", param_text(p)))
            .collect();
        out.push_str(&params.join(",\n"));
    }
    push_line(out, INIT_CLOSE);
    push_line(out, BODY);
    out.push('\n');
}

fn push_service(out: &mut String, service: &Service) {
    push_class_line(out, &service.name, "object");
    for (name, method) in &service.methods {
        push_line(out, &method_line(name, method));
        push_line(out, BODY);
        out.push('\n');
    }
    out.push('\n');
}

fn method_line(name: &str, method: &Method) -> String {
    let params: Vec<String> = method.params.iter().map(param_text).collect();
    format!(
        "{INDENT}def {}(self, {}) -> {}:",
        name,
        params.join(", "),
        method.returns
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constant, Enum};

    #[test]
    fn test_empty_document_is_header_only() {
        assert_eq!(compose(&Document::new()), "# coding:utf-8\n");
    }

    #[test]
    fn test_constants_section() {
        let mut doc = Document::new();
        doc.constants.push(Constant::new("A", "1"));
        doc.constants.push(Constant::new("B", "'b'"));
        assert_eq!(compose(&doc), "# coding:utf-8\nA = 1\nB = 'b'\n");
    }

    #[test]
    fn test_enum_block() {
        let mut doc = Document::new();
        doc.enums.push(Enum::new("Color").with_member("RED", "1"));
        assert_eq!(
            compose(&doc),
            "# coding:utf-8\n\
             # noinspection PyPep8Naming, PyShadowingNames\n\
             class Color(Enum):\n    RED = 1\n"
        );
    }

    #[test]
    fn test_record_with_params() {
        let mut doc = Document::new();
        doc.records.push(
            Record::new("User")
                .with_member("id", "int", "None")
                .with_member("name", "str", "None"),
        );
        let expected = concat!(
            "# coding:utf-8\n",
            "# noinspection PyPep8Naming, PyShadowingNames\n",
            "class User(object):\n",
            "    id: int\n",
            "    name: str\n",
            "\n",
            "    def __init__(self,\n",
            "                 id: int = None,\n",
            "                 name: str = None) -> None:\n",
            "        ...\n",
        );
        assert_eq!(compose(&doc), expected);
    }

    #[test]
    fn test_empty_exception_closes_on_continuation_line() {
        let mut doc = Document::new();
        doc.error_types.push(Record::new("Oops"));
        let expected = concat!(
            "# coding:utf-8\n",
            "# noinspection PyPep8Naming, PyShadowingNames\n",
            "class Oops(TException):\n",
            "\n",
            "    def __init__(self,\n",
            "                 ) -> None:\n",
            "        ...\n",
        );
        assert_eq!(compose(&doc), expected);
    }

    #[test]
    fn test_service_methods() {
        let mut doc = Document::new();
        doc.services.push(
            Service::new("Calc")
                .with_method(
                    Method::new("add", "int")
                        .with_param(Parameter::new("a", "int", "0"))
                        .with_param(Parameter::new("b", "int", "0")),
                )
                .with_method(Method::new("ping", "None")),
        );
        let expected = concat!(
            "# coding:utf-8\n",
            "# noinspection PyPep8Naming, PyShadowingNames\n",
            "class Calc(object):\n",
            "    def add(self, a: int = 0, b: int = 0) -> int:\n",
            "        ...\n",
            "\n",
            "    def ping(self, ) -> None:\n",
            "        ...\n",
        );
        assert_eq!(compose(&doc), expected);
    }

    #[test]
    fn test_package_without_modules_is_skipped() {
        let mut doc = Document::new();
        doc.imports.insert("empty".into(), FromImport::new("empty"));
        assert_eq!(compose(&doc), "# coding:utf-8\n");

        doc.add_import("typing", ImportedModule::new("List"));
        assert_eq!(compose(&doc), "# coding:utf-8\nfrom typing import List\n");
    }

    #[test]
    fn test_blank_alias_renders_bare_module() {
        let module = ImportedModule::aliased("X", "");
        assert_eq!(module_text(&module), "X");
    }
}
