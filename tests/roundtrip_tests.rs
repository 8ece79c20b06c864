// tests/roundtrip_tests.rs
//
// Render/parse properties over hand-built and fixture documents.

use thriftstub::model::{Constant, Enum, FromImport, ImportedModule, Method, Parameter, Record, Service};
use thriftstub::{compose, parse, Document};

fn sample_document() -> Document {
    let mut doc = Document::new();
    doc.add_import("typing", ImportedModule::new("List"));
    doc.add_import("typing", ImportedModule::aliased("Dict", "D"));
    doc.constants.push(Constant::new("LIMIT", "10"));
    doc.enums.push(
        Enum::new("Level")
            .with_member("LOW", "1")
            .with_member("HIGH", "2"),
    );
    doc.records.push(
        Record::new("Point")
            .with_member("x", "int", "0")
            .with_member("y", "int", "0"),
    );
    doc.error_types.push(Record::new("Failure").with_member("reason", "str", "None"));
    doc.error_types.push(Record::new("Empty"));
    doc.services.push(
        Service::new("Geometry")
            .with_method(
                Method::new("distance", "float")
                    .with_param(Parameter::new("a", "Point", "None"))
                    .with_param(Parameter::new("b", "Point", "None")),
            )
            .with_method(Method::new("reset", "None")),
    );
    doc
}

#[test]
fn test_round_trip_without_unions() {
    let doc = sample_document();
    assert_eq!(parse(&compose(&doc)).unwrap(), doc);
}

#[test]
fn test_round_trip_of_empty_document() {
    let doc = Document::new();
    assert_eq!(compose(&doc), "# coding:utf-8\n");
    assert_eq!(parse(&compose(&doc)).unwrap(), doc);
}

#[test]
fn test_rendering_is_idempotent() {
    let mut doc = sample_document();
    doc.unions.push(Record::new("Choice").with_member("left", "int", "None"));

    let once = compose(&doc);
    let twice = compose(&parse(&once).unwrap());
    assert_eq!(once, twice);
}

#[test]
fn test_unions_reparse_as_structs() {
    let mut doc = Document::new();
    doc.unions.push(Record::new("Choice").with_member("left", "int", "None"));

    let reparsed = parse(&compose(&doc)).unwrap();
    assert!(reparsed.unions.is_empty());
    assert_eq!(reparsed.records, doc.unions);
}

#[test]
fn test_canonical_fixture_is_stable() {
    let text = include_str!("fixtures/canonical.pyi");
    assert_eq!(compose(&parse(text).unwrap()), text);
}

#[test]
fn test_noncanonical_fixture_normalizes() {
    let text = include_str!("fixtures/noncanonical.pyi");
    let expected = concat!(
        "# coding:utf-8\n",
        "from typing import List\n",
        "\n",
        "VERSION = '1.0.0'\n",
        "\n",
        "# noinspection PyPep8Naming, PyShadowingNames\n",
        "class Status(Enum):\n",
        "    ACTIVE = 1\n",
        "\n",
        "# noinspection PyPep8Naming, PyShadowingNames\n",
        "class UserService(object):\n",
        "    def get(self, id: int = None) -> int:\n",
        "        ...\n",
    );
    assert_eq!(compose(&parse(text).unwrap()), expected);
}

#[test]
fn test_empty_sections_leave_no_trace() {
    let mut doc = Document::new();
    doc.constants.push(Constant::new("A", "1"));
    let text = compose(&doc);
    assert_eq!(text, "# coding:utf-8\nA = 1\n");
    assert!(!text.contains("from "));
}

#[test]
fn test_module_order_is_preserved() {
    let text = "# coding:utf-8\nfrom pkg import b, a\n";
    let doc = parse(text).unwrap();
    assert_eq!(
        doc.imports["pkg"],
        FromImport {
            package: "pkg".into(),
            modules: vec![ImportedModule::new("b"), ImportedModule::new("a")],
        }
    );
    assert_eq!(compose(&doc), text);
}

#[test]
fn test_duplicate_method_renders_once() {
    let doc = parse(include_str!("fixtures/duplicate.pyi")).unwrap();
    let text = compose(&doc);
    assert_eq!(text.matches("def add(").count(), 1);
    assert!(text.contains("    def add(self, a: float = 0, b: float = 0) -> float:\n"));
}

#[test]
fn test_color_enum_scenario() {
    let text = concat!(
        "# coding:utf-8\n",
        "from enum import Enum, Enum as E2\n",
        "\n",
        "# noinspection PyPep8Naming, PyShadowingNames\n",
        "class Color(Enum):\n",
        "    RED = 1\n",
        "    BLUE = 2\n",
    );
    let doc = parse(text).unwrap();

    assert_eq!(doc.imports.len(), 1);
    assert_eq!(
        doc.imports["enum"].modules,
        vec![ImportedModule::new("Enum"), ImportedModule::aliased("Enum", "E2")]
    );
    assert_eq!(
        doc.enums,
        vec![Enum::new("Color").with_member("RED", "1").with_member("BLUE", "2")]
    );
    assert_eq!(compose(&doc), text);
}

#[test]
fn test_parse_and_compose_across_threads() {
    let text = include_str!("fixtures/canonical.pyi");
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compose(&parse(text).unwrap())))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), text);
        }
    });
}
