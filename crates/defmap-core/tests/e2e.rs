//! End-to-end tests for the file-based round-trip entry points.
//!
//! These tests drive the public API through temporary files, covering the
//! extract → save → load → rebuild workflow and its failure modes.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

use defmap_core::{
    DefMapError, DefinitionNode, ErrorKind, NodeKind, extract_file, extract_source,
    get_ast_as_dict, get_ast_as_json, load_ast_from_json, rebuild_from_dict_or_json,
    rebuild_from_json, save_ast_as_json,
};

const SAMPLE: &str = r#""""Inventory helpers."""

from dataclasses import dataclass, field

DEFAULT_QUANTITY = 1


@dataclass(frozen=True)
class Item:
    """A stocked item."""

    name: str
    quantity: int = DEFAULT_QUANTITY
    tags: list = field(default_factory=list)

    def total(self, price: float) -> float:
        """Price of the whole stock."""
        return self.quantity * price

    @staticmethod
    def parse(text):
        name, _, quantity = text.partition(":")
        return Item(name, int(quantity or DEFAULT_QUANTITY))


async def restock(item, amount=1):
    async def wait():
        return amount

    return Item(item.name, item.quantity + await wait())


ITEMS = [Item.parse("bolt:3")]
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write fixture file");
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace {
        dir: TempDir::new().expect("temporary directory"),
    }
}

fn child<'a>(node: &'a DefinitionNode, name: &str) -> &'a DefinitionNode {
    node.child(name)
        .unwrap_or_else(|| panic!("no child {name} under {:?}", node.name))
}

// =============================================================================
// Happy path: extraction
// =============================================================================

#[rstest]
fn extraction_from_a_file_records_path_and_structure(workspace: Workspace) {
    let source = workspace.write("inventory.py", SAMPLE);
    let module = extract_file(&source).expect("extract");

    let expected_path = source.display().to_string();
    assert_eq!(module.source_path.as_deref(), Some(expected_path.as_str()));
    assert_eq!(module.docstring.as_deref(), Some("Inventory helpers."));
    assert_eq!(
        module.raw_body,
        "from dataclasses import dataclass, field\nDEFAULT_QUANTITY = 1\nITEMS = [Item.parse(\"bolt:3\")]"
    );

    let item = child(&module, "Item");
    assert_eq!(item.kind, NodeKind::Class);
    assert_eq!(item.header, "@dataclass(frozen=True)\nclass Item:");
    assert_eq!(item.docstring.as_deref(), Some("A stocked item."));
    assert_eq!(item.anchor, Some(2));

    let parse = child(item, "parse");
    assert_eq!(parse.kind, NodeKind::Function);
    assert_eq!(parse.header, "@staticmethod\ndef parse(text):");

    let restock = child(&module, "restock");
    assert_eq!(restock.header, "async def restock(item, amount=1):");
    let wait = child(restock, "wait");
    assert_eq!(wait.kind, NodeKind::NestedFunction);
    assert_eq!(wait.header, "async def wait():");
    assert_eq!(wait.anchor, Some(0));
}

#[rstest]
fn dict_and_json_forms_agree(workspace: Workspace) {
    let source = workspace.write("inventory.py", SAMPLE);

    let mapping = get_ast_as_dict(&source).expect("mapping");
    let json = get_ast_as_json(&source).expect("json");
    let parsed: Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(parsed, mapping);
    assert_eq!(mapping["kind"], json!("module"));
    assert_eq!(mapping["body_definitions"][0]["extensibility"], json!([]));
}

#[rstest]
fn deeply_nested_definitions_keep_their_kinds(workspace: Workspace) {
    let source = workspace.write(
        "nested.py",
        concat!(
            "class L1:\n",
            "    class L2:\n",
            "        def l3(self):\n",
            "            def l4():\n",
            "                class L5:\n",
            "                    value = 5\n",
            "                return L5\n",
            "            return l4\n",
        ),
    );
    let module = extract_file(&source).expect("extract");

    let l1 = child(&module, "L1");
    let l2 = child(l1, "L2");
    let l3 = child(l2, "l3");
    let l4 = child(l3, "l4");
    let l5 = child(l4, "L5");
    let kinds = [l1.kind, l2.kind, l3.kind, l4.kind, l5.kind];
    assert_eq!(
        kinds,
        [
            NodeKind::Class,
            NodeKind::NestedClass,
            NodeKind::Function,
            NodeKind::NestedFunction,
            NodeKind::NestedClass,
        ]
    );
    assert_eq!(l5.raw_body, "value = 5");
}

#[rstest]
#[case::match_statement("match command:\n    case [\"go\", where]:\n        move(where)\n    case _:\n        pass\n")]
#[case::walrus("if (n := len(items)) > 3:\n    print(n)\n")]
#[case::type_parameters("def first[T](items: list[T]) -> T:\n    return items[0]\n")]
#[case::exception_groups("try:\n    run()\nexcept* ValueError:\n    pass\n")]
fn modern_syntax_round_trips(#[case] source: &str) {
    let first = extract_source(source).expect("extract");
    let rebuilt = rebuild_from_json(&first).expect("rebuild");
    let second = extract_source(&rebuilt).expect("re-extract");

    assert_eq!(second.without_spans(), first.without_spans());
}

#[rstest]
fn empty_files_extract_to_an_empty_module(workspace: Workspace) {
    let source = workspace.write("empty.py", "");
    let module = extract_file(&source).expect("extract");

    assert!(module.body_definitions.is_empty());
    assert_eq!(module.raw_body, "");
    assert_eq!(module.span.map(|span| span.end_line), Some(0));
    assert_eq!(rebuild_from_json(&module).expect("rebuild"), "");
}

// =============================================================================
// Happy path: save, load, rebuild
// =============================================================================

#[rstest]
fn save_load_rebuild_round_trip(workspace: Workspace) {
    let source = workspace.write("inventory.py", SAMPLE);
    let json_path = workspace.path("inventory.json");
    let output = workspace.path("rebuilt.py");

    save_ast_as_json(&source, &json_path).expect("save");
    let mapping = load_ast_from_json(&json_path).expect("load");
    let rebuilt = rebuild_from_dict_or_json(mapping, &output).expect("rebuild");

    assert_eq!(fs::read_to_string(&output).expect("read output"), rebuilt);
    let original = extract_file(&source).expect("extract original");
    let again = extract_file(&output).expect("extract rebuilt");
    assert_eq!(again.without_spans(), original.without_spans());
}

#[rstest]
fn rebuild_accepts_the_saved_text_directly(workspace: Workspace) {
    let source = workspace.write("inventory.py", SAMPLE);
    let json_path = workspace.path("inventory.json");
    save_ast_as_json(&source, &json_path).expect("save");

    let text = fs::read_to_string(&json_path).expect("read json");
    let from_text = rebuild_from_json(text).expect("rebuild from text");
    let from_mapping =
        rebuild_from_json(load_ast_from_json(&json_path).expect("load")).expect("rebuild");

    assert_eq!(from_text, from_mapping);
}

#[rstest]
fn documents_without_anchors_use_the_raw_first_fallback(workspace: Workspace) {
    let source = workspace.write(
        "ordered.py",
        "import os\n\ndef show():\n    return os.getcwd()\n\nprint(show())\n",
    );
    let mut mapping = get_ast_as_dict(&source).expect("mapping");
    if let Some(object) = mapping["body_definitions"][0].as_object_mut() {
        object.remove("anchor");
    }

    let rebuilt = rebuild_from_json(mapping).expect("rebuild");
    assert_eq!(
        rebuilt,
        "import os\nprint(show())\n\n\ndef show():\n    return os.getcwd()\n"
    );
}

// =============================================================================
// Unhappy paths
// =============================================================================

fn assert_kind(result: Result<impl std::fmt::Debug, DefMapError>, expected: ErrorKind) {
    match result {
        Ok(value) => panic!("expected {expected} error, got {value:?}"),
        Err(error) => assert_eq!(error.kind(), expected, "{error}"),
    }
}

#[rstest]
fn missing_source_files_are_io_errors(workspace: Workspace) {
    assert_kind(extract_file(workspace.path("absent.py")), ErrorKind::Io);
}

#[rstest]
fn invalid_python_is_a_parse_error(workspace: Workspace) {
    let source = workspace.write("broken.py", "def broken(:\n    pass\n");
    let result = extract_file(&source);

    match &result {
        Err(DefMapError::Parse { origin, .. }) => {
            assert!(origin.ends_with("broken.py"), "{origin}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[rstest]
fn save_does_not_write_when_extraction_fails(workspace: Workspace) {
    let source = workspace.write("broken.py", "class :\n");
    let json_path = workspace.path("broken.json");

    assert_kind(save_ast_as_json(&source, &json_path), ErrorKind::Parse);
    assert!(!json_path.exists());
}

#[rstest]
fn invalid_json_files_are_structure_errors(workspace: Workspace) {
    let json_path = workspace.write("bad.json", "invalid json");
    let result = load_ast_from_json(&json_path);

    assert!(matches!(result, Err(DefMapError::Decode(_))), "{result:?}");
    assert_kind(result, ErrorKind::Structure);
}

#[rstest]
fn unwritable_outputs_are_io_errors(workspace: Workspace) {
    let output = workspace.path("missing-dir").join("out.py");
    assert_kind(
        rebuild_from_dict_or_json(json!({"kind": "module", "raw_body": "x = 1"}), &output),
        ErrorKind::Io,
    );
}

#[rstest]
fn structure_errors_name_the_offending_node(workspace: Workspace) {
    let output = workspace.path("out.py");
    let document = json!({
        "kind": "module",
        "body_definitions": [
            {"kind": "function", "name": "ok", "header": "def ok():"},
            {"kind": "class", "name": "Broken", "header": "def Broken():"},
        ],
    });

    match rebuild_from_dict_or_json(document, &output) {
        Err(DefMapError::Structure { path, .. }) => assert_eq!(path, "$.body_definitions[1]"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!Path::new(&output).exists());
}
