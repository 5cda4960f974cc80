//! Integrationstests fuer Text- und JSON-Baum ueber getrackte Dokumente.

use yangtrack::format::{render_json_tree, render_tree};
use yangtrack::qname::QName;
use yangtrack::schema::{ActionDefinition, IntegerKind, Module, SchemaContext, SchemaNode, TypeDefinition};
use yangtrack::tree::SchemaTree;
use yangtrack::writer::EventRecorder;
use yangtrack::{ErrorCategory, TrackingParser, TreeOptions};

include!("common/fixture.rs");

fn track(ctx: &SchemaContext, docs: &[&str]) -> SchemaTree {
    let mut tree = SchemaTree::root();
    for doc in docs {
        TrackingParser::new(ctx)
            .parse_str(doc, &mut EventRecorder::new(), &mut tree)
            .unwrap();
    }
    tree
}

#[test]
fn interfaces_tree_hides_foreign_children() {
    let ctx = fixture_context();
    let tree = track(&ctx, &[INTERFACES_DOC, STATISTICS_DOC]);
    let text = render_tree(&ctx, &tree, "ietf-interfaces", &TreeOptions::default()).unwrap();
    let expected = [
        "module: ietf-interfaces",
        "  +--rw interfaces",
        "     +--rw interface* [name]",
        "        +--rw name           string",
        "        +--rw type           identityref",
        "        +--rw enabled?       boolean",
        "        +--rw description?   string",
        "        +--ro statistics",
        "           +--ro in-octets?   uint64",
    ];
    assert_eq!(text, expected.join("\n") + "\n");
}

#[test]
fn augment_groups_per_target() {
    let ctx = fixture_context();
    let tree = track(&ctx, &[INTERFACES_DOC]);
    let text = render_tree(&ctx, &tree, "ietf-ip", &TreeOptions::default()).unwrap();
    let expected = [
        "module: ietf-ip",
        "augment /if:interfaces/if:interface:",
        "  +--rw ipv4!",
        "     +--rw mtu?            uint16",
        "     +--rw address* [ip]",
        "        +--rw ip         string",
        "        +--rw (subnet)",
        "           +--rw :(prefix-length)",
        "              +--rw prefix-length?   uint8",
    ];
    assert_eq!(text, expected.join("\n") + "\n");

    let opts = TreeOptions::default().with_module_name_prefixes(true).with_depth(1);
    let text = render_tree(&ctx, &tree, "ietf-ip", &opts).unwrap();
    assert_eq!(
        text,
        "module: ietf-ip\naugment /ietf-interfaces:interfaces/ietf-interfaces:interface:\n  +--rw ipv4!\n"
    );
}

#[test]
fn untouched_module_prints_header_only() {
    let ctx = fixture_context();
    let tree = track(&ctx, &[INTERFACES_DOC]);
    let text = render_tree(&ctx, &tree, "example-system", &TreeOptions::default()).unwrap();
    assert_eq!(text, "module: example-system\n");

    let err = render_tree(&ctx, &tree, "no-such-module", &TreeOptions::default()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Model);
}

#[test]
fn actions_render_with_input() {
    let ns = "urn:tiny";
    let q = |local: &str| QName::new(ns, local);
    let ctx = SchemaContext::builder()
        .module(Module::new("tiny", "t", ns))
        .node(
            SchemaNode::list(q("box"), [q("id")])
                .with_child(SchemaNode::leaf(q("id"), TypeDefinition::Integer(IntegerKind::Int32)))
                .with_action(
                    ActionDefinition::new(q("shake")).with_input(SchemaNode::leaf(q("times"), TypeDefinition::Integer(IntegerKind::Uint8))),
                ),
        )
        .build()
        .unwrap();
    let tree = track(&ctx, &[r#"<d><box xmlns="urn:tiny"><id>1</id><shake><times>2</times></shake></box></d>"#]);
    let text = render_tree(&ctx, &tree, "tiny", &TreeOptions::default()).unwrap();
    let expected = [
        "module: tiny",
        "  +--rw box* [id]",
        "     +--rw id      int32",
        "     +---x shake",
        "        +---w input",
        "           +---w times?   uint8",
    ];
    assert_eq!(text, expected.join("\n") + "\n");
}

#[test]
fn json_tree_for_augmenting_module() {
    let ctx = fixture_context();
    let tree = track(&ctx, &[INTERFACES_DOC]);
    let json = render_json_tree(&ctx, &tree, "ietf-ip").unwrap();

    assert_eq!(json["module"]["name"], "ietf-ip");
    assert_eq!(json["module"]["revision"], "2018-02-22");
    assert_eq!(json["module"]["prefix"], "ip");
    assert!(json.get("children").is_none());

    let augment = &json["augments"][0];
    assert_eq!(augment["class"], "augmentation");
    assert_eq!(augment["path"], "/if:interfaces/if:interface/");
    assert_eq!(augment["config"], true);

    let ipv4 = &augment["children"][0];
    assert_eq!(ipv4["name"], "ipv4");
    assert_eq!(ipv4["class"], "container");
    assert_eq!(ipv4["path"], "/if:interfaces/if:interface/ip:ipv4/");
    let names: Vec<&str> = ipv4["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["mtu", "address"]);
    assert_eq!(ipv4["children"][0]["type_info"]["type"], "uint16");
}

#[test]
fn json_tree_metadata_and_types() {
    let ctx = fixture_context();
    let tree = track(&ctx, &[INTERFACES_DOC, STATISTICS_DOC, SYSTEM_DOC]);

    let json = render_json_tree(&ctx, &tree, "ietf-interfaces").unwrap();
    assert_eq!(json["module"]["contact"], "WG List: <mailto:netmod@ietf.org>");
    let interface = &json["children"][0]["children"][0];
    assert_eq!(interface["class"], "list");
    let children = interface["children"].as_array().unwrap();
    assert!(children.iter().all(|c| c["name"] != "ipv4"));
    let ty = children.iter().find(|c| c["name"] == "type").unwrap();
    assert_eq!(ty["type_info"]["type"], "identityref");
    assert_eq!(ty["type_info"]["base"][0], "interface-type");
    let statistics = children.iter().find(|c| c["name"] == "statistics").unwrap();
    assert_eq!(statistics["config"], false);
    assert_eq!(statistics["children"][0]["config"], false);

    let json = render_json_tree(&ctx, &tree, "example-system").unwrap();
    assert_eq!(json["module"]["revision"], "1970-01-01");
    let system = &json["children"][0];
    let classes: Vec<&str> = system["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["class"].as_str().unwrap())
        .collect();
    assert_eq!(classes, ["leaf", "leaf-list", "leaf", "leaf", "leaf", "leaf", "anyxml"]);
}
