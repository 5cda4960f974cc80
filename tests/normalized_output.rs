//! Integrationstests fuer den normalisierten Datenstrom: EventRecorder und
//! XmlNodeWriter (Ausgabe wird mit roxmltree gegengeprueft).

use std::rc::Rc;

use yangtrack::qname::QName;
use yangtrack::schema::{ActionDefinition, IntegerKind, Module, SchemaContext, SchemaNode, TypeDefinition, NETCONF_BASE_NAMESPACE};
use yangtrack::tree::SchemaTree;
use yangtrack::writer::{EventRecorder, WriteEvent, XmlNodeWriter};
use yangtrack::{TrackingParser, TypedValue};

include!("common/fixture.rs");

fn record(ctx: &SchemaContext, doc: &str) -> Vec<WriteEvent> {
    let mut events = EventRecorder::new();
    TrackingParser::new(ctx)
        .parse_str(doc, &mut events, &mut SchemaTree::root())
        .unwrap();
    events.into_events()
}

fn to_xml(ctx: &SchemaContext, doc: &str) -> String {
    let mut out = XmlNodeWriter::new(Vec::new());
    TrackingParser::new(ctx)
        .parse_str(doc, &mut out, &mut SchemaTree::root())
        .unwrap();
    String::from_utf8(out.into_inner()).unwrap()
}

fn leaf_value<'e>(events: &'e [WriteEvent], wanted: &QName) -> &'e TypedValue {
    events
        .iter()
        .find_map(|e| match e {
            WriteEvent::Leaf { name, value } if name == wanted => Some(value),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no leaf {wanted}"))
}

#[test]
fn interface_stream_shape() {
    let ctx = fixture_context();
    let events = record(&ctx, INTERFACES_DOC);

    assert_eq!(
        events[0],
        WriteEvent::StartContainer {
            name: QName::new(NETCONF_BASE_NAMESPACE, "data"),
            attributes: Vec::new(),
        }
    );
    assert_eq!(events[2], WriteEvent::StartList(ifq("interface")));
    assert_eq!(
        events[3],
        WriteEvent::StartListEntry {
            name: ifq("interface"),
            keys: vec![(ifq("name"), TypedValue::String("eth0".into()))],
        }
    );

    let ty = leaf_value(&events, &ifq("type"));
    assert_eq!(
        ty,
        &TypedValue::IdentityRef {
            identity: QName::new(IANAIFT_NS, "ethernetCsmacd"),
            prefix: Some(Rc::from("ianaift")),
        }
    );
    assert_eq!(leaf_value(&events, &ipq("mtu")), &TypedValue::Uint(1500));

    let choice = events
        .iter()
        .position(|e| e == &WriteEvent::StartChoice(ipq("subnet")))
        .unwrap();
    assert_eq!(
        events[choice + 1],
        WriteEvent::Leaf {
            name: ipq("prefix-length"),
            value: TypedValue::Uint(24),
        }
    );
    assert_eq!(events[choice + 2], WriteEvent::EndNode);
}

#[test]
fn system_values_are_canonical() {
    let ctx = fixture_context();
    let events = record(&ctx, SYSTEM_DOC);

    assert_eq!(leaf_value(&events, &sysq("hostname")), &TypedValue::String("edge-1".into()));
    assert_eq!(leaf_value(&events, &sysq("log-level")).to_lexical(), "info");
    assert_eq!(leaf_value(&events, &sysq("features")).to_lexical(), "ntp ssh");
    assert_eq!(leaf_value(&events, &sysq("load")).to_lexical(), "0.5");
    assert_eq!(leaf_value(&events, &sysq("banner")), &TypedValue::Binary(b"hello".to_vec()));

    let servers: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            WriteEvent::LeafListEntry { value, .. } => Some(value.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(servers, ["192.0.2.53", "198.51.100.53"]);

    let anyxml = events
        .iter()
        .find_map(|e| match e {
            WriteEvent::Anyxml { value, .. } => Some(value),
            _ => None,
        })
        .unwrap();
    let acme = anyxml.elements().next().unwrap();
    assert_eq!(acme.name(), &QName::new("urn:acme", "acme"));
    assert_eq!(acme.text(), "ok");
}

#[test]
fn xml_output_round_trips_through_roxmltree() {
    let ctx = fixture_context();
    let xml = to_xml(&ctx, INTERFACES_DOC);
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let root = doc.root_element();
    assert!(root.has_tag_name((NETCONF_BASE_NAMESPACE, "data")));

    let interfaces: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name((IF_NS, "interface")))
        .collect();
    assert_eq!(interfaces.len(), 2);

    let mtu = doc.descendants().find(|n| n.has_tag_name((IP_NS, "mtu"))).unwrap();
    assert_eq!(mtu.text(), Some("1500"));
    // Choice und Case sind in XML unsichtbar
    let prefix_length = doc.descendants().find(|n| n.has_tag_name((IP_NS, "prefix-length"))).unwrap();
    assert!(prefix_length.parent().unwrap().has_tag_name((IP_NS, "address")));

    let ty = doc.descendants().find(|n| n.has_tag_name((IF_NS, "type"))).unwrap();
    assert_eq!(ty.text(), Some("ianaift:ethernetCsmacd"));
    assert_eq!(ty.lookup_namespace_uri(Some("ianaift")), Some(IANAIFT_NS));
}

#[test]
fn anyxml_output_keeps_foreign_namespaces() {
    let ctx = fixture_context();
    let xml = to_xml(&ctx, SYSTEM_DOC);
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let acme = doc.descendants().find(|n| n.has_tag_name(("urn:acme", "acme"))).unwrap();
    assert_eq!(acme.attribute("level"), Some("3"));
    assert!(acme.parent().unwrap().has_tag_name((SYS_NS, "vendor-data")));
    let fan = acme.first_element_child().unwrap();
    assert!(fan.has_tag_name(("urn:acme", "fan")));
    assert_eq!(fan.attribute("speed"), Some("high"));

    let banner = doc.descendants().find(|n| n.has_tag_name((SYS_NS, "banner"))).unwrap();
    assert_eq!(banner.text(), Some("aGVsbG8="));
    let servers = doc.descendants().filter(|n| n.has_tag_name((SYS_NS, "dns-server"))).count();
    assert_eq!(servers, 2);
}

#[test]
fn action_invocation_is_written_under_action_name() {
    let ns = "urn:tiny";
    let q = |local: &str| QName::new(ns, local);
    let ctx = SchemaContext::builder()
        .module(Module::new("tiny", "t", ns))
        .node(
            SchemaNode::container(q("box")).with_action(
                ActionDefinition::new(q("shake")).with_input(SchemaNode::leaf(q("times"), TypeDefinition::Integer(IntegerKind::Uint8))),
            ),
        )
        .build()
        .unwrap();
    let xml = to_xml(&ctx, r#"<rpc><box xmlns="urn:tiny"><shake><times>3</times></shake></box></rpc>"#);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let shake = doc.descendants().find(|n| n.has_tag_name((ns, "shake"))).unwrap();
    assert_eq!(shake.first_element_child().unwrap().text(), Some("3"));
}

#[test]
fn anyxml_output_declares_prefixes_in_scope() {
    let ctx = fixture_context();
    let doc = r#"<data><system xmlns="urn:example:system" xmlns:x="urn:x">
        <vendor-data><v xmlns:y="urn:y">x:foo y:bar</v></vendor-data>
    </system></data>"#;

    let events = record(&ctx, doc);
    let vendor_data = events
        .iter()
        .find_map(|e| match e {
            WriteEvent::Anyxml { value, .. } => Some(value),
            _ => None,
        })
        .unwrap();
    assert!(vendor_data.namespaces().contains(&(Rc::from("x"), Rc::from("urn:x"))));

    let xml = to_xml(&ctx, doc);
    let out = roxmltree::Document::parse(&xml).unwrap();
    let v = out.descendants().find(|n| n.has_tag_name((SYS_NS, "v"))).unwrap();
    assert_eq!(v.text(), Some("x:foo y:bar"));
    assert_eq!(v.lookup_namespace_uri(Some("x")), Some("urn:x"));
    assert_eq!(v.lookup_namespace_uri(Some("y")), Some("urn:y"));
}

#[test]
fn string_leaf_text_is_not_trimmed() {
    let ctx = fixture_context();
    let doc = "<data><system xmlns=\"urn:example:system\"><hostname>  a &amp; b<![CDATA[ <c> ]]>\n</hostname></system></data>";
    let events = record(&ctx, doc);
    assert_eq!(leaf_value(&events, &sysq("hostname")), &TypedValue::String("  a & b <c> \n".into()));
}

#[test]
fn wrapper_element_name_is_kept() {
    let ctx = fixture_context();
    let doc = r#"<config><system xmlns="urn:example:system"><hostname>r1</hostname></system></config>"#;

    let events = record(&ctx, doc);
    assert_eq!(
        events[0],
        WriteEvent::StartContainer {
            name: QName::new("", "config"),
            attributes: Vec::new(),
        }
    );

    let xml = to_xml(&ctx, doc);
    assert!(xml.starts_with(r#"<config><system xmlns="urn:example:system">"#));
    let out = roxmltree::Document::parse(&xml).unwrap();
    assert!(out.root_element().has_tag_name("config"));
    assert_eq!(out.root_element().tag_name().namespace(), None);
}
