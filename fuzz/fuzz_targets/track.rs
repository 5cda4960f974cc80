#![no_main]
use libfuzzer_sys::fuzz_target;
use yangtrack::qname::QName;
use yangtrack::schema::{Module, SchemaContext, SchemaNode, TypeDefinition};
use yangtrack::{EventRecorder, SchemaTree, TrackingOptions, TrackingParser};

fn context() -> Option<SchemaContext> {
    let ns = "urn:fuzz";
    let q = |local: &str| QName::new(ns, local);
    SchemaContext::builder()
        .module(Module::new("fuzz", "f", ns))
        .node(
            SchemaNode::container(q("top"))
                .with_child(SchemaNode::leaf(q("name"), TypeDefinition::String))
                .with_child(SchemaNode::leaf_list(q("tag"), TypeDefinition::Boolean))
                .with_child(
                    SchemaNode::list(q("entry"), [q("key")])
                        .with_child(SchemaNode::leaf(q("key"), TypeDefinition::String))
                        .with_child(SchemaNode::anyxml(q("blob"))),
                ),
        )
        .build()
        .ok()
}

fuzz_target!(|data: &[u8]| {
    let Some(ctx) = context() else { return };
    let mut tree = SchemaTree::root();
    let before = tree.absolute_paths();
    let mut events = EventRecorder::new();
    let result = TrackingParser::new(&ctx)
        .with_options(TrackingOptions::lenient())
        .parse(data, &mut events, &mut tree);
    if result.is_err() {
        assert!(events.events().is_empty());
        assert_eq!(tree.absolute_paths(), before);
    } else {
        assert_eq!(events.open_nodes(), 0);
    }
});
