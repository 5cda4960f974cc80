//! Renderers that walk a finished [`SchemaTree`].
//!
//! Beide Renderer arbeiten pro Modul: zuerst die beruehrten Root-Knoten des
//! Moduls, danach dessen Augmentationen gruppiert nach Zielpfad. Rpcs und
//! Notifications des Moduls kommen vollstaendig aus dem Modell.

use std::rc::Rc;

use crate::FastIndexMap;
use crate::path::CompactPath;
use crate::qname::QName;
use crate::schema::{ActionDefinition, Module, NotificationDefinition, SchemaContext, SchemaNode, TypeDefinition};
use crate::tree::{SchemaTree, TreeContent};
use crate::{Error, Result};

pub mod json_tree;
pub mod tree;

pub use json_tree::render_json_tree;
pub use tree::render_tree;

/// Namespace der eingebauten YANG-Typen.
const BUILTIN_TYPE_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:1";

pub(crate) fn find_module<'c>(context: &'c SchemaContext, name: &str) -> Result<&'c Module> {
    context.find_module(name).ok_or_else(|| Error::not_found("Module", name))
}

/// Touched top-level data positions defined by `module` itself.
/// Aufgerufene rpcs erscheinen stattdessen in [`module_rpcs`].
pub(crate) fn module_roots<'t>(tree: &'t SchemaTree, module: &Module) -> Vec<&'t SchemaTree> {
    tree.data_children()
        .filter(|node| node.qname().namespace() == &*module.namespace && !node.is_augmenting())
        .collect()
}

/// Augmenting positions of `module`, grouped by the absolute path of the
/// augmented node in first-seen order.
pub(crate) fn augment_groups<'t>(tree: &'t SchemaTree, module: &Module) -> FastIndexMap<Vec<QName>, Vec<&'t SchemaTree>> {
    let mut groups: FastIndexMap<Vec<QName>, Vec<&SchemaTree>> = FastIndexMap::default();
    for node in tree.descendants() {
        if !node.is_augmenting() || node.qname().namespace() != &*module.namespace {
            continue;
        }
        let target = node.absolute_path().parent_segments().to_vec();
        groups.entry(target).or_default().push(node);
    }
    groups
}

/// Rpcs of `module`, each expanded from the model into a standalone tree.
/// `with_empty_io` behaelt leere `input`/`output` Container.
pub(crate) fn module_rpcs(context: &SchemaContext, module: &Module, with_empty_io: bool) -> Vec<SchemaTree> {
    context
        .rpcs()
        .iter()
        .filter(|rpc| rpc.qname().namespace() == &*module.namespace)
        .map(|rpc| {
            let path = CompactPath::of(rpc.qname().clone());
            let mut node = SchemaTree::new(path, TreeContent::Action(Rc::clone(rpc)), true, false);
            expand_io(&mut node, rpc, with_empty_io);
            node
        })
        .collect()
}

/// Notifications of `module`, expanded like [`module_rpcs`].
pub(crate) fn module_notifications(context: &SchemaContext, module: &Module) -> Vec<SchemaTree> {
    context
        .notifications()
        .iter()
        .filter(|notification| notification.qname().namespace() == &*module.namespace)
        .map(notification_tree)
        .collect()
}

fn notification_tree(notification: &Rc<NotificationDefinition>) -> SchemaTree {
    let path = CompactPath::of(notification.qname().clone());
    let mut node = SchemaTree::new(path, TreeContent::Notification(Rc::clone(notification)), true, false);
    expand(&mut node, notification.children(), &[], false);
    node
}

fn expand_io(node: &mut SchemaTree, action: &ActionDefinition, with_empty_io: bool) {
    for io in [action.input(), action.output()] {
        if io.children().is_empty() && !with_empty_io {
            continue;
        }
        let path = node.path().child(io.qname().clone());
        let io_node = node.add_child(Rc::clone(io), false, false, path);
        expand(io_node, io.children(), io.actions(), with_empty_io);
    }
}

fn expand(tree: &mut SchemaTree, children: &[Rc<SchemaNode>], actions: &[Rc<ActionDefinition>], with_empty_io: bool) {
    for child in children {
        let path = tree.path().child(child.qname().clone());
        let node = tree.add_child(Rc::clone(child), false, false, path);
        expand(node, child.children(), child.actions(), with_empty_io);
    }
    for action in actions {
        let path = tree.path().child(action.qname().clone());
        let node = tree.add_action_child(Rc::clone(action), false, false, path);
        expand_io(node, action, with_empty_io);
    }
}

/// Type name as printed in trees: built-in types bare, typedefs prefixed
/// with their module's prefix, leafrefs as `-> path`.
pub(crate) fn type_label(context: &SchemaContext, ty: &TypeDefinition) -> String {
    match ty {
        TypeDefinition::LeafRef { path, .. } => format!("-> {path}"),
        TypeDefinition::Derived { name, .. } if name.namespace() != BUILTIN_TYPE_NAMESPACE => {
            match context.find_module_by_namespace(name.namespace()) {
                Some(module) => format!("{}:{}", module.prefix, name.local_name()),
                None => name.local_name().to_owned(),
            }
        }
        other => other.builtin_name().to_owned(),
    }
}
