//! Lookup of the schema nodes an instance element maps to.

use std::collections::VecDeque;
use std::rc::Rc;

use super::{SchemaNode, SchemaNodeKind};

/// Maps an element below a schema node onto the descent of schema nodes
/// reaching it.
pub trait SchemaNodeResolver {
    /// Knoten vom Elternknoten (exklusiv) bis zum Ziel (inklusiv).
    /// Leer wenn kein Kind passt.
    fn find_child_nodes(&self, parent: &SchemaNode, local_name: &str, namespace: &str) -> VecDeque<Rc<SchemaNode>>;
}

/// Default resolver: direct children first, then the cases of each choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaResolver;

impl SchemaNodeResolver for SchemaResolver {
    fn find_child_nodes(&self, parent: &SchemaNode, local_name: &str, namespace: &str) -> VecDeque<Rc<SchemaNode>> {
        let mut descent = VecDeque::new();
        if matches!(parent.kind(), SchemaNodeKind::Choice { .. }) {
            // Choice als Elternknoten: direkt in die Cases absteigen
            if let Some(found) = search_cases(parent, local_name, namespace) {
                return found;
            }
            return descent;
        }
        if let Some(child) = direct_child(parent, local_name, namespace) {
            descent.push_back(Rc::clone(child));
            return descent;
        }
        for choice in parent
            .children()
            .iter()
            .filter(|c| matches!(c.kind(), SchemaNodeKind::Choice { .. }))
        {
            if let Some(mut found) = search_cases(choice, local_name, namespace) {
                found.push_front(Rc::clone(choice));
                return found;
            }
        }
        descent
    }
}

fn direct_child<'a>(parent: &'a SchemaNode, local_name: &str, namespace: &str) -> Option<&'a Rc<SchemaNode>> {
    parent.children().iter().find(|c| {
        !matches!(c.kind(), SchemaNodeKind::Choice { .. } | SchemaNodeKind::Case { .. })
            && c.qname().local_name() == local_name
            && c.qname().namespace() == namespace
    })
}

/// `[case, (choice, case)*, target]` unterhalb einer Choice.
fn search_cases(choice: &SchemaNode, local_name: &str, namespace: &str) -> Option<VecDeque<Rc<SchemaNode>>> {
    for case in choice.children() {
        if let Some(target) = direct_child(case, local_name, namespace) {
            return Some(VecDeque::from([Rc::clone(case), Rc::clone(target)]));
        }
        for nested in case
            .children()
            .iter()
            .filter(|c| matches!(c.kind(), SchemaNodeKind::Choice { .. }))
        {
            if let Some(mut found) = search_cases(nested, local_name, namespace) {
                found.push_front(Rc::clone(nested));
                found.push_front(Rc::clone(case));
                return Some(found);
            }
        }
    }
    None
}
