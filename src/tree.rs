//! Pruned schema tree of the positions exercised by sample documents.
//!
//! Jeder Knoten steht fuer genau eine Schema-Position (identifiziert ueber
//! ihren [`CompactPath`]). Kinder werden beim ersten Auftreten angelegt und
//! danach wiederverwendet; Einfuegereihenfolge bleibt fuer die Ausgabe
//! erhalten.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use log::debug;

use crate::FastIndexMap;
use crate::path::{AbsolutePath, CompactPath};
use crate::qname::QName;
use crate::schema::{ActionDefinition, NotificationDefinition, SchemaNode};

/// What a tree node stands for.
#[derive(Debug, Clone)]
pub enum TreeContent {
    /// Sentinel am Baumanfang.
    Root,
    Data(Rc<SchemaNode>),
    Action(Rc<ActionDefinition>),
    Notification(Rc<NotificationDefinition>),
}

/// One observed schema position.
#[derive(Clone)]
pub struct SchemaTree {
    path: CompactPath,
    content: TreeContent,
    is_root: bool,
    is_augmenting: bool,
    children: FastIndexMap<CompactPath, SchemaTree>,
}

impl SchemaTree {
    /// Creates the sentinel root of a tracking run.
    pub fn root() -> Self {
        Self::new(CompactPath::of(QName::new("root", "root")), TreeContent::Root, false, false)
    }

    /// Erstellt einen Knoten ohne Kinder (z.B. als Startpunkt fuer einen
    /// Parser mit eigenem Elternknoten).
    pub fn new(path: CompactPath, content: TreeContent, is_root: bool, is_augmenting: bool) -> Self {
        Self {
            path,
            content,
            is_root,
            is_augmenting,
            children: FastIndexMap::default(),
        }
    }

    /// Insert-or-find for a data position.
    pub fn add_child(&mut self, schema: Rc<SchemaNode>, is_root: bool, is_augmenting: bool, path: CompactPath) -> &mut SchemaTree {
        self.insert(Self::new(path, TreeContent::Data(schema), is_root, is_augmenting))
    }

    /// Insert-or-find for an action position.
    pub fn add_action_child(
        &mut self,
        action: Rc<ActionDefinition>,
        is_root: bool,
        is_augmenting: bool,
        path: CompactPath,
    ) -> &mut SchemaTree {
        self.insert(Self::new(path, TreeContent::Action(action), is_root, is_augmenting))
    }

    /// First write wins: an existing node with the same path is returned
    /// unchanged, whatever the new node carries.
    fn insert(&mut self, node: SchemaTree) -> &mut SchemaTree {
        let entry = self.children.entry(node.path.clone());
        let existing = match entry {
            indexmap::map::Entry::Occupied(occupied) => occupied.into_mut(),
            indexmap::map::Entry::Vacant(vacant) => return vacant.insert(node),
        };
        log_conflict(existing, &node);
        existing
    }

    /// Faltet einen anderen Baum (gleicher Startpunkt) in diesen ein.
    ///
    /// Positionen die hier schon existieren behalten ihre Flags; neue werden
    /// in der Reihenfolge von `other` angehaengt.
    pub fn merge(&mut self, other: SchemaTree) {
        for (path, child) in other.children {
            match self.children.entry(path) {
                indexmap::map::Entry::Occupied(occupied) => {
                    let existing = occupied.into_mut();
                    log_conflict(existing, &child);
                    existing.merge(child);
                }
                indexmap::map::Entry::Vacant(vacant) => {
                    vacant.insert(child);
                }
            }
        }
    }

    /// All children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &SchemaTree> {
        self.children.values()
    }

    /// Children with a schema-node reference.
    pub fn data_children(&self) -> impl Iterator<Item = &SchemaTree> {
        self.children().filter(|c| c.schema_node().is_some())
    }

    /// Children representing actions.
    pub fn action_children(&self) -> impl Iterator<Item = &SchemaTree> {
        self.children().filter(|c| c.action_node().is_some())
    }

    pub fn child(&self, qname: &QName) -> Option<&SchemaTree> {
        self.children().find(|c| c.qname() == qname)
    }

    /// Sucht ueber eine Folge von Namen relativ zu diesem Knoten.
    pub fn find(&self, names: &[QName]) -> Option<&SchemaTree> {
        names.iter().try_fold(self, |node, qname| node.child(qname))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn qname(&self) -> &QName {
        self.path.qname()
    }

    pub fn path(&self) -> &CompactPath {
        &self.path
    }

    pub fn absolute_path(&self) -> AbsolutePath {
        self.path.to_absolute()
    }

    pub fn content(&self) -> &TreeContent {
        &self.content
    }

    pub fn is_root_node(&self) -> bool {
        self.is_root
    }

    pub fn is_augmenting(&self) -> bool {
        self.is_augmenting
    }

    pub fn schema_node(&self) -> Option<&Rc<SchemaNode>> {
        match &self.content {
            TreeContent::Data(node) => Some(node),
            TreeContent::Root | TreeContent::Action(_) | TreeContent::Notification(_) => None,
        }
    }

    pub fn action_node(&self) -> Option<&Rc<ActionDefinition>> {
        match &self.content {
            TreeContent::Action(action) => Some(action),
            TreeContent::Root | TreeContent::Data(_) | TreeContent::Notification(_) => None,
        }
    }

    pub fn notification_node(&self) -> Option<&Rc<NotificationDefinition>> {
        match &self.content {
            TreeContent::Notification(notification) => Some(notification),
            _ => None,
        }
    }

    /// Absolute Pfade aller Nachfahren (ohne diesen Knoten).
    pub fn absolute_paths(&self) -> BTreeSet<AbsolutePath> {
        let mut paths = BTreeSet::new();
        let mut pending: Vec<&SchemaTree> = self.children().collect();
        while let Some(node) = pending.pop() {
            paths.insert(node.absolute_path());
            pending.extend(node.children());
        }
        paths
    }

    /// Alle Nachfahren in Tiefensuche, Einfuegereihenfolge.
    pub fn descendants(&self) -> Vec<&SchemaTree> {
        let mut out = Vec::new();
        let mut pending: Vec<&SchemaTree> = self.children().collect();
        pending.reverse();
        while let Some(node) = pending.pop() {
            out.push(node);
            pending.extend(node.children().collect::<Vec<_>>().into_iter().rev());
        }
        out
    }
}

fn log_conflict(existing: &SchemaTree, incoming: &SchemaTree) {
    let same_content = match (&existing.content, &incoming.content) {
        (TreeContent::Root, TreeContent::Root) => true,
        (TreeContent::Data(a), TreeContent::Data(b)) => Rc::ptr_eq(a, b) || a.qname() == b.qname(),
        (TreeContent::Action(a), TreeContent::Action(b)) => Rc::ptr_eq(a, b) || a.qname() == b.qname(),
        (TreeContent::Notification(a), TreeContent::Notification(b)) => Rc::ptr_eq(a, b),
        _ => false,
    };
    if !same_content || existing.is_root != incoming.is_root || existing.is_augmenting != incoming.is_augmenting {
        debug!(
            "schema tree keeps first node at {} (root={}, augmenting={}), ignoring root={}, augmenting={}",
            existing.path, existing.is_root, existing.is_augmenting, incoming.is_root, incoming.is_augmenting
        );
    }
}

impl PartialEq for SchemaTree {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for SchemaTree {}

impl Hash for SchemaTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Debug for SchemaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaTree")
            .field("path", &self.path)
            .field("is_root", &self.is_root)
            .field("is_augmenting", &self.is_augmenting)
            .field("children", &self.children.len())
            .finish()
    }
}
