//! Effective schema model consumed by the tracking parser.
//!
//! The model is assumed to be already resolved and valid: groupings are
//! expanded, augmentations applied, leafref targets resolved. It is read-only
//! once built; [`SchemaContextBuilder`] exists so callers (and tests) can
//! assemble one without a module-source compiler.
//!
//! # Beispiel
//!
//! ```
//! use yangtrack::qname::QName;
//! use yangtrack::schema::{Module, SchemaContext, SchemaNode, TypeDefinition};
//!
//! let ns = "urn:example:system";
//! let q = |local: &str| QName::new(ns, local);
//! let ctx = SchemaContext::builder()
//!     .module(Module::new("example-system", "sys", ns))
//!     .node(SchemaNode::container(q("system")).with_child(SchemaNode::leaf(q("hostname"), TypeDefinition::String)))
//!     .build()
//!     .unwrap();
//!
//! assert!(ctx.find_data_node(&[q("system"), q("hostname")]).is_some());
//! ```

use std::rc::Rc;

use crate::qname::QName;
use crate::{Error, Result};

mod resolve;
mod types;

pub use resolve::{SchemaNodeResolver, SchemaResolver};
pub use types::{IntegerKind, TypeDefinition};

/// Namespace des synthetischen Daten-Roots.
pub const NETCONF_BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

// ============================================================================
// Module
// ============================================================================

/// Module metadata. The namespace identifies the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: Rc<str>,
    pub prefix: Rc<str>,
    pub namespace: Rc<str>,
    pub revision: Option<Rc<str>>,
    pub description: Option<Rc<str>>,
    pub contact: Option<Rc<str>>,
}

impl Module {
    pub fn new(name: &str, prefix: &str, namespace: &str) -> Self {
        Self {
            name: Rc::from(name),
            prefix: Rc::from(prefix),
            namespace: Rc::from(namespace),
            revision: None,
            description: None,
            contact: None,
        }
    }

    pub fn with_revision(mut self, revision: &str) -> Self {
        self.revision = Some(Rc::from(revision));
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(Rc::from(description));
        self
    }

    pub fn with_contact(mut self, contact: &str) -> Self {
        self.contact = Some(Rc::from(contact));
        self
    }

    /// QName im Namespace dieses Moduls.
    pub fn qname(&self, local_name: &str) -> QName {
        QName::new(Rc::clone(&self.namespace), local_name)
    }
}

// ============================================================================
// SchemaNode
// ============================================================================

/// Lifecycle status of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Current,
    Deprecated,
    Obsolete,
}

impl Status {
    pub fn name(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Deprecated => "DEPRECATED",
            Self::Obsolete => "OBSOLETE",
        }
    }
}

/// Closed set of schema node kinds.
///
/// `Choice` und `Case` tauchen nur als Zwischenstufen einer Resolver-Antwort
/// auf; Instanzdaten werden nie direkt in sie hinein gelesen.
#[derive(Debug, Clone)]
pub enum SchemaNodeKind {
    Container {
        children: Vec<Rc<SchemaNode>>,
        actions: Vec<Rc<ActionDefinition>>,
        presence: bool,
    },
    List {
        keys: Vec<QName>,
        children: Vec<Rc<SchemaNode>>,
        actions: Vec<Rc<ActionDefinition>>,
    },
    Leaf { ty: TypeDefinition },
    LeafList { ty: TypeDefinition },
    Anyxml,
    Choice { cases: Vec<Rc<SchemaNode>> },
    Case { children: Vec<Rc<SchemaNode>> },
}

/// One data definition of the effective model.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    qname: QName,
    kind: SchemaNodeKind,
    config: bool,
    mandatory: bool,
    status: Status,
    description: Option<Rc<str>>,
}

impl SchemaNode {
    fn new(qname: QName, kind: SchemaNodeKind) -> Self {
        Self {
            qname,
            kind,
            config: true,
            mandatory: false,
            status: Status::Current,
            description: None,
        }
    }

    pub fn container(qname: QName) -> Self {
        Self::new(
            qname,
            SchemaNodeKind::Container {
                children: Vec::new(),
                actions: Vec::new(),
                presence: false,
            },
        )
    }

    pub fn list(qname: QName, keys: impl IntoIterator<Item = QName>) -> Self {
        Self::new(
            qname,
            SchemaNodeKind::List {
                keys: keys.into_iter().collect(),
                children: Vec::new(),
                actions: Vec::new(),
            },
        )
    }

    pub fn leaf(qname: QName, ty: TypeDefinition) -> Self {
        Self::new(qname, SchemaNodeKind::Leaf { ty })
    }

    pub fn leaf_list(qname: QName, ty: TypeDefinition) -> Self {
        Self::new(qname, SchemaNodeKind::LeafList { ty })
    }

    pub fn anyxml(qname: QName) -> Self {
        Self::new(qname, SchemaNodeKind::Anyxml)
    }

    pub fn choice(qname: QName) -> Self {
        Self::new(qname, SchemaNodeKind::Choice { cases: Vec::new() })
    }

    pub fn case(qname: QName) -> Self {
        Self::new(qname, SchemaNodeKind::Case { children: Vec::new() })
    }

    /// Fuegt ein Kind hinzu.
    ///
    /// An einer Choice wird ein Nicht-Case-Knoten in einen impliziten Case
    /// gleichen Namens verpackt. Leaf/LeafList/Anyxml ignorieren Kinder.
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.attach(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SchemaNode>) -> Self {
        for child in children {
            self.attach(child);
        }
        self
    }

    pub fn with_action(mut self, action: ActionDefinition) -> Self {
        match &mut self.kind {
            SchemaNodeKind::Container { actions, .. } | SchemaNodeKind::List { actions, .. } => {
                actions.push(Rc::new(action));
            }
            _ => {}
        }
        self
    }

    pub fn with_config(mut self, config: bool) -> Self {
        self.config = config;
        self
    }

    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn with_presence(mut self, value: bool) -> Self {
        if let SchemaNodeKind::Container { presence, .. } = &mut self.kind {
            *presence = value;
        }
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(Rc::from(description));
        self
    }

    /// Haengt `child` an; `false` wenn dieser Knotentyp keine Kinder hat.
    fn attach(&mut self, child: SchemaNode) -> bool {
        match &mut self.kind {
            SchemaNodeKind::Container { children, .. }
            | SchemaNodeKind::List { children, .. }
            | SchemaNodeKind::Case { children } => {
                children.push(Rc::new(child));
                true
            }
            SchemaNodeKind::Choice { cases } => {
                let case = if matches!(child.kind, SchemaNodeKind::Case { .. }) {
                    child
                } else {
                    SchemaNode::case(child.qname.clone()).with_child(child)
                };
                cases.push(Rc::new(case));
                true
            }
            SchemaNodeKind::Leaf { .. } | SchemaNodeKind::LeafList { .. } | SchemaNodeKind::Anyxml => false,
        }
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn kind(&self) -> &SchemaNodeKind {
        &self.kind
    }

    pub fn is_config(&self) -> bool {
        self.config
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Data children (container, list, case); cases for a choice.
    pub fn children(&self) -> &[Rc<SchemaNode>] {
        match &self.kind {
            SchemaNodeKind::Container { children, .. }
            | SchemaNodeKind::List { children, .. }
            | SchemaNodeKind::Case { children } => children,
            SchemaNodeKind::Choice { cases } => cases,
            SchemaNodeKind::Leaf { .. } | SchemaNodeKind::LeafList { .. } | SchemaNodeKind::Anyxml => &[],
        }
    }

    pub fn actions(&self) -> &[Rc<ActionDefinition>] {
        match &self.kind {
            SchemaNodeKind::Container { actions, .. } | SchemaNodeKind::List { actions, .. } => actions,
            _ => &[],
        }
    }

    pub fn find_child(&self, qname: &QName) -> Option<&Rc<SchemaNode>> {
        self.children().iter().find(|c| c.qname == *qname)
    }

    pub fn find_action(&self, qname: &QName) -> Option<&Rc<ActionDefinition>> {
        self.actions().iter().find(|a| a.qname == *qname)
    }

    /// Schluessel einer Liste (leer fuer alle anderen Knoten).
    pub fn keys(&self) -> &[QName] {
        match &self.kind {
            SchemaNodeKind::List { keys, .. } => keys,
            _ => &[],
        }
    }

    pub fn type_definition(&self) -> Option<&TypeDefinition> {
        match &self.kind {
            SchemaNodeKind::Leaf { ty } | SchemaNodeKind::LeafList { ty } => Some(ty),
            _ => None,
        }
    }

    pub fn is_presence(&self) -> bool {
        matches!(self.kind, SchemaNodeKind::Container { presence: true, .. })
    }

    /// Klassenname wie in YANG (`container`, `list`, ...).
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SchemaNodeKind::Container { .. } => "container",
            SchemaNodeKind::List { .. } => "list",
            SchemaNodeKind::Leaf { .. } => "leaf",
            SchemaNodeKind::LeafList { .. } => "leaf-list",
            SchemaNodeKind::Anyxml => "anyxml",
            SchemaNodeKind::Choice { .. } => "choice",
            SchemaNodeKind::Case { .. } => "case",
        }
    }
}

// ============================================================================
// ActionDefinition
// ============================================================================

/// An action (or rpc) with its input and output containers.
#[derive(Debug, Clone)]
pub struct ActionDefinition {
    qname: QName,
    input: Rc<SchemaNode>,
    output: Rc<SchemaNode>,
    status: Status,
    description: Option<Rc<str>>,
}

impl ActionDefinition {
    /// Erstellt eine Action mit leerem `input` und `output` im Modul der Action.
    pub fn new(qname: QName) -> Self {
        let input = SchemaNode::container(qname.sibling("input"));
        let output = SchemaNode::container(qname.sibling("output")).with_config(false);
        Self {
            qname,
            input: Rc::new(input),
            output: Rc::new(output),
            status: Status::Current,
            description: None,
        }
    }

    pub fn with_input(mut self, child: SchemaNode) -> Self {
        Rc::make_mut(&mut self.input).attach(child);
        self
    }

    pub fn with_output(mut self, child: SchemaNode) -> Self {
        Rc::make_mut(&mut self.output).attach(child.with_config(false));
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(Rc::from(description));
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn input(&self) -> &Rc<SchemaNode> {
        &self.input
    }

    pub fn output(&self) -> &Rc<SchemaNode> {
        &self.output
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

// ============================================================================
// NotificationDefinition
// ============================================================================

/// A top-level notification. Its children are state data (`config false`).
#[derive(Debug, Clone)]
pub struct NotificationDefinition {
    qname: QName,
    children: Vec<Rc<SchemaNode>>,
    status: Status,
    description: Option<Rc<str>>,
}

impl NotificationDefinition {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            children: Vec::new(),
            status: Status::Current,
            description: None,
        }
    }

    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.children.push(Rc::new(child.with_config(false)));
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(Rc::from(description));
        self
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn children(&self) -> &[Rc<SchemaNode>] {
        &self.children
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

// ============================================================================
// SchemaContext
// ============================================================================

/// The effective model: modules plus a synthetic data root holding every
/// top-level data node. Rpcs hang as actions off the data root.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    modules: Vec<Module>,
    root: Rc<SchemaNode>,
    notifications: Vec<Rc<NotificationDefinition>>,
}

impl SchemaContext {
    pub fn builder() -> SchemaContextBuilder {
        SchemaContextBuilder::default()
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| &*m.name == name)
    }

    pub fn find_module_by_namespace(&self, namespace: &str) -> Option<&Module> {
        self.modules.iter().find(|m| &*m.namespace == namespace)
    }

    /// Container dessen Kinder die Top-Level-Knoten aller Module sind.
    pub fn data_root(&self) -> &Rc<SchemaNode> {
        &self.root
    }

    /// Alle rpcs (Actions des Daten-Roots).
    pub fn rpcs(&self) -> &[Rc<ActionDefinition>] {
        self.root.actions()
    }

    pub fn notifications(&self) -> &[Rc<NotificationDefinition>] {
        &self.notifications
    }

    /// Sucht einen Knoten ueber seinen absoluten Schema-Pfad
    /// (Choice- und Case-Namen sind Teil des Pfads).
    pub fn find_data_node(&self, path: &[QName]) -> Option<Rc<SchemaNode>> {
        let mut current = &self.root;
        for qname in path {
            current = current.find_child(qname)?;
        }
        if path.is_empty() {
            None
        } else {
            Some(Rc::clone(current))
        }
    }
}

/// Builder fuer [`SchemaContext`].
#[derive(Debug, Clone, Default)]
pub struct SchemaContextBuilder {
    modules: Vec<Module>,
    nodes: Vec<Rc<SchemaNode>>,
    rpcs: Vec<Rc<ActionDefinition>>,
    notifications: Vec<Rc<NotificationDefinition>>,
    augments: Vec<(Vec<QName>, Vec<SchemaNode>)>,
}

impl SchemaContextBuilder {
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Fuegt einen Top-Level-Knoten hinzu.
    pub fn node(mut self, node: SchemaNode) -> Self {
        self.nodes.push(Rc::new(node));
        self
    }

    /// Top-level rpc; im Instanzdokument als Kind des Daten-Roots aufgerufen.
    pub fn rpc(mut self, rpc: ActionDefinition) -> Self {
        self.rpcs.push(Rc::new(rpc));
        self
    }

    pub fn notification(mut self, notification: NotificationDefinition) -> Self {
        self.notifications.push(Rc::new(notification));
        self
    }

    /// Registriert eine Augmentation; wird in `build()` angewendet.
    pub fn augment(mut self, target: impl IntoIterator<Item = QName>, nodes: impl IntoIterator<Item = SchemaNode>) -> Self {
        self.augments
            .push((target.into_iter().collect(), nodes.into_iter().collect()));
        self
    }

    /// Wendet alle Augmentations an.
    ///
    /// Fehlende oder blattartige Ziele ergeben `Error::NotFound`.
    pub fn build(self) -> Result<SchemaContext> {
        let mut nodes = self.nodes;
        for (target, additions) in self.augments {
            if !augment_nodes(&mut nodes, &target, additions) {
                let path = target.iter().map(|q| format!("/{q}")).collect::<String>();
                return Err(Error::not_found("Augment target", path));
            }
        }
        let root_name = QName::new(NETCONF_BASE_NAMESPACE, "data");
        let root = SchemaNode::new(
            root_name,
            SchemaNodeKind::Container {
                children: nodes,
                actions: self.rpcs,
                presence: false,
            },
        );
        Ok(SchemaContext {
            modules: self.modules,
            root: Rc::new(root),
            notifications: self.notifications,
        })
    }
}

fn augment_nodes(nodes: &mut [Rc<SchemaNode>], target: &[QName], additions: Vec<SchemaNode>) -> bool {
    let Some((first, rest)) = target.split_first() else {
        return false;
    };
    let Some(node) = nodes.iter_mut().find(|n| n.qname == *first) else {
        return false;
    };
    let node = Rc::make_mut(node);
    if rest.is_empty() {
        let mut attached = true;
        for addition in additions {
            attached &= node.attach(addition);
        }
        return attached;
    }
    match &mut node.kind {
        SchemaNodeKind::Container { children, .. }
        | SchemaNodeKind::List { children, .. }
        | SchemaNodeKind::Case { children } => augment_nodes(children, rest, additions),
        SchemaNodeKind::Choice { cases } => augment_nodes(cases, rest, additions),
        SchemaNodeKind::Leaf { .. } | SchemaNodeKind::LeafList { .. } | SchemaNodeKind::Anyxml => false,
    }
}
