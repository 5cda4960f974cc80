//! pyang-like text tree of the positions a module's data exercised.
//!
//! ```text
//! module: example-system
//!   +--rw system
//!      +--rw hostname?   string
//!      +--rw mode?       enumeration
//! augment /sys:system:
//!   +--rw ntp!
//! RPCs:
//!   +---x restart
//!      +---w input
//!         +---w delay?   uint32
//! notifications:
//!   +---n restarted
//! ```
//!
//! Zeilenaufbau: `<status>--<flags> <name><opts>   <type>`.
//!
//! - status: `+` current, `x` deprecated, `o` obsolete
//! - flags: `rw`/`ro` nach config, `-x` rpc/Action, `-w` Input-Parameter,
//!   `-n` Notification
//! - opts: `?` optional, `!` presence, `*` Liste/Leaf-Liste (mit `[keys]`),
//!   `(name)` Choice, `:(name)` Case

use std::rc::Rc;

use crate::FastHashMap;
use crate::options::TreeOptions;
use crate::qname::QName;
use crate::schema::{Module, SchemaContext, SchemaNodeKind, Status};
use crate::tree::{SchemaTree, TreeContent};
use crate::Result;

use super::{augment_groups, find_module, module_notifications, module_roots, module_rpcs, type_label};

/// Renders the tracked positions of `module` as a text tree.
///
/// Unbekannte Module ergeben einen `Model` Fehler.
pub fn render_tree(context: &SchemaContext, tree: &SchemaTree, module: &str, options: &TreeOptions) -> Result<String> {
    let module = find_module(context, module)?;
    let mut printer = TreePrinter::new(context, module, options);
    printer.push(format!("module: {}", module.name));

    let roots = module_roots(tree, module);
    printer.print_siblings(&roots, &[], 1, Mode::Data, true, &[]);

    for (target, nodes) in augment_groups(tree, module) {
        let header = format!("augment {}:", printer.augment_path(&target));
        printer.push(header);
        let config = inherited_config(context, &target);
        printer.print_siblings(&nodes, &[], 1, Mode::Data, config, &[]);
    }

    let rpcs = module_rpcs(context, module, false);
    if !rpcs.is_empty() {
        printer.push("RPCs:".to_owned());
        printer.print_siblings(&rpcs.iter().collect::<Vec<_>>(), &[], 1, Mode::Data, true, &[]);
    }
    let notifications = module_notifications(context, module);
    if !notifications.is_empty() {
        printer.push("notifications:".to_owned());
        printer.print_siblings(&notifications.iter().collect::<Vec<_>>(), &[], 1, Mode::Notification, false, &[]);
    }
    Ok(printer.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Data,
    /// Kinder einer Action (`input`/`output`).
    Action,
    Input,
    Output,
    Notification,
}

struct TreePrinter<'a> {
    context: &'a SchemaContext,
    module: &'a Module,
    options: &'a TreeOptions,
    /// Namespace -> Prefix (oder Modulname) fuer qualifizierte Namen.
    prefixes: FastHashMap<Rc<str>, Rc<str>>,
    lines: Vec<String>,
}

impl<'a> TreePrinter<'a> {
    fn new(context: &'a SchemaContext, module: &'a Module, options: &'a TreeOptions) -> Self {
        let mut prefixes = FastHashMap::default();
        for m in context.modules() {
            if m.prefix != module.prefix || options.prefix_main_module() {
                let shown = if options.module_name_prefixes() { &m.name } else { &m.prefix };
                prefixes.insert(Rc::clone(&m.namespace), Rc::clone(shown));
            }
        }
        Self {
            context,
            module,
            options,
            prefixes,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: String) {
        let line = match self.options.line_length() {
            Some(max) if line.chars().count() > max => line.chars().take(max).collect(),
            _ => line,
        };
        self.lines.push(line);
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn display_name(&self, qname: &QName) -> String {
        match self.prefixes.get(qname.namespace()) {
            Some(prefix) => format!("{prefix}:{}", qname.local_name()),
            None => qname.local_name().to_owned(),
        }
    }

    fn augment_path(&self, target: &[QName]) -> String {
        target.iter().map(|q| format!("/{}", self.display_name(q))).collect()
    }

    fn visible_children<'t>(&self, node: &'t SchemaTree) -> Vec<&'t SchemaTree> {
        let own = |child: &&SchemaTree| child.qname().namespace() == &*self.module.namespace;
        node.data_children().filter(own).chain(node.action_children().filter(own)).collect()
    }

    fn print_siblings(
        &mut self,
        nodes: &[&SchemaTree],
        connectors: &[bool],
        level: usize,
        mode: Mode,
        parent_config: bool,
        keys: &[QName],
    ) {
        let width = nodes.iter().map(|n| self.label(n, keys).chars().count()).max().unwrap_or(0);
        for (i, node) in nodes.iter().enumerate() {
            let has_next = i + 1 < nodes.len();
            self.print_node(node, connectors, has_next, level, mode, parent_config, keys, width);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn print_node(
        &mut self,
        node: &SchemaTree,
        connectors: &[bool],
        has_next: bool,
        level: usize,
        mode: Mode,
        parent_config: bool,
        keys: &[QName],
        width: usize,
    ) {
        let (status, flags, config, child_mode, ty, child_keys) = match node.content() {
            TreeContent::Root => return,
            TreeContent::Action(action) => (action.status(), "-x", parent_config, Mode::Action, None, &[][..]),
            TreeContent::Notification(notification) => (notification.status(), "-n", false, Mode::Notification, None, &[][..]),
            TreeContent::Data(schema) => {
                let own_mode = match mode {
                    Mode::Action if schema.qname().local_name() == "output" => Mode::Output,
                    Mode::Action => Mode::Input,
                    other => other,
                };
                let config = own_mode != Mode::Output && parent_config && schema.is_config();
                let flags = match own_mode {
                    Mode::Input => "-w",
                    Mode::Data if config => "rw",
                    _ => "ro",
                };
                let ty = schema.type_definition().map(|ty| type_label(self.context, ty));
                (schema.status(), flags, config, own_mode, ty, schema.keys())
            }
        };

        let label = self.label(node, keys);
        let mut line = String::from("  ");
        for &connected in connectors {
            line.push_str(if connected { "|  " } else { "   " });
        }
        line.push(status_char(status));
        line.push_str("--");
        line.push_str(flags);
        line.push(' ');
        match ty {
            Some(ty) => line.push_str(&format!("{label:<width$}   {ty}")),
            None => line.push_str(&label),
        }
        self.push(line);

        if self.options.depth().is_some_and(|max| level >= max) {
            return;
        }
        let children = self.visible_children(node);
        if children.is_empty() {
            return;
        }
        let mut nested = connectors.to_vec();
        nested.push(has_next);
        let child_keys = child_keys.to_vec();
        self.print_siblings(&children, &nested, level + 1, child_mode, config, &child_keys);
    }

    /// Name plus opts (`?`, `!`, `*`, keys, choice/case decoration).
    fn label(&self, node: &SchemaTree, keys: &[QName]) -> String {
        match node.content() {
            TreeContent::Root => String::new(),
            TreeContent::Action(action) => self.display_name(action.qname()),
            TreeContent::Notification(notification) => self.display_name(notification.qname()),
            TreeContent::Data(schema) => {
                let name = self.display_name(schema.qname());
                let optional = if schema.is_mandatory() { "" } else { "?" };
                match schema.kind() {
                    SchemaNodeKind::Choice { .. } => format!("({name}){optional}"),
                    SchemaNodeKind::Case { .. } => format!(":({name})"),
                    SchemaNodeKind::List { keys, .. } if keys.is_empty() => format!("{name}*"),
                    SchemaNodeKind::List { keys, .. } => {
                        let keys: Vec<&str> = keys.iter().map(QName::local_name).collect();
                        format!("{name}* [{}]", keys.join(" "))
                    }
                    SchemaNodeKind::LeafList { .. } => format!("{name}*"),
                    SchemaNodeKind::Container { presence: true, .. } => format!("{name}!"),
                    SchemaNodeKind::Container { .. } => name,
                    SchemaNodeKind::Leaf { .. } if keys.contains(schema.qname()) => name,
                    SchemaNodeKind::Leaf { .. } | SchemaNodeKind::Anyxml => format!("{name}{optional}"),
                }
            }
        }
    }
}

fn status_char(status: Status) -> char {
    match status {
        Status::Current => '+',
        Status::Deprecated => 'x',
        Status::Obsolete => 'o',
    }
}

/// config of the augmented node: false as soon as one ancestor is state data.
pub(crate) fn inherited_config(context: &SchemaContext, target: &[QName]) -> bool {
    let mut current = context.data_root();
    for qname in target {
        match current.find_child(qname) {
            Some(child) if !child.is_config() => return false,
            Some(child) => current = child,
            None => return true,
        }
    }
    true
}
