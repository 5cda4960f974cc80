//! JSON view of the tracked positions with module and node metadata.

use serde_json::{Map, Value, json};

use crate::qname::QName;
use crate::schema::{Module, SchemaContext, SchemaNode, TypeDefinition};
use crate::tree::{SchemaTree, TreeContent};
use crate::Result;

use super::tree::inherited_config;
use super::{augment_groups, find_module, module_notifications, module_roots, module_rpcs};

/// Revision reported for modules without one.
pub const EARLIEST_REVISION: &str = "1970-01-01";

/// Builds the JSON tree of `module`: `module` metadata, touched root nodes
/// under `children`, augmentations grouped by target under `augments`,
/// the module's `rpcs` and `notifications` as declared in the model.
pub fn render_json_tree(context: &SchemaContext, tree: &SchemaTree, module: &str) -> Result<Value> {
    let module = find_module(context, module)?;
    let renderer = JsonRenderer { context, module };

    let mut out = Map::new();
    let children: Vec<Value> = module_roots(tree, module)
        .into_iter()
        .map(|node| renderer.node(node, true))
        .collect();
    if !children.is_empty() {
        out.insert("children".into(), Value::Array(children));
    }

    let mut augments = Vec::new();
    for (target, nodes) in augment_groups(tree, module) {
        let config = inherited_config(context, &target);
        let path = renderer.path(&target);
        augments.push(json!({
            "name": path.clone(),
            "path": path,
            "class": "augmentation",
            "config": config,
            "status": "CURRENT",
            "description": "",
            "children": nodes.into_iter().map(|node| renderer.node(node, config)).collect::<Vec<_>>(),
        }));
    }
    if !augments.is_empty() {
        out.insert("augments".into(), Value::Array(augments));
    }

    let rpcs: Vec<Value> = module_rpcs(context, module, true)
        .iter()
        .map(|rpc| renderer.node(rpc, true))
        .collect();
    if !rpcs.is_empty() {
        out.insert("rpcs".into(), Value::Array(rpcs));
    }
    let notifications: Vec<Value> = module_notifications(context, module)
        .iter()
        .map(|notification| renderer.node(notification, false))
        .collect();
    if !notifications.is_empty() {
        out.insert("notifications".into(), Value::Array(notifications));
    }

    out.insert("module".into(), module_metadata(module));
    Ok(Value::Object(out))
}

fn module_metadata(module: &Module) -> Value {
    json!({
        "name": &*module.name,
        "revision": module.revision.as_deref().unwrap_or(EARLIEST_REVISION),
        "namespace": &*module.namespace,
        "prefix": &*module.prefix,
        "contact": module.contact.as_deref().unwrap_or(""),
        "description": module.description.as_deref().unwrap_or(""),
    })
}

struct JsonRenderer<'a> {
    context: &'a SchemaContext,
    module: &'a Module,
}

impl JsonRenderer<'_> {
    fn node(&self, node: &SchemaTree, parent_config: bool) -> Value {
        let path = self.path(&node.absolute_path());
        match node.content() {
            TreeContent::Root => Value::Null,
            TreeContent::Action(action) => {
                let class = if node.path().depth() == 1 { "rpc" } else { "action" };
                json!({
                    "name": action.qname().local_name(),
                    "description": action.description().unwrap_or(""),
                    "status": action.status().name(),
                    "type_info": {},
                    "class": class,
                    "path": path,
                    "children": self.children(node, parent_config),
                })
            }
            TreeContent::Notification(notification) => json!({
                "name": notification.qname().local_name(),
                "description": notification.description().unwrap_or(""),
                "status": notification.status().name(),
                "type_info": {},
                "class": "notification",
                "path": path,
                "children": self.children(node, false),
            }),
            TreeContent::Data(schema) => {
                let config = parent_config && schema.is_config();
                json!({
                    "name": schema.qname().local_name(),
                    "config": config,
                    "description": schema.description().unwrap_or(""),
                    "status": schema.status().name(),
                    "type_info": self.type_info(schema),
                    "class": schema.kind_name(),
                    "path": path,
                    "children": self.children(node, config),
                })
            }
        }
    }

    fn children(&self, node: &SchemaTree, config: bool) -> Vec<Value> {
        node.children()
            .filter(|child| child.qname().namespace() == &*self.module.namespace)
            .map(|child| self.node(child, config))
            .collect()
    }

    fn type_info(&self, schema: &SchemaNode) -> Value {
        let Some(ty) = schema.type_definition() else {
            return json!({});
        };
        let mut info = Map::new();
        let (name, description) = match ty {
            TypeDefinition::Derived { name, description, .. } => {
                let prefix = self.context.find_module_by_namespace(name.namespace()).map(|m| &*m.prefix);
                let shown = match prefix {
                    Some(prefix) => format!("{prefix}:{}", name.local_name()),
                    None => name.local_name().to_owned(),
                };
                (shown, description.as_deref().unwrap_or(""))
            }
            other => (other.builtin_name().to_owned(), ""),
        };
        if let TypeDefinition::IdentityRef { base, .. } = ty.resolved() {
            info.insert("base".into(), json!([base.local_name()]));
        }
        info.insert("description".into(), Value::from(description));
        info.insert("type".into(), Value::from(name));
        if let Some(default) = ty.default_value() {
            info.insert("default".into(), Value::from(default));
        }
        Value::Object(info)
    }

    /// `/prefix:name/.../` mit Prefix des jeweiligen Moduls.
    fn path(&self, segments: &[QName]) -> String {
        let mut out = String::from("/");
        for qname in segments {
            if let Some(module) = self.context.find_module_by_namespace(qname.namespace()) {
                out.push_str(&module.prefix);
            }
            out.push(':');
            out.push_str(qname.local_name());
            out.push('/');
        }
        out
    }
}
