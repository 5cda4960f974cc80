//! Buffered normalized data of one document.
//!
//! Der Parser baut pro Dokument einen vollstaendigen Datenbaum auf und
//! schreibt ihn erst nach erfolgreichem Parsen in den Writer.

use std::rc::Rc;

use crate::FastIndexMap;
use crate::anyxml::AnyxmlNode;
use crate::qname::QName;
use crate::schema::{SchemaNode, SchemaNodeKind};
use crate::value::TypedValue;
use crate::writer::NormalizedNodeWriter;
use crate::{Error, Result};

/// Container, choice or list entry under construction.
#[derive(Debug, Clone)]
pub(crate) struct CompositeData {
    pub(crate) name: QName,
    pub(crate) schema: Rc<SchemaNode>,
    pub(crate) attributes: Vec<(QName, Rc<str>)>,
    pub(crate) children: FastIndexMap<QName, NodeData>,
}

#[derive(Debug, Clone)]
pub(crate) struct LeafData {
    pub(crate) name: QName,
    pub(crate) value: TypedValue,
    pub(crate) attributes: Vec<(QName, Rc<str>)>,
}

#[derive(Debug, Clone)]
pub(crate) struct ListEntryData {
    /// Schluesselwerte in Schluesselreihenfolge.
    pub(crate) keys: Vec<(QName, TypedValue)>,
    pub(crate) data: CompositeData,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Container(CompositeData),
    Choice(CompositeData),
    List { name: QName, entries: Vec<ListEntryData> },
    LeafList { name: QName, entries: Vec<LeafData> },
    Leaf(LeafData),
    Anyxml(AnyxmlNode),
}

impl CompositeData {
    pub(crate) fn new(schema: Rc<SchemaNode>, attributes: Vec<(QName, Rc<str>)>) -> Self {
        Self {
            name: schema.qname().clone(),
            schema,
            attributes,
            children: FastIndexMap::default(),
        }
    }

    /// Fuer Action-Aufrufe: Name der Action, Schema des `input` Containers.
    pub(crate) fn named(name: QName, schema: Rc<SchemaNode>, attributes: Vec<(QName, Rc<str>)>) -> Self {
        Self {
            name,
            schema,
            attributes,
            children: FastIndexMap::default(),
        }
    }

    /// Steigt durch die Choice-Wrapper einer Resolver-Antwort ab und legt
    /// fehlende Choice-Knoten an. Cases haben keine Datenrepraesentation.
    pub(crate) fn descend(&mut self, wrappers: &[Rc<SchemaNode>]) -> Result<&mut CompositeData> {
        let mut current = self;
        for wrapper in wrappers {
            match wrapper.kind() {
                SchemaNodeKind::Case { .. } => continue,
                SchemaNodeKind::Choice { .. } => {
                    let entry = current
                        .children
                        .entry(wrapper.qname().clone())
                        .or_insert_with(|| NodeData::Choice(CompositeData::new(Rc::clone(wrapper), Vec::new())));
                    current = match entry {
                        NodeData::Choice(choice) => choice,
                        _ => {
                            return Err(Error::UnsupportedSchemaNode(format!(
                                "{} used as choice and data node",
                                wrapper.qname()
                            )));
                        }
                    };
                }
                _ => {
                    return Err(Error::UnsupportedSchemaNode(format!(
                        "{} {} between parent and target",
                        wrapper.kind_name(),
                        wrapper.qname()
                    )));
                }
            }
        }
        Ok(current)
    }

    pub(crate) fn insert(&mut self, node: NodeData) {
        self.children.insert(node.name().clone(), node);
    }

    /// Schluesselwerte dieses Listeneintrags.
    pub(crate) fn list_keys(&self) -> Result<Vec<(QName, TypedValue)>> {
        self.schema
            .keys()
            .iter()
            .map(|key| match self.children.get(key) {
                Some(NodeData::Leaf(leaf)) => Ok((key.clone(), leaf.value.clone())),
                _ => Err(Error::MissingListKey {
                    list: self.name.to_string(),
                    key: key.to_string(),
                }),
            })
            .collect()
    }

    fn write_children(&self, writer: &mut dyn NormalizedNodeWriter) -> Result<()> {
        for child in self.children.values() {
            child.write(writer)?;
        }
        Ok(())
    }
}

impl NodeData {
    pub(crate) fn name(&self) -> &QName {
        match self {
            Self::Container(c) | Self::Choice(c) => &c.name,
            Self::List { name, .. } | Self::LeafList { name, .. } => name,
            Self::Leaf(leaf) => &leaf.name,
            Self::Anyxml(node) => node.name(),
        }
    }

    /// Emits this node and its subtree.
    pub(crate) fn write(&self, writer: &mut dyn NormalizedNodeWriter) -> Result<()> {
        match self {
            Self::Container(c) => {
                writer.start_container(&c.name, &c.attributes)?;
                c.write_children(writer)?;
                writer.end_node()
            }
            Self::Choice(c) => {
                writer.start_choice(&c.name)?;
                c.write_children(writer)?;
                writer.end_node()
            }
            Self::List { name, entries } => {
                writer.start_list(name)?;
                for entry in entries {
                    writer.start_list_entry(name, &entry.keys, &entry.data.attributes)?;
                    entry.data.write_children(writer)?;
                    writer.end_node()?;
                }
                writer.end_node()
            }
            Self::LeafList { name, entries } => {
                writer.start_leaf_list(name)?;
                for entry in entries {
                    writer.leaf_list_entry(&entry.name, &entry.value, &entry.attributes)?;
                }
                writer.end_node()
            }
            Self::Leaf(leaf) => writer.leaf(&leaf.name, &leaf.value, &leaf.attributes),
            Self::Anyxml(node) => writer.anyxml(node.name(), node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeDefinition;
    use crate::writer::{EventRecorder, WriteEvent};

    fn q(local: &str) -> QName {
        QName::new("urn:a", local)
    }

    fn leaf(name: &str, value: &str) -> NodeData {
        NodeData::Leaf(LeafData {
            name: q(name),
            value: TypedValue::String(value.into()),
            attributes: Vec::new(),
        })
    }

    #[test]
    fn choice_wrappers_are_shared() {
        let choice = Rc::new(SchemaNode::choice(q("mode")));
        let case = Rc::new(SchemaNode::case(q("fast")));
        let mut top = CompositeData::new(Rc::new(SchemaNode::container(q("top"))), Vec::new());
        top.descend(&[Rc::clone(&choice), Rc::clone(&case)]).unwrap().insert(leaf("a", "1"));
        top.descend(&[choice, case]).unwrap().insert(leaf("b", "2"));
        assert_eq!(top.children.len(), 1);

        let mut rec = EventRecorder::new();
        NodeData::Container(top).write(&mut rec).unwrap();
        let events = rec.into_events();
        assert_eq!(events[1], WriteEvent::StartChoice(q("mode")));
        assert_eq!(events.len(), 6);
        assert_eq!(events[5], WriteEvent::EndNode);
    }

    #[test]
    fn list_keys_in_key_order() {
        let list = Rc::new(
            SchemaNode::list(q("entry"), [q("k2"), q("k1")])
                .with_child(SchemaNode::leaf(q("k1"), TypeDefinition::String))
                .with_child(SchemaNode::leaf(q("k2"), TypeDefinition::String)),
        );
        let mut entry = CompositeData::new(Rc::clone(&list), Vec::new());
        entry.insert(leaf("k1", "one"));
        assert!(matches!(entry.list_keys(), Err(Error::MissingListKey { .. })));
        entry.insert(leaf("k2", "two"));
        let keys = entry.list_keys().unwrap();
        assert_eq!(keys[0].0, q("k2"));
        assert_eq!(keys[1].1, TypedValue::String("one".into()));
    }
}
