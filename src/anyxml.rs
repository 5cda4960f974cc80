//! Opaque XML subtrees carried by anyxml nodes.

use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::qname::QName;
use crate::xml::{StartTag, XmlCursor, XmlEvent, unexpected_eof, w, write_attributes, write_escaped_attr, write_escaped_text};
use crate::{Error, Result};

/// Content of an [`AnyxmlNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyxmlContent {
    Element(AnyxmlNode),
    Text(String),
}

/// An owned element tree captured verbatim from the instance document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyxmlNode {
    name: QName,
    attributes: Vec<(QName, Rc<str>)>,
    /// Prefix-Deklarationen (`xmlns:p`), beim Wurzelelement alle sichtbaren.
    namespaces: Vec<(Rc<str>, Rc<str>)>,
    children: Vec<AnyxmlContent>,
}

impl AnyxmlNode {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Deklariert `prefix` fuer Werte wie `p:name` im Inhalt.
    pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.push((Rc::from(prefix), Rc::from(uri)));
        self
    }

    pub fn with_attribute(mut self, name: QName, value: &str) -> Self {
        self.attributes.push((name, Rc::from(value)));
        self
    }

    pub fn with_child(mut self, child: AnyxmlNode) -> Self {
        self.children.push(AnyxmlContent::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(AnyxmlContent::Text(text.to_owned()));
        self
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn attributes(&self) -> &[(QName, Rc<str>)] {
        &self.attributes
    }

    pub fn namespaces(&self) -> &[(Rc<str>, Rc<str>)] {
        &self.namespaces
    }

    pub fn children(&self) -> &[AnyxmlContent] {
        &self.children
    }

    /// Direkte Kind-Elemente.
    pub fn elements(&self) -> impl Iterator<Item = &AnyxmlNode> {
        self.children.iter().filter_map(|c| match c {
            AnyxmlContent::Element(e) => Some(e),
            AnyxmlContent::Text(_) => None,
        })
    }

    /// Verketteter direkter Textinhalt.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                AnyxmlContent::Text(t) => Some(t.as_str()),
                AnyxmlContent::Element(_) => None,
            })
            .collect()
    }

    /// Liest den Inhalt eines bereits geoeffneten Elements bis zu dessen End-Tag.
    ///
    /// Die Wurzel uebernimmt alle an dieser Stelle sichtbaren Bindungen, damit
    /// prefixierte Inhalte auch losgeloest vom Dokument aufloesbar bleiben.
    pub(crate) fn read<R: BufRead>(cursor: &mut XmlCursor<R>, start: StartTag) -> Result<Self> {
        let in_scope = cursor.namespaces().in_scope();
        let mut node = Self::read_element(cursor, start)?;
        node.namespaces = in_scope;
        Ok(node)
    }

    fn read_element<R: BufRead>(cursor: &mut XmlCursor<R>, start: StartTag) -> Result<Self> {
        let mut node = Self {
            name: start.name,
            attributes: start.attributes,
            namespaces: start.namespace_decls,
            children: Vec::new(),
        };
        loop {
            match cursor.next_event()? {
                XmlEvent::Start(tag) => {
                    let child = Self::read_element(cursor, tag)?;
                    node.children.push(AnyxmlContent::Element(child));
                }
                XmlEvent::Text(text) => node.children.push(AnyxmlContent::Text(text)),
                XmlEvent::End => return Ok(node),
                XmlEvent::Eof => return Err(unexpected_eof()),
            }
        }
    }

    /// Serialisiert den Baum als XML-String.
    pub fn to_xml(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_xml(&mut buf, "")?;
        String::from_utf8(buf).map_err(|_| Error::IoError("XML output is not valid UTF-8".into()))
    }

    /// Schreibt den Baum; `parent_namespace` ist der Default-Namespace des
    /// umgebenden Elements. Weicht der eigene Namespace ab, wird `xmlns`
    /// deklariert. Gespeicherte Prefix-Deklarationen werden wieder ausgegeben,
    /// der Default-Namespace ergibt sich allein aus dem Elementnamen.
    pub fn write_xml(&self, writer: &mut impl Write, parent_namespace: &str) -> Result<()> {
        w(writer, "<")?;
        w(writer, self.name.local_name())?;
        if self.name.namespace() != parent_namespace {
            w(writer, " xmlns=\"")?;
            write_escaped_attr(writer, self.name.namespace())?;
            w(writer, "\"")?;
        }
        for (prefix, uri) in &self.namespaces {
            if prefix.is_empty() || uri.is_empty() {
                continue;
            }
            w(writer, " xmlns:")?;
            w(writer, prefix)?;
            w(writer, "=\"")?;
            write_escaped_attr(writer, uri)?;
            w(writer, "\"")?;
        }
        write_attributes(writer, &self.attributes)?;
        if self.children.is_empty() {
            return w(writer, "/>");
        }
        w(writer, ">")?;
        for child in &self.children {
            match child {
                AnyxmlContent::Element(e) => e.write_xml(writer, self.name.namespace())?,
                AnyxmlContent::Text(t) => write_escaped_text(writer, t)?,
            }
        }
        w(writer, "</")?;
        w(writer, self.name.local_name())?;
        w(writer, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_subtree() {
        let mut cursor = XmlCursor::new(r#"<any xmlns="urn:a"><x k="1">t<y/></x>tail</any>"#.as_bytes());
        let XmlEvent::Start(start) = cursor.next_event().unwrap() else {
            panic!("expected start");
        };
        let node = AnyxmlNode::read(&mut cursor, start).unwrap();
        assert_eq!(node.name(), &QName::new("urn:a", "any"));
        assert_eq!(node.text(), "tail");
        let x = node.elements().next().unwrap();
        assert_eq!(x.attributes()[0].0, QName::new("", "k"));
        assert_eq!(x.text(), "t");
        assert!(matches!(cursor.next_event().unwrap(), XmlEvent::Eof));
    }

    #[test]
    fn keeps_prefix_declarations() {
        let doc = r#"<top xmlns:t="urn:t"><any xmlns="urn:a"><x xmlns:p="urn:p">p:v</x></any></top>"#;
        let mut cursor = XmlCursor::new(doc.as_bytes());
        assert!(matches!(cursor.next_event().unwrap(), XmlEvent::Start(_)));
        let XmlEvent::Start(start) = cursor.next_event().unwrap() else {
            panic!("expected start");
        };
        let node = AnyxmlNode::read(&mut cursor, start).unwrap();
        assert!(node.namespaces().contains(&(Rc::from("t"), Rc::from("urn:t"))));
        assert_eq!(
            node.to_xml().unwrap(),
            r#"<any xmlns="urn:a" xmlns:t="urn:t"><x xmlns:p="urn:p">p:v</x></any>"#
        );
    }

    #[test]
    fn serializes_with_namespace_changes() {
        let node = AnyxmlNode::new(QName::new("urn:a", "root"))
            .with_attribute(QName::new("urn:m", "op"), "a&b")
            .with_child(AnyxmlNode::new(QName::new("urn:a", "same")).with_text("1<2"))
            .with_child(AnyxmlNode::new(QName::new("urn:b", "other")));
        assert_eq!(
            node.to_xml().unwrap(),
            r#"<root xmlns="urn:a" xmlns:a0="urn:m" a0:op="a&amp;b"><same>1&lt;2</same><other xmlns="urn:b"/></root>"#
        );
    }
}
