use std::io::Write;
use std::rc::Rc;

use crate::anyxml::AnyxmlNode;
use crate::qname::QName;
use crate::value::TypedValue;
use crate::xml::{w, write_attributes, write_escaped_attr, write_escaped_text};
use crate::{Error, Result};

use super::{Attributes, NormalizedNodeWriter};

enum Frame {
    /// Offenes Element; Namespace bestimmt den Default-Namespace der Kinder.
    Element(QName),
    /// Choice, Liste und Leaf-Liste haben keine eigene XML-Repraesentation.
    Transparent,
}

/// Writes normalized data back out as XML.
///
/// Choices, lists and leaf-lists are transparent; list entries and
/// leaf-list entries become repeated sibling elements. A default namespace
/// is declared wherever an element's module differs from its parent's.
pub struct XmlNodeWriter<W: Write> {
    writer: W,
    stack: Vec<Frame>,
}

impl<W: Write> XmlNodeWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            stack: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn parent_namespace(&self) -> &str {
        self.stack
            .iter()
            .rev()
            .find_map(|f| match f {
                Frame::Element(name) => Some(name.namespace()),
                Frame::Transparent => None,
            })
            .unwrap_or("")
    }

    fn open_tag(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        let declare = name.namespace() != self.parent_namespace();
        w(&mut self.writer, "<")?;
        w(&mut self.writer, name.local_name())?;
        if declare {
            w(&mut self.writer, " xmlns=\"")?;
            write_escaped_attr(&mut self.writer, name.namespace())?;
            w(&mut self.writer, "\"")?;
        }
        write_attributes(&mut self.writer, attributes)
    }

    fn close_tag(&mut self, name: &QName) -> Result<()> {
        w(&mut self.writer, "</")?;
        w(&mut self.writer, name.local_name())?;
        w(&mut self.writer, ">")
    }

    fn value_element(&mut self, name: &QName, value: &TypedValue, attributes: &Attributes) -> Result<()> {
        self.open_tag(name, attributes)?;
        let lexical = match value {
            TypedValue::Empty => return w(&mut self.writer, "/>"),
            TypedValue::IdentityRef { identity, prefix } => {
                let prefix = match prefix {
                    Some(prefix) => Rc::clone(prefix),
                    None if identity.namespace() == name.namespace() => Rc::from(""),
                    None => Rc::from("id"),
                };
                if !prefix.is_empty() {
                    w(&mut self.writer, &format!(" xmlns:{prefix}=\""))?;
                    write_escaped_attr(&mut self.writer, identity.namespace())?;
                    w(&mut self.writer, "\"")?;
                }
                if prefix.is_empty() {
                    identity.local_name().to_owned()
                } else {
                    format!("{prefix}:{}", identity.local_name())
                }
            }
            other => other.to_lexical().into_owned(),
        };
        w(&mut self.writer, ">")?;
        write_escaped_text(&mut self.writer, &lexical)?;
        self.close_tag(name)
    }
}

impl<W: Write> NormalizedNodeWriter for XmlNodeWriter<W> {
    fn start_container(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        self.open_tag(name, attributes)?;
        w(&mut self.writer, ">")?;
        self.stack.push(Frame::Element(name.clone()));
        Ok(())
    }

    fn start_choice(&mut self, _name: &QName) -> Result<()> {
        self.stack.push(Frame::Transparent);
        Ok(())
    }

    fn start_list(&mut self, _name: &QName) -> Result<()> {
        self.stack.push(Frame::Transparent);
        Ok(())
    }

    fn start_list_entry(&mut self, name: &QName, _keys: &[(QName, TypedValue)], attributes: &Attributes) -> Result<()> {
        self.start_container(name, attributes)
    }

    fn start_leaf_list(&mut self, _name: &QName) -> Result<()> {
        self.stack.push(Frame::Transparent);
        Ok(())
    }

    fn leaf_list_entry(&mut self, name: &QName, value: &TypedValue, attributes: &Attributes) -> Result<()> {
        self.value_element(name, value, attributes)
    }

    fn leaf(&mut self, name: &QName, value: &TypedValue, attributes: &Attributes) -> Result<()> {
        self.value_element(name, value, attributes)
    }

    fn anyxml(&mut self, _name: &QName, value: &AnyxmlNode) -> Result<()> {
        let parent = self.parent_namespace().to_owned();
        value.write_xml(&mut self.writer, &parent)
    }

    fn end_node(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Element(name)) => self.close_tag(&name),
            Some(Frame::Transparent) => Ok(()),
            None => Err(Error::writer("end_node without open node")),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(Error::writer)
    }
}
