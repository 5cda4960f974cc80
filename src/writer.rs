//! Sinks for normalized data.
//!
//! Der Parser puffert ein Dokument vollstaendig und schreibt es erst nach
//! erfolgreichem Parsen in einen [`NormalizedNodeWriter`]. Jedes `start_*`
//! wird von genau einem `end_node` geschlossen; `leaf`, `leaf_list_entry`
//! und `anyxml` sind in sich abgeschlossen.

use std::rc::Rc;

use crate::anyxml::AnyxmlNode;
use crate::qname::QName;
use crate::value::TypedValue;
use crate::{Error, Result};

mod xml;

pub use xml::XmlNodeWriter;

/// XML attributes carried over from the instance document.
pub type Attributes = [(QName, Rc<str>)];

/// Receives the normalized event stream of one document.
pub trait NormalizedNodeWriter {
    fn start_container(&mut self, name: &QName, attributes: &Attributes) -> Result<()>;

    fn start_choice(&mut self, name: &QName) -> Result<()>;

    fn start_list(&mut self, name: &QName) -> Result<()>;

    /// `keys` in Schluesselreihenfolge der Liste.
    fn start_list_entry(&mut self, name: &QName, keys: &[(QName, TypedValue)], attributes: &Attributes) -> Result<()>;

    fn start_leaf_list(&mut self, name: &QName) -> Result<()>;

    fn leaf_list_entry(&mut self, name: &QName, value: &TypedValue, attributes: &Attributes) -> Result<()>;

    fn leaf(&mut self, name: &QName, value: &TypedValue, attributes: &Attributes) -> Result<()>;

    fn anyxml(&mut self, name: &QName, value: &AnyxmlNode) -> Result<()>;

    fn end_node(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One recorded writer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEvent {
    StartContainer { name: QName, attributes: Vec<(QName, Rc<str>)> },
    StartChoice(QName),
    StartList(QName),
    StartListEntry { name: QName, keys: Vec<(QName, TypedValue)> },
    StartLeafList(QName),
    LeafListEntry { name: QName, value: TypedValue },
    Leaf { name: QName, value: TypedValue },
    Anyxml { name: QName, value: AnyxmlNode },
    EndNode,
    Flush,
}

/// Writer that records every call as a [`WriteEvent`].
///
/// Unbalancierte `end_node` Aufrufe werden als Writer-Fehler gemeldet.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<WriteEvent>,
    open: usize,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[WriteEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<WriteEvent> {
        self.events
    }

    /// Anzahl offener `start_*` Aufrufe.
    pub fn open_nodes(&self) -> usize {
        self.open
    }

    fn start(&mut self, event: WriteEvent) -> Result<()> {
        self.open += 1;
        self.events.push(event);
        Ok(())
    }
}

impl NormalizedNodeWriter for EventRecorder {
    fn start_container(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        self.start(WriteEvent::StartContainer {
            name: name.clone(),
            attributes: attributes.to_vec(),
        })
    }

    fn start_choice(&mut self, name: &QName) -> Result<()> {
        self.start(WriteEvent::StartChoice(name.clone()))
    }

    fn start_list(&mut self, name: &QName) -> Result<()> {
        self.start(WriteEvent::StartList(name.clone()))
    }

    fn start_list_entry(&mut self, name: &QName, keys: &[(QName, TypedValue)], _attributes: &Attributes) -> Result<()> {
        self.start(WriteEvent::StartListEntry {
            name: name.clone(),
            keys: keys.to_vec(),
        })
    }

    fn start_leaf_list(&mut self, name: &QName) -> Result<()> {
        self.start(WriteEvent::StartLeafList(name.clone()))
    }

    fn leaf_list_entry(&mut self, name: &QName, value: &TypedValue, _attributes: &Attributes) -> Result<()> {
        self.events.push(WriteEvent::LeafListEntry {
            name: name.clone(),
            value: value.clone(),
        });
        Ok(())
    }

    fn leaf(&mut self, name: &QName, value: &TypedValue, _attributes: &Attributes) -> Result<()> {
        self.events.push(WriteEvent::Leaf {
            name: name.clone(),
            value: value.clone(),
        });
        Ok(())
    }

    fn anyxml(&mut self, name: &QName, value: &AnyxmlNode) -> Result<()> {
        self.events.push(WriteEvent::Anyxml {
            name: name.clone(),
            value: value.clone(),
        });
        Ok(())
    }

    fn end_node(&mut self) -> Result<()> {
        self.open = self
            .open
            .checked_sub(1)
            .ok_or_else(|| Error::writer("end_node without open node"))?;
        self.events.push(WriteEvent::EndNode);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.events.push(WriteEvent::Flush);
        Ok(())
    }
}
