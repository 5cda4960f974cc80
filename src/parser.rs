//! Instance-tracking parser.
//!
//! Liest ein Instanzdokument in einem einzigen Durchlauf und erzeugt dabei
//! zwei Artefakte:
//!
//! - einen normalisierten Datenbaum, der nach Erfolg an einen
//!   [`NormalizedNodeWriter`] geschrieben wird, und
//! - ein Fragment des [`SchemaTree`] mit allen beruehrten Schema-Positionen,
//!   das nach Erfolg in den uebergebenen Baum gefaltet wird.
//!
//! Schlaegt ein Dokument fehl, bleiben Writer und Baum unveraendert.
//!
//! # Beispiel
//!
//! ```
//! use yangtrack::parser::TrackingParser;
//! use yangtrack::qname::QName;
//! use yangtrack::schema::{Module, SchemaContext, SchemaNode, TypeDefinition};
//! use yangtrack::tree::SchemaTree;
//! use yangtrack::writer::EventRecorder;
//!
//! let ns = "urn:example:system";
//! let ctx = SchemaContext::builder()
//!     .module(Module::new("example-system", "sys", ns))
//!     .node(SchemaNode::container(QName::new(ns, "system"))
//!         .with_child(SchemaNode::leaf(QName::new(ns, "hostname"), TypeDefinition::String)))
//!     .build()
//!     .unwrap();
//!
//! let mut tree = SchemaTree::root();
//! let mut events = EventRecorder::new();
//! TrackingParser::new(&ctx)
//!     .parse_str(
//!         r#"<data><system xmlns="urn:example:system"><hostname>r1</hostname></system></data>"#,
//!         &mut events,
//!         &mut tree,
//!     )
//!     .unwrap();
//!
//! let system = tree.child(&QName::new(ns, "system")).unwrap();
//! assert!(system.is_root_node());
//! assert_eq!(system.children().count(), 1);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::rc::Rc;

use log::{debug, log_enabled, warn, Level};

use crate::FastHashSet;
use crate::anyxml::AnyxmlNode;
use crate::data::{CompositeData, LeafData, ListEntryData, NodeData};
use crate::options::TrackingOptions;
use crate::path::{CompactPath, PathStack};
use crate::qname::QName;
use crate::schema::{ActionDefinition, SchemaContext, SchemaNode, SchemaNodeKind, SchemaNodeResolver, SchemaResolver};
use crate::tree::SchemaTree;
use crate::value::{BuiltinDecoder, ValueDecoder};
use crate::writer::NormalizedNodeWriter;
use crate::xml::{StartTag, XmlCursor, XmlEvent, unexpected_eof};
use crate::{Error, Result};

/// Streaming parser that normalizes instance data and records the schema
/// positions it touches.
pub struct TrackingParser<'a> {
    context: &'a SchemaContext,
    parent: Rc<SchemaNode>,
    /// Absoluter Schema-Pfad von `parent`; leer fuer den Daten-Root.
    parent_path: Vec<QName>,
    options: TrackingOptions,
    resolver: &'a dyn SchemaNodeResolver,
    decoder: &'a dyn ValueDecoder,
}

/// Per-document traversal state.
struct ParseState<R: BufRead> {
    cursor: XmlCursor<R>,
    stack: PathStack,
}

impl<'a> TrackingParser<'a> {
    /// Parser rooted at the schema context's data root: the document element
    /// is a free-named wrapper around top-level data.
    pub fn new(context: &'a SchemaContext) -> Self {
        Self {
            context,
            parent: Rc::clone(context.data_root()),
            parent_path: Vec::new(),
            options: TrackingOptions::default(),
            resolver: &SchemaResolver,
            decoder: &BuiltinDecoder,
        }
    }

    /// Roots parsing at the data node with the given absolute schema path.
    /// The document element must carry that node's name.
    ///
    /// Container und Listen lesen ihre Kinder, Leaf, Leaf-List und Anyxml
    /// genau einen Wert. Choice und Case haben kein eigenes Element und
    /// ergeben `Error::InvalidParent`.
    pub fn with_parent(mut self, path: &[QName]) -> Result<Self> {
        let node = self
            .context
            .find_data_node(path)
            .ok_or_else(|| Error::not_found("Schema node", display_path(path)))?;
        if let SchemaNodeKind::Choice { .. } | SchemaNodeKind::Case { .. } = node.kind() {
            return Err(Error::InvalidParent {
                path: display_path(path),
                kind: node.kind_name(),
            });
        }
        self.parent = node;
        self.parent_path = path.to_vec();
        Ok(self)
    }

    pub fn with_options(mut self, options: TrackingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_resolver(mut self, resolver: &'a dyn SchemaNodeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_decoder(mut self, decoder: &'a dyn ValueDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn context(&self) -> &SchemaContext {
        self.context
    }

    pub fn options(&self) -> TrackingOptions {
        self.options
    }

    /// Parses one document from a reader.
    pub fn parse(&self, reader: impl Read, writer: &mut dyn NormalizedNodeWriter, tree: &mut SchemaTree) -> Result<()> {
        self.run(BufReader::new(reader), writer, tree)
    }

    pub fn parse_str(&self, xml: &str, writer: &mut dyn NormalizedNodeWriter, tree: &mut SchemaTree) -> Result<()> {
        self.run(xml.as_bytes(), writer, tree)
    }

    /// Parses one document from a file; the handle is closed on every path.
    pub fn parse_file(
        &self,
        path: impl AsRef<Path>,
        writer: &mut dyn NormalizedNodeWriter,
        tree: &mut SchemaTree,
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::IoError(format!("{}: {e}", path.display())))?;
        self.run(BufReader::new(file), writer, tree)
    }

    fn run<R: BufRead>(&self, source: R, writer: &mut dyn NormalizedNodeWriter, tree: &mut SchemaTree) -> Result<()> {
        debug!(
            "tracking document below {} (strict={})",
            self.parent.qname(),
            self.options.strict
        );
        let mut state = ParseState {
            cursor: XmlCursor::new(source),
            stack: PathStack::new(),
        };
        state.stack.enter_absolute(&self.parent_path);
        let mut fragment = SchemaTree::new(
            tree.path().clone(),
            tree.content().clone(),
            tree.is_root_node(),
            tree.is_augmenting(),
        );

        let start = read_document_element(&mut state.cursor)?;
        if !self.parent_path.is_empty() && start.name != *self.parent.qname() {
            return Err(Error::UnknownElement {
                namespace: start.name.namespace().to_owned(),
                local_name: start.name.local_name().to_owned(),
                parent: String::new(),
            });
        }
        let parent = Rc::clone(&self.parent);
        let data = match parent.kind() {
            SchemaNodeKind::List { .. } => {
                let mut entry = CompositeData::named(start.name, Rc::clone(&parent), start.attributes);
                self.read_children(&mut state, &parent, &mut entry, &mut fragment)?;
                NodeData::List {
                    name: entry.name.clone(),
                    entries: vec![ListEntryData {
                        keys: entry.list_keys()?,
                        data: entry,
                    }],
                }
            }
            SchemaNodeKind::Leaf { .. } => NodeData::Leaf(self.read_value(&mut state, &parent, start)?),
            SchemaNodeKind::LeafList { .. } => NodeData::LeafList {
                name: parent.qname().clone(),
                entries: vec![self.read_value(&mut state, &parent, start)?],
            },
            SchemaNodeKind::Anyxml => NodeData::Anyxml(AnyxmlNode::read(&mut state.cursor, start)?),
            // Am Daten-Root bleibt der Name des Wrapper-Elements erhalten.
            _ => {
                let mut root = CompositeData::named(start.name, Rc::clone(&parent), start.attributes);
                self.read_children(&mut state, &parent, &mut root, &mut fragment)?;
                NodeData::Container(root)
            }
        };
        expect_document_end(&mut state.cursor)?;
        data.write(writer)?;
        writer.flush()?;

        tree.merge(fragment);
        if log_enabled!(Level::Debug) {
            debug!("schema tree now holds {} positions", tree.absolute_paths().len());
        }
        Ok(())
    }

    /// Reads the children of an open container-like element up to its end tag.
    fn read_children<R: BufRead>(
        &self,
        state: &mut ParseState<R>,
        schema: &SchemaNode,
        data: &mut CompositeData,
        tree: &mut SchemaTree,
    ) -> Result<()> {
        let mut namesakes: FastHashSet<QName> = FastHashSet::default();
        loop {
            let tag = match state.cursor.next_event()? {
                XmlEvent::Start(tag) => tag,
                XmlEvent::End => return Ok(()),
                XmlEvent::Text(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    return Err(Error::XmlParseError(format!(
                        "unexpected text {:?} inside {} at byte {}",
                        text.trim(),
                        schema.qname(),
                        state.cursor.position()
                    )));
                }
                XmlEvent::Eof => return Err(unexpected_eof()),
            };

            if !namesakes.insert(tag.name.clone()) {
                return Err(Error::DuplicateElement {
                    namespace: tag.name.namespace().to_owned(),
                    local_name: tag.name.local_name().to_owned(),
                    position: tag.position,
                });
            }

            let descent: Vec<Rc<SchemaNode>> = self
                .resolver
                .find_child_nodes(schema, tag.name.local_name(), tag.name.namespace())
                .into();
            let Some((target, wrappers)) = descent.split_last() else {
                if let Some(action) = schema.find_action(&tag.name) {
                    self.read_action(state, action, tag, data, tree)?;
                    continue;
                }
                let parent = current_position(&mut state.stack);
                if self.options.strict {
                    return Err(Error::UnknownElement {
                        namespace: tag.name.namespace().to_owned(),
                        local_name: tag.name.local_name().to_owned(),
                        parent,
                    });
                }
                warn!(
                    "skipping element {} with namespace {} at {}",
                    tag.name.local_name(),
                    tag.name.namespace(),
                    if parent.is_empty() { "/" } else { parent.as_str() }
                );
                state.cursor.skip_subtree()?;
                continue;
            };

            let mut child_tree = &mut *tree;
            for node in &descent {
                state.stack.enter(node.qname().clone());
                let path = state.stack.current_path()?;
                let (is_root, is_augmenting) = classify(&path);
                child_tree = child_tree.add_child(Rc::clone(node), is_root, is_augmenting, path);
            }

            let parent_data = data.descend(wrappers)?;
            self.read_node(state, target, tag, parent_data, child_tree)?;

            for _ in 0..descent.len() {
                state.stack.exit()?;
            }
        }
    }

    /// Reads the element `tag` (already consumed) into `parent` according to
    /// its schema node.
    fn read_node<R: BufRead>(
        &self,
        state: &mut ParseState<R>,
        schema: &Rc<SchemaNode>,
        tag: StartTag,
        parent: &mut CompositeData,
        tree: &mut SchemaTree,
    ) -> Result<()> {
        match schema.kind() {
            SchemaNodeKind::Container { .. } => {
                let mut container = CompositeData::new(Rc::clone(schema), tag.attributes);
                self.read_children(state, schema, &mut container, tree)?;
                parent.insert(NodeData::Container(container));
            }
            SchemaNodeKind::List { .. } => {
                let mut entries = Vec::new();
                let mut tag = tag;
                loop {
                    let mut entry = CompositeData::new(Rc::clone(schema), tag.attributes);
                    self.read_children(state, schema, &mut entry, tree)?;
                    entries.push(ListEntryData {
                        keys: entry.list_keys()?,
                        data: entry,
                    });
                    match next_namesake(&mut state.cursor, schema.qname())? {
                        Some(next) => tag = next,
                        None => break,
                    }
                }
                parent.insert(NodeData::List {
                    name: schema.qname().clone(),
                    entries,
                });
            }
            SchemaNodeKind::Leaf { .. } => {
                let leaf = self.read_value(state, schema, tag)?;
                parent.insert(NodeData::Leaf(leaf));
            }
            SchemaNodeKind::LeafList { .. } => {
                let mut entries = Vec::new();
                let mut tag = tag;
                loop {
                    entries.push(self.read_value(state, schema, tag)?);
                    match next_namesake(&mut state.cursor, schema.qname())? {
                        Some(next) => tag = next,
                        None => break,
                    }
                }
                parent.insert(NodeData::LeafList {
                    name: schema.qname().clone(),
                    entries,
                });
            }
            SchemaNodeKind::Anyxml => {
                let value = AnyxmlNode::read(&mut state.cursor, tag)?;
                parent.insert(NodeData::Anyxml(value));
            }
            SchemaNodeKind::Choice { .. } | SchemaNodeKind::Case { .. } => {
                return Err(Error::UnsupportedSchemaNode(format!(
                    "{} {} as parse target",
                    schema.kind_name(),
                    schema.qname()
                )));
            }
        }
        Ok(())
    }

    /// Reads the text of a leaf or leaf-list entry and decodes it while the
    /// element's namespace scope is still open.
    fn read_value<R: BufRead>(&self, state: &mut ParseState<R>, schema: &SchemaNode, tag: StartTag) -> Result<LeafData> {
        let text = match state.cursor.peek()? {
            XmlEvent::Text(_) => match state.cursor.next_event()? {
                XmlEvent::Text(text) => text,
                _ => String::new(),
            },
            _ => String::new(),
        };
        match state.cursor.peek()? {
            XmlEvent::End => {}
            XmlEvent::Start(child) => {
                return Err(Error::XmlParseError(format!(
                    "element {} inside {} {} at byte {}",
                    child.name,
                    schema.kind_name(),
                    schema.qname(),
                    child.position
                )));
            }
            XmlEvent::Text(_) | XmlEvent::Eof => return Err(unexpected_eof()),
        }
        let ty = schema
            .type_definition()
            .ok_or_else(|| Error::UnsupportedSchemaNode(format!("{} without type", schema.qname())))?;
        let value = self
            .decoder
            .decode(ty, state.cursor.namespaces(), &text)
            .map_err(|err| match err {
                Error::InvalidValue { message, .. } => Error::invalid_value(schema.qname().to_string(), message),
                other => other,
            })?;
        state.cursor.next_event()?;
        Ok(LeafData {
            name: schema.qname().clone(),
            value,
            attributes: tag.attributes,
        })
    }

    /// An action invocation: action position plus its `input` below it; the
    /// element's children are read against the input container.
    fn read_action<R: BufRead>(
        &self,
        state: &mut ParseState<R>,
        action: &Rc<ActionDefinition>,
        tag: StartTag,
        data: &mut CompositeData,
        tree: &mut SchemaTree,
    ) -> Result<()> {
        state.stack.enter(action.qname().clone());
        let path = state.stack.current_path()?;
        let (is_root, is_augmenting) = classify(&path);
        let action_tree = tree.add_action_child(Rc::clone(action), is_root, is_augmenting, path);

        let input = action.input();
        state.stack.enter(input.qname().clone());
        let path = state.stack.current_path()?;
        let (is_root, is_augmenting) = classify(&path);
        let input_tree = action_tree.add_child(Rc::clone(input), is_root, is_augmenting, path);

        let mut invocation = CompositeData::named(tag.name, Rc::clone(input), tag.attributes);
        self.read_children(state, input, &mut invocation, input_tree)?;
        data.insert(NodeData::Container(invocation));

        state.stack.exit()?;
        state.stack.exit()
    }
}

/// Root/augmenting flags of a position.
///
/// Pfadlaenge 1: Root, nicht augmentierend. Sonst entscheidet das Modul der
/// letzten beiden Segmente: gleich = verschachtelt, verschieden = Augmentation
/// (und damit Root einer eigenen Gruppe).
pub fn classify(path: &CompactPath) -> (bool, bool) {
    match path.parent() {
        None => (true, false),
        Some(parent) if parent.qname().same_module(path.qname()) => (false, false),
        Some(_) => (true, true),
    }
}

fn read_document_element<R: BufRead>(cursor: &mut XmlCursor<R>) -> Result<StartTag> {
    loop {
        match cursor.next_event()? {
            XmlEvent::Start(tag) => return Ok(tag),
            XmlEvent::Text(text) if text.trim().is_empty() => {}
            XmlEvent::Text(_) => {
                return Err(Error::XmlParseError("character data outside root element".into()));
            }
            XmlEvent::End => return Err(Error::XmlParseError("unexpected end tag".into())),
            XmlEvent::Eof => return Err(Error::XmlParseError("document has no root element".into())),
        }
    }
}

fn expect_document_end<R: BufRead>(cursor: &mut XmlCursor<R>) -> Result<()> {
    loop {
        match cursor.next_event()? {
            XmlEvent::Eof => return Ok(()),
            XmlEvent::Text(text) if text.trim().is_empty() => {}
            XmlEvent::Text(_) => {
                return Err(Error::XmlParseError("character data outside root element".into()));
            }
            XmlEvent::Start(tag) => {
                return Err(Error::XmlParseError(format!(
                    "second document element {} at byte {}",
                    tag.name, tag.position
                )));
            }
            XmlEvent::End => return Err(Error::XmlParseError("unexpected end tag".into())),
        }
    }
}

/// Consumes the next start tag if it repeats `name`'s local name
/// (whitespace in between is dropped).
fn next_namesake<R: BufRead>(cursor: &mut XmlCursor<R>, name: &QName) -> Result<Option<StartTag>> {
    loop {
        match cursor.peek()? {
            XmlEvent::Text(text) if text.trim().is_empty() => {
                cursor.next_event()?;
            }
            XmlEvent::Start(tag) if tag.name.local_name() == name.local_name() => {
                return match cursor.next_event()? {
                    XmlEvent::Start(tag) => Ok(Some(tag)),
                    _ => Ok(None),
                };
            }
            _ => return Ok(None),
        }
    }
}

fn current_position(stack: &mut PathStack) -> String {
    if stack.is_empty() {
        return String::new();
    }
    stack.current_path().map(|p| p.to_string()).unwrap_or_default()
}

fn display_path(path: &[QName]) -> String {
    path.iter().map(|q| format!("/{q}")).collect()
}
