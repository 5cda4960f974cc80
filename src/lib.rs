//! yangtrack – instance-tracking parser for YANG sample data
//!
//! Liest Instanzdokumente gegen ein bereits aufgeloestes Schema-Modell,
//! normalisiert die Daten fuer einen [`NormalizedNodeWriter`] und baut
//! nebenbei einen [`SchemaTree`] aller beruehrten Schema-Positionen auf.
//!
//! # Beispiel
//!
//! ```
//! use yangtrack::{QName, SchemaTree, TrackingParser, XmlNodeWriter};
//! use yangtrack::schema::{Module, SchemaContext, SchemaNode, TypeDefinition};
//! use yangtrack::format::render_tree;
//! use yangtrack::options::TreeOptions;
//!
//! let ns = "urn:example:system";
//! let q = |local: &str| QName::new(ns, local);
//! let ctx = SchemaContext::builder()
//!     .module(Module::new("example-system", "sys", ns))
//!     .node(SchemaNode::container(q("system"))
//!         .with_child(SchemaNode::leaf(q("hostname"), TypeDefinition::String))
//!         .with_child(SchemaNode::leaf(q("contact"), TypeDefinition::String)))
//!     .build()
//!     .unwrap();
//!
//! let mut tree = SchemaTree::root();
//! let mut out = XmlNodeWriter::new(Vec::new());
//! TrackingParser::new(&ctx)
//!     .parse_str(
//!         r#"<data><system xmlns="urn:example:system"><hostname>r1</hostname></system></data>"#,
//!         &mut out,
//!         &mut tree,
//!     )
//!     .unwrap();
//!
//! let text = render_tree(&ctx, &tree, "example-system", &TreeOptions::default()).unwrap();
//! assert_eq!(text, "module: example-system\n  +--rw system\n     +--rw hostname?   string\n");
//! ```

pub mod anyxml;
pub mod error;
pub mod format;
pub mod namespace;
pub mod options;
pub mod parser;
pub mod path;
pub mod qname;
pub mod schema;
pub mod tree;
pub mod value;
pub mod writer;

pub(crate) mod data;
pub(crate) mod xml;

pub use error::{Error, ErrorCategory, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent, fuer interne Datenstrukturen).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// HashSet mit ahash.
pub(crate) type FastHashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API: Parser
pub use options::{TrackingOptions, TreeOptions};
pub use parser::TrackingParser;

// Public API: Schema
pub use qname::QName;
pub use schema::{ActionDefinition, Module, NotificationDefinition, SchemaContext, SchemaNode, SchemaNodeKind};

// Public API: Tracking result
pub use path::{AbsolutePath, CompactPath, PathStack};
pub use tree::{SchemaTree, TreeContent};

// Public API: Output
pub use anyxml::AnyxmlNode;
pub use value::{BuiltinDecoder, TypedValue, ValueDecoder};
pub use writer::{EventRecorder, NormalizedNodeWriter, WriteEvent, XmlNodeWriter};
