//! Central error types for the tracking parser and its collaborators.
//!
//! Each variant belongs to exactly one [`ErrorCategory`]; callers that only
//! care whether a failure was structural, schema-related or a bad value can
//! match on [`Error::category`] instead of the individual variants.

use core::fmt;
use std::borrow::Cow;

/// Grobe Einordnung eines Fehlers.
///
/// Alle Kategorien ausser `SchemaMismatch` im lenient-Modus brechen das
/// aktuelle Dokument ab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed input, duplicate siblings, unbalanced tags.
    Structural,
    /// An element has no counterpart in the schema model.
    SchemaMismatch,
    /// Element text could not be decoded against its declared type.
    Value,
    /// Invariant violation inside the parser (should not occur).
    Internal,
    /// A lookup in the supplied schema model failed.
    Model,
    /// Reading the source or writing normalized output failed.
    Io,
}

/// All errors raised while tracking instance documents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// XML reader error or otherwise malformed document structure.
    XmlParseError(String),
    /// The same (namespace, local-name) pair appeared twice below one parent.
    DuplicateElement {
        namespace: String,
        local_name: String,
        /// Byte-Offset im Dokument (Position nach dem Start-Tag).
        position: u64,
    },
    /// A list entry lacks one of its key leaves.
    MissingListKey { list: String, key: String },
    /// An element could not be resolved against the schema (strict mode only).
    UnknownElement {
        namespace: String,
        local_name: String,
        /// Schema-Position des Elternknotens (leer am Dokument-Root).
        parent: String,
    },
    /// Element text does not match the declared type.
    InvalidValue {
        /// Knoten dessen Wert nicht dekodiert werden konnte.
        node: String,
        message: Cow<'static, str>,
    },
    /// A schema node of an unsupported kind was reached as a parse target.
    UnsupportedSchemaNode(String),
    /// `PathStack::current_path()` on an empty stack.
    EmptyPathStack,
    /// The requested parse parent is a choice or case, which has no element
    /// of its own.
    InvalidParent { path: String, kind: &'static str },
    /// A module, node or augment target is missing from the schema model.
    NotFound { what: Cow<'static, str>, name: String },
    /// Reading the input failed.
    IoError(String),
    /// The downstream normalized-node writer failed.
    WriterError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XmlParseError(msg) => write!(f, "XML parse error: {msg}"),
            Self::DuplicateElement { namespace, local_name, position } => write!(
                f,
                "duplicate namespace \"{namespace}\" element \"{local_name}\" in XML input at byte {position}"
            ),
            Self::MissingListKey { list, key } => {
                write!(f, "list entry {list} is missing key leaf {key}")
            }
            Self::UnknownElement { namespace, local_name, parent } => {
                if parent.is_empty() {
                    write!(f, "schema for node with name {local_name} and namespace {namespace} does not exist")
                } else {
                    write!(
                        f,
                        "schema for node with name {local_name} and namespace {namespace} does not exist at {parent}"
                    )
                }
            }
            Self::InvalidValue { node, message } => {
                write!(f, "invalid value for {node}: {message}")
            }
            Self::UnsupportedSchemaNode(what) => write!(f, "unsupported schema node type {what}"),
            Self::EmptyPathStack => write!(f, "path stack is empty"),
            Self::InvalidParent { path, kind } => write!(f, "{kind} {path} cannot be the parent of a document"),
            Self::NotFound { what, name } => write!(f, "{what}, {name} not found"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::WriterError(msg) => write!(f, "normalized node writer failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl Error {
    /// Kategorie gemaess Fehler-Taxonomie.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::XmlParseError(_) | Self::DuplicateElement { .. } | Self::MissingListKey { .. } => {
                ErrorCategory::Structural
            }
            Self::UnknownElement { .. } => ErrorCategory::SchemaMismatch,
            Self::InvalidValue { .. } => ErrorCategory::Value,
            Self::UnsupportedSchemaNode(_) | Self::EmptyPathStack => ErrorCategory::Internal,
            Self::NotFound { .. } | Self::InvalidParent { .. } => ErrorCategory::Model,
            Self::IoError(_) | Self::WriterError(_) => ErrorCategory::Io,
        }
    }

    /// Erstellt einen `InvalidValue` Fehler.
    pub fn invalid_value(node: impl Into<String>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidValue {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Erstellt einen `NotFound` Fehler.
    pub fn not_found(what: impl Into<Cow<'static, str>>, name: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    /// Erstellt einen `WriterError` aus einem beliebigen Fehler des Writers.
    pub fn writer(err: impl fmt::Display) -> Self {
        Self::WriterError(err.to_string())
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        let dup = Error::DuplicateElement {
            namespace: "urn:a".into(),
            local_name: "name".into(),
            position: 12,
        };
        assert_eq!(dup.category(), ErrorCategory::Structural);
        let unknown = Error::UnknownElement {
            namespace: "urn:a".into(),
            local_name: "x".into(),
            parent: String::new(),
        };
        assert_eq!(unknown.category(), ErrorCategory::SchemaMismatch);
        assert_eq!(Error::invalid_value("{urn:a}mtu", "out of range").category(), ErrorCategory::Value);
        assert_eq!(Error::EmptyPathStack.category(), ErrorCategory::Internal);
        assert_eq!(Error::not_found("Module", "foo").category(), ErrorCategory::Model);
        assert_eq!(Error::writer("closed").category(), ErrorCategory::Io);
    }

    #[test]
    fn display_mentions_position_and_names() {
        let dup = Error::DuplicateElement {
            namespace: "urn:a".into(),
            local_name: "name".into(),
            position: 42,
        };
        let msg = dup.to_string();
        assert!(msg.contains("\"urn:a\""));
        assert!(msg.contains("\"name\""));
        assert!(msg.contains("42"));
        assert_eq!(Error::not_found("Module", "foo").to_string(), "Module, foo not found");
    }
}
