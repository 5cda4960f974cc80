//! XML input and output plumbing.
//!
//! Uses quick-xml for reading; output is written directly with memchr-based
//! escaping.

mod cursor;
mod escape;

pub(crate) use cursor::{StartTag, XmlCursor, XmlEvent, unexpected_eof};
pub(crate) use escape::{w, write_attributes, write_escaped_attr, write_escaped_text};
