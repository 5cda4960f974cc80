//! XML-Escaping fuer Text und Attributwerte.

use std::io::Write;
use std::rc::Rc;

use crate::namespace::XML_NAMESPACE;
use crate::qname::QName;
use crate::{Error, Result};

/// Schreibt einen String als Bytes in den Writer.
#[inline]
pub(crate) fn w(writer: &mut impl Write, s: &str) -> Result<()> {
    writer.write_all(s.as_bytes()).map_err(Error::writer)
}

/// Sucht drei Zeichen gleichzeitig (memchr3) und ersetzt sie.
/// Bloecke ohne Escape-Zeichen werden in einem Stueck geschrieben.
fn write_escaped_memchr3(
    writer: &mut impl Write,
    s: &str,
    needle: [u8; 3],
    replacement: [&[u8]; 3],
) -> Result<()> {
    let bytes = s.as_bytes();
    let mut start = 0;
    while let Some(offset) = memchr::memchr3(needle[0], needle[1], needle[2], &bytes[start..]) {
        let pos = start + offset;
        writer.write_all(&bytes[start..pos]).map_err(Error::writer)?;
        let idx = needle.iter().position(|&n| n == bytes[pos]).unwrap_or(0);
        writer.write_all(replacement[idx]).map_err(Error::writer)?;
        start = pos + 1;
    }
    writer.write_all(&bytes[start..]).map_err(Error::writer)
}

/// Text-Inhalt: & < > → &amp; &lt; &gt;
pub(crate) fn write_escaped_text(writer: &mut impl Write, s: &str) -> Result<()> {
    write_escaped_memchr3(writer, s, [b'&', b'<', b'>'], [b"&amp;", b"&lt;", b"&gt;"])
}

/// Attributwerte: & < " → &amp; &lt; &quot;
pub(crate) fn write_escaped_attr(writer: &mut impl Write, s: &str) -> Result<()> {
    write_escaped_memchr3(writer, s, [b'&', b'<', b'"'], [b"&amp;", b"&lt;", b"&quot;"])
}

/// Schreibt Attribute; Namespaces ausser `xml` bekommen lokal deklarierte
/// Prefixe `a0`, `a1`, ...
pub(crate) fn write_attributes(writer: &mut impl Write, attributes: &[(QName, Rc<str>)]) -> Result<()> {
    let mut declared: Vec<&str> = Vec::new();
    for (attr, value) in attributes {
        w(writer, " ")?;
        let namespace = attr.namespace();
        if namespace == XML_NAMESPACE {
            w(writer, "xml:")?;
        } else if !namespace.is_empty() {
            let idx = match declared.iter().position(|ns| *ns == namespace) {
                Some(idx) => idx,
                None => {
                    declared.push(namespace);
                    let idx = declared.len() - 1;
                    w(writer, &format!("xmlns:a{idx}=\""))?;
                    write_escaped_attr(writer, namespace)?;
                    w(writer, "\" ")?;
                    idx
                }
            };
            w(writer, &format!("a{idx}:"))?;
        }
        w(writer, attr.local_name())?;
        w(writer, "=\"")?;
        write_escaped_attr(writer, value)?;
        w(writer, "\"")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> String {
        let mut out = Vec::new();
        write_escaped_text(&mut out, s).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(text("a<b & c>d"), "a&lt;b &amp; c&gt;d");
        assert_eq!(text("plain"), "plain");
        let mut out = Vec::new();
        write_escaped_attr(&mut out, "say \"hi\" & <bye>").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "say &quot;hi&quot; &amp; &lt;bye>");
    }
}
