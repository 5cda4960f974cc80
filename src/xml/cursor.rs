use std::collections::VecDeque;
use std::io::BufRead;
use std::rc::Rc;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName as XmlQName, ResolveResult};
use quick_xml::reader::NsReader;

use crate::namespace::NamespaceContext;
use crate::qname::QName;
use crate::{Error, Result};

/// Start-Tag mit aufgeloesten Namen.
#[derive(Debug, Clone)]
pub(crate) struct StartTag {
    pub(crate) name: QName,
    /// Attribute ohne Namespace-Deklarationen.
    pub(crate) attributes: Vec<(QName, Rc<str>)>,
    /// `(prefix, uri)`; leerer Prefix = Default-Namespace.
    pub(crate) namespace_decls: Vec<(Rc<str>, Rc<str>)>,
    /// Byte-Offset nach dem Start-Tag.
    pub(crate) position: u64,
}

#[derive(Debug, Clone)]
pub(crate) enum XmlEvent {
    Start(StartTag),
    End,
    /// Zusammengefasster Text (Text, CDATA, Referenzen), unveraendert.
    Text(String),
    Eof,
}

/// Forward-only event cursor over an XML document with one event of
/// lookahead.
///
/// Namespace-Scopes werden beim Konsumieren (nicht beim Peeken) eines
/// Start-/End-Events gepflegt, damit `namespaces()` immer den Kontext des
/// zuletzt geoeffneten Elements liefert.
pub(crate) struct XmlCursor<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    lookahead: VecDeque<XmlEvent>,
    namespaces: NamespaceContext,
    finished: bool,
}

impl<R: BufRead> XmlCursor<R> {
    pub(crate) fn new(source: R) -> Self {
        let mut reader = NsReader::from_reader(source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;
        config.check_end_names = true;
        Self {
            reader,
            buf: Vec::new(),
            lookahead: VecDeque::with_capacity(2),
            namespaces: NamespaceContext::new(),
            finished: false,
        }
    }

    pub(crate) fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    pub(crate) fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    pub(crate) fn peek(&mut self) -> Result<&XmlEvent> {
        self.fill()?;
        self.lookahead
            .front()
            .ok_or_else(|| Error::XmlParseError("event lookahead is empty".into()))
    }

    pub(crate) fn next_event(&mut self) -> Result<XmlEvent> {
        self.fill()?;
        let event = self
            .lookahead
            .pop_front()
            .ok_or_else(|| Error::XmlParseError("event lookahead is empty".into()))?;
        match &event {
            XmlEvent::Start(tag) => self.namespaces.push_scope(tag.namespace_decls.clone()),
            XmlEvent::End => self.namespaces.pop_scope(),
            XmlEvent::Text(_) | XmlEvent::Eof => {}
        }
        Ok(event)
    }

    /// Ueberspringt den Rest eines bereits geoeffneten Elements.
    ///
    /// Zaehlt nur die Tiefe, nie Namen: Nachfahren duerfen den Namen des
    /// uebersprungenen Elements wiederholen.
    pub(crate) fn skip_subtree(&mut self) -> Result<()> {
        let mut depth = 1usize;
        loop {
            match self.next_event()? {
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                XmlEvent::Text(_) => {}
                XmlEvent::Eof => return Err(unexpected_eof()),
            }
        }
    }

    /// Liest Rohevents bis mindestens ein Event im Lookahead liegt.
    fn fill(&mut self) -> Result<()> {
        if !self.lookahead.is_empty() {
            return Ok(());
        }
        if self.finished {
            self.lookahead.push_back(XmlEvent::Eof);
            return Ok(());
        }
        let mut pending_text: Option<String> = None;
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(Error::XmlParseError(format!(
                        "parse XML error at {}: {e}",
                        self.reader.error_position()
                    )));
                }
            };
            let next = match event {
                Event::Start(e) => {
                    let tag = read_start(&self.reader, &e, self.reader.buffer_position() as u64)?;
                    XmlEvent::Start(tag)
                }
                Event::End(_) => XmlEvent::End,
                Event::Empty(_) => {
                    // expand_empty_elements liefert Start+End
                    return Err(Error::XmlParseError("unexpected empty element event".into()));
                }
                Event::Text(e) => {
                    let raw = std::str::from_utf8(&e).map_err(|er| Error::XmlParseError(er.to_string()))?;
                    let text = quick_xml::escape::unescape(raw).map_err(|er| Error::XmlParseError(er.to_string()))?;
                    coalesce(&mut pending_text, &text);
                    continue;
                }
                Event::CData(e) => {
                    let raw = std::str::from_utf8(&e).map_err(|er| Error::XmlParseError(er.to_string()))?;
                    coalesce(&mut pending_text, raw);
                    continue;
                }
                Event::GeneralRef(e) => {
                    let name = std::str::from_utf8(&e).map_err(|er| Error::XmlParseError(er.to_string()))?;
                    if let Some(ch) = name.strip_prefix('#').and_then(resolve_char_reference) {
                        let mut utf8 = [0u8; 4];
                        coalesce(&mut pending_text, ch.encode_utf8(&mut utf8));
                    } else if let Some(resolved) = resolve_predefined_entity(name) {
                        coalesce(&mut pending_text, resolved);
                    } else {
                        return Err(Error::XmlParseError(format!("undeclared entity &{name};")));
                    }
                    continue;
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => continue,
                Event::Eof => {
                    self.finished = true;
                    XmlEvent::Eof
                }
            };
            if let Some(text) = pending_text.take() {
                self.lookahead.push_back(XmlEvent::Text(text));
            }
            self.lookahead.push_back(next);
            return Ok(());
        }
    }
}

fn coalesce(pending: &mut Option<String>, value: &str) {
    match pending {
        Some(existing) => existing.push_str(value),
        None => *pending = Some(value.to_owned()),
    }
}

pub(crate) fn unexpected_eof() -> Error {
    Error::XmlParseError("unexpected end of document".into())
}

fn read_start<R: BufRead>(reader: &NsReader<R>, e: &BytesStart<'_>, position: u64) -> Result<StartTag> {
    let (ns, local) = reader.resolver().resolve_element(e.name());
    let name = QName::new(resolve_to_uri(ns)?, utf8(local.as_ref())?);

    let mut attributes = Vec::new();
    let mut namespace_decls = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|er| Error::XmlParseError(er.to_string()))?;
        let key = attr.key.as_ref();
        let raw = utf8(attr.value.as_ref())?;
        let value: Rc<str> = Rc::from(
            quick_xml::escape::unescape(raw)
                .map_err(|er| Error::XmlParseError(er.to_string()))?
                .as_ref(),
        );
        if key == b"xmlns" {
            namespace_decls.push((Rc::from(""), value));
            continue;
        }
        if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            namespace_decls.push((Rc::from(utf8(prefix)?), value));
            continue;
        }
        let (ns, local) = reader.resolver().resolve_attribute(XmlQName(key));
        attributes.push((QName::new(resolve_to_uri(ns)?, utf8(local.as_ref())?), value));
    }
    Ok(StartTag {
        name,
        attributes,
        namespace_decls,
        position,
    })
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|er| Error::XmlParseError(er.to_string()))
}

fn resolve_to_uri(ns: ResolveResult<'_>) -> Result<String> {
    match ns {
        ResolveResult::Bound(ns) => Ok(utf8(ns.as_ref())?.to_owned()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(Error::XmlParseError(format!(
            "unknown namespace prefix {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// `49` (dezimal) oder `x31` (hexadezimal), ohne `&#` und `;`.
fn resolve_char_reference(digits: &str) -> Option<char> {
    let code_point = if let Some(hex) = digits.strip_prefix('x') {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code_point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(xml: &str) -> XmlCursor<&[u8]> {
        XmlCursor::new(xml.as_bytes())
    }

    fn start_name(event: XmlEvent) -> String {
        match event {
            XmlEvent::Start(tag) => tag.name.to_string(),
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    fn coalesces_text_across_references_and_comments() {
        let mut c = cursor("<a>x &amp; <!-- c --><![CDATA[<y>]]>&#65;</a>");
        assert_eq!(start_name(c.next_event().unwrap()), "a");
        match c.next_event().unwrap() {
            XmlEvent::Text(t) => assert_eq!(t, "x & <y>A"),
            other => panic!("{other:?}"),
        }
        assert!(matches!(c.next_event().unwrap(), XmlEvent::End));
        assert!(matches!(c.next_event().unwrap(), XmlEvent::Eof));
        assert!(matches!(c.next_event().unwrap(), XmlEvent::Eof));
    }

    #[test]
    fn empty_elements_are_expanded() {
        let mut c = cursor(r#"<a xmlns="urn:a"><b/></a>"#);
        assert_eq!(start_name(c.next_event().unwrap()), "{urn:a}a");
        assert_eq!(start_name(c.next_event().unwrap()), "{urn:a}b");
        assert!(matches!(c.next_event().unwrap(), XmlEvent::End));
        assert!(matches!(c.next_event().unwrap(), XmlEvent::End));
    }

    #[test]
    fn namespace_scopes_follow_consumption() {
        let mut c = cursor(r#"<a xmlns:p="urn:p"><b xmlns:p="urn:q">p:x</b></a>"#);
        c.next_event().unwrap();
        assert_eq!(c.namespaces().lookup("p"), Some("urn:p"));
        // Peek oeffnet noch keinen Scope
        assert!(matches!(c.peek().unwrap(), XmlEvent::Start(_)));
        assert_eq!(c.namespaces().lookup("p"), Some("urn:p"));
        c.next_event().unwrap();
        assert_eq!(c.namespaces().lookup("p"), Some("urn:q"));
        c.next_event().unwrap();
        c.next_event().unwrap();
        assert_eq!(c.namespaces().lookup("p"), Some("urn:p"));
    }

    #[test]
    fn attributes_are_resolved_and_declarations_split() {
        let mut c = cursor(r#"<a xmlns="urn:a" xmlns:m="urn:m" m:op="merge" plain="1"/>"#);
        match c.next_event().unwrap() {
            XmlEvent::Start(tag) => {
                assert_eq!(tag.namespace_decls.len(), 2);
                assert_eq!(tag.attributes[0].0, QName::new("urn:m", "op"));
                assert_eq!(&*tag.attributes[0].1, "merge");
                // Attribute ohne Prefix haben keinen Namespace
                assert_eq!(tag.attributes[1].0, QName::new("", "plain"));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn skip_counts_depth_only() {
        let mut c = cursor("<r><u><u>x</u></u><k/></r>");
        c.next_event().unwrap();
        c.next_event().unwrap();
        c.skip_subtree().unwrap();
        assert_eq!(start_name(c.next_event().unwrap()), "k");
    }

    #[test]
    fn malformed_input_is_structural() {
        let mut c = cursor("<a><b></a>");
        let err = loop {
            match c.next_event() {
                Ok(XmlEvent::Eof) => panic!("no error"),
                Ok(_) => {}
                Err(e) => break e,
            }
        };
        assert_eq!(err.category(), crate::ErrorCategory::Structural);
    }
}
