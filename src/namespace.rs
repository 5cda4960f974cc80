//! In-scope XML namespace bindings.
//!
//! Die Bindungen werden vom XML-Cursor beim Konsumieren von Start-/End-Tags
//! gepflegt und dem Value Decoder uebergeben, damit prefixierte Werte
//! (identityref, instance-identifier) aufgeloest werden koennen.

use std::rc::Rc;

use crate::FastIndexMap;

/// Namespace des `xml` Prefix (immer gebunden).
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix → namespace bindings, innermost scope last.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    scopes: Vec<Vec<(Rc<str>, Rc<str>)>>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oeffnet einen Scope mit den Deklarationen eines Start-Tags.
    /// Der Default-Namespace wird mit leerem Prefix gespeichert.
    pub fn push_scope(&mut self, bindings: Vec<(Rc<str>, Rc<str>)>) {
        self.scopes.push(bindings);
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Resolves a prefix (empty = default namespace).
    ///
    /// Ein leerer Default-Namespace (`xmlns=""`) hebt die Bindung auf.
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| &**p == prefix)
            .map(|(_, uri)| &**uri)
            .filter(|uri| !uri.is_empty())
    }

    /// Default-Namespace (leerer Prefix).
    pub fn default_namespace(&self) -> Option<&str> {
        self.lookup("")
    }

    /// Alle sichtbaren Bindungen, innere Scopes ueberschreiben aeussere.
    /// Aufgehobene Bindungen (leere URI) fehlen.
    pub fn in_scope(&self) -> Vec<(Rc<str>, Rc<str>)> {
        let mut visible: FastIndexMap<Rc<str>, Rc<str>> = FastIndexMap::default();
        for (prefix, uri) in self.scopes.iter().flatten() {
            visible.insert(Rc::clone(prefix), Rc::clone(uri));
        }
        visible.into_iter().filter(|(_, uri)| !uri.is_empty()).collect()
    }

    /// Baut einen Kontext aus festen Bindungen (fuer Aufrufer ohne XML-Quelle).
    pub fn from_bindings<'a>(bindings: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let scope = bindings
            .into_iter()
            .map(|(p, uri)| (Rc::from(p), Rc::from(uri)))
            .collect();
        Self { scopes: vec![scope] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope(vec![(Rc::from("if"), Rc::from("urn:outer")), (Rc::from(""), Rc::from("urn:default"))]);
        ctx.push_scope(vec![(Rc::from("if"), Rc::from("urn:inner"))]);
        assert_eq!(ctx.lookup("if"), Some("urn:inner"));
        assert_eq!(ctx.default_namespace(), Some("urn:default"));
        ctx.pop_scope();
        assert_eq!(ctx.lookup("if"), Some("urn:outer"));
        assert_eq!(ctx.lookup("nope"), None);
    }

    #[test]
    fn in_scope_flattens_with_shadowing() {
        let mut ctx = NamespaceContext::from_bindings([("p", "urn:outer"), ("q", "urn:q")]);
        ctx.push_scope(vec![(Rc::from("p"), Rc::from("urn:inner")), (Rc::from(""), Rc::from(""))]);
        let visible = ctx.in_scope();
        assert_eq!(visible.len(), 2);
        assert!(visible.contains(&(Rc::from("p"), Rc::from("urn:inner"))));
        assert!(visible.contains(&(Rc::from("q"), Rc::from("urn:q"))));
    }

    #[test]
    fn xml_prefix_is_predeclared() {
        assert_eq!(NamespaceContext::new().lookup("xml"), Some(XML_NAMESPACE));
    }

    #[test]
    fn empty_default_unbinds() {
        let mut ctx = NamespaceContext::from_bindings([("", "urn:a")]);
        ctx.push_scope(vec![(Rc::from(""), Rc::from(""))]);
        assert_eq!(ctx.default_namespace(), None);
    }
}
