//! Qualified names of schema definitions.
//!
//! A [`QName`] is the pair (namespace, local-name). The namespace doubles as
//! the module identity: two names belong to the same module exactly when their
//! namespaces are equal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ahash::AHasher;

/// Qualified name: Namespace + local-name.
///
/// Namespace und local-name sind `Rc<str>`, damit Klone (Pfade, Baumknoten,
/// Datenknoten halten alle QNames) nur Refcount-Inkremente kosten.
#[derive(Clone)]
pub struct QName {
    /// The namespace URI. Empty string means no namespace.
    pub namespace: Rc<str>,
    /// The local name.
    pub local_name: Rc<str>,
    /// Vorberechneter Hash von (namespace, local_name).
    identity: u64,
}

/// Berechnet den Identity-Hash fuer ein QName (namespace + local_name).
fn compute_identity(namespace: &str, local_name: &str) -> u64 {
    let mut hasher = AHasher::default();
    namespace.hash(&mut hasher);
    local_name.hash(&mut hasher);
    hasher.finish()
}

impl QName {
    /// Creates a new QName from namespace and local-name.
    pub fn new(namespace: impl Into<Rc<str>>, local_name: impl Into<Rc<str>>) -> Self {
        let namespace = namespace.into();
        let local_name = local_name.into();
        let identity = compute_identity(&namespace, &local_name);
        Self {
            namespace,
            local_name,
            identity,
        }
    }

    /// Erstellt einen QName im selben Modul (Namespace wird geteilt, nicht kopiert).
    pub fn sibling(&self, local_name: impl Into<Rc<str>>) -> Self {
        Self::new(Rc::clone(&self.namespace), local_name)
    }

    /// The module this name belongs to (its namespace).
    pub fn module(&self) -> &str {
        &self.namespace
    }

    /// Ob beide Namen zum selben Modul gehoeren.
    pub fn same_module(&self, other: &QName) -> bool {
        self.namespace == other.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
            && self.namespace == other.namespace
            && self.local_name == other.local_name
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Sortierung: erst local_name, dann namespace.
impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.local_name
            .cmp(&other.local_name)
            .then_with(|| self.namespace.cmp(&other.namespace))
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QName({self})")
    }
}

/// Display in Clark-Notation: `{namespace}local`, ohne Namespace nur `local`.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_sharing() {
        let a = QName::new("urn:a", "x");
        let b = QName::new(String::from("urn:a"), String::from("x"));
        assert_eq!(a, b);
        assert_ne!(a, QName::new("urn:b", "x"));
        assert_ne!(a, a.sibling("y"));
    }

    #[test]
    fn ordering_local_name_first() {
        let a = QName::new("urn:z", "alpha");
        let b = QName::new("urn:a", "beta");
        assert!(a < b);
        let c = QName::new("urn:a", "alpha");
        assert!(c < a);
    }

    #[test]
    fn module_comparison() {
        let a = QName::new("urn:a", "x");
        assert!(a.same_module(&a.sibling("y")));
        assert!(!a.same_module(&QName::new("urn:b", "x")));
        assert_eq!(a.module(), "urn:a");
    }

    #[test]
    fn clark_notation() {
        assert_eq!(QName::new("urn:a", "x").to_string(), "{urn:a}x");
        assert_eq!(QName::new("", "x").to_string(), "x");
    }
}
