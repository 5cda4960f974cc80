//! Schema positions as parent-linked paths.
//!
//! [`CompactPath`] is an immutable, reference-shared singly linked list of
//! [`QName`]s. Extending a path allocates one node and never touches the
//! parent, so many siblings created during a deep traversal share one prefix.
//! The absolute form ([`AbsolutePath`]) is only materialized on request and
//! memoized per node.
//!
//! [`PathStack`] mirrors the current nesting while parsing and folds pending
//! names into `CompactPath`s lazily.

use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

use ahash::AHasher;

use crate::qname::QName;
use crate::{Error, Result};

// ============================================================================
// AbsolutePath
// ============================================================================

/// Geordnete QName-Sequenz von der Wurzel bis zu einer Schema-Position.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbsolutePath(Rc<[QName]>);

impl AbsolutePath {
    pub fn new(qnames: impl Into<Rc<[QName]>>) -> Self {
        Self(qnames.into())
    }

    pub fn as_slice(&self) -> &[QName] {
        &self.0
    }

    /// Pfad ohne das letzte Segment (leer fuer Pfade der Laenge 1).
    pub fn parent_segments(&self) -> &[QName] {
        match self.0.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

impl Deref for AbsolutePath {
    type Target = [QName];

    fn deref(&self) -> &[QName] {
        &self.0
    }
}

impl From<Vec<QName>> for AbsolutePath {
    fn from(qnames: Vec<QName>) -> Self {
        Self(qnames.into())
    }
}

impl fmt::Debug for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbsolutePath({self})")
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for qname in self.0.iter() {
            write!(f, "/{qname}")?;
        }
        Ok(())
    }
}

// ============================================================================
// CompactPath
// ============================================================================

struct PathNode {
    qname: QName,
    parent: Option<CompactPath>,
    depth: usize,
    /// Kumulativer Hash ueber alle Segmente ab der Wurzel.
    hash: u64,
    absolute: OnceCell<AbsolutePath>,
}

/// A compact, shareable representation of a schema tree position.
#[derive(Clone)]
pub struct CompactPath(Rc<PathNode>);

impl CompactPath {
    /// Creates a root path consisting of a single name.
    pub fn of(qname: QName) -> Self {
        Self::with_parent(qname, None)
    }

    /// Returns a new path extending `self` by one name. `self` is unchanged.
    pub fn child(&self, qname: QName) -> Self {
        Self::with_parent(qname, Some(self.clone()))
    }

    fn with_parent(qname: QName, parent: Option<CompactPath>) -> Self {
        let mut hasher = AHasher::default();
        if let Some(parent) = &parent {
            parent.0.hash.hash(&mut hasher);
        }
        qname.hash(&mut hasher);
        let depth = parent.as_ref().map_or(1, |p| p.0.depth + 1);
        Self(Rc::new(PathNode {
            qname,
            parent,
            depth,
            hash: hasher.finish(),
            absolute: OnceCell::new(),
        }))
    }

    /// Der letzte Name des Pfads.
    pub fn qname(&self) -> &QName {
        &self.0.qname
    }

    pub fn parent(&self) -> Option<&CompactPath> {
        self.0.parent.as_ref()
    }

    /// Anzahl Segmente (>= 1).
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// Materializes the ordered name sequence from the root.
    ///
    /// Walks the parent links once per node; later calls return the memoized
    /// result.
    pub fn to_absolute(&self) -> AbsolutePath {
        self.0
            .absolute
            .get_or_init(|| {
                let mut qnames = Vec::with_capacity(self.0.depth);
                let mut walk = Some(self);
                while let Some(node) = walk {
                    qnames.push(node.0.qname.clone());
                    walk = node.0.parent.as_ref();
                }
                qnames.reverse();
                AbsolutePath::from(qnames)
            })
            .clone()
    }

    /// Iteriert von diesem Knoten Richtung Wurzel.
    pub fn ancestors(&self) -> impl Iterator<Item = &CompactPath> {
        std::iter::successors(Some(self), |p| p.parent())
    }
}

impl PartialEq for CompactPath {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        if self.0.depth != other.0.depth || self.0.hash != other.0.hash {
            return false;
        }
        self.ancestors()
            .zip(other.ancestors())
            .all(|(a, b)| Rc::ptr_eq(&a.0, &b.0) || a.0.qname == b.0.qname)
    }
}

impl Eq for CompactPath {}

impl Hash for CompactPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl fmt::Debug for CompactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompactPath({})", self.to_absolute())
    }
}

impl fmt::Display for CompactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_absolute(), f)
    }
}

// ============================================================================
// PathStack
// ============================================================================

enum PathItem {
    Name(QName),
    Path(CompactPath),
}

/// Push/pop stack tracking the current schema position during a parse.
///
/// Jede Ebene ist entweder ein noch nicht gefalteter Name oder ein bereits
/// materialisierter [`CompactPath`]. `current_path()` faltet nur die Namen
/// oberhalb des obersten materialisierten Eintrags.
#[derive(Default)]
pub struct PathStack {
    stack: Vec<PathItem>,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Pushes one plain name.
    pub fn enter(&mut self, qname: QName) {
        self.stack.push(PathItem::Name(qname));
    }

    /// Replaces the whole stack with an absolute sequence, one level per name.
    pub fn enter_absolute(&mut self, path: &[QName]) {
        self.clear();
        self.stack
            .extend(path.iter().cloned().map(PathItem::Name));
    }

    /// Pops one level.
    pub fn exit(&mut self) -> Result<()> {
        self.stack.pop().map(|_| ()).ok_or(Error::EmptyPathStack)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The path of the innermost level.
    ///
    /// Pending names are folded into `CompactPath`s in place, so repeated
    /// calls without an intervening `enter` are O(1).
    pub fn current_path(&mut self) -> Result<CompactPath> {
        let folded = self
            .stack
            .iter()
            .rposition(|item| matches!(item, PathItem::Path(_)));
        let mut path = match folded {
            Some(idx) => match &self.stack[idx] {
                PathItem::Path(p) => Some(p.clone()),
                PathItem::Name(_) => None,
            },
            None => None,
        };
        let start = folded.map_or(0, |idx| idx + 1);
        for item in &mut self.stack[start..] {
            if let PathItem::Name(qname) = item {
                let next = match &path {
                    Some(parent) => parent.child(qname.clone()),
                    None => CompactPath::of(qname.clone()),
                };
                *item = PathItem::Path(next.clone());
                path = Some(next);
            }
        }
        path.ok_or(Error::EmptyPathStack)
    }
}
