//! Options for tracking and for the text tree renderer.
//!
//! # Beispiel
//!
//! ```
//! use yangtrack::options::{TrackingOptions, TreeOptions};
//!
//! let tracking = TrackingOptions::default().with_strict(false);
//! assert!(!tracking.strict());
//!
//! let tree = TreeOptions::default().with_depth(2).with_line_length(72);
//! assert_eq!(tree.depth(), Some(2));
//! assert_eq!(tree.line_length(), Some(72));
//! ```

/// Parser behaviour for elements without a schema counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingOptions {
    pub(crate) strict: bool,
}

impl Default for TrackingOptions {
    /// Strict: unbekannte Elemente brechen das Dokument ab.
    fn default() -> Self {
        Self { strict: true }
    }
}

impl TrackingOptions {
    /// Lenient: unbekannte Teilbaeume werden uebersprungen.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    pub fn strict(&self) -> bool { self.strict }

    pub fn with_strict(mut self, strict: bool) -> Self { self.strict = strict; self }

    pub fn set_strict(&mut self, strict: bool) { self.strict = strict; }
}

/// Layout of the text tree renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeOptions {
    /// Maximale Tiefe; 0 = unbegrenzt.
    pub(crate) depth: usize,
    /// Maximale Zeilenlaenge; 0 = unbegrenzt.
    pub(crate) line_length: usize,
    /// Jeder Knotenname bekommt den Prefix seines Moduls.
    pub(crate) module_name_prefixes: bool,
    /// Auch Knoten des dargestellten Moduls bekommen einen Prefix.
    pub(crate) prefix_main_module: bool,
}

impl TreeOptions {
    pub fn depth(&self) -> Option<usize> { (self.depth > 0).then_some(self.depth) }

    pub fn line_length(&self) -> Option<usize> { (self.line_length > 0).then_some(self.line_length) }

    pub fn module_name_prefixes(&self) -> bool { self.module_name_prefixes }

    pub fn prefix_main_module(&self) -> bool { self.prefix_main_module }

    pub fn with_depth(mut self, depth: usize) -> Self { self.depth = depth; self }

    pub fn with_line_length(mut self, line_length: usize) -> Self { self.line_length = line_length; self }

    pub fn with_module_name_prefixes(mut self, val: bool) -> Self { self.module_name_prefixes = val; self }

    pub fn with_prefix_main_module(mut self, val: bool) -> Self { self.prefix_main_module = val; self }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert!(TrackingOptions::default().strict());
        assert!(!TrackingOptions::lenient().strict());
        let tree = TreeOptions::default();
        assert_eq!(tree.depth(), None);
        assert_eq!(tree.line_length(), None);
        assert!(!tree.module_name_prefixes());
    }

    #[test]
    fn setters() {
        let mut opts = TrackingOptions::lenient();
        opts.set_strict(true);
        assert_eq!(opts, TrackingOptions::default());
        assert_eq!(TreeOptions::default().with_depth(0).depth(), None);
    }
}
