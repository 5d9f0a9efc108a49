//! Namespace Scope Stack
//!
//! Tracks the prefix bindings declared by the elements currently open
//! during a replay. Bindings are pushed in declaration order; an element that
//! declared at least one binding also pushes a boundary, so leaving it pops
//! exactly its own bindings, most recent first.

use std::sync::Arc;

/// Well-known namespace names
pub mod ns {
    pub const XML_PREFIX: &str = "xml";
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS_PREFIX: &str = "xmlns";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsBinding {
    pub prefix: Arc<str>,
    pub uri: Arc<str>,
}

/// Stack of in-scope namespace bindings
#[derive(Debug, Default)]
pub struct NamespaceContext {
    /// Bindings in declaration order
    bindings: Vec<NsBinding>,
    /// Binding count at the start of each declaring element
    boundaries: Vec<usize>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        NamespaceContext {
            bindings: Vec::with_capacity(16),
            boundaries: Vec::with_capacity(16),
        }
    }

    /// Number of bindings currently pushed
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of open declaring elements
    #[inline]
    pub fn depth(&self) -> usize {
        self.boundaries.len()
    }

    /// Push a binding for the element being started
    pub fn declare(&mut self, prefix: Arc<str>, uri: Arc<str>) {
        self.bindings.push(NsBinding { prefix, uri });
    }

    /// Record that the bindings above `mark` belong to one element
    pub fn push_boundary(&mut self, mark: usize) {
        debug_assert!(mark <= self.bindings.len());
        self.boundaries.push(mark);
    }

    /// Leave the innermost declaring element
    ///
    /// Yields its bindings in reverse declaration order. Bindings not consumed
    /// by the caller are still removed when the iterator is dropped.
    pub fn pop_scope(&mut self) -> impl Iterator<Item = NsBinding> + '_ {
        let start = self.boundaries.pop().unwrap_or(0);
        self.bindings.drain(start..).rev()
    }

    /// URI bound to `prefix` in the current scope
    ///
    /// The `xml` and `xmlns` prefixes are always bound. An empty result
    /// string means the prefix was undeclared.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        match prefix {
            ns::XML_PREFIX => return Some(ns::XML),
            ns::XMLNS_PREFIX => return Some(ns::XMLNS),
            _ => {}
        }
        self.bindings
            .iter()
            .rev()
            .find(|b| &*b.prefix == prefix)
            .map(|b| &*b.uri)
    }

    /// Drop every binding and boundary
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.boundaries.clear();
    }
}
