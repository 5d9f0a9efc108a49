//! Name Interning
//!
//! Deduplicates the name strings handed to consumers (element and attribute
//! names, namespace URIs, synthesised qualified names) so that equal names
//! share one allocation and can be compared with `Arc::ptr_eq`.
//!
//! The pool is bounded: an LRU cache evicts the least recently used name once
//! the capacity is reached, so an engine reused across many buffers does not
//! grow without limit.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

/// Default number of names retained
pub const DEFAULT_INTERNER_CAPACITY: usize = 1024;

/// Bounded pool of shared name strings
#[derive(Debug)]
pub struct NameInterner {
    names: LruCache<Arc<str>, Arc<str>>,
}

impl NameInterner {
    /// Create an interner holding at most `capacity` names
    pub fn new(capacity: NonZeroUsize) -> Self {
        NameInterner {
            names: LruCache::new(capacity),
        }
    }

    /// Canonical instance for `name`, registering it if unseen
    pub fn intern(&mut self, name: &Arc<str>) -> Arc<str> {
        if name.is_empty() {
            return Arc::clone(name);
        }
        if let Some(existing) = self.names.get(&**name) {
            return Arc::clone(existing);
        }
        self.names.put(Arc::clone(name), Arc::clone(name));
        Arc::clone(name)
    }

    /// Canonical instance for a borrowed name; allocates only when unseen
    pub fn intern_str(&mut self, name: &str) -> Arc<str> {
        if let Some(existing) = self.names.get(name) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(name);
        self.names.put(Arc::clone(&shared), Arc::clone(&shared));
        shared
    }

    /// Number of names currently held
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no names are held
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drop every held name
    pub fn clear(&mut self) {
        self.names.clear();
    }
}

impl Default for NameInterner {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_INTERNER_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}
