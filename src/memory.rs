//! Allocation Statistics
//!
//! With the `memory_tracking` feature the crate installs a counting global
//! allocator (on top of mimalloc when that feature is on too), so the memory
//! held by buffers and replays can be measured. Without it every query
//! returns zero.

#[cfg(feature = "memory_tracking")]
pub(crate) mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

/// Bytes currently allocated through the global allocator
#[cfg(feature = "memory_tracking")]
pub fn allocated() -> usize {
    tracking::ALLOCATED.load(std::sync::atomic::Ordering::SeqCst)
}

/// Highest allocation level since the last [`reset_stats`]
#[cfg(feature = "memory_tracking")]
pub fn peak_allocated() -> usize {
    tracking::PEAK_ALLOCATED.load(std::sync::atomic::Ordering::SeqCst)
}

/// Restart peak tracking from the current level
///
/// Returns `(current, previous peak)`.
#[cfg(feature = "memory_tracking")]
pub fn reset_stats() -> (usize, usize) {
    use std::sync::atomic::Ordering;
    let current = tracking::ALLOCATED.load(Ordering::SeqCst);
    let peak = tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}

#[cfg(not(feature = "memory_tracking"))]
pub fn allocated() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn peak_allocated() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn reset_stats() -> (usize, usize) {
    (0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "memory_tracking")]
    #[test]
    fn test_peak_covers_buffer() {
        use crate::writer::BufferCreator;

        reset_stats();
        let mut creator = BufferCreator::new();
        creator.start_document().unwrap();
        creator.start_element("", "root", "root").unwrap();
        creator.characters(&"x".repeat(64 * 1024)).unwrap();
        creator.end_element().unwrap();
        creator.end_document().unwrap();
        let buffer = creator.finish().unwrap();

        assert!(peak_allocated() >= 64 * 1024);
        drop(buffer);
    }

    #[cfg(not(feature = "memory_tracking"))]
    #[test]
    fn test_disabled_reports_zero() {
        assert_eq!(allocated(), 0);
        assert_eq!(peak_allocated(), 0);
        assert_eq!(reset_stats(), (0, 0));
    }
}
