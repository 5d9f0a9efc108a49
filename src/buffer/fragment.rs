//! Fragmented Array
//!
//! Append-only storage made of fixed-capacity segments kept in an arena.
//! Growing never copies existing data: a full segment is left as is and a
//! new one is allocated behind it.
//!
//! Reads go through a [`Cursor`] (segment index + offset). Cursors are plain
//! values, so any number of readers can walk the same array independently.

use std::borrow::Cow;

use log::trace;

/// Default number of elements per segment
pub const DEFAULT_SEGMENT_CAPACITY: usize = 512;

/// Read position inside a [`FragmentedArray`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    segment: usize,
    offset: usize,
}

impl Cursor {
    /// Create a cursor at an explicit position
    #[inline]
    pub const fn new(segment: usize, offset: usize) -> Self {
        Self { segment, offset }
    }

    /// Segment index
    #[inline]
    pub const fn segment(&self) -> usize {
        self.segment
    }

    /// Offset within the segment
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

/// Growable array of fixed-capacity segments
#[derive(Debug, Clone)]
pub struct FragmentedArray<T> {
    segments: Vec<Vec<T>>,
    segment_capacity: usize,
    len: usize,
}

impl<T> FragmentedArray<T> {
    /// Create an empty array with the default segment capacity
    pub fn new() -> Self {
        Self::with_segment_capacity(DEFAULT_SEGMENT_CAPACITY)
    }

    /// Create an empty array whose segments hold `capacity` elements each
    pub fn with_segment_capacity(capacity: usize) -> Self {
        FragmentedArray {
            segments: Vec::new(),
            segment_capacity: capacity.max(1),
            len: 0,
        }
    }

    fn open_segment(&mut self) {
        trace!(
            "opening segment {} (capacity {})",
            self.segments.len(),
            self.segment_capacity
        );
        self.segments.push(Vec::with_capacity(self.segment_capacity));
    }

    /// Room left in the last segment
    #[inline]
    fn room(&self) -> usize {
        self.segments
            .last()
            .map_or(0, |seg| self.segment_capacity - seg.len())
    }

    /// Append one element
    pub fn append(&mut self, value: T) {
        if self.room() == 0 {
            self.open_segment();
        }
        if let Some(seg) = self.segments.last_mut() {
            seg.push(value);
            self.len += 1;
        }
    }

    /// Total number of elements written
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing was written
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements per segment
    #[inline]
    pub fn segment_capacity(&self) -> usize {
        self.segment_capacity
    }

    /// Number of allocated segments
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Cursor at the first element
    #[inline]
    pub fn cursor_start(&self) -> Cursor {
        Cursor::default()
    }

    /// Cursor just past the last written element
    pub fn end_cursor(&self) -> Cursor {
        match self.segments.len() {
            0 => Cursor::default(),
            n => Cursor::new(n - 1, self.segments[n - 1].len()),
        }
    }

    /// Move a cursor sitting at the end of a segment onto the next one
    #[inline]
    fn normalize(&self, cursor: &mut Cursor) {
        while let Some(seg) = self.segments.get(cursor.segment) {
            if cursor.offset < seg.len() || cursor.segment + 1 >= self.segments.len() {
                break;
            }
            cursor.segment += 1;
            cursor.offset = 0;
        }
    }

    /// Element at a position
    pub fn get(&self, mut cursor: Cursor) -> Option<&T> {
        self.normalize(&mut cursor);
        self.segments.get(cursor.segment)?.get(cursor.offset)
    }

    /// Element under the cursor, without advancing
    #[inline]
    pub fn peek(&self, cursor: &Cursor) -> Option<&T> {
        self.get(*cursor)
    }

    /// Element under the cursor; advances past it
    ///
    /// Returns `None` at end of stream and leaves the cursor untouched.
    pub fn read_next(&self, cursor: &mut Cursor) -> Option<&T> {
        self.normalize(cursor);
        let value = self.segments.get(cursor.segment)?.get(cursor.offset)?;
        cursor.offset += 1;
        Some(value)
    }

    /// Iterate over all elements in append order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.segments.iter().flatten()
    }

    /// Number of elements between the cursor and the end of the array
    fn remaining_from(&self, cursor: Cursor) -> usize {
        self.segments
            .iter()
            .enumerate()
            .skip(cursor.segment)
            .map(|(i, seg)| {
                if i == cursor.segment {
                    seg.len().saturating_sub(cursor.offset)
                } else {
                    seg.len()
                }
            })
            .sum()
    }
}

impl<T: Clone> FragmentedArray<T> {
    /// Append a run so that it lies inside a single segment
    ///
    /// Opens a new segment when the run does not fit the room left in the
    /// current one. Returns `false` without writing anything when the run is
    /// longer than a whole segment.
    pub fn append_run(&mut self, run: &[T]) -> bool {
        if run.is_empty() {
            return true;
        }
        if run.len() > self.segment_capacity {
            return false;
        }
        if self.room() < run.len() {
            self.open_segment();
        }
        match self.segments.last_mut() {
            Some(seg) => {
                seg.extend_from_slice(run);
                self.len += run.len();
                true
            }
            None => false,
        }
    }

    /// Read `len` elements starting at the cursor
    ///
    /// Borrows when the run lies within one segment, copies when it
    /// straddles a boundary. Returns `None` (cursor untouched) if fewer than
    /// `len` elements remain.
    pub fn read_run(&self, cursor: &mut Cursor, len: usize) -> Option<Cow<'_, [T]>> {
        if len == 0 {
            return Some(Cow::Borrowed(&[]));
        }
        self.normalize(cursor);
        let seg = self.segments.get(cursor.segment)?;
        if cursor.offset + len <= seg.len() {
            let run = &seg[cursor.offset..cursor.offset + len];
            cursor.offset += len;
            return Some(Cow::Borrowed(run));
        }

        if self.remaining_from(*cursor) < len {
            return None;
        }
        let mut copy = Vec::with_capacity(len);
        while copy.len() < len {
            self.normalize(cursor);
            let seg = &self.segments[cursor.segment];
            let take = (len - copy.len()).min(seg.len() - cursor.offset);
            copy.extend_from_slice(&seg[cursor.offset..cursor.offset + take]);
            cursor.offset += take;
        }
        Some(Cow::Owned(copy))
    }
}

impl<T> Default for FragmentedArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for FragmentedArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}
