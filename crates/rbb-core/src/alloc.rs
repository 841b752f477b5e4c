//! Span placement for new blocks
//!
//! Live blocks always occupy one circular arc of the backing buffer, from
//! the oldest block (head) to the newest (tail). New blocks are placed
//! right after the tail, or at offset 0 when the tail side is too short and
//! the ring has not wrapped yet. Only the head and tail are inspected, so
//! placement is O(1).
//!
//! ```text
//!  unwrapped          head               tail
//!  +-------------+--------+--------+-----------+--------------+
//!  | before head | block1 | block2 |  block3   |  after tail  |
//!  +-------------+--------+--------+-----------+--------------+
//!
//!  wrapped     tail                           head
//!  +-----------+---------------------------+--------+---------+
//!  |  block3   |            gap            | block1 | block2  |
//!  +-----------+---------------------------+--------+---------+
//! ```

use crate::descriptor::BlockDescriptor;

/// Byte range of a live block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    #[inline]
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl From<&BlockDescriptor> for Span {
    #[inline]
    fn from(desc: &BlockDescriptor) -> Self {
        Span::new(desc.offset(), desc.len())
    }
}

/// Shape of the occupied arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// No live blocks: the whole buffer is free
    Empty,

    /// Live blocks sit in one middle region, free space on both sides
    Unwrapped { head: Span, tail: Span },

    /// Live blocks run past the end and continue from offset 0
    Wrapped { head: Span, tail: Span },
}

impl Layout {
    /// Classify from the oldest and newest live spans
    pub fn classify(ends: Option<(Span, Span)>) -> Self {
        match ends {
            None => Layout::Empty,
            Some((head, tail)) if head.offset <= tail.offset => Layout::Unwrapped { head, tail },
            Some((head, tail)) => Layout::Wrapped { head, tail },
        }
    }

    /// Offset for a new block of `size` bytes, or `None` if no free region
    /// is large enough
    ///
    /// A region of exactly `size` bytes fits. In the unwrapped shape the
    /// space after the tail wins over the space before the head.
    pub fn place(&self, capacity: usize, size: usize) -> Option<usize> {
        match *self {
            Layout::Empty => (size <= capacity).then_some(0),
            Layout::Unwrapped { head, tail } => {
                let after_tail = capacity - tail.end();
                let before_head = head.offset;
                if after_tail >= size {
                    Some(tail.end())
                } else if before_head >= size {
                    Some(0)
                } else {
                    None
                }
            }
            Layout::Wrapped { head, tail } => {
                let gap = head.offset - tail.end();
                (gap >= size).then_some(tail.end())
            }
        }
    }

    /// Largest request `place` would currently accept
    pub fn largest_free(&self, capacity: usize) -> usize {
        match *self {
            Layout::Empty => capacity,
            Layout::Unwrapped { head, tail } => (capacity - tail.end()).max(head.offset),
            Layout::Wrapped { head, tail } => head.offset - tail.end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout(head: (usize, usize), tail: (usize, usize)) -> Layout {
        Layout::classify(Some((Span::new(head.0, head.1), Span::new(tail.0, tail.1))))
    }

    #[test]
    fn test_empty_places_at_zero() {
        assert_eq!(Layout::Empty.place(16, 16), Some(0));
        assert_eq!(Layout::Empty.place(16, 17), None);
    }

    #[test]
    fn test_unwrapped_prefers_after_tail() {
        // head at 4, tail ends at 10: 6 bytes after, 4 before
        let l = layout((4, 2), (6, 4));
        assert!(matches!(l, Layout::Unwrapped { .. }));
        assert_eq!(l.place(16, 4), Some(10));
        assert_eq!(l.place(16, 6), Some(10));
    }

    #[test]
    fn test_unwrapped_falls_back_before_head() {
        // 2 bytes after tail, 4 before head
        let l = layout((4, 4), (8, 6));
        assert_eq!(l.place(16, 3), Some(0));
        assert_eq!(l.place(16, 4), Some(0));
        assert_eq!(l.place(16, 5), None);
        assert_eq!(l.largest_free(16), 4);
    }

    #[test]
    fn test_single_block_is_unwrapped() {
        let l = layout((0, 6), (0, 6));
        assert!(matches!(l, Layout::Unwrapped { .. }));
        assert_eq!(l.place(10, 4), Some(6));
        assert_eq!(l.place(10, 5), None);
    }

    #[test]
    fn test_wrapped_uses_gap_only() {
        // tail [0,3), head [8,..): gap is [3,8)
        let l = layout((8, 2), (0, 3));
        assert!(matches!(l, Layout::Wrapped { .. }));
        assert_eq!(l.place(10, 5), Some(3));
        assert_eq!(l.place(10, 6), None);
        assert_eq!(l.largest_free(10), 5);
    }

    #[test]
    fn test_full_ring() {
        let l = layout((0, 4), (4, 6));
        assert_eq!(l.place(10, 1), None);
        assert_eq!(l.largest_free(10), 0);

        let l = layout((5, 5), (0, 5));
        assert_eq!(l.place(10, 1), None);
    }

    proptest! {
        #[test]
        fn prop_placement_stays_in_free_region(
            gap0 in 0usize..64,
            len_a in 1usize..64,
            gap1 in 0usize..64,
            len_b in 1usize..64,
            gap2 in 0usize..64,
            wrapped in any::<bool>(),
            size in 1usize..300,
        ) {
            let capacity = gap0 + len_a + gap1 + len_b + gap2;
            let low = Span::new(gap0, len_a);
            let high = Span::new(gap0 + len_a + gap1, len_b);
            let (head, tail) = if wrapped { (high, low) } else { (low, high) };

            let l = Layout::classify(Some((head, tail)));
            prop_assert_eq!(matches!(l, Layout::Wrapped { .. }), wrapped);

            match l.place(capacity, size) {
                Some(off) => {
                    let new = Span::new(off, size);
                    prop_assert!(new.end() <= capacity);
                    if wrapped {
                        prop_assert!(new.offset >= tail.end() && new.end() <= head.offset);
                    } else {
                        prop_assert!(new.end() <= head.offset || new.offset >= tail.end());
                    }
                    prop_assert!(size <= l.largest_free(capacity));
                }
                None => {
                    prop_assert!(size > l.largest_free(capacity));
                }
            }
        }
    }
}
