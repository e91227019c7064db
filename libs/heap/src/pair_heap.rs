use std::cmp::Ordering;
use std::fmt;

/// Total order over priority values.
///
/// [`Ordering::Less`] corresponds to a higher priority, so with the default
/// natural-order comparator the smallest priority value sits at the root of
/// the heap and is popped first.
pub type Comparator<P> = Box<dyn Fn(&P, &P) -> Ordering + Send + Sync>;

#[derive(Debug)]
struct Slot<E, P> {
    element: E,
    priority: P,
    /// Insertion order, used as the secondary sort key so that equal
    /// priorities pop first-in-first-out.
    seq: u64,
}

/// Binary min-heap over `(element, priority)` pairs, ordered by a comparator
/// over the priorities alone.
///
/// Every push is stamped with a monotonically increasing sequence number.
/// When the comparator judges two priorities equal, the slot pushed earlier
/// wins, so ties pop in insertion order. The counter keeps running across
/// [`clear`](Self::clear), which keeps that guarantee intact for the whole
/// lifetime of the heap.
pub struct PairHeap<E, P> {
    slots: Vec<Slot<E, P>>,
    compare: Comparator<P>,
    next_seq: u64,
}

impl<E, P: Ord + 'static> PairHeap<E, P> {
    /// Creates an empty heap ordered by the natural order of `P`, smallest
    /// priority first.
    pub fn new() -> Self {
        Self::with_comparator(Box::new(P::cmp))
    }

    /// Creates an empty heap with pre-allocated room for `capacity` pairs.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut heap = Self::new();
        heap.slots.reserve(capacity);
        heap
    }
}

impl<E, P: Ord + 'static> Default for PairHeap<E, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P> PairHeap<E, P> {
    /// Creates an empty heap ordered by `compare`.
    pub fn with_comparator(compare: Comparator<P>) -> Self {
        Self {
            slots: Vec::new(),
            compare,
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Removes all pairs. The sequence counter is not reset.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Inserts `element` with `priority` in O(log n).
    pub fn push(&mut self, element: E, priority: P) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.slots.push(Slot {
            element,
            priority,
            seq,
        });
        self.sift_up(self.slots.len() - 1);
    }

    /// Returns the highest-priority pair without removing it.
    pub fn peek(&self) -> Option<(&E, &P)> {
        self.slots.first().map(|slot| (&slot.element, &slot.priority))
    }

    /// Removes and returns the highest-priority pair in O(log n).
    pub fn pop(&mut self) -> Option<(E, P)> {
        if self.slots.is_empty() {
            return None;
        }

        let slot = self.slots.swap_remove(0);
        if !self.slots.is_empty() {
            self.sift_down(0);
        }

        Some((slot.element, slot.priority))
    }

    /// Visits all pairs in internal heap order (unspecified beyond the root
    /// being first).
    pub fn iter(&self) -> impl Iterator<Item = (&E, &P)> {
        self.slots.iter().map(|slot| (&slot.element, &slot.priority))
    }

    /// `true` when the slot at index `a` must sit above the slot at index `b`.
    fn precedes(&self, a: usize, b: usize) -> bool {
        let (slot_a, slot_b) = (&self.slots[a], &self.slots[b]);
        match (self.compare)(&slot_a.priority, &slot_b.priority) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => slot_a.seq < slot_b.seq,
        }
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.precedes(idx, parent) {
                break;
            }
            self.slots.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            if left >= self.slots.len() {
                break;
            }

            let right = left + 1;
            let mut child = left;
            if right < self.slots.len() && self.precedes(right, left) {
                child = right;
            }

            if !self.precedes(child, idx) {
                break;
            }
            self.slots.swap(child, idx);
            idx = child;
        }
    }
}

impl<E, P> fmt::Debug for PairHeap<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairHeap")
            .field("len", &self.slots.len())
            .field("next_seq", &self.next_seq)
            .finish_non_exhaustive()
    }
}
