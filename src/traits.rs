//! Common traits for heap data structures
//!
//! This module provides a two-tier trait hierarchy for heap/priority queue
//! data structures:
//!
//! - [`Heap`]: base trait covering push/peek/pop/clear/merge
//! - [`AddressableHeap`]: extended trait adding handle-based `decrease_key`
//!   and `remove`
//!
//! Handles are generational arena keys rather than references into the
//! structure: once an element has been popped or removed, every surviving
//! handle to it is detected as stale instead of reaching reused memory.

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// Arena key backing the handle types of the index-tracked heaps.
    pub struct HandleId;
}

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The new priority would not strictly improve the element's position
    /// under the heap's configured order. Accepting it silently would break
    /// the heap-order invariant, so it is rejected and the heap is left
    /// untouched.
    PriorityNotImproved,
    /// The handle refers to an element that has already been popped or
    /// removed.
    StaleHandle,
    /// A cursor observed a structural mutation made after its creation.
    VersionChanged,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::PriorityNotImproved => {
                write!(f, "new priority does not improve on the current priority")
            }
            HeapError::StaleHandle => {
                write!(f, "handle is no longer valid (element was removed)")
            }
            HeapError::VersionChanged => {
                write!(f, "heap was structurally modified during traversal")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A handle to an element in a heap, used for `decrease_key` and `remove`.
///
/// This is an opaque type that identifies a specific element in the heap.
/// The exact implementation varies by heap type; all of them are cheap
/// `Copy` keys.
///
/// A handle is only meaningful with the heap instance that issued it.
/// Within that heap, a handle whose element was popped or removed is
/// reliably reported as stale; presented to a *different* heap, a handle
/// may address an arbitrary element instead.
pub trait Handle: Copy + Clone + PartialEq + Eq + fmt::Debug {}

/// Base trait for heap/priority queue data structures
///
/// These heaps store (priority, item) pairs to separate the ordering key
/// from the data. The extraction direction (min vs max) is a type parameter
/// on the concrete heap, see [`crate::order`].
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::Heap;
/// use mergeable_heaps::binary::BinaryHeap;
///
/// let mut heap = BinaryHeap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap.
    fn new() -> Self
    where
        Self: Sized;

    /// Returns true if the heap is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements in the heap.
    fn len(&self) -> usize;

    /// Inserts an element with the given priority.
    ///
    /// # Time Complexity
    /// O(log n) for binary and binomial heaps, O(1) (amortized or worst
    /// case) for fibonacci and pairing heaps.
    fn push(&mut self, priority: P, item: T);

    /// Returns the extreme priority and associated item without removing it.
    ///
    /// # Time Complexity
    /// O(1) for every family except the binomial heap, which scans its
    /// O(log n) root list.
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the extreme priority and associated item.
    ///
    /// # Time Complexity
    /// O(log n), amortized for the lazy families.
    fn pop(&mut self) -> Option<(P, T)>;

    /// Removes every element. Outstanding handles become stale.
    fn clear(&mut self);

    /// Merges another heap into this one, consuming the other heap.
    ///
    /// Handles issued by `other` are invalidated and must be discarded;
    /// they do not transfer to the surviving heap.
    fn merge(&mut self, other: Self)
    where
        Self: Sized;
}

/// Extended heap trait with handle-based operations
///
/// `push_with_handle` returns a handle that can later be used to decrease
/// the element's priority or to remove it from the middle of the structure.
/// These are the operations Dijkstra-style algorithms need.
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::{AddressableHeap, Heap};
/// use mergeable_heaps::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait AddressableHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap.
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle.
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Moves the element identified by the handle to a strictly better
    /// priority.
    ///
    /// # Errors
    /// [`HeapError::PriorityNotImproved`] if the new priority does not
    /// strictly precede the current one; [`HeapError::StaleHandle`] if the
    /// element is gone. The heap is unchanged on error.
    ///
    /// # Time Complexity
    /// O(log n) for binary and binomial heaps, O(1) amortized for fibonacci,
    /// o(log n) amortized for pairing.
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;

    /// Removes the element identified by the handle, wherever it sits in the
    /// structure, returning its priority and item.
    ///
    /// # Errors
    /// [`HeapError::StaleHandle`] if the element has already been extracted.
    ///
    /// # Time Complexity
    /// O(log n), amortized for the lazy families.
    fn remove(&mut self, handle: &Self::Handle) -> Result<(P, T), HeapError>;
}
