//! Mergeable Priority Queues for Rust
//!
//! This crate provides priority queue data structures with efficient
//! `decrease_key` and arbitrary-removal support, unified behind a common
//! trait pair:
//!
//! - **Binary Heap**: array-backed implicit tree; O(log n) everywhere, the
//!   cache-friendly baseline
//! - **Binomial Heap**: forest of binomial trees; O(log n) operations and
//!   cheap structural merging
//! - **Fibonacci Heap**: O(1) insert and amortized O(1) decrease_key;
//!   O(log n) amortized delete-min
//! - **Pairing Heap**: O(1) insert and meld; o(log n) amortized
//!   decrease_key; the simple high-performance choice in practice
//!
//! All four store (priority, item) pairs, take a min/max [`order`] as a
//! type parameter, and hand out generational handles: a handle to an
//! element that has been popped or removed is reported as stale
//! ([`HeapError::StaleHandle`]) instead of reaching reused memory.
//!
//! Long-lived traversal goes through version-checked cursors
//! ([`siblings::Cursor`]): the heaps are not internally synchronized, and a
//! cursor that observes a structural mutation fails with
//! [`HeapError::VersionChanged`] rather than walking a torn structure.
//!
//! # Example
//!
//! ```rust
//! use mergeable_heaps::fibonacci::FibonacciHeap;
//! use mergeable_heaps::{AddressableHeap, Heap};
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.push_with_handle(5, "item1");
//! let _handle2 = heap.push_with_handle(3, "item2");
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.peek(), Some((&1, &"item1")));
//! ```

pub mod binary;
pub mod binomial;
pub mod fibonacci;
pub mod keyed;
pub mod order;
pub mod pairing;
pub mod siblings;
pub mod traits;

// Re-export the main traits for convenience
pub use order::{HeapOrder, Max, Min};
pub use traits::{AddressableHeap, Handle, Heap, HeapError};
