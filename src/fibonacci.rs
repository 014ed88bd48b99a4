//! Fibonacci heap
//!
//! A collection of heap-ordered trees whose roots sit in a circular doubly
//! linked ring; each node's children form a ring of their own. Work is
//! deferred wherever possible: `push` just splices a singleton into the root
//! ring, and nothing is restructured until `pop` consolidates the ring so
//! that at most one root per degree remains.
//!
//! `decrease_key` repairs order by cutting the node out of its parent's
//! child ring and reinserting it as a root. A parent that loses a second
//! child is cut as well (the cascading cut), which is what bounds the
//! potential function and makes `decrease_key` O(1) amortized.
//!
//! The ring is encoded as arena keys, not owning pointers: `next`/`prev` are
//! indices into a generational arena that owns every node, so a handle to an
//! extracted node is detected as stale rather than dereferenced. Ring walks
//! remember their starting node and stop when it comes around again; there
//! is no null terminator anywhere in a ring.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity         |
//! |----------------|--------------------|
//! | `push`         | O(1)               |
//! | `peek`         | O(1)               |
//! | `pop`          | O(log n) amortized |
//! | `decrease_key` | O(1) amortized     |
//! | `remove`       | O(log n) amortized |
//! | `merge`        | O(len of `other`) arena move |

use std::io::{self, Write};
use std::marker::PhantomData;

use slotmap::{SecondaryMap, SlotMap};
use smallvec::SmallVec;

use crate::order::{HeapOrder, Min};
use crate::siblings::{self, Cursor, KeyList, NodeKey, SiblingsHeap, Traversal};
use crate::traits::{AddressableHeap, Handle, Heap, HeapError};

/// Handle to an element in a [`FibonacciHeap`].
///
/// Fibonacci nodes never trade entries with each other, so the handle is the
/// node's own generational arena key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibonacciHandle(NodeKey);

impl Handle for FibonacciHandle {}

#[derive(Debug)]
struct Node<T, P> {
    priority: P,
    item: T,
    parent: Option<NodeKey>,
    child: Option<NodeKey>,
    next: NodeKey,
    prev: NodeKey,
    degree: u32,
    marked: bool,
}

/// A Fibonacci heap.
///
/// The head key always names the extreme root, so `peek` is O(1).
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::fibonacci::FibonacciHeap;
/// use mergeable_heaps::{AddressableHeap, Heap};
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push_with_handle(5, "item");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek(), Some((&1, &"item")));
/// ```
#[derive(Debug)]
pub struct FibonacciHeap<T, P: Ord, O: HeapOrder = Min> {
    nodes: SlotMap<NodeKey, Node<T, P>>,
    head: Option<NodeKey>,
    len: usize,
    version: u64,
    cuts: u64,
    _order: PhantomData<O>,
}

impl<T, P: Ord> FibonacciHeap<T, P> {
    /// Creates an empty min-heap. Name the order type parameter explicitly
    /// for a max-heap, e.g. `FibonacciHeap::<_, _, Max>::new()` through the
    /// [`Heap`] trait.
    pub fn new() -> Self {
        <Self as Heap<T, P>>::new()
    }
}

impl<T, P: Ord, O: HeapOrder> FibonacciHeap<T, P, O> {
    /// Starts a detached, version-checked traversal over the trees.
    pub fn cursor(&self, traversal: Traversal) -> Cursor {
        Cursor::new(self, traversal)
    }

    /// Writes an indented tree dump to `writer`. Debug aid only.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>
    where
        T: std::fmt::Debug,
    {
        siblings::write_to(self, writer)
    }

    /// Number of cut operations performed over this heap's lifetime.
    ///
    /// Diagnostic counter: across any run of `decrease_key` calls the total
    /// grows linearly in the number of calls, which is exactly what the
    /// cascading-cut rule guarantees.
    pub fn cuts(&self) -> u64 {
        self.cuts
    }

    /// Linear search for an element, returning its handle. O(n).
    pub fn find(&self, item: &T) -> Option<FibonacciHandle>
    where
        T: PartialEq,
    {
        self.nodes
            .iter()
            .find(|(_, node)| node.item == *item)
            .map(|(key, _)| FibonacciHandle(key))
    }

    /// Whether the heap holds an element equal to `item`. O(n).
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.find(item).is_some()
    }

    /// Splices two disjoint rings into one in O(1) by exchanging the next
    /// links of `a` and `b`, returning whichever of the two precedes (ties
    /// go to `b`).
    fn splice(&mut self, a: NodeKey, b: NodeKey) -> NodeKey {
        let a_next = self.nodes[a].next;
        let b_next = self.nodes[b].next;
        self.nodes[a].next = b_next;
        self.nodes[b_next].prev = a;
        self.nodes[b].next = a_next;
        self.nodes[a_next].prev = b;

        if O::precedes(&self.nodes[a].priority, &self.nodes[b].priority) {
            a
        } else {
            b
        }
    }

    fn splice_opt(&mut self, x: Option<NodeKey>, y: Option<NodeKey>) -> Option<NodeKey> {
        match (x, y) {
            (None, y) => y,
            (x, None) => x,
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(a), Some(b)) => Some(self.splice(a, b)),
        }
    }

    /// Links `loser` under `winner` during consolidation: the loser becomes
    /// a singleton, joins the winner's child ring, loses its mark and bumps
    /// the winner's degree.
    fn link_under(&mut self, winner: NodeKey, loser: NodeKey) {
        self.nodes[loser].next = loser;
        self.nodes[loser].prev = loser;
        let child = self.nodes[winner].child;
        self.nodes[winner].child = self.splice_opt(child, Some(loser));
        self.nodes[loser].parent = Some(winner);
        self.nodes[loser].marked = false;
        self.nodes[winner].degree += 1;
    }

    /// One pass over the root ring that links same-degree trees until at
    /// most one root per degree remains, then rebuilds the ring from the
    /// degree table. The head comparison uses "precedes or ties" so that
    /// when equal-priority trees were just linked, the head lands on the
    /// tree that stayed at root level.
    fn consolidate(&mut self) {
        let Some(start) = self.head else {
            return;
        };

        let mut to_visit: SmallVec<[NodeKey; 16]> = SmallVec::new();
        let mut cur = start;
        loop {
            to_visit.push(cur);
            cur = self.nodes[cur].next;
            if cur == start {
                break;
            }
        }

        let mut table: SmallVec<[Option<NodeKey>; 16]> = SmallVec::new();
        for root in to_visit {
            let mut tree = root;
            loop {
                let degree = self.nodes[tree].degree as usize;
                while table.len() <= degree {
                    table.push(None);
                }
                match table[degree].take() {
                    None => {
                        table[degree] = Some(tree);
                        break;
                    }
                    Some(other) => {
                        let (winner, loser) = if O::precedes(
                            &self.nodes[other].priority,
                            &self.nodes[tree].priority,
                        ) {
                            (other, tree)
                        } else {
                            (tree, other)
                        };
                        self.link_under(winner, loser);
                        tree = winner;
                    }
                }
            }
        }

        self.head = None;
        for root in table.into_iter().flatten() {
            self.nodes[root].next = root;
            self.nodes[root].prev = root;
            self.head = match self.head {
                None => Some(root),
                // splice ties towards its second operand, giving the
                // "precedes or ties" head selection.
                Some(h) => Some(self.splice(h, root)),
            };
        }
    }

    /// Cuts the link between a node and its parent, moving the node to the
    /// root ring. A parent that was already marked has lost a child before,
    /// so it is cut as well, cascading upwards.
    fn cut(&mut self, node: NodeKey) {
        self.nodes[node].marked = false;

        let Some(parent) = self.nodes[node].parent else {
            return;
        };

        let next = self.nodes[node].next;
        if next != node {
            let prev = self.nodes[node].prev;
            self.nodes[prev].next = next;
            self.nodes[next].prev = prev;
        }
        if self.nodes[parent].child == Some(node) {
            self.nodes[parent].child = if next != node { Some(next) } else { None };
        }
        self.nodes[parent].degree -= 1;

        self.nodes[node].next = node;
        self.nodes[node].prev = node;
        self.nodes[node].parent = None;
        let head = self.head;
        self.head = self.splice_opt(head, Some(node));
        self.cuts += 1;

        if self.nodes[parent].marked {
            self.cut(parent);
        } else {
            self.nodes[parent].marked = true;
        }
    }
}

impl<T, P: Ord, O: HeapOrder> Heap<T, P> for FibonacciHeap<T, P, O> {
    fn new() -> Self {
        FibonacciHeap {
            nodes: SlotMap::with_key(),
            head: None,
            len: 0,
            version: 0,
            cuts: 0,
            _order: PhantomData,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, priority: P, item: T) {
        self.push_with_handle(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        let head = self.head?;
        let node = &self.nodes[head];
        Some((&node.priority, &node.item))
    }

    fn pop(&mut self) -> Option<(P, T)> {
        let head = self.head?;

        // Detach the head from the root ring; the rest of the ring (if any)
        // is reachable through its old neighbour.
        let head_next = self.nodes[head].next;
        let rest = if head_next == head {
            None
        } else {
            let head_prev = self.nodes[head].prev;
            self.nodes[head_prev].next = head_next;
            self.nodes[head_next].prev = head_prev;
            Some(head_next)
        };

        // The head's children are about to become roots.
        let child = self.nodes[head].child;
        if let Some(first) = child {
            let mut cur = first;
            loop {
                self.nodes[cur].parent = None;
                cur = self.nodes[cur].next;
                if cur == first {
                    break;
                }
            }
        }

        self.head = self.splice_opt(rest, child);
        self.consolidate();
        self.len -= 1;
        self.version += 1;

        let node = self
            .nodes
            .remove(head)
            .expect("extracted head must be live");
        Some((node.priority, node.item))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.len = 0;
        self.version += 1;
    }

    fn merge(&mut self, mut other: Self) {
        let Some(other_head) = other.head.take() else {
            return;
        };

        // Nodes move between arenas, so ring and tree keys are rewritten;
        // the consumed heap's handles must not be used again. The ring
        // splice itself stays O(1); the migration is what costs O(len).
        let mut remap: SecondaryMap<NodeKey, NodeKey> = SecondaryMap::new();
        for (old, node) in other.nodes.drain() {
            let new = self.nodes.insert(node);
            remap.insert(old, new);
        }
        for (_, &new) in remap.iter() {
            let node = &mut self.nodes[new];
            node.parent = node.parent.map(|k| remap[k]);
            node.child = node.child.map(|k| remap[k]);
            node.next = remap[node.next];
            node.prev = remap[node.prev];
        }

        let adopted = remap[other_head];
        let head = self.head;
        self.head = self.splice_opt(head, Some(adopted));
        self.len += other.len;
        other.len = 0;
        self.version += 1;
    }
}

impl<T, P: Ord, O: HeapOrder> AddressableHeap<T, P> for FibonacciHeap<T, P, O> {
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> FibonacciHandle {
        let key = self.nodes.insert_with_key(|k| Node {
            priority,
            item,
            parent: None,
            child: None,
            next: k,
            prev: k,
            degree: 0,
            marked: false,
        });

        let head = self.head;
        self.head = self.splice_opt(head, Some(key));
        self.len += 1;
        self.version += 1;
        FibonacciHandle(key)
    }

    fn decrease_key(&mut self, handle: &FibonacciHandle, new_priority: P) -> Result<(), HeapError> {
        let key = handle.0;
        let node = self.nodes.get(key).ok_or(HeapError::StaleHandle)?;
        if !O::precedes(&new_priority, &node.priority) {
            return Err(HeapError::PriorityNotImproved);
        }
        self.nodes[key].priority = new_priority;

        if let Some(parent) = self.nodes[key].parent {
            if O::precedes(&self.nodes[key].priority, &self.nodes[parent].priority) {
                self.cut(key);
            }
        }

        // Only a root may become the head; the cut above made the node one
        // whenever it overtook its parent.
        if self.nodes[key].parent.is_none() {
            if let Some(h) = self.head {
                if h != key && !O::precedes(&self.nodes[h].priority, &self.nodes[key].priority) {
                    self.head = Some(key);
                }
            }
        }

        self.version += 1;
        Ok(())
    }

    fn remove(&mut self, handle: &FibonacciHandle) -> Result<(P, T), HeapError> {
        let key = handle.0;
        if !self.nodes.contains_key(key) {
            return Err(HeapError::StaleHandle);
        }

        // The original decreases the key to a sentinel extreme; cutting the
        // node to the root ring and forcing it to be the head achieves the
        // same without needing an extreme value for a generic priority.
        if self.nodes[key].parent.is_some() {
            self.cut(key);
        }
        self.head = Some(key);
        self.pop().ok_or(HeapError::StaleHandle)
    }
}

impl<T, P: Ord, O: HeapOrder> Default for FibonacciHeap<T, P, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord, O: HeapOrder> FromIterator<(P, T)> for FibonacciHeap<T, P, O> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut heap = Self::new();
        for (priority, item) in iter {
            heap.push(priority, item);
        }
        heap
    }
}

impl<T, P: Ord, O: HeapOrder> Extend<(P, T)> for FibonacciHeap<T, P, O> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.push(priority, item);
        }
    }
}

impl<T, P: Ord, O: HeapOrder> SiblingsHeap for FibonacciHeap<T, P, O> {
    type Priority = P;
    type Item = T;

    fn version(&self) -> u64 {
        self.version
    }

    fn root_keys(&self) -> KeyList {
        let mut keys = KeyList::new();
        let Some(start) = self.head else {
            return keys;
        };
        let mut cur = start;
        loop {
            keys.push(cur);
            cur = self.nodes[cur].next;
            if cur == start {
                break;
            }
        }
        keys
    }

    fn child_keys(&self, node: NodeKey) -> KeyList {
        let mut keys = KeyList::new();
        let Some(start) = self.nodes.get(node).and_then(|n| n.child) else {
            return keys;
        };
        let mut cur = start;
        loop {
            keys.push(cur);
            cur = self.nodes[cur].next;
            if cur == start {
                break;
            }
        }
        keys
    }

    fn entry(&self, node: NodeKey) -> Option<(&P, &T)> {
        self.nodes.get(node).map(|n| (&n.priority, &n.item))
    }

    fn degree(&self, node: NodeKey) -> usize {
        self.nodes.get(node).map_or(0, |n| n.degree as usize)
    }
}

impl<T: PartialEq, P: Ord, O: HeapOrder> PartialEq for FibonacciHeap<T, P, O> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && siblings::sequence_eq(self, other)
    }
}
