//! Pairing heap
//!
//! A single heap-ordered tree where each node keeps its first child, its
//! next sibling and a back link (`prev`: the parent for a first child, the
//! previous sibling otherwise). Melding two trees just links the worse root
//! under the better one, so push and merge are O(1); `pop` pays the deferred
//! cost by combining the root's children with the classic two-pass merge
//! (adjacent pairs left to right, then one accumulating sweep right to
//! left).
//!
//! Simpler than a fibonacci heap, with excellent practical performance and
//! o(log n) amortized `decrease_key`.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity           |
//! |----------------|----------------------|
//! | `push`         | O(1)                 |
//! | `peek`         | O(1)                 |
//! | `pop`          | O(log n) amortized   |
//! | `decrease_key` | o(log n) amortized   |
//! | `remove`       | O(log n) amortized   |
//! | `merge`        | O(len of `other`) arena move |

use std::io::{self, Write};
use std::marker::PhantomData;

use slotmap::{SecondaryMap, SlotMap};
use smallvec::SmallVec;

use crate::order::{HeapOrder, Min};
use crate::siblings::{self, Cursor, KeyList, NodeKey, SiblingsHeap, Traversal};
use crate::traits::{AddressableHeap, Handle, Heap, HeapError};

/// Handle to an element in a [`PairingHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingHandle(NodeKey);

impl Handle for PairingHandle {}

#[derive(Debug)]
struct Node<T, P> {
    priority: P,
    item: T,
    child: Option<NodeKey>,
    sibling: Option<NodeKey>,
    /// Parent for a first child, previous sibling otherwise. Roots have
    /// none. This is what lets `decrease_key` detach a node in O(1).
    prev: Option<NodeKey>,
}

/// A pairing heap.
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::pairing::PairingHeap;
/// use mergeable_heaps::{AddressableHeap, Heap};
///
/// let mut heap = PairingHeap::new();
/// let handle = heap.push_with_handle(5, "item");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek(), Some((&1, &"item")));
/// ```
#[derive(Debug)]
pub struct PairingHeap<T, P: Ord, O: HeapOrder = Min> {
    nodes: SlotMap<NodeKey, Node<T, P>>,
    root: Option<NodeKey>,
    len: usize,
    version: u64,
    _order: PhantomData<O>,
}

impl<T, P: Ord> PairingHeap<T, P> {
    /// Creates an empty min-heap. Name the order type parameter explicitly
    /// for a max-heap, e.g. `PairingHeap::<_, _, Max>::new()` through the
    /// [`Heap`] trait.
    pub fn new() -> Self {
        <Self as Heap<T, P>>::new()
    }
}

impl<T, P: Ord, O: HeapOrder> PairingHeap<T, P, O> {
    /// Starts a detached, version-checked traversal over the tree.
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

    /// Linear search for an element, returning its handle. O(n).
    pub fn find(&self, item: &T) -> Option<PairingHandle>
    where
        T: PartialEq,
    {
        self.nodes
            .iter()
            .find(|(_, node)| node.item == *item)
            .map(|(key, _)| PairingHandle(key))
    }

    /// Whether the heap holds an element equal to `item`. O(n).
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.find(item).is_some()
    }

    /// Links the worse-keyed of two roots under the better one and returns
    /// the winner. Both must be detached tree roots.
    fn meld2(&mut self, x: NodeKey, y: NodeKey) -> NodeKey {
        if O::precedes(&self.nodes[y].priority, &self.nodes[x].priority) {
            self.nodes[y].prev = self.nodes[x].prev;
            self.nodes[x].prev = Some(y);
            self.nodes[x].sibling = self.nodes[y].child;
            if let Some(s) = self.nodes[x].sibling {
                self.nodes[s].prev = Some(x);
            }
            self.nodes[y].child = Some(x);
            y
        } else {
            self.nodes[y].prev = Some(x);
            self.nodes[x].sibling = self.nodes[y].sibling;
            if let Some(s) = self.nodes[x].sibling {
                self.nodes[s].prev = Some(x);
            }
            self.nodes[y].sibling = self.nodes[x].child;
            if let Some(s) = self.nodes[y].sibling {
                self.nodes[s].prev = Some(y);
            }
            self.nodes[x].child = Some(y);
            x
        }
    }

    fn meld(&mut self, x: Option<NodeKey>, y: Option<NodeKey>) -> Option<NodeKey> {
        match (x, y) {
            (None, y) => y,
            (x, None) => x,
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(a), Some(b)) => Some(self.meld2(a, b)),
        }
    }

    /// Combines a detached sibling list into a single tree: meld adjacent
    /// pairs left to right, then fold the pair roots right to left.
    fn two_pass_merge(&mut self, first: Option<NodeKey>) -> Option<NodeKey> {
        let first = first?;
        if self.nodes[first].sibling.is_none() {
            self.nodes[first].prev = None;
            return Some(first);
        }

        let mut siblings: SmallVec<[NodeKey; 16]> = SmallVec::new();
        let mut cur = Some(first);
        while let Some(k) = cur {
            let next = self.nodes[k].sibling.take();
            self.nodes[k].prev = None;
            siblings.push(k);
            cur = next;
        }

        let mut pairs: SmallVec<[NodeKey; 16]> = SmallVec::new();
        let mut iter = siblings.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => pairs.push(self.meld2(a, b)),
                None => pairs.push(a),
            }
        }

        let mut root = pairs.pop()?;
        while let Some(prev) = pairs.pop() {
            root = self.meld2(prev, root);
        }
        Some(root)
    }

    /// Unlinks a non-root node from its parent's child list, leaving its
    /// own subtree intact.
    fn detach(&mut self, key: NodeKey) {
        let sibling = self.nodes[key].sibling.take();
        if let Some(s) = sibling {
            self.nodes[s].prev = self.nodes[key].prev;
        }
        if let Some(p) = self.nodes[key].prev.take() {
            if self.nodes[p].child == Some(key) {
                self.nodes[p].child = sibling;
            } else {
                self.nodes[p].sibling = sibling;
            }
        }
    }
}

impl<T, P: Ord, O: HeapOrder> Heap<T, P> for PairingHeap<T, P, O> {
    fn new() -> Self {
        PairingHeap {
            nodes: SlotMap::with_key(),
            root: None,
            len: 0,
            version: 0,
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
        let root = self.root?;
        let node = &self.nodes[root];
        Some((&node.priority, &node.item))
    }

    fn pop(&mut self) -> Option<(P, T)> {
        let root = self.root?;
        let child = self.nodes[root].child.take();
        self.root = self.two_pass_merge(child);

        let node = self.nodes.remove(root).expect("extracted root must be live");
        self.len -= 1;
        self.version += 1;
        Some((node.priority, node.item))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.version += 1;
    }

    fn merge(&mut self, mut other: Self) {
        let Some(other_root) = other.root.take() else {
            return;
        };

        // Nodes move between arenas; the consumed heap's handles must not
        // be used again.
        let mut remap: SecondaryMap<NodeKey, NodeKey> = SecondaryMap::new();
        for (old, node) in other.nodes.drain() {
            let new = self.nodes.insert(node);
            remap.insert(old, new);
        }
        for (_, &new) in remap.iter() {
            let node = &mut self.nodes[new];
            node.child = node.child.map(|k| remap[k]);
            node.sibling = node.sibling.map(|k| remap[k]);
            node.prev = node.prev.map(|k| remap[k]);
        }

        let adopted = remap[other_root];
        let root = self.root;
        self.root = self.meld(root, Some(adopted));
        self.len += other.len;
        other.len = 0;
        self.version += 1;
    }
}

impl<T, P: Ord, O: HeapOrder> AddressableHeap<T, P> for PairingHeap<T, P, O> {
    type Handle = PairingHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> PairingHandle {
        let key = self.nodes.insert(Node {
            priority,
            item,
            child: None,
            sibling: None,
            prev: None,
        });

        let root = self.root;
        self.root = self.meld(root, Some(key));
        self.len += 1;
        self.version += 1;
        PairingHandle(key)
    }

    fn decrease_key(&mut self, handle: &PairingHandle, new_priority: P) -> Result<(), HeapError> {
        let key = handle.0;
        let node = self.nodes.get(key).ok_or(HeapError::StaleHandle)?;
        if !O::precedes(&new_priority, &node.priority) {
            return Err(HeapError::PriorityNotImproved);
        }
        self.nodes[key].priority = new_priority;

        if self.root != Some(key) {
            self.detach(key);
            let root = self.root;
            self.root = self.meld(root, Some(key));
        }

        self.version += 1;
        Ok(())
    }

    fn remove(&mut self, handle: &PairingHandle) -> Result<(P, T), HeapError> {
        let key = handle.0;
        if !self.nodes.contains_key(key) {
            return Err(HeapError::StaleHandle);
        }

        if self.root == Some(key) {
            return self.pop().ok_or(HeapError::StaleHandle);
        }

        self.detach(key);
        let child = self.nodes[key].child.take();
        let subtree = self.two_pass_merge(child);
        let root = self.root;
        self.root = self.meld(root, subtree);

        let node = self.nodes.remove(key).expect("detached node must be live");
        self.len -= 1;
        self.version += 1;
        Ok((node.priority, node.item))
    }
}

impl<T, P: Ord, O: HeapOrder> Default for PairingHeap<T, P, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord, O: HeapOrder> FromIterator<(P, T)> for PairingHeap<T, P, O> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut heap = Self::new();
        for (priority, item) in iter {
            heap.push(priority, item);
        }
        heap
    }
}

impl<T, P: Ord, O: HeapOrder> Extend<(P, T)> for PairingHeap<T, P, O> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.push(priority, item);
        }
    }
}

impl<T, P: Ord, O: HeapOrder> SiblingsHeap for PairingHeap<T, P, O> {
    type Priority = P;
    type Item = T;

    fn version(&self) -> u64 {
        self.version
    }

    fn root_keys(&self) -> KeyList {
        self.root.into_iter().collect()
    }

    fn child_keys(&self, node: NodeKey) -> KeyList {
        let mut keys = KeyList::new();
        let Some(node) = self.nodes.get(node) else {
            return keys;
        };
        let mut cur = node.child;
        while let Some(k) = cur {
            keys.push(k);
            cur = self.nodes[k].sibling;
        }
        keys
    }

    fn entry(&self, node: NodeKey) -> Option<(&P, &T)> {
        self.nodes.get(node).map(|n| (&n.priority, &n.item))
    }

    fn degree(&self, node: NodeKey) -> usize {
        self.child_keys(node).len()
    }
}

impl<T: PartialEq, P: Ord, O: HeapOrder> PartialEq for PairingHeap<T, P, O> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && siblings::sequence_eq(self, other)
    }
}
