//! Binomial heap
//!
//! A forest of binomial trees in the linked representation: each node knows
//! its parent, its first child and its next sibling, plus its degree. The
//! root list is kept sorted by strictly increasing degree, and a tree of
//! degree k always holds exactly 2^k nodes whose children (first to last)
//! have degrees k-1, k-2, ..., 0.
//!
//! Two heaps combine like binary addition: `merge` interleaves the
//! degree-sorted root lists and `union` then coalesces adjacent equal-degree
//! trees, linking the worse root under the better one. Insertion is a union
//! with a singleton.
//!
//! There is no cached pointer to the extreme root; `peek` scans the O(log n)
//! root list. That trades the fibonacci heap's O(1) peek for much simpler
//! invariant maintenance.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity                  |
//! |----------------|-----------------------------|
//! | `push`         | O(log n), O(1) amortized    |
//! | `peek`         | O(log n)                    |
//! | `pop`          | O(log n)                    |
//! | `decrease_key` | O(log n)                    |
//! | `remove`       | O(log n)                    |
//! | `merge`        | O(n) arena move + O(log n) union |

use std::io::{self, Write};
use std::marker::PhantomData;
use std::mem;

use slotmap::{SecondaryMap, SlotMap};

use crate::order::{HeapOrder, Min};
use crate::siblings::{self, Cursor, KeyList, NodeKey, SiblingsHeap, Traversal};
use crate::traits::{AddressableHeap, Handle, HandleId, Heap, HeapError};

/// Handle to an element in a [`BinomialHeap`].
///
/// Decrease-key repairs this family by swapping entries between nodes, so
/// the handle indirects through a table that is updated on every swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinomialHandle(HandleId);

impl Handle for BinomialHandle {}

#[derive(Debug)]
struct Node<T, P> {
    priority: P,
    item: T,
    handle: HandleId,
    parent: Option<NodeKey>,
    child: Option<NodeKey>,
    sibling: Option<NodeKey>,
    degree: u32,
}

/// A binomial heap.
///
/// # Example
///
/// ```rust
/// use mergeable_heaps::binomial::BinomialHeap;
/// use mergeable_heaps::{AddressableHeap, Heap};
///
/// let mut heap = BinomialHeap::new();
/// let handle = heap.push_with_handle(5, "item");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek(), Some((&1, &"item")));
/// ```
#[derive(Debug)]
pub struct BinomialHeap<T, P: Ord, O: HeapOrder = Min> {
    nodes: SlotMap<NodeKey, Node<T, P>>,
    handles: SlotMap<HandleId, NodeKey>,
    head: Option<NodeKey>,
    len: usize,
    version: u64,
    _order: PhantomData<O>,
}

impl<T, P: Ord> BinomialHeap<T, P> {
    /// Creates an empty min-heap. Name the order type parameter explicitly
    /// for a max-heap, e.g. `BinomialHeap::<_, _, Max>::new()` through the
    /// [`Heap`] trait.
    pub fn new() -> Self {
        <Self as Heap<T, P>>::new()
    }
}

impl<T, P: Ord, O: HeapOrder> BinomialHeap<T, P, O> {
    /// Starts a detached, version-checked traversal over the forest.
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
    pub fn find(&self, item: &T) -> Option<BinomialHandle>
    where
        T: PartialEq,
    {
        self.nodes
            .iter()
            .find(|(_, node)| node.item == *item)
            .map(|(_, node)| BinomialHandle(node.handle))
    }

    /// Whether the heap holds an element equal to `item`. O(n).
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.find(item).is_some()
    }

    /// Makes `y` the first child of `x`. `x` must hold the better key and
    /// both must be roots of equal degree.
    fn link(&mut self, x: NodeKey, y: NodeKey) {
        self.nodes[y].parent = Some(x);
        self.nodes[y].sibling = self.nodes[x].child;
        self.nodes[x].child = Some(y);
        self.nodes[x].degree += 1;
    }

    /// Interleaves two degree-sorted root lists into one, without touching
    /// trees of equal degree. O(number of roots).
    fn merge_roots(&mut self, x: Option<NodeKey>, y: Option<NodeKey>) -> Option<NodeKey> {
        let (x0, y0) = match (x, y) {
            (None, y) => return y,
            (x, None) => return x,
            (Some(a), Some(b)) => (a, b),
        };
        if x0 == y0 {
            return Some(x0);
        }

        let mut x;
        let mut y;
        let head;
        if self.nodes[x0].degree <= self.nodes[y0].degree {
            head = x0;
            x = self.nodes[x0].sibling;
            y = Some(y0);
        } else {
            head = y0;
            x = Some(x0);
            y = self.nodes[y0].sibling;
        }

        let mut tail = head;
        while let (Some(a), Some(b)) = (x, y) {
            if self.nodes[a].degree <= self.nodes[b].degree {
                self.nodes[tail].sibling = Some(a);
                tail = a;
                x = self.nodes[a].sibling;
            } else {
                self.nodes[tail].sibling = Some(b);
                tail = b;
                y = self.nodes[b].sibling;
            }
        }
        self.nodes[tail].sibling = x.or(y);
        Some(head)
    }

    /// Merge followed by one linear pass coalescing adjacent equal-degree
    /// trees. When three consecutive roots share a degree the first pair is
    /// skipped and the pair is linked further along the same pass instead,
    /// so no tree is linked twice in one step.
    fn union(&mut self, x: Option<NodeKey>, y: Option<NodeKey>) -> Option<NodeKey> {
        let mut head = self.merge_roots(x, y)?;

        let mut prev: Option<NodeKey> = None;
        let mut node = head;
        let mut next_opt = self.nodes[node].sibling;

        while let Some(next) = next_opt {
            let degree = self.nodes[node].degree;
            let next_degree = self.nodes[next].degree;
            let third_same = self.nodes[next]
                .sibling
                .is_some_and(|after| self.nodes[after].degree == degree);

            if degree != next_degree || third_same {
                prev = Some(node);
                node = next;
            } else if O::precedes(&self.nodes[node].priority, &self.nodes[next].priority) {
                self.nodes[node].sibling = self.nodes[next].sibling;
                self.link(node, next);
            } else {
                match prev {
                    None => head = next,
                    Some(p) => self.nodes[p].sibling = Some(next),
                }
                self.link(next, node);
                node = next;
            }

            next_opt = self.nodes[node].sibling;
        }

        Some(head)
    }

    /// Swaps the entries (priority, item and handle) of two nodes, keeping
    /// the handle table pointing at the right nodes.
    fn swap_entries(&mut self, a: NodeKey, b: NodeKey) {
        let [na, nb] = self
            .nodes
            .get_disjoint_mut([a, b])
            .expect("swap operands must be distinct live nodes");
        mem::swap(&mut na.priority, &mut nb.priority);
        mem::swap(&mut na.item, &mut nb.item);
        mem::swap(&mut na.handle, &mut nb.handle);
        let (ha, hb) = (self.nodes[a].handle, self.nodes[b].handle);
        self.handles[ha] = a;
        self.handles[hb] = b;
    }

    /// Carries a node's entry towards the root of its tree by parent swaps,
    /// stopping when heap order is restored. With `to_root` the comparison
    /// is bypassed and the entry always reaches the root, which is how
    /// arbitrary removal is implemented. Returns the node the entry ends up
    /// in.
    fn bubble_up(&mut self, mut node: NodeKey, to_root: bool) -> NodeKey {
        while let Some(parent) = self.nodes[node].parent {
            if !to_root
                && !O::precedes(&self.nodes[node].priority, &self.nodes[parent].priority)
            {
                break;
            }
            self.swap_entries(node, parent);
            node = parent;
        }
        node
    }

    /// Detaches `root` from the root list, promotes its children to a fresh
    /// degree-sorted root list and unions them back in. `prev` is the root
    /// preceding `root`, if any.
    fn detach_root(&mut self, root: NodeKey, prev: Option<NodeKey>) -> (P, T) {
        let after = self.nodes[root].sibling;
        if self.head == Some(root) {
            self.head = after;
        } else if let Some(p) = prev {
            self.nodes[p].sibling = after;
        }

        // The child list runs from highest to lowest degree; reversing it
        // while clearing parents yields a valid ascending root list.
        let mut promoted: Option<NodeKey> = None;
        let mut child = self.nodes[root].child;
        while let Some(c) = child {
            let next = self.nodes[c].sibling;
            self.nodes[c].sibling = promoted;
            self.nodes[c].parent = None;
            promoted = Some(c);
            child = next;
        }

        let remaining = self.head;
        self.head = self.union(remaining, promoted);

        let node = self
            .nodes
            .remove(root)
            .expect("detached root must be live");
        self.handles.remove(node.handle);
        self.len -= 1;
        self.version += 1;
        (node.priority, node.item)
    }

    /// The root preceding `root` in the root list, or `None` when `root`
    /// leads the list.
    fn root_predecessor(&self, root: NodeKey) -> Option<NodeKey> {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(k) = cur {
            if k == root {
                return prev;
            }
            prev = Some(k);
            cur = self.nodes[k].sibling;
        }
        prev
    }
}

impl<T, P: Ord, O: HeapOrder> Heap<T, P> for BinomialHeap<T, P, O> {
    fn new() -> Self {
        BinomialHeap {
            nodes: SlotMap::with_key(),
            handles: SlotMap::with_key(),
            head: None,
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
        let mut best = self.head?;
        let mut cur = self.nodes[best].sibling;
        while let Some(k) = cur {
            if O::precedes(&self.nodes[k].priority, &self.nodes[best].priority) {
                best = k;
            }
            cur = self.nodes[k].sibling;
        }
        let node = &self.nodes[best];
        Some((&node.priority, &node.item))
    }

    fn pop(&mut self) -> Option<(P, T)> {
        let head = self.head?;
        let mut min = head;
        let mut min_prev: Option<NodeKey> = None;
        let mut prev = head;
        let mut next = self.nodes[head].sibling;

        while let Some(k) = next {
            if O::precedes(&self.nodes[k].priority, &self.nodes[min].priority) {
                min = k;
                min_prev = Some(prev);
            }
            prev = k;
            next = self.nodes[k].sibling;
        }

        Some(self.detach_root(min, min_prev))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.handles.clear();
        self.head = None;
        self.len = 0;
        self.version += 1;
    }

    fn merge(&mut self, mut other: Self) {
        let Some(other_head) = other.head.take() else {
            return;
        };

        // Nodes move between arenas, so every key they mention has to be
        // rewritten; the consumed heap's handles must not be used again.
        let mut remap: SecondaryMap<NodeKey, NodeKey> = SecondaryMap::new();
        for (old, node) in other.nodes.drain() {
            let new = self.nodes.insert(node);
            remap.insert(old, new);
        }
        for (_, &new) in remap.iter() {
            let node = &mut self.nodes[new];
            node.parent = node.parent.map(|k| remap[k]);
            node.child = node.child.map(|k| remap[k]);
            node.sibling = node.sibling.map(|k| remap[k]);
        }
        for (_, &new) in remap.iter() {
            let handle = self.handles.insert(new);
            self.nodes[new].handle = handle;
        }

        let adopted = remap[other_head];
        let remaining = self.head;
        self.head = self.union(remaining, Some(adopted));
        self.len += other.len;
        other.len = 0;
        self.version += 1;
    }
}

impl<T, P: Ord, O: HeapOrder> AddressableHeap<T, P> for BinomialHeap<T, P, O> {
    type Handle = BinomialHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> BinomialHandle {
        let handle = self.handles.insert(NodeKey::default());
        let key = self.nodes.insert(Node {
            priority,
            item,
            handle,
            parent: None,
            child: None,
            sibling: None,
            degree: 0,
        });
        self.handles[handle] = key;

        let head = self.head;
        self.head = self.union(head, Some(key));
        self.len += 1;
        self.version += 1;
        BinomialHandle(handle)
    }

    fn decrease_key(&mut self, handle: &BinomialHandle, new_priority: P) -> Result<(), HeapError> {
        let node = *self.handles.get(handle.0).ok_or(HeapError::StaleHandle)?;
        if !O::precedes(&new_priority, &self.nodes[node].priority) {
            return Err(HeapError::PriorityNotImproved);
        }
        self.nodes[node].priority = new_priority;
        self.bubble_up(node, false);
        self.version += 1;
        Ok(())
    }

    fn remove(&mut self, handle: &BinomialHandle) -> Result<(P, T), HeapError> {
        let node = *self.handles.get(handle.0).ok_or(HeapError::StaleHandle)?;
        // Carry the entry to the root of its tree, then detach that root
        // specifically. Extracting the global extreme here instead would
        // remove the wrong element whenever another root precedes this
        // tree's.
        let root = self.bubble_up(node, true);
        let prev = self.root_predecessor(root);
        Ok(self.detach_root(root, prev))
    }
}

impl<T, P: Ord, O: HeapOrder> Default for BinomialHeap<T, P, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord, O: HeapOrder> FromIterator<(P, T)> for BinomialHeap<T, P, O> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut heap = Self::new();
        for (priority, item) in iter {
            heap.push(priority, item);
        }
        heap
    }
}

impl<T, P: Ord, O: HeapOrder> Extend<(P, T)> for BinomialHeap<T, P, O> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.push(priority, item);
        }
    }
}

impl<T, P: Ord, O: HeapOrder> SiblingsHeap for BinomialHeap<T, P, O> {
    type Priority = P;
    type Item = T;

    fn version(&self) -> u64 {
        self.version
    }

    fn root_keys(&self) -> KeyList {
        let mut keys = KeyList::new();
        let mut cur = self.head;
        while let Some(k) = cur {
            keys.push(k);
            cur = self.nodes[k].sibling;
        }
        keys
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
        self.nodes.get(node).map_or(0, |n| n.degree as usize)
    }
}

impl<T: PartialEq, P: Ord, O: HeapOrder> PartialEq for BinomialHeap<T, P, O> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && siblings::sequence_eq(self, other)
    }
}
