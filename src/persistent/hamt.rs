//! Node variants and node algorithms of the Hash Array Mapped Trie.
//!
//! The trie is keyed on the 32-bit hash of the key, consumed 5 bits per
//! level starting from the lowest bits. Nodes are immutable once built and
//! are shared between map versions through [`ReferenceCounter`].
//!
//! # Node Variants
//!
//! - `Empty`: the root of an empty map; never stored as a child
//! - `Leaf`: one key-value pair together with its full hash
//! - `HashCollision`: two or more pairs whose full hashes are equal
//! - `BitmapIndexed`: sparse fan-out; a bitmap marks occupied slots and the
//!   children are stored compressed, in slot order
//! - `Array`: dense fan-out with all 32 slots materialized
//!
//! # Shape Invariants
//!
//! - A `BitmapIndexed` node holds at most [`ARRAY_NODE_THRESHOLD`] children.
//!   Inserting one more promotes it to `Array`.
//! - An `Array` node holds at least [`ARRAY_NODE_THRESHOLD`] children once an
//!   edit has shrunk it. Falling below demotes it to `BitmapIndexed`.
//! - No branch node is empty, and no branch node holds a single `Leaf` or
//!   `HashCollision` child: such a child replaces its parent. A single branch
//!   child stays wrapped because its slot indices depend on its depth.
//! - Distinct full hashes always diverge within [`MAX_TRIE_DEPTH`] levels, so
//!   `HashCollision` nodes only ever hold equal hashes.
//!
//! [`MAX_TRIE_DEPTH`]: super::hashing::MAX_TRIE_DEPTH

use std::borrow::Borrow;

use arrayvec::ArrayVec;
use smallvec::{SmallVec, smallvec};

use super::ReferenceCounter;
use super::hashing::{
    BITS_PER_LEVEL, BRANCHING_FACTOR, MAX_TRIE_DEPTH, bit_position, fragment, sparse_index,
};

// =============================================================================
// Constants and Aliases
// =============================================================================

/// Fan-out threshold: half of the branching factor.
pub(crate) const ARRAY_NODE_THRESHOLD: usize = BRANCHING_FACTOR / 2;

/// Branch levels plus one collision node.
const CURSOR_STACK_CAPACITY: usize = MAX_TRIE_DEPTH + 1;

pub(crate) type NodeReference<K, V> = ReferenceCounter<Node<K, V>>;

/// Compressed children of a bitmap-indexed node, in slot order.
pub(crate) type BitmapChildren<K, V> = SmallVec<[NodeReference<K, V>; 4]>;

/// Pairs sharing one full hash. Two is by far the most common size.
pub(crate) type CollisionPairs<K, V> = SmallVec<[(K, V); 2]>;

/// Every slot of an array node.
pub(crate) type ArraySlots<K, V> = [Option<NodeReference<K, V>>; BRANCHING_FACTOR];

// =============================================================================
// Node Definition
// =============================================================================

/// A node of the trie.
pub(crate) enum Node<K, V> {
    /// Absent subtree.
    Empty,
    /// A single entry stored at its full hash.
    Leaf { hash: u32, key: K, value: V },
    /// Entries whose full hashes are equal, scanned linearly.
    HashCollision {
        hash: u32,
        pairs: CollisionPairs<K, V>,
    },
    /// Dense fan-out node; `count` is the number of occupied slots.
    Array {
        count: usize,
        children: Box<ArraySlots<K, V>>,
    },
    /// Sparse fan-out node indexed by popcount.
    BitmapIndexed {
        bitmap: u32,
        children: BitmapChildren<K, V>,
    },
}

impl<K, V> Node<K, V> {
    /// Returns `true` for nodes that are valid at any depth.
    pub(crate) const fn is_terminal(&self) -> bool {
        matches!(self, Self::Leaf { .. } | Self::HashCollision { .. })
    }
}

/// Outcome of removing a key from a subtree.
pub(crate) enum Removal<K, V> {
    /// The key was not present; the subtree is unchanged.
    Absent,
    /// The subtree no longer holds any entry.
    Emptied,
    /// The subtree was rebuilt.
    Replaced(NodeReference<K, V>),
}

/// Outcome of filtering a subtree.
pub(crate) enum Retention<K, V> {
    /// Every entry survived; the subtree can be shared as-is.
    Kept,
    /// No entry survived.
    Dropped,
    /// Some entries were dropped and the subtree was rebuilt.
    Rebuilt(NodeReference<K, V>),
}

fn empty_slots<K, V>() -> Box<ArraySlots<K, V>> {
    Box::new(std::array::from_fn(|_| None))
}

/// Iterates the slot indices set in `bitmap`, ascending.
fn occupied_slots(bitmap: u32) -> impl Iterator<Item = usize> {
    std::iter::successors((bitmap != 0).then_some(bitmap), |&rest| {
        let next = rest & (rest - 1);
        (next != 0).then_some(next)
    })
    .map(|rest| rest.trailing_zeros() as usize)
}

// =============================================================================
// Lookup
// =============================================================================

/// Finds the stored entry for `key`, descending from `root` at shift 0.
pub(crate) fn find<'a, K, V, Q>(root: &'a Node<K, V>, key: &Q, hash: u32) -> Option<(&'a K, &'a V)>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let mut node = root;
    let mut shift = 0;

    loop {
        match node {
            Node::Empty => return None,
            Node::Leaf {
                hash: leaf_hash,
                key: leaf_key,
                value,
            } => {
                return (*leaf_hash == hash && leaf_key.borrow() == key).then_some((leaf_key, value));
            }
            Node::HashCollision {
                hash: collision_hash,
                pairs,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                return pairs
                    .iter()
                    .find(|(pair_key, _)| pair_key.borrow() == key)
                    .map(|(pair_key, value)| (pair_key, value));
            }
            Node::Array { children, .. } => match &children[fragment(hash, shift)] {
                Some(child) => node = child.as_ref(),
                None => return None,
            },
            Node::BitmapIndexed { bitmap, children } => {
                let bit = bit_position(hash, shift);
                if bitmap & bit == 0 {
                    return None;
                }
                node = children[sparse_index(*bitmap, bit)].as_ref();
            }
        }
        shift += BITS_PER_LEVEL;
    }
}

// =============================================================================
// Insert
// =============================================================================

/// Inserts `key` into the subtree at `shift`.
///
/// Returns the rebuilt subtree and whether a new entry was added (as opposed
/// to a value being replaced). Siblings of the path are shared.
pub(crate) fn insert<K, V>(
    node: &NodeReference<K, V>,
    shift: u32,
    hash: u32,
    key: K,
    value: V,
) -> (NodeReference<K, V>, bool)
where
    K: Clone + Eq,
    V: Clone,
{
    match &**node {
        Node::Empty => (ReferenceCounter::new(Node::Leaf { hash, key, value }), true),
        Node::Leaf {
            hash: leaf_hash,
            key: leaf_key,
            value: leaf_value,
        } => {
            if *leaf_hash != hash {
                let incoming = ReferenceCounter::new(Node::Leaf { hash, key, value });
                let branch = branch_pair(shift, node.clone(), *leaf_hash, incoming, hash);
                (ReferenceCounter::new(branch), true)
            } else if *leaf_key == key {
                (ReferenceCounter::new(Node::Leaf { hash, key, value }), false)
            } else {
                trace_structure!("hash collision at {hash:#010x}, creating collision node");
                let pairs = smallvec![(leaf_key.clone(), leaf_value.clone()), (key, value)];
                (
                    ReferenceCounter::new(Node::HashCollision { hash, pairs }),
                    true,
                )
            }
        }
        Node::HashCollision {
            hash: collision_hash,
            pairs,
        } => {
            if *collision_hash != hash {
                let incoming = ReferenceCounter::new(Node::Leaf { hash, key, value });
                let branch = branch_pair(shift, node.clone(), *collision_hash, incoming, hash);
                return (ReferenceCounter::new(branch), true);
            }

            let mut new_pairs = pairs.clone();
            let added = match new_pairs.iter().position(|(pair_key, _)| *pair_key == key) {
                Some(position) => {
                    new_pairs[position] = (key, value);
                    false
                }
                None => {
                    new_pairs.push((key, value));
                    true
                }
            };
            (
                ReferenceCounter::new(Node::HashCollision {
                    hash,
                    pairs: new_pairs,
                }),
                added,
            )
        }
        Node::Array { count, children } => {
            let index = fragment(hash, shift);
            let mut new_children = children.clone();
            let (new_count, added) = match &children[index] {
                Some(child) => {
                    let (new_child, added) =
                        insert(child, shift + BITS_PER_LEVEL, hash, key, value);
                    new_children[index] = Some(new_child);
                    (*count, added)
                }
                None => {
                    new_children[index] =
                        Some(ReferenceCounter::new(Node::Leaf { hash, key, value }));
                    (count + 1, true)
                }
            };
            (
                ReferenceCounter::new(Node::Array {
                    count: new_count,
                    children: new_children,
                }),
                added,
            )
        }
        Node::BitmapIndexed { bitmap, children } => {
            let bit = bit_position(hash, shift);
            let index = sparse_index(*bitmap, bit);

            if bitmap & bit != 0 {
                let (new_child, added) =
                    insert(&children[index], shift + BITS_PER_LEVEL, hash, key, value);
                let mut new_children = children.clone();
                new_children[index] = new_child;
                return (
                    ReferenceCounter::new(Node::BitmapIndexed {
                        bitmap: *bitmap,
                        children: new_children,
                    }),
                    added,
                );
            }

            let leaf = ReferenceCounter::new(Node::Leaf { hash, key, value });
            if children.len() >= ARRAY_NODE_THRESHOLD {
                trace_structure!(
                    "promoting bitmap node with {} children to array node at shift {shift}",
                    children.len()
                );
                let mut slots = empty_slots();
                for (slot, child) in occupied_slots(*bitmap).zip(children.iter()) {
                    slots[slot] = Some(child.clone());
                }
                slots[fragment(hash, shift)] = Some(leaf);
                return (
                    ReferenceCounter::new(Node::Array {
                        count: children.len() + 1,
                        children: slots,
                    }),
                    true,
                );
            }

            let mut new_children = children.clone();
            new_children.insert(index, leaf);
            (
                ReferenceCounter::new(Node::BitmapIndexed {
                    bitmap: bitmap | bit,
                    children: new_children,
                }),
                true,
            )
        }
    }
}

/// Builds the smallest branch holding two terminal nodes with distinct hashes.
///
/// Recurses one level deeper while both hashes select the same slot.
fn branch_pair<K, V>(
    shift: u32,
    existing: NodeReference<K, V>,
    existing_hash: u32,
    incoming: NodeReference<K, V>,
    incoming_hash: u32,
) -> Node<K, V> {
    debug_assert_ne!(existing_hash, incoming_hash);

    let existing_bit = bit_position(existing_hash, shift);
    let incoming_bit = bit_position(incoming_hash, shift);

    if existing_bit == incoming_bit {
        let child = branch_pair(
            shift + BITS_PER_LEVEL,
            existing,
            existing_hash,
            incoming,
            incoming_hash,
        );
        Node::BitmapIndexed {
            bitmap: existing_bit,
            children: smallvec![ReferenceCounter::new(child)],
        }
    } else {
        let children = if existing_bit < incoming_bit {
            smallvec![existing, incoming]
        } else {
            smallvec![incoming, existing]
        };
        Node::BitmapIndexed {
            bitmap: existing_bit | incoming_bit,
            children,
        }
    }
}

// =============================================================================
// Remove
// =============================================================================

/// Removes `key` from the subtree at `shift`.
pub(crate) fn remove<K, V, Q>(node: &NodeReference<K, V>, shift: u32, hash: u32, key: &Q) -> Removal<K, V>
where
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Eq + ?Sized,
{
    match &**node {
        Node::Empty => Removal::Absent,
        Node::Leaf {
            hash: leaf_hash,
            key: leaf_key,
            ..
        } => {
            if *leaf_hash == hash && leaf_key.borrow() == key {
                Removal::Emptied
            } else {
                Removal::Absent
            }
        }
        Node::HashCollision {
            hash: collision_hash,
            pairs,
        } => {
            if *collision_hash != hash {
                return Removal::Absent;
            }
            let Some(position) = pairs
                .iter()
                .position(|(pair_key, _)| pair_key.borrow() == key)
            else {
                return Removal::Absent;
            };

            let mut remaining = pairs.clone();
            remaining.remove(position);
            Removal::Replaced(collision_or_leaf(*collision_hash, remaining))
        }
        Node::Array { count, children } => {
            let index = fragment(hash, shift);
            let Some(child) = &children[index] else {
                return Removal::Absent;
            };

            match remove(child, shift + BITS_PER_LEVEL, hash, key) {
                Removal::Absent => Removal::Absent,
                Removal::Replaced(new_child) => {
                    let mut new_children = children.clone();
                    new_children[index] = Some(new_child);
                    Removal::Replaced(ReferenceCounter::new(Node::Array {
                        count: *count,
                        children: new_children,
                    }))
                }
                Removal::Emptied => {
                    let mut new_children = children.clone();
                    new_children[index] = None;
                    array_or_demote(count - 1, new_children)
                        .map_or(Removal::Emptied, Removal::Replaced)
                }
            }
        }
        Node::BitmapIndexed { bitmap, children } => {
            let bit = bit_position(hash, shift);
            if bitmap & bit == 0 {
                return Removal::Absent;
            }
            let index = sparse_index(*bitmap, bit);

            match remove(&children[index], shift + BITS_PER_LEVEL, hash, key) {
                Removal::Absent => Removal::Absent,
                Removal::Replaced(new_child) => {
                    let mut new_children = children.clone();
                    new_children[index] = new_child;
                    bitmap_or_collapse(*bitmap, new_children)
                        .map_or(Removal::Emptied, Removal::Replaced)
                }
                Removal::Emptied => {
                    let mut new_children = children.clone();
                    new_children.remove(index);
                    bitmap_or_collapse(bitmap & !bit, new_children)
                        .map_or(Removal::Emptied, Removal::Replaced)
                }
            }
        }
    }
}

/// Rebuilds what is left of a collision node.
///
/// A single surviving pair becomes a plain leaf.
fn collision_or_leaf<K, V>(hash: u32, mut pairs: CollisionPairs<K, V>) -> NodeReference<K, V> {
    debug_assert!(!pairs.is_empty());

    if pairs.len() == 1 {
        trace_structure!("collision node at {hash:#010x} dissolved into a leaf");
        let (key, value) = pairs.remove(0);
        ReferenceCounter::new(Node::Leaf { hash, key, value })
    } else {
        ReferenceCounter::new(Node::HashCollision { hash, pairs })
    }
}

/// Normalizes a shrunken bitmap node.
///
/// Returns `None` when no children remain and hoists a single terminal child.
fn bitmap_or_collapse<K, V>(
    bitmap: u32,
    children: BitmapChildren<K, V>,
) -> Option<NodeReference<K, V>> {
    match children.len() {
        0 => None,
        1 if children[0].is_terminal() => children.into_iter().next(),
        _ => Some(ReferenceCounter::new(Node::BitmapIndexed { bitmap, children })),
    }
}

/// Normalizes a shrunken array node, demoting it below the threshold.
fn array_or_demote<K, V>(count: usize, children: Box<ArraySlots<K, V>>) -> Option<NodeReference<K, V>> {
    if count >= ARRAY_NODE_THRESHOLD {
        return Some(ReferenceCounter::new(Node::Array { count, children }));
    }

    trace_structure!("demoting array node with {count} children to bitmap node");
    let mut bitmap = 0;
    let mut packed = BitmapChildren::with_capacity(count);
    let slots = *children;
    for (slot, child) in slots.into_iter().enumerate() {
        if let Some(child) = child {
            bitmap |= 1 << slot;
            packed.push(child);
        }
    }
    bitmap_or_collapse(bitmap, packed)
}

// =============================================================================
// Filter
// =============================================================================

/// Keeps the entries satisfying `predicate`, counting the dropped ones.
///
/// Subtrees in which every entry survives are reported as `Kept` so the
/// caller can share them unchanged.
pub(crate) fn retain<K, V, F>(node: &NodeReference<K, V>, predicate: &mut F, dropped: &mut usize) -> Retention<K, V>
where
    K: Clone,
    V: Clone,
    F: FnMut(&K, &V) -> bool,
{
    match &**node {
        Node::Empty => Retention::Kept,
        Node::Leaf { key, value, .. } => {
            if predicate(key, value) {
                Retention::Kept
            } else {
                *dropped += 1;
                Retention::Dropped
            }
        }
        Node::HashCollision { hash, pairs } => {
            let survivors: CollisionPairs<K, V> = pairs
                .iter()
                .filter(|(key, value)| predicate(key, value))
                .cloned()
                .collect();
            *dropped += pairs.len() - survivors.len();

            if survivors.len() == pairs.len() {
                Retention::Kept
            } else if survivors.is_empty() {
                Retention::Dropped
            } else {
                Retention::Rebuilt(collision_or_leaf(*hash, survivors))
            }
        }
        Node::Array { children, .. } => {
            let mut changed = false;
            let mut count = 0;
            let mut slots = empty_slots();
            for (slot, child) in children.iter().enumerate() {
                let Some(child) = child else { continue };
                match retain(child, predicate, dropped) {
                    Retention::Kept => {
                        slots[slot] = Some(child.clone());
                        count += 1;
                    }
                    Retention::Rebuilt(new_child) => {
                        changed = true;
                        slots[slot] = Some(new_child);
                        count += 1;
                    }
                    Retention::Dropped => changed = true,
                }
            }

            if changed {
                array_or_demote(count, slots).map_or(Retention::Dropped, Retention::Rebuilt)
            } else {
                Retention::Kept
            }
        }
        Node::BitmapIndexed { bitmap, children } => {
            let mut changed = false;
            let mut new_bitmap = 0;
            let mut new_children = BitmapChildren::new();
            for (slot, child) in occupied_slots(*bitmap).zip(children.iter()) {
                match retain(child, predicate, dropped) {
                    Retention::Kept => {
                        new_bitmap |= 1 << slot;
                        new_children.push(child.clone());
                    }
                    Retention::Rebuilt(new_child) => {
                        changed = true;
                        new_bitmap |= 1 << slot;
                        new_children.push(new_child);
                    }
                    Retention::Dropped => changed = true,
                }
            }

            if changed {
                bitmap_or_collapse(new_bitmap, new_children)
                    .map_or(Retention::Dropped, Retention::Rebuilt)
            } else {
                Retention::Kept
            }
        }
    }
}

// =============================================================================
// Map
// =============================================================================

/// Rebuilds the whole subtree with every value transformed.
///
/// The shape of the result is identical to the input.
pub(crate) fn map_values<K, V, W, F>(node: &Node<K, V>, function: &mut F) -> Node<K, W>
where
    K: Clone,
    F: FnMut(&K, &V) -> W,
{
    match node {
        Node::Empty => Node::Empty,
        Node::Leaf { hash, key, value } => Node::Leaf {
            hash: *hash,
            key: key.clone(),
            value: function(key, value),
        },
        Node::HashCollision { hash, pairs } => {
            let mut new_pairs = CollisionPairs::with_capacity(pairs.len());
            for (key, value) in pairs {
                new_pairs.push((key.clone(), function(key, value)));
            }
            Node::HashCollision {
                hash: *hash,
                pairs: new_pairs,
            }
        }
        Node::Array { count, children } => {
            let mut slots = empty_slots();
            for (slot, child) in children.iter().enumerate() {
                if let Some(child) = child {
                    slots[slot] = Some(ReferenceCounter::new(map_values(child, function)));
                }
            }
            Node::Array {
                count: *count,
                children: slots,
            }
        }
        Node::BitmapIndexed { bitmap, children } => {
            let mut new_children = BitmapChildren::with_capacity(children.len());
            for child in children {
                new_children.push(ReferenceCounter::new(map_values(child, function)));
            }
            Node::BitmapIndexed {
                bitmap: *bitmap,
                children: new_children,
            }
        }
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// A position inside one node that is being walked.
enum Cursor<'a, K, V> {
    Bitmap(std::slice::Iter<'a, NodeReference<K, V>>),
    Array(std::slice::Iter<'a, Option<NodeReference<K, V>>>),
    Collision(std::slice::Iter<'a, (K, V)>),
}

enum Step<'a, K, V> {
    Descend(&'a Node<K, V>),
    Skip,
    Exhausted,
}

/// Depth-first walk over every entry, in ascending slot order per level.
///
/// The stack never exceeds one cursor per branching level plus one for a
/// collision node.
pub(crate) struct Entries<'a, K, V> {
    stack: ArrayVec<Cursor<'a, K, V>, CURSOR_STACK_CAPACITY>,
    pending: Option<(&'a K, &'a V)>,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        let mut entries = Self {
            stack: ArrayVec::new(),
            pending: None,
        };
        entries.pending = entries.enter(root);
        entries
    }

    /// Pushes a cursor for `node`, or yields it directly if it is a leaf.
    fn enter(&mut self, node: &'a Node<K, V>) -> Option<(&'a K, &'a V)> {
        match node {
            Node::Empty => None,
            Node::Leaf { key, value, .. } => Some((key, value)),
            Node::HashCollision { pairs, .. } => {
                self.stack.push(Cursor::Collision(pairs.iter()));
                None
            }
            Node::Array { children, .. } => {
                self.stack.push(Cursor::Array(children.iter()));
                None
            }
            Node::BitmapIndexed { children, .. } => {
                self.stack.push(Cursor::Bitmap(children.iter()));
                None
            }
        }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.pending.take() {
            return Some(entry);
        }

        loop {
            let step = match self.stack.last_mut()? {
                Cursor::Collision(pairs) => match pairs.next() {
                    Some((key, value)) => return Some((key, value)),
                    None => Step::Exhausted,
                },
                Cursor::Bitmap(children) => children
                    .next()
                    .map_or(Step::Exhausted, |child| Step::Descend(child.as_ref())),
                Cursor::Array(slots) => match slots.next() {
                    Some(Some(child)) => Step::Descend(child.as_ref()),
                    Some(None) => Step::Skip,
                    None => Step::Exhausted,
                },
            };

            match step {
                Step::Descend(child) => {
                    if let Some(entry) = self.enter(child) {
                        return Some(entry);
                    }
                }
                Step::Skip => {}
                Step::Exhausted => {
                    self.stack.pop();
                }
            }
        }
    }
}

// =============================================================================
// Invariant Checking
// =============================================================================

/// Verifies the shape invariants of a subtree and returns its entry count.
#[cfg(test)]
pub(crate) fn check_invariants<K, V>(node: &Node<K, V>, shift: u32, is_root: bool) -> usize
where
    K: Eq + std::hash::Hash,
{
    use super::hashing::compute_hash;

    match node {
        Node::Empty => {
            assert!(is_root, "empty node stored as a child");
            0
        }
        Node::Leaf { hash, key, .. } => {
            assert_eq!(*hash, compute_hash(key), "leaf hash does not match its key");
            1
        }
        Node::HashCollision { hash, pairs } => {
            assert!(pairs.len() >= 2, "collision node with fewer than two pairs");
            for (index, (key, _)) in pairs.iter().enumerate() {
                assert_eq!(*hash, compute_hash(key), "collision pair with foreign hash");
                assert!(
                    pairs[index + 1..].iter().all(|(other, _)| other != key),
                    "duplicate key in collision node"
                );
            }
            pairs.len()
        }
        Node::Array { count, children } => {
            let occupied = children.iter().filter(|slot| slot.is_some()).count();
            assert_eq!(*count, occupied, "array node count out of sync");
            assert!(occupied >= ARRAY_NODE_THRESHOLD, "array node below threshold");
            children
                .iter()
                .flatten()
                .map(|child| check_invariants(child, shift + BITS_PER_LEVEL, false))
                .sum()
        }
        Node::BitmapIndexed { bitmap, children } => {
            assert_eq!(bitmap.count_ones() as usize, children.len(), "bitmap popcount mismatch");
            assert!(children.len() <= ARRAY_NODE_THRESHOLD, "bitmap node above threshold");
            assert!(!children.is_empty(), "empty bitmap node");
            assert!(
                children.len() > 1 || !children[0].is_terminal(),
                "bitmap node wrapping a single terminal child"
            );
            children
                .iter()
                .map(|child| check_invariants(child, shift + BITS_PER_LEVEL, false))
                .sum()
        }
    }
}
