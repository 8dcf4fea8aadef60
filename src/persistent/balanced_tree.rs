//! Weight-balanced binary search tree backing [`PersistentTreeSet`].
//!
//! Every `Bin` caches the size of its subtree. Balance is restored after each
//! structural edit by [`balance`], which compares sibling sizes against
//! [`DELTA`] and chooses a single or double rotation with [`RATIO`].
//!
//! The set algebra is built from three primitives:
//!
//! - [`join`] links two trees around a value that sits between them
//! - [`merge`] links two trees whose elements are already ordered
//! - [`glue`] links the two children of a deleted node
//!
//! Union and difference use the hedge technique: one tree drives the
//! recursion and the other is trimmed to the open interval between the
//! driving tree's ancestors, so whole subtrees are linked instead of being
//! reinserted element by element.
//!
//! Rotation helpers and the extreme-element extractors are partial. They
//! require a `Bin` where the balance discipline guarantees one, and treat a
//! `Tip` as a broken internal invariant.
//!
//! [`PersistentTreeSet`]: super::PersistentTreeSet

use std::borrow::Borrow;
use std::cmp::Ordering;

use super::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Maximum size factor between sibling subtrees.
pub(crate) const DELTA: usize = 4;

/// Threshold that selects a double rotation over a single one.
pub(crate) const RATIO: usize = 2;

const ROTATION_ON_TIP: &str = "rotation requires a non-empty subtree";
const EXTREME_OF_TIP: &str = "cannot extract the extreme element of an empty tree";

// =============================================================================
// Tree Definition
// =============================================================================

pub(crate) struct BinNode<A> {
    pub(crate) size: usize,
    pub(crate) value: A,
    pub(crate) left: Tree<A>,
    pub(crate) right: Tree<A>,
}

/// A size-annotated binary search tree.
pub(crate) enum Tree<A> {
    Tip,
    Bin(ReferenceCounter<BinNode<A>>),
}

impl<A> Clone for Tree<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Tip => Self::Tip,
            Self::Bin(node) => Self::Bin(node.clone()),
        }
    }
}

impl<A> Tree<A> {
    /// Builds a node without rebalancing; the caller guarantees balance.
    pub(crate) fn bin(value: A, left: Self, right: Self) -> Self {
        Self::Bin(ReferenceCounter::new(BinNode {
            size: left.size() + right.size() + 1,
            value,
            left,
            right,
        }))
    }

    pub(crate) fn singleton(value: A) -> Self {
        Self::bin(value, Self::Tip, Self::Tip)
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Tip => 0,
            Self::Bin(node) => node.size,
        }
    }

    #[inline]
    pub(crate) const fn is_tip(&self) -> bool {
        matches!(self, Self::Tip)
    }

    /// Returns `true` if both trees are the same node (or both empty).
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Tip, Self::Tip) => true,
            (Self::Bin(left), Self::Bin(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    fn expect_bin(&self, message: &'static str) -> &BinNode<A> {
        match self {
            Self::Bin(node) => node,
            Self::Tip => unreachable!("{message}"),
        }
    }

    pub(crate) fn contains<Q>(&self, value: &Q) -> bool
    where
        A: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self;
        while let Self::Bin(node) = current {
            current = match value.cmp(node.value.borrow()) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return true,
            };
        }
        false
    }

    pub(crate) fn min(&self) -> Option<&A> {
        let Self::Bin(root) = self else {
            return None;
        };
        let mut node: &BinNode<A> = root;
        while let Self::Bin(left) = &node.left {
            node = left.as_ref();
        }
        Some(&node.value)
    }

    pub(crate) fn max(&self) -> Option<&A> {
        let Self::Bin(root) = self else {
            return None;
        };
        let mut node: &BinNode<A> = root;
        while let Self::Bin(right) = &node.right {
            node = right.as_ref();
        }
        Some(&node.value)
    }
}

// =============================================================================
// Balancing
// =============================================================================

/// Rebuilds a node, rotating once if the sibling sizes are out of balance.
///
/// Both subtrees must be balanced and at most one edit away from a balanced
/// pair.
pub(crate) fn balance<A: Clone>(value: A, left: Tree<A>, right: Tree<A>) -> Tree<A> {
    let left_size = left.size();
    let right_size = right.size();

    if left_size + right_size <= 1 {
        Tree::bin(value, left, right)
    } else if right_size >= DELTA * left_size {
        rotate_left(value, left, right)
    } else if left_size >= DELTA * right_size {
        rotate_right(value, left, right)
    } else {
        Tree::bin(value, left, right)
    }
}

fn rotate_left<A: Clone>(value: A, left: Tree<A>, right: Tree<A>) -> Tree<A> {
    let node = right.expect_bin(ROTATION_ON_TIP);
    if node.left.size() < RATIO * node.right.size() {
        trace_structure!("single left rotation over {} elements", left.size() + node.size + 1);
        single_left(value, left, &right)
    } else {
        trace_structure!("double left rotation over {} elements", left.size() + node.size + 1);
        double_left(value, left, &right)
    }
}

fn rotate_right<A: Clone>(value: A, left: Tree<A>, right: Tree<A>) -> Tree<A> {
    let node = left.expect_bin(ROTATION_ON_TIP);
    if node.right.size() < RATIO * node.left.size() {
        trace_structure!("single right rotation over {} elements", node.size + right.size() + 1);
        single_right(value, &left, right)
    } else {
        trace_structure!("double right rotation over {} elements", node.size + right.size() + 1);
        double_right(value, &left, right)
    }
}

fn single_left<A: Clone>(value: A, left: Tree<A>, right: &Tree<A>) -> Tree<A> {
    let node = right.expect_bin(ROTATION_ON_TIP);
    Tree::bin(
        node.value.clone(),
        Tree::bin(value, left, node.left.clone()),
        node.right.clone(),
    )
}

fn single_right<A: Clone>(value: A, left: &Tree<A>, right: Tree<A>) -> Tree<A> {
    let node = left.expect_bin(ROTATION_ON_TIP);
    Tree::bin(
        node.value.clone(),
        node.left.clone(),
        Tree::bin(value, node.right.clone(), right),
    )
}

fn double_left<A: Clone>(value: A, left: Tree<A>, right: &Tree<A>) -> Tree<A> {
    let node = right.expect_bin(ROTATION_ON_TIP);
    let inner = node.left.expect_bin(ROTATION_ON_TIP);
    Tree::bin(
        inner.value.clone(),
        Tree::bin(value, left, inner.left.clone()),
        Tree::bin(node.value.clone(), inner.right.clone(), node.right.clone()),
    )
}

fn double_right<A: Clone>(value: A, left: &Tree<A>, right: Tree<A>) -> Tree<A> {
    let node = left.expect_bin(ROTATION_ON_TIP);
    let inner = node.right.expect_bin(ROTATION_ON_TIP);
    Tree::bin(
        inner.value.clone(),
        Tree::bin(node.value.clone(), node.left.clone(), inner.left.clone()),
        Tree::bin(value, inner.right.clone(), right),
    )
}

// =============================================================================
// Insert and Delete
// =============================================================================

/// Inserts `value`, or returns `None` if an equal element is present.
pub(crate) fn insert<A: Clone + Ord>(tree: &Tree<A>, value: A) -> Option<Tree<A>> {
    let Tree::Bin(node) = tree else {
        return Some(Tree::singleton(value));
    };

    match value.cmp(&node.value) {
        Ordering::Less => insert(&node.left, value)
            .map(|left| balance(node.value.clone(), left, node.right.clone())),
        Ordering::Greater => insert(&node.right, value)
            .map(|right| balance(node.value.clone(), node.left.clone(), right)),
        Ordering::Equal => None,
    }
}

/// Removes `value`, or returns `None` if no equal element is present.
pub(crate) fn remove<A, Q>(tree: &Tree<A>, value: &Q) -> Option<Tree<A>>
where
    A: Clone + Borrow<Q>,
    Q: Ord + ?Sized,
{
    let Tree::Bin(node) = tree else {
        return None;
    };

    match value.cmp(node.value.borrow()) {
        Ordering::Less => remove(&node.left, value)
            .map(|left| balance(node.value.clone(), left, node.right.clone())),
        Ordering::Greater => remove(&node.right, value)
            .map(|right| balance(node.value.clone(), node.left.clone(), right)),
        Ordering::Equal => Some(glue(node.left.clone(), node.right.clone())),
    }
}

/// Links the two children of a removed node.
///
/// Both trees must be balanced with respect to each other.
pub(crate) fn glue<A: Clone>(left: Tree<A>, right: Tree<A>) -> Tree<A> {
    if left.is_tip() {
        return right;
    }
    if right.is_tip() {
        return left;
    }

    if left.size() > right.size() {
        let (maximum, rest) = delete_find_max(&left);
        balance(maximum, rest, right)
    } else {
        let (minimum, rest) = delete_find_min(&right);
        balance(minimum, left, rest)
    }
}

/// Splits off the smallest element.
///
/// # Panics
///
/// Panics if `tree` is empty.
pub(crate) fn delete_find_min<A: Clone>(tree: &Tree<A>) -> (A, Tree<A>) {
    let node = tree.expect_bin(EXTREME_OF_TIP);
    if node.left.is_tip() {
        (node.value.clone(), node.right.clone())
    } else {
        let (minimum, left) = delete_find_min(&node.left);
        (
            minimum,
            balance(node.value.clone(), left, node.right.clone()),
        )
    }
}

/// Splits off the largest element.
///
/// # Panics
///
/// Panics if `tree` is empty.
pub(crate) fn delete_find_max<A: Clone>(tree: &Tree<A>) -> (A, Tree<A>) {
    let node = tree.expect_bin(EXTREME_OF_TIP);
    if node.right.is_tip() {
        (node.value.clone(), node.left.clone())
    } else {
        let (maximum, right) = delete_find_max(&node.right);
        (
            maximum,
            balance(node.value.clone(), node.left.clone(), right),
        )
    }
}

// =============================================================================
// Join and Merge
// =============================================================================

/// Adds `value` below every element of `tree`.
pub(crate) fn insert_min<A: Clone>(value: A, tree: &Tree<A>) -> Tree<A> {
    match tree {
        Tree::Tip => Tree::singleton(value),
        Tree::Bin(node) => balance(
            node.value.clone(),
            insert_min(value, &node.left),
            node.right.clone(),
        ),
    }
}

/// Adds `value` above every element of `tree`.
pub(crate) fn insert_max<A: Clone>(value: A, tree: &Tree<A>) -> Tree<A> {
    match tree {
        Tree::Tip => Tree::singleton(value),
        Tree::Bin(node) => balance(
            node.value.clone(),
            node.left.clone(),
            insert_max(value, &node.right),
        ),
    }
}

/// Links `left`, `value` and `right`, where every element of `left` is below
/// `value` and every element of `right` is above it.
///
/// The trees may differ arbitrarily in size; the smaller one is pushed down
/// the near spine of the larger one.
pub(crate) fn join<A: Clone>(value: A, left: Tree<A>, right: Tree<A>) -> Tree<A> {
    let (Tree::Bin(left_node), Tree::Bin(right_node)) = (&left, &right) else {
        return if left.is_tip() {
            insert_min(value, &right)
        } else {
            insert_max(value, &left)
        };
    };

    if DELTA * left_node.size <= right_node.size {
        balance(
            right_node.value.clone(),
            join(value, left.clone(), right_node.left.clone()),
            right_node.right.clone(),
        )
    } else if DELTA * right_node.size <= left_node.size {
        balance(
            left_node.value.clone(),
            left_node.left.clone(),
            join(value, left_node.right.clone(), right.clone()),
        )
    } else {
        Tree::bin(value, left, right)
    }
}

/// Links two trees where every element of `left` is below every element of
/// `right`.
pub(crate) fn merge<A: Clone>(left: Tree<A>, right: Tree<A>) -> Tree<A> {
    let (Tree::Bin(left_node), Tree::Bin(right_node)) = (&left, &right) else {
        return if left.is_tip() { right } else { left };
    };

    if DELTA * left_node.size <= right_node.size {
        balance(
            right_node.value.clone(),
            merge(left.clone(), right_node.left.clone()),
            right_node.right.clone(),
        )
    } else if DELTA * right_node.size <= left_node.size {
        balance(
            left_node.value.clone(),
            left_node.left.clone(),
            merge(left_node.right.clone(), right.clone()),
        )
    } else {
        glue(left, right)
    }
}

// =============================================================================
// Range Restriction
// =============================================================================

/// Descends to the first subtree whose root lies strictly between the bounds.
///
/// `None` bounds are unbounded. The returned subtree may still contain
/// elements outside the bounds below its root.
pub(crate) fn trim<A: Ord>(low: Option<&A>, high: Option<&A>, tree: &Tree<A>) -> Tree<A> {
    let mut current = tree;
    while let Tree::Bin(node) = current {
        if low.is_some_and(|low| node.value <= *low) {
            current = &node.right;
        } else if high.is_some_and(|high| node.value >= *high) {
            current = &node.left;
        } else {
            break;
        }
    }
    current.clone()
}

/// Keeps the elements strictly greater than `low`.
pub(crate) fn filter_greater<A: Clone + Ord>(low: Option<&A>, tree: &Tree<A>) -> Tree<A> {
    match low {
        None => tree.clone(),
        Some(low) => greater_than(low, tree),
    }
}

fn greater_than<A: Clone + Ord>(low: &A, tree: &Tree<A>) -> Tree<A> {
    let Tree::Bin(node) = tree else {
        return Tree::Tip;
    };
    match low.cmp(&node.value) {
        Ordering::Less => join(
            node.value.clone(),
            greater_than(low, &node.left),
            node.right.clone(),
        ),
        Ordering::Equal => node.right.clone(),
        Ordering::Greater => greater_than(low, &node.right),
    }
}

/// Keeps the elements strictly less than `high`.
pub(crate) fn filter_less<A: Clone + Ord>(high: Option<&A>, tree: &Tree<A>) -> Tree<A> {
    match high {
        None => tree.clone(),
        Some(high) => less_than(high, tree),
    }
}

fn less_than<A: Clone + Ord>(high: &A, tree: &Tree<A>) -> Tree<A> {
    let Tree::Bin(node) = tree else {
        return Tree::Tip;
    };
    match node.value.cmp(high) {
        Ordering::Less => join(
            node.value.clone(),
            node.left.clone(),
            less_than(high, &node.right),
        ),
        Ordering::Equal => node.left.clone(),
        Ordering::Greater => less_than(high, &node.left),
    }
}

// =============================================================================
// Set Algebra
// =============================================================================

/// Union of two trees; on ties the element of `first` is kept.
pub(crate) fn union<A: Clone + Ord>(first: &Tree<A>, second: &Tree<A>) -> Tree<A> {
    if first.is_tip() {
        second.clone()
    } else if second.is_tip() {
        first.clone()
    } else {
        hedge_union(None, None, first, second)
    }
}

/// Union restricted to the open interval `(low, high)`.
///
/// `first` drives the recursion; `second` is trimmed to each half.
pub(crate) fn hedge_union<A: Clone + Ord>(
    low: Option<&A>,
    high: Option<&A>,
    first: &Tree<A>,
    second: &Tree<A>,
) -> Tree<A> {
    let Tree::Bin(second_node) = second else {
        return first.clone();
    };
    let Tree::Bin(node) = first else {
        return join(
            second_node.value.clone(),
            filter_greater(low, &second_node.left),
            filter_less(high, &second_node.right),
        );
    };

    let middle = Some(&node.value);
    let left = hedge_union(low, middle, &node.left, &trim(low, middle, second));
    let right = hedge_union(middle, high, &node.right, &trim(middle, high, second));

    if left.ptr_eq(&node.left) && right.ptr_eq(&node.right) {
        first.clone()
    } else {
        join(node.value.clone(), left, right)
    }
}

/// Elements of `first` that are not in `second`.
pub(crate) fn difference<A: Clone + Ord>(first: &Tree<A>, second: &Tree<A>) -> Tree<A> {
    if first.is_tip() {
        Tree::Tip
    } else if second.is_tip() {
        first.clone()
    } else {
        hedge_difference(None, None, first, second)
    }
}

/// Difference restricted to the open interval `(low, high)`.
///
/// `second` drives the recursion; `first` is trimmed to each half.
pub(crate) fn hedge_difference<A: Clone + Ord>(
    low: Option<&A>,
    high: Option<&A>,
    first: &Tree<A>,
    second: &Tree<A>,
) -> Tree<A> {
    let Tree::Bin(node) = first else {
        return Tree::Tip;
    };
    let Tree::Bin(second_node) = second else {
        return join(
            node.value.clone(),
            filter_greater(low, &node.left),
            filter_less(high, &node.right),
        );
    };

    let middle = Some(&second_node.value);
    merge(
        hedge_difference(low, middle, &trim(low, middle, first), &second_node.left),
        hedge_difference(middle, high, &trim(middle, high, first), &second_node.right),
    )
}

/// Elements present in both trees, taken from `first`.
pub(crate) fn intersection<A: Clone + Ord>(first: &Tree<A>, second: &Tree<A>) -> Tree<A> {
    let Tree::Bin(node) = first else {
        return Tree::Tip;
    };
    if second.is_tip() {
        return Tree::Tip;
    }

    let (less, found, greater) = split_lookup(second, &node.value);
    let left = intersection(&node.left, &less);
    let right = intersection(&node.right, &greater);

    if found.is_some() {
        join(node.value.clone(), left, right)
    } else {
        merge(left, right)
    }
}

/// Returns `true` if every element of `first` is in `second`.
pub(crate) fn is_subset<A: Clone + Ord>(first: &Tree<A>, second: &Tree<A>) -> bool {
    first.size() <= second.size() && is_subset_of(first, second)
}

fn is_subset_of<A: Clone + Ord>(first: &Tree<A>, second: &Tree<A>) -> bool {
    let Tree::Bin(node) = first else {
        return true;
    };
    if second.is_tip() {
        return false;
    }

    let (less, found, greater) = split_lookup(second, &node.value);
    found.is_some() && is_subset_of(&node.left, &less) && is_subset_of(&node.right, &greater)
}

/// Splits around `pivot` into the elements below it, the element equal to
/// it (if any), and the elements above it.
pub(crate) fn split_lookup<A, Q>(tree: &Tree<A>, pivot: &Q) -> (Tree<A>, Option<A>, Tree<A>)
where
    A: Clone + Borrow<Q>,
    Q: Ord + ?Sized,
{
    let Tree::Bin(node) = tree else {
        return (Tree::Tip, None, Tree::Tip);
    };

    match pivot.cmp(node.value.borrow()) {
        Ordering::Less => {
            let (less, found, greater) = split_lookup(&node.left, pivot);
            (
                less,
                found,
                join(node.value.clone(), greater, node.right.clone()),
            )
        }
        Ordering::Greater => {
            let (less, found, greater) = split_lookup(&node.right, pivot);
            (
                join(node.value.clone(), node.left.clone(), less),
                found,
                greater,
            )
        }
        Ordering::Equal => (
            node.left.clone(),
            Some(node.value.clone()),
            node.right.clone(),
        ),
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Keeps the elements satisfying `predicate`, visited in ascending order.
///
/// Returns `tree` itself when nothing is dropped.
pub(crate) fn filter<A, P>(tree: &Tree<A>, predicate: &mut P) -> Tree<A>
where
    A: Clone,
    P: FnMut(&A) -> bool,
{
    let Tree::Bin(node) = tree else {
        return Tree::Tip;
    };

    let left = filter(&node.left, predicate);
    let keep = predicate(&node.value);
    let right = filter(&node.right, predicate);

    if !keep {
        merge(left, right)
    } else if left.ptr_eq(&node.left) && right.ptr_eq(&node.right) {
        tree.clone()
    } else {
        join(node.value.clone(), left, right)
    }
}

/// Splits into the elements satisfying `predicate` and the rest.
pub(crate) fn partition<A, P>(tree: &Tree<A>, predicate: &mut P) -> (Tree<A>, Tree<A>)
where
    A: Clone,
    P: FnMut(&A) -> bool,
{
    let Tree::Bin(node) = tree else {
        return (Tree::Tip, Tree::Tip);
    };

    let (left_in, left_out) = partition(&node.left, predicate);
    let keep = predicate(&node.value);
    let (right_in, right_out) = partition(&node.right, predicate);

    if keep {
        if left_out.is_tip() && right_out.is_tip() {
            return (tree.clone(), Tree::Tip);
        }
        (
            join(node.value.clone(), left_in, right_in),
            merge(left_out, right_out),
        )
    } else {
        if left_in.is_tip() && right_in.is_tip() {
            return (Tree::Tip, tree.clone());
        }
        (
            merge(left_in, right_in),
            join(node.value.clone(), left_out, right_out),
        )
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// In-order walk from both ends.
///
/// `remaining` keeps the two cursors from crossing.
pub(crate) struct Walk<'a, A> {
    front: Vec<&'a BinNode<A>>,
    back: Vec<&'a BinNode<A>>,
    remaining: usize,
}

impl<'a, A> Walk<'a, A> {
    pub(crate) fn new(tree: &'a Tree<A>) -> Self {
        let mut walk = Self {
            front: Vec::new(),
            back: Vec::new(),
            remaining: tree.size(),
        };
        walk.push_left_spine(tree);
        walk.push_right_spine(tree);
        walk
    }

    #[inline]
    pub(crate) const fn remaining(&self) -> usize {
        self.remaining
    }

    fn push_left_spine(&mut self, mut tree: &'a Tree<A>) {
        while let Tree::Bin(node) = tree {
            self.front.push(node);
            tree = &node.left;
        }
    }

    fn push_right_spine(&mut self, mut tree: &'a Tree<A>) {
        while let Tree::Bin(node) = tree {
            self.back.push(node);
            tree = &node.right;
        }
    }
}

impl<'a, A> Iterator for Walk<'a, A> {
    type Item = &'a A;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.pop()?;
        self.push_left_spine(&node.right);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<A> DoubleEndedIterator for Walk<'_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.pop()?;
        self.push_right_spine(&node.left);
        self.remaining -= 1;
        Some(&node.value)
    }
}

/// In-order traversal that owns its stacks of shared nodes.
///
/// Elements are cloned out as they are visited; the nodes themselves are
/// only reference-counted, so each step is amortized O(1).
pub(crate) struct OwnedWalk<A> {
    front: Vec<ReferenceCounter<BinNode<A>>>,
    back: Vec<ReferenceCounter<BinNode<A>>>,
    remaining: usize,
}

impl<A> OwnedWalk<A> {
    pub(crate) fn new(tree: &Tree<A>) -> Self {
        let mut walk = Self {
            front: Vec::new(),
            back: Vec::new(),
            remaining: tree.size(),
        };
        walk.push_left_spine(tree);
        walk.push_right_spine(tree);
        walk
    }

    #[inline]
    pub(crate) const fn remaining(&self) -> usize {
        self.remaining
    }

    fn push_left_spine(&mut self, tree: &Tree<A>) {
        let mut current = tree.clone();
        while let Tree::Bin(node) = current {
            current = node.left.clone();
            self.front.push(node);
        }
    }

    fn push_right_spine(&mut self, tree: &Tree<A>) {
        let mut current = tree.clone();
        while let Tree::Bin(node) = current {
            current = node.right.clone();
            self.back.push(node);
        }
    }
}

impl<A: Clone> Iterator for OwnedWalk<A> {
    type Item = A;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.pop()?;
        self.push_left_spine(&node.right);
        self.remaining -= 1;
        Some(node.value.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<A: Clone> DoubleEndedIterator for OwnedWalk<A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.pop()?;
        self.push_right_spine(&node.left);
        self.remaining -= 1;
        Some(node.value.clone())
    }
}

// =============================================================================
// Invariant Checking
// =============================================================================

/// Verifies sizes, weight balance and ordering; returns the tree size.
#[cfg(test)]
pub(crate) fn check_invariants<A: Ord + std::fmt::Debug>(tree: &Tree<A>) -> usize {
    fn check<'a, A: Ord + std::fmt::Debug>(
        tree: &'a Tree<A>,
        low: Option<&'a A>,
        high: Option<&'a A>,
    ) -> usize {
        let Tree::Bin(node) = tree else {
            return 0;
        };
        if let Some(low) = low {
            assert!(node.value > *low, "{:?} not above {low:?}", node.value);
        }
        if let Some(high) = high {
            assert!(node.value < *high, "{:?} not below {high:?}", node.value);
        }

        let left_size = check(&node.left, low, Some(&node.value));
        let right_size = check(&node.right, Some(&node.value), high);
        assert_eq!(node.size, left_size + right_size + 1, "cached size is stale");
        assert!(
            left_size <= DELTA * right_size + 1 && right_size <= DELTA * left_size + 1,
            "unbalanced node {:?}: {left_size} vs {right_size}",
            node.value
        );
        node.size
    }

    check(tree, None, None)
}

// =============================================================================
// Tests
// =============================================================================
