//! A doubly linked list that flattens all its nodes onto a Vec for storage.
//! Nodes are addressed by their position in that Vec and link to each other
//! by position, so there are no pointers to dangle and splicing stays O(1).
//!
//! The list is used on its own and as the building block of
//! [`OrderedHashTable`](crate::OrderedHashTable), which keeps both its
//! collision chains and its key order in one of these.

use std::{
    cmp::Ordering,
    fmt,
    iter::FusedIterator,
    ops::{Index, IndexMut},
    ptr,
};

use log::trace;
use rand::Rng;

use crate::error::{Error, Result};

/// Alias for the index of a node in the linked list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// A node that lives in a linked list.
#[derive(Clone)]
struct Node<T> {
    /// The value being stored.
    value: T,

    /// The node previous to this one, `None` at the head.
    prev: Option<NodeHandle>,

    /// The next node in the list, `None` at the tail.
    next: Option<NodeHandle>,
}

#[cold]
#[inline(never)]
fn assert_free() -> ! {
    panic!("attempted to access a freed list node");
}

fn node_in<T>(store: &[Option<Node<T>>], handle: NodeHandle) -> &Node<T> {
    match &store[handle.0] {
        Some(node) => node,
        None => assert_free(),
    }
}

/// A doubly linked list with O(1) insertion and removal at both ends,
/// direction-optimized positional access and an in-place sort.
///
/// Storage is a single contiguous Vec of slots. Removed slots are freelisted
/// and reused by later pushes, and the whole store is released once the list
/// runs empty.
///
/// Positional operations ([`at`](Self::at), [`erase`](Self::erase),
/// [`insert`](Self::insert)) walk from whichever end is closer, so they cost
/// O(min(index, len - index)).
#[derive(Clone)]
pub struct LinkedList<T> {
    /// The node slots. `None` slots are on the freelist.
    store: Vec<Option<Node<T>>>,

    /// Slots in the store which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// The first node in the list.
    head: Option<NodeHandle>,

    /// The last node in the list.
    tail: Option<NodeHandle>,
}

impl<T> LinkedList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes before the
    /// backing store reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// The length of this linked list.
    pub fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn node(&self, handle: NodeHandle) -> &Node<T> {
        node_in(&self.store, handle)
    }

    fn node_mut(&mut self, handle: NodeHandle) -> &mut Node<T> {
        match &mut self.store[handle.0] {
            Some(node) => node,
            None => assert_free(),
        }
    }

    /// Places a node in the first free slot, or at the end of the store.
    fn alloc(&mut self, node: Node<T>) -> NodeHandle {
        match self.free.pop() {
            Some(handle) => {
                self.store[handle.0] = Some(node);
                handle
            }
            None => {
                self.store.push(Some(node));
                NodeHandle(self.store.len() - 1)
            }
        }
    }

    /// Takes a node out of its slot and freelists the slot. Does not touch
    /// the links of the neighbouring nodes.
    fn release(&mut self, handle: NodeHandle) -> Node<T> {
        let node = match self.store[handle.0].take() {
            Some(node) => node,
            None => assert_free(),
        };
        self.free.push(handle);

        // nothing can refer to any slot anymore, start over
        if self.free.len() == self.store.len() {
            self.store.clear();
            self.free.clear();
        }

        node
    }

    /// Pushes `value` onto the front of the list and returns a handle to its
    /// node.
    pub(crate) fn push_front_node(&mut self, value: T) -> NodeHandle {
        let handle = self.alloc(Node {
            value,
            prev: None,
            next: self.head,
        });

        match self.head {
            Some(head) => self.node_mut(head).prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);

        handle
    }

    /// Pushes `value` onto the back of the list and returns a handle to its
    /// node.
    pub(crate) fn push_back_node(&mut self, value: T) -> NodeHandle {
        let handle = self.alloc(Node {
            value,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);

        handle
    }

    /// Pushes `value` onto the front of the list.
    pub fn push_front(&mut self, value: T) {
        self.push_front_node(value);
    }

    /// Pushes `value` onto the back of the list.
    pub fn push_back(&mut self, value: T) {
        self.push_back_node(value);
    }

    /// Unlinks an arbitrary node from the list and returns its value.
    pub(crate) fn remove_node(&mut self, handle: NodeHandle) -> T {
        let node = self.release(handle);

        // link prev to next and next to prev so the node doesn't exist in
        // the chain anymore
        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        node.value
    }

    /// The value held by a node obtained from this list.
    pub(crate) fn node_value(&self, handle: NodeHandle) -> &T {
        &self.node(handle).value
    }

    pub(crate) fn node_value_mut(&mut self, handle: NodeHandle) -> &mut T {
        &mut self.node_mut(handle).value
    }

    /// The first node whose value satisfies `predicate`, searching from the
    /// head.
    pub(crate) fn find_node<P>(&self, mut predicate: P) -> Option<NodeHandle>
    where
        P: FnMut(&T) -> bool,
    {
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let node = self.node(handle);
            if predicate(&node.value) {
                return Some(handle);
            }
            cursor = node.next;
        }

        None
    }

    /// Pops the front node off the list if it exists.
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        Some(self.remove_node(head))
    }

    /// Pops the back node off the list if it exists.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        Some(self.remove_node(tail))
    }

    /// Like [`pop_front`](Self::pop_front), but an empty list yields
    /// `T::default()`.
    pub fn pop_front_or_default(&mut self) -> T
    where
        T: Default,
    {
        self.pop_front().unwrap_or_default()
    }

    /// Like [`pop_back`](Self::pop_back), but an empty list yields
    /// `T::default()`.
    pub fn pop_back_or_default(&mut self) -> T
    where
        T: Default,
    {
        self.pop_back().unwrap_or_default()
    }

    /// The first element, if any.
    pub fn front(&self) -> Option<&T> {
        self.head.map(|head| &self.node(head).value)
    }

    /// The last element, if any.
    pub fn back(&self) -> Option<&T> {
        self.tail.map(|tail| &self.node(tail).value)
    }

    /// Finds the node at `index`, walking from the head when it sits in the
    /// first half of the list and from the tail otherwise.
    fn locate(&self, index: usize) -> Result<NodeHandle> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }

        let mut cursor;
        if index < len / 2 {
            cursor = self.head;
            for _ in 0..index {
                cursor = cursor.and_then(|h| self.node(h).next);
            }
        } else {
            cursor = self.tail;
            for _ in index..len - 1 {
                cursor = cursor.and_then(|h| self.node(h).prev);
            }
        }

        cursor.ok_or(Error::IndexOutOfRange { index, len })
    }

    /// The element at `index`.
    pub fn at(&self, index: usize) -> Result<&T> {
        let handle = self.locate(index)?;
        Ok(&self.node(handle).value)
    }

    /// Like [`at`](Self::at), but mutable.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let handle = self.locate(index)?;
        Ok(&mut self.node_mut(handle).value)
    }

    /// Removes the element at `index` and returns it.
    pub fn erase(&mut self, index: usize) -> Result<T> {
        let handle = self.locate(index)?;
        Ok(self.remove_node(handle))
    }

    /// Inserts `value` before the element currently at `index`. An index
    /// equal to the length appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index == self.len() {
            self.push_back(value);
            return Ok(());
        }

        let right = self.locate(index)?;
        match self.node(right).prev {
            None => {
                self.push_front(value);
            }
            Some(left) => {
                let handle = self.alloc(Node {
                    value,
                    prev: Some(left),
                    next: Some(right),
                });
                self.node_mut(left).next = Some(handle);
                self.node_mut(right).prev = Some(handle);
            }
        }

        Ok(())
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.find_node(|v| v == value).is_some()
    }

    /// Clears this linked list. Does not free the underlying buffers.
    pub fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// A cursor on the first element, or at the end if the list is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor {
            list: self,
            current: self.head,
            index: 0,
        }
    }

    /// A cursor on the last element, or at the end if the list is empty.
    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor {
            list: self,
            current: self.tail,
            index: self.len().wrapping_sub(1),
        }
    }

    /// Sorts the whole list in ascending order.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sorts the whole list with a three-way comparator.
    ///
    /// If `compare` is not a total order the resulting order is unspecified,
    /// but every element is kept and the sort terminates.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if let Some(head) = self.head {
            let len = self.len();
            self.sort_from(head, len, compare, &mut rand::rng());
        }
    }

    /// Sorts the inclusive index range `[low, high]` with a three-way
    /// comparator, leaving the rest of the list in place.
    pub fn sort_range_by<F>(
        &mut self,
        low: usize,
        high: usize,
        compare: F,
    ) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.sort_range_by_with_rng(low, high, compare, &mut rand::rng())
    }

    /// [`sort_range_by`](Self::sort_range_by) with the pivot choices drawn
    /// from `rng`.
    pub fn sort_range_by_with_rng<F, R>(
        &mut self,
        low: usize,
        high: usize,
        compare: F,
        rng: &mut R,
    ) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
        R: Rng + ?Sized,
    {
        let len = self.len();
        if high >= len {
            return Err(Error::IndexOutOfRange { index: high, len });
        }
        if low >= high {
            return Ok(());
        }

        let first = self.locate(low)?;
        self.sort_from(first, high - low + 1, compare, rng);
        Ok(())
    }

    /// Sorts the `count` nodes starting at `first`. The handles are gathered
    /// into a Vec and partitioned there, then the chain is relinked in sorted
    /// order; values never move between slots.
    fn sort_from<F, R>(
        &mut self,
        first: NodeHandle,
        count: usize,
        mut compare: F,
        rng: &mut R,
    ) where
        F: FnMut(&T, &T) -> Ordering,
        R: Rng + ?Sized,
    {
        let mut handles = Vec::with_capacity(count);
        let mut cursor = Some(first);
        while handles.len() < count {
            match cursor {
                Some(handle) => {
                    handles.push(handle);
                    cursor = self.node(handle).next;
                }
                None => break,
            }
        }
        if handles.len() < 2 {
            return;
        }

        trace!("sorting {} of {} list nodes", handles.len(), self.len());

        let before = self.node(first).prev;
        let after = cursor;
        {
            let store = &self.store;
            let mut by_value = |a: &NodeHandle, b: &NodeHandle| {
                compare(&node_in(store, *a).value, &node_in(store, *b).value)
            };
            let high = handles.len() - 1;
            quicksort(&mut handles, 0, high, &mut by_value, rng);
        }

        self.relink(before, &handles, after);
    }

    /// Chains `handles` together in order between `before` and `after`.
    fn relink(
        &mut self,
        before: Option<NodeHandle>,
        handles: &[NodeHandle],
        after: Option<NodeHandle>,
    ) {
        let mut prev = before;
        for &handle in handles {
            self.node_mut(handle).prev = prev;
            match prev {
                Some(p) => self.node_mut(p).next = Some(handle),
                None => self.head = Some(handle),
            }
            prev = Some(handle);
        }

        match after {
            Some(a) => self.node_mut(a).prev = prev,
            None => self.tail = prev,
        }
        if let Some(last) = prev {
            self.node_mut(last).next = after;
        }
    }

    /// Walks the chain both ways and checks it agrees with the store.
    #[cfg(test)]
    pub(crate) fn continuity_test(&self) {
        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let node = self.node(handle);
            assert_eq!(prev, node.prev);
            prev = Some(handle);
            cursor = node.next;
            count += 1;
            assert!(count <= self.len());
        }
        assert_eq!(prev, self.tail);
        assert_eq!(self.len(), count);

        assert_eq!(self.len(), self.iter().rev().count());
        assert_eq!(self.len() == 0, self.head.is_none());
        assert_eq!(self.len() == 0, self.tail.is_none());
    }
}

/// Quicksort over `v[low..=high]` using Hoare partitioning around a pivot
/// drawn uniformly from the range. Recurses into the smaller side and loops
/// on the larger so the stack stays logarithmic.
fn quicksort<H, F, R>(
    v: &mut [H],
    mut low: usize,
    mut high: usize,
    compare: &mut F,
    rng: &mut R,
) where
    H: Copy,
    F: FnMut(&H, &H) -> Ordering,
    R: Rng + ?Sized,
{
    while low < high {
        let p = partition(v, low, high, compare, rng);
        if p - low < high - p {
            quicksort(v, low, p, compare, rng);
            low = p + 1;
        } else {
            quicksort(v, p + 1, high, compare, rng);
            high = p;
        }
    }
}

/// Returns `p` in `[low, high)` such that every element of `v[low..=p]`
/// compares no greater than every element of `v[p + 1..=high]`. The scans
/// stay inside the range even when `compare` is not a total order.
fn partition<H, F, R>(
    v: &mut [H],
    low: usize,
    high: usize,
    compare: &mut F,
    rng: &mut R,
) -> usize
where
    H: Copy,
    F: FnMut(&H, &H) -> Ordering,
    R: Rng + ?Sized,
{
    // the pivot has to sit at `low` for the returned split to be < high
    v.swap(low, rng.random_range(low..=high));
    let pivot = v[low];

    let mut i = low;
    let mut j = high;
    loop {
        while i < high && compare(&v[i], &pivot) == Ordering::Less {
            i += 1;
        }
        while j > low && compare(&v[j], &pivot) == Ordering::Greater {
            j -= 1;
        }
        if i >= j {
            return j.min(high - 1);
        }
        v.swap(i, j);
        i += 1;
        j -= 1;
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for LinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedList<T> {}

impl<T> Index<usize> for LinkedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T> IndexMut<usize> for LinkedList<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LinkedList::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for LinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> From<Vec<T>> for LinkedList<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for LinkedList<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

/// Borrowing iterator over a [`LinkedList`], front to back or back to front.
pub struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    front: Option<NodeHandle>,
    back: Option<NodeHandle>,
    remaining: usize,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            list: self.list,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.list.node(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.list.node(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over a [`LinkedList`].
pub struct IntoIter<T> {
    list: LinkedList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for LinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

/// A read-only position in a [`LinkedList`]: either on a node or past the
/// end. Two cursors are equal when they sit on the same node of the same
/// list.
///
/// A cursor borrows its list, so the list can't be structurally modified
/// while a cursor into it is alive.
pub struct Cursor<'a, T> {
    list: &'a LinkedList<T>,
    current: Option<NodeHandle>,
    index: usize,
}

impl<'a, T> Cursor<'a, T> {
    /// Steps towards the back. Stepping past the tail moves to the end
    /// position, where further steps do nothing.
    pub fn move_next(&mut self) {
        if let Some(handle) = self.current {
            self.current = self.list.node(handle).next;
            self.index = self.index.wrapping_add(1);
        }
    }

    /// Steps towards the front. Stepping past the head moves to the end
    /// position, where further steps do nothing.
    pub fn move_prev(&mut self) {
        if let Some(handle) = self.current {
            self.current = self.list.node(handle).prev;
            self.index = self.index.wrapping_sub(1);
        }
    }

    /// The element under the cursor, or `None` past either end.
    pub fn current(&self) -> Option<&'a T> {
        let list = self.list;
        self.current.map(|handle| &list.node(handle).value)
    }

    /// A copy of the element under the cursor.
    pub fn value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.current().cloned()
    }

    /// The position of the element under the cursor.
    pub fn index(&self) -> Option<usize> {
        self.current.map(|_| self.index)
    }

    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }
}

impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Cursor<'a, T> {}

impl<'a, T> PartialEq for Cursor<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.list, other.list) && self.current == other.current
    }
}

impl<'a, T> Eq for Cursor<'a, T> {}

impl<'a, T: fmt::Debug> fmt::Debug for Cursor<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index())
            .field("current", &self.current())
            .finish()
    }
}
