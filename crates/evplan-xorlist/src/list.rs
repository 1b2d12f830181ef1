//! The [`XorList`] container.

use std::borrow::Borrow;
use std::fmt;

use tracing::warn;

use crate::error::{Result, XorListError};
use crate::iter::{IntoIter, Iter};

/// Nil handle: "no neighbour".
pub(crate) const NIL: u32 = 0;

/// Arena slots are addressable while their handle fits in a `u32`.
const MAX_SLOTS: usize = u32::MAX as usize;

#[derive(Clone)]
enum Entry<T> {
    Occupied { value: T, link: u32 },
    Vacant { next_free: u32 },
}

/// A doubly-traversable list storing one link per node.
#[derive(Clone)]
pub struct XorList<T> {
    entries: Vec<Entry<T>>,
    free: u32,
    head: u32,
    tail: u32,
    len: usize,
}

impl<T> Default for XorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for XorList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> XorList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: NIL,
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Create an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Number of values in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of arena slots allocated, live or recycled.
    pub fn arena_slots(&self) -> usize {
        self.entries.len()
    }

    /// The first value, if any.
    pub fn front(&self) -> Option<&T> {
        (self.head != NIL).then(|| self.value(self.head))
    }

    /// The last value, if any.
    pub fn back(&self) -> Option<&T> {
        (self.tail != NIL).then(|| self.value(self.tail))
    }

    /// Iterate from head to tail. Call `.rev()` to walk tail to head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns `true` if any node holds `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.iter().any(|v| v.borrow() == value)
    }

    /// Append a value at the tail.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        let handle = self.alloc(value, self.tail)?;
        if self.tail == NIL {
            self.head = handle;
        } else {
            self.xor_link(self.tail, handle);
        }
        self.tail = handle;
        self.len += 1;
        Ok(())
    }

    /// Prepend a value at the head.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        let handle = self.alloc(value, self.head)?;
        if self.head == NIL {
            self.tail = handle;
        } else {
            self.xor_link(self.head, handle);
        }
        self.head = handle;
        self.len += 1;
        Ok(())
    }

    /// Remove and return the first value.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.head == NIL {
            return None;
        }
        let handle = self.head;
        let next = self.link(handle);
        self.unlink(NIL, handle, next);
        Some(self.release(handle))
    }

    /// Remove and return the last value.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.tail == NIL {
            return None;
        }
        let handle = self.tail;
        let prev = self.link(handle);
        self.unlink(prev, handle, NIL);
        Some(self.release(handle))
    }

    /// Remove the first node (from the head) holding `value` and return it.
    pub fn remove<Q>(&mut self, value: &Q) -> Result<T>
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        let mut prev = NIL;
        let mut current = self.head;
        while current != NIL {
            let next = self.link(current) ^ prev;
            if self.value(current).borrow() == value {
                self.unlink(prev, current, next);
                return Ok(self.release(current));
            }
            prev = current;
            current = next;
        }
        Err(XorListError::NotFound)
    }

    /// Remove every value and release the arena.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    // ---------------------------------------------------------------
    // Arena plumbing
    // ---------------------------------------------------------------

    pub(crate) fn head(&self) -> u32 {
        self.head
    }

    pub(crate) fn tail(&self) -> u32 {
        self.tail
    }

    pub(crate) fn link(&self, handle: u32) -> u32 {
        match &self.entries[slot(handle)] {
            Entry::Occupied { link, .. } => *link,
            Entry::Vacant { .. } => NIL,
        }
    }

    pub(crate) fn value(&self, handle: u32) -> &T {
        match &self.entries[slot(handle)] {
            Entry::Occupied { value, .. } => value,
            Entry::Vacant { .. } => unreachable!("handle {handle} is linked but vacant"),
        }
    }

    fn xor_link(&mut self, handle: u32, mask: u32) {
        if let Entry::Occupied { link, .. } = &mut self.entries[slot(handle)] {
            *link ^= mask;
        }
    }

    /// Detach `current`, whose neighbours are `prev` and `next`.
    fn unlink(&mut self, prev: u32, current: u32, next: u32) {
        if prev == NIL {
            self.head = next;
        } else {
            self.xor_link(prev, current ^ next);
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.xor_link(next, current ^ prev);
        }
        self.len -= 1;
    }

    fn alloc(&mut self, value: T, link: u32) -> Result<u32> {
        if self.free != NIL {
            let handle = self.free;
            let index = slot(handle);
            if let Entry::Vacant { next_free } = self.entries[index] {
                self.free = next_free;
            }
            self.entries[index] = Entry::Occupied { value, link };
            return Ok(handle);
        }

        if self.entries.len() >= MAX_SLOTS {
            warn!(slots = self.entries.len(), "xor list arena exhausted");
            return Err(XorListError::ArenaExhausted {
                slots: self.entries.len(),
            });
        }
        self.entries.push(Entry::Occupied { value, link });
        Ok(self.entries.len() as u32)
    }

    fn release(&mut self, handle: u32) -> T {
        let vacant = Entry::Vacant {
            next_free: self.free,
        };
        self.free = handle;
        match std::mem::replace(&mut self.entries[slot(handle)], vacant) {
            Entry::Occupied { value, .. } => value,
            Entry::Vacant { .. } => unreachable!("released handle {handle} twice"),
        }
    }
}

impl<T> IntoIterator for XorList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a XorList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

fn slot(handle: u32) -> usize {
    debug_assert_ne!(handle, NIL);
    handle as usize - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn list_of(values: &[&str]) -> XorList<String> {
        let mut list = XorList::new();
        for v in values {
            list.push_back(v.to_string()).unwrap();
        }
        list
    }

    fn forward(list: &XorList<String>) -> Vec<&str> {
        list.iter().map(String::as_str).collect()
    }

    fn backward(list: &XorList<String>) -> Vec<&str> {
        list.iter().rev().map(String::as_str).collect()
    }

    #[test]
    fn new_list_is_empty() {
        let list: XorList<String> = XorList::new();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        assert!(list.front().is_none());
        assert!(list.back().is_none());
    }

    #[test]
    fn remove_middle_value() {
        let mut list = list_of(&["x", "y", "z"]);
        assert_eq!(list.remove("y").unwrap(), "y");
        assert_eq!(forward(&list), vec!["x", "z"]);
        assert_eq!(backward(&list), vec!["z", "x"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let list = list_of(&["a", "b", "c", "d"]);
        assert_eq!(forward(&list), vec!["a", "b", "c", "d"]);
        assert_eq!(backward(&list), vec!["d", "c", "b", "a"]);
        assert_eq!(list.front().map(String::as_str), Some("a"));
        assert_eq!(list.back().map(String::as_str), Some("d"));
    }

    #[test]
    fn push_front_prepends() {
        let mut list = list_of(&["b"]);
        list.push_front("a".to_string()).unwrap();
        list.push_back("c".to_string()).unwrap();
        assert_eq!(forward(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_head_and_tail() {
        let mut list = list_of(&["a", "b", "c"]);
        list.remove("a").unwrap();
        assert_eq!(forward(&list), vec!["b", "c"]);
        list.remove("c").unwrap();
        assert_eq!(forward(&list), vec!["b"]);
        assert_eq!(backward(&list), vec!["b"]);
        list.remove("b").unwrap();
        assert!(list.is_empty());
        assert!(list.front().is_none());
        assert!(list.back().is_none());
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut list = list_of(&["a", "b"]);
        assert_eq!(list.remove("q"), Err(XorListError::NotFound));
        assert_eq!(forward(&list), vec!["a", "b"]);
    }

    #[test]
    fn remove_takes_first_match() {
        let mut list = list_of(&["a", "dup", "b", "dup"]);
        list.remove("dup").unwrap();
        assert_eq!(forward(&list), vec!["a", "b", "dup"]);
    }

    #[test]
    fn pop_from_both_ends() {
        let mut list = list_of(&["a", "b", "c"]);
        assert_eq!(list.pop_front().as_deref(), Some("a"));
        assert_eq!(list.pop_back().as_deref(), Some("c"));
        assert_eq!(list.pop_back().as_deref(), Some("b"));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn freed_slots_are_recycled() {
        let mut list = list_of(&["a", "b", "c"]);
        list.remove("b").unwrap();
        list.push_back("d".to_string()).unwrap();
        list.push_front("e".to_string()).unwrap();
        assert_eq!(list.arena_slots(), 4);
        assert_eq!(forward(&list), vec!["e", "a", "c", "d"]);
        assert_eq!(backward(&list), vec!["d", "c", "a", "e"]);
    }

    #[test]
    fn iteration_is_restartable() {
        let list = list_of(&["a", "b"]);
        let first: Vec<_> = list.iter().collect();
        let second: Vec<_> = list.iter().collect();
        assert_eq!(first, second);
        assert_eq!(list.iter().len(), 2);
    }

    #[test]
    fn iterator_ends_meet_in_the_middle() {
        let list = list_of(&["a", "b", "c", "d", "e"]);
        let mut iter = list.iter();
        assert_eq!(iter.next().map(String::as_str), Some("a"));
        assert_eq!(iter.next_back().map(String::as_str), Some("e"));
        assert_eq!(iter.next().map(String::as_str), Some("b"));
        assert_eq!(iter.next_back().map(String::as_str), Some("d"));
        assert_eq!(iter.next().map(String::as_str), Some("c"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn owning_iteration() {
        let list = list_of(&["a", "b", "c"]);
        let values: Vec<String> = list.into_iter().rev().collect();
        assert_eq!(values, vec!["c", "b", "a"]);
    }

    #[test]
    fn contains_and_clear() {
        let mut list = list_of(&["a", "b"]);
        assert!(list.contains("a"));
        assert!(!list.contains("z"));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.arena_slots(), 0);
    }

    #[test]
    fn debug_prints_as_list() {
        let list = list_of(&["a", "b"]);
        assert_eq!(format!("{list:?}"), r#"["a", "b"]"#);
    }

    #[derive(Clone, Debug)]
    enum Op {
        PushBack(u8),
        PushFront(u8),
        Remove(u8),
        PopFront,
        PopBack,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..16).prop_map(Op::PushBack),
            (0u8..16).prop_map(Op::PushFront),
            (0u8..16).prop_map(Op::Remove),
            Just(Op::PopFront),
            Just(Op::PopBack),
        ]
    }

    proptest! {
        #[test]
        fn traversal_matches_insertion_order(values in proptest::collection::vec(any::<u32>(), 0..64)) {
            let mut list = XorList::new();
            for v in &values {
                list.push_back(*v).unwrap();
            }
            let fwd: Vec<u32> = list.iter().copied().collect();
            prop_assert_eq!(&fwd, &values);
            let mut bwd: Vec<u32> = list.iter().rev().copied().collect();
            bwd.reverse();
            prop_assert_eq!(&bwd, &values);
        }

        #[test]
        fn removing_any_element_keeps_links_intact(
            values in proptest::collection::vec(any::<u32>(), 1..64),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut list = XorList::new();
            for v in &values {
                list.push_back(*v).unwrap();
            }
            let victim = values[pick.index(values.len())];
            list.remove(&victim).unwrap();

            let mut expected = values.clone();
            let pos = expected.iter().position(|v| *v == victim).unwrap();
            expected.remove(pos);

            prop_assert_eq!(list.iter().count(), values.len() - 1);
            prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), expected.clone());
            let mut bwd: Vec<u32> = list.iter().rev().copied().collect();
            bwd.reverse();
            prop_assert_eq!(bwd, expected);
        }

        #[test]
        fn matches_deque_model(ops in proptest::collection::vec(op_strategy(), 0..200)) {
            let mut list = XorList::new();
            let mut model = VecDeque::new();

            for op in ops {
                match op {
                    Op::PushBack(v) => {
                        list.push_back(v).unwrap();
                        model.push_back(v);
                    }
                    Op::PushFront(v) => {
                        list.push_front(v).unwrap();
                        model.push_front(v);
                    }
                    Op::Remove(v) => {
                        let position = model.iter().position(|x| *x == v);
                        let expected = position.and_then(|i| model.remove(i));
                        prop_assert_eq!(list.remove(&v).ok(), expected);
                    }
                    Op::PopFront => {
                        prop_assert_eq!(list.pop_front(), model.pop_front());
                    }
                    Op::PopBack => {
                        prop_assert_eq!(list.pop_back(), model.pop_back());
                    }
                }
                prop_assert_eq!(list.len(), model.len());
                prop_assert!(list.iter().eq(model.iter()));
                prop_assert!(list.iter().rev().eq(model.iter().rev()));
            }
        }
    }
}
