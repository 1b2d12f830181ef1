//! Iterators over an [`XorList`].
//!
//! Both ends of a borrowing walk keep a `(previous, current)` handle pair and
//! step with `next = link(current) XOR previous`. A shared countdown stops the
//! two cursors from crossing.

use std::iter::FusedIterator;

use crate::list::{XorList, NIL};

/// Borrowing iterator, head to tail (or tail to head via `rev`).
pub struct Iter<'a, T> {
    list: &'a XorList<T>,
    front_prev: u32,
    front: u32,
    back_next: u32,
    back: u32,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(list: &'a XorList<T>) -> Self {
        Self {
            list,
            front_prev: NIL,
            front: list.head(),
            back_next: NIL,
            back: list.tail(),
            remaining: list.len(),
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            front_prev: self.front_prev,
            front: self.front,
            back_next: self.back_next,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front;
        self.front = self.list.link(current) ^ self.front_prev;
        self.front_prev = current;
        self.remaining -= 1;
        Some(self.list.value(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back;
        self.back = self.list.link(current) ^ self.back_next;
        self.back_next = current;
        self.remaining -= 1;
        Some(self.list.value(current))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator; drains the list from either end.
pub struct IntoIter<T> {
    list: XorList<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(list: XorList<T>) -> Self {
        Self { list }
    }
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

impl<T> FusedIterator for IntoIter<T> {}
