//! XOR-linked list over a handle arena.
//!
//! Each node stores a single link field holding `prev XOR next`, where
//! `prev` and `next` are integer handles into the list's own arena rather
//! than memory addresses. Walking in either direction only needs the handle
//! of the node just left behind: `next = link XOR prev`.
//!
//! Handle `0` is the nil sentinel; arena slot `i` has handle `i + 1`.
//! Slots freed by removals are recycled through an intrusive free list.
//!
//! # Key Types
//!
//! - [`XorList`] — The list itself
//! - [`Iter`] — Double-ended borrowing iterator
//! - [`IntoIter`] — Owning iterator
//! - [`XorListError`] — Error type

pub mod error;
pub mod iter;
pub mod list;

pub use error::{Result, XorListError};
pub use iter::{IntoIter, Iter};
pub use list::XorList;
