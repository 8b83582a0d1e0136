//! An AVL-balanced ordered map with checked cursors.
//!
//! This crate provides [`AVLTreeMap`], an ordered map in the style of the standard
//! library's `BTreeMap` that is ordered by a pluggable comparator and hands out
//! [`Cursor`]s: lightweight positions that do not borrow the map and are validated
//! on every use.
//!
//! - [`find`](AVLTreeMap::find), [`begin`](AVLTreeMap::begin), [`end`](AVLTreeMap::end) -
//!   Obtain cursors
//! - [`cursor_next`](AVLTreeMap::cursor_next), [`cursor_prev`](AVLTreeMap::cursor_prev) -
//!   Step through the map in key order
//! - [`erase`](AVLTreeMap::erase) - Remove the entry a cursor points at
//! - [`at`](AVLTreeMap::at) - Checked lookup returning [`Error::NotFound`]
//!
//! # Example
//!
//! ```
//! use wabi_avl::{AVLTreeMap, Error};
//!
//! let mut scores = AVLTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Standard map operations work as expected
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.at(&"Dave"), Err(Error::NotFound));
//!
//! // Walk from Bob to the end with a cursor
//! let mut cursor = scores.find(&"Bob");
//! let mut names = Vec::new();
//! while !cursor.is_end() {
//!     names.push(*scores.get_at(cursor)?.0);
//!     cursor = scores.cursor_next(cursor)?;
//! }
//! assert_eq!(names, ["Bob", "Carol"]);
//!
//! // Removing an entry invalidates only the cursors pointing at it
//! let bob = scores.find(&"Bob");
//! scores.erase(bob)?;
//! assert_eq!(scores.get_at(bob), Err(Error::InvalidCursor));
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Custom orderings** - Any [`compare::Compare`] implementation, or a plain
//!   "less than" predicate via [`comparator::less_by`]
//! - **Checked cursors** - Cursors to removed entries or to other maps are rejected,
//!   even when the removed entry's storage has been reused
//! - **Bounded height** - The AVL balance keeps every operation O(log n)
//!
//! # Logging
//!
//! Rotations and rebalance passes are reported as `tracing` events at `TRACE`
//! level, rejected cursors at `DEBUG` level. No subscriber is installed by this crate.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: We have to allow unsafe code for the mutable iterators.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod avltree_map;
pub mod comparator;

pub use avltree_map::{AVLTreeMap, Cursor};
pub use error::{Error, Result};
