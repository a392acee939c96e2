#![cfg_attr(not(test), no_std)]

//! `Deque`: a double-ended queue stored in individually allocated blocks.
//!
//! Elements live in fixed-capacity blocks of `C` slots (64 by default). The
//! blocks are owned by a block table addressed around a *pivot*, so the
//! table can grow symmetrically towards the front and the back. Growing the
//! table doubles it and relinks the existing blocks; elements are never
//! copied or moved when the deque grows.
//!
//! This crate is `no_std` compatible. It needs the `alloc` crate.
//!
//! # Performance Characteristics
//!
//! ## Time Complexity
//! - `push_front()`, `push_back()`: amortized O(1); a table resize is O(blocks)
//!   and happens O(log n) times while the deque grows to n elements
//! - `pop_front()`, `pop_back()`: O(1)
//! - `get()`, `at()`, indexing: O(1) - two dereferences, table then block
//! - `clear()`: O(n) for element types with a destructor, O(1) otherwise
//! - Iterator operations: O(n) - linear traversal
//!
//! ## Space Complexity
//! - Memory overhead: one table entry per block plus spare blocks kept on
//!   both sides of the occupied range
//! - Popping never frees memory; the block table only grows
//! - Queue-style use keeps growing the table even at a constant length:
//!   `push_back` + `pop_front` cycles walk the occupied range towards the
//!   back, and every resize keeps the range at its pivot-relative offset, so
//!   the block count doubles each time the range reaches the end of the table.
//!   Calling `clear()` while the deque is empty recenters the cursors on the pivot.
//!
//! ## Features
//!
//! - `std`: enables `std::error::Error` support in `thiserror`
//! - `display`: enables the `Deque::dump` diagnostic
//!
//! ```toml
//! [dependencies]
//! blockdeque = { version = "0.1", features = ["std"] }
//! ```
//!
//! # Double-Ended Interface
//!
//! ```
//! # use blockdeque::Deque;
//! let mut deque: Deque<u32> = Deque::new().unwrap();
//!
//! deque.push_back(2).unwrap();
//! deque.push_back(3).unwrap();
//! deque.push_front(1).unwrap();
//!
//! assert_eq!(deque.len(), 3);
//! assert_eq!(*deque.front(), 1);
//! assert_eq!(*deque.back(), 3);
//!
//! assert_eq!(deque.pop_front(), Some(1));
//! assert_eq!(deque.pop_back(), Some(3));
//! assert_eq!(deque.pop_back(), Some(2));
//!
//! // Popping an empty deque is a no-op
//! assert_eq!(deque.pop_back(), None);
//! assert!(deque.is_empty());
//!
//! // Safe variants for error handling
//! assert!(deque.try_front().is_err());
//! assert!(deque.at(0).is_err());
//! ```
//!
//! # Random Access
//!
//! Logical index 0 is the front element. Indexing panics out of bounds,
//! `get()` returns an `Option` and `at()` a `Result`:
//!
//! ```
//! # use blockdeque::{Deque, DequeError};
//! let deque: Deque<char, 4> = Deque::from_slice(&['a', 'b', 'c', 'd', 'e']).unwrap();
//!
//! assert_eq!(deque[4], 'e');
//! assert_eq!(deque.get(5), None);
//! assert_eq!(
//!     deque.at(5),
//!     Err(DequeError::IndexOutOfBounds { index: 5, length: 5 })
//! );
//! ```
//!
//! # Iterator Support
//!
//! `begin()` and `end()` return random-access cursors; `iter()` wraps the
//! pair in a standard double-ended iterator:
//!
//! ```
//! # use blockdeque::Deque;
//! let mut deque: Deque<i32> = Deque::new().unwrap();
//! for i in 0..10 {
//!     deque.push_back(i).unwrap();
//! }
//!
//! let mut cursor = deque.begin();
//! cursor.advance(7);
//! assert_eq!(cursor.get(), Some(&7));
//! assert_eq!(cursor.distance(&deque.end()), 3);
//!
//! let collected: Vec<_> = deque.iter().rev().copied().collect();
//! assert_eq!(collected, vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
//! ```

extern crate alloc;

mod block;
mod core;
mod error;
mod iter;

// Re-export public types and traits
pub use crate::core::{Deque, DEFAULT_BLOCK_CAPACITY};
pub use error::DequeError;
pub use iter::{Cursor, Iter};
