//! ## Intro
//!
//! A growable vector with a small-buffer optimization.
//!
//! [`SmallVec<T, N>`] embeds room for `N` elements in the value itself. As long as the
//! data fits, pushing, inserting and resizing never touch the allocator. When more room
//! is needed the elements are moved into a heap block, which then grows geometrically
//! (1.5x, starting from at least 4 slots) like an ordinary vector.
//!
//! ```
//! # use hybridvec::{SmallVec, small_vec};
//! let mut vec: SmallVec<i32, 4> = small_vec![1, 2, 3];
//! assert!(!vec.is_heap()); // Still inline
//!
//! // Push beyond capacity: the data moves to the heap
//! vec.extend([4, 5, 6, 7]);
//! assert!(vec.is_heap());
//! assert_eq!(vec.capacity(), 9);
//!
//! // Once it fits again, the heap block can be given back
//! vec.truncate(2);
//! assert!(vec.shrink_to_inline());
//! assert_eq!(vec, [1, 2]);
//! ```
//!
//! The vector dereferences to `[T]`, so every slice method is available.
//!
//! ## Modes
//!
//! | Mode   | Capacity        | Entered by                                   |
//! |--------|-----------------|----------------------------------------------|
//! | Inline | exactly `N`     | construction, [`SmallVec::shrink_to_inline`] |
//! | Heap   | greater than `N`| any growth past `N`                          |
//!
//! Capacity never decreases except by moving back inline.
//!
//! ## Preconditions
//!
//! [`SmallVec::at`], [`SmallVec::at_mut`] and [`SmallVec::insert`] check their index
//! in debug builds. Enable the `checked` feature to keep these checks in release builds.
//! Indexing with `[]` and [`get`](slice::get) are always checked.
//!
//! ## Allocation failure
//!
//! The `try_*` methods ([`SmallVec::try_reserve`], [`SmallVec::try_ensure_capacity`],
//! [`SmallVec::try_push`]) return a [`TryReserveError`] and leave the vector unchanged.
//! The other growing methods panic on capacity overflow and call
//! [`handle_alloc_error`](alloc::alloc::handle_alloc_error) when the allocator fails.
//!
//! ## `no_std` support
//!
//! This crate requires only `core` and `alloc`.
//!
//! ## Optional features
//!
//! - `std`: implements `std::io::Write` for `SmallVec<u8, N>`.
//! - `serde`: implements `Serialize` and `Deserialize` for [`SmallVec`].
//! - `tracing`: emits `trace` events when the storage moves between regions.
//! - `checked`: keeps precondition checks in release builds.
#![no_std]

extern crate alloc;

mod utils;

mod error;
mod raw;

pub mod into_iter;
pub mod small_vec;

#[cfg(feature = "serde")]
mod serde;

#[cfg(feature = "std")]
mod std_io;

pub use error::{ErrorKind, TryReserveError};
#[doc(inline)]
pub use small_vec::SmallVec;

/// A `SmallVec` with an inline capacity of 8 elements.
///
/// This is an alias for [`SmallVec<T, 8>`].
///
/// # Examples
///
/// ```
/// # use hybridvec::MiniVec;
/// let mut vec: MiniVec<u32> = MiniVec::new();
/// vec.extend(0..8);
/// assert!(!vec.is_heap());
///
/// vec.push(8);
/// assert!(vec.is_heap());
/// assert_eq!(vec.capacity(), 12);
/// ```
pub type MiniVec<T> = SmallVec<T, 8>;
