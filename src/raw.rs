//! Heap block management for the spilled representation.
//!
//! These helpers only deal with memory; they never construct or drop elements.

use alloc::alloc::{Layout, alloc, dealloc};
use core::ptr::NonNull;

use crate::error::TryReserveError;
use crate::utils::IsZST;

/// Layout of a block holding `capacity` values of `T`.
#[inline]
pub(crate) fn array_layout<T>(capacity: usize) -> Result<Layout, TryReserveError> {
    Layout::array::<T>(capacity).map_err(|_| TryReserveError::capacity_overflow())
}

/// Allocate an uninitialized block for `capacity` values of `T`.
///
/// Zero sized types never touch the allocator and get a dangling pointer.
pub(crate) fn allocate<T>(capacity: usize) -> Result<NonNull<T>, TryReserveError> {
    if T::IS_ZST {
        return Ok(NonNull::dangling());
    }
    debug_assert!(capacity > 0, "Cannot allocate zero sized memory.");

    let layout = array_layout::<T>(capacity)?;
    // SAFETY: `T` is not ZST and `capacity > 0`, so the layout is non-zero.
    let ptr = unsafe { alloc(layout) } as *mut T;
    NonNull::new(ptr).ok_or(TryReserveError::alloc_failure(layout))
}

/// Free a block returned by [`allocate`].
///
/// # Safety
/// - `ptr` was returned by `allocate::<T>(capacity)` with the same `capacity`.
/// - All values in the block have been dropped or moved out.
#[inline]
pub(crate) unsafe fn deallocate<T>(ptr: NonNull<T>, capacity: usize) {
    if T::IS_ZST {
        return;
    }
    // SAFETY: the same layout was accepted by `allocate`.
    unsafe {
        let layout = Layout::from_size_align_unchecked(
            core::mem::size_of::<T>() * capacity,
            core::mem::align_of::<T>(),
        );
        dealloc(ptr.as_ptr() as *mut u8, layout);
    }
}

/// Frees a heap block when dropped, including while unwinding.
pub(crate) struct BlockGuard<T> {
    ptr: NonNull<T>,
    capacity: usize,
}

impl<T> BlockGuard<T> {
    /// # Safety
    /// Same contract as [`deallocate`]; the block must not be freed elsewhere.
    #[inline]
    pub(crate) unsafe fn new(ptr: NonNull<T>, capacity: usize) -> Self {
        Self { ptr, capacity }
    }
}

impl<T> Drop for BlockGuard<T> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: guaranteed by `BlockGuard::new`.
        unsafe { deallocate(self.ptr, self.capacity) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn allocate_and_free() {
        let ptr = allocate::<u32>(6).unwrap();
        unsafe {
            for i in 0..6 {
                ptr.as_ptr().add(i).write(i as u32);
            }
            assert_eq!(*ptr.as_ptr().add(5), 5);
            deallocate(ptr, 6);
        }
    }

    #[test]
    fn oversized_layout_is_overflow() {
        let err = allocate::<u64>(usize::MAX / 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityOverflow);
    }

    #[test]
    fn zst_never_allocates() {
        let ptr = allocate::<()>(usize::MAX).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        unsafe { deallocate(ptr, usize::MAX) };
    }
}
