use alloc::alloc::handle_alloc_error;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem::{ManuallyDrop, MaybeUninit};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;

use crate::error::{ErrorKind, TryReserveError};
use crate::raw;
use crate::utils::{IsZST, cold_path, grow_capacity, precondition, trace_region};

/// Which buffer currently holds the elements.
enum Region<T> {
    /// The embedded `[MaybeUninit<T>; N]`. Its address is derived on every access,
    /// so the vector can be moved freely.
    Inline,
    /// A block from the global allocator with room for `cap` values.
    Heap(NonNull<T>),
}

impl<T> Clone for Region<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Region<T> {}

/// A vector with an inline buffer of `N` slots that spills to the heap when full.
///
/// While `len <= N` and no growth has happened, the elements live inside the value
/// itself and no allocation is made. The first time more than `N` slots are needed
/// the elements are moved into a heap block; later growth replaces that block.
///
/// Heap capacity grows geometrically: starting from `max(capacity, 4)` it is
/// multiplied by 1.5 (rounded down) until the request fits.
///
/// # Examples
///
/// ```
/// use hybridvec::SmallVec;
///
/// let mut vec: SmallVec<char, 1> = SmallVec::new();
/// vec.push('a');
/// assert!(!vec.is_heap());
/// assert_eq!(vec.capacity(), 1);
///
/// vec.push('b');
/// assert!(vec.is_heap());
/// assert_eq!(vec.capacity(), 4);
///
/// vec.push('c');
/// assert_eq!(vec.capacity(), 4);
/// assert_eq!(vec, ['a', 'b', 'c']);
/// ```
///
/// The capacity never drops below `N` and only decreases through
/// [`shrink_to_inline`](SmallVec::shrink_to_inline):
///
/// ```
/// # use hybridvec::SmallVec;
/// let mut vec: SmallVec<i32, 4> = (0..7).collect();
/// assert!(vec.is_heap());
///
/// vec.truncate(3);
/// assert!(vec.is_heap());
///
/// assert!(vec.shrink_to_inline());
/// assert!(!vec.is_heap());
/// assert_eq!(vec.capacity(), 4);
/// assert_eq!(vec, [0, 1, 2]);
/// ```
///
/// # Zero-Sized Types (ZST)
///
/// Zero sized values never allocate. The mode and capacity still follow the rules
/// above, so [`is_heap`](SmallVec::is_heap) and [`capacity`](SmallVec::capacity)
/// behave as if space were allocated.
pub struct SmallVec<T, const N: usize = 1> {
    inline: [MaybeUninit<T>; N],
    region: Region<T>,
    len: usize,
    cap: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T, const N: usize> Send for SmallVec<T, N> where T: Send {}
unsafe impl<T, const N: usize> Sync for SmallVec<T, N> where T: Sync {}

/// Creates a [`SmallVec`] containing the arguments.
///
/// The syntax is similar to [`vec!`](https://doc.rust-lang.org/std/macro.vec.html).
///
/// # Examples
///
/// ```
/// # use hybridvec::{small_vec, SmallVec};
/// let vec: SmallVec<String, 4> = small_vec![];
/// let vec: SmallVec<i64, 4> = small_vec![1; 5]; // Need to support Clone.
/// assert!(vec.is_heap());
/// let vec: SmallVec<_, 4> = small_vec![1, 2, 3];
/// assert!(!vec.is_heap());
/// ```
#[macro_export]
macro_rules! small_vec {
    [] => { $crate::SmallVec::new() };
    [$elem:expr; $n:expr] => { $crate::SmallVec::from_elem($elem, $n) };
    [$($item:expr),+ $(,)?] => { $crate::SmallVec::from([ $($item),+ ]) };
}

#[cold]
#[inline(never)]
fn handle_reserve_error(err: TryReserveError) -> ! {
    match err.kind() {
        ErrorKind::CapacityOverflow => panic!("capacity overflow"),
        ErrorKind::AllocFailure { layout } => handle_alloc_error(layout),
    }
}

impl<T, const N: usize> SmallVec<T, N> {
    /// Constructs a new, empty `SmallVec` using the inline buffer.
    ///
    /// The inline buffer is part of the value, so `N` should not be too large
    /// if the vector lives on the stack.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let vec: SmallVec<i32, 8> = SmallVec::new();
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.capacity(), 8);
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self {
            inline: [const { MaybeUninit::uninit() }; N],
            region: Region::Inline,
            len: 0,
            cap: N,
            _marker: PhantomData,
        }
    }

    /// Constructs a new, empty `SmallVec` able to hold `capacity` elements without reallocating.
    ///
    /// If `capacity <= N` this is the same as [`new`](SmallVec::new). Otherwise the heap
    /// block is sized by the usual growth rule, so it may be larger than requested.
    ///
    /// # Panics
    /// Panics if the capacity overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let vec: SmallVec<i32, 4> = SmallVec::with_capacity(4);
    /// assert!(!vec.is_heap());
    ///
    /// let vec: SmallVec<i32, 4> = SmallVec::with_capacity(7);
    /// assert!(vec.is_heap());
    /// assert_eq!(vec.capacity(), 9);
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut vec = Self::new();
        vec.ensure_capacity(capacity);
        vec
    }

    /// Returns `true` if the elements are stored in a heap block.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 2> = SmallVec::new();
    /// vec.push(1);
    /// vec.push(2);
    /// assert!(!vec.is_heap());
    ///
    /// vec.push(3);
    /// assert!(vec.is_heap());
    /// ```
    #[inline(always)]
    pub const fn is_heap(&self) -> bool {
        matches!(self.region, Region::Heap(_))
    }

    /// Returns the number of elements in the vector.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector contains no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the active region can hold.
    ///
    /// This is exactly `N` while the data is inline and always greater than `N` on the heap.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns a raw pointer to the active region.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        match self.region {
            Region::Inline => self.inline.as_ptr() as *const T,
            Region::Heap(ptr) => ptr.as_ptr(),
        }
    }

    /// Returns a raw mutable pointer to the active region.
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        match self.region {
            Region::Inline => self.inline.as_mut_ptr() as *mut T,
            Region::Heap(ptr) => ptr.as_ptr(),
        }
    }

    /// Extracts a slice containing the live elements.
    #[inline(always)]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are initialized.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// Extracts a mutable slice containing the live elements.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        // SAFETY: slots `[0, len)` are initialized.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }

    /// Forces the length of the vector to `new_len`.
    ///
    /// # Safety
    /// - `new_len <= capacity()`.
    /// - The elements at `old_len..new_len` must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.cap);
        self.len = new_len;
    }

    /// Makes sure the active region has room for at least `requested` elements.
    ///
    /// Does nothing if the capacity already suffices. Otherwise a new heap block is
    /// allocated with the 1.5x growth rule, the elements are moved into it and the old
    /// block (if any) is freed.
    ///
    /// # Panics
    /// Panics on capacity overflow. Allocation failure is reported through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<u8, 4> = SmallVec::new();
    /// vec.ensure_capacity(3);
    /// assert!(!vec.is_heap());
    ///
    /// vec.ensure_capacity(5);
    /// assert_eq!(vec.capacity(), 6);
    ///
    /// vec.ensure_capacity(7);
    /// assert_eq!(vec.capacity(), 9);
    /// ```
    #[inline]
    pub fn ensure_capacity(&mut self, requested: usize) {
        if let Err(err) = self.try_ensure_capacity(requested) {
            handle_reserve_error(err);
        }
    }

    /// Fallible version of [`ensure_capacity`](SmallVec::ensure_capacity).
    ///
    /// On error the vector is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::{SmallVec, ErrorKind};
    /// let mut vec: SmallVec<u64, 2> = SmallVec::from([1, 2]);
    ///
    /// let err = vec.try_ensure_capacity(usize::MAX).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::CapacityOverflow);
    /// assert!(!vec.is_heap());
    /// assert_eq!(vec, [1, 2]);
    /// ```
    #[inline]
    pub fn try_ensure_capacity(&mut self, requested: usize) -> Result<(), TryReserveError> {
        if requested <= self.cap {
            return Ok(());
        }
        cold_path();
        let new_cap =
            grow_capacity(self.cap, requested).ok_or(TryReserveError::capacity_overflow())?;
        // SAFETY: new_cap >= requested > self.cap >= N
        unsafe { self.move_to_heap(new_cap) }
    }

    /// Reserves room for at least `additional` more elements.
    ///
    /// # Panics
    /// Panics if `len + additional` overflows.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            handle_reserve_error(err);
        }
    }

    /// Fallible version of [`reserve`](SmallVec::reserve).
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let requested = self
            .len
            .checked_add(additional)
            .ok_or(TryReserveError::capacity_overflow())?;
        self.try_ensure_capacity(requested)
    }

    /// Moves the elements into a fresh heap block of `new_cap` slots.
    ///
    /// Every fallible step happens before any element moves.
    ///
    /// # Safety
    /// - new_cap > self.cap
    /// - new_cap > N
    #[inline(never)]
    unsafe fn move_to_heap(&mut self, new_cap: usize) -> Result<(), TryReserveError> {
        debug_assert!(new_cap > self.cap && new_cap > N);

        let new_ptr = raw::allocate::<T>(new_cap)?;
        let old_cap = self.cap;

        // SAFETY: the new block has room for `new_cap >= len` values and does not
        // overlap the old region, which is freed only after its values were moved out.
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), new_ptr.as_ptr(), self.len);
            if let Region::Heap(old_ptr) = self.region {
                raw::deallocate(old_ptr, old_cap);
            }
        }

        trace_region!(
            from = old_cap,
            to = new_cap,
            len = self.len,
            spilled = !self.is_heap(),
            "small vector grew"
        );

        self.region = Region::Heap(new_ptr);
        self.cap = new_cap;
        Ok(())
    }

    /// Moves the elements back into the inline buffer and frees the heap block.
    ///
    /// Returns `true` if the vector switched to the inline buffer. Returns `false`
    /// and does nothing if the data is already inline or `len > N`.
    ///
    /// Unlike the strict form, this does not require a preceding reduction in length.
    /// Use [`shrink_to_inline_after_truncate`](SmallVec::shrink_to_inline_after_truncate)
    /// for the gated variant that demands `new_len < len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 2> = SmallVec::from([1, 2, 3]);
    /// assert!(!vec.shrink_to_inline()); // 3 elements do not fit
    ///
    /// vec.pop();
    /// assert!(vec.shrink_to_inline());
    /// assert_eq!(vec.capacity(), 2);
    /// assert_eq!(vec, [1, 2]);
    /// ```
    pub fn shrink_to_inline(&mut self) -> bool {
        let Region::Heap(heap_ptr) = self.region else {
            return false;
        };
        if self.len > N {
            return false;
        }

        let inline_ptr = self.inline.as_mut_ptr() as *mut T;
        // SAFETY: `len <= N`, and the heap block is distinct from the inline buffer.
        unsafe {
            ptr::copy_nonoverlapping(heap_ptr.as_ptr(), inline_ptr, self.len);
            raw::deallocate(heap_ptr, self.cap);
        }

        trace_region!(from = self.cap, to = N, len = self.len, "small vector moved back inline");

        self.region = Region::Inline;
        self.cap = N;
        true
    }

    /// Truncates to `new_len` and then moves the data back into the inline buffer.
    ///
    /// Meant to follow a reduction in length: `new_len` must be strictly less than the
    /// current length and no greater than `N`. A length that already fits is handled by
    /// [`shrink_to_inline`](SmallVec::shrink_to_inline) instead.
    ///
    /// Returns whether the vector is inline afterwards.
    ///
    /// # Panics
    /// With precondition checks enabled, panics if `new_len >= len` or `new_len > N`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 2> = (0..10).collect();
    /// assert!(vec.shrink_to_inline_after_truncate(2));
    /// assert_eq!(vec, [0, 1]);
    /// assert!(!vec.is_heap());
    /// ```
    pub fn shrink_to_inline_after_truncate(&mut self, new_len: usize) -> bool {
        precondition!(
            new_len < self.len,
            "shrink target (is {}) should be < len (is {})",
            new_len,
            self.len
        );
        precondition!(
            new_len <= N,
            "shrink target (is {}) should fit the inline capacity (is {})",
            new_len,
            N
        );
        self.truncate(new_len);
        self.shrink_to_inline();
        !self.is_heap()
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Panics
    /// With precondition checks enabled (debug builds or the `checked` feature),
    /// panics if `index >= len`. Without them an out of range index is undefined
    /// behavior; use [`get`](slice::get) or indexing for a checked lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let vec: SmallVec<_, 2> = SmallVec::from([10, 20, 30]);
    /// assert_eq!(*vec.at(2), 30);
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> &T {
        precondition!(
            index < self.len,
            "index out of bounds: the len is {} but the index is {}",
            self.len,
            index
        );
        // SAFETY: index < len
        unsafe { &*self.as_ptr().add(index) }
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// Same contract as [`at`](SmallVec::at).
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        precondition!(
            index < self.len,
            "index out of bounds: the len is {} but the index is {}",
            self.len,
            index
        );
        // SAFETY: index < len
        unsafe { &mut *self.as_mut_ptr().add(index) }
    }

    /// Appends an element to the back.
    ///
    /// # Time complexity
    /// Amortized O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 4> = SmallVec::new();
    /// for i in 0..7 {
    ///     vec.push(i);
    /// }
    /// assert_eq!(vec.len(), 7);
    /// assert_eq!(vec.capacity(), 9);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        let len = self.len;
        if len == self.cap {
            cold_path();
            self.reserve(1);
        }
        // SAFETY: len < cap
        unsafe {
            ptr::write(self.as_mut_ptr().add(len), value);
        }
        self.len = len + 1;
    }

    /// Appends an element, handing it back if the vector cannot grow.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 1> = SmallVec::new();
    /// assert!(vec.try_push(1).is_ok());
    /// assert!(vec.try_push(2).is_ok());
    /// assert_eq!(vec, [1, 2]);
    /// ```
    pub fn try_push(&mut self, value: T) -> Result<(), (T, TryReserveError)> {
        if self.len == self.cap {
            cold_path();
            if let Err(err) = self.try_reserve(1) {
                return Err((value, err));
            }
        }
        // SAFETY: len < cap
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    /// Appends an element without checking capacity.
    ///
    /// # Safety
    /// len < capacity (before push).
    #[inline(always)]
    pub unsafe fn push_unchecked(&mut self, value: T) {
        let len = self.len;
        unsafe { ptr::write(self.as_mut_ptr().add(len), value) }
        self.len = len + 1;
    }

    /// Removes the last element and returns it, or `None` if the vector is empty.
    ///
    /// The region and capacity are left untouched.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            cold_path();
            None
        } else {
            self.len -= 1;
            // SAFETY: the slot at the old `len - 1` is initialized and no longer tracked.
            unsafe { Some(ptr::read(self.as_ptr().add(self.len))) }
        }
    }

    /// Removes and returns the element at `index`, shifting everything after it to the left.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<char, 2> = SmallVec::from(['a', 'b', 'c']);
    /// assert_eq!(vec.remove(1), 'b');
    /// assert_eq!(vec, ['a', 'c']);
    /// ```
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "removal index should be < len");
        // SAFETY: index < len, the tail is shifted over the removed slot.
        unsafe {
            let base_ptr = self.as_mut_ptr();
            let value = ptr::read(base_ptr.add(index));
            ptr::copy(base_ptr.add(index + 1), base_ptr.add(index), len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Shortens the vector to `len` elements, dropping the rest.
    ///
    /// Has no effect if `len` is not less than the current length.
    /// Capacity and region are unchanged.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len;
        if len < old_len {
            self.len = len;
            // SAFETY: `[len, old_len)` is initialized and no longer tracked.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.as_mut_ptr().add(len),
                    old_len - len,
                ));
            }
        }
    }

    /// Drops every element, keeping the region and capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 2> = SmallVec::from([1, 2, 3, 4, 5]);
    /// let cap = vec.capacity();
    ///
    /// vec.clear();
    /// assert!(vec.is_empty());
    /// assert!(vec.is_heap());
    /// assert_eq!(vec.capacity(), cap);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes the vector to `new_len`, filling new slots with values produced by `f`.
    ///
    /// If the capacity is insufficient the data is moved to the heap first.
    /// Shrinking never releases capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 2> = SmallVec::new();
    /// let mut p = 1;
    /// vec.resize_with(4, || { p *= 2; p });
    /// assert_eq!(vec, [2, 4, 8, 16]);
    /// ```
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut f: F) {
        let len = self.len;
        if new_len == len {
            return;
        }
        if new_len < len {
            self.truncate(new_len);
            return;
        }

        self.ensure_capacity(new_len);
        let base_ptr = self.as_mut_ptr();
        for index in len..new_len {
            // SAFETY: index < new_len <= cap
            unsafe { ptr::write(base_ptr.add(index), f()) };
            self.len = index + 1;
        }
    }

    /// Converts the vector into a [`Vec`].
    ///
    /// A heap block is handed over without copying.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let vec: SmallVec<i32, 2> = SmallVec::from([1, 2, 3]);
    /// let vec: Vec<i32> = vec.into_vec();
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    pub fn into_vec(self) -> Vec<T> {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        match this.region {
            // SAFETY: the block came from the global allocator with `Layout::array::<T>(cap)`.
            Region::Heap(ptr) if !T::IS_ZST => unsafe {
                Vec::from_raw_parts(ptr.as_ptr(), len, this.cap)
            },
            _ => {
                let mut vec = Vec::with_capacity(len);
                // SAFETY: `vec` has room for `len` values, ownership moves with the copy.
                unsafe {
                    ptr::copy_nonoverlapping(this.as_mut_ptr(), vec.as_mut_ptr(), len);
                    vec.set_len(len);
                }
                vec
            }
        }
    }
}

impl<T: Default, const N: usize> SmallVec<T, N> {
    /// Constructs a vector of `len` default values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let vec: SmallVec<i32, 2> = SmallVec::with_len(3);
    /// assert_eq!(vec, [0, 0, 0]);
    /// assert!(vec.is_heap());
    /// ```
    #[inline]
    pub fn with_len(len: usize) -> Self {
        let mut vec = Self::new();
        vec.resize(len);
        vec
    }

    /// Resizes the vector to `new_len`.
    ///
    /// New slots are filled with `T::default()`; extra elements are dropped.
    /// Shrinking never releases capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 2> = SmallVec::from([1, 2]);
    /// vec.resize(4);
    /// assert_eq!(vec, [1, 2, 0, 0]);
    ///
    /// vec.resize(1);
    /// assert_eq!(vec, [1]);
    /// assert!(vec.is_heap());
    /// ```
    #[inline]
    pub fn resize(&mut self, new_len: usize) {
        self.resize_with(new_len, T::default);
    }

    /// Inserts an element at `index`, shifting everything after it to the right.
    ///
    /// The vector first grows by one default value through [`resize`](SmallVec::resize),
    /// the tail is shifted into that slot and `value` then replaces the element at
    /// `index`. Each insert therefore constructs and drops one `T::default()`.
    ///
    /// # Time complexity
    /// O(len - index)
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<char, 4> = SmallVec::from(['a', 'b', 'c']);
    /// vec.insert(0, 'x');
    /// assert_eq!(vec, ['x', 'a', 'b', 'c']);
    ///
    /// vec.insert(4, 'y');
    /// assert_eq!(vec, ['x', 'a', 'b', 'c', 'y']);
    /// ```
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.len;
        precondition!(
            index <= len,
            "insertion index (is {}) should be <= len (is {})",
            index,
            len
        );
        self.resize(len + 1);
        let tail = &mut self.as_mut_slice()[index..];
        tail.rotate_right(1);
        tail[0] = value;
    }
}

impl<T: Clone, const N: usize> SmallVec<T, N> {
    /// Constructs a vector of `n` clones of `elem`.
    pub fn from_elem(elem: T, n: usize) -> Self {
        let mut vec = Self::with_capacity(n);
        if n > 0 {
            // SAFETY: capacity >= n
            unsafe {
                for _ in 1..n {
                    vec.push_unchecked(elem.clone());
                }
                vec.push_unchecked(elem);
            }
        }
        vec
    }

    /// Clones and appends all elements of a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::SmallVec;
    /// let mut vec: SmallVec<i32, 2> = SmallVec::from([1]);
    /// vec.extend_from_slice(&[2, 3, 4]);
    /// assert_eq!(vec, [1, 2, 3, 4]);
    /// ```
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.reserve(other.len());
        for item in other {
            // SAFETY: capacity reserved above
            unsafe { self.push_unchecked(item.clone()) };
        }
    }
}

impl<T, const N: usize> Drop for SmallVec<T, N> {
    fn drop(&mut self) {
        let len = self.len;
        let base_ptr = self.as_mut_ptr();
        // The block is released even if an element's destructor panics.
        let _block = match self.region {
            // SAFETY: the region is reset to inline below, so only the guard frees the block.
            Region::Heap(heap_ptr) => Some(unsafe { raw::BlockGuard::new(heap_ptr, self.cap) }),
            Region::Inline => None,
        };
        self.len = 0;
        self.region = Region::Inline;
        self.cap = N;
        // SAFETY: `[0, len)` is initialized and no longer tracked.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base_ptr, len)) };
    }
}

impl<T, const N: usize> Default for SmallVec<T, N> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for SmallVec<T, N> {
    /// Deep copy: the target capacity is established first, then each element is cloned.
    fn clone(&self) -> Self {
        let mut vec = Self::with_capacity(self.len);
        vec.extend_from_slice(self.as_slice());
        vec
    }

    fn clone_from(&mut self, source: &Self) {
        self.truncate(source.len);
        let (init, tail) = source.as_slice().split_at(self.len);
        self.as_mut_slice().clone_from_slice(init);
        self.extend_from_slice(tail);
    }
}

impl<T, const N: usize> Deref for SmallVec<T, N> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for SmallVec<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for SmallVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const N: usize> AsRef<[T]> for SmallVec<T, N> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T: Hash, const N: usize> Hash for SmallVec<T, N> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a SmallVec<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Eq, const N: usize> Eq for SmallVec<T, N> {}

/// Element-wise equality against anything that views as a slice.
macro_rules! impl_slice_eq {
    ([$($vars:tt)*] $rhs:ty) => {
        impl<$($vars)* T, U, const N: usize> PartialEq<$rhs> for SmallVec<T, N>
        where
            T: PartialEq<U>,
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool {
                self.as_slice() == &other[..]
            }
        }
    };
}

impl_slice_eq!([const P: usize,] SmallVec<U, P>);
impl_slice_eq!([const P: usize,] [U; P]);
impl_slice_eq!([const P: usize,] &[U; P]);
impl_slice_eq!(['a,] &'a [U]);
impl_slice_eq!([] Vec<U>);

impl<T, const N: usize, const P: usize> From<[T; P]> for SmallVec<T, N> {
    /// Moves the array in; heap storage is used if `P > N`.
    fn from(value: [T; P]) -> Self {
        let mut vec = Self::with_capacity(P);
        let value = ManuallyDrop::new(value);
        // SAFETY: capacity >= P, the array is not dropped.
        unsafe {
            ptr::copy_nonoverlapping(value.as_ptr(), vec.as_mut_ptr(), P);
            vec.set_len(P);
        }
        vec
    }
}

impl<T: Clone, const N: usize> From<&[T]> for SmallVec<T, N> {
    #[inline]
    fn from(value: &[T]) -> Self {
        let mut vec = Self::new();
        vec.extend_from_slice(value);
        vec
    }
}

impl<T, const N: usize> From<Vec<T>> for SmallVec<T, N> {
    /// Adopts the `Vec`'s buffer if it is larger than `N`, otherwise moves the elements inline.
    fn from(value: Vec<T>) -> Self {
        if T::IS_ZST || value.capacity() <= N {
            return value.into_iter().collect();
        }
        let mut value = ManuallyDrop::new(value);
        let len = value.len();
        let cap = value.capacity();
        // SAFETY: a `Vec` with non-zero capacity owns a non-null block with `Layout::array::<T>(cap)`.
        let heap_ptr = unsafe { NonNull::new_unchecked(value.as_mut_ptr()) };
        Self {
            inline: [const { MaybeUninit::uninit() }; N],
            region: Region::Heap(heap_ptr),
            len,
            cap,
            _marker: PhantomData,
        }
    }
}

impl<T, const N: usize> From<SmallVec<T, N>> for Vec<T> {
    #[inline]
    fn from(value: SmallVec<T, N>) -> Self {
        value.into_vec()
    }
}

impl<T, const N: usize> Extend<T> for SmallVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: 'a + Copy, const N: usize> Extend<&'a T> for SmallVec<T, N> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize> FromIterator<T> for SmallVec<T, N> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use core::cell::Cell;

    /// Counts drops so leaks and double drops show up as a wrong total.
    #[derive(Debug)]
    struct Tracked {
        value: i32,
        drops: Rc<Cell<usize>>,
    }

    impl Tracked {
        fn new(value: i32, drops: &Rc<Cell<usize>>) -> Self {
            Self {
                value,
                drops: drops.clone(),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn appends_keep_order() {
        let mut vec: SmallVec<i32, 3> = SmallVec::new();
        for i in 0..100 {
            vec.push(i * 3);
            assert_eq!(vec.len(), (i + 1) as usize);
        }
        for i in 0..100 {
            assert_eq!(*vec.at(i), i as i32 * 3);
        }
    }

    #[test]
    fn growth_sequence_from_inline_four() {
        let mut vec: SmallVec<i32, 4> = SmallVec::new();
        let mut caps = vec![];
        for i in 0..7 {
            vec.push(i);
            caps.push(vec.capacity());
        }
        assert_eq!(caps, [4, 4, 4, 4, 6, 6, 9]);
        assert!(vec.is_heap());
        assert!(vec.capacity() >= 7);
    }

    #[test]
    fn one_slot_inline_scenario() {
        let mut vec: SmallVec<char, 1> = SmallVec::new();

        vec.push('a');
        assert!(!vec.is_heap());
        assert_eq!((vec.len(), vec.capacity()), (1, 1));

        vec.push('b');
        assert!(vec.is_heap());
        assert_eq!((vec.len(), vec.capacity()), (2, 4));

        vec.push('c');
        assert_eq!((vec.len(), vec.capacity()), (3, 4));

        assert_eq!([*vec.at(0), *vec.at(1), *vec.at(2)], ['a', 'b', 'c']);
    }

    #[test]
    fn resize_preserves_prefix_and_defaults_tail() {
        let mut vec: SmallVec<i32, 2> = SmallVec::from([7, 8, 9]);
        vec.resize(6);
        assert_eq!(vec, [7, 8, 9, 0, 0, 0]);

        vec.resize(2);
        assert_eq!(vec, [7, 8]);

        vec.resize(2);
        assert_eq!(vec, [7, 8]);
    }

    #[test]
    fn capacity_is_monotonic() {
        let mut vec: SmallVec<String, 2> = SmallVec::new();
        let mut last = vec.capacity();
        for i in 0..40 {
            match i % 4 {
                0 | 1 => vec.push(i.to_string()),
                2 => vec.resize(vec.len() + 3),
                _ => vec.truncate(vec.len() / 2),
            }
            assert!(vec.capacity() >= last);
            last = vec.capacity();
        }
    }

    #[test]
    fn clone_does_not_alias() {
        let vec: SmallVec<i32, 4> = (0..10).collect();
        assert!(vec.is_heap());

        let mut copy = vec.clone();
        assert_eq!(copy, vec);
        assert_ne!(copy.as_ptr(), vec.as_ptr());

        for item in copy.iter_mut() {
            *item += 100;
        }
        assert_eq!(vec, (0..10).collect::<Vec<_>>());
        assert_eq!(copy[0], 100);
    }

    #[test]
    fn clone_from_reuses_destination() {
        let src: SmallVec<String, 2> = SmallVec::from(["a".to_string(), "b".to_string()]);
        let mut dst: SmallVec<String, 2> = (0..5).map(|i| i.to_string()).collect();
        dst.clone_from(&src);
        assert_eq!(dst, src);
        assert!(dst.is_heap());
    }

    #[test]
    fn insert_at_front_shifts_everything() {
        let mut vec: SmallVec<i32, 4> = SmallVec::from([1, 2, 3]);
        vec.insert(0, 9);
        assert_eq!(vec.len(), 4);
        assert_eq!(vec, [9, 1, 2, 3]);
    }

    #[test]
    fn insert_spills_to_heap() {
        let mut vec: SmallVec<i32, 2> = SmallVec::from([1, 2]);
        vec.insert(1, 5);
        assert!(vec.is_heap());
        assert_eq!(vec, [1, 5, 2]);
    }

    #[test]
    fn insert_builds_one_filler() {
        use core::sync::atomic::{AtomicUsize, Ordering};
        static DEFAULTS: AtomicUsize = AtomicUsize::new(0);

        struct Probe(i32);
        impl Default for Probe {
            fn default() -> Self {
                DEFAULTS.fetch_add(1, Ordering::Relaxed);
                Probe(-1)
            }
        }

        let mut vec: SmallVec<Probe, 4> = SmallVec::new();
        vec.push(Probe(1));
        vec.push(Probe(2));
        vec.insert(1, Probe(3));
        assert_eq!(DEFAULTS.load(Ordering::Relaxed), 1);
        assert_eq!(vec.iter().map(|p| p.0).collect::<Vec<_>>(), [1, 3, 2]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut vec: SmallVec<i32, 2> = SmallVec::from([1, 2, 3, 4, 5]);
        assert!(vec.is_heap());
        let cap = vec.capacity();
        vec.clear();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), cap);
        assert!(vec.is_heap());
    }

    #[test]
    fn shrink_to_inline_round_trip() {
        let mut vec: SmallVec<String, 3> = (0..8).map(|i| i.to_string()).collect();
        assert!(!vec.shrink_to_inline());

        vec.truncate(3);
        assert!(vec.shrink_to_inline());
        assert!(!vec.is_heap());
        assert_eq!(vec.capacity(), 3);
        assert_eq!(vec, ["0", "1", "2"]);

        assert!(!vec.shrink_to_inline());

        vec.push("3".to_string());
        assert!(vec.is_heap());
        assert_eq!(vec.capacity(), 4);
    }

    #[test]
    fn shrink_after_truncate() {
        let mut vec: SmallVec<i32, 2> = (0..5).collect();
        assert!(vec.shrink_to_inline_after_truncate(1));
        assert_eq!(vec, [0]);
        assert_eq!(vec.capacity(), 2);
    }

    #[test]
    #[cfg(any(debug_assertions, feature = "checked"))]
    #[should_panic(expected = "should be < len")]
    fn shrink_after_truncate_requires_reduction() {
        let mut vec: SmallVec<i32, 2> = (0..2).collect();
        vec.push(2);
        vec.pop();
        vec.shrink_to_inline_after_truncate(2);
    }

    #[test]
    #[cfg(any(debug_assertions, feature = "checked"))]
    #[should_panic(expected = "index out of bounds")]
    fn at_checks_bounds() {
        let vec: SmallVec<i32, 2> = SmallVec::from([1]);
        vec.at(1);
    }

    #[test]
    #[cfg(any(debug_assertions, feature = "checked"))]
    #[should_panic(expected = "insertion index")]
    fn insert_checks_bounds() {
        let mut vec: SmallVec<i32, 2> = SmallVec::from([1]);
        vec.insert(2, 0);
    }

    #[test]
    fn failed_growth_leaves_vector_untouched() {
        let mut vec: SmallVec<u32, 2> = SmallVec::from([1, 2, 3]);
        let cap = vec.capacity();
        let ptr = vec.as_ptr();

        let err = vec.try_reserve(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityOverflow);
        let err = vec.try_ensure_capacity(isize::MAX as usize).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityOverflow);

        assert_eq!(vec.capacity(), cap);
        assert_eq!(vec.as_ptr(), ptr);
        assert_eq!(vec, [1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn reserve_overflow_panics() {
        let mut vec: SmallVec<u8, 2> = SmallVec::from([1]);
        vec.reserve(usize::MAX);
    }

    #[test]
    fn no_leaks_or_double_drops() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut vec: SmallVec<Tracked, 2> = SmallVec::new();
            for i in 0..10 {
                vec.push(Tracked::new(i, &drops));
            }
            assert_eq!(drops.get(), 0);

            vec.truncate(6);
            assert_eq!(drops.get(), 4);

            drop(vec.remove(0));
            assert_eq!(drops.get(), 5);

            vec.truncate(2);
            assert_eq!(drops.get(), 8);
            assert!(vec.shrink_to_inline());
            assert_eq!(drops.get(), 8);
            assert_eq!(vec[0].value, 1);
            assert_eq!(vec[1].value, 2);
        }
        assert_eq!(drops.get(), 10);
    }

    #[test]
    fn clear_and_drop_heap_mode() {
        let drops = Rc::new(Cell::new(0));
        let mut vec: SmallVec<Tracked, 1> = (0..5).map(|i| Tracked::new(i, &drops)).collect();
        vec.clear();
        assert_eq!(drops.get(), 5);
        vec.push(Tracked::new(9, &drops));
        drop(vec);
        assert_eq!(drops.get(), 6);
    }

    #[test]
    fn zero_sized_values() {
        let mut vec: SmallVec<(), 2> = SmallVec::new();
        for _ in 0..10 {
            vec.push(());
        }
        assert!(vec.is_heap());
        assert_eq!(vec.len(), 10);
        assert_eq!(vec.capacity(), 13);

        vec.truncate(1);
        assert!(vec.shrink_to_inline());
        assert_eq!(vec.capacity(), 2);
        assert_eq!(vec.into_vec(), [()]);
    }

    #[test]
    fn vec_conversions() {
        let vec: SmallVec<i32, 2> = SmallVec::from(vec![1, 2, 3, 4]);
        assert!(vec.is_heap());
        assert_eq!(vec, [1, 2, 3, 4]);
        assert_eq!(Vec::from(vec), [1, 2, 3, 4]);

        let small = SmallVec::<i32, 8>::from(vec![5, 6]);
        assert!(!small.is_heap());
        assert_eq!(small.into_vec(), [5, 6]);
    }

    #[test]
    fn with_len_and_macro() {
        let vec: SmallVec<String, 2> = SmallVec::with_len(3);
        assert!(vec.iter().all(String::is_empty));

        let vec: SmallVec<i32, 4> = crate::small_vec![7; 3];
        assert_eq!(vec, [7, 7, 7]);
        let vec: SmallVec<i32, 4> = crate::small_vec![];
        assert!(vec.is_empty());
    }

    /// Records every byte fed to it, so equal hashes mean equal input streams.
    #[derive(Default)]
    struct ByteHasher(Vec<u8>);

    impl Hasher for ByteHasher {
        fn finish(&self) -> u64 {
            self.0.len() as u64
        }

        fn write(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }

    fn hash_bytes<H: Hash + ?Sized>(value: &H) -> Vec<u8> {
        let mut hasher = ByteHasher::default();
        value.hash(&mut hasher);
        hasher.0
    }

    #[test]
    fn region_does_not_affect_identity() {
        let inline: SmallVec<u16, 4> = SmallVec::from([3, 1, 4]);
        let mut heap: SmallVec<u16, 4> = SmallVec::with_capacity(9);
        heap.extend_from_slice(&[3, 1, 4]);
        assert!(!inline.is_heap());
        assert!(heap.is_heap());

        assert!(inline == heap);
        assert_eq!(hash_bytes(&inline), hash_bytes(&heap));
        assert_eq!(hash_bytes(&inline), hash_bytes(&[3u16, 1, 4][..]));

        let narrow: SmallVec<u16, 1> = SmallVec::from(&[3, 1, 4][..]);
        assert_eq!(inline, narrow);
        assert_eq!(narrow.as_ref(), &[3, 1, 4]);
        assert_ne!(narrow, [3, 1]);
        assert_eq!(format!("{narrow:?}"), "[3, 1, 4]");
    }
}
