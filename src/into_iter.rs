use core::fmt;
use core::iter::FusedIterator;
use core::ptr;
use core::slice;

use crate::SmallVec;

/// An iterator that moves out of a [`SmallVec`].
///
/// Created by the `into_iter` method on [`SmallVec`] (provided by [`IntoIterator`]).
/// Elements that are not yielded are dropped together with the iterator, and the
/// heap block (if any) is released then.
///
/// # Examples
///
/// ```
/// # use hybridvec::SmallVec;
/// let vec: SmallVec<_, 2> = SmallVec::from(['a', 'b', 'c']);
/// let mut iter = vec.into_iter();
///
/// assert_eq!(iter.next(), Some('a'));
/// assert_eq!(iter.next_back(), Some('c'));
/// assert_eq!(iter.as_slice(), &['b']);
/// ```
pub struct IntoIter<T, const N: usize> {
    // Length is kept at zero; `start..end` tracks the elements still owned here.
    vec: SmallVec<T, N>,
    start: usize,
    end: usize,
}

impl<T, const N: usize> IntoIter<T, N> {
    /// Returns the remaining items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `start..end` is initialized.
        unsafe { slice::from_raw_parts(self.vec.as_ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.end - self.start;
        // SAFETY: `start..end` is initialized.
        unsafe { slice::from_raw_parts_mut(self.vec.as_mut_ptr().add(self.start), len) }
    }
}

impl<T, const N: usize> IntoIterator for SmallVec<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    #[inline]
    fn into_iter(mut self) -> Self::IntoIter {
        let end = self.len();
        // SAFETY: ownership of `0..end` moves to the iterator.
        unsafe { self.set_len(0) };
        IntoIter {
            vec: self,
            start: 0,
            end,
        }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start < end`, the slot is read exactly once.
        let value = unsafe { ptr::read(self.vec.as_ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: `start <= end`, the slot is read exactly once.
        unsafe { Some(ptr::read(self.vec.as_ptr().add(self.end))) }
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T: Clone, const N: usize> Clone for IntoIter<T, N> {
    fn clone(&self) -> Self {
        SmallVec::<T, N>::from(self.as_slice()).into_iter()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for IntoIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        let remaining: *mut [T] = self.as_mut_slice();
        self.start = self.end;
        // SAFETY: the remaining values are dropped once; `vec` then frees the block.
        unsafe { ptr::drop_in_place(remaining) };
    }
}

#[cfg(test)]
mod tests {
    use crate::SmallVec;
    use alloc::rc::Rc;
    use alloc::vec::Vec;

    #[test]
    fn yields_in_order_from_both_regions() {
        let inline: SmallVec<i32, 4> = SmallVec::from([1, 2, 3]);
        assert_eq!(inline.into_iter().collect::<Vec<_>>(), [1, 2, 3]);

        let heap: SmallVec<i32, 2> = (0..6).collect();
        assert_eq!(heap.into_iter().rev().collect::<Vec<_>>(), [5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn partial_consumption_drops_the_rest() {
        let item = Rc::new(());
        let vec: SmallVec<Rc<()>, 2> = (0..5).map(|_| item.clone()).collect();
        assert_eq!(Rc::strong_count(&item), 6);

        let mut iter = vec.into_iter();
        let first = iter.next();
        assert_eq!(iter.len(), 4);
        drop(iter);
        assert_eq!(Rc::strong_count(&item), 2);

        drop(first);
        assert_eq!(Rc::strong_count(&item), 1);
    }

    #[test]
    fn clone_copies_remaining() {
        let vec: SmallVec<i32, 2> = SmallVec::from([1, 2, 3]);
        let mut iter = vec.into_iter();
        iter.next();
        let copy = iter.clone();
        assert_eq!(copy.collect::<Vec<_>>(), [2, 3]);
        assert_eq!(iter.collect::<Vec<_>>(), [2, 3]);
    }
}
