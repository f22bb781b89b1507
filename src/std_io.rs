extern crate std;

use core::ptr;
use std::io::{IoSlice, Write};

use crate::SmallVec;

/// Write is implemented for `SmallVec<u8, N>` by appending to the vector.
/// The vector will grow as needed, spilling to the heap once `N` bytes are exceeded.
impl<const N: usize> Write for SmallVec<u8, N> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let len = self.len();
        let num = buf.len();

        self.try_reserve(num).map_err(std::io::Error::other)?;

        // SAFETY: capacity reserved above, bytes need no drop.
        unsafe {
            ptr::copy_nonoverlapping(buf.as_ptr(), self.as_mut_ptr().add(len), num);
            self.set_len(len + num);
        }

        Ok(num)
    }

    #[inline(always)]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    #[inline]
    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> std::io::Result<usize> {
        let total = bufs.iter().map(|b| b.len()).sum();
        self.try_reserve(total).map_err(std::io::Error::other)?;
        for buf in bufs {
            self.extend_from_slice(buf);
        }
        Ok(total)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.write(buf).map(|_| ())
    }
}
