use core::alloc::Layout;
use core::error::Error;
use core::fmt;

/// What went wrong while growing a [`SmallVec`](crate::SmallVec).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested capacity exceeds `usize` or the `isize::MAX` byte limit.
    CapacityOverflow,
    /// The global allocator returned null for this layout.
    AllocFailure { layout: Layout },
}

/// The error returned by the fallible growth methods such as
/// [`SmallVec::try_reserve`](crate::SmallVec::try_reserve).
///
/// When this is returned the vector is left exactly as it was before the call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TryReserveError {
    kind: ErrorKind,
}

impl TryReserveError {
    #[inline]
    pub(crate) const fn capacity_overflow() -> Self {
        Self {
            kind: ErrorKind::CapacityOverflow,
        }
    }

    #[inline]
    pub(crate) const fn alloc_failure(layout: Layout) -> Self {
        Self {
            kind: ErrorKind::AllocFailure { layout },
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Error for TryReserveError {}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;
        match self.kind {
            ErrorKind::CapacityOverflow => {
                f.write_str(" because the computed capacity exceeded the collection's maximum")
            }
            ErrorKind::AllocFailure { layout } => write!(
                f,
                " because the memory allocator returned an error (size {}, align {})",
                layout.size(),
                layout.align()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_cause() {
        let err = TryReserveError::capacity_overflow();
        assert_eq!(err.kind(), ErrorKind::CapacityOverflow);
        assert!(err.to_string().contains("maximum"));

        let layout = Layout::from_size_align(8, 8).unwrap();
        let err = TryReserveError::alloc_failure(layout);
        assert_eq!(err.kind(), ErrorKind::AllocFailure { layout });
        assert!(err.to_string().contains("size 8, align 8"));
    }
}
