/// Minimum heap capacity; the first spill never allocates fewer slots than this.
pub(crate) const MIN_HEAP_CAP: usize = 4;

/// Compile-time knowledge about `T` used to skip allocation for ZSTs.
pub(crate) trait IsZST {
    const IS_ZST: bool;
}

impl<T> IsZST for T {
    const IS_ZST: bool = core::mem::size_of::<T>() == 0;
}

/// Marks the enclosing branch as unlikely.
#[cold]
#[inline(always)]
pub(crate) const fn cold_path() {}

/// Next capacity able to hold `requested` slots.
///
/// Starts from `max(current, 4)` and multiplies by 1.5 (rounding down each step)
/// until `requested` fits. Returns `None` if the result does not fit in `usize`.
#[inline]
pub(crate) const fn grow_capacity(current: usize, requested: usize) -> Option<usize> {
    let mut cap = if current < MIN_HEAP_CAP {
        MIN_HEAP_CAP
    } else {
        current
    };
    while cap < requested {
        cap = match cap.checked_add(cap >> 1) {
            Some(next) => next,
            None => return None,
        };
    }
    Some(cap)
}

/// Checks a caller contract.
///
/// Active with `debug_assertions` or the `checked` feature. Otherwise the condition
/// is not evaluated and the caller is responsible for upholding it.
macro_rules! precondition {
    ($cond:expr, $($msg:tt)+) => {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!($cond, $($msg)+);
        }
    };
}

pub(crate) use precondition;

/// Emits a `tracing` event when the `tracing` feature is enabled.
macro_rules! trace_region {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($arg)+);
        }
    };
}

pub(crate) use trace_region;
