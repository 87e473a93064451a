use core::fmt;
use core::mem::MaybeUninit;
use core::ops::Deref;
use core::slice;

/// A fixed-capacity vector that lives on the stack or in static memory.
///
/// Holds `Copy` items only, so nothing needs dropping.
pub struct StaticVec<T: Copy, const N: usize> {
    data: [MaybeUninit<T>; N],
    len: usize,
}

impl<T: Copy, const N: usize> Default for StaticVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> StaticVec<T, N> {
    pub const fn new() -> Self {
        Self {
            data: [const { MaybeUninit::uninit() }; N],
            len: 0,
        }
    }

    /// Copies `items`, or returns the number of items if they do not fit.
    pub fn from_slice(items: &[T]) -> Result<Self, usize> {
        let mut vec = Self::new();
        for &item in items {
            vec.push(item).map_err(|_| items.len())?;
        }
        Ok(vec)
    }

    #[inline(always)]
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.len < N {
            self.data[self.len].write(item);
            self.len += 1;
            Ok(())
        } else {
            Err(item)
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        N
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe {
            // Safety: data[0..len] is initialized.
            slice::from_raw_parts(self.data.as_ptr() as *const T, self.len)
        }
    }
}

impl<T: Copy, const N: usize> Clone for StaticVec<T, N> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            len: self.len,
        }
    }
}

// Allow indexing like a normal slice
impl<T: Copy, const N: usize> Deref for StaticVec<T, N> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: Copy + fmt::Debug, const N: usize> fmt::Debug for StaticVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: Copy + PartialEq, const N: usize> PartialEq for StaticVec<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}
