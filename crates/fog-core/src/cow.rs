//! The atomic copy-on-write primitive shared by [`crate::image::OwnedImage`]
//! and, via the same wrapper, `fog-region`'s region data block.
//!
//! The original engine hand-rolled `cmpxchg`/`xadd` sequences for its
//! reference-counted data blocks; here that collapses to
//! [`std::sync::Arc`]'s existing `make_mut`. [`CowCell`] is a thin, named
//! wrapper over that rather than a reimplementation of it, so callers that
//! want "shared until written" semantics (a region's box list, in
//! particular) don't have to spell out `Arc::make_mut` themselves.

use std::sync::Arc;

/// A copy-on-write handle around a reference-counted payload.
///
/// Reads are free while shared; the first write after a clone copies the
/// payload. This is a thin wrapper over [`Arc`] that exposes the
/// get/get_mut/ref_count vocabulary the region and image code uses, rather
/// than spelling out `Arc::make_mut` at every call site.
#[derive(Debug, Clone)]
pub struct CowCell<T> {
    inner: Arc<T>,
}

impl<T: Clone> CowCell<T> {
    /// Wraps `value` in a new, uniquely-owned cell.
    pub fn new(value: T) -> Self {
        CowCell {
            inner: Arc::new(value),
        }
    }

    /// Shared, read-only access to the payload.
    #[inline]
    pub fn get(&self) -> &T {
        &self.inner
    }

    /// Exclusive access to the payload, cloning it first if another handle
    /// shares this cell's storage.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        Arc::make_mut(&mut self.inner)
    }

    /// Number of live handles sharing this cell's storage.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// `true` if no other handle shares this cell's storage.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1
    }
}

impl<T: Clone + PartialEq> PartialEq for CowCell<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.get() == other.get()
    }
}

impl<T: Clone + Eq> Eq for CowCell<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cow_cell_shares_until_mutated() {
        let a = CowCell::new(vec![1, 2, 3]);
        let mut b = a.clone();
        assert!(!a.is_unique());
        b.get_mut().push(4);
        assert_eq!(a.get(), &vec![1, 2, 3]);
        assert_eq!(b.get(), &vec![1, 2, 3, 4]);
        assert!(a.is_unique());
        assert!(b.is_unique());
    }

    #[test]
    fn equality_compares_payloads_not_identity() {
        let a = CowCell::new(vec![1, 2, 3]);
        let b = CowCell::new(vec![1, 2, 3]);
        assert_eq!(a, b);
        let mut c = a.clone();
        c.get_mut().push(4);
        assert_ne!(a, c);
    }
}
