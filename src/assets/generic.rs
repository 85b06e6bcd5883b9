use std::cell::RefCell;
use std::ops::Deref;
use std::sync::Arc;

/// Shared handle to cached asset data.
///
/// Usage:
/// - sharing one cache entry between many scene objects
/// - swapping data in place on hot reload without invalidating handles
#[derive(Clone)]
pub struct Asset<T> {
    data: Arc<RefCell<T>>,
}

impl<T> Deref for Asset<T> {
    type Target = T;

    /// # Safety
    /// Dereference of the raw pointer is safe because the underlying data
    /// is only replaced in the single threaded Assets::process_loading,
    /// never while a dereference is held.
    fn deref(&self) -> &Self::Target {
        unsafe { &*self.data.as_ptr() }
    }
}

impl<T> From<T> for Asset<T> {
    fn from(data: T) -> Self {
        Self {
            data: Arc::new(RefCell::new(data)),
        }
    }
}

impl<T> Asset<T> {
    #[inline]
    pub fn update(&mut self, data: T) {
        let mut this = self.data.borrow_mut();
        *this = data;
    }

    pub fn share(&self) -> Asset<T> {
        Self {
            data: self.data.clone(),
        }
    }
}
