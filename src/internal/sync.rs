//! Lock, map and cell types selected by the performance features.

#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::Mutex;

/// Poison-tolerant wrapper with the `parking_lot` locking signature.
///
/// Cache entries are written once and never left half-initialized, so a
/// poisoned lock still guards a consistent map.
#[cfg(not(feature = "parking-lot"))]
#[derive(Debug, Default)]
pub(crate) struct Mutex<T>(std::sync::Mutex<T>);

#[cfg(not(feature = "parking-lot"))]
impl<T> Mutex<T> {
    pub(crate) fn new(value: T) -> Self {
        Mutex(std::sync::Mutex::new(value))
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(feature = "ahash")]
pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "once-cell")]
pub(crate) use once_cell::sync::OnceCell as OnceSlot;
#[cfg(not(feature = "once-cell"))]
pub(crate) use std::sync::OnceLock as OnceSlot;

#[cfg(feature = "smallvec")]
pub(crate) type ArgumentList = smallvec::SmallVec<[crate::inject::Argument; 4]>;
#[cfg(not(feature = "smallvec"))]
pub(crate) type ArgumentList = Vec<crate::inject::Argument>;
