//! Per-key mutex registry used to serialize mutations of one tank.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Lazily created mutex per key.
#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Returns the mutex guarding `key`, creating it on first use.
    pub(crate) fn slot(&self, key: Uuid) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key).or_default())
    }

    /// Drops the mutex of `key`; holders keep their `Arc` until released.
    pub(crate) fn forget(&self, key: Uuid) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::KeyedLocks;
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn same_key_shares_one_mutex() {
        let locks = KeyedLocks::default();
        let key = Uuid::new_v4();
        assert!(Arc::ptr_eq(&locks.slot(key), &locks.slot(key)));
        assert!(!Arc::ptr_eq(&locks.slot(key), &locks.slot(Uuid::new_v4())));
    }

    #[test]
    fn forget_releases_the_slot() {
        let locks = KeyedLocks::default();
        let key = Uuid::new_v4();
        let first = locks.slot(key);
        locks.forget(key);
        assert!(!Arc::ptr_eq(&first, &locks.slot(key)));
    }
}
