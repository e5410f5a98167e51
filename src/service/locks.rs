//! Per-cargo critical sections.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::TrackingId;

/// Hands out one mutex per tracking id.
///
/// Locks are created on first use and kept for the life of the process.
#[derive(Debug, Default)]
pub struct CargoLocks {
    locks: Mutex<HashMap<TrackingId, Arc<Mutex<()>>>>,
}

impl CargoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `tracking_id`.
    ///
    /// Not reentrant: `f` must not take the same cargo's lock again.
    pub fn with<T>(&self, tracking_id: &TrackingId, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(tracking_id);
        let _guard = lock.lock();
        f()
    }

    fn lock_for(&self, tracking_id: &TrackingId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.lock().entry(tracking_id.clone()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_cargo_shares_a_lock() {
        let locks = CargoLocks::new();
        let a = locks.lock_for(&"ABC123".into());
        let b = locks.lock_for(&"ABC123".into());
        let other = locks.lock_for(&"XYZ789".into());

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[test]
    fn read_modify_write_does_not_lose_updates() {
        let locks = CargoLocks::new();
        let counter = Mutex::new(0_u32);
        let id = TrackingId::from("ABC123");

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10 {
                        locks.with(&id, || {
                            let seen = *counter.lock();
                            thread::sleep(Duration::from_micros(50));
                            *counter.lock() = seen + 1;
                        });
                    }
                });
            }
        });

        assert_eq!(*counter.lock(), 80);
    }
}
