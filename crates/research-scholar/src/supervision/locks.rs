use std::collections::BTreeSet;
use std::sync::{Condvar, Mutex};

use crate::registry::domain::FacultyId;

/// Serializes read-check-write sequences per faculty member so two concurrent
/// assignments cannot both observe the last free slot.
#[derive(Debug, Default)]
pub struct AssignmentLocks {
    held: Mutex<BTreeSet<FacultyId>>,
    released: Condvar,
}

/// Holds every requested faculty id until dropped.
#[derive(Debug)]
pub struct AssignmentGuard<'a> {
    locks: &'a AssignmentLocks,
    ids: BTreeSet<FacultyId>,
}

impl AssignmentLocks {
    /// Blocks until none of `ids` is held elsewhere, then claims all of them at once.
    ///
    /// This parks the calling thread, including a runtime worker when called from an async
    /// handler. Guarded sections are synchronous store calls and never await.
    pub fn acquire<'b, I>(&self, ids: I) -> AssignmentGuard<'_>
    where
        I: IntoIterator<Item = &'b FacultyId>,
    {
        let ids: BTreeSet<FacultyId> = ids.into_iter().cloned().collect();
        let mut held = self.held.lock().expect("assignment lock mutex poisoned");
        while ids.iter().any(|id| held.contains(id)) {
            held = self
                .released
                .wait(held)
                .expect("assignment lock mutex poisoned");
        }
        held.extend(ids.iter().cloned());
        AssignmentGuard { locks: self, ids }
    }

    pub fn is_held(&self, id: &FacultyId) -> bool {
        self.held
            .lock()
            .expect("assignment lock mutex poisoned")
            .contains(id)
    }
}

impl AssignmentGuard<'_> {
    pub fn ids(&self) -> impl Iterator<Item = &FacultyId> {
        self.ids.iter()
    }
}

impl Drop for AssignmentGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut held) = self.locks.held.lock() {
            for id in &self.ids {
                held.remove(id);
            }
        }
        self.locks.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn guard_releases_on_drop() {
        let locks = AssignmentLocks::default();
        let id = FacultyId("F-1".to_string());
        {
            let guard = locks.acquire([&id]);
            assert!(locks.is_held(&id));
            assert_eq!(guard.ids().count(), 1);
        }
        assert!(!locks.is_held(&id));
    }

    #[test]
    fn duplicate_ids_collapse_into_one_claim() {
        let locks = AssignmentLocks::default();
        let id = FacultyId("F-1".to_string());
        let guard = locks.acquire([&id, &id]);
        assert_eq!(guard.ids().count(), 1);
    }

    #[test]
    fn overlapping_claims_run_one_at_a_time() {
        let locks = Arc::new(AssignmentLocks::default());
        let inside = Arc::new(AtomicU32::new(0));
        let overlap = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let inside = inside.clone();
                let overlap = overlap.clone();
                thread::spawn(move || {
                    let id = FacultyId("F-shared".to_string());
                    let _guard = locks.acquire([&id]);
                    if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                        overlap.fetch_add(1, Ordering::SeqCst);
                    }
                    thread::sleep(std::time::Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker finishes");
        }
        assert_eq!(overlap.load(Ordering::SeqCst), 0);
    }
}
