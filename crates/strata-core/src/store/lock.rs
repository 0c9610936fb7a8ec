use super::{Result, StoreError};
use parking_lot::{Condvar, Mutex};

/// Process-local lock with separate acquire and release calls.
///
/// Backs the [`Locker`](super::Locker) impls of the reference stores. The
/// held state is a flag guarded by a mutex; waiters park on a condvar until
/// it clears.
#[derive(Debug, Default)]
pub struct ProcessLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl ProcessLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is free, then take it.
    pub fn acquire(&self) {
        let mut held = self.held.lock();
        while *held {
            self.released.wait(&mut held);
        }
        *held = true;
    }

    /// Release the lock and wake one waiter.
    ///
    /// Returns [`StoreError::NotLocked`] if the lock was not held.
    pub fn release(&self) -> Result<()> {
        let mut held = self.held.lock();
        if !*held {
            return Err(StoreError::NotLocked);
        }
        *held = false;
        self.released.notify_one();
        Ok(())
    }

    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn acquire_and_release() {
        let lock = ProcessLock::new();
        assert!(!lock.is_held());
        lock.acquire();
        assert!(lock.is_held());
        lock.release().unwrap();
        assert!(!lock.is_held());
    }

    #[test]
    fn release_without_acquire_is_an_error() {
        let lock = ProcessLock::new();
        assert!(matches!(lock.release(), Err(StoreError::NotLocked)));
    }

    #[test]
    fn second_acquire_waits_for_release() {
        let lock = Arc::new(ProcessLock::new());
        lock.acquire();

        let entered = Arc::new(AtomicBool::new(false));
        let handle = {
            let lock = Arc::clone(&lock);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                lock.acquire();
                entered.store(true, Ordering::SeqCst);
                lock.release().unwrap();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst));

        lock.release().unwrap();
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
        assert!(!lock.is_held());
    }
}
