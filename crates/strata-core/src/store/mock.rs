use super::{Locker, Result, Store, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Init,
    Lock,
    Unlock,
    ListApplied,
    RecordApplied(String),
    RecordReverted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Fail {
    Init,
    Lock,
    ListApplied,
    RecordApplied(String),
    RecordReverted(String),
}

/// Store that journals every call and fails on demand.
#[derive(Debug, Default)]
pub(crate) struct MockStore {
    locking: bool,
    fail: Mutex<HashSet<Fail>>,
    applied: Mutex<Vec<String>>,
    calls: Mutex<Vec<Call>>,
}

impl MockStore {
    /// A store that exposes a locker.
    pub fn locking() -> Self {
        Self {
            locking: true,
            ..Self::default()
        }
    }

    /// A store without a locker.
    pub fn unlocked() -> Self {
        Self::default()
    }

    pub fn with_applied(self, ids: &[&str]) -> Self {
        *self.applied.lock() = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing(self, fail: Fail) -> Self {
        self.fail.lock().insert(fail);
        self
    }

    pub fn fail_on(&self, fail: Fail) {
        self.fail.lock().insert(fail);
    }

    pub fn heal(&self, fail: &Fail) {
        self.fail.lock().remove(fail);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().clone()
    }

    fn enter(&self, call: Call, fail: Fail) -> Result<()> {
        self.calls.lock().push(call);
        if self.fail.lock().contains(&fail) {
            return Err(StoreError::backend(UnitTest));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unittest")]
pub(crate) struct UnitTest;

impl Store for MockStore {
    fn init(&self) -> Result<()> {
        self.enter(Call::Init, Fail::Init)
    }

    fn record_applied(&self, id: &str, _executed: DateTime<Utc>) -> Result<()> {
        self.enter(
            Call::RecordApplied(id.to_owned()),
            Fail::RecordApplied(id.to_owned()),
        )?;
        self.applied.lock().push(id.to_owned());
        Ok(())
    }

    fn record_reverted(&self, id: &str, _executed: DateTime<Utc>) -> Result<()> {
        self.enter(
            Call::RecordReverted(id.to_owned()),
            Fail::RecordReverted(id.to_owned()),
        )?;
        let mut applied = self.applied.lock();
        let Some(index) = applied.iter().position(|a| a == id) else {
            return Err(StoreError::IdNotFound(id.to_owned()));
        };
        applied.remove(index);
        Ok(())
    }

    fn list_applied(&self) -> Result<Vec<String>> {
        self.enter(Call::ListApplied, Fail::ListApplied)?;
        Ok(self.applied())
    }

    fn locker(&self) -> Option<&dyn Locker> {
        if self.locking {
            Some(self)
        } else {
            None
        }
    }
}

impl Locker for MockStore {
    fn lock(&self) -> Result<()> {
        self.enter(Call::Lock, Fail::Lock)
    }

    fn unlock(&self) -> Result<()> {
        self.calls.lock().push(Call::Unlock);
        Ok(())
    }
}
