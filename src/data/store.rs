//! In-memory, session-keyed dataset store.
//!
//! Each session owns a slot with a writer mutex and a published snapshot.
//! Mutations of one session are serialised by its writer mutex; readers clone
//! the current `Arc` and never wait on a running transform.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::common::error::{LensError, LensResult};

use super::domain::{Dataset, DatasetStore, SessionId, Snapshot, Transition};

#[derive(Default)]
struct Slot {
    writer: Mutex<()>,
    current: RwLock<Option<Snapshot>>,
}

impl Slot {
    fn snapshot(&self) -> LensResult<Option<Snapshot>> {
        let guard = self.current.read().map_err(|_| LensError::poisoned())?;
        Ok(guard.clone())
    }

    fn publish(&self, snapshot: Snapshot) -> LensResult<()> {
        let mut guard = self.current.write().map_err(|_| LensError::poisoned())?;
        *guard = Some(snapshot);
        Ok(())
    }
}

/// Process-local store; contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionId, Arc<Slot>>>,
    next_version: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, session: &SessionId) -> LensResult<Option<Arc<Slot>>> {
        let sessions = self.sessions.read().map_err(|_| LensError::poisoned())?;
        Ok(sessions.get(session).cloned())
    }

    fn slot_or_insert(&self, session: &SessionId) -> LensResult<Arc<Slot>> {
        if let Some(slot) = self.slot(session)? {
            return Ok(slot);
        }
        let mut sessions = self.sessions.write().map_err(|_| LensError::poisoned())?;
        Ok(sessions.entry(session.clone()).or_default().clone())
    }

    fn stamp(&self, dataset: Dataset) -> Snapshot {
        Snapshot {
            version: self.next_version.fetch_add(1, Ordering::Relaxed) + 1,
            dataset: Arc::new(dataset),
        }
    }
}

impl DatasetStore for MemoryStore {
    fn put(&self, session: &SessionId, dataset: Dataset) -> LensResult<Snapshot> {
        let slot = self.slot_or_insert(session)?;
        let _writer = slot.writer.lock().map_err(|_| LensError::poisoned())?;
        let snapshot = self.stamp(dataset);
        slot.publish(snapshot.clone())?;
        debug!(session = %session, version = snapshot.version, "dataset published");
        Ok(snapshot)
    }

    fn get(&self, session: &SessionId) -> LensResult<Snapshot> {
        self.slot(session)?
            .map(|slot| slot.snapshot())
            .transpose()?
            .flatten()
            .ok_or_else(|| LensError::no_dataset(session.as_str()))
    }

    fn transform(
        &self,
        session: &SessionId,
        f: &mut dyn FnMut(&Dataset) -> LensResult<Dataset>,
    ) -> LensResult<Transition> {
        let slot = self
            .slot(session)?
            .ok_or_else(|| LensError::no_dataset(session.as_str()))?;
        let _writer = slot.writer.lock().map_err(|_| LensError::poisoned())?;

        let before = slot
            .snapshot()?
            .ok_or_else(|| LensError::no_dataset(session.as_str()))?;
        let after = self.stamp(f(&before.dataset)?);
        slot.publish(after.clone())?;
        debug!(
            session = %session,
            from = before.version,
            to = after.version,
            "dataset transformed"
        );
        Ok(Transition { before, after })
    }
}
