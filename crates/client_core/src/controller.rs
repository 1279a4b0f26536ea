use std::sync::Arc;

use parking_lot::RwLock;
use shared::domain::Taxpayer;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::store::{RecordStore, StoreError};

/// The controller-owned snapshot consumed by rendering: the records
/// currently displayed plus a busy indicator. The record sequence preserves
/// the order the store returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub records: Vec<Taxpayer>,
    pub busy: bool,
}

#[derive(Debug, Clone)]
pub enum RegistryEvent {
    RecordsUpdated,
    BusyChanged(bool),
    OperationFailed(String),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("another operation is already in flight")]
    Busy,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sole owner of [`ViewState`]. At most one remote operation runs at a time:
/// every operation acquires the gate up front and a second caller fails fast
/// with [`ControllerError::Busy`] instead of queueing. State is only mutated
/// on successful completion, so a failed operation leaves the previously
/// displayed records intact.
pub struct RegistryController<S: RecordStore> {
    store: S,
    state: RwLock<ViewState>,
    gate: Mutex<()>,
    events: broadcast::Sender<RegistryEvent>,
}

/// Holds the single-flight gate for the duration of one operation. Dropping
/// it clears the busy flag, so the flag is released on every exit path.
struct OpGuard<'a> {
    _gate: MutexGuard<'a, ()>,
    state: &'a RwLock<ViewState>,
    events: &'a broadcast::Sender<RegistryEvent>,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.state.write().busy = false;
        let _ = self.events.send(RegistryEvent::BusyChanged(false));
    }
}

impl<S: RecordStore> RegistryController<S> {
    pub fn new(store: S) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            store,
            state: RwLock::new(ViewState::default()),
            gate: Mutex::new(()),
            events,
        })
    }

    pub fn state(&self) -> ViewState {
        self.state.read().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.read().busy
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Replaces the displayed records with the store's full listing.
    pub async fn refresh(&self) -> Result<(), ControllerError> {
        let _guard = self.begin()?;
        self.fetch_into_state().await
    }

    /// Registers a new record, then re-fetches the full listing from the
    /// store rather than appending locally: the store is the sole source of
    /// truth and may normalize fields or reject the write, and an optimistic
    /// insert would desynchronize the view in those cases.
    pub async fn add(&self, record: Taxpayer) -> Result<(), ControllerError> {
        record
            .validate()
            .map_err(|err| ControllerError::Validation(err.to_string()))?;

        let _guard = self.begin()?;
        if let Err(err) = self.store.create(&record).await {
            warn!(tid = %record.tid, %err, "add failed; keeping previous records");
            let _ = self
                .events
                .send(RegistryEvent::OperationFailed(err.to_string()));
            return Err(err.into());
        }
        self.fetch_into_state().await
    }

    /// Replaces the displayed records with the 0-or-1 result of a key
    /// lookup. An empty result is a valid "no match" outcome and is shown
    /// as an empty list; only a store failure keeps the previous records.
    pub async fn search(&self, tid: &str) -> Result<(), ControllerError> {
        let tid = tid.trim();
        if tid.is_empty() {
            return Err(ControllerError::Validation("tid must not be empty".into()));
        }

        let _guard = self.begin()?;
        match self.store.find_by_tid(tid).await {
            Ok(records) => {
                debug!(tid, matches = records.len(), "search completed");
                self.replace_records(records);
                Ok(())
            }
            Err(err) => {
                warn!(tid, %err, "search failed; keeping previous records");
                let _ = self
                    .events
                    .send(RegistryEvent::OperationFailed(err.to_string()));
                Err(err.into())
            }
        }
    }

    fn begin(&self) -> Result<OpGuard<'_>, ControllerError> {
        let gate = self.gate.try_lock().map_err(|_| ControllerError::Busy)?;
        self.state.write().busy = true;
        let _ = self.events.send(RegistryEvent::BusyChanged(true));
        Ok(OpGuard {
            _gate: gate,
            state: &self.state,
            events: &self.events,
        })
    }

    async fn fetch_into_state(&self) -> Result<(), ControllerError> {
        match self.store.list_all().await {
            Ok(records) => {
                self.replace_records(records);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "listing failed; keeping previous records");
                let _ = self
                    .events
                    .send(RegistryEvent::OperationFailed(err.to_string()));
                Err(err.into())
            }
        }
    }

    fn replace_records(&self, records: Vec<Taxpayer>) {
        self.state.write().records = records;
        let _ = self.events.send(RegistryEvent::RecordsUpdated);
    }
}
