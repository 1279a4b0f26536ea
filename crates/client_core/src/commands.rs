use std::sync::Arc;

use shared::domain::Taxpayer;
use tracing::{debug, warn};

use crate::controller::{ControllerError, RegistryController};
use crate::store::RecordStore;

/// Thin triggers mapping user intent to controller operations. Each handler
/// is a no-op while the controller is busy, so overlapping remote calls
/// cannot be issued from the UI. Failures are surfaced through the
/// controller's event stream; handlers return nothing.
pub struct CommandHandlers<S: RecordStore + 'static> {
    controller: Arc<RegistryController<S>>,
}

impl<S: RecordStore + 'static> CommandHandlers<S> {
    pub fn new(controller: Arc<RegistryController<S>>) -> Self {
        Self { controller }
    }

    pub async fn refresh_records(&self) {
        if self.controller.is_busy() {
            debug!("refresh trigger ignored: controller busy");
            return;
        }
        self.log_outcome("refresh", self.controller.refresh().await);
    }

    pub async fn add_record(&self, record: Taxpayer) {
        if self.controller.is_busy() {
            debug!("add trigger ignored: controller busy");
            return;
        }
        let tid = record.tid.clone();
        self.log_outcome(&format!("add tid={tid}"), self.controller.add(record).await);
    }

    pub async fn search_records(&self, tid: &str) {
        if self.controller.is_busy() {
            debug!("search trigger ignored: controller busy");
            return;
        }
        self.log_outcome(
            &format!("search tid={tid}"),
            self.controller.search(tid).await,
        );
    }

    fn log_outcome(&self, operation: &str, result: Result<(), ControllerError>) {
        match result {
            Ok(()) => {}
            // The busy check above raced with another trigger; drop this one.
            Err(ControllerError::Busy) => {
                debug!(operation, "trigger ignored: controller busy");
            }
            Err(err) => warn!(operation, %err, "operation failed"),
        }
    }
}
