//! Optimistic task-progress updates. A proposed percentage is taken on
//! immediately while the store write runs behind it; a failed write
//! reverts to the last confirmed value.
//!
//! States: `confirmed → pending → {confirmed | reverted}`.

use crate::error::Result;
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// The displayed value matches the store.
    Confirmed,
    /// A proposed value is displayed while the store write is in flight.
    Pending,
    /// The last proposal failed; the displayed value was rolled back.
    Reverted,
}

/// Tracks one task's progress percentage through optimistic updates.
pub struct ProgressTracker {
    task_id: String,
    value: u8,
    confirmed: u8,
    state: ProgressState,
}

impl ProgressTracker {
    pub fn new(task_id: &str, confirmed: u8) -> Self {
        Self {
            task_id: task_id.to_string(),
            value: confirmed,
            confirmed,
            state: ProgressState::Confirmed,
        }
    }

    /// The currently displayed value: the proposal while one is in flight,
    /// otherwise the confirmed value.
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Take on `proposed` speculatively, then attempt the store write.
    /// Success confirms the proposal; failure reverts to the previous
    /// confirmed value and returns the store error.
    pub async fn propose(&mut self, store: &dyn RecordStore, proposed: u8) -> Result<u8> {
        let proposed = proposed.min(100);
        self.value = proposed;
        self.state = ProgressState::Pending;

        match store.update_task_progress(&self.task_id, proposed).await {
            Ok(task) => {
                self.confirmed = task.progress_percent;
                self.value = task.progress_percent;
                self.state = ProgressState::Confirmed;
                Ok(self.value)
            }
            Err(e) => {
                log::warn!(
                    "Progress update for {} failed, reverting to {}%: {e}",
                    self.task_id,
                    self.confirmed
                );
                self.value = self.confirmed;
                self.state = ProgressState::Reverted;
                Err(e)
            }
        }
    }
}
