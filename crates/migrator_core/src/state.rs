use std::collections::BTreeMap;

use crate::view_model::StagingView;
use crate::{ActionKind, EntityKind, EntityRow, StagingStore};

/// Session state owned by the UI loop: the staging store plus what is on screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    store: StagingStore,
    running: Vec<ActionKind>,
    log_display: String,
    config_status: Option<String>,
    hydration_errors: BTreeMap<EntityKind, String>,
    filtered_rows: BTreeMap<EntityKind, Vec<EntityRow>>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &StagingStore {
        &self.store
    }

    pub fn view(&self) -> StagingView {
        StagingView {
            projects: self.store.staged(EntityKind::Project).to_vec(),
            groups: self.store.staged(EntityKind::Group).to_vec(),
            users: self.store.staged(EntityKind::User).to_vec(),
            listing_in_progress: self.store.listing_in_progress(),
            migration_in_progress: self.store.migration_in_progress(),
            running: self.running.clone(),
            log_display: self.log_display.clone(),
            config_status: self.config_status.clone(),
            settings: self.store.settings().entries().clone(),
            hydration_errors: self.hydration_errors.clone(),
            filtered_rows: self.filtered_rows.clone(),
            has_generated_request: self.store.direct_transfer_generated_request().is_some(),
            has_modified_request: self.store.direct_transfer_modified_request().is_some(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn store_mut(&mut self) -> &mut StagingStore {
        &mut self.store
    }

    pub(crate) fn is_running(&self, action: ActionKind) -> bool {
        self.running.contains(&action)
    }

    pub(crate) fn any_running(&self) -> bool {
        !self.running.is_empty()
    }

    pub(crate) fn begin_action(&mut self, action: ActionKind) {
        self.running.push(action);
        self.mark_dirty();
    }

    /// Removes one running instance of `action`; returns false if none was running.
    pub(crate) fn end_action(&mut self, action: ActionKind) -> bool {
        match self.running.iter().position(|running| *running == action) {
            Some(index) => {
                self.running.remove(index);
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_log_display(&mut self, text: String) {
        if self.log_display != text {
            self.log_display = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_config_status(&mut self, status: String) {
        self.config_status = Some(status);
        self.mark_dirty();
    }

    pub(crate) fn set_hydration_error(&mut self, kind: EntityKind, error: Option<String>) {
        let changed = match error {
            Some(error) => self.hydration_errors.insert(kind, error.clone()) != Some(error),
            None => self.hydration_errors.remove(&kind).is_some(),
        };
        if changed {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_filtered_rows(&mut self, kind: EntityKind, rows: Vec<EntityRow>) {
        self.filtered_rows.insert(kind, rows);
        self.mark_dirty();
    }
}
