use std::collections::BTreeMap;

use crate::{ActionKind, EntityKind, EntityRow};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StagingView {
    pub projects: Vec<String>,
    pub groups: Vec<String>,
    pub users: Vec<String>,
    pub listing_in_progress: bool,
    pub migration_in_progress: bool,
    pub running: Vec<ActionKind>,
    pub log_display: String,
    pub config_status: Option<String>,
    pub settings: BTreeMap<String, String>,
    pub hydration_errors: BTreeMap<EntityKind, String>,
    pub filtered_rows: BTreeMap<EntityKind, Vec<EntityRow>>,
    pub has_generated_request: bool,
    pub has_modified_request: bool,
    pub dirty: bool,
}

impl StagingView {
    pub fn staged(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Project => &self.projects,
            EntityKind::Group => &self.groups,
            EntityKind::User => &self.users,
        }
    }

    pub fn status(&self) -> ActionStatus {
        if self.running.is_empty() {
            ActionStatus::Idle
        } else {
            ActionStatus::Busy(self.running.len())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Idle,
    Busy(usize),
}
