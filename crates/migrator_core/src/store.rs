use std::collections::BTreeMap;

use engine_logging::migrator_trace;
use serde::Serialize;

use crate::entity::EntityKind;

/// Configuration key/value pairs as currently shown to the operator.
///
/// Submitted wholesale; the backend receives a JSON object of key to string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigDraft(BTreeMap<String, String>);

impl ConfigDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a draft from rendered pairs. A repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// Opaque draft payload of the direct-transfer preview/edit workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DirectTransferRequest(pub serde_json::Value);

/// Insertion-ordered set of identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    fn remove(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|existing| existing == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }
}

/// Session-scoped staging state.
///
/// Created once at session start and dropped with the session; nothing here is
/// persisted. Every operation is synchronous and total. `stage` and `unstage`
/// report whether the set changed, so callers can skip redundant redraws.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StagingStore {
    projects: SelectionSet,
    groups: SelectionSet,
    users: SelectionSet,
    listing_in_progress: bool,
    migration_in_progress: bool,
    settings: ConfigDraft,
    direct_transfer_generated: Option<DirectTransferRequest>,
    direct_transfer_modified: Option<DirectTransferRequest>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, kind: EntityKind) -> &SelectionSet {
        match kind {
            EntityKind::Project => &self.projects,
            EntityKind::Group => &self.groups,
            EntityKind::User => &self.users,
        }
    }

    fn set_mut(&mut self, kind: EntityKind) -> &mut SelectionSet {
        match kind {
            EntityKind::Project => &mut self.projects,
            EntityKind::Group => &mut self.groups,
            EntityKind::User => &mut self.users,
        }
    }

    pub fn stage(&mut self, kind: EntityKind, id: &str) -> bool {
        let added = self.set_mut(kind).insert(id);
        migrator_trace!("stage kind={} id={} added={}", kind, id, added);
        added
    }

    pub fn unstage(&mut self, kind: EntityKind, id: &str) -> bool {
        let removed = self.set_mut(kind).remove(id);
        migrator_trace!("unstage kind={} id={} removed={}", kind, id, removed);
        removed
    }

    pub fn is_staged(&self, kind: EntityKind, id: &str) -> bool {
        self.set(kind).contains(id)
    }

    /// Staged identifiers of one kind in the order they were first staged.
    pub fn staged(&self, kind: EntityKind) -> &[String] {
        &self.set(kind).ids
    }

    /// Request body for the stage endpoints: ids joined by commas, empty when nothing is staged.
    pub fn request_body(&self, kind: EntityKind) -> String {
        self.staged(kind).join(",")
    }

    pub fn listing_in_progress(&self) -> bool {
        self.listing_in_progress
    }

    pub fn set_listing_in_progress(&mut self, in_progress: bool) {
        self.listing_in_progress = in_progress;
    }

    pub fn migration_in_progress(&self) -> bool {
        self.migration_in_progress
    }

    pub fn set_migration_in_progress(&mut self, in_progress: bool) {
        self.migration_in_progress = in_progress;
    }

    pub fn settings(&self) -> &ConfigDraft {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ConfigDraft) {
        self.settings = settings;
    }

    pub fn direct_transfer_generated_request(&self) -> Option<&DirectTransferRequest> {
        self.direct_transfer_generated.as_ref()
    }

    pub fn set_direct_transfer_generated_request(&mut self, request: DirectTransferRequest) {
        self.direct_transfer_generated = Some(request);
    }

    pub fn direct_transfer_modified_request(&self) -> Option<&DirectTransferRequest> {
        self.direct_transfer_modified.as_ref()
    }

    pub fn set_direct_transfer_modified_request(&mut self, request: DirectTransferRequest) {
        self.direct_transfer_modified = Some(request);
    }
}
