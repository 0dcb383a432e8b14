use serde::Serialize;

use crate::{ConfigDraft, EntityKind};

/// Outbound work requested by [`crate::update`]; executed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Hydrate { kind: EntityKind },
    PostStage { kind: EntityKind, body: String },
    TriggerMigration,
    TriggerListing(ListingOptions),
    UpdateConfig(ConfigDraft),
}

/// Long-running actions that run with a log tail beside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Stage(EntityKind),
    Migrate,
    List,
}

/// Body of the listing trigger. Every flag defaults to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ListingOptions {
    pub partial: bool,
    pub skip_users: bool,
    pub skip_groups: bool,
    pub skip_group_members: bool,
    pub skip_projects: bool,
    pub skip_project_members: bool,
    pub skip_ci: bool,
}
