//! Migrator core: pure staging state machine, job classification and activity filtering.
mod activity;
mod classify;
mod effect;
mod entity;
mod msg;
mod state;
mod store;
mod update;
mod view_model;

pub use activity::{
    apply_activity_filter_at, cutoff_for, format_activity, namespace_type,
    ActivityDirection, ActivityFilterCriteria, ActivityFilterOutcome, ActivityUnit, EntityRow,
};
pub use classify::{
    classify, JobCatalog, JobCatalogEntry, JobCatalogs, JobCategory, JobPhase, StatusPayload,
    DEFAULT_LISTING_JOBS, DEFAULT_MIGRATION_JOBS,
};
pub use effect::{ActionKind, Effect, ListingOptions};
pub use entity::{EntityKind, ParseEntityKindError};
pub use msg::Msg;
pub use state::AppState;
pub use store::{ConfigDraft, DirectTransferRequest, StagingStore};
pub use update::update;
pub use view_model::{ActionStatus, StagingView};
