use chrono::{DateTime, Utc};

use crate::{
    ActionKind, ActivityFilterCriteria, ConfigDraft, DirectTransferRequest, EntityKind, EntityRow,
    ListingOptions,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Session opened; staged sets must be hydrated from the backend.
    SessionStarted,
    /// Hydration query for one kind returned these identifiers.
    Hydrated { kind: EntityKind, ids: Vec<String> },
    /// Hydration query for one kind failed; other kinds are unaffected.
    HydrationFailed { kind: EntityKind, error: String },
    /// Operator ticked or unticked one row.
    SelectionToggled {
        kind: EntityKind,
        id: String,
        checked: bool,
    },
    /// Header "select all" checkbox ticked over the rendered rows.
    SelectAll { kind: EntityKind, ids: Vec<String> },
    /// Header "select all" checkbox cleared.
    ClearAll { kind: EntityKind },
    StageClicked(EntityKind),
    MigrateClicked,
    ListClicked(ListingOptions),
    /// A log snapshot arrived from the tailer.
    LogUpdated(String),
    /// A long-running action resolved; `Err` carries the error text verbatim.
    ActionFinished {
        action: ActionKind,
        outcome: Result<String, String>,
    },
    ConfigSubmitted(ConfigDraft),
    ConfigUpdated(Result<String, String>),
    ActivityFilterApplied {
        kind: EntityKind,
        criteria: ActivityFilterCriteria,
        rows: Vec<EntityRow>,
        now: DateTime<Utc>,
    },
    DirectTransferGenerated(DirectTransferRequest),
    DirectTransferModified(DirectTransferRequest),
    /// UI/render tick to coalesce rendering.
    Tick,
    NoOp,
}
