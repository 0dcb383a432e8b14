//! Migrator engine: backend client, polling, log tailing and effect execution.
mod api;
mod engine;
mod hydrate;
mod poll;
mod settings;
mod tail;
mod types;
mod watch;

pub use api::{identifier_field, stage_path, staged_path, MigrationApi, ReqwestApi};
pub use engine::EngineHandle;
pub use poll::poll;
pub use settings::{ClientSettings, GroupKeyField};
pub use tail::{tail_while, DisplaySurface};
pub use types::{ApiError, EngineEvent};
pub use watch::watch_jobs;
