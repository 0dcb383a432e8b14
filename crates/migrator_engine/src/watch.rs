use std::time::Duration;

use engine_logging::migrator_debug;
use migrator_core::{JobCatalogs, JobPhase, StatusPayload};

use crate::{poll, ApiError, MigrationApi};

/// Polls job counts for `status` until no listing or migration job shows up.
///
/// `on_phase` sees the phase of every busy payload. Returns the first idle payload.
pub async fn watch_jobs<F>(
    api: &dyn MigrationApi,
    catalogs: &JobCatalogs,
    status: &str,
    interval: Duration,
    mut on_phase: F,
) -> Result<StatusPayload, ApiError>
where
    F: FnMut(&JobPhase),
{
    poll(
        || api.fetch_job_counts(status),
        |payload| match catalogs.phase_of(payload) {
            Some(phase) => {
                migrator_debug!("jobs busy: {:?}", phase);
                on_phase(&phase);
                true
            }
            None => false,
        },
        interval,
    )
    .await
}
