use engine_logging::{migrator_info, migrator_warn};
use migrator_core::EntityKind;

use crate::{ApiError, MigrationApi};

/// Loads the identifiers staged on the backend for one kind.
///
/// Each kind is its own `Effect::Hydrate`, so a failing kind never holds up the others.
pub(crate) async fn fetch_kind(
    api: &dyn MigrationApi,
    kind: EntityKind,
) -> Result<Vec<String>, ApiError> {
    let result = api.fetch_staged(kind).await;
    match &result {
        Ok(ids) => migrator_info!("staged {} on backend: {}", kind.plural(), ids.len()),
        Err(err) => migrator_warn!("could not load staged {}: {}", kind.plural(), err),
    }
    result
}
