use engine_logging::{migrator_debug, migrator_info, migrator_warn};

use crate::{apply_activity_filter_at, ActionKind, AppState, Effect, EntityKind, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted => EntityKind::ALL
            .into_iter()
            .map(|kind| Effect::Hydrate { kind })
            .collect(),
        Msg::Hydrated { kind, ids } => {
            let mut added = 0usize;
            for id in &ids {
                if state.store_mut().stage(kind, id) {
                    added += 1;
                }
            }
            migrator_info!(
                "hydrated {}: {} returned, {} newly staged",
                kind.plural(),
                ids.len(),
                added
            );
            if added > 0 {
                state.mark_dirty();
            }
            state.set_hydration_error(kind, None);
            Vec::new()
        }
        Msg::HydrationFailed { kind, error } => {
            migrator_warn!("hydration of {} failed: {}", kind.plural(), error);
            state.set_hydration_error(kind, Some(error));
            Vec::new()
        }
        Msg::SelectionToggled { kind, id, checked } => {
            let changed = if checked {
                state.store_mut().stage(kind, &id)
            } else {
                state.store_mut().unstage(kind, &id)
            };
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SelectAll { kind, ids } => {
            let mut changed = false;
            for id in &ids {
                changed |= state.store_mut().stage(kind, id);
            }
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ClearAll { kind } => {
            let staged = state.store().staged(kind).to_vec();
            for id in &staged {
                state.store_mut().unstage(kind, id);
            }
            if !staged.is_empty() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StageClicked(kind) => {
            let body = state.store().request_body(kind);
            migrator_debug!("stage {} body_len={}", kind.plural(), body.len());
            state.begin_action(ActionKind::Stage(kind));
            vec![Effect::PostStage { kind, body }]
        }
        Msg::MigrateClicked => {
            if state.store().migration_in_progress() {
                migrator_debug!("migrate ignored: migration already in progress");
                Vec::new()
            } else {
                state.store_mut().set_migration_in_progress(true);
                state.begin_action(ActionKind::Migrate);
                vec![Effect::TriggerMigration]
            }
        }
        Msg::ListClicked(options) => {
            if state.store().listing_in_progress() {
                migrator_debug!("list ignored: listing already in progress");
                Vec::new()
            } else {
                state.store_mut().set_listing_in_progress(true);
                state.begin_action(ActionKind::List);
                vec![Effect::TriggerListing(options)]
            }
        }
        Msg::LogUpdated(text) => {
            // Snapshots arriving after every action finished are stale.
            if state.any_running() {
                state.set_log_display(text);
            }
            Vec::new()
        }
        Msg::ActionFinished { action, outcome } => {
            if !state.is_running(action) {
                migrator_warn!("finish for {:?} which was not running", action);
            }
            state.end_action(action);
            match action {
                ActionKind::Migrate => state.store_mut().set_migration_in_progress(false),
                ActionKind::List => state.store_mut().set_listing_in_progress(false),
                ActionKind::Stage(_) => {}
            }
            let text = match outcome {
                Ok(text) | Err(text) => text,
            };
            state.set_log_display(text);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ConfigSubmitted(draft) => {
            state.store_mut().set_settings(draft.clone());
            state.mark_dirty();
            vec![Effect::UpdateConfig(draft)]
        }
        Msg::ConfigUpdated(result) => {
            let status = match result {
                Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
                Ok(_) => "Config updated".to_string(),
                Err(message) => message,
            };
            state.set_log_display(status.clone());
            state.set_config_status(status);
            Vec::new()
        }
        Msg::ActivityFilterApplied {
            kind,
            criteria,
            rows,
            now,
        } => {
            let outcome = apply_activity_filter_at(&criteria, rows, now);
            for id in &outcome.selected {
                state.store_mut().stage(kind, id);
            }
            migrator_info!(
                "activity filter on {} selected {} of {} rows",
                kind.plural(),
                outcome.selected.len(),
                outcome.rows.len()
            );
            state.set_filtered_rows(kind, outcome.rows);
            Vec::new()
        }
        Msg::DirectTransferGenerated(request) => {
            state
                .store_mut()
                .set_direct_transfer_generated_request(request);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DirectTransferModified(request) => {
            state.store_mut().set_direct_transfer_modified_request(request);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
