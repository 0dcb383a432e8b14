use migrator_core::{ActionStatus, EntityKind, EntityRow, StagingView};

const PREVIEW_IDS: usize = 12;

/// Text lines describing the staged sets, flags and any hydration errors.
pub fn render_summary(view: &StagingView) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in EntityKind::ALL {
        let ids = view.staged(kind);
        let mut line = format!("{:<9} {:>4} staged", kind.plural(), ids.len());
        if !ids.is_empty() {
            let shown: Vec<&str> = ids.iter().take(PREVIEW_IDS).map(String::as_str).collect();
            line.push_str(": ");
            line.push_str(&shown.join(", "));
            if ids.len() > PREVIEW_IDS {
                line.push_str(&format!(" (+{} more)", ids.len() - PREVIEW_IDS));
            }
        }
        if let Some(error) = view.hydration_errors.get(&kind) {
            line.push_str(&format!(" [not loaded: {error}]"));
        }
        lines.push(line);
    }

    let status = match view.status() {
        ActionStatus::Idle => "idle".to_string(),
        ActionStatus::Busy(count) => format!("{count} action(s) running"),
    };
    lines.push(format!(
        "listing: {} | migration: {} | {}",
        flag(view.listing_in_progress),
        flag(view.migration_in_progress),
        status
    ));
    if let Some(config_status) = &view.config_status {
        lines.push(format!("config: {config_status}"));
    }
    lines
}

/// The log display, prefixed so it stands apart from summaries.
pub fn render_log(view: &StagingView) -> Option<String> {
    let text = view.log_display.trim();
    if text.is_empty() {
        None
    } else {
        Some(format!("> {text}"))
    }
}

/// One line per filtered row: selection mark, id and normalized activity.
pub fn render_rows(view: &StagingView, kind: EntityKind) -> Vec<String> {
    let staged = view.staged(kind);
    view.filtered_rows
        .get(&kind)
        .map(|rows| rows.iter().map(|row| render_row(row, staged)).collect())
        .unwrap_or_default()
}

fn render_row(row: &EntityRow, staged: &[String]) -> String {
    let mark = if staged.contains(&row.row_id) { "x" } else { " " };
    format!(
        "[{mark}] {:<24} {:<32} {}",
        row.row_id, row.displayed_activity, row.namespace_label
    )
}

fn flag(value: bool) -> &'static str {
    if value {
        "in progress"
    } else {
        "idle"
    }
}
