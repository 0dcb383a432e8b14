use std::collections::BTreeSet;

use chrono::{DateTime, Days, Months, Utc};
use engine_logging::migrator_trace;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityUnit {
    Days,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityDirection {
    OlderThan,
    NewerThan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilterCriteria {
    pub amount: u32,
    pub unit: ActivityUnit,
    pub direction: ActivityDirection,
}

/// A rendered entity row. Only `displayed_activity` is rewritten by the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRow {
    pub row_id: String,
    pub last_activity_at: DateTime<Utc>,
    #[serde(default)]
    pub namespace_label: String,
    #[serde(default)]
    pub displayed_activity: String,
}

impl EntityRow {
    pub fn new(
        row_id: impl Into<String>,
        last_activity_at: DateTime<Utc>,
        namespace_label: impl Into<String>,
    ) -> Self {
        Self {
            row_id: row_id.into(),
            displayed_activity: last_activity_at.to_rfc3339(),
            last_activity_at,
            namespace_label: namespace_label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityFilterOutcome {
    pub selected: BTreeSet<String>,
    pub rows: Vec<EntityRow>,
}

/// Cutoff instant: `now` shifted back by the criteria using calendar arithmetic.
///
/// Month shifts clamp to the last valid day, so March 31 minus one month is the
/// last day of February. A shift past the representable range saturates.
pub fn cutoff_for(criteria: &ActivityFilterCriteria, now: DateTime<Utc>) -> DateTime<Utc> {
    let shifted = match criteria.unit {
        ActivityUnit::Days => now.checked_sub_days(Days::new(u64::from(criteria.amount))),
        ActivityUnit::Months => now.checked_sub_months(Months::new(criteria.amount)),
    };
    shifted.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Fixed-offset display form, e.g. `Tue, 01 Mar 2022 08:00:00 GMT`.
pub fn format_activity(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Type token of a namespace label such as `acme (group)`.
pub fn namespace_type(label: &str) -> Option<&str> {
    let (_, rest) = label.split_once('(')?;
    let token = rest.split(')').next().unwrap_or(rest).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Selects rows by activity recency relative to `now`. Both bounds are inclusive.
///
/// Every row gets its displayed timestamp normalized, selected or not.
pub fn apply_activity_filter_at(
    criteria: &ActivityFilterCriteria,
    rows: Vec<EntityRow>,
    now: DateTime<Utc>,
) -> ActivityFilterOutcome {
    let cutoff = cutoff_for(criteria, now);
    let mut outcome = ActivityFilterOutcome {
        selected: BTreeSet::new(),
        rows: Vec::with_capacity(rows.len()),
    };

    for mut row in rows {
        let matches = match criteria.direction {
            ActivityDirection::NewerThan => row.last_activity_at >= cutoff,
            ActivityDirection::OlderThan => row.last_activity_at <= cutoff,
        };
        // The namespace type is read but does not gate selection.
        let namespace = namespace_type(&row.namespace_label);
        migrator_trace!(
            "activity filter row={} namespace={:?} matches={}",
            row.row_id,
            namespace,
            matches
        );
        if matches {
            outcome.selected.insert(row.row_id.clone());
        }
        row.displayed_activity = format_activity(row.last_activity_at);
        outcome.rows.push(row);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn criteria(
        amount: u32,
        unit: ActivityUnit,
        direction: ActivityDirection,
    ) -> ActivityFilterCriteria {
        ActivityFilterCriteria {
            amount,
            unit,
            direction,
        }
    }

    #[test]
    fn month_shift_clamps_to_end_of_february() {
        let c = criteria(1, ActivityUnit::Months, ActivityDirection::OlderThan);
        assert_eq!(cutoff_for(&c, at(2023, 3, 31)), at(2023, 2, 28));
        assert_eq!(cutoff_for(&c, at(2024, 3, 31)), at(2024, 2, 29));
    }

    #[test]
    fn day_shift_crosses_month_boundary() {
        let c = criteria(3, ActivityUnit::Days, ActivityDirection::NewerThan);
        assert_eq!(cutoff_for(&c, at(2024, 3, 2)), at(2024, 2, 28));
    }

    #[test]
    fn cutoff_row_is_selected_in_both_directions() {
        let now = at(2024, 5, 10);
        let c = criteria(10, ActivityUnit::Days, ActivityDirection::OlderThan);
        let cutoff = cutoff_for(&c, now);
        let rows = vec![EntityRow::new("edge", cutoff, "acme (group)")];

        let older = apply_activity_filter_at(&c, rows.clone(), now);
        assert!(older.selected.contains("edge"));

        let newer = apply_activity_filter_at(
            &criteria(10, ActivityUnit::Days, ActivityDirection::NewerThan),
            rows,
            now,
        );
        assert!(newer.selected.contains("edge"));
    }

    #[test]
    fn every_row_is_normalized_even_when_unselected() {
        let now = at(2024, 5, 10);
        let rows = vec![
            EntityRow::new("old", at(2020, 1, 1), "alice (user)"),
            EntityRow::new("new", at(2024, 5, 9), "acme (group)"),
        ];
        let outcome = apply_activity_filter_at(
            &criteria(1, ActivityUnit::Months, ActivityDirection::NewerThan),
            rows,
            now,
        );

        assert_eq!(outcome.selected.len(), 1);
        assert!(outcome.selected.contains("new"));
        assert_eq!(outcome.rows[0].displayed_activity, "Wed, 01 Jan 2020 12:00:00 GMT");
        assert_eq!(outcome.rows[1].displayed_activity, "Thu, 09 May 2024 12:00:00 GMT");
        assert_eq!(outcome.rows[0].row_id, "old");
    }

    #[test]
    fn namespace_type_extracts_parenthesised_token() {
        assert_eq!(namespace_type("acme (group)"), Some("group"));
        assert_eq!(namespace_type("alice(user)"), Some("user"));
        assert_eq!(namespace_type("no token"), None);
        assert_eq!(namespace_type("empty ()"), None);
    }
}
