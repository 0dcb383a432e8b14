use migrator_core::{update, AppState, EntityKind, Msg};

fn hydrated(state: AppState, kind: EntityKind, ids: &[&str]) -> AppState {
    let (state, effects) = update(
        state,
        Msg::Hydrated {
            kind,
            ids: ids.iter().map(|id| id.to_string()).collect(),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn hydration_order_between_kinds_does_not_matter() {
    let a = hydrated(AppState::new(), EntityKind::Project, &["1", "2"]);
    let a = hydrated(a, EntityKind::User, &["root"]);
    let a = hydrated(a, EntityKind::Group, &["acme"]);

    let b = hydrated(AppState::new(), EntityKind::Group, &["acme"]);
    let b = hydrated(b, EntityKind::Project, &["1", "2"]);
    let b = hydrated(b, EntityKind::User, &["root"]);

    assert_eq!(a.view().projects, b.view().projects);
    assert_eq!(a.view().groups, b.view().groups);
    assert_eq!(a.view().users, b.view().users);
}

#[test]
fn one_failed_kind_leaves_others_intact() {
    let state = hydrated(AppState::new(), EntityKind::Project, &["7"]);
    let (state, _) = update(
        state,
        Msg::HydrationFailed {
            kind: EntityKind::Group,
            error: "missing field `id` in staged groups row 0".to_string(),
        },
    );
    let state = hydrated(state, EntityKind::User, &["alice"]);

    let view = state.view();
    assert_eq!(view.projects, vec!["7".to_string()]);
    assert_eq!(view.users, vec!["alice".to_string()]);
    assert!(view.groups.is_empty());
    assert!(view.hydration_errors.contains_key(&EntityKind::Group));
    assert_eq!(view.hydration_errors.len(), 1);
}

#[test]
fn hydration_merges_with_local_selection() {
    let (state, _) = update(
        AppState::new(),
        Msg::SelectionToggled {
            kind: EntityKind::Project,
            id: "3".to_string(),
            checked: true,
        },
    );
    let mut state = hydrated(state, EntityKind::Project, &["3", "4"]);

    assert_eq!(state.view().projects, vec!["3".to_string(), "4".to_string()]);
    assert!(state.consume_dirty());
}
