use super::*;
use pretty_assertions::assert_eq;

#[test]
fn tag_filter_hides_without_discarding() {
    let mut state = loaded(alpha_beta());
    let effects = run_user(&mut state, UserAction::ToggleTag("go".to_string()));

    assert_eq!(
        effects,
        vec![FolioEffect::RequestLayout, FolioEffect::RequestFrame]
    );
    assert_eq!(visible_titles(&state), vec!["Alpha"]);
    assert_eq!(state.view.hidden, vec!["beta".to_string()]);
    assert_eq!(state.tiles.len(), 2);
    assert_view_partitions_store(&state);
}

#[test]
fn toggling_twice_restores_full_set() {
    let mut state = loaded(alpha_beta());
    run_user(&mut state, UserAction::ToggleTag("Go".to_string()));
    run_user(&mut state, UserAction::ToggleTag("go".to_string()));

    assert_eq!(visible_titles(&state), vec!["Beta", "Alpha"]);
    assert!(state.view.hidden.is_empty());
}

#[test]
fn unknown_tag_is_inert() {
    let mut state = loaded(alpha_beta());
    let effects = run_user(&mut state, UserAction::ToggleTag("cobol".to_string()));

    assert!(effects.is_empty());
    assert!(!state.filters.is_tag_active("cobol"));
    assert_eq!(visible_titles(&state), vec!["Beta", "Alpha"]);
    assert_view_partitions_store(&state);
}

#[test]
fn tag_toggle_ignores_case_and_whitespace() {
    let mut state = loaded(alpha_beta());
    run_user(&mut state, UserAction::ToggleTag(" GO ".to_string()));

    assert!(state.filters.is_tag_active("go"));
    assert_eq!(visible_titles(&state), vec!["Alpha"]);
}

#[test]
fn blank_tag_is_ignored() {
    let mut state = loaded(alpha_beta());
    let effects = run_user(&mut state, UserAction::ToggleTag("  ".to_string()));

    assert!(effects.is_empty());
    assert!(state.filters.tags.is_empty());
}

#[test]
fn tag_and_search_filters_commute() {
    let mut tiles = alpha_beta();
    tiles.push(tile("algol", "Algol", 1, &["go"]));

    let mut tag_first = loaded(tiles.clone());
    run_user(&mut tag_first, UserAction::ToggleTag("go".to_string()));
    run_runtime(&mut tag_first, RuntimeAction::CommitSearch("alp".to_string()));

    let mut search_first = loaded(tiles);
    run_runtime(&mut search_first, RuntimeAction::CommitSearch("alp".to_string()));
    run_user(&mut search_first, UserAction::ToggleTag("go".to_string()));

    assert_eq!(visible_titles(&tag_first), vec!["Alpha"]);
    assert_eq!(visible_titles(&tag_first), visible_titles(&search_first));
}

#[test]
fn clear_filters_resets_tags_and_search() {
    let mut state = loaded(alpha_beta());
    run_user(&mut state, UserAction::ToggleTag("go".to_string()));
    run_user(&mut state, UserAction::SearchInput("alp".to_string()));
    run_runtime(&mut state, RuntimeAction::CommitSearch("alp".to_string()));

    run_user(&mut state, UserAction::ClearFilters);

    assert!(!state.filters.is_active());
    assert_eq!(state.search_draft, "");
    assert_eq!(visible_titles(&state), vec!["Beta", "Alpha"]);
}

#[test]
fn clear_tags_without_active_tags_is_a_no_op() {
    let mut state = loaded(alpha_beta());
    assert!(run_user(&mut state, UserAction::ClearTags).is_empty());
}
