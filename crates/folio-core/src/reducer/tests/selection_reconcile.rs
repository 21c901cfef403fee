use super::*;
use pretty_assertions::assert_eq;

#[test]
fn selection_moves_to_first_visible_when_hidden() {
    let mut state = loaded(alpha_beta());
    assert_eq!(state.selection.as_deref(), Some("beta"));

    run_user(&mut state, UserAction::ToggleTag("go".to_string()));

    assert_eq!(state.selection.as_deref(), Some("alpha"));
}

#[test]
fn selection_survives_when_still_visible() {
    let mut state = loaded(alpha_beta());
    run_user(&mut state, UserAction::SelectNext);
    assert_eq!(state.selection.as_deref(), Some("alpha"));

    run_user(&mut state, UserAction::ToggleTag("go".to_string()));

    assert_eq!(state.selection.as_deref(), Some("alpha"));
}

#[test]
fn selection_clamps_at_both_ends() {
    let mut state = loaded(alpha_beta());
    assert!(run_user(&mut state, UserAction::SelectPrev).is_empty());
    assert_eq!(state.selection.as_deref(), Some("beta"));

    run_user(&mut state, UserAction::SelectNext);
    let effects = run_user(&mut state, UserAction::SelectNext);
    assert!(effects.is_empty());
    assert_eq!(state.selection.as_deref(), Some("alpha"));
}

#[test]
fn selection_clears_when_nothing_is_visible() {
    let mut state = loaded(alpha_beta());
    run_runtime(&mut state, RuntimeAction::CommitSearch("zzz".to_string()));
    assert_eq!(state.selection, None);
    assert!(run_user(&mut state, UserAction::SelectNext).is_empty());
}

#[test]
fn copy_uses_url_then_homepage() {
    let mut with_url = tile("site", "Site", 3, &[]);
    with_url.url = Some("https://example.com".to_string());
    let mut with_homepage = tile("docs", "Docs", 2, &[]);
    with_homepage.homepage = Some("https://docs.example.com".to_string());
    let bare = tile("bare", "Bare", 1, &[]);
    let mut state = loaded(vec![with_url, with_homepage, bare]);

    assert_eq!(
        run_user(&mut state, UserAction::CopySelectedUrl),
        vec![FolioEffect::CopyToClipboard("https://example.com".to_string())]
    );
    run_user(&mut state, UserAction::SelectNext);
    assert_eq!(
        run_user(&mut state, UserAction::CopySelectedUrl),
        vec![FolioEffect::CopyToClipboard(
            "https://docs.example.com".to_string()
        )]
    );
    run_user(&mut state, UserAction::SelectNext);
    assert_eq!(
        run_user(&mut state, UserAction::CopySelectedUrl),
        vec![FolioEffect::RequestFrame]
    );
}

#[test]
fn theme_changes_request_persistence() {
    let mut state = state();
    assert_eq!(
        run_user(&mut state, UserAction::CycleTheme),
        vec![
            FolioEffect::PersistTheme(ThemeMode::Light),
            FolioEffect::RequestFrame
        ]
    );
    run_user(&mut state, UserAction::SetTheme(ThemeMode::Dark));
    assert_eq!(state.theme, ThemeMode::Dark);
}
