use physio_terminal::state::{AppState, DashboardField, Screen};

fn state() -> AppState {
    AppState::new("abc123".to_string())
}

#[test]
fn startup_selects_the_first_preset_player() {
    let state = state();
    assert_eq!(state.screen, Screen::Dashboard);
    assert_eq!(state.selected, 0);
    assert_eq!(state.draft_name, "Lionel Messi");
    assert_eq!(state.draft.n_injuries, 2);
}

#[test]
fn selection_wraps_both_ways_and_reloads_the_draft() {
    let mut state = state();
    let total = state.roster.len();

    state.select_prev();
    assert_eq!(state.selected, total - 1);
    assert_eq!(state.draft_name, "Pepe");

    state.select_next();
    assert_eq!(state.selected, 0);
    assert_eq!(state.draft_name, "Lionel Messi");
}

#[test]
fn adjusting_a_slider_changes_only_the_draft() {
    let mut state = state();
    state.focus = DashboardField::TotalInjuries;
    assert!(state.adjust_focused(1));
    assert_eq!(state.draft.n_injuries, 3);
    // The roster record is untouched until the form writes it back.
    assert_eq!(state.roster.get("Lionel Messi").unwrap().n_injuries, 2);
}

#[test]
fn sliders_saturate_and_report_no_change() {
    let mut state = state();
    state.focus = DashboardField::SevereInjuries;
    for _ in 0..10 {
        state.adjust_focused(1);
    }
    assert_eq!(state.draft.n_severe_injuries, 5);
    assert!(!state.adjust_focused(1));
}

#[test]
fn age_slider_respects_dashboard_bounds() {
    let mut state = state();
    state.focus = DashboardField::Age;
    for _ in 0..40 {
        state.adjust_focused(-1);
    }
    assert_eq!(state.draft.age, 18);
    for _ in 0..40 {
        state.adjust_focused(1);
    }
    assert_eq!(state.draft.age, 40);
}

#[test]
fn submit_form_requires_a_name() {
    let mut state = state();
    state.screen = Screen::AddPlayer;
    assert!(!state.submit_form());
    assert_eq!(state.screen, Screen::AddPlayer);
    assert!(state.logs.iter().any(|l| l.contains("[WARN]")));
}

#[test]
fn submit_form_adds_and_selects_the_player() {
    let mut state = state();
    state.screen = Screen::AddPlayer;
    for c in "N. Gray".chars() {
        state.form.push_char(c);
    }
    state.form.field = 6;
    state.form.adjust(1); // one prior injury

    assert!(state.submit_form());
    assert_eq!(state.screen, Screen::Dashboard);
    assert_eq!(state.roster.len(), 6);
    assert_eq!(state.draft_name, "N. Gray");
    assert_eq!(state.draft.n_injuries, 1);
}

#[test]
fn submit_form_updates_an_existing_player() {
    let mut state = state();
    for c in "Pepe".chars() {
        state.form.push_char(c);
    }
    state.form.field = 7;
    state.form.adjust(1);

    assert!(state.submit_form());
    assert_eq!(state.roster.len(), 5);
    assert_eq!(state.roster.get("Pepe").unwrap().n_severe_injuries, 1);
    assert!(state.logs.iter().any(|l| l.contains("Updated player")));
}

#[test]
fn log_ring_is_capped() {
    let mut state = state();
    for i in 0..300 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert!(state.logs.front().unwrap().contains("line 100"));
}

#[test]
fn compare_selection_is_independent_of_the_main_selection() {
    let mut state = state();
    state.select_compare_next();
    state.select_compare_next();
    assert_eq!(state.compare_with, 2);
    assert_eq!(state.selected, 0);

    state.select_compare_prev();
    assert_eq!(state.compare_with, 1);
}
