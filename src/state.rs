use std::collections::VecDeque;

use crate::risk::RiskAssessment;
use crate::roster::{PlayerRecord, Position, Roster};
use crate::trend::TrendPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    AddPlayer,
    Compare,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardField {
    SevereInjuries,
    TotalInjuries,
    Age,
    MatchLoad,
    Games,
    Minutes,
    Shots,
    Position,
}

impl DashboardField {
    pub const ALL: [DashboardField; 8] = [
        DashboardField::SevereInjuries,
        DashboardField::TotalInjuries,
        DashboardField::Age,
        DashboardField::MatchLoad,
        DashboardField::Games,
        DashboardField::Minutes,
        DashboardField::Shots,
        DashboardField::Position,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DashboardField::SevereInjuries => "Severe Injuries",
            DashboardField::TotalInjuries => "Total Injuries",
            DashboardField::Age => "Age",
            DashboardField::MatchLoad => "Minutes per 90s",
            DashboardField::Games => "Games Played",
            DashboardField::Minutes => "Minutes Played",
            DashboardField::Shots => "Shots Taken",
            DashboardField::Position => "Position",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub const FORM_FIELDS: usize = 9;

/// Add-player form working copy. Field 0 is the name; the rest mirror the
/// record attributes with the wider entry bounds of the form (the
/// dashboard sliders use tighter ranges).
#[derive(Debug, Clone)]
pub struct AddPlayerForm {
    pub name: String,
    pub record: PlayerRecord,
    pub field: usize,
}

impl Default for AddPlayerForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AddPlayerForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            record: PlayerRecord::default(),
            field: 0,
        }
    }

    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % FORM_FIELDS;
    }

    pub fn prev_field(&mut self) {
        self.field = (self.field + FORM_FIELDS - 1) % FORM_FIELDS;
    }

    pub fn push_char(&mut self, c: char) {
        if self.field == 0 && self.name.len() < 40 {
            self.name.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.field == 0 {
            self.name.pop();
        }
    }

    pub fn adjust(&mut self, dir: i32) {
        let r = &mut self.record;
        match self.field {
            1 => r.age = step_u32(r.age, dir, 16, 45, 1),
            2 => r.games = step_u32(r.games, dir, 0, 50, 1),
            3 => r.minutes = step_f64(r.minutes, dir, 0.0, 4500.0, 10.0),
            4 => r.minutes_90s = step_f64(r.minutes_90s, dir, 0.0, 50.0, 0.5),
            5 => r.shots = step_u32(r.shots, dir, 0, 100, 1),
            6 => r.n_injuries = step_u32(r.n_injuries, dir, 0, 20, 1),
            7 => r.n_severe_injuries = step_u32(r.n_severe_injuries, dir, 0, 10, 1),
            8 => r.position = cycle_position(r.position, dir),
            _ => {}
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub theme: Theme,
    pub focus: DashboardField,
    pub roster: Roster,
    pub selected: usize,
    pub draft_name: String,
    pub draft: PlayerRecord,
    pub assessment: Option<RiskAssessment>,
    pub form: AddPlayerForm,
    pub compare_with: usize,
    pub trend: Vec<TrendPoint>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub model_fingerprint: String,
}

impl AppState {
    pub fn new(model_fingerprint: String) -> Self {
        let mut state = Self {
            screen: Screen::Dashboard,
            theme: Theme::Dark,
            focus: DashboardField::SevereInjuries,
            roster: Roster::preset(),
            selected: 0,
            draft_name: String::new(),
            draft: PlayerRecord::default(),
            assessment: None,
            form: AddPlayerForm::new(),
            compare_with: 0,
            trend: Vec::new(),
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            model_fingerprint,
        };
        state.load_selected();
        state
    }

    /// Copy the selected roster entry into the slider working copy.
    pub fn load_selected(&mut self) {
        self.clamp_selection();
        if let Some(entry) = self.roster.get_at(self.selected) {
            self.draft_name = entry.name.clone();
            self.draft = entry.record.clone();
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.roster.len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
        if total > 0 && self.compare_with >= total {
            self.compare_with = total - 1;
        }
    }

    pub fn select_next(&mut self) {
        let total = self.roster.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
        self.load_selected();
    }

    pub fn select_prev(&mut self) {
        let total = self.roster.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 {
            total - 1
        } else {
            self.selected - 1
        };
        self.load_selected();
    }

    pub fn select_compare_next(&mut self) {
        let total = self.roster.len();
        if total == 0 {
            self.compare_with = 0;
            return;
        }
        self.compare_with = (self.compare_with + 1) % total;
    }

    pub fn select_compare_prev(&mut self) {
        let total = self.roster.len();
        if total == 0 {
            self.compare_with = 0;
            return;
        }
        self.compare_with = if self.compare_with == 0 {
            total - 1
        } else {
            self.compare_with - 1
        };
    }

    pub fn cycle_focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn cycle_focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
    }

    /// Nudge the focused dashboard slider. Returns true when the draft
    /// changed (the caller recomputes the assessment).
    pub fn adjust_focused(&mut self, dir: i32) -> bool {
        let before = self.draft.clone();
        let r = &mut self.draft;
        match self.focus {
            DashboardField::SevereInjuries => {
                r.n_severe_injuries = step_u32(r.n_severe_injuries, dir, 0, 5, 1)
            }
            DashboardField::TotalInjuries => r.n_injuries = step_u32(r.n_injuries, dir, 0, 10, 1),
            DashboardField::Age => r.age = step_u32(r.age, dir, 18, 40, 1),
            DashboardField::MatchLoad => {
                r.minutes_90s = step_f64(r.minutes_90s, dir, 0.0, 45.0, 0.5)
            }
            DashboardField::Games => r.games = step_u32(r.games, dir, 0, 40, 1),
            DashboardField::Minutes => r.minutes = step_f64(r.minutes, dir, 0.0, 4000.0, 10.0),
            DashboardField::Shots => r.shots = step_u32(r.shots, dir, 0, 50, 1),
            DashboardField::Position => r.position = cycle_position(r.position, dir),
        }
        self.draft != before
    }

    /// Commit the add-player form to the roster and select the new entry.
    /// Returns false (and logs) when the name is empty.
    pub fn submit_form(&mut self) -> bool {
        let name = self.form.name.trim().to_string();
        if name.is_empty() {
            self.push_log("[WARN] Player name is required");
            return false;
        }

        let created = self.roster.upsert(name.clone(), self.form.record.clone());
        self.selected = self.roster.index_of(&name).unwrap_or(0);
        self.load_selected();
        self.push_log(format!(
            "[INFO] {} player: {name}",
            if created { "Added" } else { "Updated" }
        ));
        self.form = AddPlayerForm::new();
        self.screen = Screen::Dashboard;
        true
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

fn step_u32(value: u32, dir: i32, min: u32, max: u32, step: u32) -> u32 {
    let next = if dir >= 0 {
        value.saturating_add(step)
    } else {
        value.saturating_sub(step)
    };
    next.clamp(min, max)
}

fn step_f64(value: f64, dir: i32, min: f64, max: f64, step: f64) -> f64 {
    let next = if dir >= 0 { value + step } else { value - step };
    next.clamp(min, max)
}

fn cycle_position(current: Option<Position>, dir: i32) -> Option<Position> {
    const ORDER: [Option<Position>; 5] = [
        None,
        Some(Position::Goalkeeper),
        Some(Position::Defender),
        Some(Position::Midfielder),
        Some(Position::Forward),
    ];
    let idx = ORDER.iter().position(|p| *p == current).unwrap_or(0);
    let next = if dir >= 0 {
        (idx + 1) % ORDER.len()
    } else {
        (idx + ORDER.len() - 1) % ORDER.len()
    };
    ORDER[next]
}

pub fn position_label(position: Option<Position>) -> &'static str {
    position.map(|p| p.label()).unwrap_or("Unknown")
}
