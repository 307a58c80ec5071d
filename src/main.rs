use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Sparkline};

use physio_terminal::artifacts::RiskModel;
use physio_terminal::export;
use physio_terminal::risk::{self, RiskLevel, Severity};
use physio_terminal::roster::PlayerRecord;
use physio_terminal::state::{
    AppState, DashboardField, Screen, Theme, position_label,
};
use physio_terminal::trend;

struct App {
    state: AppState,
    model: RiskModel,
    rng: StdRng,
    should_quit: bool,
}

impl App {
    fn new(model: RiskModel) -> Self {
        let mut state = AppState::new(model.fingerprint().to_string());
        state.push_log(format!(
            "[INFO] Model {} loaded ({})",
            model.fingerprint(),
            model.generated_at()
        ));
        let mut app = Self {
            state,
            model,
            rng: StdRng::from_entropy(),
            should_quit: false,
        };
        app.recompute();
        app
    }

    /// One full synchronous pass: builder, scaler, classifier, rules.
    fn recompute(&mut self) {
        match risk::assess(&self.model, &self.state.draft) {
            Ok(assessment) => self.state.assessment = Some(assessment),
            Err(err) => {
                self.state.assessment = None;
                self.state.push_log(format!("[WARN] Assessment failed: {err}"));
            }
        }
    }

    fn regenerate_trend(&mut self) {
        self.state.trend = trend::generate_fitness_trend(&self.state.draft, &mut self.rng);
    }

    fn export_report(&mut self) {
        let path = format!(
            "injury_report_{}.xlsx",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        match export::export_roster_report(Path::new(&path), &self.state.roster, &self.model) {
            Ok(report) => {
                self.state.push_log(format!(
                    "[INFO] Exported {} players ({} factors) to {}",
                    report.players,
                    report.factors,
                    report.path.display()
                ));
                for err in report.errors {
                    self.state.push_log(format!("[WARN] Export: {err}"));
                }
            }
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match self.state.screen {
            Screen::Dashboard => self.on_key_dashboard(key),
            Screen::AddPlayer => self.on_key_add_player(key),
            Screen::Compare => self.on_key_compare(key),
            Screen::History => self.on_key_history(key),
        }
    }

    fn on_key_dashboard(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.select_next();
                self.recompute();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.select_prev();
                self.recompute();
            }
            KeyCode::Tab => self.state.cycle_focus_next(),
            KeyCode::BackTab => self.state.cycle_focus_prev(),
            KeyCode::Left | KeyCode::Char('-') => {
                if self.state.adjust_focused(-1) {
                    self.recompute();
                }
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
                if self.state.adjust_focused(1) {
                    self.recompute();
                }
            }
            KeyCode::Char('r') => {
                self.state.load_selected();
                self.recompute();
                self.state.push_log("[INFO] Sliders reset to roster values");
            }
            KeyCode::Char('a') => self.state.screen = Screen::AddPlayer,
            KeyCode::Char('c') => {
                self.state.clamp_selection();
                self.state.screen = Screen::Compare;
            }
            KeyCode::Char('i') => {
                self.regenerate_trend();
                self.state.screen = Screen::History;
            }
            KeyCode::Char('e') => self.export_report(),
            KeyCode::Char('t') => self.state.toggle_theme(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_key_add_player(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.form = Default::default();
                self.state.screen = Screen::Dashboard;
            }
            KeyCode::Enter => {
                if self.state.submit_form() {
                    self.recompute();
                }
            }
            KeyCode::Tab | KeyCode::Down => self.state.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.state.form.prev_field(),
            KeyCode::Left => self.state.form.adjust(-1),
            KeyCode::Right => self.state.form.adjust(1),
            KeyCode::Backspace => self.state.form.backspace(),
            KeyCode::Char(c) => {
                if self.state.form.field == 0 {
                    self.state.form.push_char(c);
                } else {
                    match c {
                        '-' => self.state.form.adjust(-1),
                        '+' | '=' => self.state.form.adjust(1),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn on_key_compare(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Dashboard,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_compare_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_compare_prev(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_key_history(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Dashboard,
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.select_next();
                self.recompute();
                self.regenerate_trend();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.select_prev();
                self.recompute();
                self.regenerate_trend();
            }
            KeyCode::Char('g') => self.regenerate_trend(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    // Fatal without the artifact bundle: there is no fallback scoring path.
    let model = match RiskModel::load() {
        Ok(model) => model,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(model);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn accent(theme: Theme) -> Color {
    match theme {
        Theme::Light => Color::Green,
        Theme::Dark => Color::LightGreen,
    }
}

fn border_style(theme: Theme) -> Style {
    match theme {
        Theme::Light => Style::default().fg(Color::DarkGray),
        Theme::Dark => Style::default().fg(Color::Gray),
    }
}

fn level_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::Red,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Low => Color::Green,
        Severity::Medium => Color::Yellow,
        Severity::High => Color::Red,
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().fg(accent(app.state.theme)))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::AddPlayer => render_add_player(frame, chunks[1], &app.state),
        Screen::Compare => render_compare(frame, chunks[1], &app.state),
        Screen::History => render_history(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state)).block(Block::default());
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Dashboard => format!(
            "PHYSIO TERMINAL | {} | Model {}",
            state.draft_name, state.model_fingerprint
        ),
        Screen::AddPlayer => "PHYSIO TERMINAL | Add Player".to_string(),
        Screen::Compare => "PHYSIO TERMINAL | Compare".to_string(),
        Screen::History => format!("PHYSIO TERMINAL | History | {}", state.draft_name),
    };
    let line1 = format!("  .-.  {title}");
    let line2 = " (-+-)".to_string();
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Dashboard => {
            "j/k Player | Tab Field | ←/→ Adjust | r Reset | a Add | c Compare | i History | e Export | t Theme | ? Help | q Quit"
                .to_string()
        }
        Screen::AddPlayer => {
            "Tab/↑/↓ Field | ←/→ Adjust | type Name | Enter Save | Esc Cancel".to_string()
        }
        Screen::Compare => "j/k Other player | b/Esc Back | q Quit".to_string(),
        Screen::History => "j/k Player | g Regenerate | b/Esc Back | q Quit".to_string(),
    }
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(4)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(34),
            Constraint::Min(34),
            Constraint::Length(40),
        ])
        .split(rows[0]);

    render_slider_column(frame, columns[0], state);
    render_assessment_column(frame, columns[1], state);
    render_advisory_column(frame, columns[2], state);

    let console = Paragraph::new(console_text(state)).block(
        Block::default()
            .title("Console")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(console, rows[1]);
}

fn render_slider_column(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(3),
        ])
        .split(area);

    let squad = Paragraph::new(squad_text(state)).block(
        Block::default()
            .title("Squad")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(squad, chunks[0]);

    let primary = Paragraph::new(field_lines(
        state,
        &[
            DashboardField::SevereInjuries,
            DashboardField::TotalInjuries,
            DashboardField::Age,
            DashboardField::MatchLoad,
        ],
    ))
    .block(
        Block::default()
            .title("Primary Risk Factors")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(primary, chunks[1]);

    let performance = Paragraph::new(field_lines(
        state,
        &[
            DashboardField::Games,
            DashboardField::Minutes,
            DashboardField::Shots,
        ],
    ))
    .block(
        Block::default()
            .title("Performance")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(performance, chunks[2]);

    let position = Paragraph::new(field_lines(state, &[DashboardField::Position])).block(
        Block::default()
            .title("Position")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(position, chunks[3]);
}

fn squad_text(state: &AppState) -> String {
    let mut lines = Vec::new();
    for (idx, entry) in state.roster.entries().iter().enumerate() {
        let prefix = if idx == state.selected { "> " } else { "  " };
        lines.push(format!("{prefix}{}", entry.name));
    }
    if lines.is_empty() {
        lines.push("Roster is empty".to_string());
    }
    lines.join("\n")
}

fn field_lines(state: &AppState, fields: &[DashboardField]) -> Text<'static> {
    let mut lines = Vec::new();
    for field in fields {
        let marker = if state.focus == *field { "> " } else { "  " };
        let value = field_value_text(&state.draft, *field);
        let style = if state.focus == *field {
            Style::default()
                .fg(accent(state.theme))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(
            format!("{marker}{:<16} {value}", field.label()),
            style,
        ));
    }
    Text::from(lines)
}

fn field_value_text(record: &PlayerRecord, field: DashboardField) -> String {
    match field {
        DashboardField::SevereInjuries => record.n_severe_injuries.to_string(),
        DashboardField::TotalInjuries => record.n_injuries.to_string(),
        DashboardField::Age => record.age.to_string(),
        DashboardField::MatchLoad => format!("{:.1}", record.minutes_90s),
        DashboardField::Games => record.games.to_string(),
        DashboardField::Minutes => format!("{:.0}", record.minutes),
        DashboardField::Shots => record.shots.to_string(),
        DashboardField::Position => position_label(record.position).to_string(),
    }
}

fn render_assessment_column(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(4),
        ])
        .split(area);

    let Some(assessment) = &state.assessment else {
        let empty = Paragraph::new("No assessment available").block(
            Block::default()
                .title("Risk Assessment")
                .borders(Borders::ALL)
                .border_style(border_style(state.theme)),
        );
        frame.render_widget(empty, area);
        return;
    };

    let status = if assessment.is_injured {
        Line::styled(
            "HIGH RISK - flagged as likely injured",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        Line::styled(
            "LOW RISK - not flagged",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    };
    let status_widget = Paragraph::new(status).block(
        Block::default()
            .title("Risk Assessment")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(status_widget, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title("Injury Probability")
                .borders(Borders::ALL)
                .border_style(border_style(state.theme)),
        )
        .gauge_style(Style::default().fg(level_color(assessment.level)))
        .ratio(assessment.probability.clamp(0.0, 1.0))
        .label(format!("{:.1}%", assessment.probability * 100.0));
    frame.render_widget(gauge, chunks[1]);

    let confidence = confidence_label(assessment.probability);
    let breakdown = Paragraph::new(format!(
        "Probability: {:.3}\nRisk Score:  {:.1}\nRisk Level:  {}\nConfidence:  {confidence}",
        assessment.probability,
        assessment.injury_risk_score,
        assessment.level.label(),
    ))
    .style(Style::default().fg(level_color(assessment.level)))
    .block(
        Block::default()
            .title("Breakdown")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(breakdown, chunks[2]);

    let factors = if assessment.factors.is_empty() {
        Text::from("No significant risk factors identified")
    } else {
        Text::from(
            assessment
                .factors
                .iter()
                .map(|f| {
                    Line::styled(
                        format!("{:<6} {} ({} risk)", f.icon, f.description, f.severity.label()),
                        Style::default().fg(severity_color(f.severity)),
                    )
                })
                .collect::<Vec<_>>(),
        )
    };
    let factors_widget = Paragraph::new(factors).block(
        Block::default()
            .title("Risk Factors")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(factors_widget, chunks[3]);
}

fn confidence_label(probability: f64) -> &'static str {
    let margin = (probability - 0.5).abs();
    if margin > 0.3 {
        "High"
    } else if margin > 0.15 {
        "Medium"
    } else {
        "Low"
    }
}

fn render_advisory_column(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    let workload_text = match &state.assessment {
        Some(assessment) => {
            let w = &assessment.workload;
            format!(
                "Match Load:    {:>7.1} min/90  [{}]\nSeason Mins:   {:>7.0}         [{}]\nMatch Fitness: {:>7.1} min/gm  [{}]",
                w.match_load,
                if w.match_load_high() { "High" } else { "Normal" },
                w.season_load,
                if w.season_load_high() { "High" } else { "Normal" },
                w.match_fitness,
                if w.match_fitness_low() { "Low" } else { "Good" },
            )
        }
        None => "No workload data".to_string(),
    };
    let workload = Paragraph::new(workload_text).block(
        Block::default()
            .title("Workload Analysis")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(workload, chunks[0]);

    let recs_text = match &state.assessment {
        Some(assessment) if !assessment.recommendations.is_empty() => assessment
            .recommendations
            .iter()
            .map(|r| format!("{:<6} {}\n       -> {}", r.icon, r.headline, r.action))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(_) => "All workload and fitness parameters look optimal".to_string(),
        None => "No recommendations".to_string(),
    };
    let recs = Paragraph::new(recs_text).block(
        Block::default()
            .title("Fitness Management")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(recs, chunks[1]);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_add_player(frame: &mut Frame, area: Rect, state: &AppState) {
    let form = &state.form;
    let record = &form.record;
    let rows = [
        ("Player Name", form.name.clone()),
        ("Age", record.age.to_string()),
        ("Games Played", record.games.to_string()),
        ("Minutes Played", format!("{:.0}", record.minutes)),
        ("Minutes per 90s", format!("{:.1}", record.minutes_90s)),
        ("Shots Taken", record.shots.to_string()),
        ("Previous Injuries", record.n_injuries.to_string()),
        ("Severe Injuries", record.n_severe_injuries.to_string()),
        ("Position", position_label(record.position).to_string()),
    ];

    let mut lines = Vec::new();
    for (idx, (label, value)) in rows.iter().enumerate() {
        let marker = if form.field == idx { "> " } else { "  " };
        let style = if form.field == idx {
            Style::default()
                .fg(accent(state.theme))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if form.field == idx && idx == 0 { "_" } else { "" };
        lines.push(Line::styled(
            format!("{marker}{label:<18} {value}{cursor}"),
            style,
        ));
    }

    let popup = centered_rect(50, 60, area);
    let widget = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title("Add New Player")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(widget, popup);
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(left) = state.roster.get_at(state.selected) else {
        let empty = Paragraph::new("Roster is empty")
            .block(Block::default().title("Compare").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };
    let Some(right) = state.roster.get_at(state.compare_with) else {
        return;
    };

    // Normalization caps for the textual bars.
    const METRICS: [(&str, f64); 6] = [
        ("Games", 15.0),
        ("Minutes", 1350.0),
        ("Shots", 30.0),
        ("Injuries", 5.0),
        ("Severe", 3.0),
        ("Age", 35.0),
    ];

    let mut lines = vec![
        Line::styled(
            format!("{:<10} {:>24}  vs  {:<24}", "", left.name, right.name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
    ];

    for (label, cap) in METRICS {
        let a = metric_value(&left.record, label);
        let b = metric_value(&right.record, label);
        lines.push(Line::raw(format!(
            "{label:<10} {:>10.0} {} | {} {:<10.0}",
            a,
            meter(a, cap, true),
            meter(b, cap, false),
            b,
        )));
    }

    lines.push(Line::raw(""));
    lines.push(Line::raw(format!(
        "{:<10} {:>10} {:>14} {:<10}",
        "Position",
        position_label(left.record.position),
        "",
        position_label(right.record.position)
    )));

    let popup = centered_rect(80, 70, area);
    let widget = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title("Player Comparison")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(widget, popup);
}

fn metric_value(record: &PlayerRecord, label: &str) -> f64 {
    match label {
        "Games" => record.games as f64,
        "Minutes" => record.minutes,
        "Shots" => record.shots as f64,
        "Injuries" => record.n_injuries as f64,
        "Severe" => record.n_severe_injuries as f64,
        "Age" => record.age as f64,
        _ => 0.0,
    }
}

/// Ten-cell text meter; left-hand meters fill right-to-left so the pair
/// reads like a mirrored bar chart.
fn meter(value: f64, cap: f64, right_aligned: bool) -> String {
    let cells = 10usize;
    let filled = ((value / cap).clamp(0.0, 1.0) * cells as f64).round() as usize;
    let mut bar = String::new();
    if right_aligned {
        bar.push_str(&" ".repeat(cells - filled));
        bar.push_str(&"█".repeat(filled));
    } else {
        bar.push_str(&"█".repeat(filled));
        bar.push_str(&" ".repeat(cells - filled));
    }
    bar
}

fn render_history(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(area);

    let record = &state.draft;
    let injury_rate = (record.n_injuries as f64 / record.games.max(1) as f64) * 100.0;
    let summary = Paragraph::new(format!(
        "Total Injuries:  {}\nSevere Injuries: {}\nInjury Rate:     {injury_rate:.1}% of games",
        record.n_injuries, record.n_severe_injuries
    ))
    .block(
        Block::default()
            .title(format!("{} - Injury History", state.draft_name))
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(summary, chunks[0]);

    let cards = Paragraph::new(injury_cards_text(record)).block(
        Block::default()
            .title("Injury Details")
            .borders(Borders::ALL)
            .border_style(border_style(state.theme)),
    );
    frame.render_widget(cards, chunks[1]);

    let fitness: Vec<u64> = state.trend.iter().map(|p| p.fitness.round() as u64).collect();
    let fitness_line = Sparkline::default()
        .block(
            Block::default()
                .title("Fitness Trend (10 weeks)")
                .borders(Borders::ALL)
                .border_style(border_style(state.theme)),
        )
        .style(Style::default().fg(Color::Green))
        .data(&fitness);
    frame.render_widget(fitness_line, chunks[2]);

    let risk_series: Vec<u64> = state.trend.iter().map(|p| p.risk.round() as u64).collect();
    let risk_line = Sparkline::default()
        .block(
            Block::default()
                .title("Risk Trend (10 weeks)")
                .borders(Borders::ALL)
                .border_style(border_style(state.theme)),
        )
        .style(Style::default().fg(Color::Red))
        .data(&risk_series);
    frame.render_widget(risk_line, chunks[3]);
}

fn injury_cards_text(record: &PlayerRecord) -> String {
    if record.n_injuries == 0 {
        return "No injury history recorded".to_string();
    }
    let mut lines = Vec::new();
    for _ in 0..record.n_severe_injuries {
        lines.push("Severe injury  - recovery 4-6 weeks".to_string());
    }
    if record.n_injuries > record.n_severe_injuries {
        let minor = record.n_injuries - record.n_severe_injuries;
        lines.push(format!("Minor injuries x{minor} - recovery 1-2 weeks"));
    }
    lines.join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Physio Terminal - Help",
        "",
        "Dashboard:",
        "  j/k or ↑/↓   Select player",
        "  Tab/S-Tab    Cycle slider focus",
        "  ←/→ or -/+   Adjust focused slider",
        "  r            Reset sliders to roster values",
        "  a            Add player",
        "  c            Compare players",
        "  i            Injury history & trend",
        "  e            Export roster report (xlsx)",
        "  t            Toggle theme",
        "",
        "Global:",
        "  ?            Toggle help",
        "  b / Esc      Back",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
