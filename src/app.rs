use std::io;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::client::ForecastClient;
use crate::preferences::PreferenceStore;
use crate::presentation::{ForecastView, HourRowView, HourlyView, Severity};
use crate::session::Session;
use crate::weather::DisplayUnit;

const NO_HOURLY: &str = "No hourly data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Editing,
    Browsing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading(String),
    Ok(String),
    Error(String),
}

impl Status {
    fn badge(&self) -> (&'static str, Color) {
        match self {
            Status::Idle => ("Idle", Color::Gray),
            Status::Loading(_) => ("Loading", Color::Yellow),
            Status::Ok(_) => ("Ok", Color::Green),
            Status::Error(_) => ("Error", Color::Red),
        }
    }

    fn message(&self) -> &str {
        match self {
            Status::Idle => "",
            Status::Loading(msg) | Status::Ok(msg) | Status::Error(msg) => msg.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Lookup,
    Quit,
}

#[derive(Debug)]
pub struct App<S: PreferenceStore> {
    session: Session<S>,
    client: ForecastClient,
    pub city: String,
    pub mode: InputMode,
    pub status: Status,
    pub invalid_city: bool,
    pub suggestion: Option<String>,
    pub view: Option<ForecastView>,
    pub table_state: TableState,
    pub detail_open: bool,
}

impl<S: PreferenceStore> App<S> {
    pub fn new(session: Session<S>, client: ForecastClient, city: Option<String>) -> Self {
        let city = city.unwrap_or_default();
        let mode = if city.trim().is_empty() {
            InputMode::Editing
        } else {
            InputMode::Browsing
        };
        Self {
            session,
            client,
            city,
            mode,
            status: Status::Idle,
            invalid_city: false,
            suggestion: None,
            view: None,
            table_state: TableState::default(),
            detail_open: false,
        }
    }

    pub fn unit(&self) -> DisplayUnit {
        self.session.unit()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match self.mode {
            InputMode::Editing => self.handle_editing(key.code),
            InputMode::Browsing => self.handle_browsing(key.code),
        }
    }

    fn handle_editing(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Enter => {
                self.mode = InputMode::Browsing;
                return Action::Lookup;
            }
            KeyCode::Esc => self.mode = InputMode::Browsing,
            KeyCode::Backspace => {
                self.city.pop();
                self.invalid_city = false;
            }
            KeyCode::Char(c) => {
                self.city.push(c);
                self.invalid_city = false;
            }
            _ => {}
        }
        Action::None
    }

    fn handle_browsing(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Esc if self.detail_open => self.detail_open = false,
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('e') | KeyCode::Char('/') => self.mode = InputMode::Editing,
            KeyCode::Char('r') => return Action::Lookup,
            KeyCode::Char('c') => self.change_unit(DisplayUnit::Celsius),
            KeyCode::Char('f') => self.change_unit(DisplayUnit::Fahrenheit),
            KeyCode::Char('u') => self.change_unit(self.unit().toggled()),
            KeyCode::Down | KeyCode::Char('j') => self.select_offset(1),
            KeyCode::Up | KeyCode::Char('k') => self.select_offset(-1),
            KeyCode::Enter => {
                if self.row_count() > 0 && self.table_state.selected().is_some() {
                    self.detail_open = !self.detail_open;
                }
            }
            _ => {}
        }
        Action::None
    }

    /// Switching units rebuilds the whole view from the retained forecast.
    fn change_unit(&mut self, unit: DisplayUnit) {
        self.session.set_unit(unit);
        if self.view.is_some() {
            self.view = self.session.view();
        }
    }

    fn row_count(&self) -> usize {
        match self.view.as_ref().map(|v| &v.hourly) {
            Some(HourlyView::Rows(rows)) => rows.len(),
            _ => 0,
        }
    }

    fn select_offset(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, count as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    fn selected_row(&self) -> Option<&HourRowView> {
        let idx = self.table_state.selected()?;
        match &self.view.as_ref()?.hourly {
            HourlyView::Rows(rows) => rows.get(idx),
            HourlyView::NoData => None,
        }
    }

    /// Validates the city and flags the lookup as in flight.
    ///
    /// Returns `false` when there is nothing to look up.
    pub fn begin_lookup(&mut self) -> bool {
        self.suggestion = None;
        let city = self.city.trim();
        if city.is_empty() {
            self.invalid_city = true;
            self.mode = InputMode::Editing;
            self.status = Status::Error("Please enter a city name".to_string());
            return false;
        }
        self.status = Status::Loading(format!("Looking up {city}…"));
        true
    }

    pub fn lookup(&mut self) {
        let ticket = self.session.begin_fetch();
        self.detail_open = false;
        match self.client.forecast(&self.city) {
            Ok(response) => {
                if let Some(view) = self.session.accept(ticket, response) {
                    let has_rows = matches!(view.hourly, HourlyView::Rows(_));
                    self.view = Some(view);
                    self.table_state.select(has_rows.then_some(0));
                    let now = Local::now();
                    self.status = Status::Ok(format!("Ready — updated {}", now.format("%H:%M:%S")));
                }
            }
            Err(err) => {
                tracing::error!("lookup for '{}' failed: {}", self.city.trim(), err);
                self.suggestion = err.suggestion().map(String::from);
                self.status = Status::Error(err.to_string());
                self.view = None;
            }
        }
    }
}

pub fn run_app<B: Backend, S: PreferenceStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    let mut pending = if app.mode == InputMode::Browsing {
        Action::Lookup
    } else {
        Action::None
    };

    loop {
        if pending == Action::Lookup && app.begin_lookup() {
            terminal.draw(|f| ui(f, app))?;
            app.lookup();
        }
        terminal.draw(|f| ui(f, app))?;

        pending = Action::None;
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key) {
                Action::Quit => return Ok(()),
                action => pending = action,
            }
        }
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Danger => Color::Red,
        Severity::Caution => Color::Yellow,
        Severity::Neutral => Color::Green,
    }
}

fn card(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_headline<S: PreferenceStore>(app: &App<S>) -> Paragraph<'_> {
    let (badge, badge_color) = app.status.badge();
    let border = if app.invalid_city {
        Color::Red
    } else if app.mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::Cyan
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(" City: "),
        Span::styled(
            app.city.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ])];
    lines.push(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!(" {badge} "),
            Style::default().fg(Color::Black).bg(badge_color),
        ),
        Span::raw(" "),
        Span::raw(app.status.message()),
    ]));
    if let Some(link) = &app.suggestion {
        lines.push(Line::from(vec![
            Span::raw(" Suggestions: "),
            Span::styled(link.as_str(), Style::default().fg(Color::Blue)),
        ]));
    }

    let unit_span = |unit: DisplayUnit| {
        let style = if app.unit() == unit {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!(" {} ", unit.suffix()), style)
    };

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::styled(" Umbrella ", Style::default().fg(Color::Yellow)),
                unit_span(DisplayUnit::Celsius),
                unit_span(DisplayUnit::Fahrenheit),
                Span::raw(" "),
            ]))
            .border_style(Style::default().fg(border))
            .border_type(BorderType::Rounded),
    )
}

fn display_summary(view: &ForecastView) -> Paragraph<'_> {
    let mut lines = vec![Line::from("")];

    if let Some(score) = &view.score {
        lines.push(Line::from(vec![
            Span::raw(" Umbrella score: "),
            Span::styled(
                score.label.as_str(),
                Style::default()
                    .fg(severity_color(score.severity))
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(format!(" {}", score.advice)));
        lines.push(Line::from(""));
    }

    if !view.alerts.is_empty() {
        lines.push(Line::from(Span::styled(
            " Alerts",
            Style::default().fg(Color::Yellow),
        )));
        for alert in &view.alerts {
            lines.push(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    format!(" {} ", alert.prob),
                    Style::default()
                        .fg(Color::Black)
                        .bg(severity_color(alert.severity)),
                ),
                Span::raw(" "),
                Span::styled(
                    alert.label.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(format!("      {}", alert.time)));
            lines.push(Line::from(format!("      {}", alert.advice)));
        }
        lines.push(Line::from(""));
    }

    if !view.summary.is_empty() {
        lines.push(Line::from(format!(" {}", view.summary)));
    }

    Paragraph::new(lines)
        .block(card("Summary"))
        .wrap(Wrap { trim: false })
}

fn display_hourly(rows: &[HourRowView]) -> Table<'_> {
    let header = Row::new(vec![
        "Time",
        "Temp",
        "Score",
        "Precip %",
        "Precip mm",
        "Condition",
    ])
    .style(Style::default().fg(Color::Yellow));

    let table_rows = rows.iter().map(|row| {
        let temp_style = match row.temperature_color {
            Some(hsl) => {
                let (r, g, b) = hsl.to_rgb();
                Style::default().fg(Color::Rgb(r, g, b))
            }
            None => Style::default(),
        };
        let score_style = row
            .score
            .as_ref()
            .map_or(Style::default(), |s| Style::default().fg(severity_color(s.severity)));

        Row::new(vec![
            Cell::from(row.time_compact.as_str()),
            Cell::from(Text::from(vec![
                Line::styled(row.temperature.as_str(), temp_style),
                Line::styled(row.sub_line(), Style::default().fg(Color::DarkGray)),
            ])),
            Cell::from(row.score_label()).style(score_style),
            Cell::from(row.precip_prob.as_str()),
            Cell::from(row.precip_mm.as_str()),
            Cell::from(row.condition.as_str()),
        ])
        .height(2)
    });

    Table::new(
        table_rows,
        [
            Constraint::Length(6),
            Constraint::Length(28),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(card("Hourly"))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ")
}

fn display_detail(row: &HourRowView) -> Paragraph<'_> {
    let entry = |label: &'static str, value: &str| {
        Line::from(vec![
            Span::raw(format!(" {label:11}")),
            Span::styled(value.to_string(), Style::default().fg(Color::Green)),
        ])
    };
    Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {}", row.time_detail),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        entry("Temp", &row.temperature),
        entry("Precip %", &row.precip_prob),
        entry("Precip mm", &row.precip_mm),
        entry("Wind", &row.wind),
        entry("Wind chill", &row.wind_chill),
        entry("Umbrella", row.score_label()),
    ])
    .block(card("Details"))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Column just past the typed city, kept inside the headline border.
fn input_cursor_x(area: Rect, city: &str) -> u16 {
    let typed = u16::try_from(city.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(7)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}

fn ui<S: PreferenceStore>(f: &mut Frame, app: &mut App<S>) {
    let headline_height = if app.suggestion.is_some() { 5 } else { 4 };
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(headline_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(display_headline(app), vert_layout[0]);
    if app.mode == InputMode::Editing {
        let area = vert_layout[0];
        f.set_cursor_position((input_cursor_x(area, &app.city), area.y + 1));
    }

    f.render_widget(
        Paragraph::new(" e edit city · Enter look up/details · c/f/u unit · ↑↓ select · q quit")
            .style(Style::default().fg(Color::DarkGray)),
        vert_layout[2],
    );

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(vert_layout[1]);

    let Some(view) = app.view.as_ref() else {
        f.render_widget(card("Summary"), chunks[0]);
        f.render_widget(card("Hourly"), chunks[1]);
        return;
    };

    f.render_widget(display_summary(view), chunks[0]);
    match &view.hourly {
        HourlyView::NoData => {
            let placeholder = Paragraph::new(format!("\n  {NO_HOURLY}"))
                .style(Style::default().fg(Color::DarkGray))
                .block(card("Hourly"));
            f.render_widget(placeholder, chunks[1]);
        }
        HourlyView::Rows(rows) => {
            f.render_stateful_widget(display_hourly(rows), chunks[1], &mut app.table_state);
        }
    }

    if app.detail_open {
        if let Some(row) = app.selected_row() {
            let area = centered(chunks[1], 36, 9);
            f.render_widget(Clear, area);
            f.render_widget(display_detail(row), area);
        }
    }
}
