use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use std::io::stdout;

use crate::models::{Candidate, Domain, Opening};
use crate::search::SearchClient;
use crate::session::{SearchSession, run_search};

struct TabUi {
    selected: usize,
    scroll_offset: u16,
}

impl TabUi {
    fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
        }
    }

    fn select_next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }
}

enum Mode {
    Browse,
    EditQuery(String),
}

struct AppState<'a> {
    session: &'a mut SearchSession,
    client: &'a SearchClient,
    candidates_ui: TabUi,
    openings_ui: TabUi,
    mode: Mode,
}

impl<'a> AppState<'a> {
    fn new(session: &'a mut SearchSession, client: &'a SearchClient) -> Self {
        Self {
            session,
            client,
            candidates_ui: TabUi::new(),
            openings_ui: TabUi::new(),
            mode: Mode::Browse,
        }
    }

    fn row_count(&self) -> usize {
        match self.session.active {
            Domain::Candidates => self
                .session
                .candidates
                .results
                .as_ref()
                .map_or(0, |r| r.content.len()),
            Domain::Openings => self
                .session
                .openings
                .results
                .as_ref()
                .map_or(0, |r| r.content.len()),
        }
    }

    fn active_ui(&mut self) -> &mut TabUi {
        match self.session.active {
            Domain::Candidates => &mut self.candidates_ui,
            Domain::Openings => &mut self.openings_ui,
        }
    }

    fn search_active(&mut self) {
        match self.session.active {
            Domain::Candidates => run_search(self.client, &mut self.session.candidates),
            Domain::Openings => run_search(self.client, &mut self.session.openings),
        };
        self.active_ui().selected = 0;
        self.active_ui().scroll_offset = 0;
    }

    fn page_next(&mut self) {
        let moved = match self.session.active {
            Domain::Candidates => {
                let current = self.session.candidates.page.page;
                self.session.candidates.change_page(current + 1) != current
            }
            Domain::Openings => {
                let current = self.session.openings.page.page;
                self.session.openings.change_page(current + 1) != current
            }
        };
        if moved {
            self.search_active();
        }
    }

    fn page_prev(&mut self) {
        let moved = match self.session.active {
            Domain::Candidates => {
                let current = self.session.candidates.page.page;
                current > 0 && self.session.candidates.change_page(current - 1) != current
            }
            Domain::Openings => {
                let current = self.session.openings.page.page;
                current > 0 && self.session.openings.change_page(current - 1) != current
            }
        };
        if moved {
            self.search_active();
        }
    }
}

pub fn run_browse(session: &mut SearchSession, client: &SearchClient) -> Result<()> {
    let mut state = AppState::new(session, client);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Query edit mode captures all keys until Enter or Esc.
            if let Mode::EditQuery(buffer) = &mut state.mode {
                match key.code {
                    KeyCode::Enter => {
                        let query = buffer.clone();
                        state.mode = Mode::Browse;
                        match state.session.active {
                            Domain::Candidates => state
                                .session
                                .candidates
                                .update_filters(|f| f.text_query = query),
                            Domain::Openings => state
                                .session
                                .openings
                                .update_filters(|f| f.text_query = query),
                        }
                        state.search_active();
                    }
                    KeyCode::Esc => state.mode = Mode::Browse,
                    KeyCode::Backspace => {
                        buffer.pop();
                    }
                    KeyCode::Char(c) => buffer.push(c),
                    _ => {}
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Tab => {
                    state.session.toggle_domain();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let len = state.row_count();
                    state.active_ui().select_next(len);
                }
                KeyCode::Up | KeyCode::Char('k') => state.active_ui().select_prev(),
                KeyCode::Char('J') | KeyCode::PageDown => {
                    let ui = state.active_ui();
                    ui.scroll_offset = ui.scroll_offset.saturating_add(3);
                }
                KeyCode::Char('K') | KeyCode::PageUp => {
                    let ui = state.active_ui();
                    ui.scroll_offset = ui.scroll_offset.saturating_sub(3);
                }
                KeyCode::Char('/') => {
                    let current = match state.session.active {
                        Domain::Candidates => state.session.candidates.filters.text_query.clone(),
                        Domain::Openings => state.session.openings.filters.text_query.clone(),
                    };
                    state.mode = Mode::EditQuery(current);
                }
                KeyCode::Char('c') => {
                    state.session.reset_active();
                    state.active_ui().selected = 0;
                    state.active_ui().scroll_offset = 0;
                }
                KeyCode::Char('s') | KeyCode::Char('r') => state.search_active(),
                KeyCode::Char('n') | KeyCode::Right => state.page_next(),
                KeyCode::Char('p') | KeyCode::Left => state.page_prev(),
                _ => {}
            }
            let selected = match state.session.active {
                Domain::Candidates => state.candidates_ui.selected,
                Domain::Openings => state.openings_ui.selected,
            };
            list_state.select(Some(selected));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Tab bar with result totals, like the web UI's tab badges
    let titles = vec![
        format!(
            "Candidates ({})",
            state.session.candidates.total_elements()
        ),
        format!("Job Openings ({})", state.session.openings.total_elements()),
    ];
    let active_index = match state.session.active {
        Domain::Candidates => 0,
        Domain::Openings => 1,
    };
    let tabs = Tabs::new(titles)
        .select(active_index)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, rows[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    let (items, detail) = match state.session.active {
        Domain::Candidates => {
            let content = state
                .session
                .candidates
                .results
                .as_ref()
                .map(|r| r.content.as_slice())
                .unwrap_or(&[]);
            (
                candidate_items(content),
                candidate_detail(content.get(state.candidates_ui.selected)),
            )
        }
        Domain::Openings => {
            let content = state
                .session
                .openings
                .results
                .as_ref()
                .map(|r| r.content.as_slice())
                .unwrap_or(&[]);
            (
                opening_items(content),
                opening_detail(content.get(state.openings_ui.selected)),
            )
        }
    };

    let (page, total_pages) = match state.session.active {
        Domain::Candidates => (
            state.session.candidates.page.page,
            state
                .session
                .candidates
                .results
                .as_ref()
                .map_or(0, |r| r.total_pages),
        ),
        Domain::Openings => (
            state.session.openings.page.page,
            state
                .session
                .openings
                .results
                .as_ref()
                .map_or(0, |r| r.total_pages),
        ),
    };

    let list_title = format!(
        " {} - page {}/{} - {} filter(s) ",
        state.session.active.label(),
        page + 1,
        total_pages.max(1),
        state.session.active_filter_count()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, panes[0], list_state);

    let scroll = match state.session.active {
        Domain::Candidates => state.candidates_ui.scroll_offset,
        Domain::Openings => state.openings_ui.scroll_offset,
    };
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(detail_widget, panes[1]);

    // Footer: query being edited, else error, else key help
    let footer = if let Mode::EditQuery(buffer) = &state.mode {
        Paragraph::new(format!(" Query: {}_", buffer)).style(Style::default().fg(Color::Yellow))
    } else if let Some(error) = state.session.active_error() {
        Paragraph::new(format!(" Error: {}", error)).style(Style::default().fg(Color::Red))
    } else {
        Paragraph::new(
            " Tab:switch  j/k:navigate  J/K:scroll  /:query  s:search  n/p:page  c:clear  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(footer, rows[2]);
}

fn candidate_items(content: &[Candidate]) -> Vec<ListItem<'static>> {
    if content.is_empty() {
        return vec![ListItem::new("(no results - press s to search)")];
    }
    content
        .iter()
        .map(|candidate| {
            let name = candidate.full_name();
            let name = if name.is_empty() { "(unnamed)" } else { &name };
            ListItem::new(format!(
                "{} | {} | {}",
                truncate(name, 24),
                truncate(candidate.current_location.as_deref().unwrap_or("?"), 14),
                candidate.status.as_deref().unwrap_or("-"),
            ))
        })
        .collect()
}

fn opening_items(content: &[Opening]) -> Vec<ListItem<'static>> {
    if content.is_empty() {
        return vec![ListItem::new("(no results - press s to search)")];
    }
    content
        .iter()
        .map(|opening| {
            ListItem::new(format!(
                "{} | {} | {}",
                truncate(opening.title.as_deref().unwrap_or("(untitled)"), 26),
                truncate(opening.department.as_deref().unwrap_or("?"), 14),
                opening.status.as_deref().unwrap_or("-"),
            ))
        })
        .collect()
}

fn candidate_detail(candidate: Option<&Candidate>) -> Text<'static> {
    let Some(candidate) = candidate else {
        return Text::raw("No result selected");
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        candidate.full_name(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(email) = &candidate.email {
        lines.push(Line::from(format!("Email: {}", email)));
    }
    if let Some(phone) = &candidate.phone {
        lines.push(Line::from(format!("Phone: {}", phone)));
    }
    if let Some(location) = &candidate.current_location {
        lines.push(Line::from(format!("Location: {}", location)));
    }
    if let Some(experience) = &candidate.experience {
        lines.push(Line::from(format!("Experience: {} years", experience)));
    }
    if let Some(package) = &candidate.current_package {
        lines.push(Line::from(format!("Current package: {}", package)));
    }
    if let Some(ctc) = &candidate.expected_ctc {
        lines.push(Line::from(format!("Expected CTC: {}", ctc)));
    }
    if let Some(status) = &candidate.status {
        lines.push(Line::from(format!("Status: {}", status)));
    }
    if let Some(source) = &candidate.source {
        lines.push(Line::from(format!("Source: {}", source)));
    }
    if let Some(skills) = &candidate.skills {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Skills",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(skills, 60).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }
    Text::from(lines)
}

fn opening_detail(opening: Option<&Opening>) -> Text<'static> {
    let Some(opening) = opening else {
        return Text::raw("No result selected");
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        opening.title.clone().unwrap_or_else(|| "(untitled)".to_string()),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(department) = &opening.department {
        lines.push(Line::from(format!("Department: {}", department)));
    }
    if let Some(opening_type) = &opening.opening_type {
        lines.push(Line::from(format!("Type: {}", opening_type)));
    }
    if let Some(location) = &opening.location {
        lines.push(Line::from(format!("Location: {}", location)));
    }
    if let Some(experience) = &opening.experience {
        lines.push(Line::from(format!("Experience: {}", experience)));
    }
    let salary = opening.salary_range();
    if !salary.is_empty() {
        lines.push(Line::from(format!("Salary: {}", salary)));
    }
    if let Some(status) = &opening.status {
        lines.push(Line::from(format!("Status: {}", status)));
    }
    if let Some(skills) = &opening.skills {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Skills",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(skills, 60).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }
    Text::from(lines)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
