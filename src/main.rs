use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use booth_terminal::card::CardView;
use booth_terminal::clipboard::ClipboardChain;
use booth_terminal::config::BoothConfig;
use booth_terminal::content_feed::{source_from_config, spawn_content_worker};
use booth_terminal::drawer::DRAWER_TABS;
use booth_terminal::run_sheet::{default_file_name, export_run_sheet, kind_label};
use booth_terminal::state::{AppState, Delta, Focus, InputMode, ProviderCommand, apply_delta};
use booth_terminal::taxonomy::{BroadcastEventType, EVENT_BAR};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    clipboard: ClipboardChain,
    config: BoothConfig,
}

impl App {
    fn new(config: BoothConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::with_config(&config),
            should_quit: false,
            cmd_tx,
            clipboard: ClipboardChain::system_with_terminal_fallback(),
            config,
        }
    }

    fn dispatch(&mut self, cmds: impl IntoIterator<Item = ProviderCommand>) {
        for cmd in cmds {
            let Some(tx) = &self.cmd_tx else {
                self.state.push_log("[WARN] Content generation unavailable");
                return;
            };
            if tx.send(cmd).is_err() {
                self.state.push_log("[WARN] Content worker stopped");
                self.cmd_tx = None;
                return;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match self.state.input_mode {
            InputMode::Note => self.on_note_key(key),
            InputMode::Normal => self.on_normal_key(key),
        }
    }

    fn on_note_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if self
                    .state
                    .submit_note(Instant::now(), Local::now())
                    .is_some()
                {
                    self.state.input_mode = InputMode::Normal;
                }
            }
            KeyCode::Esc => {
                self.state.timeline.note_input.clear();
                self.state.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.state.timeline.note_input.pop();
            }
            KeyCode::Char(c) => self.state.timeline.note_input.push(c),
            _ => {}
        }
    }

    fn on_normal_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char(c) = key.code
            && let Some(event) = BroadcastEventType::from_shortcut(c)
        {
            self.state.log_event(event, Instant::now(), Local::now());
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('n') => self.state.input_mode = InputMode::Note,
            KeyCode::Char(']') => {
                let cmds = self.state.advance_phase();
                self.dispatch(cmds);
            }
            KeyCode::Char('[') => {
                let cmds = self.state.rewind_phase();
                self.dispatch(cmds);
            }
            KeyCode::Char('E') => {
                let cmds = self.state.end_game();
                self.dispatch(cmds);
            }
            KeyCode::Left => self.state.focus = Focus::Timeline,
            KeyCode::Right => self.state.focus = Focus::Drawer,
            KeyCode::Char('j') | KeyCode::Down => match self.state.focus {
                Focus::Timeline => self.state.select_entry_next(),
                Focus::Drawer => self.state.drawer.active_deck_mut().select_next(),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.state.focus {
                Focus::Timeline => self.state.select_entry_prev(),
                Focus::Drawer => self.state.drawer.active_deck_mut().select_prev(),
            },
            KeyCode::Char('b') => {
                self.state.toggle_next_break_selected();
            }
            KeyCode::Tab => self.state.cycle_tab_next(),
            KeyCode::BackTab => self.state.cycle_tab_prev(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as usize) - ('1' as usize);
                self.state.activate_tab(DRAWER_TABS[idx]);
            }
            KeyCode::Char('P') => {
                self.state.toggle_pin_selected();
            }
            KeyCode::Char('c') => {
                self.state.toggle_collapse_selected();
            }
            KeyCode::Char('y') => {
                self.state.copy_selected(&mut self.clipboard, Instant::now());
            }
            KeyCode::Char('r') => {
                if let Some(cmd) = self.state.regenerate_selected() {
                    self.dispatch([cmd]);
                }
            }
            KeyCode::Char('a') => {
                if let Some(cmd) = self.state.add_card() {
                    self.dispatch([cmd]);
                }
            }
            KeyCode::Char('x') => {
                self.state.dismiss_selected();
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
    }

    fn export(&mut self) {
        let path = self
            .config
            .export_dir
            .join(default_file_name(Local::now()));
        match export_run_sheet(&self.state.timeline, &path) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Run sheet saved: {} ({} entries, {} next break)",
                report.path.display(),
                report.entries,
                report.next_break
            )),
            Err(err) => self
                .state
                .push_log(format!("[ERROR] Run sheet export failed: {err:#}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = BoothConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let source = source_from_config(&config);
    spawn_content_worker(tx, cmd_rx, source, config.fetch_parallelism);

    let offline = config.is_offline();
    let mut app = App::new(config, Some(cmd_tx));
    if offline {
        app.state
            .push_log("[INFO] BOOTH_CONTENT_URL not set; using offline content");
    }
    let cmds = app.state.initial_requests();
    app.dispatch(cmds);

    let res = run_app(&mut terminal, &mut app, rx);

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

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.state.tick(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_event_bar(frame, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    render_timeline(frame, body[0], &app.state);
    render_drawer(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    render_footer(frame, chunks[4], &app.state);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let flagged = state.timeline.next_break_entries().len();
    format!(
        " BOOTH | {} vs {} | Phase: {} | Entries: {} | Next break: {}",
        state.context.home,
        state.context.away,
        state.phase.phase_label(),
        state.timeline.len(),
        flagged
    )
}

fn render_event_bar(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for event in EVENT_BAR {
        let meta = event.meta();
        spans.push(Span::styled(
            format!(" [{}] {} ", meta.shortcut, meta.label),
            Style::default().fg(meta.color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }
    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Event Bar").borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn render_timeline(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Timeline;
    let block = Block::default()
        .title("Timeline")
        .borders(Borders::ALL)
        .border_style(focus_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.timeline.is_empty() {
        let empty = Paragraph::new("No entries yet. Press an event key or n for a note.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut lines = Vec::new();
    let mut selected_line = 0usize;
    let mut idx = 0usize;
    for group in state.timeline.grouped_view() {
        lines.push(Line::from(Span::styled(
            format!("── {} ──", group.period),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for entry in group.entries {
            let selected = idx == state.timeline_selected;
            if selected {
                selected_line = lines.len();
            }
            let color = entry
                .event
                .map(|event| event.meta().color)
                .unwrap_or(Color::Gray);
            let mut spans = vec![
                Span::raw(if selected { "> " } else { "  " }),
                Span::styled(
                    entry.timestamp.clone(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<10}", kind_label(entry.kind)),
                    Style::default().fg(color),
                ),
                Span::raw(entry.text.clone()),
            ];
            if entry.in_next_break {
                spans.push(Span::styled(
                    "  [NEXT BREAK]",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ));
            }
            let mut line = Line::from(spans);
            if selected && focused {
                line = line.style(Style::default().bg(Color::DarkGray));
            }
            lines.push(line);
            idx += 1;
        }
    }

    let scroll = scroll_to_show(selected_line, lines.len(), inner.height as usize);
    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    frame.render_widget(paragraph, inner);
}

fn render_drawer(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Drawer;
    let block = Block::default()
        .title("Reference Drawer")
        .borders(Borders::ALL)
        .border_style(focus_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let phase = state.game_phase();
    let active = state.drawer.router.active();
    let mut tabs = Vec::new();
    for (idx, tab) in DRAWER_TABS.into_iter().enumerate() {
        let locked = tab.is_locked(&phase);
        let label = if locked {
            format!("{}:{} [locked]", idx + 1, tab.label())
        } else {
            format!("{}:{}", idx + 1, tab.label())
        };
        let style = if tab == active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        tabs.push(Span::styled(label, style));
        tabs.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(tabs)), rows[0]);

    let views = state.drawer.deck(active).views();
    if views.is_empty() {
        let empty = Paragraph::new("No cards. Press a to add one.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, rows[1]);
        return;
    }

    let mut lines = Vec::new();
    let mut selected_line = 0usize;
    for view in &views {
        if view.selected {
            selected_line = lines.len();
        }
        lines.extend(card_lines(view, focused));
    }
    let scroll = scroll_to_show(selected_line, lines.len(), rows[1].height as usize);
    // Unwrapped so each card line is one row and the scroll offset stays exact.
    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    frame.render_widget(paragraph, rows[1]);
}

fn card_lines(view: &CardView, focused: bool) -> Vec<Line<'static>> {
    let mut header = vec![Span::raw(if view.selected { "> " } else { "  " })];
    if view.pinned {
        header.push(Span::styled(
            "[PIN] ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    header.push(Span::raw(if view.collapsed { "+ " } else { "- " }));
    let title_style = if view.pinned {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    header.push(Span::styled(view.title.clone(), title_style));
    if view.loading {
        header.push(Span::styled(
            "  generating...",
            Style::default().fg(Color::Cyan),
        ));
    }
    if view.copied {
        header.push(Span::styled("  Copied", Style::default().fg(Color::Green)));
    }
    if let Some(at) = &view.generated_at {
        header.push(Span::styled(
            format!("  @{at}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let mut header = Line::from(header);
    if view.selected && focused {
        header = header.style(Style::default().bg(Color::DarkGray));
    }

    let mut lines = vec![header];
    if !view.collapsed {
        for line in &view.lines {
            lines.push(Line::from(format!("    {line}")));
        }
    }
    if let Some(err) = &view.error {
        lines.push(Line::from(Span::styled(
            format!("    ! {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = match state.input_mode {
        InputMode::Note => Line::from(vec![
            Span::styled("Note: ", Style::default().fg(Color::Yellow)),
            Span::raw(state.timeline.note_input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        InputMode::Normal => match state.toast.message() {
            Some(msg) => Line::from(Span::styled(
                msg.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            None => Line::from(
                "g/p/s/l/w/f/i/m Event | n Note | b Next break | ]/[ Phase | E End | \
                 Tab/1-4 Drawer | P Pin | c Collapse | y Copy | r Regen | ? Help | q Quit",
            ),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn scroll_to_show(line: usize, total: usize, height: usize) -> usize {
    if height == 0 || total <= height {
        return 0;
    }
    let max_start = total - height;
    line.saturating_sub(height / 2).min(max_start)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let mut text = vec![
        "Booth Terminal - Help".to_string(),
        String::new(),
        "Event bar:".to_string(),
    ];
    for event in EVENT_BAR {
        let meta = event.meta();
        text.push(format!("  {}            {}", meta.shortcut, meta.label));
    }
    text.extend(
        [
            "",
            "Timeline:",
            "  n            Add note (Enter saves, Esc cancels)",
            "  j/k or ↑/↓   Move selection (←/→ switch pane)",
            "  b            Toggle Next Break flag",
            "  ] / [        Advance / rewind game phase",
            "  E            End game (Post-Game)",
            "  e            Export run sheet (.xlsx)",
            "",
            "Drawer:",
            "  Tab / 1-4    Switch tab (Post-Game unlocks at the final)",
            "  P            Pin / unpin card",
            "  c            Collapse / expand card",
            "  y            Copy card text",
            "  r            Regenerate card",
            "  a / x        Add / dismiss card",
            "",
            "  ?            Toggle help",
            "  q            Quit",
        ]
        .map(str::to_string),
    );

    let help = Paragraph::new(text.join("\n"))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_keeps_selected_line_visible() {
        assert_eq!(scroll_to_show(3, 5, 10), 0);
        for line in 0..40 {
            let start = scroll_to_show(line, 40, 8);
            assert!(start <= line && line < start + 8, "line {line} hidden at {start}");
        }
        assert_eq!(scroll_to_show(39, 40, 8), 32);
    }

    #[test]
    fn card_lines_are_one_row_each() {
        let view = CardView {
            id: 1,
            title: "Long".to_string(),
            lines: vec!["x".repeat(300), "short".to_string()],
            pinned: false,
            collapsed: false,
            loading: false,
            error: Some("timeout".to_string()),
            copied: false,
            generated_at: None,
            selected: true,
        };
        assert_eq!(card_lines(&view, true).len(), 4);
        let collapsed = CardView {
            collapsed: true,
            ..view
        };
        assert_eq!(card_lines(&collapsed, true).len(), 2);
    }
}
