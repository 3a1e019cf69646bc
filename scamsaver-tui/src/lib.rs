use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use scamsaver_analyzer::{AnalysisClient, AnalysisError, AnalysisResult};
use scamsaver_core::animation::{frame_at, PROGRESS_TICK};
use scamsaver_core::report::generate_text_report;
use scamsaver_core::session::{ScanSession, Ticket, ViewState};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::debug;

const MAX_OUTPUT_LINES: usize = 1000;
const MAX_HISTORY: usize = 100;
const SCROLL_PAGE: usize = 10;
// Rows below the output area: two rules, the input line and the status bar
const CHROME_ROWS: u16 = 4;

type ScanOutcome = (Ticket, Result<AnalysisResult, AnalysisError>);

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExitMode {
    Normal,      // exit, quit - ask about saving
    ForceQuit,   // :q! - don't save, don't ask
    WriteQuit,   // :wq!, ZZ - save and quit, don't ask
}

/// A scan the REPL wants started.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingScan {
    pub ticket: Ticket,
    pub url: String,
}

pub struct App {
    input: String,
    history: Vec<String>,
    output: Vec<String>,
    cursor_position: usize,
    should_quit: bool,
    /// Lines scrolled back from the bottom of the output; 0 follows new output.
    scroll_offset: usize,
    history_index: Option<usize>,
    temp_input: String,
    awaiting_save_confirmation: bool,
    session: ScanSession,
    scan_started: Option<Instant>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let banner = r#"
    ╔══════════════════════════════════════════════════════╗
    ║               S C A M   S A V E R                    ║
    ║                                                      ║
    ║        Stop scams before you click. Verify first.    ║
    ╚══════════════════════════════════════════════════════╝
        "#;

        let mut output = Vec::new();
        for line in banner.lines() {
            output.push(line.to_string());
        }
        output.push(String::new());
        output.push("  Type 'scan <url>' to verify a website, 'help' for commands, 'exit' to quit.".to_string());
        output.push(String::new());

        Self {
            input: String::new(),
            history: Vec::new(),
            output,
            cursor_position: 0,
            should_quit: false,
            scroll_offset: 0,
            history_index: None,
            temp_input: String::new(),
            awaiting_save_confirmation: false,
            session: ScanSession::new(),
            scan_started: None,
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn add_output(&mut self, message: impl Into<String>) {
        self.output.push(message.into());
        if self.output.len() > MAX_OUTPUT_LINES {
            self.output.drain(0..self.output.len() - MAX_OUTPUT_LINES);
        }
        // Reset scroll to auto-scroll to bottom on new output
        self.scroll_offset = 0;
    }

    /// Scroll back towards older output, stopping once the first line is at the top.
    pub fn scroll_up(&mut self, lines: usize, viewport: usize) {
        let max_offset = self.output.len().saturating_sub(viewport);
        self.scroll_offset = (self.scroll_offset + lines).min(max_offset);
    }

    /// Scroll towards the newest output.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Index of the first output line shown in a viewport of `viewport` rows.
    pub fn first_visible_line(&self, viewport: usize) -> usize {
        self.output
            .len()
            .saturating_sub(viewport + self.scroll_offset)
    }

    pub fn navigate_history_backward(&mut self) {
        if self.history.is_empty() {
            return;
        }

        if self.history_index.is_none() {
            self.temp_input = self.input.clone();
        }

        let idx = match self.history_index {
            None => self.history.len() - 1,
            Some(idx) => idx.saturating_sub(1),
        };

        self.history_index = Some(idx);
        self.input = self.history[idx].clone();
        self.cursor_position = self.input.len();
    }

    pub fn navigate_history_forward(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };

        if idx + 1 >= self.history.len() {
            // Reached the end, restore temp input
            self.input = std::mem::take(&mut self.temp_input);
            self.cursor_position = self.input.len();
            self.history_index = None;
            return;
        }

        self.history_index = Some(idx + 1);
        self.input = self.history[idx + 1].clone();
        self.cursor_position = self.input.len();
    }

    fn get_history_file_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".scamsaver_history")
    }

    pub fn load_history(&mut self) {
        let path = Self::get_history_file_path();
        if let Ok(content) = fs::read_to_string(&path) {
            let mut lines: Vec<String> = content.lines().map(|s| s.to_string()).collect();
            if lines.len() > MAX_HISTORY {
                lines.drain(0..lines.len() - MAX_HISTORY);
            }
            self.history = lines;
        }
    }

    pub fn save_history(&self) -> Result<()> {
        let path = Self::get_history_file_path();
        fs::write(&path, self.history.join("\n"))
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn request_exit(&mut self, mode: ExitMode) {
        match mode {
            ExitMode::Normal => {
                if !self.history.is_empty() {
                    self.awaiting_save_confirmation = true;
                    self.add_output("");
                    self.add_output("Save command history to ~/.scamsaver_history? [y/N]:");
                } else {
                    self.should_quit = true;
                }
            }
            ExitMode::ForceQuit => {
                self.should_quit = true;
            }
            ExitMode::WriteQuit => {
                self.save_history_with_feedback();
                self.should_quit = true;
            }
        }
    }

    fn save_history_with_feedback(&mut self) {
        if self.history.is_empty() {
            return;
        }
        match self.save_history() {
            Ok(()) => self.add_output("History saved to ~/.scamsaver_history"),
            Err(e) => self.add_output(format!("Error saving history: {}", e)),
        }
    }

    fn handle_save_confirmation(&mut self, response: &str) {
        self.awaiting_save_confirmation = false;

        let response = response.trim().to_lowercase();
        if response == "y" || response == "yes" {
            self.save_history_with_feedback();
        } else {
            self.add_output("History not saved.");
        }
        self.should_quit = true;
    }

    /// Handle one line of input. Returns the scan to start, if the line asked for one.
    pub fn handle_input(&mut self, input: String) -> Option<PendingScan> {
        // An empty answer takes the prompt's default
        if self.awaiting_save_confirmation {
            self.handle_save_confirmation(&input);
            return None;
        }

        if input.is_empty() {
            return None;
        }

        self.history.push(input.clone());
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
        self.history_index = None;
        self.temp_input.clear();

        self.add_output(format!("> {}", input));

        let trimmed = input.trim();
        let (command, rest) = trimmed
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((trimmed, ""));

        match command {
            "exit" | "quit" => self.request_exit(ExitMode::Normal),
            ":q!" => self.request_exit(ExitMode::ForceQuit),
            ":wq!" | "ZZ" => self.request_exit(ExitMode::WriteQuit),
            "help" => {
                self.add_output("Available commands:");
                self.add_output("  scan <url>      - Verify a website or domain");
                self.add_output("  clear           - Clear the output");
                self.add_output("  help            - Show this help message");
                self.add_output("  exit, quit      - Exit the REPL");
            }
            "clear" => {
                self.output.clear();
            }
            "scan" => return self.start_scan(rest),
            "" => {}
            other => {
                self.add_output(format!("Unknown command: {}", other));
                self.add_output("Type 'help' for available commands");
            }
        }
        None
    }

    fn start_scan(&mut self, url: &str) -> Option<PendingScan> {
        // Empty targets leave the view untouched
        let ticket = self.session.submit(url)?;

        if self.scan_started.is_some() {
            self.add_output("  (previous scan superseded)");
        }
        self.scan_started = Some(Instant::now());
        self.add_output(format!("Scanning {} ...", url));

        Some(PendingScan {
            ticket,
            url: url.to_string(),
        })
    }

    /// Apply a finished scan. Outcomes for superseded scans are dropped.
    pub fn apply_outcome(&mut self, ticket: Ticket, outcome: Result<AnalysisResult, AnalysisError>) {
        if !self.session.settle(ticket, outcome) {
            debug!("Ignoring outcome for superseded scan #{}", ticket.sequence());
            return;
        }
        self.scan_started = None;

        match self.session.state().clone() {
            ViewState::Complete(result) => {
                self.add_output(format!(
                    "✓ {}: {}% trust, {}",
                    result.url, result.trust_score, result.verdict
                ));
                for line in generate_text_report(&result).lines() {
                    self.add_output(line.to_string());
                }
            }
            ViewState::Failed(message) => {
                self.add_output(format!("✗ {}", message));
            }
            ViewState::Idle | ViewState::Scanning { .. } => {}
        }
    }

    /// Status bar text, with the cosmetic scan animation while a scan is outstanding.
    pub fn scan_status(&self) -> Option<String> {
        if !self.session.is_scanning() {
            return None;
        }
        let started = self.scan_started?;
        let frame = frame_at(started.elapsed());
        Some(format!("[{:>3}%] {}", frame.percent(), frame.label))
    }
}

pub fn run(client: Arc<AnalysisClient>) -> Result<()> {
    let runtime = tokio::runtime::Handle::try_current()
        .context("the REPL must be started from within a tokio runtime")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    app.load_history();

    let result = run_app(&mut terminal, &mut app, client, runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: Arc<AnalysisClient>,
    runtime: tokio::runtime::Handle,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ScanOutcome>();

    loop {
        while let Ok((ticket, outcome)) = rx.try_recv() {
            app.apply_outcome(ticket, outcome);
        }

        terminal.draw(|f| ui(f, app))?;

        // Poll so the animation keeps moving while no keys arrive
        if !event::poll(PROGRESS_TICK)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            // Only process KeyPress events, ignore KeyRelease
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char(c) => {
                    app.input.insert(app.cursor_position, c);
                    app.cursor_position += c.len_utf8();
                    app.history_index = None;
                    app.temp_input.clear();
                }
                KeyCode::Backspace => {
                    if let Some((idx, _)) = app.input[..app.cursor_position].char_indices().last() {
                        app.input.remove(idx);
                        app.cursor_position = idx;
                        app.history_index = None;
                        app.temp_input.clear();
                    }
                }
                KeyCode::Enter => {
                    let input = app.input.drain(..).collect();
                    app.cursor_position = 0;
                    if let Some(scan) = app.handle_input(input) {
                        let client = client.clone();
                        let tx = tx.clone();
                        runtime.spawn(async move {
                            let outcome = client.analyze(&scan.url).await;
                            // Receiver gone means the REPL has exited
                            let _ = tx.send((scan.ticket, outcome));
                        });
                    }
                }
                KeyCode::Up => app.navigate_history_backward(),
                KeyCode::Down => app.navigate_history_forward(),
                KeyCode::Left => {
                    if let Some((idx, _)) = app.input[..app.cursor_position].char_indices().last() {
                        app.cursor_position = idx;
                    }
                }
                KeyCode::Right => {
                    if let Some(c) = app.input[app.cursor_position..].chars().next() {
                        app.cursor_position += c.len_utf8();
                    }
                }
                KeyCode::Home => app.cursor_position = 0,
                KeyCode::End => app.cursor_position = app.input.len(),
                KeyCode::Esc => app.should_quit = true,
                KeyCode::PageUp => {
                    let viewport = terminal.size()?.height.saturating_sub(CHROME_ROWS);
                    app.scroll_up(SCROLL_PAGE, viewport as usize);
                }
                KeyCode::PageDown => app.scroll_down(SCROLL_PAGE),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn line_style(line: &str) -> Style {
    if line.starts_with('✓') {
        Style::default().fg(Color::Green)
    } else if line.starts_with('✗') {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if line.starts_with('>') {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Output area
            Constraint::Length(1), // Horizontal rule
            Constraint::Length(1), // Input area
            Constraint::Length(1), // Horizontal rule
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let output_height = chunks[0].height as usize;

    let visible_output: Vec<Line> = app
        .output
        .iter()
        .skip(app.first_visible_line(output_height))
        .take(output_height)
        .map(|line| Line::styled(line.clone(), line_style(line)))
        .collect();

    f.render_widget(Paragraph::new(visible_output), chunks[0]);

    let rule = "─".repeat(chunks[1].width as usize);
    f.render_widget(
        Paragraph::new(rule.clone()).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );

    let prompt = "scan> ";
    let input = Paragraph::new(format!("{}{}", prompt, app.input))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(input, chunks[2]);

    let cursor_column = app.input[..app.cursor_position].chars().count();
    f.set_cursor_position((
        chunks[2].x + (prompt.len() + cursor_column) as u16,
        chunks[2].y,
    ));

    f.render_widget(
        Paragraph::new(rule).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    let status = match app.scan_status() {
        Some(progress) => Paragraph::new(Line::from(vec![
            Span::styled("⟳ ", Style::default().fg(Color::Red)),
            Span::styled(progress, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        ])),
        None => Paragraph::new(Line::from(vec![
            Span::raw("Press "),
            Span::styled("ESC", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" or type "),
            Span::styled("exit", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" to quit | "),
            Span::styled("scan <url>", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" to verify | "),
            Span::styled("↑↓", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" history | "),
            Span::styled("PgUp/PgDn", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" scroll"),
        ]))
        .style(Style::default().fg(Color::DarkGray)),
    };

    f.render_widget(status, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use scamsaver_analyzer::{SiteDetails, USER_FACING_FAILURE, Verdict};

    fn result_for(url: &str) -> AnalysisResult {
        AnalysisResult {
            url: url.to_string(),
            trust_score: 91,
            verdict: Verdict::Safe,
            summary: "Well known".to_string(),
            risk_factors: vec![],
            site_details: SiteDetails {
                domain_age: "20 years".to_string(),
                ssl_status: "Valid".to_string(),
                popularity: "Top 100".to_string(),
                server_location: "Ireland".to_string(),
                owner_info: "Public company".to_string(),
            },
            recommendation: "Fine".to_string(),
            sources: None,
        }
    }

    #[test]
    fn test_scan_command_returns_pending_scan() {
        let mut app = App::new();
        let scan = app.handle_input("scan example.com".to_string()).unwrap();

        assert_eq!(scan.url, "example.com");
        assert!(app.session().is_scanning());
        assert!(app.scan_status().is_some());
    }

    #[test]
    fn test_scan_without_url_does_not_start() {
        let mut app = App::new();
        assert!(app.handle_input("scan".to_string()).is_none());
        assert!(app.handle_input("scan    ".to_string()).is_none());
        assert_eq!(app.session().state(), &ViewState::Idle);
        assert!(app.scan_status().is_none());
    }

    #[test]
    fn test_outcome_is_rendered() {
        let mut app = App::new();
        let scan = app.handle_input("scan example.com".to_string()).unwrap();
        app.apply_outcome(scan.ticket, Ok(result_for("example.com")));

        assert!(!app.session().is_scanning());
        assert!(app.output().iter().any(|l| l.contains("91% trust")));
        assert!(app.output().iter().any(|l| l.contains("SCAM SAVER TRUST REPORT")));
    }

    #[test]
    fn test_failure_shows_generic_message() {
        let mut app = App::new();
        let scan = app.handle_input("scan broken.example".to_string()).unwrap();
        app.apply_outcome(
            scan.ticket,
            Err(AnalysisError::SchemaViolation("bad".to_string())),
        );

        let last = app.output().last().unwrap();
        assert_eq!(last, &format!("✗ {}", USER_FACING_FAILURE));
    }

    #[test]
    fn test_superseded_outcome_is_ignored() {
        let mut app = App::new();
        let first = app.handle_input("scan slow.example".to_string()).unwrap();
        let second = app.handle_input("scan fast.example".to_string()).unwrap();

        app.apply_outcome(second.ticket, Ok(result_for("fast.example")));
        let lines_before = app.output().len();
        app.apply_outcome(first.ticket, Ok(result_for("slow.example")));

        assert_eq!(app.output().len(), lines_before);
        match app.session().state() {
            ViewState::Complete(result) => assert_eq!(result.url, "fast.example"),
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn test_history_navigation() {
        let mut app = App::new();
        app.handle_input("help".to_string());
        app.handle_input("clear".to_string());

        app.input = "draft".to_string();
        app.navigate_history_backward();
        assert_eq!(app.input, "clear");
        app.navigate_history_backward();
        assert_eq!(app.input, "help");
        app.navigate_history_backward();
        assert_eq!(app.input, "help");

        app.navigate_history_forward();
        assert_eq!(app.input, "clear");
        app.navigate_history_forward();
        assert_eq!(app.input, "draft");
    }

    fn filled_app(lines: usize) -> App {
        let mut app = App::new();
        app.output.clear();
        for i in 0..lines {
            app.add_output(format!("line {}", i));
        }
        app
    }

    fn top_row(app: &App) -> String {
        use ratatui::backend::TestBackend;

        let mut terminal = Terminal::new(TestBackend::new(40, 14)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..40)
            .map(|x| buffer[(x, 0)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_output_follows_newest_lines() {
        let app = filled_app(200);
        assert_eq!(app.first_visible_line(10), 190);
        assert_eq!(top_row(&app), "line 190");
    }

    #[test]
    fn test_page_up_reveals_older_output() {
        let mut app = filled_app(200);
        app.scroll_up(SCROLL_PAGE, 10);
        assert_eq!(top_row(&app), "line 180");

        app.scroll_down(SCROLL_PAGE);
        assert_eq!(top_row(&app), "line 190");
    }

    #[test]
    fn test_scroll_stops_at_first_line() {
        let mut app = filled_app(200);
        for _ in 0..50 {
            app.scroll_up(SCROLL_PAGE, 10);
        }
        assert_eq!(app.first_visible_line(10), 0);
        assert_eq!(top_row(&app), "line 0");

        app.scroll_down(SCROLL_PAGE);
        assert_eq!(top_row(&app), "line 10");
    }

    #[test]
    fn test_scroll_down_past_bottom_stays_pinned() {
        let mut app = filled_app(200);
        app.scroll_down(SCROLL_PAGE);
        assert_eq!(app.first_visible_line(10), 190);
    }

    #[test]
    fn test_new_output_returns_to_bottom() {
        let mut app = filled_app(200);
        app.scroll_up(SCROLL_PAGE * 3, 10);
        app.add_output("line 200");
        assert_eq!(top_row(&app), "line 191");
    }

    #[test]
    fn test_scroll_with_short_output() {
        let mut app = filled_app(4);
        app.scroll_up(SCROLL_PAGE, 10);
        assert_eq!(app.first_visible_line(10), 0);
        assert_eq!(top_row(&app), "line 0");
    }

    #[test]
    fn test_empty_answer_declines_saving_history() {
        let mut app = App::new();
        app.handle_input("help".to_string());
        app.handle_input("exit".to_string());
        assert!(!app.should_quit());

        app.handle_input(String::new());
        assert!(app.should_quit());
        assert_eq!(app.output().last().unwrap(), "History not saved.");
    }

    #[test]
    fn test_scan_without_url_adds_no_output() {
        let mut app = App::new();
        app.handle_input("scan   ".to_string());
        assert_eq!(app.output().last().unwrap(), "> scan   ");
    }

    #[test]
    fn test_force_quit() {
        let mut app = App::new();
        app.handle_input(":q!".to_string());
        assert!(app.should_quit());
    }

    #[test]
    fn test_unknown_command() {
        let mut app = App::new();
        app.handle_input("crawl example.com".to_string());
        assert!(app.output().iter().any(|l| l == "Unknown command: crawl"));
    }
}
