//! TUI front end showing probe results as they complete

use crate::proxy::{CheckerConfig, ProbeOutcome, ProxyChecker, ProxyEndpoint};
use crate::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Maximum number of recent outcomes to keep per list for display
const MAX_RECENT_OUTCOMES: usize = 100;

/// Probe TUI application state
pub struct ProbeApp {
    /// Endpoints to probe
    endpoints: Vec<ProxyEndpoint>,
    /// Engine configuration
    config: CheckerConfig,
    /// Total number of endpoints
    total: usize,
    /// Number of completed probes
    completed: usize,
    /// Number of working proxies found
    working_count: usize,
    /// Number of failed proxies found
    failed_count: usize,
    /// Recent working outcomes (VecDeque for O(1) push/pop)
    recent_working: VecDeque<ProbeOutcome>,
    /// Recent failed outcomes
    recent_failed: VecDeque<ProbeOutcome>,
    /// Selected list (0 = working, 1 = failed)
    selected_list: usize,
    /// Selected item in current list
    list_state: ListState,
    /// Status message
    status_message: String,
    /// Whether the batch is complete
    is_complete: bool,
    /// Whether the user wants to quit
    should_quit: bool,
}

impl ProbeApp {
    pub fn new(endpoints: Vec<ProxyEndpoint>, config: CheckerConfig) -> Self {
        let total = endpoints.len();
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            endpoints,
            config,
            total,
            completed: 0,
            working_count: 0,
            failed_count: 0,
            recent_working: VecDeque::new(),
            recent_failed: VecDeque::new(),
            selected_list: 0,
            list_state,
            status_message: "Probing proxies... Press 'q' to quit.".to_string(),
            is_complete: false,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal).await;

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

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let checker = ProxyChecker::with_config(self.config.clone());
        let mut rx = checker.check_proxies_stream(self.endpoints.clone());

        loop {
            terminal.draw(|f| self.ui(f))?;

            // Handle key events with a short timeout
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_input(key.code);
                        if self.should_quit {
                            break;
                        }
                    }
                }
            }

            self.drain_outcomes(&mut rx);
        }

        Ok(())
    }

    /// Drain every outcome already available, without blocking
    ///
    /// Fast batches can complete many probes per poll tick, so one redraw
    /// consumes everything that arrived since the last one.
    fn drain_outcomes(&mut self, rx: &mut mpsc::UnboundedReceiver<ProbeOutcome>) {
        loop {
            match rx.try_recv() {
                Ok(outcome) => self.record_outcome(outcome),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // Channel closed, batch complete
                    if !self.is_complete {
                        self.is_complete = true;
                        self.status_message = format!(
                            "Complete! Probed: {} | Working: {} | Failed: {} | Press 'q' to quit",
                            self.completed, self.working_count, self.failed_count
                        );
                    }
                    break;
                }
            }
        }
    }

    fn record_outcome(&mut self, outcome: ProbeOutcome) {
        self.completed += 1;

        if outcome.is_working() {
            self.working_count += 1;
            self.recent_working.push_back(outcome);
            if self.recent_working.len() > MAX_RECENT_OUTCOMES {
                self.recent_working.pop_front();
            }
        } else {
            self.failed_count += 1;
            self.recent_failed.push_back(outcome);
            if self.recent_failed.len() > MAX_RECENT_OUTCOMES {
                self.recent_failed.pop_front();
            }
        }

        let percentage = if self.total > 0 {
            (self.completed as f64 / self.total as f64 * 100.0) as u32
        } else {
            100
        };
        self.status_message = format!(
            "Probing... {}% ({}/{}) | Working: {} | Failed: {}",
            percentage, self.completed, self.total, self.working_count, self.failed_count
        );
    }

    fn handle_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                // Switch between working and failed lists
                self.selected_list = (self.selected_list + 1) % 2;
                self.list_state.select(Some(0));
            }
            KeyCode::Down => {
                let list = if self.selected_list == 0 {
                    &self.recent_working
                } else {
                    &self.recent_failed
                };
                let i = match self.list_state.selected() {
                    Some(i) => {
                        if i >= list.len().saturating_sub(1) {
                            0
                        } else {
                            i + 1
                        }
                    }
                    None => 0,
                };
                self.list_state.select(Some(i));
            }
            KeyCode::Up => {
                let list = if self.selected_list == 0 {
                    &self.recent_working
                } else {
                    &self.recent_failed
                };
                let i = match self.list_state.selected() {
                    Some(i) => {
                        if i == 0 {
                            list.len().saturating_sub(1)
                        } else {
                            i - 1
                        }
                    }
                    None => 0,
                };
                self.list_state.select(Some(i));
            }
            _ => {}
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Progress bar
                Constraint::Min(0),    // Outcome lists
                Constraint::Length(3), // Status bar
            ])
            .split(f.size());

        let title = Paragraph::new("Proxy Probe")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        let progress = if self.total > 0 {
            (self.completed as f64 / self.total as f64 * 100.0) as u16
        } else {
            100
        };
        let progress_label = format!("{}/{} ({}%)", self.completed, self.total, progress);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .percent(progress.min(100))
            .label(progress_label);
        f.render_widget(gauge, chunks[1]);

        // Two columns for working and failed outcomes
        let outcome_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        Self::render_outcome_list(
            f,
            outcome_chunks[0],
            "✔ Working",
            &self.recent_working,
            self.working_count,
            self.selected_list == 0,
            Color::Green,
            if self.selected_list == 0 {
                Some(&mut self.list_state)
            } else {
                None
            },
        );

        Self::render_outcome_list(
            f,
            outcome_chunks[1],
            "✖ Failed",
            &self.recent_failed,
            self.failed_count,
            self.selected_list == 1,
            Color::Red,
            if self.selected_list == 1 {
                Some(&mut self.list_state)
            } else {
                None
            },
        );

        let status = Paragraph::new(self.status_message.clone())
            .style(if self.is_complete {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            })
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(status, chunks[3]);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_outcome_list(
        f: &mut Frame,
        area: Rect,
        title: &str,
        outcomes: &VecDeque<ProbeOutcome>,
        total_count: usize,
        is_selected: bool,
        color: Color,
        list_state: Option<&mut ListState>,
    ) {
        let items: Vec<ListItem> = outcomes
            .iter()
            .rev() // Newest first
            .map(|outcome| {
                let content = match outcome.latency_secs() {
                    Some(secs) => format!(
                        "{} {} ({:.2}s)",
                        outcome.endpoint.proxy_type.label(),
                        outcome.endpoint.address(),
                        secs
                    ),
                    None => format!(
                        "{} {}",
                        outcome.endpoint.proxy_type.label(),
                        outcome.endpoint.address()
                    ),
                };
                ListItem::new(content).style(Style::default().fg(color))
            })
            .collect();

        let block_title = format!("{} ({})", title, total_count);
        let border_style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(block_title)
                    .border_style(border_style),
            )
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol(">> ");

        if let Some(state) = list_state {
            f.render_stateful_widget(list, area, state);
        } else {
            f.render_widget(list, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{ErrorKind, ProxyType};

    fn endpoint(i: usize) -> ProxyEndpoint {
        ProxyEndpoint::new(format!("10.0.0.{}", i), 8080, ProxyType::Http)
    }

    #[tokio::test]
    async fn test_drain_consumes_every_available_outcome() {
        let endpoints: Vec<_> = (0..100).map(endpoint).collect();
        let mut app = ProbeApp::new(endpoints, CheckerConfig::new());

        let (tx, mut rx) = mpsc::unbounded_channel();
        for i in 0..100 {
            let outcome = if i % 2 == 0 {
                ProbeOutcome::working(endpoint(i), Duration::from_millis(100))
            } else {
                ProbeOutcome::failed(endpoint(i), ErrorKind::Timeout)
            };
            tx.send(outcome).unwrap();
        }

        // A single drain picks up the whole backlog, not one outcome per tick
        app.drain_outcomes(&mut rx);
        assert_eq!(app.completed, 100);
        assert_eq!(app.working_count, 50);
        assert_eq!(app.failed_count, 50);
        assert!(!app.is_complete);

        drop(tx);
        app.drain_outcomes(&mut rx);
        assert!(app.is_complete);
        assert!(app.status_message.starts_with("Complete!"));
    }

    #[tokio::test]
    async fn test_drain_on_empty_channel_is_a_no_op() {
        let mut app = ProbeApp::new(vec![endpoint(0)], CheckerConfig::new());
        let (_tx, mut rx) = mpsc::unbounded_channel::<ProbeOutcome>();

        app.drain_outcomes(&mut rx);
        assert_eq!(app.completed, 0);
        assert!(!app.is_complete);
    }
}
