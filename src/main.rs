use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
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
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use parlay_terminal::batch::{load_matches, predict_batch};
use parlay_terminal::config::Config;
use parlay_terminal::logging;
use parlay_terminal::report::{format_parlay, format_prediction, pct};
use parlay_terminal::slip::{Pane, SlipState, visible_range};
use parlay_terminal::win_prob::Predictor;

struct App {
    state: SlipState,
    should_quit: bool,
}

impl App {
    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.state.toggle_pane(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    logging::init_quiet();

    let matches_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/matches.json"));

    let config = Config::from_env()?;
    let store = config.load_features()?;
    let calibration = config.load_calibration()?;
    let inputs = load_matches(&matches_path)?;
    if inputs.len() > config.max_matches {
        bail!(
            "{} matches exceeds PARLAY_MAX_MATCHES={}",
            inputs.len(),
            config.max_matches
        );
    }

    let predictor = Predictor::new(&store, &calibration).with_top_n(config.top_n);
    let outcome = predict_batch(&predictor, &inputs, config.batch_policy)?;
    let mut app = App {
        state: SlipState::new(&inputs, outcome),
        should_quit: false,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal loop failed")
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
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);
    render_list(frame, body[0], &app.state);
    render_detail(frame, body[1], &app.state);

    let footer = Paragraph::new(
        "Tab Matches/Parlays | j/k/↑/↓ Move | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &SlipState) -> String {
    let pane = match state.pane {
        Pane::Matches => "Matches",
        Pane::Parlays => "Parlays",
    };
    let best = state
        .parlays
        .first()
        .map(|p| format!("best parlay EV {:+.4} @ {:.2}", p.expected_value, p.total_odds))
        .unwrap_or_else(|| "no parlays".to_string());
    let last_log = state.logs.back().cloned().unwrap_or_default();
    format!("PARLAY SLIP | {pane} | {best}\n{last_log}")
}

fn render_list(frame: &mut Frame, area: Rect, state: &SlipState) {
    let (title, rows, selected) = match state.pane {
        Pane::Matches => (
            "Matches",
            state
                .predictions
                .iter()
                .map(|p| {
                    format!(
                        "{:<28} {} {:+.3}",
                        p.match_label(),
                        p.best_bet,
                        p.best_ev
                    )
                })
                .collect::<Vec<_>>(),
            state.selected_match,
        ),
        Pane::Parlays => (
            "Parlays",
            state
                .parlays
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    format!(
                        "#{:<4} EV {:+.4}  odds {:>8.2}  p {}",
                        i + 1,
                        c.expected_value,
                        c.total_odds,
                        pct(c.total_prob)
                    )
                })
                .collect::<Vec<_>>(),
            state.selected_parlay,
        ),
    };

    let block = Block::default().title(title).borders(Borders::ALL);
    if rows.is_empty() {
        let empty = Paragraph::new("Nothing to show")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_range(selected, rows.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let style = if idx == selected {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(rows[idx].clone(), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &SlipState) {
    let text = match state.pane {
        Pane::Matches => state
            .selected_prediction()
            .map(|p| format_prediction(state.selected_match, p)),
        Pane::Parlays => state.selected_parlay().map(|c| {
            format!(
                "Rank #{} (avg leg EV {:+.4})\n{}",
                state.selected_parlay + 1,
                c.avg_leg_ev(),
                format_parlay(c)
            )
        }),
    }
    .unwrap_or_default();

    let detail = Paragraph::new(text)
        .block(Block::default().title("Detail").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Parlay Slip - Help",
        "",
        "  Tab          Switch Matches / Parlays",
        "  j/k or ↑/↓   Move selection",
        "  ?            Toggle help",
        "  Esc          Close help",
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
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
