use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use door_raid::snapshot::ActionIndex;
use door_raid::view::{CardFace, Connection, Controls, Highlight, View};
use door_raid::{load_config, Config, Controller, GameBackend, HttpBackend, Timings};

const TICK: Duration = Duration::from_millis(50);
const CLOSED_NOTICE: Duration = Duration::from_secs(2);
const HELP_LINE: &str =
    "1-3/←→+Enter 选择  •  r 重新开始  •  x 退出游戏  •  PgUp/PgDn 日志  •  q 离开";

#[derive(Debug, Parser)]
#[command(name = "door-raid", about = "Terminal client for the door adventure server")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, default_value = "door-raid.toml")]
    config: PathBuf,
    /// Game server base URL, e.g. http://127.0.0.1:5000
    #[arg(long)]
    server: Option<String>,
    #[arg(long)]
    reveal_delay_ms: Option<u64>,
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(delay) = self.reveal_delay_ms {
            config.reveal_delay_ms = delay;
        }
        if let Some(path) = &self.log_file {
            config.log_file = path.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Activate(ActionIndex),
    ActivateFocused,
    FocusPrev,
    FocusNext,
    Restart,
    Terminate,
    ScrollUp,
    ScrollDown,
    Quit,
}

fn command_for(key: KeyEvent) -> Option<Command> {
    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Command::Quit,
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Command::Quit,
        (KeyCode::Char(c @ '1'..='3'), _) => {
            Command::Activate(ActionIndex::new(c as usize - '1' as usize)?)
        }
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Command::FocusPrev,
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Command::FocusNext,
        (KeyCode::Enter, _) | (KeyCode::Char(' '), _) => Command::ActivateFocused,
        (KeyCode::Char('r'), _) => Command::Restart,
        (KeyCode::Char('x'), _) => Command::Terminate,
        (KeyCode::PageUp, _) => Command::ScrollUp,
        (KeyCode::PageDown, _) => Command::ScrollDown,
        _ => return None,
    };
    Some(command)
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;
    let writer = Mutex::new(file);

    // The terminal belongs to the UI, so logs always go to the file.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .compact()
            .init();
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
        previous(info);
    }));
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    args.apply(&mut config);
    init_tracing(&config)?;
    tracing::info!(server = %config.server_url, "starting door-raid");

    let backend = HttpBackend::new(config.server_url.clone(), config.request_timeout())?;
    let mut controller = Controller::new(backend, Timings::from(&config));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    controller.refresh();
    let result = run(&mut terminal, &mut controller);

    restore_terminal()?;
    result?;

    if controller.is_closed() {
        println!("\n游戏已退出，服务器已关闭。\n");
    }
    Ok(())
}

fn run<B: GameBackend>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut Controller<B>,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, controller.view()))?;

        if controller.is_closed() {
            std::thread::sleep(CLOSED_NOTICE);
            return Ok(());
        }

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let now = Instant::now();
                    match command_for(key) {
                        Some(Command::Quit) => return Ok(()),
                        Some(Command::Activate(index)) => controller.activate(index, now),
                        Some(Command::ActivateFocused) => controller.activate_focused(now),
                        Some(Command::FocusPrev) => controller.focus_prev(),
                        Some(Command::FocusNext) => controller.focus_next(),
                        Some(Command::Restart) => controller.restart_session(),
                        Some(Command::Terminate) => controller.terminate_session(now),
                        Some(Command::ScrollUp) => controller.scroll_log_up(3),
                        Some(Command::ScrollDown) => controller.scroll_log_down(3),
                        None => {}
                    }
                }
            }
        }

        controller.tick(Instant::now());
    }
}

fn draw_ui(f: &mut Frame, view: &View) {
    if view.closed {
        draw_closed_screen(f, view);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    // Status bar
    let (connection_text, connection_color) = match &view.connection {
        Connection::Pending => (" 连接中 ", Color::DarkGray),
        Connection::Connected => (" 在线 ", Color::Green),
        Connection::Disconnected(_) => (" 连接断开 ", Color::Red),
    };
    let status = Line::from(vec![
        Span::styled(
            " DOOR RAID ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(view.status.clone(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            connection_text,
            Style::default().fg(Color::Black).bg(connection_color),
        ),
    ]);
    let status_block = Paragraph::new(status).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status_block, chunks[0]);

    render_scene(f, view, chunks[1]);
    render_controls(f, view, chunks[2]);
    render_log(f, view, chunks[3]);

    let help = Paragraph::new(HELP_LINE)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}

fn render_scene(f: &mut Frame, view: &View, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(
            view.glyph,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(view.description.as_str()),
    ];
    if let Some(monster) = &view.monster_line {
        lines.push(Line::from(Span::styled(
            monster.as_str(),
            Style::default().fg(Color::Red),
        )));
    }
    let scene = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" 场景 "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(scene, halves[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(2)])
        .split(halves[1]);

    let hp_color = match view.hp.ratio() {
        r if r > 0.5 => Color::Green,
        r if r > 0.2 => Color::Yellow,
        _ => Color::Red,
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" HP "))
        .gauge_style(Style::default().fg(hp_color))
        .ratio(view.hp.ratio())
        .label(format!("{}/{}", view.hp.current, view.hp.max));
    f.render_widget(gauge, side[0]);

    let inventory = Paragraph::new(view.inventory.as_str())
        .block(Block::default().borders(Borders::ALL).title(" 道具 "))
        .wrap(Wrap { trim: false });
    f.render_widget(inventory, side[1]);
}

fn control_style(view: &View, position: usize) -> Style {
    if !view.controls_enabled {
        Style::default().fg(Color::DarkGray)
    } else if position == view.focus {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_controls(f: &mut Frame, view: &View, area: Rect) {
    let count = view.controls.len();
    if count == 0 {
        let empty = Paragraph::new("当前没有可选的行动")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    }

    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, count as u32); count])
        .split(area);

    match &view.controls {
        Controls::Buttons(buttons) => {
            for (position, button) in buttons.iter().enumerate() {
                let widget = Paragraph::new(button.label.as_str())
                    .style(control_style(view, position))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(format!(" [{}] ", button.index.get() + 1)),
                    )
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                f.render_widget(widget, slots[position]);
            }
        }
        Controls::Cards(cards) => {
            for (position, card) in cards.iter().enumerate() {
                let (face, style) = match card.face {
                    CardFace::Closed => ("🚪", control_style(view, position)),
                    CardFace::Revealed(glyph) => (
                        glyph,
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Magenta)
                            .add_modifier(Modifier::BOLD),
                    ),
                };
                let mut lines = vec![Line::from(face)];
                if let Some(hint) = &card.hint {
                    lines.push(Line::from(Span::styled(
                        hint.as_str(),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )));
                }
                let widget = Paragraph::new(lines)
                    .style(style)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(format!(" 门 {} ", card.index.get() + 1)),
                    )
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                f.render_widget(widget, slots[position]);
            }
        }
    }
}

fn highlight_style(highlight: Highlight) -> Style {
    match highlight {
        Highlight::Plain => Style::default(),
        Highlight::Round => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        Highlight::Damage => Style::default().fg(Color::Red),
        Highlight::Heal => Style::default().fg(Color::Green),
        Highlight::Gold => Style::default().fg(Color::Yellow),
        Highlight::Item => Style::default().fg(Color::Magenta),
    }
}

fn render_log(f: &mut Frame, view: &View, area: Rect) {
    let lines: Vec<Line> = view
        .log
        .entries()
        .iter()
        .map(|entry| {
            Line::from(
                entry
                    .spans
                    .iter()
                    .map(|span| Span::styled(span.text.as_str(), highlight_style(span.highlight)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let height = area.height.saturating_sub(2) as usize;
    let top = lines
        .len()
        .saturating_sub(height)
        .saturating_sub(view.log.scroll_back());
    let title = if view.log.scroll_back() > 0 {
        " 冒险日志 [PgDn 回到最新] "
    } else {
        " 冒险日志 "
    };
    let log = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));
    f.render_widget(log, area);
}

fn draw_closed_screen(f: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(5),
            Constraint::Min(1),
        ])
        .split(f.area());

    let last = view
        .log
        .entries()
        .back()
        .map(|entry| entry.text())
        .unwrap_or_default();
    let notice = Paragraph::new(vec![
        Line::from(Span::styled(
            "SESSION CLOSED",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from("游戏已关闭，可以关闭此终端了"),
        Line::from(Span::styled(last, Style::default().fg(Color::DarkGray))),
    ])
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(notice, chunks[1]);
}
