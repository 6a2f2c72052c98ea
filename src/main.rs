use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use tajamaster::app::{App, AppScreen, NoticeLevel};
use tajamaster::config::Config;
use tajamaster::event::{AppEvent, EventHandler};
use tajamaster::narration::{CommandNarrator, Narrator, SilentNarrator};
use tajamaster::session::{CommitKey, SessionState};
use tajamaster::store::{FileKvStore, KeyValueStore, MemoryKvStore};
use tajamaster::ui::components::menu::ListMenuView;
use tajamaster::ui::components::progress_bar::{ProgressBar, format_clock};
use tajamaster::ui::components::stats_sidebar::StatsSidebar;
use tajamaster::ui::components::summary::SummaryDialog;
use tajamaster::ui::components::typing_area::TypingArea;
use tajamaster::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use tajamaster::ui::theme::Theme;
use tajamaster::words::{ListResolver, available_lists};

#[derive(Parser)]
#[command(name = "tajamaster", version, about = "Terminal vocabulary typing trainer")]
struct Cli {
    #[arg(short, long, help = "Word list name, JSON file path or URL")]
    list: Option<String>,

    #[arg(short, long, help = "Session length in seconds")]
    secs: Option<u32>,

    #[arg(long, help = "Number of words drawn into the practice pool")]
    pool_size: Option<usize>,

    #[arg(long, help = "Practise the whole list instead of a sample")]
    full_pool: bool,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Text-to-speech command, e.g. \"espeak -s 140\"")]
    narrate: Option<String>,

    #[arg(long, help = "Keep statistics in memory only")]
    no_persist: bool,

    #[arg(long, help = "Log level (error, warn, info, debug, trace)")]
    log_level: Option<String>,

    #[arg(long, help = "Print the available word lists and exit")]
    list_lists: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(list) = &self.list {
            config.default_list = list.clone();
        }
        if let Some(secs) = self.secs {
            config.session_secs = secs;
        }
        if let Some(size) = self.pool_size {
            config.pool_size = size;
        }
        if self.full_pool {
            config.full_pool = true;
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(cmd) = &self.narrate {
            config.narration_command = Some(cmd.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.normalize();
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let path = Path::new(&config.log_file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {e}", path.display()))?;

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Warn));
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    builder.try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {e}");
        Config::default()
    });
    cli.apply(&mut config);

    if cli.list_lists {
        for name in available_lists(&config.list_dir()) {
            println!("{name}");
        }
        return Ok(());
    }

    init_logging(&config)?;
    info!("starting tajamaster");

    let store: Box<dyn KeyValueStore> = if cli.no_persist {
        Box::new(MemoryKvStore::new())
    } else {
        match FileKvStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("statistics will not be saved: {e}");
                Box::new(MemoryKvStore::new())
            }
        }
    };
    let narrator: Box<dyn Narrator> = match config
        .narration_command
        .as_deref()
        .and_then(CommandNarrator::parse)
    {
        Some(narrator) => Box::new(narrator),
        None => Box::new(SilentNarrator),
    };
    let theme: &'static Theme = Box::leak(Box::new(Theme::load_or_default(&config.theme)));
    let resolver = ListResolver::new(config.list_dir());
    let default_list = config.default_list.clone();

    let mut app = App::new(config, store, narrator, theme);
    app.request_list(&default_list);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let result = run_app(&mut terminal, &mut app, &events, &resolver);

    app.controller.save_stats();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    resolver: &ListResolver,
) -> Result<()> {
    loop {
        if let Some(list_id) = app.take_load_request() {
            events.load_list(resolver.clone(), list_id);
        }

        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::ListLoaded { list_id, result } => app.on_list_loaded(&list_id, result),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
        app.poll(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::ListSelect => handle_list_key(app, key),
        AppScreen::Practice => match app.state() {
            SessionState::Idle => handle_idle_key(app, key),
            SessionState::Running => handle_running_key(app, key),
            SessionState::Ended => handle_ended_key(app, key),
        },
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.choose_selected_list(),
        KeyCode::Esc => app.screen = AppScreen::Practice,
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn handle_idle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => app.start(Instant::now()),
        KeyCode::Char('l') => app.open_lists(),
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn handle_running_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.reset(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.commit(CommitKey::Enter, Instant::now()),
        KeyCode::Char(' ') => app.commit(CommitKey::Space, Instant::now()),
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.type_char(ch)
        }
        _ => {}
    }
}

fn handle_ended_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.reset(),
        KeyCode::Char('l') => {
            app.reset();
            app.open_lists();
        }
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::ListSelect => render_list_select(frame, app),
        AppScreen::Practice => render_practice(frame, app),
    }
}

fn render_list_select(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let menu_area = centered_rect(50, 80, layout[0]);
    let view = ListMenuView::new(
        &app.menu,
        app.controller.loading(),
        app.load_error(),
        app.theme,
    );
    frame.render_widget(view, menu_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [↑↓/jk] Move  [Enter] Load  [Esc] Back  [q] Quit ",
        Style::default().fg(colors.text_pending()),
    )));
    frame.render_widget(footer, layout[1]);
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let controller = &app.controller;
    let app_layout = AppLayout::new(area);
    let session = controller.session();

    let list_name = controller
        .loading()
        .or(controller.list().map(|l| l.id.as_str()))
        .unwrap_or("no list");
    let (score, words, accuracy) = session
        .map(|s| (s.score, s.words_completed, s.tracker.accuracy_label()))
        .unwrap_or((0, 0, "100%".to_string()));
    let header_info = format!(
        " {list_name} | {} | Score {score} | Words {words} | Accuracy {accuracy}",
        format_clock(controller.seconds_remaining())
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " tajamaster ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ),
    ]))
    .block(Block::default().style(Style::default().bg(colors.header_bg())));
    frame.render_widget(header, app_layout.header);

    let word = app.current_word();
    let (main_area, details_area) = match app_layout.sidebar {
        Some(sidebar) => (app_layout.main, sidebar),
        None => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(app_layout.main);
            (split[0], split[1])
        }
    };

    if let Some(word) = word {
        let target = word.chars();
        let input = app.input_chars();
        let statuses = app.statuses();
        let typing = TypingArea::new(
            &target,
            &input,
            &statuses,
            controller.sink().last_result,
            app.theme,
        );
        frame.render_widget(typing, main_area);
    } else {
        let message = if let Some(id) = controller.loading() {
            format!("Loading '{id}'...")
        } else if let Some(list) = controller.list() {
            format!("{} words in '{}'. Press Enter to start.", list.len(), list.id)
        } else {
            "No word list loaded. Press l to choose one.".to_string()
        };
        let idle = Paragraph::new(vec![Line::from(""), Line::from(message)])
            .alignment(Alignment::Center)
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
        frame.render_widget(idle, main_area);
    }

    let sidebar = StatsSidebar::new(
        word,
        controller.current_stat(),
        controller.sink().reset_notice.as_deref(),
        app.theme,
    );
    frame.render_widget(sidebar, details_area);

    if let Some(progress_area) = app_layout.progress {
        let total = controller.settings().session_secs.max(1);
        let remaining = controller.seconds_remaining();
        let ratio = if session.is_some() {
            remaining as f64 / total as f64
        } else {
            1.0
        };
        let bar = ProgressBar::new("Time", format_clock(remaining), ratio, app.theme);
        frame.render_widget(bar, progress_area);
    }

    let hints: &[&str] = match controller.state() {
        SessionState::Idle => &["[Enter/s] Start", "[l] Lists", "[q] Quit"],
        SessionState::Running => &["[Space/Enter] Submit", "[Backspace] Delete", "[Esc] Reset"],
        SessionState::Ended => &["[Enter/Esc] Close", "[l] Lists", "[q] Quit"],
    };
    let notice_line = match app.notice() {
        Some(n) => {
            let color = match n.level {
                NoticeLevel::Info => colors.muted(),
                NoticeLevel::Warning => colors.warning(),
                NoticeLevel::Error => colors.error(),
            };
            Line::from(Span::styled(format!(" {}", n.text), Style::default().fg(color)))
        }
        None => Line::from(""),
    };
    let hint_line = pack_hint_lines(hints, app_layout.footer.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(vec![
        notice_line,
        Line::from(Span::styled(hint_line, Style::default().fg(colors.text_pending()))),
    ]);
    frame.render_widget(footer, app_layout.footer);

    if controller.state() == SessionState::Ended
        && let Some(summary) = controller.summary()
    {
        let dialog_area = centered_rect(50, 60, area);
        frame.render_widget(SummaryDialog::new(summary, app.theme), dialog_area);
    }
}
