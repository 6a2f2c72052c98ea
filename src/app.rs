use std::time::Instant;

use log::{info, warn};

use crate::config::Config;
use crate::engine::word_stats::WordStat;
use crate::error::{LoadError, SessionError};
use crate::narration::Narrator;
use crate::session::{
    CharStatus, CommitKey, PresentationSink, SessionController, SessionState, SessionSummary,
};
use crate::store::KeyValueStore;
use crate::ui::components::menu::ListMenu;
use crate::ui::theme::Theme;
use crate::words::{Word, WordList, available_lists};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    ListSelect,
    Practice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Collects controller notifications for the terminal and drives narration.
pub struct TerminalSink {
    pub notice: Option<Notice>,
    pub reset_notice: Option<String>,
    pub last_result: Option<bool>,
    narrator: Box<dyn Narrator>,
}

impl TerminalSink {
    pub fn new(narrator: Box<dyn Narrator>) -> Self {
        Self {
            notice: None,
            reset_notice: None,
            last_result: None,
            narrator,
        }
    }

    fn notify(&mut self, level: NoticeLevel, text: String) {
        self.notice = Some(Notice { level, text });
    }
}

impl PresentationSink for TerminalSink {
    fn list_loaded(&mut self, list: &WordList) {
        self.reset_notice = None;
        self.notify(
            NoticeLevel::Info,
            format!("Loaded {} words from '{}'", list.len(), list.id),
        );
    }

    fn load_failed(&mut self, list_id: &str, error: &LoadError) {
        self.notify(
            NoticeLevel::Error,
            format!("Could not load '{list_id}': {error}"),
        );
    }

    fn word_presented(&mut self, word: &Word, _stat: WordStat) {
        self.last_result = None;
        self.narrator.speak(&word.word);
    }

    fn stat_reset(&mut self, word: &str, stat: WordStat) {
        self.reset_notice = Some(format!(
            "'{word}' reached its appearance limit (reset {} times)",
            stat.reset_count
        ));
    }

    fn word_completed(&mut self, _word: &Word, correct: bool, _score: u32) {
        self.last_result = Some(correct);
    }

    fn session_ended(&mut self, _summary: &SessionSummary) {
        self.narrator.cancel();
    }

    fn warning(&mut self, message: &str) {
        self.notify(NoticeLevel::Warning, message.to_string());
    }
}

pub struct App {
    pub screen: AppScreen,
    pub controller: SessionController<TerminalSink>,
    pub menu: ListMenu,
    pub theme: &'static Theme,
    pub config: Config,
    pub should_quit: bool,
    load_request: Option<String>,
}

impl App {
    pub fn new(
        config: Config,
        store: Box<dyn KeyValueStore>,
        narrator: Box<dyn Narrator>,
        theme: &'static Theme,
    ) -> Self {
        let controller =
            SessionController::new(config.session_settings(), store, TerminalSink::new(narrator));
        Self::with_controller(config, controller, theme)
    }

    pub fn with_controller(
        config: Config,
        controller: SessionController<TerminalSink>,
        theme: &'static Theme,
    ) -> Self {
        let menu = ListMenu::new(
            available_lists(&config.list_dir()),
            Some(&config.default_list),
        );
        Self {
            screen: AppScreen::Practice,
            controller,
            menu,
            theme,
            config,
            should_quit: false,
            load_request: None,
        }
    }

    /// Ask to switch lists. On success a load request is queued for the event
    /// loop to pick up with [`take_load_request`](Self::take_load_request).
    pub fn request_list(&mut self, list_id: &str) {
        match self.controller.select_list(list_id) {
            Ok(()) => {
                self.load_request = Some(list_id.to_string());
                self.controller.sink_mut().notice = None;
            }
            Err(SessionError::ListChangeWhileRunning) => {}
            Err(e) => self.warn(&e.to_string()),
        }
    }

    pub fn take_load_request(&mut self) -> Option<String> {
        self.load_request.take()
    }

    pub fn on_list_loaded(&mut self, list_id: &str, result: Result<Vec<Word>, LoadError>) {
        let failed = result.is_err();
        self.controller.finish_load(list_id, result);
        if !failed && self.controller.list().is_some_and(|l| l.id == list_id) {
            self.screen = AppScreen::Practice;
        }
    }

    pub fn start(&mut self, now: Instant) {
        if let Err(e) = self.controller.start(now) {
            self.warn(&e.to_string());
        } else {
            self.controller.sink_mut().notice = None;
        }
    }

    pub fn type_char(&mut self, ch: char) {
        self.controller.type_char(ch);
    }

    pub fn backspace(&mut self) {
        self.controller.backspace();
    }

    pub fn commit(&mut self, key: CommitKey, now: Instant) {
        self.controller.commit(key, now);
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.controller.sink_mut().last_result = None;
    }

    pub fn open_lists(&mut self) {
        if self.controller.state() == SessionState::Running {
            self.warn("Finish or reset the session before changing lists");
            return;
        }
        self.menu = ListMenu::new(
            available_lists(&self.config.list_dir()),
            self.controller.list().map(|l| l.id.as_str()),
        );
        self.screen = AppScreen::ListSelect;
    }

    pub fn choose_selected_list(&mut self) {
        if let Some(id) = self.menu.selected_item().map(str::to_string) {
            self.request_list(&id);
        }
    }

    pub fn poll(&mut self, now: Instant) {
        self.controller.poll(now);
    }

    /// Save statistics and stop the event loop.
    pub fn quit(&mut self) {
        info!("quitting");
        self.controller.save_stats();
        self.should_quit = true;
    }

    fn warn(&mut self, message: &str) {
        warn!("{message}");
        self.controller.sink_mut().warning(message);
    }

    // -----------------------------------------------------------------------
    // View helpers
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.controller.sink().notice.as_ref()
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.controller.session()?.current.as_ref()
    }

    pub fn input_chars(&self) -> Vec<char> {
        self.controller
            .session()
            .map(|s| s.input.chars().collect())
            .unwrap_or_default()
    }

    pub fn statuses(&self) -> Vec<CharStatus> {
        self.controller
            .session()
            .map(|s| s.statuses())
            .unwrap_or_default()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.notice()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.text.as_str())
    }
}
