use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::engine::scoring::{self, DEFAULT_POINTS_PER_WORD};
use crate::engine::selector::{DEFAULT_RESET_PENALTY, WeightedSelector};
use crate::engine::word_stats::{DEFAULT_RESET_THRESHOLD, WordStat, WordStatsStore};
use crate::error::{LoadError, SessionError};
use crate::session::input::{CharStatus, CommitKey, MatchTracker, classify};
use crate::session::result::{EndReason, SessionSummary};
use crate::session::timer::{Countdown, CountdownStatus, ScheduledTask};
use crate::store::KeyValueStore;
use crate::words::{Word, WordList, derive_practice_pool};

/// When an appearance is counted against a word's statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    Presentation,
    Completion,
    #[default]
    Both,
}

impl RecordPolicy {
    fn on_presentation(self) -> bool {
        matches!(self, Self::Presentation | Self::Both)
    }

    fn on_completion(self) -> bool {
        matches!(self, Self::Completion | Self::Both)
    }
}

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub session_secs: u32,
    /// `None` practises the whole list.
    pub pool_size: Option<usize>,
    pub repeat_words: bool,
    pub reset_threshold: u32,
    pub reset_penalty: f64,
    pub advance_delay: Duration,
    pub points_per_word: u32,
    pub record_policy: RecordPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_secs: 300,
            pool_size: Some(100),
            repeat_words: true,
            reset_threshold: DEFAULT_RESET_THRESHOLD,
            reset_penalty: DEFAULT_RESET_PENALTY,
            advance_delay: Duration::from_millis(500),
            points_per_word: DEFAULT_POINTS_PER_WORD,
            record_policy: RecordPolicy::Both,
        }
    }
}

/// Receives state changes from the controller. Every hook is optional.
pub trait PresentationSink {
    fn list_loaded(&mut self, _list: &WordList) {}
    fn load_failed(&mut self, _list_id: &str, _error: &LoadError) {}
    fn word_presented(&mut self, _word: &Word, _stat: WordStat) {}
    fn stat_reset(&mut self, _word: &str, _stat: WordStat) {}
    fn input_changed(&mut self, _input: &str, _statuses: &[CharStatus]) {}
    fn word_completed(&mut self, _word: &Word, _correct: bool, _score: u32) {}
    fn timer_ticked(&mut self, _remaining: u32) {}
    fn session_ended(&mut self, _summary: &SessionSummary) {}
    fn warning(&mut self, _message: &str) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No session is running.
    Ignored,
    /// Input was shorter than the word; space went in as a character.
    InsertedSpace,
    /// Input was shorter than the word; enter does nothing.
    Suppressed,
    Completed { correct: bool },
    /// The word was already completed and is waiting to advance.
    AlreadyPending,
}

/// Counters and current word of one practice run.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub score: u32,
    pub words_completed: u32,
    pub tracker: MatchTracker,
    pub current: Option<Word>,
    pub input: String,
    pub pool: Vec<Word>,
}

impl Session {
    pub fn statuses(&self) -> Vec<CharStatus> {
        let input: Vec<char> = self.input.chars().collect();
        let target = self.current.as_ref().map(Word::chars).unwrap_or_default();
        classify(&input, &target)
    }
}

pub struct SessionController<S: PresentationSink = NullSink> {
    settings: SessionSettings,
    selector: WeightedSelector,
    store: Box<dyn KeyValueStore>,
    sink: S,
    rng: SmallRng,
    state: SessionState,
    loading: Option<String>,
    list: Option<WordList>,
    stats: WordStatsStore,
    session: Option<Session>,
    countdown: Countdown,
    pending_advance: ScheduledTask<()>,
    summary: Option<SessionSummary>,
}

impl<S: PresentationSink> SessionController<S> {
    pub fn new(settings: SessionSettings, store: Box<dyn KeyValueStore>, sink: S) -> Self {
        Self::with_rng(settings, store, sink, SmallRng::from_entropy())
    }

    pub fn with_rng(
        settings: SessionSettings,
        store: Box<dyn KeyValueStore>,
        sink: S,
        rng: SmallRng,
    ) -> Self {
        Self {
            selector: WeightedSelector::new(settings.reset_penalty),
            settings,
            store,
            sink,
            rng,
            state: SessionState::Idle,
            loading: None,
            list: None,
            stats: WordStatsStore::default(),
            session: None,
            countdown: Countdown::inactive(),
            pending_advance: ScheduledTask::default(),
            summary: None,
        }
    }

    // -----------------------------------------------------------------------
    // Word lists
    // -----------------------------------------------------------------------

    /// Begin switching to `list_id`. The caller performs the load and hands
    /// the result to [`finish_load`](Self::finish_load).
    pub fn select_list(&mut self, list_id: &str) -> Result<(), SessionError> {
        if self.state == SessionState::Running {
            let err = SessionError::ListChangeWhileRunning;
            warn!("refusing to switch to '{list_id}': {err}");
            self.sink.warning(&err.to_string());
            return Err(err);
        }
        if self.loading.is_some() {
            return Err(SessionError::LoadInFlight);
        }

        self.reset();
        self.list = None;
        self.stats = WordStatsStore::default();
        self.loading = Some(list_id.to_string());
        info!("loading word list '{list_id}'");
        Ok(())
    }

    pub fn finish_load(&mut self, list_id: &str, result: Result<Vec<Word>, LoadError>) {
        if self.loading.as_deref() != Some(list_id) {
            debug!("ignoring stale load result for '{list_id}'");
            return;
        }
        self.loading = None;

        match result {
            Ok(words) => {
                let mut stats = WordStatsStore::load(self.store.as_ref(), list_id);
                stats.normalize(self.settings.reset_threshold);
                stats.ensure_all(&words);
                self.stats = stats;
                let list = WordList {
                    id: list_id.to_string(),
                    words,
                };
                info!("word list '{list_id}' ready with {} words", list.len());
                self.sink.list_loaded(&list);
                self.list = Some(list);
            }
            Err(e) => {
                warn!("failed to load word list '{list_id}': {e}");
                self.list = None;
                self.stats = WordStatsStore::default();
                self.sink.load_failed(list_id, &e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn start(&mut self, now: Instant) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::NotIdle);
        }
        if self.loading.is_some() {
            return Err(SessionError::LoadInFlight);
        }
        let Some(list) = self.list.as_ref().filter(|l| !l.is_empty()) else {
            return Err(SessionError::NoWords);
        };

        let size = self.settings.pool_size.unwrap_or(list.len());
        let pool = derive_practice_pool(&list.words, size, &mut self.rng);
        info!(
            "starting session on '{}' with {} of {} words",
            list.id,
            pool.len(),
            list.len()
        );

        self.session = Some(Session {
            pool,
            ..Session::default()
        });
        self.summary = None;
        self.pending_advance.cancel();
        self.countdown = Countdown::start(self.settings.session_secs, Duration::from_secs(1), now);
        self.state = SessionState::Running;
        self.sink.timer_ticked(self.settings.session_secs);

        self.present_next_word();
        Ok(())
    }

    /// Abandon the current session without a summary and return to idle.
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.pending_advance.cancel();
        if self.state != SessionState::Idle {
            info!("session reset");
        }
        self.save_stats();
        self.session = None;
        self.summary = None;
        self.state = SessionState::Idle;
    }

    /// Drive the countdown and the deferred word advance.
    pub fn poll(&mut self, now: Instant) {
        if self.state != SessionState::Running {
            return;
        }

        match self.countdown.poll(now) {
            CountdownStatus::Expired => {
                self.sink.timer_ticked(0);
                self.end(EndReason::TimeUp);
                return;
            }
            CountdownStatus::Ticked(remaining) => self.sink.timer_ticked(remaining),
            CountdownStatus::Running(_) | CountdownStatus::Inactive => {}
        }

        if self.pending_advance.take_due(now).is_some() {
            self.present_next_word();
        }
    }

    fn end(&mut self, reason: EndReason) {
        self.countdown.cancel();
        self.pending_advance.cancel();
        self.state = SessionState::Ended;

        let session = self.session.as_ref();
        let tracker = session.map(|s| s.tracker.clone()).unwrap_or_default();
        let summary = SessionSummary {
            list_id: self.list.as_ref().map(|l| l.id.clone()).unwrap_or_default(),
            total_typed: tracker.typed,
            total_errors: tracker.errors,
            accuracy: tracker.accuracy(),
            words_completed: session.map_or(0, |s| s.words_completed),
            score: session.map_or(0, |s| s.score),
            reason,
            ended_at: Utc::now(),
        };
        info!(
            "session ended ({:?}): {} words, score {}, accuracy {}",
            reason,
            summary.words_completed,
            summary.score,
            summary.accuracy_label()
        );

        self.save_stats();
        self.sink.session_ended(&summary);
        self.summary = Some(summary);
    }

    fn present_next_word(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(index) = self
            .selector
            .select_index(&session.pool, &self.stats, &mut self.rng)
        else {
            self.end(EndReason::PoolExhausted);
            return;
        };

        let word = if self.settings.repeat_words {
            session.pool[index].clone()
        } else {
            session.pool.remove(index)
        };
        session.input.clear();
        session.tracker.start_word();
        session.current = Some(word.clone());
        debug!("presenting '{}'", word.word);

        let stat = if self.settings.record_policy.on_presentation() {
            self.record(&word.word)
        } else {
            self.stats.ensure(&word.word)
        };
        self.sink.word_presented(&word, stat);
        self.sink.input_changed("", &classify(&[], &word.chars()));
    }

    fn record(&mut self, word: &str) -> WordStat {
        let outcome = self
            .stats
            .record_appearance(word, self.settings.reset_threshold);
        if outcome.did_reset {
            info!(
                "'{word}' reached {} appearances, reset count {}",
                self.settings.reset_threshold, outcome.stat.reset_count
            );
            self.sink.stat_reset(word, outcome.stat);
        }
        self.save_stats();
        outcome.stat
    }

    /// Persist statistics for the active list. Failures are logged only.
    pub fn save_stats(&mut self) {
        let Some(list) = &self.list else {
            return;
        };
        if let Err(e) = self.stats.save(self.store.as_mut(), &list.id) {
            warn!("could not save statistics for '{}': {e}", list.id);
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn set_input(&mut self, text: &str) {
        if self.state != SessionState::Running || self.pending_advance.is_pending() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(target) = session.current.as_ref().map(Word::chars) else {
            return;
        };

        session.input = text.to_string();
        let input: Vec<char> = text.chars().collect();
        session.tracker.observe(&input, &target);
        let statuses = classify(&input, &target);
        self.sink.input_changed(text, &statuses);
    }

    pub fn type_char(&mut self, ch: char) {
        let Some(mut text) = self.session.as_ref().map(|s| s.input.clone()) else {
            return;
        };
        text.push(ch);
        self.set_input(&text);
    }

    pub fn backspace(&mut self) {
        let Some(mut text) = self.session.as_ref().map(|s| s.input.clone()) else {
            return;
        };
        if text.pop().is_some() {
            self.set_input(&text);
        }
    }

    /// Space or enter. Completes the word once the input is at least as long
    /// as the target; the next word follows after the advance delay.
    pub fn commit(&mut self, key: CommitKey, now: Instant) -> CommitOutcome {
        if self.state != SessionState::Running {
            return CommitOutcome::Ignored;
        }
        if self.pending_advance.is_pending() {
            debug!("commit ignored, advance already pending");
            return CommitOutcome::AlreadyPending;
        }
        let Some(session) = self.session.as_mut() else {
            return CommitOutcome::Ignored;
        };
        let Some(word) = session.current.clone() else {
            return CommitOutcome::Ignored;
        };

        if session.input.chars().count() < word.word.chars().count() {
            return match key {
                CommitKey::Space => {
                    self.type_char(' ');
                    CommitOutcome::InsertedSpace
                }
                CommitKey::Enter => CommitOutcome::Suppressed,
            };
        }

        let correct = session.input == word.word;
        if correct {
            session.score += scoring::completion_points(true, self.settings.points_per_word);
            session.words_completed += 1;
        }
        let score = session.score;
        debug!("completed '{}' (correct: {correct})", word.word);

        self.pending_advance
            .schedule(now + self.settings.advance_delay, ());
        if self.settings.record_policy.on_completion() {
            self.record(&word.word);
        }
        self.sink.word_completed(&word, correct, score);
        CommitOutcome::Completed { correct }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    pub fn list(&self) -> Option<&WordList> {
        self.list.as_ref()
    }

    pub fn stats(&self) -> &WordStatsStore {
        &self.stats
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn advance_pending(&self) -> bool {
        self.pending_advance.is_pending()
    }

    pub fn current_stat(&self) -> Option<WordStat> {
        let word = self.session.as_ref()?.current.as_ref()?;
        self.stats.get(&word.word)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
