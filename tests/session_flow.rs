use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use tajamaster::engine::word_stats::{WordStat, WordStatsStore};
use tajamaster::error::{LoadError, SessionError};
use tajamaster::session::{
    CharStatus, CommitKey, CommitOutcome, EndReason, PresentationSink, RecordPolicy,
    SessionController, SessionSettings, SessionState, SessionSummary,
};
use tajamaster::store::{FileKvStore, KeyValueStore, MemoryKvStore};
use tajamaster::store::schema::stats_storage_key;
use tajamaster::words::{Word, WordList};

#[derive(Default)]
struct RecordingSink {
    presented: Vec<String>,
    completed: Vec<(String, bool)>,
    resets: Vec<(String, WordStat)>,
    ended: Vec<SessionSummary>,
    warnings: Vec<String>,
    failures: Vec<String>,
    last_statuses: Vec<CharStatus>,
    ticks: Vec<u32>,
}

impl PresentationSink for RecordingSink {
    fn list_loaded(&mut self, _list: &WordList) {}

    fn load_failed(&mut self, list_id: &str, _error: &LoadError) {
        self.failures.push(list_id.to_string());
    }

    fn word_presented(&mut self, word: &Word, _stat: WordStat) {
        self.presented.push(word.word.clone());
    }

    fn stat_reset(&mut self, word: &str, stat: WordStat) {
        self.resets.push((word.to_string(), stat));
    }

    fn input_changed(&mut self, _input: &str, statuses: &[CharStatus]) {
        self.last_statuses = statuses.to_vec();
    }

    fn word_completed(&mut self, word: &Word, correct: bool, _score: u32) {
        self.completed.push((word.word.clone(), correct));
    }

    fn timer_ticked(&mut self, remaining: u32) {
        self.ticks.push(remaining);
    }

    fn session_ended(&mut self, summary: &SessionSummary) {
        self.ended.push(summary.clone());
    }

    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

fn words(names: &[&str]) -> Vec<Word> {
    names.iter().map(|n| Word::new(n)).collect()
}

fn controller_with(
    settings: SessionSettings,
    store: Box<dyn KeyValueStore>,
    list: &[&str],
) -> SessionController<RecordingSink> {
    let mut c = SessionController::with_rng(
        settings,
        store,
        RecordingSink::default(),
        SmallRng::seed_from_u64(17),
    );
    c.select_list("test").unwrap();
    c.finish_load("test", Ok(words(list)));
    c
}

fn controller(list: &[&str]) -> SessionController<RecordingSink> {
    controller_with(
        SessionSettings::default(),
        Box::new(MemoryKvStore::new()),
        list,
    )
}

fn current_word(c: &SessionController<RecordingSink>) -> String {
    c.session().unwrap().current.as_ref().unwrap().word.clone()
}

#[test]
fn test_empty_list_keeps_controller_idle() {
    let mut c = controller(&[]);
    assert_eq!(c.start(Instant::now()), Err(SessionError::NoWords));
    assert_eq!(c.state(), SessionState::Idle);
    assert!(c.sink().presented.is_empty());
}

#[test]
fn test_start_without_any_list_is_rejected() {
    let mut c: SessionController<RecordingSink> = SessionController::with_rng(
        SessionSettings::default(),
        Box::new(MemoryKvStore::new()),
        RecordingSink::default(),
        SmallRng::seed_from_u64(1),
    );
    assert_eq!(c.start(Instant::now()), Err(SessionError::NoWords));
}

#[test]
fn test_commit_requires_full_length_and_completes_once() {
    let mut c = controller(&["cat"]);
    let t0 = Instant::now();
    c.start(t0).unwrap();
    assert_eq!(c.sink().presented, vec!["cat"]);

    c.set_input("ca");
    assert_eq!(
        c.sink().last_statuses,
        vec![CharStatus::Correct, CharStatus::Correct, CharStatus::Current]
    );
    assert_eq!(c.commit(CommitKey::Enter, t0), CommitOutcome::Suppressed);
    assert!(c.sink().completed.is_empty());

    c.type_char('t');
    assert_eq!(
        c.commit(CommitKey::Space, t0),
        CommitOutcome::Completed { correct: true }
    );
    assert_eq!(
        c.commit(CommitKey::Space, t0 + Duration::from_millis(100)),
        CommitOutcome::AlreadyPending
    );
    assert_eq!(c.sink().completed, vec![("cat".to_string(), true)]);

    let session = c.session().unwrap();
    assert_eq!(session.score, 10);
    assert_eq!(session.words_completed, 1);
    assert_eq!(session.tracker.typed, 2);
    assert_eq!(session.tracker.errors, 0);

    c.poll(t0 + Duration::from_millis(499));
    assert_eq!(c.sink().presented.len(), 1);
    c.poll(t0 + Duration::from_millis(500));
    assert_eq!(c.sink().presented.len(), 2);
    assert_eq!(c.session().unwrap().input, "");
}

#[test]
fn test_countdown_expiry_ends_session_with_summary() {
    let settings = SessionSettings {
        session_secs: 3,
        ..SessionSettings::default()
    };
    let mut c = controller_with(settings, Box::new(MemoryKvStore::new()), &["cat", "dog"]);
    let t0 = Instant::now();
    c.start(t0).unwrap();

    let word = current_word(&c);
    c.set_input(&word);
    c.commit(CommitKey::Enter, t0);

    c.poll(t0 + Duration::from_secs(1));
    assert_eq!(c.seconds_remaining(), 2);
    c.poll(t0 + Duration::from_secs(3));
    assert_eq!(c.state(), SessionState::Ended);
    assert_eq!(c.sink().ticks.last(), Some(&0));

    let summary = c.summary().unwrap();
    assert_eq!(summary.reason, EndReason::TimeUp);
    assert_eq!(summary.words_completed, 1);
    assert_eq!(summary.score, 10);
    assert_eq!(summary.total_typed, 1);
    assert_eq!(summary.accuracy_label(), "100.0%");
    assert_eq!(c.sink().ended.len(), 1);

    // Input and commits are disabled once ended.
    c.type_char('x');
    assert_eq!(c.commit(CommitKey::Space, t0 + Duration::from_secs(4)), CommitOutcome::Ignored);
    c.poll(t0 + Duration::from_secs(10));
    assert_eq!(c.sink().ended.len(), 1);

    // Ended requires a reset before the next start.
    assert_eq!(c.start(t0), Err(SessionError::NotIdle));
    c.reset();
    assert!(c.start(t0).is_ok());
}

#[test]
fn test_expiry_cancels_pending_advance() {
    let settings = SessionSettings {
        session_secs: 3,
        ..SessionSettings::default()
    };
    let mut c = controller_with(settings, Box::new(MemoryKvStore::new()), &["cat", "dog"]);
    let t0 = Instant::now();
    c.start(t0).unwrap();
    c.poll(t0 + Duration::from_secs(1));
    c.poll(t0 + Duration::from_secs(2));

    let word = current_word(&c);
    c.set_input(&word);
    assert_eq!(
        c.commit(CommitKey::Space, t0 + Duration::from_millis(2800)),
        CommitOutcome::Completed { correct: true }
    );
    assert!(c.advance_pending());
    assert_eq!(c.sink().presented.len(), 1);

    c.poll(t0 + Duration::from_secs(3));
    assert_eq!(c.state(), SessionState::Ended);
    assert!(!c.advance_pending());
    assert_eq!(c.sink().presented.len(), 1);

    c.poll(t0 + Duration::from_secs(4));
    assert_eq!(c.sink().presented.len(), 1);
    assert_eq!(current_word(&c), word);
    assert_eq!(c.sink().ended.len(), 1);
}

#[test]
fn test_pool_exhaustion_ends_session() {
    let settings = SessionSettings {
        repeat_words: false,
        ..SessionSettings::default()
    };
    let mut c = controller_with(settings, Box::new(MemoryKvStore::new()), &["cat", "dog"]);
    let mut now = Instant::now();
    c.start(now).unwrap();

    for _ in 0..2 {
        let word = current_word(&c);
        c.set_input(&word);
        c.commit(CommitKey::Space, now);
        now += Duration::from_millis(500);
        c.poll(now);
    }

    assert_eq!(c.state(), SessionState::Ended);
    let summary = c.summary().unwrap();
    assert_eq!(summary.reason, EndReason::PoolExhausted);
    assert_eq!(summary.words_completed, 2);
    assert_eq!(summary.score, 20);

    let mut presented = c.sink().presented.clone();
    presented.sort();
    assert_eq!(presented, vec!["cat", "dog"]);
}

#[test]
fn test_incorrect_completion_counts_errors() {
    let mut c = controller(&["cat"]);
    let t0 = Instant::now();
    c.start(t0).unwrap();
    c.type_char('c');
    c.type_char('o');
    c.type_char('t');
    assert_eq!(
        c.commit(CommitKey::Enter, t0),
        CommitOutcome::Completed { correct: false }
    );
    let session = c.session().unwrap();
    assert_eq!(session.score, 0);
    assert_eq!(session.tracker.typed, 3);
    assert_eq!(session.tracker.errors, 1);
    assert_eq!(session.tracker.accuracy_label(), "66.7%");
}

#[test]
fn test_list_change_while_running_is_rejected() {
    let mut c = controller(&["cat"]);
    c.start(Instant::now()).unwrap();
    assert_eq!(
        c.select_list("advanced"),
        Err(SessionError::ListChangeWhileRunning)
    );
    assert_eq!(c.state(), SessionState::Running);
    assert_eq!(c.list().unwrap().id, "test");
    assert_eq!(c.sink().warnings.len(), 1);
}

#[test]
fn test_stale_and_failed_loads_block_start() {
    let mut c = controller(&["cat"]);
    c.select_list("next").unwrap();
    c.finish_load("other", Ok(words(&["dog"])));
    assert!(c.is_loading());
    assert_eq!(c.start(Instant::now()), Err(SessionError::LoadInFlight));
    assert_eq!(c.select_list("third"), Err(SessionError::LoadInFlight));

    c.finish_load("next", Err(LoadError::Status(404)));
    assert!(!c.is_loading());
    assert!(c.list().is_none());
    assert_eq!(c.sink().failures, vec!["next"]);
    assert_eq!(c.start(Instant::now()), Err(SessionError::NoWords));
}

#[test]
fn test_reset_mid_session_returns_to_idle_without_summary() {
    let mut c = controller(&["cat"]);
    let t0 = Instant::now();
    c.start(t0).unwrap();
    c.set_input("cat");
    c.commit(CommitKey::Space, t0);
    c.reset();

    assert_eq!(c.state(), SessionState::Idle);
    assert!(c.summary().is_none());
    assert!(c.sink().ended.is_empty());
    assert!(!c.advance_pending());

    // The cancelled advance never fires.
    c.poll(t0 + Duration::from_secs(1));
    assert_eq!(c.sink().presented.len(), 1);
}

#[test]
fn test_threshold_crossing_is_reported() {
    let settings = SessionSettings {
        reset_threshold: 2,
        ..SessionSettings::default()
    };
    let mut c = controller_with(settings, Box::new(MemoryKvStore::new()), &["cat"]);
    let t0 = Instant::now();
    c.start(t0).unwrap();
    c.set_input("cat");
    c.commit(CommitKey::Space, t0);

    assert_eq!(
        c.sink().resets,
        vec![(
            "cat".to_string(),
            WordStat {
                appearance_count: 0,
                reset_count: 1
            }
        )]
    );
}

#[test]
fn test_statistics_persist_across_controllers() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    {
        let store = FileKvStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut c = controller_with(SessionSettings::default(), Box::new(store), &["cat"]);
        c.start(t0).unwrap();
        c.set_input("cat");
        c.commit(CommitKey::Space, t0);
    }

    let store = FileKvStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    assert!(store.file_path(&stats_storage_key("test")).exists());
    let stats = WordStatsStore::load(&store, "test");
    assert_eq!(stats.get("cat").unwrap().appearance_count, 2);

    let mut c = controller_with(SessionSettings::default(), Box::new(store), &["cat"]);
    c.start(t0).unwrap();
    assert_eq!(c.current_stat().unwrap().appearance_count, 3);
}

#[test]
fn test_failed_load_leaves_persisted_stats_untouched() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let store = FileKvStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut c = controller_with(SessionSettings::default(), Box::new(store), &["cat"]);
    c.start(t0).unwrap();
    c.reset();

    let path = FileKvStore::with_base_dir(dir.path().to_path_buf())
        .unwrap()
        .file_path(&stats_storage_key("test"));
    let before = std::fs::read_to_string(&path).unwrap();

    c.select_list("test").unwrap();
    c.finish_load("test", Err(LoadError::Parse("bad".into())));
    let after = std::fs::read_to_string(&path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_saved_counts_are_normalized_to_a_lowered_threshold() {
    let mut store = MemoryKvStore::new();
    store
        .set(
            &stats_storage_key("test"),
            r#"{"cat":{"appearanceCount":7,"resetCount":0}}"#,
        )
        .unwrap();
    let settings = SessionSettings {
        reset_threshold: 5,
        record_policy: RecordPolicy::Completion,
        ..SessionSettings::default()
    };
    let mut c = controller_with(settings, Box::new(store), &["cat"]);
    c.start(Instant::now()).unwrap();

    assert_eq!(
        c.current_stat(),
        Some(WordStat {
            appearance_count: 2,
            reset_count: 1
        })
    );
}
