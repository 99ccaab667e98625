//! Integration Tests — end-to-end review flows
//!
//! These tests drive the service through complete learner scenarios against
//! both store implementations: save → review → due → stats, persistence
//! across reopen, and policy mismatches.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{DateTime, Duration, TimeZone, Utc};

use lingo_core::config::{LingoConfig, PersistenceConfig, SchedulerConfig};
use lingo_core::persistence::SqliteStore;
use lingo_core::stats::{MasteryBucket, SessionKind};
use lingo_core::store::{InMemoryStore, VocabularyStore};
use lingo_core::{
    LearnerId, LingoError, NewWord, Outcome, Quality, Rating, ReviewService, SchedulingPolicy, WordSource,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn binary_config() -> SchedulerConfig {
    SchedulerConfig::default()
}

fn graded_config() -> SchedulerConfig {
    SchedulerConfig {
        policy: SchedulingPolicy::Graded,
        ..SchedulerConfig::default()
    }
}

/// Run a week of binary reviews for one word and check the schedule.
fn binary_schedule_flow<S: VocabularyStore>(svc: &ReviewService<S>) {
    let learner = LearnerId::new();
    let now = t0();
    let saved = svc
        .save_word(
            learner,
            NewWord::new("Manzana", "apple").with_source(WordSource::Subtitle {
                video_id: "clip-42".to_string(),
            }),
            now,
        )
        .expect("save");
    assert!(saved.created);
    let id = saved.item.id;

    // Correct: 0 → 1 day (easiness stays at the 2.5 ceiling).
    let item = svc.submit_review(id, Outcome::CORRECT, now).expect("review 1");
    assert_eq!(item.interval_days, 1);
    assert_eq!(item.next_review_at, now + Duration::days(1));
    assert!(svc.due_items(learner, now).expect("due").is_empty());

    // Correct again on the due date: ceil(1 × 2.5) = 3.
    let day1 = now + Duration::days(1);
    assert_eq!(svc.due_items(learner, day1).expect("due").len(), 1);
    let item = svc.submit_review(id, Outcome::CORRECT, day1).expect("review 2");
    assert_eq!(item.interval_days, 3);
    assert_eq!(item.mastery_level, 2);

    // Incorrect: back to 1 day, easiness −0.2, mastery −1.
    let day4 = day1 + Duration::days(3);
    let item = svc.submit_review(id, Outcome::INCORRECT, day4).expect("review 3");
    assert_eq!(item.interval_days, 1);
    assert!((item.easiness_factor - 2.3).abs() < 1e-9);
    assert_eq!(item.mastery_level, 1);
    assert_eq!(item.review_count, 3);
    assert_eq!(item.correct_count, 2);
    assert_eq!(item.incorrect_count, 1);

    // Stored state matches what the service returned.
    let stored = svc.store().get(id).expect("get").expect("Some");
    assert_eq!(stored, item);
}

#[test]
fn binary_flow_in_memory() {
    binary_schedule_flow(&ReviewService::new(InMemoryStore::new(), binary_config()));
}

#[test]
fn binary_flow_sqlite() {
    let store = SqliteStore::open_in_memory(&PersistenceConfig::default()).expect("open");
    binary_schedule_flow(&ReviewService::new(store, binary_config()));
}

// ---------------------------------------------------------------------------
// Graded policy
// ---------------------------------------------------------------------------

#[test]
fn graded_flow_follows_sm2_intervals() {
    let svc = ReviewService::new(InMemoryStore::new(), graded_config());
    let learner = LearnerId::new();
    let now = t0();
    let id = svc.save_word(learner, NewWord::new("ventana", "window"), now).expect("save").item.id;

    let good = Outcome::Graded(Rating::Good.quality());
    let first = svc.submit_review(id, good, now).expect("r1");
    assert_eq!(first.interval_days, 1);

    let second = svc.submit_review(id, good, first.next_review_at).expect("r2");
    assert_eq!(second.interval_days, 6);

    // Good (q = 4) leaves easiness at 2.5: round(6 × 2.5) = 15.
    let third = svc.submit_review(id, good, second.next_review_at).expect("r3");
    assert_eq!(third.interval_days, 15);
    assert_eq!(third.repetitions, 3);

    let again = Outcome::Graded(Rating::Again.quality());
    let lapsed = svc.submit_review(id, again, third.next_review_at).expect("r4");
    assert_eq!(lapsed.interval_days, 1);
    assert_eq!(lapsed.repetitions, 0);
    assert!((lapsed.easiness_factor - 1.96).abs() < 1e-9);
}

#[test]
fn policies_are_never_mixed() {
    let binary = ReviewService::new(InMemoryStore::new(), binary_config());
    let graded = ReviewService::new(InMemoryStore::new(), graded_config());
    let learner = LearnerId::new();

    let a = binary.save_word(learner, NewWord::new("agua", "water"), t0()).expect("save").item;
    let b = graded.save_word(learner, NewWord::new("agua", "water"), t0()).expect("save").item;

    let q = Quality::new(5).expect("valid");
    assert!(matches!(
        binary.submit_review(a.id, Outcome::Graded(q), t0()),
        Err(LingoError::OutcomeMismatch { policy: SchedulingPolicy::Binary, .. })
    ));
    assert!(matches!(
        graded.submit_review(b.id, Outcome::CORRECT, t0()),
        Err(LingoError::OutcomeMismatch { policy: SchedulingPolicy::Graded, .. })
    ));
    assert_eq!(binary.store().get(a.id).expect("get").map(|i| i.review_count), Some(0));
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn sqlite_state_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("lingo.db");
    let config = PersistenceConfig::default();
    let learner = LearnerId::new();

    let reviewed = {
        let store = SqliteStore::open(&db_path, &config).expect("open");
        let svc = ReviewService::new(store, binary_config());
        let item = svc
            .save_word(learner, NewWord::new("puerta", "door").with_context("Cierra la puerta."), t0())
            .expect("save")
            .item;
        svc.submit_review(item.id, Outcome::CORRECT, t0()).expect("review")
    };

    let store = SqliteStore::open(&db_path, &config).expect("reopen");
    assert!(store.integrity_check().expect("check"));
    let svc = ReviewService::new(store, binary_config());

    let loaded = svc.store().get(reviewed.id).expect("get").expect("Some");
    assert_eq!(loaded, reviewed);
    assert_eq!(loaded.context.as_deref(), Some("Cierra la puerta."));

    // Saving the same word again finds the persisted item.
    let again = svc.save_word(learner, NewWord::new("PUERTA", "door"), t0()).expect("save");
    assert!(!again.created);
    assert_eq!(again.item.id, reviewed.id);

    assert!(svc.due_items(learner, t0()).expect("due").is_empty());
    assert_eq!(svc.due_items(learner, t0() + Duration::days(1)).expect("due").len(), 1);
}

#[test]
fn config_file_drives_policy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lingo.toml");
    std::fs::write(
        &path,
        format!(
            "[scheduler]\npolicy = \"graded\"\nsession_limit = 5\n\n[persistence]\npath = \"{}\"\n",
            dir.path().join("vocab.db").display()
        ),
    )
    .expect("write config");

    let config = LingoConfig::from_file(&path).expect("load");
    assert_eq!(config.scheduler.policy, SchedulingPolicy::Graded);

    let store = SqliteStore::open(&config.persistence.path, &config.persistence).expect("open");
    let svc = ReviewService::new(store, config.scheduler.clone());
    let learner = LearnerId::new();
    for i in 0..8 {
        svc.save_word(learner, NewWord::new(format!("palabra{i}"), "word"), t0()).expect("save");
    }
    assert_eq!(svc.review_session(learner, t0(), None).expect("session").len(), 5);
}

// ---------------------------------------------------------------------------
// Sessions & statistics
// ---------------------------------------------------------------------------

#[test]
fn session_puts_overdue_before_new() {
    let svc = ReviewService::new(InMemoryStore::new(), binary_config());
    let learner = LearnerId::new();
    let start = t0();

    let old = svc.save_word(learner, NewWord::new("viejo", "old"), start).expect("save").item;
    svc.submit_review(old.id, Outcome::INCORRECT, start).expect("review");
    svc.save_word(learner, NewWord::new("nuevo", "new"), start + Duration::days(2)).expect("save");

    let now = start + Duration::days(3);
    let session = svc.review_session(learner, now, None).expect("session");
    let terms: Vec<&str> = session.iter().map(|i| i.term.as_str()).collect();
    assert_eq!(terms, vec!["viejo", "nuevo"]);
}

#[test]
fn report_summarizes_collection() {
    let svc = ReviewService::new(InMemoryStore::new(), binary_config());
    let learner = LearnerId::new();
    let now = t0();

    let ids: Vec<_> = ["uno", "dos", "tres", "cuatro"]
        .iter()
        .map(|w| svc.save_word(learner, NewWord::new(*w, "n"), now).expect("save").item.id)
        .collect();
    svc.submit_review(ids[0], Outcome::CORRECT, now).expect("review");
    svc.submit_review(ids[1], Outcome::INCORRECT, now).expect("review");

    let report = svc.report(learner, now).expect("report");
    assert_eq!(report.stats.total, 4);
    assert_eq!(report.stats.buckets.count(MasteryBucket::New), 2);
    assert_eq!(report.stats.due_now, 2);
    assert_eq!(report.stats.due_tomorrow, 2);
    assert!((report.retention.rate_percent - 50.0).abs() < 1e-9);
    assert_eq!(report.forecast[0].due, 2);
    assert_eq!(report.forecast[1].due, 2);
    assert_eq!(report.session.kind, SessionKind::Mixed);

    // Other learners' words don't leak in.
    assert_eq!(svc.stats(LearnerId::new(), now).expect("stats").total, 0);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_reviews_of_different_items() {
    let store = Arc::new(SqliteStore::open_in_memory(&PersistenceConfig::default()).expect("open"));
    let svc = Arc::new(ReviewService::new(Arc::clone(&store), binary_config()));
    let learner = LearnerId::new();

    let ids: Vec<_> = (0..8)
        .map(|i| svc.save_word(learner, NewWord::new(format!("w{i}"), "x"), t0()).expect("save").item.id)
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || svc.submit_review(id, Outcome::CORRECT, t0()).expect("review"))
        })
        .collect();
    for h in handles {
        h.join().expect("thread");
    }

    assert_eq!(store.item_count().expect("count"), 8);
    assert!(svc.due_items(learner, t0()).expect("due").is_empty());
    assert_eq!(svc.counters().snapshot().reviews_correct, 8);
}

#[test]
fn overlapping_saves_of_one_word_agree() {
    const WRITERS: usize = 4;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open(dir.path().join("lingo.db"), &PersistenceConfig::default()).expect("open");
    let svc = Arc::new(ReviewService::new(store, binary_config()));

    for _ in 0..100 {
        let learner = LearnerId::new();
        let barrier = Arc::new(Barrier::new(WRITERS));
        let handles: Vec<_> = (0..WRITERS)
            .map(|_| {
                let svc = Arc::clone(&svc);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    svc.save_word(learner, NewWord::new("perro", "dog"), t0())
                })
            })
            .collect();

        let saved: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread").expect("save must not fail"))
            .collect();
        assert_eq!(saved.iter().filter(|s| s.created).count(), 1);
        assert!(saved.iter().all(|s| s.item.id == saved[0].item.id));
    }

    let snap = svc.counters().snapshot();
    assert_eq!(snap.words_saved, 100);
    assert_eq!(snap.duplicate_saves, 300);
}

#[test]
fn mastery_and_search_queries_on_sqlite() {
    let store = SqliteStore::open_in_memory(&PersistenceConfig::default()).expect("open");
    let svc = ReviewService::new(store, binary_config());
    let learner = LearnerId::new();

    let known = svc.save_word(learner, NewWord::new("hola", "hello"), t0()).expect("save").item;
    for _ in 0..5 {
        svc.submit_review(known.id, Outcome::CORRECT, t0()).expect("review");
    }
    svc.save_word(learner, NewWord::new("adiós", "goodbye"), t0()).expect("save");

    let mastered = svc.words_by_mastery(learner, MasteryBucket::Mastered).expect("query");
    assert_eq!(mastered.len(), 1);
    assert_eq!(mastered[0].id, known.id);

    let hits = svc.search_words(learner, "Goodbye").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].term, "adiós");

    let report = svc.report(learner, t0()).expect("report");
    assert!(report.recommendations.is_empty());
}
