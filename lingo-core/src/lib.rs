//! # Lingo Core Library
//!
//! Spaced-repetition scheduling for vocabulary a learner saves while reading,
//! watching or playing.
//!
//! Every saved word becomes a [`VocabularyItem`] carrying its memory state
//! (easiness, interval, mastery). Reviews move that state forward through one
//! of two scheduling policies:
//!
//! - **Binary** — correct / incorrect, the default ([`scheduler::binary`])
//! - **Graded** — SM-2 quality 0–5 ([`scheduler::graded`])
//!
//! The scheduler functions are pure and take `now` from the caller.
//! [`ReviewService`] wires them to a [`store::VocabularyStore`]: in memory
//! ([`store::InMemoryStore`]) or SQLite ([`persistence::SqliteStore`]).
//!
//! ```
//! use chrono::Utc;
//! use lingo_core::config::SchedulerConfig;
//! use lingo_core::store::InMemoryStore;
//! use lingo_core::{LearnerId, NewWord, Outcome, ReviewService};
//!
//! let service = ReviewService::new(InMemoryStore::new(), SchedulerConfig::default());
//! let learner = LearnerId::new();
//! let now = Utc::now();
//!
//! let saved = service.save_word(learner, NewWord::new("perro", "dog"), now)?;
//! let item = service.submit_review(saved.item.id, Outcome::CORRECT, now)?;
//! assert_eq!(item.interval_days, 1);
//! assert!(service.due_items(learner, now)?.is_empty());
//! # Ok::<(), lingo_core::LingoError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod due;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod scheduler;
pub mod service;
pub mod stats;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod vocabulary;

pub use config::LingoConfig;
pub use error::{LingoError, Result};
pub use scheduler::{Outcome, Quality, Rating, SchedulingPolicy, is_due};
pub use service::{LearnerReport, ReviewService, SavedWord};
pub use types::*;
pub use vocabulary::{NewWord, VocabularyItem};
