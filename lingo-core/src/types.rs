//! Core identity and text types shared across the crate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a learner (registered user or guest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LearnerId(pub Uuid);

impl LearnerId {
    /// Create a new random learner ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LearnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LearnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a saved vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Where a word was picked up
// ---------------------------------------------------------------------------

/// Where the learner encountered the word before saving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WordSource {
    /// Tapped in a video's word-level subtitles.
    Subtitle {
        /// The video the subtitle belongs to.
        video_id: String,
    },
    /// Clicked inside an article.
    Article {
        /// The article the word appeared in.
        article_id: String,
    },
    /// Collected during a vocabulary game.
    Game {
        /// Game identifier (e.g. `"match_madness"`).
        game: String,
    },
    /// Entered by hand.
    #[default]
    Manual,
}

// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------

/// Normalize a source-language term for storage and duplicate detection.
///
/// Trims, lowercases and collapses runs of inner whitespace to one space,
/// so `"  El   Perro "` becomes `"el perro"`.
#[must_use]
pub fn normalize_term(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// `at + days` whole days, saturating at the latest representable instant.
#[must_use]
pub fn add_days(at: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    at.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
