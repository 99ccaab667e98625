//! Review statistics over a learner's collection.
//!
//! Everything here is a read-only summary; nothing mutates items.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::is_due;
use crate::vocabulary::{MAX_EASINESS, VocabularyItem};

/// Minutes a single review is expected to take.
const MINUTES_PER_REVIEW: f64 = 0.5;

/// Longest workload forecast, in days.
pub const MAX_FORECAST_DAYS: u32 = 365;

// ---------------------------------------------------------------------------
// Mastery buckets
// ---------------------------------------------------------------------------

/// Coarse label for an item's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryBucket {
    /// Never reviewed.
    New,
    /// Mastery 0–1.
    Learning,
    /// Mastery 2–3.
    Young,
    /// Mastery 4.
    Mature,
    /// Mastery 5.
    Mastered,
}

impl MasteryBucket {
    /// Bucket for a single item.
    #[must_use]
    pub fn of(item: &VocabularyItem) -> Self {
        if item.is_new() {
            return Self::New;
        }
        match item.mastery_level {
            0 | 1 => Self::Learning,
            2 | 3 => Self::Young,
            4 => Self::Mature,
            _ => Self::Mastered,
        }
    }
}

/// Item counts per [`MasteryBucket`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    /// Never reviewed.
    pub new: usize,
    /// Mastery 0–1.
    pub learning: usize,
    /// Mastery 2–3.
    pub young: usize,
    /// Mastery 4.
    pub mature: usize,
    /// Mastery 5.
    pub mastered: usize,
}

impl BucketCounts {
    fn add(&mut self, bucket: MasteryBucket) {
        match bucket {
            MasteryBucket::New => self.new += 1,
            MasteryBucket::Learning => self.learning += 1,
            MasteryBucket::Young => self.young += 1,
            MasteryBucket::Mature => self.mature += 1,
            MasteryBucket::Mastered => self.mastered += 1,
        }
    }

    /// Count for one bucket.
    #[must_use]
    pub fn count(&self, bucket: MasteryBucket) -> usize {
        match bucket {
            MasteryBucket::New => self.new,
            MasteryBucket::Learning => self.learning,
            MasteryBucket::Young => self.young,
            MasteryBucket::Mature => self.mature,
            MasteryBucket::Mastered => self.mastered,
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewStats
// ---------------------------------------------------------------------------

/// Snapshot of a collection's review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    /// Number of items.
    pub total: usize,
    /// Items per mastery bucket.
    pub buckets: BucketCounts,
    /// Items due right now.
    pub due_now: usize,
    /// Items not due now but due before the end of tomorrow (UTC).
    pub due_tomorrow: usize,
    /// Mean easiness, two decimals; 2.5 for an empty collection.
    pub average_easiness: f64,
    /// Longest current run of successful reviews on any item.
    pub longest_streak: u32,
}

/// Summarize `items` as of `now`.
#[must_use]
pub fn review_stats(items: &[VocabularyItem], now: DateTime<Utc>) -> ReviewStats {
    let tomorrow_end = start_of_day(now.date_naive(), 2);

    let mut buckets = BucketCounts::default();
    let mut due_now = 0;
    let mut due_tomorrow = 0;
    let mut easiness_sum = 0.0;
    let mut longest_streak = 0;

    for item in items {
        buckets.add(MasteryBucket::of(item));
        if is_due(item, now) {
            due_now += 1;
        } else if item.next_review_at < tomorrow_end {
            due_tomorrow += 1;
        }
        easiness_sum += item.easiness_factor;
        longest_streak = longest_streak.max(item.repetitions);
    }

    let average_easiness = if items.is_empty() {
        MAX_EASINESS
    } else {
        round_to(easiness_sum / items.len() as f64, 2)
    };

    ReviewStats {
        total: items.len(),
        buckets,
        due_now,
        due_tomorrow,
        average_easiness,
        longest_streak,
    }
}

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

/// Success rate across every review ever performed on a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retention {
    /// Total reviews.
    pub total_reviews: u64,
    /// Reviews answered correctly.
    pub successful_reviews: u64,
    /// Reviews answered incorrectly.
    pub failed_reviews: u64,
    /// `successful / total × 100`, one decimal; 0 with no reviews.
    pub rate_percent: f64,
}

/// Compute [`Retention`] from the per-item counters.
#[must_use]
pub fn retention(items: &[VocabularyItem]) -> Retention {
    let successful: u64 = items.iter().map(|i| u64::from(i.correct_count)).sum();
    let failed: u64 = items.iter().map(|i| u64::from(i.incorrect_count)).sum();
    let total = successful + failed;
    let rate_percent = if total == 0 {
        0.0
    } else {
        round_to(successful as f64 / total as f64 * 100.0, 1)
    };
    Retention {
        total_reviews: total,
        successful_reviews: successful,
        failed_reviews: failed,
        rate_percent,
    }
}

// ---------------------------------------------------------------------------
// Workload forecast
// ---------------------------------------------------------------------------

/// Expected reviews on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayForecast {
    /// UTC calendar date.
    pub date: NaiveDate,
    /// Items falling due that day.
    pub due: usize,
    /// `ceil(due × 0.5)` minutes.
    pub estimated_minutes: u32,
}

/// Per-day review load for `days` days starting today (UTC), at most
/// [`MAX_FORECAST_DAYS`].
///
/// Day 0 includes everything already overdue.
#[must_use]
pub fn forecast_workload(items: &[VocabularyItem], now: DateTime<Utc>, days: u32) -> Vec<DayForecast> {
    let today = now.date_naive();
    let len = usize::try_from(days.min(MAX_FORECAST_DAYS)).unwrap_or(0);
    let mut counts = vec![0usize; len];

    for item in items {
        let offset = (item.next_review_at.date_naive() - today).num_days().max(0);
        if let Ok(idx) = usize::try_from(offset) {
            if let Some(slot) = counts.get_mut(idx) {
                *slot += 1;
            }
        }
    }

    counts
        .into_iter()
        .enumerate()
        .filter_map(|(i, due)| {
            let date = today.checked_add_days(Days::new(u64::try_from(i).ok()?))?;
            Some(DayForecast {
                date,
                due,
                estimated_minutes: estimated_minutes(due),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Session planning
// ---------------------------------------------------------------------------

/// What a recommended session should focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Default blend of new and due items.
    Mixed,
    /// Many unseen words waiting.
    NewFocused,
    /// A sizeable review backlog.
    ReviewFocused,
    /// Far behind; larger sessions to catch up.
    CatchUp,
    /// Mostly mastered; short upkeep sessions.
    Maintenance,
}

impl SessionKind {
    /// Recommended number of items for this kind of session.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Mixed => 20,
            Self::NewFocused => 15,
            Self::ReviewFocused => 30,
            Self::CatchUp => 50,
            Self::Maintenance => 10,
        }
    }
}

/// A recommended review session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Session focus.
    pub kind: SessionKind,
    /// Recommended number of items.
    pub size: usize,
    /// Items due right now.
    pub total_due: usize,
    /// `ceil(size × 0.5)` minutes.
    pub estimated_minutes: u32,
}

/// Recommend a session for `items` at `now`.
///
/// Rules are checked in order and later matches override earlier ones:
/// more than 30 new items, more than 50 due, more than 100 due, more than
/// 70 % mastered.
#[must_use]
pub fn recommend_session(items: &[VocabularyItem], now: DateTime<Utc>) -> SessionPlan {
    let stats = review_stats(items, now);

    let mut kind = SessionKind::Mixed;
    if stats.buckets.new > 30 {
        kind = SessionKind::NewFocused;
    }
    if stats.due_now > 50 {
        kind = SessionKind::ReviewFocused;
    }
    if stats.due_now > 100 {
        kind = SessionKind::CatchUp;
    }
    if stats.total > 0 && stats.buckets.mastered as f64 > stats.total as f64 * 0.7 {
        kind = SessionKind::Maintenance;
    }

    let size = kind.size();
    SessionPlan {
        kind,
        size,
        total_due: stats.due_now,
        estimated_minutes: estimated_minutes(size),
    }
}

// ---------------------------------------------------------------------------
// Study recommendations
// ---------------------------------------------------------------------------

/// What a [`Recommendation`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// A review backlog is building up.
    Consistency,
    /// Caught up, with plenty of unseen words.
    NewWords,
    /// Too many failed reviews.
    Retention,
    /// Most of the collection is mastered.
    Celebration,
    /// The coming week is heavy.
    Workload,
}

/// How urgent a recommendation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Nice to know.
    Low,
    /// Worth acting on.
    Medium,
    /// Act on this first.
    High,
}

/// One study tip for the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Topic.
    pub kind: RecommendationKind,
    /// Urgency.
    pub priority: Priority,
    /// Human-readable tip.
    pub message: String,
}

/// Study tips for `items` at `now`, in a fixed order: consistency, new
/// words, retention, celebration, workload.
#[must_use]
pub fn study_recommendations(items: &[VocabularyItem], now: DateTime<Utc>) -> Vec<Recommendation> {
    let stats = review_stats(items, now);
    let retention = retention(items);
    let mut tips = Vec::new();

    if stats.due_now > 30 {
        tips.push(Recommendation {
            kind: RecommendationKind::Consistency,
            priority: Priority::High,
            message: format!(
                "You have {} words due. Try to review daily to avoid buildup.",
                stats.due_now
            ),
        });
    }
    if stats.buckets.new > 50 && stats.due_now < 10 {
        tips.push(Recommendation {
            kind: RecommendationKind::NewWords,
            priority: Priority::Medium,
            message: format!(
                "You're caught up. Consider learning {} new words.",
                stats.buckets.new.min(10)
            ),
        });
    }
    if retention.rate_percent < 80.0 && retention.total_reviews > 10 {
        tips.push(Recommendation {
            kind: RecommendationKind::Retention,
            priority: Priority::High,
            message: format!(
                "Your retention rate is {}%. Try shorter, more frequent sessions.",
                retention.rate_percent
            ),
        });
    }
    if stats.total > 0 && stats.buckets.mastered as f64 > stats.total as f64 * 0.5 {
        tips.push(Recommendation {
            kind: RecommendationKind::Celebration,
            priority: Priority::Low,
            message: format!("You've mastered {} words.", stats.buckets.mastered),
        });
    }

    let week: usize = forecast_workload(items, now, 7).iter().map(|d| d.due).sum();
    let daily = week as f64 / 7.0;
    if daily > 40.0 {
        tips.push(Recommendation {
            kind: RecommendationKind::Workload,
            priority: Priority::Medium,
            message: format!(
                "You're averaging {} reviews per day. Consider saving fewer new words.",
                daily.round()
            ),
        });
    }

    tips
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn estimated_minutes(reviews: usize) -> u32 {
    (reviews as f64 * MINUTES_PER_REVIEW).ceil() as u32
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Midnight UTC `days_ahead` days after `date`.
fn start_of_day(date: NaiveDate, days_ahead: u64) -> DateTime<Utc> {
    date.checked_add_days(Days::new(days_ahead))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(DateTime::<Utc>::MAX_UTC, |naive| naive.and_utc())
}
