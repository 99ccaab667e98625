//! Due-item selection and review-session ordering.
//!
//! [`due_items`] is the plain filter: it keeps whatever order the collection
//! was given in. [`review_queue`] builds a prioritized session:
//!
//! 1. previously reviewed items that are overdue, most overdue first
//! 2. never-reviewed items
//! 3. reviewed items due exactly now
//!
//! Within a group, harder items (lower easiness) come first; remaining ties
//! keep input order.

use std::cmp::{Ordering, Reverse};

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

use crate::scheduler::is_due;
use crate::vocabulary::VocabularyItem;

/// Items from `items` that are due at `now`, in input order.
#[must_use]
pub fn due_items<'a, I>(items: I, now: DateTime<Utc>) -> Vec<&'a VocabularyItem>
where
    I: IntoIterator<Item = &'a VocabularyItem>,
{
    items.into_iter().filter(|item| is_due(item, now)).collect()
}

/// Prioritized due items, at most `limit` of them.
#[must_use]
pub fn review_queue(items: &[VocabularyItem], now: DateTime<Utc>, limit: usize) -> Vec<VocabularyItem> {
    let mut due = due_items(items, now);
    due.sort_by(|a, b| compare_priority(a, b, now));
    due.into_iter().take(limit).cloned().collect()
}

fn priority_group(item: &VocabularyItem, now: DateTime<Utc>) -> u8 {
    if item.is_new() {
        1
    } else if now > item.next_review_at {
        0
    } else {
        2
    }
}

fn compare_priority(a: &VocabularyItem, b: &VocabularyItem, now: DateTime<Utc>) -> Ordering {
    let key = |item: &VocabularyItem| {
        let group = priority_group(item, now);
        let overdue = if group == 0 {
            now - item.next_review_at
        } else {
            chrono::Duration::zero()
        };
        (group, Reverse(overdue), OrderedFloat(item.easiness_factor))
    };
    key(a).cmp(&key(b))
}
