//! Per-student state: every mastery record and review item for one student.
//!
//! The state is owned by the caller and passed explicitly into tracker and
//! scheduler operations; persistence goes through [`ProfileStore`].

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::mastery::MasteryRecord;
use crate::models::MasteryLevel;
use crate::review::ReviewItem;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentState {
    pub student_id: String,
    pub mastery: BTreeMap<String, MasteryRecord>,
    pub reviews: BTreeMap<String, ReviewItem>,
}

impl StudentState {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            ..Default::default()
        }
    }

    pub fn level(&self, topic: &str) -> MasteryLevel {
        self.mastery
            .get(topic)
            .map(|r| r.level)
            .unwrap_or_default()
    }

    /// Topic keys at or above `level`.
    pub fn topics_at_least(&self, level: MasteryLevel) -> HashSet<String> {
        self.mastery
            .iter()
            .filter(|(_, r)| r.level >= level)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn stats(&self, as_of: DateTime<Utc>, proficient: MasteryLevel) -> Stats {
        let tracked_topics = self.mastery.len() as i64;
        let total_attempts = self.mastery.values().map(|r| r.total_attempts as i64).sum();
        let total_reviews = self.reviews.values().map(|r| r.times_reviewed as i64).sum();
        let proficient_count = self
            .mastery
            .values()
            .filter(|r| r.level >= proficient)
            .count() as i64;
        let mastered = self
            .mastery
            .values()
            .filter(|r| r.level == MasteryLevel::Mastered)
            .count() as i64;
        let due_now = self.reviews.values().filter(|r| r.is_due(as_of)).count() as i64;
        let avg_mastery = if self.mastery.is_empty() {
            0.0
        } else {
            self.mastery
                .values()
                .map(|r| r.level.as_i32() as f64)
                .sum::<f64>()
                / self.mastery.len() as f64
        };

        Stats {
            tracked_topics,
            total_attempts,
            total_reviews,
            proficient: proficient_count,
            mastered,
            due_now,
            avg_mastery,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub tracked_topics: i64,
    pub total_attempts: i64,
    pub total_reviews: i64,
    pub proficient: i64,
    pub mastered: i64,
    pub due_now: i64,
    pub avg_mastery: f64,
}

/// Load/save hooks to wherever student profiles live.
pub trait ProfileStore {
    /// Returns an empty state for students that have never been saved.
    fn load(&self, student_id: &str) -> Result<StudentState, StoreError>;

    fn save(&self, state: &StudentState) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewPolicy;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn record(level: MasteryLevel, attempts: u32) -> MasteryRecord {
        let mut r = MasteryRecord::new();
        r.level = level;
        r.total_attempts = attempts;
        r
    }

    #[test]
    fn unknown_topic_level_is_zero() {
        let state = StudentState::new("ada");
        assert_eq!(state.level("calculus"), MasteryLevel::Unknown);
    }

    #[test]
    fn topics_at_least_filters_by_level() {
        let mut state = StudentState::new("ada");
        state.mastery.insert("a".into(), record(MasteryLevel::Proficient, 3));
        state.mastery.insert("b".into(), record(MasteryLevel::Developing, 3));
        state.mastery.insert("c".into(), record(MasteryLevel::Mastered, 3));

        let proficient = state.topics_at_least(MasteryLevel::Proficient);
        assert_eq!(proficient.len(), 2);
        assert!(proficient.contains("a"));
        assert!(proficient.contains("c"));
    }

    #[test]
    fn stats_empty_state() {
        let stats = StudentState::new("ada").stats(t0(), MasteryLevel::Proficient);
        assert_eq!(stats.tracked_topics, 0);
        assert_eq!(stats.due_now, 0);
        assert_eq!(stats.avg_mastery, 0.0);
    }

    #[test]
    fn stats_counts_levels_and_due_reviews() {
        let policy = ReviewPolicy::default();
        let mut state = StudentState::new("ada");
        state.mastery.insert("a".into(), record(MasteryLevel::Mastered, 10));
        state.mastery.insert("b".into(), record(MasteryLevel::Introduced, 2));
        state
            .reviews
            .insert("a".into(), ReviewItem::new(t0(), &policy));
        state
            .reviews
            .insert("b".into(), ReviewItem::new(t0() + Duration::days(5), &policy));

        let stats = state.stats(t0() + Duration::days(2), MasteryLevel::Proficient);
        assert_eq!(stats.tracked_topics, 2);
        assert_eq!(stats.total_attempts, 12);
        assert_eq!(stats.proficient, 1);
        assert_eq!(stats.mastered, 1);
        assert_eq!(stats.due_now, 1);
        assert_eq!(stats.avg_mastery, 2.5);
    }
}
