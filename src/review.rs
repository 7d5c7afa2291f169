//! Spaced review scheduling.
//!
//! Each reviewable topic has a [`ReviewItem`] whose stage indexes the interval
//! table. A correct review moves one stage up (staying on the last entry once
//! reached), an incorrect one drops back to the first entry.
//!
//! A correct review also counts as a partial review of the topic's
//! prerequisites: their next review moves later in proportion to their
//! [`fire_ancestors`](KnowledgeGraph::fire_ancestors) weight. Their stage is
//! left alone.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ReviewPolicy;
use crate::error::GraphError;
use crate::graph::KnowledgeGraph;
use crate::models::{MasteryLevel, Outcome};
use crate::student::StudentState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// `None` until the first review; the enrollment interval uses the first
    /// table entry.
    pub stage: Option<usize>,
    pub next_review: DateTime<Utc>,
    /// Timestamp `next_review` was computed from. Implicit credit moves
    /// `next_review` without touching this.
    pub scheduled_at: DateTime<Utc>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub last_outcome: Option<Outcome>,
    pub times_reviewed: u32,
    pub times_correct: u32,
}

impl ReviewItem {
    pub fn new(enrolled_at: DateTime<Utc>, policy: &ReviewPolicy) -> Self {
        Self {
            stage: None,
            next_review: enrolled_at + Duration::days(interval_days(policy, 0)),
            scheduled_at: enrolled_at,
            last_reviewed: None,
            last_outcome: None,
            times_reviewed: 0,
            times_correct: 0,
        }
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review <= as_of
    }

    pub fn interval_days(&self) -> i64 {
        (self.next_review - self.scheduled_at).num_days()
    }

    /// Fractional days past the due date; negative if not yet due.
    pub fn overdue_days(&self, as_of: DateTime<Utc>) -> f64 {
        (as_of - self.next_review).num_seconds() as f64 / 86_400.0
    }

    /// Ebbinghaus estimate `exp(-t / S)`, using the scheduled interval as the
    /// stability `S`.
    pub fn retention(&self, as_of: DateTime<Utc>) -> f64 {
        let stability = self.interval_days().max(1) as f64;
        let elapsed = (as_of - self.scheduled_at).num_seconds().max(0) as f64 / 86_400.0;
        (-elapsed / stability).exp().clamp(0.0, 1.0)
    }

    fn apply(&mut self, outcome: Outcome, at: DateTime<Utc>, policy: &ReviewPolicy) {
        let last_stage = policy.intervals_days.len().saturating_sub(1);
        let stage = match outcome {
            Outcome::Correct => self.stage.map_or(0, |s| (s + 1).min(last_stage)),
            Outcome::Incorrect => 0,
        };

        self.stage = Some(stage);
        self.scheduled_at = at;
        self.next_review = at + Duration::days(interval_days(policy, stage));
        self.last_reviewed = Some(at);
        self.last_outcome = Some(outcome);
        self.times_reviewed += 1;
        if outcome.is_correct() {
            self.times_correct += 1;
        }
    }
}

/// Interval for `stage`, repeating the last entry past the end of the table.
pub fn interval_days(policy: &ReviewPolicy, stage: usize) -> i64 {
    policy
        .intervals_days
        .get(stage)
        .or_else(|| policy.intervals_days.last())
        .copied()
        .unwrap_or(1)
        .max(1) as i64
}

/// A review that has come due, as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueReview {
    pub topic: String,
    pub level: MasteryLevel,
    pub stage: Option<usize>,
    pub next_review: DateTime<Utc>,
    pub overdue_days: f64,
    pub retention: f64,
}

#[derive(Debug, Clone)]
pub struct ReviewScheduler<'g> {
    graph: &'g KnowledgeGraph,
    policy: ReviewPolicy,
}

impl<'g> ReviewScheduler<'g> {
    pub fn new(graph: &'g KnowledgeGraph, policy: ReviewPolicy) -> Self {
        Self { graph, policy }
    }

    pub fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    /// Creates the topic's review item if it has none. Returns whether a new
    /// item was created.
    pub fn enroll(
        &self,
        state: &mut StudentState,
        topic: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, GraphError> {
        self.check_topic(topic)?;
        if state.reviews.contains_key(topic) {
            return Ok(false);
        }

        let item = ReviewItem::new(at, &self.policy);
        tracing::info!(
            student = %state.student_id,
            topic,
            next_review = %item.next_review,
            "enrolled topic for review"
        );
        state.reviews.insert(topic.to_string(), item);
        Ok(true)
    }

    pub fn record_review<'s>(
        &self,
        state: &'s mut StudentState,
        topic: &str,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<&'s ReviewItem, GraphError> {
        self.check_topic(topic)?;
        if correct {
            self.credit_prerequisites(state, topic, at)?;
        }

        let item = state
            .reviews
            .entry(topic.to_string())
            .or_insert_with(|| ReviewItem::new(at, &self.policy));
        item.apply(Outcome::from(correct), at, &self.policy);

        tracing::debug!(
            topic,
            correct,
            stage = ?item.stage,
            next_review = %item.next_review,
            "scheduled review"
        );
        Ok(item)
    }

    /// Topics whose next review is at or before `as_of`, most overdue first.
    pub fn due_for_review(&self, state: &StudentState, as_of: DateTime<Utc>) -> Vec<DueReview> {
        let mut due: Vec<DueReview> = state
            .reviews
            .iter()
            .filter(|(_, item)| item.is_due(as_of))
            .map(|(topic, item)| DueReview {
                topic: topic.clone(),
                level: state.level(topic),
                stage: item.stage,
                next_review: item.next_review,
                overdue_days: item.overdue_days(as_of),
                retention: item.retention(as_of),
            })
            .collect();

        // stable: equal timestamps stay in key order
        due.sort_by_key(|d| d.next_review);
        due
    }

    /// Pushes back the next review of enrolled prerequisites of `topic` to at
    /// least `at + weight * interval`. Returns the credited topic keys.
    pub fn credit_prerequisites(
        &self,
        state: &mut StudentState,
        topic: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<String>, GraphError> {
        let mut credited = Vec::new();
        for (prerequisite, weight) in self
            .graph
            .fire_ancestors(topic, self.policy.implicit_credit_depth)?
        {
            let Some(item) = state.reviews.get_mut(&prerequisite.key) else {
                continue;
            };
            let interval = interval_days(&self.policy, item.stage.unwrap_or(0));
            let pushed = at + Duration::seconds((interval as f64 * weight * 86_400.0) as i64);
            if pushed > item.next_review {
                tracing::debug!(
                    topic,
                    prerequisite = %prerequisite.key,
                    weight,
                    next_review = %pushed,
                    "implicit review credit"
                );
                item.next_review = pushed;
                credited.push(prerequisite.key.clone());
            }
        }
        Ok(credited)
    }

    fn check_topic(&self, topic: &str) -> Result<(), GraphError> {
        if self.graph.contains(topic) {
            Ok(())
        } else {
            Err(GraphError::UnknownTopic(topic.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Domain, Topic};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn graph() -> KnowledgeGraph {
        let mut g = KnowledgeGraph::new();
        for key in ["x", "y", "z"] {
            g.add_topic(Topic::new(key, key, Domain::Mathematics)).unwrap();
        }
        g
    }

    fn days_until_next(item: &ReviewItem, from: DateTime<Utc>) -> i64 {
        (item.next_review - from).num_days()
    }

    mod interval_tests {
        use super::*;

        #[test]
        fn table_lookup() {
            let p = ReviewPolicy::default();
            assert_eq!(interval_days(&p, 0), 1);
            assert_eq!(interval_days(&p, 1), 3);
            assert_eq!(interval_days(&p, 2), 7);
            assert_eq!(interval_days(&p, 3), 14);
            assert_eq!(interval_days(&p, 4), 30);
        }

        #[test]
        fn last_entry_repeats() {
            let p = ReviewPolicy::default();
            assert_eq!(interval_days(&p, 5), 30);
            assert_eq!(interval_days(&p, 100), 30);
        }
    }

    mod implicit_credit_tests {
        use super::*;

        // x -> y -> z
        fn chain() -> KnowledgeGraph {
            let mut g = graph();
            g.add_prerequisite("y", "x").unwrap();
            g.add_prerequisite("z", "y").unwrap();
            g
        }

        fn enrolled(scheduler: &ReviewScheduler<'_>) -> StudentState {
            let mut state = StudentState::new("ada");
            for key in ["x", "y", "z"] {
                scheduler.enroll(&mut state, key, t0()).unwrap();
            }
            state
        }

        #[test]
        fn correct_review_pushes_prerequisites_back() {
            let g = chain();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = enrolled(&scheduler);

            // prerequisites at stage 4 (30 days) but due right now
            let now = t0() + Duration::days(40);
            for key in ["x", "y"] {
                let item = state.reviews.get_mut(key).unwrap();
                item.stage = Some(4);
                item.next_review = now;
            }

            scheduler.record_review(&mut state, "z", true, now).unwrap();

            let y = &state.reviews["y"];
            let x = &state.reviews["x"];
            assert_eq!(y.next_review, now + Duration::days(15));
            assert_eq!(x.next_review, now + Duration::seconds(30 * 86_400 / 4));
            assert_eq!(y.stage, Some(4));
            assert_eq!(x.stage, Some(4));
            assert_eq!(y.times_reviewed, 0);
            assert!(scheduler.due_for_review(&state, now).is_empty());
        }

        #[test]
        fn incorrect_review_gives_no_credit() {
            let g = chain();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = enrolled(&scheduler);
            let before = state.reviews["y"].clone();

            scheduler
                .record_review(&mut state, "z", false, t0() + Duration::days(1))
                .unwrap();
            assert_eq!(state.reviews["y"], before);
        }

        #[test]
        fn credit_never_pulls_a_review_earlier() {
            let g = chain();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = enrolled(&scheduler);
            let far = t0() + Duration::days(90);
            state.reviews.get_mut("y").unwrap().next_review = far;

            let credited = scheduler
                .credit_prerequisites(&mut state, "z", t0() + Duration::days(1))
                .unwrap();
            assert_eq!(credited, vec!["x".to_string()]);
            assert_eq!(state.reviews["y"].next_review, far);
        }

        #[test]
        fn unenrolled_prerequisites_and_zero_depth_are_skipped() {
            let g = chain();
            let mut policy = ReviewPolicy::default();
            let scheduler = ReviewScheduler::new(&g, policy.clone());
            let mut state = StudentState::new("ada");
            scheduler.record_review(&mut state, "z", true, t0()).unwrap();
            assert_eq!(state.reviews.len(), 1);

            policy.implicit_credit_depth = 0;
            let scheduler = ReviewScheduler::new(&g, policy);
            let mut state = enrolled(&scheduler);
            let credited = scheduler
                .credit_prerequisites(&mut state, "z", t0() + Duration::days(5))
                .unwrap();
            assert!(credited.is_empty());
        }
    }

    mod record_review_tests {
        use super::*;

        #[test]
        fn correct_reviews_walk_the_table_and_failure_resets() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = StudentState::new("ada");

            let mut at = t0();
            let mut intervals = Vec::new();
            for _ in 0..3 {
                let item = scheduler.record_review(&mut state, "x", true, at).unwrap();
                intervals.push(days_until_next(item, at));
                at = item.next_review;
            }
            assert_eq!(intervals, vec![1, 3, 7]);

            let item = scheduler.record_review(&mut state, "x", false, at).unwrap();
            assert_eq!(days_until_next(item, at), 1);
            assert_eq!(item.stage, Some(0));
        }

        #[test]
        fn stage_caps_at_last_interval() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = StudentState::new("ada");

            let mut at = t0();
            for _ in 0..10 {
                let item = scheduler.record_review(&mut state, "x", true, at).unwrap();
                at = item.next_review;
            }
            let item = &state.reviews["x"];
            assert_eq!(item.stage, Some(4));
            assert_eq!(item.interval_days(), 30);
            assert_eq!(item.times_reviewed, 10);
            assert_eq!(item.times_correct, 10);
        }

        #[test]
        fn incorrect_resets_from_any_stage() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());

            for correct_before in 0..7 {
                let mut state = StudentState::new("ada");
                let mut at = t0();
                for _ in 0..correct_before {
                    at = scheduler
                        .record_review(&mut state, "x", true, at)
                        .unwrap()
                        .next_review;
                }
                let item = scheduler.record_review(&mut state, "x", false, at).unwrap();
                assert_eq!(item.stage, Some(0));
                assert_eq!(item.last_outcome, Some(Outcome::Incorrect));
            }
        }

        #[test]
        fn next_review_is_always_in_the_future() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = StudentState::new("ada");

            let outcomes = [true, false, true, true, false, true, true, true, true];
            let mut at = t0();
            for correct in outcomes {
                let item = scheduler.record_review(&mut state, "y", correct, at).unwrap();
                assert!(item.next_review > at);
                at += Duration::hours(30);
            }
        }

        #[test]
        fn unknown_topic_is_rejected_without_mutation() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = StudentState::new("ada");

            let result = scheduler.record_review(&mut state, "nope", true, t0());
            assert_eq!(result.unwrap_err(), GraphError::UnknownTopic("nope".into()));
            assert!(state.reviews.is_empty());
        }
    }

    mod enroll_tests {
        use super::*;

        #[test]
        fn enroll_schedules_first_interval_once() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = StudentState::new("ada");

            assert!(scheduler.enroll(&mut state, "x", t0()).unwrap());
            assert!(!scheduler
                .enroll(&mut state, "x", t0() + Duration::days(3))
                .unwrap());

            let item = &state.reviews["x"];
            assert_eq!(item.stage, None);
            assert_eq!(item.next_review, t0() + Duration::days(1));
        }
    }

    mod due_tests {
        use super::*;

        #[test]
        fn due_orders_most_overdue_first() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = StudentState::new("ada");

            scheduler.enroll(&mut state, "z", t0()).unwrap();
            scheduler.enroll(&mut state, "x", t0() + Duration::hours(12)).unwrap();
            scheduler.enroll(&mut state, "y", t0() + Duration::days(10)).unwrap();

            let due = scheduler.due_for_review(&state, t0() + Duration::days(2));
            let topics: Vec<&str> = due.iter().map(|d| d.topic.as_str()).collect();
            assert_eq!(topics, vec!["z", "x"]);
            assert!(due[0].overdue_days > due[1].overdue_days);
        }

        #[test]
        fn due_boundary_is_inclusive() {
            let g = graph();
            let scheduler = ReviewScheduler::new(&g, ReviewPolicy::default());
            let mut state = StudentState::new("ada");
            scheduler.enroll(&mut state, "x", t0()).unwrap();

            let due_at = t0() + Duration::days(1);
            assert_eq!(scheduler.due_for_review(&state, due_at).len(), 1);
            assert!(scheduler
                .due_for_review(&state, due_at - Duration::seconds(1))
                .is_empty());
        }
    }

    mod retention_tests {
        use super::*;

        #[test]
        fn retention_decays_over_interval() {
            let item = ReviewItem::new(t0(), &ReviewPolicy::default());
            assert_eq!(item.retention(t0()), 1.0);
            let one_interval = item.retention(t0() + Duration::days(1));
            assert!((one_interval - (-1.0f64).exp()).abs() < 1e-9);
            assert!(item.retention(t0() + Duration::days(5)) < one_interval);
        }
    }
}
