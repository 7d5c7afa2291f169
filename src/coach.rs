//! The caller-facing surface: one shared graph, policies from config, and
//! per-student state passed into every call.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::config::Config;
use crate::error::GraphError;
use crate::graph::KnowledgeGraph;
use crate::mastery::{AttemptOutcome, MasteryTracker, SessionOutcome};
use crate::models::{MasteryLevel, Topic};
use crate::review::{DueReview, ReviewItem};
use crate::student::{Stats, StudentState};

#[derive(Debug, Clone)]
pub struct Coach<'g> {
    graph: &'g KnowledgeGraph,
    tracker: MasteryTracker<'g>,
}

/// What to work on next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion<'g> {
    Review { topic: &'g Topic, due: DueReview },
    Learn { topic: &'g Topic },
}

impl<'g> Suggestion<'g> {
    pub fn topic(&self) -> &'g Topic {
        match self {
            Suggestion::Review { topic, .. } | Suggestion::Learn { topic } => topic,
        }
    }
}

impl<'g> Coach<'g> {
    pub fn new(graph: &'g KnowledgeGraph, config: &Config) -> Self {
        Self {
            graph,
            tracker: MasteryTracker::new(graph, config.mastery.clone(), config.review.clone()),
        }
    }

    pub fn graph(&self) -> &'g KnowledgeGraph {
        self.graph
    }

    pub fn tracker(&self) -> &MasteryTracker<'g> {
        &self.tracker
    }

    /// Topics at or above the proficient level, which count as learned.
    pub fn learned(&self, state: &StudentState) -> HashSet<String> {
        state.topics_at_least(self.tracker.policy().proficient())
    }

    pub fn get_ready_topics(&self, state: &StudentState) -> Vec<&'g Topic> {
        self.graph.get_ready_topics(&self.learned(state))
    }

    pub fn get_learning_path(&self, topic: &str) -> Result<Vec<&'g Topic>, GraphError> {
        self.graph.get_learning_path(topic)
    }

    /// Learning path with already learned topics left out.
    pub fn remaining_path(
        &self,
        state: &StudentState,
        topic: &str,
    ) -> Result<Vec<&'g Topic>, GraphError> {
        self.graph.learning_path_excluding(topic, &self.learned(state))
    }

    pub fn get_mastery(&self, state: &StudentState, topic: &str) -> MasteryLevel {
        self.tracker.get_mastery(state, topic)
    }

    pub fn due_for_review(&self, state: &StudentState, as_of: DateTime<Utc>) -> Vec<DueReview> {
        self.tracker.scheduler().due_for_review(state, as_of)
    }

    pub fn find_gaps(
        &self,
        state: &StudentState,
        target: &str,
    ) -> Result<Vec<&'g Topic>, GraphError> {
        self.tracker.find_gaps(state, target)
    }

    pub fn record_attempt(
        &self,
        state: &mut StudentState,
        topic: &str,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<AttemptOutcome, GraphError> {
        self.tracker.record_attempt(state, topic, correct, at)
    }

    pub fn close_session(
        &self,
        state: &mut StudentState,
        topic: &str,
        novel_context: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<SessionOutcome>, GraphError> {
        self.tracker.close_session(state, topic, novel_context, at)
    }

    pub fn record_session(
        &self,
        state: &mut StudentState,
        topic: &str,
        correct: u32,
        total: u32,
        novel_context: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<SessionOutcome>, GraphError> {
        self.tracker
            .record_session(state, topic, correct, total, novel_context, at)
    }

    pub fn record_review(
        &self,
        state: &mut StudentState,
        topic: &str,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<ReviewItem, GraphError> {
        self.tracker
            .scheduler()
            .record_review(state, topic, correct, at)
            .cloned()
    }

    pub fn stats(&self, state: &StudentState, as_of: DateTime<Utc>) -> Stats {
        state.stats(as_of, self.tracker.policy().proficient())
    }

    /// Stochastic pick: a due review when there is one, favouring overdue and
    /// weaker topics; otherwise a ready topic, favouring easier ones.
    pub fn next_topic<R: Rng + ?Sized>(
        &self,
        state: &StudentState,
        as_of: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<Suggestion<'g>> {
        let due: Vec<(&'g Topic, DueReview)> = self
            .due_for_review(state, as_of)
            .into_iter()
            .filter_map(|d| self.graph.topic(&d.topic).map(|t| (t, d)))
            .collect();

        if !due.is_empty() {
            let weights: Vec<f64> = due
                .iter()
                .map(|(_, d)| {
                    let overdue = d.overdue_days.max(0.0) + 1.0;
                    let weakness = (MasteryLevel::MAX.as_i32() + 1 - d.level.as_i32()) as f64;
                    overdue * weakness
                })
                .collect();
            let i = pick_weighted(&weights, rng)?;
            let (topic, due) = due.into_iter().nth(i)?;
            return Some(Suggestion::Review { topic, due });
        }

        let ready = self.get_ready_topics(state);
        let weights: Vec<f64> = ready
            .iter()
            .map(|t| (1.0 - t.difficulty) + 0.1)
            .collect();
        let i = pick_weighted(&weights, rng)?;
        ready.get(i).map(|&topic| Suggestion::Learn { topic })
    }
}

/// Roulette-wheel selection over non-negative weights.
fn pick_weighted<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: f64 = weights.iter().sum();
    let mut point = rng.gen::<f64>() * total;
    for (i, &weight) in weights.iter().enumerate() {
        if point < weight {
            return Some(i);
        }
        point -= weight;
    }

    // float rounding
    weights.iter().rposition(|&w| w > 0.0)
}
