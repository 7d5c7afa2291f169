//! Prerequisite knowledge graph.
//!
//! Topics are nodes, edges point from a prerequisite to the topic that needs
//! it. The graph is kept acyclic at insertion time. Node indices follow
//! registration order, which gives every query a deterministic ordering.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use crate::error::GraphError;
use crate::models::{Domain, Topic};

#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    topics: Vec<Topic>,
    index: HashMap<String, usize>,
    // prerequisites[i] = direct prerequisites of topic i
    prerequisites: Vec<BTreeSet<usize>>,
    // dependents[i] = topics that list i as a direct prerequisite
    dependents: Vec<BTreeSet<usize>>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn topic(&self, key: &str) -> Option<&Topic> {
        self.index.get(key).map(|&i| &self.topics[i])
    }

    /// All topics in registration order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.prerequisites.iter().map(BTreeSet::len).sum()
    }

    pub fn add_topic(&mut self, topic: Topic) -> Result<(), GraphError> {
        if self.index.contains_key(&topic.key) {
            return Err(GraphError::DuplicateTopic(topic.key));
        }

        tracing::debug!(topic = %topic.key, domain = topic.domain.as_str(), "registered topic");
        self.index.insert(topic.key.clone(), self.topics.len());
        self.topics.push(topic);
        self.prerequisites.push(BTreeSet::new());
        self.dependents.push(BTreeSet::new());
        Ok(())
    }

    /// Records that `prerequisite` must be learned before `topic`.
    pub fn add_prerequisite(&mut self, topic: &str, prerequisite: &str) -> Result<(), GraphError> {
        if !self.check_prerequisite(topic, prerequisite)? {
            return Ok(());
        }

        let t = self.idx(topic)?;
        let p = self.idx(prerequisite)?;
        self.prerequisites[t].insert(p);
        self.dependents[p].insert(t);
        tracing::debug!(topic, prerequisite, "added prerequisite edge");
        Ok(())
    }

    /// Checks an edge without inserting it. `Ok(false)` means the edge is
    /// already present.
    pub fn check_prerequisite(&self, topic: &str, prerequisite: &str) -> Result<bool, GraphError> {
        let t = self.idx(topic)?;
        let p = self.idx(prerequisite)?;

        if self.prerequisites[t].contains(&p) {
            return Ok(false);
        }

        // The new edge p -> t closes a cycle iff p is already reachable from t.
        if self.reaches(t, p) {
            tracing::warn!(topic, prerequisite, "rejected prerequisite edge: cycle");
            return Err(GraphError::Cycle {
                topic: topic.to_string(),
                prerequisite: prerequisite.to_string(),
            });
        }
        Ok(true)
    }

    /// Direct prerequisites, in registration order.
    pub fn get_prerequisites(&self, topic: &str) -> Result<Vec<&Topic>, GraphError> {
        let t = self.idx(topic)?;
        Ok(self.prerequisites[t].iter().map(|&i| &self.topics[i]).collect())
    }

    /// Topics that list `topic` as a direct prerequisite, in registration order.
    pub fn get_dependents(&self, topic: &str) -> Result<Vec<&Topic>, GraphError> {
        let t = self.idx(topic)?;
        Ok(self.dependents[t].iter().map(|&i| &self.topics[i]).collect())
    }

    /// Transitive closure of prerequisites, excluding the topic itself.
    pub fn get_all_prerequisites(&self, topic: &str) -> Result<Vec<&Topic>, GraphError> {
        let t = self.idx(topic)?;
        Ok(self
            .ancestors(t)
            .into_iter()
            .map(|i| &self.topics[i])
            .collect())
    }

    /// Prerequisites within `max_depth` steps, weighted for fractional implicit
    /// repetition: 0.5 for direct prerequisites, halving with each further step.
    /// A topic reachable at several depths keeps its nearest (heaviest) weight.
    /// Ordered by depth, then registration order.
    pub fn fire_ancestors(
        &self,
        topic: &str,
        max_depth: usize,
    ) -> Result<Vec<(&Topic, f64)>, GraphError> {
        let t = self.idx(topic)?;
        let mut seen = BTreeSet::from([t]);
        let mut weighted = Vec::new();
        let mut level: BTreeSet<usize> = self.prerequisites[t].clone();
        let mut weight = 0.5;

        for _ in 0..max_depth {
            if level.is_empty() {
                break;
            }
            let mut next = BTreeSet::new();
            for &i in &level {
                if seen.insert(i) {
                    weighted.push((&self.topics[i], weight));
                    next.extend(self.prerequisites[i].iter().copied());
                }
            }
            level = next;
            weight /= 2.0;
        }
        Ok(weighted)
    }

    /// Every transitive prerequisite plus the topic itself, each placed after
    /// all of its prerequisites. Unconstrained topics keep registration order.
    pub fn get_learning_path(&self, topic: &str) -> Result<Vec<&Topic>, GraphError> {
        self.learning_path_excluding(topic, &HashSet::new())
    }

    /// Like [`get_learning_path`](Self::get_learning_path) but skips topics in
    /// `completed`.
    pub fn learning_path_excluding(
        &self,
        topic: &str,
        completed: &HashSet<String>,
    ) -> Result<Vec<&Topic>, GraphError> {
        let t = self.idx(topic)?;
        let mut needed = self.ancestors(t);
        needed.insert(t);

        Ok(self
            .topological_order(&needed)
            .into_iter()
            .map(|i| &self.topics[i])
            .filter(|topic| !completed.contains(&topic.key))
            .collect())
    }

    /// Topics not yet mastered whose direct prerequisites are all mastered.
    /// Keys in `mastered` that the graph doesn't know are ignored.
    pub fn get_ready_topics(&self, mastered: &HashSet<String>) -> Vec<&Topic> {
        self.topics
            .iter()
            .enumerate()
            .filter(|(_, topic)| !mastered.contains(&topic.key))
            .filter(|(i, _)| {
                self.prerequisites[*i]
                    .iter()
                    .all(|&p| mastered.contains(&self.topics[p].key))
            })
            .map(|(_, topic)| topic)
            .collect()
    }

    pub fn topics_by_domain(&self, domain: &Domain) -> Vec<&Topic> {
        self.topics.iter().filter(|t| &t.domain == domain).collect()
    }

    pub fn search(&self, query: &str) -> Vec<&Topic> {
        self.topics.iter().filter(|t| t.matches(query)).collect()
    }

    fn idx(&self, key: &str) -> Result<usize, GraphError> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| GraphError::UnknownTopic(key.to_string()))
    }

    // Breadth-first walk along dependent edges.
    fn reaches(&self, from: usize, to: usize) -> bool {
        if from == to {
            return true;
        }
        let mut visited = vec![false; self.topics.len()];
        let mut queue = VecDeque::from([from]);
        visited[from] = true;

        while let Some(current) = queue.pop_front() {
            for &next in &self.dependents[current] {
                if next == to {
                    return true;
                }
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }

    fn ancestors(&self, topic: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<usize> = self.prerequisites[topic].iter().copied().collect();

        while let Some(current) = stack.pop() {
            if seen.insert(current) {
                stack.extend(self.prerequisites[current].iter().copied());
            }
        }
        seen
    }

    // Kahn's algorithm over a subset; the min-heap keeps registration order
    // among topics that are ready at the same time.
    fn topological_order(&self, subset: &BTreeSet<usize>) -> Vec<usize> {
        let mut in_degree: HashMap<usize, usize> = subset
            .iter()
            .map(|&i| {
                let deg = self.prerequisites[i]
                    .iter()
                    .filter(|&p| subset.contains(p))
                    .count();
                (i, deg)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(subset.len());
        while let Some(Reverse(current)) = ready.pop() {
            order.push(current);
            for &dep in &self.dependents[current] {
                if let Some(deg) = in_degree.get_mut(&dep) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse(dep));
                    }
                }
            }
        }
        order
    }
}
