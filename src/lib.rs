//! Learning-coach core: a prerequisite knowledge graph, per-student mastery
//! tracking and spaced review scheduling.

pub mod coach;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod mastery;
pub mod models;
pub mod review;
pub mod student;
pub mod topics;

pub use coach::{Coach, Suggestion};
pub use config::Config;
pub use error::{Error, GraphError, Result};
pub use graph::KnowledgeGraph;
pub use mastery::{MasteryRecord, MasteryTracker};
pub use models::{Domain, MasteryLevel, Topic};
pub use review::{ReviewItem, ReviewScheduler};
pub use student::{ProfileStore, StudentState};
