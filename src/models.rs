use serde::{Deserialize, Serialize};

/// Subject area a topic belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Domain {
    Mathematics,
    Informatics,
    Other(String),
}

impl Domain {
    pub fn as_str(&self) -> &str {
        match self {
            Domain::Mathematics => "mathematics",
            Domain::Informatics => "informatics",
            Domain::Other(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "mathematics" | "math" | "maths" => Domain::Mathematics,
            "informatics" | "cs" | "computer-science" | "programming" => Domain::Informatics,
            other => Domain::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Domain::Mathematics => "Mathematics",
            Domain::Informatics => "Informatics",
            Domain::Other(name) => name,
        }
    }
}

impl From<String> for Domain {
    fn from(s: String) -> Self {
        Domain::from_str(&s)
    }
}

impl From<Domain> for String {
    fn from(d: Domain) -> Self {
        d.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub key: String,
    pub name: String,
    pub domain: Domain,
    pub description: Option<String>,
    // 0-1 scale
    pub difficulty: f64,
    pub estimated_hours: f64,
    pub tags: Vec<String>,
    pub concepts: Vec<String>,
}

impl Topic {
    pub fn new(key: impl Into<String>, name: impl Into<String>, domain: Domain) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            domain,
            description: None,
            difficulty: 0.5,
            estimated_hours: 1.0,
            tags: Vec::new(),
            concepts: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty.clamp(0.0, 1.0);
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours.max(0.0);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_concepts(mut self, concepts: &[&str]) -> Self {
        self.concepts = concepts.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Case-insensitive match against key, name, description and tags.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.key.to_lowercase().contains(&query)
            || self.name.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

// Mastery levels, monotonically increasing per (student, topic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MasteryLevel {
    Unknown = 0,
    Introduced = 1,
    Developing = 2,
    Proficient = 3,
    Mastered = 4,
}

impl MasteryLevel {
    pub const MAX: MasteryLevel = MasteryLevel::Mastered;

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => MasteryLevel::Introduced,
            2 => MasteryLevel::Developing,
            3 => MasteryLevel::Proficient,
            v if v >= 4 => MasteryLevel::Mastered,
            _ => MasteryLevel::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MasteryLevel::Unknown => "Unknown",
            MasteryLevel::Introduced => "Introduced",
            MasteryLevel::Developing => "Developing",
            MasteryLevel::Proficient => "Proficient",
            MasteryLevel::Mastered => "Mastered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unknown" | "0" => Some(MasteryLevel::Unknown),
            "introduced" | "1" => Some(MasteryLevel::Introduced),
            "developing" | "2" => Some(MasteryLevel::Developing),
            "proficient" | "3" => Some(MasteryLevel::Proficient),
            "mastered" | "4" => Some(MasteryLevel::Mastered),
            _ => None,
        }
    }

    /// The level one step up, or `None` at the top.
    pub fn next(&self) -> Option<Self> {
        match self {
            MasteryLevel::Unknown => Some(MasteryLevel::Introduced),
            MasteryLevel::Introduced => Some(MasteryLevel::Developing),
            MasteryLevel::Developing => Some(MasteryLevel::Proficient),
            MasteryLevel::Proficient => Some(MasteryLevel::Mastered),
            MasteryLevel::Mastered => None,
        }
    }
}

impl Default for MasteryLevel {
    fn default() -> Self {
        MasteryLevel::Unknown
    }
}

/// Result of a single practice attempt or review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Correct => "correct",
            Outcome::Incorrect => "incorrect",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "correct" | "c" | "success" | "s" | "yes" | "y" | "1" | "true" => {
                Some(Outcome::Correct)
            }
            "incorrect" | "i" | "wrong" | "fail" | "f" | "no" | "n" | "0" | "false" => {
                Some(Outcome::Incorrect)
            }
            _ => None,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

impl From<bool> for Outcome {
    fn from(correct: bool) -> Self {
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod domain_tests {
        use super::*;

        #[test]
        fn from_str_aliases() {
            assert_eq!(Domain::from_str("math"), Domain::Mathematics);
            assert_eq!(Domain::from_str("Mathematics"), Domain::Mathematics);
            assert_eq!(Domain::from_str("cs"), Domain::Informatics);
            assert_eq!(Domain::from_str(" INFORMATICS "), Domain::Informatics);
        }

        #[test]
        fn unknown_domain_is_kept() {
            assert_eq!(
                Domain::from_str("physics"),
                Domain::Other("physics".to_string())
            );
            assert_eq!(Domain::from_str("physics").as_str(), "physics");
        }

        #[test]
        fn serializes_as_plain_string() {
            let json = serde_json::to_string(&Domain::Informatics).unwrap();
            assert_eq!(json, "\"informatics\"");
            let back: Domain = serde_json::from_str("\"math\"").unwrap();
            assert_eq!(back, Domain::Mathematics);
        }
    }

    mod topic_tests {
        use super::*;

        fn calculus() -> Topic {
            Topic::new("calculus", "Calculus", Domain::Mathematics)
                .with_description("Limits, derivatives and integrals")
                .with_tags(&["analysis"])
        }

        #[test]
        fn new_has_defaults() {
            let t = Topic::new("x", "X", Domain::Mathematics);
            assert_eq!(t.difficulty, 0.5);
            assert!(t.description.is_none());
            assert!(t.tags.is_empty());
        }

        #[test]
        fn difficulty_is_clamped() {
            let t = Topic::new("x", "X", Domain::Mathematics).with_difficulty(3.0);
            assert_eq!(t.difficulty, 1.0);
        }

        #[test]
        fn matches_name_description_and_tags() {
            let t = calculus();
            assert!(t.matches("CALC"));
            assert!(t.matches("derivatives"));
            assert!(t.matches("analysis"));
            assert!(!t.matches("matrices"));
        }
    }

    mod mastery_level_tests {
        use super::*;

        #[test]
        fn as_i32_returns_correct_values() {
            assert_eq!(MasteryLevel::Unknown.as_i32(), 0);
            assert_eq!(MasteryLevel::Introduced.as_i32(), 1);
            assert_eq!(MasteryLevel::Developing.as_i32(), 2);
            assert_eq!(MasteryLevel::Proficient.as_i32(), 3);
            assert_eq!(MasteryLevel::Mastered.as_i32(), 4);
        }

        #[test]
        fn from_i32_clamps_out_of_range() {
            assert_eq!(MasteryLevel::from_i32(-3), MasteryLevel::Unknown);
            assert_eq!(MasteryLevel::from_i32(2), MasteryLevel::Developing);
            assert_eq!(MasteryLevel::from_i32(9), MasteryLevel::Mastered);
        }

        #[test]
        fn from_str_accepts_names_and_numbers() {
            assert_eq!(MasteryLevel::from_str("proficient"), Some(MasteryLevel::Proficient));
            assert_eq!(MasteryLevel::from_str("4"), Some(MasteryLevel::Mastered));
            assert_eq!(MasteryLevel::from_str("fluent"), None);
        }

        #[test]
        fn next_stops_at_mastered() {
            assert_eq!(MasteryLevel::Unknown.next(), Some(MasteryLevel::Introduced));
            assert_eq!(MasteryLevel::Proficient.next(), Some(MasteryLevel::Mastered));
            assert_eq!(MasteryLevel::Mastered.next(), None);
        }

        #[test]
        fn levels_are_ordered() {
            assert!(MasteryLevel::Developing < MasteryLevel::Proficient);
            assert!(MasteryLevel::Mastered > MasteryLevel::Unknown);
        }
    }

    mod outcome_tests {
        use super::*;

        #[test]
        fn from_str_correct_variants() {
            for v in ["correct", "c", "success", "yes", "1", "TRUE"] {
                assert_eq!(Outcome::from_str(v), Some(Outcome::Correct), "'{}'", v);
            }
        }

        #[test]
        fn from_str_incorrect_variants() {
            for v in ["incorrect", "wrong", "fail", "no", "0", "False"] {
                assert_eq!(Outcome::from_str(v), Some(Outcome::Incorrect), "'{}'", v);
            }
        }

        #[test]
        fn from_str_invalid() {
            assert!(Outcome::from_str("maybe").is_none());
            assert!(Outcome::from_str("").is_none());
        }

        #[test]
        fn from_bool() {
            assert!(Outcome::from(true).is_correct());
            assert!(!Outcome::from(false).is_correct());
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn ok_with_unit() {
            let output = JsonOutput::<()>::ok(());
            assert!(output.success);
            assert_eq!(output.data, Some(()));
            assert!(output.error.is_none());
        }

        #[test]
        fn serializes_ok_correctly() {
            let output = JsonOutput::ok("test");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":true"));
            assert!(json.contains("\"data\":\"test\""));
            assert!(json.contains("\"error\":null"));
        }

        #[test]
        fn serializes_err_correctly() {
            let output = JsonOutput::<()>::err("unknown topic: x");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":false"));
            assert!(json.contains("\"data\":null"));
            assert!(json.contains("\"error\":\"unknown topic: x\""));
        }
    }
}
