//! Built-in topic sets for bootstrapping a knowledge graph.

use crate::error::GraphError;
use crate::graph::KnowledgeGraph;
use crate::models::{Domain, Topic};

struct TopicSeed {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    difficulty: f64,
    hours: f64,
    tags: &'static [&'static str],
    concepts: &'static [&'static str],
}

impl TopicSeed {
    fn build(&self, domain: Domain) -> Topic {
        Topic::new(self.key, self.name, domain)
            .with_description(self.description)
            .with_difficulty(self.difficulty)
            .with_estimated_hours(self.hours)
            .with_tags(self.tags)
            .with_concepts(self.concepts)
    }
}

const MATH_TOPICS: &[TopicSeed] = &[
    // Foundations
    TopicSeed {
        key: "arithmetic",
        name: "Arithmetic",
        description: "Addition, subtraction, multiplication, division",
        difficulty: 0.1,
        hours: 2.0,
        tags: &["foundations"],
        concepts: &["order of operations", "estimation"],
    },
    TopicSeed {
        key: "fractions",
        name: "Fractions",
        description: "Fraction operations and equivalence",
        difficulty: 0.2,
        hours: 3.0,
        tags: &["foundations"],
        concepts: &["numerator", "denominator", "mixed numbers"],
    },
    // Algebra
    TopicSeed {
        key: "algebra-basics",
        name: "Algebra Basics",
        description: "Variables, expressions and simple equations",
        difficulty: 0.25,
        hours: 4.0,
        tags: &["algebra"],
        concepts: &["variables", "expressions", "solving for x"],
    },
    TopicSeed {
        key: "linear-equations",
        name: "Linear Equations",
        description: "Single- and multi-variable linear equations",
        difficulty: 0.3,
        hours: 3.0,
        tags: &["algebra"],
        concepts: &["slope", "intercept", "systems of equations"],
    },
    TopicSeed {
        key: "quadratics",
        name: "Quadratic Equations",
        description: "Quadratic equations and functions",
        difficulty: 0.4,
        hours: 4.0,
        tags: &["algebra"],
        concepts: &["factoring", "discriminant", "vertex form"],
    },
    TopicSeed {
        key: "functions",
        name: "Functions",
        description: "Function notation, composition and inverses",
        difficulty: 0.35,
        hours: 4.0,
        tags: &["algebra"],
        concepts: &["domain", "range", "composition", "inverse"],
    },
    TopicSeed {
        key: "trigonometry",
        name: "Trigonometry",
        description: "Trigonometric functions and identities",
        difficulty: 0.45,
        hours: 6.0,
        tags: &["algebra"],
        concepts: &["unit circle", "identities"],
    },
    // Calculus
    TopicSeed {
        key: "limits",
        name: "Limits",
        description: "Limits and continuity",
        difficulty: 0.5,
        hours: 4.0,
        tags: &["calculus"],
        concepts: &["one-sided limits", "continuity"],
    },
    TopicSeed {
        key: "derivatives",
        name: "Derivatives",
        description: "Differentiation rules and applications",
        difficulty: 0.55,
        hours: 6.0,
        tags: &["calculus"],
        concepts: &["chain rule", "product rule", "optimization"],
    },
    TopicSeed {
        key: "integrals",
        name: "Integrals",
        description: "Antiderivatives and definite integrals",
        difficulty: 0.6,
        hours: 8.0,
        tags: &["calculus"],
        concepts: &["fundamental theorem", "substitution"],
    },
    TopicSeed {
        key: "integration-techniques",
        name: "Integration Techniques",
        description: "Integration by parts, partial fractions, trig substitution",
        difficulty: 0.65,
        hours: 6.0,
        tags: &["calculus"],
        concepts: &["integration by parts", "partial fractions"],
    },
    TopicSeed {
        key: "sequences-series",
        name: "Sequences and Series",
        description: "Convergence, power series and Taylor expansion",
        difficulty: 0.6,
        hours: 6.0,
        tags: &["calculus"],
        concepts: &["convergence tests", "taylor series"],
    },
    TopicSeed {
        key: "multivariable-calculus",
        name: "Multivariable Calculus",
        description: "Partial derivatives, gradients and multiple integrals",
        difficulty: 0.7,
        hours: 10.0,
        tags: &["calculus"],
        concepts: &["gradient", "multiple integrals", "vector fields"],
    },
    // Linear algebra
    TopicSeed {
        key: "vectors",
        name: "Vectors",
        description: "Vector operations and geometry",
        difficulty: 0.4,
        hours: 4.0,
        tags: &["linear-algebra"],
        concepts: &["dot product", "cross product"],
    },
    TopicSeed {
        key: "matrices",
        name: "Matrices",
        description: "Matrix arithmetic, inverses and determinants",
        difficulty: 0.45,
        hours: 5.0,
        tags: &["linear-algebra"],
        concepts: &["multiplication", "determinant", "inverse"],
    },
    TopicSeed {
        key: "linear-transformations",
        name: "Linear Transformations",
        description: "Linear maps, kernel and image",
        difficulty: 0.55,
        hours: 4.0,
        tags: &["linear-algebra"],
        concepts: &["kernel", "rank", "nullity"],
    },
    TopicSeed {
        key: "eigenvalues",
        name: "Eigenvalues and Eigenvectors",
        description: "Characteristic polynomials and diagonalization",
        difficulty: 0.6,
        hours: 5.0,
        tags: &["linear-algebra"],
        concepts: &["characteristic polynomial", "diagonalization"],
    },
    // Discrete math
    TopicSeed {
        key: "logic",
        name: "Logic and Proofs",
        description: "Propositional logic, quantifiers and proof techniques",
        difficulty: 0.3,
        hours: 4.0,
        tags: &["discrete"],
        concepts: &["implication", "induction", "contradiction"],
    },
    TopicSeed {
        key: "sets",
        name: "Sets and Relations",
        description: "Set operations, relations and functions between sets",
        difficulty: 0.3,
        hours: 3.0,
        tags: &["discrete"],
        concepts: &["union", "cartesian product", "equivalence relations"],
    },
    TopicSeed {
        key: "combinatorics",
        name: "Combinatorics",
        description: "Counting principles, permutations and combinations",
        difficulty: 0.45,
        hours: 5.0,
        tags: &["discrete"],
        concepts: &["pigeonhole", "binomial coefficients", "inclusion-exclusion"],
    },
    TopicSeed {
        key: "graph-theory",
        name: "Graph Theory",
        description: "Graphs, trees, paths and colorings",
        difficulty: 0.5,
        hours: 5.0,
        tags: &["discrete"],
        concepts: &["trees", "connectivity", "coloring"],
    },
];

// (topic, prerequisites)
const MATH_PREREQUISITES: &[(&str, &[&str])] = &[
    ("fractions", &["arithmetic"]),
    ("algebra-basics", &["arithmetic"]),
    ("linear-equations", &["algebra-basics"]),
    ("quadratics", &["linear-equations"]),
    ("functions", &["algebra-basics"]),
    ("trigonometry", &["functions", "algebra-basics"]),
    ("limits", &["functions", "algebra-basics"]),
    ("derivatives", &["limits"]),
    ("integrals", &["derivatives"]),
    ("integration-techniques", &["integrals"]),
    ("sequences-series", &["limits", "integrals"]),
    ("multivariable-calculus", &["integrals", "vectors"]),
    ("vectors", &["algebra-basics"]),
    ("matrices", &["vectors", "linear-equations"]),
    ("linear-transformations", &["matrices"]),
    ("eigenvalues", &["linear-transformations", "quadratics"]),
    ("logic", &["algebra-basics"]),
    ("sets", &["logic"]),
    ("combinatorics", &["sets", "fractions"]),
    ("graph-theory", &["sets", "combinatorics"]),
];

const INFORMATICS_TOPICS: &[TopicSeed] = &[
    TopicSeed {
        key: "programming-basics",
        name: "Programming Basics",
        description: "Variables, control flow and functions",
        difficulty: 0.2,
        hours: 6.0,
        tags: &["programming"],
        concepts: &["loops", "conditionals", "functions"],
    },
    TopicSeed {
        key: "data-structures",
        name: "Data Structures",
        description: "Arrays, linked lists, stacks, queues and trees",
        difficulty: 0.4,
        hours: 8.0,
        tags: &["programming"],
        concepts: &["stacks", "queues", "trees", "hash tables"],
    },
    TopicSeed {
        key: "algorithms",
        name: "Algorithms",
        description: "Sorting, searching and complexity analysis",
        difficulty: 0.5,
        hours: 10.0,
        tags: &["algorithms"],
        concepts: &["big-o", "sorting", "binary search", "recursion"],
    },
    TopicSeed {
        key: "graph-algorithms",
        name: "Graph Algorithms",
        description: "Traversals, shortest paths and spanning trees",
        difficulty: 0.6,
        hours: 8.0,
        tags: &["algorithms"],
        concepts: &["bfs", "dfs", "dijkstra", "minimum spanning tree"],
    },
    TopicSeed {
        key: "dynamic-programming",
        name: "Dynamic Programming",
        description: "Optimal substructure, memoization and tabulation",
        difficulty: 0.65,
        hours: 8.0,
        tags: &["algorithms"],
        concepts: &["memoization", "tabulation", "recurrences"],
    },
    TopicSeed {
        key: "competitive-programming",
        name: "Competitive Programming",
        description: "Timed problem solving with classic techniques",
        difficulty: 0.8,
        hours: 20.0,
        tags: &["contests"],
        concepts: &["problem decomposition", "complexity budgeting"],
    },
];

const INFORMATICS_PREREQUISITES: &[(&str, &[&str])] = &[
    ("data-structures", &["programming-basics"]),
    ("algorithms", &["data-structures"]),
    ("graph-algorithms", &["algorithms"]),
    ("dynamic-programming", &["algorithms"]),
    (
        "competitive-programming",
        &["graph-algorithms", "dynamic-programming"],
    ),
];

fn load(
    graph: &mut KnowledgeGraph,
    domain: Domain,
    topics: &[TopicSeed],
    prerequisites: &[(&str, &[&str])],
) -> Result<(), GraphError> {
    for entry in topics {
        graph.add_topic(entry.build(domain.clone()))?;
    }
    for (topic, prereqs) in prerequisites {
        for prereq in *prereqs {
            graph.add_prerequisite(topic, prereq)?;
        }
    }
    Ok(())
}

pub fn load_mathematics(graph: &mut KnowledgeGraph) -> Result<(), GraphError> {
    load(graph, Domain::Mathematics, MATH_TOPICS, MATH_PREREQUISITES)
}

pub fn load_informatics(graph: &mut KnowledgeGraph) -> Result<(), GraphError> {
    load(
        graph,
        Domain::Informatics,
        INFORMATICS_TOPICS,
        INFORMATICS_PREREQUISITES,
    )
}

impl KnowledgeGraph {
    /// A graph populated with both built-in topic sets.
    pub fn with_builtin_topics() -> Result<Self, GraphError> {
        let mut graph = KnowledgeGraph::new();
        load_mathematics(&mut graph)?;
        load_informatics(&mut graph)?;
        tracing::debug!(
            topics = graph.len(),
            edges = graph.edge_count(),
            "loaded built-in topic sets"
        );
        Ok(graph)
    }
}
