mod display;
mod tui;

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::display::{format_when, mastery_bar, truncate};
use johny::coach::{Coach, Suggestion};
use johny::config::Config;
use johny::db::Database;
use johny::error::GraphError;
use johny::graph::KnowledgeGraph;
use johny::mastery::SessionOutcome;
use johny::models::{Domain, JsonOutput, MasteryLevel, Outcome, Topic};
use johny::student::{ProfileStore, StudentState};

const LOG_ENV: &str = "JOHNY_LOG";
const DEFAULT_LOG_FILTER: &str = "johny=warn";

#[derive(Parser)]
#[command(name = "johny")]
#[command(about = "A learning coach: prerequisite graphs, mastery levels and spaced review")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Student profile to use (defaults to the configured student)
    #[arg(long, short, global = true, env = "JOHNY_STUDENT")]
    student: Option<String>,

    /// Path to a config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Browse and extend the knowledge graph
    #[command(subcommand)]
    Topic(TopicCommands),

    /// Show the ordered learning path to a topic
    Path {
        /// Topic key
        topic: String,

        /// Include topics already learned
        #[arg(long, short)]
        all: bool,
    },

    /// List topics whose prerequisites are all learned
    Ready {
        /// Filter by domain
        #[arg(long, short)]
        domain: Option<String>,
    },

    /// List unlearned prerequisites of a topic
    Gaps {
        /// Topic key
        topic: String,
    },

    /// Record a single practice attempt
    Attempt {
        /// Topic key
        topic: String,

        /// Attempt outcome: correct/incorrect
        #[arg(long, short)]
        outcome: String,
    },

    /// Close the open practice session for a topic
    EndSession {
        /// Topic key
        topic: String,

        /// A problem in a new context was solved during this session
        #[arg(long)]
        novel: bool,
    },

    /// Record a whole practice session at once
    Session {
        /// Topic key
        topic: String,

        /// Problems solved correctly
        correct: u32,

        /// Problems attempted
        total: u32,

        /// A problem in a new context was solved during this session
        #[arg(long)]
        novel: bool,
    },

    /// Record a review outcome for a topic
    Review {
        /// Topic key
        topic: String,

        /// Review outcome: correct/incorrect
        #[arg(long, short)]
        outcome: String,
    },

    /// List reviews that are due
    Due,

    /// Show mastery for one topic, or every practiced topic
    Status {
        /// Topic key
        topic: Option<String>,
    },

    /// Suggest what to work on next (stochastic selection)
    Next,

    /// Show learning statistics
    Stats,

    /// List students with a saved profile
    Students,

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum TopicCommands {
    /// List all topics
    List {
        /// Filter by domain
        #[arg(long, short)]
        domain: Option<String>,
    },

    /// Show topic details
    Show {
        /// Topic key
        key: String,
    },

    /// Register a new topic
    Add {
        /// Unique topic key
        key: String,

        /// Display name
        name: String,

        /// Domain (mathematics, informatics, or any other name)
        #[arg(long, short = 'D', default_value = "other")]
        domain: String,

        /// Topic description
        #[arg(long, short)]
        description: Option<String>,

        /// Difficulty between 0 and 1
        #[arg(long)]
        difficulty: Option<f64>,

        /// Comma-separated tags
        #[arg(long, short)]
        tags: Option<String>,
    },

    /// Make one topic a prerequisite of another
    Link {
        /// Topic that depends on the prerequisite
        topic: String,

        /// Prerequisite topic
        prerequisite: String,
    },

    /// Search topics by key, name, description or tag
    Search {
        query: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    if let Err(e) = run(cli) {
        if json {
            match serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                Ok(out) => println!("{}", out),
                Err(_) => eprintln!("Error: {}", e),
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::resolve(cli.config.as_deref())?;
    let db_path = config.db_path();
    let db = Database::open(&db_path)?;
    db.init()?;

    let mut graph = db.load_graph()?;
    let student = cli.student.unwrap_or_else(|| config.student.clone());
    let json = cli.json;
    tracing::debug!(db = %db_path.display(), student = %student, "starting");

    match cli.command {
        Commands::Init => {
            if json {
                print_json(&serde_json::json!({
                    "database": db_path,
                    "topics": graph.len(),
                }))?;
            } else {
                println!("Database initialized at: {}", db_path.display());
                println!("{} topics loaded.", graph.len());
            }
        }

        Commands::Topic(cmd) => topic_command(cmd, &db, &mut graph, &config, &student, json)?,

        Commands::Students => {
            let students = db.list_students()?;
            if json {
                print_json(&students)?;
            } else if students.is_empty() {
                println!("No student profiles saved yet.");
            } else {
                for id in students {
                    let marker = if id == student { "*" } else { " " };
                    println!("{} {}", marker, id);
                }
            }
        }

        Commands::Tui => {
            let state = db.load(&student)?;
            tui::run(db, graph, config, state)?;
        }

        cmd => {
            let coach = Coach::new(&graph, &config);
            let mut state = db.load(&student)?;
            coach_command(cmd, &coach, &db, &mut state, json)?;
        }
    }

    Ok(())
}

fn topic_command(
    cmd: TopicCommands,
    db: &Database,
    graph: &mut KnowledgeGraph,
    config: &Config,
    student: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TopicCommands::List { domain } => {
            let topics: Vec<&Topic> = match domain.as_deref() {
                Some(d) => graph.topics_by_domain(&Domain::from_str(d)),
                None => graph.topics().collect(),
            };
            let state = db.load(student)?;
            print_topics(&topics, &state, json)?;
        }

        TopicCommands::Search { query } => {
            let topics = graph.search(&query);
            let state = db.load(student)?;
            print_topics(&topics, &state, json)?;
        }

        TopicCommands::Show { key } => {
            let coach = Coach::new(graph, config);
            let state = db.load(student)?;
            let topic = graph
                .topic(&key)
                .ok_or_else(|| GraphError::UnknownTopic(key.clone()))?;
            let prerequisites = graph.get_prerequisites(&key)?;
            let dependents = graph.get_dependents(&key)?;
            let gaps = coach.find_gaps(&state, &key)?;
            let record = state.mastery.get(&key);
            let review = state.reviews.get(&key);

            if json {
                print_json(&serde_json::json!({
                    "topic": topic,
                    "level": coach.get_mastery(&state, &key),
                    "prerequisites": keys(&prerequisites),
                    "dependents": keys(&dependents),
                    "gaps": keys(&gaps),
                    "record": record,
                    "review": review,
                }))?;
            } else {
                println!("Topic: {} ({})", topic.name, topic.key);
                println!("Domain: {}", topic.domain.label());
                if let Some(desc) = &topic.description {
                    println!("Description: {}", desc);
                }
                println!(
                    "Difficulty: {:.2}  Estimated hours: {:.1}",
                    topic.difficulty, topic.estimated_hours
                );
                println!("Tags: {}", join_or_dash(&topic.tags));
                println!("Prerequisites: {}", join_or_dash(&keys(&prerequisites)));
                println!("Unlocks: {}", join_or_dash(&keys(&dependents)));
                println!("Gaps: {}", join_or_dash(&keys(&gaps)));

                let level = coach.get_mastery(&state, &key);
                println!();
                println!("--- Progress ---");
                println!("Mastery: {} {} (level {})", mastery_bar(level), level.label(), level.as_i32());
                if let Some(r) = record {
                    println!(
                        "Attempts: {} ({:.0}% recent accuracy, standing {})",
                        r.total_attempts,
                        r.accuracy() * 100.0,
                        r.standing(&config.mastery.thresholds).label()
                    );
                    println!(
                        "Sessions: {} (streak {})",
                        r.sessions_completed, r.streak
                    );
                }
                if let Some(item) = review {
                    println!(
                        "Next review: {} (every {} days, {} reviews)",
                        format_when(item.next_review, Utc::now()),
                        item.interval_days(),
                        item.times_reviewed
                    );
                }
            }
        }

        TopicCommands::Add {
            key,
            name,
            domain,
            description,
            difficulty,
            tags,
        } => {
            let tag_list: Vec<String> = tags.map(|t| split_tags(&t)).unwrap_or_default();
            let mut topic = Topic::new(key.clone(), name.clone(), Domain::from_str(&domain));
            topic.description = description;
            topic.tags = tag_list;
            if let Some(d) = difficulty {
                topic = topic.with_difficulty(d);
            }

            db.register_topic(graph, topic)?;

            if json {
                print_json(&serde_json::json!({ "key": key, "name": name }))?;
            } else {
                println!("Added topic '{}' ({}).", name, key);
            }
        }

        TopicCommands::Link {
            topic,
            prerequisite,
        } => {
            db.register_prerequisite(graph, &topic, &prerequisite)?;

            if json {
                print_json(&())?;
            } else {
                println!("'{}' is now a prerequisite of '{}'.", prerequisite, topic);
            }
        }
    }

    Ok(())
}

fn coach_command(
    cmd: Commands,
    coach: &Coach<'_>,
    db: &Database,
    state: &mut StudentState,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();

    match cmd {
        Commands::Path { topic, all } => {
            let path = if all {
                coach.get_learning_path(&topic)?
            } else {
                coach.remaining_path(state, &topic)?
            };
            print_topics(&path, state, json)?;
        }

        Commands::Ready { domain } => {
            let domain = domain.map(|d| Domain::from_str(&d));
            let ready: Vec<&Topic> = coach
                .get_ready_topics(state)
                .into_iter()
                .filter(|t| domain.as_ref().map_or(true, |d| &t.domain == d))
                .collect();
            print_topics(&ready, state, json)?;
        }

        Commands::Gaps { topic } => {
            let gaps = coach.find_gaps(state, &topic)?;
            if !json && gaps.is_empty() {
                println!("No gaps: every prerequisite of '{}' is learned.", topic);
            } else {
                print_topics(&gaps, state, json)?;
            }
        }

        Commands::Attempt { topic, outcome } => {
            let outcome = parse_outcome(&outcome)?;
            let result = coach.record_attempt(state, &topic, outcome.is_correct(), now)?;
            db.log_attempt(&state.student_id, &topic, outcome.is_correct(), now)?;
            db.save(state)?;

            if json {
                print_json(&result)?;
            } else {
                if let Some(closed) = &result.closed_session {
                    println!("Previous session closed after idle time.");
                    print_session(closed);
                }
                println!(
                    "Recorded {} attempt on '{}'. Level {} ({}), recent accuracy {:.0}%.",
                    outcome.as_str(),
                    topic,
                    result.level.as_i32(),
                    result.level.label(),
                    result.accuracy * 100.0
                );
                if result.enrolled_for_review {
                    println!("'{}' is now scheduled for review.", topic);
                }
            }
        }

        Commands::EndSession { topic, novel } => {
            let result = coach.close_session(state, &topic, novel, now)?;
            db.save(state)?;

            match (&result, json) {
                (_, true) => print_json(&result)?,
                (Some(outcome), false) => print_session(outcome),
                (None, false) => println!("No open session for '{}'.", topic),
            }
        }

        Commands::Session {
            topic,
            correct,
            total,
            novel,
        } => {
            let result = coach.record_session(state, &topic, correct, total, novel, now)?;
            for i in 0..total {
                db.log_attempt(&state.student_id, &topic, i < correct, now)?;
            }
            db.save(state)?;

            match (&result, json) {
                (_, true) => print_json(&result)?,
                (Some(outcome), false) => print_session(outcome),
                (None, false) => println!("Empty session ignored."),
            }
        }

        Commands::Review { topic, outcome } => {
            let outcome = parse_outcome(&outcome)?;
            let item = coach.record_review(state, &topic, outcome.is_correct(), now)?;
            db.log_review(&state.student_id, &topic, &item)?;
            db.save(state)?;

            if json {
                print_json(&item)?;
            } else {
                println!("Review recorded for '{}'.", topic);
                println!(
                    "Next review in {} days: {}",
                    item.interval_days(),
                    item.next_review.format("%Y-%m-%d %H:%M")
                );
            }
        }

        Commands::Due => {
            let due = coach.due_for_review(state, now);
            if json {
                print_json(&due)?;
            } else if due.is_empty() {
                println!("Nothing due for review.");
            } else {
                println!("{:<28} {:<10} {:<12} RETENTION", "TOPIC", "LEVEL", "OVERDUE");
                println!("{}", "-".repeat(64));
                for d in due {
                    println!(
                        "{:<28} {:<10} {:<12} {:.0}%",
                        truncate(&d.topic, 26),
                        mastery_bar(d.level),
                        format!("{:.1} days", d.overdue_days),
                        d.retention * 100.0
                    );
                }
            }
        }

        Commands::Status { topic } => match topic {
            Some(topic) => {
                if !coach.graph().contains(&topic) {
                    return Err(GraphError::UnknownTopic(topic).into());
                }
                let record = state.mastery.get(&topic);
                let review = state.reviews.get(&topic);
                if json {
                    print_json(&serde_json::json!({
                        "topic": topic,
                        "level": coach.get_mastery(state, &topic),
                        "record": record,
                        "review": review,
                    }))?;
                } else {
                    let level = coach.get_mastery(state, &topic);
                    println!("{}: {} {}", topic, mastery_bar(level), level.label());
                    match record {
                        Some(r) => {
                            println!(
                                "Attempts: {} total, {} correct, {:.0}% recent accuracy",
                                r.total_attempts,
                                r.total_correct,
                                r.accuracy() * 100.0
                            );
                            println!(
                                "Sessions: {} completed, streak {}{}",
                                r.sessions_completed,
                                r.streak,
                                if r.session.is_some() { ", one open" } else { "" }
                            );
                            if let Some(met) = r.criterion_met_at {
                                println!(
                                    "Recall check from: {}",
                                    (met + chrono::Duration::days(
                                        coach.tracker().policy().retention_window_days
                                    ))
                                    .format("%Y-%m-%d")
                                );
                            }
                        }
                        None => println!("Not practiced yet."),
                    }
                    if let Some(item) = review {
                        println!("Next review: {}", format_when(item.next_review, now));
                    }
                }
            }
            None => {
                if json {
                    let rows: Vec<_> = state
                        .mastery
                        .iter()
                        .map(|(k, r)| {
                            serde_json::json!({
                                "topic": k,
                                "level": r.level,
                                "accuracy": r.accuracy(),
                                "streak": r.streak,
                                "next_review": state.reviews.get(k).map(|i| i.next_review),
                            })
                        })
                        .collect();
                    print_json(&rows)?;
                } else if state.mastery.is_empty() {
                    println!("No topics practiced yet.");
                } else {
                    println!("{:<28} {:<8} {:<12} {:<8} NEXT REVIEW", "TOPIC", "MASTERY", "LEVEL", "ACC");
                    println!("{}", "-".repeat(72));
                    for (key, r) in &state.mastery {
                        let next = state
                            .reviews
                            .get(key)
                            .map(|i| format_when(i.next_review, now))
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "{:<28} {:<8} {:<12} {:<8} {}",
                            truncate(key, 26),
                            mastery_bar(r.level),
                            r.level.label(),
                            format!("{:.0}%", r.accuracy() * 100.0),
                            next
                        );
                    }
                }
            }
        },

        Commands::Next => {
            let mut rng = rand::thread_rng();
            let suggestion = coach.next_topic(state, now, &mut rng);
            if json {
                print_json(&suggestion)?;
            } else {
                match suggestion {
                    Some(Suggestion::Review { topic, due }) => {
                        println!("=== Review ===");
                        println!();
                        println!("Topic: {} ({})", topic.name, topic.key);
                        println!(
                            "Overdue by {:.1} days, estimated retention {:.0}%",
                            due.overdue_days.max(0.0),
                            due.retention * 100.0
                        );
                        println!("Mastery: {} {}", mastery_bar(due.level), due.level.label());
                        println!();
                        println!("After reviewing, record the outcome with:");
                        println!("  johny review {} --outcome <correct|incorrect>", topic.key);
                    }
                    Some(Suggestion::Learn { topic }) => {
                        println!("=== Learn ===");
                        println!();
                        println!("Topic: {} ({})", topic.name, topic.key);
                        if let Some(desc) = &topic.description {
                            println!("Description: {}", desc);
                        }
                        if !topic.concepts.is_empty() {
                            println!("Concepts: {}", topic.concepts.join(", "));
                        }
                        println!();
                        println!("Record practice with:");
                        println!("  johny attempt {} --outcome <correct|incorrect>", topic.key);
                    }
                    None => println!("Nothing due and nothing ready. Add topics or links first!"),
                }
            }
        }

        Commands::Stats => {
            let stats = coach.stats(state, now);
            let logged = db.attempt_count(&state.student_id)?;
            if json {
                print_json(&serde_json::json!({
                    "student": state.student_id,
                    "graph_topics": coach.graph().len(),
                    "logged_attempts": logged,
                    "stats": stats,
                }))?;
            } else {
                println!("=== Learning Statistics ({}) ===", state.student_id);
                println!("Topics in graph: {}", coach.graph().len());
                println!("Topics practiced: {}", stats.tracked_topics);
                println!("Attempts: {} ({} in history)", stats.total_attempts, logged);
                println!("Reviews: {}", stats.total_reviews);
                println!("Proficient or better: {}", stats.proficient);
                println!("Mastered (level 4): {}", stats.mastered);
                println!("Due for review: {}", stats.due_now);
                println!("Average mastery: {:.1}/{}", stats.avg_mastery, MasteryLevel::MAX.as_i32());
            }
        }

        Commands::Init | Commands::Topic(_) | Commands::Students | Commands::Tui => {
            unreachable!("handled before the coach is built")
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(data: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(&JsonOutput::ok(data))?);
    Ok(())
}

fn print_topics(
    topics: &[&Topic],
    state: &StudentState,
    json: bool,
) -> Result<(), serde_json::Error> {
    if json {
        return print_json(&topics);
    }
    if topics.is_empty() {
        println!("No topics found.");
        return Ok(());
    }

    println!("{:<26} {:<32} {:<12} MASTERY", "KEY", "NAME", "DOMAIN");
    println!("{}", "-".repeat(80));
    for topic in topics {
        let level = state.level(&topic.key);
        println!(
            "{:<26} {:<32} {:<12} {}",
            truncate(&topic.key, 24),
            truncate(&topic.name, 30),
            truncate(topic.domain.label(), 11),
            mastery_bar(level)
        );
    }
    Ok(())
}

fn print_session(outcome: &SessionOutcome) {
    println!(
        "Session on '{}': {} problems, {:.0}% correct.",
        outcome.topic,
        outcome.attempts,
        outcome.accuracy * 100.0
    );
    if outcome.advanced() {
        println!(
            "Advanced to level {} ({})!",
            outcome.level.as_i32(),
            outcome.level.label()
        );
    } else {
        println!(
            "Level {} ({}), streak {}: {}.",
            outcome.level.as_i32(),
            outcome.level.label(),
            outcome.streak,
            outcome.status.label()
        );
    }
}

fn parse_outcome(s: &str) -> Result<Outcome, String> {
    Outcome::from_str(s)
        .ok_or_else(|| format!("Invalid outcome '{}'. Use: correct or incorrect", s))
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn keys(topics: &[&Topic]) -> Vec<String> {
    topics.iter().map(|t| t.key.clone()).collect()
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
