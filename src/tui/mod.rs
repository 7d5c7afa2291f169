mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use johny::coach::Coach;
use johny::config::Config;
use johny::db::{Database, ReviewLog};
use johny::graph::KnowledgeGraph;
use johny::mastery::MasteryRecord;
use johny::models::{Domain, MasteryLevel, Topic};
use johny::review::{DueReview, ReviewItem};
use johny::student::{ProfileStore, Stats, StudentState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Topics,
    TopicDetail,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Topics,
            View::Topics => View::Dashboard,
            View::TopicDetail => View::Topics,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Topics,
            View::Topics => View::Dashboard,
            View::TopicDetail => View::Topics,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

/// One line of the topics list.
#[derive(Debug, Clone)]
pub struct TopicRow {
    pub topic: Topic,
    pub level: MasteryLevel,
    pub ready: bool,
    pub next_review: Option<DateTime<Utc>>,
}

pub struct TopicDetail {
    pub row: TopicRow,
    pub prerequisites: Vec<Topic>,
    pub dependents: Vec<Topic>,
    pub path: Vec<(Topic, MasteryLevel)>,
    pub gaps: Vec<Topic>,
    pub record: Option<MasteryRecord>,
    pub review: Option<ReviewItem>,
    pub recent_reviews: Vec<ReviewLog>,
}

pub struct App {
    db: Database,
    graph: KnowledgeGraph,
    config: Config,
    state: StudentState,
    pub view: View,
    pub topics: StatefulList<TopicRow>,
    pub selected_topic: Option<TopicDetail>,
    pub stats: Stats,
    pub due: Vec<DueReview>,
    pub ready: Vec<Topic>,
    pub filter_domain: Option<Domain>,
    pub filter_input: String,
    pub filter_mode: bool,
    pub message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        db: Database,
        graph: KnowledgeGraph,
        config: Config,
        state: StudentState,
    ) -> Self {
        let mut app = Self {
            db,
            graph,
            config,
            state,
            view: View::Dashboard,
            topics: StatefulList::with_items(Vec::new()),
            selected_topic: None,
            stats: Stats::default(),
            due: Vec::new(),
            ready: Vec::new(),
            filter_domain: None,
            filter_input: String::new(),
            filter_mode: false,
            message: None,
            should_quit: false,
        };
        app.rebuild(Utc::now());
        app
    }

    pub fn student(&self) -> &str {
        &self.state.student_id
    }

    fn coach(&self) -> Coach<'_> {
        Coach::new(&self.graph, &self.config)
    }

    /// Recomputes every derived view from the in-memory state.
    fn rebuild(&mut self, now: DateTime<Utc>) {
        let coach = self.coach();
        let stats = coach.stats(&self.state, now);
        let due = coach.due_for_review(&self.state, now);
        let ready_topics = coach.get_ready_topics(&self.state);
        let ready_keys: Vec<&str> = ready_topics.iter().map(|t| t.key.as_str()).collect();

        let rows: Vec<TopicRow> = self
            .graph
            .topics()
            .filter(|t| self.filter_domain.as_ref().map_or(true, |d| &t.domain == d))
            .map(|t| TopicRow {
                topic: t.clone(),
                level: self.state.level(&t.key),
                ready: ready_keys.contains(&t.key.as_str()),
                next_review: self.state.reviews.get(&t.key).map(|i| i.next_review),
            })
            .collect();
        let ready: Vec<Topic> = ready_topics.into_iter().cloned().collect();

        let selected = self.topics.selected;
        self.stats = stats;
        self.due = due;
        self.ready = ready;
        self.topics = StatefulList::with_items(rows);
        if let Some(i) = selected {
            if i < self.topics.items.len() {
                self.topics.selected = Some(i);
            }
        }
    }

    pub fn refresh_data(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.state = self.db.load(&self.state.student_id)?;
        self.rebuild(Utc::now());
        if let Some(key) = self.selected_topic.as_ref().map(|d| d.row.topic.key.clone()) {
            self.open_topic(&key)?;
        }
        Ok(())
    }

    fn apply_filter(&mut self) {
        self.filter_domain = if self.filter_input.trim().is_empty() {
            None
        } else {
            Some(Domain::from_str(self.filter_input.trim()))
        };
        self.topics.selected = None;
        self.rebuild(Utc::now());
    }

    fn open_topic(&mut self, key: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(row) = self.topics.items.iter().find(|r| r.topic.key == key).cloned() else {
            return Ok(());
        };

        let coach = self.coach();
        let owned = |topics: Vec<&Topic>| topics.into_iter().cloned().collect::<Vec<_>>();
        let prerequisites = owned(self.graph.get_prerequisites(key)?);
        let dependents = owned(self.graph.get_dependents(key)?);
        let path = coach
            .get_learning_path(key)?
            .into_iter()
            .map(|t| (t.clone(), self.state.level(&t.key)))
            .collect();
        let gaps = owned(coach.find_gaps(&self.state, key)?);
        let recent_reviews = self.db.recent_reviews(&self.state.student_id, key, 10)?;

        self.selected_topic = Some(TopicDetail {
            row,
            prerequisites,
            dependents,
            path,
            gaps,
            record: self.state.mastery.get(key).cloned(),
            review: self.state.reviews.get(key).cloned(),
            recent_reviews,
        });
        self.view = View::TopicDetail;
        Ok(())
    }

    fn select_topic(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(key) = self.topics.selected_item().map(|r| r.topic.key.clone()) {
            self.open_topic(&key)?;
        }
        Ok(())
    }

    /// Records a review of the open topic and saves the profile.
    fn review_selected(&mut self, correct: bool) -> Result<(), Box<dyn std::error::Error>> {
        let Some(key) = self.selected_topic.as_ref().map(|d| d.row.topic.key.clone()) else {
            return Ok(());
        };

        let now = Utc::now();
        let coach = Coach::new(&self.graph, &self.config);
        let item = coach.record_review(&mut self.state, &key, correct, now)?;
        self.db.log_review(&self.state.student_id, &key, &item)?;
        self.db.save(&self.state)?;

        self.message = Some(format!(
            "Reviewed '{}': next in {} days",
            key,
            item.interval_days()
        ));
        self.rebuild(now);
        self.open_topic(&key)?;
        Ok(())
    }

    fn close_topic(&mut self) {
        self.view = View::Topics;
        self.selected_topic = None;
        self.message = None;
    }

    fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.filter_mode {
            match key {
                KeyCode::Esc => {
                    self.filter_mode = false;
                    self.filter_input.clear();
                }
                KeyCode::Enter => {
                    self.filter_mode = false;
                    self.apply_filter();
                }
                KeyCode::Backspace => {
                    self.filter_input.pop();
                }
                KeyCode::Char(c) => {
                    self.filter_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data()?;
            }

            KeyCode::Char('/') if self.view == View::Topics => {
                self.filter_mode = true;
                self.filter_input.clear();
            }

            KeyCode::Esc => match self.view {
                View::TopicDetail => self.close_topic(),
                View::Topics if self.filter_domain.is_some() => {
                    self.filter_input.clear();
                    self.apply_filter();
                }
                View::Topics | View::Dashboard => {}
            },

            KeyCode::Char('h') | KeyCode::Left => match self.view {
                View::TopicDetail => self.close_topic(),
                _ => self.view = self.view.prev(),
            },
            KeyCode::Char('l') | KeyCode::Right => match self.view {
                View::Topics => self.select_topic()?,
                View::TopicDetail => {}
                _ => self.view = self.view.next(),
            },

            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }
            KeyCode::BackTab => {
                self.view = self.view.prev();
            }

            KeyCode::Char('j') | KeyCode::Down if self.view == View::Topics => self.topics.next(),
            KeyCode::Char('k') | KeyCode::Up if self.view == View::Topics => {
                self.topics.previous()
            }

            KeyCode::Char('g') if !self.topics.items.is_empty() => {
                self.topics.selected = Some(0);
            }
            KeyCode::Char('G') if !self.topics.items.is_empty() => {
                self.topics.selected = Some(self.topics.items.len() - 1);
            }

            KeyCode::Enter if self.view == View::Topics => self.select_topic()?,

            // y/n: record a review outcome for the open topic
            KeyCode::Char('y') if self.view == View::TopicDetail => self.review_selected(true)?,
            KeyCode::Char('n') if self.view == View::TopicDetail => self.review_selected(false)?,

            _ => {}
        }
        Ok(())
    }
}

pub fn run(
    db: Database,
    graph: KnowledgeGraph,
    config: Config,
    state: StudentState,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(db, graph, config, state);

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_app() -> App {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        let graph = db.load_graph().unwrap();
        App::new(db, graph, Config::default(), StudentState::new("ada"))
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE).unwrap();
    }

    mod list_tests {
        use super::*;

        #[test]
        fn navigation_wraps() {
            let mut list = StatefulList::with_items(vec![1, 2, 3]);
            list.previous();
            assert_eq!(list.selected, Some(2));
            list.next();
            assert_eq!(list.selected, Some(0));
        }

        #[test]
        fn empty_list_has_no_selection() {
            let mut list: StatefulList<i32> = StatefulList::with_items(vec![]);
            list.next();
            assert!(list.selected_item().is_none());
        }
    }

    mod app_tests {
        use super::*;

        #[test]
        fn new_app_lists_every_topic() {
            let app = setup_app();
            assert_eq!(app.topics.items.len(), app.graph.len());
            assert_eq!(app.view, View::Dashboard);
            let ready: Vec<&str> = app.ready.iter().map(|t| t.key.as_str()).collect();
            assert_eq!(ready, vec!["arithmetic", "programming-basics"]);
        }

        #[test]
        fn domain_filter_narrows_topics() {
            let mut app = setup_app();
            press(&mut app, KeyCode::Char('l'));
            assert_eq!(app.view, View::Topics);

            press(&mut app, KeyCode::Char('/'));
            for c in "cs".chars() {
                press(&mut app, KeyCode::Char(c));
            }
            press(&mut app, KeyCode::Enter);

            assert_eq!(app.filter_domain, Some(Domain::Informatics));
            assert!(app
                .topics
                .items
                .iter()
                .all(|r| r.topic.domain == Domain::Informatics));

            press(&mut app, KeyCode::Esc);
            assert!(app.filter_domain.is_none());
            assert_eq!(app.topics.items.len(), app.graph.len());
        }

        #[test]
        fn open_topic_shows_path_and_gaps() {
            let mut app = setup_app();
            app.view = View::Topics;
            app.open_topic("derivatives").unwrap();

            let detail = app.selected_topic.as_ref().unwrap();
            assert_eq!(app.view, View::TopicDetail);
            assert_eq!(detail.path.last().unwrap().0.key, "derivatives");
            assert_eq!(detail.gaps.len(), detail.path.len() - 1);
            assert_eq!(detail.prerequisites[0].key, "limits");
        }

        #[test]
        fn review_from_detail_is_saved() {
            let mut app = setup_app();
            app.view = View::Topics;
            app.open_topic("arithmetic").unwrap();
            press(&mut app, KeyCode::Char('y'));

            let detail = app.selected_topic.as_ref().unwrap();
            assert_eq!(detail.review.as_ref().unwrap().times_reviewed, 1);
            assert_eq!(detail.recent_reviews.len(), 1);
            assert_eq!(app.db.load("ada").unwrap().reviews.len(), 1);

            press(&mut app, KeyCode::Char('h'));
            assert_eq!(app.view, View::Topics);
            assert!(app.selected_topic.is_none());
        }
    }
}
