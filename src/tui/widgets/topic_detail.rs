use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use johny::models::{MasteryLevel, Topic};

use crate::display::mastery_bar;
use crate::tui::{App, TopicDetail};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.selected_topic else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Topic Detail ");
        let paragraph = Paragraph::new("No topic selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header info
            Constraint::Length(6), // Progress
            Constraint::Min(0),    // Graph + reviews
        ])
        .split(area);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[2]);

    draw_header(f, detail, chunks[0]);
    draw_progress(f, detail, chunks[1]);
    draw_neighbours(f, detail, bottom[0]);
    draw_path(f, detail, bottom[1]);
    draw_reviews(f, detail, bottom[2]);
}

fn join_keys(topics: &[Topic]) -> String {
    if topics.is_empty() {
        "None".to_string()
    } else {
        topics
            .iter()
            .map(|t| t.key.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn draw_header(f: &mut Frame, detail: &TopicDetail, area: Rect) {
    let topic = &detail.row.topic;
    let description = topic.description.as_deref().unwrap_or("No description");

    let tags = if topic.tags.is_empty() {
        "None".to_string()
    } else {
        topic.tags.join(", ")
    };
    let concepts = if topic.concepts.is_empty() {
        "None".to_string()
    } else {
        topic.concepts.join(", ")
    };

    let text = vec![
        Line::from(vec![
            Span::styled("Description: ", Style::default().fg(Color::Gray)),
            Span::styled(description, Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Domain: ", Style::default().fg(Color::Gray)),
            Span::styled(topic.domain.label(), Style::default().fg(Color::Cyan)),
            Span::styled("  Difficulty: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.1}", topic.difficulty),
                Style::default().fg(Color::White),
            ),
            Span::styled("  Hours: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.0}", topic.estimated_hours),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Tags: ", Style::default().fg(Color::Gray)),
            Span::styled(tags, Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Concepts: ", Style::default().fg(Color::Gray)),
            Span::styled(concepts, Style::default().fg(Color::White)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ({}) ", topic.name, topic.key))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_progress(f: &mut Frame, detail: &TopicDetail, area: Rect) {
    let level = detail.row.level;

    let mut text = vec![Line::from(vec![
        Span::styled("Mastery: ", Style::default().fg(Color::Gray)),
        Span::styled(mastery_bar(level), Style::default().fg(Color::Green)),
        Span::styled(
            format!(" {} ({})", level.as_i32(), level.label()),
            Style::default().fg(Color::Yellow),
        ),
    ])];

    match &detail.record {
        Some(record) => text.push(Line::from(vec![
            Span::styled("Attempts: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{}", record.total_correct, record.total_attempts),
                Style::default().fg(Color::White),
            ),
            Span::styled("  Recent: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.0}%", record.accuracy() * 100.0),
                Style::default().fg(Color::White),
            ),
            Span::styled("  Streak: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", record.streak),
                Style::default().fg(Color::Cyan),
            ),
        ])),
        None => text.push(Line::from(Span::styled(
            "Not started",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    if let Some(review) = &detail.review {
        let overdue = review.next_review <= Utc::now();
        text.push(Line::from(vec![
            Span::styled("Next Review: ", Style::default().fg(Color::Gray)),
            Span::styled(
                review.next_review.format("%b %d %H:%M").to_string(),
                Style::default().fg(if overdue { Color::Red } else { Color::White }),
            ),
            Span::styled("  Interval: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}d", review.interval_days()),
                Style::default().fg(Color::White),
            ),
            Span::styled("  Retention: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.0}%", review.retention(Utc::now()) * 100.0),
                Style::default().fg(Color::Cyan),
            ),
        ]));
        text.push(Line::from(vec![
            Span::styled("Reviews: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{}", review.times_correct, review.times_reviewed),
                Style::default().fg(Color::White),
            ),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Progress ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_neighbours(f: &mut Frame, detail: &TopicDetail, area: Rect) {
    let text = vec![
        Line::from(Span::styled("Requires:", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            join_keys(&detail.prerequisites),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled("Unlocks:", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            join_keys(&detail.dependents),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Gaps ({}):", detail.gaps.len()),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            join_keys(&detail.gaps),
            Style::default().fg(if detail.gaps.is_empty() {
                Color::Green
            } else {
                Color::Red
            }),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Prerequisites ")
        .title_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_path(f: &mut Frame, detail: &TopicDetail, area: Rect) {
    let items: Vec<ListItem> = detail
        .path
        .iter()
        .enumerate()
        .map(|(i, (topic, level))| {
            let color = if *level == MasteryLevel::Unknown {
                Color::White
            } else {
                Color::Green
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(mastery_bar(*level), Style::default().fg(Color::Green)),
                Span::raw(" "),
                Span::styled(topic.key.clone(), Style::default().fg(color)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Learning Path ")
        .title_style(Style::default().fg(Color::Yellow));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

fn draw_reviews(f: &mut Frame, detail: &TopicDetail, area: Rect) {
    let items: Vec<ListItem> = detail
        .recent_reviews
        .iter()
        .map(|log| {
            let (outcome_text, outcome_color) = if log.outcome.is_correct() {
                ("Recalled", Color::Green)
            } else {
                ("Missed", Color::Red)
            };
            let stage = log
                .stage
                .map(|s| format!("stage {}", s))
                .unwrap_or_else(|| "-".to_string());

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", log.reviewed_at.format("%b %d")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<10}", outcome_text),
                    Style::default().fg(outcome_color),
                ),
                Span::styled(stage, Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Recent Reviews ")
        .title_style(Style::default().fg(Color::Magenta));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
