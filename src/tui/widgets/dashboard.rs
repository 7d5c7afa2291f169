use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::display::{mastery_bar, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Stats + due reviews row
            Constraint::Min(0),    // Ready to learn
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    draw_stats(f, app, top_chunks[0]);
    draw_due_reviews(f, app, top_chunks[1]);
    draw_ready(f, app, chunks[1]);
}

fn stat_line<'a>(label: &'a str, value: String, color: Color) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;

    let text = vec![
        Line::from(vec![
            Span::styled("Tracked: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.tracked_topics),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        stat_line(
            "Attempts: ",
            format!("{}", stats.total_attempts),
            Color::White,
        ),
        stat_line("Reviews: ", format!("{}", stats.total_reviews), Color::White),
        stat_line("Proficient: ", format!("{}", stats.proficient), Color::Cyan),
        stat_line("Mastered: ", format!("{}", stats.mastered), Color::Green),
        stat_line(
            "Due: ",
            format!("{}", stats.due_now),
            if stats.due_now > 0 {
                Color::Yellow
            } else {
                Color::White
            },
        ),
        stat_line(
            "Avg Mastery: ",
            format!("{:.1}", stats.avg_mastery),
            Color::Cyan,
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_due_reviews(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .due
        .iter()
        .enumerate()
        .map(|(i, due)| {
            let style = if due.overdue_days >= 1.0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<22}", truncate(&due.topic, 20)), style),
                Span::styled(mastery_bar(due.level), Style::default().fg(Color::Green)),
                Span::styled(
                    format!(" {:>4.1}d late", due.overdue_days),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("  {:>3.0}%", due.retention * 100.0),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Due Reviews ({}) ", app.due.len()))
        .title_style(Style::default().fg(Color::Yellow));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

fn draw_ready(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .ready
        .iter()
        .map(|topic| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<26}", truncate(&topic.key, 24)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<14}", topic.domain.label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("difficulty {:.1}  ~{:.0}h", topic.difficulty, topic.estimated_hours),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Ready to Learn ")
        .title_style(Style::default().fg(Color::Magenta));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
