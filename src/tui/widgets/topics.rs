use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::display::{mastery_bar, truncate};
use crate::tui::{App, TopicRow};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let title = if let Some(domain) = &app.filter_domain {
        format!(" Topics (domain: {}) ", domain.label())
    } else {
        " Topics ".to_string()
    };

    let items: Vec<ListItem> = app.topics.items.iter().map(row_item).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("{:<30}", "Name"), header_style),
        Span::styled("Mastery  ", header_style),
        Span::styled(format!("{:<14}", "Level"), header_style),
        Span::styled(format!("{:<8}", "Status"), header_style),
        Span::styled("Next Review", header_style),
    ]);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.topics.selected);

    let header_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };

    f.render_stateful_widget(list, list_area, &mut state);
}

fn row_item(row: &TopicRow) -> ListItem<'static> {
    let (status, status_color) = if row.level.as_i32() > 0 {
        ("started", Color::Cyan)
    } else if row.ready {
        ("ready", Color::Green)
    } else {
        ("locked", Color::DarkGray)
    };

    let (next_text, next_color) = match row.next_review {
        Some(at) if at <= Utc::now() => (format!("{} !", at.format("%b %d")), Color::Red),
        Some(at) => (at.format("%b %d").to_string(), Color::White),
        None => ("-".to_string(), Color::DarkGray),
    };

    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<30}", truncate(&row.topic.name, 28)),
            Style::default().fg(Color::White),
        ),
        Span::styled(mastery_bar(row.level), Style::default().fg(Color::Green)),
        Span::styled(
            format!(" {} ", row.level.as_i32()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("{:<12}", row.level.label()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{:<8}", status), Style::default().fg(status_color)),
        Span::styled(next_text, Style::default().fg(next_color)),
    ]))
}
