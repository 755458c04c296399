use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::card::ArticleCard;
use crate::app::{App, StatusMessage};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // country input
            Constraint::Length(1), // status
            Constraint::Min(5),    // articles
            Constraint::Length(1), // key hints
        ])
        .split(frame.area());

    draw_country_input(frame, app, chunks[0]);
    draw_status(frame, app, chunks[1]);
    draw_articles(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);

    if app.show_help {
        draw_help(frame);
    }
}

fn draw_country_input(frame: &mut Frame, app: &App, area: Rect) {
    let (style, title) = if app.editing_country {
        (
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            " Country Code (Enter to search, Esc to stop editing) ",
        )
    } else {
        (Style::default().fg(Color::Gray), " Country Code ")
    };

    let code = app.state().country_code();
    let content = if code.is_empty() && !app.editing_country {
        Span::styled("Enter country code", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(code.to_string())
    };

    let input = Paragraph::new(Line::from(content))
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);

    if app.editing_country {
        let typed = u16::try_from(code.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(typed);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y.saturating_add(1)));
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.state().loading() {
        Line::from(Span::styled(
            format!("{} Loading...", app.spinner()),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        match &app.status {
            Some(StatusMessage::Info(msg)) => {
                Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Green)))
            }
            Some(StatusMessage::Error(msg)) => Line::from(Span::styled(
                msg.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            None => Line::default(),
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn draw_articles(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Top Headlines ").borders(Borders::ALL);
    let articles = app.state().articles();

    if articles.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    // Cards are keyed by position; the list is rebuilt whenever it changes.
    let items: Vec<ListItem> = articles
        .iter()
        .map(|article| ListItem::new(ArticleCard::from_article(article).lines(width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▌ ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.editing_country {
        "type a code  Enter search  Esc done  Ctrl-C quit"
    } else {
        "/ country  Enter search  j/k move  o read more  ? help  q quit"
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    let text = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::default(),
        Line::from("/ or c      edit country code"),
        Line::from("Enter or s  search headlines"),
        Line::from("j/k, ↓/↑    move selection"),
        Line::from("< / >       first / last article"),
        Line::from("o           read more in browser"),
        Line::from("?           this help"),
        Line::from("q           quit"),
        Line::default(),
        Line::from("Press any key to close"),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Help ").borders(Borders::ALL)),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
