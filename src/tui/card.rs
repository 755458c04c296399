use chrono::{DateTime, Local};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::models::Article;

/// What one article shows on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    /// Only set when the article carries a non-empty image URL.
    pub image: Option<String>,
    pub title: String,
    pub description: String,
    pub source: String,
    pub author: Option<String>,
    pub published: String,
    pub link: String,
}

impl ArticleCard {
    pub fn from_article(article: &Article) -> Self {
        Self {
            image: article
                .url_to_image
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            title: article.title.clone(),
            description: article.description.clone().unwrap_or_default(),
            source: article.source.name.clone(),
            author: article
                .author
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            published: local_timestamp(&article.published_at),
            link: article.url.clone(),
        }
    }

    /// Wrapped, styled lines for a list item `width` columns wide.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let width = width.max(20);
        let mut lines = Vec::new();

        if let Some(image) = &self.image {
            lines.push(Line::from(Span::styled(
                format!("[image] {}", truncate(image, width.saturating_sub(8))),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let title_style = Style::default().add_modifier(Modifier::BOLD);
        for chunk in textwrap::wrap(&self.title, width) {
            lines.push(Line::from(Span::styled(chunk.into_owned(), title_style)));
        }

        let desc_style = Style::default().fg(Color::Gray);
        for chunk in textwrap::wrap(&self.description, width) {
            lines.push(Line::from(Span::styled(chunk.into_owned(), desc_style)));
        }

        lines.push(Line::from(vec![
            Span::styled(
                self.byline(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
            Span::raw("  "),
            Span::styled(self.published.clone(), Style::default().fg(Color::DarkGray)),
        ]));

        lines.push(Line::from(Span::styled(
            "Read more (o)",
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )));
        lines.push(Line::default());

        lines
    }

    /// Publisher, followed by the author when the service names one.
    pub fn byline(&self) -> String {
        match &self.author {
            Some(author) => format!("{} · {}", self.source, author),
            None => self.source.clone(),
        }
    }

    /// Plain-text form used by headless `--print` output.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        if let Some(image) = &self.image {
            out.push_str(&format!("[image] {}\n", image));
        }
        out.push_str(&self.title);
        out.push('\n');
        if !self.description.is_empty() {
            out.push_str(&self.description);
            out.push('\n');
        }
        out.push_str(&format!("{} | {}\n", self.byline(), self.published));
        out.push_str(&self.link);
        out.push('\n');
        out
    }
}

/// ISO-8601 in, local `YYYY-MM-DD HH:MM` out. Text that does not parse is
/// shown as received.
pub fn local_timestamp(published_at: &str) -> String {
    match DateTime::parse_from_rfc3339(published_at) {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => published_at.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
