//! Thread rendering logic.
//!
//! Handles visual formatting of thread entries including:
//! - Multi-line message display (time + sender on first line, text below)
//! - Sender grouping (consecutive messages from one sender show the name once)
//! - Date separators between messages from different days
//! - A marker on messages that are still being sent

use chrono::{Local, TimeZone};
use ratatui::{
    layout::Alignment,
    style::Style,
    text::{Line, Span},
    widgets::ListItem,
};

use crate::domain::message::ThreadEntry;

use super::styles;

pub const PENDING_MARKER: &str = "sending…";
const EMPTY_PLACEHOLDER: &str = "[Empty message]";
const INDENT: &str = "      ";

/// Represents a visual element in the thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadListElement {
    /// Date separator line (e.g., "——— 14 Feb 2026 ———").
    DateSeparator(String),
    Message {
        time: String,
        sender: Option<String>,
        content: String,
        pending: bool,
    },
}

/// Builds the visual elements of a thread.
///
/// Groups consecutive entries from the same sender and inserts date separators.
pub fn build_thread_elements(entries: &[ThreadEntry]) -> Vec<ThreadListElement> {
    let mut elements = Vec::new();
    let mut prev_date: Option<chrono::NaiveDate> = None;
    let mut prev_sender: Option<&str> = None;

    for entry in entries {
        let date = timestamp_to_date(entry.created_at_ms());

        if prev_date != Some(date) {
            elements.push(ThreadListElement::DateSeparator(format_date(date)));
            prev_sender = None;
        }

        let sender_id = entry.sender().id.as_str();
        let sender = (prev_sender != Some(sender_id)).then(|| entry.display_sender().to_owned());

        elements.push(ThreadListElement::Message {
            time: format_time(entry.created_at_ms()),
            sender,
            content: entry.content().to_owned(),
            pending: entry.is_pending(),
        });

        prev_date = Some(date);
        prev_sender = Some(sender_id);
    }

    elements
}

/// Converts an entry index to the corresponding element index, skipping
/// date separators. Returns `None` if the entry index is out of range.
pub fn entry_index_to_element_index(
    elements: &[ThreadListElement],
    entry_index: usize,
) -> Option<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, element)| matches!(element, ThreadListElement::Message { .. }))
        .nth(entry_index)
        .map(|(element_index, _)| element_index)
}

pub fn element_to_list_item(element: &ThreadListElement) -> ListItem<'static> {
    match element {
        ThreadListElement::DateSeparator(date) => date_separator_item(date),
        ThreadListElement::Message {
            time,
            sender,
            content,
            pending,
        } => message_item(time, sender.as_deref(), content, *pending),
    }
}

fn date_separator_item(date: &str) -> ListItem<'static> {
    let line = Line::from(vec![Span::styled(
        format!("——— {date} ———"),
        styles::date_separator_style(),
    )])
    .alignment(Alignment::Center);
    ListItem::new(vec![Line::default(), line, Line::default()])
}

fn message_item(time: &str, sender: Option<&str>, content: &str, pending: bool) -> ListItem<'static> {
    let text_style = if pending {
        styles::pending_message_style()
    } else {
        styles::message_text_style()
    };
    let mut lines = Vec::new();
    let mut content_lines = content.lines();

    match sender {
        Some(name) => {
            let mut header = vec![
                Span::styled(format!("{time:>5} "), styles::message_time_style()),
                Span::styled(format!("{name}:"), styles::message_sender_style()),
            ];
            if pending {
                header.push(pending_span());
            }
            lines.push(Line::from(header));

            for text_line in content_lines {
                lines.push(indented_line(text_line, text_style));
            }
            if content.is_empty() {
                lines.push(Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(EMPTY_PLACEHOLDER, styles::placeholder_style()),
                ]));
            }
        }
        None => {
            // Grouped message: time and first content line share a row.
            let mut first = vec![Span::styled(
                format!("{time:>5} "),
                styles::message_time_style(),
            )];
            match content_lines.next() {
                Some(text_line) => first.push(Span::styled(text_line.to_owned(), text_style)),
                None => first.push(Span::styled(EMPTY_PLACEHOLDER, styles::placeholder_style())),
            }
            if pending {
                first.push(pending_span());
            }
            lines.push(Line::from(first));

            for text_line in content_lines {
                lines.push(indented_line(text_line, text_style));
            }
        }
    }

    ListItem::new(lines)
}

fn indented_line(text: &str, style: Style) -> Line<'static> {
    Line::from(vec![Span::raw(INDENT), Span::styled(text.to_owned(), style)])
}

fn pending_span() -> Span<'static> {
    Span::styled(format!(" {PENDING_MARKER}"), styles::pending_marker_style())
}

fn timestamp_to_date(timestamp_ms: i64) -> chrono::NaiveDate {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.date_naive(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.date_naive(),
        chrono::LocalResult::None => Local::now().date_naive(),
    }
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

pub fn format_time(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::None => "??:??".to_owned(),
    }
}
