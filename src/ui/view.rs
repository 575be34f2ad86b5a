use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{
    conversation::ConversationSummary,
    conversation_list_state::{ConversationListState, ConversationListUiState},
    shell_state::{ActivePane, NoticeLevel, ShellState, StreamStatus},
    stream_state::StreamPhase,
    thread_state::{ThreadState, ThreadUiState},
};

use super::input_box::{render_input_box, InputBox};
use super::message_rendering::{
    build_thread_elements, element_to_list_item, entry_index_to_element_index, format_time,
};
use super::styles;

const COMPOSE_PLACEHOLDER: &str = "Press 'i' to type a message...";
const SEARCH_PLACEHOLDER: &str = "Press '/' to search conversations...";
const NO_PREVIEW: &str = "No messages yet";
const ELLIPSIS: &str = "…";

pub fn render(frame: &mut Frame<'_>, state: &mut ShellState) {
    let [content_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(frame.area());

    let [left_area, right_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .areas(content_area);

    // Input boxes take 3 lines: border, text, border.
    let [search_area, list_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .areas(left_area);

    let [thread_area, compose_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .areas(right_area);

    let active_pane = state.active_pane();

    render_input_box(
        frame,
        search_area,
        &InputBox {
            title: "Search",
            placeholder: SEARCH_PLACEHOLDER,
            input: state.search(),
            focused: active_pane == ActivePane::Search,
        },
    );
    render_conversation_list(
        frame,
        list_area,
        state.conversation_list(),
        active_pane == ActivePane::ConversationList,
    );
    render_thread(
        frame,
        thread_area,
        state.thread_mut(),
        active_pane == ActivePane::Thread,
    );
    render_input_box(
        frame,
        compose_area,
        &InputBox {
            title: "Message",
            placeholder: COMPOSE_PLACEHOLDER,
            input: state.compose(),
            focused: active_pane == ActivePane::Compose,
        },
    );

    frame.render_widget(Paragraph::new(status_line(state)), status_area);
}

fn panel_block(title: String, footer: Option<String>, is_active: bool) -> Block<'static> {
    let border_style = if is_active {
        styles::active_panel_border_style()
    } else {
        styles::inactive_panel_border_style()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    match footer {
        Some(footer) => block.title_bottom(footer),
        None => block,
    }
}

fn render_conversation_list(
    frame: &mut Frame<'_>,
    area: Rect,
    list: &ConversationListState,
    is_active: bool,
) {
    let title = conversation_list_title(list);
    let footer = list.pagination().map(|page| format!(" page {} ", page.label()));

    let placeholder = match list.ui_state() {
        ConversationListUiState::Loading if list.conversations().is_empty() => {
            Some("Loading conversations...")
        }
        ConversationListUiState::Empty if list.filters().is_active() => {
            Some("No conversations match the current filter.")
        }
        ConversationListUiState::Empty => Some("No conversations yet. Press r to refresh."),
        ConversationListUiState::Error => {
            Some("Failed to load conversations. Press r to retry.")
        }
        ConversationListUiState::Loading | ConversationListUiState::Ready => None,
    };

    let block = panel_block(title, footer, is_active);
    if let Some(text) = placeholder {
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem<'static>> = list
        .conversations()
        .iter()
        .map(|conversation| ListItem::new(conversation_line(conversation, inner_width)))
        .collect();

    let widget = List::new(items)
        .block(block)
        .highlight_style(styles::selection_highlight_style());

    let mut list_state = ListState::default();
    list_state.select(list.selected_index());
    frame.render_stateful_widget(widget, area, &mut list_state);
}

fn conversation_list_title(list: &ConversationListState) -> String {
    let mut title = match list.pagination() {
        Some(page) => format!("Conversations ({})", page.total),
        None => "Conversations".to_owned(),
    };

    let filters = list.filters();
    if let Some(term) = filters.search_term() {
        title.push_str(&format!(" search: \"{term}\""));
    }
    if filters.unread_only {
        title.push_str(" [unread]");
    }
    if matches!(list.ui_state(), ConversationListUiState::Loading) {
        title.push_str(" ...");
    }
    title
}

fn conversation_line(conversation: &ConversationSummary, width: usize) -> Line<'static> {
    let timestamp = conversation
        .last_message_unix_ms
        .map(format_time)
        .unwrap_or_default();

    let preview = conversation
        .last_message_preview
        .as_deref()
        .map(normalize_preview)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_PREVIEW.to_owned());

    let badge = if conversation.unread_count > 0 {
        format!(" [{}]", conversation.unread_count)
    } else {
        String::new()
    };

    // timestamp (5) + " | " (3)
    let fixed = 5 + 3;
    let name = truncate_to_width(&conversation.partner_name, width.saturating_sub(fixed + badge.width()));
    let used = fixed + name.width() + 1 + badge.width();
    let available = width.saturating_sub(used);
    let preview = truncate_to_width(&preview, available);
    let padding = available.saturating_sub(preview.width());

    let mut spans = vec![
        Span::styled(format!("{timestamp:>5}"), styles::timestamp_style()),
        Span::styled(" | ", styles::separator_style()),
        Span::styled(name, styles::partner_name_style()),
        Span::raw(" "),
        Span::styled(preview, styles::preview_style()),
    ];
    if padding > 0 {
        spans.push(Span::raw(" ".repeat(padding)));
    }
    if !badge.is_empty() {
        spans.push(Span::styled(badge, styles::unread_count_style()));
    }

    Line::from(spans)
}

fn normalize_preview(preview: &str) -> String {
    preview.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to at most `max_width` terminal columns, ending with an
/// ellipsis when shortened.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - ELLIPSIS.width();
    let mut truncated = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        truncated.push(ch);
        used += ch_width;
    }
    truncated.push_str(ELLIPSIS);
    truncated
}

fn render_thread(frame: &mut Frame<'_>, area: Rect, thread: &mut ThreadState, is_active: bool) {
    let title = thread_title(thread);
    let footer = thread
        .pagination()
        .map(|page| format!(" page {} (n: older, p: newer) ", page.label()));
    let block = panel_block(title, footer, is_active);

    let placeholder = match thread.ui_state() {
        ThreadUiState::Empty => Some("Select a conversation to view messages"),
        ThreadUiState::Loading if thread.entries().is_empty() => Some("Loading messages..."),
        ThreadUiState::Error => Some("Failed to load messages. Press r to retry."),
        ThreadUiState::Ready if thread.entries().is_empty() => {
            Some("No messages yet. Press i to write one.")
        }
        ThreadUiState::Loading | ThreadUiState::Ready => None,
    };

    if let Some(text) = placeholder {
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let elements = build_thread_elements(thread.entries());
    let items: Vec<ListItem<'static>> = elements.iter().map(element_to_list_item).collect();
    let viewport_height = area.height.saturating_sub(2) as usize;

    let element_index = thread
        .selected_index()
        .and_then(|entry_index| entry_index_to_element_index(&elements, entry_index));
    if let Some(index) = element_index {
        thread.update_scroll_offset(index, viewport_height);
    }

    let widget = List::new(items)
        .block(block)
        .highlight_style(styles::selection_highlight_style());

    let mut list_state = ListState::default();
    list_state.select(element_index);
    *list_state.offset_mut() = thread.scroll_offset();
    frame.render_stateful_widget(widget, area, &mut list_state);
}

fn thread_title(thread: &ThreadState) -> String {
    if !thread.is_open() {
        return "Messages".to_owned();
    }

    let suffix = match thread.ui_state() {
        ThreadUiState::Loading => " (loading)",
        ThreadUiState::Error => " (error)",
        ThreadUiState::Empty | ThreadUiState::Ready => "",
    };
    format!("Messages: {}{suffix}", thread.title())
}

fn status_line(state: &ShellState) -> Line<'static> {
    let stream = state.stream_status();
    let mut spans = vec![
        Span::raw("live: "),
        Span::styled(
            stream_label(&stream),
            styles::stream_phase_style(stream.phase == StreamPhase::Connected),
        ),
        Span::raw(" | "),
    ];

    if let Some(in_flight) = state.outbox().in_flight() {
        spans.push(Span::styled(
            format!("sending \"{}\" | ", truncate_to_width(&in_flight.content, 16)),
            styles::pending_marker_style(),
        ));
    }

    match state.notice() {
        Some(notice) => {
            let style = match notice.level {
                NoticeLevel::Info => styles::notice_info_style(),
                NoticeLevel::Error => styles::notice_error_style(),
            };
            spans.push(Span::styled(notice.text.clone(), style));
            spans.push(Span::styled(" (Esc)", styles::key_hint_style()));
        }
        None => spans.push(Span::styled(
            key_hints(state.active_pane()),
            styles::key_hint_style(),
        )),
    }

    Line::from(spans)
}

fn stream_label(status: &StreamStatus) -> String {
    match status.reconnect_in_secs {
        Some(secs) => format!("{} (retry in {secs}s)", status.phase.as_label()),
        None => status.phase.as_label().to_owned(),
    }
}

fn key_hints(pane: ActivePane) -> &'static str {
    match pane {
        ActivePane::ConversationList => {
            "j/k: move | Enter: open | n/p: page | /: search | u: unread | r: refresh | o/y: link | q: quit"
        }
        ActivePane::Thread => {
            "j/k: move | i: compose | n/p: older/newer | r: reload | o/y: link | Esc: back | q: quit"
        }
        ActivePane::Compose => "Enter: send | Esc: back | type your message",
        ActivePane::Search => "Enter: apply | Esc: cancel | type to filter",
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::domain::{
        message::{Message, MessageSender},
        pagination::Pagination,
    };

    fn conversation(partner_id: &str, name: &str, unread_count: u32, preview: Option<&str>) -> ConversationSummary {
        ConversationSummary {
            partner_id: partner_id.to_owned(),
            partner_name: name.to_owned(),
            partner_avatar_url: None,
            last_message_preview: preview.map(ToOwned::to_owned),
            last_message_unix_ms: None,
            last_message_label: None,
            unread_count,
            created_at_unix_ms: None,
        }
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn page(page: u32, pages: u32, total: u64) -> Pagination {
        Pagination {
            total,
            page,
            limit: 20,
            pages,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    const TEST_WIDTH: usize = 50;

    #[test]
    fn conversation_line_includes_name_preview_and_unread_badge() {
        let text = line_text(&conversation_line(
            &conversation("u1", "Maria", 3, Some("See you at 9")),
            TEST_WIDTH,
        ));

        assert!(text.contains("Maria"));
        assert!(text.contains("See you at 9"));
        assert!(text.ends_with("[3]"));
    }

    #[test]
    fn conversation_line_omits_badge_when_read() {
        let text = line_text(&conversation_line(
            &conversation("u1", "Maria", 0, Some("Hello")),
            TEST_WIDTH,
        ));

        assert!(!text.contains("[0]"));
    }

    #[test]
    fn conversation_line_falls_back_to_placeholder_preview() {
        let text = line_text(&conversation_line(
            &conversation("u1", "Maria", 0, Some("  \n\t ")),
            TEST_WIDTH,
        ));

        assert!(text.contains(NO_PREVIEW));
    }

    #[test]
    fn conversation_line_fits_width_with_wide_characters() {
        let line = conversation_line(
            &conversation("u1", "Maria", 12, Some("こんにちは、明日の予定について確認させてください")),
            30,
        );

        assert!(line.width() <= 30);
        assert!(line_text(&line).contains(ELLIPSIS));
    }

    #[test]
    fn truncate_respects_column_budget() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語", 4), "日…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn list_title_shows_total_and_active_filters() {
        let mut list = ConversationListState::default();
        list.filters_mut().search = "ann".to_owned();
        list.filters_mut().unread_only = true;
        list.set_ready(vec![conversation("u1", "Anna", 1, None)], page(1, 1, 1));

        let title = conversation_list_title(&list);

        assert_eq!(title, "Conversations (1) search: \"ann\" [unread]");
    }

    #[test]
    fn thread_title_reflects_loading_state() {
        let mut thread = ThreadState::default();
        assert_eq!(thread_title(&thread), "Messages");

        thread.set_loading("u1".to_owned(), "Maria".to_owned());

        assert_eq!(thread_title(&thread), "Messages: Maria (loading)");
    }

    #[test]
    fn status_line_shows_reconnect_countdown() {
        let mut state = ShellState::default();
        state.set_stream_status(StreamStatus {
            phase: StreamPhase::Disconnected,
            reconnect_in_secs: Some(4),
        });

        let text = line_text(&status_line(&state));

        assert!(text.contains("offline (retry in 4s)"));
    }

    #[test]
    fn status_line_prefers_notice_over_hints() {
        let mut state = ShellState::default();
        state.show_error("Message could not be sent.");

        let text = line_text(&status_line(&state));

        assert!(text.contains("Message could not be sent."));
        assert!(!text.contains("j/k: move"));
    }

    #[test]
    fn renders_list_and_thread_into_buffer() {
        let mut state = ShellState::default();
        state.conversation_list_mut().set_ready(
            vec![
                conversation("u1", "Maria", 2, Some("Can you do Friday?")),
                conversation("u2", "Jonas", 0, Some("Thanks!")),
            ],
            page(1, 3, 42),
        );
        state
            .thread_mut()
            .set_loading("u1".to_owned(), "Maria".to_owned());
        state.thread_mut().set_ready(
            vec![Message {
                id: "m1".to_owned(),
                content: "Can you do Friday?".to_owned(),
                created_at_ms: 1_771_059_600_000,
                read: false,
                sender: MessageSender {
                    id: "u1".to_owned(),
                    name: "Maria".to_owned(),
                    avatar_url: None,
                    is_current_user: false,
                },
                receiver_id: Some("me".to_owned()),
            }],
            None,
            page(1, 1, 1),
        );
        state.set_active_pane(ActivePane::Thread);

        let mut terminal = Terminal::new(TestBackend::new(120, 24)).expect("test terminal");
        terminal
            .draw(|frame| render(frame, &mut state))
            .expect("draw");

        let text = buffer_text(&terminal);
        assert!(text.contains("Conversations (42)"));
        assert!(text.contains("page 1/3"));
        assert!(text.contains("Messages: Maria"));
        assert!(text.contains("Maria:"));
        assert!(text.contains("Can you do Friday?"));
        assert!(text.contains("live: offline"));
    }
}
