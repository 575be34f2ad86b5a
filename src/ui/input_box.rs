//! Single-line input fields: the compose box and the search box.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::domain::text_input::TextInput;

use super::styles;

const PROMPT_SYMBOL: &str = "> ";

pub struct InputBox<'a> {
    pub title: &'a str,
    pub placeholder: &'a str,
    pub input: &'a TextInput,
    pub focused: bool,
}

pub fn render_input_box(frame: &mut Frame<'_>, area: Rect, input_box: &InputBox<'_>) {
    let border_style = if input_box.focused {
        styles::active_panel_border_style()
    } else {
        styles::inactive_panel_border_style()
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let (line, cursor_column) = build_input_line(input_box, inner_width);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title(input_box.title.to_owned())
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);

    if input_box.focused {
        let cursor_x = area
            .x
            .saturating_add(1)
            .saturating_add(cursor_column.min(u16::MAX as usize) as u16);
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}

/// Builds the visible line and the cursor column relative to the inner area.
/// Long text scrolls horizontally so the cursor stays visible.
fn build_input_line(input_box: &InputBox<'_>, width: usize) -> (Line<'static>, usize) {
    let prompt = Span::styled(PROMPT_SYMBOL, styles::input_prompt_style());
    let prompt_width = PROMPT_SYMBOL.len();

    if !input_box.focused && input_box.input.is_empty() {
        let placeholder = Span::styled(
            input_box.placeholder.to_owned(),
            styles::input_placeholder_style(),
        );
        return (Line::from(vec![prompt, placeholder]), prompt_width);
    }

    let text = input_box.input.text();
    let chars: Vec<char> = text.chars().collect();
    let cursor = input_box.input.cursor_position().min(chars.len());
    let available = width.saturating_sub(prompt_width + 1).max(1);

    let mut start = 0;
    while columns(&chars[start..cursor]) > available {
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for ch in &chars[start..] {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > available {
            break;
        }
        visible.push(*ch);
        used += ch_width;
    }

    let cursor_column = prompt_width + columns(&chars[start..cursor]);
    let line = Line::from(vec![
        prompt,
        Span::styled(visible, styles::input_text_style()),
    ]);
    (line, cursor_column)
}

fn columns(chars: &[char]) -> usize {
    chars.iter().map(|ch| ch.width().unwrap_or(0)).sum()
}
