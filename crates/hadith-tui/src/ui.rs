use hadith_core::verdict::Section;
use hadith_core::{strings, view, GroundingLink, MessageBody, MessageView, Side, Tone, VerdictSections};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};

/// Verdict sections shown under the status line, in display order
const BODY_SECTIONS: [(Section, &str, Color); 6] = [
    (Section::Text, strings::LABEL_TEXT, Color::Cyan),
    (Section::Source, strings::LABEL_SOURCE, Color::Blue),
    (Section::Grade, strings::LABEL_GRADE, Color::Green),
    (Section::WeaknessReason, strings::LABEL_WEAKNESS, Color::Red),
    (Section::Alternative, strings::LABEL_ALTERNATIVE, Color::Green),
    (Section::Note, strings::LABEL_NOTE, Color::Yellow),
];

/// Word-wrap `text` into lines of at most `width` characters. Words longer
/// than the width are left on a line of their own.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Wrap every source line of a multi-line payload, keeping blank lines
fn wrap_paragraphs(text: &str, width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| wrap_text_to_width(line, width))
        .collect()
}

fn side_alignment(side: Side) -> Alignment {
    match side {
        Side::Left => Alignment::Left,
        Side::Right => Alignment::Right,
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Positive => Color::Green,
        Tone::Negative => Color::Red,
    }
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: usize, style: Style, align: Alignment) {
    for chunk in wrap_paragraphs(text, width) {
        lines.push(Line::from(Span::styled(chunk, style)).alignment(align));
    }
}

fn verdict_lines(sections: &VerdictSections, tone: Tone, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let indent_width = width.saturating_sub(2);

    if let Some(status) = sections.status.as_deref() {
        let status_style = Style::default()
            .fg(tone_color(tone))
            .add_modifier(Modifier::BOLD);
        push_wrapped(
            &mut lines,
            &format!("{}: {}", strings::LABEL_STATUS, status),
            width,
            status_style,
            Alignment::Left,
        );
    }

    for (section, label, color) in BODY_SECTIONS {
        let Some(payload) = sections.get(section) else {
            continue;
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for chunk in wrap_paragraphs(payload, indent_width) {
            lines.push(Line::from(format!("  {}", chunk)));
        }
    }

    lines
}

fn link_lines(links: &[GroundingLink], width: usize) -> Vec<Line<'static>> {
    if links.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("{}:", strings::LABEL_LINKS),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    ))];
    for (i, link) in links.iter().enumerate() {
        let title = if link.title.is_empty() {
            strings::LABEL_REFERENCE
        } else {
            link.title.as_str()
        };
        push_wrapped(
            &mut lines,
            &format!("{}. {}", i + 1, title),
            width,
            Style::default().fg(Color::Blue),
            Alignment::Left,
        );
        lines.push(Line::from(Span::styled(
            format!("   {}", link.uri),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::UNDERLINED),
        )));
    }
    lines
}

/// Pre-wrapped lines for one message, so the caller knows the exact height
fn message_lines(
    view: &MessageView,
    width: usize,
    selected: bool,
    animation_frame: u8,
) -> Vec<Line<'static>> {
    let align = side_alignment(view.side);
    let mut lines = Vec::new();

    let role_style = match view.side {
        Side::Right => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Side::Left => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    };
    let marker = if selected { "▶ " } else { "" };
    lines.push(
        Line::from(vec![
            Span::styled(format!("{}{}", marker, view.role_label), role_style),
            Span::styled(format!("  {}", view.time_label), Style::default().fg(Color::DarkGray)),
        ])
        .alignment(align),
    );

    match &view.body {
        MessageBody::Plain(text) => push_wrapped(&mut lines, text, width, Style::default(), align),
        MessageBody::Loading => {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat(animation_frame as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("{}{}", strings::LOADING, dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        MessageBody::Error(text) => {
            push_wrapped(&mut lines, text, width, Style::default().fg(Color::Red), align)
        }
        MessageBody::Verdict { sections, tone } => {
            lines.extend(verdict_lines(sections, *tone, width));
        }
    }

    lines.extend(link_lines(&view.links, width));
    lines.push(Line::default());
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.show_reset_confirm {
        render_reset_confirm(frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", strings::APP_TITLE), Style::default().fg(Color::Cyan).bold()),
        Span::styled(strings::APP_SUBTITLE, Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(format!("[{}]", app.model), Style::default().fg(Color::Black)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Black),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let examples_height = if app.session.is_fresh() {
        (strings::EXAMPLES.len() + 3) as u16
    } else {
        0
    };

    let [chat_area, examples_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(examples_height),
        Constraint::Length(3),
    ])
    .areas(area);

    render_chat(app, frame, chat_area);
    if examples_height > 0 {
        render_examples(frame, examples_area);
    }
    render_input(app, frame, input_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    let width = inner.width as usize;

    let views = view::conversation(app.session.messages());
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (index, message) in views.iter().enumerate() {
        let selected = app.selected_message == Some(index) && message.verdict().is_some();
        lines.extend(message_lines(message, width, selected, app.animation_frame));
    }

    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.update_chat_metrics(inner.height, total);

    // Lines are pre-wrapped, so no Wrap here: the scroll math stays exact
    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn render_examples(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", strings::EXAMPLES_PROMPT));

    let lines: Vec<Line> = strings::EXAMPLES
        .iter()
        .enumerate()
        .map(|(i, example)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().bg(Color::DarkGray).fg(Color::White)),
                Span::raw(" "),
                Span::styled(*example, Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let examples = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(examples, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if app.is_busy() {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() {
        Paragraph::new(Span::styled(
            strings::INPUT_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_text: String = app
            .input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " CHAT ",
        InputMode::Editing => " INPUT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let hints: Vec<Span> = if let Some(notice) = &app.notice {
        vec![Span::styled(
            format!(" {} ", notice.text),
            Style::default().bg(Color::Green).fg(Color::Black),
        )]
    } else {
        match app.input_mode {
            InputMode::Editing => [hint("Enter", "verify"), hint("Esc", "normal")]
                .into_iter()
                .flatten()
                .collect(),
            InputMode::Normal => {
                let mut hints: Vec<Span> = [
                    hint("i", "type"),
                    hint("j/k", "scroll"),
                    hint("n/p", "select"),
                    hint("c/C", "copy"),
                    hint("s/S", "share"),
                    hint("R", "reset"),
                ]
                .into_iter()
                .flatten()
                .collect();
                if app.session.is_fresh() {
                    hints.extend(hint("1-4", "example"));
                }
                hints.extend(hint("q", "quit"));
                hints
            }
        }
    };

    let footer_content = Line::from(
        vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)]
            .into_iter()
            .chain(hints)
            .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_reset_confirm(frame: &mut Frame, area: Rect) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 6.min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Reset ");

    let text = vec![
        Line::from(strings::CONFIRM_RESET),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::Red).fg(Color::White)),
            Span::raw(" confirm   "),
            Span::styled(" n ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" cancel"),
        ]),
    ];

    let popup = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}
