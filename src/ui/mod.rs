pub mod layout;
mod editor;
mod menu;
mod preview;
mod problem_view;
mod quiz;
mod summary;

pub use editor::draw_editor;
pub use layout::{calculate_editor_chunks, calculate_quiz_chunks, calculate_summary_chunks};
pub use menu::{draw_delete_confirmation, draw_menu};
pub use preview::draw_preview;
pub use quiz::{draw_quit_confirmation, draw_quiz};
pub use summary::draw_summary;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub(crate) fn key_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// One help line of `key description` pairs.
pub(crate) fn help_line(keys: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (key, description) in keys {
        spans.push(Span::styled(key.to_string(), key_style()));
        spans.push(Span::from(format!(" {}  ", description)));
    }
    Line::from(spans)
}

pub(crate) fn title_block(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(key_style())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

/// Yes/no dialog shared by the quit and delete confirmations.
pub(crate) fn draw_confirmation(f: &mut Frame, title: &str, message: &str, yes: &str, no: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(title.to_string())
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(format!(" {}  ", yes)),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(format!(" {}  ", no)),
        Span::styled("Ctrl+C", key_style()),
        Span::from(" Exit App"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_line_pairs_keys_and_descriptions() {
        let line = help_line(&[("Enter", "Submit"), ("Esc", "Quit")]);
        assert_eq!(line.spans.len(), 4);
        assert_eq!(line.spans[0].content, "Enter");
        assert_eq!(line.spans[0].style, key_style());
        assert_eq!(line.spans[3].content, " Quit  ");
    }
}
