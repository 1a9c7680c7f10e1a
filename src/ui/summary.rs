use crate::render::MathRenderer;
use crate::segment::render_mixed_plain;
use crate::session::QuizRunner;
use crate::ui::layout::calculate_summary_chunks;
use crate::ui::{help_line, title_block};
use crate::utils::truncate_string;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_summary(f: &mut Frame, runner: &QuizRunner, renderer: &dyn MathRenderer) {
    let layout = calculate_summary_chunks(f.area());

    f.render_widget(title_block("Quiz Complete".to_string()), layout.header_area);

    let score = runner.score();
    let score_color = match score.percentage() {
        80.. => Color::Green,
        50..=79 => Color::Yellow,
        _ => Color::Red,
    };
    let score_line = Paragraph::new(Line::from(Span::styled(
        format!(
            "{} of {} correct ({}%)",
            score.correct,
            score.total,
            score.percentage()
        ),
        Style::default()
            .fg(score_color)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(score_line, layout.score_area);

    let mut summary_text = Text::default();
    for (i, result) in runner.results.iter().enumerate() {
        let (mark, color) = if result.correct {
            ("[✓]", Color::Green)
        } else {
            ("[✗]", Color::Red)
        };
        let question = runner
            .problems
            .iter()
            .find(|p| p.id() == result.id)
            .map(|p| render_mixed_plain(p.question(), renderer))
            .unwrap_or_default();
        summary_text.push_line(Line::from(vec![
            Span::styled(mark, Style::default().fg(color)),
            Span::from(format!(" {}. {}", i + 1, truncate_string(&question, 70))),
        ]));
    }

    let summary = Paragraph::new(summary_text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Answers"));
    f.render_widget(summary, layout.content_area);

    let help = Paragraph::new(vec![help_line(&[("m", "Main Menu"), ("Esc", "Quit")])])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.footer_area);
}
