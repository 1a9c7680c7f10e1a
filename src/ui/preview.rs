use crate::grading::strip_math_delimiters;
use crate::models::{AnswerKind, Problem};
use crate::render::MathRenderer;
use crate::ui::problem_view::{choice_lines, graph_lines, grid_table};
use crate::ui::{help_line, title_block};
use crate::utils::math_text::{mixed_spans, render_mixed_text};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn answer_lines(problem: &Problem, renderer: &dyn MathRenderer) -> Vec<Line<'static>> {
    match problem {
        Problem::TableFill(_) => Vec::new(),
        Problem::SingleChoice(p) => choice_lines(p, None, true, renderer),
        Problem::FillBlank(p) => {
            let kind = AnswerKind::resolve(p.answer_kind, &p.answer);
            let mut spans = vec![Span::styled(
                format!("Answer ({}): ", kind.label()),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )];
            match kind {
                AnswerKind::Text => spans.extend(mixed_spans(&p.answer, renderer)),
                AnswerKind::Latex | AnswerKind::Graph => {
                    let inner = strip_math_delimiters(&p.answer);
                    if !inner.is_empty() {
                        spans.extend(mixed_spans(&format!("${}$", inner), renderer));
                    }
                }
            }
            vec![Line::from(spans)]
        }
    }
}

/// Full view of one stored problem with its answers shown.
pub fn draw_preview(
    f: &mut Frame,
    problem: &Problem,
    position: (usize, usize),
    api_key: Option<&str>,
    renderer: &dyn MathRenderer,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(30),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    f.render_widget(
        title_block(format!(
            "Preview {} / {} - {}",
            position.0 + 1,
            position.1,
            problem.kind().label()
        )),
        chunks[0],
    );

    let question_area = match problem.explanation_graph() {
        Some(graph) => {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);
            let graph_view = Paragraph::new(graph_lines(graph, api_key, renderer))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Graph"));
            f.render_widget(graph_view, split[1]);
            split[0]
        }
        None => chunks[1],
    };

    let question = Paragraph::new(Text::from(render_mixed_text(problem.question(), renderer)))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Question"));
    f.render_widget(question, question_area);

    let answer_block = Block::default().borders(Borders::ALL).title("Answer");
    match problem {
        Problem::TableFill(p) => {
            let table = grid_table(
                &p.table,
                |r, c| p.table.cell(r, c).to_string(),
                None,
                renderer,
            )
            .block(answer_block);
            f.render_widget(table, chunks[2]);
        }
        Problem::FillBlank(p) if p.answer_graph.is_some() => {
            let mut lines = answer_lines(problem, renderer);
            if let Some(graph) = &p.answer_graph {
                lines.push(Line::from(""));
                lines.extend(graph_lines(graph, api_key, renderer));
            }
            let answer = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(answer_block);
            f.render_widget(answer, chunks[2]);
        }
        _ => {
            let answer = Paragraph::new(answer_lines(problem, renderer))
                .wrap(Wrap { trim: true })
                .block(answer_block);
            f.render_widget(answer, chunks[2]);
        }
    }

    let help = Paragraph::new(vec![help_line(&[
        ("←/→", "Previous/Next"),
        ("d", "Delete"),
        ("Esc", "Back to List"),
    ])])
    .alignment(ratatui::layout::Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlankProblem;
    use crate::render::UnicodeRenderer;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_blank_answer_is_typeset_by_kind() {
        let renderer = UnicodeRenderer::new();
        let problem = Problem::FillBlank(BlankProblem {
            id: "1".into(),
            question: "q".into(),
            answer: "$x^2$".into(),
            answer_kind: None,
            answer_graph: None,
            graph: None,
        });
        assert_eq!(plain(&answer_lines(&problem, &renderer)[0]), "Answer (math): x²");

        let text = Problem::FillBlank(BlankProblem {
            id: "2".into(),
            question: "q".into(),
            answer: "Paris".into(),
            answer_kind: Some(AnswerKind::Text),
            answer_graph: None,
            graph: None,
        });
        assert_eq!(plain(&answer_lines(&text, &renderer)[0]), "Answer (text): Paris");
    }
}
