use crate::graph::GraphCalculator;
use crate::models::Problem;
use crate::render::MathRenderer;
use crate::session::{AnswerInput, QuizRunner};
use crate::ui::layout::calculate_quiz_chunks;
use crate::ui::problem_view::{choice_lines, graph_lines, grid_table};
use crate::ui::{draw_confirmation, help_line, title_block};
use crate::utils::calculate_wrapped_cursor_position;
use crate::utils::math_text::render_mixed_text;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn draw_text_answer(
    f: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    cursor: usize,
    renderer: &dyn MathRenderer,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let content = if value.is_empty() {
        Text::from(Line::styled(
            "[Type your answer here...]",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(value.to_string())
    };
    let input = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(input, chunks[0]);

    // Live typeset preview of what was typed, as the math widget would show it
    let latex = format!("${}$", value.trim());
    let preview_lines = if value.trim().is_empty() {
        Vec::new()
    } else {
        render_mixed_text(&latex, renderer)
    };
    let preview = Paragraph::new(preview_lines)
        .block(Block::default().borders(Borders::ALL).title("Preview"));
    f.render_widget(preview, chunks[1]);

    let text_width = chunks[0].width.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) = calculate_wrapped_cursor_position(value, cursor, text_width);
    f.set_cursor_position((
        chunks[0].x + 1 + cursor_col as u16,
        chunks[0].y + 1 + cursor_line as u16,
    ));
}

pub fn draw_quiz(
    f: &mut Frame,
    runner: &QuizRunner,
    api_key: Option<&str>,
    renderer: &dyn MathRenderer,
) {
    let layout = calculate_quiz_chunks(f.area());
    let Some(problem) = runner.current() else {
        return;
    };

    f.render_widget(
        title_block(format!(
            "Problem {} / {} - {}",
            runner.current_index + 1,
            runner.problems.len(),
            problem.kind().label()
        )),
        layout.header_area,
    );

    let question_area = match problem.explanation_graph() {
        Some(graph) => {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(layout.question_area);
            let graph_view = Paragraph::new(graph_lines(graph, api_key, renderer))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Graph"));
            f.render_widget(graph_view, split[1]);
            split[0]
        }
        None => layout.question_area,
    };

    let question = Paragraph::new(Text::from(render_mixed_text(problem.question(), renderer)))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Question"));
    f.render_widget(question, question_area);

    let keys: &[(&str, &str)] = match (&runner.input, problem) {
        (AnswerInput::Text(input), _) => {
            draw_text_answer(
                f,
                layout.answer_area,
                "Your Answer",
                input.value(),
                input.cursor(),
                renderer,
            );
            &[("Enter", "Submit"), ("Esc", "Quit to Menu")]
        }
        (AnswerInput::Graph { calculator, input }, _) => {
            let title = format!("{} expression", calculator.kind().label());
            draw_text_answer(
                f,
                layout.answer_area,
                &title,
                input.value(),
                input.cursor(),
                renderer,
            );
            &[("Enter", "Submit"), ("Esc", "Quit to Menu")]
        }
        (AnswerInput::Choice(selected), Problem::SingleChoice(p)) => {
            let options = Paragraph::new(choice_lines(p, *selected, false, renderer))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Choose one"));
            f.render_widget(options, layout.answer_area);
            &[("↑/↓ 1-9", "Select"), ("Enter", "Submit"), ("Esc", "Quit to Menu")]
        }
        (AnswerInput::Grid { cells, row, col }, Problem::TableFill(p)) => {
            let table = grid_table(
                &p.table,
                |r, c| {
                    cells
                        .get(r)
                        .and_then(|cells| cells.get(c))
                        .map(|input| input.value().to_string())
                        .unwrap_or_default()
                },
                Some((row + 1, col + 1)),
                renderer,
            )
            .block(Block::default().borders(Borders::ALL).title("Fill in the table"));
            f.render_widget(table, layout.answer_area);
            &[
                ("Tab/Shift+Tab", "Next/Prev Cell"),
                ("↑/↓", "Row"),
                ("Enter", "Submit"),
                ("Esc", "Quit to Menu"),
            ]
        }
        _ => &[("Enter", "Skip"), ("Esc", "Quit to Menu")],
    };

    let help = Paragraph::new(vec![help_line(keys)])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

pub fn draw_quit_confirmation(f: &mut Frame) {
    draw_confirmation(
        f,
        "Quit to Menu",
        "Return to main menu? Answers so far are discarded.",
        "Yes (Return to Menu)",
        "No (Continue Quiz)",
    );
}
