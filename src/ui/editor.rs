use crate::editor::{EditorFocus, ProblemDraft, option_kind_hint, section_help};
use crate::graph::{GraphAttachment, GraphCalculator};
use crate::models::{AnswerKind, ProblemKind};
use crate::render::MathRenderer;
use crate::ui::layout::calculate_editor_chunks;
use crate::ui::problem_view::{graph_lines, grid_table, option_spans};
use crate::ui::{help_line, key_style, title_block};
use crate::utils::math_text::render_mixed_text;
use crate::utils::truncate_string;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn section_block(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
}

fn field_line(label: &str, value: &str, active: bool) -> Line<'static> {
    let style = if active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), style),
    ])
}

fn draw_body(f: &mut Frame, area: Rect, draft: &ProblemDraft, renderer: &dyn MathRenderer) {
    let focused = draft.focus == EditorFocus::Body;
    match draft.kind {
        ProblemKind::TableFill => {
            let table = &draft.table;
            let editing = table.cursor;
            let cell_text = |r: usize, c: usize| {
                if (r + 1, c + 1) == editing {
                    table.field.value().to_string()
                } else {
                    table.layout.cell(r, c).to_string()
                }
            };
            // Header and label edits show in the field line below the grid
            let block = section_block("Table (answers go in the cells)", focused);
            let inner = block.inner(area);
            f.render_widget(block, area);
            let [grid_area, field_area] =
                Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(inner);
            let widget = grid_table(&table.layout, cell_text, Some(editing), renderer);
            f.render_widget(widget, grid_area);
            let label = match editing {
                (0, 0) => "Row header",
                (0, _) => "Column name",
                (_, 0) => "Row label",
                _ => "Cell",
            };
            f.render_widget(
                Paragraph::new(field_line(label, table.field.value(), focused)),
                field_area,
            );
        }
        ProblemKind::SingleChoice => {
            let choice = &draft.choice;
            let lines: Vec<Line> = choice
                .options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let text = if i == choice.selected {
                        choice.field.value()
                    } else {
                        option.text.as_str()
                    };
                    let marker = if i == choice.correct { "[✓]" } else { "[ ]" };
                    let mut spans = vec![Span::from(format!(
                        "{} {}. ({}) ",
                        marker,
                        i + 1,
                        option.kind.label()
                    ))];
                    if i == choice.selected {
                        spans.push(Span::styled(
                            text.to_string(),
                            Style::default()
                                .fg(Color::Yellow)
                                .add_modifier(Modifier::BOLD),
                        ));
                        let hint = option_kind_hint(option.kind);
                        if !hint.is_empty() {
                            spans.push(Span::styled(
                                format!("  {}", hint),
                                Style::default().fg(Color::DarkGray),
                            ));
                        }
                    } else {
                        spans.extend(option_spans(text, option.kind, renderer));
                    }
                    Line::from(spans)
                })
                .collect();
            let options = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(section_block("Options ([✓] marks the correct one)", focused));
            f.render_widget(options, area);
        }
        ProblemKind::FillBlank => {
            let blank = &draft.blank;
            let mut lines = vec![
                field_line("Answer type", blank.kind.label(), false),
                field_line("Answer", blank.answer.value(), focused),
            ];
            if blank.kind != AnswerKind::Text && !blank.answer.is_blank() {
                lines.push(Line::from(""));
                lines.extend(render_mixed_text(
                    &format!("${}$", blank.answer.value().trim()),
                    renderer,
                ));
            }
            if blank.kind == AnswerKind::Graph {
                lines.push(Line::from(""));
                lines.extend(graph_lines(&blank.calculator.snapshot(), None, renderer));
            }
            let body = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(section_block("Answer", focused));
            f.render_widget(body, area);
        }
    }
}

fn draw_formula(f: &mut Frame, area: Rect, draft: &ProblemDraft, renderer: &dyn MathRenderer) {
    let focused = draft.focus == EditorFocus::Formula;
    let picker = &draft.formula;
    let formula = picker.formula();

    let mut lines = vec![
        Line::from(Span::styled(formula.name, key_style())),
        Line::from(Span::styled(
            formula.template,
            Style::default().fg(Color::DarkGray),
        )),
    ];
    for (i, (variable, input)) in formula.variables.iter().zip(&picker.values).enumerate() {
        lines.push(field_line(
            &variable.name.to_string(),
            input.value(),
            focused && i == picker.variable,
        ));
    }
    lines.push(Line::from(""));
    lines.extend(render_mixed_text(&format!("${}$", picker.latex()), renderer));

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(section_block("Formula", focused));
    f.render_widget(widget, area);
}

fn draw_graph(
    f: &mut Frame,
    area: Rect,
    draft: &ProblemDraft,
    api_key: Option<&str>,
    renderer: &dyn MathRenderer,
) {
    let focused = draft.focus == EditorFocus::Graph;
    let lines = match &draft.graph {
        Some(calculator) => {
            let attachment: GraphAttachment = calculator.snapshot();
            let mut lines = vec![field_line("Expression", draft.graph_input.value(), focused)];
            lines.extend(graph_lines(&attachment, api_key, renderer));
            lines
        }
        None => vec![Line::from(Span::styled(
            "No graph. Type an expression to add one.",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))],
    };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(section_block("Explanation graph", focused));
    f.render_widget(widget, area);
}

pub fn draw_editor(
    f: &mut Frame,
    draft: &ProblemDraft,
    api_key: Option<&str>,
    renderer: &dyn MathRenderer,
) {
    let layout = calculate_editor_chunks(f.area());

    f.render_widget(title_block("Create Problem".to_string()), layout.header_area);

    let question_focused = draft.focus == EditorFocus::Question;
    let mut question_text = Text::default();
    question_text.push_line(field_line("Source", draft.question.value(), question_focused));
    question_text.extend(render_mixed_text(draft.question.value(), renderer));
    let question = Paragraph::new(question_text)
        .wrap(Wrap { trim: true })
        .block(section_block("Question ($..$ for math)", question_focused));
    f.render_widget(question, layout.question_area);

    let kinds: Vec<Span> = ProblemKind::ALL
        .iter()
        .flat_map(|kind| {
            let style = if *kind == draft.kind {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            [Span::styled(format!(" {} ", kind.label()), style), Span::from("  ")]
        })
        .collect();
    let kind_bar = Paragraph::new(Line::from(kinds))
        .alignment(Alignment::Center)
        .block(section_block("Type", draft.focus == EditorFocus::Kind));
    f.render_widget(kind_bar, layout.kind_area);

    draw_body(f, layout.body_area, draft, renderer);
    draw_formula(f, layout.formula_area, draft, renderer);
    draw_graph(f, layout.graph_area, draft, api_key, renderer);

    let mut help_lines = vec![help_line(section_help(draft))];
    let mut global = help_line(&[
        ("Tab/Shift+Tab", "Section"),
        ("Ctrl+S", "Save"),
        ("Esc", "Discard"),
    ]);
    if let Some(error) = &draft.error {
        global.spans.push(Span::styled(
            truncate_string(error, 60),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    help_lines.push(global);
    let help = Paragraph::new(help_lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
