use crate::graph::GraphAttachment;
use crate::models::{ChoiceProblem, OptionKind, ValueKind};
use crate::render::MathRenderer;
use crate::segment::INVALID_MATH_MARKER;
use crate::table::TableLayout;
use crate::utils::math_text::mixed_spans;
use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Row, Table},
};

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn cursor_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

/// A value that is LaTeX source on its own, without `$` delimiters.
fn latex_spans(latex: &str, renderer: &dyn MathRenderer) -> Vec<Span<'static>> {
    if latex.trim().is_empty() {
        return Vec::new();
    }
    match renderer.render_inline(latex) {
        Ok(out) => vec![Span::styled(out, Style::default().fg(Color::LightMagenta))],
        Err(_) => vec![Span::styled(
            INVALID_MATH_MARKER.to_string(),
            Style::default().fg(Color::Red),
        )],
    }
}

/// Table with a header row and a row-label column. `cursor` addresses that
/// extended grid, so `(1, 1)` is the first data cell.
pub(crate) fn grid_table<F>(
    layout: &TableLayout,
    cell_text: F,
    cursor: Option<(usize, usize)>,
    renderer: &dyn MathRenderer,
) -> Table<'static>
where
    F: Fn(usize, usize) -> String,
{
    let styled = |cell: Cell<'static>, at: (usize, usize)| {
        if cursor == Some(at) {
            cell.style(cursor_style())
        } else {
            cell
        }
    };

    let mut header_cells = vec![styled(
        Cell::from(layout.row_header_label.clone().unwrap_or_default()).style(header_style()),
        (0, 0),
    )];
    for (c, column) in layout.columns.iter().enumerate() {
        let mut spans = mixed_spans(&column.name, renderer);
        spans.push(Span::styled(
            format!(" ({})", column.kind.label()),
            Style::default().fg(Color::DarkGray),
        ));
        header_cells.push(styled(
            Cell::from(Line::from(spans)).style(header_style()),
            (0, c + 1),
        ));
    }

    let rows: Vec<Row> = layout
        .rows
        .iter()
        .enumerate()
        .map(|(r, label)| {
            let mut cells = vec![styled(
                Cell::from(Line::from(mixed_spans(label, renderer))).style(header_style()),
                (r + 1, 0),
            )];
            for (c, column) in layout.columns.iter().enumerate() {
                let text = cell_text(r, c);
                let spans = match column.kind {
                    ValueKind::Latex => latex_spans(&text, renderer),
                    ValueKind::Text | ValueKind::Number => mixed_spans(&text, renderer),
                };
                cells.push(styled(Cell::from(Line::from(spans)), (r + 1, c + 1)));
            }
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(14))
        .chain(layout.columns.iter().map(|_| Constraint::Min(8)))
        .collect();

    Table::new(rows, widths)
        .header(Row::new(header_cells))
        .column_spacing(2)
}

pub(crate) fn option_spans(
    text: &str,
    kind: OptionKind,
    renderer: &dyn MathRenderer,
) -> Vec<Span<'static>> {
    match kind {
        OptionKind::Text | OptionKind::Number => mixed_spans(text, renderer),
        OptionKind::Latex => latex_spans(text, renderer),
        OptionKind::Graph => {
            let mut spans = vec![Span::styled(
                "[graph] ".to_string(),
                Style::default().fg(Color::Green),
            )];
            spans.extend(latex_spans(text, renderer));
            spans
        }
    }
}

/// Option list. `selected` marks the learner's pick; `reveal` marks the
/// correct option.
pub(crate) fn choice_lines(
    problem: &ChoiceProblem,
    selected: Option<usize>,
    reveal: bool,
    renderer: &dyn MathRenderer,
) -> Vec<Line<'static>> {
    problem
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let marker = if selected == Some(i) { "(•)" } else { "( )" };
            let mut spans = vec![Span::from(format!("{} {}. ", marker, i + 1))];
            spans.extend(option_spans(&option.text, option.kind, renderer));
            if reveal && i == problem.correct_option_index {
                spans.push(Span::styled(
                    "  ✓ correct".to_string(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            let line = Line::from(spans);
            if selected == Some(i) {
                line.style(Style::default().fg(Color::Yellow))
            } else {
                line
            }
        })
        .collect()
}

/// Summary of an attached graph: calculator, expressions, embed script.
pub(crate) fn graph_lines(
    graph: &GraphAttachment,
    api_key: Option<&str>,
    renderer: &dyn MathRenderer,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        graph.kind.label().to_string(),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))];
    let expressions = graph.expressions();
    if expressions.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no expressions)".to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for expression in expressions {
        let mut spans = vec![Span::from("  • ")];
        spans.extend(latex_spans(
            expression.latex.as_deref().unwrap_or_default(),
            renderer,
        ));
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(Span::styled(
        graph.kind.script_url(api_key),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}
