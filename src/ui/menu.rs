use crate::models::Problem;
use crate::render::MathRenderer;
use crate::segment::render_mixed_plain;
use crate::ui::{draw_confirmation, help_line, title_block};
use crate::utils::truncate_string;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

fn problem_item(index: usize, problem: &Problem, renderer: &dyn MathRenderer) -> String {
    format!(
        "{:>2}. [{}] {}",
        index + 1,
        problem.kind().label(),
        truncate_string(&render_mixed_plain(problem.question(), renderer), 70)
    )
}

pub fn draw_menu(
    f: &mut Frame,
    problems: &[Problem],
    selected_index: usize,
    status: Option<&str>,
    renderer: &dyn MathRenderer,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    f.render_widget(
        title_block(format!("Math Quiz Builder v{}", env!("CARGO_PKG_VERSION"))),
        chunks[0],
    );

    let items: Vec<ListItem> = if problems.is_empty() {
        vec![ListItem::new("No problems yet. Press c to create one.").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        problems
            .iter()
            .enumerate()
            .map(|(i, problem)| ListItem::new(problem_item(i, problem, renderer)))
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Problems ({})", problems.len())),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !problems.is_empty() {
        state.select(Some(selected_index.min(problems.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    if let Some(status) = status {
        let status = Paragraph::new(Line::from(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Yellow),
        )));
        f.render_widget(status, chunks[2]);
    }

    let help = Paragraph::new(vec![help_line(&[
        ("↑/↓", "Navigate"),
        ("Enter", "Preview"),
        ("c", "Create"),
        ("t", "Take Quiz"),
        ("d", "Delete"),
        ("Esc/Ctrl+C", "Quit"),
    ])])
    .alignment(ratatui::layout::Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

pub fn draw_delete_confirmation(f: &mut Frame, problem: &Problem, renderer: &dyn MathRenderer) {
    let message = format!(
        "Delete \"{}\"?",
        truncate_string(&render_mixed_plain(problem.question(), renderer), 50)
    );
    draw_confirmation(f, "Delete Problem", &message, "Yes (Delete)", "No (Keep)");
}
