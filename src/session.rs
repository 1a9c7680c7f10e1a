use crate::grading::{Score, Submission, grade};
use crate::graph::{ExpressionCalculator, GraphCalculator, first_expression_latex};
use crate::logger;
use crate::models::{AnswerKind, AppState, Problem};
use crate::utils::input::TextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::seq::SliceRandom;
use std::io;

/// Learner's in-progress answer for one problem.
#[derive(Debug, Clone)]
pub enum AnswerInput {
    Text(TextInput),
    /// Graph answers are typed as an expression into a calculator.
    Graph {
        calculator: ExpressionCalculator,
        input: TextInput,
    },
    Grid {
        cells: Vec<Vec<TextInput>>,
        row: usize,
        col: usize,
    },
    Choice(Option<usize>),
}

impl AnswerInput {
    pub fn for_problem(problem: &Problem) -> Self {
        match problem {
            Problem::TableFill(p) => AnswerInput::Grid {
                cells: vec![vec![TextInput::new(); p.table.column_count()]; p.table.row_count()],
                row: 0,
                col: 0,
            },
            Problem::SingleChoice(_) => AnswerInput::Choice(None),
            Problem::FillBlank(p) => match AnswerKind::resolve(p.answer_kind, &p.answer) {
                AnswerKind::Graph => {
                    let kind = p.answer_graph.as_ref().map(|g| g.kind).unwrap_or_default();
                    AnswerInput::Graph {
                        calculator: ExpressionCalculator::new(kind),
                        input: TextInput::new(),
                    }
                }
                AnswerKind::Text | AnswerKind::Latex => AnswerInput::Text(TextInput::new()),
            },
        }
    }

    pub fn submission(&self) -> Submission {
        match self {
            AnswerInput::Text(input) => Submission::Text(input.value().to_string()),
            AnswerInput::Graph { calculator, .. } => {
                Submission::Text(first_expression_latex(&calculator.expressions()).unwrap_or_default())
            }
            AnswerInput::Grid { cells, .. } => Submission::Grid(
                cells
                    .iter()
                    .map(|row| row.iter().map(|c| c.value().to_string()).collect())
                    .collect(),
            ),
            AnswerInput::Choice(selected) => Submission::Choice(*selected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub id: String,
    pub correct: bool,
}

/// One pass through the problem list.
#[derive(Debug, Clone)]
pub struct QuizRunner {
    pub problems: Vec<Problem>,
    pub current_index: usize,
    pub input: AnswerInput,
    pub results: Vec<QuizResult>,
    pub finished: bool,
}

impl QuizRunner {
    pub fn new(problems: Vec<Problem>) -> Self {
        let input = problems
            .first()
            .map(AnswerInput::for_problem)
            .unwrap_or(AnswerInput::Choice(None));
        let finished = problems.is_empty();
        Self {
            problems,
            current_index: 0,
            input,
            results: Vec::new(),
            finished,
        }
    }

    pub fn shuffled(mut problems: Vec<Problem>) -> Self {
        let mut rng = rand::thread_rng();
        problems.shuffle(&mut rng);
        Self::new(problems)
    }

    pub fn current(&self) -> Option<&Problem> {
        if self.finished {
            return None;
        }
        self.problems.get(self.current_index)
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.problems.len()
    }

    /// Grade the current answer, record it, and move on.
    pub fn submit_current(&mut self) {
        if self.current().is_none() {
            return;
        }
        if let AnswerInput::Graph { calculator, input } = &mut self.input {
            calculator.set_expression("1", input.value().trim());
        }
        let submission = self.input.submission();
        let Some(problem) = self.current() else {
            return;
        };
        let correct = grade(problem, &submission);
        let id = problem.id().to_string();
        logger::log(&format!("Answered problem {}: correct={}", id, correct));
        self.results.push(QuizResult { id, correct });

        if self.is_last() {
            self.finished = true;
        } else {
            self.current_index += 1;
            if let Some(next) = self.problems.get(self.current_index) {
                self.input = AnswerInput::for_problem(next);
            }
        }
    }

    pub fn score(&self) -> Score {
        Score::from_results(self.results.iter().map(|r| r.correct))
    }

    fn option_count(&self) -> usize {
        match self.current() {
            Some(Problem::SingleChoice(p)) => p.options.len(),
            _ => 0,
        }
    }
}

pub fn handle_quiz_input(
    runner: &mut QuizRunner,
    key: KeyEvent,
    app_state: &mut AppState,
) -> io::Result<()> {
    if runner.finished {
        *app_state = AppState::Summary;
        return Ok(());
    }

    match key.code {
        KeyCode::Esc => {
            *app_state = AppState::QuizQuitConfirm;
            return Ok(());
        }
        KeyCode::Enter => {
            runner.submit_current();
            if runner.finished {
                *app_state = AppState::Summary;
            }
            return Ok(());
        }
        _ => {}
    }

    let option_count = runner.option_count();
    match &mut runner.input {
        AnswerInput::Text(input) | AnswerInput::Graph { input, .. } => {
            input.handle_key(&key);
        }
        AnswerInput::Choice(selected) => match key.code {
            KeyCode::Up => {
                *selected = Some(selected.map_or(0, |i| i.saturating_sub(1)));
            }
            KeyCode::Down => {
                let next = selected.map_or(0, |i| i + 1);
                if next < option_count {
                    *selected = Some(next);
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let idx = c as usize - '1' as usize;
                if idx < option_count {
                    *selected = Some(idx);
                }
            }
            _ => {}
        },
        AnswerInput::Grid { cells, row, col } => {
            let rows = cells.len();
            let cols = cells.first().map_or(0, Vec::len);
            match key.code {
                KeyCode::Tab => {
                    if *col + 1 < cols {
                        *col += 1;
                    } else if *row + 1 < rows {
                        *row += 1;
                        *col = 0;
                    }
                }
                KeyCode::BackTab => {
                    if *col > 0 {
                        *col -= 1;
                    } else if *row > 0 {
                        *row -= 1;
                        *col = cols.saturating_sub(1);
                    }
                }
                KeyCode::Up => *row = row.saturating_sub(1),
                KeyCode::Down => {
                    if *row + 1 < rows {
                        *row += 1;
                    }
                }
                _ => {
                    if !key.modifiers.contains(KeyModifiers::CONTROL)
                        && let Some(cell) = cells.get_mut(*row).and_then(|r| r.get_mut(*col))
                    {
                        cell.handle_key(&key);
                    }
                }
            }
        }
    }

    Ok(())
}
