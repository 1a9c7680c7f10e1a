//! Authoring form state and key handling for the create screen.

use crate::error::{DraftError, Result};
use crate::formulas::{self, Formula};
use crate::graph::{ExpressionCalculator, GraphAttachment, GraphCalculator, GraphKind};
use crate::logger;
use crate::models::{
    AnswerKind, AppState, BlankProblem, ChoiceOption, ChoiceProblem, OptionKind, Problem,
    ProblemKind, TableProblem,
};
use crate::segment::insert_math_at;
use crate::store::ProblemStore;
use crate::table::TableLayout;
use crate::utils::input::TextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeMap;

/// Expression id used for the single expression the terminal calculator edits.
const EXPRESSION_ID: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFocus {
    Question,
    Kind,
    Body,
    Formula,
    Graph,
}

impl EditorFocus {
    fn next(self) -> Self {
        match self {
            EditorFocus::Question => EditorFocus::Kind,
            EditorFocus::Kind => EditorFocus::Body,
            EditorFocus::Body => EditorFocus::Formula,
            EditorFocus::Formula => EditorFocus::Graph,
            EditorFocus::Graph => EditorFocus::Question,
        }
    }

    fn prev(self) -> Self {
        match self {
            EditorFocus::Question => EditorFocus::Graph,
            EditorFocus::Kind => EditorFocus::Question,
            EditorFocus::Body => EditorFocus::Kind,
            EditorFocus::Formula => EditorFocus::Body,
            EditorFocus::Graph => EditorFocus::Formula,
        }
    }
}

/// Table editing state. The cursor addresses a grid one larger than the
/// cells in each direction: row 0 holds column names, column 0 row labels,
/// and (0, 0) the row-header label.
#[derive(Debug, Clone)]
pub struct TableDraft {
    pub layout: TableLayout,
    pub cursor: (usize, usize),
    pub field: TextInput,
}

impl Default for TableDraft {
    fn default() -> Self {
        let mut draft = Self {
            layout: TableLayout::starter(),
            cursor: (1, 1),
            field: TextInput::new(),
        };
        draft.load_field();
        draft
    }
}

impl TableDraft {
    fn field_value(&self) -> String {
        let (r, c) = self.cursor;
        match (r, c) {
            (0, 0) => self.layout.row_header_label.clone().unwrap_or_default(),
            (0, c) => self
                .layout
                .columns
                .get(c - 1)
                .map(|col| col.name.clone())
                .unwrap_or_default(),
            (r, 0) => self.layout.rows.get(r - 1).cloned().unwrap_or_default(),
            (r, c) => self.layout.cell(r - 1, c - 1).to_string(),
        }
    }

    fn load_field(&mut self) {
        self.field = TextInput::with_value(self.field_value());
    }

    fn store_field(&mut self) {
        let value = self.field.value().to_string();
        match self.cursor {
            (0, 0) => self.layout.set_row_header_label(value),
            (0, c) => self.layout.rename_column(c - 1, value),
            (r, 0) => self.layout.rename_row(r - 1, value),
            (r, c) => self.layout.set_cell(r - 1, c - 1, value),
        }
    }

    fn clamp_cursor(&mut self) {
        let (r, c) = self.cursor;
        self.cursor = (r.min(self.layout.row_count()), c.min(self.layout.column_count()));
    }

    pub fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        self.store_field();
        let (r, c) = self.cursor;
        self.cursor = (
            r.saturating_add_signed(d_row),
            c.saturating_add_signed(d_col),
        );
        self.clamp_cursor();
        self.load_field();
    }

    pub fn add_row(&mut self) {
        self.store_field();
        self.layout.add_row();
        self.load_field();
    }

    pub fn add_column(&mut self) {
        self.store_field();
        self.layout.add_column();
        self.load_field();
    }

    /// On the header row this removes the column, anywhere else the row.
    pub fn remove_at_cursor(&mut self) {
        self.store_field();
        match self.cursor {
            (0, 0) => {}
            (0, c) => self.layout.remove_column(c - 1),
            (r, _) => self.layout.remove_row(r - 1),
        }
        self.clamp_cursor();
        self.load_field();
    }

    pub fn cycle_column_kind(&mut self) {
        let (_, c) = self.cursor;
        if c == 0 {
            return;
        }
        if let Some(column) = self.layout.columns.get(c - 1) {
            let next = column.kind.next();
            self.layout.set_column_kind(c - 1, next);
        }
    }

    pub fn layout(&mut self) -> &TableLayout {
        self.store_field();
        &self.layout
    }
}

#[derive(Debug, Clone)]
pub struct ChoiceDraft {
    pub options: Vec<ChoiceOption>,
    pub correct: usize,
    pub selected: usize,
    pub field: TextInput,
}

impl Default for ChoiceDraft {
    fn default() -> Self {
        Self {
            options: vec![ChoiceOption::default()],
            correct: 0,
            selected: 0,
            field: TextInput::new(),
        }
    }
}

impl ChoiceDraft {
    fn store_field(&mut self) {
        if let Some(option) = self.options.get_mut(self.selected) {
            option.text = self.field.value().to_string();
        }
    }

    fn load_field(&mut self) {
        let text = self
            .options
            .get(self.selected)
            .map(|o| o.text.clone())
            .unwrap_or_default();
        self.field = TextInput::with_value(text);
    }

    pub fn select(&mut self, index: usize) {
        if index >= self.options.len() {
            return;
        }
        self.store_field();
        self.selected = index;
        self.load_field();
    }

    pub fn add_option(&mut self) {
        self.store_field();
        self.options.push(ChoiceOption::default());
        self.selected = self.options.len() - 1;
        self.load_field();
    }

    /// Remove the selected option. The correct index follows the option it
    /// pointed at, or falls back to the first one when that option is gone.
    pub fn remove_option(&mut self) {
        if self.options.is_empty() {
            return;
        }
        let removed = self.selected;
        self.options.remove(removed);

        if removed < self.correct {
            self.correct -= 1;
        } else if removed == self.correct {
            self.correct = 0;
        }
        self.selected = removed.min(self.options.len().saturating_sub(1));
        self.load_field();
    }

    pub fn mark_correct(&mut self) {
        if self.selected < self.options.len() {
            self.correct = self.selected;
        }
    }

    pub fn cycle_kind(&mut self) {
        if let Some(option) = self.options.get_mut(self.selected) {
            option.kind = option.kind.next();
        }
    }

    pub fn options(&mut self) -> &[ChoiceOption] {
        self.store_field();
        &self.options
    }
}

#[derive(Debug, Clone)]
pub struct BlankDraft {
    pub answer: TextInput,
    pub kind: AnswerKind,
    pub calculator: ExpressionCalculator,
}

impl Default for BlankDraft {
    fn default() -> Self {
        Self {
            answer: TextInput::new(),
            kind: AnswerKind::Text,
            calculator: ExpressionCalculator::new(GraphKind::Graphing),
        }
    }
}

impl BlankDraft {
    fn sync_calculator(&mut self) {
        if self.kind == AnswerKind::Graph {
            self.calculator
                .set_expression(EXPRESSION_ID, self.answer.value().trim());
        }
    }
}

/// Formula chooser: one library entry and the values typed for it.
#[derive(Debug, Clone)]
pub struct FormulaPicker {
    pub index: usize,
    pub variable: usize,
    pub values: Vec<TextInput>,
}

impl Default for FormulaPicker {
    fn default() -> Self {
        let mut picker = Self {
            index: 0,
            variable: 0,
            values: Vec::new(),
        };
        picker.reset_values();
        picker
    }
}

impl FormulaPicker {
    pub fn formula(&self) -> &'static Formula {
        &formulas::LIBRARY[self.index % formulas::LIBRARY.len()]
    }

    fn reset_values(&mut self) {
        self.values = self
            .formula()
            .variables
            .iter()
            .map(|v| TextInput::with_value(format!("{}", v.default)))
            .collect();
        self.variable = 0;
    }

    pub fn cycle(&mut self, forward: bool) {
        let len = formulas::LIBRARY.len();
        self.index = if forward {
            (self.index + 1) % len
        } else {
            (self.index + len - 1) % len
        };
        self.reset_values();
    }

    /// LaTeX for the chosen formula. Values that do not parse keep the default.
    pub fn latex(&self) -> String {
        let formula = self.formula();
        let values: BTreeMap<char, f64> = formula
            .variables
            .iter()
            .zip(&self.values)
            .filter_map(|(v, input)| input.value().trim().parse().ok().map(|n| (v.name, n)))
            .collect();
        formula.instantiate(&values)
    }
}

#[derive(Debug, Clone)]
pub struct ProblemDraft {
    pub question: TextInput,
    pub kind: ProblemKind,
    pub focus: EditorFocus,
    pub table: TableDraft,
    pub choice: ChoiceDraft,
    pub blank: BlankDraft,
    pub formula: FormulaPicker,
    /// Explanation graph; `None` until the author starts one.
    pub graph: Option<ExpressionCalculator>,
    pub graph_input: TextInput,
    pub error: Option<String>,
}

impl Default for ProblemDraft {
    fn default() -> Self {
        Self {
            question: TextInput::new(),
            kind: ProblemKind::TableFill,
            focus: EditorFocus::Question,
            table: TableDraft::default(),
            choice: ChoiceDraft::default(),
            blank: BlankDraft::default(),
            formula: FormulaPicker::default(),
            graph: None,
            graph_input: TextInput::new(),
            error: None,
        }
    }
}

impl ProblemDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `$latex$` into the question at its cursor.
    pub fn insert_math(&mut self, latex: &str) {
        let (text, cursor) = insert_math_at(self.question.value(), self.question.cursor(), latex);
        self.question.replace(text, cursor);
    }

    pub fn insert_formula(&mut self) {
        let latex = self.formula.latex();
        self.insert_math(&latex);
    }

    fn sync_graph(&mut self) {
        let latex = self.graph_input.value().trim().to_string();
        let calculator = self
            .graph
            .get_or_insert_with(|| ExpressionCalculator::new(GraphKind::Graphing));
        calculator.set_expression(EXPRESSION_ID, &latex);
    }

    pub fn cycle_graph_kind(&mut self) {
        let calculator = self
            .graph
            .get_or_insert_with(|| ExpressionCalculator::new(GraphKind::Graphing));
        let next = calculator.kind().next();
        calculator.set_kind(next);
    }

    pub fn remove_graph(&mut self) {
        self.graph = None;
        self.graph_input.clear();
    }

    fn explanation_graph(&self) -> Option<GraphAttachment> {
        self.graph.as_ref().map(GraphCalculator::snapshot)
    }

    /// Validate the form and produce the problem it describes.
    pub fn build(&mut self, id: impl Into<String>) -> std::result::Result<Problem, DraftError> {
        let question = self.question.value().trim().to_string();
        if question.is_empty() {
            return Err(DraftError::EmptyQuestion);
        }
        let id = id.into();
        let graph = self.explanation_graph();

        let problem = match self.kind {
            ProblemKind::TableFill => {
                let table = self.table.layout().clone();
                if table.row_count() == 0 || table.column_count() == 0 {
                    return Err(DraftError::EmptyTable);
                }
                Problem::TableFill(TableProblem {
                    id,
                    question,
                    table,
                    graph,
                })
            }
            ProblemKind::SingleChoice => {
                let options = self.choice.options().to_vec();
                if options.is_empty() {
                    return Err(DraftError::NoOptions);
                }
                if self.choice.correct >= options.len() {
                    return Err(DraftError::CorrectOptionOutOfRange {
                        index: self.choice.correct,
                        len: options.len(),
                    });
                }
                Problem::SingleChoice(ChoiceProblem {
                    id,
                    question,
                    options,
                    correct_option_index: self.choice.correct,
                    graph,
                })
            }
            ProblemKind::FillBlank => {
                self.blank.sync_calculator();
                let answer_graph = (self.blank.kind == AnswerKind::Graph)
                    .then(|| self.blank.calculator.snapshot());
                Problem::FillBlank(BlankProblem {
                    id,
                    question,
                    answer: self.blank.answer.value().trim().to_string(),
                    answer_kind: Some(self.blank.kind),
                    answer_graph,
                    graph,
                })
            }
        };
        Ok(problem)
    }
}

fn ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Key handling for the create screen.
///
/// Tab / Shift+Tab move between sections, Ctrl+S saves, Esc discards.
pub fn handle_editor_input(
    draft: &mut ProblemDraft,
    key: KeyEvent,
    store: &mut ProblemStore,
    app_state: &mut AppState,
) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            *draft = ProblemDraft::new();
            *app_state = AppState::Menu;
            return Ok(());
        }
        KeyCode::Tab => {
            draft.focus = draft.focus.next();
            return Ok(());
        }
        KeyCode::BackTab => {
            draft.focus = draft.focus.prev();
            return Ok(());
        }
        _ => {}
    }

    if ctrl(&key, 's') {
        match draft.build(String::new()) {
            Ok(problem) => {
                let id = store.add(problem)?;
                logger::log(&format!("Saved problem {} from editor", id));
                *draft = ProblemDraft::new();
                *app_state = AppState::Menu;
            }
            Err(e) => draft.error = Some(e.to_string()),
        }
        return Ok(());
    }

    draft.error = None;

    match draft.focus {
        EditorFocus::Question => {
            draft.question.handle_key(&key);
        }
        EditorFocus::Kind => match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter => {
                draft.kind = draft.kind.next();
            }
            _ => {}
        },
        EditorFocus::Body => handle_body_input(draft, &key),
        EditorFocus::Formula => handle_formula_input(draft, &key),
        EditorFocus::Graph => {
            if ctrl(&key, 't') {
                draft.cycle_graph_kind();
            } else if ctrl(&key, 'd') {
                draft.remove_graph();
            } else if draft.graph_input.handle_key(&key) {
                draft.sync_graph();
            }
        }
    }

    Ok(())
}

fn handle_body_input(draft: &mut ProblemDraft, key: &KeyEvent) {
    match draft.kind {
        ProblemKind::TableFill => {
            let table = &mut draft.table;
            if ctrl(key, 'n') {
                table.add_row();
            } else if ctrl(key, 'l') {
                table.add_column();
            } else if ctrl(key, 'd') {
                table.remove_at_cursor();
            } else if ctrl(key, 't') {
                table.cycle_column_kind();
            } else {
                match key.code {
                    KeyCode::Up => table.move_cursor(-1, 0),
                    KeyCode::Down | KeyCode::Enter => table.move_cursor(1, 0),
                    KeyCode::Left if table.field.cursor() == 0 => table.move_cursor(0, -1),
                    KeyCode::Right if table.field.cursor() == table.field.value().chars().count() => {
                        table.move_cursor(0, 1)
                    }
                    _ => {
                        table.field.handle_key(key);
                    }
                }
            }
        }
        ProblemKind::SingleChoice => {
            let choice = &mut draft.choice;
            if ctrl(key, 'n') {
                choice.add_option();
            } else if ctrl(key, 'd') {
                choice.remove_option();
            } else if ctrl(key, 't') {
                choice.cycle_kind();
            } else if ctrl(key, 'y') {
                choice.mark_correct();
            } else {
                match key.code {
                    KeyCode::Up => choice.select(choice.selected.saturating_sub(1)),
                    KeyCode::Down => choice.select(choice.selected + 1),
                    _ => {
                        choice.field.handle_key(key);
                    }
                }
            }
        }
        ProblemKind::FillBlank => {
            let blank = &mut draft.blank;
            if ctrl(key, 't') {
                blank.kind = blank.kind.next();
                blank.sync_calculator();
            } else if ctrl(key, 'g') {
                let next = blank.calculator.kind().next();
                blank.calculator.set_kind(next);
            } else if blank.answer.handle_key(key) {
                blank.sync_calculator();
            }
        }
    }
}

fn handle_formula_input(draft: &mut ProblemDraft, key: &KeyEvent) {
    let picker = &mut draft.formula;
    match key.code {
        KeyCode::PageDown => picker.cycle(true),
        KeyCode::PageUp => picker.cycle(false),
        KeyCode::Up => picker.variable = picker.variable.saturating_sub(1),
        KeyCode::Down => {
            if picker.variable + 1 < picker.values.len() {
                picker.variable += 1;
            }
        }
        KeyCode::Enter => {
            draft.insert_formula();
            draft.focus = EditorFocus::Question;
        }
        _ => {
            if let Some(input) = picker.values.get_mut(picker.variable) {
                input.handle_key(key);
            }
        }
    }
}

/// Human-readable list of the keys each section understands.
pub fn section_help(draft: &ProblemDraft) -> &'static [(&'static str, &'static str)] {
    match draft.focus {
        EditorFocus::Question => &[("Type", "edit question"), ("$..$", "math")],
        EditorFocus::Kind => &[("←/→", "change type")],
        EditorFocus::Body => match draft.kind {
            ProblemKind::TableFill => &[
                ("Arrows", "move"),
                ("^N", "add row"),
                ("^L", "add column"),
                ("^D", "delete"),
                ("^T", "column type"),
            ],
            ProblemKind::SingleChoice => &[
                ("↑/↓", "select"),
                ("^N", "add option"),
                ("^D", "delete"),
                ("^T", "option type"),
                ("^Y", "mark correct"),
            ],
            ProblemKind::FillBlank => &[("^T", "answer type"), ("^G", "calculator")],
        },
        EditorFocus::Formula => &[
            ("PgUp/PgDn", "formula"),
            ("↑/↓", "variable"),
            ("Enter", "insert"),
        ],
        EditorFocus::Graph => &[("Type", "expression"), ("^T", "calculator"), ("^D", "remove")],
    }
}

pub fn option_kind_hint(kind: OptionKind) -> &'static str {
    match kind {
        OptionKind::Text | OptionKind::Number => "",
        OptionKind::Latex => "LaTeX source",
        OptionKind::Graph => "graph expression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValueKind;

    fn press(draft: &mut ProblemDraft, store: &mut ProblemStore, state: &mut AppState, code: KeyCode) {
        handle_editor_input(draft, KeyEvent::new(code, KeyModifiers::NONE), store, state).unwrap();
    }

    fn press_ctrl(draft: &mut ProblemDraft, store: &mut ProblemStore, state: &mut AppState, c: char) {
        handle_editor_input(
            draft,
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL),
            store,
            state,
        )
        .unwrap();
    }

    fn type_text(draft: &mut ProblemDraft, store: &mut ProblemStore, state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(draft, store, state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_empty_question_is_rejected() {
        let mut draft = ProblemDraft::new();
        assert_eq!(draft.build("1"), Err(DraftError::EmptyQuestion));
        draft.question.set("   ");
        assert_eq!(draft.build("1"), Err(DraftError::EmptyQuestion));
    }

    #[test]
    fn test_build_table_problem_from_starter() {
        let mut draft = ProblemDraft::new();
        draft.question.set("Fill in");
        draft.table.field.set("4");
        let Problem::TableFill(table) = draft.build("7").unwrap() else {
            panic!("expected a table problem");
        };
        assert_eq!(table.id, "7");
        assert_eq!(table.table.cell(0, 0), "4");
        assert_eq!(table.table.row_count(), 2);
        assert!(table.table.is_consistent());
    }

    #[test]
    fn test_table_cursor_edits_headers_and_labels() {
        let mut draft = ProblemDraft::new();
        draft.table.move_cursor(-1, 0);
        draft.table.field.set("x");
        draft.table.move_cursor(1, -1);
        draft.table.field.set("first");
        draft.table.move_cursor(-1, 0);
        draft.table.field.set("");
        draft.table.cycle_column_kind();

        let layout = draft.table.layout().clone();
        assert_eq!(layout.columns[0].name, "x");
        assert_eq!(layout.rows[0], "first");
        assert_eq!(layout.row_header_label, None);
        assert_eq!(layout.columns[0].kind, ValueKind::Text);
    }

    #[test]
    fn test_table_remove_all_rows_is_rejected() {
        let mut draft = ProblemDraft::new();
        draft.question.set("q");
        draft.table.remove_at_cursor();
        draft.table.remove_at_cursor();
        assert_eq!(draft.table.layout.row_count(), 0);
        assert_eq!(draft.build("1"), Err(DraftError::EmptyTable));
    }

    #[test]
    fn test_choice_correct_index_follows_removals() {
        let mut choice = ChoiceDraft::default();
        choice.field.set("A");
        choice.add_option();
        choice.field.set("B");
        choice.add_option();
        choice.field.set("C");
        choice.mark_correct();
        assert_eq!(choice.correct, 2);

        choice.select(0);
        choice.remove_option();
        assert_eq!(choice.correct, 1);
        let correct = choice.correct;
        assert_eq!(choice.options()[correct].text, "C");

        choice.select(1);
        choice.remove_option();
        assert_eq!(choice.correct, 0);
        assert_eq!(choice.options().len(), 1);
    }

    #[test]
    fn test_choice_without_options_is_rejected() {
        let mut draft = ProblemDraft::new();
        draft.question.set("pick");
        draft.kind = ProblemKind::SingleChoice;
        draft.choice.remove_option();
        assert_eq!(draft.build("1"), Err(DraftError::NoOptions));

        draft.choice.add_option();
        draft.choice.correct = 3;
        assert_eq!(
            draft.build("1"),
            Err(DraftError::CorrectOptionOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_graph_blank_records_calculator_state() {
        let mut draft = ProblemDraft::new();
        draft.question.set("Draw $y=x$");
        draft.kind = ProblemKind::FillBlank;
        draft.blank.kind = AnswerKind::Graph;
        draft.blank.answer.set("y=x");
        let Problem::FillBlank(blank) = draft.build("1").unwrap() else {
            panic!("expected a blank problem");
        };
        assert_eq!(blank.answer, "y=x");
        assert_eq!(blank.answer_kind, Some(AnswerKind::Graph));
        let graph = blank.answer_graph.unwrap();
        assert_eq!(graph.expressions()[0].latex.as_deref(), Some("y=x"));
    }

    #[test]
    fn test_insert_formula_at_question_cursor() {
        let mut draft = ProblemDraft::new();
        draft.question.set("Graph  now");
        draft.question.replace("Graph  now".to_string(), 6);
        draft.formula.values[0].set("2");
        draft.insert_formula();
        assert_eq!(draft.question.value(), "Graph $y = 2x + 0$ now");
    }

    #[test]
    fn test_save_flow_adds_to_store() {
        let mut draft = ProblemDraft::new();
        let mut store = ProblemStore::in_memory();
        let mut state = AppState::Create;

        press_ctrl(&mut draft, &mut store, &mut state, 's');
        assert_eq!(state, AppState::Create);
        assert!(draft.error.is_some());

        type_text(&mut draft, &mut store, &mut state, "What is $1+1$?");
        press(&mut draft, &mut store, &mut state, KeyCode::Tab);
        press(&mut draft, &mut store, &mut state, KeyCode::Right);
        press(&mut draft, &mut store, &mut state, KeyCode::Right);
        assert_eq!(draft.kind, ProblemKind::FillBlank);
        press(&mut draft, &mut store, &mut state, KeyCode::Tab);
        type_text(&mut draft, &mut store, &mut state, "2");
        press_ctrl(&mut draft, &mut store, &mut state, 's');

        assert_eq!(state, AppState::Menu);
        assert_eq!(store.len(), 1);
        assert_eq!(store.problems()[0].question(), "What is $1+1$?");
    }

    #[test]
    fn test_explanation_graph_is_attached() {
        let mut draft = ProblemDraft::new();
        let mut store = ProblemStore::in_memory();
        let mut state = AppState::Create;
        draft.question.set("q");
        draft.focus = EditorFocus::Graph;
        type_text(&mut draft, &mut store, &mut state, "y=x^2");
        press_ctrl(&mut draft, &mut store, &mut state, 't');

        let problem = draft.build("1").unwrap();
        let graph = problem.explanation_graph().unwrap();
        assert_eq!(graph.kind, GraphKind::Geometry);
        assert_eq!(graph.expressions()[0].latex.as_deref(), Some("y=x^2"));
    }
}
