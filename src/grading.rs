//! Answer equivalence and scoring.
//!
//! All comparisons are on source strings. `"2+2"` is not `"4"`.

use crate::models::{AnswerKind, BlankProblem, Problem};
use crate::table::cell_at;

/// What a learner handed in for one problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Text(String),
    Grid(Vec<Vec<String>>),
    Choice(Option<usize>),
}

pub fn normalize_text(s: &str) -> &str {
    s.trim()
}

/// Trim, then drop one surrounding pair of `$` if both ends carry one.
pub fn strip_math_delimiters(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('$') && s.ends_with('$') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

pub fn text_answers_match(stored: &str, user: &str) -> bool {
    normalize_text(stored) == normalize_text(user)
}

pub fn math_answers_match(stored: &str, user: &str) -> bool {
    strip_math_delimiters(stored) == strip_math_delimiters(user)
}

fn is_wrapped_math(s: &str) -> bool {
    let s = s.trim();
    s.len() >= 2 && s.starts_with('$') && s.ends_with('$')
}

impl AnswerKind {
    /// The rule a blank is judged by. An explicit kind wins; without one a
    /// `$…$` stored answer is judged as math.
    pub fn resolve(explicit: Option<AnswerKind>, stored: &str) -> AnswerKind {
        match explicit {
            Some(kind) => kind,
            None if is_wrapped_math(stored) => AnswerKind::Latex,
            None => AnswerKind::Text,
        }
    }
}

/// All-or-nothing grid comparison over `rows` x `cols`.
pub fn grids_match(
    stored: &[Vec<String>],
    user: &[Vec<String>],
    rows: usize,
    cols: usize,
) -> bool {
    (0..rows).all(|r| {
        (0..cols).all(|c| text_answers_match(cell_at(stored, r, c), cell_at(user, r, c)))
    })
}

pub fn choice_matches(correct: usize, selected: Option<usize>) -> bool {
    selected == Some(correct)
}

fn blank_matches(problem: &BlankProblem, user: &str) -> bool {
    match AnswerKind::resolve(problem.answer_kind, &problem.answer) {
        AnswerKind::Text => text_answers_match(&problem.answer, user),
        AnswerKind::Latex | AnswerKind::Graph => math_answers_match(&problem.answer, user),
    }
}

/// Judge one submission. A submission of the wrong shape is incorrect.
pub fn grade(problem: &Problem, submission: &Submission) -> bool {
    match (problem, submission) {
        (Problem::TableFill(p), Submission::Grid(user)) => grids_match(
            &p.table.cells,
            user,
            p.table.row_count(),
            p.table.column_count(),
        ),
        (Problem::SingleChoice(p), Submission::Choice(selected)) => {
            choice_matches(p.correct_option_index, *selected)
        }
        (Problem::FillBlank(p), Submission::Text(user)) => blank_matches(p, user),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn from_results<I: IntoIterator<Item = bool>>(results: I) -> Self {
        results.into_iter().fold(Score::default(), |acc, ok| Score {
            correct: acc.correct + usize::from(ok),
            total: acc.total + 1,
        })
    }

    /// Rounded to the nearest whole percent; 0 for an empty quiz.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChoiceOption, ChoiceProblem, ColumnDefinition, OptionKind, TableProblem, ValueKind};
    use crate::table::TableLayout;

    fn blank(answer: &str, kind: Option<AnswerKind>) -> Problem {
        Problem::FillBlank(BlankProblem {
            id: "1".into(),
            question: "q".into(),
            answer: answer.into(),
            answer_kind: kind,
            answer_graph: None,
            graph: None,
        })
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_text_rule_trims_and_is_case_sensitive() {
        assert!(text_answers_match("  42 ", "42"));
        assert!(!text_answers_match("Paris", "paris"));
        assert!(!text_answers_match("a b", "a  b"));
    }

    #[test]
    fn test_trimming_does_not_change_the_verdict() {
        let pairs = [("4", " 4"), ("$x$", "x "), (" a ", "b"), ("", "  ")];
        for (a, u) in pairs {
            for kind in [None, Some(AnswerKind::Text), Some(AnswerKind::Latex)] {
                assert_eq!(
                    grade(&blank(a, kind), &Submission::Text(u.into())),
                    grade(&blank(a.trim(), kind), &Submission::Text(u.trim().into())),
                    "stored {a:?}, user {u:?}"
                );
            }
        }
    }

    #[test]
    fn test_math_rule_ignores_delimiters() {
        assert!(math_answers_match("$x^2$", "x^2"));
        assert!(math_answers_match(" x^2 ", "$x^2$"));
        assert!(!math_answers_match("$x^2$", "x^3"));
        assert_eq!(strip_math_delimiters("$"), "$");
        assert_eq!(strip_math_delimiters("$$"), "");
        assert_eq!(strip_math_delimiters("$x"), "$x");
    }

    #[test]
    fn test_wrapped_stored_answer_accepts_bare_latex() {
        assert!(grade(&blank("$x^2$", None), &Submission::Text("x^2".into())));
        assert!(grade(
            &blank("$x^2$", Some(AnswerKind::Latex)),
            &Submission::Text("x^2".into())
        ));
    }

    #[test]
    fn test_no_semantic_evaluation() {
        assert!(!grade(&blank("4", None), &Submission::Text("2+2".into())));
        assert!(!grade(
            &blank("4", Some(AnswerKind::Latex)),
            &Submission::Text("2+2".into())
        ));
    }

    #[test]
    fn test_explicit_text_kind_keeps_delimiters_significant() {
        assert!(!grade(
            &blank("$x$", Some(AnswerKind::Text)),
            &Submission::Text("x".into())
        ));
        assert_eq!(AnswerKind::resolve(None, "x"), AnswerKind::Text);
        assert_eq!(AnswerKind::resolve(None, " $x$ "), AnswerKind::Latex);
        assert_eq!(
            AnswerKind::resolve(Some(AnswerKind::Graph), "$x$"),
            AnswerKind::Graph
        );
    }

    #[test]
    fn test_graph_answer_uses_math_rule() {
        assert!(grade(
            &blank("y=2x+1", Some(AnswerKind::Graph)),
            &Submission::Text("$y=2x+1$".into())
        ));
    }

    #[test]
    fn test_single_choice() {
        let problem = Problem::SingleChoice(ChoiceProblem {
            id: "1".into(),
            question: "pick".into(),
            options: ["A", "B", "C"]
                .iter()
                .map(|t| ChoiceOption::new(*t, OptionKind::Text))
                .collect(),
            correct_option_index: 1,
            graph: None,
        });
        assert!(grade(&problem, &Submission::Choice(Some(1))));
        assert!(!grade(&problem, &Submission::Choice(Some(2))));
        assert!(!grade(&problem, &Submission::Choice(None)));
    }

    #[test]
    fn test_grid_is_all_or_nothing() {
        let mut table = TableLayout::new(
            vec![
                ColumnDefinition::new("a", ValueKind::Number),
                ColumnDefinition::new("b", ValueKind::Number),
            ],
            vec!["r1".into(), "r2".into()],
        );
        table.cells = grid(&[&["1", "1"], &["1", "1"]]);
        let problem = Problem::TableFill(TableProblem {
            id: "1".into(),
            question: "fill".into(),
            table,
            graph: None,
        });

        assert!(grade(&problem, &Submission::Grid(grid(&[&["1", " 1"], &["1 ", "1"]]))));
        assert!(!grade(&problem, &Submission::Grid(grid(&[&["1", "1"], &["1", "2"]]))));
        assert!(!grade(&problem, &Submission::Grid(grid(&[&["1", "1"]]))));
    }

    #[test]
    fn test_grid_missing_cells_compare_as_empty() {
        let stored = grid(&[&["x", ""], &["", ""]]);
        let user = grid(&[&["x"]]);
        assert!(grids_match(&stored, &user, 2, 2));
    }

    #[test]
    fn test_wrong_submission_shape_is_incorrect() {
        assert!(!grade(&blank("1", None), &Submission::Choice(Some(0))));
        assert!(!grade(&blank("", None), &Submission::Grid(Vec::new())));
    }

    #[test]
    fn test_score_percentage() {
        let score = Score::from_results([true, false, true]);
        assert_eq!(score, Score { correct: 2, total: 3 });
        assert_eq!(score.percentage(), 67);
        assert_eq!(Score::default().percentage(), 0);
        assert_eq!(Score::from_results([true, true]).percentage(), 100);
    }
}
