//! Graph calculator attachments.
//!
//! The calculator itself is an external embed. This module only knows how to
//! name its flavours, where to load them from, and how to carry the opaque
//! state blob it produces.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const EMBED_BASE_URL: &str = "https://www.desmos.com/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    #[default]
    Graphing,
    Geometry,
    Scientific,
    #[serde(alias = "four_function")]
    FourFunction,
}

impl GraphKind {
    pub const ALL: [GraphKind; 4] = [
        GraphKind::Graphing,
        GraphKind::Geometry,
        GraphKind::Scientific,
        GraphKind::FourFunction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GraphKind::Graphing => "Graphing calculator",
            GraphKind::Geometry => "Geometry tool",
            GraphKind::Scientific => "Scientific calculator",
            GraphKind::FourFunction => "Four-function calculator",
        }
    }

    fn script_path(self) -> &'static str {
        match self {
            GraphKind::Graphing => "v1.11/calculator.js",
            GraphKind::Geometry => "v1.7/geometry.js",
            GraphKind::Scientific => "v1.0/scientific.js",
            GraphKind::FourFunction => "v1.0/fourfunction.js",
        }
    }

    /// Embed script loaded on demand for this calculator flavour.
    pub fn script_url(self, api_key: Option<&str>) -> String {
        let base = format!("{}/{}", EMBED_BASE_URL, self.script_path());
        match api_key {
            Some(key) if !key.is_empty() => format!("{}?apiKey={}", base, key),
            _ => base,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// A calculator state blob together with the calculator it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAttachment {
    #[serde(default)]
    pub kind: GraphKind,
    #[serde(default)]
    pub state: Value,
}

impl GraphAttachment {
    pub fn new(kind: GraphKind, state: Value) -> Self {
        Self { kind, state }
    }

    /// Expressions recorded inside a graphing-calculator state, in order.
    pub fn expressions(&self) -> Vec<Expression> {
        self.state
            .pointer("/expressions/list")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|item| serde_json::from_value::<Expression>(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub latex: Option<String>,
}

/// The seam to a graphing widget: get/set its serializable state and read
/// the expressions the user entered.
pub trait GraphCalculator {
    fn kind(&self) -> GraphKind;
    fn state(&self) -> Value;
    fn set_state(&mut self, state: &Value);
    fn expressions(&self) -> Vec<Expression>;

    fn snapshot(&self) -> GraphAttachment {
        GraphAttachment::new(self.kind(), self.state())
    }
}

/// Calculator stand-in for the terminal: keeps an expression list and
/// produces a state blob shaped like the embed's.
#[derive(Debug, Clone, Default)]
pub struct ExpressionCalculator {
    kind: GraphKind,
    expressions: Vec<Expression>,
}

impl ExpressionCalculator {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            expressions: Vec::new(),
        }
    }

    pub fn set_kind(&mut self, kind: GraphKind) {
        self.kind = kind;
    }

    pub fn set_expression(&mut self, id: &str, latex: &str) {
        let latex = Some(latex.to_string()).filter(|l| !l.trim().is_empty());
        match self.expressions.iter_mut().find(|e| e.id == id) {
            Some(existing) => existing.latex = latex,
            None => self.expressions.push(Expression {
                id: id.to_string(),
                latex,
            }),
        }
    }

    pub fn clear(&mut self) {
        self.expressions.clear();
    }
}

impl GraphCalculator for ExpressionCalculator {
    fn kind(&self) -> GraphKind {
        self.kind
    }

    fn state(&self) -> Value {
        json!({
            "version": 11,
            "expressions": { "list": self.expressions },
        })
    }

    fn set_state(&mut self, state: &Value) {
        self.expressions = GraphAttachment::new(self.kind, state.clone()).expressions();
    }

    fn expressions(&self) -> Vec<Expression> {
        self.expressions.clone()
    }
}

/// LaTeX of the first expression that has any.
pub fn first_expression_latex(expressions: &[Expression]) -> Option<String> {
    expressions
        .iter()
        .filter_map(|e| e.latex.as_deref())
        .find(|latex| !latex.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_urls() {
        assert_eq!(
            GraphKind::Graphing.script_url(Some("k")),
            "https://www.desmos.com/api/v1.11/calculator.js?apiKey=k"
        );
        assert_eq!(
            GraphKind::Geometry.script_url(None),
            "https://www.desmos.com/api/v1.7/geometry.js"
        );
        assert!(GraphKind::FourFunction
            .script_url(None)
            .ends_with("v1.0/fourfunction.js"));
    }

    #[test]
    fn test_kind_serialization_matches_stored_names() {
        assert_eq!(
            serde_json::to_string(&GraphKind::FourFunction).unwrap(),
            "\"fourfunction\""
        );
        let kind: GraphKind = serde_json::from_str("\"geometry\"").unwrap();
        assert_eq!(kind, GraphKind::Geometry);
    }

    #[test]
    fn test_kind_cycles() {
        assert_eq!(GraphKind::Graphing.next(), GraphKind::Geometry);
        assert_eq!(GraphKind::FourFunction.next(), GraphKind::Graphing);
    }

    #[test]
    fn test_calculator_state_roundtrip_keeps_expressions() {
        let mut calc = ExpressionCalculator::new(GraphKind::Graphing);
        calc.set_expression("1", "y=2x+1");
        calc.set_expression("2", "");
        let state = calc.state();

        let mut other = ExpressionCalculator::new(GraphKind::Graphing);
        other.set_state(&state);
        assert_eq!(other.expressions(), calc.expressions());
        assert_eq!(
            first_expression_latex(&other.expressions()),
            Some("y=2x+1".to_string())
        );
    }

    #[test]
    fn test_first_expression_skips_empty() {
        let exprs = vec![
            Expression {
                id: "a".into(),
                latex: None,
            },
            Expression {
                id: "b".into(),
                latex: Some("  ".into()),
            },
            Expression {
                id: "c".into(),
                latex: Some("x^2".into()),
            },
        ];
        assert_eq!(first_expression_latex(&exprs), Some("x^2".to_string()));
        assert_eq!(first_expression_latex(&[]), None);
    }
}
