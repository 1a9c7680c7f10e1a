use crate::graph::{GraphAttachment, GraphKind, first_expression_latex};
use crate::table::TableLayout;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Marker the first version of the tool used to smuggle a graph payload
/// through the plain answer string.
pub const LEGACY_GRAPH_PREFIX: &str = "graph:";

/// One authored quiz item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Problem {
    #[serde(rename = "TABLE_FILL_CELLS")]
    TableFill(TableProblem),
    #[serde(rename = "MCQ_SINGLE")]
    SingleChoice(ChoiceProblem),
    #[serde(rename = "FILL_IN_THE_BLANK")]
    FillBlank(BlankProblem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    TableFill,
    SingleChoice,
    FillBlank,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 3] = [
        ProblemKind::TableFill,
        ProblemKind::SingleChoice,
        ProblemKind::FillBlank,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProblemKind::TableFill => "Table fill",
            ProblemKind::SingleChoice => "Multiple choice",
            ProblemKind::FillBlank => "Fill in the blank",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ProblemKind::TableFill => "TABLE_FILL_CELLS",
            ProblemKind::SingleChoice => "MCQ_SINGLE",
            ProblemKind::FillBlank => "FILL_IN_THE_BLANK",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ProblemKind::TableFill => ProblemKind::SingleChoice,
            ProblemKind::SingleChoice => ProblemKind::FillBlank,
            ProblemKind::FillBlank => ProblemKind::TableFill,
        }
    }
}

impl Problem {
    pub fn id(&self) -> &str {
        match self {
            Problem::TableFill(p) => &p.id,
            Problem::SingleChoice(p) => &p.id,
            Problem::FillBlank(p) => &p.id,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            Problem::TableFill(p) => &p.question,
            Problem::SingleChoice(p) => &p.question,
            Problem::FillBlank(p) => &p.question,
        }
    }

    pub fn kind(&self) -> ProblemKind {
        match self {
            Problem::TableFill(_) => ProblemKind::TableFill,
            Problem::SingleChoice(_) => ProblemKind::SingleChoice,
            Problem::FillBlank(_) => ProblemKind::FillBlank,
        }
    }

    /// Illustrative graph shown next to the question, if the author added one.
    pub fn explanation_graph(&self) -> Option<&GraphAttachment> {
        match self {
            Problem::TableFill(p) => p.graph.as_ref(),
            Problem::SingleChoice(p) => p.graph.as_ref(),
            Problem::FillBlank(p) => p.graph.as_ref(),
        }
    }

    pub(crate) fn set_id(&mut self, id: String) {
        match self {
            Problem::TableFill(p) => p.id = id,
            Problem::SingleChoice(p) => p.id = id,
            Problem::FillBlank(p) => p.id = id,
        }
    }

    /// Read one stored entry. Older entries keep the explanation graph in
    /// top-level `graphState`/`graphType` fields; those move into `graph`.
    pub fn from_stored(mut value: Value) -> serde_json::Result<Problem> {
        if let Some(entry) = value.as_object_mut() {
            let state = entry.remove("graphState");
            let kind = entry.remove("graphType");
            if let Some(state) = state.filter(|s| !s.is_null())
                && !entry.contains_key("graph")
            {
                let kind: GraphKind = kind
                    .and_then(|k| serde_json::from_value(k).ok())
                    .unwrap_or_default();
                entry.insert(
                    "graph".to_string(),
                    serde_json::to_value(GraphAttachment::new(kind, state))?,
                );
            }
        }
        let mut problem: Problem = serde_json::from_value(value)?;
        problem.normalize();
        Ok(problem)
    }

    /// Bring data written by older versions into the current shape.
    pub fn normalize(&mut self) {
        match self {
            Problem::TableFill(p) => p.table.reconcile(),
            Problem::SingleChoice(_) => {}
            Problem::FillBlank(p) => p.lift_legacy_graph(),
        }
    }
}

/// Stored lists carry `null` wherever a field was cleared or never set.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Kind of value a table column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Text,
    Number,
    #[serde(alias = "math")]
    Latex,
}

impl ValueKind {
    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Latex => "math",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ValueKind::Text => ValueKind::Number,
            ValueKind::Number => ValueKind::Latex,
            ValueKind::Latex => ValueKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnRepr")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Columns were once stored as bare header strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnRepr {
    Missing,
    Name(String),
    Full {
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
        #[serde(default, rename = "type")]
        kind: ValueKind,
    },
}

impl From<ColumnRepr> for ColumnDefinition {
    fn from(repr: ColumnRepr) -> Self {
        match repr {
            ColumnRepr::Missing => ColumnDefinition::new("", ValueKind::Text),
            ColumnRepr::Name(name) => ColumnDefinition::new(name, ValueKind::Text),
            ColumnRepr::Full { name, kind } => ColumnDefinition::new(name, kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProblem {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(flatten)]
    pub table: TableLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphAttachment>,
}

/// Kind of content a choice option displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    #[default]
    Text,
    Number,
    #[serde(alias = "math")]
    Latex,
    #[serde(alias = "desmos")]
    Graph,
}

impl OptionKind {
    pub fn label(self) -> &'static str {
        match self {
            OptionKind::Text => "text",
            OptionKind::Number => "number",
            OptionKind::Latex => "math",
            OptionKind::Graph => "graph",
        }
    }

    pub fn next(self) -> Self {
        match self {
            OptionKind::Text => OptionKind::Number,
            OptionKind::Number => OptionKind::Latex,
            OptionKind::Latex => OptionKind::Graph,
            OptionKind::Graph => OptionKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ChoiceOptionRepr")]
pub struct ChoiceOption {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
}

impl ChoiceOption {
    pub fn new(text: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceOptionRepr {
    Missing,
    Text(String),
    Full {
        #[serde(default)]
        text: Option<String>,
        #[serde(default, rename = "type")]
        kind: OptionKind,
    },
}

impl From<ChoiceOptionRepr> for ChoiceOption {
    fn from(repr: ChoiceOptionRepr) -> Self {
        match repr {
            ChoiceOptionRepr::Missing => ChoiceOption::default(),
            ChoiceOptionRepr::Text(text) => ChoiceOption::new(text, OptionKind::Text),
            ChoiceOptionRepr::Full { text, kind } => {
                ChoiceOption::new(text.unwrap_or_default(), kind)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceProblem {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_option_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphAttachment>,
}

/// How a fill-in-the-blank answer is entered and judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    Text,
    #[serde(alias = "math")]
    Latex,
    Graph,
}

impl AnswerKind {
    pub fn label(self) -> &'static str {
        match self {
            AnswerKind::Text => "text",
            AnswerKind::Latex => "math",
            AnswerKind::Graph => "graph",
        }
    }

    pub fn next(self) -> Self {
        match self {
            AnswerKind::Text => AnswerKind::Latex,
            AnswerKind::Latex => AnswerKind::Graph,
            AnswerKind::Graph => AnswerKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankProblem {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, rename = "answerType", skip_serializing_if = "Option::is_none")]
    pub answer_kind: Option<AnswerKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_graph: Option<GraphAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphAttachment>,
}

impl BlankProblem {
    /// Move a `graph:{json}` answer into `answer_graph`. The payload is
    /// either `{graphState, graphType}` or the bare calculator state. The
    /// answer itself becomes the first expression of the graph.
    pub fn lift_legacy_graph(&mut self) {
        let Some(payload) = self.answer.strip_prefix(LEGACY_GRAPH_PREFIX) else {
            return;
        };
        let Ok(mut payload) = serde_json::from_str::<Value>(payload) else {
            return;
        };
        if !payload.is_object() {
            return;
        }
        let state = payload.get_mut("graphState").map(Value::take);
        let attachment = match state {
            Some(state) if !state.is_null() => {
                let kind = payload
                    .get("graphType")
                    .and_then(|k| serde_json::from_value(k.clone()).ok())
                    .unwrap_or_default();
                GraphAttachment::new(kind, state)
            }
            _ => GraphAttachment::new(GraphKind::Graphing, payload),
        };
        self.answer = first_expression_latex(&attachment.expressions()).unwrap_or_default();
        self.answer_kind = Some(AnswerKind::Graph);
        self.answer_graph = Some(attachment);
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AppState {
    Menu,
    Preview,
    DeleteConfirm,
    Create,
    Quiz,
    QuizQuitConfirm,
    Summary,
}
