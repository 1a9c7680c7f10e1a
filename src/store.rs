//! The problem list and the key/value storage it lives in.
//!
//! `ProblemStore` is the only code that serializes problems. Screens borrow
//! it; nothing else writes the `"problems"` key.

use crate::error::Result;
use crate::logger;
use crate::models::Problem;
use serde_json::Value;
use std::collections::HashMap;

pub const PROBLEMS_KEY: &str = "problems";

/// String key/value storage scoped to one session.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

pub struct ProblemStore {
    storage: Box<dyn SessionStorage>,
    problems: Vec<Problem>,
}

impl ProblemStore {
    /// Open a store over `storage`, reading whatever list is already there.
    pub fn open(storage: Box<dyn SessionStorage>) -> Result<Self> {
        let mut store = Self {
            storage,
            problems: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn in_memory() -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            problems: Vec::new(),
        }
    }

    /// Re-read the list from storage. An unreadable list is logged and
    /// treated as empty.
    pub fn reload(&mut self) -> Result<()> {
        self.problems = match self.storage.get_item(PROBLEMS_KEY)? {
            Some(raw) => parse_problems(&raw),
            None => Vec::new(),
        };
        Ok(())
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id() == id)
    }

    /// Append a problem under a fresh id and persist. Returns the id.
    /// Nothing changes in memory if the write fails.
    pub fn add(&mut self, mut problem: Problem) -> Result<String> {
        let id = self.next_id();
        problem.set_id(id.clone());
        let mut problems = self.problems.clone();
        problems.push(problem);
        self.commit(problems)?;
        logger::log(&format!("Added problem {}", id));
        Ok(id)
    }

    /// Remove the problem with `id`, keeping the order of the rest.
    /// Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let problems: Vec<Problem> = self
            .problems
            .iter()
            .filter(|p| p.id() != id)
            .cloned()
            .collect();
        if problems.len() == self.problems.len() {
            return Ok(false);
        }
        self.commit(problems)?;
        logger::log(&format!("Deleted problem {}", id));
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove_item(PROBLEMS_KEY)?;
        self.problems.clear();
        Ok(())
    }

    /// Write `problems` and only then make them the in-memory list.
    fn commit(&mut self, problems: Vec<Problem>) -> Result<()> {
        let raw = serde_json::to_string(&problems)?;
        self.storage.set_item(PROBLEMS_KEY, &raw)?;
        self.problems = problems;
        Ok(())
    }

    /// Creation time in milliseconds, bumped past any id already taken.
    fn next_id(&self) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}

/// Entries that cannot be read are logged and skipped; the rest still load.
fn parse_problems(raw: &str) -> Vec<Problem> {
    let entries = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            logger::warn(&format!("Stored problem list is unreadable, starting empty: {}", e));
            return Vec::new();
        }
    };
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match Problem::from_stored(entry) {
            Ok(problem) => Some(problem),
            Err(e) => {
                logger::warn(&format!("Skipping stored problem #{}: {}", index, e));
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use crate::graph::GraphKind;
    use crate::models::{AnswerKind, BlankProblem};
    use std::io;

    fn blank(question: &str) -> Problem {
        Problem::FillBlank(BlankProblem {
            id: String::new(),
            question: question.into(),
            answer: "1".into(),
            answer_kind: Some(AnswerKind::Text),
            answer_graph: None,
            graph: None,
        })
    }

    fn questions(store: &ProblemStore) -> Vec<&str> {
        store.problems().iter().map(Problem::question).collect()
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = ProblemStore::in_memory();
        let a = store.add(blank("a")).unwrap();
        let b = store.add(blank("b")).unwrap();
        let c = store.add(blank("c")).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert!(a.parse::<i64>().is_ok());
        assert_eq!(store.get(&b).map(Problem::question), Some("b"));
    }

    #[test]
    fn test_delete_keeps_order_of_the_rest() {
        let mut store = ProblemStore::in_memory();
        let _a = store.add(blank("a")).unwrap();
        let b = store.add(blank("b")).unwrap();
        let _c = store.add(blank("c")).unwrap();

        assert!(store.delete(&b).unwrap());
        assert_eq!(questions(&store), vec!["a", "c"]);
        assert!(!store.delete("missing").unwrap());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_list_survives_reopen() {
        let mut storage = MemoryStorage::new();
        {
            let mut store = ProblemStore::in_memory();
            store.add(blank("kept")).unwrap();
            let raw = serde_json::to_string(store.problems()).unwrap();
            storage.set_item(PROBLEMS_KEY, &raw).unwrap();
        }
        let store = ProblemStore::open(Box::new(storage)).unwrap();
        assert_eq!(questions(&store), vec!["kept"]);
    }

    #[test]
    fn test_malformed_list_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item(PROBLEMS_KEY, "{not json").unwrap();
        let store = ProblemStore::open(Box::new(storage)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let store = ProblemStore::open(Box::new(MemoryStorage::new())).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_normalizes_legacy_tables() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                PROBLEMS_KEY,
                r#"[{"type":"TABLE_FILL_CELLS","id":"1","question":"q","columns":["a"],"rows":["r1","r2"],"cells":[["x"]]}]"#,
            )
            .unwrap();
        let store = ProblemStore::open(Box::new(storage)).unwrap();
        let Some(Problem::TableFill(table)) = store.get("1") else {
            panic!("expected a table problem");
        };
        assert!(table.table.is_consistent());
        assert_eq!(table.table.cell(0, 0), "x");
        assert_eq!(table.table.cell(1, 0), "");
    }

    #[test]
    fn test_null_cells_read_as_empty() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                PROBLEMS_KEY,
                r#"[
                    {"type":"FILL_IN_THE_BLANK","id":"1","question":"ok","answer":"4"},
                    {"type":"TABLE_FILL_CELLS","id":"2","question":"t","columns":["a","b"],"rows":["r1",null],"cells":[[null,"y"],null]}
                ]"#,
            )
            .unwrap();
        let store = ProblemStore::open(Box::new(storage)).unwrap();
        assert_eq!(store.len(), 2);
        let Some(Problem::TableFill(table)) = store.get("2") else {
            panic!("expected a table problem");
        };
        assert_eq!(table.table.rows, vec!["r1", ""]);
        assert_eq!(table.table.cells, vec![vec!["", "y"], vec!["", ""]]);
    }

    #[test]
    fn test_null_question_and_options_read_as_empty() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                PROBLEMS_KEY,
                r#"[
                    {"type":"MCQ_SINGLE","id":"1","question":null,"options":["a",null,{"text":null,"type":"latex"}],"correctOptionIndex":0},
                    {"type":"FILL_IN_THE_BLANK","id":"2","question":"ok","answer":null}
                ]"#,
            )
            .unwrap();
        let store = ProblemStore::open(Box::new(storage)).unwrap();
        assert_eq!(questions(&store), vec!["", "ok"]);
        let Some(Problem::SingleChoice(choice)) = store.get("1") else {
            panic!("expected a choice problem");
        };
        assert_eq!(choice.options.len(), 3);
        assert_eq!(choice.options[1].text, "");
        assert_eq!(choice.options[2].text, "");
    }

    #[test]
    fn test_unreadable_entry_is_skipped_alone() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                PROBLEMS_KEY,
                r#"[
                    {"type":"FILL_IN_THE_BLANK","id":"1","question":"first","answer":"4"},
                    {"type":"NOT_A_KIND","id":"2"},
                    42,
                    {"type":"FILL_IN_THE_BLANK","id":"3","question":"third","answer":"5"}
                ]"#,
            )
            .unwrap();
        let store = ProblemStore::open(Box::new(storage)).unwrap();
        assert_eq!(questions(&store), vec!["first", "third"]);
    }

    #[test]
    fn test_top_level_graph_fields_become_explanation_graph() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                PROBLEMS_KEY,
                r#"[{"type":"FILL_IN_THE_BLANK","id":"1","question":"q","answer":"4",
                     "graphState":{"expressions":{"list":[{"id":"1","latex":"y=x"}]}},
                     "graphType":"geometry"}]"#,
            )
            .unwrap();
        let store = ProblemStore::open(Box::new(storage)).unwrap();
        let graph = store.get("1").and_then(Problem::explanation_graph);
        assert_eq!(graph.map(|g| g.kind), Some(GraphKind::Geometry));
        assert_eq!(graph.map(|g| g.expressions().len()), Some(1));
    }

    /// Reads what it was opened with and refuses every write.
    struct ReadOnlyStorage(MemoryStorage);

    impl SessionStorage for ReadOnlyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.0.get_item(key)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(QuizError::Io(io::Error::other("storage is read-only")))
        }

        fn remove_item(&mut self, _key: &str) -> Result<()> {
            Err(QuizError::Io(io::Error::other("storage is read-only")))
        }
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let mut inner = MemoryStorage::new();
        inner
            .set_item(
                PROBLEMS_KEY,
                r#"[{"type":"FILL_IN_THE_BLANK","id":"1","question":"kept","answer":"4"}]"#,
            )
            .unwrap();
        let mut store = ProblemStore::open(Box::new(ReadOnlyStorage(inner))).unwrap();

        assert!(store.add(blank("new")).is_err());
        assert_eq!(questions(&store), vec!["kept"]);

        assert!(store.delete("1").is_err());
        assert_eq!(questions(&store), vec!["kept"]);

        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_removes_key() {
        let mut store = ProblemStore::in_memory();
        store.add(blank("a")).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        store.reload().unwrap();
        assert!(store.is_empty());
    }
}
