//! Table-fill layout: column definitions, row labels and the cell grid.
//!
//! Every mutation leaves `cells` with exactly `rows.len()` rows of
//! `columns.len()` cells each.

use crate::models::{ColumnDefinition, ValueKind, null_as_default};
use serde::{Deserialize, Deserializer, Serialize};

/// Rebuild `cells` to `rows` x `cols`, keeping every value whose coordinate
/// still exists and filling the rest with empty strings.
pub fn reconcile(cells: &[Vec<String>], rows: usize, cols: usize) -> Vec<Vec<String>> {
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| cell_at(cells, r, c).to_string())
                .collect()
        })
        .collect()
}

/// Cell value at a coordinate; missing cells read as empty.
pub fn cell_at(cells: &[Vec<String>], row: usize, col: usize) -> &str {
    cells
        .get(row)
        .and_then(|r| r.get(col))
        .map(String::as_str)
        .unwrap_or("")
}

pub fn empty_grid(rows: usize, cols: usize) -> Vec<Vec<String>> {
    vec![vec![String::new(); cols]; rows]
}

fn labels_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels: Vec<Option<String>> = null_as_default(deserializer)?;
    Ok(labels.into_iter().map(Option::unwrap_or_default).collect())
}

/// Null rows and null cells read as empty.
fn cells_or_empty<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<Option<Vec<Option<String>>>> = null_as_default(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            row.unwrap_or_default()
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect()
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default, deserialize_with = "labels_or_empty")]
    pub rows: Vec<String>,
    #[serde(default, deserialize_with = "cells_or_empty")]
    pub cells: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_header_label: Option<String>,
}

impl TableLayout {
    pub fn new(columns: Vec<ColumnDefinition>, rows: Vec<String>) -> Self {
        let cells = empty_grid(rows.len(), columns.len());
        Self {
            columns,
            rows,
            cells,
            row_header_label: None,
        }
    }

    /// Starting layout of the editor: two text columns, two rows.
    pub fn starter() -> Self {
        let mut layout = Self::new(
            vec![
                ColumnDefinition::new("Column 1", ValueKind::Text),
                ColumnDefinition::new("Column 2", ValueKind::Text),
            ],
            vec!["Row 1".to_string(), "Row 2".to_string()],
        );
        layout.row_header_label = Some("Row header".to_string());
        layout
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.rows.len()
            && self.cells.iter().all(|r| r.len() == self.columns.len())
    }

    pub fn reconcile(&mut self) {
        self.cells = reconcile(&self.cells, self.rows.len(), self.columns.len());
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        cell_at(&self.cells, row, col)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value.into();
        }
    }

    pub fn add_column(&mut self) {
        let name = format!("Column {}", self.columns.len() + 1);
        self.columns.push(ColumnDefinition::new(name, ValueKind::Number));
        self.reconcile();
    }

    pub fn remove_column(&mut self, col: usize) {
        if col >= self.columns.len() {
            return;
        }
        self.columns.remove(col);
        for row in &mut self.cells {
            if col < row.len() {
                row.remove(col);
            }
        }
        self.reconcile();
    }

    pub fn rename_column(&mut self, col: usize, name: impl Into<String>) {
        if let Some(column) = self.columns.get_mut(col) {
            column.name = name.into();
        }
    }

    pub fn set_column_kind(&mut self, col: usize, kind: ValueKind) {
        if let Some(column) = self.columns.get_mut(col) {
            column.kind = kind;
        }
    }

    pub fn add_row(&mut self) {
        let label = format!("Row {}", self.rows.len() + 1);
        self.rows.push(label);
        self.reconcile();
    }

    pub fn remove_row(&mut self, row: usize) {
        if row >= self.rows.len() {
            return;
        }
        self.rows.remove(row);
        if row < self.cells.len() {
            self.cells.remove(row);
        }
        self.reconcile();
    }

    pub fn rename_row(&mut self, row: usize, label: impl Into<String>) {
        if let Some(existing) = self.rows.get_mut(row) {
            *existing = label.into();
        }
    }

    pub fn set_row_header_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.row_header_label = Some(label).filter(|l| !l.is_empty());
    }
}
