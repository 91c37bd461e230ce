//! Partial update planning.
//!
//! # Responsibility
//! - Compare candidate values against the persisted row and keep only the
//!   columns that actually change.
//! - Render one parameterized `UPDATE` for the changed columns.
//!
//! # Invariants
//! - Columns appear in the order `set_if_changed` was called; callers call it
//!   in a fixed field order, so SQL text and parameters are reproducible.
//! - An absent candidate never produces an assignment.
//! - An empty plan issues no statement.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Outcome of a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Every supplied field matched the persisted row; nothing was written.
    Unchanged,
    /// One `UPDATE` was issued for these columns, in statement order.
    Updated { columns: Vec<&'static str> },
}

impl UpdateOutcome {
    pub fn changed(&self, column: &str) -> bool {
        match self {
            Self::Unchanged => false,
            Self::Updated { columns } => columns.iter().any(|name| *name == column),
        }
    }
}

/// Column assignments for one row of one table.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    table: &'static str,
    assignments: Vec<(&'static str, Value)>,
}

impl UpdatePlan {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    /// Adds `column = candidate` when a candidate is present and differs from
    /// the persisted value.
    pub fn set_if_changed<T>(
        &mut self,
        column: &'static str,
        candidate: Option<&T>,
        persisted: Option<&T>,
    ) -> &mut Self
    where
        T: PartialEq + Clone + Into<Value>,
    {
        if let Some(candidate) = candidate {
            if persisted != Some(candidate) {
                self.assignments.push((column, candidate.clone().into()));
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn changes(&self, column: &str) -> bool {
        self.assignments.iter().any(|(name, _)| *name == column)
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(name, _)| *name).collect()
    }

    /// Renders the statement, or `None` for an empty plan.
    pub fn sql(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!(
            "UPDATE {} SET {set_clause} WHERE id = ?{};",
            self.table,
            self.assignments.len() + 1
        ))
    }

    /// Changed values followed by `id` as the final `WHERE` parameter.
    pub fn params(&self, id: i64) -> Vec<Value> {
        let mut values: Vec<Value> = self
            .assignments
            .iter()
            .map(|(_, value)| value.clone())
            .collect();
        values.push(Value::Integer(id));
        values
    }

    /// Executes the plan against row `id` and reports what was written.
    pub fn execute(&self, conn: &Connection, id: i64) -> rusqlite::Result<UpdateOutcome> {
        let Some(sql) = self.sql() else {
            return Ok(UpdateOutcome::Unchanged);
        };
        conn.execute(&sql, params_from_iter(self.params(id)))?;
        Ok(UpdateOutcome::Updated {
            columns: self.columns(),
        })
    }
}
