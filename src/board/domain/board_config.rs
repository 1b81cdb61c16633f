//! Denormalized board configuration for one parent group.

use super::{BoardDomainError, BoardTemplate, CardRef, Column, TaskId, WorkflowStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered columns of one board, each holding ordered card references.
///
/// Serializes as the persisted array shape
/// `[{ name, type, isVisible, color, icon, wipLimit, blockWipReached, cards }]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardConfig {
    pub(super) columns: Vec<Column>,
}

/// Where a card currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLocation {
    /// Column type holding the card.
    pub column: WorkflowStatus,
    /// Zero-based index within the column.
    pub position: usize,
}

impl BoardConfig {
    /// Creates an empty board from a template.
    #[must_use]
    pub fn from_template(template: &BoardTemplate) -> Self {
        Self {
            columns: template.columns().iter().map(Column::from_template).collect(),
        }
    }

    /// Decodes a stored board payload.
    ///
    /// Cards are sorted by their stored order; gaps are preserved so that
    /// reconciliation can detect and count them.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::UnreadableBoard`] when the payload does not
    /// match the persisted shape, or [`BoardDomainError::DuplicateColumn`]
    /// when two columns share a type.
    pub fn from_persisted(value: Value) -> Result<Self, BoardDomainError> {
        let mut columns: Vec<Column> = serde_json::from_value(value)
            .map_err(|err| BoardDomainError::UnreadableBoard(err.to_string()))?;
        let mut seen = Vec::with_capacity(columns.len());
        for column in &mut columns {
            if seen.contains(&column.column_type) {
                return Err(BoardDomainError::DuplicateColumn(column.column_type));
            }
            seen.push(column.column_type);
            column.cards.sort_by_key(|card| card.order);
        }
        Ok(Self { columns })
    }

    /// Encodes the board in its persisted shape.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error.
    pub fn to_persisted(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Returns the columns in board order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column for `status`.
    #[must_use]
    pub fn column(&self, status: WorkflowStatus) -> Option<&Column> {
        self.columns.iter().find(|column| column.column_type == status)
    }

    pub(super) fn column_mut(&mut self, status: WorkflowStatus) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| column.column_type == status)
    }

    /// Finds the first card for `task_id`.
    #[must_use]
    pub fn locate(&self, task_id: TaskId) -> Option<CardLocation> {
        self.columns.iter().find_map(|column| {
            column
                .cards
                .iter()
                .position(|card| card.task_id == task_id)
                .map(|position| CardLocation {
                    column: column.column_type,
                    position,
                })
        })
    }

    /// Returns the card for `task_id`, if placed.
    #[must_use]
    pub fn card(&self, task_id: TaskId) -> Option<&CardRef> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| card.task_id == task_id)
    }

    /// Returns the task identifiers of one column in display order.
    #[must_use]
    pub fn task_ids(&self, status: WorkflowStatus) -> Vec<TaskId> {
        self.column(status)
            .map(|column| column.cards.iter().map(CardRef::task_id).collect())
            .unwrap_or_default()
    }

    /// Returns the total number of cards on the board.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Updates one column's settings.
    ///
    /// Returns `Ok(None)` when the board has no column of that type.
    ///
    /// # Errors
    ///
    /// Propagates [`Column::apply_settings`] validation failures.
    pub fn configure_column(
        &mut self,
        status: WorkflowStatus,
        update: &super::ColumnSettingsUpdate,
    ) -> Result<Option<&Column>, BoardDomainError> {
        let Some(column) = self.column_mut(status) else {
            return Ok(None);
        };
        column.apply_settings(update)?;
        Ok(Some(&*column))
    }
}
