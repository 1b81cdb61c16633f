//! Column template used to materialize missing boards.

use super::{BoardDomainError, WorkflowStatus};
use serde::{Deserialize, Serialize};

/// Settings for one column of a freshly created board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTemplate {
    /// Workflow status the column holds.
    #[serde(rename = "type")]
    pub column_type: WorkflowStatus,
    /// Display name.
    pub name: String,
    /// Optional WIP limit.
    #[serde(default)]
    pub wip_limit: Option<u32>,
    /// Whether reaching the WIP limit blocks further entries.
    #[serde(rename = "blockWipReached", default)]
    pub block_on_wip_reached: bool,
    /// Display colour.
    #[serde(default)]
    pub color: Option<String>,
    /// Display icon.
    #[serde(default)]
    pub icon: Option<String>,
}

impl ColumnTemplate {
    /// Creates a column template without a WIP limit.
    #[must_use]
    pub fn new(column_type: WorkflowStatus, name: impl Into<String>) -> Self {
        Self {
            column_type,
            name: name.into(),
            wip_limit: None,
            block_on_wip_reached: false,
            color: None,
            icon: None,
        }
    }

    /// Sets a WIP limit and whether it blocks.
    #[must_use]
    pub const fn with_wip_limit(mut self, limit: u32, blocking: bool) -> Self {
        self.wip_limit = Some(limit);
        self.block_on_wip_reached = blocking;
        self
    }

    /// Sets display colour and icon.
    #[must_use]
    pub fn with_style(mut self, color: impl Into<String>, icon: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self.icon = Some(icon.into());
        self
    }
}

/// Ordered set of column templates covering every workflow status once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnTemplate>", into = "Vec<ColumnTemplate>")]
pub struct BoardTemplate {
    columns: Vec<ColumnTemplate>,
}

impl BoardTemplate {
    /// Creates a validated template.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::DuplicateColumn`] when a status appears
    /// twice, [`BoardDomainError::MissingColumn`] when one is absent, or
    /// [`BoardDomainError::EmptyColumnName`] for a blank name.
    pub fn new(columns: Vec<ColumnTemplate>) -> Result<Self, BoardDomainError> {
        let mut seen = Vec::with_capacity(columns.len());
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(BoardDomainError::EmptyColumnName);
            }
            if seen.contains(&column.column_type) {
                return Err(BoardDomainError::DuplicateColumn(column.column_type));
            }
            seen.push(column.column_type);
        }
        if let Some(missing) = WorkflowStatus::ALL
            .into_iter()
            .find(|status| !seen.contains(status))
        {
            return Err(BoardDomainError::MissingColumn(missing));
        }
        Ok(Self { columns })
    }

    /// The default five-column board: todo, in progress (WIP 5, blocking),
    /// blocked, review (WIP 3, blocking), done.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            columns: vec![
                ColumnTemplate::new(WorkflowStatus::Todo, "To Do").with_style("#6b7280", "circle"),
                ColumnTemplate::new(WorkflowStatus::InProgress, "In Progress")
                    .with_wip_limit(5, true)
                    .with_style("#3b82f6", "play"),
                ColumnTemplate::new(WorkflowStatus::Blocked, "Blocked").with_style("#ef4444", "ban"),
                ColumnTemplate::new(WorkflowStatus::Review, "Review")
                    .with_wip_limit(3, true)
                    .with_style("#f59e0b", "eye"),
                ColumnTemplate::new(WorkflowStatus::Done, "Done").with_style("#10b981", "check"),
            ],
        }
    }

    /// The standard layout with every WIP limit removed.
    #[must_use]
    pub fn without_wip_limits() -> Self {
        let mut template = Self::standard();
        for column in &mut template.columns {
            column.wip_limit = None;
            column.block_on_wip_reached = false;
        }
        template
    }

    /// Returns the column templates in board order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnTemplate] {
        &self.columns
    }

    /// Returns the template for `status`.
    #[must_use]
    pub fn column(&self, status: WorkflowStatus) -> Option<&ColumnTemplate> {
        self.columns.iter().find(|column| column.column_type == status)
    }
}

impl Default for BoardTemplate {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<ColumnTemplate>> for BoardTemplate {
    type Error = BoardDomainError;

    fn try_from(columns: Vec<ColumnTemplate>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<BoardTemplate> for Vec<ColumnTemplate> {
    fn from(template: BoardTemplate) -> Self {
        template.columns
    }
}
