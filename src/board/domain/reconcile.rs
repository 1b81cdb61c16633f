//! Read-side reconciliation of a stored board against authoritative tasks.

use super::{BoardConfig, BoardTemplate, CardRef, Column, SubStatus, Task, TaskId, WorkflowStatus};
use std::collections::{HashMap, HashSet};

/// A board as found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredBoard {
    /// No board has been stored for the parent yet.
    Missing,
    /// A decodable board.
    Present(BoardConfig),
    /// A payload that could not be decoded, with the decoder's message.
    Unreadable(String),
}

/// Per-kind count of repairs made while reconciling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Cards moved to the column matching their task's status.
    pub relocated: usize,
    /// Tasks that had no card and were appended to their column.
    pub inserted: usize,
    /// Cards whose task no longer exists.
    pub orphans_dropped: usize,
    /// Extra cards for a task already placed elsewhere.
    pub duplicates_dropped: usize,
    /// Columns whose stored orders were not `0..len`.
    pub reindexed_columns: usize,
    /// Template columns missing from the stored board.
    pub columns_restored: usize,
    /// The stored payload was unreadable and the board was rebuilt.
    pub regenerated: bool,
}

impl RepairReport {
    /// Total number of repairs.
    #[must_use]
    pub const fn repairs(&self) -> usize {
        self.relocated
            + self.inserted
            + self.orphans_dropped
            + self.duplicates_dropped
            + self.reindexed_columns
            + self.columns_restored
            + if self.regenerated { 1 } else { 0 }
    }

    /// Returns `true` when nothing needed repair.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.repairs() == 0
    }
}

/// Reconciled board plus what it took to get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The consistent board.
    pub board: BoardConfig,
    /// Repairs performed.
    pub report: RepairReport,
    /// The board was built from the template rather than loaded.
    pub materialized: bool,
}

impl Reconciliation {
    /// Returns `true` when the reconciled board differs from storage.
    #[must_use]
    pub const fn needs_write_back(&self) -> bool {
        self.materialized || !self.report.is_clean()
    }
}

/// Brings a stored board in line with the given tasks.
///
/// `tasks` must be the complete task set of the board's parent. The result
/// satisfies: every task has exactly one card, every card sits in the column
/// matching its task's status, and every column is ordered `0..len`. Cards
/// already in the right place keep their relative order; relocated and
/// missing cards are appended. Placing tasks on a freshly built board does
/// not count as a repair.
#[must_use]
pub fn reconcile(stored: StoredBoard, tasks: &[Task], template: &BoardTemplate) -> Reconciliation {
    let mut report = RepairReport::default();
    let (mut board, materialized) = match stored {
        StoredBoard::Present(board) => (board, false),
        StoredBoard::Missing => (BoardConfig::from_template(template), true),
        StoredBoard::Unreadable(_) => {
            report.regenerated = true;
            (BoardConfig::from_template(template), true)
        }
    };

    report.columns_restored = restore_missing_columns(&mut board, template);

    let statuses: HashMap<TaskId, WorkflowStatus> =
        tasks.iter().map(|task| (task.id(), task.status())).collect();
    let mut placed = HashSet::with_capacity(tasks.len());
    let mut misplaced: Vec<(CardRef, WorkflowStatus)> = Vec::new();

    for column in &mut board.columns {
        if !column.is_contiguous() {
            report.reindexed_columns += 1;
        }
        let column_type = column.column_type;
        column.cards.retain(|card| {
            let Some(&status) = statuses.get(&card.task_id) else {
                report.orphans_dropped += 1;
                return false;
            };
            if !placed.insert(card.task_id) {
                report.duplicates_dropped += 1;
                return false;
            }
            if status != column_type {
                misplaced.push((*card, status));
                return false;
            }
            true
        });
    }

    for (card, status) in misplaced {
        if board.insert_card(status, card, u32::MAX).is_ok() {
            report.relocated += 1;
        }
    }

    let mut unplaced: Vec<&Task> = tasks
        .iter()
        .filter(|task| !placed.contains(&task.id()))
        .collect();
    unplaced.sort_by_key(|task| (task.order_key(), task.created_at(), task.id()));
    for task in unplaced {
        let card = CardRef::new(task.id(), SubStatus::default());
        if board.insert_card(task.status(), card, u32::MAX).is_ok() && !materialized {
            report.inserted += 1;
        }
    }

    for column in &mut board.columns {
        column.reindex();
    }

    Reconciliation {
        board,
        report,
        materialized,
    }
}

fn restore_missing_columns(board: &mut BoardConfig, template: &BoardTemplate) -> usize {
    let missing: Vec<Column> = template
        .columns()
        .iter()
        .filter(|entry| board.column(entry.column_type).is_none())
        .map(Column::from_template)
        .collect();
    let restored = missing.len();
    board.columns.extend(missing);
    restored
}
