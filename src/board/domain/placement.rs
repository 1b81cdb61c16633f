//! Card placement: the move and reorder algorithm over a board.
//!
//! A move removes the card from wherever it sits, then performs a stable
//! insert at the clamped target position of the destination column. Both
//! touched columns are resequenced to `0..len` before returning.

use super::{BoardConfig, CardLocation, CardRef, SubStatus, TaskId, WipCheck, WorkflowStatus};
use thiserror::Error;

/// Result of placing one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The placed task.
    pub task_id: TaskId,
    /// Column the card left, if it was on the board.
    pub from: Option<WorkflowStatus>,
    /// Column the card now sits in.
    pub to: WorkflowStatus,
    /// Final zero-based position in the destination.
    pub order: u32,
    /// WIP evaluation of the destination at entry time.
    pub wip: WipCheck,
}

impl Placement {
    /// Returns `true` when the card stayed in the same column.
    #[must_use]
    pub fn is_reorder(&self) -> bool {
        self.from == Some(self.to)
    }

    /// Returns `true` when a non-blocking WIP limit was exceeded.
    #[must_use]
    pub const fn exceeded_soft_limit(&self) -> bool {
        matches!(self.wip, WipCheck::Exceeded { .. })
    }
}

/// Reasons a placement is refused. The board is unchanged in every case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementError {
    /// The board has no column of the requested type.
    #[error("board has no '{0}' column")]
    ColumnNotFound(WorkflowStatus),

    /// The destination enforces a WIP limit it has already reached.
    #[error("column '{column}' has reached its WIP limit of {limit} ({current} cards)")]
    WipLimitExceeded {
        /// Destination column.
        column: WorkflowStatus,
        /// Configured limit.
        limit: u32,
        /// Cards currently in the destination.
        current: usize,
    },
}

impl BoardConfig {
    /// Moves or reorders the card for `task_id` into `to` at `target_order`.
    ///
    /// The target is clamped to the destination length after removal. A card
    /// not yet on the board is inserted. When `sub_status` is `None` the
    /// card keeps its previous sub-status.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::ColumnNotFound`] when `to` has no column and
    /// [`PlacementError::WipLimitExceeded`] when a blocking limit would be
    /// exceeded. A same-column reorder never trips the WIP check.
    pub fn place_card(
        &mut self,
        task_id: TaskId,
        to: WorkflowStatus,
        target_order: u32,
        sub_status: Option<SubStatus>,
    ) -> Result<Placement, PlacementError> {
        let origin = self.locate(task_id);
        let destination = self.column(to).ok_or(PlacementError::ColumnNotFound(to))?;
        let entering = origin.is_none_or(|location| location.column != to);
        let wip = if entering {
            destination.check_entry()
        } else {
            WipCheck::Within
        };
        if let WipCheck::Blocked { limit } = wip {
            return Err(PlacementError::WipLimitExceeded {
                column: to,
                limit,
                current: destination.len(),
            });
        }

        let previous = origin.and_then(|location| self.take_card(location));
        let resolved_sub_status = sub_status
            .or_else(|| previous.map(|card| card.sub_status))
            .unwrap_or_default();
        let order = self.insert_card(to, CardRef::new(task_id, resolved_sub_status), target_order)?;
        Ok(Placement {
            task_id,
            from: origin.map(|location| location.column),
            to,
            order,
            wip,
        })
    }

    /// Appends a new card to `to`, honouring a blocking WIP limit.
    ///
    /// # Errors
    ///
    /// Same as [`Self::place_card`].
    pub fn admit_card(
        &mut self,
        task_id: TaskId,
        to: WorkflowStatus,
        sub_status: SubStatus,
    ) -> Result<Placement, PlacementError> {
        self.place_card(task_id, to, u32::MAX, Some(sub_status))
    }

    /// Moves the card for `task_id` to the end of `to` without a WIP check,
    /// keeping its sub-status. A card not yet on the board is appended.
    /// Returns the card's final position.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::ColumnNotFound`] when `to` has no column.
    pub fn relocate_card(
        &mut self,
        task_id: TaskId,
        to: WorkflowStatus,
    ) -> Result<u32, PlacementError> {
        if self.column(to).is_none() {
            return Err(PlacementError::ColumnNotFound(to));
        }
        let card = self
            .remove_card(task_id)
            .unwrap_or_else(|| CardRef::new(task_id, SubStatus::default()));
        self.insert_card(to, card, u32::MAX)
    }

    /// Removes the card for `task_id` and resequences its column.
    pub fn remove_card(&mut self, task_id: TaskId) -> Option<CardRef> {
        let location = self.locate(task_id)?;
        self.take_card(location)
    }

    pub(super) fn take_card(&mut self, location: CardLocation) -> Option<CardRef> {
        let column = self.column_mut(location.column)?;
        if location.position >= column.cards.len() {
            return None;
        }
        let card = column.cards.remove(location.position);
        column.reindex();
        Some(card)
    }

    pub(super) fn insert_card(
        &mut self,
        to: WorkflowStatus,
        card: CardRef,
        target_order: u32,
    ) -> Result<u32, PlacementError> {
        let column = self
            .column_mut(to)
            .ok_or(PlacementError::ColumnNotFound(to))?;
        let position = usize::try_from(target_order)
            .unwrap_or(usize::MAX)
            .min(column.cards.len());
        column.cards.insert(position, card);
        column.reindex();
        Ok(u32::try_from(position).unwrap_or(u32::MAX))
    }
}
