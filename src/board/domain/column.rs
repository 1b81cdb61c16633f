//! Board columns and the card references they hold.

use super::{BoardDomainError, ColumnTemplate, SubStatus, TaskId, WorkflowStatus};
use serde::{Deserialize, Deserializer, Serialize};

/// Placement of one task inside one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRef {
    pub(super) task_id: TaskId,
    #[serde(default)]
    pub(super) sub_status: SubStatus,
    pub(super) order: u32,
}

impl CardRef {
    /// Creates a card reference. The order is assigned when the card is
    /// placed in a column.
    #[must_use]
    pub const fn new(task_id: TaskId, sub_status: SubStatus) -> Self {
        Self {
            task_id,
            sub_status,
            order: 0,
        }
    }

    /// Returns the referenced task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the presentation sub-status.
    #[must_use]
    pub const fn sub_status(&self) -> SubStatus {
        self.sub_status
    }

    /// Returns the zero-based position within the column.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }
}

/// A named bucket for one workflow status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub(super) name: String,
    #[serde(rename = "type")]
    pub(super) column_type: WorkflowStatus,
    #[serde(default = "visible_by_default")]
    pub(super) is_visible: bool,
    #[serde(default)]
    pub(super) color: Option<String>,
    #[serde(default)]
    pub(super) icon: Option<String>,
    #[serde(default)]
    pub(super) wip_limit: Option<u32>,
    #[serde(rename = "blockWipReached", default)]
    pub(super) block_on_wip_reached: bool,
    #[serde(default)]
    pub(super) cards: Vec<CardRef>,
}

const fn visible_by_default() -> bool {
    true
}

/// Outcome of asking whether one more card may enter a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipCheck {
    /// The column stays within its limit, or has none.
    Within,
    /// The column would exceed a limit that only warns.
    Exceeded {
        /// The configured limit.
        limit: u32,
    },
    /// The column would exceed a blocking limit.
    Blocked {
        /// The configured limit.
        limit: u32,
    },
}

impl Column {
    /// Creates an empty column from a template entry.
    #[must_use]
    pub fn from_template(template: &ColumnTemplate) -> Self {
        Self {
            name: template.name.clone(),
            column_type: template.column_type,
            is_visible: true,
            color: template.color.clone(),
            icon: template.icon.clone(),
            wip_limit: template.wip_limit,
            block_on_wip_reached: template.block_on_wip_reached,
            cards: Vec::new(),
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the workflow status this column holds.
    #[must_use]
    pub const fn column_type(&self) -> WorkflowStatus {
        self.column_type
    }

    /// Returns whether the column is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// Returns the display colour, if any.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Returns the display icon, if any.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Returns the WIP limit, if any.
    #[must_use]
    pub const fn wip_limit(&self) -> Option<u32> {
        self.wip_limit
    }

    /// Returns whether reaching the WIP limit blocks further entries.
    #[must_use]
    pub const fn block_on_wip_reached(&self) -> bool {
        self.block_on_wip_reached
    }

    /// Returns the cards in display order.
    #[must_use]
    pub fn cards(&self) -> &[CardRef] {
        &self.cards
    }

    /// Returns the number of cards.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns `true` when the column holds no cards.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns `true` when the column holds a card for `task_id`.
    #[must_use]
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.cards.iter().any(|card| card.task_id == task_id)
    }

    /// Checks whether one more card may enter the column.
    #[must_use]
    pub fn check_entry(&self) -> WipCheck {
        let Some(limit) = self.wip_limit else {
            return WipCheck::Within;
        };
        let after_entry = self.cards.len().saturating_add(1);
        let fits = usize::try_from(limit).is_ok_and(|max| after_entry <= max);
        match (fits, self.block_on_wip_reached) {
            (true, _) => WipCheck::Within,
            (false, true) => WipCheck::Blocked { limit },
            (false, false) => WipCheck::Exceeded { limit },
        }
    }

    /// Returns `true` when the orders read `0..len` in sequence.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.cards
            .iter()
            .enumerate()
            .all(|(index, card)| u32::try_from(index).is_ok_and(|expected| card.order == expected))
    }

    /// Applies a settings update.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyColumnName`] when the new name is
    /// blank; the column is left unchanged in that case.
    pub fn apply_settings(&mut self, update: &ColumnSettingsUpdate) -> Result<(), BoardDomainError> {
        if let Some(name) = &update.name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(BoardDomainError::EmptyColumnName);
            }
            trimmed.clone_into(&mut self.name);
        }
        if let Some(wip_limit) = update.wip_limit {
            self.wip_limit = wip_limit;
        }
        if let Some(block) = update.block_on_wip_reached {
            self.block_on_wip_reached = block;
        }
        if let Some(visible) = update.is_visible {
            self.is_visible = visible;
        }
        if let Some(color) = &update.color {
            self.color.clone_from(color);
        }
        if let Some(icon) = &update.icon {
            self.icon.clone_from(icon);
        }
        Ok(())
    }

    /// Rewrites orders to `0..len` and reports whether anything changed.
    pub(super) fn reindex(&mut self) -> bool {
        let mut changed = false;
        for (index, card) in self.cards.iter_mut().enumerate() {
            let order = u32::try_from(index).unwrap_or(u32::MAX);
            if card.order != order {
                card.order = order;
                changed = true;
            }
        }
        changed
    }
}

/// Partial update of a column's presentation and WIP settings.
///
/// `None` leaves a field untouched. The nested options on `wip_limit`,
/// `color`, and `icon` allow clearing a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnSettingsUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New WIP limit; `Some(None)` removes the limit.
    #[serde(deserialize_with = "present_or_null")]
    pub wip_limit: Option<Option<u32>>,
    /// New blocking flag.
    #[serde(rename = "blockWipReached")]
    pub block_on_wip_reached: Option<bool>,
    /// New visibility.
    pub is_visible: Option<bool>,
    /// New colour; `Some(None)` clears it.
    #[serde(deserialize_with = "present_or_null")]
    pub color: Option<Option<String>>,
    /// New icon; `Some(None)` clears it.
    #[serde(deserialize_with = "present_or_null")]
    pub icon: Option<Option<String>>,
}

/// Distinguishes an explicit `null` (clear) from an absent field (keep).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ColumnSettingsUpdate {
    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets or clears the WIP limit and whether it blocks.
    #[must_use]
    pub const fn with_wip_limit(mut self, limit: Option<u32>, blocking: bool) -> Self {
        self.wip_limit = Some(limit);
        self.block_on_wip_reached = Some(blocking);
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub const fn with_visibility(mut self, visible: bool) -> Self {
        self.is_visible = Some(visible);
        self
    }

    /// Sets or clears the colour.
    #[must_use]
    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets or clears the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }
}
