use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::ScheduleEntry;
use crate::calendar::{MonthKey, MonthOption};
use crate::decimal::Money;
use crate::errors::{ApplicationError, Result};

/// outcome of toggling one month checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// month added to the selection
    Selected,
    /// month removed from the selection
    Cleared,
    /// selection cap reached; the toggle was reverted
    Rejected,
}

/// selection counter shown next to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCounter {
    pub selected: usize,
    pub required: u32,
}

impl SelectionCounter {
    /// complete only at exact equality; "3 of 5" and "4 of 5" are both incomplete
    pub fn is_complete(&self) -> bool {
        self.selected == self.required as usize
    }
}

/// multi-select month grid for Loan-type applications
///
/// enforces `selected <= required` as a hard cap: the over-limit toggle is
/// the one reverted and never reaches the selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionGrid {
    options: Vec<MonthOption>,
    selected: Vec<MonthKey>,
    required: u32,
}

impl SelectionGrid {
    pub fn new(options: Vec<MonthOption>, required: u32) -> Self {
        Self {
            options,
            selected: Vec::new(),
            required,
        }
    }

    pub fn options(&self) -> &[MonthOption] {
        &self.options
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn is_selected(&self, month: MonthKey) -> bool {
        self.selected.contains(&month)
    }

    pub fn counter(&self) -> SelectionCounter {
        SelectionCounter {
            selected: self.selected.len(),
            required: self.required,
        }
    }

    /// reconstruct the selection from persisted schedule entries
    ///
    /// entries are matched to options by their repayment month; rows without
    /// a date, or dated outside the catalog, stay unchecked
    pub fn preselect(&mut self, schedule: &[ScheduleEntry]) {
        self.selected.clear();
        for entry in schedule {
            if let Some(month) = entry.month() {
                if self.options.iter().any(|o| o.value == month) && !self.selected.contains(&month) {
                    self.selected.push(month);
                }
            }
        }
    }

    /// toggle one month, enforcing the selection cap
    pub fn toggle(&mut self, month: MonthKey) -> Result<ToggleOutcome> {
        if !self.options.iter().any(|o| o.value == month) {
            return Err(ApplicationError::UnknownMonth { month });
        }

        if let Some(pos) = self.selected.iter().position(|m| *m == month) {
            self.selected.remove(pos);
            return Ok(ToggleOutcome::Cleared);
        }

        if self.selected.len() >= self.required as usize {
            warn!(%month, limit = self.required, "selection cap reached, reverting toggle");
            return Ok(ToggleOutcome::Rejected);
        }

        self.selected.push(month);
        Ok(ToggleOutcome::Selected)
    }

    /// currently selected options in chronological order, independent of toggle order
    pub fn selected_options(&self) -> Vec<&MonthOption> {
        let mut picked: Vec<&MonthOption> = self
            .options
            .iter()
            .filter(|o| self.selected.contains(&o.value))
            .collect();
        picked.sort_by_key(|o| o.last_day);
        picked
    }
}

/// rebuild the repayment schedule from the current selection
///
/// one entry per selected month, chronological, each carrying the current
/// per-installment amount; replaces the previous table wholesale
pub fn reconcile_schedule(grid: &SelectionGrid, installment_amount: Money) -> Vec<ScheduleEntry> {
    grid.selected_options()
        .into_iter()
        .map(|option| ScheduleEntry::from_option(option, installment_amount))
        .collect()
}
