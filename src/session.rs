use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::{LoanApplication, ScheduleEntry};
use crate::calendar::{CatalogProvider, MonthKey, MonthOption};
use crate::config::ScheduleConfig;
use crate::decimal::Money;
use crate::errors::{ApplicationError, Result};
use crate::events::{Event, EventStore};
use crate::selection::{reconcile_schedule, SelectionCounter, SelectionGrid, ToggleOutcome};
use crate::types::{LoanType, PickerMode, SessionId};

/// month picker rendered below the repayment schedule
#[derive(Debug, Clone, PartialEq)]
pub enum PickerState {
    /// prerequisites missing or no loan type chosen; nothing rendered
    Hidden,
    /// single-select month field (Advance)
    SingleSelect { options: Vec<MonthOption> },
    /// multi-select month grid (Loan)
    Grid(SelectionGrid),
    /// catalog answered with no months
    Empty,
}

impl PickerState {
    pub fn is_hidden(&self) -> bool {
        matches!(self, PickerState::Hidden)
    }
}

/// outstanding catalog fetch; completed by the host when the response arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogRequest {
    pub id: u64,
    pub posting_date: NaiveDate,
    pub months_ahead: u32,
}

/// outcome of a direct edit of a schedule row's date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateEditOutcome {
    /// date accepted and stored
    Applied,
    /// date on or before the posting date; field reverted to empty
    Reverted,
}

/// per-form-instance schedule builder state
///
/// field-change entry points mirror the form triggers; all state lives here,
/// so detached handlers go through the registry instead of a global slot
pub struct FormSession {
    pub id: SessionId,
    pub config: ScheduleConfig,
    pub document: LoanApplication,
    pub events: EventStore,
    picker: PickerState,
    next_request_id: u64,
}

impl FormSession {
    pub fn new(document: LoanApplication, config: ScheduleConfig) -> Self {
        let id = Uuid::new_v4();
        let mut events = EventStore::new();
        events.emit(Event::SessionOpened {
            session_id: id,
            application_id: document.id,
        });
        Self {
            id,
            config,
            document,
            events,
            picker: PickerState::Hidden,
            next_request_id: 0,
        }
    }

    pub fn picker(&self) -> &PickerState {
        &self.picker
    }

    /// selection counter, present only while the grid is rendered
    pub fn selection_counter(&self) -> Option<SelectionCounter> {
        match &self.picker {
            PickerState::Grid(grid) => Some(grid.counter()),
            _ => None,
        }
    }

    /// change the loan type; clears cross-type fields, the schedule, and the picker
    pub fn set_loan_type(&mut self, loan_type: Option<LoanType>) -> Option<CatalogRequest> {
        self.document.switch_loan_type(loan_type);
        self.picker = PickerState::Hidden;
        self.request_catalog()
    }

    /// change the posting date; the active picker is recomputed relative to it
    pub fn set_posting_date(&mut self, posting_date: NaiveDate) -> Option<CatalogRequest> {
        self.document.posting_date = Some(posting_date);
        self.request_catalog()
    }

    pub fn set_loan_amount(&mut self, amount: Money) {
        self.document.loan_amount = amount;
        self.document.recalculate_amounts();
    }

    pub fn set_advance_amount(&mut self, amount: Money) {
        self.document.advance_amount = amount;
        self.document.recalculate_amounts();
    }

    pub fn set_repaid_amount(&mut self, amount: Money) {
        self.document.repaid_amount = amount;
        self.document.recalculate_amounts();
    }

    /// change the installment count; re-renders the grid with the new cap
    pub fn set_installments_count(&mut self, count: u32) -> Option<CatalogRequest> {
        self.document.installments_count = count;
        self.document.recalculate_amounts();
        self.request_catalog()
    }

    /// pick the single repayment month for an Advance
    pub fn set_advance_repayment_month(&mut self, month: Option<MonthKey>) -> Result<()> {
        if self.document.loan_type != Some(LoanType::Advance) {
            return Err(ApplicationError::PickerNotActive);
        }

        let month = match month {
            Some(m) => m,
            None => {
                self.document.advance_repayment_month = None;
                self.document.repayment_schedule.clear();
                return Ok(());
            }
        };

        let option = match &self.picker {
            PickerState::SingleSelect { options } => options
                .iter()
                .find(|o| o.value == month)
                .cloned()
                .ok_or(ApplicationError::UnknownMonth { month })?,
            _ => return Err(ApplicationError::PickerNotActive),
        };

        self.document.advance_repayment_month = Some(month);
        let entry = ScheduleEntry::from_option(&option, self.document.advance_amount);
        self.document.replace_schedule(vec![entry]);
        self.events.emit(Event::ScheduleRebuilt {
            application_id: self.document.id,
            entry_count: 1,
        });
        debug!(application = %self.document.name, %month, "advance repayment month set");
        Ok(())
    }

    /// toggle one month in the grid and reconcile the schedule
    pub fn toggle_month(&mut self, month: MonthKey) -> Result<ToggleOutcome> {
        let installment_amount = self.document.installment_amount;
        let application_id = self.document.id;

        let grid = match &mut self.picker {
            PickerState::Grid(grid) => grid,
            _ => return Err(ApplicationError::PickerNotActive),
        };

        let outcome = grid.toggle(month)?;
        if outcome == ToggleOutcome::Rejected {
            self.events.emit(Event::SelectionRejected {
                application_id,
                month,
                limit: grid.required(),
            });
            return Ok(outcome);
        }

        let entries = reconcile_schedule(grid, installment_amount);
        let counter = grid.counter();
        self.document.replace_schedule(entries);
        self.events.emit(Event::ScheduleRebuilt {
            application_id,
            entry_count: self.document.repayment_schedule.len(),
        });
        self.events.emit(Event::SelectionChanged {
            application_id,
            selected_count: counter.selected,
            required_count: counter.required,
        });
        debug!(
            application = %self.document.name,
            selected = counter.selected,
            required = counter.required,
            "schedule reconciled"
        );
        Ok(outcome)
    }

    /// directly edit a schedule row's repayment date
    ///
    /// dates on or before the posting date revert the field to empty
    pub fn edit_repayment_date(&mut self, row: usize, date: NaiveDate) -> Result<DateEditOutcome> {
        let application_id = self.document.id;
        let posting_date = self.document.posting_date;
        let name = self.document.name.clone();
        let entry = self
            .document
            .repayment_schedule
            .get_mut(row)
            .ok_or(ApplicationError::ScheduleRowNotFound { row })?;

        if let Some(posting_date) = posting_date {
            if date <= posting_date {
                entry.repayment_date = None;
                warn!(application = %name, row, %date, "repayment date rejected");
                self.events.emit(Event::RepaymentDateRejected {
                    application_id,
                    row,
                    date,
                    posting_date,
                });
                return Ok(DateEditOutcome::Reverted);
            }
        }

        entry.repayment_date = Some(date);
        entry.repayment_month_year = MonthKey::from_date(date).label();
        Ok(DateEditOutcome::Applied)
    }

    /// issue a catalog fetch if the picker prerequisites are met
    ///
    /// missing posting date, or a Loan without an installment count, skips the
    /// render silently; the caller re-triggers once prerequisites are set
    pub fn request_catalog(&mut self) -> Option<CatalogRequest> {
        let posting_date = self.document.posting_date?;
        match self.document.loan_type {
            Some(LoanType::Advance) => {}
            Some(LoanType::Loan) if self.document.installments_count > 0 => {}
            _ => return None,
        }

        let id = self.next_request_id;
        self.next_request_id += 1;
        let request = CatalogRequest {
            id,
            posting_date,
            months_ahead: self.config.months_ahead,
        };
        self.events.emit(Event::CatalogRequested {
            application_id: self.document.id,
            request_id: id,
            posting_date,
            months_ahead: self.config.months_ahead,
        });
        Some(request)
    }

    /// apply a catalog response
    ///
    /// in-flight fetches are never cancelled: completions apply in arrival
    /// order, so the last writer wins. a failure leaves the prior picker
    /// untouched; an empty catalog renders the explicit empty state
    pub fn complete_catalog(&mut self, request: &CatalogRequest, response: Result<Vec<MonthOption>>) {
        let application_id = self.document.id;
        let options = match response {
            Ok(options) => options,
            Err(err) => {
                warn!(application = %self.document.name, request = request.id, %err, "catalog fetch failed");
                self.events.emit(Event::CatalogFailed {
                    application_id,
                    request_id: request.id,
                    message: err.to_string(),
                });
                return;
            }
        };

        if options.is_empty() {
            self.picker = PickerState::Empty;
            self.events.emit(Event::PickerEmptied {
                application_id,
                request_id: request.id,
            });
            return;
        }

        match self.document.loan_type {
            Some(LoanType::Advance) => {
                let option_count = options.len();
                self.picker = PickerState::SingleSelect { options };
                self.events.emit(Event::PickerRendered {
                    application_id,
                    mode: PickerMode::SingleSelect,
                    option_count,
                });
            }
            Some(LoanType::Loan) => {
                let option_count = options.len();
                let mut grid = SelectionGrid::new(options, self.document.installments_count);
                grid.preselect(&self.document.repayment_schedule);
                let counter = grid.counter();
                self.picker = PickerState::Grid(grid);
                self.events.emit(Event::PickerRendered {
                    application_id,
                    mode: PickerMode::Grid,
                    option_count,
                });
                self.events.emit(Event::SelectionChanged {
                    application_id,
                    selected_count: counter.selected,
                    required_count: counter.required,
                });
            }
            None => {
                self.picker = PickerState::Hidden;
            }
        }
    }

    /// request and complete a catalog fetch in one step
    pub fn refresh_with(&mut self, provider: &impl CatalogProvider) {
        if let Some(request) = self.request_catalog() {
            let response = provider.available_months(request.posting_date, request.months_ahead);
            self.complete_catalog(&request, response);
        }
    }
}

/// open form sessions keyed by session id
///
/// replaces a process-wide current-form slot: detached handlers resolve the
/// active session here, and teardown clears it so no handler can reach a
/// stale instance
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, FormSession>,
    active: Option<SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// open a session for a document and make it the active one
    pub fn open(&mut self, document: LoanApplication, config: ScheduleConfig) -> SessionId {
        let session = FormSession::new(document, config);
        let id = session.id;
        self.sessions.insert(id, session);
        self.active = Some(id);
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&FormSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut FormSession> {
        self.sessions.get_mut(&id)
    }

    pub fn active(&self) -> Option<&FormSession> {
        self.active.and_then(|id| self.sessions.get(&id))
    }

    pub fn active_mut(&mut self) -> Option<&mut FormSession> {
        self.active.and_then(move |id| self.sessions.get_mut(&id))
    }

    pub fn activate(&mut self, id: SessionId) -> Result<()> {
        if !self.sessions.contains_key(&id) {
            return Err(ApplicationError::SessionNotFound { id });
        }
        self.active = Some(id);
        Ok(())
    }

    /// tear a session down, returning its document
    pub fn close(&mut self, id: SessionId) -> Result<LoanApplication> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(ApplicationError::SessionNotFound { id })?;
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(session.document)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
