use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthKey;
use crate::decimal::Money;
use crate::types::{ApplicationId, LoanStatus, LoanType, PickerMode, SessionId};

/// all events emitted while working a loan application form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    SessionOpened {
        session_id: SessionId,
        application_id: ApplicationId,
    },
    StatusChanged {
        application_id: ApplicationId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
    },
    LoanApproved {
        application_id: ApplicationId,
        message: String,
    },
    ApplicationSubmitted {
        application_id: ApplicationId,
    },
    ApplicationCancelled {
        application_id: ApplicationId,
    },

    // catalog and picker events
    CatalogRequested {
        application_id: ApplicationId,
        request_id: u64,
        posting_date: NaiveDate,
        months_ahead: u32,
    },
    CatalogFailed {
        application_id: ApplicationId,
        request_id: u64,
        message: String,
    },
    PickerRendered {
        application_id: ApplicationId,
        mode: PickerMode,
        option_count: usize,
    },
    PickerEmptied {
        application_id: ApplicationId,
        request_id: u64,
    },

    // selection events
    SelectionChanged {
        application_id: ApplicationId,
        selected_count: usize,
        required_count: u32,
    },
    SelectionRejected {
        application_id: ApplicationId,
        month: MonthKey,
        limit: u32,
    },
    ScheduleRebuilt {
        application_id: ApplicationId,
        entry_count: usize,
    },
    RepaymentDateRejected {
        application_id: ApplicationId,
        row: usize,
        date: NaiveDate,
        posting_date: NaiveDate,
    },

    // repayment events
    RepaymentRecorded {
        application_id: ApplicationId,
        loan_type: LoanType,
        month: MonthKey,
        amount: Money,
        payment_date: NaiveDate,
        reference: String,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
