use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::MonthKey;
use crate::decimal::Money;
use crate::types::{LoanStatus, SessionId};

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("you can only select {limit} months")]
    SelectionLimitExceeded {
        limit: u32,
    },

    #[error("repayment date {date} must be after posting date {posting_date}")]
    InvalidRepaymentDate {
        date: NaiveDate,
        posting_date: NaiveDate,
    },

    #[error("number of selected repayment months ({selected}) must match installments count ({required})")]
    InstallmentCountMismatch {
        selected: usize,
        required: u32,
    },

    #[error("schedule row {row} has no repayment date")]
    MissingRepaymentDate {
        row: usize,
    },

    #[error("schedule row {row} does not exist")]
    ScheduleRowNotFound {
        row: usize,
    },

    #[error("paid amount {paid} cannot be greater than installment amount {installment}")]
    PaidExceedsInstallment {
        paid: Money,
        installment: Money,
    },

    #[error("posting date is required")]
    MissingPostingDate,

    #[error("loan type is required")]
    MissingLoanType,

    #[error("invalid month key: {value}")]
    InvalidMonthKey {
        value: String,
    },

    #[error("month {month} is not offered by the current catalog")]
    UnknownMonth {
        month: MonthKey,
    },

    #[error("no month picker is active for this form")]
    PickerNotActive,

    #[error("month catalog unavailable: {message}")]
    CatalogUnavailable {
        message: String,
    },

    #[error("loan application is already processed: current status is {status:?}")]
    AlreadyProcessed {
        status: LoanStatus,
    },

    #[error("cannot submit loan application until all repayments are completed: remaining balance is {remaining}")]
    OutstandingBalance {
        remaining: Money,
    },

    #[error("invalid status: current {current:?}, expected {expected:?}")]
    InvalidStatus {
        current: LoanStatus,
        expected: LoanStatus,
    },

    #[error("installment {month} is already paid")]
    InstallmentAlreadyPaid {
        month: MonthKey,
    },

    #[error("session not found: {id}")]
    SessionNotFound {
        id: SessionId,
    },
}

pub type Result<T> = std::result::Result<T, ApplicationError>;
