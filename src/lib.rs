pub mod application;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod payroll;
pub mod report;
pub mod selection;
pub mod serialization;
pub mod session;
pub mod types;

// re-export key types
pub use application::{ApproveResponse, LoanApplication, RepaymentOutcome, ScheduleEntry};
pub use calendar::{available_months, CatalogProvider, LocalCatalog, MonthKey, MonthOption};
pub use config::ScheduleConfig;
pub use decimal::Money;
pub use errors::{ApplicationError, Result};
pub use events::{Event, EventStore};
pub use payroll::{
    apply_deductions, deduction_component, pending_installments, DeductionLine, PendingInstallment,
};
pub use report::{
    loan_summary, loan_summary_columns, loan_summary_filters, FilterSpec, FilterType,
    LoanSummaryFilter, LoanSummaryRow, ReportColumn,
};
pub use selection::{reconcile_schedule, SelectionCounter, SelectionGrid, ToggleOutcome};
pub use session::{
    CatalogRequest, DateEditOutcome, FormSession, PickerState, SessionRegistry,
};
pub use types::{ApplicationId, LoanStatus, LoanType, PickerMode, SessionId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
