use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::LoanApplication;
use crate::calendar::MonthKey;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::types::{ApplicationId, LoanStatus, LoanType};

/// one unpaid installment due in a payroll month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInstallment {
    pub application_id: ApplicationId,
    pub application_name: String,
    pub employee: String,
    pub loan_type: LoanType,
    pub month: MonthKey,
    pub repayment_date: NaiveDate,
    pub installment_amount: Money,
}

/// deduction line produced by a payroll run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionLine {
    pub application_name: String,
    pub employee: String,
    pub component: String,
    pub amount: Money,
    pub month: MonthKey,
}

/// salary component name for a loan type's deductions
pub fn deduction_component(loan_type: LoanType) -> String {
    format!("Loan Deduction - {loan_type}")
}

/// unpaid installments due in `month`, across all deductible applications
///
/// only Approved or Partially Repaid, unsubmitted documents participate
pub fn pending_installments(applications: &[LoanApplication], month: MonthKey) -> Vec<PendingInstallment> {
    let mut pending = Vec::new();
    for app in applications {
        if !app.status.is_deductible() || app.submitted {
            continue;
        }
        let loan_type = match app.loan_type {
            Some(t) => t,
            None => continue,
        };
        for entry in &app.repayment_schedule {
            if entry.is_paid {
                continue;
            }
            let repayment_date = match entry.repayment_date {
                Some(d) => d,
                None => continue,
            };
            if MonthKey::from_date(repayment_date) != month {
                continue;
            }
            pending.push(PendingInstallment {
                application_id: app.id,
                application_name: app.name.clone(),
                employee: app.employee.clone(),
                loan_type,
                month,
                repayment_date,
                installment_amount: entry.installment_amount,
            });
        }
    }
    pending
}

/// apply the payroll month's deductions across all applications
///
/// each due unpaid installment becomes one deduction line and is marked paid
/// with the payroll date and reference; repaid totals and statuses roll
/// forward, and a fully repaid document is submitted when `auto_submit` is
/// set. already-paid entries are skipped, so a rerun over the same month
/// produces no further lines
pub fn apply_deductions(
    applications: &mut [LoanApplication],
    payroll_date: NaiveDate,
    reference: &str,
    auto_submit: bool,
    events: &mut EventStore,
) -> Result<Vec<DeductionLine>> {
    let month = MonthKey::from_date(payroll_date);
    let mut lines = Vec::new();

    for app in applications.iter_mut() {
        if !app.status.is_deductible() || app.submitted {
            continue;
        }
        let loan_type = match app.loan_type {
            Some(t) => t,
            None => continue,
        };

        // schedule is sorted, so same-month duplicates are adjacent
        let mut due_months: Vec<MonthKey> = app
            .repayment_schedule
            .iter()
            .filter(|e| !e.is_paid)
            .filter_map(|e| e.repayment_date)
            .filter(|d| MonthKey::from_date(*d) == month)
            .map(MonthKey::from_date)
            .collect();
        due_months.dedup();

        for due in due_months {
            let outcome = app.record_repayment(due, payroll_date, reference)?;
            debug!(
                application = %app.name,
                %due,
                amount = %outcome.amount,
                "installment deducted"
            );

            lines.push(DeductionLine {
                application_name: app.name.clone(),
                employee: app.employee.clone(),
                component: deduction_component(loan_type),
                amount: outcome.amount,
                month: due,
            });
            events.emit(Event::RepaymentRecorded {
                application_id: app.id,
                loan_type,
                month: due,
                amount: outcome.amount,
                payment_date: payroll_date,
                reference: reference.to_string(),
            });
            if outcome.new_status != outcome.old_status {
                events.emit(Event::StatusChanged {
                    application_id: app.id,
                    old_status: outcome.old_status,
                    new_status: outcome.new_status,
                    reason: format!("payroll deduction {reference}"),
                });
            }
        }

        if auto_submit && app.status == LoanStatus::FullyRepaid && !app.submitted {
            app.submit()?;
            events.emit(Event::ApplicationSubmitted {
                application_id: app.id,
            });
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ScheduleEntry;
    use crate::calendar::available_months;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            chrono::Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap(),
        ))
    }

    fn approved_loan(name: &str, employee: &str) -> LoanApplication {
        let mut app = LoanApplication::new(name, employee, employee);
        app.switch_loan_type(Some(LoanType::Loan));
        app.posting_date = Some(date(2024, 1, 15));
        app.loan_amount = Money::from_major(1200);
        app.installments_count = 3;
        app.recalculate_amounts();
        let entries = available_months(date(2024, 2, 1), 3)
            .iter()
            .map(|o| ScheduleEntry::from_option(o, app.installment_amount))
            .collect();
        app.replace_schedule(entries);
        app.approve(&test_time()).unwrap();
        app
    }

    #[test]
    fn test_pending_installments_for_month() {
        let apps = vec![approved_loan("LOAN-0001", "EMP-001")];
        let pending = pending_installments(&apps, key("2024-02"));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].application_name, "LOAN-0001");
        assert_eq!(pending[0].installment_amount, Money::from_major(400));
        assert_eq!(pending[0].repayment_date, date(2024, 2, 29));

        // months with nothing due yield nothing
        assert!(pending_installments(&apps, key("2024-08")).is_empty());
    }

    #[test]
    fn test_draft_and_cancelled_loans_are_skipped() {
        let mut draft = approved_loan("LOAN-0002", "EMP-002");
        draft.status = LoanStatus::Draft;
        let mut cancelled = approved_loan("LOAN-0003", "EMP-003");
        cancelled.cancel(&test_time());

        let apps = vec![draft, cancelled];
        assert!(pending_installments(&apps, key("2024-02")).is_empty());
    }

    #[test]
    fn test_apply_deductions_marks_rows_paid() {
        let mut apps = vec![approved_loan("LOAN-0001", "EMP-001")];
        let mut events = EventStore::new();

        let lines =
            apply_deductions(&mut apps, date(2024, 2, 29), "SAL-2024-02", true, &mut events).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].component, "Loan Deduction - Loan");
        assert_eq!(lines[0].amount, Money::from_major(400));

        let app = &apps[0];
        assert_eq!(app.status, LoanStatus::PartiallyRepaid);
        assert_eq!(app.repaid_amount, Money::from_major(400));
        assert_eq!(app.remaining_balance, Money::from_major(800));
        assert!(app.repayment_schedule[0].is_paid);
        assert_eq!(app.repayment_schedule[0].payment_date, Some(date(2024, 2, 29)));
        assert_eq!(
            app.repayment_schedule[0].payroll_reference.as_deref(),
            Some("SAL-2024-02")
        );
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::RepaymentRecorded { .. })));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut apps = vec![approved_loan("LOAN-0001", "EMP-001")];
        let mut events = EventStore::new();

        apply_deductions(&mut apps, date(2024, 2, 29), "SAL-2024-02", true, &mut events).unwrap();
        let rerun =
            apply_deductions(&mut apps, date(2024, 2, 29), "SAL-2024-02-R", true, &mut events).unwrap();
        assert!(rerun.is_empty());
        assert_eq!(apps[0].repaid_amount, Money::from_major(400));
    }

    #[test]
    fn test_final_deduction_submits_the_document() {
        let mut apps = vec![approved_loan("LOAN-0001", "EMP-001")];
        let mut events = EventStore::new();

        apply_deductions(&mut apps, date(2024, 2, 29), "SAL-02", true, &mut events).unwrap();
        apply_deductions(&mut apps, date(2024, 3, 31), "SAL-03", true, &mut events).unwrap();
        let lines = apply_deductions(&mut apps, date(2024, 4, 30), "SAL-04", true, &mut events).unwrap();

        assert_eq!(lines.len(), 1);
        let app = &apps[0];
        assert_eq!(app.status, LoanStatus::FullyRepaid);
        assert_eq!(app.remaining_balance, Money::ZERO);
        assert!(app.submitted);
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::ApplicationSubmitted { .. })));
    }

    #[test]
    fn test_advance_component_name() {
        assert_eq!(
            deduction_component(LoanType::Advance),
            "Loan Deduction - Advance"
        );
    }
}
