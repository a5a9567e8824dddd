use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{MonthKey, MonthOption};
use crate::decimal::Money;
use crate::errors::{ApplicationError, Result};
use crate::types::{ApplicationId, LoanStatus, LoanType};

/// one scheduled repayment, owned exclusively by its loan application
///
/// the whole table is replaced on every reconciliation; the date is optional
/// because a rejected direct edit reverts the field to empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub repayment_month_year: String,
    pub repayment_date: Option<NaiveDate>,
    pub installment_amount: Money,
    pub paid_amount: Money,
    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,
    pub payroll_reference: Option<String>,
}

impl ScheduleEntry {
    /// build an unpaid entry from a catalog option
    pub fn from_option(option: &MonthOption, installment_amount: Money) -> Self {
        Self {
            repayment_month_year: option.label.clone(),
            repayment_date: Some(option.last_day),
            installment_amount,
            paid_amount: Money::ZERO,
            is_paid: false,
            payment_date: None,
            payroll_reference: None,
        }
    }

    /// month this entry falls due in, if the date is set
    pub fn month(&self) -> Option<MonthKey> {
        self.repayment_date.map(MonthKey::from_date)
    }
}

/// response returned by the approve action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproveResponse {
    pub message: String,
}

/// result of recording one installment repayment
#[derive(Debug, Clone, PartialEq)]
pub struct RepaymentOutcome {
    pub amount: Money,
    pub old_status: LoanStatus,
    pub new_status: LoanStatus,
}

/// loan application document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub name: String,
    pub employee: String,
    pub employee_name: String,
    pub department: Option<String>,
    pub loan_type: Option<LoanType>,
    pub posting_date: Option<NaiveDate>,
    pub loan_amount: Money,
    pub advance_amount: Money,
    pub installments_count: u32,
    pub installment_amount: Money,
    pub total_amount: Money,
    pub repaid_amount: Money,
    pub remaining_balance: Money,
    pub advance_repayment_month: Option<MonthKey>,
    pub repayment_schedule: Vec<ScheduleEntry>,
    pub status: LoanStatus,
    pub submitted: bool,
    pub status_changed_on: Option<NaiveDate>,
}

impl LoanApplication {
    /// create a draft application
    pub fn new(name: impl Into<String>, employee: impl Into<String>, employee_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            employee: employee.into(),
            employee_name: employee_name.into(),
            department: None,
            loan_type: None,
            posting_date: None,
            loan_amount: Money::ZERO,
            advance_amount: Money::ZERO,
            installments_count: 0,
            installment_amount: Money::ZERO,
            total_amount: Money::ZERO,
            repaid_amount: Money::ZERO,
            remaining_balance: Money::ZERO,
            advance_repayment_month: None,
            repayment_schedule: Vec::new(),
            status: LoanStatus::Draft,
            submitted: false,
            status_changed_on: None,
        }
    }

    /// document title for identification
    pub fn title(&self) -> Option<String> {
        self.loan_type.map(|t| format!("{} - {}", self.employee_name, t))
    }

    /// switch the loan type, clearing the other variant's fields and the schedule
    ///
    /// no stale cross-type data survives the switch
    pub fn switch_loan_type(&mut self, loan_type: Option<LoanType>) {
        self.loan_type = loan_type;
        match loan_type {
            Some(LoanType::Advance) => {
                self.loan_amount = Money::ZERO;
                self.installments_count = 0;
                self.installment_amount = Money::ZERO;
            }
            Some(LoanType::Loan) => {
                self.advance_amount = Money::ZERO;
                self.advance_repayment_month = None;
            }
            None => {
                self.loan_amount = Money::ZERO;
                self.advance_amount = Money::ZERO;
                self.installments_count = 0;
                self.installment_amount = Money::ZERO;
                self.advance_repayment_month = None;
            }
        }
        self.repayment_schedule.clear();
        self.recalculate_amounts();
    }

    /// recompute derived amounts and propagate the installment value to the schedule
    pub fn recalculate_amounts(&mut self) {
        match self.loan_type {
            Some(LoanType::Loan) => {
                self.total_amount = self.loan_amount;
                if self.installments_count > 0 && !self.loan_amount.is_zero() {
                    self.installment_amount = self.loan_amount.per_installment(self.installments_count);
                    for row in &mut self.repayment_schedule {
                        row.installment_amount = self.installment_amount;
                    }
                }
            }
            Some(LoanType::Advance) => {
                self.total_amount = self.advance_amount;
                for row in &mut self.repayment_schedule {
                    row.installment_amount = self.advance_amount;
                }
            }
            None => {
                self.total_amount = Money::ZERO;
            }
        }
        self.remaining_balance = self.total_amount - self.repaid_amount;
    }

    /// replace the repayment schedule wholesale, sorted ascending by date
    pub fn replace_schedule(&mut self, mut entries: Vec<ScheduleEntry>) {
        entries.sort_by_key(|e| (e.repayment_date.is_none(), e.repayment_date));
        self.repayment_schedule = entries;
    }

    /// validate the document before persisting
    pub fn validate(&self) -> Result<()> {
        self.validate_dates()?;
        self.validate_installment_count()?;
        self.validate_paid_amounts()?;
        Ok(())
    }

    fn validate_dates(&self) -> Result<()> {
        let posting_date = match self.posting_date {
            Some(d) => d,
            None => return Err(ApplicationError::MissingPostingDate),
        };

        if self.loan_type == Some(LoanType::Advance) {
            if let Some(month) = self.advance_repayment_month {
                if month.last_day() <= posting_date {
                    return Err(ApplicationError::InvalidRepaymentDate {
                        date: month.last_day(),
                        posting_date,
                    });
                }
            }
        }

        for (row, entry) in self.repayment_schedule.iter().enumerate() {
            let date = entry
                .repayment_date
                .ok_or(ApplicationError::MissingRepaymentDate { row })?;
            if date <= posting_date {
                return Err(ApplicationError::InvalidRepaymentDate { date, posting_date });
            }
        }
        Ok(())
    }

    fn validate_installment_count(&self) -> Result<()> {
        if self.loan_type == Some(LoanType::Loan) && self.installments_count > 0 {
            let selected = self.repayment_schedule.len();
            if selected != self.installments_count as usize {
                return Err(ApplicationError::InstallmentCountMismatch {
                    selected,
                    required: self.installments_count,
                });
            }
        }
        Ok(())
    }

    fn validate_paid_amounts(&self) -> Result<()> {
        for entry in &self.repayment_schedule {
            if entry.paid_amount > entry.installment_amount {
                return Err(ApplicationError::PaidExceedsInstallment {
                    paid: entry.paid_amount,
                    installment: entry.installment_amount,
                });
            }
        }
        Ok(())
    }

    /// approve a draft application
    pub fn approve(&mut self, time: &SafeTimeProvider) -> Result<ApproveResponse> {
        if self.submitted || self.status != LoanStatus::Draft {
            return Err(ApplicationError::AlreadyProcessed {
                status: self.status,
            });
        }
        self.update_status(LoanStatus::Approved, time.now().date_naive());
        Ok(ApproveResponse {
            message: format!("Loan application {} approved successfully", self.name),
        })
    }

    /// cancel the application, resetting any unpaid schedule rows
    pub fn cancel(&mut self, time: &SafeTimeProvider) {
        for entry in &mut self.repayment_schedule {
            if !entry.is_paid {
                entry.paid_amount = Money::ZERO;
                entry.payment_date = None;
                entry.payroll_reference = None;
            }
        }
        self.update_status(LoanStatus::Cancelled, time.now().date_naive());
    }

    /// submit the document; only allowed once fully repaid
    pub fn submit(&mut self) -> Result<()> {
        if self.remaining_balance.is_positive() {
            return Err(ApplicationError::OutstandingBalance {
                remaining: self.remaining_balance,
            });
        }
        if self.status != LoanStatus::FullyRepaid {
            return Err(ApplicationError::InvalidStatus {
                current: self.status,
                expected: LoanStatus::FullyRepaid,
            });
        }
        self.submitted = true;
        Ok(())
    }

    /// record one installment repayment against the schedule row due in `month`
    pub fn record_repayment(
        &mut self,
        month: MonthKey,
        payment_date: NaiveDate,
        reference: &str,
    ) -> Result<RepaymentOutcome> {
        let row = self
            .repayment_schedule
            .iter()
            .position(|e| e.month() == Some(month) && !e.is_paid);
        let row = match row {
            Some(row) => row,
            None => {
                let already_paid = self
                    .repayment_schedule
                    .iter()
                    .any(|e| e.month() == Some(month));
                return Err(if already_paid {
                    ApplicationError::InstallmentAlreadyPaid { month }
                } else {
                    ApplicationError::UnknownMonth { month }
                });
            }
        };

        let entry = &mut self.repayment_schedule[row];
        let amount = entry.installment_amount;
        entry.paid_amount = amount;
        entry.is_paid = true;
        entry.payment_date = Some(payment_date);
        entry.payroll_reference = Some(reference.to_string());

        self.repaid_amount += amount;
        self.remaining_balance = self.total_amount - self.repaid_amount;

        let old_status = self.status;
        let new_status = if self.remaining_balance.is_positive() {
            LoanStatus::PartiallyRepaid
        } else {
            LoanStatus::FullyRepaid
        };
        self.update_status(new_status, payment_date);

        Ok(RepaymentOutcome {
            amount,
            old_status,
            new_status,
        })
    }

    fn update_status(&mut self, new_status: LoanStatus, on: NaiveDate) {
        self.status = new_status;
        self.status_changed_on = Some(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::available_months;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            chrono::Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap(),
        ))
    }

    fn loan_with_schedule() -> LoanApplication {
        let mut app = LoanApplication::new("LOAN-0001", "EMP-001", "Jane Smith");
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
        app
    }

    #[test]
    fn test_installment_amount_derivation() {
        let app = loan_with_schedule();
        assert_eq!(app.installment_amount, Money::from_major(400));
        assert_eq!(app.total_amount, Money::from_major(1200));
        assert_eq!(app.remaining_balance, Money::from_major(1200));
    }

    #[test]
    fn test_installment_amount_propagates_to_schedule() {
        let mut app = loan_with_schedule();
        app.loan_amount = Money::from_major(900);
        app.recalculate_amounts();

        assert_eq!(app.installment_amount, Money::from_major(300));
        for entry in &app.repayment_schedule {
            assert_eq!(entry.installment_amount, Money::from_major(300));
        }
    }

    #[test]
    fn test_schedule_sorted_ascending() {
        let mut app = loan_with_schedule();
        let mut entries = app.repayment_schedule.clone();
        entries.reverse();
        app.replace_schedule(entries);

        let dates: Vec<_> = app
            .repayment_schedule
            .iter()
            .map(|e| e.repayment_date.unwrap())
            .collect();
        assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_switch_loan_type_clears_other_variant() {
        let mut app = loan_with_schedule();
        assert_eq!(app.repayment_schedule.len(), 3);

        app.switch_loan_type(Some(LoanType::Advance));
        assert!(app.repayment_schedule.is_empty());
        assert_eq!(app.loan_amount, Money::ZERO);
        assert_eq!(app.installments_count, 0);
        assert_eq!(app.installment_amount, Money::ZERO);

        app.advance_amount = Money::from_major(500);
        app.advance_repayment_month = Some("2024-05".parse().unwrap());
        app.switch_loan_type(Some(LoanType::Loan));
        assert!(app.repayment_schedule.is_empty());
        assert_eq!(app.advance_amount, Money::ZERO);
        assert_eq!(app.advance_repayment_month, None);
    }

    #[test]
    fn test_validate_rejects_count_mismatch() {
        let mut app = loan_with_schedule();
        app.repayment_schedule.pop();

        match app.validate() {
            Err(ApplicationError::InstallmentCountMismatch { selected, required }) => {
                assert_eq!(selected, 2);
                assert_eq!(required, 3);
            }
            other => panic!("expected count mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_date_on_or_before_posting() {
        let mut app = loan_with_schedule();
        app.repayment_schedule[0].repayment_date = Some(date(2024, 1, 15));
        assert!(matches!(
            app.validate(),
            Err(ApplicationError::InvalidRepaymentDate { .. })
        ));

        app.repayment_schedule[0].repayment_date = Some(date(2024, 1, 10));
        assert!(app.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overpaid_row() {
        let mut app = loan_with_schedule();
        app.repayment_schedule[0].paid_amount = Money::from_major(450);
        assert!(matches!(
            app.validate(),
            Err(ApplicationError::PaidExceedsInstallment { .. })
        ));
    }

    #[test]
    fn test_approve_only_from_draft() {
        let time = test_time();
        let mut app = loan_with_schedule();

        let response = app.approve(&time).unwrap();
        assert_eq!(app.status, LoanStatus::Approved);
        assert_eq!(app.status_changed_on, Some(date(2024, 1, 20)));
        assert!(response.message.contains("LOAN-0001"));

        assert!(matches!(
            app.approve(&time),
            Err(ApplicationError::AlreadyProcessed { .. })
        ));
    }

    #[test]
    fn test_repayment_lifecycle() {
        let time = test_time();
        let mut app = loan_with_schedule();
        app.approve(&time).unwrap();

        let outcome = app
            .record_repayment("2024-02".parse().unwrap(), date(2024, 2, 29), "SAL-0001")
            .unwrap();
        assert_eq!(outcome.amount, Money::from_major(400));
        assert_eq!(outcome.new_status, LoanStatus::PartiallyRepaid);
        assert_eq!(app.remaining_balance, Money::from_major(800));

        // same month twice is rejected
        assert!(matches!(
            app.record_repayment("2024-02".parse().unwrap(), date(2024, 2, 29), "SAL-0001"),
            Err(ApplicationError::InstallmentAlreadyPaid { .. })
        ));

        // submission gated until fully repaid
        assert!(matches!(
            app.submit(),
            Err(ApplicationError::OutstandingBalance { .. })
        ));

        app.record_repayment("2024-03".parse().unwrap(), date(2024, 3, 31), "SAL-0002")
            .unwrap();
        let outcome = app
            .record_repayment("2024-04".parse().unwrap(), date(2024, 4, 30), "SAL-0003")
            .unwrap();
        assert_eq!(outcome.new_status, LoanStatus::FullyRepaid);
        assert_eq!(app.remaining_balance, Money::ZERO);

        app.submit().unwrap();
        assert!(app.submitted);
    }

    #[test]
    fn test_cancel_resets_unpaid_rows() {
        let time = test_time();
        let mut app = loan_with_schedule();
        app.approve(&time).unwrap();
        app.record_repayment("2024-02".parse().unwrap(), date(2024, 2, 29), "SAL-0001")
            .unwrap();

        app.repayment_schedule[1].paid_amount = Money::from_major(100);
        app.cancel(&time);

        assert_eq!(app.status, LoanStatus::Cancelled);
        assert!(app.repayment_schedule[0].is_paid);
        assert_eq!(app.repayment_schedule[1].paid_amount, Money::ZERO);
        assert_eq!(app.repayment_schedule[1].payment_date, None);
    }

    #[test]
    fn test_title() {
        let app = loan_with_schedule();
        assert_eq!(app.title().as_deref(), Some("Jane Smith - Loan"));

        let blank = LoanApplication::new("LOAN-0002", "EMP-002", "Ravi Patel");
        assert_eq!(blank.title(), None);
    }
}
