/// serialization support for loan applications
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::LoanApplication;
use crate::calendar::MonthKey;
use crate::decimal::Money;
use crate::types::{ApplicationId, LoanStatus, LoanType};

/// serializable view of a loan application's state
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub name: String,
    pub title: Option<String>,
    pub employee: String,
    pub employee_name: String,
    pub department: Option<String>,
    pub loan_type: Option<LoanType>,
    pub status: LoanStatus,
    pub submitted: bool,
    pub posting_date: Option<NaiveDate>,
    pub advance_repayment_month: Option<MonthKey>,
    pub amounts: AmountView,
    pub schedule: Vec<ScheduleRowView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AmountView {
    pub loan_amount: Money,
    pub advance_amount: Money,
    pub installments_count: u32,
    pub installment_amount: Money,
    pub total_amount: Money,
    pub repaid_amount: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleRowView {
    pub month: String,
    pub repayment_date: Option<NaiveDate>,
    pub installment_amount: Money,
    pub paid_amount: Money,
    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,
}

impl ApplicationView {
    pub fn from_application(app: &LoanApplication) -> Self {
        ApplicationView {
            id: app.id,
            name: app.name.clone(),
            title: app.title(),
            employee: app.employee.clone(),
            employee_name: app.employee_name.clone(),
            department: app.department.clone(),
            loan_type: app.loan_type,
            status: app.status,
            submitted: app.submitted,
            posting_date: app.posting_date,
            advance_repayment_month: app.advance_repayment_month,
            amounts: AmountView {
                loan_amount: app.loan_amount,
                advance_amount: app.advance_amount,
                installments_count: app.installments_count,
                installment_amount: app.installment_amount,
                total_amount: app.total_amount,
                repaid_amount: app.repaid_amount,
                remaining_balance: app.remaining_balance,
            },
            schedule: app
                .repayment_schedule
                .iter()
                .map(|entry| ScheduleRowView {
                    month: entry.repayment_month_year.clone(),
                    repayment_date: entry.repayment_date,
                    installment_amount: entry.installment_amount,
                    paid_amount: entry.paid_amount,
                    is_paid: entry.is_paid,
                    payment_date: entry.payment_date,
                })
                .collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ScheduleEntry;
    use crate::calendar::available_months;

    #[test]
    fn test_view_round_trips_through_json() {
        let mut app = LoanApplication::new("LOAN-0001", "EMP-001", "Jane Smith");
        app.switch_loan_type(Some(LoanType::Loan));
        app.posting_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        app.loan_amount = Money::from_major(1200);
        app.installments_count = 3;
        app.recalculate_amounts();
        let entries = available_months(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 3)
            .iter()
            .map(|o| ScheduleEntry::from_option(o, app.installment_amount))
            .collect();
        app.replace_schedule(entries);

        let view = ApplicationView::from_application(&app);
        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("\"Jane Smith - Loan\""));
        assert!(json.contains("\"2024-02-29\""));

        let parsed: ApplicationView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.schedule.len(), 3);
        assert_eq!(parsed.amounts.installment_amount, Money::from_major(400));
    }
}
