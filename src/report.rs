use chrono::{Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::application::LoanApplication;
use crate::decimal::Money;
use crate::types::{LoanStatus, LoanType};

/// filter widget type, consumed by the host report renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FilterType {
    /// link to another entity
    Link { entity: &'static str },
    /// fixed option list
    Select { options: Vec<&'static str> },
    /// calendar date
    Date,
}

/// declarative filter spec; no logic beyond declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSpec {
    pub fieldname: &'static str,
    pub label: &'static str,
    pub filter_type: FilterType,
    pub default: Option<String>,
}

/// column declaration for the host report renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportColumn {
    pub fieldname: &'static str,
    pub label: &'static str,
    pub fieldtype: &'static str,
    pub options: Option<&'static str>,
    pub width: u32,
}

/// filters offered by the loan summary report
///
/// date defaults cover the trailing month up to today
pub fn loan_summary_filters(time: &SafeTimeProvider) -> Vec<FilterSpec> {
    let today = time.now().date_naive();
    let month_ago = today.checked_sub_months(Months::new(1)).unwrap_or(today);

    vec![
        FilterSpec {
            fieldname: "employee",
            label: "Employee",
            filter_type: FilterType::Link { entity: "Employee" },
            default: None,
        },
        FilterSpec {
            fieldname: "department",
            label: "Department",
            filter_type: FilterType::Link { entity: "Department" },
            default: None,
        },
        FilterSpec {
            fieldname: "loan_type",
            label: "Loan Type",
            filter_type: FilterType::Select {
                options: vec!["", "Advance", "Loan"],
            },
            default: None,
        },
        FilterSpec {
            fieldname: "status",
            label: "Status",
            filter_type: FilterType::Select {
                options: vec!["", "Approved", "Partially Repaid", "Fully Repaid"],
            },
            default: None,
        },
        FilterSpec {
            fieldname: "from_date",
            label: "From Date",
            filter_type: FilterType::Date,
            default: Some(month_ago.to_string()),
        },
        FilterSpec {
            fieldname: "to_date",
            label: "To Date",
            filter_type: FilterType::Date,
            default: Some(today.to_string()),
        },
    ]
}

/// columns of the loan summary report
pub fn loan_summary_columns() -> Vec<ReportColumn> {
    vec![
        ReportColumn {
            fieldname: "employee",
            label: "Employee",
            fieldtype: "Link",
            options: Some("Employee"),
            width: 120,
        },
        ReportColumn {
            fieldname: "employee_name",
            label: "Employee Name",
            fieldtype: "Data",
            options: None,
            width: 150,
        },
        ReportColumn {
            fieldname: "department",
            label: "Department",
            fieldtype: "Link",
            options: Some("Department"),
            width: 120,
        },
        ReportColumn {
            fieldname: "loan_type",
            label: "Type",
            fieldtype: "Data",
            options: None,
            width: 100,
        },
        ReportColumn {
            fieldname: "total_amount",
            label: "Total Amount",
            fieldtype: "Currency",
            options: None,
            width: 120,
        },
        ReportColumn {
            fieldname: "repaid_amount",
            label: "Repaid Amount",
            fieldtype: "Currency",
            options: None,
            width: 120,
        },
        ReportColumn {
            fieldname: "remaining_balance",
            label: "Remaining Balance",
            fieldtype: "Currency",
            options: None,
            width: 130,
        },
        ReportColumn {
            fieldname: "status",
            label: "Loan Status",
            fieldtype: "Data",
            options: None,
            width: 100,
        },
        ReportColumn {
            fieldname: "posting_date",
            label: "Date",
            fieldtype: "Date",
            options: None,
            width: 100,
        },
    ]
}

/// chosen filter values for one report run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanSummaryFilter {
    pub employee: Option<String>,
    pub department: Option<String>,
    pub loan_type: Option<LoanType>,
    pub status: Option<LoanStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// one row of the loan summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummaryRow {
    pub employee: String,
    pub employee_name: String,
    pub department: Option<String>,
    pub loan_type: Option<LoanType>,
    pub total_amount: Money,
    pub repaid_amount: Money,
    pub remaining_balance: Money,
    pub status: LoanStatus,
    pub posting_date: Option<NaiveDate>,
}

/// run the loan summary over a set of applications
///
/// cancelled documents are excluded; rows come back newest posting date first
pub fn loan_summary(applications: &[LoanApplication], filter: &LoanSummaryFilter) -> Vec<LoanSummaryRow> {
    let mut rows: Vec<LoanSummaryRow> = applications
        .iter()
        .filter(|app| app.status != LoanStatus::Cancelled)
        .filter(|app| {
            filter
                .employee
                .as_ref()
                .map(|e| &app.employee == e)
                .unwrap_or(true)
        })
        .filter(|app| {
            filter
                .department
                .as_ref()
                .map(|d| app.department.as_ref() == Some(d))
                .unwrap_or(true)
        })
        .filter(|app| filter.loan_type.map(|t| app.loan_type == Some(t)).unwrap_or(true))
        .filter(|app| filter.status.map(|s| app.status == s).unwrap_or(true))
        .filter(|app| {
            filter
                .from_date
                .map(|from| app.posting_date.map(|d| d >= from).unwrap_or(false))
                .unwrap_or(true)
        })
        .filter(|app| {
            filter
                .to_date
                .map(|to| app.posting_date.map(|d| d <= to).unwrap_or(false))
                .unwrap_or(true)
        })
        .map(|app| LoanSummaryRow {
            employee: app.employee.clone(),
            employee_name: app.employee_name.clone(),
            department: app.department.clone(),
            loan_type: app.loan_type,
            total_amount: app.total_amount,
            repaid_amount: app.repaid_amount,
            remaining_balance: app.remaining_balance,
            status: app.status,
            posting_date: app.posting_date,
        })
        .collect();

    rows.sort_by(|a, b| b.posting_date.cmp(&a.posting_date));
    rows
}
