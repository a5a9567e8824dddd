/// loan summary - declarative report filters and in-memory execution
use loan_application_rs::chrono::NaiveDate;
use loan_application_rs::{
    loan_summary, loan_summary_columns, loan_summary_filters, LoanApplication, LoanSummaryFilter,
    LoanType, Money, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);

    let mut applications = Vec::new();
    for (name, employee, amount, posted) in [
        ("LOAN-APP-0001", "EMP-001", 1_200, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
        ("LOAN-APP-0002", "EMP-002", 800, NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()),
    ] {
        let mut app = LoanApplication::new(name, employee, employee);
        app.switch_loan_type(Some(LoanType::Loan));
        app.posting_date = Some(posted);
        app.loan_amount = Money::from_major(amount);
        app.installments_count = 4;
        app.recalculate_amounts();
        app.approve(&time)?;
        applications.push(app);
    }

    for spec in loan_summary_filters(&time) {
        println!("filter: {} ({})", spec.fieldname, spec.label);
    }
    println!("columns: {}", loan_summary_columns().len());

    let rows = loan_summary(&applications, &LoanSummaryFilter::default());
    for row in rows {
        println!(
            "{} | {} | total {} | repaid {} | balance {} | {}",
            row.employee,
            row.loan_type.map(|t| t.to_string()).unwrap_or_default(),
            row.total_amount,
            row.repaid_amount,
            row.remaining_balance,
            row.status
        );
    }

    Ok(())
}
