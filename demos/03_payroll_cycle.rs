/// payroll cycle - approve a loan, then deduct installments month by month
use loan_application_rs::chrono::NaiveDate;
use loan_application_rs::{
    apply_deductions, EventStore, FormSession, LoanApplication, LoanType, LocalCatalog, Money,
    SafeTimeProvider, ScheduleConfig, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);

    let document = LoanApplication::new("LOAN-APP-0003", "EMP-003", "Mei Chen");
    let mut session = FormSession::new(document, ScheduleConfig::standard());
    session.set_posting_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    session.set_loan_type(Some(LoanType::Loan));
    session.set_loan_amount(Money::from_major(900));
    session.set_installments_count(3);
    session.refresh_with(&LocalCatalog);
    for month in ["2024-02", "2024-03", "2024-04"] {
        session.toggle_month(month.parse()?)?;
    }

    let mut document = session.document.clone();
    let response = document.approve(&time)?;
    println!("{}", response.message);

    let mut applications = vec![document];
    let mut events = EventStore::new();
    for (payroll_date, slip) in [
        (NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), "SAL-2024-02"),
        (NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), "SAL-2024-03"),
        (NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), "SAL-2024-04"),
    ] {
        let lines = apply_deductions(&mut applications, payroll_date, slip, true, &mut events)?;
        for line in &lines {
            println!("{slip}: {} {} for {}", line.component, line.amount, line.employee);
        }
        println!("remaining balance: {}", applications[0].remaining_balance);
    }

    println!("final status: {} (submitted: {})", applications[0].status, applications[0].submitted);
    Ok(())
}
