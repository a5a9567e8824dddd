/// advance - single lump-sum repayment in one chosen month
use loan_application_rs::chrono::NaiveDate;
use loan_application_rs::{
    FormSession, LoanApplication, LoanType, LocalCatalog, Money, ScheduleConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = LoanApplication::new("LOAN-APP-0002", "EMP-002", "Ravi Patel");
    let mut session = FormSession::new(document, ScheduleConfig::standard());

    session.set_posting_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    session.set_loan_type(Some(LoanType::Advance));
    session.set_advance_amount(Money::from_major(500));
    session.refresh_with(&LocalCatalog);

    session.set_advance_repayment_month(Some("2024-05".parse()?))?;

    let entry = &session.document.repayment_schedule[0];
    println!(
        "advance of {} due {} ({})",
        entry.installment_amount,
        entry.repayment_date.unwrap(),
        entry.repayment_month_year
    );
    println!("remaining balance: {}", session.document.remaining_balance);

    Ok(())
}
