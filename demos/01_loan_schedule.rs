/// quick start - build a loan repayment schedule from month selections
use loan_application_rs::chrono::NaiveDate;
use loan_application_rs::{
    FormSession, LoanApplication, LoanType, LocalCatalog, Money, ScheduleConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = LoanApplication::new("LOAN-APP-0001", "EMP-001", "Jane Smith");
    let mut session = FormSession::new(document, ScheduleConfig::standard());

    // a $1,200 loan repaid over 3 months
    session.set_posting_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    session.set_loan_type(Some(LoanType::Loan));
    session.set_loan_amount(Money::from_major(1_200));
    session.set_installments_count(3);
    session.refresh_with(&LocalCatalog);

    // pick the repayment months (click order does not matter)
    session.toggle_month("2024-04".parse()?)?;
    session.toggle_month("2024-02".parse()?)?;
    session.toggle_month("2024-03".parse()?)?;

    let counter = session.selection_counter().unwrap();
    println!("selected {} / {} months", counter.selected, counter.required);

    for entry in &session.document.repayment_schedule {
        println!(
            "{}  due {}  amount {}",
            entry.repayment_month_year,
            entry.repayment_date.unwrap(),
            entry.installment_amount
        );
    }

    session.document.validate()?;
    Ok(())
}
