use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan application
pub type ApplicationId = Uuid;

/// unique identifier for an open form session
pub type SessionId = Uuid;

/// loan application variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    /// single lump-sum repayment in one chosen month
    Advance,
    /// repayment spread over a selected set of months
    Loan,
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanType::Advance => write!(f, "Advance"),
            LoanType::Loan => write!(f, "Loan"),
        }
    }
}

/// loan application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// created, awaiting approval
    Draft,
    /// approved, repayments may be deducted
    Approved,
    /// at least one installment repaid
    PartiallyRepaid,
    /// remaining balance reached zero
    FullyRepaid,
    /// withdrawn or rejected
    Cancelled,
}

impl LoanStatus {
    /// statuses whose installments are eligible for payroll deduction
    pub fn is_deductible(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::PartiallyRepaid)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Draft => write!(f, "Draft"),
            LoanStatus::Approved => write!(f, "Approved"),
            LoanStatus::PartiallyRepaid => write!(f, "Partially Repaid"),
            LoanStatus::FullyRepaid => write!(f, "Fully Repaid"),
            LoanStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}


/// which month picker is rendered for the active loan type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickerMode {
    /// single-select month field (Advance)
    SingleSelect,
    /// multi-select month grid (Loan)
    Grid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deductible_statuses() {
        assert!(LoanStatus::Approved.is_deductible());
        assert!(LoanStatus::PartiallyRepaid.is_deductible());
        assert!(!LoanStatus::Draft.is_deductible());
        assert!(!LoanStatus::FullyRepaid.is_deductible());
        assert!(!LoanStatus::Cancelled.is_deductible());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(LoanType::Advance.to_string(), "Advance");
        assert_eq!(LoanStatus::PartiallyRepaid.to_string(), "Partially Repaid");
    }
}
