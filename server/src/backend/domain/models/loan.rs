use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of unreturned loans a student may hold
pub const MAX_ACTIVE_LOANS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub book_id: i64,
    pub student_id: i64,
    pub date_borrowed: NaiveDate,
    pub returned: bool,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        !self.returned
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub book_id: i64,
    pub student_id: i64,
    pub date_borrowed: NaiveDate,
}

/// Result of the store's guarded loan insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenLoanOutcome {
    Opened(Loan),
    /// The student already held the maximum number of active loans
    LimitReached,
    /// The book was not available when the transaction ran
    BookTaken,
}
