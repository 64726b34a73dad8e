use crate::backend::domain::models::loan::Loan as DomainLoan;
use shared::Loan as SharedLoan;

pub struct LoanMapper;

impl LoanMapper {
    /// Loan dates travel as `YYYY-MM-DD`
    pub fn to_dto(domain: DomainLoan) -> SharedLoan {
        SharedLoan {
            id: domain.id,
            book_id: domain.book_id,
            student_id: domain.student_id,
            date_borrowed: domain.date_borrowed.format("%Y-%m-%d").to_string(),
            returned: domain.returned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_date_format() {
        let loan = DomainLoan {
            id: 1,
            book_id: 2,
            student_id: 3,
            date_borrowed: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            returned: false,
        };
        assert_eq!(LoanMapper::to_dto(loan).date_borrowed, "2024-03-09");
    }
}
