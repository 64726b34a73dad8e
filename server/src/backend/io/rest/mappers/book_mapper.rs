use crate::backend::domain::commands::catalog::{BookDetailResult, BookListResult};
use crate::backend::domain::models::book::Book as DomainBook;
use crate::backend::io::rest::mappers::LoanMapper;
use shared::{
    Book as SharedBook, BookDetailResponse, BookListResponse, FlashMessage, Student as SharedStudent,
};

/// Mapper from domain books and catalogue results to the shared DTOs.
pub struct BookMapper;

impl BookMapper {
    pub fn to_dto(domain: DomainBook) -> SharedBook {
        SharedBook {
            id: domain.id,
            isbn: domain.isbn,
            title: domain.title,
            author: domain.author,
            year: domain.year,
            available: domain.available,
        }
    }

    pub fn to_list_response(
        result: BookListResult,
        logged_student: Option<SharedStudent>,
        messages: Vec<FlashMessage>,
    ) -> BookListResponse {
        BookListResponse {
            books: result.books.into_iter().map(Self::to_dto).collect(),
            sort: result.sort.as_str().to_string(),
            query: result.query,
            logged_student,
            messages,
        }
    }

    pub fn to_detail_response(
        result: BookDetailResult,
        logged_student: Option<SharedStudent>,
        messages: Vec<FlashMessage>,
    ) -> BookDetailResponse {
        BookDetailResponse {
            book: Self::to_dto(result.book),
            active_loan: result.active_loan.map(LoanMapper::to_dto),
            logged_student,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::book::BookSortKey;

    #[test]
    fn test_list_response_reports_applied_sort() {
        let result = BookListResult {
            books: vec![DomainBook {
                id: 7,
                isbn: "9780451524935".to_string(),
                title: "1984".to_string(),
                author: "George Orwell".to_string(),
                year: 1949,
                available: false,
            }],
            sort: BookSortKey::Year,
            query: None,
        };

        let response = BookMapper::to_list_response(result, None, Vec::new());
        assert_eq!(response.sort, "year");
        assert_eq!(response.books.len(), 1);
        assert_eq!(response.books[0].id, 7);
        assert!(!response.books[0].available);
    }
}
