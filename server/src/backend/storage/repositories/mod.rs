// Repository modules
pub mod book_repository;
pub mod loan_repository;
pub mod session_repository;
pub mod student_repository;

// Re-export repository types
pub use book_repository::BookRepository;
pub use loan_repository::LoanRepository;
pub use session_repository::SessionRepository;
pub use student_repository::StudentRepository;
