pub mod book_mapper;
pub mod loan_mapper;
pub mod student_mapper;

pub use book_mapper::BookMapper;
pub use loan_mapper::LoanMapper;
pub use student_mapper::StudentMapper;
