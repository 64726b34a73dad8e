pub mod book;
pub mod loan;
pub mod session;
pub mod student;
