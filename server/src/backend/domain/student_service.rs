use std::sync::Arc;
use tracing::info;

use crate::backend::domain::errors::{LibraryError, LibraryResult};
use crate::backend::domain::models::student::{NewStudent, Student};
use crate::backend::storage::{DbConnection, StudentRepository, StudentStorage};

const MAX_MATRICULE_LEN: usize = 20;
const MAX_NAME_LEN: usize = 150;

/// Service for registering students
#[derive(Clone)]
pub struct StudentService {
    students: Arc<dyn StudentStorage>,
}

impl StudentService {
    pub fn new(db: DbConnection) -> Self {
        Self::with_storage(Arc::new(StudentRepository::new(db)))
    }

    pub fn with_storage(students: Arc<dyn StudentStorage>) -> Self {
        Self { students }
    }

    /// Validate and store a new student
    pub async fn register_student(&self, student: NewStudent) -> LibraryResult<Student> {
        let student = NewStudent {
            matricule: student.matricule.trim().to_string(),
            name: student.name.trim().to_string(),
            email: student.email.trim().to_string(),
        };
        Self::validate_new_student(&student)?;

        let stored = self.students.store_student(&student).await?;
        info!("Registered student {} ({})", stored.name, stored.matricule);
        Ok(stored)
    }

    pub async fn find_by_matricule(&self, matricule: &str) -> LibraryResult<Option<Student>> {
        Ok(self.students.get_student_by_matricule(matricule.trim()).await?)
    }

    fn validate_new_student(student: &NewStudent) -> LibraryResult<()> {
        if student.matricule.is_empty() {
            return Err(LibraryError::invalid("Matricule cannot be empty"));
        }
        if student.matricule.chars().count() > MAX_MATRICULE_LEN {
            return Err(LibraryError::invalid(format!(
                "Matricule cannot exceed {} characters",
                MAX_MATRICULE_LEN
            )));
        }
        if student.name.is_empty() {
            return Err(LibraryError::invalid("Name cannot be empty"));
        }
        if student.name.chars().count() > MAX_NAME_LEN {
            return Err(LibraryError::invalid(format!(
                "Name cannot exceed {} characters",
                MAX_NAME_LEN
            )));
        }
        if !is_plausible_email(&student.email) {
            return Err(LibraryError::invalid(format!("Invalid email: {}", student.email)));
        }
        Ok(())
    }
}

/// One `@` with a non-empty local part and a dotted domain
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}
