use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use crate::backend::domain::models::student::{NewStudent, Student};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::StudentStorage;

/// Repository for student operations
#[derive(Clone)]
pub struct StudentRepository {
    db: DbConnection,
}

impl StudentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn student_from_row(row: &SqliteRow) -> Student {
        Student {
            id: row.get("id"),
            matricule: row.get("matricule"),
            name: row.get("name"),
            email: row.get("email"),
        }
    }
}

#[async_trait]
impl StudentStorage for StudentRepository {
    async fn store_student(&self, student: &NewStudent) -> Result<Student> {
        let result = sqlx::query(
            r#"
            INSERT INTO students (matricule, name, email)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&student.matricule)
        .bind(&student.name)
        .bind(&student.email)
        .execute(self.db.pool())
        .await?;

        Ok(Student {
            id: result.last_insert_rowid(),
            matricule: student.matricule.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
        })
    }

    async fn get_student(&self, student_id: i64) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, matricule, name, email
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::student_from_row))
    }

    async fn get_student_by_matricule(&self, matricule: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, matricule, name, email
            FROM students
            WHERE matricule = ?
            "#,
        )
        .bind(matricule)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::student_from_row))
    }
}
