//! # Seed Import
//!
//! Loads books and students from a YAML file through the domain services, so
//! seeded records pass the same validation as any other.
//!
//! ```yaml
//! books:
//!   - isbn: "9780451524935"
//!     title: "1984"
//!     author: "George Orwell"
//!     year: 1949
//! students:
//!   - matricule: "MAT001"
//!     name: "Ada Lovelace"
//!     email: "ada@example.com"
//! ```
//!
//! Entries whose ISBN or matricule already exist are skipped, so the same file
//! can be imported on every start.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::backend::domain::models::book::NewBook;
use crate::backend::domain::models::student::NewStudent;
use crate::backend::domain::{CatalogService, StudentService};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub books: Vec<NewBook>,
    pub students: Vec<NewStudent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub books_added: usize,
    pub students_added: usize,
    pub skipped: usize,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {:?}", path))?;
        let data = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse seed file {:?}", path))?;
        Ok(data)
    }
}

/// Import seed data, skipping records that are already stored
pub async fn import_seed(
    data: SeedData,
    catalog: &CatalogService,
    students: &StudentService,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for book in data.books {
        if catalog.find_by_isbn(&book.isbn).await?.is_some() {
            debug!("Skipping existing book {}", book.isbn);
            report.skipped += 1;
            continue;
        }
        catalog.add_book(book).await?;
        report.books_added += 1;
    }

    for student in data.students {
        if students.find_by_matricule(&student.matricule).await?.is_some() {
            debug!("Skipping existing student {}", student.matricule);
            report.skipped += 1;
            continue;
        }
        students.register_student(student).await?;
        report.students_added += 1;
    }

    info!(
        "Seed import: {} books, {} students added, {} skipped",
        report.books_added, report.students_added, report.skipped
    );
    Ok(report)
}
