//! Library loans server.
//!
//! Students log in by matricule, browse and search the catalogue, and borrow
//! or return books under two rules: at most three active loans per student and
//! at most one active loan per book.

pub mod backend;
pub mod config;
