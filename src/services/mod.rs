// src/services/mod.rs

//! Row parsing and status classification services.

pub mod rows;
pub mod status;

pub use rows::{CourseCells, RowOutcome, parse_row};
pub use status::classify;
