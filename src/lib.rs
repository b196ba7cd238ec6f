// src/lib.rs

//! TSHP course-listing scraper library.
//!
//! Drives a headless-browser capability ([`driver::PageDriver`]) through the
//! TSHP course-query page, parses the result rows, resolves each course's
//! registration status from its detail page, and persists one overwriting
//! JSON snapshot.

pub mod driver;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
