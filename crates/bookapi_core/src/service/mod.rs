//! Core use-case services.
//!
//! # Responsibility
//! - Sit between the HTTP layer and the repository so catalogue rules
//!   live in one place.

pub mod book_service;
