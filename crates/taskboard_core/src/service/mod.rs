//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Validate caller input before it reaches persistence.
//! - Map repository errors into service errors.

pub mod error;
pub mod tag_service;
pub mod task_service;
pub mod user_service;
