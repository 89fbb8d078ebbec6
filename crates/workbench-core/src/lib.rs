//! Workbench Core — domain models, error taxonomy, repository traits
//! and the in-memory pagination utility shared by every crate.

pub mod error;
pub mod models;
pub mod pagination;
pub mod repository;
