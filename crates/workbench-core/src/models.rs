//! Domain models for workbench access control.
//!
//! These are the core types shared across all crates.

pub mod access;
pub mod permission;
pub mod role;
pub mod user;
