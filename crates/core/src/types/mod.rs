//! Core types for Partshed.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod action;
pub mod email;
pub mod id;
pub mod status;

pub use action::AuditAction;
pub use email::{Email, EmailError};
pub use id::*;
pub use status::{ListingStatus, StatusParseError, UserRole};
