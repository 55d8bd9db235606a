//! Core domain types and utilities for the spa receptionist.
//!
//! This crate provides the foundational types, error handling, and shared
//! identifiers used by the dialogue loop, the catalog tools, and the server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ChatSessionId, ParseIdError, SessionKey, TurnId};
