//! Error types for catalog loading.
//!
//! Errors are designed for layered context using rootcause:
//! sources return `Report<CatalogError>` and callers attach their own context.

use std::fmt;

/// Errors from loading the service catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog document could not be read.
    ReadFailed { location: String, details: String },
    /// The catalog document is not valid JSON of the expected shape.
    InvalidDocument { location: String, details: String },
    /// The catalog source is misconfigured.
    InvalidConfig { details: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { location, details } => {
                write!(f, "failed to read catalog from {location}: {details}")
            }
            Self::InvalidDocument { location, details } => {
                write!(f, "catalog at {location} is invalid: {details}")
            }
            Self::InvalidConfig { details } => {
                write!(f, "invalid catalog configuration: {details}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}
