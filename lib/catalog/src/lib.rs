//! Spa service catalog for the receptionist.
//!
//! This crate provides:
//!
//! - **Catalog Sources**: where the service list comes from (file, HTTP, fixed)
//! - **Lookup Tools**: the catalog queries the model may request mid-turn

pub mod error;
pub mod service;
pub mod source;
pub mod tools;

pub use error::CatalogError;
pub use service::{Catalog, Service};
pub use source::{CatalogSource, FileCatalog, HttpCatalog, StaticCatalog};
pub use tools::{
    GetAllServices, GetServiceCategories, GetServiceInfo, SearchByPrice, catalog_registry,
};
