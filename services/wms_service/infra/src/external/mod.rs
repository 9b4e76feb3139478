//! Adapters for external collaborator services

pub mod product_catalog;

pub use product_catalog::HttpProductCatalog;
