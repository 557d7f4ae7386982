mod auth;
mod client;
pub mod types;

pub use auth::{AuthProvider, StaticToken};
pub use client::{CatalogClient, CatalogFetcher, HttpPolicy};
pub use types::*;
