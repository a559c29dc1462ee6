pub mod client;
pub mod error;
mod trait_impl;


pub use client::JiraClient;
pub use error::{JiraError, Result};

// Re-export fieldmeta-core types for convenience
pub use fieldmeta_core::{CreateMetaQuery, MetaSource};
