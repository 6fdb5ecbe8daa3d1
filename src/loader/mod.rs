//! YAML Loader module
//!
//! Parse provider definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ProviderDefinition` - Declarative provider specification
//! - `HttpDefinition` - Client settings of a provider
//! - YAML parsing with validation

mod parser;
mod types;

pub use parser::{load_provider, load_provider_from_str};
pub use types::{HttpDefinition, ProviderDefinition};

#[cfg(test)]
mod tests;
