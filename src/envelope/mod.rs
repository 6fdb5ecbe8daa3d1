//! Response envelope module
//!
//! Every provider wraps its records in a JSON object: Contentful under
//! `items`, ABC Financial under a per-endpoint key next to a
//! `status.count` field. The envelope describes where the records live and
//! where the provider reports its own count.

mod extract;

pub use extract::{Envelope, Opened};

#[cfg(test)]
mod tests;
