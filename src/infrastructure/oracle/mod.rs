//! Classification oracle adapter.
//!
//! Normalizes calls to, and output from, the external reasoning service:
//! prompt construction, robust response parsing, and fallback results for
//! both parse and transport failures.

pub mod client;
pub mod parser;
pub mod prompt;
pub mod types;

pub use client::OracleClient;
pub use parser::parse_classification;
pub use types::{ChatMessage, OracleError};
