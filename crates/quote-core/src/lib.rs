//! Core types and traits for the quote engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Quote, Symbol, QuoteChain)
//! - Trading signals
//! - Core traits for indicators, signal generators and history providers
//! - The error taxonomy shared by every crate

pub mod error;
pub mod traits;
pub mod types;

pub use error::{QuoteError, QuoteResult};
pub use traits::*;
pub use types::*;
