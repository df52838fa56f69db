//! Terminal output helpers for Pantry
//!
//! Provides:
//! - Status messages
//! - Result rendering with highlighted matches
//! - Duration, price and count formatting

#![warn(missing_docs)]

pub mod output;
