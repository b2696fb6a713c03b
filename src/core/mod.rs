//! Canonical invoice model, errors and decimal verification.
//!
//! The types here are independent of XML: they describe a Turkish
//! e-Fatura / e-Arşiv invoice after extraction, with every amount kept as
//! the decimal string found in the document.

mod error;
mod types;
mod verify;

pub use error::*;
pub use types::*;
pub use verify::*;
