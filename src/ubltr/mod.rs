//! UBL-TR (e-Fatura / e-Arşiv) XML extraction.
//!
//! Turns a UBL 2.1 Invoice with the Turkish customization into an
//! [`InvoiceDocument`](crate::core::InvoiceDocument):
//!
//! 1. [`Document::parse`] materialises a namespace-resolved element tree.
//! 2. A [`Locator`] resolves field names against it, tolerating missing,
//!    unexpected or unknown namespace qualification.
//! 3. [`ModelBuilder`] assembles the model; signature metadata comes from
//!    the `ds:Signature` subtree with a text-pattern fallback.
//!
//! # Example
//!
//! ```no_run
//! use efatura::ubltr;
//!
//! let xml = std::fs::read_to_string("EAR2026000000888.xml").unwrap();
//! let extraction = ubltr::extract(&xml);
//! if let Some(err) = &extraction.error {
//!     eprintln!("unreadable invoice: {err}");
//! }
//! println!("{:?}", extraction.invoice.monetary_total.payable);
//! ```

mod builder;
mod locator;
mod namespaces;
pub mod signature;
mod tree;

pub use builder::{Extraction, ModelBuilder, extract, extract_with, from_path, from_ubltr_xml};
pub use locator::{Locator, MatchTier, Resolved};
pub use namespaces::{NamespaceEntry, NamespaceRegistry, ns};
pub use tree::{Attribute, Document, Node};
