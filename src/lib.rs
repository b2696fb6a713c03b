//! # efatura
//!
//! Extraction of Turkish e-Fatura / e-Arşiv invoices (UBL 2.1 with the
//! UBL-TR customization) into a canonical, structured model.
//!
//! Producers disagree on namespace prefixes, default namespaces and nesting.
//! Fields are therefore resolved by local name through an ordered namespace
//! registry with unqualified and suffix fallbacks, and mapped into a stable
//! model whose serde field names downstream reports and exporters key off.
//!
//! All monetary values stay decimal strings in the model. Arithmetic checks
//! use [`rust_decimal::Decimal`], not floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "ubltr")] {
//! use efatura::ubltr;
//!
//! let xml = r#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
//!     xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2"
//!     xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2">
//!   <cbc:ID>INV0001</cbc:ID>
//!   <cac:LegalMonetaryTotal>
//!     <cbc:PayableAmount currencyID="TRY">24.00</cbc:PayableAmount>
//!   </cac:LegalMonetaryTotal>
//! </Invoice>"#;
//!
//! let invoice = ubltr::from_ubltr_xml(xml).unwrap();
//! assert_eq!(invoice.id.as_deref(), Some("INV0001"));
//! assert_eq!(invoice.monetary_total.payable.as_deref(), Some("24.00"));
//! assert_eq!(invoice.monetary_total.allowance_total, "0.00");
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice model, errors, decimal verification |
//! | `ubltr` (default) | UBL-TR XML tree, locator, model builder, signature metadata |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubltr")]
pub mod ubltr;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
