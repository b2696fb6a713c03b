//! UBL-TR namespace URIs and the ordered registry the locator resolves
//! element names against.

use serde::{Deserialize, Serialize};

use crate::core::EFaturaError;

/// UBL-TR namespace URIs.
pub mod ns {
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const EXT: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2";
    pub const DS: &str = "http://www.w3.org/2000/09/xmldsig#";
    pub const XADES: &str = "http://uri.etsi.org/01903/v1.3.2#";
    pub const UBLTR: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:TurkishCustomizationExtensionComponents";
    pub const QDT: &str = "urn:oasis:names:specification:ubl:schema:xsd:QualifiedDatatypes-2";
    pub const UDT: &str =
        "urn:un:unece:uncefact:data:specification:UnqualifiedDataTypesSchemaModule:2";
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
}

/// One registry entry. The prefix is informational: lookups match on URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub prefix: String,
    pub uri: String,
}

/// Ordered namespace priority list used by the qualified lookup tier.
///
/// Several namespaces may carry an element with the same local name; the
/// earlier entry wins. [`NamespaceRegistry::ubl_tr`] is the order used for
/// Turkish e-invoices: cbc, cac, ds, ext, xades, ubltr, qdt, udt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceRegistry {
    entries: Vec<NamespaceEntry>,
}

impl NamespaceRegistry {
    /// An empty registry. Lookups then rely on the unqualified and suffix tiers.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The UBL 2.1 / UBL-TR registry.
    pub fn ubl_tr() -> Self {
        Self::new()
            .with("cbc", ns::CBC)
            .with("cac", ns::CAC)
            .with("ds", ns::DS)
            .with("ext", ns::EXT)
            .with("xades", ns::XADES)
            .with("ubltr", ns::UBLTR)
            .with("qdt", ns::QDT)
            .with("udt", ns::UDT)
    }

    /// Append an entry with the lowest priority so far.
    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.entries.push(NamespaceEntry {
            prefix: prefix.into(),
            uri: uri.into(),
        });
        self
    }

    pub fn entries(&self) -> &[NamespaceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prefix registered for `uri`, if any.
    pub fn prefix_of(&self, uri: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.uri == uri)
            .map(|e| e.prefix.as_str())
    }

    /// Reject registries with blank or duplicate URIs.
    ///
    /// An empty registry is valid.
    pub fn validate(&self) -> Result<(), EFaturaError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.uri.trim().is_empty() {
                return Err(EFaturaError::Config(format!(
                    "namespace entry '{}' has an empty URI",
                    entry.prefix
                )));
            }
            if self.entries[..i].iter().any(|e| e.uri == entry.uri) {
                return Err(EFaturaError::Config(format!(
                    "namespace URI '{}' is registered more than once",
                    entry.uri
                )));
            }
        }
        Ok(())
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::ubl_tr()
    }
}
