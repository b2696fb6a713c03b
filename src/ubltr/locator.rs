//! Namespace-tolerant element lookup.
//!
//! Producers of UBL-TR documents disagree on prefixes, default namespaces and
//! sometimes on the namespace itself. A lookup by local name goes through
//! three tiers and the first tier with any result wins:
//!
//! 1. **Qualified**: for each registry entry in priority order, the first
//!    descendant in that namespace with the local name.
//! 2. **Unqualified**: the first descendant without a namespace.
//! 3. **Suffix**: the first descendant whose qualified name ends with the
//!    local name at a name boundary (`}Name`, `:Name` or `Name`). This reaches
//!    elements in unknown namespaces; it does not turn `ID` into `UUID`.
//!
//! All scans are in document order and never include the scope node itself.

use super::namespaces::NamespaceRegistry;
use super::tree::Node;
use crate::core::EFaturaError;

/// The tier that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Qualified lookup; `priority` is the index of the winning registry entry.
    Qualified { priority: usize },
    Unqualified,
    Suffix,
}

/// A located element together with the tier that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'d> {
    pub node: Node<'d>,
    pub tier: MatchTier,
}

impl<'d> Resolved<'d> {
    /// Namespace URI of the matched element, if it has one.
    pub fn namespace(&self) -> Option<&'d str> {
        self.node.namespace()
    }
}

/// Resolves logical field names against a parsed document.
#[derive(Debug, Clone)]
pub struct Locator {
    registry: NamespaceRegistry,
}

impl Locator {
    /// Build a locator over a validated registry.
    pub fn new(registry: NamespaceRegistry) -> Result<Self, EFaturaError> {
        registry.validate()?;
        Ok(Self { registry })
    }

    /// Locator over [`NamespaceRegistry::ubl_tr`].
    pub fn ubl_tr() -> Self {
        Self {
            registry: NamespaceRegistry::ubl_tr(),
        }
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// First match for `local_name` under `scope`, with the tier that found it.
    pub fn resolve<'d>(&self, scope: Node<'d>, local_name: &str) -> Option<Resolved<'d>> {
        if local_name.is_empty() {
            return None;
        }

        for (priority, entry) in self.registry.entries().iter().enumerate() {
            if let Some(node) = scope.descendants().find(|n| n.is(&entry.uri, local_name)) {
                return Some(Resolved {
                    node,
                    tier: MatchTier::Qualified { priority },
                });
            }
        }

        if let Some(node) = scope
            .descendants()
            .find(|n| n.namespace().is_none() && n.local_name() == local_name)
        {
            return Some(Resolved {
                node,
                tier: MatchTier::Unqualified,
            });
        }

        let node = scope
            .descendants()
            .find(|n| ends_with_name(n.qualified_name(), local_name))?;
        tracing::debug!(
            local_name,
            matched = node.qualified_name(),
            "element resolved by suffix fallback"
        );
        Some(Resolved {
            node,
            tier: MatchTier::Suffix,
        })
    }

    /// First match for `local_name` under `scope`.
    pub fn locate<'d>(&self, scope: Node<'d>, local_name: &str) -> Option<Node<'d>> {
        self.resolve(scope, local_name).map(|r| r.node)
    }

    /// Every match for `local_name` under `scope`.
    ///
    /// Qualified matches come first, grouped by registry priority and in
    /// document order within a namespace; unqualified and suffix matches not
    /// already present follow in document order.
    pub fn locate_all<'d>(&self, scope: Node<'d>, local_name: &str) -> Vec<Node<'d>> {
        let mut found: Vec<Node<'d>> = Vec::new();
        if local_name.is_empty() {
            return found;
        }

        for entry in self.registry.entries() {
            found.extend(scope.descendants().filter(|n| n.is(&entry.uri, local_name)));
        }

        for node in scope
            .descendants()
            .filter(|n| n.namespace().is_none() && n.local_name() == local_name)
        {
            if !found.contains(&node) {
                found.push(node);
            }
        }

        for node in scope
            .descendants()
            .filter(|n| ends_with_name(n.qualified_name(), local_name))
        {
            if !found.contains(&node) {
                found.push(node);
            }
        }

        found
    }

    /// First descendant that is exactly `local_name` in `namespace`.
    pub fn locate_in<'d>(
        &self,
        scope: Node<'d>,
        namespace: &str,
        local_name: &str,
    ) -> Option<Node<'d>> {
        scope.descendants().find(|n| n.is(namespace, local_name))
    }

    /// Follow a chain of lookups, each scoped to the previous match.
    pub fn locate_path<'d>(&self, scope: Node<'d>, path: &[&str]) -> Option<Node<'d>> {
        path.iter()
            .try_fold(scope, |current, name| self.locate(current, name))
    }

    /// Trimmed text of the element found by [`Locator::locate_path`].
    pub fn text(&self, scope: Node<'_>, path: &[&str]) -> Option<String> {
        self.locate_path(scope, path)
            .and_then(|n| n.text())
            .map(str::to_string)
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::ubl_tr()
    }
}

/// `qualified` ends with `local_name` and the match starts a name segment.
fn ends_with_name(qualified: &str, local_name: &str) -> bool {
    match qualified.strip_suffix(local_name) {
        Some(head) => head.is_empty() || head.ends_with('}') || head.ends_with(':'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_match_respects_name_boundary() {
        assert!(ends_with_name("{urn:x}ID", "ID"));
        assert!(ends_with_name("foo:ID", "ID"));
        assert!(ends_with_name("ID", "ID"));
        assert!(!ends_with_name("{urn:x}UUID", "ID"));
        assert!(!ends_with_name("{urn:x}TaxSchemeID", "ID"));
        assert!(!ends_with_name("{urn:x}IDs", "ID"));
    }
}
