#![cfg(feature = "ubltr")]

use efatura::core::EFaturaError;
use efatura::ubltr::{Document, Locator, MatchTier, NamespaceRegistry, ns};

fn parse(xml: &str) -> Document {
    Document::parse(xml).unwrap()
}

fn texts<'d>(nodes: impl IntoIterator<Item = efatura::ubltr::Node<'d>>) -> Vec<&'d str> {
    nodes.into_iter().filter_map(|n| n.text()).collect()
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

#[test]
fn qualified_match_is_prefix_independent() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:u="{}"><u:ID>INV-9</u:ID></Invoice>"#,
        ns::CBC
    ));
    let locator = Locator::ubl_tr();
    let found = locator.resolve(doc.root(), "ID").unwrap();
    assert_eq!(found.node.text(), Some("INV-9"));
    assert_eq!(found.namespace(), Some(ns::CBC));
    assert_eq!(found.tier, MatchTier::Qualified { priority: 0 });
}

#[test]
fn default_namespace_is_qualified() {
    let doc = parse(&format!(
        r#"<Invoice><ID xmlns="{}">D-1</ID></Invoice>"#,
        ns::CBC
    ));
    let found = Locator::ubl_tr().resolve(doc.root(), "ID").unwrap();
    assert_eq!(found.node.text(), Some("D-1"));
    assert!(matches!(found.tier, MatchTier::Qualified { .. }));
}

#[test]
fn unqualified_tier_reads_plain_elements() {
    let doc = parse("<Invoice><Header><ID>P-1</ID></Header></Invoice>");
    let found = Locator::ubl_tr().resolve(doc.root(), "ID").unwrap();
    assert_eq!(found.node.text(), Some("P-1"));
    assert_eq!(found.tier, MatchTier::Unqualified);
    assert_eq!(found.namespace(), None);
}

#[test]
fn suffix_tier_reaches_unknown_namespaces() {
    let doc = parse(
        r#"<Invoice xmlns:x="urn:example:vendor">
             <x:InvoiceLine><x:InvoicedQuantity unitCode="C62">4</x:InvoicedQuantity></x:InvoiceLine>
           </Invoice>"#,
    );
    let locator = Locator::ubl_tr();
    let found = locator.resolve(doc.root(), "InvoicedQuantity").unwrap();
    assert_eq!(found.tier, MatchTier::Suffix);
    assert_eq!(found.node.text(), Some("4"));
    assert_eq!(found.node.attribute("unitCode"), Some("C62"));
    assert_eq!(found.namespace(), Some("urn:example:vendor"));
}

#[test]
fn suffix_tier_requires_a_name_boundary() {
    let doc = parse(
        r#"<Invoice xmlns:x="urn:example:vendor"><x:UUID>u-1</x:UUID><x:TaxSchemeID>t</x:TaxSchemeID></Invoice>"#,
    );
    let locator = Locator::ubl_tr();
    assert!(locator.locate(doc.root(), "ID").is_none());
    assert_eq!(
        locator.locate(doc.root(), "UUID").and_then(|n| n.text()),
        Some("u-1")
    );
}

#[test]
fn undeclared_prefix_is_found_by_suffix() {
    let doc = parse("<Invoice><cbc:ID>RAW-1</cbc:ID></Invoice>");
    let found = Locator::ubl_tr().resolve(doc.root(), "ID").unwrap();
    assert_eq!(found.tier, MatchTier::Suffix);
    assert_eq!(found.node.raw_name(), "cbc:ID");
    assert_eq!(found.node.text(), Some("RAW-1"));
}

#[test]
fn earlier_tier_wins_over_document_order() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:x="urn:example:vendor" xmlns:cbc="{}">
             <x:ID>suffix</x:ID>
             <ID>plain</ID>
             <cbc:ID>qualified</cbc:ID>
           </Invoice>"#,
        ns::CBC
    ));
    let locator = Locator::ubl_tr();
    assert_eq!(
        locator.locate(doc.root(), "ID").and_then(|n| n.text()),
        Some("qualified")
    );
}

#[test]
fn registry_order_breaks_ties() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:cac="{}" xmlns:cbc="{}">
             <cac:Name>aggregate</cac:Name>
             <cbc:Name>basic</cbc:Name>
           </Invoice>"#,
        ns::CAC,
        ns::CBC
    ));

    let default = Locator::ubl_tr();
    let found = default.resolve(doc.root(), "Name").unwrap();
    assert_eq!(found.node.text(), Some("basic"));
    assert_eq!(found.tier, MatchTier::Qualified { priority: 0 });

    let cac_first = Locator::new(
        NamespaceRegistry::new()
            .with("cac", ns::CAC)
            .with("cbc", ns::CBC),
    )
    .unwrap();
    assert_eq!(
        cac_first.locate(doc.root(), "Name").and_then(|n| n.text()),
        Some("aggregate")
    );
}

#[test]
fn scope_node_itself_is_never_a_match() {
    let doc = parse(&format!(
        r#"<cac:InvoiceLine xmlns:cac="{}"><cac:Item/></cac:InvoiceLine>"#,
        ns::CAC
    ));
    let locator = Locator::ubl_tr();
    assert!(locator.locate(doc.root(), "InvoiceLine").is_none());
    assert!(locator.locate(doc.root(), "Item").is_some());
    assert!(locator.locate(doc.root(), "").is_none());
}

// ---------------------------------------------------------------------------
// locate_all / paths
// ---------------------------------------------------------------------------

#[test]
fn locate_all_merges_tiers_without_duplicates() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:cac="{}" xmlns:x="urn:example:vendor">
             <InvoiceLine><ID>2</ID></InvoiceLine>
             <cac:InvoiceLine><ID>1</ID></cac:InvoiceLine>
             <x:InvoiceLine><ID>3</ID></x:InvoiceLine>
             <cac:InvoiceLine><ID>4</ID></cac:InvoiceLine>
           </Invoice>"#,
        ns::CAC
    ));
    let locator = Locator::ubl_tr();
    let lines = locator.locate_all(doc.root(), "InvoiceLine");
    let ids: Vec<_> = lines
        .iter()
        .map(|l| locator.text(*l, &["ID"]).unwrap())
        .collect();
    // Qualified first, then unqualified and suffix matches in document order.
    assert_eq!(ids, ["1", "4", "2", "3"]);
}

#[test]
fn locate_all_is_empty_when_nothing_matches() {
    let doc = parse("<Invoice><ID>1</ID></Invoice>");
    assert!(Locator::ubl_tr().locate_all(doc.root(), "InvoiceLine").is_empty());
}

#[test]
fn locate_all_keeps_document_order_in_one_namespace() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:cbc="{}"><cbc:Note>a</cbc:Note><cbc:Note>b</cbc:Note><cbc:Note>c</cbc:Note></Invoice>"#,
        ns::CBC
    ));
    let notes = Locator::ubl_tr().locate_all(doc.root(), "Note");
    assert_eq!(texts(notes), ["a", "b", "c"]);
}

#[test]
fn path_lookup_is_scoped_to_each_step() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:cac="{}" xmlns:cbc="{}">
             <cac:Signature><cbc:ID>signatory</cbc:ID></cac:Signature>
             <cac:AccountingSupplierParty>
               <cac:Party>
                 <cac:PartyName><cbc:Name>Tedarikçi</cbc:Name></cac:PartyName>
                 <cac:PartyTaxScheme><cac:TaxScheme><cbc:Name>Kadıköy</cbc:Name></cac:TaxScheme></cac:PartyTaxScheme>
               </cac:Party>
             </cac:AccountingSupplierParty>
           </Invoice>"#,
        ns::CAC,
        ns::CBC
    ));
    let locator = Locator::ubl_tr();
    let party = locator
        .locate_path(doc.root(), &["AccountingSupplierParty", "Party"])
        .unwrap();
    assert_eq!(
        locator.text(party, &["PartyName", "Name"]).as_deref(),
        Some("Tedarikçi")
    );
    assert_eq!(
        locator
            .text(party, &["PartyTaxScheme", "TaxScheme", "Name"])
            .as_deref(),
        Some("Kadıköy")
    );
    assert!(locator.text(party, &["PartyName", "ID"]).is_none());
    assert_eq!(locator.locate_path(party, &[]), Some(party));
}

#[test]
fn locate_in_is_exact() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:cac="{}" xmlns:ds="{}"><cac:Signature/><ds:Signature Id="S1"/></Invoice>"#,
        ns::CAC,
        ns::DS
    ));
    let locator = Locator::ubl_tr();
    let ds = locator.locate_in(doc.root(), ns::DS, "Signature").unwrap();
    assert_eq!(ds.attribute("Id"), Some("S1"));
    assert!(locator.locate_in(doc.root(), ns::XADES, "Signature").is_none());
}

// ---------------------------------------------------------------------------
// Registry configuration
// ---------------------------------------------------------------------------

#[test]
fn empty_registry_falls_back_to_unqualified_and_suffix() {
    let doc = parse(&format!(
        r#"<Invoice xmlns:cbc="{}"><cbc:ID>Q</cbc:ID></Invoice>"#,
        ns::CBC
    ));
    let locator = Locator::new(NamespaceRegistry::new()).unwrap();
    let found = locator.resolve(doc.root(), "ID").unwrap();
    assert_eq!(found.tier, MatchTier::Suffix);
    assert_eq!(found.node.text(), Some("Q"));
}

#[test]
fn custom_registry_qualifies_vendor_namespace() {
    let doc = parse(
        r#"<Invoice xmlns:x="urn:example:vendor"><x:ID>V-1</x:ID></Invoice>"#,
    );
    let locator = Locator::new(NamespaceRegistry::ubl_tr().with("x", "urn:example:vendor")).unwrap();
    let found = locator.resolve(doc.root(), "ID").unwrap();
    assert_eq!(
        found.tier,
        MatchTier::Qualified {
            priority: NamespaceRegistry::ubl_tr().len()
        }
    );
}

#[test]
fn invalid_registry_is_rejected() {
    let duplicate = NamespaceRegistry::new()
        .with("cbc", ns::CBC)
        .with("b", ns::CBC);
    assert!(matches!(
        Locator::new(duplicate),
        Err(EFaturaError::Config(_))
    ));

    let blank = NamespaceRegistry::new().with("x", "  ");
    assert!(matches!(Locator::new(blank), Err(EFaturaError::Config(_))));
}

#[test]
fn default_registry_has_expected_priority() {
    let registry = NamespaceRegistry::ubl_tr();
    assert_eq!(registry.entries()[0].uri, ns::CBC);
    assert_eq!(registry.entries()[1].uri, ns::CAC);
    assert_eq!(registry.prefix_of(ns::DS), Some("ds"));
    assert_eq!(registry.prefix_of(ns::INVOICE), None);
    assert_eq!(Locator::default().registry(), &registry);
}
