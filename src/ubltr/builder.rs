use std::path::Path;

use super::locator::Locator;
use super::namespaces::ns;
use super::signature::extract_signature;
use super::tree::{Document, Node};
use crate::core::*;

/// Result of [`extract`]: always a model, plus the parse failure if any.
///
/// When the document is not well-formed XML, `invoice` is the empty
/// [`InvoiceDocument::default`] and `error` holds the
/// [`EFaturaError::DocumentParse`].
#[derive(Debug)]
pub struct Extraction {
    pub invoice: InvoiceDocument,
    pub error: Option<EFaturaError>,
}

impl Extraction {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<InvoiceDocument, EFaturaError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.invoice),
        }
    }
}

/// Extract a UBL-TR invoice with the default namespace registry.
///
/// Never panics and never fails: parse failures are reported in
/// [`Extraction::error`] next to an empty model.
pub fn extract(xml: &str) -> Extraction {
    extract_with(&Locator::ubl_tr(), xml)
}

/// Extract a UBL-TR invoice with a caller-supplied locator.
pub fn extract_with(locator: &Locator, xml: &str) -> Extraction {
    match Document::parse(xml) {
        Ok(doc) => Extraction {
            invoice: ModelBuilder::new(locator).build(&doc, xml),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "invoice document could not be parsed");
            Extraction {
                invoice: InvoiceDocument::default(),
                error: Some(e),
            }
        }
    }
}

/// Parse a UBL-TR Invoice XML string into an [`InvoiceDocument`].
pub fn from_ubltr_xml(xml: &str) -> Result<InvoiceDocument, EFaturaError> {
    extract(xml).into_result()
}

/// Read a whole UBL-TR XML file and extract it.
pub fn from_path(path: impl AsRef<Path>) -> Result<InvoiceDocument, EFaturaError> {
    let xml = std::fs::read_to_string(path.as_ref())?;
    from_ubltr_xml(&xml)
}

/// Assembles the canonical model from a parsed document.
///
/// Header fields are looked up from the document element, party fields from
/// the `Party` under `AccountingSupplierParty` / `AccountingCustomerParty`,
/// line fields from each `InvoiceLine`.
pub struct ModelBuilder<'l> {
    locator: &'l Locator,
}

impl<'l> ModelBuilder<'l> {
    pub fn new(locator: &'l Locator) -> Self {
        Self { locator }
    }

    /// Build the model. `raw` is the text `doc` was parsed from; it backs the
    /// signature text-pattern fallback.
    pub fn build(&self, doc: &Document, raw: &str) -> InvoiceDocument {
        let root = doc.root();

        let invoice = InvoiceDocument {
            id: self.text(root, &["ID"]),
            uuid: self.text(root, &["UUID"]),
            issue_date: self.text(root, &["IssueDate"]),
            issue_time: self.text(root, &["IssueTime"]),
            type_code: self.text(root, &["InvoiceTypeCode"]),
            currency_code: self.text(root, &["DocumentCurrencyCode"]),
            profile_id: self.text(root, &["ProfileID"]),
            copy_indicator: self.text(root, &["CopyIndicator"]),
            note: self.text(root, &["Note"]),
            ubl_version_id: self.text(root, &["UBLVersionID"]),
            customization_id: self.text(root, &["CustomizationID"]),
            line_count_numeric: self.text(root, &["LineCountNumeric"]),
            signatory: self.signatory(root),
            supplier: self.party(root, "AccountingSupplierParty"),
            customer: self.party(root, "AccountingCustomerParty"),
            tax_total: self
                .locator
                .locate(root, "TaxTotal")
                .map(|t| self.tax_summary(t, "tax_total"))
                .unwrap_or_default(),
            monetary_total: self.monetary_total(root),
            invoice_lines: self.lines(root),
            payment_means: self.payment_means(root),
            additional_documents: self.additional_documents(root),
            digital_signature: extract_signature(root, self.locator, raw),
        };

        if !invoice.is_usable() {
            tracing::warn!("invoice document has no invoice id");
        }
        tracing::debug!(
            id = invoice.id.as_deref().unwrap_or(""),
            lines = invoice.invoice_lines.len(),
            signed = invoice.digital_signature.is_some(),
            "invoice extracted"
        );
        invoice
    }

    fn text(&self, scope: Node<'_>, path: &[&str]) -> Option<String> {
        self.locator.text(scope, path)
    }

    fn party(&self, root: Node<'_>, wrapper: &str) -> Party {
        let Some(party) = self.locator.locate_path(root, &[wrapper, "Party"]) else {
            return Party::default();
        };

        let mut ids = self
            .locator
            .locate_all(party, "PartyIdentification")
            .into_iter()
            .filter_map(|pi| self.locator.locate(pi, "ID"))
            .filter_map(|id| {
                Some(Identification {
                    value: id.text()?.to_string(),
                    scheme_id: id.attribute("schemeID").map(str::to_string),
                })
            });
        let identification = ids.next();
        let additional_ids = ids.collect();

        Party {
            identification,
            additional_ids,
            name: self.text(party, &["PartyName", "Name"]),
            address: self
                .locator
                .locate(party, "PostalAddress")
                .map(|a| self.address(a))
                .unwrap_or_default(),
            tax_office: self.text(party, &["PartyTaxScheme", "TaxScheme", "Name"]),
            registration_number: self.text(party, &["PartyLegalEntity", "CompanyID"]),
            contact: self.locator.locate(party, "Contact").map(|c| Contact {
                telephone: self.text(c, &["Telephone"]),
                telefax: self.text(c, &["Telefax"]),
                email: self.text(c, &["ElectronicMail"]),
            }),
            person: self.locator.locate(party, "Person").map(|p| Person {
                first_name: self.text(p, &["FirstName"]),
                middle_name: self.text(p, &["MiddleName"]),
                family_name: self.text(p, &["FamilyName"]),
                title: self.text(p, &["Title"]),
            }),
        }
    }

    fn address(&self, postal: Node<'_>) -> Address {
        let street_name = self.text(postal, &["StreetName"]);
        let building_name = self.text(postal, &["BuildingName"]);
        let building_number = self.text(postal, &["BuildingNumber"]);

        let line = [&street_name, &building_name, &building_number]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        Address {
            line,
            street_name,
            building_name,
            building_number,
            city_subdivision: self.text(postal, &["CitySubdivisionName"]),
            city: self.text(postal, &["CityName"]),
            postal_zone: self.text(postal, &["PostalZone"]),
            country: self.text(postal, &["Country", "Name"]),
        }
    }

    /// Total plus the first `TaxSubtotal` only.
    fn tax_summary(&self, tax_total: Node<'_>, field: &str) -> TaxSummary {
        let total = self.locator.locate(tax_total, "TaxAmount");
        let mut summary = TaxSummary {
            total_amount: total.and_then(|n| n.text()).map(str::to_string),
            currency: total.map(|n| {
                n.attribute("currencyID")
                    .unwrap_or(DEFAULT_CURRENCY)
                    .to_string()
            }),
            ..Default::default()
        };

        let subtotals = self.locator.locate_all(tax_total, "TaxSubtotal");
        let Some(&first) = subtotals.first() else {
            return summary;
        };

        summary.taxable_amount = self.text(first, &["TaxableAmount"]);
        summary.tax_amount = self.text(first, &["TaxAmount"]);
        summary.percent = self.text(first, &["Percent"]);
        if let Some(category) = self.locator.locate(first, "TaxCategory") {
            summary.tax_name = self.text(category, &["TaxScheme", "Name"]);
            summary.tax_code = self
                .text(category, &["TaxScheme", "TaxTypeCode"])
                .or_else(|| self.text(category, &["TaxScheme", "ID"]));
            summary.exemption_reason = self.text(category, &["TaxExemptionReason"]);
            summary.exemption_reason_code = self.text(category, &["TaxExemptionReasonCode"]);
        }

        let other_rates = subtotals[1..]
            .iter()
            .filter(|s| self.text(**s, &["Percent"]) != summary.percent)
            .count();
        if other_rates > 0 {
            tracing::warn!(
                field,
                kept = summary.percent.as_deref().unwrap_or(""),
                ignored = other_rates,
                "tax total has subtotals with other rates; only the first is kept"
            );
        }

        summary
    }

    fn monetary_total(&self, root: Node<'_>) -> MonetaryTotals {
        let Some(total) = self.locator.locate(root, "LegalMonetaryTotal") else {
            return MonetaryTotals::default();
        };
        let or_zero = |name: &str| {
            self.text(total, &[name])
                .unwrap_or_else(|| ZERO_AMOUNT.to_string())
        };

        MonetaryTotals {
            line_extension: self.text(total, &["LineExtensionAmount"]),
            tax_exclusive: self.text(total, &["TaxExclusiveAmount"]),
            tax_inclusive: self.text(total, &["TaxInclusiveAmount"]),
            payable: self.text(total, &["PayableAmount"]),
            allowance_total: or_zero("AllowanceTotalAmount"),
            charge_total: or_zero("ChargeTotalAmount"),
            prepaid: or_zero("PrepaidAmount"),
            payable_rounding: or_zero("PayableRoundingAmount"),
        }
    }

    fn lines(&self, root: Node<'_>) -> Vec<InvoiceLine> {
        self.locator
            .locate_all(root, "InvoiceLine")
            .into_iter()
            .enumerate()
            .map(|(i, line)| self.line(line, i + 1))
            .collect()
    }

    fn line(&self, line: Node<'_>, line_number: usize) -> InvoiceLine {
        let quantity = self.locator.locate(line, "InvoicedQuantity");
        let price_amount = self.locator.locate_path(line, &["Price", "PriceAmount"]);

        InvoiceLine {
            line_number,
            id: self.text(line, &["ID"]),
            quantity: quantity.and_then(|q| q.text()).map(str::to_string),
            unit_code: quantity
                .and_then(|q| q.attribute("unitCode"))
                .map(str::to_string),
            line_extension_amount: self.text(line, &["LineExtensionAmount"]),
            note: self.text(line, &["Note"]),
            item: self
                .locator
                .locate(line, "Item")
                .map(|item| Item {
                    name: self.text(item, &["Name"]),
                    sellers_code: self.text(item, &["SellersItemIdentification", "ID"]),
                    buyers_code: self.text(item, &["BuyersItemIdentification", "ID"]),
                    description: self.text(item, &["Description"]),
                })
                .unwrap_or_default(),
            price: Price {
                amount: price_amount.and_then(|p| p.text()).map(str::to_string),
                currency: price_amount.map(|p| {
                    p.attribute("currencyID")
                        .unwrap_or(DEFAULT_CURRENCY)
                        .to_string()
                }),
            },
            tax_total: self
                .locator
                .locate(line, "TaxTotal")
                .map(|t| self.tax_summary(t, "invoice_lines.tax_total"))
                .unwrap_or_default(),
        }
    }

    /// The UBL `cac:Signature` block. XML-DSig signatures are not signatories,
    /// nor is anything inside `ext:UBLExtensions`, whatever its namespace.
    fn signatory(&self, root: Node<'_>) -> Option<Signatory> {
        let signature = self
            .locator
            .locate_all(root, "Signature")
            .into_iter()
            .find(|n| n.namespace() != Some(ns::DS) && !in_extension(*n))?;
        let id = self.locator.locate(signature, "ID");

        Some(Signatory {
            id: id.and_then(|n| n.text()).map(str::to_string),
            scheme_id: id
                .and_then(|n| n.attribute("schemeID"))
                .map(str::to_string),
            party_id: self.text(
                signature,
                &["SignatoryParty", "PartyIdentification", "ID"],
            ),
            city: self.text(signature, &["SignatoryParty", "PostalAddress", "CityName"]),
            attachment_uri: self.text(
                signature,
                &["DigitalSignatureAttachment", "ExternalReference", "URI"],
            ),
        })
    }

    fn payment_means(&self, root: Node<'_>) -> Option<PaymentMeans> {
        let means = self.locator.locate(root, "PaymentMeans")?;
        Some(PaymentMeans {
            code: self.text(means, &["PaymentMeansCode"]),
            due_date: self.text(means, &["PaymentDueDate"]),
            channel_code: self.text(means, &["PaymentChannelCode"]),
            instruction_note: self.text(means, &["InstructionNote"]),
            account_id: self.text(means, &["PayeeFinancialAccount", "ID"]),
            account_currency: self.text(means, &["PayeeFinancialAccount", "CurrencyCode"]),
        })
    }

    /// Document-level references only; line-level ones are skipped.
    fn additional_documents(&self, root: Node<'_>) -> Vec<DocumentReference> {
        self.locator
            .locate_all(root, "AdditionalDocumentReference")
            .into_iter()
            .filter(|r| r.parent() == Some(root))
            .map(|r| DocumentReference {
                id: self.text(r, &["ID"]),
                issue_date: self.text(r, &["IssueDate"]),
                document_type: self.text(r, &["DocumentType"]),
                document_type_code: self.text(r, &["DocumentTypeCode"]),
            })
            .collect()
    }
}

/// Whether `node` sits inside the `UBLExtensions` envelope.
fn in_extension(node: Node<'_>) -> bool {
    std::iter::successors(node.parent(), |n| n.parent())
        .any(|n| matches!(n.local_name(), "ExtensionContent" | "UBLExtensions"))
}
