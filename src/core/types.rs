use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Value used for optional monetary totals that the document does not carry.
pub const ZERO_AMOUNT: &str = "0.00";

/// Currency assumed when an amount carries no `currencyID`.
pub const DEFAULT_CURRENCY: &str = "TRY";

fn zero_amount() -> String {
    ZERO_AMOUNT.to_string()
}

/// A UBL-TR invoice (e-Fatura / e-Arşiv) in canonical form.
///
/// Field names are the serialization contract consumed by report and JSON
/// exporters (`monetary_total.payable`, `invoice_lines[i].tax_total.percent`,
/// `digital_signature.digest_values`, ...). All amounts are kept as the decimal
/// strings found in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDocument {
    /// Invoice number (`cbc:ID`), e.g. "EAR2026000000888".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// ETTN (`cbc:UUID`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_time: Option<String>,
    /// SATIS, IADE, TEVKIFAT, ISTISNA, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    /// TEMELFATURA, TICARIFATURA, EARSIVFATURA, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_indicator: Option<String>,
    /// First `cbc:Note` of the document (often the amount in words).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubl_version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count_numeric: Option<String>,
    /// Signer identity from the `cac:Signature` block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signatory: Option<Signatory>,
    pub supplier: Party,
    pub customer: Party,
    pub tax_total: TaxSummary,
    pub monetary_total: MonetaryTotals,
    pub invoice_lines: Vec<InvoiceLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_means: Option<PaymentMeans>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_documents: Vec<DocumentReference>,
    /// XML-DSig / XAdES metadata from the extension payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_signature: Option<DigitalSignature>,
}

impl InvoiceDocument {
    /// A document without an invoice number cannot be booked or matched.
    pub fn is_usable(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    /// Issue date as a calendar date, when it is a valid `YYYY-MM-DD`.
    pub fn issue_date_parsed(&self) -> Option<NaiveDate> {
        self.issue_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }
}

/// Supplier (`AccountingSupplierParty`) or customer (`AccountingCustomerParty`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    /// First `PartyIdentification/ID` (VKN or TCKN in practice).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<Identification>,
    /// Remaining identifications (MERSISNO, TICARETSICILNO, ...) in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_ids: Vec<Identification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: Address,
    /// Tax office (`PartyTaxScheme/TaxScheme/Name`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_office: Option<String>,
    /// Trade registry number (`PartyLegalEntity/CompanyID`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// Present only when the party is a natural person.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
}

impl Party {
    pub fn is_natural_person(&self) -> bool {
        self.person.is_some()
    }
}

/// An identifier qualified by its `schemeID` (VKN, TCKN, MERSISNO, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identification {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_id: Option<String>,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Street, building name and building number joined by single spaces.
    pub line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_number: Option<String>,
    /// District (ilçe).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_subdivision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A `TaxTotal` reduced to its total and its first `TaxSubtotal`.
///
/// Invoices with several rates keep only the first subtotal in document order;
/// later subtotals are neither merged nor summed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxSummary {
    /// `TaxTotal/TaxAmount`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<String>,
    /// `currencyID` of the total (TRY when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxable_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<String>,
    /// e.g. "KDV", "GERÇEK USULDE KATMA DEĞER VERGİSİ".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_name: Option<String>,
    /// Tax type code, e.g. "0015" for VAT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption_reason_code: Option<String>,
}

/// `LegalMonetaryTotal`. Optional totals default to `"0.00"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetaryTotals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_exclusive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_inclusive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payable: Option<String>,
    #[serde(default = "zero_amount")]
    pub allowance_total: String,
    #[serde(default = "zero_amount")]
    pub charge_total: String,
    #[serde(default = "zero_amount")]
    pub prepaid: String,
    #[serde(default = "zero_amount")]
    pub payable_rounding: String,
}

impl Default for MonetaryTotals {
    fn default() -> Self {
        Self {
            line_extension: None,
            tax_exclusive: None,
            tax_inclusive: None,
            payable: None,
            allowance_total: zero_amount(),
            charge_total: zero_amount(),
            prepaid: zero_amount(),
            payable_rounding: zero_amount(),
        }
    }
}

/// One `InvoiceLine`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceLine {
    /// 1-based position in the document, independent of `id`.
    pub line_number: usize,
    /// Declared line `cbc:ID`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_extension_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub item: Item,
    pub price: Price,
    pub tax_total: TaxSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `SellersItemIdentification/ID`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sellers_code: Option<String>,
    /// `BuyersItemIdentification/ID`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyers_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Price {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Which extraction tier produced the signature metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureSource {
    /// Everything came from the parsed `ds:Signature` subtree.
    #[default]
    Structured,
    /// Everything came from text patterns over the raw document.
    TextPattern,
    /// The subtree was found but some fields were completed from text patterns.
    Mixed,
}

/// XML-DSig / XAdES signature metadata. The signature is not verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitalSignature {
    /// `Id` attribute of `ds:Signature`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_time: Option<String>,
    /// `SignatureMethod/@Algorithm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// One per signed reference, in document order.
    pub digest_values: Vec<String>,
    pub source: SignatureSource,
}

impl DigitalSignature {
    /// True when no field was recovered.
    pub fn is_empty(&self) -> bool {
        self.signature_id.is_none()
            && self.signature_value.is_none()
            && self.certificate_subject.is_none()
            && self.certificate_serial.is_none()
            && self.signing_time.is_none()
            && self.algorithm.is_none()
            && self.digest_values.is_empty()
    }

    /// XAdES signing time, when it is an RFC 3339 timestamp.
    pub fn signing_time_parsed(&self) -> Option<DateTime<FixedOffset>> {
        self.signing_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t.trim()).ok())
    }
}

/// The `cac:Signature` block naming the signing party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signatory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Usually "VKN_TCKN".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_id: Option<String>,
    /// VKN/TCKN of the signing party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// `DigitalSignatureAttachment/ExternalReference/URI`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMeans {
    /// UNTDID 4461 payment means code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_note: Option<String>,
    /// `PayeeFinancialAccount/ID` (IBAN).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_currency: Option<String>,
}

/// `AdditionalDocumentReference` (XSLT, dispatch notes, sending type, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type_code: Option<String>,
}
