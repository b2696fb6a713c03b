//! Digital signature metadata from the `ext:UBLExtensions` payload.
//!
//! The XAdES envelope sits inside `ext:ExtensionContent`, whose schema is
//! `xsd:any`. When the payload is namespace-clean it is read as an ordinary
//! subtree of the parsed document. Producers that mis-declare the XML-DSig
//! namespace still use the conventional `ds:`/`xades:` prefixes, so the raw
//! text is scanned with fixed patterns for whatever the subtree did not give.
//!
//! Nothing here verifies the signature.

use std::sync::LazyLock;

use regex::Regex;

use super::locator::Locator;
use super::namespaces::ns;
use super::tree::Node;
use crate::core::{DigitalSignature, SignatureSource};

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        #[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).expect("valid regex"));
    };
}

pattern!(SIGNATURE_OPEN, r"<ds:Signature[\s>/]");
pattern!(SIGNATURE_ID, r#"<ds:Signature\s[^>]*\bId="([^"]*)""#);
pattern!(
    SIGNATURE_VALUE,
    r"<ds:SignatureValue[^>]*>([^<]+)</ds:SignatureValue>"
);
pattern!(
    SUBJECT_NAME,
    r"<ds:X509SubjectName>([^<]+)</ds:X509SubjectName>"
);
pattern!(
    SERIAL_NUMBER,
    r"<ds:X509SerialNumber>([^<]+)</ds:X509SerialNumber>"
);
pattern!(SIGNING_TIME, r"<xades:SigningTime>([^<]+)</xades:SigningTime>");
pattern!(
    SIGNATURE_METHOD,
    r#"<ds:SignatureMethod[^>]*Algorithm="([^"]*)""#
);
pattern!(DIGEST_VALUE, r"<ds:DigestValue>([^<]+)</ds:DigestValue>");

/// Signature metadata for a parsed document.
///
/// Reads the `ds:Signature` subtree first and completes missing fields from
/// [`scan_text`]. Returns `None` when neither finds a signature.
pub fn extract_signature(
    root: Node<'_>,
    locator: &Locator,
    raw: &str,
) -> Option<DigitalSignature> {
    let structured = from_tree(root, locator);

    let needs_scan = structured.as_ref().is_none_or(has_gaps);
    let scanned = if needs_scan { scan_text(raw) } else { None };

    let signature = match (structured, scanned) {
        (Some(mut sig), Some(text)) => {
            if fill_gaps(&mut sig, text) {
                sig.source = SignatureSource::Mixed;
            }
            Some(sig)
        }
        (Some(sig), None) => Some(sig),
        (None, text) => text,
    };

    if let Some(sig) = &signature {
        tracing::debug!(
            source = ?sig.source,
            digests = sig.digest_values.len(),
            "signature metadata extracted"
        );
    }
    signature
}

/// Read the first XML-DSig `Signature` element under `root` as a subtree.
///
/// Digest values are every `ds:DigestValue` inside it in document order: the
/// signed references first, then the XAdES certificate digest.
pub fn from_tree(root: Node<'_>, locator: &Locator) -> Option<DigitalSignature> {
    let signature = locator.locate_in(root, ns::DS, "Signature")?;

    let text_of = |namespace: &str, name: &str| {
        locator
            .locate_in(signature, namespace, name)
            .and_then(|n| n.text())
            .map(str::to_string)
    };

    let digest_values = signature
        .descendants()
        .filter(|n| n.is(ns::DS, "DigestValue"))
        .filter_map(|n| n.text())
        .map(str::to_string)
        .collect();

    Some(DigitalSignature {
        signature_id: signature.attribute("Id").map(str::to_string),
        signature_value: text_of(ns::DS, "SignatureValue"),
        certificate_subject: text_of(ns::DS, "X509SubjectName"),
        certificate_serial: text_of(ns::DS, "X509SerialNumber"),
        signing_time: text_of(ns::XADES, "SigningTime"),
        algorithm: locator
            .locate_in(signature, ns::DS, "SignatureMethod")
            .and_then(|n| n.attribute("Algorithm"))
            .map(str::to_string),
        digest_values,
        source: SignatureSource::Structured,
    })
}

/// Recover signature metadata from raw document text.
///
/// Patterns are case-sensitive and expect the `ds:` and `xades:` prefixes.
/// Each field is independent; digest values are every `ds:DigestValue` in
/// text order. Returns `None` when the text has no `<ds:Signature` element.
pub fn scan_text(raw: &str) -> Option<DigitalSignature> {
    if !SIGNATURE_OPEN.is_match(raw) {
        return None;
    }

    let first = |re: &Regex| {
        re.captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    Some(DigitalSignature {
        signature_id: first(&SIGNATURE_ID),
        signature_value: first(&SIGNATURE_VALUE),
        certificate_subject: first(&SUBJECT_NAME),
        certificate_serial: first(&SERIAL_NUMBER),
        signing_time: first(&SIGNING_TIME),
        algorithm: first(&SIGNATURE_METHOD),
        digest_values: DIGEST_VALUE
            .captures_iter(raw)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect(),
        source: SignatureSource::TextPattern,
    })
}

fn has_gaps(sig: &DigitalSignature) -> bool {
    sig.signature_id.is_none()
        || sig.signature_value.is_none()
        || sig.certificate_subject.is_none()
        || sig.certificate_serial.is_none()
        || sig.signing_time.is_none()
        || sig.algorithm.is_none()
        || sig.digest_values.is_empty()
}

/// Copy fields missing from `sig` out of `text`. Returns true if any was copied.
fn fill_gaps(sig: &mut DigitalSignature, text: DigitalSignature) -> bool {
    fn fill(slot: &mut Option<String>, value: Option<String>, filled: &mut bool) {
        if slot.is_none() && value.is_some() {
            *slot = value;
            *filled = true;
        }
    }

    let mut filled = false;
    fill(&mut sig.signature_id, text.signature_id, &mut filled);
    fill(&mut sig.signature_value, text.signature_value, &mut filled);
    fill(
        &mut sig.certificate_subject,
        text.certificate_subject,
        &mut filled,
    );
    fill(
        &mut sig.certificate_serial,
        text.certificate_serial,
        &mut filled,
    );
    fill(&mut sig.signing_time, text.signing_time, &mut filled);
    fill(&mut sig.algorithm, text.algorithm, &mut filled);
    if sig.digest_values.is_empty() && !text.digest_values.is_empty() {
        sig.digest_values = text.digest_values;
        filled = true;
    }
    filled
}
