use thiserror::Error;

/// Errors that can occur while reading or extracting an invoice document.
///
/// Absent fields are never errors: they surface as `None` or as the documented
/// default in the model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EFaturaError {
    /// The input is not well-formed XML.
    #[error("document parse error at byte {position}: {message}")]
    DocumentParse {
        /// Byte offset reported by the reader when the failure was detected.
        position: u64,
        message: String,
    },

    /// Reading the document from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A namespace registry is unusable (blank or duplicate URIs).
    #[error("configuration error: {0}")]
    Config(String),
}

impl EFaturaError {
    #[cfg_attr(not(feature = "ubltr"), allow(dead_code))]
    pub(crate) fn parse(position: u64, message: impl Into<String>) -> Self {
        Self::DocumentParse {
            position,
            message: message.into(),
        }
    }

    /// True for [`EFaturaError::DocumentParse`].
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::DocumentParse { .. })
    }
}

/// One arithmetic finding from [`verify_totals`](crate::core::verify_totals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Model path of the amount that disagrees, e.g.
    /// `invoice_lines[1].tax_total.tax_amount` or `monetary_total.payable`.
    pub field: String,
    /// Stated and computed amounts, or why the check could not run.
    pub message: String,
    /// Document total rule the finding breaks (`BR-CO-10`, `-11`, `-15` or
    /// `-16`); `None` for line, subtotal and out-of-range findings.
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// A line, subtotal or out-of-range finding.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// A finding against one of the `BR-CO` document total rules.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_rule_when_present() {
        let e = ValidationError::with_rule("monetary_total.payable", "mismatch", "BR-CO-16");
        assert_eq!(e.to_string(), "[BR-CO-16] monetary_total.payable: mismatch");
        let e = ValidationError::new("invoice_lines[0].quantity", "not a decimal");
        assert_eq!(e.to_string(), "invoice_lines[0].quantity: not a decimal");
    }

    #[test]
    fn parse_error_message_carries_position() {
        let e = EFaturaError::parse(42, "unexpected end of document");
        assert!(e.is_parse_error());
        assert_eq!(
            e.to_string(),
            "document parse error at byte 42: unexpected end of document"
        );
    }
}
