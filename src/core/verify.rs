use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::types::*;

/// Largest difference accepted between a recomputed and a stated amount on
/// per-rate computations, where producers round at different points.
const ROUNDING_TOLERANCE: Decimal = dec!(0.01);

/// Check the arithmetic of an extracted invoice.
///
/// Amounts are re-read from their decimal strings with [`rust_decimal`]; no
/// binary floating point is involved. Checks whose inputs are missing are
/// skipped, unparseable amounts are reported. A computation that leaves the
/// range of [`Decimal`] is reported against the field it would have checked
/// and that check is skipped. Returns all findings.
pub fn verify_totals(invoice: &InvoiceDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Running sum of line amounts; None once any line lacks a usable amount.
    let mut line_sum = Some(Decimal::ZERO);

    for (i, line) in invoice.invoice_lines.iter().enumerate() {
        let prefix = format!("invoice_lines[{i}]");
        let line_amount = verify_line(line, &prefix, &mut errors);
        line_sum = match (line_sum, line_amount) {
            (Some(sum), Some(amount)) => computed(
                sum.checked_add(amount),
                "monetary_total.line_extension",
                &mut errors,
            ),
            _ => None,
        };
    }

    verify_subtotal(&invoice.tax_total, "tax_total", &mut errors);

    let totals = &invoice.monetary_total;
    let line_extension = parse_amount(
        totals.line_extension.as_deref(),
        "monetary_total.line_extension",
        &mut errors,
    );
    let tax_exclusive = parse_amount(
        totals.tax_exclusive.as_deref(),
        "monetary_total.tax_exclusive",
        &mut errors,
    );
    let tax_inclusive = parse_amount(
        totals.tax_inclusive.as_deref(),
        "monetary_total.tax_inclusive",
        &mut errors,
    );
    let payable = parse_amount(
        totals.payable.as_deref(),
        "monetary_total.payable",
        &mut errors,
    );
    let allowance = parse_amount(
        Some(&totals.allowance_total),
        "monetary_total.allowance_total",
        &mut errors,
    );
    let charge = parse_amount(
        Some(&totals.charge_total),
        "monetary_total.charge_total",
        &mut errors,
    );
    let prepaid = parse_amount(Some(&totals.prepaid), "monetary_total.prepaid", &mut errors);
    let rounding = parse_amount(
        Some(&totals.payable_rounding),
        "monetary_total.payable_rounding",
        &mut errors,
    );
    let tax_total = parse_amount(
        invoice.tax_total.total_amount.as_deref(),
        "tax_total.total_amount",
        &mut errors,
    );

    // BR-CO-10: Sum of line net amounts
    if !invoice.invoice_lines.is_empty() {
        if let (Some(expected), Some(stated)) = (line_sum, line_extension) {
            if expected != stated {
                errors.push(ValidationError::with_rule(
                    "monetary_total.line_extension",
                    format!(
                        "line extension total {stated} does not match sum of line amounts {expected}"
                    ),
                    "BR-CO-10",
                ));
            }
        }
    }

    // BR-CO-11: tax_exclusive = line_extension - allowances + charges
    if let (Some(net), Some(allowance), Some(charge), Some(stated)) =
        (line_extension, allowance, charge, tax_exclusive)
    {
        let expected = computed(
            net.checked_sub(allowance)
                .and_then(|d| d.checked_add(charge)),
            "monetary_total.tax_exclusive",
            &mut errors,
        );
        if let Some(expected) = expected.filter(|e| *e != stated) {
            errors.push(ValidationError::with_rule(
                "monetary_total.tax_exclusive",
                format!(
                    "tax exclusive amount {stated} does not match {net} - {allowance} + {charge} = {expected}"
                ),
                "BR-CO-11",
            ));
        }
    }

    // BR-CO-15: tax_inclusive = tax_exclusive + tax total
    if let (Some(net), Some(tax), Some(stated)) = (tax_exclusive, tax_total, tax_inclusive) {
        let expected = computed(
            net.checked_add(tax),
            "monetary_total.tax_inclusive",
            &mut errors,
        );
        if expected.is_some_and(|e| e != stated) {
            errors.push(ValidationError::with_rule(
                "monetary_total.tax_inclusive",
                format!("tax inclusive amount {stated} does not match net {net} + tax {tax}"),
                "BR-CO-15",
            ));
        }
    }

    // BR-CO-16: payable = tax_inclusive - prepaid + rounding
    if let (Some(gross), Some(prepaid), Some(rounding), Some(stated)) =
        (tax_inclusive, prepaid, rounding, payable)
    {
        let expected = computed(
            gross
                .checked_sub(prepaid)
                .and_then(|d| d.checked_add(rounding)),
            "monetary_total.payable",
            &mut errors,
        );
        if expected.is_some_and(|e| e != stated) {
            errors.push(ValidationError::with_rule(
                "monetary_total.payable",
                format!(
                    "payable amount {stated} does not match gross {gross} - prepaid {prepaid} + rounding {rounding}"
                ),
                "BR-CO-16",
            ));
        }
    }

    errors
}

/// Verify one line and return its extension amount for the document sum.
fn verify_line(
    line: &InvoiceLine,
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Decimal> {
    let quantity = parse_amount(line.quantity.as_deref(), &format!("{prefix}.quantity"), errors);
    let price = parse_amount(
        line.price.amount.as_deref(),
        &format!("{prefix}.price.amount"),
        errors,
    );
    let amount = parse_amount(
        line.line_extension_amount.as_deref(),
        &format!("{prefix}.line_extension_amount"),
        errors,
    );

    if let (Some(quantity), Some(price), Some(stated)) = (quantity, price, amount) {
        let field = format!("{prefix}.line_extension_amount");
        let expected = computed(
            quantity.checked_mul(price).map(|d| round_half_up(d, 2)),
            &field,
            errors,
        );
        if let Some(expected) = expected.filter(|e| outside_tolerance(*e, stated)) {
            errors.push(ValidationError::new(
                field,
                format!(
                    "line amount {stated} does not match quantity {quantity} x price {price} = {expected}"
                ),
            ));
        }
    }

    verify_subtotal(&line.tax_total, &format!("{prefix}.tax_total"), errors);
    amount
}

/// tax_amount = taxable_amount × percent / 100, rounded half-up to 2 places.
fn verify_subtotal(tax: &TaxSummary, prefix: &str, errors: &mut Vec<ValidationError>) {
    let taxable = parse_amount(
        tax.taxable_amount.as_deref(),
        &format!("{prefix}.taxable_amount"),
        errors,
    );
    let percent = parse_amount(tax.percent.as_deref(), &format!("{prefix}.percent"), errors);
    let stated = parse_amount(
        tax.tax_amount.as_deref(),
        &format!("{prefix}.tax_amount"),
        errors,
    );

    let (Some(taxable), Some(percent), Some(stated)) = (taxable, percent, stated) else {
        return;
    };

    let field = format!("{prefix}.tax_amount");
    let expected = computed(
        taxable
            .checked_mul(percent)
            .and_then(|d| d.checked_div(dec!(100)))
            .map(|d| round_half_up(d, 2)),
        &field,
        errors,
    );
    if let Some(expected) = expected.filter(|e| outside_tolerance(*e, stated)) {
        errors.push(ValidationError::new(
            field,
            format!("tax amount {stated} does not match {taxable} x {percent}% = {expected}"),
        ));
    }
}

fn parse_amount(
    value: Option<&str>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Decimal> {
    let raw = value?.trim();
    match Decimal::from_str(raw) {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(ValidationError::new(
                field,
                format!("'{raw}' is not a decimal amount"),
            ));
            None
        }
    }
}

/// Pass a checked computation through, reporting overflow against `field`.
fn computed(
    value: Option<Decimal>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Decimal> {
    if value.is_none() {
        errors.push(ValidationError::new(
            field,
            "amount out of range: the check overflows the decimal range",
        ));
    }
    value
}

/// A difference too large to represent is outside any tolerance.
fn outside_tolerance(expected: Decimal, stated: Decimal) -> bool {
    expected
        .checked_sub(stated)
        .is_none_or(|d| d.abs() > ROUNDING_TOLERANCE)
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_up_rounding() {
        assert_eq!(round_half_up(dec!(0.125), 2), dec!(0.13));
        assert_eq!(round_half_up(dec!(-0.125), 2), dec!(-0.13));
        assert_eq!(round_half_up(dec!(0.124), 2), dec!(0.12));
    }

    #[test]
    fn unparseable_amount_is_reported_once() {
        let mut errors = Vec::new();
        assert!(parse_amount(Some("12,50"), "price.amount", &mut errors).is_none());
        assert!(parse_amount(None, "price.amount", &mut errors).is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "price.amount");
    }

    #[test]
    fn overflowing_product_is_reported_not_panicking() {
        let tax = TaxSummary {
            taxable_amount: Some(Decimal::MAX.to_string()),
            percent: Some("20".into()),
            tax_amount: Some("1.00".into()),
            ..Default::default()
        };
        let mut errors = Vec::new();
        verify_subtotal(&tax, "tax_total", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "tax_total.tax_amount");
        assert!(errors[0].message.contains("out of range"));
    }

    #[test]
    fn unrepresentable_difference_is_outside_tolerance() {
        assert!(outside_tolerance(Decimal::MAX, Decimal::MIN));
        assert!(!outside_tolerance(dec!(6.67), dec!(6.66)));
    }

    #[test]
    fn subtotal_within_tolerance_passes() {
        let tax = TaxSummary {
            taxable_amount: Some("33.33".into()),
            percent: Some("20".into()),
            tax_amount: Some("6.67".into()),
            ..Default::default()
        };
        let mut errors = Vec::new();
        verify_subtotal(&tax, "tax_total", &mut errors);
        assert!(errors.is_empty(), "{errors:?}");
    }
}
