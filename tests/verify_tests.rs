#![cfg(feature = "core")]

use efatura::core::*;

fn line(qty: &str, price: &str, amount: &str, taxable: &str, percent: &str, tax: &str) -> InvoiceLine {
    InvoiceLine {
        line_number: 1,
        quantity: Some(qty.into()),
        unit_code: Some("C62".into()),
        line_extension_amount: Some(amount.into()),
        price: Price {
            amount: Some(price.into()),
            currency: Some(DEFAULT_CURRENCY.into()),
        },
        tax_total: TaxSummary {
            total_amount: Some(tax.into()),
            taxable_amount: Some(taxable.into()),
            percent: Some(percent.into()),
            tax_amount: Some(tax.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Two lines at 20%: 2 × 10.00 and 1.5 × 100.00.
fn consistent() -> InvoiceDocument {
    InvoiceDocument {
        id: Some("EAR2026000000888".into()),
        tax_total: TaxSummary {
            total_amount: Some("34.00".into()),
            currency: Some("TRY".into()),
            taxable_amount: Some("170.00".into()),
            tax_amount: Some("34.00".into()),
            percent: Some("20".into()),
            ..Default::default()
        },
        monetary_total: MonetaryTotals {
            line_extension: Some("170.00".into()),
            tax_exclusive: Some("170.00".into()),
            tax_inclusive: Some("204.00".into()),
            payable: Some("204.00".into()),
            ..Default::default()
        },
        invoice_lines: vec![
            line("2", "10.00", "20.00", "20.00", "20", "4.00"),
            line("1.5", "100.00", "150.00", "150.00", "20", "30.00"),
        ],
        ..Default::default()
    }
}

fn rules(errors: &[ValidationError]) -> Vec<&str> {
    errors.iter().filter_map(|e| e.rule.as_deref()).collect()
}

#[test]
fn consistent_invoice_has_no_findings() {
    let errors = verify_totals(&consistent());
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn empty_model_has_no_findings() {
    assert!(verify_totals(&InvoiceDocument::default()).is_empty());
}

#[test]
fn line_sum_mismatch_is_br_co_10() {
    let mut inv = consistent();
    inv.invoice_lines[1].line_extension_amount = Some("149.00".into());
    inv.invoice_lines[1].price.amount = Some("99.33".into());
    let errors = verify_totals(&inv);
    assert_eq!(rules(&errors), ["BR-CO-10"]);
    assert_eq!(errors[0].field, "monetary_total.line_extension");
}

#[test]
fn allowance_enters_tax_exclusive() {
    let mut inv = consistent();
    inv.monetary_total.allowance_total = "10.00".into();
    let errors = verify_totals(&inv);
    assert_eq!(rules(&errors), ["BR-CO-11"]);

    inv.monetary_total.tax_exclusive = Some("160.00".into());
    inv.monetary_total.tax_inclusive = Some("194.00".into());
    inv.monetary_total.payable = Some("194.00".into());
    assert!(verify_totals(&inv).is_empty());
}

#[test]
fn tax_inclusive_and_payable_rules() {
    let mut inv = consistent();
    inv.monetary_total.tax_inclusive = Some("205.00".into());
    let errors = verify_totals(&inv);
    assert_eq!(rules(&errors), ["BR-CO-15", "BR-CO-16"]);

    let mut inv = consistent();
    inv.monetary_total.prepaid = "4.00".into();
    inv.monetary_total.payable = Some("200.00".into());
    assert!(verify_totals(&inv).is_empty());

    inv.monetary_total.payable_rounding = "0.01".into();
    assert_eq!(rules(&verify_totals(&inv)), ["BR-CO-16"]);
}

#[test]
fn line_arithmetic_is_checked() {
    let mut inv = consistent();
    inv.invoice_lines[0].quantity = Some("3".into());
    let errors = verify_totals(&inv);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "invoice_lines[0].line_extension_amount");
    assert!(errors[0].rule.is_none());
}

#[test]
fn wrong_rate_is_reported_on_the_subtotal() {
    let mut inv = consistent();
    inv.invoice_lines[1].tax_total.percent = Some("10".into());
    let errors = verify_totals(&inv);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "invoice_lines[1].tax_total.tax_amount");
}

#[test]
fn one_cent_rounding_differences_are_tolerated() {
    let mut inv = consistent();
    inv.invoice_lines[0] = line("3", "3.33", "10.00", "10.00", "20", "2.00");
    inv.invoice_lines[1] = line("1", "160.00", "160.00", "160.00", "20", "32.00");
    assert!(verify_totals(&inv).is_empty(), "{:?}", verify_totals(&inv));
}

#[test]
fn non_decimal_amounts_are_reported() {
    let mut inv = consistent();
    inv.monetary_total.payable = Some("204,00".into());
    let errors = verify_totals(&inv);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "monetary_total.payable");
    assert!(errors[0].to_string().contains("204,00"));
}

#[test]
fn missing_amounts_skip_their_checks() {
    let mut inv = consistent();
    inv.monetary_total.tax_exclusive = None;
    inv.invoice_lines[0].price.amount = None;
    assert!(verify_totals(&inv).is_empty());
}

// ---------------------------------------------------------------------------
// Out-of-range amounts
// ---------------------------------------------------------------------------

const HUGE: &str = "99999999999999999999";

#[test]
fn overflowing_line_product_is_reported() {
    let mut inv = consistent();
    inv.invoice_lines[0].quantity = Some(HUGE.into());
    inv.invoice_lines[0].price.amount = Some(HUGE.into());
    let errors = verify_totals(&inv);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].field, "invoice_lines[0].line_extension_amount");
    assert!(errors[0].message.contains("out of range"));
}

#[test]
fn overflowing_line_sum_skips_br_co_10() {
    let max = rust_decimal::Decimal::MAX.to_string();
    let mut inv = consistent();
    for line in &mut inv.invoice_lines {
        line.quantity = None;
        line.line_extension_amount = Some(max.clone());
    }
    let errors = verify_totals(&inv);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].field, "monetary_total.line_extension");
    assert!(errors[0].rule.is_none());
}

#[test]
fn overflowing_document_totals_are_reported_per_rule() {
    let max = rust_decimal::Decimal::MAX.to_string();
    let mut inv = consistent();
    inv.invoice_lines.clear();
    inv.tax_total.taxable_amount = None;
    inv.monetary_total.line_extension = Some(max.clone());
    inv.monetary_total.charge_total = "1".into();
    inv.monetary_total.tax_exclusive = Some(max.clone());
    inv.monetary_total.tax_inclusive = Some(max.clone());
    inv.monetary_total.payable = Some(max.clone());
    inv.monetary_total.payable_rounding = "1".into();

    let errors = verify_totals(&inv);
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        [
            "monetary_total.tax_exclusive",
            "monetary_total.tax_inclusive",
            "monetary_total.payable"
        ]
    );
    assert!(errors.iter().all(|e| e.message.contains("out of range")));
}

#[test]
fn extreme_amounts_never_panic() {
    let max = rust_decimal::Decimal::MAX.to_string();
    let min = rust_decimal::Decimal::MIN.to_string();
    let tiny = "0.0000000000000000000000000001".to_string();
    for (a, b) in [(&max, &max), (&max, &min), (&min, &min), (&max, &tiny)] {
        let inv = InvoiceDocument {
            tax_total: TaxSummary {
                total_amount: Some(a.clone()),
                taxable_amount: Some(a.clone()),
                percent: Some(b.clone()),
                tax_amount: Some(b.clone()),
                ..Default::default()
            },
            monetary_total: MonetaryTotals {
                line_extension: Some(a.clone()),
                tax_exclusive: Some(b.clone()),
                tax_inclusive: Some(a.clone()),
                payable: Some(b.clone()),
                allowance_total: b.clone(),
                charge_total: a.clone(),
                prepaid: b.clone(),
                payable_rounding: a.clone(),
            },
            invoice_lines: vec![line(a, b, a, a, b, b), line(b, a, a, b, a, a)],
            ..Default::default()
        };
        let _ = verify_totals(&inv);
    }
}
