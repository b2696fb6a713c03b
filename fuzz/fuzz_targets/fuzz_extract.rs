#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic. A parse failure must come with the empty model.
        let extraction = efatura::ubltr::extract(s);
        if extraction.error.is_some() {
            assert_eq!(extraction.invoice, efatura::core::InvoiceDocument::default());
        } else {
            let _ = efatura::core::verify_totals(&extraction.invoice);
        }
    }
});
