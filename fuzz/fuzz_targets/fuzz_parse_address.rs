#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (cc, text) = data.split_at(2);
    if let (Ok(cc), Ok(text)) = (std::str::from_utf8(cc), std::str::from_utf8(text)) {
        // Parse → render → parse must not panic at any step.
        let first = vat_checker::vat::parse_address(text, cc);
        let rendered = [first.street, first.postal_code, first.city]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n");
        let _ = vat_checker::vat::parse_address(&rendered, cc);
    }
});
