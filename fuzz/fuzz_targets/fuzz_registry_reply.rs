#![no_main]

use libfuzzer_sys::fuzz_target;
use vat_checker::{CheckerConfig, HttpReply, RecordingTransport, VatChecker};

fuzz_target!(|data: &[u8]| {
    let Some((&status, body)) = data.split_first() else {
        return;
    };
    let body = String::from_utf8_lossy(body).into_owned();
    // Arbitrary registry bodies, VIES and SOAP alike must not panic.
    let reply = HttpReply::new(200 + u16::from(status % 4) * 100, body);
    let transport = RecordingTransport::new()
        .route("/check-status", reply.clone())
        .route("/check-vat-number", reply.clone())
        .route("/lookup/", reply.clone())
        .route("/enheter/", reply.clone())
        .route("PublicServices", reply);
    let checker = VatChecker::with_transport(CheckerConfig::default(), transport);
    for id in ["ATU12345678", "GB999999973", "NO923609016", "CHE116281710"] {
        let _ = checker.do_lookup(id);
    }
});
