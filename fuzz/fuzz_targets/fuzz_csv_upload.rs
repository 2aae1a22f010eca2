#![no_main]

use ecgscope::detector::detect;
use ecgscope::signal::parse_csv_bytes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must parse or fail with an error, never panic
    if let Ok(trace) = parse_csv_bytes(data) {
        assert_eq!(trace.time().len(), trace.voltage().len());

        let anomalies = detect(trace.voltage());
        assert!(anomalies.iter().all(|a| a.index < trace.len()));
    }
});
