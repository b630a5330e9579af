//! Fuzz target: report payload building
//!
//! Interprets the input as raw big-endian `f32` measurement words (NaN,
//! infinities and subnormals included) and builds the outbound payload.
//!
//! Invariants checked:
//! - Serialisation never fails for any sensor output
//! - The payload is always a one-element JSON array
//! - Truncated masses are integers
//!
//! cargo fuzz run fuzz_report_payload

#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use pmreporter::app::reading::Reading;
use pmreporter::app::report::build_payload;
use pmreporter::config::Config;

fuzz_target!(|data: &[u8]| {
    let mut words = [0f32; 10];
    for (word, chunk) in words.iter_mut().zip(data.chunks_exact(4)) {
        *word = f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    let reading = Reading::from_words(words);

    let config = Config::from_lookup(|key| {
        Some(
            match key {
                "URL" => "http://127.0.0.1/api/v1/measurements",
                "API_KEY" => "k",
                "SENSOR" => "SPS30",
                "SOURCE" => "fuzz",
                "DESCRIPTION" => "fuzz",
                "LAT" => "-25.3",
                "LON" => "-57.5",
                "SLEEP" => "5",
                _ => return None,
            }
            .to_string(),
        )
    })
    .expect("static config");

    let body = build_payload(&reading, &config, Utc::now()).expect("payload must serialise");
    let value: serde_json::Value = serde_json::from_str(&body).expect("payload is JSON");
    let records = value.as_array().expect("payload is an array");
    assert_eq!(records.len(), 1);
    for field in ["pm1dot0", "pm2dot5", "pm10"] {
        assert!(records[0][field].is_i64(), "{field} must be an integer");
    }
});
