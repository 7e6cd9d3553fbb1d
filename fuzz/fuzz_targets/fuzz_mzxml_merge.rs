#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

const VALID_LEVEL: &[u8] = br#"<?xml version="1.0"?>
<mzXML><msRun scanCount="1"><scan num="1" msLevel="1"><peaks/></scan></msRun></mzXML>"#;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must be rejected with an error, never a panic
    let _ = lipidconv::merge::count_scans(data);

    // Fuzzed data as the envelope segment
    let segments = vec![Cursor::new(data), Cursor::new(VALID_LEVEL)];
    let _ = lipidconv::merge::merge_mzxml(segments, Vec::new());

    // Fuzzed data as a later segment
    let segments = vec![Cursor::new(VALID_LEVEL), Cursor::new(data)];
    let _ = lipidconv::merge::merge_mzxml(segments, Vec::new());

    let _ = lipidconv::translate::PolarityCounts::from_reader(data);
});
