//! Fuzz target for the XML payload reader.
//!
//! Run with: cargo +nightly fuzz run xml_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use z21cfg::format::xml;

fuzz_target!(|data: &[u8]| {
    let outcome = xml::parse(data);
    if outcome.is_fallback() {
        let blocks = &outcome.config().unknown_blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].length, data.len() as u64);
    }
});
