//! Fuzz target for container parsing with arbitrary byte input.
//!
//! Arbitrary bytes are fed through the full read path: ZIP detection,
//! payload lookup and the XML or SQLite reader. Parsing may return an
//! error but must never panic, and a fallback must hold the whole input.
//!
//! Run with: cargo +nightly fuzz run container_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use z21cfg::read::{ParseOptions, parse_reader};

fuzz_target!(|data: &[u8]| {
    let options = ParseOptions::new().max_payload_size(1 << 20);
    let Ok(outcome) = parse_reader(Cursor::new(data), &options) else {
        return;
    };

    if outcome.is_fallback() {
        let blocks = &outcome.config().unknown_blocks;
        assert_eq!(blocks.len(), 1);
    }

    for loco in &outcome.config().locomotives {
        assert_eq!(loco.functions().len(), loco.function_count());
        let _ = loco.sorted_functions();
    }
});
