//! Property-based tests using proptest.
//!
//! These tests check the fallback guarantees: input that cannot be parsed
//! structurally is kept whole in exactly one unknown block.

mod common;

use proptest::prelude::*;
use z21cfg::format::xml;
use z21cfg::read::parse_bytes;
use z21cfg::{FallbackReason, FunctionInfo, Locomotive};

/// Byte sequences that cannot be a ZIP archive: they never contain an
/// end-of-central-directory signature.
fn non_zip_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..2048)
        .prop_filter("must not contain an EOCD signature", |data| {
            !data.windows(4).any(|w| w == b"PK\x05\x06")
        })
}

/// XML text with an element left open, so it is never well-formed.
fn unclosed_xml() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", "[ a-zA-Z0-9äöüß.,;-]{0,64}", "[a-z]{1,8}")
        .prop_map(|(outer, text, inner)| format!("<{outer}><{inner}>{text}</{inner}>"))
}

proptest! {
    /// Non-ZIP input becomes exactly one block covering the whole input.
    #[test]
    fn non_zip_input_is_one_block(data in non_zip_bytes()) {
        let outcome = parse_bytes(&data).unwrap();
        prop_assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::NotZip));

        let config = outcome.config();
        prop_assert!(config.locomotives.is_empty());
        prop_assert_eq!(config.unknown_blocks.len(), 1);
        prop_assert_eq!(config.unknown_blocks[0].offset, 0);
        prop_assert_eq!(config.unknown_blocks[0].length, data.len() as u64);
        prop_assert_eq!(&config.unknown_blocks[0].data, &data);
    }

    /// A malformed XML payload is kept with its encoded length.
    #[test]
    fn malformed_xml_is_one_block(text in unclosed_xml()) {
        let outcome = xml::parse(text.as_bytes());
        prop_assert!(matches!(
            outcome.fallback_reason(),
            Some(FallbackReason::MalformedXml(_))
        ));

        let config = outcome.config();
        prop_assert!(config.locomotives.is_empty());
        prop_assert_eq!(config.unknown_blocks.len(), 1);
        prop_assert_eq!(config.unknown_blocks[0].length, text.len() as u64);
    }

    /// Function numbers above 127 are always rejected.
    #[test]
    fn function_number_range(number in any::<u8>()) {
        let result = FunctionInfo::new(number);
        prop_assert_eq!(result.is_ok(), number <= 127);
    }

    /// The boolean function view always has the same keys as the details.
    #[test]
    fn function_views_agree(numbers in proptest::collection::btree_set(0u8..=127, 0..16)) {
        let mut loco = Locomotive::new(3, "Loco");
        for number in &numbers {
            loco.insert_function(FunctionInfo::new(*number).unwrap()).unwrap();
        }
        let keys: Vec<_> = loco.functions().into_keys().collect();
        let detail_keys: Vec<_> = loco.function_details().keys().copied().collect();
        prop_assert_eq!(&keys, &detail_keys);
        prop_assert_eq!(keys.len(), numbers.len());
    }
}

mod containers {
    use super::*;

    proptest! {
        // Each case builds a real archive; a few cases are enough.
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// The same holds when the malformed XML sits inside a container.
        #[test]
        fn malformed_xml_in_container(text in unclosed_xml()) {
            let bytes = common::xml_container(&text);
            let outcome = parse_bytes(&bytes).unwrap();
            prop_assert!(outcome.is_fallback());
            prop_assert_eq!(
                outcome.config().unknown_blocks[0].length,
                text.len() as u64
            );
        }
    }
}
