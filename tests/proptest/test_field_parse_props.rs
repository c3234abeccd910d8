//! Property-based tests for element field parsing
//!
//! These tests use proptest to vary spacing, chunking and values, and
//! verify that labeled fields are located and converted the same way.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::time::Duration;

use horizons_expect::horizons::parse_blocks;
use horizons_expect::horizons::record::parse_value;
use horizons_expect::horizons::Protocol;
use horizons_expect::Expecter;
use proptest::prelude::*;
use test_utils::*;

const TIMEOUT: Duration = Duration::from_millis(200);

fn ec_pattern() -> &'static horizons_expect::Pattern {
    &Protocol::shared().unwrap().fields()[0].1
}

proptest! {
    #[test]
    fn test_ec_value_under_whitespace_variants(
        before in "[ \t]{0,3}",
        after in "[ \t]{0,3}",
        terminator in prop::sample::select(vec![" ", "\t", "\r\n", "\n"]),
    ) {
        let text = format!(" EC{}={}1.234E-01{}QR= 1.0E+00 ", before, after, terminator);
        let found = tokio_test::block_on(async {
            let mut expecter = Expecter::new(MockTransport::new().with_output(&text));
            expecter.expect(ec_pattern(), TIMEOUT).await
        });

        let found = found.unwrap();
        let value = parse_value("EC", found.capture(0).unwrap()).unwrap();
        prop_assert_eq!(value, 0.1234);
    }

    #[test]
    fn test_finite_values_survive_scientific_notation(value in -1.0e12f64..1.0e12f64) {
        let printed = format!("{:.15E}", value);
        let parsed = parse_value("QR", &printed).unwrap();
        prop_assert!((parsed - value).abs() <= value.abs() * 1e-14);
    }

    #[test]
    fn test_non_numeric_text_is_never_a_value(raw in "[a-zA-DF-Z ]{0,12}") {
        prop_assert!(parse_value("N", &raw).is_err());
    }

    #[test]
    fn test_chunk_size_does_not_change_records(chunk in 1usize..64, count in 0usize..4) {
        let text = format!("{}$$EOE\r\n", element_blocks(count));
        let records = tokio_test::block_on(async {
            let transport = MockTransport::new().with_chunked_output(text.as_bytes(), chunk);
            let mut expecter = Expecter::new(transport);
            parse_blocks(&mut expecter, Protocol::shared().unwrap(), TIMEOUT).await
        });

        let records = records.unwrap();
        prop_assert_eq!(records.len(), count);
        for (i, record) in records.iter().enumerate() {
            prop_assert_eq!(record.julian_date, 2456171.5 + i as f64);
            prop_assert_eq!(record.eccentricity, 1.000005727177419);
        }
    }
}
