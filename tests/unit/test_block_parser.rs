//! Unit Tests for the Ephemeris Block Parser
//!
//! Drives [`BlockParser`] directly over an expecter positioned just after
//! the `$$SOE` marker.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::time::Duration;

use futures::StreamExt;
use horizons_expect::horizons::parser::PARSING_STATE;
use horizons_expect::horizons::{parse_blocks, BlockParser, Protocol};
use horizons_expect::{ElementField, Error, Expecter};
use test_utils::*;

const FIELD_TIMEOUT: Duration = Duration::from_millis(150);

fn expecter_with(text: &str) -> Expecter<MockTransport> {
    Expecter::new(MockTransport::new().with_output(text))
}

fn protocol() -> &'static Protocol {
    Protocol::shared().unwrap()
}

#[tokio::test]
async fn test_empty_data_region_is_success() {
    let mut expecter = expecter_with("\r\n$$EOE\r\n");
    let records = parse_blocks(&mut expecter, protocol(), FIELD_TIMEOUT)
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_end_marker_is_consumed() {
    let mut expecter = expecter_with(&format!("{}$$EOE\r\n>>> Select", element_blocks(1)));
    let records = parse_blocks(&mut expecter, protocol(), FIELD_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(expecter.buffered(), "\r\n>>> Select");
}

#[tokio::test]
async fn test_whitespace_variants_around_equals() {
    let block = "2456171.500000000 = A.D. 2012-Sep-01 00:00:00.0000 (CT)\r\n\
EC=1.5E-01\tQR =2.0E+00 IN  =  3.0E+01\r\n\
OM= 4.0E+01 W= 5.0E+01 Tp=2456625.5\r\n\
N =6.0E-01 MA= 7.0E+00 TA =8.0E+00\r\n\
A= 9.0E+00 AD =1.0E+01 PR   =   1.1E+01\r\n$$EOE\r\n";
    let mut expecter = expecter_with(block);

    let records = parse_blocks(&mut expecter, protocol(), FIELD_TIMEOUT)
        .await
        .unwrap();
    let r = &records[0];
    assert_eq!(r.eccentricity, 0.15);
    assert_eq!(r.periapsis_distance, 2.0);
    assert_eq!(r.inclination, 30.0);
    assert_eq!(r.argument_of_periapsis, 50.0);
    assert_eq!(r.periapsis_time, 2456625.5);
    assert_eq!(r.mean_motion, 0.6);
    assert_eq!(r.semi_major_axis, 9.0);
    assert_eq!(r.apoapsis_distance, 10.0);
    assert_eq!(r.orbital_period, 11.0);
}

#[tokio::test]
async fn test_every_field_lands_in_its_slot() {
    let values = [
        "1E+00", "2E+00", "3E+00", "4E+00", "5E+00", "6E+00", "7E+00", "8E+00", "9E+00",
        "1E+01", "1.1E+01", "1.2E+01",
    ];
    let mut expecter =
        expecter_with(&format!("{}$$EOE\r\n", element_block_with(2456171.5, &values)));

    let records = parse_blocks(&mut expecter, protocol(), FIELD_TIMEOUT)
        .await
        .unwrap();
    for (i, field) in ElementField::ALL.iter().enumerate() {
        assert_eq!(records[0].get(*field), (i + 1) as f64, "field {}", field);
    }
}

#[tokio::test]
async fn test_lazy_consumer_sees_records_before_failure() {
    let truncated = element_block(2456172.5).replace("PR=", "XX=");
    let mut expecter = expecter_with(&format!(
        "{}{}$$EOE\r\n",
        element_block(2456171.5),
        truncated
    ));

    let mut parser = BlockParser::new(&mut expecter, protocol(), FIELD_TIMEOUT);
    let first = parser.next_record().await.unwrap().unwrap();
    assert_eq!(first.julian_date, 2456171.5);

    let err = parser.next_record().await.unwrap_err();
    assert_eq!(err.timed_out_at(), Some("PR"));
    assert!(parser.is_finished());
    assert_eq!(parser.emitted(), 1);
    assert!(parser.next_record().await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_end_marker_times_out_in_parsing_state() {
    let mut expecter = expecter_with(&element_blocks(2));
    let err = parse_blocks(&mut expecter, protocol(), FIELD_TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(err.timed_out_at(), Some(PARSING_STATE));
}

#[tokio::test]
async fn test_empty_capture_is_not_a_value() {
    // nothing but blanks between `EC=` and the next label
    let block = element_block(2456171.5).replace("EC= 1.000005727177419E+00", "EC= ");
    let mut expecter = expecter_with(&format!("{}$$EOE\r\n", block));

    let err = parse_blocks(&mut expecter, protocol(), FIELD_TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(err.timed_out_at(), Some("EC"));
}

#[tokio::test]
async fn test_sign_only_value_is_malformed() {
    let mut values = SAMPLE_VALUES;
    values[5] = "+-";
    let mut expecter =
        expecter_with(&format!("{}$$EOE\r\n", element_block_with(2456171.5, &values)));

    let err = parse_blocks(&mut expecter, protocol(), FIELD_TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { ref field, .. } if field == "Tp"));
}

#[tokio::test]
async fn test_stream_view_ends_after_error() {
    let mut expecter = expecter_with("garbage");
    let parser = BlockParser::new(&mut expecter, protocol(), Duration::from_millis(20));

    let items: Vec<_> = parser.into_stream().collect().await;
    assert_eq!(items.len(), 1);
    assert!(items[0].as_ref().unwrap_err().is_timeout());
}
