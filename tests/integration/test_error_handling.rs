//! Integration Tests for Error Handling
//!
//! These tests verify that every way a session can fail surfaces as one
//! typed error, and that the quit command is still attempted exactly once.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use horizons_expect::config::SessionConfig;
use horizons_expect::{Error, Session};
use test_utils::*;

fn fast_config() -> SessionConfig {
    SessionConfig::uniform(150)
}

/// First block with `label` and its value removed
fn block_without(label: &str) -> String {
    let block = element_block(2456171.5);
    let start = block.find(&format!("{}=", label)).unwrap();
    let value_end = start
        + block[start..]
            .find(|c: char| c.is_ascii_digit())
            .unwrap();
    let end = value_end
        + block[value_end..]
            .find(char::is_whitespace)
            .unwrap();
    format!("{}{}", &block[..start], &block[end..])
}

#[tokio::test]
async fn test_missing_field_times_out_naming_the_field() {
    let request = create_test_request();
    let blocks = format!("{}{}", block_without("QR"), element_block(2456172.5));
    let transport = dialogue_with_data(&request, LookupReply::Confirm, &data_region(&blocks));
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.timed_out_at(), Some("QR"));
    assert_eq!(handle.count_sent("Q"), 1);
}

#[tokio::test]
async fn test_missing_field_in_last_block_fails_before_deadline() {
    let request = create_test_request();
    let transport = dialogue_with_data(
        &request,
        LookupReply::Resolved,
        &data_region(&block_without("PR")),
    );

    // the end marker proves PR will never come, so the long deadline is not waited out
    let started = std::time::Instant::now();
    let err = Session::new(transport, SessionConfig::uniform(10_000))
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    assert_eq!(err.timed_out_at(), Some("PR"));
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[tokio::test]
async fn test_stream_closed_mid_dialogue() {
    let request = create_test_request();
    let transport = MockTransport::new()
        .with_output(BANNER)
        .on_send("P", "P\r\nConnection closed by foreign host.\r\n")
        .close_when_drained();
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TransportFailure { .. }), "{:?}", err);
    assert_eq!(handle.sent(), vec!["P", "Q"]);
}

#[tokio::test]
async fn test_stream_closed_inside_data_region() {
    let request = create_test_request();
    let truncated = format!("y\r\n{}{}", DATA_PREAMBLE, element_block(2456171.5));
    let transport =
        dialogue_with_data(&request, LookupReply::Confirm, &truncated).close_when_drained();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    // one complete record was read, but a failed session returns no records
    assert!(matches!(err, Error::TransportFailure { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_malformed_value_fails_session() {
    let request = create_test_request();
    let mut values = SAMPLE_VALUES;
    values[2] = "6.23.34E+01";
    let blocks = element_block_with(2456171.5, &values);
    let transport = dialogue_with_data(&request, LookupReply::Confirm, &data_region(&blocks));
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    match err {
        Error::MalformedRecord { field, value } => {
            assert_eq!(field, "IN");
            assert_eq!(value, "6.23.34E+01");
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
    assert_eq!(handle.count_sent("Q"), 1);
}

#[tokio::test]
async fn test_silent_service_times_out_in_banner_state() {
    let request = create_test_request();
    let transport = MockTransport::new().with_output("Trying 128.149.23.134...\r\n");
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    assert_eq!(err.timed_out_at(), Some("AwaitBanner"));
    assert_eq!(handle.sent(), vec!["Q"]);
}

#[tokio::test]
async fn test_missing_menu_after_data_times_out() {
    let request = create_test_request();
    let data = format!("y\r\n{}{}$$EOE\r\n", DATA_PREAMBLE, element_blocks(1));
    let transport = dialogue_with_data(&request, LookupReply::Confirm, &data);
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    assert_eq!(err.timed_out_at(), Some("AwaitMenuReturn"));
    assert_eq!(handle.count_sent("Q"), 1);
}

#[tokio::test]
async fn test_failed_quit_does_not_mask_result() {
    let request = create_test_request();
    let transport = MockTransport::new()
        .with_output("Trying 128.149.23.134...\r\n")
        .failing_sends();
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    // the timeout is reported, not the failed quit
    assert_eq!(err.timed_out_at(), Some("AwaitBanner"));
    assert_eq!(handle.sent(), vec!["Q"]);
}

#[tokio::test]
async fn test_send_failure_is_transport_failure() {
    let request = create_test_request();
    let transport = MockTransport::new().with_output(BANNER).failing_sends();
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TransportFailure { .. }), "{:?}", err);
    // `P` failed, then the single quit attempt
    assert_eq!(handle.sent(), vec!["P", "Q"]);
}

#[tokio::test]
async fn test_invalid_request_sends_only_quit() {
    let request = create_test_request().with_interval("1d\nQ");
    let transport = MockTransport::new().with_output(BANNER);
    let handle = transport.handle();

    let err = Session::new(transport, fast_config())
        .unwrap()
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidRequest { .. }), "{:?}", err);
    assert_eq!(handle.sent(), vec!["Q"]);
    assert_eq!(handle.count_sent("Q"), 1);
}
