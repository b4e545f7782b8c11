//! Integration tests for streamed generation.

use futures::StreamExt;
use longform_completion::mocks::{MockRound, MockTransport};
use longform_completion::{
    ContinuationConfig, ContinuationDriver, ContinuationError, ContinuationResult, Conversation,
    FilterMode, CONTINUATION_DIRECTIVE,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn driver(transport: Arc<MockTransport>, filter: FilterMode) -> ContinuationDriver {
    let config = ContinuationConfig::builder()
        .model("gpt-4o")
        .max_tokens_per_round(300)
        .streaming(true)
        .filter(filter)
        .build()
        .unwrap();
    ContinuationDriver::new(transport, config)
}

async fn collect_ok(stream: impl futures::Stream<Item = ContinuationResult<String>>) -> Vec<String> {
    stream.map(|item| item.unwrap()).collect().await
}

#[tokio::test]
async fn test_streams_every_round_in_order() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([
        MockRound::chunks(["Quantum ", "computing ", "uses "]),
        MockRound::chunks(["", "qubits", "."]),
        MockRound::chunks([" Done.", "‡‡", "‡‡‡"]),
    ]));
    let driver = driver(Arc::clone(&transport), FilterMode::Auto);

    // Act
    let out = collect_ok(driver.stream(Conversation::new("sys", "Explain quantum computing.")).unwrap()).await;

    // Assert
    assert_eq!(out.concat(), "Quantum computing uses qubits. Done.");
    assert!(out.iter().all(|chunk| !chunk.is_empty()));
    assert_eq!(transport.request_count(), 3);

    let requests = transport.requests();
    assert!(requests.iter().all(|r| r.is_streaming()));
    assert_eq!(requests[2].messages[1].content().matches(CONTINUATION_DIRECTIVE).count(), 2);
    assert!(requests[2].messages[1]
        .content()
        .contains("\nAssistant:qubits.\nUser:"));
}

#[tokio::test]
async fn test_consumer_sees_round_one_before_failure() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([
        MockRound::chunks(["round ", "one "]),
        MockRound::fail("upstream closed"),
    ]));
    let driver = driver(Arc::clone(&transport), FilterMode::Auto);

    // Act
    let items: Vec<ContinuationResult<String>> = driver
        .stream_raw(Conversation::new("sys", "Q"))
        .collect()
        .await;

    // Assert
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_deref().unwrap(), "round ");
    assert_eq!(items[1].as_deref().unwrap(), "one ");
    assert!(matches!(
        items[2],
        Err(ContinuationError::Transport { round: 2, .. })
    ));
}

#[tokio::test]
async fn test_mid_stream_failure_ends_stream() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([MockRound::ChunksThenFail(
        vec!["partial".to_string()],
        "stream reset".to_string(),
    )]));
    let driver = driver(Arc::clone(&transport), FilterMode::Auto);

    // Act
    let mut stream = driver.stream(Conversation::new("sys", "Q")).unwrap();
    let first = stream.next().await;
    let second = stream.next().await;
    let third = stream.next().await;

    // Assert
    assert_eq!(first.unwrap().unwrap(), "partial");
    let error = second.unwrap().unwrap_err();
    assert_eq!(error.round(), Some(1));
    assert_eq!(error.as_transport().map(|e| e.message()), Some("stream reset"));
    assert!(third.is_none());
}

#[tokio::test]
async fn test_false_alarm_run_is_flushed() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([MockRound::chunks([
        "a", "‡‡", "‡", "X", "b‡‡‡‡‡",
    ])]));
    let driver = driver(Arc::clone(&transport), FilterMode::RunLength);

    // Act
    let out = collect_ok(driver.stream(Conversation::new("sys", "Q")).unwrap()).await;

    // Assert
    assert_eq!(out, vec!["a", "‡‡‡X", "b"]);
}

#[tokio::test]
async fn test_nothing_after_marker_is_shown() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([MockRound::chunks([
        "‡‡‡", "‡‡", "tail",
    ])]));
    let driver = driver(Arc::clone(&transport), FilterMode::RunLength);

    // Act
    let out = collect_ok(driver.stream(Conversation::new("sys", "Q")).unwrap()).await;

    // Assert
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_filter_stops_on_marker_split_across_rounds() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([
        MockRound::chunks(["first", "‡‡‡"]),
        MockRound::chunks(["‡‡", "second"]),
        MockRound::chunks(["third‡‡‡‡‡"]),
    ]));
    let driver = driver(Arc::clone(&transport), FilterMode::Auto);

    // Act
    let out = collect_ok(driver.stream(Conversation::new("sys", "Q")).unwrap()).await;

    // Assert
    assert_eq!(out.concat(), "first");
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_raw_stream_keeps_going_when_marker_split_across_rounds() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([
        MockRound::chunks(["first", "‡‡‡"]),
        MockRound::chunks(["‡‡", "second"]),
        MockRound::chunks(["third‡‡‡‡‡"]),
    ]));
    let driver = driver(Arc::clone(&transport), FilterMode::Auto);

    // Act
    let out = collect_ok(driver.stream_raw(Conversation::new("sys", "Q"))).await;

    // Assert
    assert_eq!(out.concat(), "first‡‡‡‡‡secondthird‡‡‡‡‡");
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_lookback_filter_with_multi_character_marker() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([
        MockRound::chunks(["The answer <", "is <<", "EN"]),
        MockRound::chunks(["D>> trailing"]),
    ]));
    let config = ContinuationConfig::builder()
        .model("gpt-4o")
        .max_tokens_per_round(300)
        .streaming(true)
        .stop_marker("<<END>>")
        .build()
        .unwrap();
    let driver = ContinuationDriver::new(transport.clone(), config);

    // Act
    let out = collect_ok(driver.stream(Conversation::new("sys", "Q")).unwrap()).await;

    // Assert
    assert_eq!(out.concat(), "The answer <is ");
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_dropping_stream_stops_requests() {
    // Arrange
    let transport = Arc::new(MockTransport::with_rounds([
        MockRound::chunks(["one"]),
        MockRound::chunks(["two‡‡‡‡‡"]),
    ]));
    let driver = driver(Arc::clone(&transport), FilterMode::Auto);

    // Act
    let mut stream = driver.stream_raw(Conversation::new("sys", "Q"));
    let first = stream.next().await.unwrap().unwrap();
    drop(stream);

    // Assert
    assert_eq!(first, "one");
    assert_eq!(transport.request_count(), 1);
}
