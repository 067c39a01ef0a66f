//! Behaviour tests for the message router and the VES collector.

use std::sync::Arc;
use std::time::Duration;

use ferronap_core::{
    DmaapClient, FetchOptions, HttpError, TopicConsumer, TopicName, VesClient, VesDomain,
    VesEvent,
};
use ferronap_tests::*;

fn topic() -> TopicName {
    TopicName::parse("unauthenticated.SEC_FAULT_OUTPUT").expect("valid topic")
}

fn dmaap(scripted: &Arc<ScriptedHttpClient>) -> DmaapClient {
    DmaapClient::new(scripted.clone(), &Settings::default())
}

// =============================================================================
// Topic consumer
// =============================================================================

#[tokio::test]
async fn when_consumer_runs_messages_arrive_in_fetch_order() {
    // Given: A topic delivering three batches, then nothing
    let scripted = Arc::new(
        ScriptedHttpClient::new()
            .on(HttpMethod::Get, "/events/", HttpResponse::ok_json(r#"["1","2"]"#))
            .on(HttpMethod::Get, "/events/", HttpResponse::ok_json(r#"["3"]"#))
            .on(HttpMethod::Get, "/events/", HttpResponse::ok_json(r#"["4","5"]"#))
            .on(HttpMethod::Get, "/events/", HttpResponse::ok_json("[]")),
    );

    // When: The topic is consumed for a short while
    let messages = TopicConsumer::new(dmaap(&scripted), topic(), "grp", "c1")
        .expect("valid consumer")
        .with_idle_pause(Duration::from_millis(5))
        .consume_for(Duration::from_millis(60))
        .await
        .expect("consume");

    // Then: Every message is returned once, in order
    assert_eq!(messages, vec!["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn when_consumer_is_stopped_no_further_fetch_is_issued() {
    // Given: A running consumer on an idle topic
    let scripted = Arc::new(ScriptedHttpClient::new().on(
        HttpMethod::Get,
        "/events/",
        HttpResponse::ok_json("[]"),
    ));
    let handle = TopicConsumer::new(dmaap(&scripted), topic(), "grp", "c1")
        .expect("valid consumer")
        .with_idle_pause(Duration::from_millis(5))
        .with_fetch_options(FetchOptions {
            timeout_ms: 100,
            limit: 10,
        })
        .start();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // When: It is stopped
    let drained = handle.stop().await.expect("stop");
    let fetches = scripted.request_count();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Then: The worker has exited and stays quiet
    assert!(drained.is_empty());
    assert!(fetches >= 1);
    assert_eq!(scripted.request_count(), fetches);
}

#[tokio::test]
async fn when_router_is_unreachable_the_consumer_logs_and_keeps_polling() {
    // Given: A router failing twice before delivering
    let (logs, _guard) = capture_logs();
    let scripted = Arc::new(
        ScriptedHttpClient::new()
            .on_error(HttpMethod::Get, "/events/", HttpError::connect("refused"))
            .on_error(HttpMethod::Get, "/events/", HttpError::connect("refused"))
            .on(HttpMethod::Get, "/events/", HttpResponse::ok_json(r#"["late"]"#))
            .on(HttpMethod::Get, "/events/", HttpResponse::ok_json("[]")),
    );

    // When: The topic is consumed
    let messages = TopicConsumer::new(dmaap(&scripted), topic(), "grp", "c1")
        .expect("valid consumer")
        .with_idle_pause(Duration::from_millis(5))
        .consume_for(Duration::from_millis(60))
        .await
        .expect("consume");

    // Then: The late message still arrives and the failures were logged
    assert_eq!(messages, vec!["late"]);
    assert!(logs.contents().contains("fetch failed"));
}

#[tokio::test]
async fn when_consumer_group_is_blank_the_consumer_is_not_built() {
    // Given: A router client and a blank consumer group
    let scripted = Arc::new(ScriptedHttpClient::new());

    // When: A consumer is requested
    let error = TopicConsumer::new(dmaap(&scripted), topic(), "  ", "c1")
        .expect_err("blank group");

    // Then: The caller sees a validation error and nothing is fetched
    assert_eq!(OnapError::from(error).kind(), OnapErrorKind::Validation);
    assert_eq!(scripted.request_count(), 0);
}

#[tokio::test]
async fn when_messages_are_published_they_are_sent_as_one_array() {
    // Given: A router accepting publishes
    let scripted = Arc::new(ScriptedHttpClient::new().on(
        HttpMethod::Post,
        "/events/unauthenticated.SEC_FAULT_OUTPUT",
        HttpResponse::ok_json(r#"{"serverTimeMs":1,"count":2}"#),
    ));

    // When: Two JSON messages are published
    let receipt = dmaap(&scripted)
        .publish(
            &topic(),
            &[serde_json::json!({"a": 1}), serde_json::json!({"b": 2})],
        )
        .await
        .expect("publish");

    // Then: The receipt counts both
    assert_eq!(receipt.count, 2);
    assert_eq!(
        scripted.recorded_requests()[0].body.as_deref(),
        Some(r#"[{"a":1},{"b":2}]"#)
    );
}

// =============================================================================
// VES collector
// =============================================================================

#[tokio::test]
async fn when_fault_event_is_sent_it_is_wrapped_with_basic_auth() {
    // Given: A collector accepting events
    let scripted = Arc::new(ScriptedHttpClient::new().on(
        HttpMethod::Post,
        "/eventListener/v7",
        HttpResponse::new(202, ""),
    ));
    let ves = VesClient::new(scripted.clone(), &Settings::default());
    let event = VesEvent::new(VesDomain::Fault, "Fault_vFW_linkDown", "vfw-01")
        .with_fields(serde_json::json!({ "alarmCondition": "linkDown", "eventSeverity": "MAJOR" }));

    // When: The event is sent
    ves.send_event(&event).await.expect("send");

    // Then: The body is an `event` object and credentials are attached
    let request = &scripted.recorded_requests()[0];
    assert!(request.url.ends_with("/eventListener/v7"));
    assert!(request
        .headers
        .get("authorization")
        .is_some_and(|value| value.starts_with("Basic ")));
    let body: serde_json::Value =
        serde_json::from_str(request.body.as_deref().expect("body")).expect("json");
    assert_eq!(body["event"]["commonEventHeader"]["eventName"], "Fault_vFW_linkDown");
    assert_eq!(body["event"]["faultFields"]["eventSeverity"], "MAJOR");
}

#[tokio::test]
async fn when_empty_batch_is_sent_it_is_rejected_locally() {
    // Given: A collector client
    let scripted = Arc::new(ScriptedHttpClient::new());
    let ves = VesClient::new(scripted.clone(), &Settings::default());

    // When: An empty batch is sent
    let error = ves.send_batch(&[]).await.expect_err("empty batch");

    // Then: Nothing reaches the network
    assert_eq!(error.kind(), OnapErrorKind::Validation);
    assert_eq!(scripted.request_count(), 0);
}
