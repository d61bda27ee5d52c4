use crate::helpers::{field, spawn_pipeline, subscriber, OWNER_HANDLE};
use backend::pairing::messages;
use chrono::Weekday;
use claims::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn every_subscriber_is_deleted_and_told_about_it() {
    // Arrange
    let a = subscriber("1", false, &[Weekday::Mon]);
    let b = subscriber("2", true, &[Weekday::Sat]);
    let pipeline = spawn_pipeline(vec![a.clone(), b.clone()]).await;

    Mock::given(path("/api/v1/messages"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&pipeline.zulip_server)
        .await;

    // Act
    let report = assert_ok!(pipeline.orchestrator.run_end_of_batch().await);

    // Assert
    assert_eq!(report.offboarded, 2);
    assert!(pipeline.store.get("1").is_none());
    assert!(pipeline.store.get("2").is_none());
    let requests = pipeline.zulip_server.received_requests().await.unwrap();
    let mut recipients: Vec<String> = requests.iter().map(|request| field(request, "to")).collect();
    recipients.sort();
    let mut expected = vec![a.email, b.email];
    expected.sort();
    assert_eq!(recipients, expected);
    assert!(requests
        .iter()
        .all(|request| field(request, "content") == messages::OFFBOARDED));
}

#[tokio::test]
async fn a_failed_delete_sends_the_escalation_message() {
    let a = subscriber("1", false, &[Weekday::Mon]);
    let pipeline = spawn_pipeline(vec![a.clone()]).await;
    pipeline.store.fail_writes_for("1");

    Mock::given(path("/api/v1/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&pipeline.zulip_server)
        .await;

    let report = assert_ok!(pipeline.orchestrator.run_end_of_batch().await);

    assert_eq!(report.delete_failures, 1);
    let requests = pipeline.zulip_server.received_requests().await.unwrap();
    assert_eq!(field(&requests[0], "to"), a.email);
    assert_eq!(
        field(&requests[0], "content"),
        messages::offboarding_failed(OWNER_HANDLE)
    );
}

#[tokio::test]
async fn an_empty_batch_sends_nothing() {
    let pipeline = spawn_pipeline(Vec::new()).await;

    Mock::given(path("/api/v1/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&pipeline.zulip_server)
        .await;

    let report = assert_ok!(pipeline.orchestrator.run_end_of_batch().await);

    assert_eq!(report.offboarded, 0);
}
