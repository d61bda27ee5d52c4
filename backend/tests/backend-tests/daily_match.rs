use crate::helpers::{field, spawn_pipeline, subscriber};
use backend::pairing::messages;
use chrono::Weekday;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn a_matched_pair_gets_one_message_addressed_to_both() {
    // Arrange
    let a = subscriber("1", false, &[Weekday::Mon]);
    let b = subscriber("2", false, &[Weekday::Mon]);
    let c = subscriber("3", true, &[Weekday::Mon]);
    let pipeline = spawn_pipeline(vec![a.clone(), b.clone(), c]).await;

    Mock::given(path("/api/v1/messages"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&pipeline.zulip_server)
        .await;

    // Act
    let report = pipeline
        .orchestrator
        .run_daily_match(Weekday::Mon, &mut StdRng::seed_from_u64(17))
        .await;

    // Assert
    assert_eq!(report.pairs, 1);
    let requests = pipeline.zulip_server.received_requests().await.unwrap();
    let to = field(&requests[0], "to");
    assert!(to.contains(&a.email) && to.contains(&b.email));
    assert_eq!(field(&requests[0], "type"), "private");
    assert_eq!(field(&requests[0], "content"), messages::MATCHED);
    assert!(!pipeline.store.get("3").unwrap().is_skipping_tomorrow);
}

#[tokio::test]
async fn an_odd_match_set_messages_the_odd_one_out_separately() {
    let pipeline = spawn_pipeline(vec![
        subscriber("1", false, &[Weekday::Tue]),
        subscriber("2", false, &[Weekday::Tue]),
        subscriber("3", false, &[Weekday::Tue]),
        subscriber("4", false, &[Weekday::Wed]),
    ])
    .await;

    Mock::given(path("/api/v1/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&pipeline.zulip_server)
        .await;

    let report = pipeline
        .orchestrator
        .run_daily_match(Weekday::Tue, &mut StdRng::seed_from_u64(23))
        .await;

    assert_eq!(report.eligible, 3);
    let odd_one_out = pipeline
        .store
        .get(&report.odd_one_out.expect("nobody was left out"))
        .unwrap();
    let requests = pipeline.zulip_server.received_requests().await.unwrap();
    let singleton = requests
        .iter()
        .find(|request| field(request, "content") == messages::ODD_ONE_OUT)
        .expect("the odd one out was not messaged");
    assert_eq!(field(singleton, "to"), odd_one_out.email);
}

#[tokio::test]
async fn zulip_failures_do_not_stop_the_skip_reset() {
    let pipeline = spawn_pipeline(vec![
        subscriber("1", false, &[Weekday::Fri]),
        subscriber("2", false, &[Weekday::Fri]),
        subscriber("3", false, &[Weekday::Fri]),
        subscriber("4", false, &[Weekday::Fri]),
        subscriber("5", true, &[Weekday::Fri]),
        subscriber("6", true, &[]),
    ])
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&pipeline.zulip_server)
        .await;

    let report = pipeline
        .orchestrator
        .run_daily_match(Weekday::Fri, &mut StdRng::seed_from_u64(5))
        .await;

    assert_eq!(report.notification_failures, 2);
    assert_eq!(report.skippers_reset, 2);
    assert_eq!(pipeline.store.unset_calls(), 2);
}

#[tokio::test]
async fn nobody_scheduled_means_no_messages() {
    let pipeline = spawn_pipeline(vec![
        subscriber("1", false, &[Weekday::Mon]),
        subscriber("2", true, &[Weekday::Sun]),
    ])
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&pipeline.zulip_server)
        .await;

    let report = pipeline
        .orchestrator
        .run_daily_match(Weekday::Sun, &mut StdRng::seed_from_u64(1))
        .await;

    assert_eq!(report.pairs, 0);
    assert_eq!(report.odd_one_out, None);
    assert_eq!(report.skippers_reset, 1);
}
