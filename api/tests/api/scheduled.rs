use claims::assert_none;
use crate::helpers::{spawn_app, spawn_app_with, subscriber, test_keys, EVERY_DAY, SCHEDULER_SECRET};
use backend::domain::Recipients;
use backend::pairing::messages;
use serde_json::Value;

#[tokio::test]
async fn scheduled_runs_without_the_token_are_not_found() {
    let app = spawn_app_with(
        vec![subscriber(1, &EVERY_DAY), subscriber(2, &EVERY_DAY)],
        test_keys(),
        |_| {},
    )
    .await;

    let test_cases = vec![(None, "no token"), (Some("guess"), "the wrong token")];
    for (token, description) in test_cases {
        let match_response = app.post_match(token).await;
        let end_of_batch_response = app.post_end_of_batch(token).await;

        assert_eq!(404, match_response.status().as_u16(), "/match accepted {}", description);
        assert_eq!(
            404,
            end_of_batch_response.status().as_u16(),
            "/endofbatch accepted {}",
            description
        );
    }

    assert_eq!(app.notifier.attempts(), 0);
    assert_eq!(app.store.delete_calls(), 0);
}

#[tokio::test]
async fn the_daily_match_pairs_everyone_scheduled() {
    // Arrange
    let app = spawn_app_with(
        vec![subscriber(1, &EVERY_DAY), subscriber(2, &EVERY_DAY)],
        test_keys(),
        |_| {},
    )
    .await;

    // Act
    let response = app.post_match(Some(SCHEDULER_SECRET)).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["eligible"], 2);
    assert_eq!(report["pairs"], 1);
    assert_eq!(report["odd_one_out"], Value::Null);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, messages::MATCHED);
    assert!(sent[0].recipients.contains("user1@example.com"));
    assert!(sent[0].recipients.contains("user2@example.com"));
}

#[tokio::test]
async fn the_daily_match_resets_skippers_without_matching_them() {
    let mut skipper = subscriber(3, &EVERY_DAY);
    skipper.is_skipping_tomorrow = true;
    let app = spawn_app_with(
        vec![subscriber(1, &EVERY_DAY), skipper],
        test_keys(),
        |_| {},
    )
    .await;

    let response = app.post_match(Some(SCHEDULER_SECRET)).await;

    assert_eq!(200, response.status().as_u16());
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["skippers_reset"], 1);
    assert_eq!(report["odd_one_out"], "1");

    assert!(!app.store.get("3").unwrap().is_skipping_tomorrow);
    assert_eq!(
        app.notifier.sent()[0].recipients,
        Recipients::single("user1@example.com")
    );
    assert_eq!(app.notifier.sent()[0].body, messages::ODD_ONE_OUT);
}

#[tokio::test]
async fn a_daily_match_with_nobody_scheduled_sends_nothing() {
    let app = spawn_app_with(vec![subscriber(1, &[])], test_keys(), |_| {}).await;

    let response = app.post_match(Some(SCHEDULER_SECRET)).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(app.notifier.attempts(), 0);
}

#[tokio::test]
async fn end_of_batch_offboards_every_subscriber() {
    let app = spawn_app_with(
        vec![subscriber(1, &EVERY_DAY), subscriber(2, &[])],
        test_keys(),
        |_| {},
    )
    .await;

    let response = app.post_end_of_batch(Some(SCHEDULER_SECRET)).await;

    assert_eq!(200, response.status().as_u16());
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["offboarded"], 2);
    assert_none!(app.store.get("1"));
    assert_none!(app.store.get("2"));

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|message| message.body == messages::OFFBOARDED));
}

#[tokio::test]
async fn end_of_batch_fails_when_the_subscribers_cannot_be_listed() {
    let app = spawn_app_with(vec![subscriber(1, &EVERY_DAY)], test_keys(), |_| {}).await;
    app.store.fail_reads();

    let response = app.post_end_of_batch(Some(SCHEDULER_SECRET)).await;

    assert_eq!(500, response.status().as_u16());
    assert_eq!(app.notifier.attempts(), 0);
}

#[tokio::test]
async fn health_check_is_unaffected_by_scheduled_runs() {
    let app = spawn_app().await;

    let _ = app.post_match(Some(SCHEDULER_SECRET)).await;
    let response = app
        .api_client
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
}
