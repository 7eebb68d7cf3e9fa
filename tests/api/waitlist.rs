use std::time::Duration;

use anveshan_waitlist::models::response::{ErrorResponse, FieldError, WaitlistResponse};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{
    NOTIFY_TIMEOUT_MS, Notifications, spawn_app, spawn_app_with, spawn_app_with_broken_store,
};

fn body(email: &str) -> String {
    serde_json::json!({ "email": email }).to_string()
}

#[tokio::test]
async fn join_returns_a_201_for_a_new_email() {
    let app = spawn_app().await;
    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    let response = app.post_waitlist(body("alice@example.com")).await;

    assert_eq!(201, response.status().as_u16());
    let body: WaitlistResponse = response.json().await.unwrap();
    assert_eq!(
        body,
        WaitlistResponse {
            success: true,
            message: "You're on the list!".to_string(),
        }
    );
}

#[tokio::test]
async fn join_persists_the_new_subscriber() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_waitlist(body("alice@example.com")).await;

    assert_eq!(app.subscribers_with_email("alice@example.com").len(), 1);
}

#[tokio::test]
async fn joining_twice_succeeds_and_keeps_a_single_record() {
    let app = spawn_app().await;
    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        // Only the first signup is announced.
        .expect(1)
        .mount(&app.email_server)
        .await;

    let first = app.post_waitlist(body("alice@example.com")).await;
    let second = app.post_waitlist(body("alice@example.com")).await;

    assert_eq!(201, first.status().as_u16());
    assert_eq!(201, second.status().as_u16());
    let second: WaitlistResponse = second.json().await.unwrap();
    assert!(second.success);
    assert_eq!(second.message, "You're already on the list!");
    assert_eq!(app.subscribers_with_email("alice@example.com").len(), 1);
}

#[tokio::test]
async fn join_returns_a_400_for_invalid_emails() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("not-an-email", "missing @"),
        ("", "empty email"),
        ("alice@", "missing domain"),
        ("@example.com", "missing local part"),
        ("alice example@example.com", "contains a space"),
        ("alice@localhost", "domain without a dot"),
        ("a!#$%&*@example.com", "symbols in the local part"),
        ("alice@[127.0.0.1]", "ip literal domain"),
        ("alice@example.c", "one letter tld"),
        (".alice@example.com", "leading dot"),
        ("al..ice@example.com", "doubled dot"),
    ];

    for (email, description) in test_cases {
        let response = app.post_waitlist(body(email)).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the email was {}",
            description
        );
        let error: FieldError = response.json().await.unwrap();
        assert_eq!(error.field, "email");
        assert_eq!(error.message, "Please enter a valid email address");
    }
    assert!(app.store.subscribers().is_empty());
}

#[tokio::test]
async fn join_returns_a_400_for_malformed_bodies() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("{}".to_string(), "missing the email"),
        (r#"{"email": 42}"#.to_string(), "email is not a string"),
        ("not json".to_string(), "body is not json"),
        ("".to_string(), "empty body"),
    ];

    for (invalid_body, description) in test_cases {
        let response = app.post_waitlist(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}",
            description
        );
        let error: FieldError = response.json().await.unwrap();
        assert_eq!(error.field, "email");
    }
}

#[tokio::test]
async fn join_returns_a_500_when_the_store_fails() {
    let (address, email_server) = spawn_app_with_broken_store().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&email_server)
        .await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/waitlist", address))
        .json(&serde_json::json!({ "email": "alice@example.com" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(500, response.status().as_u16());
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.message, "Something went wrong. Please try again.");
}

#[tokio::test]
async fn join_sends_a_notification_with_the_subscriber_address() {
    let app = spawn_app().await;
    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_waitlist(body("alice@example.com")).await;

    let email_request = &app.email_server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
    assert_eq!(body["to"], "owner@example.com");
    assert!(body["html"].as_str().unwrap().contains("alice@example.com"));
}

#[tokio::test]
async fn notification_failure_does_not_change_the_response() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_waitlist(body("alice@example.com")).await;

    assert_eq!(201, response.status().as_u16());
    let body: WaitlistResponse = response.json().await.unwrap();
    assert_eq!(body.message, "You're on the list!");
    assert_eq!(app.subscribers_with_email("alice@example.com").len(), 1);
}

#[tokio::test]
async fn slow_notification_is_abandoned_after_the_timeout() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&app.email_server)
        .await;

    let response = tokio::time::timeout(
        Duration::from_millis(NOTIFY_TIMEOUT_MS * 10),
        app.post_waitlist(body("alice@example.com")),
    )
    .await
    .expect("The request waited on the email provider past its timeout");

    assert_eq!(201, response.status().as_u16());
    let body: WaitlistResponse = response.json().await.unwrap();
    assert_eq!(body.message, "You're on the list!");
}

#[tokio::test]
async fn disabled_notifications_do_not_change_the_response() {
    let app = spawn_app_with(Notifications::Disabled).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let first = app.post_waitlist(body("alice@example.com")).await;
    let second = app.post_waitlist(body("alice@example.com")).await;

    assert_eq!(201, first.status().as_u16());
    let first: WaitlistResponse = first.json().await.unwrap();
    assert_eq!(first.message, "You're on the list!");
    assert_eq!(201, second.status().as_u16());
    let second: WaitlistResponse = second.json().await.unwrap();
    assert_eq!(second.message, "You're already on the list!");
}
