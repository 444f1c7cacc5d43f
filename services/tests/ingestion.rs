use axum::http::StatusCode;
use axum_test::TestServer;
use liaison_business::EntityKind;
use liaison_services::{
    config::Config,
    database::{DocumentStore as _, MemoryDocumentStore},
    routes,
    storage::MockFileStorage,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RAW_MESSAGE: &str = "From: Sender <sender@example.com>\r\n\
To: One <one@example.com>\r\n\
Subject: Quarterly check-in\r\n\
Date: Wed, 4 Mar 2026 15:30:00 +0000\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"frontier\"\r\n\
\r\n\
--frontier\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Hello from the message body.\r\n\
--frontier\r\n\
Content-Type: text/plain; name=\"notes.txt\"\r\n\
Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
\r\n\
attached notes\r\n\
--frontier--\r\n";

fn test_server() -> (TestServer, MemoryDocumentStore, MockFileStorage) {
    let store = MemoryDocumentStore::new();
    let files = MockFileStorage::new();
    let app = routes(store.clone(), files.clone(), Config::new_for_test());
    (TestServer::new(app).unwrap(), store, files)
}

fn receipt_notification(bucket: &str, key: &str) -> String {
    let message = json!({
        "receipt": { "action": { "bucketName": bucket, "objectKey": key } }
    });
    json!({
        "Type": "Notification",
        "Subject": "Amazon SES Email Receipt Notification",
        "Message": message.to_string(),
    })
    .to_string()
}

#[tokio::test]
async fn subscription_confirmation_fetches_the_confirm_url() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/confirm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;

    let (server, _, _) = test_server();
    let body = json!({
        "Type": "SubscriptionConfirmation",
        "SubscribeURL": format!("{}/confirm", upstream.uri()),
    });

    let response = server.post("/emails").text(body.to_string()).await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn unreachable_confirm_url_is_a_client_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/confirm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;

    let (server, _, _) = test_server();
    let body = json!({
        "Type": "SubscriptionConfirmation",
        "SubscribeURL": format!("{}/confirm", upstream.uri()),
    });

    let response = server.post("/emails").text(body.to_string()).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn receipt_notification_persists_email_encounter_and_attachments() {
    let (server, store, files) = test_server();
    files.put("inbound-mail", "m1", RAW_MESSAGE.as_bytes().to_vec(), "message/rfc822");
    store
        .insert(
            EntityKind::Person,
            serde_json::from_value(json!({ "name": "Sender", "email": "sender@example.com" }))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = server
        .post("/emails")
        .text(receipt_notification("inbound-mail", "m1"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let email: Value = response.json();

    assert_eq!(email["subject"], "Quarterly check-in");
    assert_eq!(email["from"][0]["address"], "sender@example.com");
    assert_eq!(email["date"], "2026-03-04T15:30:00+00:00");
    assert!(email["text"].as_str().unwrap().contains("Hello from"));

    // One attachment blob stored under an opaque key in the configured bucket.
    let keys = files.keys_in("liaison-email");
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("ATTACHMENT/"));
    assert_eq!(email["attachments"][0]["key"], keys[0]);
    assert_eq!(email["attachments"][0]["fileName"], "notes.txt");
    let stored = files
        .metadata_of("liaison-email", &keys[0])
        .expect("attachment metadata");
    assert_eq!(stored.content_type, "text/plain");

    // The sender matched a person, so an email encounter was derived.
    assert_eq!(store.count(EntityKind::Email), 1);
    assert_eq!(store.count(EntityKind::Encounter), 1);
    let encounters = store.list(EntityKind::Encounter).await.unwrap();
    assert_eq!(encounters[0].text("type"), "email");
    assert_eq!(encounters[0].text("email"), email["id"].as_str().unwrap());
    assert_eq!(encounters[0].text("when"), email["date"].as_str().unwrap());
}

#[tokio::test]
async fn unmatched_sender_still_persists_the_email() {
    let (server, store, files) = test_server();
    files.put("inbound-mail", "m2", RAW_MESSAGE.as_bytes().to_vec(), "message/rfc822");

    let response = server
        .post("/emails")
        .text(receipt_notification("inbound-mail", "m2"))
        .await;
    response.assert_status(StatusCode::CREATED);

    assert_eq!(store.count(EntityKind::Email), 1);
    assert_eq!(store.count(EntityKind::Encounter), 0);
}

#[tokio::test]
async fn missing_object_is_a_client_error() {
    let (server, store, _) = test_server();

    let response = server
        .post("/emails")
        .text(receipt_notification("inbound-mail", "gone"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(store.count(EntityKind::Email), 0);
}

#[tokio::test]
async fn subscription_notice_is_acknowledged_without_side_effects() {
    let (server, store, files) = test_server();

    let body = json!({
        "Type": "Notification",
        "Subject": "Amazon SES Email Receipt Subscription Notification",
    });
    let response = server.post("/emails").text(body.to_string()).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(store.count(EntityKind::Email), 0);
    assert!(files.is_empty());
}

#[tokio::test]
async fn unexpected_payloads_are_client_errors() {
    let (server, _, _) = test_server();

    server
        .post("/emails")
        .text("not json at all")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/emails")
        .text(json!({ "Type": "SomethingElse" }).to_string())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/emails")
        .text(
            json!({ "Type": "Notification", "Subject": "Unrelated subject" }).to_string(),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
