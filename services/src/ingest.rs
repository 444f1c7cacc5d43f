//! Inbound-mail webhook.
//!
//! The mail pipeline delivers SNS-style notifications to `POST /emails` as
//! plain text. Subscription confirmations are acknowledged by fetching the
//! confirmation URL; receipt notifications point at a raw message in object
//! storage, which gets parsed and persisted as an Email document together
//! with its attachment blobs and a derived Encounter for the sender. Every
//! failure answers 400 so the publisher redelivers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use liaison_business::{Entity, EntityKind};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::AppState;
use crate::crud::ErrorResponse;
use crate::database::DocumentStore;
use crate::mail::{self, ParsedEmail, Recipient};
use crate::storage::{FileStorage, FileUploadRequest};

const RECEIPT_SUBJECT: &str = "Amazon SES Email Receipt Notification";
const SUBSCRIPTION_SUBJECT: &str = "Amazon SES Email Receipt Subscription Notification";

#[derive(Debug, Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Type")]
    message_type: Option<String>,
    #[serde(rename = "Subject")]
    subject: Option<String>,
    #[serde(rename = "SubscribeURL")]
    subscribe_url: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReceiptMessage {
    receipt: Receipt,
}

#[derive(Debug, Deserialize)]
struct Receipt {
    action: ReceiptAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptAction {
    bucket_name: String,
    object_key: String,
}

fn bad_request(message: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(message)),
    )
        .into_response()
}

/// `POST /emails`. The publisher sends the envelope as `text/plain`, so the
/// body arrives as a string and is decoded here rather than by an extractor.
pub async fn receive_notification<D, F>(
    State(state): State<AppState<D, F>>,
    body: String,
) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    let envelope: SnsEnvelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!("Undecodable notification envelope: {}", e);
            return bad_request("Notification body is not valid JSON");
        }
    };

    match envelope.message_type.as_deref() {
        Some("SubscriptionConfirmation") => confirm_subscription(&state, &envelope).await,
        Some("Notification") => match envelope.subject.as_deref() {
            Some(SUBSCRIPTION_SUBJECT) => {
                tracing::info!("Mail receipt subscription acknowledged");
                (StatusCode::OK, "subscription acknowledged").into_response()
            }
            Some(RECEIPT_SUBJECT) => {
                let Some(message) = envelope.message.as_deref() else {
                    return bad_request("Receipt notification carries no message");
                };
                process_receipt(&state, message).await
            }
            other => {
                tracing::error!("Unexpected notification subject: {:?}", other);
                bad_request("Unexpected notification subject")
            }
        },
        other => {
            tracing::error!("Unexpected notification type: {:?}", other);
            bad_request("Unexpected notification type")
        }
    }
}

async fn confirm_subscription<D, F>(
    state: &AppState<D, F>,
    envelope: &SnsEnvelope,
) -> axum::response::Response
where
    D: DocumentStore,
    F: FileStorage,
{
    let Some(url) = envelope.subscribe_url.as_deref() else {
        return bad_request("SubscriptionConfirmation carries no SubscribeURL");
    };

    match state.http.get(url).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::info!("Subscription confirmed");
            (StatusCode::OK, "subscription confirmed").into_response()
        }
        Ok(response) => {
            tracing::error!("Subscription confirmation rejected: {}", response.status());
            bad_request("Subscription confirmation was rejected")
        }
        Err(e) => {
            tracing::error!("Failed to reach SubscribeURL: {}", e);
            bad_request("Failed to confirm subscription")
        }
    }
}

async fn process_receipt<D, F>(state: &AppState<D, F>, message: &str) -> axum::response::Response
where
    D: DocumentStore,
    F: FileStorage,
{
    let receipt: ReceiptMessage = match serde_json::from_str(message) {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::error!("Undecodable receipt message: {}", e);
            return bad_request("Receipt message is not valid JSON");
        }
    };
    let ReceiptAction {
        bucket_name,
        object_key,
    } = receipt.receipt.action;

    let raw = match state.files.download(&bucket_name, &object_key).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("Failed to fetch {}/{}: {}", bucket_name, object_key, e);
            return bad_request("Failed to fetch the raw message");
        }
    };

    let parsed = match mail::parse_message(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!("Failed to parse {}/{}: {}", bucket_name, object_key, e);
            return bad_request("Failed to parse the raw message");
        }
    };

    let attachments = match store_attachments(state, &parsed).await {
        Ok(attachments) => attachments,
        Err(response) => return response,
    };

    let email = match state
        .store
        .insert(EntityKind::Email, email_entity(&parsed, attachments))
        .await
    {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("Failed to persist email: {}", e);
            return bad_request("Failed to persist the email");
        }
    };

    if let Err(response) = link_sender(state, &parsed, &email).await {
        return response;
    }

    (StatusCode::CREATED, Json(email)).into_response()
}

/// Uploads each attachment under an opaque key and returns the descriptors
/// stored on the Email document.
async fn store_attachments<D, F>(
    state: &AppState<D, F>,
    parsed: &ParsedEmail,
) -> Result<Vec<Value>, axum::response::Response>
where
    D: DocumentStore,
    F: FileStorage,
{
    let mut descriptors = Vec::with_capacity(parsed.attachments.len());
    for attachment in &parsed.attachments {
        let key = format!("ATTACHMENT/{}", Uuid::new_v4());
        let request = FileUploadRequest::new(
            key.clone(),
            attachment.data.clone(),
            attachment.content_type.clone(),
        );
        if let Err(e) = state.files.upload(&state.attachment_bucket, request).await {
            tracing::error!("Failed to store attachment {}: {}", attachment.file_name, e);
            return Err(bad_request("Failed to store an attachment"));
        }
        descriptors.push(json!({
            "bucket": state.attachment_bucket,
            "key": key,
            "fileName": attachment.file_name,
            "contentType": attachment.content_type,
        }));
    }
    Ok(descriptors)
}

fn recipients_value(recipients: &[Recipient]) -> Value {
    json!(recipients)
}

fn email_entity(parsed: &ParsedEmail, attachments: Vec<Value>) -> Entity {
    let mut email = Entity::new();
    email.set("from", recipients_value(&parsed.from));
    email.set("to", recipients_value(&parsed.to));
    email.set("cc", recipients_value(&parsed.cc));
    email.set("bcc", recipients_value(&parsed.bcc));
    email.set(
        "date",
        match parsed.date {
            Some(date) => Value::String(date.to_rfc3339()),
            None => Value::Null,
        },
    );
    email.set("subject", Value::String(parsed.subject.clone()));
    email.set("text", Value::String(parsed.text.clone()));
    email.set("attachments", Value::Array(attachments));
    email
}

/// Ties the stored email to the person whose address sent it, recording an
/// email Encounter. A sender without a matching person is logged and skipped;
/// the email itself is already persisted.
async fn link_sender<D, F>(
    state: &AppState<D, F>,
    parsed: &ParsedEmail,
    email: &Entity,
) -> Result<(), axum::response::Response>
where
    D: DocumentStore,
    F: FileStorage,
{
    let Some(sender) = parsed
        .from
        .first()
        .map(|recipient| recipient.address.as_str())
        .filter(|address| !address.is_empty())
    else {
        tracing::warn!("Inbound message has no sender address");
        return Ok(());
    };

    let person = match state
        .store
        .find_by_field(EntityKind::Person, "email", sender)
        .await
    {
        Ok(Some(person)) => person,
        Ok(None) => {
            tracing::warn!("No person matches sender {}", sender);
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Failed to look up sender {}: {}", sender, e);
            return Err(bad_request("Failed to look up the sender"));
        }
    };

    let mut encounter = Entity::new();
    encounter.set(
        "person",
        Value::String(person.id().unwrap_or_default().to_owned()),
    );
    encounter.set("when", email.field("date").cloned().unwrap_or(Value::Null));
    encounter.set("type", Value::String("email".to_owned()));
    encounter.set(
        "email",
        Value::String(email.id().unwrap_or_default().to_owned()),
    );

    if let Err(e) = state.store.insert(EntityKind::Encounter, encounter).await {
        tracing::error!("Failed to record encounter for {}: {}", sender, e);
        return Err(bad_request("Failed to record the encounter"));
    }
    Ok(())
}
