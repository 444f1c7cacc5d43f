use chrono::{DateTime, Utc};
use mail_parser::{Address, MessageParser, MimeHeaders};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum MailParseError {
    #[error("raw message could not be parsed")]
    Unparseable,
}

/// One mailbox from an address header, serialized into the Email document
/// as `{ name, address }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct ParsedAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// The fields of an inbound message the system persists.
#[derive(Debug, Default)]
pub struct ParsedEmail {
    pub from: Vec<Recipient>,
    pub to: Vec<Recipient>,
    pub cc: Vec<Recipient>,
    pub bcc: Vec<Recipient>,
    pub date: Option<DateTime<Utc>>,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<ParsedAttachment>,
}

pub fn parse_message(raw: &[u8]) -> Result<ParsedEmail, MailParseError> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or(MailParseError::Unparseable)?;

    let date = message
        .date()
        .and_then(|date| DateTime::from_timestamp(date.to_timestamp(), 0));

    let attachments = message
        .attachments()
        .map(|part| ParsedAttachment {
            file_name: part.attachment_name().unwrap_or("unnamed").to_owned(),
            content_type: part
                .content_type()
                .map(|content_type| match content_type.subtype() {
                    Some(subtype) => format!("{}/{subtype}", content_type.ctype()),
                    None => content_type.ctype().to_owned(),
                })
                .unwrap_or_else(|| "application/octet-stream".to_owned()),
            data: part.contents().to_vec(),
        })
        .collect();

    Ok(ParsedEmail {
        from: recipients(message.from()),
        to: recipients(message.to()),
        cc: recipients(message.cc()),
        bcc: recipients(message.bcc()),
        date,
        subject: message.subject().unwrap_or_default().to_owned(),
        text: message
            .body_text(0)
            .map(|body| body.into_owned())
            .unwrap_or_default(),
        attachments,
    })
}

fn recipients(address: Option<&Address<'_>>) -> Vec<Recipient> {
    address
        .map(|list| {
            list.iter()
                .map(|addr| Recipient {
                    name: addr.name().unwrap_or_default().to_owned(),
                    address: addr.address().unwrap_or_default().to_owned(),
                })
                .collect()
        })
        .unwrap_or_default()
}
