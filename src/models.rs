//! Request and response models for the DevInbox API.
//!
//! Response field names are matched without regard to ASCII case, so `isHtml`,
//! `IsHtml` and `ISHTML` all decode the same field. Models serialize back in
//! camelCase.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::MAILBOX_DOMAIN;

/// A disposable mailbox provisioned by the server.
///
/// The key names the inbox in every messages endpoint and doubles as the SMTP
/// username; the password is the matching SMTP password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Mailbox {
    /// Mailbox key; also the SMTP user name and the local part of the address.
    pub key: String,
    /// SMTP password generated for the mailbox.
    pub password: String,
}

impl Mailbox {
    /// Email address that delivers into this mailbox.
    pub fn address(&self) -> String {
        format!("{}@{}", self.key, MAILBOX_DOMAIN)
    }
}

/// How the server treats line endings of received message bodies.
///
/// Sent as its numeric value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineEndingMode {
    /// Keep line endings exactly as received.
    Preserve = 0,
    /// Normalize CRLF/CR to LF.
    #[default]
    Normalize = 1,
    /// Remove trailing line endings.
    Strip = 2,
}

impl Serialize for LineEndingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Options for [`Client::create_mailbox`](crate::Client::create_mailbox).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateMailboxOptions {
    /// Display name for the mailbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Project the mailbox is filed under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Line ending handling for messages delivered to the mailbox.
    pub line_ending_mode: LineEndingMode,
}

impl CreateMailboxOptions {
    /// Options with no name or project and [`LineEndingMode::Normalize`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the project.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the line ending handling.
    pub fn line_ending_mode(mut self, mode: LineEndingMode) -> Self {
        self.line_ending_mode = mode;
        self
    }
}

/// Number of messages currently held by a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct MessageCountResult {
    /// Number of messages currently held by the mailbox.
    pub count: u32,
}

/// A message received by a mailbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned message id.
    pub unique_id: Uuid,
    /// Sender addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: Vec<String>,
    /// Recipient addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: Vec<String>,
    /// Carbon copy addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cc: Vec<String>,
    /// Blind carbon copy addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bcc: Vec<String>,
    /// Subject line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// Body as stored, HTML or plain text per `is_html`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Whether `body` is HTML.
    #[serde(default)]
    pub is_html: bool,
    /// Arrival time.
    #[serde(deserialize_with = "utc_timestamp")]
    pub received: DateTime<Utc>,
}

/// One page of a mailbox's messages.
///
/// `count` is the total number of messages in the mailbox, not the page size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct MessageList {
    /// Key of the mailbox that was listed.
    pub key: String,
    /// Total messages in the mailbox, not just this page.
    pub count: u32,
    /// The requested page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

/// A message matched against a server-side template.
///
/// `subject` and `body` hold the template parameters the server extracted,
/// keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct ParsedMessage {
    /// Message id, when the server includes it.
    #[serde(default)]
    pub unique_id: Option<Uuid>,
    /// Sender addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: Vec<String>,
    /// Recipient addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: Vec<String>,
    /// Carbon copy addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cc: Vec<String>,
    /// Blind carbon copy addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bcc: Vec<String>,
    /// Template parameters extracted from the subject, by name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: HashMap<String, String>,
    /// Template parameters extracted from the body, by name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: HashMap<String, String>,
    /// Whether `body` is HTML.
    #[serde(default)]
    pub is_html: bool,
    /// Arrival time.
    #[serde(deserialize_with = "utc_timestamp")]
    pub received: DateTime<Utc>,
}

/// Implements the serde traits on top of the `remote = "Self"` derive, folding
/// incoming field names onto the listed wire names first.
macro_rules! case_insensitive_fields {
    ($ty:ident, [$($field:literal),+ $(,)?]) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $ty::serialize(self, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = fold_field_names(deserializer, &[$($field),+])?;
                $ty::deserialize(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

case_insensitive_fields!(Mailbox, ["key", "password"]);
case_insensitive_fields!(MessageCountResult, ["count"]);
case_insensitive_fields!(
    Message,
    ["uniqueId", "from", "to", "cc", "bcc", "subject", "body", "isHtml", "received"]
);
case_insensitive_fields!(MessageList, ["key", "count", "messages"]);
case_insensitive_fields!(
    ParsedMessage,
    ["uniqueId", "from", "to", "cc", "bcc", "subject", "body", "isHtml", "received"]
);

// Only the object's own keys are renamed; nested values are left to the field
// types, so template parameter names inside `subject`/`body` keep their case.
fn fold_field_names<'de, D>(deserializer: D, fields: &[&str]) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let object = Map::<String, Value>::deserialize(deserializer)?;
    let folded = object
        .into_iter()
        .map(|(name, value)| {
            let name = fields
                .iter()
                .find(|field| field.eq_ignore_ascii_case(&name))
                .map_or(name, |field| (*field).to_string());
            (name, value)
        })
        .collect();
    Ok(Value::Object(folded))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The server may omit the offset; such timestamps are UTC.
fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {err}")))
}
