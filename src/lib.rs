//! # DevInbox Client
//! Asynchronous wrapper around the DevInbox email testing HTTP API, providing simple methods to create disposable mailboxes and poll them for received messages from Rust using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers who need to assert on transactional email in integration tests, demos, or automation scripts: configure with [`ClientBuilder`], create a [`Mailbox`], send mail to it over SMTP, then read it back as [`Message`] values.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`. The optional `smtp` feature adds [`smtp::transport`], a `lettre` STARTTLS transport logged in with a mailbox's credentials.
//!
//! ## Out of scope
//! Not a mail server, SMTP implementation, or template engine. Nothing is retried or cached: each method is one request, and creating a mailbox is never repeated behind your back.
//!
//! ## Errors
//! Transport failures (including timeouts) surface as [`Error::Transport`], non-2xx statuses as [`Error::Api`] with the raw body, and unexpected payloads as [`Error::Decode`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use devinbox_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), devinbox_client::Error> {
//!     let client = Client::from_env()?;
//!     let Some(mailbox) = client.create_mailbox(None).await? else {
//!         return Ok(());
//!     };
//!     println!("Send mail to: {}", mailbox.address());
//!
//!     let count = client.get_message_count(&mailbox.key).await?;
//!     println!("Messages: {}", count.count);
//!
//!     if count.count > 0 {
//!         let msg = client.get_last_message(&mailbox.key).await?;
//!         println!("From: {:?}, Subject: {}", msg.from, msg.subject);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod models;
#[cfg(feature = "smtp")]
pub mod smtp;

pub use client::{
    API_KEY_ENV, API_URL_ENV, Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_TAKE,
};
pub use error::Error;
pub use models::{
    CreateMailboxOptions, LineEndingMode, Mailbox, Message, MessageCountResult, MessageList,
    ParsedMessage,
};

/// SMTP relay that accepts mail for DevInbox mailboxes.
pub const SMTP_SERVER: &str = "smtp.devinbox.io";
/// Submission port on [`SMTP_SERVER`]; connections upgrade with STARTTLS.
pub const SMTP_PORT: u16 = 587;
/// Domain of mailbox addresses, see [`Mailbox::address`].
pub const MAILBOX_DOMAIN: &str = "devinbox.io";

/// Result type alias for DevInbox operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
