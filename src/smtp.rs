//! SMTP transport for delivering test mail into a DevInbox mailbox.
//!
//! Only building the transport lives here; compose and send messages with
//! [`lettre`] directly.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, Tokio1Executor};

use crate::{Mailbox, Result, SMTP_PORT, SMTP_SERVER};

/// STARTTLS transport to `smtp.devinbox.io:587` authenticated as `mailbox`.
///
/// # Examples
/// ```no_run
/// # use devinbox_client::{smtp, Client};
/// use lettre::{AsyncTransport, Message};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::from_env()?;
/// let Some(mailbox) = client.create_mailbox(None).await? else {
///     return Ok(());
/// };
///
/// let email = Message::builder()
///     .from("from@dummy.com".parse()?)
///     .to(mailbox.address().parse()?)
///     .subject("Test Email")
///     .body("This is a test email sent to the mailbox.".to_string())?;
/// smtp::transport(&mailbox)?.send(email).await?;
/// # Ok(())
/// # }
/// ```
pub fn transport(mailbox: &Mailbox) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    transport_for(SMTP_SERVER, SMTP_PORT, mailbox)
}

/// Same as [`transport`] against another relay, e.g. a staging server.
pub fn transport_for(
    host: &str,
    port: u16,
    mailbox: &Mailbox,
) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    tracing::debug!(host, port, username = %mailbox.key, "building devinbox smtp transport");
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        .port(port)
        .credentials(Credentials::new(
            mailbox.key.clone(),
            mailbox.password.clone(),
        ))
        .build();
    Ok(transport)
}

