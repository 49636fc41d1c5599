//! Complete DevInbox workflow: create a mailbox, send mail to it over SMTP and
//! read it back through the API.
//!
//! Needs an API key from the DevInbox dashboard, passed as the first argument or
//! through `DEVINBOX_API_KEY`:
//!
//! ```text
//! DEVINBOX_API_KEY=... cargo run --example workflow --features smtp
//! ```
//!
//! The last step parses the message against a dashboard template named
//! `onboarding` with subject `Welcome {{ user_name }}!`; without that template
//! the step is reported and skipped.

use std::time::{Duration, Instant};

use devinbox_client::{Client, ClientBuilder, Error, Mailbox, smtp};
use lettre::message::{Mailbox as Address, MultiPart};
use lettre::{AsyncTransport, Message};
use tracing_subscriber::EnvFilter;

const TEMPLATE: &str = "onboarding";
const USER_NAME: &str = "John Doe";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        println!("\n❌ Workflow failed: {err}");
        if let Some(status) = err.downcast_ref::<Error>().and_then(Error::status) {
            println!("   HTTP status: {status}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("DevInbox Rust client - complete workflow");
    println!("{}", "=".repeat(50));

    let mut builder = ClientBuilder::from_env();
    if let Some(key) = std::env::args().nth(1) {
        builder = builder.api_key(key);
    }
    let client = builder.build().map_err(|err| match err {
        Error::MissingApiKey => Box::<dyn std::error::Error>::from(
            "no API key: pass it as the first argument or set DEVINBOX_API_KEY",
        ),
        other => Box::from(other),
    })?;
    println!("✅ API client configured for {}", client.base_url());

    println!("\n📧 Creating a temporary mailbox...");
    let mailbox = client
        .create_mailbox(None)
        .await?
        .ok_or("mailbox created but the server returned no credentials")?;
    println!("   Key: {}", mailbox.key);
    println!("   Password: {}", mailbox.password);
    println!("   Address: {}", mailbox.address());

    println!("\n📊 Checking that the mailbox is empty...");
    let before = client.get_message_count(&mailbox.key).await?.count;
    if before != 0 {
        return Err(format!("fresh mailbox holds {before} messages, expected 0").into());
    }
    println!("   ✅ Message count: 0");

    println!("\n📤 Sending test email to {}...", mailbox.address());
    send_test_email(&mailbox).await?;
    println!("   ✅ Email sent");

    println!("\n📬 Waiting for the email to arrive...");
    let after = wait_for_messages(&client, &mailbox.key, before, Duration::from_secs(60)).await?;
    if after <= before {
        return Err(format!("email not received, count is still {after}").into());
    }
    println!("   ✅ Message count: {after}");

    println!("\n📋 Retrieving the received email...");
    let page = client.get_messages(&mailbox.key, 0, 1).await?;
    let latest = page
        .messages
        .first()
        .ok_or("count increased but no message was returned")?;
    println!("   From: {}", latest.from.join(", "));
    println!("   To: {}", latest.to.join(", "));
    println!("   Subject: {}", latest.subject);
    println!("   Received: {}", latest.received);
    println!("   Type: {}", if latest.is_html { "HTML" } else { "Text" });
    println!("   Size: {} characters", latest.body.chars().count());
    if latest.subject.is_empty() || latest.from.is_empty() || latest.to.is_empty() {
        return Err("email is missing subject, from or to".into());
    }
    if latest.body.is_empty() {
        return Err("message body is empty".into());
    }
    println!("   Preview: {}", preview(&latest.body, 200));

    println!("\n🔍 Parsing the message with the '{TEMPLATE}' template...");
    match client
        .get_single_message_with_template(&mailbox.key, TEMPLATE)
        .await
    {
        Ok(parsed) => {
            for (part, params) in [("Subject", &parsed.subject), ("Body", &parsed.body)] {
                match params.get("user_name") {
                    Some(name) if name == USER_NAME => {
                        println!("   ✅ {part} has user_name='{USER_NAME}'")
                    }
                    Some(name) => println!("   ⚠️  {part} has user_name='{name}'"),
                    None => println!("   ⚠️  {part} has no user_name parameter"),
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, template = TEMPLATE, "template parsing failed");
            println!("   ❌ Template parsing failed: {err}");
            println!("   ℹ️  Expected if the '{TEMPLATE}' template is not configured");
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("🎉 DevInbox workflow completed");
    Ok(())
}

async fn send_test_email(mailbox: &Mailbox) -> Result<(), Box<dyn std::error::Error>> {
    let from: Address = format!("DevInbox Test <{}>", mailbox.key).parse()?;
    let email = Message::builder()
        .from(from)
        .to(mailbox.address().parse()?)
        .subject(format!("Welcome {USER_NAME}!"))
        .multipart(MultiPart::alternative_plain_html(
            text_body(),
            html_body(),
        ))?;

    smtp::transport(mailbox)?.send(email).await?;
    Ok(())
}

async fn wait_for_messages(
    client: &Client,
    key: &str,
    before: u32,
    timeout: Duration,
) -> Result<u32, Error> {
    let start = Instant::now();
    loop {
        let count = client.get_message_count(key).await?.count;
        if count > before || start.elapsed() >= timeout {
            return Ok(count);
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn text_body() -> String {
    format!(
        "Hello {USER_NAME},\n\n\
         This is a simple test message to verify email delivery.\n\
         If you receive this, the system is working correctly."
    )
}

fn html_body() -> String {
    format!(
        "<html>\n<body>\n    <h2>Hello {USER_NAME},</h2>\n    \
         <p>This is a simple test message to verify email delivery.</p>\n    \
         <p>If you receive this, the system is working correctly.</p>\n\
         </body>\n</html>\n"
    )
}
