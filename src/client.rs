//! DevInbox async client implementation.

use crate::{
    CreateMailboxOptions, Error, Mailbox, Message, MessageCountResult, MessageList,
    ParsedMessage, Result,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default DevInbox API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.devinbox.io/";
/// Page size used by the original SDK when none is given.
pub const DEFAULT_TAKE: u32 = 10;
/// Environment variable read by [`ClientBuilder::from_env`] for the API key.
pub const API_KEY_ENV: &str = "DEVINBOX_API_KEY";
/// Environment variable read by [`ClientBuilder::from_env`] for the base URL.
pub const API_URL_ENV: &str = "DEVINBOX_API_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "x-api-key";

/// Async client for the DevInbox email testing API.
///
/// Every method performs exactly one HTTP request and never retries. The client
/// is cheap to clone and safe to share between tasks.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] for custom settings
/// like the base URL, timeouts, proxies and TLS behavior.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the public DevInbox API with the given key.
    ///
    /// # Examples
    /// ```no_run
    /// # use devinbox_client::Client;
    /// # fn main() -> Result<(), devinbox_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Create a client configured from `DEVINBOX_API_KEY` and, if set,
    /// `DEVINBOX_API_URL`.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env().build()
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Create a mailbox.
    ///
    /// With `None` the server picks every setting and an empty JSON object is
    /// sent. This call is not idempotent: repeating it creates another mailbox.
    ///
    /// Returns `Ok(None)` when the server accepted the request but answered
    /// with an empty body; the mailbox exists, its credentials were simply not
    /// returned.
    ///
    /// # Examples
    /// ```no_run
    /// # use devinbox_client::{Client, CreateMailboxOptions};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), devinbox_client::Error> {
    /// let client = Client::from_env()?;
    /// if let Some(mailbox) = client.create_mailbox(None).await? {
    ///     println!("{}", mailbox.address());
    /// }
    /// let options = CreateMailboxOptions::new().name("signup").project("web");
    /// client.create_mailbox(Some(&options)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_mailbox(
        &self,
        options: Option<&CreateMailboxOptions>,
    ) -> Result<Option<Mailbox>> {
        let url = self.endpoint(&["mailboxes"])?;
        let request = match options {
            Some(options) => self.http.post(url).json(options),
            None => self.http.post(url).json(&serde_json::json!({})),
        };
        let body = self.execute(request).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode(body).map(Some)
    }

    /// Create a mailbox with a name and project.
    pub async fn create_named_mailbox(
        &self,
        name: impl Into<String>,
        project: impl Into<String>,
    ) -> Result<Option<Mailbox>> {
        let options = CreateMailboxOptions::new().name(name).project(project);
        self.create_mailbox(Some(&options)).await
    }

    /// Get the number of messages in a mailbox.
    ///
    /// Unknown keys are reported by the server as [`Error::Api`].
    pub async fn get_message_count(&self, mailbox_key: &str) -> Result<MessageCountResult> {
        let key = require_key(mailbox_key)?;
        self.get(&["messages", key, "count"], None).await
    }

    /// Get a page of messages from a mailbox.
    ///
    /// # Arguments
    /// * `mailbox_key` - The mailbox key
    /// * `skip` - Number of messages to skip
    /// * `take` - Page size, must be greater than zero
    ///
    /// # Examples
    /// ```no_run
    /// # use devinbox_client::{Client, DEFAULT_TAKE};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), devinbox_client::Error> {
    /// let client = Client::from_env()?;
    /// let page = client.get_messages("abc123", 0, DEFAULT_TAKE).await?;
    /// for msg in &page.messages {
    ///     println!("{:?}: {}", msg.from, msg.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_messages(&self, mailbox_key: &str, skip: u32, take: u32) -> Result<MessageList> {
        let key = require_key(mailbox_key)?;
        if take == 0 {
            return Err(Error::InvalidArgument("take must be greater than zero"));
        }
        self.get(&["messages", key], Some(&[("skip", skip), ("take", take)][..]))
            .await
    }

    /// Get the most recently received message.
    pub async fn get_last_message(&self, mailbox_key: &str) -> Result<Message> {
        let key = require_key(mailbox_key)?;
        self.get(&["messages", key, "last"], None).await
    }

    /// Get the only message of a mailbox expected to hold exactly one.
    ///
    /// What happens when the mailbox holds zero or several messages is up to
    /// the server.
    pub async fn get_single_message(&self, mailbox_key: &str) -> Result<Message> {
        let key = require_key(mailbox_key)?;
        self.get(&["messages", key, "single"], None).await
    }

    /// Get the single message of a mailbox parsed against a named template.
    ///
    /// The template is configured in the DevInbox dashboard; the returned
    /// subject and body hold the parameters the server extracted.
    pub async fn get_single_message_with_template(
        &self,
        mailbox_key: &str,
        template: &str,
    ) -> Result<ParsedMessage> {
        let key = require_key(mailbox_key)?;
        if template.trim().is_empty() {
            return Err(Error::InvalidArgument("template name must not be empty"));
        }
        self.get(&["messages", key, "single", template], None).await
    }

    /// Common GET API request pattern.
    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Option<&[(&str, u32)]>,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let mut request = self.http.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }
        decode(self.execute(request).await?)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String> {
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();

        tracing::debug!(%method, %path, "sending devinbox request");
        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%method, %path, %status, bytes = body.len(), "devinbox response");

        if !status.is_success() {
            tracing::warn!(%method, %path, %status, "devinbox request failed");
            return Err(Error::Api { status, body });
        }

        Ok(body)
    }

    /// Resolve path segments against the base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn require_key(mailbox_key: &str) -> Result<&str> {
    if mailbox_key.trim().is_empty() {
        return Err(Error::InvalidArgument("mailbox key must not be empty"));
    }
    Ok(mailbox_key)
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T> {
    serde_json::from_str(&body).map_err(|source| Error::Decode { source, body })
}

fn default_user_agent() -> String {
    format!("devinbox-sdk/{} rust", env!("CARGO_PKG_VERSION"))
}

/// Builder for configuring a DevInbox client.
///
/// Start with [`Client::builder`] to override defaults. Configuration is fixed
/// once [`ClientBuilder::build`] returns; build another client to change it.
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Option<Duration>,
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - No API key (must be set before [`build`](Self::build))
    /// - Base URL `https://api.devinbox.io/`
    /// - 30 second request timeout
    /// - No proxy
    /// - `danger_accept_invalid_certs = false`
    /// - User agent `devinbox-sdk/<version> rust`
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }

    /// Create a builder seeded from `DEVINBOX_API_KEY` and `DEVINBOX_API_URL`.
    ///
    /// Unset or empty variables leave the defaults in place.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Some(key) = env_var(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(url) = env_var(API_URL_ENV) {
            builder = builder.base_url(url);
        }
        builder
    }

    /// Set the API key sent as `X-Api-Key`.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing or for self-hosted deployments.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the total timeout applied to each request, or `None` to disable it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    ///
    /// No request is made; configuration errors, including an unusable proxy
    /// URL, are reported here as configuration errors rather than on first use.
    ///
    /// # Examples
    /// ```no_run
    /// # use devinbox_client::Client;
    /// # use std::time::Duration;
    /// # fn main() -> Result<(), devinbox_client::Error> {
    /// let client = Client::builder()
    ///     .api_key("my-api-key")
    ///     .timeout(Some(Duration::from_secs(10)))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let base_url = parse_base_url(&self.base_url)?;
        let headers = self.headers()?;

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_url) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(Error::Config)?;
            builder = builder.proxy(proxy);
        }

        let http = builder.build().map_err(Error::Config)?;

        Ok(Client { http, base_url })
    }

    /// Build headers sent with every request.
    fn headers(&self) -> Result<HeaderMap> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingApiKey)?;
        let mut api_key = HeaderValue::from_str(api_key).map_err(|_| Error::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        Ok(headers)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|err| Error::InvalidBaseUrl(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
