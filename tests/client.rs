use std::time::Duration;

use devinbox_client::{Client, CreateMailboxOptions, Error, LineEndingMode};
use httpmock::prelude::*;
use serde_json::{Value, json};

const API_KEY: &str = "test-key";
const KEY: &str = "abc123";

fn client(server: &MockServer) -> Client {
    Client::builder()
        .api_key(API_KEY)
        .base_url(server.base_url())
        .build()
        .unwrap()
}

fn message_json(id: &str) -> Value {
    json!({
        "uniqueId": id,
        "from": ["from@dummy.com"],
        "to": ["abc123@devinbox.io"],
        "cc": [],
        "bcc": [],
        "subject": "Test Email",
        "body": "This is a test email sent to the mailbox.\r\n",
        "isHtml": false,
        "received": "2025-03-04T10:11:12.345Z"
    })
}

#[tokio::test]
async fn create_mailbox_posts_empty_object_with_auth_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/mailboxes")
                .header("x-api-key", API_KEY)
                .header("accept", "application/json")
                .header_exists("user-agent")
                .json_body(json!({}));
            then.status(200)
                .json_body(json!({"key": KEY, "password": "p@ss"}));
        })
        .await;

    let mailbox = client(&server).create_mailbox(None).await.unwrap().unwrap();

    mock.assert_async().await;
    assert_eq!(mailbox.key, KEY);
    assert_eq!(mailbox.password, "p@ss");
    assert_eq!(mailbox.address(), "abc123@devinbox.io");
}

#[tokio::test]
async fn create_mailbox_sends_options() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/mailboxes").json_body(json!({
                "Name": "signup",
                "Project": "web",
                "LineEndingMode": 0
            }));
            then.status(201)
                .json_body(json!({"Key": "named1", "Password": "secret"}));
        })
        .await;

    let options = CreateMailboxOptions::new()
        .name("signup")
        .project("web")
        .line_ending_mode(LineEndingMode::Preserve);
    let mailbox = client(&server)
        .create_mailbox(Some(&options))
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(mailbox.key, "named1");
    assert_eq!(mailbox.password, "secret");
}

#[tokio::test]
async fn create_named_mailbox_uses_default_line_endings() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/mailboxes").json_body(json!({
                "Name": "signup",
                "Project": "web",
                "LineEndingMode": 1
            }));
            then.status(200)
                .json_body(json!({"key": "named2", "password": "secret"}));
        })
        .await;

    let mailbox = client(&server)
        .create_named_mailbox("signup", "web")
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(mailbox.key, "named2");
}

#[tokio::test]
async fn create_with_empty_success_body_is_not_an_error() {
    for status in [201, 204] {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/mailboxes");
                then.status(status);
            })
            .await;

        let created = client(&server)
            .create_named_mailbox("n", "p")
            .await
            .unwrap();

        assert_eq!(created, None, "status {status}");
        assert_eq!(mock.hits_async().await, 1);
    }
}

#[tokio::test]
async fn create_without_options_tolerates_blank_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mailboxes");
            then.status(200).body("  \n");
        })
        .await;

    assert_eq!(client(&server).create_mailbox(None).await.unwrap(), None);
}

#[tokio::test]
async fn get_message_count() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/messages/abc123/count")
                .header("x-api-key", API_KEY);
            then.status(200).json_body(json!({"count": 0}));
        })
        .await;

    let result = client(&server).get_message_count(KEY).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.count, 0);
}

#[tokio::test]
async fn get_messages_passes_paging() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/messages/abc123")
                .query_param("skip", "0")
                .query_param("take", "1");
            then.status(200).json_body(json!({
                "key": KEY,
                "count": 4,
                "messages": [message_json("6f1c2a4e-9a53-4c4b-8f7e-1d2b3c4d5e6f")]
            }));
        })
        .await;

    let list = client(&server).get_messages(KEY, 0, 1).await.unwrap();

    mock.assert_async().await;
    assert_eq!(list.key, KEY);
    assert_eq!(list.count, 4);
    assert_eq!(list.messages.len(), 1);
    let msg = &list.messages[0];
    assert_eq!(msg.from, vec!["from@dummy.com"]);
    assert_eq!(msg.to, vec!["abc123@devinbox.io"]);
    assert_eq!(msg.subject, "Test Email");
    assert_eq!(msg.body.trim_end(), "This is a test email sent to the mailbox.");
    assert!(!msg.is_html);
}

#[tokio::test]
async fn last_and_single_message_decode_to_same_value() {
    let server = MockServer::start_async().await;
    let id = "6f1c2a4e-9a53-4c4b-8f7e-1d2b3c4d5e6f";
    let last = server
        .mock_async(|when, then| {
            when.method(GET).path("/messages/abc123/last");
            then.status(200).json_body(message_json(id));
        })
        .await;
    let single = server
        .mock_async(|when, then| {
            when.method(GET).path("/messages/abc123/single");
            then.status(200).json_body(message_json(id));
        })
        .await;

    let client = client(&server);
    let last_message = client.get_last_message(KEY).await.unwrap();
    let single_message = client.get_single_message(KEY).await.unwrap();

    last.assert_async().await;
    single.assert_async().await;
    assert_eq!(last_message, single_message);
}

#[tokio::test]
async fn single_message_with_template() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/messages/abc123/single/onboarding");
            then.status(200).json_body(json!({
                "from": ["abc123"],
                "to": ["abc123@devinbox.io"],
                "subject": {"user_name": "John Doe"},
                "body": {"user_name": "John Doe"},
                "isHtml": true,
                "received": "2025-03-04T10:11:12Z"
            }));
        })
        .await;

    let parsed = client(&server)
        .get_single_message_with_template(KEY, "onboarding")
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(parsed.is_html);
    assert_eq!(parsed.subject["user_name"], "John Doe");
    assert_eq!(parsed.body["user_name"], "John Doe");
}

#[tokio::test]
async fn unknown_mailbox_surfaces_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/messages/missing/last");
            then.status(404).body("mailbox not found");
        })
        .await;

    let err = client(&server).get_last_message("missing").await.unwrap_err();

    match &err {
        Error::Api { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "mailbox not found");
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert!(err.is_not_found());
}

#[tokio::test]
async fn unauthorized_create_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/mailboxes");
            then.status(401).body("invalid api key");
        })
        .await;

    let err = client(&server).create_mailbox(None).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/messages/abc123/count");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client(&server).get_message_count(KEY).await.unwrap_err();

    match err {
        Error::Decode { body, .. } => assert_eq!(body, "<html>maintenance</html>"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_shape_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/mailboxes");
            then.status(200).json_body(json!({"id": 1}));
        })
        .await;

    let err = client(&server).create_mailbox(None).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_server() {
    let server = MockServer::start_async().await;
    let catch_all = server
        .mock_async(|_when, then| {
            then.status(200).json_body(json!({}));
        })
        .await;
    let client = client(&server);

    assert!(matches!(
        client.get_message_count("").await,
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        client.get_messages("  ", 0, 1).await,
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        client.get_messages(KEY, 0, 0).await,
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        client.get_single_message_with_template(KEY, "").await,
        Err(Error::InvalidArgument(_))
    ));

    assert_eq!(catch_all.hits_async().await, 0);
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    let client = Client::builder()
        .api_key(API_KEY)
        .base_url("http://127.0.0.1:1/")
        .build()
        .unwrap();

    let err = client.get_last_message(KEY).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/messages/abc123/count");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({"count": 1}));
        })
        .await;
    let client = Client::builder()
        .api_key(API_KEY)
        .base_url(server.base_url())
        .timeout(Some(Duration::from_millis(50)))
        .build()
        .unwrap();

    let err = client.get_message_count(KEY).await.unwrap_err();
    match err {
        Error::Transport(inner) => assert!(inner.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn clones_share_configuration() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/messages/abc123/count")
                .header("x-api-key", API_KEY);
            then.status(200).json_body(json!({"count": 2}));
        })
        .await;

    let client = client(&server);
    let handles: Vec<_> = (0..3)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_message_count(KEY).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().count, 2);
    }

    assert_eq!(mock.hits_async().await, 3);
}
