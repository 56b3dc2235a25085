//! Tests for `Dispatcher`.

use super::{Dispatcher, RetryPolicy, decode_body, parse_retry_after};
use crate::error::Error;
use crate::test_fixtures::{
    HangingTransport, MockTransport, RecordingSleeper, rate_limited, response,
};
use crate::transport::{HttpRequest, TransportError};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn test_request() -> HttpRequest {
    let url = url::Url::parse("https://pay.example.com/live/transaction-status").unwrap();
    HttpRequest::new(http::Method::POST, url).with_body(b"merchantOrderId=ORD1".to_vec())
}

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_retries(max_retries)
        .with_backoff_factor(0.5)
}

/// Builds a dispatcher over a shared mock so calls and delays stay observable.
fn dispatcher(
    transport: &Arc<MockTransport>,
    sleeper: &Arc<RecordingSleeper>,
    max_retries: u32,
) -> Dispatcher<Arc<MockTransport>, Arc<RecordingSleeper>> {
    Dispatcher::new(Arc::clone(transport), policy(max_retries)).with_sleeper(Arc::clone(sleeper))
}

mod success {
    use super::*;

    #[tokio::test]
    async fn decodes_json_body() {
        let transport = Arc::new(MockTransport::json(
            200,
            r#"{"merchantOrderId":"ORD1","status":"success"}"#,
        ));
        let sleeper = Arc::new(RecordingSleeper::default());

        let value = dispatcher(&transport, &sleeper, 3)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(value, json!({"merchantOrderId": "ORD1", "status": "success"}));
        assert_eq!(transport.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn wraps_non_json_body() {
        let transport = Arc::new(MockTransport::json(201, "accepted"));
        let sleeper = Arc::new(RecordingSleeper::default());

        let value = dispatcher(&transport, &sleeper, 0)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(value, json!({"raw": "accepted"}));
    }

    #[tokio::test]
    async fn forwards_request_unchanged_on_every_attempt() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(response(503, "busy")),
            Ok(response(200, "{}")),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut request = test_request();
        request.headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        dispatcher(&transport, &sleeper, 1)
            .dispatch(&request)
            .await
            .unwrap();

        let sent = transport.captured_requests();
        assert_eq!(sent.len(), 2);
        for req in sent {
            assert_eq!(req.url, request.url);
            assert_eq!(req.body, request.body);
            assert_eq!(
                req.headers.get(http::header::CONTENT_TYPE).unwrap(),
                "application/x-www-form-urlencoded"
            );
        }
    }
}

mod terminal_statuses {
    use super::*;

    #[tokio::test]
    async fn unauthorized_fails_without_retry() {
        let transport = Arc::new(MockTransport::json(401, "bad token"));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 5)
            .dispatch(&test_request())
            .await;

        match result {
            Err(Error::Auth { status, body }) => {
                assert_eq!(status, http::StatusCode::UNAUTHORIZED);
                assert_eq!(body, "bad token");
            }
            other => panic!("Expected Auth error, got {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn forbidden_fails_without_retry() {
        let transport = Arc::new(MockTransport::json(403, "nope"));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 5)
            .dispatch(&test_request())
            .await;

        assert!(matches!(
            result,
            Err(Error::Auth { status, .. }) if status == http::StatusCode::FORBIDDEN
        ));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn not_found_fails_without_retry() {
        let transport = Arc::new(MockTransport::json(404, "no such order"));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 5)
            .dispatch(&test_request())
            .await;

        assert!(matches!(result, Err(Error::NotFound { body }) if body == "no such order"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn other_client_error_fails_without_retry() {
        let transport = Arc::new(MockTransport::json(422, r#"{"error":"invalid amount"}"#));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 5)
            .dispatch(&test_request())
            .await;

        assert!(matches!(
            result,
            Err(Error::Http { status, .. }) if status == http::StatusCode::UNPROCESSABLE_ENTITY
        ));
        assert_eq!(transport.calls(), 1);
    }
}

mod rate_limiting {
    use super::*;

    #[tokio::test]
    async fn retry_after_hint_is_honored_then_succeeds() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(rate_limited("2")),
            Ok(response(200, r#"{"ok":true}"#)),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let value = dispatcher(&transport, &sleeper, 1)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(transport.calls(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn backoff_wins_over_shorter_hint() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(rate_limited("0")),
            Ok(rate_limited("0")),
            Ok(response(200, "{}")),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        dispatcher(&transport, &sleeper, 2)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(500), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn unparsable_hint_falls_back_to_backoff() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(rate_limited("Wed, 21 Oct 2015 07:28:00 GMT")),
            Ok(response(200, "{}")),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        dispatcher(&transport, &sleeper, 1)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(sleeper.delays(), vec![Duration::from_millis(500)]);
    }

    #[tokio::test]
    async fn non_ascii_hint_still_retries_with_backoff() {
        let mut limited = response(429, "slow down");
        limited.headers.insert(
            http::header::RETRY_AFTER,
            http::HeaderValue::from_bytes(b"\xff2").unwrap(),
        );
        let transport = Arc::new(MockTransport::new(vec![
            Ok(limited),
            Ok(response(200, r#"{"ok":true}"#)),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let value = dispatcher(&transport, &sleeper, 2)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(transport.calls(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(500)]);
    }

    #[tokio::test]
    async fn missing_hint_fails_immediately() {
        let transport = Arc::new(MockTransport::json(429, "slow down"));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 3)
            .dispatch(&test_request())
            .await;

        assert!(matches!(
            result,
            Err(Error::RateLimit {
                retry_after: None,
                ..
            })
        ));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn exhausted_budget_surfaces_rate_limit() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(rate_limited("1")),
            Ok(rate_limited("1")),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 1)
            .dispatch(&test_request())
            .await;

        match result {
            Err(Error::RateLimit { retry_after, body }) => {
                assert_eq!(retry_after, Some(Duration::from_secs(1)));
                assert_eq!(body, "slow down");
            }
            other => panic!("Expected RateLimit error, got {other:?}"),
        }
        assert_eq!(transport.calls(), 2);
        assert_eq!(sleeper.delays().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn real_sleeper_waits_for_hint() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(rate_limited("2")),
            Ok(response(200, "{}")),
        ]));
        let dispatcher = Dispatcher::new(Arc::clone(&transport), policy(1));
        let start = tokio::time::Instant::now();

        dispatcher.dispatch(&test_request()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(transport.calls(), 2);
    }
}

mod server_errors {
    use super::*;

    #[tokio::test]
    async fn repeated_500_exhausts_budget() {
        let transport = Arc::new(MockTransport::new(
            (0..4).map(|_| Ok(response(500, "boom"))).collect(),
        ));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 3)
            .dispatch(&test_request())
            .await;

        match result {
            Err(Error::Http { status, body }) => {
                assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("Expected Http error, got {other:?}"),
        }
        assert_eq!(transport.calls(), 4);
        assert_eq!(
            sleeper.delays(),
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
            ]
        );
    }

    #[tokio::test]
    async fn server_error_then_success() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(response(502, "bad gateway")),
            Ok(response(200, r#"{"status":"pending"}"#)),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let value = dispatcher(&transport, &sleeper, 3)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(value["status"], "pending");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn zero_retries_makes_single_attempt() {
        let transport = Arc::new(MockTransport::json(500, "boom"));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 0)
            .dispatch(&test_request())
            .await;

        assert!(matches!(result, Err(Error::Http { .. })));
        assert_eq!(transport.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }
}

mod transport_failures {
    use super::*;

    #[tokio::test]
    async fn connection_error_then_success() {
        let transport = Arc::new(MockTransport::new(vec![
            Err(TransportError::Connection(Box::new(std::io::Error::other(
                "refused",
            )))),
            Ok(response(200, "{}")),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        dispatcher(&transport, &sleeper, 2)
            .dispatch(&test_request())
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(500)]);
    }

    #[tokio::test]
    async fn exhausted_budget_propagates_transport_error() {
        let transport = Arc::new(MockTransport::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Connection(Box::new(std::io::Error::other(
                "reset by peer",
            )))),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = dispatcher(&transport, &sleeper, 1)
            .dispatch(&test_request())
            .await;

        match result {
            Err(Error::Transport(TransportError::Connection(source))) => {
                assert!(source.to_string().contains("reset by peer"));
            }
            other => panic!("Expected Transport error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_aborts_hanging_exchange_and_retries() {
        let transport = Arc::new(HangingTransport::default());
        let dispatcher = Dispatcher::new(
            Arc::clone(&transport),
            policy(1).with_timeout(Duration::from_secs(5)),
        )
        .with_sleeper(Arc::new(RecordingSleeper::default()));

        let result = dispatcher.dispatch(&test_request()).await;

        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::Timeout))
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}

mod helpers {
    use super::*;

    #[test]
    fn parse_retry_after_accepts_seconds() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 1.5 "), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn parse_retry_after_rejects_garbage() {
        assert_eq!(parse_retry_after(""), None);
        assert_eq!(parse_retry_after("-3"), None);
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after("NaN"), None);
    }

    #[test]
    fn decode_body_wraps_empty_body() {
        assert_eq!(decode_body(b""), json!({"raw": ""}));
    }

    #[test]
    fn decode_body_keeps_json_scalars() {
        assert_eq!(decode_body(b"42"), json!(42));
    }
}
