//! Functional tests for session routing, fan-out and aggregation

#[path = "../common/mod.rs"]
mod common;

use chat_relay_gateway::backend::{BackendResult, NOT_CONFIGURED};
use chat_relay_gateway::routing::{default_mode, MessageRouter, RenderPolicy};
use chat_relay_gateway::session::{RoutingMode, SessionId, SessionStore};
use chat_relay_gateway::AppError;
use common::MockAdapter;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn router(adapters: &[Arc<MockAdapter>], default: RoutingMode) -> MessageRouter {
    MessageRouter::new(
        common::registry(adapters),
        Arc::new(SessionStore::new(default)),
    )
}

#[tokio::test]
async fn test_single_backend_calls_only_selected_provider() {
    let gemini = Arc::new(MockAdapter::replying("gemini", "from gemini"));
    let grok = Arc::new(MockAdapter::replying("grok", "from grok"));
    let router = router(&[gemini.clone(), grok.clone()], RoutingMode::single("grok"));
    let session = SessionId::from(1_i64);

    router
        .select_mode(&session, RoutingMode::single("gemini"))
        .unwrap();
    let response = router.route(&session, "hello").await.unwrap();

    assert_eq!(response.policy, RenderPolicy::Bare);
    assert_eq!(response.providers(), vec!["gemini"]);
    assert_eq!(response.render(), "from gemini <hello>");
    assert_eq!(gemini.calls(), 1);
    assert_eq!(grok.calls(), 0);
}

#[tokio::test]
async fn test_all_backends_keeps_dispatch_order() {
    // A fails quickly, B succeeds slowly: arrival order is [A, B].
    let a = Arc::new(MockAdapter::failing("a", "boom"));
    let b = Arc::new(MockAdapter::replying("b", "ok").with_delay(Duration::from_millis(100)));
    let router = router(&[a, b], RoutingMode::AllBackends);

    let response = router.route(&SessionId::from("s"), "q").await.unwrap();
    let results: Vec<_> = response.backend_results().cloned().collect();

    assert_eq!(response.policy, RenderPolicy::Labeled);
    assert_eq!(
        results,
        vec![
            BackendResult::failure("a", "boom"),
            BackendResult::success("b", "ok <q>"),
        ]
    );
}

#[tokio::test]
async fn test_all_backends_order_ignores_completion_order() {
    // A fails slowly, B succeeds at once: arrival order is [B, A].
    let a = Arc::new(MockAdapter::failing("a", "boom").with_delay(Duration::from_millis(100)));
    let b = Arc::new(MockAdapter::replying("b", "ok"));
    let router = router(&[a, b], RoutingMode::AllBackends);

    let response = router.route(&SessionId::from("s"), "q").await.unwrap();
    let results: Vec<_> = response.backend_results().collect();

    assert_eq!(response.providers(), vec!["a", "b"]);
    assert!(!results[0].is_success());
    assert!(results[1].is_success());
}

#[tokio::test]
async fn test_fan_out_is_concurrent() {
    let delay = Duration::from_millis(400);
    let a = Arc::new(MockAdapter::replying("a", "x").with_delay(delay));
    let b = Arc::new(MockAdapter::replying("b", "y").with_delay(delay));
    let router = router(&[a, b], RoutingMode::AllBackends);

    let started = Instant::now();
    let response = router.route(&SessionId::from("s"), "q").await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response.results.len(), 2);
    assert!(elapsed >= delay);
    assert!(
        elapsed < delay * 2 - Duration::from_millis(100),
        "fan-out took {:?}, expected close to {:?}",
        elapsed,
        delay
    );
}

#[tokio::test]
async fn test_panicking_provider_does_not_sink_siblings() {
    let a = Arc::new(MockAdapter::panicking("a"));
    let b = Arc::new(MockAdapter::replying("b", "fine"));
    let router = router(&[a, b], RoutingMode::AllBackends);

    let response = router.route(&SessionId::from("s"), "q").await.unwrap();
    let results: Vec<_> = response.backend_results().collect();

    assert_eq!(results.len(), 2);
    match results[0] {
        BackendResult::Failure { provider, reason } => {
            assert_eq!(provider, "a");
            assert!(reason.starts_with("task failed"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(results[1].is_success());
}

#[tokio::test]
async fn test_unconfigured_provider_is_a_failure_result() {
    let a = Arc::new(MockAdapter::replying("a", "x").unavailable());
    let b = Arc::new(MockAdapter::replying("b", "y"));
    let router = router(&[a.clone(), b], RoutingMode::AllBackends);

    let response = router.route(&SessionId::from("s"), "q").await.unwrap();
    let results: Vec<_> = response.backend_results().cloned().collect();

    assert_eq!(results[0], BackendResult::failure("a", NOT_CONFIGURED));
    assert!(results[1].is_success());
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn test_unknown_provider_fails_before_dispatch() {
    let a = Arc::new(MockAdapter::replying("a", "x"));
    let store = Arc::new(SessionStore::new(RoutingMode::single("a")));
    let router = MessageRouter::new(common::registry(&[a.clone()]), store.clone());
    let session = SessionId::from("s");

    // Bypass selection-time validation to simulate a stale mode.
    store.set_mode(&session, RoutingMode::single("ghost"));
    let result = router.route(&session, "q").await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn test_select_unknown_provider_is_rejected() {
    let a = Arc::new(MockAdapter::replying("a", "x"));
    let router = router(&[a], RoutingMode::single("a"));
    let session = SessionId::from("s");

    let result = router.select_mode(&session, RoutingMode::single("ghost"));

    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert_eq!(router.current_mode(&session), RoutingMode::single("a"));
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let a = Arc::new(MockAdapter::replying("a", "x"));
    let router = router(&[a.clone()], RoutingMode::single("a"));

    let result = router.route(&SessionId::from("s"), "   ").await;

    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn test_respond_splits_long_replies() {
    let long = "x".repeat(9000);
    let a = Arc::new(MockAdapter::replying("a", &long));
    let router = router(&[a], RoutingMode::single("a"));

    let reply = router.respond(&SessionId::from("s"), "q", 4000).await.unwrap();
    let fragments = reply.fragments;

    assert_eq!(fragments.len(), 3);
    assert!(fragments.iter().all(|f| f.text.chars().count() <= 4000));
    let joined: String = fragments.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(joined, format!("{} <q>", long));
}

#[tokio::test]
async fn test_reply_reports_mode_used_for_dispatch() {
    let a = Arc::new(MockAdapter::replying("a", "x").with_delay(Duration::from_millis(200)));
    let b = Arc::new(MockAdapter::replying("b", "y"));
    let router = router(&[a.clone(), b.clone()], RoutingMode::single("a"));
    let session = SessionId::from("s");

    let (reply, _) = tokio::join!(router.respond(&session, "q", 4000), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        router.select_mode(&session, RoutingMode::single("b")).unwrap();
    });

    let reply = reply.unwrap();
    assert_eq!(reply.mode, RoutingMode::single("a"));
    assert_eq!(reply.fragments[0].text, "x <q>");
    assert_eq!(router.current_mode(&session), RoutingMode::single("b"));
    assert_eq!(b.calls(), 0);
}

#[tokio::test]
async fn test_status_report() {
    let a = Arc::new(MockAdapter::replying("a", "x"));
    let b = Arc::new(MockAdapter::replying("b", "y").unavailable());
    let router = router(&[a, b], RoutingMode::AllBackends);

    let report = router.status(&SessionId::from("s"));

    assert_eq!(report.mode, RoutingMode::AllBackends);
    assert_eq!(report.providers.len(), 2);
    assert!(report.providers[0].available);
    assert!(!report.providers[1].available);
    assert!(!report.all_operational);
}

#[tokio::test]
async fn test_default_mode_prefers_first_available() {
    let a = Arc::new(MockAdapter::replying("a", "x").unavailable());
    let b = Arc::new(MockAdapter::replying("b", "y"));
    let registry = common::registry(&[a, b]);

    assert_eq!(default_mode(None, &registry).unwrap(), RoutingMode::single("b"));
    assert_eq!(default_mode(Some("all"), &registry).unwrap(), RoutingMode::AllBackends);
    assert!(default_mode(Some("ghost"), &registry).is_err());
}

#[tokio::test]
async fn test_no_providers_is_a_configuration_error() {
    let router = router(&[], RoutingMode::AllBackends);

    let result = router.route(&SessionId::from("s"), "q").await;
    assert!(matches!(result, Err(AppError::Configuration(_))));
}
