//! Integration tests for the request lifecycle
//!
//! These drive the API client, services and views against mock servers and
//! check loading signals, busy state and notifications end to end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use analyzer::events::{ActivityBus, ApiEvent};
use analyzer::http::{
    ApiClient, ApiResponse, ErrorKind, FALLBACK_UNREACHABLE_MESSAGE, HttpError, Interceptor, RequestConfig,
    RequestContext, RequestSpec,
};
use analyzer::lifecycle::{LoadingSignal, RequestLifecycle};
use analyzer::notify::{API_ERROR_KEY, NotificationCenter, NotificationKind};
use analyzer::services::{
    ANALYSIS_SUCCESS_MESSAGE, AnalysisApi, AnalysisService, HistoryApi, HistoryQuery, HistoryService,
};
use analyzer::views::{AnalyzerView, HistoryView, score_label};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Rig {
    lifecycle: Arc<RequestLifecycle>,
    center: Arc<NotificationCenter>,
    signals: Arc<Mutex<Vec<LoadingSignal>>>,
    busy: Arc<Mutex<Vec<bool>>>,
}

impl Rig {
    fn new() -> Self {
        let lifecycle = Arc::new(RequestLifecycle::new());

        let signals = Arc::new(Mutex::new(Vec::new()));
        let sink = signals.clone();
        lifecycle
            .bus()
            .subscribe(Arc::new(move |s: LoadingSignal| sink.lock().unwrap().push(s)));

        let busy = Arc::new(Mutex::new(Vec::new()));
        let sink = busy.clone();
        lifecycle
            .state()
            .on_busy_change(move |b| sink.lock().unwrap().push(b));

        Self {
            lifecycle,
            center: Arc::new(NotificationCenter::new()),
            signals,
            busy,
        }
    }

    fn client(&self, base_url: &str) -> Arc<ApiClient> {
        Arc::new(
            ApiClient::builder(self.lifecycle.clone())
                .base_url(base_url)
                .timeout(Duration::from_secs(5))
                .notifier(self.center.clone())
                .build()
                .expect("client should build"),
        )
    }

    fn busy(&self) -> Vec<bool> {
        self.busy.lock().unwrap().clone()
    }

    fn signals(&self) -> Vec<LoadingSignal> {
        self.signals.lock().unwrap().clone()
    }
}

fn history_page(page: u32, total_pages: u32) -> serde_json::Value {
    json!({
        "success": true,
        "data": [
            {"id": page * 10 + 1, "text": "Clause on deposits", "score": 71, "created_on": "2025-02-03T10:00:00Z"},
            {"id": page * 10 + 2, "text": "Clause on notice", "score": 40, "created_on": "2025-02-02T10:00:00Z"}
        ],
        "pagination": {"total": total_pages * 5, "page": page, "limit": 5, "totalPages": total_pages}
    })
}

// =============================================================================
// Counter and busy state
// =============================================================================

#[tokio::test]
async fn test_overlapping_calls_keep_busy_until_last() {
    let server = MockServer::start().await;
    for (p, delay) in [("/a", 50u64), ("/b", 150), ("/c", 300)] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(delay)))
            .mount(&server)
            .await;
    }

    let rig = Rig::new();
    let client = rig.client(&server.uri());
    let config = RequestConfig::default();

    let results = futures::future::join_all(
        ["/a", "/b", "/c"]
            .into_iter()
            .map(|p| client.send(RequestSpec::get(p), &config)),
    )
    .await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(rig.busy(), vec![true, false]);
    assert_eq!(rig.lifecycle.state().in_flight(), 0);

    let signals = rig.signals();
    assert_eq!(signals.len(), 6);
    assert_eq!(signals.iter().filter(|s| **s == LoadingSignal::Start).count(), 3);
    assert_eq!(signals[..3], [LoadingSignal::Start; 3]);
}

#[tokio::test]
async fn test_failure_before_transmission_still_balances() {
    let rig = Rig::new();
    let client = rig.client("::not-a-url::");

    let err = client
        .send(RequestSpec::get("/history"), &RequestConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(rig.signals(), vec![LoadingSignal::Start, LoadingSignal::End]);
    assert_eq!(rig.busy(), vec![true, false]);
}

#[tokio::test]
async fn test_cancelled_call_ends_its_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let rig = Rig::new();
    let client = rig.client(&server.uri());

    let task = {
        let client = client.clone();
        tokio::spawn(async move {
            let _ = client
                .send(RequestSpec::get("/slow"), &RequestConfig::default())
                .await;
        })
    };

    let mut busy_rx = rig.lifecycle.state().watch();
    tokio::time::timeout(Duration::from_secs(5), busy_rx.wait_for(|b| *b))
        .await
        .expect("call should start")
        .unwrap();

    task.abort();
    let _ = task.await;

    assert_eq!(rig.lifecycle.state().in_flight(), 0);
    assert_eq!(rig.busy(), vec![true, false]);
}

struct BusyRecorder {
    lifecycle: Arc<RequestLifecycle>,
    seen: Mutex<Vec<(&'static str, bool)>>,
}

impl Interceptor for BusyRecorder {
    fn on_request(&self, _ctx: &RequestContext) {
        self.seen.lock().unwrap().push(("request", self.lifecycle.is_busy()));
    }

    fn on_success(&self, _ctx: &RequestContext, _response: &ApiResponse, _config: &RequestConfig) {
        self.seen.lock().unwrap().push(("success", self.lifecycle.is_busy()));
    }
}

#[tokio::test]
async fn test_hooks_run_inside_and_after_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let lifecycle = Arc::new(RequestLifecycle::new());
    let recorder = Arc::new(BusyRecorder {
        lifecycle: lifecycle.clone(),
        seen: Mutex::new(Vec::new()),
    });
    let client = ApiClient::builder(lifecycle)
        .base_url(server.uri())
        .interceptor(recorder.clone())
        .build()
        .unwrap();

    client
        .send(RequestSpec::get("/ping"), &RequestConfig::default())
        .await
        .unwrap();

    assert_eq!(*recorder.seen.lock().unwrap(), vec![("request", true), ("success", false)]);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_silent_call_raises_nothing_but_returns_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .mount(&server)
        .await;

    let rig = Rig::new();
    let client = rig.client(&server.uri());

    let err = client
        .send(RequestSpec::get("/history"), &RequestConfig::silent())
        .await
        .unwrap_err();

    assert_eq!(err.server_message(), Some("db down"));
    assert!(rig.center.visible().is_empty());
    assert_eq!(rig.busy(), vec![true, false]);
}

#[tokio::test]
async fn test_rapid_errors_are_coalesced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let rig = Rig::new();
    let client = rig.client(&server.uri());
    let config = RequestConfig::default();

    let results =
        futures::future::join_all((0..3).map(|_| client.send(RequestSpec::get("/history"), &config))).await;
    assert!(results.iter().all(|r| r.is_err()));

    let visible = rig.center.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].kind, NotificationKind::Error);
    assert_eq!(visible[0].dedup_key.as_deref(), Some(API_ERROR_KEY));
}

#[tokio::test]
async fn test_expired_session_is_notified_and_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let rig = Rig::new();
    let client = rig.client(&server.uri());

    let err = client
        .send(RequestSpec::get("/history"), &RequestConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::AuthExpired { ref message } if message.as_deref() == Some("jwt expired")));
    let visible = rig.center.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].kind, NotificationKind::Error);
    assert_eq!(visible[0].text, "jwt expired");
    assert_eq!(visible[0].dedup_key.as_deref(), Some(API_ERROR_KEY));
    assert_eq!(rig.busy(), vec![true, false]);
    assert_eq!(rig.lifecycle.state().in_flight(), 0);
}

#[tokio::test]
async fn test_success_and_error_both_visible() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let rig = Rig::new();
    let client = rig.client(&server.uri());

    client
        .send(RequestSpec::get("/ok"), &RequestConfig::new().with_success_message("Saved"))
        .await
        .unwrap();
    let _ = client.send(RequestSpec::get("/broken"), &RequestConfig::default()).await;

    let kinds: Vec<NotificationKind> = rig.center.visible().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Error]);
}

// =============================================================================
// Analyzer
// =============================================================================

#[tokio::test]
async fn test_short_text_is_rejected_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let rig = Rig::new();
    let service: Arc<dyn AnalysisApi> = Arc::new(AnalysisService::new(rig.client(&server.uri())));
    let mut view = AnalyzerView::new(service, rig.center.clone());
    view.set_text("short");

    assert!(view.submit().await.is_err());
    assert!(rig.busy().is_empty());
    assert!(rig.signals().is_empty());
    assert_eq!(rig.center.visible().len(), 1);
}

#[tokio::test]
async fn test_analysis_shows_score_and_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"score": 82, "status": "success"}))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let rig = Rig::new();
    let service: Arc<dyn AnalysisApi> = Arc::new(AnalysisService::new(rig.client(&server.uri())));
    let mut view = AnalyzerView::new(service, rig.center.clone());
    view.set_text(
        "The tenant agrees to keep the premises in good repair and to return the keys on the final day.",
    );

    let score = view.submit().await.unwrap().score;

    assert_eq!(score_label(score), "82%");
    assert_eq!(rig.busy(), vec![true, false]);
    let visible = rig.center.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].kind, NotificationKind::Success);
    assert_eq!(visible[0].text, ANALYSIS_SUCCESS_MESSAGE);
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_history_against_unreachable_server() {
    let rig = Rig::new();
    let service = HistoryService::new(rig.client("http://127.0.0.1:1"));

    let err = service.history(&HistoryQuery::default()).await.unwrap_err();

    assert!(matches!(err, HttpError::NetworkUnreachable(_)));
    let visible = rig.center.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].text, FALLBACK_UNREACHABLE_MESSAGE);
    assert!(!rig.lifecycle.is_busy());
    assert_eq!(rig.busy(), vec![true, false]);
}

#[tokio::test]
async fn test_history_next_page_is_its_own_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(1, 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(2, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let rig = Rig::new();
    let service: Arc<dyn HistoryApi> = Arc::new(HistoryService::new(rig.client(&server.uri())));
    let mut view = HistoryView::new(service, 5);

    view.refresh().await.unwrap();
    assert_eq!(view.total_pages(), 3);

    assert!(view.next_page().await.unwrap());
    assert_eq!(view.page(), 2);
    assert_eq!(view.items()[0].id, 21);
    assert_eq!(rig.busy(), vec![true, false, true, false]);
}

// =============================================================================
// Activity events
// =============================================================================

#[tokio::test]
async fn test_activity_events_pair_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(1, 1)))
        .mount(&server)
        .await;

    let lifecycle = Arc::new(RequestLifecycle::new());
    let bus = Arc::new(ActivityBus::new(16));
    let mut rx = bus.subscribe();
    let client = ApiClient::builder(lifecycle)
        .base_url(server.uri())
        .activity(bus.clone())
        .build()
        .unwrap();

    client
        .send(RequestSpec::get("/history"), &RequestConfig::default())
        .await
        .unwrap();

    let started = rx.recv().await.unwrap();
    let settled = rx.recv().await.unwrap();
    assert!(matches!(started, ApiEvent::RequestStarted { ref path, .. } if path == "/history"));
    assert!(matches!(settled, ApiEvent::RequestSucceeded { status: 200, .. }));
    assert_eq!(started.request_id(), settled.request_id());
}
