//! Pull-mode feed integration tests against a mock HTTP backend.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lumi_webui::config::FeedConfig;
use lumi_webui::feed::renderer::FrameSink;
use lumi_webui::{FeedController, FeedMode, FeedState, UiEvent};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records the wall-clock time of every presented frame.
#[derive(Clone, Default)]
struct TimestampSink {
    times: Arc<Mutex<Vec<Instant>>>,
}

impl FrameSink for TimestampSink {
    fn present(&mut self, _frame: &image::DynamicImage) {
        self.times
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Instant::now());
    }
}

impl TimestampSink {
    fn times(&self) -> Vec<Instant> {
        self.times
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([200, 100, 50, 255]));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("png encode");
    cursor.into_inner()
}

fn feed_config(server_uri: &str, budget_ms: u64, retry_ms: u64) -> FeedConfig {
    FeedConfig {
        frame_url: format!("{server_uri}/frame"),
        default_mode: FeedMode::Pull,
        frame_budget_ms: budget_ms,
        retry_delay_ms: retry_ms,
        ..FeedConfig::default()
    }
}

#[tokio::test]
async fn frames_are_spaced_by_at_least_the_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/frame"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png_bytes(), "image/png"))
        .mount(&server)
        .await;

    let sink = TimestampSink::default();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = FeedController::new(
        feed_config(&server.uri(), 50, 1000),
        Arc::new(Mutex::new(sink.clone())),
        tx,
    );

    controller.start().expect("start");
    tokio::time::sleep(Duration::from_millis(400)).await;
    controller.stop();

    let times = sink.times();
    assert!(
        times.len() >= 2,
        "expected several frames in 400 ms, got {}",
        times.len()
    );
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap >= Duration::from_millis(45),
            "frames presented {gap:?} apart, budget is 50 ms"
        );
    }
    assert_eq!(controller.state(), FeedState::Stopped);
}

#[tokio::test]
async fn fetch_failures_degrade_and_retry_on_the_fixed_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/frame"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = TimestampSink::default();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = FeedController::new(
        // Short retry delay so three failures fit in the test window.
        feed_config(&server.uri(), 50, 100),
        Arc::new(Mutex::new(sink.clone())),
        tx,
    );

    controller.start().expect("start");
    tokio::time::sleep(Duration::from_millis(370)).await;
    assert_eq!(controller.state(), FeedState::Degraded);
    controller.stop();

    // One initial attempt plus one retry per delay window, nothing tighter.
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(
        (2..=5).contains(&requests.len()),
        "expected ~4 attempts in 370 ms with 100 ms retry delay, got {}",
        requests.len()
    );
    assert!(sink.times().is_empty(), "no frame should have been presented");

    let mut saw_degraded = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(
            event,
            UiEvent::FeedState {
                state: FeedState::Degraded,
                ..
            }
        ) {
            saw_degraded = true;
        }
    }
    assert!(saw_degraded, "Degraded should be reported on first failure");
}

#[tokio::test]
async fn cache_busting_query_varies_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/frame"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png_bytes(), "image/png"))
        .mount(&server)
        .await;

    let sink = TimestampSink::default();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = FeedController::new(
        feed_config(&server.uri(), 20, 1000),
        Arc::new(Mutex::new(sink)),
        tx,
    );

    controller.start().expect("start");
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.stop();

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.len() >= 2);
    for request in &requests {
        let query = request.url.query().unwrap_or_default();
        assert!(query.starts_with("t="), "missing cache buster: {query:?}");
    }
}

#[tokio::test]
async fn in_flight_response_after_stop_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/frame"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(png_bytes(), "image/png")
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let sink = TimestampSink::default();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = FeedController::new(
        feed_config(&server.uri(), 50, 1000),
        Arc::new(Mutex::new(sink.clone())),
        tx,
    );

    controller.start().expect("start");
    // Stop while the first request is still in flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.stop();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(
        sink.times().is_empty(),
        "a response resolving after teardown must not be presented"
    );
    assert_eq!(controller.state(), FeedState::Stopped);
}
