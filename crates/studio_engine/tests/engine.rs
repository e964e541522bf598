use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use studio_engine::{
    EngineConfig, EngineEvent, EngineHandle, FailureKind, FetchSettings, Operation,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer, download_dir: &TempDir) -> EngineHandle {
    let config = EngineConfig {
        fetch: FetchSettings {
            base_url: server.uri(),
            ..FetchSettings::default()
        },
        download_dir: download_dir.path().to_path_buf(),
        timestamp_millis: Arc::new(|| 7),
    };
    EngineHandle::new(config).expect("engine starts")
}

/// Waits for the first event `pick` accepts, skipping the rest.
fn wait_for<T>(engine: &EngineHandle, mut pick: impl FnMut(EngineEvent) -> Option<T>) -> T {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(100)) {
            if let Some(found) = pick(event) {
                return found;
            }
        }
    }
    panic!("expected engine event did not arrive");
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_images_reports_completion_with_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/image/sunset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "image_urls": ["https://cdn.example/u1.png"]
        })))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let engine = engine_for(&server, &temp);

    engine.generate_images(3, "sunset");
    let (request_id, result) = tokio::task::block_in_place(|| {
        wait_for(&engine, |event| match event {
            EngineEvent::ImagesCompleted { request_id, result } => Some((request_id, result)),
            _ => None,
        })
    });

    assert_eq!(request_id, 3);
    assert_eq!(
        result.expect("images ok").into_image_urls(),
        vec!["https://cdn.example/u1.png".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn timer_emits_zero_tick_immediately() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let engine = engine_for(&server, &temp);

    engine.start_timer(Operation::BackgroundRemoval);
    let elapsed = tokio::task::block_in_place(|| {
        wait_for(&engine, |event| match event {
            EngineEvent::TimerTick {
                operation: Operation::BackgroundRemoval,
                elapsed_secs,
            } => Some(elapsed_secs),
            _ => None,
        })
    });
    engine.stop_timer(Operation::BackgroundRemoval);

    assert_eq!(elapsed, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_all_abandons_pending_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prompt/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "enhanced_prompt": "late" })),
        )
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let engine = engine_for(&server, &temp);

    engine.enhance_prompt(1, "slow");
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.cancel_all();

    let result = tokio::task::block_in_place(|| {
        wait_for(&engine, |event| match event {
            EngineEvent::EnhanceCompleted { result, .. } => Some(result),
            _ => None,
        })
    });
    assert_eq!(result.unwrap_err().kind, FailureKind::Cancelled);
}

#[tokio::test(flavor = "multi_thread")]
async fn download_reports_saved_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"png".to_vec(), "image/png"))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let engine = engine_for(&server, &temp);
    let url = format!("{}/u1.png", server.uri());

    engine.download(url.clone());
    let (reported_url, result) = tokio::task::block_in_place(|| {
        wait_for(&engine, |event| match event {
            EngineEvent::DownloadCompleted { url, result } => Some((url, result)),
            _ => None,
        })
    });

    assert_eq!(reported_url, url);
    assert_eq!(result.expect("saved"), temp.path().join("bria_ai_7.png"));
}
