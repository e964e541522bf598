use std::fs;

use studio_engine::{
    download_filename, download_to_dir, ensure_output_dir, report_filename, AtomicFileWriter,
    DownloadError, FailureKind, FetchSettings, ReqwestStudioApi,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn filenames_are_timestamped() {
    assert_eq!(download_filename(1_700_000_000_123), "bria_ai_1700000000123.png");
    assert_eq!(report_filename(42), "studio_results_42.html");
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn writer_never_overwrites_existing_files() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("bria_ai_1.png", b"first").unwrap();
    let second = writer.write("bria_ai_1.png", b"second").unwrap();
    let third = writer.write("bria_ai_1.png", b"third").unwrap();

    assert_eq!(first.file_name().unwrap(), "bria_ai_1.png");
    assert_eq!(second.file_name().unwrap(), "bria_ai_1_1.png");
    assert_eq!(third.file_name().unwrap(), "bria_ai_1_2.png");
    assert_eq!(fs::read(&first).unwrap(), b"first");
    assert_eq!(fs::read(&second).unwrap(), b"second");
}

#[test]
fn writer_fails_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("bria_ai_1.png", b"data").is_err());
    assert!(!temp.path().join("bria_ai_1.png").exists());
}

#[tokio::test]
async fn download_saves_bytes_under_timestamped_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"png-bytes".to_vec(), "image/png"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let api = ReqwestStudioApi::new(FetchSettings::default()).unwrap();
    let url = format!("{}/u1.png", server.uri());

    let saved = download_to_dir(&api, &url, temp.path(), 42, &CancellationToken::new())
        .await
        .expect("download ok");

    assert_eq!(saved, temp.path().join("bria_ai_42.png"));
    assert_eq!(fs::read(&saved).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn failed_download_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let api = ReqwestStudioApi::new(FetchSettings::default()).unwrap();
    let url = format!("{}/gone.png", server.uri());

    let err = download_to_dir(&api, &url, temp.path(), 42, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::Fetch(ref fetch) if fetch.kind == FailureKind::HttpStatus(404)
    ));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}
