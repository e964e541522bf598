use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use studio_core::{
    update, AlertSeverity, AppState, Effect, Msg, Operation, PanelContent, RequestFailure,
    SelectedFile, FILE_LABEL_PLACEHOLDER,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn png(name: &str, size: u64) -> SelectedFile {
    SelectedFile {
        path: PathBuf::from(format!("/photos/{name}")),
        name: name.to_string(),
        mime_type: "image/png".to_string(),
        size,
    }
}

fn with_file(file: SelectedFile) -> AppState {
    let (state, effects) = update(AppState::new(), Msg::FileSelected(Some(file)));
    assert!(effects.is_empty());
    state
}

#[test]
fn valid_file_updates_label() {
    init_logging();
    let state = with_file(png("cat.png", 2048));

    let view = state.view();
    assert_eq!(view.file_label, "cat.png");
    assert_eq!(view.alert, None);
}

#[test]
fn oversize_file_is_rejected_before_any_request() {
    init_logging();
    let state = with_file(png("huge.png", 12 * 1024 * 1024));

    let view = state.view();
    assert_eq!(view.file_label, FILE_LABEL_PLACEHOLDER);
    let alert = view.alert.expect("alert");
    assert_eq!(alert.title, "Invalid File");
    assert_eq!(alert.text, "File too large. Maximum size: 10MB");
    assert_eq!(alert.severity, AlertSeverity::Error);

    let (state, effects) = update(state, Msg::RemoveBackgroundClicked);
    assert!(effects.is_empty());
    assert_eq!(state.view().alert.expect("alert").text, "No file selected");
    assert!(!state.view().removal.visible);
}

#[test]
fn clearing_the_selection_resets_label() {
    init_logging();
    let state = with_file(png("cat.png", 2048));
    let (state, _) = update(state, Msg::FileSelected(None));

    assert_eq!(state.view().file_label, FILE_LABEL_PLACEHOLDER);
}

#[test]
fn removal_uploads_selected_file_with_timer() {
    init_logging();
    let file = png("cat.png", 2048);
    let state = with_file(file.clone());
    let (state, effects) = update(state, Msg::RemoveBackgroundClicked);

    assert_eq!(
        effects,
        vec![
            Effect::StartTimer {
                operation: Operation::BackgroundRemoval,
            },
            Effect::RemoveBackground {
                request_id: 1,
                file,
            },
        ]
    );
    let view = state.view();
    assert!(view.removal.visible);
    assert!(!view.removal.trigger_enabled);
    assert_eq!(view.removal.timer_text.as_deref(), Some("Processing... 0s"));
}

#[test]
fn result_url_is_rendered_with_download() {
    init_logging();
    let state = with_file(png("cat.png", 2048));
    let (state, _) = update(state, Msg::RemoveBackgroundClicked);
    let (state, effects) = update(
        state,
        Msg::BackgroundRemovalFinished {
            request_id: 1,
            result: Ok(Some("https://x/cut.png".to_string())),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::StopTimer {
            operation: Operation::BackgroundRemoval,
        }]
    );
    match state.view().removal.content {
        PanelContent::Images(images) => {
            assert_eq!(images.len(), 1);
            assert_eq!(images[0].url, "https://x/cut.png");
            assert_eq!(images[0].alt, "Background removed image");
            assert!(images[0].download.enabled);
        }
        other => panic!("unexpected content {other:?}"),
    }
    assert_eq!(state.downloadable_urls(), vec!["https://x/cut.png".to_string()]);
}

#[test]
fn missing_url_is_informational() {
    init_logging();
    let state = with_file(png("cat.png", 2048));
    let (state, _) = update(state, Msg::RemoveBackgroundClicked);
    let (state, _) = update(
        state,
        Msg::BackgroundRemovalFinished {
            request_id: 1,
            result: Ok(None),
        },
    );

    assert_eq!(
        state.view().removal.content,
        PanelContent::Info("Could not process the image. Please try again.".to_string())
    );
}

#[test]
fn network_failure_shows_transport_message() {
    init_logging();
    let state = with_file(png("cat.png", 2048));
    let (state, _) = update(state, Msg::RemoveBackgroundClicked);
    let (state, _) = update(
        state,
        Msg::BackgroundRemovalFinished {
            request_id: 1,
            result: Err(RequestFailure::Network("connection refused".to_string())),
        },
    );

    let view = state.view();
    assert!(view.removal.trigger_enabled);
    assert_eq!(view.removal.timer_text, None);
    assert_eq!(
        view.removal.content,
        PanelContent::Error("Error: connection refused".to_string())
    );
}

#[test]
fn new_request_clears_previous_result() {
    init_logging();
    let state = with_file(png("cat.png", 2048));
    let (state, _) = update(state, Msg::RemoveBackgroundClicked);
    let (state, _) = update(
        state,
        Msg::BackgroundRemovalFinished {
            request_id: 1,
            result: Ok(Some("https://x/cut.png".to_string())),
        },
    );
    let (state, effects) = update(state, Msg::RemoveBackgroundClicked);

    assert_eq!(effects.len(), 2);
    assert_eq!(state.view().removal.content, PanelContent::Empty);
    assert!(state.downloadable_urls().is_empty());
}
