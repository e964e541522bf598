use crate::effect::COPY_LABEL_RESET;
use crate::validate::{validate_file, validate_prompt};
use crate::{Alert, AlertSeverity, AppState, Effect, Msg, Operation};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PromptChanged(text) => {
            state.set_prompt_input(text);
            Vec::new()
        }
        Msg::PromptCleared => {
            state.set_prompt_input(String::new());
            Vec::new()
        }
        Msg::ImagePromptChanged(text) => {
            state.set_image_prompt_input(text);
            Vec::new()
        }
        Msg::ImagePromptCleared => {
            state.set_image_prompt_input(String::new());
            Vec::new()
        }
        Msg::EnhanceClicked => {
            if state.is_in_flight(Operation::PromptEnhancement) {
                return (state, Vec::new());
            }
            let text = state.prompt_input().trim().to_string();
            if let Err(err) = validate_prompt(&text) {
                state.show_alert(Alert::new("Input Required", err.to_string(), AlertSeverity::Warning));
                return (state, Vec::new());
            }
            let request_id = state.next_request_id();
            state.enhance_mut().begin(request_id);
            state.set_enhance_submitted(text.clone());
            state.reset_copy();
            state.mark_dirty();
            vec![Effect::EnhancePrompt { request_id, text }]
        }
        Msg::GenerateClicked => {
            if state.is_in_flight(Operation::ImageGeneration) {
                return (state, Vec::new());
            }
            let text = state.image_prompt_input().trim().to_string();
            if let Err(err) = validate_prompt(&text) {
                state.show_alert(Alert::new("Input Required", err.to_string(), AlertSeverity::Warning));
                return (state, Vec::new());
            }
            let request_id = state.next_request_id();
            state.images_mut().begin(request_id);
            state.start_timer(Operation::ImageGeneration);
            vec![
                Effect::StartTimer {
                    operation: Operation::ImageGeneration,
                },
                Effect::GenerateImages { request_id, text },
            ]
        }
        Msg::FileSelected(None) => {
            state.set_selected_file(None);
            Vec::new()
        }
        Msg::FileSelected(Some(file)) => {
            match validate_file(Some(&file)) {
                Ok(()) => state.set_selected_file(Some(file)),
                Err(err) => {
                    state.set_selected_file(None);
                    state.show_alert(Alert::new("Invalid File", err.to_string(), AlertSeverity::Error));
                }
            }
            Vec::new()
        }
        Msg::RemoveBackgroundClicked => {
            if state.is_in_flight(Operation::BackgroundRemoval) {
                return (state, Vec::new());
            }
            let file = state.selected_file().cloned();
            if let Err(err) = validate_file(file.as_ref()) {
                state.show_alert(Alert::new("Invalid File", err.to_string(), AlertSeverity::Warning));
                return (state, Vec::new());
            }
            let Some(file) = file else {
                return (state, Vec::new());
            };
            let request_id = state.next_request_id();
            state.removal_mut().begin(request_id);
            state.start_timer(Operation::BackgroundRemoval);
            vec![
                Effect::StartTimer {
                    operation: Operation::BackgroundRemoval,
                },
                Effect::RemoveBackground { request_id, file },
            ]
        }
        Msg::EnhanceFinished { request_id, result } => {
            let result = result.map(|payload| state.resolve_enhanced(payload));
            if state.enhance_mut().finish(request_id, result) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ImagesFinished { request_id, result } => {
            finish_with_timer(&mut state, Operation::ImageGeneration, |state| {
                state.images_mut().finish(request_id, result)
            })
        }
        Msg::BackgroundRemovalFinished { request_id, result } => {
            let result = result.map(|url| url.filter(|url| !url.trim().is_empty()));
            finish_with_timer(&mut state, Operation::BackgroundRemoval, |state| {
                state.removal_mut().finish(request_id, result)
            })
        }
        Msg::TimerTick {
            operation,
            elapsed_secs,
        } => {
            state.apply_tick(operation, elapsed_secs);
            Vec::new()
        }
        Msg::CopyEnhancedClicked => match state.enhanced_text().map(ToOwned::to_owned) {
            Some(text) => {
                let token = state.begin_copy();
                vec![
                    Effect::CopyToClipboard { text },
                    Effect::ScheduleCopyReset {
                        token,
                        after: COPY_LABEL_RESET,
                    },
                ]
            }
            None => Vec::new(),
        },
        Msg::CopyFailed(reason) => {
            state.reset_copy();
            state.show_alert(Alert::new("Copy Failed", reason, AlertSeverity::Error));
            Vec::new()
        }
        Msg::CopyLabelExpired { token } => {
            state.expire_copy(token);
            Vec::new()
        }
        Msg::DownloadClicked { url } => {
            let offered = state.downloadable_urls().iter().any(|candidate| *candidate == url);
            if offered && state.begin_download(&url) {
                vec![Effect::Download { url }]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadFinished { url, result } => {
            state.finish_download(&url);
            let alert = match result {
                Ok(location) => Alert::new(
                    "Success!",
                    format!("Image downloaded successfully to {location}"),
                    AlertSeverity::Success,
                ),
                Err(_) => Alert::new(
                    "Download Failed",
                    "Could not download the image. Please try again.",
                    AlertSeverity::Error,
                ),
            };
            state.show_alert(alert);
            Vec::new()
        }
        Msg::ExportClicked => {
            let html = crate::markup::render_report(&state.view());
            vec![Effect::ExportReport { html }]
        }
        Msg::ExportFinished(result) => {
            let alert = match result {
                Ok(location) => Alert::new(
                    "Report Saved",
                    format!("Results exported to {location}"),
                    AlertSeverity::Success,
                ),
                Err(reason) => Alert::new("Export Failed", reason, AlertSeverity::Error),
            };
            state.show_alert(alert);
            Vec::new()
        }
        Msg::AlertDismissed => {
            state.dismiss_alert();
            Vec::new()
        }
        Msg::Teardown => {
            let mut effects = Vec::new();
            for operation in state.running_timers() {
                state.stop_timer(operation);
                effects.push(Effect::StopTimer { operation });
            }
            let cancelled = [
                state.enhance_mut().cancel(),
                state.images_mut().cancel(),
                state.removal_mut().cancel(),
            ];
            if cancelled.contains(&true) {
                state.mark_dirty();
            }
            effects.push(Effect::CancelAll);
            effects
        }
    };

    (state, effects)
}

/// Applies a completion for a timed feature; the timer only stops when the completion was accepted.
fn finish_with_timer(
    state: &mut AppState,
    operation: Operation,
    finish: impl FnOnce(&mut AppState) -> bool,
) -> Vec<Effect> {
    if !finish(state) {
        return Vec::new();
    }
    state.mark_dirty();
    state.stop_timer(operation);
    vec![Effect::StopTimer { operation }]
}

