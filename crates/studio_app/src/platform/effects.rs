use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use studio_core::{EnhancedPrompt, Effect, Msg, Operation, RequestFailure, SelectedFile};
use studio_engine::{
    report_filename, AtomicFileWriter, EngineConfig, EngineError, EngineEvent, EngineHandle,
    FailureKind, FetchError, FetchSettings, ImageUpload, RemovalOptions,
};

use super::config::StudioConfig;

/// How long a clipboard instance is kept alive so clipboard managers can read it.
const CLIPBOARD_HOLD: Duration = Duration::from_secs(2);

/// Executes core effects against the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    download_dir: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
    clipboard_tx: mpsc::Sender<String>,
}

impl EffectRunner {
    pub fn new(config: &StudioConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, EngineError> {
        let engine_config = engine_config(config);
        let download_dir = engine_config.download_dir.clone();
        engine_info!(
            "Engine starting base_url={} download_dir={:?}",
            engine_config.fetch.base_url,
            download_dir
        );
        let engine = EngineHandle::new(engine_config)?;
        let clipboard_tx = spawn_clipboard_thread(msg_tx.clone());
        Ok(Self {
            engine,
            download_dir,
            msg_tx,
            clipboard_tx,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::EnhancePrompt { request_id, text } => {
                    self.engine.enhance_prompt(request_id, text);
                }
                Effect::GenerateImages { request_id, text } => {
                    self.engine.generate_images(request_id, text);
                }
                Effect::RemoveBackground { request_id, file } => {
                    self.engine.remove_background(request_id, to_upload(&file));
                }
                Effect::StartTimer { operation } => {
                    self.engine.start_timer(to_engine_operation(operation));
                }
                Effect::StopTimer { operation } => {
                    self.engine.stop_timer(to_engine_operation(operation));
                }
                Effect::CopyToClipboard { text } => {
                    if self.clipboard_tx.send(text).is_err() {
                        let _ = self
                            .msg_tx
                            .send(Msg::CopyFailed("clipboard thread stopped".to_string()));
                    }
                }
                Effect::ScheduleCopyReset { token, after } => {
                    self.engine.notify_after(token, after);
                }
                Effect::Download { url } => {
                    engine_info!("Download requested url={}", url);
                    self.engine.download(url);
                }
                Effect::ExportReport { html } => self.export_report(html),
                Effect::CancelAll => self.engine.cancel_all(),
            }
        }
    }

    /// Drains pending engine events without blocking.
    pub fn poll_events(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            msgs.push(map_event(event));
        }
        msgs
    }

    fn export_report(&self, html: String) {
        let writer = AtomicFileWriter::new(self.download_dir.clone());
        let filename = report_filename(Utc::now().timestamp_millis());
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || {
            let result = writer
                .write(&filename, html.as_bytes())
                .map(|path| path.display().to_string())
                .map_err(|err| {
                    engine_error!("Failed to export report: {}", err);
                    err.to_string()
                });
            if let Ok(path) = &result {
                engine_info!("Report exported to {}", path);
            }
            let _ = msg_tx.send(Msg::ExportFinished(result));
        });
    }
}

fn engine_config(config: &StudioConfig) -> EngineConfig {
    EngineConfig {
        fetch: FetchSettings {
            base_url: config.base_url.clone(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            removal: RemovalOptions {
                preserve_partial_alpha: config.preserve_partial_alpha,
                sync: config.sync,
                content_moderation: config.content_moderation,
            },
            ..FetchSettings::default()
        },
        download_dir: config.resolved_download_dir(),
        timestamp_millis: Arc::new(|| Utc::now().timestamp_millis()),
    }
}

/// One thread owns the clipboard; each copy gets a fresh instance held briefly.
fn spawn_clipboard_thread(msg_tx: mpsc::Sender<Msg>) -> mpsc::Sender<String> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for text in rx {
            let outcome = arboard::Clipboard::new().and_then(|mut clipboard| {
                clipboard.set_text(text)?;
                thread::sleep(CLIPBOARD_HOLD);
                Ok(())
            });
            if let Err(err) = outcome {
                engine_warn!("Clipboard copy failed: {}", err);
                let _ = msg_tx.send(Msg::CopyFailed(err.to_string()));
            } else {
                engine_debug!("Copied enhanced prompt to clipboard");
            }
        }
    });
    tx
}

fn to_upload(file: &SelectedFile) -> ImageUpload {
    ImageUpload {
        path: file.path.clone(),
        file_name: file.name.clone(),
        mime_type: file.mime_type.clone(),
    }
}

fn to_engine_operation(operation: Operation) -> studio_engine::Operation {
    match operation {
        Operation::PromptEnhancement => studio_engine::Operation::PromptEnhancement,
        Operation::ImageGeneration => studio_engine::Operation::ImageGeneration,
        Operation::BackgroundRemoval => studio_engine::Operation::BackgroundRemoval,
    }
}

fn from_engine_operation(operation: studio_engine::Operation) -> Operation {
    match operation {
        studio_engine::Operation::PromptEnhancement => Operation::PromptEnhancement,
        studio_engine::Operation::ImageGeneration => Operation::ImageGeneration,
        studio_engine::Operation::BackgroundRemoval => Operation::BackgroundRemoval,
    }
}

fn map_failure(err: FetchError) -> RequestFailure {
    match err.kind {
        FailureKind::Timeout => RequestFailure::Timeout,
        FailureKind::Cancelled => RequestFailure::Cancelled,
        FailureKind::HttpStatus(status) => RequestFailure::Server {
            status,
            message: err.server_message,
        },
        FailureKind::InvalidResponse => RequestFailure::InvalidResponse(err.message),
        FailureKind::InvalidUrl
        | FailureKind::TooLarge { .. }
        | FailureKind::InvalidUpload
        | FailureKind::Network => RequestFailure::Network(err.message),
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::EnhanceCompleted { request_id, result } => Msg::EnhanceFinished {
            request_id,
            result: result
                .map(|response| EnhancedPrompt {
                    original_prompt: response.original_prompt,
                    enhanced_prompt: response.enhanced_prompt,
                })
                .map_err(map_failure),
        },
        EngineEvent::ImagesCompleted { request_id, result } => Msg::ImagesFinished {
            request_id,
            result: result
                .map(|response| response.into_image_urls())
                .map_err(map_failure),
        },
        EngineEvent::BackgroundRemovalCompleted { request_id, result } => {
            Msg::BackgroundRemovalFinished {
                request_id,
                result: result.map(|response| response.url).map_err(map_failure),
            }
        }
        EngineEvent::TimerTick {
            operation,
            elapsed_secs,
        } => Msg::TimerTick {
            operation: from_engine_operation(operation),
            elapsed_secs,
        },
        EngineEvent::DownloadCompleted { url, result } => Msg::DownloadFinished {
            url,
            result: result.map(|path| path.display().to_string()),
        },
        EngineEvent::Notify { token } => Msg::CopyLabelExpired { token },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_engine::{EnhanceResponse, ImagesResponse};

    fn fetch_error(kind: FailureKind, message: &str, server: Option<&str>) -> FetchError {
        // FetchError's constructors are crate-private; build it field by field.
        FetchError {
            kind,
            message: message.to_string(),
            server_message: server.map(str::to_string),
        }
    }

    #[test]
    fn http_status_keeps_server_message() {
        let failure = map_failure(fetch_error(
            FailureKind::HttpStatus(500),
            "500 Internal Server Error",
            Some("model unavailable"),
        ));
        assert_eq!(
            failure,
            RequestFailure::Server {
                status: 500,
                message: Some("model unavailable".to_string()),
            }
        );
        assert_eq!(
            failure.user_message(Operation::ImageGeneration),
            "model unavailable"
        );
    }

    #[test]
    fn timeout_maps_to_timeout() {
        let failure = map_failure(fetch_error(FailureKind::Timeout, "slow", None));
        assert_eq!(failure, RequestFailure::Timeout);
    }

    #[test]
    fn transport_kinds_map_to_network() {
        let failure = map_failure(fetch_error(FailureKind::Network, "connection refused", None));
        assert_eq!(failure, RequestFailure::Network("connection refused".to_string()));
    }

    #[test]
    fn enhance_event_becomes_finished_msg() {
        let msg = map_event(EngineEvent::EnhanceCompleted {
            request_id: 4,
            result: Ok(EnhanceResponse {
                original_prompt: Some("a cat".to_string()),
                enhanced_prompt: None,
            }),
        });
        assert_eq!(
            msg,
            Msg::EnhanceFinished {
                request_id: 4,
                result: Ok(EnhancedPrompt {
                    original_prompt: Some("a cat".to_string()),
                    enhanced_prompt: None,
                }),
            }
        );
    }

    #[test]
    fn images_event_carries_urls() {
        let msg = map_event(EngineEvent::ImagesCompleted {
            request_id: 9,
            result: Ok(ImagesResponse::new(vec!["u1".to_string(), "u2".to_string()])),
        });
        assert_eq!(
            msg,
            Msg::ImagesFinished {
                request_id: 9,
                result: Ok(vec!["u1".to_string(), "u2".to_string()]),
            }
        );
    }

    #[test]
    fn notify_becomes_copy_label_expiry() {
        assert_eq!(
            map_event(EngineEvent::Notify { token: 3 }),
            Msg::CopyLabelExpired { token: 3 }
        );
    }

    #[test]
    fn operations_map_both_ways() {
        for operation in [
            Operation::PromptEnhancement,
            Operation::ImageGeneration,
            Operation::BackgroundRemoval,
        ] {
            assert_eq!(from_engine_operation(to_engine_operation(operation)), operation);
        }
    }
}
