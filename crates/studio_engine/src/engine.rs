use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn, preview};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::download::download_to_dir;
use crate::fetch::{FetchSettings, ImageUpload, ReqwestStudioApi, StudioApi};
use crate::sink::{ChannelEventSink, EventSink};
use crate::timer::TimerRegistry;
use crate::{EngineEvent, FetchError, Operation, RequestId};

pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub download_dir: PathBuf,
    /// Milliseconds since the Unix epoch, used for download filenames.
    pub timestamp_millis: Clock,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("could not build http client: {0}")]
    Client(#[from] FetchError),
}

enum EngineCommand {
    Enhance { request_id: RequestId, text: String },
    Generate { request_id: RequestId, text: String },
    RemoveBackground { request_id: RequestId, upload: ImageUpload },
    Download { url: String },
    StartTimer(Operation),
    StopTimer(Operation),
    NotifyAfter { token: u64, delay: Duration },
    CancelAll,
}

/// Owns the engine thread. Dropping the handle stops every timer and request.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

struct Context {
    api: Arc<dyn StudioApi>,
    sink: Arc<dyn EventSink>,
    download_dir: PathBuf,
    timestamp_millis: Clock,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api: Arc<dyn StudioApi> = Arc::new(ReqwestStudioApi::new(config.fetch.clone())?);
        Self::with_api(config, api)
    }

    pub fn with_api(config: EngineConfig, api: Arc<dyn StudioApi>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let context = Arc::new(Context {
            api,
            sink: Arc::new(ChannelEventSink::new(event_tx)),
            download_dir: config.download_dir,
            timestamp_millis: config.timestamp_millis,
        });

        thread::spawn(move || {
            let timers = TimerRegistry::new(runtime.handle().clone(), context.sink.clone());
            let mut cancel = CancellationToken::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartTimer(operation) => timers.start(operation),
                    EngineCommand::StopTimer(operation) => {
                        timers.stop(operation);
                    }
                    EngineCommand::CancelAll => {
                        engine_info!("Cancelling all timers and requests");
                        timers.stop_all();
                        cancel.cancel();
                        cancel = CancellationToken::new();
                    }
                    command => {
                        let context = context.clone();
                        let token = cancel.child_token();
                        runtime.spawn(async move {
                            handle_command(&context, command, &token).await;
                        });
                    }
                }
            }
            timers.stop_all();
            cancel.cancel();
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn enhance_prompt(&self, request_id: RequestId, text: impl Into<String>) {
        self.send(EngineCommand::Enhance {
            request_id,
            text: text.into(),
        });
    }

    pub fn generate_images(&self, request_id: RequestId, text: impl Into<String>) {
        self.send(EngineCommand::Generate {
            request_id,
            text: text.into(),
        });
    }

    pub fn remove_background(&self, request_id: RequestId, upload: ImageUpload) {
        self.send(EngineCommand::RemoveBackground { request_id, upload });
    }

    pub fn download(&self, url: impl Into<String>) {
        self.send(EngineCommand::Download { url: url.into() });
    }

    pub fn start_timer(&self, operation: Operation) {
        self.send(EngineCommand::StartTimer(operation));
    }

    pub fn stop_timer(&self, operation: Operation) {
        self.send(EngineCommand::StopTimer(operation));
    }

    /// Emits `EngineEvent::Notify { token }` after `delay`.
    pub fn notify_after(&self, token: u64, delay: Duration) {
        self.send(EngineCommand::NotifyAfter { token, delay });
    }

    pub fn cancel_all(&self) {
        self.send(EngineCommand::CancelAll);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(context: &Context, command: EngineCommand, cancel: &CancellationToken) {
    let api = context.api.as_ref();
    let event = match command {
        EngineCommand::Enhance { request_id, text } => {
            engine_info!("Enhance request_id={} prompt={:?}", request_id, preview(&text));
            let result = api.enhance_prompt(&text, cancel).await;
            log_outcome(request_id, &result);
            EngineEvent::EnhanceCompleted { request_id, result }
        }
        EngineCommand::Generate { request_id, text } => {
            engine_info!("Generate request_id={} prompt={:?}", request_id, preview(&text));
            let result = api.generate_images(&text, cancel).await;
            log_outcome(request_id, &result);
            EngineEvent::ImagesCompleted { request_id, result }
        }
        EngineCommand::RemoveBackground { request_id, upload } => {
            engine_info!(
                "RemoveBackground request_id={} file={}",
                request_id,
                upload.file_name
            );
            let result = api.remove_background(&upload, cancel).await;
            log_outcome(request_id, &result);
            EngineEvent::BackgroundRemovalCompleted { request_id, result }
        }
        EngineCommand::Download { url } => {
            let timestamp = (context.timestamp_millis)();
            let result = download_to_dir(api, &url, &context.download_dir, timestamp, cancel)
                .await
                .map_err(|err| {
                    engine_warn!("Download of {} failed: {}", url, err);
                    err.to_string()
                });
            if let Ok(path) = &result {
                engine_info!("Downloaded {} to {:?}", url, path);
            }
            EngineEvent::DownloadCompleted { url, result }
        }
        EngineCommand::NotifyAfter { token, delay } => {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => EngineEvent::Notify { token },
            }
        }
        EngineCommand::StartTimer(_) | EngineCommand::StopTimer(_) | EngineCommand::CancelAll => {
            return;
        }
    };
    context.sink.emit(event);
}

fn log_outcome<T>(request_id: RequestId, result: &Result<T, FetchError>) {
    match result {
        Ok(_) => engine_info!("Request {} succeeded", request_id),
        Err(err) => engine_warn!("Request {} failed: {}", request_id, err),
    }
}
