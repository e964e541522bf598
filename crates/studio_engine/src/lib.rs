//! Studio engine: HTTP round trips, timers and downloads.
mod api;
mod download;
mod engine;
mod fetch;
mod sink;
mod timer;
mod types;

pub use api::{EnhanceResponse, ImagesResponse, RemovalResponse};
pub use download::{
    download_filename, download_to_dir, ensure_output_dir, report_filename, AtomicFileWriter,
    DownloadError, PersistError,
};
pub use engine::{Clock, EngineConfig, EngineError, EngineHandle};
pub use fetch::{
    fetch_with_timeout, FetchSettings, ImageUpload, RemovalOptions, ReqwestStudioApi, StudioApi,
    DEFAULT_REQUEST_TIMEOUT, TIMEOUT_MESSAGE,
};
pub use sink::{ChannelEventSink, EventSink};
pub use timer::TimerRegistry;
pub use types::{EngineEvent, FailureKind, FetchError, Operation, RequestId};
