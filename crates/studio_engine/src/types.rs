use std::fmt;
use std::path::PathBuf;

use crate::api::{EnhanceResponse, ImagesResponse, RemovalResponse};

pub type RequestId = u64;

/// Timer and request identifiers known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PromptEnhancement,
    ImageGeneration,
    BackgroundRemoval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    EnhanceCompleted {
        request_id: RequestId,
        result: Result<EnhanceResponse, FetchError>,
    },
    ImagesCompleted {
        request_id: RequestId,
        result: Result<ImagesResponse, FetchError>,
    },
    BackgroundRemovalCompleted {
        request_id: RequestId,
        result: Result<RemovalResponse, FetchError>,
    },
    TimerTick {
        operation: Operation,
        elapsed_secs: u64,
    },
    DownloadCompleted {
        url: String,
        result: Result<PathBuf, String>,
    },
    /// A delay requested through `EngineHandle::notify_after` elapsed.
    Notify { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
    /// The `error` field of a non-2xx JSON body, when the server sent one.
    pub server_message: Option<String>,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    pub(crate) fn http_status(status: u16, reason: impl Into<String>, server_message: Option<String>) -> Self {
        Self {
            kind: FailureKind::HttpStatus(status),
            message: reason.into(),
            server_message,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.server_message {
            Some(server) => write!(f, "{}: {server}", self.kind),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidResponse,
    InvalidUpload,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::InvalidUpload => write!(f, "invalid upload"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
