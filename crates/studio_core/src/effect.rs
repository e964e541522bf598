use std::time::Duration;

use crate::{Operation, RequestId, SelectedFile};

/// How long the copy affordance shows its confirmation label.
pub const COPY_LABEL_RESET: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    EnhancePrompt { request_id: RequestId, text: String },
    GenerateImages { request_id: RequestId, text: String },
    RemoveBackground { request_id: RequestId, file: SelectedFile },
    StartTimer { operation: Operation },
    StopTimer { operation: Operation },
    CopyToClipboard { text: String },
    /// Deliver `Msg::CopyLabelExpired { token }` after `after`.
    ScheduleCopyReset { token: u64, after: Duration },
    Download { url: String },
    ExportReport { html: String },
    /// Cancel every outstanding request and timer.
    CancelAll,
}
