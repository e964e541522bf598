use crate::{EnhancedPrompt, Operation, RequestFailure, RequestId, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the prompt-enhancement input.
    PromptChanged(String),
    /// User cleared the prompt-enhancement input.
    PromptCleared,
    /// User asked for the current prompt to be enhanced.
    EnhanceClicked,
    /// User edited the image-generation input.
    ImagePromptChanged(String),
    ImagePromptCleared,
    /// User asked for images to be generated from the current prompt.
    GenerateClicked,
    /// User picked a file (or nothing) for background removal.
    FileSelected(Option<SelectedFile>),
    /// User asked for the background of the selected file to be removed.
    RemoveBackgroundClicked,
    /// Engine completion for a prompt enhancement.
    EnhanceFinished {
        request_id: RequestId,
        result: Result<EnhancedPrompt, RequestFailure>,
    },
    /// Engine completion for an image generation.
    ImagesFinished {
        request_id: RequestId,
        result: Result<Vec<String>, RequestFailure>,
    },
    /// Engine completion for a background removal.
    BackgroundRemovalFinished {
        request_id: RequestId,
        result: Result<Option<String>, RequestFailure>,
    },
    /// Elapsed-time tick from a running timer.
    TimerTick { operation: Operation, elapsed_secs: u64 },
    /// User clicked the copy affordance of the enhanced prompt.
    CopyEnhancedClicked,
    /// The clipboard write failed.
    CopyFailed(String),
    /// The copy label revert delay elapsed.
    CopyLabelExpired { token: u64 },
    /// User activated the download action of a rendered image.
    DownloadClicked { url: String },
    /// Download finished; `Ok` carries the saved location.
    DownloadFinished {
        url: String,
        result: Result<String, String>,
    },
    /// User asked for the results to be exported as HTML.
    ExportClicked,
    /// Export finished; `Ok` carries the saved location.
    ExportFinished(Result<String, String>),
    /// User dismissed the modal alert.
    AlertDismissed,
    /// The session is closing: stop timers and cancel outstanding work.
    Teardown,
}
