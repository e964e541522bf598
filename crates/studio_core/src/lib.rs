//! Studio core: pure state machine, validation and view-model helpers.
mod effect;
mod feature;
pub mod markup;
mod msg;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::{Effect, COPY_LABEL_RESET};
pub use feature::{Feature, Operation, Phase, RequestFailure, RequestId, TIMEOUT_MESSAGE};
pub use msg::Msg;
pub use state::{Alert, AlertSeverity, AppState, EnhancedPrompt, EnhancedText};
pub use update::update;
pub use validate::{
    validate_file, validate_prompt, SelectedFile, ValidationError, ALLOWED_FILE_TYPES,
    MAX_FILE_SIZE, MAX_PROMPT_LENGTH,
};
pub use view_model::{
    AppViewModel, DownloadView, ImageView, PanelContent, PanelView, FILE_LABEL_PLACEHOLDER,
};
