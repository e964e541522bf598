use crate::Alert;

/// File label shown while nothing valid is selected.
pub const FILE_LABEL_PLACEHOLDER: &str = "PNG, JPG, JPEG (Max 10MB)";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub prompt_input: String,
    pub image_prompt_input: String,
    pub file_label: String,
    pub enhance: PanelView,
    pub images: PanelView,
    pub removal: PanelView,
    pub alert: Option<Alert>,
    pub dirty: bool,
}

/// One feature's results container plus the state of its trigger control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelView {
    pub visible: bool,
    pub trigger_enabled: bool,
    pub timer_text: Option<String>,
    pub content: PanelContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelContent {
    #[default]
    Empty,
    Loading(String),
    Comparison {
        original: String,
        enhanced: String,
        copy_label: String,
    },
    Images(Vec<ImageView>),
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
    pub download: DownloadView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadView {
    pub label: String,
    pub enabled: bool,
}
