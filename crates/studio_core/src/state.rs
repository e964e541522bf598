use std::collections::{BTreeMap, BTreeSet};

use crate::feature::{Feature, Operation, Phase, RequestId};
use crate::validate::SelectedFile;
use crate::view_model::{
    AppViewModel, DownloadView, ImageView, PanelContent, PanelView, FILE_LABEL_PLACEHOLDER,
};

const ENHANCING_TEXT: &str = "Enhancing your prompt...";
const NO_ENHANCEMENT: &str = "No enhancement available";
const NO_IMAGES: &str = "No images were generated. Please try a different prompt.";
const NO_RESULT_IMAGE: &str = "Could not process the image. Please try again.";
const COPY_LABEL: &str = "Copy enhanced prompt";
const COPIED_LABEL: &str = "Copied!";
const DOWNLOAD_LABEL: &str = "Download Image";
const DOWNLOADING_LABEL: &str = "Downloading...";

/// Prompt enhancement payload as returned by the server; either field may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnhancedPrompt {
    pub original_prompt: Option<String>,
    pub enhanced_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedText {
    pub original: String,
    pub enhanced: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Success,
    Info,
    Warning,
    Error,
}

/// Modal dialog content. A new alert replaces the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub text: String,
    pub severity: AlertSeverity,
}

impl Alert {
    pub fn new(title: impl Into<String>, text: impl Into<String>, severity: AlertSeverity) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    prompt_input: String,
    image_prompt_input: String,
    selected_file: Option<SelectedFile>,
    enhance: Feature<EnhancedText>,
    enhance_submitted: String,
    images: Feature<Vec<String>>,
    removal: Feature<Option<String>>,
    timers: BTreeMap<Operation, u64>,
    downloads: BTreeSet<String>,
    copy_token: Option<u64>,
    next_copy_token: u64,
    alert: Option<Alert>,
    last_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            prompt_input: self.prompt_input.clone(),
            image_prompt_input: self.image_prompt_input.clone(),
            file_label: self
                .selected_file
                .as_ref()
                .map(|file| file.name.clone())
                .unwrap_or_else(|| FILE_LABEL_PLACEHOLDER.to_string()),
            enhance: self.enhance_panel(),
            images: self.images_panel(),
            removal: self.removal_panel(),
            alert: self.alert.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        match operation {
            Operation::PromptEnhancement => self.enhance.is_in_flight(),
            Operation::ImageGeneration => self.images.is_in_flight(),
            Operation::BackgroundRemoval => self.removal.is_in_flight(),
        }
    }

    pub fn running_timers(&self) -> Vec<Operation> {
        self.timers.keys().copied().collect()
    }

    /// URLs that currently carry a download action.
    pub fn downloadable_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Phase::Succeeded(list) = self.images.phase() {
            urls.extend(list.iter().cloned());
        }
        if let Phase::Succeeded(Some(url)) = self.removal.phase() {
            urls.push(url.clone());
        }
        urls
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_prompt_input(&mut self, text: String) {
        if self.prompt_input != text {
            self.prompt_input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn prompt_input(&self) -> &str {
        &self.prompt_input
    }

    pub(crate) fn set_image_prompt_input(&mut self, text: String) {
        if self.image_prompt_input != text {
            self.image_prompt_input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn image_prompt_input(&self) -> &str {
        &self.image_prompt_input
    }

    pub(crate) fn set_selected_file(&mut self, file: Option<SelectedFile>) {
        self.selected_file = file;
        self.mark_dirty();
    }

    pub(crate) fn show_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
        self.mark_dirty();
    }

    pub(crate) fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    pub(crate) fn enhance_mut(&mut self) -> &mut Feature<EnhancedText> {
        &mut self.enhance
    }

    pub(crate) fn images_mut(&mut self) -> &mut Feature<Vec<String>> {
        &mut self.images
    }

    pub(crate) fn removal_mut(&mut self) -> &mut Feature<Option<String>> {
        &mut self.removal
    }

    pub(crate) fn set_enhance_submitted(&mut self, text: String) {
        self.enhance_submitted = text;
    }

    /// Substitutes the submitted prompt and a placeholder for missing or empty fields.
    pub(crate) fn resolve_enhanced(&self, payload: EnhancedPrompt) -> EnhancedText {
        EnhancedText {
            original: non_empty(payload.original_prompt)
                .unwrap_or_else(|| self.enhance_submitted.clone()),
            enhanced: non_empty(payload.enhanced_prompt)
                .unwrap_or_else(|| NO_ENHANCEMENT.to_string()),
        }
    }

    pub(crate) fn enhanced_text(&self) -> Option<&str> {
        match self.enhance.phase() {
            Phase::Succeeded(text) => Some(text.enhanced.as_str()),
            _ => None,
        }
    }

    pub(crate) fn start_timer(&mut self, operation: Operation) {
        self.timers.insert(operation, 0);
        self.mark_dirty();
    }

    pub(crate) fn stop_timer(&mut self, operation: Operation) -> bool {
        let removed = self.timers.remove(&operation).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Ticks for timers that are not running are ignored.
    pub(crate) fn apply_tick(&mut self, operation: Operation, elapsed_secs: u64) {
        if let Some(elapsed) = self.timers.get_mut(&operation) {
            if *elapsed != elapsed_secs {
                *elapsed = elapsed_secs;
                self.mark_dirty();
            }
        }
    }

    pub(crate) fn begin_copy(&mut self) -> u64 {
        self.next_copy_token += 1;
        self.copy_token = Some(self.next_copy_token);
        self.mark_dirty();
        self.next_copy_token
    }

    pub(crate) fn expire_copy(&mut self, token: u64) {
        if self.copy_token == Some(token) {
            self.copy_token = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn reset_copy(&mut self) {
        self.copy_token = None;
    }

    pub(crate) fn begin_download(&mut self, url: &str) -> bool {
        let inserted = self.downloads.insert(url.to_string());
        if inserted {
            self.mark_dirty();
        }
        inserted
    }

    pub(crate) fn finish_download(&mut self, url: &str) -> bool {
        let removed = self.downloads.remove(url);
        if removed {
            self.mark_dirty();
        }
        removed
    }

    fn timer_text(&self, operation: Operation) -> Option<String> {
        self.timers
            .get(&operation)
            .map(|elapsed| format!("Processing... {elapsed}s"))
    }

    fn enhance_panel(&self) -> PanelView {
        let content = match self.enhance.phase() {
            Phase::Idle => PanelContent::Empty,
            Phase::InFlight { .. } => PanelContent::Loading(ENHANCING_TEXT.to_string()),
            Phase::Succeeded(text) => PanelContent::Comparison {
                original: text.original.clone(),
                enhanced: text.enhanced.clone(),
                copy_label: if self.copy_token.is_some() {
                    COPIED_LABEL.to_string()
                } else {
                    COPY_LABEL.to_string()
                },
            },
            Phase::Failed(failure) => PanelContent::Error(format!(
                "Error: {}",
                failure.user_message(Operation::PromptEnhancement)
            )),
        };
        self.panel(Operation::PromptEnhancement, &self.enhance, content)
    }

    fn images_panel(&self) -> PanelView {
        let content = match self.images.phase() {
            Phase::Idle | Phase::InFlight { .. } => PanelContent::Empty,
            Phase::Succeeded(urls) if urls.is_empty() => PanelContent::Info(NO_IMAGES.to_string()),
            Phase::Succeeded(urls) => PanelContent::Images(
                urls.iter()
                    .enumerate()
                    .map(|(index, url)| self.image_view(url, format!("Generated image {}", index + 1)))
                    .collect(),
            ),
            Phase::Failed(failure) => PanelContent::Error(format!(
                "Error: {}",
                failure.user_message(Operation::ImageGeneration)
            )),
        };
        self.panel(Operation::ImageGeneration, &self.images, content)
    }

    fn removal_panel(&self) -> PanelView {
        let content = match self.removal.phase() {
            Phase::Idle | Phase::InFlight { .. } => PanelContent::Empty,
            Phase::Succeeded(Some(url)) => PanelContent::Images(vec![
                self.image_view(url, "Background removed image".to_string())
            ]),
            Phase::Succeeded(None) => PanelContent::Info(NO_RESULT_IMAGE.to_string()),
            Phase::Failed(failure) => PanelContent::Error(format!(
                "Error: {}",
                failure.user_message(Operation::BackgroundRemoval)
            )),
        };
        self.panel(Operation::BackgroundRemoval, &self.removal, content)
    }

    fn panel<T>(&self, operation: Operation, feature: &Feature<T>, content: PanelContent) -> PanelView {
        PanelView {
            visible: !matches!(feature.phase(), Phase::Idle),
            trigger_enabled: !feature.is_in_flight(),
            timer_text: self.timer_text(operation),
            content,
        }
    }

    fn image_view(&self, url: &str, alt: String) -> ImageView {
        let downloading = self.downloads.contains(url);
        ImageView {
            url: url.to_string(),
            alt,
            download: DownloadView {
                label: if downloading {
                    DOWNLOADING_LABEL.to_string()
                } else {
                    DOWNLOAD_LABEL.to_string()
                },
                enabled: !downloading,
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
