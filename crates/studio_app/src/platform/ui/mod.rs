pub mod constants;
pub mod layout;
pub mod render;

/// Which control receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    EnhanceInput,
    ImageInput,
    FileInput,
    Results,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::EnhanceInput => Focus::ImageInput,
            Focus::ImageInput => Focus::FileInput,
            Focus::FileInput => Focus::Results,
            Focus::Results => Focus::EnhanceInput,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::EnhanceInput => Focus::Results,
            Focus::ImageInput => Focus::EnhanceInput,
            Focus::FileInput => Focus::ImageInput,
            Focus::Results => Focus::FileInput,
        }
    }
}

/// Screen-only state the core does not track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState {
    pub focus: Focus,
    pub file_input: String,
    pub selected_url: Option<String>,
}
