use std::path::PathBuf;

use thiserror::Error;

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_LENGTH: usize = 2000;
/// Largest upload accepted for background removal.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_FILE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Descriptor of a file picked for background removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,
    #[error("Prompt too long. Maximum {max} characters")]
    PromptTooLong { max: usize, actual: usize },
    #[error("No file selected")]
    NoFile,
    #[error("Invalid file type. Allowed: {allowed}", allowed = ALLOWED_FILE_TYPES.join(", "))]
    UnsupportedType { mime_type: String },
    #[error("File too large. Maximum size: {}MB", .max_bytes / 1024 / 1024)]
    FileTooLarge { max_bytes: u64, actual: u64 },
}

pub fn validate_prompt(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    let length = text.chars().count();
    if length > MAX_PROMPT_LENGTH {
        return Err(ValidationError::PromptTooLong {
            max: MAX_PROMPT_LENGTH,
            actual: length,
        });
    }
    Ok(())
}

/// Type is checked before size, so an oversize file of the wrong type reports the type.
pub fn validate_file(file: Option<&SelectedFile>) -> Result<(), ValidationError> {
    let Some(file) = file else {
        return Err(ValidationError::NoFile);
    };
    if !is_allowed_type(&file.mime_type) {
        return Err(ValidationError::UnsupportedType {
            mime_type: file.mime_type.clone(),
        });
    }
    if file.size > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge {
            max_bytes: MAX_FILE_SIZE,
            actual: file.size,
        });
    }
    Ok(())
}

fn is_allowed_type(mime_type: &str) -> bool {
    ALLOWED_FILE_TYPES.contains(&mime_type)
}
