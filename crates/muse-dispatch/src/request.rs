use muse_core::{GenerationKind, UploadedFile};

/// A validated generation request
///
/// Each variant carries exactly the payload its kind needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Article { prompt: String, length: u32 },
    BlogTitle { prompt: String },
    Image { prompt: String, publish: bool },
    BackgroundRemoval { image: UploadedFile },
    ObjectRemoval { image: UploadedFile, object: String },
    ResumeReview { resume: UploadedFile },
}

impl GenerationRequest {
    pub const fn kind(&self) -> GenerationKind {
        match self {
            Self::Article { .. } => GenerationKind::Article,
            Self::BlogTitle { .. } => GenerationKind::BlogTitle,
            Self::Image { .. } => GenerationKind::Image,
            Self::BackgroundRemoval { .. } => GenerationKind::BackgroundRemoval,
            Self::ObjectRemoval { .. } => GenerationKind::ObjectRemoval,
            Self::ResumeReview { .. } => GenerationKind::ResumeReview,
        }
    }

    /// Prompt stored on the creation record
    ///
    /// File-based kinds have no user prompt, so a description of the
    /// operation is stored instead.
    pub fn record_prompt(&self) -> String {
        match self {
            Self::Article { prompt, .. } | Self::BlogTitle { prompt } | Self::Image { prompt, .. } => prompt.clone(),
            Self::BackgroundRemoval { .. } => "Remove background from image".to_owned(),
            Self::ObjectRemoval { object, .. } => format!("Removed {object} from image"),
            Self::ResumeReview { .. } => "Resume Review".to_owned(),
        }
    }

    /// Whether the record should appear in the public gallery
    pub const fn publish(&self) -> bool {
        matches!(self, Self::Image { publish: true, .. })
    }
}
