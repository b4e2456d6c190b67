use serde::{Deserialize, Serialize};

/// Every kind of generation the gateway can dispatch
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GenerationKind {
    Article,
    BlogTitle,
    Image,
    BackgroundRemoval,
    ObjectRemoval,
    ResumeReview,
}

impl GenerationKind {
    /// Whether the kind is reserved for premium subscribers regardless of usage
    pub const fn premium_only(self) -> bool {
        match self {
            Self::Image | Self::BackgroundRemoval | Self::ObjectRemoval => true,
            Self::Article | Self::BlogTitle | Self::ResumeReview => false,
        }
    }

    /// The `type` persisted on the creation record
    pub const fn creation_type(self) -> CreationType {
        match self {
            Self::Article => CreationType::Article,
            Self::BlogTitle => CreationType::BlogTitle,
            Self::Image | Self::BackgroundRemoval | Self::ObjectRemoval => CreationType::Image,
            Self::ResumeReview => CreationType::ResumeReview,
        }
    }
}

/// Stable `type` tag stored with each creation record
///
/// Other parts of the product (creation history, public gallery) filter on
/// these strings, so the serialized values must never change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString, strum::AsRefStr,
)]
pub enum CreationType {
    #[serde(rename = "article")]
    #[strum(serialize = "article")]
    Article,
    #[serde(rename = "blog-title")]
    #[strum(serialize = "blog-title")]
    BlogTitle,
    #[serde(rename = "image")]
    #[strum(serialize = "image")]
    Image,
    #[serde(rename = "resume-review")]
    #[strum(serialize = "resume-review")]
    ResumeReview,
}
