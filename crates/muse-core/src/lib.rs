#![allow(clippy::must_use_candidate)]

mod context;
mod error;
mod kind;
mod tier;
mod upload;

pub use context::{Claims, Requester};
pub use error::HttpError;
pub use kind::{CreationType, GenerationKind};
pub use tier::SubscriptionTier;
pub use upload::UploadedFile;
