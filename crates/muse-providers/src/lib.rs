#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod adapter;
mod document;
mod error;
mod hosting;
mod http_client;
mod image;
mod prompt;
mod text;

pub use adapter::{ProviderAdapter, VendorAdapter};
pub use document::{DocumentExtractor, PdfExtractor};
pub use error::{ProviderError, Result};
pub use hosting::{CloudinaryHost, HostedImage, ImageHost, ImageOperation};
pub use image::{ClipDropImage, ImageGenerator};
pub use prompt::{DEFAULT_ARTICLE_LENGTH, TextPrompt};
pub use text::{OpenAiCompatibleText, TextProvider};
