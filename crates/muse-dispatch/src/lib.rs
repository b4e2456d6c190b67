#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod dispatcher;
mod outcome;
mod request;

pub use dispatcher::{GenerationDispatcher, MAX_RESUME_BYTES};
pub use outcome::{GenerationResponse, Outcome};
pub use request::GenerationRequest;
