use muse_core::GenerationKind;

/// Words requested when an article request omits a length
pub const DEFAULT_ARTICLE_LENGTH: u32 = 800;

const TEMPERATURE: f32 = 0.7;

/// A single-turn instruction for the text provider
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrompt {
    /// Generation kind the prompt was built for
    pub kind: GenerationKind,
    /// User-role message content
    pub instruction: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature; vendor default when absent
    pub temperature: Option<f32>,
}

impl TextPrompt {
    /// Long-form article of roughly `length` words
    pub fn article(prompt: &str, length: u32) -> Self {
        Self {
            kind: GenerationKind::Article,
            instruction: format!(
                "Write a detailed article based on this prompt:\n\"{prompt}\"\n\nRequired length: {length} words.\nMake it structured, SEO-friendly, and human-like."
            ),
            max_tokens: length.saturating_mul(5),
            temperature: Some(TEMPERATURE),
        }
    }

    /// Ten candidate blog titles for an idea
    pub fn blog_title(prompt: &str) -> Self {
        Self {
            kind: GenerationKind::BlogTitle,
            instruction: format!("Generate 10 high-quality blog titles based on this idea:\n{prompt}"),
            max_tokens: 300,
            temperature: Some(TEMPERATURE),
        }
    }

    /// Review of a resume's extracted text
    pub fn resume_review(resume_text: &str) -> Self {
        Self {
            kind: GenerationKind::ResumeReview,
            instruction: format!(
                "Review this resume. Give strengths, weaknesses, and improvements:\n{}",
                resume_text.trim()
            ),
            max_tokens: 1500,
            temperature: None,
        }
    }
}
