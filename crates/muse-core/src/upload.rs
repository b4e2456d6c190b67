use bytes::Bytes;

/// A file received from a multipart form
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Raw file contents
    pub bytes: Bytes,
    /// MIME type reported by the client
    pub content_type: String,
    /// Original file name, if the client sent one
    pub file_name: Option<String>,
}

impl UploadedFile {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            file_name: None,
        }
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// File contents are never useful in logs
impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}
