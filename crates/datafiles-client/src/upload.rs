//! Multipart upload forms with progress reporting

use crate::Result;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::convert::Infallible;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Form field the server reads uploaded files from
pub const FILE_FIELD: &str = "file";

const PROGRESS_CHUNK_SIZE: usize = 64 * 1024;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(UploadProgress) + Send + Sync>;

/// Upload progress information
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UploadProgress {
    /// Bytes handed to the connection so far
    pub loaded: u64,
    /// Total bytes to upload
    pub total: u64,
    /// Percentage complete (0-100)
    pub percent_completed: f64,
}

impl UploadProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let percent_completed = if total == 0 {
            100.0
        } else {
            (loaded as f64 / total as f64) * 100.0
        };
        Self {
            loaded,
            total,
            percent_completed,
        }
    }

    /// Whether every byte has been sent
    pub fn is_complete(&self) -> bool {
        self.loaded >= self.total
    }
}

/// A file part of an upload form
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Form field name
    pub field: String,
    /// File name reported to the server
    pub file_name: String,
    /// MIME type of the content
    pub content_type: String,
    /// File content
    pub data: Bytes,
}

impl UploadFile {
    /// Create a file part, guessing the content type from the file name
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            field: field.into(),
            file_name,
            content_type,
            data: data.into(),
        }
    }

    /// Override the guessed content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Multipart form payload for an upload
#[derive(Clone, Debug, Default)]
pub struct UploadForm {
    fields: Vec<(String, String)>,
    files: Vec<UploadFile>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form holding a single file under the `file` field
    pub fn with_file(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new().part(UploadFile::new(FILE_FIELD, file_name, data))
    }

    /// Read a file from disk into a form under the `file` field
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| FILE_FIELD.to_string());
        Ok(Self::with_file(file_name, data))
    }

    /// Add a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add a file part
    pub fn part(mut self, file: UploadFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    /// Total size of all file parts
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.data.len() as u64).sum()
    }

    /// Build the reqwest form. File bodies are streamed in chunks so that
    /// `progress` observes bytes as the connection consumes them.
    pub(crate) fn into_multipart(self, progress: Option<ProgressCallback>) -> Result<Form> {
        let tracker = progress.map(|cb| Arc::new(ProgressTracker::new(self.total_bytes(), cb)));

        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let len = file.data.len() as u64;
            let body = match &tracker {
                Some(tracker) => Body::wrap_stream(progress_stream(file.data, Arc::clone(tracker))),
                None => Body::from(file.data),
            };
            let part = Part::stream_with_length(body, len)
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

struct ProgressTracker {
    loaded: AtomicU64,
    total: u64,
    callback: ProgressCallback,
}

impl ProgressTracker {
    fn new(total: u64, callback: ProgressCallback) -> Self {
        Self {
            loaded: AtomicU64::new(0),
            total,
            callback,
        }
    }

    fn advance(&self, n: u64) {
        let loaded = self.loaded.fetch_add(n, Ordering::SeqCst) + n;
        (self.callback)(UploadProgress::new(loaded, self.total));
    }
}

fn progress_stream(
    data: Bytes,
    tracker: Arc<ProgressTracker>,
) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> + Send + Sync + 'static {
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(PROGRESS_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + PROGRESS_CHUNK_SIZE).min(data.len())))
        .collect();

    futures::stream::iter(chunks).map(move |chunk| {
        tracker.advance(chunk.len() as u64);
        Ok(chunk)
    })
}
