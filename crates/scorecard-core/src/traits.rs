//! Upload sources.
//!
//! Reading an upload's text is the only suspension point in the pipeline;
//! everything after it is synchronous. Sources are async so several subject
//! files can be read concurrently.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::IngestError;

/// Something that can hand over the full text of one uploaded file.
#[async_trait]
pub trait UploadSource: Send + Sync {
    /// File name as the user chose it, used for the extension check.
    fn file_name(&self) -> &str;

    /// Size in bytes, when known before reading.
    async fn size_hint(&self) -> Option<u64> {
        None
    }

    /// Read the whole file as text.
    async fn read_text(&self) -> Result<String, IngestError>;
}

/// An upload backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileUpload {
    path: PathBuf,
    name: String,
}

impl FileUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

#[async_trait]
impl UploadSource for FileUpload {
    fn file_name(&self) -> &str {
        &self.name
    }

    async fn size_hint(&self) -> Option<u64> {
        tokio::fs::metadata(&self.path).await.ok().map(|m| m.len())
    }

    async fn read_text(&self) -> Result<String, IngestError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| IngestError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(decode_text(&bytes))
    }
}

/// An upload whose text is already in memory.
#[derive(Debug, Clone)]
pub struct MemoryUpload {
    name: String,
    text: String,
}

impl MemoryUpload {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl UploadSource for MemoryUpload {
    fn file_name(&self) -> &str {
        &self.name
    }

    async fn size_hint(&self) -> Option<u64> {
        Some(self.text.len() as u64)
    }

    async fn read_text(&self) -> Result<String, IngestError> {
        Ok(self.text.clone())
    }
}

/// Decode file bytes as UTF-8, replacing invalid sequences and dropping a
/// leading byte-order mark.
fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_upload_reads_text_without_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.csv");
        std::fs::write(&path, "\u{feff}name,student_id\nAnn,1\n").unwrap();

        let upload = FileUpload::new(&path);
        assert_eq!(upload.file_name(), "grades.csv");
        assert_eq!(upload.size_hint().await, Some(25));
        let text = upload.read_text().await.unwrap();
        assert!(text.starts_with("name,"));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let upload = FileUpload::new("/no/such/dir/grades.csv");
        let err = upload.read_text().await.unwrap_err();
        assert_eq!(err.code(), "io");
    }

    #[tokio::test]
    async fn memory_upload_roundtrip() {
        let upload = MemoryUpload::new("a.csv", "x");
        assert_eq!(upload.read_text().await.unwrap(), "x");
    }
}
