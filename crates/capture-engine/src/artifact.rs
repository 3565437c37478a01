//! The finished recording.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockreel_platform_core::ContainerFormat;
use uuid::Uuid;

/// One complete video file produced by a recording pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub id: Uuid,
    pub container: ContainerFormat,
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
    pub recorded_at: DateTime<Utc>,
    /// Virtual time between recorder start and stop.
    pub duration: Duration,
}

impl Artifact {
    /// Assemble an artifact from recorder chunks, in arrival order.
    pub fn from_chunks(
        container: ContainerFormat,
        chunks: Vec<Vec<u8>>,
        suggested_filename: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            container,
            bytes: chunks.concat(),
            suggested_filename: suggested_filename.into(),
            recorded_at: Utc::now(),
            duration,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.container.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Locally playable identifier for this recording.
    pub fn url(&self) -> String {
        format!("blob:mockreel/{}", self.id)
    }

    /// Write the bytes under `dir` using the suggested filename.
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.suggested_filename);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(
            path = %path.display(),
            bytes = self.bytes.len(),
            mime = self.mime_type(),
            "Recording saved"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_concatenated_in_order() {
        let artifact = Artifact::from_chunks(
            ContainerFormat::WebM,
            vec![b"ab".to_vec(), b"cd".to_vec()],
            "app-promo.mp4",
            Duration::from_secs(3),
        );
        assert_eq!(artifact.bytes, b"abcd");
        assert_eq!(artifact.mime_type(), "video/webm");
        assert_eq!(artifact.suggested_filename, "app-promo.mp4");
        assert!(artifact.url().starts_with("blob:mockreel/"));
    }

    #[test]
    fn save_to_writes_suggested_filename() {
        let dir = std::env::temp_dir().join("mockreel_test_artifact");
        let _ = std::fs::remove_dir_all(&dir);

        let artifact = Artifact::from_chunks(
            ContainerFormat::Mp4,
            vec![b"video".to_vec()],
            "app-promo.mp4",
            Duration::ZERO,
        );
        let path = artifact.save_to(&dir).unwrap();

        assert_eq!(path, dir.join("app-promo.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"video");
        std::fs::remove_dir_all(&dir).ok();
    }
}
