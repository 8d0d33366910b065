//! Output sinks that receive encoded artifacts

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::types::{Artifact, ArtifactHandle};

/// Destination for encoded artifacts (the "download" step of an export)
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Deliver `artifact` and report where it ended up
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the artifact cannot be written.
    async fn deliver(&self, artifact: &Artifact) -> crate::Result<ArtifactHandle>;
}

/// Writes artifacts into a directory, creating it on first use
///
/// An existing file with the same name is overwritten.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn deliver(&self, artifact: &Artifact) -> crate::Result<ArtifactHandle> {
        let path = self.dir.join(&artifact.filename);
        let write_error = |e: std::io::Error| PersistenceError::ArtifactWrite {
            path: path.clone(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_error)?;
        tokio::fs::write(&path, &artifact.bytes)
            .await
            .map_err(write_error)?;

        tracing::info!(path = %path.display(), format = %artifact.format, "Artifact delivered");

        Ok(ArtifactHandle {
            format: artifact.format,
            filename: artifact.filename.clone(),
            path,
            size_bytes: artifact.bytes.len() as u64,
        })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::ExportFormat;

    fn artifact() -> Artifact {
        Artifact {
            format: ExportFormat::Csv,
            filename: "EcoFlow_Analytics_Report_2024-01-15.csv".into(),
            bytes: b"Section,Label\n".to_vec(),
        }
    }

    #[tokio::test]
    async fn writes_into_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(temp_dir.path().join("out"));

        let handle = sink.deliver(&artifact()).await.unwrap();
        assert_eq!(handle.size_bytes, 14);
        assert_eq!(handle.path, temp_dir.path().join("out").join(&handle.filename));
        assert_eq!(std::fs::read(&handle.path).unwrap(), b"Section,Label\n");
    }

    #[tokio::test]
    async fn unwritable_target_is_a_persistence_error() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        // A regular file cannot act as the output directory
        let sink = DirectorySink::new(temp_file.path());

        let err = sink.deliver(&artifact()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Persistence(PersistenceError::ArtifactWrite { .. })
        ));
    }
}
