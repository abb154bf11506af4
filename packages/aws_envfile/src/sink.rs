//! Output file handling
//!
//! The default mode deletes the destination and then appends one line per write.
//! It is not atomic: a failure after the delete leaves no file, and two runs
//! against the same path interleave their lines. [`WriteMode::Atomic`] writes a
//! sibling temp file and renames it over the destination instead.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{EnvFileError, EnvFileResult};
use crate::logging::LoggingTransformer;

/// How the destination file is replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Delete first, then append line by line
    #[default]
    DeleteThenAppend,
    /// Write a temp file in the same directory, then rename it into place
    Atomic,
}

/// Destination file of one run
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: PathBuf,
    mode: WriteMode,
}

impl OutputSink {
    /// Sink for `path`, not touched until used
    pub fn new(path: impl Into<PathBuf>, mode: WriteMode) -> Self {
        OutputSink {
            path: path.into(),
            mode,
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove a pre-existing destination file; a no-op in atomic mode
    ///
    /// Returns whether a file was removed.
    pub async fn remove_existing(&self) -> EnvFileResult<bool> {
        if self.mode == WriteMode::Atomic {
            return Ok(false);
        }

        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|e| EnvFileError::io(&self.path, e))?;
        if !exists {
            return Ok(false);
        }

        fs::remove_file(&self.path)
            .await
            .map_err(|e| EnvFileError::io(&self.path, e))?;
        LoggingTransformer::log_existing_file_removed(&self.path);
        Ok(true)
    }

    /// Write every rendered line in order
    pub async fn write_lines(&self, lines: &[String]) -> EnvFileResult<()> {
        match self.mode {
            WriteMode::DeleteThenAppend => {
                for line in lines {
                    append_line(&self.path, line).await?;
                }
                Ok(())
            }
            WriteMode::Atomic => atomic_replace(&self.path, &lines.concat()).await,
        }
    }
}

async fn append_line(path: &Path, line: &str) -> EnvFileResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| EnvFileError::io(path, e))?;

    file.write_all(line.as_bytes())
        .await
        .map_err(|e| EnvFileError::io(path, e))?;
    file.flush().await.map_err(|e| EnvFileError::io(path, e))
}

async fn atomic_replace(path: &Path, contents: &str) -> EnvFileResult<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp.{}", Uuid::new_v4()));

    {
        let mut temp_file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
            .await
            .map_err(|e| EnvFileError::io(&temp_path, e))?;

        temp_file
            .write_all(contents.as_bytes())
            .await
            .map_err(|e| EnvFileError::io(&temp_path, e))?;
        temp_file
            .sync_all()
            .await
            .map_err(|e| EnvFileError::io(&temp_path, e))?;
    }

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(EnvFileError::io(path, e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "STALE=1\n").unwrap();

        let sink = OutputSink::new(&path, WriteMode::DeleteThenAppend);
        assert!(sink.remove_existing().await.unwrap());
        sink.write_lines(&lines(&["A=1\n", "B=2\n"])).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\nB=2\n");
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_noop() {
        let dir = tempdir().unwrap();
        let sink = OutputSink::new(dir.path().join(".envrc"), WriteMode::DeleteThenAppend);

        assert!(!sink.remove_existing().await.unwrap());
    }

    #[tokio::test]
    async fn test_atomic_mode_keeps_file_until_rename() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("terraform.tfvars");
        std::fs::write(&path, "OLD = \"1\"\n").unwrap();

        let sink = OutputSink::new(&path, WriteMode::Atomic);
        assert!(!sink.remove_existing().await.unwrap());
        assert!(path.exists());

        sink.write_lines(&lines(&["NEW = \"2\"\n"])).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "NEW = \"2\"\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let sink = OutputSink::new(
            dir.path().join("nope").join(".env"),
            WriteMode::DeleteThenAppend,
        );

        let err = sink.write_lines(&lines(&["A=1\n"])).await.unwrap_err();
        assert_eq!(err.name(), "IoError");
    }
}
