use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl OutputError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }
}

/// An output file that only appears at its destination once it is committed.
///
/// Content is written to a temporary file in the destination directory and renamed over the
/// destination by [`AtomicFile::commit`]. Dropping the value without committing removes the
/// temporary file and leaves any existing destination untouched.
#[derive(Debug)]
pub struct AtomicFile {
    path: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

impl AtomicFile {
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(directory).map_err(|e| OutputError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the content and moves it to the destination path.
    pub fn commit(self) -> Result<(), OutputError> {
        let path = self.path;
        let temp = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::io(&path, e.into_error()))?;
        temp.persist(&path)
            .map_err(|e| OutputError::io(&path, e.error))?;
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Writes a whole file atomically through `write`.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut AtomicFile) -> io::Result<()>,
{
    let mut file = AtomicFile::create(path)?;
    write(&mut file).map_err(|e| OutputError::io(path, e))?;
    file.commit()
}

/// Formats a fraction the way every table export does.
pub(crate) fn fraction(value: f64) -> String {
    format!("{:.3}", value)
}
