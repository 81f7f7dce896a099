use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Failed to create output file {path:?}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An output file that only appears once it is complete
///
/// Everything is written to a temporary file in the target directory,
/// which is renamed to the target path by [OutputFile::persist]. If the
/// `OutputFile` is dropped instead, the temporary file is removed and an
/// existing file at the target path stays untouched.
#[derive(Debug)]
pub struct OutputFile {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl OutputFile {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, OutputError> {
        let target = path.as_ref().to_owned();
        let dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;
        debug!("Writing {target:?} via temporary file {:?}", tmp.path());
        Ok(Self { tmp, target })
    }

    /// A new handle for writing to the temporary file
    pub fn handle(&self) -> Result<File, OutputError> {
        Ok(self.tmp.reopen()?)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the temporary file to the target path
    pub fn persist(self) -> Result<(), OutputError> {
        self.tmp.as_file().sync_all()?;
        let target = self.target;
        self.tmp.persist(&target).map_err(|err| OutputError::Persist {
            path: target.clone(),
            source: err.error,
        })?;
        debug!("Wrote {target:?}");
        Ok(())
    }
}

/// Write text to a file, replacing it only once everything is written
pub fn write_text_file<P: AsRef<Path>>(
    path: P,
    text: &str,
) -> Result<(), OutputError> {
    let out = OutputFile::create(path)?;
    let mut file = out.handle()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    drop(file);
    out.persist()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_on_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flux.txt");
        std::fs::write(&path, "old").unwrap();

        let out = OutputFile::create(&path).unwrap();
        write!(out.handle().unwrap(), "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        out.persist().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");

        write_text_file(&path, "0\t12\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0\t12\n");
    }

    #[test]
    fn discard_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flux.txt");
        {
            let out = OutputFile::create(&path).unwrap();
            write!(out.handle().unwrap(), "partial").unwrap();
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
