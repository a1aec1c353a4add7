//! [`ImageSink`] writing into one output directory.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use geoharvest_core::{ImageSink, PersistError};
use std::io;

use crate::ensure_dir;

/// Stores images as files directly under a root directory.
///
/// The root is opened once as a capability; file names containing path
/// separators or parent references are rejected, so every write stays inside
/// the root.
#[derive(Debug)]
pub struct FsImageSink {
    root: Utf8PathBuf,
    dir: fs_utf8::Dir,
}

impl FsImageSink {
    /// Create the directory at `path` if needed and open it for writing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn create(path: impl Into<Utf8PathBuf>) -> io::Result<Self> {
        let root = path.into();
        ensure_dir(&root)?;
        let dir = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
        Ok(Self { root, dir })
    }

    fn validate(file_name: &str) -> Result<(), PersistError> {
        let mut components = Utf8Path::new(file_name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Utf8Component::Normal(name)), None) if name == file_name
        );
        if single_normal && !file_name.contains('\\') {
            Ok(())
        } else {
            Err(PersistError::Rejected {
                file_name: file_name.to_owned(),
                reason: "file name must be a single path component".to_owned(),
            })
        }
    }
}

impl ImageSink for FsImageSink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<Utf8PathBuf, PersistError> {
        Self::validate(file_name)?;
        let path = self.root.join(file_name);
        self.dir
            .write(file_name, bytes)
            .map_err(|source| PersistError::Io {
                path: path.clone(),
                source,
            })?;
        log::debug!("wrote {} bytes to {path}", bytes.len());
        Ok(path)
    }

    fn location(&self) -> &Utf8Path {
        &self.root
    }
}
