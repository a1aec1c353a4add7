//! Test helpers for writing landmarks documents into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const TWO_CITY_DOCUMENT: &str = r#"{"units": [
    {"name": "Sibiu", "landmarks": [
        {"name": "Turnul Sfatului", "lat": 45.7976, "lon": 24.1519, "kind": "attraction"},
        {"name": "Podul Minciunilor", "lat": 45.7981, "lon": 24.1522}
    ]},
    {"name": "Brasov", "landmarks": [
        {"name": "Biserica Neagra", "lat": 45.6409, "lon": 25.5877, "kind": "church",
         "paths": [[{"lat": 45.6405, "lon": 25.5870}, {"lat": 45.6408, "lon": 25.5876}]]}
    ]}
]}"#;

/// Temporary directory with a UTF-8 root path.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace").field("root", &self.root).finish()
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}
