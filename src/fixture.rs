//! Temporary process directories for tests.
use std::fs;
use std::path::{Path, PathBuf};

/// A directory under the system temp dir laid out like `/proc/<pid>`.
/// Removed on drop, including when the owning test panics.
pub(crate) struct FixtureDir {
    path: PathBuf,
}

impl FixtureDir {
    pub(crate) fn new(files: &[(&str, &str)]) -> Self {
        let path = std::env::temp_dir().join(format!("procbench-{}", fastrand::u64(..)));
        fs::create_dir_all(&path).unwrap();
        for (name, content) in files {
            fs::write(path.join(name), content).unwrap();
        }
        FixtureDir { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for FixtureDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
