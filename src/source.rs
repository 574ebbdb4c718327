use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SnapshotError};
use crate::io::{self, IoSnapshot};
use crate::platform::{PlatformFacts, SystemFacts};
use crate::stat::{self, CpuFaultSnapshot};
use crate::statm::{self, MemorySnapshot};

pub const PROC_ROOT: &str = "/proc";

/// A process directory under procfs (or a fixture directory laid out the
/// same way) plus the platform constants used to convert its units.
///
/// Holds no snapshot state; every read opens, reads and closes the file.
#[derive(Debug, Clone)]
pub struct ProcSource<P = SystemFacts> {
    dir: PathBuf,
    facts: P,
}

impl ProcSource<SystemFacts> {
    /// `/proc/self` of the calling process.
    pub fn current() -> Self {
        Self::new(Path::new(PROC_ROOT).join("self"), SystemFacts)
    }

    pub fn pid(pid: u32) -> Self {
        Self::new(Path::new(PROC_ROOT).join(pid.to_string()), SystemFacts)
    }
}

impl<P: PlatformFacts> ProcSource<P> {
    pub fn new(dir: impl Into<PathBuf>, facts: P) -> Self {
        ProcSource {
            dir: dir.into(),
            facts,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn facts(&self) -> &P {
        &self.facts
    }

    pub fn read_io(&self) -> Result<IoSnapshot> {
        let path = self.dir.join(io::FILE_NAME);
        let content = read_source(&path)?;
        IoSnapshot::parse(&content).map_err(|e| e.at(&path))
    }

    pub fn read_statm(&self) -> Result<MemorySnapshot> {
        let path = self.dir.join(statm::FILE_NAME);
        let content = read_source(&path)?;
        let page_size = self.facts.page_size()?;
        MemorySnapshot::parse(&content, page_size).map_err(|e| e.at(&path))
    }

    pub fn read_stat(&self) -> Result<CpuFaultSnapshot> {
        let path = self.dir.join(stat::FILE_NAME);
        let content = read_source(&path)?;
        let hz = self.facts.clock_ticks_per_second()?;
        CpuFaultSnapshot::parse(&content, hz).map_err(|e| e.at(&path))
    }
}

fn read_source(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), len = content.len(), "read snapshot source");
    Ok(content)
}

pub fn read_io() -> Result<IoSnapshot> {
    ProcSource::current().read_io()
}

pub fn read_statm() -> Result<MemorySnapshot> {
    ProcSource::current().read_statm()
}

pub fn read_stat() -> Result<CpuFaultSnapshot> {
    ProcSource::current().read_stat()
}
