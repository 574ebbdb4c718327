//! `/proc/<pid>/statm`: memory usage in pages.
use serde::Serialize;

use crate::error::{Result, SnapshotError};

pub const FILE_NAME: &str = "statm";

const FIELDS: usize = 7;

/// Memory regions in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    pub size: u64,
    pub resident: u64,
    pub shared: u64,
    pub text: u64,
    /// Always 0 since Linux 2.6.
    pub lib: u64,
    pub data: u64,
    /// Always 0 since Linux 2.6.
    pub dirty: u64,
}

impl MemorySnapshot {
    pub fn parse(content: &str, page_size: u64) -> Result<Self> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() < FIELDS {
            return Err(SnapshotError::malformed(
                FILE_NAME,
                format!("expected {FIELDS} fields, found {}", fields.len()),
            ));
        }

        let bytes = |idx: usize| -> Result<u64> {
            let pages = fields[idx].parse::<u64>().map_err(|e| {
                SnapshotError::malformed(FILE_NAME, format!("field {idx} ({:?}): {e}", fields[idx]))
            })?;
            pages.checked_mul(page_size).ok_or_else(|| {
                SnapshotError::malformed(FILE_NAME, format!("field {idx} overflows as bytes"))
            })
        };

        Ok(MemorySnapshot {
            size: bytes(0)?,
            resident: bytes(1)?,
            shared: bytes(2)?,
            text: bytes(3)?,
            lib: bytes(4)?,
            data: bytes(5)?,
            dirty: bytes(6)?,
        })
    }
}
