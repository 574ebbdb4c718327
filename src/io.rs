//! `/proc/<pid>/io`: I/O accounting counters.
//!
//! The file is a list of `key: value` lines, for example
//!
//! ```text
//! rchar: 323934931
//! wchar: 323929600
//! syscr: 632687
//! syscw: 632675
//! read_bytes: 0
//! write_bytes: 323932160
//! cancelled_write_bytes: 0
//! ```
use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Result, SnapshotError};

pub const FILE_NAME: &str = "io";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IoSnapshot {
    /// Bytes passed to read-like syscalls, page cache hits included.
    pub rchar: u64,
    /// Bytes passed to write-like syscalls.
    pub wchar: u64,
    pub syscr: u64,
    pub syscw: u64,
    /// Bytes the process caused to be fetched from storage.
    pub read_bytes: u64,
    /// Bytes the process caused to be sent to storage.
    pub write_bytes: u64,
    pub cancelled_write_bytes: u64,
}

impl IoSnapshot {
    pub fn parse(content: &str) -> Result<Self> {
        let mut counters: HashMap<&str, u64> = HashMap::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(SnapshotError::malformed(
                    FILE_NAME,
                    format!("line {line:?} has no ':' separator"),
                ));
            };

            let value = value.trim().parse::<u64>().map_err(|e| {
                SnapshotError::malformed(FILE_NAME, format!("value of {}: {e}", key.trim()))
            })?;

            counters.insert(key.trim(), value);
        }

        let required = |key: &str| {
            counters
                .get(key)
                .copied()
                .ok_or_else(|| SnapshotError::malformed(FILE_NAME, format!("missing {key}")))
        };

        Ok(IoSnapshot {
            rchar: required("rchar")?,
            wchar: required("wchar")?,
            syscr: required("syscr")?,
            syscw: required("syscw")?,
            read_bytes: required("read_bytes")?,
            write_bytes: required("write_bytes")?,
            cancelled_write_bytes: counters.get("cancelled_write_bytes").copied().unwrap_or(0),
        })
    }
}
