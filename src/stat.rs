//! `/proc/<pid>/stat`: page faults and scheduler time.
//!
//! The record is `pid (comm) state ppid ...`. `comm` can contain spaces and
//! parentheses, so fields are counted from the last `)`. Numbering below is
//! the 1-based field number from proc(5).
use serde::Serialize;

use crate::error::{Result, SnapshotError};

pub const FILE_NAME: &str = "stat";

const MINFLT: usize = 10;
const CMINFLT: usize = 11;
const MAJFLT: usize = 12;
const CMAJFLT: usize = 13;
const UTIME: usize = 14;
const STIME: usize = 15;
const CUTIME: usize = 16;
const CSTIME: usize = 17;

/// Field 3 (`state`) is the first token after `comm`.
const FIRST_AFTER_COMM: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CpuFaultSnapshot {
    pub minflt: u64,
    pub cminflt: u64,
    pub majflt: u64,
    pub cmajflt: u64,
    /// Seconds.
    pub utime: f64,
    pub stime: f64,
    pub cutime: f64,
    pub cstime: f64,
}

impl CpuFaultSnapshot {
    pub fn parse(content: &str, ticks_per_second: u64) -> Result<Self> {
        let end_paren = content
            .rfind(')')
            .ok_or_else(|| SnapshotError::malformed(FILE_NAME, "no closing ')' after comm"))?;
        let fields: Vec<&str> = content[end_paren + 1..].split_whitespace().collect();

        let needed = CSTIME - FIRST_AFTER_COMM + 1;
        if fields.len() < needed {
            return Err(SnapshotError::malformed(
                FILE_NAME,
                format!("expected at least {needed} fields after comm, found {}", fields.len()),
            ));
        }

        let field = |num: usize| -> Result<u64> {
            let raw = fields[num - FIRST_AFTER_COMM];
            raw.parse::<u64>().map_err(|e| {
                SnapshotError::malformed(FILE_NAME, format!("field {num} ({raw:?}): {e}"))
            })
        };
        let hz = ticks_per_second as f64;
        let seconds = |num: usize| -> Result<f64> { Ok(field(num)? as f64 / hz) };

        Ok(CpuFaultSnapshot {
            minflt: field(MINFLT)?,
            cminflt: field(CMINFLT)?,
            majflt: field(MAJFLT)?,
            cmajflt: field(CMAJFLT)?,
            utime: seconds(UTIME)?,
            stime: seconds(STIME)?,
            cutime: seconds(CUTIME)?,
            cstime: seconds(CSTIME)?,
        })
    }
}
