//! Page size and clock-tick rate, the two platform constants the readers
//! need to turn raw kernel units into bytes and seconds.
use std::sync::OnceLock;

use crate::error::{Result, SnapshotError};

pub trait PlatformFacts {
    /// Bytes per virtual-memory page.
    fn page_size(&self) -> Result<u64>;

    /// Scheduler clock ticks per second (`USER_HZ`).
    fn clock_ticks_per_second(&self) -> Result<u64>;
}

/// Queries the running kernel through `sysconf`. Each value is looked up once
/// per process and cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFacts;

static PAGE_SIZE: OnceLock<Option<u64>> = OnceLock::new();
static CLK_TCK: OnceLock<Option<u64>> = OnceLock::new();

fn sysconf(name: libc::c_int) -> Option<u64> {
    // SAFETY: sysconf has no side effects and is thread-safe for these names.
    let val = unsafe { libc::sysconf(name) };
    if val > 0 { Some(val as u64) } else { None }
}

impl PlatformFacts for SystemFacts {
    fn page_size(&self) -> Result<u64> {
        PAGE_SIZE
            .get_or_init(|| sysconf(libc::_SC_PAGESIZE))
            .ok_or(SnapshotError::PlatformQuery {
                name: "_SC_PAGESIZE",
            })
    }

    fn clock_ticks_per_second(&self) -> Result<u64> {
        CLK_TCK
            .get_or_init(|| sysconf(libc::_SC_CLK_TCK))
            .ok_or(SnapshotError::PlatformQuery {
                name: "_SC_CLK_TCK",
            })
    }
}

/// Fixed values, for reading fixture files or another machine's dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFacts {
    pub page_size: u64,
    pub clock_ticks_per_second: u64,
}

impl PlatformFacts for FixedFacts {
    fn page_size(&self) -> Result<u64> {
        if self.page_size == 0 {
            return Err(SnapshotError::PlatformQuery {
                name: "_SC_PAGESIZE",
            });
        }
        Ok(self.page_size)
    }

    fn clock_ticks_per_second(&self) -> Result<u64> {
        if self.clock_ticks_per_second == 0 {
            return Err(SnapshotError::PlatformQuery {
                name: "_SC_CLK_TCK",
            });
        }
        Ok(self.clock_ticks_per_second)
    }
}

impl<P: PlatformFacts + ?Sized> PlatformFacts for &P {
    fn page_size(&self) -> Result<u64> {
        (**self).page_size()
    }

    fn clock_ticks_per_second(&self) -> Result<u64> {
        (**self).clock_ticks_per_second()
    }
}
