//! Measure what a function call costs a Linux process.
//!
//! Counters from `/proc/<pid>/stat` and `/proc/<pid>/io` are sampled before
//! and after the call and reduced to a [`BenchmarkReport`]: wall time, user
//! and system CPU time, minor and major page faults, and bytes/syscalls read
//! and written. `/proc/<pid>/statm` can be read on its own for inspection.
//!
//! ```no_run
//! let report = procbench::benchmark(|| std::thread::sleep(std::time::Duration::from_millis(50)))?;
//! println!("{:.3}s wall, {:.3}s cpu", report.t_wall(), report.t_cpu());
//! # Ok::<(), procbench::SnapshotError>(())
//! ```

pub mod benchmark;
pub mod config;
pub mod error;
#[cfg(test)]
mod fixture;
pub mod io;
pub mod platform;
pub mod source;
pub mod stat;
pub mod statm;

pub use benchmark::{BenchmarkReport, Metric, Sample, benchmark, try_benchmark};
pub use error::{Result, SnapshotError};
pub use io::IoSnapshot;
pub use platform::{FixedFacts, PlatformFacts, SystemFacts};
pub use source::{ProcSource, read_io, read_stat, read_statm};
pub use stat::CpuFaultSnapshot;
pub use statm::MemorySnapshot;
