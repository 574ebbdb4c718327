//! Before/after sampling around a single call, reduced into a [`BenchmarkReport`].
//!
//! Sampling order is fixed so that IO counters and the wall clock sit as
//! close to the call as possible:
//!
//! 1. stat (before)
//! 2. wall clock (before)
//! 3. io (before)
//! 4. call
//! 5. io (after)
//! 6. wall clock (after)
//! 7. stat (after)
//!
//! `statm` is not sampled here; it is only exposed for manual inspection.
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, SnapshotError};
use crate::io::IoSnapshot;
use crate::platform::PlatformFacts;
use crate::source::ProcSource;
use crate::stat::CpuFaultSnapshot;

/// The counters captured at one edge of the measurement window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub stat: CpuFaultSnapshot,
    pub io: IoSnapshot,
}

/// One value in the flat report view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Seconds(f64),
    Count(i64),
}

impl Metric {
    pub fn as_f64(self) -> f64 {
        match self {
            Metric::Seconds(s) => s,
            Metric::Count(c) => c as f64,
        }
    }

    pub fn is_negative(self) -> bool {
        self.as_f64() < 0.0
    }
}

/// Resource usage of one benchmarked call. Times are seconds; everything
/// else is a signed count of events or bytes, `after - before`. A negative
/// value means a counter went backwards and is reported as-is.
///
/// CPU time and faults include threads and reaped children. `w_all`/`r_all`
/// count bytes handed to syscalls (cache hits included); `w_dsk`/`r_dsk`
/// count bytes the kernel attributes to storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    started_at: DateTime<Utc>,
    t_wall: f64,
    t_cpu: f64,
    t_cpu_usr: f64,
    t_cpu_sys: f64,
    f_min: i64,
    f_maj: i64,
    w_all: i64,
    w_dsk: i64,
    w_ncall: i64,
    r_all: i64,
    r_dsk: i64,
    r_ncall: i64,
}

fn delta(before: u64, after: u64) -> i64 {
    after.wrapping_sub(before) as i64
}

impl BenchmarkReport {
    pub fn from_samples(
        before: &Sample,
        after: &Sample,
        wall: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        let (si, sf) = (&before.stat, &after.stat);
        let (ii, iff) = (&before.io, &after.io);

        let t_cpu_usr = (sf.utime - si.utime) + (sf.cutime - si.cutime);
        let t_cpu_sys = (sf.stime - si.stime) + (sf.cstime - si.cstime);

        BenchmarkReport {
            started_at,
            t_wall: wall.as_secs_f64(),
            t_cpu: t_cpu_usr + t_cpu_sys,
            t_cpu_usr,
            t_cpu_sys,
            f_min: delta(si.minflt, sf.minflt) + delta(si.cminflt, sf.cminflt),
            f_maj: delta(si.majflt, sf.majflt) + delta(si.cmajflt, sf.cmajflt),
            w_all: delta(ii.wchar, iff.wchar),
            w_dsk: delta(ii.write_bytes, iff.write_bytes),
            w_ncall: delta(ii.syscw, iff.syscw),
            r_all: delta(ii.rchar, iff.rchar),
            r_dsk: delta(ii.read_bytes, iff.read_bytes),
            r_ncall: delta(ii.syscr, iff.syscr),
        }
    }

    /// Every metric by name, in a fixed order.
    pub fn metrics(&self) -> [(&'static str, Metric); 12] {
        use Metric::{Count, Seconds};
        [
            ("t_wall", Seconds(self.t_wall)),
            ("t_cpu", Seconds(self.t_cpu)),
            ("t_cpu_usr", Seconds(self.t_cpu_usr)),
            ("t_cpu_sys", Seconds(self.t_cpu_sys)),
            ("f_min", Count(self.f_min)),
            ("f_maj", Count(self.f_maj)),
            ("w_all", Count(self.w_all)),
            ("w_dsk", Count(self.w_dsk)),
            ("w_ncall", Count(self.w_ncall)),
            ("r_all", Count(self.r_all)),
            ("r_dsk", Count(self.r_dsk)),
            ("r_ncall", Count(self.r_ncall)),
        ]
    }

    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, m)| m)
    }

    /// Names of metrics that came out negative.
    pub fn anomalies(&self) -> Vec<&'static str> {
        self.metrics()
            .into_iter()
            .filter(|(_, m)| m.is_negative())
            .map(|(n, _)| n)
            .collect()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Elapsed wall-clock time, including time spent waiting.
    pub fn t_wall(&self) -> f64 {
        self.t_wall
    }

    pub fn t_cpu(&self) -> f64 {
        self.t_cpu
    }

    pub fn t_cpu_usr(&self) -> f64 {
        self.t_cpu_usr
    }

    pub fn t_cpu_sys(&self) -> f64 {
        self.t_cpu_sys
    }

    pub fn f_min(&self) -> i64 {
        self.f_min
    }

    pub fn f_maj(&self) -> i64 {
        self.f_maj
    }

    pub fn w_all(&self) -> i64 {
        self.w_all
    }

    pub fn w_dsk(&self) -> i64 {
        self.w_dsk
    }

    pub fn w_ncall(&self) -> i64 {
        self.w_ncall
    }

    pub fn r_all(&self) -> i64 {
        self.r_all
    }

    pub fn r_dsk(&self) -> i64 {
        self.r_dsk
    }

    pub fn r_ncall(&self) -> i64 {
        self.r_ncall
    }
}

impl<P: PlatformFacts> ProcSource<P> {
    /// Runs `f` once between two samples of this source. The closure's
    /// output is dropped after the window closes.
    pub fn benchmark<T, F>(&self, f: F) -> Result<BenchmarkReport>
    where
        F: FnOnce() -> T,
    {
        self.try_benchmark(|| Ok::<T, SnapshotError>(f()))
    }

    /// Like [`benchmark`](Self::benchmark) for a fallible workload. If `f`
    /// fails the after-samples are skipped and its error is returned as is.
    pub fn try_benchmark<T, E, F>(&self, f: F) -> std::result::Result<BenchmarkReport, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<SnapshotError>,
    {
        let stat_i = self.read_stat()?;
        let started_at = Utc::now();
        let time_i = Instant::now();
        let io_i = self.read_io()?;

        let _output = f()?;

        let io_f = self.read_io()?;
        let wall = time_i.elapsed();
        let stat_f = self.read_stat()?;

        let report = BenchmarkReport::from_samples(
            &Sample {
                stat: stat_i,
                io: io_i,
            },
            &Sample {
                stat: stat_f,
                io: io_f,
            },
            wall,
            started_at,
        );

        for name in report.anomalies() {
            tracing::warn!(
                source = %self.dir().display(),
                metric = name,
                value = ?report.get(name),
                "counter went backwards during benchmark"
            );
        }
        tracing::debug!(
            t_wall = report.t_wall,
            t_cpu = report.t_cpu,
            f_min = report.f_min,
            f_maj = report.f_maj,
            w_all = report.w_all,
            r_all = report.r_all,
            "benchmark finished"
        );

        Ok(report)
    }
}

/// Benchmarks `f` against `/proc/self`.
pub fn benchmark<T, F>(f: F) -> Result<BenchmarkReport>
where
    F: FnOnce() -> T,
{
    ProcSource::current().benchmark(f)
}

pub fn try_benchmark<T, E, F>(f: F) -> std::result::Result<BenchmarkReport, E>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: From<SnapshotError>,
{
    ProcSource::current().try_benchmark(f)
}
