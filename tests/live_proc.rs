//! Integration tests against the live `/proc/self` of the test process.
//!
//! `/proc/self/io` needs task I/O accounting in the kernel. Where it is
//! missing the IO-dependent tests check that the failure is reported as
//! unavailable and stop there.
#![cfg(target_os = "linux")]

use std::fs;
use std::io::Write;
use std::panic;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{Result, ensure};
use procbench::{SnapshotError, benchmark, read_io, read_stat, read_statm, try_benchmark};

// /proc/self counts every thread, so benchmarks must not overlap.
static WINDOW: Mutex<()> = Mutex::new(());

fn exclusive() -> MutexGuard<'static, ()> {
    WINDOW.lock().unwrap_or_else(|e| e.into_inner())
}

fn io_accounting_available() -> bool {
    match read_io() {
        Ok(_) => true,
        Err(e) => {
            assert!(e.is_unavailable(), "unexpected io error: {e}");
            eprintln!("skipping: {e}");
            false
        }
    }
}

#[test]
fn sleep_is_wall_time_not_cpu_time() -> Result<()> {
    let _window = exclusive();
    if !io_accounting_available() {
        return Ok(());
    }
    let report = benchmark(|| thread::sleep(Duration::from_millis(200)))?;

    ensure!(report.t_wall() >= 0.2, "t_wall {} too short", report.t_wall());
    ensure!(report.t_wall() < 0.3, "t_wall {} too long", report.t_wall());
    ensure!(report.t_cpu() < 0.1, "t_cpu {} for a sleep", report.t_cpu());
    ensure!(report.t_cpu() >= 0.0);
    ensure!((report.t_cpu() - report.t_cpu_usr() - report.t_cpu_sys()).abs() < 1e-9);
    Ok(())
}

#[test]
fn file_writes_show_up_in_io_counters() -> Result<()> {
    let _window = exclusive();
    if !io_accounting_available() {
        return Ok(());
    }
    let path = std::env::temp_dir().join(format!("procbench-write-{}", fastrand::u64(..)));
    let chunk = vec![b'x'; 64 * 1024];

    let report = try_benchmark(|| -> Result<()> {
        let mut file = fs::File::create(&path)?;
        for _ in 0..16 {
            file.write_all(&chunk)?;
        }
        file.sync_all()?;
        Ok(())
    })?;
    fs::remove_file(&path)?;

    ensure!(report.w_all() >= 16 * 64 * 1024, "w_all {}", report.w_all());
    ensure!(report.w_ncall() >= 16, "w_ncall {}", report.w_ncall());
    ensure!(report.w_dsk() >= 0);
    ensure!(report.r_dsk() >= 0);
    Ok(())
}

#[test]
fn workload_error_is_returned_without_report() {
    let _window = exclusive();
    #[derive(Debug, PartialEq)]
    enum Error {
        Snapshot(String),
        Workload(&'static str),
    }
    impl From<SnapshotError> for Error {
        fn from(e: SnapshotError) -> Self {
            Error::Snapshot(e.to_string())
        }
    }

    fn workload() -> std::result::Result<(), Error> {
        Err(Error::Workload("boom"))
    }

    let mut after_ran = false;
    let result = try_benchmark(|| -> std::result::Result<(), Error> {
        workload()?;
        after_ran = true;
        Ok(())
    });

    match result {
        Err(Error::Workload(msg)) => assert_eq!(msg, "boom"),
        // No io accounting: the before-sample fails first.
        Err(Error::Snapshot(msg)) => assert!(!io_accounting_available(), "{msg}"),
        Ok(report) => panic!("got a report {report:?}"),
    }
    assert!(!after_ran);
}

#[test]
fn panicking_workload_propagates_panic() {
    let _window = exclusive();
    if !io_accounting_available() {
        return;
    }
    let outcome = panic::catch_unwind(|| benchmark(|| -> () { panic!("workload panicked") }));
    let payload = outcome.expect_err("panic should not be swallowed");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"workload panicked"));
}

#[test]
fn back_to_back_reads_do_not_decrease() -> Result<()> {
    let _window = exclusive();
    let s1 = read_stat()?;
    let s2 = read_stat()?;
    ensure!(s2.minflt >= s1.minflt && s2.cminflt >= s1.cminflt);
    ensure!(s2.majflt >= s1.majflt && s2.cmajflt >= s1.cmajflt);
    ensure!(s2.utime >= s1.utime && s2.stime >= s1.stime);
    ensure!(s2.cutime >= s1.cutime && s2.cstime >= s1.cstime);

    if io_accounting_available() {
        let i1 = read_io()?;
        let i2 = read_io()?;
        ensure!(i2.rchar >= i1.rchar && i2.wchar >= i1.wchar);
        ensure!(i2.syscr > i1.syscr, "reading io is itself a read syscall");
        ensure!(i2.syscw >= i1.syscw);
        ensure!(i2.read_bytes >= i1.read_bytes && i2.write_bytes >= i1.write_bytes);
    }
    Ok(())
}

#[test]
fn statm_reports_bytes() -> Result<()> {
    let _window = exclusive();
    let mem = read_statm()?;
    let page = procbench::PlatformFacts::page_size(&procbench::SystemFacts)?;
    ensure!(mem.resident > 0);
    ensure!(mem.size % page == 0 && mem.resident % page == 0);
    ensure!(mem.size >= mem.resident);
    Ok(())
}
