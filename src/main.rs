// Prints the io, stat and statm snapshots of a process, as a sanity check of
// the readers on this kernel.
//
//   procbench                      # this process
//   procbench --pid 1234 --format json
//   procbench --bench-sleep-ms 200 # also benchmark a sleep and print the report

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use procbench::config::Config;
use procbench::{
    BenchmarkReport, CpuFaultSnapshot, IoSnapshot, MemorySnapshot, ProcSource, SystemFacts,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect /proc counters used by procbench")]
struct Args {
    /// PID to inspect (defaults to this process)
    #[arg(long)]
    pid: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Benchmark a sleep of this many milliseconds against this process
    #[arg(long)]
    bench_sleep_ms: Option<u64>,
}

#[derive(Serialize)]
struct Inspection {
    io: IoSnapshot,
    stat: CpuFaultSnapshot,
    statm: MemorySnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    benchmark: Option<BenchmarkReport>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let dir = match args.pid {
        Some(pid) => config.proc_root.join(pid.to_string()),
        None => config.proc_root.join("self"),
    };
    let source = ProcSource::new(dir, SystemFacts);
    tracing::info!(source = %source.dir().display(), "reading snapshots");

    // Everything is read before anything is printed.
    let inspection = Inspection {
        io: source.read_io().context("reading io")?,
        stat: source.read_stat().context("reading stat")?,
        statm: source.read_statm().context("reading statm")?,
        benchmark: match args.bench_sleep_ms {
            Some(ms) => {
                let own = ProcSource::new(config.proc_root.join("self"), SystemFacts);
                let report = own
                    .benchmark(|| std::thread::sleep(Duration::from_millis(ms)))
                    .context("benchmarking sleep")?;
                Some(report)
            }
            None => None,
        },
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Json => {
            let json = sonic_rs::to_string(&inspection).context("serialize")?;
            writeln!(out, "{json}")?;
        }
        Format::Text => print_text(&mut out, &inspection)?,
    }

    Ok(())
}

fn print_text(out: &mut impl Write, i: &Inspection) -> std::io::Result<()> {
    let io = &i.io;
    writeln!(out)?;
    writeln!(out, "io ----------")?;
    for (key, val) in [
        ("rchar", io.rchar),
        ("wchar", io.wchar),
        ("syscr", io.syscr),
        ("syscw", io.syscw),
        ("read_bytes", io.read_bytes),
        ("write_bytes", io.write_bytes),
        ("cancelled_write_bytes", io.cancelled_write_bytes),
    ] {
        writeln!(out, "   {key} {val}")?;
    }

    let st = &i.stat;
    writeln!(out)?;
    writeln!(out, "stat ----------")?;
    for (key, val) in [
        ("minflt", st.minflt),
        ("cminflt", st.cminflt),
        ("majflt", st.majflt),
        ("cmajflt", st.cmajflt),
    ] {
        writeln!(out, "   {key} {val}")?;
    }
    for (key, val) in [
        ("utime", st.utime),
        ("stime", st.stime),
        ("cutime", st.cutime),
        ("cstime", st.cstime),
    ] {
        writeln!(out, "   {key} {val:.2}")?;
    }

    let m = &i.statm;
    writeln!(out)?;
    writeln!(out, "statm ----------")?;
    for (key, val) in [
        ("size", m.size),
        ("resident", m.resident),
        ("share", m.shared),
        ("text", m.text),
        ("lib", m.lib),
        ("data", m.data),
        ("dt", m.dirty),
    ] {
        writeln!(out, "   {key} {val}")?;
    }

    if let Some(report) = &i.benchmark {
        writeln!(out)?;
        writeln!(out, "benchmark ----------")?;
        for (name, metric) in report.metrics() {
            match metric {
                procbench::Metric::Seconds(s) => writeln!(out, "   {name} {s:.4}")?,
                procbench::Metric::Count(c) => writeln!(out, "   {name} {c}")?,
            }
        }
    }
    writeln!(out)?;
    Ok(())
}
