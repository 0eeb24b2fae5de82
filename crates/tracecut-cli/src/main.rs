#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracecut_core::{trim_stream, ThreadId, TrimOptions};
use tracecut_trace::generator::{generate_trace, GeneratorSpec};
use tracecut_trace::reader::TraceReader;
use tracecut_trace::stats;
use tracecut_trace::writer::{write_trace_file, TraceWriter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "tracecut",
    about = "Trim, inspect, and synthesize API-call trace logs",
    long_about = "Trim, inspect, and synthesize API-call trace logs.\n\nUse this tool to cut a trace down to selected calls/frames/threads, count frames, measure out-of-order numbering, or generate synthetic traces.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a new trace by trimming an existing trace.
    /// With no --calls/--frames, the entire set of calls is selected.
    Trim {
        /// Input trace file (.json, .cbor, .jsonl/.ndjson)
        trace: PathBuf,

        /// Include the specified calls in the trimmed output
        /// (e.g. "1-5,10,20-", "2-100/2", "@FILE"; repeatable, merged)
        #[arg(long = "calls", value_name = "CALLSET")]
        calls: Vec<String>,

        /// Include the specified frames in the trimmed output
        /// (same syntax over frame numbers; repeatable, merged)
        #[arg(long = "frames", value_name = "FRAMESET")]
        frames: Vec<String>,

        /// Only retain calls from the specified thread
        #[arg(long, value_name = "THREAD_ID")]
        thread: Option<ThreadId>,

        /// Output trace file (default: INPUT with a `-trim` suffix)
        #[arg(short = 'o', long, value_name = "TRACE_FILE")]
        output: Option<PathBuf>,
    },

    /// Count the frames and calls in a trace
    Scan {
        /// Input trace file
        trace: PathBuf,
    },

    /// Identify out-of-order call numbers in a trace
    Disorder {
        /// Input trace file
        trace: PathBuf,
    },

    /// Generate a synthetic trace
    Generate {
        /// Number of calls (>0)
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u64).range(1..))]
        calls: u64,

        /// Number of recorder threads (>0)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        threads: u32,

        /// A frame boundary every this many calls (0 = no frames)
        #[arg(long, default_value_t = 16)]
        calls_per_frame: u64,

        /// Shuffle stream order within windows of this size (<=1 keeps order)
        #[arg(long, default_value_t = 0)]
        disorder: usize,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output path (.json, .cbor, .jsonl/.ndjson)
        #[arg(long, default_value = "synthetic.jsonl")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Trim {
            trace,
            calls,
            frames,
            thread,
            output,
        } => trim(trace, &calls, &frames, thread, output),

        Cmd::Scan { trace } => scan(&trace),

        Cmd::Disorder { trace } => disorder(&trace),

        Cmd::Generate {
            calls,
            threads,
            calls_per_frame,
            disorder,
            seed,
            out,
        } => generate(calls, threads, calls_per_frame, disorder, seed, out),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn trim(
    trace: PathBuf,
    calls: &[String],
    frames: &[String],
    thread: Option<ThreadId>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut options = TrimOptions {
        thread,
        ..TrimOptions::default()
    };
    for spec in calls {
        options
            .calls
            .merge(spec)
            .with_context(|| format!("parsing --calls {spec:?}"))?;
    }
    for spec in frames {
        options
            .frames
            .merge(spec)
            .with_context(|| format!("parsing --frames {spec:?}"))?;
    }
    // If neither --calls nor --frames was set, default to the entire set
    // of calls.
    options.apply_default_selection();

    let reader =
        TraceReader::open(&trace).with_context(|| format!("opening {}", trace.display()))?;

    let output = output.unwrap_or_else(|| default_output_path(&trace));
    let mut writer = TraceWriter::create(&output, reader.header().clone())
        .with_context(|| format!("creating {}", output.display()))?;

    info!(input=%trace.display(), output=%output.display(), "trimming");
    let summary = trim_stream(reader, &mut writer, &options)
        .with_context(|| format!("trimming {}", trace.display()))?;
    writer.finish()?;

    info!(
        calls_read = summary.calls_read,
        calls_written = summary.calls_written,
        frames_seen = summary.frames_seen,
        "trim complete"
    );
    println!(
        "Trimmed trace is available as {} ({} of {} calls kept)",
        output.display(),
        summary.calls_written,
        summary.calls_read
    );
    Ok(())
}

fn scan(trace: &Path) -> Result<()> {
    let reader =
        TraceReader::open(trace).with_context(|| format!("opening {}", trace.display()))?;
    let report = stats::scan(reader).with_context(|| format!("scanning {}", trace.display()))?;

    println!("{} frames", report.frames);
    println!("{} calls", report.calls);
    for (index, end) in report.frame_ends.iter().enumerate() {
        println!("frame {index} ends at call {end}");
    }
    Ok(())
}

fn disorder(trace: &Path) -> Result<()> {
    let reader =
        TraceReader::open(trace).with_context(|| format!("opening {}", trace.display()))?;
    let report =
        stats::disorder(reader).with_context(|| format!("scanning {}", trace.display()))?;

    println!(
        "Number of disordered calls: {} out of {} ({:.1}%)",
        report.out_of_order,
        report.calls,
        report.ratio() * 100.0
    );
    println!("Max disorder distance:      {}", report.max_distance);
    Ok(())
}

fn generate(
    calls: u64,
    threads: u32,
    calls_per_frame: u64,
    disorder: usize,
    seed: u64,
    out: PathBuf,
) -> Result<()> {
    info!(calls, threads, calls_per_frame, disorder, seed, "generating synthetic trace");
    let trace = generate_trace(&GeneratorSpec {
        calls,
        threads,
        calls_per_frame,
        disorder_window: disorder,
        seed,
    });

    write_trace_file(&out, &trace)
        .with_context(|| format!("writing trace to {}", out.display()))?;

    println!(
        "Generated trace: {} calls, {} threads → {}",
        calls,
        threads,
        out.display()
    );
    Ok(())
}

/// Derive the default output path: `app.cbor` → `app-trim.cbor`.
///
/// The input's extension is kept so the output stays in the same container
/// representation; inputs without one fall back to `.json`, the writer's
/// default format.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("trace");
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("json");
    input.with_file_name(format!("{stem}-trim.{ext}"))
}
