//! tracecut-bench-harness
//!
//! Run small end-to-end benchmarks (generate -> write -> stream-trim) and
//! append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run -p tracecut-bench-harness -- --profile benchmarks/configs/small.toml --selection bounded
//!   cargo run -p tracecut-bench-harness -- --profile benchmarks/configs/medium.toml --selection full

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use tracecut_core::{trim_stream, TrimOptions};
use tracecut_trace::generator::{generate_trace, GeneratorSpec};
use tracecut_trace::reader::TraceReader;
use tracecut_trace::writer::{write_trace_file, TraceWriter};

#[derive(Debug, Deserialize)]
struct Profile {
    /// Total calls in the synthetic trace
    calls: u64,
    /// Recorder threads
    threads: u32,
    /// Frame boundary cadence
    calls_per_frame: u64,
    /// Disorder shuffle window (0 = ordered)
    disorder: usize,
    /// Repetitions of the whole pipeline
    repeats: u32,
}

#[derive(Clone, Copy, Debug)]
enum SelectionSel {
    /// Default selection: copy everything.
    Full,
    /// Bounded call range over the middle of the trace (early stop fires).
    Bounded,
    /// A few frames near the start (early stop fires sooner).
    Frames,
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

fn selection_options(sel: SelectionSel, profile: &Profile) -> Result<TrimOptions> {
    let mut options = TrimOptions::default();
    match sel {
        SelectionSel::Full => options.apply_default_selection(),
        SelectionSel::Bounded => {
            let lo = profile.calls / 4;
            let hi = profile.calls / 2;
            options.calls.merge(&format!("{lo}-{hi}"))?;
        }
        SelectionSel::Frames => options.frames.merge("1-2")?,
    }
    Ok(options)
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", "benchmarks/configs/small.toml"));
    let selection_str = parse_flag("selection", "bounded");
    let selection = match selection_str.as_str() {
        "full" => SelectionSel::Full,
        "bounded" => SelectionSel::Bounded,
        "frames" => SelectionSel::Frames,
        other => bail!("unknown selection {other:?} (expected full|bounded|frames)"),
    };

    let profile_text = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let profile: Profile = toml::from_str(&profile_text)
        .with_context(|| format!("parse profile {}", profile_path.display()))?;

    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_secs();

    let reports_dir = PathBuf::from("benchmarks/reports");
    fs::create_dir_all(&reports_dir)
        .with_context(|| format!("create {}", reports_dir.display()))?;
    let csv_path = reports_dir.join(format!("bench-{unix}.csv"));
    let mut csv = fs::File::create(&csv_path)
        .with_context(|| format!("create {}", csv_path.display()))?;
    writeln!(
        csv,
        "selection,calls,threads,disorder,rep,gen_ms,write_ms,trim_ms,calls_read,calls_written"
    )?;

    let tmp = std::env::temp_dir();
    let input_path = tmp.join(format!("tracecut_bench_{unix}.jsonl"));
    let output_path = tmp.join(format!("tracecut_bench_{unix}_out.jsonl"));

    for rep in 0..profile.repeats {
        let spec = GeneratorSpec {
            calls: profile.calls,
            threads: profile.threads,
            calls_per_frame: profile.calls_per_frame,
            disorder_window: profile.disorder,
            seed: 42 + u64::from(rep),
        };

        let t0 = Instant::now();
        let trace = generate_trace(&spec);
        let gen_ms = dur_ms(t0.elapsed());

        let t1 = Instant::now();
        write_trace_file(&input_path, &trace)
            .with_context(|| format!("write {}", input_path.display()))?;
        let write_ms = dur_ms(t1.elapsed());

        let options = selection_options(selection, &profile)?;
        let t2 = Instant::now();
        let reader = TraceReader::open(&input_path)?;
        let mut writer = TraceWriter::create(&output_path, reader.header().clone())?;
        let summary = trim_stream(reader, &mut writer, &options)?;
        writer.finish()?;
        let trim_ms = dur_ms(t2.elapsed());

        writeln!(
            csv,
            "{:?},{},{},{},{},{},{},{},{},{}",
            selection,
            profile.calls,
            profile.threads,
            profile.disorder,
            rep,
            gen_ms,
            write_ms,
            trim_ms,
            summary.calls_read,
            summary.calls_written
        )?;
        println!(
            "rep {rep}: gen {gen_ms}ms, write {write_ms}ms, trim {trim_ms}ms, read {} wrote {}",
            summary.calls_read, summary.calls_written
        );
    }

    let _ = fs::remove_file(&input_path);
    let _ = fs::remove_file(&output_path);

    println!("Report appended to {}", csv_path.display());
    Ok(())
}
