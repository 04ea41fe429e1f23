use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{EncoderConfig, Limits};
use glob::Pattern;
use objz_tools::{dump_stream, format_events_pretty, inspect_stream, recompress, InspectReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "objz", version, about = "objz mesh stream inspection and conversion tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect stream header, event mix and float coding.
    Inspect {
        /// Path to a stream, or a directory of streams.
        stream_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected streams.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected streams (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Decode a stream into its events.
    Dump {
        /// Path to the stream bytes.
        stream_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Re-encode a stream with a different float cache size.
    Recompress {
        /// Path to the input stream.
        input: PathBuf,
        /// Path for the re-encoded stream.
        output: PathBuf,
        /// Float cache index width of the output stream.
        #[arg(long, default_value_t = wire::DEFAULT_FLOAT_BITS)]
        float_bits: u8,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let limits = Limits::default();
    match cli.command {
        Command::Inspect {
            stream_path,
            glob,
            sort,
            limit,
            format,
        } => {
            if stream_path.is_dir() {
                let entries = collect_stream_entries(&stream_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let report = inspect_file(&entry.path, &limits)?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_report(&report, format)?;
                }
            } else {
                let report = inspect_file(&stream_path, &limits)?;
                print_report(&report, format)?;
            }
        }
        Command::Dump {
            stream_file,
            format,
        } => {
            let bytes = fs::read(&stream_file)
                .with_context(|| format!("read stream {}", stream_file.display()))?;
            let output = dump_stream(&bytes, &limits)?;
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                OutputFormat::Pretty => {
                    print!("{}", format_events_pretty(&output.events));
                }
            }
        }
        Command::Recompress {
            input,
            output,
            float_bits,
        } => {
            let bytes =
                fs::read(&input).with_context(|| format!("read stream {}", input.display()))?;
            let config = EncoderConfig::new()
                .with_float_bits(float_bits)
                .with_limits(limits);
            let (encoded, stats) = recompress(&bytes, &limits, config)?;
            fs::write(&output, &encoded)
                .with_context(|| format!("write stream {}", output.display()))?;
            info!(
                input_bytes = bytes.len(),
                output_bytes = encoded.len(),
                events = stats.total_events(),
                "recompressed stream"
            );
            println!(
                "{} -> {}: {} -> {} bytes",
                input.display(),
                output.display(),
                bytes.len(),
                encoded.len()
            );
        }
    }
    Ok(())
}

fn inspect_file(path: &Path, limits: &Limits) -> Result<InspectReport> {
    let bytes = fs::read(path).with_context(|| format!("read stream {}", path.display()))?;
    inspect_stream(&bytes, limits).with_context(|| format!("inspect {}", path.display()))
}

struct StreamEntry {
    path: PathBuf,
    size: u64,
}

fn collect_stream_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<StreamEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(StreamEntry { path, size });
    }
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<StreamEntry>,
    sort: Option<InspectSort>,
) -> Vec<StreamEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}

fn print_report(report: &InspectReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print_report_pretty(report),
    }
    Ok(())
}

fn print_report_pretty(report: &InspectReport) {
    println!(
        "version: {} float_bits: {} (cache {} entries)",
        report.version,
        report.float_bits,
        (1usize << report.float_bits) - 2
    );
    println!(
        "size: {} bytes, payload {} bits",
        report.total_bytes, report.payload_bits
    );
    if !report.objects.is_empty() {
        println!("objects: {}", report.objects.join(", "));
    }
    println!("events:");
    for event in &report.events {
        println!("  {}: {}", event.kind, event.count);
    }
    println!("  repeated: {}", report.repeats);
    let floats = report.floats;
    println!(
        "floats: {} exact, {} delta, {} literal",
        floats.exact, floats.delta, floats.literal
    );
    if let Some(bits) = report.bits_per_float() {
        println!("payload bits per float: {bits:.2}");
    }
}
