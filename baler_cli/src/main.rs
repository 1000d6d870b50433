use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use baler_core::{CompressionLevel, ContentSize, WorkerPool};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "baler",
    about = "Compress, decompress, and inspect Zstandard frames on a worker pool",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a single Zstandard frame
    Compress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination frame ("-" writes stdout)
        output: PathBuf,
        /// Compression level (zstd range, default 3)
        #[arg(short, long, default_value = "3")]
        level: CompressionLevel,
        /// Worker threads (default: logical CPU count)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Decompress a Zstandard frame
    Decompress {
        /// Source frame ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
        /// Exact output capacity in bytes; disables automatic sizing
        #[arg(long)]
        capacity: Option<usize>,
        /// Worker threads (default: logical CPU count)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Print the frame header without decompressing
    Inspect {
        /// Frame file to inspect
        file: PathBuf,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn build_pool(threads: Option<usize>) -> WorkerPool {
    match threads {
        Some(n) => WorkerPool::new(n),
        None => WorkerPool::with_default_size(),
    }
}

fn read_input(path: &PathBuf) -> anyhow::Result<Vec<u8>> {
    if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("reading input file {path:?}"))
    }
}

fn write_output(path: &PathBuf, bytes: &[u8]) -> anyhow::Result<()> {
    if path.to_str() == Some("-") {
        io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(path, bytes).with_context(|| format!("writing output file {path:?}"))?;
    }
    Ok(())
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(
    input: PathBuf,
    output: PathBuf,
    level: CompressionLevel,
    threads: Option<usize>,
) -> anyhow::Result<()> {
    let data = read_input(&input)?;
    let pool = build_pool(threads);

    let t0 = Instant::now();
    let frame = pool.compress(&data, level).wait()?;
    let elapsed = t0.elapsed();

    write_output(&output, &frame)?;

    let ratio = data.len() as f64 / frame.len().max(1) as f64;
    eprintln!("  level       : {}", level.get());
    eprintln!("  workers     : {}", pool.threads());
    eprintln!("  raw size    : {}", human_bytes(data.len() as u64));
    eprintln!("  compressed  : {}", human_bytes(frame.len() as u64));
    eprintln!("  ratio       : {:.2}x", ratio);
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((data.len() as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(
    input: PathBuf,
    output: PathBuf,
    capacity: Option<usize>,
    threads: Option<usize>,
) -> anyhow::Result<()> {
    let frame = read_input(&input)?;
    let pool = build_pool(threads);

    let t0 = Instant::now();
    let raw = match capacity {
        Some(cap) => pool.decompress_with_capacity(&frame, cap).wait()?,
        None => pool.decompress(&frame).wait()?,
    };
    let elapsed = t0.elapsed();

    write_output(&output, &raw)?;

    eprintln!("  compressed  : {}", human_bytes(frame.len() as u64));
    eprintln!("  raw size    : {}", human_bytes(raw.len() as u64));
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((raw.len() as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_inspect(file: PathBuf) -> anyhow::Result<()> {
    // Only the leading bytes matter; a frame header never exceeds 18 bytes
    // after the magic.
    let mut head = [0u8; 64];
    let mut f = File::open(&file).with_context(|| format!("opening {file:?}"))?;
    let mut filled = 0;
    loop {
        let n = f.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == head.len() {
            break;
        }
    }
    let file_size = f.metadata()?.len();

    let header = baler_core::parse_frame_header(&head[..filled])
        .with_context(|| format!("inspecting {file:?}"))?;

    println!("=== Zstandard frame: {:?} ===", file);
    println!();
    println!("  frame type     : {}", header.frame_type);
    println!("  content size   : {}", header.content_size);
    println!("  window size    : {}", human_bytes(header.window_size));
    println!("  header size    : {} B", header.header_size);
    println!("  dictionary id  : {}", header.dict_id);
    println!(
        "  checksum       : {}",
        if header.checksum_flag { "yes" } else { "no" }
    );
    println!(
        "  reserved       : {} {}",
        header.reserved1, header.reserved2
    );
    println!("  file on disk   : {}", human_bytes(file_size));
    if let ContentSize::Known(raw) = header.content_size {
        if file_size > 0 {
            println!("  ratio          : {:.2}x", raw as f64 / file_size as f64);
        }
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            threads,
        } => run_compress(input, output, level, threads),
        Commands::Decompress {
            input,
            output,
            capacity,
            threads,
        } => run_decompress(input, output, capacity, threads),
        Commands::Inspect { file } => run_inspect(file),
    }
}
