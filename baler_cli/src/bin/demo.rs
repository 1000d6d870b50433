//! Worker-pool throughput demo.
//!
//! Generates a synthetic structured-log dataset, slices it into independent
//! chunks, and compresses every chunk twice: once sequentially (waiting on
//! each submission before issuing the next) and once with the whole batch
//! in flight across the pool. The point is the wall-clock difference: the
//! submitting thread never blocks while workers chew through the queue.

use std::time::{Duration, Instant};

use anyhow::Result;

use baler_core::{CompressionLevel, WorkerPool};

// ── constants ──────────────────────────────────────────────────────────────

const TARGET_RAW_BYTES: usize = 32 * 1024 * 1024; // 32 MB
const CHUNK_SIZE: usize = 2 * 1024 * 1024; // 2 MB per submission
const LEVEL: CompressionLevel = CompressionLevel::DEFAULT;

// Vocabulary for synthetic telemetry lines; limited pools mean realistic
// repetition, which is what makes log data compressible at all.
const HOSTS: &[&str] = &[
    "edge-01", "edge-02", "edge-03", "cache-a", "cache-b", "db-primary", "db-replica", "batch-7",
];
const SERVICES: &[&str] = &[
    "ingest", "ingest", "router", "billing", "auth", "search", "ingest", "metrics",
];
const LEVELS: &[&str] = &["INFO", "INFO", "INFO", "INFO", "WARN", "INFO", "ERROR", "DEBUG"];
const MESSAGES: &[&str] = &[
    "request completed",
    "cache hit for key",
    "cache miss, fetching upstream",
    "retry scheduled after backoff",
    "connection pool exhausted, queueing",
    "flushed batch to storage",
    "token refreshed",
    "slow query detected",
];

// ── synthetic data ─────────────────────────────────────────────────────────

/// Deterministic LCG step.
fn next(rng: &mut u64) -> u64 {
    *rng = rng
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *rng >> 33
}

fn generate_logs(target: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(target + 256);
    let mut rng = 0x5EED_1DEAu64;
    let mut ts = 1_700_000_000_000u64;
    while out.len() < target {
        ts += next(&mut rng) % 900;
        let host = HOSTS[(next(&mut rng) as usize) % HOSTS.len()];
        let service = SERVICES[(next(&mut rng) as usize) % SERVICES.len()];
        let level = LEVELS[(next(&mut rng) as usize) % LEVELS.len()];
        let msg = MESSAGES[(next(&mut rng) as usize) % MESSAGES.len()];
        let latency = next(&mut rng) % 2_000;
        let line = format!("{ts} {host} {service} {level} {msg} latency_us={latency}\n");
        out.extend_from_slice(line.as_bytes());
    }
    out.truncate(target);
    out
}

// ── benchmark passes ───────────────────────────────────────────────────────

fn compress_sequential(pool: &WorkerPool, chunks: &[&[u8]]) -> Result<(Vec<Vec<u8>>, Duration)> {
    let t0 = Instant::now();
    let mut frames = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        frames.push(pool.compress(chunk, LEVEL).wait()?);
    }
    Ok((frames, t0.elapsed()))
}

fn compress_pooled(pool: &WorkerPool, chunks: &[&[u8]]) -> Result<(Vec<Vec<u8>>, Duration)> {
    let t0 = Instant::now();
    let handles: Vec<_> = chunks.iter().map(|c| pool.compress(c, LEVEL)).collect();
    let mut frames = Vec::with_capacity(handles.len());
    for handle in handles {
        frames.push(handle.wait()?);
    }
    Ok((frames, t0.elapsed()))
}

fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    bytes as f64 / elapsed.as_secs_f64() / (1024.0 * 1024.0)
}

// ── entry point ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    eprintln!("generating {} MB of synthetic logs...", TARGET_RAW_BYTES >> 20);
    let data = generate_logs(TARGET_RAW_BYTES);
    let chunks: Vec<&[u8]> = data.chunks(CHUNK_SIZE).collect();

    let pool = WorkerPool::with_default_size();
    eprintln!(
        "compressing {} chunks of {} MB on {} workers...",
        chunks.len(),
        CHUNK_SIZE >> 20,
        pool.threads()
    );

    let (seq_frames, seq_elapsed) = compress_sequential(&pool, &chunks)?;
    let (pooled_frames, pooled_elapsed) = compress_pooled(&pool, &chunks)?;

    let compressed: usize = pooled_frames.iter().map(Vec::len).sum();
    let speedup = seq_elapsed.as_secs_f64() / pooled_elapsed.as_secs_f64();

    println!();
    println!("=== Pooled Compression Demo ===");
    println!("  raw size    : {} MB", data.len() >> 20);
    println!("  compressed  : {:.2} MB", compressed as f64 / (1024.0 * 1024.0));
    println!("  ratio       : {:.2}x", data.len() as f64 / compressed as f64);
    println!(
        "  sequential  : {:.3}s ({:.0} MB/s)",
        seq_elapsed.as_secs_f64(),
        throughput(data.len(), seq_elapsed)
    );
    println!(
        "  pooled      : {:.3}s ({:.0} MB/s)",
        pooled_elapsed.as_secs_f64(),
        throughput(data.len(), pooled_elapsed)
    );
    println!("  speedup     : {:.2}x", speedup);

    // Both passes must agree, and the frames must decode back to the source.
    assert_eq!(seq_frames.len(), pooled_frames.len());
    let mut restored = Vec::with_capacity(data.len());
    for frame in &pooled_frames {
        restored.extend(pool.decompress(frame).wait()?);
    }
    assert_eq!(restored, data, "round-trip must be byte-exact");
    println!("  verified    : round-trip byte-exact");

    Ok(())
}
