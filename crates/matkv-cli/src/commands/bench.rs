//! bench command - pipelined key-value batch versus one file per array
//!
//! Stores `count` copies of a synthetic three-channel image under keys
//! `mat0..matN` through a single pipelined batch, blocks on one probe slot
//! and checks it against the source image. The same arrays are then written
//! to and read back from individual files for comparison.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, ensure, Context, Result};
use console::style;
use matkv_codec::{ArrayValue, ElementType, HEADER_LEN};
use matkv_store::{
    load_array, save_array, BatchDriver, KvClient, MemoryClient, ObjectStore, PendingSlots,
    RespClient, StoreConfig,
};
use serde::Serialize;
use tracing::info;

use crate::config::CliConfig;

/// Address that selects the in-process client
pub const MEMORY_BACKEND: &str = "memory";

/// Batch shape
#[derive(Debug, Clone)]
pub struct BenchOptions {
    pub count: usize,
    pub probe: usize,
    pub width: u32,
    pub height: u32,
    pub dir: Option<PathBuf>,
}

/// Timings for one run
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub backend: String,
    pub count: usize,
    pub width: u32,
    pub height: u32,
    /// Encoded size of one array, header included
    pub payload_bytes: usize,
    pub submit_ms: f64,
    pub store_ms: f64,
    pub store_verified: bool,
    pub file_ms: f64,
    pub file_reads: usize,
    pub file_verified: bool,
}

/// Execute the bench command
pub async fn execute(config: &CliConfig, opts: &BenchOptions, json: bool) -> Result<()> {
    let report = run(config, opts).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} x {}x{} u8x3 ({} bytes encoded each) via {}",
        style("[INFO]").cyan(),
        report.count,
        report.width,
        report.height,
        report.payload_bytes,
        style(&report.backend).green()
    );
    println!(
        "  Key-value:  {:>10.2} ms (submit {:.2} ms) {}",
        report.store_ms,
        report.submit_ms,
        verdict(report.store_verified)
    );
    println!(
        "  Files:      {:>10.2} ms {}",
        report.file_ms,
        verdict(report.file_verified)
    );
    if !(report.store_verified && report.file_verified) {
        bail!("probe slot {} did not match the source image", opts.probe);
    }
    Ok(())
}

fn verdict(ok: bool) -> console::StyledObject<&'static str> {
    if ok {
        style("[OK]").green()
    } else {
        style("[MISMATCH]").red()
    }
}

/// Run both halves of the benchmark against the configured backend
pub async fn run(config: &CliConfig, opts: &BenchOptions) -> Result<BenchReport> {
    ensure!(opts.count > 0, "--count must be at least 1");
    ensure!(
        opts.probe < opts.count,
        "--probe {} is outside a batch of {}",
        opts.probe,
        opts.count
    );

    let image = synthetic_image(opts.width, opts.height)?;
    let items: Vec<(String, ArrayValue)> = (0..opts.count)
        .map(|i| (format!("mat{i}"), image.clone()))
        .collect();

    let (backend, store_time, submit_time, store_verified) =
        if config.client.addr == MEMORY_BACKEND {
            let client = Arc::new(MemoryClient::new());
            let (total, submit, ok) =
                run_store(client, config.store.clone(), &items, opts.probe).await?;
            (MEMORY_BACKEND.to_string(), total, submit, ok)
        } else {
            let client = RespClient::connect(&config.client)
                .await
                .with_context(|| format!("Failed to connect to {}", config.client.addr))?;
            let (total, submit, ok) =
                run_store(Arc::new(client), config.store.clone(), &items, opts.probe).await?;
            (config.client.addr.clone(), total, submit, ok)
        };

    let files = match &opts.dir {
        Some(dir) => {
            tokio::fs::create_dir_all(dir).await?;
            run_files(dir, &items, opts.probe).await?
        }
        None => {
            let dir = tempfile::tempdir()?;
            run_files(dir.path(), &items, opts.probe).await?
        }
    };

    Ok(BenchReport {
        backend,
        count: opts.count,
        width: opts.width,
        height: opts.height,
        payload_bytes: HEADER_LEN + image.len_bytes(),
        submit_ms: millis(submit_time),
        store_ms: millis(store_time),
        store_verified,
        file_ms: millis(files.elapsed),
        file_reads: files.reads,
        file_verified: files.verified,
    })
}

async fn run_store<C: KvClient>(
    client: Arc<C>,
    config: StoreConfig,
    items: &[(String, ArrayValue)],
    probe: usize,
) -> Result<(Duration, Duration, bool)> {
    let store = ObjectStore::new(client, config);
    let driver = BatchDriver::new(&store);
    let mut slots = PendingSlots::with_capacity(items.len());

    let start = Instant::now();
    let submission = driver.run_batch(items, &mut slots)?;
    let submit_time = submission.elapsed();
    let verified = driver.verify(&mut slots, probe, &items[probe].1).await?;
    submission.confirm().await?;
    let total = start.elapsed();

    info!(items = items.len(), ?total, verified, "key-value batch done");
    Ok((total, submit_time, verified))
}

struct FileRun {
    elapsed: Duration,
    reads: usize,
    verified: bool,
}

/// Write then read back every array, one file each
async fn run_files(dir: &Path, items: &[(String, ArrayValue)], probe: usize) -> Result<FileRun> {
    let start = Instant::now();
    let mut reads = 0;
    let mut verified = false;
    for (index, (key, value)) in items.iter().enumerate() {
        let path = dir.join(format!("{key}.mat"));
        save_array(&path, value).await?;
        let loaded = load_array(&path).await?;
        reads += 1;
        if index == probe {
            verified = loaded == *value;
        }
    }
    let elapsed = start.elapsed();

    info!(items = items.len(), ?elapsed, verified, dir = %dir.display(), "file baseline done");
    Ok(FileRun {
        elapsed,
        reads,
        verified,
    })
}

/// Deterministic three-channel gradient
pub fn synthetic_image(width: u32, height: u32) -> Result<ArrayValue> {
    let element = ElementType::U8C3;
    let len = ArrayValue::expected_len(width, height, element)
        .context("image dimensions overflow")?;
    let row = width as usize * 3;
    let data = (0..len)
        .map(|i| {
            let (y, rest) = (i / row.max(1), i % row.max(1));
            let (x, c) = (rest / 3, rest % 3);
            (x * (c + 1) + y * 2) as u8
        })
        .collect();
    Ok(ArrayValue::new(width, height, element, data)?)
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> CliConfig {
        let mut config = CliConfig::default();
        config.client.addr = MEMORY_BACKEND.to_string();
        config
    }

    fn opts(dir: &Path) -> BenchOptions {
        BenchOptions {
            count: 6,
            probe: 4,
            width: 17,
            height: 9,
            dir: Some(dir.to_path_buf()),
        }
    }

    #[test]
    fn test_synthetic_image_shape() {
        let image = synthetic_image(850, 600).unwrap();
        assert_eq!(image.element, ElementType::U8C3);
        assert_eq!(image.len_bytes(), 850 * 600 * 3);
        assert_ne!(image.data[3], image.data[0]);
        assert_eq!(synthetic_image(850, 600).unwrap(), image);
    }

    #[tokio::test]
    async fn test_memory_bench_verifies_probe() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&memory_config(), &opts(dir.path())).await.unwrap();

        assert_eq!(report.backend, "memory");
        assert_eq!(report.count, 6);
        assert_eq!(report.payload_bytes, HEADER_LEN + 17 * 9 * 3);
        assert!(report.store_verified);
        assert!(report.file_verified);
        assert_eq!(report.file_reads, 6);
        assert!(dir.path().join("mat5.mat").exists());
    }

    #[tokio::test]
    async fn test_probe_outside_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = opts(dir.path());
        opts.probe = 6;

        let err = run(&memory_config(), &opts).await.unwrap_err();
        assert!(err.to_string().contains("outside a batch"));
    }

    #[tokio::test]
    async fn test_empty_image_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = opts(dir.path());
        opts.width = 0;

        let report = run(&memory_config(), &opts).await.unwrap();
        assert_eq!(report.payload_bytes, HEADER_LEN);
        assert!(report.store_verified);
    }

    #[test]
    fn test_report_json_fields() {
        let report = BenchReport {
            backend: "memory".into(),
            count: 1,
            width: 2,
            height: 2,
            payload_bytes: 12,
            submit_ms: 0.5,
            store_ms: 1.0,
            store_verified: true,
            file_ms: 2.0,
            file_reads: 1,
            file_verified: true,
        };
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["backend"], "memory");
        assert_eq!(json["store_verified"], true);
        assert_eq!(json["file_ms"], 2.0);
    }
}
