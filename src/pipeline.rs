use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, RecvTimeoutError};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::db::ClueRecord;
use crate::document::{self, DocumentJob};
use crate::parser::{extract_game, GameReport, RoundCascade};
use crate::sink::{ChannelSink, ClueSink};

const RECV_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sequential,
    Concurrent,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub documents: usize,
    pub records: usize,
    /// Documents that could not be read or stopped before their last round.
    pub aborted: usize,
}

pub fn run<S: ClueSink + ?Sized>(
    jobs: Vec<DocumentJob>,
    mode: Mode,
    cascade: RoundCascade,
    sink: &mut S,
) -> Result<IngestStats> {
    match mode {
        Mode::Sequential => run_sequential(&jobs, cascade, sink),
        Mode::Concurrent => run_concurrent(jobs, cascade, sink),
    }
}

/// Parse and store one document at a time on the calling thread.
pub fn run_sequential<S: ClueSink + ?Sized>(
    jobs: &[DocumentJob],
    cascade: RoundCascade,
    sink: &mut S,
) -> Result<IngestStats> {
    let pb = progress_bar(jobs.len())?;
    let mut stats = IngestStats::default();

    for job in jobs {
        let report = process_document(job, cascade, sink)?;
        stats.documents += 1;
        match report {
            Some(r) => {
                stats.records += r.emitted;
                if r.aborted.is_some() {
                    stats.aborted += 1;
                }
            }
            None => stats.aborted += 1,
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(stats)
}

/// Parse documents on a worker pool while this thread alone writes to `sink`.
///
/// Workers push records onto a shared queue and count down `remaining`
/// once per finished document. The consumer stops when `remaining` is zero
/// and the queue is empty, then drains whatever is left.
pub fn run_concurrent<S: ClueSink + ?Sized>(
    jobs: Vec<DocumentJob>,
    cascade: RoundCascade,
    sink: &mut S,
) -> Result<IngestStats> {
    let total = jobs.len();
    let workers = worker_count();
    info!("Parsing {} files on {} workers", total, workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("parser-{}", i))
        .build()
        .context("Failed to build worker pool")?;

    let (tx, rx) = unbounded::<ClueRecord>();
    let remaining = Arc::new(AtomicUsize::new(total));
    let aborted = Arc::new(AtomicUsize::new(0));

    for job in jobs {
        let mut worker_sink = ChannelSink::new(tx.clone());
        let remaining = Arc::clone(&remaining);
        let aborted = Arc::clone(&aborted);
        pool.spawn(move || {
            match process_document(&job, cascade, &mut worker_sink) {
                Ok(Some(report)) if report.aborted.is_none() => {}
                Ok(_) => {
                    aborted.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => warn!("game {}: {:#}", job.game_id, e),
            }
            remaining.fetch_sub(1, Ordering::Release);
        });
    }
    // Workers hold the only senders from here on.
    drop(tx);

    let pb = progress_bar(total)?;
    let mut records = 0;

    loop {
        let left = remaining.load(Ordering::Acquire);
        pb.set_position((total - left) as u64);
        if left == 0 && rx.is_empty() {
            break;
        }
        match rx.recv_timeout(RECV_TIMEOUT) {
            Ok(record) => {
                sink.put(record)?;
                records += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Records that landed between the last check and the counter hitting zero.
    for record in rx.try_iter() {
        sink.put(record)?;
        records += 1;
    }

    pb.finish_and_clear();
    Ok(IngestStats {
        documents: total,
        records,
        aborted: aborted.load(Ordering::Relaxed),
    })
}

/// `None` when the file could not be read.
fn process_document<S: ClueSink + ?Sized>(
    job: &DocumentJob,
    cascade: RoundCascade,
    sink: &mut S,
) -> Result<Option<GameReport>> {
    let text = match document::read(&job.path) {
        Ok(text) => text,
        Err(e) => {
            warn!("game {}: {:#}. skipping.", job.game_id, e);
            return Ok(None);
        }
    };
    let report = extract_game(&text, job.game_id, cascade, sink)?;
    debug!(
        "game {} ({}): {} clues, {} cells skipped, missing rounds {:?}",
        job.game_id,
        report.airdate.as_deref().unwrap_or("no airdate"),
        report.emitted,
        report.skipped_cells,
        report.missing_rounds
    );
    Ok(Some(report))
}

/// Leave one core for the consumer.
fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
