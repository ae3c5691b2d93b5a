mod db;
mod document;
mod parser;
mod pipeline;
mod sink;

use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use parser::RoundCascade;
use pipeline::{IngestStats, Mode};

#[derive(Parser)]
#[command(
    name = "jarchive_parser",
    about = "Parse games from the J! Archive website",
    version
)]
struct Cli {
    /// Directory containing the game files
    #[arg(short, long, value_name = "FOLDER", default_value = "j-archive")]
    dir: PathBuf,

    /// Number of files to parse (default: all)
    #[arg(short = 'n', long = "number-of-files", value_name = "NUMBER")]
    number_of_files: Option<usize>,

    /// Filename for the SQLite database
    #[arg(short = 'f', long = "filename", value_name = "FILENAME", default_value = "clues.db")]
    database: PathBuf,

    /// Output the clues to stdout and not a database
    #[arg(long)]
    stdout: bool,

    /// Process the files in parallel
    #[arg(long)]
    multiprocess: bool,

    /// Keep extracting later rounds when an earlier round container is missing
    #[arg(long)]
    independent_rounds: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let jobs = document::discover(&cli.dir, cli.number_of_files)?;
    let mode = if cli.multiprocess {
        Mode::Concurrent
    } else {
        Mode::Sequential
    };
    let cascade = if cli.independent_rounds {
        RoundCascade::Independent
    } else {
        RoundCascade::AbortRemaining
    };
    eprintln!("Parsing {} files", jobs.len());

    if cli.stdout {
        let stdout = std::io::stdout();
        let mut out = sink::LineSink::new(BufWriter::new(stdout.lock()));
        let stats = pipeline::run(jobs, mode, cascade, &mut out)?;
        out.flush()?;
        print_stats(&stats);
    } else {
        let mut store = db::Store::open(&cli.database)?;
        let stats = pipeline::run(jobs, mode, cascade, &mut store)?;
        let counts = store.counts()?;
        store.finalize()?;
        print_stats(&stats);
        eprintln!(
            "Saved {} games, {} categories, {} clues to {}.",
            counts.games,
            counts.categories,
            counts.clues,
            cli.database.display()
        );
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }
    eprintln!("All done");
    Ok(())
}

fn print_stats(stats: &IngestStats) {
    eprintln!(
        "Parsed {} documents: {} clues, {} stopped early.",
        stats.documents, stats.records, stats.aborted,
    );
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
