use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use encoding_rs::WINDOWS_1252;
use regex::Regex;
use tracing::{info, warn};

static GAME_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\.[^.]+$").unwrap());

const EXTENSION: &str = "html";

/// One archive page to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentJob {
    pub path: PathBuf,
    pub game_id: i64,
}

/// List the `*.html` pages in `dir`, sorted by path, keeping at most `limit`.
pub fn discover(dir: &Path, limit: Option<usize>) -> Result<Vec<DocumentJob>> {
    if !dir.is_dir() {
        bail!("The specified folder is not a directory: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == EXTENSION))
        .collect();
    paths.sort();
    info!("Found {} {} files in {}", paths.len(), EXTENSION, dir.display());

    let jobs: Vec<DocumentJob> = paths
        .into_iter()
        .filter_map(|path| match game_id_from_path(&path) {
            Some(game_id) => Some(DocumentJob { path, game_id }),
            None => {
                warn!("No game id in {}, skipping", path.display());
                None
            }
        })
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    Ok(jobs)
}

/// The run of digits right before the extension: `1234.html` → 1234.
pub fn game_id_from_path(path: &Path) -> Option<i64> {
    let name = path.file_name()?.to_str()?;
    GAME_ID_RE.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Archive pages are Windows-1252 regardless of what they declare.
pub fn decode(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

pub fn read(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(decode(&bytes))
}
