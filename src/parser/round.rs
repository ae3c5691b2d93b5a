use std::sync::LazyLock;

use anyhow::Result;
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use super::answer;
use super::error::Skip;
use super::position::{PositionTracker, BOARD_WIDTH};
use super::text_of;
use crate::db::{ClueRecord, Game, Round};
use crate::sink::ClueSink;

pub(super) static CATEGORY_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[class="category_name"]"#).unwrap());
static CLUE_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(r#"td[class="clue"]"#).unwrap());
static CLUE_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[class*="clue_value"]"#).unwrap());
pub(super) static CLUE_TEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(r#"td[class="clue_text"]"#).unwrap());

const DAILY_DOUBLE_PREFIX: &str = "DD:";

#[derive(Debug)]
pub struct RoundSummary {
    pub cells: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub tracker: PositionTracker,
}

/// A revealed cell with everything but its board position.
struct CellContent {
    text: String,
    answer: String,
    daily_double: bool,
}

/// Emit every revealed clue of a regular round, in document order.
///
/// Categories are listed once above the board, so each cell's category is
/// inferred from its position. Every cell advances the position, including
/// unrevealed ones and ones that fail to parse.
pub fn extract_round<S: ClueSink + ?Sized>(
    container: ElementRef,
    round: Round,
    increment: u32,
    game: &Game,
    sink: &mut S,
) -> Result<RoundSummary> {
    let categories: Vec<String> = container.select(&CATEGORY_NAME).map(text_of).collect();
    if categories.len() != BOARD_WIDTH {
        debug!(
            "game {} {}: {} categories listed",
            game.id,
            round,
            categories.len()
        );
    }

    let mut tracker = PositionTracker::new(increment);
    let mut cells = 0;
    let mut emitted = 0;
    let mut skipped = 0;

    for cell in container.select(&CLUE_CELL) {
        cells += 1;
        match clue_at(cell, &categories, &tracker, round, game) {
            Ok(Some(record)) => {
                sink.put(record)?;
                emitted += 1;
            }
            Ok(None) => {}
            Err(skip) => {
                skipped += 1;
                warn!("game {} {}: {}: {}", game.id, round, skip, cell.html());
            }
        }
        tracker.advance();
    }
    debug!(
        "game {} {}: {} cells, {} clues, {} skipped, ended at column {}",
        game.id,
        round,
        cells,
        emitted,
        skipped,
        tracker.category_index()
    );

    Ok(RoundSummary {
        cells,
        emitted,
        skipped,
        tracker,
    })
}

/// `Ok(None)` for an unrevealed cell.
fn clue_at(
    cell: ElementRef,
    categories: &[String],
    tracker: &PositionTracker,
    round: Round,
    game: &Game,
) -> Result<Option<ClueRecord>, Skip> {
    let Some(content) = read_cell(cell)? else {
        return Ok(None);
    };
    let index = tracker.category_index();
    let category = categories.get(index).ok_or(Skip::NoCategory(index))?;
    Ok(Some(ClueRecord {
        game_id: game.id,
        airdate: game.airdate.clone(),
        round,
        category: category.clone(),
        value: tracker.value(),
        text: content.text,
        answer: content.answer,
        daily_double: content.daily_double,
    }))
}

fn read_cell(cell: ElementRef) -> Result<Option<CellContent>, Skip> {
    if cell.text().all(|t| t.trim().is_empty()) {
        return Ok(None);
    }
    let value = cell.select(&CLUE_VALUE).next().ok_or(Skip::NoValue)?;
    let daily_double = is_daily_double(&text_of(value));
    let text = cell.select(&CLUE_TEXT).next().ok_or(Skip::NoText)?;
    let answer = answer::resolve(cell)?;
    Ok(Some(CellContent {
        text: text_of(text),
        answer,
        daily_double,
    }))
}

/// Only the flag survives; the wagered amount after the prefix is dropped.
pub fn is_daily_double(value_text: &str) -> bool {
    value_text.trim().starts_with(DAILY_DOUBLE_PREFIX)
}
