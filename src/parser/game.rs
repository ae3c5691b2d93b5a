use std::sync::LazyLock;

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::answer;
use super::error::Abort;
use super::round::{self, CATEGORY_NAME, CLUE_TEXT};
use super::text_of;
use crate::db::{ClueRecord, Game, Round};
use crate::sink::ClueSink;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("head > title").unwrap());
static CONTAINERS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [Round::Jeopardy, Round::DoubleJeopardy, Round::Final]
        .map(|r| Selector::parse(&format!("div#{}", r.container_id())).unwrap())
});

const REGULAR_ROUNDS: [Round; 2] = [Round::Jeopardy, Round::DoubleJeopardy];

/// What happens to the rest of a document when a round container is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundCascade {
    /// Stop extracting the document. A page without a double jeopardy
    /// round yields no final jeopardy clue, even a well-formed one.
    #[default]
    AbortRemaining,
    /// Skip only the missing round.
    Independent,
}

#[derive(Debug, Default)]
pub struct GameReport {
    pub airdate: Option<String>,
    pub emitted: usize,
    pub skipped_cells: usize,
    /// Rounds passed over under `RoundCascade::Independent`.
    pub missing_rounds: Vec<Round>,
    /// Where extraction stopped early, if it did.
    pub aborted: Option<Abort>,
}

impl GameReport {
    fn stop(mut self, game_id: i64, abort: Abort) -> Self {
        warn!("game {}: {}. skipping.", game_id, abort);
        self.aborted = Some(abort);
        self
    }
}

/// Extract every clue of one archive page into `sink`, round by round.
///
/// Records reach the sink as soon as they are read, so clues from earlier
/// rounds are kept when a later round is missing or broken. Only sink
/// failures are returned as errors.
pub fn extract_game<S: ClueSink + ?Sized>(
    document: &str,
    game_id: i64,
    cascade: RoundCascade,
    sink: &mut S,
) -> Result<GameReport> {
    debug!("Parsing game: {}", game_id);
    let html = Html::parse_document(document);
    let report = GameReport::default();

    let game = match read_game(&html, game_id) {
        Ok(game) => game,
        Err(abort) => return Ok(report.stop(game_id, abort)),
    };
    let mut report = GameReport {
        airdate: Some(game.airdate.clone()),
        ..report
    };

    for round in REGULAR_ROUNDS {
        let Some(container) = find_container(&html, round) else {
            match cascade {
                RoundCascade::AbortRemaining => {
                    return Ok(report.stop(game_id, Abort::MissingRound(round)))
                }
                RoundCascade::Independent => {
                    warn!("game {}: no {} round", game_id, round);
                    report.missing_rounds.push(round);
                    continue;
                }
            }
        };
        let summary = round::extract_round(container, round, round.increment(), &game, sink)?;
        report.emitted += summary.emitted;
        report.skipped_cells += summary.skipped;
    }

    let Some(container) = find_container(&html, Round::Final) else {
        return Ok(match cascade {
            RoundCascade::AbortRemaining => report.stop(game_id, Abort::MissingRound(Round::Final)),
            RoundCascade::Independent => {
                warn!("game {}: no {} round", game_id, Round::Final);
                report.missing_rounds.push(Round::Final);
                report
            }
        });
    };
    match final_clue(container, &game) {
        Ok(record) => {
            sink.put(record)?;
            report.emitted += 1;
            Ok(report)
        }
        Err(abort) => Ok(report.stop(game_id, abort)),
    }
}

/// The airdate is the last word of a title like
/// `J! Archive - Show #4529, aired 2004-09-16`. It is not validated.
fn read_game(html: &Html, game_id: i64) -> Result<Game, Abort> {
    let title = html.select(&TITLE).next().ok_or(Abort::NoTitle)?;
    let text = text_of(title);
    let airdate = text.split_whitespace().last().ok_or(Abort::NoAirdate)?;
    Ok(Game {
        id: game_id,
        airdate: airdate.to_string(),
    })
}

fn find_container(html: &Html, round: Round) -> Option<ElementRef<'_>> {
    let index = match round {
        Round::Jeopardy => 0,
        Round::DoubleJeopardy => 1,
        Round::Final => 2,
    };
    html.select(&CONTAINERS[index]).next()
}

fn final_clue(container: ElementRef, game: &Game) -> Result<ClueRecord, Abort> {
    let category = container
        .select(&CATEGORY_NAME)
        .next()
        .ok_or(Abort::NoFinalCategory)?;
    let text = container.select(&CLUE_TEXT).next().ok_or(Abort::NoFinalText)?;
    let answer = answer::resolve(container).map_err(Abort::NoFinalAnswer)?;
    Ok(ClueRecord {
        game_id: game.id,
        airdate: game.airdate.clone(),
        round: Round::Final,
        category: text_of(category),
        value: 0,
        text: text_of(text),
        answer,
        daily_double: false,
    })
}
