use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::sink::ClueSink;

// ── Records ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Round {
    Jeopardy = 1,
    DoubleJeopardy = 2,
    Final = 3,
}

impl Round {
    pub fn number(self) -> i64 {
        self as i64
    }

    #[cfg(test)]
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Round::Jeopardy),
            2 => Some(Round::DoubleJeopardy),
            3 => Some(Round::Final),
            _ => None,
        }
    }

    /// Base value of the first row of the board. The final round has none.
    pub fn increment(self) -> u32 {
        match self {
            Round::Jeopardy => 200,
            Round::DoubleJeopardy => 400,
            Round::Final => 0,
        }
    }

    /// `id` of the `<div>` holding this round in an archive page.
    pub fn container_id(self) -> &'static str {
        match self {
            Round::Jeopardy => "jeopardy_round",
            Round::DoubleJeopardy => "double_jeopardy_round",
            Round::Final => "final_jeopardy_round",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Round::Jeopardy => "jeopardy",
            Round::DoubleJeopardy => "double jeopardy",
            Round::Final => "final jeopardy",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: i64,
    pub airdate: String,
}

/// One extracted clue, carrying everything needed to persist its game,
/// category and classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueRecord {
    pub game_id: i64,
    pub airdate: String,
    pub round: Round,
    pub category: String,
    pub value: u32,
    pub text: String,
    pub answer: String,
    pub daily_double: bool,
}

// ── Store ──

pub struct Store {
    conn: Connection,
}

pub struct StoreCounts {
    pub games: usize,
    pub categories: usize,
    pub clues: usize,
}

impl Store {
    /// Open (or create) the database and start the run-wide transaction.
    pub fn open(path: &Path) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        conn.execute_batch("BEGIN TRANSACTION;")?;
        Ok(Store { conn })
    }

    pub fn upsert_game(&self, game_id: i64, airdate: &str) -> Result<()> {
        self.conn
            .prepare_cached("INSERT OR IGNORE INTO airdates (game, airdate) VALUES (?1, ?2)")?
            .execute(params![game_id, airdate])?;
        Ok(())
    }

    pub fn resolve_or_create_category(&self, name: &str) -> Result<i64> {
        self.conn
            .prepare_cached("INSERT OR IGNORE INTO categories (category) VALUES (?1)")?
            .execute(params![name])?;
        let id = self
            .conn
            .prepare_cached("SELECT id FROM categories WHERE category = ?1")?
            .query_row(params![name], |row| row.get(0))
            .with_context(|| format!("Category {:?} missing after insert", name))?;
        Ok(id)
    }

    /// Write the clue text to `documents` and its metadata to `clues`
    /// under the same id.
    pub fn insert_clue(
        &self,
        game_id: i64,
        round: Round,
        value: u32,
        daily_double: bool,
        text: &str,
        answer: &str,
    ) -> Result<i64> {
        self.conn
            .prepare_cached("INSERT INTO documents (clue, answer) VALUES (?1, ?2)")?
            .execute(params![text, answer])?;
        let clue_id = self.conn.last_insert_rowid();
        self.conn
            .prepare_cached(
                "INSERT INTO clues (id, game, round, value, daily_double)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![clue_id, game_id, round.number(), value, daily_double])?;
        Ok(clue_id)
    }

    pub fn link(&self, clue_id: i64, category_id: i64) -> Result<()> {
        self.conn
            .prepare_cached("INSERT INTO classifications (clue_id, category_id) VALUES (?1, ?2)")?
            .execute(params![clue_id, category_id])?;
        Ok(())
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<usize> {
            let n = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(n)
        };
        Ok(StoreCounts {
            games: count("airdates")?,
            categories: count("categories")?,
            clues: count("clues")?,
        })
    }

    /// Build the lookup indices and commit everything written this run.
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE INDEX IF NOT EXISTS index_clues_game_round ON clues(game, round);
            CREATE INDEX IF NOT EXISTS index_classifications ON classifications(clue_id, category_id);
            COMMIT;
            ",
        )?;
        Ok(())
    }

    /// Every stored clue joined back to its game and category, ordered by id.
    #[cfg(test)]
    pub fn fetch_clues(&self) -> Result<Vec<ClueRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.game, a.airdate, c.round, cat.category, c.value, d.clue, d.answer, c.daily_double
             FROM clues c
             JOIN documents d ON d.id = c.id
             JOIN airdates a ON a.game = c.game
             JOIN classifications cl ON cl.clue_id = c.id
             JOIN categories cat ON cat.id = cl.category_id
             ORDER BY c.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let round: i64 = row.get(2)?;
                Ok(ClueRecord {
                    game_id: row.get(0)?,
                    airdate: row.get(1)?,
                    round: Round::from_number(round).unwrap_or(Round::Final),
                    category: row.get(3)?,
                    value: row.get(4)?,
                    text: row.get(5)?,
                    answer: row.get(6)?,
                    daily_double: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl ClueSink for Store {
    fn put(&mut self, record: ClueRecord) -> Result<()> {
        self.upsert_game(record.game_id, &record.airdate)?;
        let category_id = self.resolve_or_create_category(&record.category)?;
        let clue_id = self.insert_clue(
            record.game_id,
            record.round,
            record.value,
            record.daily_double,
            &record.text,
            &record.answer,
        )?;
        self.link(clue_id, category_id)
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS airdates (
            game    INTEGER PRIMARY KEY,
            airdate TEXT
        );

        CREATE TABLE IF NOT EXISTS documents (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            clue   TEXT,
            answer TEXT
        );

        CREATE TABLE IF NOT EXISTS categories (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT UNIQUE
        );

        CREATE TABLE IF NOT EXISTS clues (
            id           INTEGER PRIMARY KEY REFERENCES documents(id),
            game         INTEGER REFERENCES airdates(game),
            round        INTEGER,
            value        INTEGER,
            daily_double INTEGER
        );

        CREATE TABLE IF NOT EXISTS classifications (
            clue_id     INTEGER REFERENCES clues(id),
            category_id INTEGER REFERENCES categories(id)
        );
        ",
    )?;
    Ok(())
}

// ── Tests ──
