use std::io::Write;

use anyhow::{Context, Result};
use crossbeam_channel::Sender;

use crate::db::ClueRecord;

/// Destination for extracted clues. Only ever driven from one thread.
pub trait ClueSink {
    fn put(&mut self, record: ClueRecord) -> Result<()>;
}

impl ClueSink for Vec<ClueRecord> {
    fn put(&mut self, record: ClueRecord) -> Result<()> {
        self.push(record);
        Ok(())
    }
}

/// Dry-run output: one `[game, airdate, round, category, value, text, answer, daily_double]`
/// JSON array per line.
pub struct LineSink<W: Write> {
    out: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W) -> Self {
        LineSink { out }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("Failed to flush clue output")
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ClueSink for LineSink<W> {
    fn put(&mut self, record: ClueRecord) -> Result<()> {
        let line = serde_json::to_string(&(
            record.game_id,
            &record.airdate,
            record.round.number(),
            &record.category,
            record.value,
            &record.text,
            &record.answer,
            u8::from(record.daily_double),
        ))?;
        writeln!(self.out, "{}", line).context("Failed to write clue line")?;
        Ok(())
    }
}

/// Worker-side handle onto the shared record queue.
pub struct ChannelSink {
    tx: Sender<ClueRecord>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ClueRecord>) -> Self {
        ChannelSink { tx }
    }
}

impl ClueSink for ChannelSink {
    fn put(&mut self, record: ClueRecord) -> Result<()> {
        self.tx
            .send(record)
            .map_err(|_| anyhow::anyhow!("Record queue closed"))
    }
}
