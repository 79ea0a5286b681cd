//! Blame reporters
//!
//! Sinks that render emitted blame records as they stream out of the
//! driver: JSON lines for machine consumption, or a compact annotated text
//! form for terminals.

use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use lineage_engine::{BlameRecord, CommitInterner, Sink};

/// Render a full hash in the short form used for display.
fn short(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

/// One record per line, as JSON.
pub struct JsonLinesSink<'a, W: Write> {
    writer: W,
    interner: &'a CommitInterner,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    commit: &'a str,
    path: &'a str,
    binary: bool,
    lines: Vec<JsonLine<'a>>,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    commit: &'a str,
    content: Cow<'a, str>,
}

impl<'a, W: Write> JsonLinesSink<'a, W> {
    pub fn new(writer: W, interner: &'a CommitInterner) -> Self {
        Self { writer, interner }
    }
}

impl<W: Write> Sink for JsonLinesSink<'_, W> {
    fn emit(&mut self, record: BlameRecord) -> Result<()> {
        let rendered = JsonRecord {
            commit: self.interner.resolve(record.commit),
            path: &record.path,
            binary: record.blame.is_binary,
            lines: record
                .blame
                .lines
                .iter()
                .map(|line| JsonLine {
                    commit: self.interner.resolve(line.commit),
                    content: String::from_utf8_lossy(&line.content),
                })
                .collect(),
        };
        serde_json::to_writer(&mut self.writer, &rendered)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Annotated text, one block per record.
pub struct TextSink<'a, W: Write> {
    writer: W,
    interner: &'a CommitInterner,
}

impl<'a, W: Write> TextSink<'a, W> {
    pub fn new(writer: W, interner: &'a CommitInterner) -> Self {
        Self { writer, interner }
    }
}

impl<W: Write> Sink for TextSink<'_, W> {
    fn emit(&mut self, record: BlameRecord) -> Result<()> {
        let commit = self.interner.resolve(record.commit);
        if record.blame.is_binary {
            writeln!(self.writer, "{} {} (binary)", short(commit), record.path)?;
            return Ok(());
        }
        writeln!(
            self.writer,
            "{} {} ({} lines)",
            short(commit),
            record.path,
            record.blame.line_count()
        )?;
        for line in &record.blame.lines {
            writeln!(
                self.writer,
                "  {} {}",
                short(self.interner.resolve(line.commit)),
                String::from_utf8_lossy(&line.content)
            )?;
        }
        Ok(())
    }
}

/// Format-selected sink with a single concrete type for the driver.
pub enum ReportSink<'a, W: Write> {
    Json(JsonLinesSink<'a, W>),
    Text(TextSink<'a, W>),
}

impl<'a, W: Write> ReportSink<'a, W> {
    pub fn json(writer: W, interner: &'a CommitInterner) -> Self {
        Self::Json(JsonLinesSink::new(writer, interner))
    }

    pub fn text(writer: W, interner: &'a CommitInterner) -> Self {
        Self::Text(TextSink::new(writer, interner))
    }
}

impl<W: Write> Sink for ReportSink<'_, W> {
    fn emit(&mut self, record: BlameRecord) -> Result<()> {
        match self {
            Self::Json(sink) => sink.emit(record),
            Self::Text(sink) => sink.emit(record),
        }
    }
}
