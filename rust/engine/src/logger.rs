use serde::{Deserialize, Serialize};

use crate::config::RuleConfig;
use crate::seat::{Seat, SeatKind};
use crate::session::Action;

/// Records a single accepted action during a hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: Seat,
    /// Turn the action was taken in
    pub turn_id: u64,
    pub action: Action,
}

/// How a dealt hand ended.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    /// `None` for a stalled hand
    pub winner: Option<Seat>,
    #[serde(default)]
    pub eliminated: Vec<Seat>,
    /// The hand was abandoned by a restart vote
    #[serde(default)]
    pub restarted: bool,
    pub turns: u64,
}

/// Complete record of one deal: enough to replay it action by action.
/// Serialized to JSONL for hand history storage.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Unique identifier for this hand (format: YYYYMMDD-NNNNNN)
    #[serde(default)]
    pub hand_id: String,
    /// RNG seed used for the shuffle
    pub seed: u64,
    pub hand_number: u32,
    pub dealer: Seat,
    pub seats: [SeatKind; 4],
    #[serde(default)]
    pub rules: RuleConfig,
    /// Chronological list of accepted actions
    pub actions: Vec<ActionRecord>,
    pub result: Option<HandResult>,
    /// Timestamp when the hand was written (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Additional metadata (extensible JSON object)
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends hand records to a JSONL file, assigning ids and timestamps to
/// records that lack them.
pub struct HandLogger {
    writer: Option<BufWriter<Box<dyn Write + Send>>>,
    date: String,
    seq: u32,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self::from_writer(Box::new(f)))
    }

    /// Logs to an arbitrary sink, e.g. a compressing encoder.
    pub fn from_writer(w: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Some(BufWriter::new(w)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        }
    }

    pub fn with_seq_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    /// Assigns ids and timestamps without owning a sink, for callers that
    /// write the lines themselves.
    pub fn detached() -> Self {
        Self {
            writer: None,
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    /// The JSONL line for `record`, with a missing id or timestamp filled in.
    pub fn encode(&mut self, record: &HandRecord) -> std::io::Result<String> {
        let mut rec = record.clone();
        if rec.hand_id.is_empty() {
            rec.hand_id = self.next_id();
        }
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        serde_json::to_string(&rec).map_err(std::io::Error::other)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let line = self.encode(record)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }

    /// Flushes and hands back the underlying sink so encoders can finish.
    pub fn into_inner(self) -> std::io::Result<Option<Box<dyn Write + Send>>> {
        match self.writer {
            Some(w) => w.into_inner().map(Some).map_err(|e| e.into_error()),
            None => Ok(None),
        }
    }
}
