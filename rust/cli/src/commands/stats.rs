//! Statistics aggregation over JSONL hand histories.
//!
//! Accepts one file or a directory searched recursively for `.jsonl` and
//! `.jsonl.zst` files, and prints a JSON summary: outcomes, wins and
//! eliminations per seat, hand lengths and the recorded time span.

use crate::error::CliError;
use crate::io_utils::read_text_auto;
use crate::ui;
use chrono::{DateTime, FixedOffset};
use kalooki_engine::logger::HandRecord;
use kalooki_engine::seat::Seat;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Default)]
struct StatsState {
    hands: u64,
    won: u64,
    stalled: u64,
    unfinished: u64,
    restarted: u64,
    wins: [u64; 4],
    eliminations: [u64; 4],
    finished_turns: u64,
    actions: u64,
    first_ts: Option<DateTime<FixedOffset>>,
    last_ts: Option<DateTime<FixedOffset>>,
    bad_ts: u64,
    skipped: u64,
    corrupted: u64,
}

impl StatsState {
    fn add(&mut self, rec: &HandRecord) {
        self.hands += 1;
        self.actions += rec.actions.len() as u64;
        match &rec.result {
            Some(r) if r.restarted => self.restarted += 1,
            Some(r) => {
                self.finished_turns += r.turns;
                match r.winner {
                    Some(w) => {
                        self.won += 1;
                        self.wins[w.index()] += 1;
                    }
                    None => self.stalled += 1,
                }
                for s in &r.eliminated {
                    self.eliminations[s.index()] += 1;
                }
            }
            None => self.unfinished += 1,
        }
        if let Some(ts) = rec.ts.as_deref() {
            match DateTime::parse_from_rfc3339(ts) {
                Ok(t) => {
                    self.first_ts = Some(self.first_ts.map_or(t, |f| f.min(t)));
                    self.last_ts = Some(self.last_ts.map_or(t, |l| l.max(t)));
                }
                Err(_) => self.bad_ts += 1,
            }
        }
    }

    fn consume(&mut self, content: &str) {
        let has_trailing_nl = content.ends_with('\n');
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        for (i, line) in lines.iter().enumerate() {
            match serde_json::from_str::<HandRecord>(line) {
                Ok(rec) => self.add(&rec),
                // A torn last line is what an interrupted writer leaves behind.
                Err(_) if i == lines.len() - 1 && !has_trailing_nl => self.skipped += 1,
                Err(_) => self.corrupted += 1,
            }
        }
    }

    fn summary(&self) -> serde_json::Value {
        let per_seat = |counts: &[u64; 4]| {
            let mut m = serde_json::Map::new();
            for seat in Seat::ALL {
                m.insert(seat.as_str().to_string(), counts[seat.index()].into());
            }
            serde_json::Value::Object(m)
        };
        let finished = self.won + self.stalled;
        let avg_turns = if finished > 0 {
            (self.finished_turns as f64 / finished as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };
        serde_json::json!({
            "hands": self.hands,
            "won": self.won,
            "stalled": self.stalled,
            "unfinished": self.unfinished,
            "restarted": self.restarted,
            "wins": per_seat(&self.wins),
            "eliminations": per_seat(&self.eliminations),
            "avg_turns": avg_turns,
            "actions": self.actions,
            "first_ts": self.first_ts.map(|t| t.to_rfc3339()),
            "last_ts": self.last_ts.map(|t| t.to_rfc3339()),
        })
    }
}

/// # Errors
///
/// `Config` when a single input file cannot be read, `InvalidInput` when a
/// single file holds no readable record at all.
pub fn handle_stats_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let path = Path::new(&input);
    let mut state = StatsState::default();

    if path.is_dir() {
        let mut stack = vec![path.to_path_buf()];
        while let Some(d) = stack.pop() {
            let Ok(rd) = std::fs::read_dir(&d) else {
                continue;
            };
            for e in rd.filter_map(Result::ok) {
                let p = e.path();
                if p.is_dir() {
                    stack.push(p);
                } else if let Some(fname) = p.file_name().and_then(|f| f.to_str())
                    && (fname.ends_with(".jsonl") || fname.ends_with(".jsonl.zst"))
                {
                    match read_text_auto(&p.to_string_lossy()) {
                        Ok(content) => state.consume(&content),
                        Err(_) => state.corrupted += 1,
                    }
                }
            }
        }
    } else {
        match read_text_auto(&input) {
            Ok(s) => state.consume(&s),
            Err(e) => {
                ui::write_error(err, &format!("Failed to read {}: {}", input, e))?;
                return Err(CliError::Config(format!("Failed to read {}: {}", input, e)));
            }
        }
    }

    if state.corrupted > 0 {
        ui::write_error(
            err,
            &format!("Skipped {} corrupted record(s)", state.corrupted),
        )?;
    }
    if state.skipped > 0 {
        ui::write_error(
            err,
            &format!("Discarded {} incomplete final line(s)", state.skipped),
        )?;
    }
    if state.bad_ts > 0 {
        ui::display_warning(
            err,
            &format!("{} record(s) have an unreadable timestamp", state.bad_ts),
        )?;
    }
    if !path.is_dir() && state.hands == 0 && (state.corrupted > 0 || state.skipped > 0) {
        ui::write_error(err, "Invalid record")?;
        return Err(CliError::InvalidInput("Invalid record".to_string()));
    }

    let json_output = serde_json::to_string_pretty(&state.summary())
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize stats: {}", e)))?;
    writeln!(out, "{}", json_output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalooki_engine::config::RuleConfig;
    use kalooki_engine::logger::HandResult;
    use kalooki_engine::seat::SeatKind;

    fn record(id: u32, result: Option<HandResult>, ts: &str) -> String {
        let rec = HandRecord {
            hand_id: format!("20260101-{:06}", id),
            seed: id as u64,
            hand_number: 1,
            dealer: Seat::Bottom,
            seats: [SeatKind::Human; 4],
            rules: RuleConfig::default(),
            actions: Vec::new(),
            result,
            ts: Some(ts.to_string()),
            meta: None,
        };
        serde_json::to_string(&rec).unwrap()
    }

    fn won_by(seat: Seat, eliminated: Vec<Seat>, turns: u64) -> Option<HandResult> {
        Some(HandResult {
            winner: Some(seat),
            eliminated,
            restarted: false,
            turns,
        })
    }

    fn stats(path: &Path) -> (Result<(), CliError>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let r = handle_stats_command(path.to_string_lossy().into_owned(), &mut out, &mut err);
        (r, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn empty_file_has_no_hands() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let (r, out, _) = stats(temp.path());
        assert!(r.is_ok());
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["hands"], 0);
        assert!(json["first_ts"].is_null());
    }

    #[test]
    fn outcomes_are_counted_per_seat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        let lines = [
            record(1, won_by(Seat::Left, vec![Seat::Top], 20), "2026-01-01T10:00:00Z"),
            record(2, won_by(Seat::Left, vec![], 30), "2026-01-01T09:00:00Z"),
            record(
                3,
                Some(HandResult {
                    winner: None,
                    eliminated: vec![],
                    restarted: false,
                    turns: 40,
                }),
                "2026-01-01T11:30:00+01:00",
            ),
            record(4, None, "2026-01-01T12:00:00Z"),
        ];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let (r, out, err) = stats(&path);
        assert!(r.is_ok(), "{}", err);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["hands"], 4);
        assert_eq!(json["won"], 2);
        assert_eq!(json["stalled"], 1);
        assert_eq!(json["unfinished"], 1);
        assert_eq!(json["wins"]["left"], 2);
        assert_eq!(json["wins"]["bottom"], 0);
        assert_eq!(json["eliminations"]["top"], 1);
        assert_eq!(json["avg_turns"], 30.0);
        assert_eq!(json["first_ts"], "2026-01-01T09:00:00+00:00");
        assert_eq!(json["last_ts"], "2026-01-01T12:00:00+00:00");
    }

    #[test]
    fn torn_last_line_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        let good = record(1, won_by(Seat::Right, vec![], 12), "2026-01-01T00:00:00Z");
        std::fs::write(&path, format!("{}\n{{\"hand_id\":\"2026", good)).unwrap();

        let (r, out, err) = stats(&path);
        assert!(r.is_ok());
        assert!(err.contains("Discarded 1 incomplete final line(s)"));
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["hands"], 1);
    }

    #[test]
    fn file_of_garbage_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        std::fs::write(&path, "garbage\n").unwrap();
        let (r, _, err) = stats(&path);
        assert!(matches!(r, Err(CliError::InvalidInput(_))));
        assert!(err.contains("Skipped 1 corrupted record(s)"));
    }

    #[test]
    fn directories_are_searched_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let line = record(1, won_by(Seat::Bottom, vec![], 8), "2026-01-01T00:00:00Z") + "\n";
        std::fs::write(dir.path().join("one.jsonl"), &line).unwrap();
        std::fs::write(nested.join("two.jsonl"), &line).unwrap();
        std::fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let (r, out, _) = stats(dir.path());
        assert!(r.is_ok());
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["hands"], 2);
        assert_eq!(json["wins"]["bottom"], 2);
    }
}
