//! Verify command handler module.
//!
//! Checks a JSONL hand history (plain or `.zst`) record by record:
//!
//! - Hand IDs are well formed (`YYYYMMDD-NNNNNN`) and unique
//! - Rules and action ordering are consistent (see `validate_record`)
//! - Every action replays legally from the recorded seed and dealer
//! - All 106 cards are accounted for after the replay
//! - The recorded result matches the replayed winner and eliminations
//!
//! Errors are collected using the shared `BatchValidationError` pattern for structured reporting.

use crate::error::{BatchValidationError, CliError};
use crate::io_utils::read_text_auto;
use crate::ui;
use crate::validation::validate_record;
use kalooki_engine::logger::HandRecord;
use kalooki_engine::seat::Seat;
use kalooki_engine::session::replay_record;
use std::collections::{HashMap, HashSet};
use std::io::Write;

/// The `usize` context is the 1-based line number of the hand.
type VerifyError = BatchValidationError<usize>;

fn valid_id(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 15
        && b[..8].iter().all(u8::is_ascii_digit)
        && b[8] == b'-'
        && b[9..].iter().all(u8::is_ascii_digit)
}

/// # Errors
///
/// `InvalidInput` when the file cannot be read or any hand fails a check.
pub fn handle_verify_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = match read_text_auto(&input) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!("Failed to read {}: {}", input, e);
            ui::write_error(err, &msg)?;
            return Err(CliError::InvalidInput(msg));
        }
    };

    let mut errors: Vec<VerifyError> = Vec::new();
    let mut seen_ids: HashMap<String, usize> = HashMap::new();
    let mut hands = 0usize;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        hands += 1;
        let record: HandRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                errors.push(VerifyError {
                    item_context: hands,
                    message: format!("Invalid JSON record: {}", e),
                });
                continue;
            }
        };
        for message in check_record(&record, hands, &mut seen_ids) {
            errors.push(VerifyError {
                item_context: hands,
                message,
            });
        }
    }

    if errors.is_empty() {
        writeln!(out, "Verify: OK (hands={})", hands)?;
        return Ok(());
    }

    writeln!(out, "Verify: FAIL (hands={})", hands)?;
    writeln!(err)?;
    writeln!(err, "Errors found:")?;
    for error in &errors {
        writeln!(err, "  Hand {}: {}", error.item_context, error.message)?;
    }
    writeln!(err)?;
    let invalid: HashSet<usize> = errors.iter().map(|e| e.item_context).collect();
    writeln!(
        err,
        "Summary: {} error(s) in {} hands ({} invalid hands)",
        errors.len(),
        hands,
        invalid.len()
    )?;
    Err(CliError::InvalidInput(format!(
        "{} validation errors found",
        errors.len()
    )))
}

fn check_record(
    record: &HandRecord,
    line: usize,
    seen_ids: &mut HashMap<String, usize>,
) -> Vec<String> {
    let mut problems = Vec::new();

    if !valid_id(&record.hand_id) {
        problems.push(format!("Invalid hand_id format: {:?}", record.hand_id));
    } else if let Some(first) = seen_ids.insert(record.hand_id.clone(), line) {
        problems.push(format!(
            "Duplicate hand_id {} (first seen at hand {})",
            record.hand_id, first
        ));
    }

    if let Err(msg) = validate_record(record) {
        problems.push(msg);
        return problems;
    }

    let (state, _) = match replay_record(record) {
        Ok(r) => r,
        Err(e) => {
            problems.push(format!("Replay rejected an action: {}", e));
            return problems;
        }
    };
    if !state.is_conserved() {
        problems.push(format!(
            "Card count is {} after replay, expected 106",
            state.card_count()
        ));
    }

    match &record.result {
        Some(result) if result.restarted => {}
        Some(result) => {
            if !state.is_over() {
                problems.push("Result recorded but the replayed hand is not over".to_string());
            } else if state.winner() != result.winner {
                problems.push(format!(
                    "Recorded winner {} but replay gives {}",
                    seat_or_none(result.winner),
                    seat_or_none(state.winner())
                ));
            }
            let replayed: Vec<Seat> = Seat::ALL
                .into_iter()
                .filter(|s| state.is_eliminated(*s))
                .collect();
            let mut recorded = result.eliminated.clone();
            recorded.sort_by_key(|s| s.index());
            if recorded != replayed {
                problems.push(format!(
                    "Recorded eliminations {:?} differ from replay {:?}",
                    recorded, replayed
                ));
            }
        }
        None => {
            if state.is_over() {
                problems.push("Replayed hand is over but no result was recorded".to_string());
            }
        }
    }
    problems
}

fn seat_or_none(seat: Option<Seat>) -> String {
    seat.map_or_else(|| "none".to_string(), |s| s.to_string())
}
