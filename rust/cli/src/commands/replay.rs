//! Replay command handler.
//!
//! Re-applies every recorded action of each hand in a JSONL history
//! (plain or `.zst`) and prints the resulting events, deck draws included.
//! With `--viewer` the narration shows only what that seat could see;
//! `--json` prints the events as JSON lines instead.

use crate::error::CliError;
use crate::formatters::format_event;
use crate::io_utils::read_text_auto;
use crate::ui;
use kalooki_engine::events::GameEvent;
use kalooki_engine::logger::HandRecord;
use kalooki_engine::seat::Seat;
use kalooki_engine::session::replay_record;
use std::io::Write;

/// # Errors
///
/// Fails when the file cannot be read or when any hand fails to parse or
/// replay. Hands that do replay are still printed.
pub fn handle_replay_command(
    input: String,
    viewer: Option<Seat>,
    json: bool,
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

    let mut replayed = 0usize;
    let mut failed = 0usize;
    for (n, line) in content.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        let hand_no = n + 1;
        failed += 1;
        let record: HandRecord = parse_json_or_continue!(line, err, format!("hand {}", hand_no));
        let (state, events) = match replay_record(&record) {
            Ok(r) => r,
            Err(e) => {
                ui::write_error(err, &format!("Hand {} does not replay: {}", hand_no, e))?;
                continue;
            }
        };
        failed -= 1;
        replayed += 1;

        if json {
            for e in &events {
                let line =
                    serde_json::to_string(&as_seen(e, viewer)).map_err(std::io::Error::other)?;
                writeln!(out, "{}", line)?;
            }
            continue;
        }

        writeln!(
            out,
            "Hand {} (seed {}, dealer {})",
            record.hand_id, record.seed, record.dealer
        )?;
        for e in &events {
            writeln!(out, "  {}", format_event(&as_seen(e, viewer)))?;
        }
        let outcome = match (state.is_over(), state.winner()) {
            (true, Some(w)) => format!("{} wins", w),
            (true, None) => "no winner".to_string(),
            (false, _) => format!("unfinished after turn {}", state.turn_id()),
        };
        writeln!(out, "Result: {}", outcome)?;
        writeln!(out)?;
    }

    if !json {
        writeln!(out, "Replayed: {} hands", replayed)?;
    }
    if failed > 0 {
        return Err(CliError::InvalidInput(format!(
            "{} hands could not be replayed",
            failed
        )));
    }
    Ok(())
}

fn as_seen(event: &GameEvent, viewer: Option<Seat>) -> GameEvent {
    match viewer {
        Some(_) => event.redacted_for(viewer),
        None => event.clone(),
    }
}
