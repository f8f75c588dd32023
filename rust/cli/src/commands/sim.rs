//! Simulation command: bot-only hands written as JSONL hand histories.
//!
//! Hand `i` (0-based) is dealt at a fresh table seeded with `seed + i`, so
//! any single hand can be replayed from its record alone.
//!
//! # Environment Variables
//!
//! - `KALOOKI_SIM_BREAK_AFTER`: stop after N hands as if interrupted (for testing)

use crate::error::CliError;
use crate::io_utils::HistoryWriter;
use crate::ui;
use kalooki_ai::driver::play_out_hand;
use kalooki_ai::{BotPlayer, bot_for};
use kalooki_engine::config::RuleConfig;
use kalooki_engine::logger::{HandLogger, HandRecord};
use kalooki_engine::seat::{Difficulty, SeatKind};
use kalooki_engine::session::Session;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

pub const BREAK_AFTER_ENV: &str = "KALOOKI_SIM_BREAK_AFTER";

/// Default cap on turns before an undecided hand is recorded unfinished.
pub const DEFAULT_MAX_TURNS: usize = 400;

#[derive(Debug, Clone)]
pub struct SimOptions {
    pub hands: u64,
    pub output: Option<String>,
    pub seed: Option<u64>,
    pub difficulty: Difficulty,
    pub max_turns: Option<usize>,
    pub rules: RuleConfig,
}

#[derive(Debug, Default)]
struct SimTally {
    completed: u64,
    won: u64,
    stalled: u64,
    unfinished: u64,
}

/// Plays `hands` bot hands and optionally records them.
///
/// # Errors
///
/// `InvalidInput` for zero hands, `Io` when the output cannot be written,
/// `Interrupted` when the break point in `KALOOKI_SIM_BREAK_AFTER` is hit.
pub fn handle_sim_command(
    opts: SimOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if opts.hands == 0 {
        ui::write_error(err, "hands must be >= 1")?;
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }
    let max_turns = opts.max_turns.unwrap_or(DEFAULT_MAX_TURNS);
    if max_turns == 0 {
        ui::write_error(err, "max-turns must be >= 1")?;
        return Err(CliError::InvalidInput("max-turns must be >= 1".to_string()));
    }
    let base_seed = opts.seed.unwrap_or_else(rand::random);
    let break_after = std::env::var(BREAK_AFTER_ENV)
        .ok()
        .and_then(|v| v.parse::<u64>().ok());

    let mut writer = match opts.output.as_ref().map(PathBuf::from) {
        Some(p) => match HistoryWriter::create(&p) {
            Ok(w) => Some(w),
            Err(e) => {
                ui::write_error(err, &format!("Failed to open {}: {}", p.display(), e))?;
                return Err(CliError::Io(e));
            }
        },
        None => None,
    };
    let mut ids = HandLogger::detached();
    let bots: [Box<dyn BotPlayer>; 4] = std::array::from_fn(|_| bot_for(opts.difficulty));
    let mut tally = SimTally::default();

    for i in 0..opts.hands {
        let seed = base_seed.wrapping_add(i);
        let record = play_one(&opts, seed, &bots, max_turns)?;
        match record.result.as_ref() {
            Some(r) if r.winner.is_some() => tally.won += 1,
            Some(_) => tally.stalled += 1,
            None => tally.unfinished += 1,
        }
        if let Some(w) = writer.as_mut() {
            let line = ids.encode(&record)?;
            w.write_line(&line)?;
        }
        tally.completed += 1;

        if let Some(b) = break_after
            && tally.completed == b
        {
            if let Some(w) = writer.take() {
                w.finish()?;
            }
            writeln!(out, "Interrupted: saved {}/{}", tally.completed, opts.hands)?;
            return Err(CliError::Interrupted(format!(
                "saved {}/{}",
                tally.completed, opts.hands
            )));
        }
    }
    if let Some(w) = writer.take() {
        w.finish()?;
    }

    info!(
        hands = tally.completed,
        won = tally.won,
        stalled = tally.stalled,
        unfinished = tally.unfinished,
        "simulation finished"
    );
    writeln!(out, "Simulated: {} hands", tally.completed)?;
    writeln!(
        out,
        "Won: {}  Stalled: {}  Unfinished: {}",
        tally.won, tally.stalled, tally.unfinished
    )?;
    Ok(())
}

fn play_one(
    opts: &SimOptions,
    seed: u64,
    bots: &[Box<dyn BotPlayer>; 4],
    max_turns: usize,
) -> Result<HandRecord, CliError> {
    let seats = [SeatKind::Bot(opts.difficulty); 4];
    let mut session = Session::with_seed(opts.rules.clone(), seats, seed);
    session.deal_initial_hands()?;
    let turns = play_out_hand(&mut session, bots, max_turns)?;
    debug!(seed, turns, over = session.is_hand_over(), "hand simulated");

    let mut record = session.hand_record();
    record.meta = Some(serde_json::json!({
        "difficulty": opts.difficulty,
        "session_seed": seed,
        "max_turns": max_turns,
    }));
    Ok(record)
}
