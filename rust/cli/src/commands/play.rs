//! # Play Command
//!
//! Interactive Kalooki at the terminal.
//!
//! - **Human**: you sit at the bottom seat against three bots and type
//!   commands (`help` lists them). Moves the engine refuses are reported and
//!   the prompt repeats.
//! - **Bots**: four bots play and every public event is narrated.
//!
//! Hands follow one another at the same table with the deal moving
//! clockwise. `q` or end of input stops the session after the current line.

use crate::cli::Vs;
use crate::error::CliError;
use crate::formatters::{format_action, format_event, format_hand};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{PLAY_HELP, ParseResult, parse_player_command};
use kalooki_ai::driver::play_bot_turn;
use kalooki_ai::{BotPlayer, bot_for};
use kalooki_engine::config::RuleConfig;
use kalooki_engine::events::GameEvent;
use kalooki_engine::game::Phase;
use kalooki_engine::seat::{Difficulty, Seat, SeatKind};
use kalooki_engine::session::Session;
use std::io::{BufRead, Write};
use tracing::{debug, info};

const HUMAN_SEAT: Seat = Seat::Bottom;

/// Turns after which a hand nobody can finish is abandoned.
const MAX_TURNS_PER_HAND: u64 = 600;

/// Everything `play` needs besides its streams.
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub vs: Vs,
    pub hands: Option<u32>,
    pub seed: Option<u64>,
    pub difficulty: Difficulty,
    pub rules: RuleConfig,
}

/// # Errors
///
/// `CliError::InvalidInput` when `hands` is 0; I/O errors on the streams;
/// `CliError::Engine` when a bot cannot finish its turn.
pub fn handle_play_command(
    opts: PlayOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let hands = opts.hands.unwrap_or(1);
    if hands == 0 {
        ui::write_error(err, "hands must be >= 1")?;
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }
    let seed = opts.seed.unwrap_or_else(rand::random);
    let bot = SeatKind::Bot(opts.difficulty);
    let seats = match opts.vs {
        Vs::Human => [SeatKind::Human, bot, bot, bot],
        Vs::Bots => [bot; 4],
    };
    let viewer = (opts.vs == Vs::Human).then_some(HUMAN_SEAT);
    let bots: [Box<dyn BotPlayer>; 4] = std::array::from_fn(|_| bot_for(opts.difficulty));

    writeln!(
        out,
        "play: vs={} hands={} seed={} difficulty={}",
        opts.vs.as_str(),
        hands,
        seed,
        opts.difficulty.as_str()
    )?;
    if viewer.is_some() {
        writeln!(out, "You are {}. Type 'help' for commands.", HUMAN_SEAT)?;
    }

    let mut session = Session::with_seed(opts.rules, seats, seed);
    let mut played = 0u32;

    for i in 1..=hands {
        let dealt = if i == 1 {
            session.deal_initial_hands()?
        } else {
            session.start_next_hand()?
        };
        narrate(out, &dealt, viewer)?;
        if let Some(v) = viewer
            && let Some(view) = session.view_for(v)
        {
            ui::render_table(out, &view)?;
        }

        match play_hand(&mut session, &bots, viewer, out, err, stdin)? {
            HandEnd::Finished => {
                played += 1;
                let winner = session.state().and_then(|s| s.winner());
                info!(hand = i, winner = ?winner, "hand finished");
            }
            // The next deal needs this one to be over.
            HandEnd::Abandoned | HandEnd::Quit => break,
        }
    }

    writeln!(out, "Hands played: {} of {}", played, hands)?;
    Ok(())
}

enum HandEnd {
    Finished,
    Abandoned,
    Quit,
}

fn play_hand(
    session: &mut Session,
    bots: &[Box<dyn BotPlayer>; 4],
    viewer: Option<Seat>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<HandEnd, CliError> {
    loop {
        let Some(state) = session.state() else {
            return Ok(HandEnd::Abandoned);
        };
        if state.is_over() {
            return Ok(HandEnd::Finished);
        }
        if state.turn_id() >= MAX_TURNS_PER_HAND {
            writeln!(out, "Hand abandoned after {} turns", state.turn_id())?;
            return Ok(HandEnd::Abandoned);
        }
        let seat = state.current_seat();

        if state.seat_kind(seat).is_bot() {
            let events = play_bot_turn(session, bots[seat.index()].as_ref())?;
            narrate(out, &events, viewer)?;
            continue;
        }

        let phase = state.phase();
        let prompt = match phase {
            Phase::AwaitingDraw => "draw",
            _ => "meld/goer/swap/discard",
        };
        write!(out, "[{}] {}> ", seat, prompt)?;
        out.flush()?;

        let Some(line) = read_stdin_line(stdin) else {
            writeln!(out)?;
            return Ok(HandEnd::Quit);
        };
        let Some(state) = session.state() else {
            return Ok(HandEnd::Abandoned);
        };
        match parse_player_command(&line, state.hand(seat), state.melds()) {
            ParseResult::Action(action) => {
                debug!(seat = %seat, action = %format_action(&action), "human action");
                match session.apply(seat, action) {
                    Ok(events) => {
                        narrate(out, &events, Some(seat))?;
                        if let Some(st) = session.state()
                            && !st.is_over()
                            && st.current_seat() == seat
                        {
                            writeln!(out, "Hand: {}", format_hand(st.hand(seat)))?;
                        }
                    }
                    Err(e) => ui::write_error(err, &e.to_string())?,
                }
            }
            ParseResult::ShowHand => writeln!(out, "Hand: {}", format_hand(state.hand(seat)))?,
            ParseResult::ShowTable => {
                if let Some(view) = session.view_for(seat) {
                    ui::render_table(out, &view)?;
                }
            }
            ParseResult::Help => writeln!(out, "{}", PLAY_HELP)?,
            ParseResult::Quit => return Ok(HandEnd::Quit),
            ParseResult::Invalid(msg) => ui::write_error(err, &msg)?,
        }
    }
}

fn narrate(out: &mut dyn Write, events: &[GameEvent], viewer: Option<Seat>) -> Result<(), CliError> {
    for e in events {
        writeln!(out, "{}", format_event(&e.redacted_for(viewer)))?;
    }
    Ok(())
}
