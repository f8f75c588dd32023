//! `deal`: shuffles and deals one hand and shows every seat's cards. The
//! same seed always prints the same deal.

use crate::error::CliError;
use crate::formatters::{format_card, format_cards};
use kalooki_engine::config::RuleConfig;
use kalooki_engine::seat::{Seat, SeatKind};
use kalooki_engine::session::Session;
use std::io::Write;

pub fn handle_deal_command(
    seed: Option<u64>,
    rules: RuleConfig,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut session = Session::with_seed(rules, [SeatKind::Human; 4], seed);
    session.deal_initial_hands()?;
    let state = session.state().ok_or_else(|| CliError::Engine("no hand dealt".into()))?;

    writeln!(out, "Seed: {}", seed)?;
    writeln!(out, "Dealer: {}", state.dealer())?;
    for seat in Seat::ALL {
        writeln!(out, "{:<6}: {}", seat.as_str(), format_cards(state.hand(seat)))?;
    }
    let top = state.pack_top().map(format_card).unwrap_or_else(|| "-".into());
    writeln!(out, "Pack: {}", top)?;
    writeln!(out, "Deck: {} cards", state.deck_remaining())?;
    writeln!(out, "First to play: {}", state.current_seat())?;
    Ok(())
}
