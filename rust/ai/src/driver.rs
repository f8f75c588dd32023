//! Applies a bot's decisions to a live session.

use tracing::{debug, warn};

use kalooki_engine::events::GameEvent;
use kalooki_engine::game::Phase;
use kalooki_engine::session::Session;

use crate::{BotContext, BotError, BotPlayer};

/// Plays the current seat's whole turn with `bot`: draw, planned melds and
/// goers, then the discard.
///
/// A planned meld or goer the engine refuses is skipped. A refused discard
/// falls back to the first card the engine would accept.
pub fn play_bot_turn(session: &mut Session, bot: &dyn BotPlayer) -> Result<Vec<GameEvent>, BotError> {
    let ctx = BotContext::for_session(session).ok_or(BotError::NoHand)?;
    let seat = ctx.seat;
    let mut events = Vec::new();

    if ctx.state.phase() == Phase::AwaitingDraw {
        let source = bot.choose_draw(&ctx);
        let drawn = session
            .draw_card(seat, source)
            .map_err(|source| BotError::Rejected {
                seat,
                action: "draw",
                source,
            })?;
        events.extend(drawn);
    }
    if session.is_hand_over() {
        return Ok(events);
    }

    let ctx = BotContext::for_session(session).ok_or(BotError::NoHand)?;
    let plan = bot.plan_turn(&ctx);
    debug!(%seat, bot = bot.name(), melds = plan.melds.len(), goers = plan.goers.len(), "bot plan");

    for cards in plan.melds {
        match session.lay_meld(seat, cards) {
            Ok(ev) => events.extend(ev),
            Err(err) => warn!(%seat, %err, "planned meld rejected"),
        }
        if session.is_hand_over() {
            return Ok(events);
        }
    }
    for goer in plan.goers {
        match session.extend_meld(seat, goer.card, goer.target_seat, goer.group) {
            Ok(ev) => events.extend(ev),
            Err(err) => warn!(%seat, %err, card = %goer.card, "planned goer rejected"),
        }
        if session.is_hand_over() {
            return Ok(events);
        }
    }

    if let Some(card) = plan.discard {
        match session.discard_card(seat, card) {
            Ok(ev) => {
                events.extend(ev);
                return Ok(events);
            }
            Err(err) => warn!(%seat, %err, %card, "planned discard rejected"),
        }
    }
    let fallback = session
        .legal_actions(seat)
        .discardable
        .first()
        .copied()
        .ok_or(BotError::NoLegalDiscard(seat))?;
    let discarded = session
        .discard_card(seat, fallback)
        .map_err(|source| BotError::Rejected {
            seat,
            action: "discard",
            source,
        })?;
    events.extend(discarded);
    Ok(events)
}

/// Plays bot turns until the hand ends or `max_turns` turns have been
/// taken, with `bots[seat.index()]` deciding for each seat. Returns the
/// number of turns played.
pub fn play_out_hand(session: &mut Session, bots: &[Box<dyn BotPlayer>; 4], max_turns: usize) -> Result<usize, BotError> {
    let mut turns = 0;
    while !session.is_hand_over() && turns < max_turns {
        let seat = session.state().ok_or(BotError::NoHand)?.current_seat();
        play_bot_turn(session, bots[seat.index()].as_ref())?;
        turns += 1;
    }
    Ok(turns)
}
