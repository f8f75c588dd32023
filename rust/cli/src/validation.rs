//! Input parsing and validation.
//!
//! - Interactive `play` commands are turned into engine [`Action`]s. Hand
//!   cards are addressed by their 1-based position as shown by `hand`.
//! - Hand records get a structural check before `verify` replays them.

use kalooki_engine::cards::{Card, CardId};
use kalooki_engine::events::{DrawSource, SwapMode};
use kalooki_engine::logger::HandRecord;
use kalooki_engine::melds::{GroupId, MeldGroup};
use kalooki_engine::seat::Seat;
use kalooki_engine::session::Action;

pub const PLAY_HELP: &str = "Commands:
  draw [deck|pack]            take a card (d = deck, p = pack)
  meld N N N...               lay hand cards N.. as a new meld
  goer N SEAT GROUP           add card N to a meld, e.g. goer 4 left g_2
  swap N SEAT GROUP [staged]  trade card N for the joker in GROUP
  cancel                      undo this turn's joker swaps
  take CARD|GROUP             take back a placement made this turn
  discard N                   end the turn (x N)
  vote                        vote to re-deal the hand
  hand | table | help | q";

/// What a line of `play` input asks for.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Action(Action),
    ShowHand,
    ShowTable,
    Help,
    Quit,
    Invalid(String),
}

/// Parses one line of `play` input against the player's hand and the table.
///
/// ```rust
/// use kalooki_engine::cards::{Card, CardId, Rank, Suit};
/// use kalooki_engine::events::DrawSource;
/// use kalooki_engine::session::Action;
/// # use kalooki_cli::validation::{parse_player_command, ParseResult};
///
/// let hand = [Card::natural(CardId(3), Rank::Four, Suit::Clubs)];
/// assert_eq!(
///     parse_player_command("draw", &hand, &[]),
///     ParseResult::Action(Action::Draw { source: DrawSource::Deck })
/// );
/// assert_eq!(
///     parse_player_command("x 1", &hand, &[]),
///     ParseResult::Action(Action::Discard { card: CardId(3) })
/// );
/// assert_eq!(parse_player_command("q", &hand, &[]), ParseResult::Quit);
/// ```
pub fn parse_player_command(input: &str, hand: &[Card], table: &[MeldGroup]) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some(&verb) = parts.first() else {
        return ParseResult::Invalid("Empty input".to_string());
    };
    let args = &parts[1..];

    let result = match verb {
        "q" | "quit" => return ParseResult::Quit,
        "help" | "?" => return ParseResult::Help,
        "hand" | "h" => return ParseResult::ShowHand,
        "table" | "t" => return ParseResult::ShowTable,
        "d" => Ok(Action::Draw {
            source: DrawSource::Deck,
        }),
        "p" => Ok(Action::Draw {
            source: DrawSource::Pack,
        }),
        "draw" => match args.first().copied() {
            None | Some("deck") => Ok(Action::Draw {
                source: DrawSource::Deck,
            }),
            Some("pack") => Ok(Action::Draw {
                source: DrawSource::Pack,
            }),
            Some(other) => Err(format!("Unknown draw source '{}'", other)),
        },
        "meld" | "m" => parse_meld(args, hand),
        "goer" | "g" => parse_goer(args, hand),
        "swap" | "s" => parse_swap(args, hand, table),
        "cancel" => Ok(Action::CancelSwap),
        "take" => parse_take_back(args, table),
        "discard" | "x" => match args {
            [n] => hand_card(n, hand).map(|card| Action::Discard { card }),
            _ => Err("Discard needs one card number (e.g. 'discard 4')".to_string()),
        },
        "vote" => Ok(Action::RestartVote),
        other => Err(format!(
            "Unrecognized command '{}'. Type 'help' for the list",
            other
        )),
    };
    match result {
        Ok(action) => ParseResult::Action(action),
        Err(msg) => ParseResult::Invalid(msg),
    }
}

fn hand_card(token: &str, hand: &[Card]) -> Result<CardId, String> {
    let n: usize = token
        .parse()
        .map_err(|_| format!("'{}' is not a card number", token))?;
    if n == 0 || n > hand.len() {
        return Err(format!("Card number {} is out of range 1..={}", n, hand.len()));
    }
    Ok(hand[n - 1].id)
}

fn parse_meld(args: &[&str], hand: &[Card]) -> Result<Action, String> {
    if args.len() < 3 {
        return Err("A meld needs at least three card numbers".to_string());
    }
    let cards = args
        .iter()
        .map(|t| hand_card(t, hand))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Action::LayMeld { cards })
}

fn seat_and_group(seat: &str, group: &str) -> Result<(Seat, GroupId), String> {
    let seat: Seat = seat.parse().map_err(|e| format!("{}", e))?;
    let group: GroupId = group.parse()?;
    Ok((seat, group))
}

fn parse_goer(args: &[&str], hand: &[Card]) -> Result<Action, String> {
    let [n, seat, group] = args else {
        return Err("Usage: goer N SEAT GROUP".to_string());
    };
    let card = hand_card(n, hand)?;
    let (target_seat, group) = seat_and_group(seat, group)?;
    Ok(Action::ExtendMeld {
        card,
        target_seat,
        group,
    })
}

fn parse_swap(args: &[&str], hand: &[Card], table: &[MeldGroup]) -> Result<Action, String> {
    let (n, seat, group, mode) = match args {
        [n, seat, group] => (n, seat, group, SwapMode::Immediate),
        [n, seat, group, "staged"] => (n, seat, group, SwapMode::Staged),
        _ => return Err("Usage: swap N SEAT GROUP [staged]".to_string()),
    };
    let natural = hand_card(n, hand)?;
    let (target_seat, group) = seat_and_group(seat, group)?;
    let joker = joker_in_group(table, target_seat, group, natural, hand)
        .ok_or_else(|| format!("{} on {}'s table holds no joker", group, target_seat))?;
    Ok(Action::JokerSwap {
        natural,
        joker,
        target_seat,
        group,
        mode,
    })
}

/// The joker a natural would replace. In a run with two jokers, the one
/// bound to the natural's rank and suit wins.
fn joker_in_group(
    table: &[MeldGroup],
    owner: Seat,
    group: GroupId,
    natural: CardId,
    hand: &[Card],
) -> Option<CardId> {
    let g = table.iter().find(|g| g.id == group && g.owner == owner)?;
    let wanted = hand
        .iter()
        .find(|c| c.id == natural)
        .and_then(|c| c.natural_parts());
    let jokers: Vec<&Card> = g
        .cards
        .iter()
        .map(|t| &t.card)
        .filter(|c| c.is_joker())
        .collect();
    jokers
        .iter()
        .find(|j| {
            matches!((j.binding(), wanted), (Some(b), Some((r, s))) if b.rank == r && b.suit == s)
        })
        .or_else(|| jokers.first())
        .map(|j| j.id)
}

fn parse_take_back(args: &[&str], table: &[MeldGroup]) -> Result<Action, String> {
    let [token] = args else {
        return Err("Usage: take CARD|GROUP (e.g. 'take g_3' or 'take card_12')".to_string());
    };
    if token.starts_with("g_") {
        let group: GroupId = token.parse()?;
        let card = table
            .iter()
            .find(|g| g.id == group)
            .and_then(|g| g.cards.first())
            .map(|t| t.card.id)
            .ok_or_else(|| format!("No meld {}", group))?;
        return Ok(Action::TakeBack { card });
    }
    let card: CardId = token.parse().map_err(|e| format!("{}", e))?;
    Ok(Action::TakeBack { card })
}

/// Structural checks on a record before it is replayed: table rules,
/// action turn order and a consistent result.
pub fn validate_record(record: &HandRecord) -> Result<(), String> {
    record
        .rules
        .validate()
        .map_err(|e| format!("invalid rules: {}", e))?;
    let mut last_turn = 0;
    for (i, a) in record.actions.iter().enumerate() {
        if a.turn_id < last_turn {
            return Err(format!(
                "action {} goes back to turn {} after turn {}",
                i + 1,
                a.turn_id,
                last_turn
            ));
        }
        last_turn = a.turn_id;
    }
    if let Some(result) = &record.result {
        if let Some(w) = result.winner
            && result.eliminated.contains(&w)
        {
            return Err(format!("winner {} is also listed as eliminated", w));
        }
        if !result.restarted && result.turns < last_turn {
            return Err(format!(
                "result reports {} turns but actions reach turn {}",
                result.turns, last_turn
            ));
        }
    }
    Ok(())
}
