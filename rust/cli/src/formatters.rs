//! Card, meld, action and event formatters for terminal display.
//!
//! Suits print as ♥ ♦ ♣ ♠ where the terminal can show them, otherwise as
//! the letters h d c s.
//!
//! ```rust
//! use kalooki_engine::cards::{Card, CardId, Rank, Suit};
//! use kalooki_cli::formatters::format_card;
//!
//! let ten = Card::natural(CardId(9), Rank::Ten, Suit::Hearts);
//! assert!(format_card(&ten) == "10♥" || format_card(&ten) == "10h");
//! ```

use kalooki_engine::cards::{Card, Suit};
use kalooki_engine::events::{DrawSource, EliminationReason, GameEvent};
use kalooki_engine::melds::MeldGroup;
use kalooki_engine::session::Action;

/// Windows consoles only render the suit symbols in modern terminals.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

pub fn format_suit(suit: &Suit) -> String {
    if supports_unicode() {
        match suit {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
        .to_string()
    } else {
        match suit {
            Suit::Hearts => "h",
            Suit::Diamonds => "d",
            Suit::Clubs => "c",
            Suit::Spades => "s",
        }
        .to_string()
    }
}

/// `7♥`, or `JK` for a joker. A joker sitting in a meld shows what it
/// stands for: `JK=7♥`.
pub fn format_card(card: &Card) -> String {
    match (card.natural_parts(), card.binding()) {
        (Some((rank, suit)), _) => format!("{}{}", rank.code(), format_suit(&suit)),
        (None, Some(b)) => format!("JK={}{}", b.rank.code(), format_suit(&b.suit)),
        (None, None) => "JK".to_string(),
    }
}

/// Hand cards numbered from 1, the numbers `play` accepts.
///
/// ```rust
/// use kalooki_engine::cards::{Card, CardId, Rank, Suit};
/// # use kalooki_cli::formatters::format_hand;
///
/// let hand = [Card::natural(CardId(0), Rank::Ace, Suit::Clubs), Card::joker(CardId(104))];
/// let s = format_hand(&hand);
/// assert!(s.starts_with("1:A"));
/// assert!(s.ends_with("2:JK"));
/// ```
pub fn format_hand(cards: &[Card]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}:{}", i + 1, format_card(c)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        "[]".to_string()
    } else {
        let formatted: Vec<String> = cards.iter().map(format_card).collect();
        format!("[{}]", formatted.join(" "))
    }
}

/// `g_3 left [7♥ 8♥ 9♥] 24`, with ` locked` for a group frozen at an
/// elimination.
pub fn format_meld(group: &MeldGroup) -> String {
    let mut s = format!(
        "{} {} {} {}",
        group.id,
        group.owner,
        format_cards(&group.plain_cards()),
        group.score()
    );
    if group.locked {
        s.push_str(" locked");
    }
    s
}

fn source_str(source: DrawSource) -> &'static str {
    match source {
        DrawSource::Deck => "deck",
        DrawSource::Pack => "pack",
    }
}

/// One recorded action, with card ids as stored.
pub fn format_action(action: &Action) -> String {
    match action {
        Action::Draw { source } => format!("draw {}", source_str(*source)),
        Action::Discard { card } => format!("discard {}", card),
        Action::LayMeld { cards } => {
            let ids: Vec<String> = cards.iter().map(|c| c.to_string()).collect();
            format!("meld {}", ids.join(" "))
        }
        Action::ExtendMeld {
            card,
            target_seat,
            group,
        } => format!("goer {} on {} {}", card, target_seat, group),
        Action::JokerSwap {
            natural,
            joker,
            target_seat,
            group,
            mode,
        } => format!(
            "swap {} for {} on {} {} ({:?})",
            natural, joker, target_seat, group, mode
        )
        .to_lowercase(),
        Action::CancelSwap => "cancel swap".to_string(),
        Action::TakeBack { card } => format!("take back {}", card),
        Action::RestartVote => "vote restart".to_string(),
    }
}

/// A one-line narration of `event`.
pub fn format_event(event: &GameEvent) -> String {
    match event {
        GameEvent::HandDealt {
            hand_number,
            dealer,
            first_seat,
        } => format!("Hand {} dealt by {}; {} to play", hand_number, dealer, first_seat),
        GameEvent::CardDrawn { seat, source, card } => match card {
            Some(c) => format!("{} draws {} from the {}", seat, format_card(c), source_str(*source)),
            None => format!("{} draws from the {}", seat, source_str(*source)),
        },
        GameEvent::DeckReplenished { cards } => format!("Pack reshuffled into the deck ({} cards)", cards),
        GameEvent::HandStalled => "No cards left to draw; the hand stalls".to_string(),
        GameEvent::MeldLaid { seat, group, cards } => {
            format!("{} lays {} {}", seat, group, format_cards(cards))
        }
        GameEvent::MeldExtended {
            seat,
            target_seat,
            group,
            card,
            is_goer,
        } => {
            if *is_goer {
                format!("{} puts {} on {}'s {}", seat, format_card(card), target_seat, group)
            } else {
                format!("{} adds {} to {}", seat, format_card(card), group)
            }
        }
        GameEvent::CardsTakenBack { seat, cards } => {
            format!("{} takes back {} card(s)", seat, cards.len())
        }
        GameEvent::Opened { seat, points } => format!("{} opens with {} points", seat, points),
        GameEvent::MeldsHeldBack { seat, groups } => {
            format!("{} is below the opening threshold; {} meld(s) return to hand", seat, groups.len())
        }
        GameEvent::JokerSwapped {
            seat,
            target_seat,
            group,
            natural,
            ..
        } => format!("{} swaps {} for the joker in {}'s {}", seat, format_card(natural), target_seat, group),
        GameEvent::JokerSwapCompleted { seat, group } => format!("{} completes {}", seat, group),
        GameEvent::JokerSwapReverted { seat, group } => format!("{}'s swap in {} is undone", seat, group),
        GameEvent::StagedSwapsFinalized { seat, count } => format!("{}'s {} staged swap(s) stand", seat, count),
        GameEvent::StagedSwapsRolledBack { seat, count } => {
            format!("{}'s {} staged swap(s) are rolled back", seat, count)
        }
        GameEvent::CardDiscarded { seat, card } => format!("{} discards {}", seat, format_card(card)),
        GameEvent::Eliminated {
            seat,
            reason,
            cards_to_pack,
            ..
        } => {
            let why = match reason {
                EliminationReason::PackDrawUnopened => "took the pack without opening",
                EliminationReason::InvalidMeld => "left an invalid meld",
            };
            format!("{} is eliminated: {} ({} cards to the pack)", seat, why, cards_to_pack)
        }
        GameEvent::TurnAdvanced { seat, turn_id } => format!("Turn {}: {}", turn_id, seat),
        GameEvent::RestartVoteCast { seat, votes } => format!("{} votes to restart ({})", seat, votes),
        GameEvent::HandRestarted { hand_number } => format!("Hand {} is re-dealt", hand_number),
        GameEvent::Won { seat } => format!("{} wins the hand", seat),
        GameEvent::GameOver { winner } => match winner {
            Some(s) => format!("Game over: {} wins", s),
            None => "Game over: no winner".to_string(),
        },
    }
}
