use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};
use crate::melds::GroupId;
use crate::seat::Seat;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawSource {
    Deck,
    Pack,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapMode {
    /// The joker goes to a fresh pending meld owned by the swapping seat.
    Immediate,
    /// The joker goes to hand; all staged swaps stand or fall with a win this turn.
    Staged,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationReason {
    /// Drew from the pack while unopened and ended the turn below the threshold.
    PackDrawUnopened,
    /// Left a laid group that is neither a set nor a run.
    InvalidMeld,
}

/// Discrete state transitions. Renderers, audio and persistence subscribe to
/// these; none of them feed back into the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    HandDealt {
        hand_number: u32,
        dealer: Seat,
        first_seat: Seat,
    },
    CardDrawn {
        seat: Seat,
        source: DrawSource,
        /// `None` when redacted for a seat that may not see a deck draw.
        card: Option<Card>,
    },
    DeckReplenished {
        cards: usize,
    },
    HandStalled,
    MeldLaid {
        seat: Seat,
        group: GroupId,
        cards: Vec<Card>,
    },
    /// A card added to an existing group. `is_goer` when the group belongs
    /// to another seat.
    MeldExtended {
        seat: Seat,
        target_seat: Seat,
        group: GroupId,
        card: Card,
        is_goer: bool,
    },
    CardsTakenBack {
        seat: Seat,
        cards: Vec<CardId>,
    },
    Opened {
        seat: Seat,
        points: u32,
    },
    MeldsHeldBack {
        seat: Seat,
        groups: Vec<GroupId>,
    },
    JokerSwapped {
        seat: Seat,
        mode: SwapMode,
        target_seat: Seat,
        group: GroupId,
        natural: Card,
        joker: CardId,
    },
    JokerSwapCompleted {
        seat: Seat,
        group: GroupId,
    },
    JokerSwapReverted {
        seat: Seat,
        group: GroupId,
    },
    StagedSwapsFinalized {
        seat: Seat,
        count: usize,
    },
    StagedSwapsRolledBack {
        seat: Seat,
        count: usize,
    },
    CardDiscarded {
        seat: Seat,
        card: Card,
    },
    Eliminated {
        seat: Seat,
        reason: EliminationReason,
        invalid_groups: Vec<GroupId>,
        cards_to_pack: usize,
    },
    TurnAdvanced {
        seat: Seat,
        turn_id: u64,
    },
    RestartVoteCast {
        seat: Seat,
        votes: usize,
    },
    HandRestarted {
        hand_number: u32,
    },
    Won {
        seat: Seat,
    },
    GameOver {
        winner: Option<Seat>,
    },
}

impl GameEvent {
    /// The event as `viewer` is allowed to see it. Deck draws by other seats
    /// lose their card; everything else is public.
    pub fn redacted_for(&self, viewer: Option<Seat>) -> GameEvent {
        match self {
            GameEvent::CardDrawn {
                seat,
                source: DrawSource::Deck,
                ..
            } if viewer != Some(*seat) => GameEvent::CardDrawn {
                seat: *seat,
                source: DrawSource::Deck,
                card: None,
            },
            other => other.clone(),
        }
    }
}
