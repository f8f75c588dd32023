use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId, TOTAL_CARDS};
use crate::config::RuleConfig;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::events::DrawSource;
use crate::jokers::{PendingJokerSwap, StagedSwaps};
use crate::melds::{GroupId, MeldGroup};
use crate::seat::{Seat, SeatKind};

/// Where the current turn stands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    AwaitingDraw,
    Drawn { source: DrawSource },
    /// `winner` is `None` when the hand stalled with no cards left to draw.
    HandOver { winner: Option<Seat> },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub seat: Seat,
    /// Increments every time a turn starts; tags cards placed during it.
    pub turn_id: u64,
    pub phase: Phase,
    /// Set after a pack draw until that card leaves the hand.
    pub pack_card: Option<CardId>,
}

/// The most recent discard, kept to stop a seat from immediately picking
/// back up a card it drew from the deck and threw away.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LastDiscard {
    pub seat: Seat,
    pub card: CardId,
    pub source: DrawSource,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiscardRecord {
    pub seat: Seat,
    pub card: Card,
    pub turn_id: u64,
}

/// A card a seat took from the pack. Public information, used by bots to
/// infer what opponents are collecting.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PackPickup {
    pub seat: Seat,
    pub card: Card,
    pub turn_id: u64,
}

/// Everything about one dealt hand. Every one of the 106 cards is in exactly
/// one of: the deck, the pack, a seat's hand, or a meld group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandState {
    pub(crate) config: RuleConfig,
    pub(crate) seat_kinds: [SeatKind; 4],
    pub(crate) dealer: Seat,
    pub(crate) deck: Deck,
    /// Face-up discard pile, top card last.
    pub(crate) pack: Vec<Card>,
    pub(crate) hands: [Vec<Card>; 4],
    pub(crate) melds: Vec<MeldGroup>,
    pub(crate) opened: [bool; 4],
    pub(crate) eliminated: [bool; 4],
    pub(crate) draws: [u32; 4],
    pub(crate) turn: Turn,
    pub(crate) next_group: u32,
    pub(crate) last_discard: Option<LastDiscard>,
    pub(crate) discards: Vec<DiscardRecord>,
    pub(crate) pack_pickups: Vec<PackPickup>,
    pub(crate) pending_swap: Option<PendingJokerSwap>,
    pub(crate) staged: Option<StagedSwaps>,
}

impl HandState {
    /// Shuffles a fresh deck from `seed`, deals `hand_size` cards to each seat
    /// one at a time starting left of the dealer, then flips one card to
    /// start the pack. The seat after the dealer acts first.
    pub fn deal(config: RuleConfig, seat_kinds: [SeatKind; 4], dealer: Seat, seed: u64) -> Self {
        let mut deck = Deck::new_with_seed(seed);
        deck.shuffle();
        let mut hands: [Vec<Card>; 4] = Default::default();
        let first = dealer.next();
        for _ in 0..config.hand_size {
            let mut seat = first;
            for _ in 0..4 {
                if let Some(card) = deck.draw() {
                    hands[seat.index()].push(card);
                }
                seat = seat.next();
            }
        }
        let pack: Vec<Card> = deck.draw().into_iter().collect();
        Self::from_parts(config, seat_kinds, dealer, deck, pack, hands)
    }

    /// Builds a hand from explicit piles. The seat after `dealer` is to draw.
    pub fn from_parts(
        config: RuleConfig,
        seat_kinds: [SeatKind; 4],
        dealer: Seat,
        deck: Deck,
        pack: Vec<Card>,
        hands: [Vec<Card>; 4],
    ) -> Self {
        Self {
            config,
            seat_kinds,
            dealer,
            deck,
            pack,
            hands,
            melds: Vec::new(),
            opened: [false; 4],
            eliminated: [false; 4],
            draws: [0; 4],
            turn: Turn {
                seat: dealer.next(),
                turn_id: 1,
                phase: Phase::AwaitingDraw,
                pack_card: None,
            },
            next_group: 0,
            last_discard: None,
            discards: Vec::new(),
            pack_pickups: Vec::new(),
            pending_swap: None,
            staged: None,
        }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }
    pub fn dealer(&self) -> Seat {
        self.dealer
    }
    pub fn turn(&self) -> &Turn {
        &self.turn
    }
    pub fn current_seat(&self) -> Seat {
        self.turn.seat
    }
    pub fn turn_id(&self) -> u64 {
        self.turn.turn_id
    }
    pub fn phase(&self) -> Phase {
        self.turn.phase
    }
    pub fn seat_kind(&self, seat: Seat) -> SeatKind {
        self.seat_kinds[seat.index()]
    }
    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }
    pub fn melds(&self) -> &[MeldGroup] {
        &self.melds
    }
    pub fn melds_of(&self, seat: Seat) -> impl Iterator<Item = &MeldGroup> {
        self.melds.iter().filter(move |g| g.owner == seat)
    }
    pub fn group(&self, id: GroupId) -> Option<&MeldGroup> {
        self.melds.iter().find(|g| g.id == id)
    }
    pub fn pack(&self) -> &[Card] {
        &self.pack
    }
    pub fn pack_top(&self) -> Option<&Card> {
        self.pack.last()
    }
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }
    pub fn is_opened(&self, seat: Seat) -> bool {
        self.opened[seat.index()]
    }
    pub fn is_eliminated(&self, seat: Seat) -> bool {
        self.eliminated[seat.index()]
    }
    pub fn draw_count(&self, seat: Seat) -> u32 {
        self.draws[seat.index()]
    }
    pub fn last_discard(&self) -> Option<&LastDiscard> {
        self.last_discard.as_ref()
    }
    pub fn discard_history(&self) -> &[DiscardRecord] {
        &self.discards
    }
    pub fn pack_pickups(&self) -> &[PackPickup] {
        &self.pack_pickups
    }
    pub fn pending_swap(&self) -> Option<&PendingJokerSwap> {
        self.pending_swap.as_ref()
    }
    pub fn staged_swaps(&self) -> Option<&StagedSwaps> {
        self.staged.as_ref()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.turn.phase, Phase::HandOver { .. })
    }

    pub fn winner(&self) -> Option<Seat> {
        match self.turn.phase {
            Phase::HandOver { winner } => winner,
            _ => None,
        }
    }

    /// Seats still in the hand: not eliminated and holding cards.
    pub fn active_seats(&self) -> Vec<Seat> {
        Seat::ALL
            .into_iter()
            .filter(|s| !self.is_eliminated(*s) && !self.hand(*s).is_empty())
            .collect()
    }

    /// Count of cards across every zone; equals 106 for any reachable state.
    pub fn card_count(&self) -> usize {
        self.deck.remaining()
            + self.pack.len()
            + self.hands.iter().map(Vec::len).sum::<usize>()
            + self.melds.iter().map(|g| g.cards.len()).sum::<usize>()
    }

    pub fn is_conserved(&self) -> bool {
        self.card_count() == TOTAL_CARDS
    }

    pub(crate) fn check_turn(&self, seat: Seat) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::HandAlreadyComplete);
        }
        if self.is_eliminated(seat) {
            return Err(GameError::SeatEliminated(seat));
        }
        if seat != self.turn.seat {
            return Err(GameError::NotYourTurn {
                expected: self.turn.seat,
                actual: seat,
            });
        }
        Ok(())
    }

    /// Turn ownership plus a completed draw.
    pub(crate) fn check_drawn(&self, seat: Seat) -> Result<(), GameError> {
        self.check_turn(seat)?;
        match self.turn.phase {
            Phase::Drawn { .. } => Ok(()),
            _ => Err(GameError::MustDrawFirst),
        }
    }

    pub(crate) fn hand_index(&self, seat: Seat, id: CardId) -> Result<usize, GameError> {
        self.hands[seat.index()]
            .iter()
            .position(|c| c.id == id)
            .ok_or(GameError::CardNotInHand(id))
    }

    pub(crate) fn take_from_hand(&mut self, seat: Seat, id: CardId) -> Result<Card, GameError> {
        let idx = self.hand_index(seat, id)?;
        Ok(self.hands[seat.index()].remove(idx))
    }

    /// Returns a card to a hand with any joker binding dropped.
    pub(crate) fn return_to_hand(&mut self, seat: Seat, mut card: Card) {
        card.clear_binding();
        self.hands[seat.index()].push(card);
    }

    pub(crate) fn group_index(&self, owner: Seat, id: GroupId) -> Result<usize, GameError> {
        self.melds
            .iter()
            .position(|g| g.id == id && g.owner == owner)
            .ok_or(GameError::MeldNotFound {
                seat: owner,
                group: id,
            })
    }

    pub(crate) fn alloc_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// A group laid by its owner during the current turn.
    pub(crate) fn is_new_this_turn(&self, group: &MeldGroup) -> bool {
        group
            .cards
            .first()
            .is_some_and(|t| t.placed_by == group.owner && t.placed_turn == self.turn.turn_id)
    }

    /// Points the seat has laid in new groups this turn, pending swap
    /// groups excluded.
    pub(crate) fn points_laid_this_turn(&self, seat: Seat) -> u32 {
        let pending = self.pending_swap.as_ref().map(|p| p.new_group);
        self.melds_of(seat)
            .filter(|g| self.is_new_this_turn(g) && Some(g.id) != pending)
            .map(MeldGroup::score)
            .sum()
    }

    /// The next seat clockwise from `seat` that is still in the hand.
    pub(crate) fn next_seat_after(&self, seat: Seat) -> Seat {
        let mut s = seat.next();
        for _ in 0..4 {
            if !self.is_eliminated(s) {
                return s;
            }
            s = s.next();
        }
        seat
    }

    pub(crate) fn start_turn(&mut self, seat: Seat) {
        self.turn = Turn {
            seat,
            turn_id: self.turn.turn_id + 1,
            phase: Phase::AwaitingDraw,
            pack_card: None,
        };
    }

    /// Dealer for the following hand.
    pub fn rotate_dealer(&self) -> Seat {
        self.dealer.next()
    }
}
