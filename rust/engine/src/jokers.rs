use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cards::{Card, CardId};
use crate::errors::GameError;
use crate::events::{GameEvent, SwapMode};
use crate::game::HandState;
use crate::melds::{infer_kind, GroupId, MeldGroup, MeldKind, TableCard, MIN_MELD};
use crate::seat::Seat;

/// A joker pulled into a fresh group by an immediate swap, waiting for the
/// seat to complete that group before it discards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingJokerSwap {
    pub joker: CardId,
    pub natural: CardId,
    pub source_seat: Seat,
    pub source_group: GroupId,
    pub new_group: GroupId,
    /// Cards the seat has since added to `new_group`.
    pub added: Vec<CardId>,
    /// The joker as it sat in the source group, binding included.
    pub(crate) joker_slot: TableCard,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedSwap {
    pub joker: CardId,
    pub natural: CardId,
    pub target_seat: Seat,
    pub group: GroupId,
}

/// Hands, melds and opening flags as they were before the first staged swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    hands: [Vec<Card>; 4],
    melds: Vec<MeldGroup>,
    opened: [bool; 4],
    next_group: u32,
}

impl TableSnapshot {
    fn capture(state: &HandState) -> Self {
        Self {
            hands: state.hands.clone(),
            melds: state.melds.clone(),
            opened: state.opened,
            next_group: state.next_group,
        }
    }

    fn restore(self, state: &mut HandState) {
        state.hands = self.hands;
        state.melds = self.melds;
        state.opened = self.opened;
        state.next_group = self.next_group;
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }
}

/// The staged swaps of the current turn. They all stand if the seat goes
/// out this turn and are all undone otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedSwaps {
    pub seat: Seat,
    pub swaps: Vec<StagedSwap>,
    pub(crate) snapshot: TableSnapshot,
}

/// Whether `natural` may take the place of the joker at `joker_idx`.
///
/// In a set the natural must share the set's rank and bring a suit none of
/// the naturals have. In a run it must be exactly the card the joker stands
/// for.
pub fn natural_fits_joker(cards: &[Card], joker_idx: usize, natural: &Card) -> bool {
    let Some((rank, suit)) = natural.natural_parts() else {
        return false;
    };
    let Some(joker) = cards.get(joker_idx).filter(|c| c.is_joker()) else {
        return false;
    };
    match infer_kind(cards) {
        Some(MeldKind::Set) => {
            let naturals: Vec<_> = cards.iter().filter_map(Card::natural_parts).collect();
            naturals.first().is_some_and(|(r, _)| *r == rank) && !naturals.iter().any(|(_, s)| *s == suit)
        }
        Some(MeldKind::Run) => joker.binding().is_some_and(|b| b.rank == rank && b.suit == suit),
        None => false,
    }
}

impl HandState {
    /// Replaces a joker on the table with a natural from `seat`'s hand.
    pub fn joker_swap(
        &mut self,
        seat: Seat,
        natural_id: CardId,
        joker_id: CardId,
        target_seat: Seat,
        group_id: GroupId,
        mode: SwapMode,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.check_drawn(seat)?;
        match mode {
            SwapMode::Immediate if self.staged.is_some() => return Err(GameError::SwapModeConflict),
            SwapMode::Immediate if self.pending_swap.is_some() => return Err(GameError::SwapAlreadyPending),
            SwapMode::Staged if self.pending_swap.is_some() => return Err(GameError::SwapModeConflict),
            _ => {}
        }
        let natural = self.hand(seat)[self.hand_index(seat, natural_id)?];
        if natural.is_joker() {
            return Err(GameError::JokerSwapMismatch { natural: natural_id });
        }
        if self.turn.pack_card == Some(natural_id) {
            return Err(GameError::PackCardMustMeld);
        }
        let gi = self.group_index(target_seat, group_id)?;
        let group = &self.melds[gi];
        if group.locked {
            return Err(GameError::MeldLocked(group_id));
        }
        let own_new = group.owner == seat && self.is_new_this_turn(group);
        if !own_new && !self.is_opened(seat) {
            return Err(GameError::NotOpened);
        }
        let slot = group.position(joker_id).ok_or(GameError::NotAJoker(joker_id))?;
        let joker_slot = group.cards[slot];
        if !joker_slot.card.is_joker() {
            return Err(GameError::NotAJoker(joker_id));
        }
        if !natural_fits_joker(&group.plain_cards(), slot, &natural) {
            return Err(GameError::JokerSwapMismatch { natural: natural_id });
        }

        if mode == SwapMode::Staged && self.staged.is_none() {
            self.staged = Some(StagedSwaps {
                seat,
                swaps: Vec::new(),
                snapshot: TableSnapshot::capture(self),
            });
        }
        let natural = self.take_from_hand(seat, natural_id)?;
        let turn_id = self.turn.turn_id;
        let group = &mut self.melds[gi];
        group.cards[slot] = TableCard {
            card: natural,
            placed_by: seat,
            placed_turn: turn_id,
            is_goer: target_seat != seat,
        };
        group.reassign_jokers();
        let mut joker = joker_slot.card;
        joker.clear_binding();

        match mode {
            SwapMode::Immediate => {
                let new_group = self.alloc_group_id();
                let mut pending_group = MeldGroup::new(new_group, seat);
                pending_group.cards.push(TableCard {
                    card: joker,
                    placed_by: seat,
                    placed_turn: turn_id,
                    is_goer: false,
                });
                self.melds.push(pending_group);
                self.pending_swap = Some(PendingJokerSwap {
                    joker: joker_id,
                    natural: natural_id,
                    source_seat: target_seat,
                    source_group: group_id,
                    new_group,
                    added: Vec::new(),
                    joker_slot,
                });
            }
            SwapMode::Staged => {
                self.hands[seat.index()].push(joker);
                if let Some(staged) = self.staged.as_mut() {
                    staged.swaps.push(StagedSwap {
                        joker: joker_id,
                        natural: natural_id,
                        target_seat,
                        group: group_id,
                    });
                }
            }
        }

        debug!(%seat, ?mode, %target_seat, group = %group_id, natural = %natural_id, joker = %joker_id, "joker swapped");
        Ok(vec![GameEvent::JokerSwapped {
            seat,
            mode,
            target_seat,
            group: group_id,
            natural,
            joker: joker_id,
        }])
    }

    /// Abandons the swaps of the current turn: a pending immediate swap is
    /// reverted, staged swaps roll the table back to before the first one.
    pub fn cancel_pending_swap(&mut self, seat: Seat) -> Result<Vec<GameEvent>, GameError> {
        self.check_drawn(seat)?;
        let mut events = Vec::new();
        if self.pending_swap.is_some() {
            self.revert_pending_swap(seat, &mut events);
        } else if self.staged.is_some() {
            self.rollback_staged(seat, &mut events);
        } else {
            return Err(GameError::NoPendingSwap);
        }
        Ok(events)
    }

    /// True for naturals that went onto the table through a swap this turn.
    pub(crate) fn is_swap_card(&self, id: CardId) -> bool {
        self.pending_swap.as_ref().is_some_and(|p| p.natural == id)
            || self
                .staged
                .as_ref()
                .is_some_and(|s| s.swaps.iter().any(|w| w.natural == id))
    }

    /// Joker back in its slot, natural and added cards back in hand.
    pub(crate) fn revert_pending_swap(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        let Some(pending) = self.pending_swap.take() else {
            return;
        };
        let mut returned = Vec::new();
        if let Some(i) = self.melds.iter().position(|g| g.id == pending.new_group) {
            let group = self.melds.remove(i);
            returned.extend(
                group
                    .cards
                    .into_iter()
                    .map(|t| t.card)
                    .filter(|c| c.id != pending.joker),
            );
        }
        if let Some(source) = self.melds.iter_mut().find(|g| g.id == pending.source_group) {
            if let Some(pos) = source.position(pending.natural) {
                returned.push(source.cards[pos].card);
                source.cards[pos] = pending.joker_slot;
                source.reassign_jokers();
            }
        }
        for card in returned {
            self.return_to_hand(seat, card);
        }
        debug!(%seat, group = %pending.new_group, "pending joker swap reverted");
        events.push(GameEvent::JokerSwapReverted {
            seat,
            group: pending.new_group,
        });
    }

    /// Restores the table to how it was before the first staged swap.
    pub(crate) fn rollback_staged(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        let Some(staged) = self.staged.take() else {
            return;
        };
        let count = staged.swaps.len();
        staged.snapshot.restore(self);
        warn!(%seat, count, "staged joker swaps rolled back");
        events.push(GameEvent::StagedSwapsRolledBack { seat, count });
    }

    fn finalize_staged(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        if let Some(staged) = self.staged.take() {
            events.push(GameEvent::StagedSwapsFinalized {
                seat,
                count: staged.swaps.len(),
            });
        }
    }

    fn pending_group_complete(&self) -> bool {
        self.pending_swap.as_ref().is_some_and(|p| {
            self.group(p.new_group)
                .is_some_and(|g| g.cards.len() >= MIN_MELD && g.is_valid())
        })
    }

    fn finalize_pending(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        if let Some(pending) = self.pending_swap.take() {
            events.push(GameEvent::JokerSwapCompleted {
                seat,
                group: pending.new_group,
            });
            self.check_opening(seat, events);
        }
    }

    /// Discard-time settlement of an immediate swap: a completed pending
    /// group stands, an incomplete one reverts.
    pub(crate) fn settle_pending_before_discard(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        if self.pending_swap.is_some() {
            if self.pending_group_complete() {
                self.finalize_pending(seat, events);
            } else {
                self.revert_pending_swap(seat, events);
            }
        }
    }

    /// Staged swaps stand only if `card_id` is the last card in hand.
    pub(crate) fn settle_staged_before_discard(&mut self, seat: Seat, card_id: CardId, events: &mut Vec<GameEvent>) {
        if self.staged.is_some() {
            let goes_out = matches!(self.hand(seat), [only] if only.id == card_id);
            if goes_out {
                self.finalize_staged(seat, events);
            } else {
                self.rollback_staged(seat, events);
            }
        }
    }

    /// The seat melded its last card. Returns false while a pending group is
    /// still incomplete, in which case the hand is not over yet.
    pub(crate) fn settle_swaps_on_meld_out(&mut self, seat: Seat, events: &mut Vec<GameEvent>) -> bool {
        if self.pending_swap.is_some() {
            if !self.pending_group_complete() {
                return false;
            }
            self.finalize_pending(seat, events);
        }
        self.finalize_staged(seat, events);
        true
    }
}
