use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cards::{Card, CardId};
use crate::errors::GameError;
use crate::events::{DrawSource, GameEvent};
use crate::game::{DiscardRecord, HandState, LastDiscard, PackPickup, Phase};
use crate::melds::{GroupId, MeldGroup, TableCard, MIN_MELD};
use crate::seat::Seat;

/// What a seat may do right now. Empty when it is not that seat's turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalActions {
    pub draw_sources: Vec<DrawSource>,
    pub can_meld: bool,
    pub can_play_goers: bool,
    /// Cards whose discard would be accepted as the hand stands.
    pub discardable: Vec<CardId>,
    pub can_cancel_swap: bool,
}

/// Checks a proposed new meld against the cards in `hand`.
///
/// Only the shape is enforced here: at least three distinct cards, all held,
/// at least one natural and no more than `max_size`. Whether the group is a
/// real set or run is decided when the turn ends.
///
/// # Errors
///
/// - [`GameError::MeldTooSmall`] / [`GameError::MeldTooLarge`] on size
/// - [`GameError::DuplicateCard`] when an id repeats
/// - [`GameError::CardNotInHand`] when an id is not held
/// - [`GameError::NoNaturalCard`] when every card is a joker
///
/// # Examples
///
/// ```
/// use kalooki_engine::cards::{Card, CardId, Rank, Suit};
/// use kalooki_engine::errors::GameError;
/// use kalooki_engine::rules::validate_new_meld;
///
/// let hand = vec![
///     Card::natural(CardId(0), Rank::Seven, Suit::Clubs),
///     Card::natural(CardId(13), Rank::Seven, Suit::Diamonds),
///     Card::joker(CardId(104)),
/// ];
/// assert!(validate_new_meld(&hand, &[CardId(0), CardId(13), CardId(104)], 5).is_ok());
/// assert_eq!(
///     validate_new_meld(&hand, &[CardId(0), CardId(0), CardId(104)], 5),
///     Err(GameError::DuplicateCard(CardId(0)))
/// );
/// ```
pub fn validate_new_meld(hand: &[Card], ids: &[CardId], max_size: usize) -> Result<Vec<Card>, GameError> {
    if ids.len() < MIN_MELD {
        return Err(GameError::MeldTooSmall(ids.len()));
    }
    if ids.len() > max_size {
        return Err(GameError::MeldTooLarge {
            got: ids.len(),
            max: max_size,
        });
    }
    let mut cards = Vec::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(GameError::DuplicateCard(*id));
        }
        let card = hand
            .iter()
            .find(|c| c.id == *id)
            .ok_or(GameError::CardNotInHand(*id))?;
        cards.push(*card);
    }
    if cards.iter().all(Card::is_joker) {
        return Err(GameError::NoNaturalCard);
    }
    Ok(cards)
}

impl HandState {
    /// Draws one card for `seat` from the deck or the top of the pack.
    ///
    /// An empty deck is rebuilt from the pack minus its top card. When the
    /// pack cannot spare a card the hand stalls and ends with no winner.
    pub fn draw(&mut self, seat: Seat, source: DrawSource) -> Result<Vec<GameEvent>, GameError> {
        self.check_turn(seat)?;
        if self.turn.phase != Phase::AwaitingDraw {
            return Err(GameError::AlreadyDrawn);
        }
        let mut events = Vec::new();
        let card = match source {
            DrawSource::Deck => {
                if self.deck.is_empty() {
                    if self.pack.len() <= 1 {
                        warn!(%seat, "deck and pack exhausted, hand stalls");
                        self.turn.phase = Phase::HandOver { winner: None };
                        return Ok(vec![GameEvent::HandStalled]);
                    }
                    let top = self.pack.pop();
                    let rest = std::mem::take(&mut self.pack);
                    let count = rest.len();
                    self.deck.replenish(rest);
                    self.pack.extend(top);
                    debug!(cards = count, "deck replenished from pack");
                    events.push(GameEvent::DeckReplenished { cards: count });
                }
                let Some(card) = self.deck.draw() else {
                    return Err(GameError::PackEmpty);
                };
                card
            }
            DrawSource::Pack => {
                let top = self.pack.last().ok_or(GameError::PackEmpty)?;
                if let Some(last) = &self.last_discard {
                    if last.seat == seat && last.card == top.id && last.source == DrawSource::Deck {
                        return Err(GameError::RedrawOwnDiscard);
                    }
                }
                let Some(card) = self.pack.pop() else {
                    return Err(GameError::PackEmpty);
                };
                self.turn.pack_card = Some(card.id);
                self.pack_pickups.push(PackPickup {
                    seat,
                    card,
                    turn_id: self.turn.turn_id,
                });
                card
            }
        };
        self.hands[seat.index()].push(card);
        self.draws[seat.index()] += 1;
        self.turn.phase = Phase::Drawn { source };
        debug!(%seat, ?source, card = %card, "card drawn");
        events.push(GameEvent::CardDrawn {
            seat,
            source,
            card: Some(card),
        });
        Ok(events)
    }

    /// Lays `ids` from the seat's hand as a new group it owns.
    pub fn lay_meld(&mut self, seat: Seat, ids: &[CardId]) -> Result<Vec<GameEvent>, GameError> {
        self.check_drawn(seat)?;
        validate_new_meld(self.hand(seat), ids, self.config.max_initial_meld)?;

        let mut next = self.clone();
        let group_id = next.alloc_group_id();
        let mut group = MeldGroup::new(group_id, seat);
        for id in ids {
            let card = next.take_from_hand(seat, *id)?;
            group.cards.push(TableCard {
                card,
                placed_by: seat,
                placed_turn: next.turn.turn_id,
                is_goer: false,
            });
        }
        group.reassign_jokers();
        let mut events = vec![GameEvent::MeldLaid {
            seat,
            group: group_id,
            cards: group.plain_cards(),
        }];
        next.melds.push(group);
        next.after_meld(seat, &mut events)?;

        debug!(%seat, group = %group_id, cards = ids.len(), "meld laid");
        *self = next;
        Ok(events)
    }

    /// Adds one card from the seat's hand to an existing group. On another
    /// seat's group the card is a goer and needs the seat to be opened. A
    /// group the seat laid this turn may not grow past the initial meld cap.
    pub fn extend_meld(
        &mut self,
        seat: Seat,
        card_id: CardId,
        target_seat: Seat,
        group_id: GroupId,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.check_drawn(seat)?;
        let gi = self.group_index(target_seat, group_id)?;
        let group = &self.melds[gi];
        if group.locked {
            return Err(GameError::MeldLocked(group_id));
        }
        self.hand_index(seat, card_id)?;
        let own_new = group.owner == seat && self.is_new_this_turn(group);
        if self.turn.pack_card == Some(card_id) && !own_new {
            return Err(GameError::PackCardMustMeld);
        }
        if !own_new && !self.is_opened(seat) {
            return Err(GameError::NotOpened);
        }
        // A group laid this turn is still an initial meld and keeps its cap.
        let pending_group = self.pending_swap.as_ref().is_some_and(|p| p.new_group == group_id);
        let max = self.config.max_initial_meld;
        if own_new && !pending_group && group.cards.len() >= max {
            return Err(GameError::MeldTooLarge {
                got: group.cards.len() + 1,
                max,
            });
        }

        let mut next = self.clone();
        let card = next.take_from_hand(seat, card_id)?;
        let is_goer = target_seat != seat;
        let group = &mut next.melds[gi];
        group.cards.push(TableCard {
            card,
            placed_by: seat,
            placed_turn: next.turn.turn_id,
            is_goer,
        });
        group.reassign_jokers();
        let placed = group.cards.last().map(|t| t.card).unwrap_or(card);
        if let Some(pending) = next.pending_swap.as_mut() {
            if pending.new_group == group_id {
                pending.added.push(card_id);
            }
        }
        let mut events = vec![GameEvent::MeldExtended {
            seat,
            target_seat,
            group: group_id,
            card: placed,
            is_goer,
        }];
        next.after_meld(seat, &mut events)?;

        debug!(%seat, %target_seat, group = %group_id, card = %card_id, is_goer, "meld extended");
        *self = next;
        Ok(events)
    }

    /// Undoes a placement made by `seat` during the current turn. Picking a
    /// card from a group the seat laid this turn returns the whole group;
    /// anywhere else only that card comes back.
    pub fn take_back(&mut self, seat: Seat, card_id: CardId) -> Result<Vec<GameEvent>, GameError> {
        self.check_drawn(seat)?;
        let gi = self
            .melds
            .iter()
            .position(|g| g.contains(card_id))
            .ok_or(GameError::NotTakeBackable(card_id))?;
        let group = &self.melds[gi];
        let Some(slot) = group.cards.iter().find(|t| t.card.id == card_id) else {
            return Err(GameError::NotTakeBackable(card_id));
        };
        if slot.placed_by != seat || slot.placed_turn != self.turn.turn_id || group.locked {
            return Err(GameError::NotTakeBackable(card_id));
        }
        if self.is_swap_card(card_id) || self.pending_swap.as_ref().is_some_and(|p| p.new_group == group.id) {
            return Err(GameError::NotTakeBackable(card_id));
        }

        let mut next = self.clone();
        let returned: Vec<Card> = if group.owner == seat && self.is_new_this_turn(group) {
            let removed = next.melds.remove(gi);
            removed.cards.into_iter().map(|t| t.card).collect()
        } else {
            let g = &mut next.melds[gi];
            let idx = g.position(card_id).ok_or(GameError::NotTakeBackable(card_id))?;
            let t = g.cards.remove(idx);
            g.reassign_jokers();
            vec![t.card]
        };
        let ids: Vec<CardId> = returned.iter().map(|c| c.id).collect();
        for card in returned {
            next.return_to_hand(seat, card);
        }

        // Opening earned this turn may no longer stand.
        let threshold = next.config.opening_threshold;
        if next.is_opened(seat) && next.points_laid_this_turn(seat) < threshold && next.opened_this_turn(seat) {
            if next.has_goers_this_turn(seat) {
                return Err(GameError::NotTakeBackable(card_id));
            }
            next.opened[seat.index()] = false;
        }

        debug!(%seat, cards = ids.len(), "cards taken back");
        *self = next;
        Ok(vec![GameEvent::CardsTakenBack { seat, cards: ids }])
    }

    /// Ends the seat's turn by putting `card_id` on the pack.
    ///
    /// Before the card moves, pending and staged joker swaps are settled and
    /// an unopened seat's melds from this turn go back to its hand. If the
    /// hand is then empty the seat wins, which needs every group it laid
    /// into to be valid; otherwise the elimination checks run and play
    /// passes clockwise to the next seat still in the hand.
    pub fn discard(&mut self, seat: Seat, card_id: CardId) -> Result<Vec<GameEvent>, GameError> {
        let (mut next, mut events) = self.prepare_discard(seat, card_id)?;

        let source = match next.turn.phase {
            Phase::Drawn { source } => source,
            _ => return Err(GameError::MustDrawFirst),
        };
        let card = next.take_from_hand(seat, card_id)?;
        next.pack.push(card);
        next.last_discard = Some(LastDiscard {
            seat,
            card: card_id,
            source,
        });
        next.discards.push(DiscardRecord {
            seat,
            card,
            turn_id: next.turn.turn_id,
        });
        debug!(%seat, card = %card, "card discarded");
        events.push(GameEvent::CardDiscarded { seat, card });

        if next.hand(seat).is_empty() {
            next.turn.phase = Phase::HandOver { winner: Some(seat) };
        } else {
            next.run_elimination_checks(seat, &mut events);
            let active = next.active_seats();
            match active.as_slice() {
                [only] => next.turn.phase = Phase::HandOver { winner: Some(*only) },
                [] => next.turn.phase = Phase::HandOver { winner: None },
                _ => {
                    let to = next.next_seat_after(seat);
                    next.start_new_turn(to, &mut events);
                }
            }
        }

        *self = next;
        Ok(events)
    }

    /// Starts `seat`'s turn. Swap state left over from the previous turn is
    /// unwound first.
    pub(crate) fn start_new_turn(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        let previous = self.turn.seat;
        if self.pending_swap.is_some() {
            self.revert_pending_swap(previous, events);
        }
        if self.staged.is_some() {
            self.rollback_staged(previous, events);
        }
        self.start_turn(seat);
        events.push(GameEvent::TurnAdvanced {
            seat,
            turn_id: self.turn.turn_id,
        });
    }

    /// What `seat` may do in the current state.
    pub fn legal_actions(&self, seat: Seat) -> LegalActions {
        let mut legal = LegalActions::default();
        if self.check_turn(seat).is_err() {
            return legal;
        }
        match self.turn.phase {
            Phase::AwaitingDraw => {
                if !self.deck.is_empty() || self.pack.len() > 1 {
                    legal.draw_sources.push(DrawSource::Deck);
                }
                if let Some(top) = self.pack.last() {
                    let blocked = self.last_discard.as_ref().is_some_and(|l| {
                        l.seat == seat && l.card == top.id && l.source == DrawSource::Deck
                    });
                    if !blocked {
                        legal.draw_sources.push(DrawSource::Pack);
                    }
                }
            }
            Phase::Drawn { .. } => {
                legal.can_meld = self.hand(seat).len() >= MIN_MELD;
                legal.can_play_goers = self.is_opened(seat);
                legal.can_cancel_swap = self.pending_swap.is_some() || self.staged.is_some();
                legal.discardable = self
                    .hand(seat)
                    .iter()
                    .map(|c| c.id)
                    .filter(|id| self.prepare_discard(seat, *id).is_ok())
                    .collect();
            }
            Phase::HandOver { .. } => {}
        }
        legal
    }

    /// Settles the turn on a copy of the state and checks that `card_id` can
    /// then be discarded. Nothing on `self` changes.
    fn prepare_discard(&self, seat: Seat, card_id: CardId) -> Result<(HandState, Vec<GameEvent>), GameError> {
        self.check_drawn(seat)?;
        self.hand_index(seat, card_id)?;
        if self.turn.pack_card == Some(card_id) {
            return Err(GameError::PackCardMustMeld);
        }
        let mut next = self.clone();
        let mut events = Vec::new();
        next.settle_pending_before_discard(seat, &mut events);
        // The pack-card rule is judged on the turn as played, before any
        // staged rollback returns the pack card to hand.
        next.validate_discard(seat, card_id)?;
        next.settle_staged_before_discard(seat, card_id, &mut events);
        next.hold_back_unopened(seat, &mut events);
        next.hand_index(seat, card_id)?;
        if next.hand(seat).len() == 1 {
            next.check_groups_for_going_out(seat)?;
        }
        Ok((next, events))
    }

    fn validate_discard(&self, seat: Seat, card_id: CardId) -> Result<(), GameError> {
        self.hand_index(seat, card_id)?;
        if let Some(pack_card) = self.turn.pack_card {
            if pack_card == card_id {
                return Err(GameError::PackCardMustMeld);
            }
            // An opened seat must meld the pack card if it holds enough cards to.
            if self.is_opened(seat)
                && self.hand(seat).len() >= MIN_MELD
                && self.hand_index(seat, pack_card).is_ok()
            {
                return Err(GameError::PackCardMustMeld);
            }
        }
        Ok(())
    }

    /// Marks the seat opened once its new groups this turn reach the threshold.
    pub(crate) fn check_opening(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        if self.is_opened(seat) {
            return;
        }
        let points = self.points_laid_this_turn(seat);
        if points >= self.config.opening_threshold {
            self.opened[seat.index()] = true;
            debug!(%seat, points, "seat opened");
            events.push(GameEvent::Opened { seat, points });
        }
    }

    /// Opening and win bookkeeping after cards reach the table.
    fn after_meld(&mut self, seat: Seat, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        self.check_opening(seat, events);
        if !self.hand(seat).is_empty() {
            return Ok(());
        }
        if !self.is_opened(seat) {
            return Err(GameError::CannotEmptyHandUnopened);
        }
        if !self.settle_swaps_on_meld_out(seat, events) {
            return Ok(());
        }
        self.check_groups_for_going_out(seat)?;
        self.turn.phase = Phase::HandOver { winner: Some(seat) };
        Ok(())
    }

    /// A seat only goes out when every open group it laid cards in is a
    /// set or a run.
    fn check_groups_for_going_out(&self, seat: Seat) -> Result<(), GameError> {
        match self.invalid_groups_laid_by(seat).first() {
            Some(group) => Err(GameError::InvalidMeldOnGoingOut(*group)),
            None => Ok(()),
        }
    }

    /// Unopened seats may not leave melds on the table; everything laid this
    /// turn goes back to hand.
    fn hold_back_unopened(&mut self, seat: Seat, events: &mut Vec<GameEvent>) {
        if self.is_opened(seat) {
            return;
        }
        let turn_id = self.turn.turn_id;
        let (held, kept): (Vec<MeldGroup>, Vec<MeldGroup>) = std::mem::take(&mut self.melds)
            .into_iter()
            .partition(|g| {
                g.owner == seat
                    && g.cards
                        .first()
                        .is_some_and(|t| t.placed_by == seat && t.placed_turn == turn_id)
            });
        self.melds = kept;
        if held.is_empty() {
            return;
        }
        let groups: Vec<GroupId> = held.iter().map(|g| g.id).collect();
        for group in held {
            for t in group.cards {
                self.return_to_hand(seat, t.card);
            }
        }
        debug!(%seat, groups = groups.len(), "melds held back below opening threshold");
        events.push(GameEvent::MeldsHeldBack { seat, groups });
    }

    /// True when the seat crossed the threshold during the current turn,
    /// which is only possible if it had no groups from earlier turns.
    fn opened_this_turn(&self, seat: Seat) -> bool {
        !self
            .melds_of(seat)
            .any(|g| !self.is_new_this_turn(g))
    }

    fn has_goers_this_turn(&self, seat: Seat) -> bool {
        self.melds.iter().any(|g| {
            g.owner != seat
                && g.cards
                    .iter()
                    .any(|t| t.placed_by == seat && t.placed_turn == self.turn.turn_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_code;
    use crate::config::RuleConfig;
    use crate::deck::Deck;
    use crate::seat::SeatKind;

    fn nat(code: &str, id: u8) -> Card {
        let (r, s) = parse_code(code).unwrap();
        Card::natural(CardId(id), r, s)
    }

    fn hand_of(codes: &[(&str, u8)]) -> Vec<Card> {
        codes.iter().map(|(c, id)| nat(c, *id)).collect()
    }

    /// Bottom to act, every seat human.
    fn table(bottom: Vec<Card>, pack: Vec<Card>, deck: Vec<Card>) -> HandState {
        let filler = |base: u8| hand_of(&[("2C", base), ("5D", base + 1), ("9H", base + 2), ("KS", base + 3)]);
        HandState::from_parts(
            RuleConfig::default(),
            [SeatKind::Human; 4],
            Seat::Right,
            Deck::from_cards(deck, 1),
            pack,
            [bottom, filler(60), filler(70), filler(80)],
        )
    }

    #[test]
    fn draw_requires_turn_and_single_draw() {
        let mut st = table(hand_of(&[("3C", 1)]), vec![nat("4C", 2)], vec![nat("5C", 3)]);
        assert!(matches!(
            st.draw(Seat::Left, DrawSource::Deck),
            Err(GameError::NotYourTurn { .. })
        ));
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        assert_eq!(st.draw(Seat::Bottom, DrawSource::Pack), Err(GameError::AlreadyDrawn));
        assert_eq!(st.hand(Seat::Bottom).len(), 2);
    }

    #[test]
    fn discard_before_draw_is_rejected() {
        let mut st = table(hand_of(&[("3C", 1), ("4C", 2)]), vec![], vec![nat("5C", 3)]);
        assert_eq!(st.discard(Seat::Bottom, CardId(1)), Err(GameError::MustDrawFirst));
    }

    #[test]
    fn empty_deck_is_rebuilt_from_pack_keeping_top() {
        let pack = vec![nat("2D", 10), nat("3D", 11), nat("4D", 12)];
        let mut st = table(hand_of(&[("3C", 1)]), pack, vec![]);
        let events = st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        assert!(matches!(events[0], GameEvent::DeckReplenished { cards: 2 }));
        assert_eq!(st.pack().len(), 1);
        assert_eq!(st.pack_top().map(|c| c.id), Some(CardId(12)));
        assert_eq!(st.deck_remaining(), 1);
    }

    #[test]
    fn hand_stalls_when_nothing_left_to_draw() {
        let mut st = table(hand_of(&[("3C", 1)]), vec![nat("4D", 12)], vec![]);
        let events = st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        assert_eq!(events, vec![GameEvent::HandStalled]);
        assert_eq!(st.phase(), Phase::HandOver { winner: None });
    }

    #[test]
    fn pack_card_cannot_be_discarded() {
        let mut st = table(hand_of(&[("3C", 1), ("4H", 2)]), vec![nat("9S", 9)], vec![nat("5C", 3)]);
        st.draw(Seat::Bottom, DrawSource::Pack).unwrap();
        assert_eq!(st.discard(Seat::Bottom, CardId(9)), Err(GameError::PackCardMustMeld));
        assert_eq!(st.hand(Seat::Bottom).len(), 3);
    }

    #[test]
    fn goers_need_an_opened_seat() {
        let mut st = table(hand_of(&[("8C", 1), ("QD", 2)]), vec![], vec![nat("5C", 3)]);
        let mut g = MeldGroup::new(GroupId(50), Seat::Left);
        for (code, id) in [("8D", 40u8), ("8H", 41), ("8S", 42)] {
            g.cards.push(TableCard {
                card: nat(code, id),
                placed_by: Seat::Left,
                placed_turn: 0,
                is_goer: false,
            });
        }
        st.melds.push(g);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        assert_eq!(
            st.extend_meld(Seat::Bottom, CardId(1), Seat::Left, GroupId(50)),
            Err(GameError::NotOpened)
        );
        st.opened[Seat::Bottom.index()] = true;
        let events = st.extend_meld(Seat::Bottom, CardId(1), Seat::Left, GroupId(50)).unwrap();
        assert!(matches!(events[0], GameEvent::MeldExtended { is_goer: true, .. }));
        assert_eq!(st.group(GroupId(50)).unwrap().cards.len(), 4);
    }

    #[test]
    fn unopened_melds_return_to_hand_at_discard() {
        let hand = hand_of(&[("3C", 1), ("3D", 2), ("3H", 3), ("KS", 4)]);
        let mut st = table(hand, vec![], vec![nat("5C", 5)]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3)]).unwrap();
        assert!(!st.is_opened(Seat::Bottom));
        let events = st.discard(Seat::Bottom, CardId(4)).unwrap();
        assert!(events.iter().any(|e| matches!(e, GameEvent::MeldsHeldBack { .. })));
        assert_eq!(st.hand(Seat::Bottom).len(), 4);
        assert_eq!(st.melds_of(Seat::Bottom).count(), 0);
        assert_eq!(st.current_seat(), Seat::Left);
    }

    #[test]
    fn opening_at_forty_points() {
        let hand = hand_of(&[
            ("QC", 1),
            ("QD", 2),
            ("QH", 3),
            ("KC", 4),
            ("KD", 5),
            ("KH", 6),
            ("2S", 7),
        ]);
        let mut st = table(hand, vec![], vec![nat("5C", 8)]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3)]).unwrap();
        assert!(!st.is_opened(Seat::Bottom));
        let events = st.lay_meld(Seat::Bottom, &[CardId(4), CardId(5), CardId(6)]).unwrap();
        assert!(events.contains(&GameEvent::Opened {
            seat: Seat::Bottom,
            points: 60
        }));
        st.discard(Seat::Bottom, CardId(7)).unwrap();
        assert_eq!(st.melds_of(Seat::Bottom).count(), 2);
    }

    #[test]
    fn laying_out_unopened_is_refused() {
        let hand = hand_of(&[("3C", 1), ("3D", 2), ("2H", 3)]);
        let mut st = table(hand, vec![], vec![nat("3H", 4)]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        let before = st.hand(Seat::Bottom).to_vec();
        assert_eq!(
            st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(4), CardId(3)]),
            Err(GameError::CannotEmptyHandUnopened)
        );
        assert_eq!(st.hand(Seat::Bottom), before.as_slice());
    }

    #[test]
    fn laying_out_with_an_invalid_group_is_refused() {
        let hand = hand_of(&[("2C", 1), ("9H", 2), ("KD", 3)]);
        let mut st = table(hand, vec![], vec![nat("4S", 4)]);
        st.opened[Seat::Bottom.index()] = true;
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        assert!(matches!(
            st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3), CardId(4)]),
            Err(GameError::InvalidMeldOnGoingOut(_))
        ));
        assert_eq!(st.hand(Seat::Bottom).len(), 4);
        assert!(st.melds().is_empty());
        assert_eq!(st.phase(), Phase::Drawn { source: DrawSource::Deck });
    }

    #[test]
    fn discarding_out_over_an_invalid_group_is_refused() {
        let hand = hand_of(&[("2C", 1), ("9H", 2), ("KD", 3)]);
        let mut st = table(hand, vec![], vec![nat("4S", 4)]);
        st.opened[Seat::Bottom.index()] = true;
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3)]).unwrap();
        assert!(matches!(
            st.discard(Seat::Bottom, CardId(4)),
            Err(GameError::InvalidMeldOnGoingOut(_))
        ));
        assert!(st.legal_actions(Seat::Bottom).discardable.is_empty());
        assert_eq!(st.winner(), None);
        assert_eq!(st.hand(Seat::Bottom).len(), 1);
    }

    #[test]
    fn going_out_over_valid_groups_wins() {
        let hand = hand_of(&[("QC", 1), ("QD", 2), ("QH", 3), ("KC", 4), ("KD", 5), ("KH", 6)]);
        let mut st = table(hand, vec![], vec![nat("2S", 7)]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3)]).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(4), CardId(5), CardId(6)]).unwrap();
        st.discard(Seat::Bottom, CardId(7)).unwrap();
        assert_eq!(st.phase(), Phase::HandOver { winner: Some(Seat::Bottom) });
    }

    #[test]
    fn new_group_keeps_the_initial_size_cap() {
        let hand = hand_of(&[("3C", 1), ("4C", 2), ("5C", 3), ("6C", 4), ("7C", 5), ("8C", 6), ("KD", 7)]);
        let mut st = table(hand, vec![], vec![nat("2D", 8)]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3), CardId(4), CardId(5)])
            .unwrap();
        let group = st.melds()[0].id;
        assert_eq!(
            st.extend_meld(Seat::Bottom, CardId(6), Seat::Bottom, group),
            Err(GameError::MeldTooLarge { got: 6, max: 5 })
        );
        assert_eq!(st.melds()[0].cards.len(), 5);
        assert!(!st.is_opened(Seat::Bottom));
    }

    /// Between a seat's discard and its next draw every other seat still in
    /// the hand discards on top, so only a directly built state reaches this.
    #[test]
    fn own_deck_discard_cannot_be_redrawn() {
        let mut st = table(hand_of(&[("3C", 1)]), vec![nat("9S", 9)], vec![nat("5C", 3)]);
        st.last_discard = Some(LastDiscard {
            seat: Seat::Bottom,
            card: CardId(9),
            source: DrawSource::Deck,
        });
        assert_eq!(st.legal_actions(Seat::Bottom).draw_sources, vec![DrawSource::Deck]);
        assert_eq!(st.draw(Seat::Bottom, DrawSource::Pack), Err(GameError::RedrawOwnDiscard));
        assert_eq!(st.pack().len(), 1);

        st.last_discard = Some(LastDiscard {
            seat: Seat::Bottom,
            card: CardId(9),
            source: DrawSource::Pack,
        });
        st.draw(Seat::Bottom, DrawSource::Pack).unwrap();
        assert!(st.hand(Seat::Bottom).iter().any(|c| c.id == CardId(9)));
    }

    #[test]
    fn take_back_returns_whole_new_group() {
        let hand = hand_of(&[("3C", 1), ("3D", 2), ("3H", 3), ("KS", 4)]);
        let mut st = table(hand, vec![], vec![nat("5C", 5)]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3)]).unwrap();
        st.take_back(Seat::Bottom, CardId(2)).unwrap();
        assert_eq!(st.hand(Seat::Bottom).len(), 5);
        assert!(st.melds().is_empty());
    }

    #[test]
    fn legal_actions_list_discardable_cards() {
        let mut st = table(hand_of(&[("3C", 1), ("4H", 2)]), vec![nat("9S", 9)], vec![nat("5C", 3)]);
        let legal = st.legal_actions(Seat::Bottom);
        assert_eq!(legal.draw_sources, vec![DrawSource::Deck, DrawSource::Pack]);
        st.draw(Seat::Bottom, DrawSource::Pack).unwrap();
        let legal = st.legal_actions(Seat::Bottom);
        assert!(!legal.discardable.contains(&CardId(9)));
        assert!(legal.discardable.contains(&CardId(1)));
        assert!(st.legal_actions(Seat::Left).draw_sources.is_empty());
    }
}
