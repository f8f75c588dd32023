use tracing::info;

use crate::events::{DrawSource, EliminationReason, GameEvent};
use crate::game::{HandState, Phase};
use crate::melds::GroupId;
use crate::seat::Seat;

impl HandState {
    /// Groups holding a card laid by `seat` that are neither a set nor a run.
    /// Locked groups were already judged and are skipped.
    pub fn invalid_groups_laid_by(&self, seat: Seat) -> Vec<GroupId> {
        self.melds
            .iter()
            .filter(|g| !g.locked && g.laid_by(seat) && !g.is_valid())
            .map(|g| g.id)
            .collect()
    }

    /// Post-discard checks for `seat`. The pack-draw rule is checked first,
    /// then meld validity. Returns true when the seat is out of the hand.
    pub(crate) fn run_elimination_checks(&mut self, seat: Seat, events: &mut Vec<GameEvent>) -> bool {
        if self.config.bots_exempt_from_elimination && self.seat_kind(seat).is_bot() {
            return false;
        }
        let drew_pack = self.turn.phase == Phase::Drawn { source: DrawSource::Pack };
        if drew_pack && !self.is_opened(seat) {
            self.eliminate(seat, EliminationReason::PackDrawUnopened, Vec::new(), events);
            return true;
        }
        let invalid = self.invalid_groups_laid_by(seat);
        if !invalid.is_empty() {
            self.eliminate(seat, EliminationReason::InvalidMeld, invalid, events);
            return true;
        }
        false
    }

    /// Removes `seat` from the hand. Invalid groups stay on the table,
    /// locked; the seat's hand goes under the pack.
    fn eliminate(&mut self, seat: Seat, reason: EliminationReason, invalid_groups: Vec<GroupId>, events: &mut Vec<GameEvent>) {
        for g in self.melds.iter_mut().filter(|g| invalid_groups.contains(&g.id)) {
            g.locked = true;
        }
        let mut cards = std::mem::take(&mut self.hands[seat.index()]);
        for c in cards.iter_mut() {
            c.clear_binding();
        }
        let cards_to_pack = cards.len();
        cards.append(&mut self.pack);
        self.pack = cards;
        self.eliminated[seat.index()] = true;
        info!(%seat, ?reason, groups = invalid_groups.len(), cards_to_pack, "seat eliminated");
        events.push(GameEvent::Eliminated {
            seat,
            reason,
            invalid_groups,
            cards_to_pack,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::cards::{parse_code, Card, CardId};
    use crate::config::RuleConfig;
    use crate::deck::Deck;
    use crate::events::{DrawSource, EliminationReason, GameEvent};
    use crate::game::HandState;
    use crate::seat::{Difficulty, Seat, SeatKind};

    fn nat(code: &str, id: u8) -> Card {
        let (r, s) = parse_code(code).unwrap();
        Card::natural(CardId(id), r, s)
    }

    fn table(bottom_kind: SeatKind, bottom: Vec<Card>, pack: Vec<Card>) -> HandState {
        let filler = |b: u8| vec![nat("2C", b), nat("5D", b + 1), nat("KS", b + 2)];
        let mut kinds = [SeatKind::Human; 4];
        kinds[0] = bottom_kind;
        HandState::from_parts(
            RuleConfig::default(),
            kinds,
            Seat::Right,
            Deck::from_cards(vec![nat("4S", 30)], 1),
            pack,
            [bottom, filler(60), filler(70), filler(80)],
        )
    }

    #[test]
    fn unopened_pack_draw_eliminates_and_feeds_pack_bottom() {
        let mut st = table(
            SeatKind::Human,
            vec![nat("3C", 1), nat("8D", 2), nat("JH", 3)],
            vec![nat("AS", 10), nat("7C", 11)],
        );
        st.draw(Seat::Bottom, DrawSource::Pack).unwrap();
        let events = st.discard(Seat::Bottom, CardId(1)).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Eliminated {
                reason: EliminationReason::PackDrawUnopened,
                cards_to_pack: 3,
                ..
            }
        )));
        assert!(st.is_eliminated(Seat::Bottom));
        assert!(st.hand(Seat::Bottom).is_empty());
        // Hand goes under the pack; the discard stays on top.
        assert_eq!(st.pack()[0].id, CardId(2));
        assert_eq!(st.pack_top().map(|c| c.id), Some(CardId(1)));
        assert_eq!(st.current_seat(), Seat::Left);
    }

    #[test]
    fn bots_are_exempt_by_default() {
        let mut st = table(
            SeatKind::Bot(Difficulty::Easy),
            vec![nat("3C", 1), nat("8D", 2), nat("JH", 3)],
            vec![nat("7C", 11)],
        );
        st.draw(Seat::Bottom, DrawSource::Pack).unwrap();
        st.discard(Seat::Bottom, CardId(1)).unwrap();
        assert!(!st.is_eliminated(Seat::Bottom));
    }

    #[test]
    fn invalid_meld_is_locked_in_place() {
        let hand = vec![
            nat("QC", 1),
            nat("QD", 2),
            nat("QH", 3),
            nat("KC", 4),
            nat("KD", 5),
            nat("2S", 6),
            nat("9H", 7),
        ];
        let mut st = table(SeatKind::Human, hand, vec![]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Bottom, &[CardId(1), CardId(2), CardId(3)]).unwrap();
        // K K 2 passes the shape check but is not a meld.
        st.lay_meld(Seat::Bottom, &[CardId(4), CardId(5), CardId(6)]).unwrap();
        st.opened[Seat::Bottom.index()] = true;
        let events = st.discard(Seat::Bottom, CardId(7)).unwrap();
        let Some(GameEvent::Eliminated { invalid_groups, .. }) =
            events.iter().find(|e| matches!(e, GameEvent::Eliminated { .. }))
        else {
            panic!("expected elimination");
        };
        assert_eq!(invalid_groups.len(), 1);
        let locked = st.group(invalid_groups[0]).unwrap();
        assert!(locked.locked);
        assert_eq!(locked.cards.len(), 3);
    }
}
