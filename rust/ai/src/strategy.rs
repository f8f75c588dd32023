//! Heuristic bot for all three difficulty tiers.
//!
//! Every tier uses the same meld search. Medium and hard bots may hold their
//! melds back once opened, and they avoid discarding cards an opponent is
//! collecting. Hard bots additionally scale that caution with each
//! opponent's threat level and sometimes play their second-best discard.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use kalooki_engine::cards::{Card, CardId};
use kalooki_engine::events::DrawSource;
use kalooki_engine::game::HandState;
use kalooki_engine::melds::{MeldGroup, TableCard};
use kalooki_engine::seat::{Difficulty, Seat};

use crate::candidates::{choose_opening_melds, fits_group, total_score, Candidate};
use crate::{BotContext, BotPlayer, GoerPlacement, TurnPlan};

/// Above this many cards a bot stops holding melds back.
const HOLD_LIMIT: usize = 9;
const SECOND_BEST_CHANCE: f64 = 0.15;
const NEED_PENALTY: i32 = 8;
const NEXT_SEAT_VETO: i32 = 100;
const JOKER_KEEP: i32 = 200;

/// How close an opponent is to going out, judged by its hand size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn from_hand_size(cards: usize) -> Self {
        match cards {
            0..=2 => ThreatLevel::Critical,
            3..=4 => ThreatLevel::High,
            5..=7 => ThreatLevel::Medium,
            _ => ThreatLevel::Low,
        }
    }

    fn multiplier(self) -> i32 {
        match self {
            ThreatLevel::Low => 1,
            ThreatLevel::Medium => 2,
            ThreatLevel::High => 3,
            ThreatLevel::Critical => 5,
        }
    }
}

/// Threat level of every other seat still in the hand.
pub fn opponent_threats(state: &HandState, seat: Seat) -> Vec<(Seat, ThreatLevel)> {
    state
        .active_seats()
        .into_iter()
        .filter(|s| *s != seat)
        .map(|s| (s, ThreatLevel::from_hand_size(state.hand(s).len())))
        .collect()
}

/// Whether `opponent` would likely use `card`, judged from public
/// information only: what it took from the pack and the melds it owns.
pub fn opponent_wants(state: &HandState, opponent: Seat, card: &Card) -> bool {
    let Some((rank, suit)) = card.natural_parts() else {
        return true;
    };
    let picked_up = state.pack_pickups().iter().filter(|p| p.seat == opponent).any(|p| {
        p.card.natural_parts().is_some_and(|(r, s)| {
            r == rank || (s == suit && (r.value() as i32 - rank.value() as i32).abs() <= 2)
        })
    });
    if picked_up {
        return true;
    }
    if !state.is_opened(opponent) {
        return false;
    }
    // An opened seat can play goers on any valid group.
    state
        .melds()
        .iter()
        .filter(|g| !g.locked && g.is_valid())
        .any(|g| fits_group(&g.plain_cards(), *card))
}

/// Rough count of hand cards that work with `card`: same rank, or same
/// suit within two ranks. Jokers work with everything.
pub fn utility(hand: &[Card], card: &Card) -> i32 {
    let Some((rank, suit)) = card.natural_parts() else {
        return JOKER_KEEP;
    };
    hand.iter()
        .filter(|c| c.id != card.id)
        .map(|c| match c.natural_parts() {
            None => 1,
            Some((r, s)) if r == rank && s != suit => 1,
            Some((r, s)) if s == suit && r != rank && (r.value() as i32 - rank.value() as i32).abs() <= 2 => 1,
            _ => 0,
        })
        .sum()
}

/// Heuristic bot parameterized by difficulty.
#[derive(Debug, Clone, Copy)]
pub struct StrategyBot {
    difficulty: Difficulty,
}

impl StrategyBot {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn rng(ctx: &BotContext<'_>) -> ChaCha8Rng {
        let turn = ctx.state.turn_id();
        let seed = ctx.seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ turn.rotate_left(17) ^ ctx.seat.index() as u64;
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// Hold melds back this turn? Only for opened medium/hard bots with a
    /// small hand and no opponent close to going out.
    fn should_hold(&self, state: &HandState, seat: Seat, hand_len: usize) -> bool {
        if hand_len > HOLD_LIMIT {
            return false;
        }
        let worst = opponent_threats(state, seat)
            .into_iter()
            .map(|(_, t)| t)
            .max()
            .unwrap_or(ThreatLevel::Low);
        match self.difficulty {
            Difficulty::Easy => false,
            Difficulty::Medium => worst == ThreatLevel::Low,
            Difficulty::Hard => worst <= ThreatLevel::Medium,
        }
    }

    /// Discard score; higher is more discardable.
    fn discard_score(&self, state: &HandState, seat: Seat, hand: &[Card], card: &Card) -> i32 {
        let mut score = card.points() as i32 - 2 * utility(hand, card);
        if self.difficulty == Difficulty::Easy {
            return score;
        }
        let next = next_active(state, seat);
        for (opp, threat) in opponent_threats(state, seat) {
            if !opponent_wants(state, opp, card) {
                continue;
            }
            let mut penalty = NEED_PENALTY;
            if Some(opp) == next {
                penalty += NEXT_SEAT_VETO;
            }
            if self.difficulty == Difficulty::Hard {
                penalty *= threat.multiplier();
            }
            score -= penalty;
        }
        score
    }

    fn choose_discard(&self, ctx: &BotContext<'_>, hand: &[Card]) -> Option<CardId> {
        let pack_card = ctx.state.turn().pack_card;
        let mut ranked: Vec<(i32, CardId)> = hand
            .iter()
            .filter(|c| Some(c.id) != pack_card)
            .map(|c| (self.discard_score(ctx.state, ctx.seat, hand, c), c.id))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        if self.difficulty == Difficulty::Hard && ranked.len() > 1 && Self::rng(ctx).random_bool(SECOND_BEST_CHANCE) {
            debug!(seat = %ctx.seat, "hard bot takes second-best discard");
            return Some(ranked[1].1);
        }
        ranked.first().map(|(_, id)| *id)
    }

    /// Greedy goer placement: own groups first, then everyone else's,
    /// repeated until nothing else fits. Returns the placements and the
    /// cards left in hand.
    fn plan_goers(&self, state: &HandState, seat: Seat, mut hand: Vec<Card>) -> (Vec<GoerPlacement>, Vec<Card>) {
        let mut groups: Vec<(Seat, MeldGroup)> = state
            .melds()
            .iter()
            .filter(|g| !g.locked && g.is_valid())
            .map(|g| (g.owner, g.clone()))
            .collect();
        groups.sort_by_key(|(owner, g)| (*owner != seat, g.id));
        let pack_card = state.turn().pack_card;
        let mut placements = Vec::new();
        loop {
            let mut placed = None;
            'search: for (hi, card) in hand.iter().enumerate() {
                if card.is_joker() || Some(card.id) == pack_card {
                    continue;
                }
                for (gi, (_, group)) in groups.iter().enumerate() {
                    if fits_group(&group.plain_cards(), *card) {
                        placed = Some((hi, gi));
                        break 'search;
                    }
                }
            }
            let Some((hi, gi)) = placed else {
                break;
            };
            let card = hand.remove(hi);
            let (owner, group) = &mut groups[gi];
            group.cards.push(TableCard {
                card,
                placed_by: seat,
                placed_turn: state.turn_id(),
                is_goer: *owner != seat,
            });
            group.reassign_jokers();
            placements.push(GoerPlacement {
                card: card.id,
                target_seat: *owner,
                group: group.id,
            });
        }
        (placements, hand)
    }
}

fn next_active(state: &HandState, seat: Seat) -> Option<Seat> {
    let mut s = seat.next();
    for _ in 0..3 {
        if !state.is_eliminated(s) {
            return Some(s);
        }
        s = s.next();
    }
    None
}

fn without(hand: &[Card], melds: &[Candidate]) -> Vec<Card> {
    hand.iter()
        .filter(|c| melds.iter().all(|m| !m.contains(c.id)))
        .copied()
        .collect()
}

impl BotPlayer for StrategyBot {
    /// Takes the pack card only when it completes a meld right away, and,
    /// before opening, only when that reaches the opening threshold.
    fn choose_draw(&self, ctx: &BotContext<'_>) -> DrawSource {
        let state = ctx.state;
        let legal = state.legal_actions(ctx.seat);
        if !legal.draw_sources.contains(&DrawSource::Pack) {
            return DrawSource::Deck;
        }
        let Some(top) = state.pack_top().copied() else {
            return DrawSource::Deck;
        };
        let mut hand = state.hand(ctx.seat).to_vec();
        hand.push(top);
        let max = state.config().max_initial_meld;
        let melds = choose_opening_melds(&hand, Some(top.id), max);
        if melds.is_empty() {
            return DrawSource::Deck;
        }
        // Opening needs a card left over to discard.
        let laid: usize = melds.iter().map(|m| m.cards.len()).sum();
        let qualifies = if state.is_opened(ctx.seat) {
            true
        } else {
            laid < hand.len() && total_score(&melds) >= state.config().opening_threshold
        };
        if qualifies { DrawSource::Pack } else { DrawSource::Deck }
    }

    fn plan_turn(&self, ctx: &BotContext<'_>) -> TurnPlan {
        let state = ctx.state;
        let seat = ctx.seat;
        let hand = state.hand(seat).to_vec();
        let pack_card = state.turn().pack_card;
        let max = state.config().max_initial_meld;
        let opened = state.is_opened(seat);

        let mut melds = choose_opening_melds(&hand, pack_card, max);
        // Leave at least one card unless already opened.
        while !opened && !melds.is_empty() && without(&hand, &melds).is_empty() {
            melds.pop();
        }
        if !opened && total_score(&melds) < state.config().opening_threshold {
            // Laying below the threshold would only be held back.
            melds.clear();
        }

        let going_out = without(&hand, &melds).len() <= 1;
        if opened && !going_out && self.should_hold(state, seat, hand.len()) {
            let keep = melds.iter().position(|m| pack_card.is_some_and(|p| m.contains(p)));
            melds = keep.map(|i| vec![melds[i].clone()]).unwrap_or_default();
            debug!(%seat, "holding melds back");
        }

        let rest = without(&hand, &melds);
        let (goers, rest) = if opened || total_score(&melds) >= state.config().opening_threshold {
            self.plan_goers(state, seat, rest)
        } else {
            (Vec::new(), rest)
        };
        let discard = if rest.is_empty() { None } else { self.choose_discard(ctx, &rest) };

        TurnPlan {
            melds: melds.into_iter().map(|m| m.cards).collect(),
            goers,
            discard,
        }
    }

    fn name(&self) -> &str {
        match self.difficulty {
            Difficulty::Easy => "EasyBot",
            Difficulty::Medium => "MediumBot",
            Difficulty::Hard => "HardBot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalooki_engine::cards::parse_code;
    use kalooki_engine::config::RuleConfig;
    use kalooki_engine::deck::Deck;
    use kalooki_engine::seat::SeatKind;

    fn nat(code: &str, id: u8) -> Card {
        let (r, s) = parse_code(code).unwrap();
        Card::natural(CardId(id), r, s)
    }

    fn filler(base: u8) -> Vec<Card> {
        vec![nat("2C", base), nat("5D", base + 1), nat("9H", base + 2), nat("KS", base + 3)]
    }

    /// Dealer is Right, so Bottom acts first.
    fn table(bottom: Vec<Card>, left: Vec<Card>, deck: Vec<Card>, pack: Vec<Card>) -> HandState {
        HandState::from_parts(
            RuleConfig::default(),
            [SeatKind::Bot(Difficulty::Medium); 4],
            Seat::Right,
            Deck::from_cards(deck, 3),
            pack,
            [bottom, left, filler(70), filler(80)],
        )
    }

    fn ctx(state: &HandState) -> BotContext<'_> {
        BotContext::new(state, state.current_seat(), 11)
    }

    #[test]
    fn threat_levels_follow_hand_size() {
        assert_eq!(ThreatLevel::from_hand_size(1), ThreatLevel::Critical);
        assert_eq!(ThreatLevel::from_hand_size(2), ThreatLevel::Critical);
        assert_eq!(ThreatLevel::from_hand_size(4), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_hand_size(7), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_hand_size(13), ThreatLevel::Low);
    }

    #[test]
    fn utility_counts_related_cards() {
        let hand = vec![nat("7C", 1), nat("7D", 2), nat("8C", 3), nat("KH", 4)];
        assert_eq!(utility(&hand, &hand[0]), 2);
        assert_eq!(utility(&hand, &hand[3]), 0);
        assert_eq!(utility(&hand, &Card::joker(CardId(104))), JOKER_KEEP);
    }

    #[test]
    fn pack_draw_only_when_it_opens() {
        let bottom = vec![nat("KC", 1), nat("KD", 2), nat("QH", 3), nat("QS", 4), nat("QC", 5), nat("2D", 6), nat("7S", 7)];
        let st = table(bottom.clone(), filler(60), vec![nat("3C", 30)], vec![nat("KH", 10)]);
        let bot = StrategyBot::new(Difficulty::Medium);
        assert_eq!(bot.choose_draw(&ctx(&st)), DrawSource::Pack);

        let st = table(bottom, filler(60), vec![nat("3C", 30)], vec![nat("9H", 10)]);
        assert_eq!(bot.choose_draw(&ctx(&st)), DrawSource::Deck);
    }

    #[test]
    fn unopened_bot_lays_nothing_below_threshold() {
        let bottom = vec![nat("2C", 1), nat("2D", 2), nat("2H", 3), nat("9S", 4), nat("KD", 5)];
        let mut st = table(bottom, filler(60), vec![nat("4C", 30)], vec![]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        let plan = StrategyBot::new(Difficulty::Easy).plan_turn(&ctx(&st));
        assert!(plan.melds.is_empty());
        assert!(plan.goers.is_empty());
        assert!(plan.discard.is_some());
    }

    #[test]
    fn opening_plan_lays_melds_and_keeps_a_discard() {
        let bottom = vec![nat("KC", 1), nat("KD", 2), nat("KH", 3), nat("QS", 4), nat("QC", 5), nat("QD", 6), nat("7S", 7)];
        let mut st = table(bottom, filler(60), vec![nat("3C", 30)], vec![]);
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        let plan = StrategyBot::new(Difficulty::Hard).plan_turn(&ctx(&st));
        assert_eq!(plan.melds.len(), 2);
        let discard = plan.discard.expect("a discard");
        assert!(discard == CardId(7) || discard == CardId(30));
    }

    /// Left opens with a queen set (g_0) and a king set (g_1), then Bottom
    /// draws 9C. KS is left on the deck.
    fn left_opened() -> HandState {
        let bottom = vec![nat("QS", 1), nat("3D", 2), nat("8H", 3), nat("5C", 4)];
        let left = vec![nat("QC", 20), nat("QD", 21), nat("QH", 22), nat("KC", 23), nat("KD", 24), nat("KH", 25), nat("4S", 26)];
        let deck = vec![nat("KS", 49), nat("9C", 50), nat("9D", 51), nat("9H", 52), nat("6S", 53), nat("2H", 54)];
        let mut st = table(bottom, left, deck, vec![]);

        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st.discard(Seat::Bottom, CardId(54)).unwrap();
        st.draw(Seat::Left, DrawSource::Deck).unwrap();
        st.lay_meld(Seat::Left, &[CardId(20), CardId(21), CardId(22)]).unwrap();
        st.lay_meld(Seat::Left, &[CardId(23), CardId(24), CardId(25)]).unwrap();
        st.discard(Seat::Left, CardId(26)).unwrap();
        for seat in [Seat::Top, Seat::Right] {
            st.draw(seat, DrawSource::Deck).unwrap();
            let drawn = st.hand(seat).last().unwrap().id;
            st.discard(seat, drawn).unwrap();
        }
        st.draw(Seat::Bottom, DrawSource::Deck).unwrap();
        st
    }

    #[test]
    fn easy_bot_throws_its_highest_card() {
        let st = left_opened();
        assert!(st.is_opened(Seat::Left));
        let plan = StrategyBot::new(Difficulty::Easy).plan_turn(&ctx(&st));
        assert_eq!(plan.discard, Some(CardId(1)));
    }

    #[test]
    fn medium_bot_keeps_card_the_next_seat_needs() {
        let st = left_opened();
        let plan = StrategyBot::new(Difficulty::Medium).plan_turn(&ctx(&st));
        assert_eq!(plan.discard, Some(CardId(50)));
    }

    #[test]
    fn hard_bot_plans_are_reproducible() {
        let st = left_opened();
        let bot = StrategyBot::new(Difficulty::Hard);
        assert_eq!(bot.plan_turn(&ctx(&st)), bot.plan_turn(&ctx(&st)));
    }

    #[test]
    fn opened_bot_places_goers() {
        let mut st = left_opened();
        st.discard(Seat::Bottom, CardId(2)).unwrap();
        st.draw(Seat::Left, DrawSource::Deck).unwrap();
        let left = ctx(&st);
        assert_eq!(left.seat, Seat::Left);
        // Left holds 6S and the KS it just drew.
        let plan = StrategyBot::new(Difficulty::Easy).plan_turn(&left);
        assert_eq!(
            plan.goers,
            vec![GoerPlacement {
                card: CardId(49),
                target_seat: Seat::Left,
                group: kalooki_engine::melds::GroupId(1),
            }]
        );
        assert_eq!(plan.discard, Some(CardId(53)));
    }
}
