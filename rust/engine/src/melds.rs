//! Meld legality: set/run classification, scoring and joker binding.
//!
//! All checks read a joker through its binding when it has one. An unbound
//! joker is treated as free to fill whatever slot the naturals leave, so a
//! candidate group can be judged before [`assign_all_joker_representations`]
//! has run on it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::cards::{all_suits, Binding, Card, CardId, Rank, Suit};
use crate::seat::Seat;

pub const MIN_MELD: usize = 3;
/// Cap on a freshly laid meld. Goers may grow a meld past it.
pub const MAX_INITIAL_MELD: usize = 5;
pub const MAX_SET_JOKERS: usize = 1;
pub const MAX_RUN_JOKERS: usize = 2;

const LOWEST_RUN_RANK: u8 = Rank::Two as u8;
const HIGHEST_RUN_RANK: u8 = Rank::Ace as u8;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g_{}", self.0)
    }
}

impl std::str::FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("g_").unwrap_or(s);
        digits
            .parse()
            .map(GroupId)
            .map_err(|_| format!("invalid group id: {}", s))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeldKind {
    Set,
    Run,
}

fn size_ok(len: usize, allow_extended: bool) -> bool {
    len >= MIN_MELD && (allow_extended || len <= MAX_INITIAL_MELD)
}

fn split(cards: &[Card]) -> (Vec<(Rank, Suit)>, Vec<&Card>) {
    let mut naturals = Vec::new();
    let mut jokers = Vec::new();
    for c in cards {
        match c.natural_parts() {
            Some(p) => naturals.push(p),
            None => jokers.push(c),
        }
    }
    (naturals, jokers)
}

/// Same rank, distinct suits, at most one joker.
pub fn is_valid_set(cards: &[Card], allow_extended: bool) -> bool {
    if !size_ok(cards.len(), allow_extended) {
        return false;
    }
    let (naturals, jokers) = split(cards);
    let Some(&(rank, _)) = naturals.first() else {
        return false;
    };
    if jokers.len() > MAX_SET_JOKERS {
        return false;
    }
    let mut suits = BTreeSet::new();
    for &(r, s) in &naturals {
        if r != rank || !suits.insert(s) {
            return false;
        }
    }
    for j in jokers {
        match j.binding() {
            Some(b) => {
                if b.rank != rank || !suits.insert(b.suit) {
                    return false;
                }
            }
            None => {
                if suits.len() >= all_suits().len() {
                    return false;
                }
                // Reserve one of the absent suits for it.
                if let Some(free) = all_suits().into_iter().find(|s| !suits.contains(s)) {
                    suits.insert(free);
                }
            }
        }
    }
    true
}

/// Same suit, distinct Ace-high ranks forming one contiguous stretch, at
/// most two jokers.
pub fn is_valid_run(cards: &[Card], allow_extended: bool) -> bool {
    if !size_ok(cards.len(), allow_extended) {
        return false;
    }
    let (naturals, jokers) = split(cards);
    let Some(&(_, suit)) = naturals.first() else {
        return false;
    };
    if jokers.len() > MAX_RUN_JOKERS {
        return false;
    }
    let mut positions = BTreeSet::new();
    for &(r, s) in &naturals {
        if s != suit || !positions.insert(r.value()) {
            return false;
        }
    }
    let mut unbound = 0usize;
    for j in jokers {
        match j.binding() {
            Some(b) => {
                if b.suit != suit || !positions.insert(b.rank.value()) {
                    return false;
                }
            }
            None => unbound += 1,
        }
    }
    let (Some(&lo), Some(&hi)) = (positions.first(), positions.last()) else {
        return false;
    };
    let span = (hi - lo + 1) as usize;
    let gaps = span - positions.len();
    let total = positions.len() + unbound;
    let available = (HIGHEST_RUN_RANK - LOWEST_RUN_RANK + 1) as usize;
    gaps <= unbound && total <= available
}

/// Exactly one of set or run, or `None` for an invalid group.
pub fn classify(cards: &[Card], allow_extended: bool) -> Option<MeldKind> {
    if is_valid_set(cards, allow_extended) {
        Some(MeldKind::Set)
    } else if is_valid_run(cards, allow_extended) {
        Some(MeldKind::Run)
    } else {
        None
    }
}

/// Sum of card points, or 0 when the group is neither a set nor a run.
pub fn score_group(cards: &[Card], allow_extended: bool) -> u32 {
    if classify(cards, allow_extended).is_none() {
        return 0;
    }
    cards.iter().map(Card::points).sum()
}

/// Group type implied by the natural cards alone. Jokers never decide it.
pub fn infer_kind(cards: &[Card]) -> Option<MeldKind> {
    let (naturals, jokers) = split(cards);
    match naturals.as_slice() {
        [] => None,
        [_] => {
            if jokers.len() > MAX_SET_JOKERS {
                Some(MeldKind::Run)
            } else {
                Some(MeldKind::Set)
            }
        }
        [(r0, s0), rest @ ..] => {
            if rest.iter().all(|(r, _)| r == r0) {
                Some(MeldKind::Set)
            } else if rest.iter().all(|(_, s)| s == s0) {
                Some(MeldKind::Run)
            } else {
                None
            }
        }
    }
}

/// Binds the joker at `idx` to the card it stands for, judged from the
/// naturals plus any other joker already bound. Clears the binding when no
/// slot can be inferred. Calling it twice yields the same binding.
///
/// Runs fill the lowest internal gap first, then extend the low end, then the
/// high end. Preferring the low end is a fixed house policy.
pub fn assign_joker_representation(cards: &mut [Card], idx: usize) {
    if !cards.get(idx).is_some_and(Card::is_joker) {
        return;
    }
    let binding = infer_binding(cards, idx);
    let joker = &mut cards[idx];
    match binding {
        Some(b) => joker.set_binding(b),
        None => joker.clear_binding(),
    }
}

fn infer_binding(cards: &[Card], idx: usize) -> Option<Binding> {
    let (naturals, _) = split(cards);
    let others: Vec<Binding> = cards
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != idx && c.is_joker())
        .filter_map(|(_, c)| c.binding())
        .collect();
    match infer_kind(cards)? {
        MeldKind::Set => {
            let (rank, _) = naturals[0];
            let taken: BTreeSet<Suit> = naturals
                .iter()
                .map(|&(_, s)| s)
                .chain(others.iter().map(|b| b.suit))
                .collect();
            let suit = all_suits().into_iter().find(|s| !taken.contains(s))?;
            Some(Binding { rank, suit })
        }
        MeldKind::Run => {
            let (_, suit) = naturals[0];
            let occupied: BTreeSet<u8> = naturals
                .iter()
                .map(|&(r, _)| r.value())
                .chain(others.iter().map(|b| b.rank.value()))
                .collect();
            let lo = *occupied.first()?;
            let hi = *occupied.last()?;
            let slot = (lo..=hi)
                .find(|v| !occupied.contains(v))
                .or_else(|| (lo > LOWEST_RUN_RANK).then(|| lo - 1))
                .or_else(|| (hi < HIGHEST_RUN_RANK).then(|| hi + 1))?;
            Some(Binding {
                rank: Rank::from_u8(slot)?,
                suit,
            })
        }
    }
}

/// Recomputes every joker binding in the group from scratch. Must run after
/// any structural change to a group.
pub fn assign_all_joker_representations(cards: &mut [Card]) {
    for c in cards.iter_mut() {
        c.clear_binding();
    }
    for i in 0..cards.len() {
        if cards[i].is_joker() {
            assign_joker_representation(cards, i);
        }
    }
}

/// A card on the table together with who put it there and when.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableCard {
    pub card: Card,
    pub placed_by: Seat,
    pub placed_turn: u64,
    pub is_goer: bool,
}

/// A laid meld. Cards stay in the owner's group even when another seat added
/// them as goers.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MeldGroup {
    pub id: GroupId,
    pub owner: Seat,
    pub cards: Vec<TableCard>,
    /// Set when the group was found invalid at an elimination. Locked groups
    /// take no further cards and are exempt from the validity invariant.
    #[serde(default)]
    pub locked: bool,
}

impl MeldGroup {
    pub fn new(id: GroupId, owner: Seat) -> Self {
        Self {
            id,
            owner,
            cards: Vec::new(),
            locked: false,
        }
    }

    pub fn plain_cards(&self) -> Vec<Card> {
        self.cards.iter().map(|t| t.card).collect()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|t| t.card.id == id)
    }

    pub fn position(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|t| t.card.id == id)
    }

    pub fn classify(&self) -> Option<MeldKind> {
        classify(&self.plain_cards(), true)
    }

    pub fn is_valid(&self) -> bool {
        self.classify().is_some()
    }

    pub fn score(&self) -> u32 {
        score_group(&self.plain_cards(), true)
    }

    pub fn laid_by(&self, seat: Seat) -> bool {
        self.cards.iter().any(|t| t.placed_by == seat)
    }

    /// Re-derives joker bindings after cards were added, removed or moved.
    pub fn reassign_jokers(&mut self) {
        let mut plain = self.plain_cards();
        assign_all_joker_representations(&mut plain);
        for (slot, card) in self.cards.iter_mut().zip(plain) {
            slot.card = card;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_code;

    fn nat(code: &str, id: u8) -> Card {
        let (r, s) = parse_code(code).unwrap();
        Card::natural(CardId(id), r, s)
    }

    fn joker(n: u8) -> Card {
        Card::joker(CardId(104 + n))
    }

    #[test]
    fn three_threes_form_a_set_worth_nine() {
        let g = [nat("3C", 0), nat("3D", 1), nat("3H", 2)];
        assert!(is_valid_set(&g, false));
        assert!(!is_valid_run(&g, false));
        assert_eq!(score_group(&g, false), 9);
    }

    #[test]
    fn five_six_seven_of_clubs_form_a_run_worth_eighteen() {
        let g = [nat("5C", 0), nat("6C", 1), nat("7C", 2)];
        assert!(is_valid_run(&g, false));
        assert!(!is_valid_set(&g, false));
        assert_eq!(score_group(&g, false), 18);
    }

    #[test]
    fn joker_in_pair_of_threes_binds_to_missing_suit() {
        let mut g = [nat("3C", 0), nat("3D", 1), joker(0)];
        assign_all_joker_representations(&mut g);
        let b = g[2].binding().expect("joker bound");
        assert_eq!(b.rank, Rank::Three);
        assert!(b.suit != Suit::Clubs && b.suit != Suit::Diamonds);
        assert_eq!(b.suit, Suit::Hearts);
        assert!(is_valid_set(&g, false));
        assert_eq!(score_group(&g, false), 31);
    }

    #[test]
    fn set_rejects_duplicate_suit_from_second_deck() {
        let g = [nat("9S", 0), nat("9S", 52), nat("9H", 1)];
        assert!(!is_valid_set(&g, false));
        assert_eq!(classify(&g, false), None);
    }

    #[test]
    fn set_allows_only_one_joker() {
        let g = [nat("9S", 0), joker(0), joker(1)];
        assert!(!is_valid_set(&g, false));
        // Two jokers around a single natural still make a run.
        assert!(is_valid_run(&g, false));
    }

    #[test]
    fn four_naturals_leave_no_suit_for_a_joker() {
        let g = [
            nat("KC", 0),
            nat("KD", 1),
            nat("KH", 2),
            nat("KS", 3),
            joker(0),
        ];
        assert!(!is_valid_set(&g, false));
    }

    #[test]
    fn run_is_ace_high_only() {
        let high = [nat("QH", 0), nat("KH", 1), nat("AH", 2)];
        assert!(is_valid_run(&high, false));
        let wrap = [nat("KH", 0), nat("AH", 1), nat("2H", 2)];
        assert!(!is_valid_run(&wrap, false));
        let low = [nat("AH", 0), nat("2H", 1), nat("3H", 2)];
        assert!(!is_valid_run(&low, false));
    }

    #[test]
    fn run_joker_fills_internal_gap_first() {
        let mut g = [nat("5C", 0), nat("7C", 1), joker(0)];
        assign_all_joker_representations(&mut g);
        assert_eq!(
            g[2].binding(),
            Some(Binding {
                rank: Rank::Six,
                suit: Suit::Clubs
            })
        );
    }

    #[test]
    fn run_joker_extends_low_end_before_high_end() {
        let mut g = [nat("5C", 0), nat("6C", 1), joker(0)];
        assign_all_joker_representations(&mut g);
        assert_eq!(g[2].effective_rank(), Some(Rank::Four));

        let mut at_bottom = [nat("2C", 0), nat("3C", 1), joker(0)];
        assign_all_joker_representations(&mut at_bottom);
        assert_eq!(at_bottom[2].effective_rank(), Some(Rank::Four));
    }

    #[test]
    fn two_jokers_take_distinct_positions() {
        let mut g = [nat("5C", 0), nat("8C", 1), joker(0), joker(1)];
        assign_all_joker_representations(&mut g);
        assert_eq!(g[2].effective_rank(), Some(Rank::Six));
        assert_eq!(g[3].effective_rank(), Some(Rank::Seven));
        assert!(is_valid_run(&g, false));
    }

    #[test]
    fn run_rejects_gap_wider_than_jokers() {
        let g = [nat("5C", 0), nat("9C", 1), joker(0)];
        assert!(!is_valid_run(&g, false));
    }

    #[test]
    fn stale_binding_conflicting_with_natural_is_invalid_until_reassigned() {
        let mut g = vec![nat("5C", 0), nat("6C", 1), joker(0)];
        assign_all_joker_representations(&mut g);
        assert_eq!(g[2].effective_rank(), Some(Rank::Four));
        g.push(nat("4C", 2));
        assert!(!is_valid_run(&g, false));
        assign_all_joker_representations(&mut g);
        assert_eq!(g[2].effective_rank(), Some(Rank::Three));
        assert!(is_valid_run(&g, false));
    }

    #[test]
    fn assignment_is_idempotent() {
        let mut g = [nat("10D", 0), joker(0), nat("QD", 1), joker(1)];
        assign_all_joker_representations(&mut g);
        let first = g;
        assign_all_joker_representations(&mut g);
        assert_eq!(first, g);
    }

    #[test]
    fn all_joker_group_is_never_assignable() {
        let mut g = [joker(0), joker(1)];
        assign_all_joker_representations(&mut g);
        assert!(g.iter().all(|c| c.binding().is_none()));
        assert_eq!(infer_kind(&g), None);
    }

    #[test]
    fn initial_cap_applies_unless_extended() {
        let g: Vec<Card> = ["4S", "5S", "6S", "7S", "8S", "9S"]
            .iter()
            .enumerate()
            .map(|(i, c)| nat(c, i as u8))
            .collect();
        assert!(!is_valid_run(&g, false));
        assert!(is_valid_run(&g, true));
    }

    #[test]
    fn mixed_naturals_have_no_kind() {
        let g = [nat("5C", 0), nat("6D", 1), joker(0)];
        assert_eq!(infer_kind(&g), None);
        assert_eq!(classify(&g, false), None);
        assert_eq!(score_group(&g, false), 0);
    }
}
