//! Meld search over a hand.
//!
//! Every subset of the hand is enumerated with a bitmask and checked against
//! the engine's legality rules, which costs `2^n` masks for `n` cards. A
//! default deal leaves at most fourteen cards in hand (16 384 masks). Only
//! the first [`SEARCH_LIMIT`] cards are searched, which bounds a search at
//! 65 536 masks when a larger configured deal is in play.

use kalooki_engine::cards::{Card, CardId};
use kalooki_engine::melds::{assign_all_joker_representations, classify, score_group, MIN_MELD};

/// Hand positions covered by the meld search.
pub const SEARCH_LIMIT: usize = 16;

/// A group of hand cards that forms a valid set or run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub cards: Vec<CardId>,
    pub score: u32,
}

impl Candidate {
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains(&id)
    }

    fn overlaps(&self, other: &Candidate) -> bool {
        self.cards.iter().any(|id| other.contains(*id))
    }
}

/// Every valid new meld of `MIN_MELD..=max_size` cards in `hand`, best
/// score first. Ties go to the group using fewer cards, then to the lower
/// card ids. Cards past [`SEARCH_LIMIT`] are not considered.
pub fn find_candidate_melds(hand: &[Card], max_size: usize) -> Vec<Candidate> {
    let n = hand.len().min(SEARCH_LIMIT);
    let mut found = Vec::new();
    for mask in 1u32..(1u32 << n) {
        let size = mask.count_ones() as usize;
        if size < MIN_MELD || size > max_size {
            continue;
        }
        let cards: Vec<Card> = (0..n).filter(|i| mask & (1 << i) != 0).map(|i| hand[i]).collect();
        if classify(&cards, false).is_none() {
            continue;
        }
        found.push(Candidate {
            cards: cards.iter().map(|c| c.id).collect(),
            score: score_group(&cards, false),
        });
    }
    found.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.cards.len().cmp(&b.cards.len()))
            .then_with(|| a.cards.cmp(&b.cards))
    });
    found
}

/// Picks non-overlapping melds greedily by score. When `required` is given,
/// the best meld containing it is taken first; if no meld contains it the
/// result is empty.
pub fn choose_opening_melds(hand: &[Card], required: Option<CardId>, max_size: usize) -> Vec<Candidate> {
    let all = find_candidate_melds(hand, max_size);
    let mut chosen: Vec<Candidate> = Vec::new();
    if let Some(req) = required {
        match all.iter().find(|c| c.contains(req)) {
            Some(first) => chosen.push(first.clone()),
            None => return Vec::new(),
        }
    }
    for cand in all {
        if chosen.iter().all(|c| !c.overlaps(&cand)) {
            chosen.push(cand);
        }
    }
    chosen
}

pub fn total_score(melds: &[Candidate]) -> u32 {
    melds.iter().map(|c| c.score).sum()
}

/// Whether `card` can join `group` and leave it a valid meld.
pub fn fits_group(group: &[Card], card: Card) -> bool {
    let mut cards = group.to_vec();
    cards.push(card);
    assign_all_joker_representations(&mut cards);
    classify(&cards, true).is_some()
}
