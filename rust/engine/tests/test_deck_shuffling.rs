use std::collections::{HashMap, HashSet};

use kalooki_engine::cards::{full_deck, Card, CardId, TOTAL_CARDS};
use kalooki_engine::deck::Deck;

fn draw_all(deck: &mut Deck) -> Vec<Card> {
    std::iter::from_fn(|| deck.draw()).collect()
}

#[test]
fn shuffled_deck_has_106_unique_cards() {
    let mut deck = Deck::new_with_seed(42);
    deck.shuffle();
    let cards = draw_all(&mut deck);
    assert_eq!(cards.len(), TOTAL_CARDS);
    let ids: HashSet<CardId> = cards.iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), TOTAL_CARDS);
    assert!(deck.draw().is_none(), "deck should be empty after 106 draws");
}

#[test]
fn every_natural_appears_twice_and_two_jokers() {
    let mut faces: HashMap<String, usize> = HashMap::new();
    for c in full_deck() {
        *faces.entry(c.code()).or_default() += 1;
    }
    assert_eq!(faces.get("JOKER"), Some(&2));
    assert_eq!(faces.get("AS"), Some(&2));
    assert_eq!(faces.get("10H"), Some(&2));
    assert_eq!(faces.len(), 53);
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let mut d1 = Deck::new_with_seed(12345);
    let mut d2 = Deck::new_with_seed(12345);
    d1.shuffle();
    d2.shuffle();
    let a: Vec<Card> = (0..10).map(|_| d1.draw().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.draw().unwrap()).collect();
    assert_eq!(a, b, "same seed must yield identical order");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let mut d1 = Deck::new_with_seed(1);
    let mut d2 = Deck::new_with_seed(2);
    d1.shuffle();
    d2.shuffle();
    let a: Vec<Card> = (0..10).map(|_| d1.draw().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.draw().unwrap()).collect();
    assert_ne!(
        a, b,
        "different seeds should produce different orders (high probability)"
    );
}

#[test]
fn replenish_keeps_every_card() {
    let mut deck = Deck::new_with_seed(9);
    deck.shuffle();
    let taken: Vec<Card> = (0..40).map(|_| deck.draw().unwrap()).collect();
    deck.replenish(taken);
    assert_eq!(deck.remaining(), TOTAL_CARDS);
    let ids: HashSet<CardId> = draw_all(&mut deck).iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), TOTAL_CARDS);
}
