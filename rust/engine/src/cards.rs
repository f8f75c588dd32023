use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseCardError;

/// Represents one of the four suits. Two full decks are in play, so every
/// natural card exists twice.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Suit {
    /// Clubs suit (♣)
    Clubs,
    /// Diamonds suit (♦)
    Diamonds,
    /// Hearts suit (♥)
    Hearts,
    /// Spades suit (♠)
    Spades,
}

impl Suit {
    pub fn code(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }
}

/// Represents the rank of a natural card. Ordering is Ace-high, which is the
/// only ordering runs are checked against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    /// Rank 2
    Two = 2,
    /// Rank 3
    Three,
    /// Rank 4
    Four,
    /// Rank 5
    Five,
    /// Rank 6
    Six,
    /// Rank 7
    Seven,
    /// Rank 8
    Eight,
    /// Rank 9
    Nine,
    /// Rank 10
    Ten,
    /// Jack (11)
    Jack,
    /// Queen (12)
    Queen,
    /// King (13)
    King,
    /// Ace (14)
    Ace,
}

impl Rank {
    /// Maps a position in the Ace-high ordering back to a rank.
    /// Returns `None` outside `2..=14`.
    pub fn from_u8(v: u8) -> Option<Rank> {
        let r = match v {
            2 => Rank::Two,
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            11 => Rank::Jack,
            12 => Rank::Queen,
            13 => Rank::King,
            14 => Rank::Ace,
            _ => return None,
        };
        Some(r)
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Point value used for meld scoring and bot discard weighting.
    pub fn points(self) -> u32 {
        match self {
            Rank::Ace => 11,
            Rank::Jack | Rank::Queen | Rank::King => 10,
            other => other as u32,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

pub const JOKER_POINTS: u32 = 25;

/// Total cards in play: two 52-card decks plus two jokers.
pub const TOTAL_CARDS: usize = 106;

const NATURAL_CARDS: u8 = 104;

/// Stable identity of a physical card for the lifetime of a hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u8);

impl CardId {
    pub fn is_joker(self) -> bool {
        self.0 >= NATURAL_CARDS
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            write!(f, "joker_{}", self.0 - NATURAL_CARDS)
        } else {
            write!(f, "card_{}", self.0)
        }
    }
}

impl FromStr for CardId {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseCardError::InvalidId(s.to_string());
        if let Some(n) = s.strip_prefix("joker_") {
            let n: u8 = n.parse().map_err(|_| bad())?;
            if n > 1 {
                return Err(bad());
            }
            Ok(CardId(NATURAL_CARDS + n))
        } else if let Some(n) = s.strip_prefix("card_") {
            let n: u8 = n.parse().map_err(|_| bad())?;
            if n >= NATURAL_CARDS {
                return Err(bad());
            }
            Ok(CardId(n))
        } else {
            Err(bad())
        }
    }
}

/// The rank and suit a joker stands for while it sits in a meld.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub rank: Rank,
    pub suit: Suit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Face {
    Natural { rank: Rank, suit: Suit },
    Joker { binding: Option<Binding> },
}

/// A physical card. Naturals are immutable; a joker's binding is only
/// touched through [`Card::set_binding`] and [`Card::clear_binding`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    face: Face,
}

impl Card {
    pub fn natural(id: CardId, rank: Rank, suit: Suit) -> Self {
        Self {
            id,
            face: Face::Natural { rank, suit },
        }
    }

    pub fn joker(id: CardId) -> Self {
        Self {
            id,
            face: Face::Joker { binding: None },
        }
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn is_joker(&self) -> bool {
        matches!(self.face, Face::Joker { .. })
    }

    /// Rank and suit for naturals; `None` for jokers.
    pub fn natural_parts(&self) -> Option<(Rank, Suit)> {
        match self.face {
            Face::Natural { rank, suit } => Some((rank, suit)),
            Face::Joker { .. } => None,
        }
    }

    pub fn binding(&self) -> Option<Binding> {
        match self.face {
            Face::Joker { binding } => binding,
            Face::Natural { .. } => None,
        }
    }

    /// Rank this card counts as: its own for naturals, the bound rank for jokers.
    pub fn effective_rank(&self) -> Option<Rank> {
        match self.face {
            Face::Natural { rank, .. } => Some(rank),
            Face::Joker { binding } => binding.map(|b| b.rank),
        }
    }

    pub fn effective_suit(&self) -> Option<Suit> {
        match self.face {
            Face::Natural { suit, .. } => Some(suit),
            Face::Joker { binding } => binding.map(|b| b.suit),
        }
    }

    /// No-op on naturals.
    pub fn set_binding(&mut self, binding: Binding) {
        if let Face::Joker { binding: b } = &mut self.face {
            *b = Some(binding);
        }
    }

    pub fn clear_binding(&mut self) {
        if let Face::Joker { binding } = &mut self.face {
            *binding = None;
        }
    }

    pub fn points(&self) -> u32 {
        match self.face {
            Face::Natural { rank, .. } => rank.points(),
            Face::Joker { .. } => JOKER_POINTS,
        }
    }

    /// Display code such as `10H` or `JOKER`.
    pub fn code(&self) -> String {
        match self.face {
            Face::Natural { rank, suit } => format!("{}{}", rank.code(), suit.code()),
            Face::Joker { .. } => "JOKER".to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Parses a natural card code (`AC`, `10H`, `qs`) into its rank and suit.
pub fn parse_code(code: &str) -> Result<(Rank, Suit), ParseCardError> {
    let code = code.trim().to_ascii_uppercase();
    let bad = || ParseCardError::InvalidCode(code.clone());
    let suit_char = code.chars().last().ok_or_else(bad)?;
    let suit = match suit_char {
        'C' => Suit::Clubs,
        'D' => Suit::Diamonds,
        'H' => Suit::Hearts,
        'S' => Suit::Spades,
        _ => return Err(bad()),
    };
    let rank_part = &code[..code.len() - 1];
    let rank = all_ranks()
        .into_iter()
        .find(|r| r.code() == rank_part)
        .ok_or_else(bad)?;
    Ok((rank, suit))
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ]
}

/// Builds the 106-card pack in id order: two copies of each suit (Ace first,
/// then Two through King), followed by the two jokers.
pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(TOTAL_CARDS);
    let mut ranks = vec![Rank::Ace];
    ranks.extend(all_ranks().into_iter().filter(|r| *r != Rank::Ace));
    let mut id = 0u8;
    for _copy in 0..2 {
        for &s in &all_suits() {
            for &r in &ranks {
                v.push(Card::natural(CardId(id), r, s));
                id += 1;
            }
        }
    }
    v.push(Card::joker(CardId(NATURAL_CARDS)));
    v.push(Card::joker(CardId(NATURAL_CARDS + 1)));
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn full_deck_has_two_copies_and_two_jokers() {
        let deck = full_deck();
        assert_eq!(deck.len(), TOTAL_CARDS);
        let ids: HashSet<_> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), TOTAL_CARDS);
        assert_eq!(deck.iter().filter(|c| c.is_joker()).count(), 2);
        let aces_of_spades = deck
            .iter()
            .filter(|c| c.natural_parts() == Some((Rank::Ace, Suit::Spades)))
            .count();
        assert_eq!(aces_of_spades, 2);
    }

    #[test]
    fn points_follow_table() {
        let c = |r| Card::natural(CardId(0), r, Suit::Clubs);
        assert_eq!(c(Rank::Ace).points(), 11);
        assert_eq!(c(Rank::King).points(), 10);
        assert_eq!(c(Rank::Seven).points(), 7);
        assert_eq!(Card::joker(CardId(104)).points(), 25);
    }

    #[test]
    fn binding_is_ignored_on_naturals() {
        let mut c = Card::natural(CardId(3), Rank::Four, Suit::Clubs);
        c.set_binding(Binding {
            rank: Rank::Ace,
            suit: Suit::Spades,
        });
        assert_eq!(c.effective_rank(), Some(Rank::Four));
        assert_eq!(c.binding(), None);
    }

    #[test]
    fn card_id_round_trips_through_display() {
        for raw in [0u8, 57, 103, 104, 105] {
            let id = CardId(raw);
            assert_eq!(id.to_string().parse::<CardId>().unwrap(), id);
        }
        assert!("card_104".parse::<CardId>().is_err());
        assert!("joker_2".parse::<CardId>().is_err());
    }

    #[test]
    fn parse_code_accepts_ten_and_lowercase() {
        assert_eq!(parse_code("10h").unwrap(), (Rank::Ten, Suit::Hearts));
        assert_eq!(parse_code("AS").unwrap(), (Rank::Ace, Suit::Spades));
        assert!(parse_code("1H").is_err());
        assert!(parse_code("").is_err());
    }
}
