use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseCardError;

/// A position at the four-seat table. Play proceeds clockwise
/// bottom → left → top → right → bottom.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    Bottom,
    Left,
    Top,
    Right,
}

impl Seat {
    pub const ALL: [Seat; 4] = [Seat::Bottom, Seat::Left, Seat::Top, Seat::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Seat {
        Seat::ALL[i % 4]
    }

    /// The seat that acts after this one, ignoring eliminations.
    pub fn next(self) -> Seat {
        Seat::from_index(self.index() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seat::Bottom => "bottom",
            Seat::Left => "left",
            Seat::Top => "top",
            Seat::Right => "right",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Seat {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom" | "b" => Ok(Seat::Bottom),
            "left" | "l" => Ok(Seat::Left),
            "top" | "t" => Ok(Seat::Top),
            "right" | "r" => Ok(Seat::Right),
            other => Err(ParseCardError::InvalidSeat(other.to_string())),
        }
    }
}

/// Strength tier of an automated seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

/// Who drives a seat. The engine only uses this to apply the
/// bot elimination exemption; decisions come from outside.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "difficulty", rename_all = "lowercase")]
pub enum SeatKind {
    Human,
    Bot(Difficulty),
}

impl SeatKind {
    pub fn is_bot(self) -> bool {
        matches!(self, SeatKind::Bot(_))
    }
}
