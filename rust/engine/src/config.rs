use serde::{Deserialize, Serialize};

use crate::melds::MAX_INITIAL_MELD;

/// Table rules that a host may tune. Defaults are the house rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Meld points a seat must lay in one turn before it counts as opened.
    pub opening_threshold: u32,
    /// Cards dealt to each seat.
    pub hand_size: usize,
    /// Largest group accepted by a fresh `lay_meld`.
    pub max_initial_meld: usize,
    /// Votes needed to re-deal the current hand.
    pub restart_votes_needed: usize,
    /// Bots skip the post-discard elimination checks.
    pub bots_exempt_from_elimination: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            opening_threshold: 40,
            hand_size: 13,
            max_initial_meld: MAX_INITIAL_MELD,
            restart_votes_needed: 3,
            bots_exempt_from_elimination: true,
        }
    }
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.hand_size == 0 || self.hand_size * 4 >= crate::cards::TOTAL_CARDS {
            return Err(format!("hand_size {} does not fit the deck", self.hand_size));
        }
        if self.max_initial_meld < crate::melds::MIN_MELD {
            return Err("max_initial_meld must be at least 3".into());
        }
        if self.restart_votes_needed == 0 || self.restart_votes_needed > 4 {
            return Err("restart_votes_needed must be between 1 and 4".into());
        }
        Ok(())
    }
}
