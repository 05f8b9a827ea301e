use std::fmt;

use crate::opendota::{GameConstants, MatchPlayer};

/// Minute at which early-game last hits are sampled.
pub const LANING_CHECKPOINT_MINUTE: usize = 10;

/// An end-of-game inventory item with the minute it was bought, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTiming {
    pub name: String,
    pub minute: Option<i64>,
}

impl fmt::Display for ItemTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minute {
            Some(minute) => write!(f, "{} @ {}min", self.name, minute),
            None => f.write_str(&self.name),
        }
    }
}

/// Compact summary of one player's game, the input of the narrative prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDigest {
    pub hero: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub gold_per_min: u32,
    pub xp_per_min: u32,
    pub last_hits: u32,
    pub last_hits_at_checkpoint: Option<u32>,
    pub items: Vec<ItemTiming>,
}

impl MatchDigest {
    pub fn from_player(player: &MatchPlayer, constants: &GameConstants) -> Self {
        let items = player
            .items()
            .into_iter()
            .filter(|id| *id != 0)
            .map(|id| {
                let name = constants.item_name(id);
                let minute = player
                    .purchase_time(&name)
                    .map(|secs| (secs as f64 / 60.0).round_ties_even() as i64);
                ItemTiming { name, minute }
            })
            .collect();

        Self {
            hero: player
                .hero_id
                .map(|id| constants.hero_name(id))
                .unwrap_or_else(|| "unknown".to_string()),
            kills: player.kills,
            deaths: player.deaths,
            assists: player.assists,
            gold_per_min: player.gold_per_min,
            xp_per_min: player.xp_per_min,
            last_hits: player.last_hits,
            last_hits_at_checkpoint: player.last_hits_at(LANING_CHECKPOINT_MINUTE),
            items,
        }
    }

    pub fn item_list(&self) -> String {
        if self.items.is_empty() {
            return "No items?".to_string();
        }

        self.items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_prompt(&self) -> String {
        let checkpoint = self
            .last_hits_at_checkpoint
            .map(|lh| lh.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "Here is how my friend did in a Dota 2 match they just finished:\n\
             \n\
             Hero: {hero}\n\
             Kills/Deaths/Assists: {k}/{d}/{a}\n\
             GPM: {gpm}\n\
             XPM: {xpm}\n\
             Last Hits: {lh} (LH@{minute}: {checkpoint})\n\
             Items: {items}\n\
             \n\
             Roast their performance. Be creative and merciless, but keep it short.",
            hero = self.hero,
            k = self.kills,
            d = self.deaths,
            a = self.assists,
            gpm = self.gold_per_min,
            xpm = self.xp_per_min,
            lh = self.last_hits,
            minute = LANING_CHECKPOINT_MINUTE,
            items = self.item_list(),
        )
    }
}
