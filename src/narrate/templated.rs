use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use super::TextGenerator;
use crate::opendota::{GameConstants, MatchDetail};
use crate::roster::TrackedIdentity;

/// Message catalog. `{hero}` and `{score}` are substituted with the player's
/// hero name and K/D/A line.
pub const TEMPLATES: &[&str] = &[
    "has made the questionable decision to play yet another game of Dota 2.",
    "queued up again. Of course.",
    "decided a game of {hero} was a good use of the evening.",
    "really? {hero}? Okay pal.",
    "is a {hero} enjoyer now, apparently.",
    "went {score}. Read it and weep.",
    "went {score} on {hero}. No further questions.",
    "finished a match. The scoreboard says {score}, the vibes say otherwise.",
    "has been spotted playing {hero} again. Authorities have been notified.",
    "and the {hero} saga continues.",
    "has not learned a thing since the last game.",
    "needs to touch grass.",
    "should be asleep right now.",
    "had nothing better to do today.",
    "played ANOTHER game of Dota 2.",
    "honestly, I'm speechless.",
    "what did you expect?",
    "\nI would have itemized differently, but you do you.",
    "this is what happens when you say \"one more\".",
    "bought that account, didn't they?",
    "is on a roll. Which direction is unclear.",
    "is on fire. Someone call the fire department.",
    "posture check.",
    "don't forget to hydrate.",
    "clean your desk before you queue again.",
    "maybe try a different game next time?",
    "when will you learn that your actions have consequences?",
    "this would be a great time to go to bed instead of queuing again.",
    "when's the last time you called your loved ones?",
    "you might gain MMR, but you will always lose brain cells.",
    "gg ez.",
    "bg.",
    "is not him.",
    "ew.",
    "you get the idea, match details attached.",
];

/// Picks a random line from [`TEMPLATES`].
#[derive(Debug, Clone)]
pub struct TemplatedGenerator {
    constants: Arc<GameConstants>,
}

impl TemplatedGenerator {
    pub fn new(constants: Arc<GameConstants>) -> Self {
        Self { constants }
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        detail: &MatchDetail,
        identity: &TrackedIdentity,
    ) -> String {
        let (hero, score) = match detail.participant(&identity.player_id) {
            Some(player) => (
                player
                    .hero_id
                    .map(|id| self.constants.hero_name(id))
                    .unwrap_or_else(|| "unknown".to_string()),
                player.scoreline(),
            ),
            None => {
                debug!(
                    player_id = %identity.player_id,
                    match_id = detail.match_id,
                    "✍️ Player not found among participants, using defaults"
                );
                ("unknown".to_string(), "0/0/0".to_string())
            }
        };

        let template = TEMPLATES[rng.gen_range(0..TEMPLATES.len())];

        template
            .replace("{hero}", &hero)
            .replace("{score}", &score)
    }
}

#[async_trait]
impl TextGenerator for TemplatedGenerator {
    async fn generate(&self, detail: &MatchDetail, identity: &TrackedIdentity) -> String {
        self.generate_with(&mut rand::thread_rng(), detail, identity)
    }
}
