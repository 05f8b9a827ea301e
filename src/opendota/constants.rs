use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;

use super::client::OpenDotaClient;
use super::metrics::Endpoint;
use super::types::StatsResponse;

#[derive(Deserialize)]
struct HeroEntry {
    id: u32,
    localized_name: String,
}

#[derive(Deserialize)]
struct ItemEntry {
    #[serde(default)]
    id: Option<u32>,
}

/// Hero and item name tables from dotaconstants. Built once at startup and
/// handed to whatever needs to resolve ids.
#[derive(Debug, Clone, Default)]
pub struct GameConstants {
    heroes: HashMap<u32, String>,
    items: HashMap<u32, String>,
}

impl GameConstants {
    pub fn new(heroes: HashMap<u32, String>, items: HashMap<u32, String>) -> Self {
        Self { heroes, items }
    }

    /// Download `heroes.json` and `items.json` from `base_url`.
    pub async fn fetch(client: &OpenDotaClient, base_url: &str) -> StatsResponse<Self> {
        let base_url = base_url.trim_end_matches('/');

        let heroes: HashMap<String, HeroEntry> =
            client.get(Endpoint::Constants, &format!("{base_url}/heroes.json")).await?;
        let items: HashMap<String, ItemEntry> =
            client.get(Endpoint::Constants, &format!("{base_url}/items.json")).await?;

        let constants = Self {
            heroes: heroes
                .into_values()
                .map(|hero| (hero.id, hero.localized_name))
                .collect(),
            items: items
                .into_iter()
                .filter_map(|(key, item)| item.id.map(|id| (id, key)))
                .collect(),
        };

        info!(
            heroes = constants.heroes.len(),
            items = constants.items.len(),
            "📚 Game constants loaded"
        );

        Ok(constants)
    }

    pub fn hero_name(&self, hero_id: u32) -> String {
        self.heroes
            .get(&hero_id)
            .cloned()
            .unwrap_or_else(|| format!("Hero#{hero_id}"))
    }

    /// Item key as used in purchase logs, e.g. `blink`.
    pub fn item_name(&self, item_id: u32) -> String {
        self.items
            .get(&item_id)
            .cloned()
            .unwrap_or_else(|| format!("Item#{item_id}"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::opendota::metrics::RequestMetrics;

    #[tokio::test]
    async fn fetch_builds_both_tables() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/build/heroes.json");
                then.status(200).json_body(json!({
                    "1": { "id": 1, "name": "npc_dota_hero_antimage", "localized_name": "Anti-Mage" },
                    "74": { "id": 74, "name": "npc_dota_hero_invoker", "localized_name": "Invoker" }
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/build/items.json");
                then.status(200).json_body(json!({
                    "blink": { "id": 1, "dname": "Blink Dagger" },
                    "recipe_unknown": { "dname": "No id" }
                }));
            })
            .await;

        let client = OpenDotaClient::new(
            server.base_url(),
            Duration::from_secs(5),
            RequestMetrics::new("test"),
        )
        .unwrap();

        let constants = GameConstants::fetch(&client, &server.url("/build/"))
            .await
            .unwrap();

        assert_eq!(constants.hero_name(74), "Invoker");
        assert_eq!(constants.item_name(1), "blink");
        assert_eq!(constants.hero_name(999), "Hero#999");
        assert_eq!(constants.item_name(2), "Item#2");
    }
}
