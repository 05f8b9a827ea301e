//! Watches a roster of Dota 2 players on OpenDota and announces each new
//! match once on Discord.

pub mod config;
pub mod discord;
pub mod error;
pub mod logging;
pub mod narrate;
pub mod opendota;
pub mod poller;
pub mod roster;
pub mod store;
