use std::path::PathBuf;
use std::sync::Arc;

use poise::serenity_prelude::{ActivityData, Http};
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::store::SeenMatchStore;

use super::commands;

/// Shared data accessible in all commands
#[derive(Debug)]
pub struct Data {
    pub roster_path: PathBuf,
    pub seen: Arc<SeenMatchStore>,
}

pub type Context<'a> = poise::Context<'a, Data, AppError>;

/// Build the bot. `on_ready` runs once the gateway session is up and gets the
/// REST handle used for notifications.
pub fn create_framework<F>(data: Data, on_ready: F) -> poise::Framework<Data, AppError>
where
    F: FnOnce(Arc<Http>) + Send + Sync + 'static,
{
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::tracked()],
            on_error: |error| {
                Box::pin(async move {
                    handle_error(error).await;
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                ctx.set_activity(Some(ActivityData::watching("Dota 2 matches")));
                info!(
                    bot_name = %ready.user.name,
                    guild_count = ready.guilds.len(),
                    "🤖 Bot is ready"
                );

                on_ready(ctx.http.clone());

                Ok(data)
            })
        })
        .build()
}

async fn handle_error(error: poise::FrameworkError<'_, Data, AppError>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                error = ?error,
                command = ctx.command().name.as_str(),
                user_id = %ctx.author().id,
                "🎮 ❌ Command execution failed"
            );
            let _ = ctx.say(format!("Error: {}", error)).await;
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            warn!(
                error = %error,
                command = ctx.command().name.as_str(),
                "🎮 ⚠️ Invalid command argument"
            );
            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
        }
        other => {
            error!(error = ?other, "🎮 ❌ Unhandled framework error");
        }
    }
}
