use poise::serenity_prelude as serenity;
use tracing::info;

use crate::discord::bot::Context;
use crate::error::AppError;
use crate::opendota::permalink;
use crate::roster::Roster;

/// List tracked players and the last match announced for each
#[poise::command(slash_command)]
pub async fn tracked(ctx: Context<'_>) -> Result<(), AppError> {
    info!(user_id = %ctx.author().id, "🛠️ /tracked invoked");

    let roster = Roster::load_async(&ctx.data().roster_path).await?;
    let seen = ctx.data().seen.load().await?;

    if roster.is_empty() {
        ctx.say("Nobody is being tracked. Add players to the roster file.")
            .await?;
        return Ok(());
    }

    let mut description = String::new();
    for identity in &roster {
        let last = match seen.get(&identity.player_id) {
            Some(match_id) => match match_id.parse() {
                Ok(id) => format!("[{match_id}](<{}>)", permalink(id)),
                Err(_) => match_id.clone(),
            },
            None => "nothing yet".to_string(),
        };

        description.push_str(&format!(
            "- <@{}> (`{}`): {}\n",
            identity.user_id, identity.player_id, last
        ));
    }

    let embed = serenity::CreateEmbed::new()
        .title(format!("Tracked Players ({})", roster.len()))
        .description(description)
        .color(0xa72714);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
