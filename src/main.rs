use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use dotawatch::config::{Config, GeneratorKind};
use dotawatch::discord::{self, Data, Notifier};
use dotawatch::error::AppError;
use dotawatch::logging;
use dotawatch::narrate::{
    ChatCompletionsBackend, NarrativeGenerator, TemplatedGenerator, TextGenerator,
};
use dotawatch::opendota::{GameConstants, OpenDotaClient, RequestMetrics};
use dotawatch::poller::WatchLoop;
use dotawatch::roster::Roster;
use dotawatch::store::{MatchArchive, SeenMatchStore};
use poise::serenity_prelude::{ChannelId, ClientBuilder, GatewayIntents};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init();

    info!("🐙 Starting...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "❌ Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let roster = Roster::load(&config.stats.roster_path)?;
    info!(
        count = roster.len(),
        path = %config.stats.roster_path.display(),
        "📋 Roster loaded"
    );

    let seen = Arc::new(SeenMatchStore::new(&config.seen_store_path));
    let snapshot = seen.load().await?;
    info!(entries = snapshot.len(), "🗃️ Seen-match store loaded");

    let metrics = RequestMetrics::new("opendota");
    let opendota = OpenDotaClient::new(
        &config.stats.opendota_base_url,
        config.stats.http_timeout,
        metrics.clone(),
    )?;

    let constants = Arc::new(GameConstants::fetch(&opendota, &config.constants_base_url).await?);
    let generator = build_generator(&config, constants)?;

    tokio::spawn(metrics.log_loop());

    let data = Data {
        roster_path: config.stats.roster_path.clone(),
        seen: seen.clone(),
    };

    let channel_id = ChannelId::new(config.channel_id);
    let notify_interval = config.notify_min_interval;
    let archive = MatchArchive::new(&config.stats.archive_dir);
    let roster_path = config.stats.roster_path.clone();
    let poll_interval = Duration::from_secs(config.polling_interval_secs);

    let framework = discord::create_framework(data, move |http| {
        WatchLoop::new(
            opendota,
            generator,
            Notifier::new(http, channel_id, notify_interval),
            seen,
            archive,
            roster_path,
            poll_interval,
        )
        .start();
    });

    let mut client = ClientBuilder::new(&config.discord_token, GatewayIntents::non_privileged())
        .framework(framework)
        .await?;

    info!("🌐 Connecting to Discord gateway");
    client.start().await?;

    Ok(())
}

fn build_generator(
    config: &Config,
    constants: Arc<GameConstants>,
) -> Result<Arc<dyn TextGenerator>, AppError> {
    match (config.generator, &config.llm) {
        (GeneratorKind::Templated, _) => {
            info!("✍️ Using templated notification text");
            Ok(Arc::new(TemplatedGenerator::new(constants)))
        }
        (GeneratorKind::Narrative, Some(llm)) => {
            let backend = ChatCompletionsBackend::new(llm, config.stats.http_timeout)
                .map_err(|e| AppError::Config(format!("cannot build text backend: {e}")))?;
            info!(model = %llm.model, "✍️ Using narrative notification text");
            Ok(Arc::new(NarrativeGenerator::new(constants, backend)))
        }
        (GeneratorKind::Narrative, None) => Err(AppError::Config(
            "LLM_API_KEY must be set for the narrative generator".into(),
        )),
    }
}
