use likebot::commands::like;
use likebot::config::Config;
use likebot::gatekeeper::{self, ChannelPolicy, IncomingMessage, Verdict};
use likebot::health::{self, HealthState};
use likebot::keep_alive::KeepAlive;
use likebot::presence::StatusUpdater;
use likebot::ready::ready_gate;
use likebot::services::like_api::LikeApiClient;
use likebot::{Data, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration; a missing token stops us before any network activity
    let config = Config::from_env()?;
    debug!("Loaded {:?}", config);
    let discord_token = config.discord_token.clone();

    // One HTTP client for the whole process, shared by the like API and the keep-alive
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let health_state = HealthState::new();
    let health_task = health::spawn(config.port, health_state.clone());

    let (ready_trigger, gate) = ready_gate::<serenity::Context>();
    let status_task = tokio::spawn(StatusUpdater::new(gate.clone(), config.status_interval).run());
    let keep_alive_task = match &config.keep_alive_url {
        Some(url) => Some(tokio::spawn(
            KeepAlive::new(
                http_client.clone(),
                url.clone(),
                config.keep_alive_interval,
                gate,
            )
            .run(),
        )),
        None => {
            info!("KEEP_ALIVE_URL not set, keep-alive pinger disabled");
            None
        }
    };

    let data = Data {
        policy: ChannelPolicy::from_config(&config),
        like_api: LikeApiClient::new(http_client.clone(), &config),
        config: config.clone(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![like::like()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                mention_as_prefix: false,
                ..Default::default()
            },
            // Prefix invocations the gatekeeper did not pass are never run
            command_check: Some(|ctx| {
                Box::pin(async move {
                    Ok(match ctx {
                        poise::Context::Prefix(prefix) => {
                            let message = IncomingMessage::from(prefix.msg);
                            ctx.data().policy.verdict(&message) == Verdict::Dispatch
                        }
                        _ => true,
                    })
                })
            }),
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        let message = IncomingMessage::from(new_message);
                        let outcome =
                            gatekeeper::enforce(&data.policy, &message, &*ctx.http).await;
                        debug!("Gatekeeper outcome for message {}: {:?}", message.id, outcome);
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Logged in as {} ({})", ready.user.name, ready.user.id);
                health_state.set_bot_name(&ready.user.name);
                ready_trigger.open(ctx.clone());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting bot...");
    let result = client.start().await;
    if let Err(why) = &result {
        error!("Client error: {:?}", why);
    }

    // Stop background work, then release the shared HTTP client
    status_task.abort();
    if let Some(task) = keep_alive_task {
        task.abort();
    }
    health_task.abort();
    drop(client);
    drop(http_client);
    info!("HTTP session closed");

    result.map_err(|e| anyhow::anyhow!("Client error: {}", e))
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::CommandCheckFailed { ctx, .. } => {
            debug!("Gatekeeper vetoed {} in channel {}", ctx.command().name, ctx.channel_id());
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command {} failed: {}", ctx.command().name, error);
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
