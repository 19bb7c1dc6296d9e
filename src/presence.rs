use crate::ready::ReadyGate;
use poise::serenity_prelude as serenity;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

/// Keeps the bot's "watching N servers" activity current.
pub struct StatusUpdater {
    ready: ReadyGate<serenity::Context>,
    period: Duration,
}

impl StatusUpdater {
    pub fn new(ready: ReadyGate<serenity::Context>, period: Duration) -> Self {
        Self { ready, period }
    }

    pub async fn run(mut self) {
        let Some(ctx) = self.ready.wait().await else {
            debug!("Status updater stopped before the bot became ready");
            return;
        };

        let mut ticker = interval(self.period);
        loop {
            ticker.tick().await;
            let guilds = ctx.cache.guild_count();
            // Presence goes through the shard runner queue; there is no response to await.
            ctx.set_activity(Some(serenity::ActivityData::watching(status_text(guilds))));
            info!("Status updated: watching {} servers", guilds);
        }
    }
}

pub fn status_text(guild_count: usize) -> String {
    format!("{} servers", guild_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(0), "0 servers");
        assert_eq!(status_text(12), "12 servers");
    }
}
