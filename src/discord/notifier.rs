//! Outbound notifications to the configured channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use poise::serenity_prelude::{
    self as serenity, ChannelId, CreateAllowedMentions, CreateMessage, UserId,
};
use tracing::debug;

/// A way to send a message to a channel.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, channel_id: ChannelId, msg: CreateMessage)
    -> serenity::Result<()>;
}

#[async_trait]
impl MessageSender for Arc<serenity::Http> {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        msg: CreateMessage,
    ) -> serenity::Result<()> {
        channel_id.send_message(self, msg).await.map(|_| ())
    }
}

/// What gets posted for a new match. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub target_user_id: String,
    pub body_text: String,
    pub permalink: String,
}

impl NotificationMessage {
    /// Mention, text, then the match link. The angle brackets keep Discord
    /// from unfurling a preview.
    pub fn render(&self) -> String {
        format!(
            "<@{}> {}\n[Link](<{}>)",
            self.target_user_id, self.body_text, self.permalink
        )
    }

    /// Only the target may be pinged, whatever the generated text contains.
    pub fn allowed_mentions(&self) -> CreateAllowedMentions {
        let target = self
            .target_user_id
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(UserId::new);

        CreateAllowedMentions::new().users(target)
    }

    pub fn to_create_message(&self) -> CreateMessage {
        CreateMessage::new()
            .content(self.render())
            .allowed_mentions(self.allowed_mentions())
    }
}

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Posts notifications to a single channel, at most one per `min_interval`.
pub struct Notifier<S> {
    sender: S,
    channel_id: ChannelId,
    limiter: Option<Limiter>,
}

impl<S: MessageSender> Notifier<S> {
    /// A zero `min_interval` disables rate limiting.
    pub fn new(sender: S, channel_id: ChannelId, min_interval: Duration) -> Self {
        Self {
            sender,
            channel_id,
            limiter: Quota::with_period(min_interval).map(RateLimiter::direct),
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub async fn notify(&self, message: &NotificationMessage) -> serenity::Result<()> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        debug!(
            channel_id = %self.channel_id,
            user_id = %message.target_user_id,
            "✉️ Sending notification"
        );

        self.sender
            .send_message(self.channel_id, message.to_create_message())
            .await
    }
}
