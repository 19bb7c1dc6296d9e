//! Restricted-channel policy applied to every incoming message.
//!
//! Inside the restricted channel only `like` invocations survive; everything
//! else is deleted. Messages anywhere else pass straight to command dispatch.

use crate::error::DeleteError;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::{ChannelId, Http, HttpError, Message, MessageId};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPolicy {
    pub restricted_channel: ChannelId,
    /// Prefix plus command name, e.g. `!like`.
    pub command_invocation: String,
}

impl ChannelPolicy {
    pub fn new(restricted_channel_id: u64, command_invocation: impl Into<String>) -> Self {
        Self {
            restricted_channel: ChannelId::new(restricted_channel_id),
            command_invocation: command_invocation.into(),
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.restricted_channel_id, config.like_invocation())
    }

    pub fn is_restricted(&self, channel_id: ChannelId) -> bool {
        channel_id == self.restricted_channel
    }

    pub fn verdict(&self, message: &IncomingMessage<'_>) -> Verdict {
        if message.author_is_bot {
            return Verdict::Ignore;
        }
        if self.is_restricted(message.channel_id)
            && !message.content.starts_with(&self.command_invocation)
        {
            return Verdict::Delete;
        }
        Verdict::Dispatch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ignore,
    Delete,
    Dispatch,
}

/// The parts of a gateway message the policy looks at.
#[derive(Debug, Clone)]
pub struct IncomingMessage<'a> {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author_is_bot: bool,
    pub author_name: &'a str,
    pub content: &'a str,
}

impl<'a> From<&'a Message> for IncomingMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            id: msg.id,
            channel_id: msg.channel_id,
            author_is_bot: msg.author.bot,
            author_name: &msg.author.name,
            content: &msg.content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Ignored,
    Dispatched,
    Deleted,
    DeleteDenied,
    DeleteFailed,
}

#[async_trait]
pub trait MessageDeleter: Send + Sync {
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DeleteError>;
}

#[async_trait]
impl MessageDeleter for Http {
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DeleteError> {
        Http::delete_message(self, channel_id, message_id, None)
            .await
            .map_err(classify_delete_error)
    }
}

fn classify_delete_error(e: serenity::Error) -> DeleteError {
    match &e {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 =>
        {
            DeleteError::PermissionDenied
        }
        _ => DeleteError::Transport(e.to_string()),
    }
}

/// Apply the policy to one message, deleting it when required.
///
/// Deletion is attempted at most once. Every failure is logged and swallowed.
pub async fn enforce<D>(
    policy: &ChannelPolicy,
    message: &IncomingMessage<'_>,
    deleter: &D,
) -> GateOutcome
where
    D: MessageDeleter + ?Sized,
{
    match policy.verdict(message) {
        Verdict::Ignore => GateOutcome::Ignored,
        Verdict::Dispatch => GateOutcome::Dispatched,
        Verdict::Delete => match deleter.delete_message(message.channel_id, message.id).await {
            Ok(()) => {
                info!(
                    "Deleted non-command message from {} in channel {}",
                    message.author_name, message.channel_id
                );
                GateOutcome::Deleted
            }
            Err(DeleteError::PermissionDenied) => {
                warn!(
                    "Missing permissions to delete message in channel {}",
                    message.channel_id
                );
                GateOutcome::DeleteDenied
            }
            Err(e) => {
                error!("{} (channel {})", e, message.channel_id);
                GateOutcome::DeleteFailed
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const RESTRICTED: u64 = 1416458716147880111;
    const OTHER: u64 = 42;

    struct RecordingDeleter {
        calls: AtomicUsize,
        result: Mutex<Option<DeleteError>>,
    }

    impl RecordingDeleter {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Mutex::new(None),
            }
        }

        fn failing(err: DeleteError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Mutex::new(Some(err)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessageDeleter for RecordingDeleter {
        async fn delete_message(&self, _: ChannelId, _: MessageId) -> Result<(), DeleteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn policy() -> ChannelPolicy {
        ChannelPolicy::new(RESTRICTED, "!like")
    }

    fn message(channel: u64, content: &str, bot: bool) -> IncomingMessage<'_> {
        IncomingMessage {
            id: MessageId::new(1),
            channel_id: ChannelId::new(channel),
            author_is_bot: bot,
            author_name: "tester",
            content,
        }
    }

    #[tokio::test]
    async fn test_restricted_channel_deletes_non_commands_once() {
        for content in ["hello", "", "like 1 2", "!help", " !like x 1", "!LIKE x 1"] {
            let deleter = RecordingDeleter::ok();
            let outcome = enforce(&policy(), &message(RESTRICTED, content, false), &deleter).await;
            assert_eq!(outcome, GateOutcome::Deleted, "content: {:?}", content);
            assert_eq!(deleter.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_restricted_channel_dispatches_commands() {
        let deleter = RecordingDeleter::ok();
        let outcome = enforce(
            &policy(),
            &message(RESTRICTED, "!like server1 12345", false),
            &deleter,
        )
        .await;
        assert_eq!(outcome, GateOutcome::Dispatched);
        assert_eq!(deleter.calls(), 0);
    }

    #[tokio::test]
    async fn test_other_channels_never_delete() {
        for content in ["hello", "!like server1 12345", "!other"] {
            let deleter = RecordingDeleter::ok();
            let outcome = enforce(&policy(), &message(OTHER, content, false), &deleter).await;
            assert_eq!(outcome, GateOutcome::Dispatched);
            assert_eq!(deleter.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_bots_are_ignored() {
        let deleter = RecordingDeleter::ok();
        let outcome = enforce(&policy(), &message(RESTRICTED, "spam", true), &deleter).await;
        assert_eq!(outcome, GateOutcome::Ignored);
        assert_eq!(deleter.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_failures_are_swallowed() {
        let deleter = RecordingDeleter::failing(DeleteError::PermissionDenied);
        let outcome = enforce(&policy(), &message(RESTRICTED, "hi", false), &deleter).await;
        assert_eq!(outcome, GateOutcome::DeleteDenied);
        assert_eq!(deleter.calls(), 1);

        let deleter = RecordingDeleter::failing(DeleteError::Transport("reset".to_string()));
        let outcome = enforce(&policy(), &message(RESTRICTED, "hi", false), &deleter).await;
        assert_eq!(outcome, GateOutcome::DeleteFailed);
        assert_eq!(deleter.calls(), 1);
    }
}
