use crate::error::LikeApiError;
use crate::gatekeeper::ChannelPolicy;
use crate::services::like_api::{LikeApiClient, LikeResult};
use crate::{Context, Error};
use poise::serenity_prelude::{ChannelId, Colour, CreateEmbed, CreateEmbedFooter, Mentionable, Timestamp};
use tracing::{error, info, warn};

const RESULT_COLOUR: u32 = 0x3498db;
const RESULT_TITLE: &str = "⭐ Like Command Result";
const RESULT_FOOTER: &str = "📌 Garena Free Fire | Like System";
const REJECTED_TITLE: &str = "⚠️ Command Not Allowed";

/// Send likes to a Free Fire player
#[poise::command(prefix_command)]
pub async fn like(
    ctx: Context<'_>,
    #[rest]
    #[description = "<server_name> <uid>"]
    args: Option<String>,
) -> Result<(), Error> {
    let (server, uid) = split_arguments(args.as_deref().unwrap_or_default());
    let data = ctx.data();
    let outcome = evaluate(
        &data.policy,
        ctx.channel_id(),
        server.as_deref(),
        uid.as_deref(),
        &data.like_api,
    )
    .await;

    match &outcome {
        LikeOutcome::Success { uid, server, .. } => {
            info!("Like request for uid {} on {} by {}", uid, server, ctx.author().name)
        }
        LikeOutcome::ApiStatus(code) => warn!("Like API returned HTTP {}", code),
        _ => {}
    }

    send_outcome(ctx, outcome).await
}

async fn send_outcome(ctx: Context<'_>, outcome: LikeOutcome) -> Result<(), Error> {
    let mention = ctx.author().mention().to_string();
    let prefix = &ctx.data().config.command_prefix;
    let is_embed = outcome.text(&mention, prefix).is_none();

    let reply = outcome.into_reply(&mention, prefix, ctx.created_at());
    match ctx.send(reply).await {
        Ok(_) => Ok(()),
        Err(e) if is_embed => {
            // A rejected embed still owes the user a reply.
            error!("Failed to send like embed: {}", e);
            let fallback = LikeOutcome::Unavailable.into_reply(&mention, prefix, ctx.created_at());
            ctx.send(fallback).await?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Take `server` and `uid` from the raw argument text. Double quotes group a
/// token containing spaces; anything after the second token is ignored.
pub fn split_arguments(raw: &str) -> (Option<String>, Option<String>) {
    let (server, rest) = match next_token(raw) {
        Some((token, rest)) => (Some(token), rest),
        None => return (None, None),
    };
    let uid = next_token(rest).map(|(token, _)| token);
    (server, uid)
}

fn next_token(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    if let Some(quoted) = input.strip_prefix('"') {
        if let Some(end) = quoted.find('"') {
            return Some((quoted[..end].to_string(), &quoted[end + 1..]));
        }
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some((input[..end].to_string(), &input[end..]))
}

/// Result of one `like` invocation. Each variant maps to exactly one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    /// Invoked outside the restricted channel.
    WrongChannel(ChannelId),
    Usage,
    ApiStatus(u16),
    Unavailable,
    Success {
        server: String,
        uid: String,
        result: LikeResult,
    },
}

/// Validate the invocation and, if it is well-formed, query the like API.
pub async fn evaluate(
    policy: &ChannelPolicy,
    channel_id: ChannelId,
    server: Option<&str>,
    uid: Option<&str>,
    api: &LikeApiClient,
) -> LikeOutcome {
    if !policy.is_restricted(channel_id) {
        return LikeOutcome::WrongChannel(policy.restricted_channel);
    }

    let (Some(server), Some(uid)) = (server, uid) else {
        return LikeOutcome::Usage;
    };
    if server.trim().is_empty() || !is_numeric_uid(uid) {
        return LikeOutcome::Usage;
    }

    match api.fetch_likes(server, uid).await {
        Ok(result) => LikeOutcome::Success {
            server: server.to_string(),
            uid: uid.to_string(),
            result,
        },
        Err(LikeApiError::Status(code)) => LikeOutcome::ApiStatus(code),
        Err(e) => {
            error!("Error in like command: {}", e);
            LikeOutcome::Unavailable
        }
    }
}

fn is_numeric_uid(uid: &str) -> bool {
    !uid.is_empty() && uid.chars().all(|c| c.is_ascii_digit())
}

impl LikeOutcome {
    /// Plain-text reply, for the variants that are not embeds.
    pub fn text(&self, mention: &str, prefix: &str) -> Option<String> {
        match self {
            LikeOutcome::Usage => Some(format!(
                "{} ❌ Usage: `{}like <server_name> <uid>`",
                mention, prefix
            )),
            LikeOutcome::ApiStatus(code) => Some(format!("{} ❌ API Error ({})", mention, code)),
            LikeOutcome::Unavailable => Some(format!(
                "{} ❌ Could not fetch like info. Please try again later.",
                mention
            )),
            LikeOutcome::WrongChannel(_) | LikeOutcome::Success { .. } => None,
        }
    }

    pub fn into_reply(self, mention: &str, prefix: &str, timestamp: Timestamp) -> poise::CreateReply {
        let embed = match self {
            LikeOutcome::WrongChannel(channel) => CreateEmbed::new()
                .title(REJECTED_TITLE)
                .description(rejection_notice(channel))
                .colour(Colour::RED),
            LikeOutcome::Success { server, uid, result } => {
                let embed = CreateEmbed::new()
                    .title(RESULT_TITLE)
                    .colour(RESULT_COLOUR)
                    .timestamp(timestamp)
                    .footer(CreateEmbedFooter::new(RESULT_FOOTER));
                result_fields(&server, &uid, &result)
                    .into_iter()
                    .fold(embed, |embed, (name, value, inline)| {
                        embed.field(name, value, inline)
                    })
            }
            other => {
                let text = other.text(mention, prefix).unwrap_or_default();
                return poise::CreateReply::default().content(text);
            }
        };
        poise::CreateReply::default().embed(embed)
    }
}

fn rejection_notice(channel: ChannelId) -> String {
    format!("This command is only allowed in {}", channel.mention())
}

/// Embed fields of a successful lookup as `(name, value, inline)`.
pub fn result_fields(server: &str, uid: &str, result: &LikeResult) -> Vec<(&'static str, String, bool)> {
    vec![
        ("Player", field_value(&result.nickname), false),
        ("UID", field_value(uid), true),
        ("Server", field_value(server), true),
        ("Likes Before", field_value(&result.likes_before), true),
        ("Likes After", field_value(&result.likes_after), true),
        ("Remains", field_value(&result.remains), true),
        ("Status", field_value(&result.status), true),
    ]
}

/// Discord rejects embed field values longer than this.
const FIELD_VALUE_LIMIT: usize = 1024;

fn field_value(value: &str) -> String {
    if value.chars().count() <= FIELD_VALUE_LIMIT {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(FIELD_VALUE_LIMIT - 3).collect();
    clipped.push_str("...");
    clipped
}
