use crate::error::ConfigError;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_RESTRICTED_CHANNEL_ID: u64 = 1416458716147880111;
pub const DEFAULT_LIKE_API_URL: &str = "https://like-api-nine.vercel.app";
pub const DEFAULT_LIKE_API_KEY: &str = "lumina";

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub port: u16,
    pub command_prefix: String,
    pub restricted_channel_id: u64,
    pub like_api_url: String,
    pub like_api_key: String,
    /// Keep-alive target. `None` disables the pinger.
    pub keep_alive_url: Option<String>,
    pub status_interval: Duration,
    pub keep_alive_interval: Duration,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::build(|key| env::var(key).ok())
    }

    fn build(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values are treated the same as unset ones.
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let discord_token =
            var("DISCORD_BOT_TOKEN").ok_or(ConfigError::Missing("DISCORD_BOT_TOKEN"))?;

        let restricted_channel_id = parse_or(
            "RESTRICTED_CHANNEL_ID",
            var("RESTRICTED_CHANNEL_ID"),
            DEFAULT_RESTRICTED_CHANNEL_ID,
        )?;
        if restricted_channel_id == 0 {
            return Err(ConfigError::Invalid {
                name: "RESTRICTED_CHANNEL_ID",
                reason: "channel id cannot be zero".to_string(),
            });
        }

        Ok(Config {
            discord_token,
            port: parse_or("PORT", var("PORT"), DEFAULT_PORT)?,
            command_prefix: var("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            restricted_channel_id,
            like_api_url: var("LIKE_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_LIKE_API_URL.to_string()),
            like_api_key: var("LIKE_API_KEY").unwrap_or_else(|| DEFAULT_LIKE_API_KEY.to_string()),
            keep_alive_url: var("KEEP_ALIVE_URL").or_else(|| var("RENDER_EXTERNAL_URL")),
            status_interval: duration_or(
                "STATUS_INTERVAL",
                var("STATUS_INTERVAL"),
                Duration::from_secs(5 * 60),
            )?,
            keep_alive_interval: duration_or(
                "KEEP_ALIVE_INTERVAL",
                var("KEEP_ALIVE_INTERVAL"),
                Duration::from_secs(60),
            )?,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", var("HTTP_TIMEOUT_SECS"), 15)?,
        })
    }

    /// The text a message must start with to pass the restricted channel.
    pub fn like_invocation(&self) -> String {
        format!("{}like", self.command_prefix)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn duration_or(
    name: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let duration = match raw {
        Some(raw) => humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })?,
        None => default,
    };
    if duration.is_zero() {
        return Err(ConfigError::Invalid {
            name,
            reason: "interval must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("port", &self.port)
            .field("command_prefix", &self.command_prefix)
            .field("restricted_channel_id", &self.restricted_channel_id)
            .field("like_api_url", &self.like_api_url)
            .field("like_api_key", &"[REDACTED]")
            .field("keep_alive_url", &self.keep_alive_url)
            .field("status_interval", &self.status_interval)
            .field("keep_alive_interval", &self.keep_alive_interval)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
