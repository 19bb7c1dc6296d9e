pub mod commands;
pub mod config;
pub mod error;
pub mod gatekeeper;
pub mod health;
pub mod keep_alive;
pub mod presence;
pub mod ready;
pub mod services;

/// Custom data passed to all commands and event handlers
pub struct Data {
    pub config: config::Config,
    pub policy: gatekeeper::ChannelPolicy,
    /// Client for the upstream like API; wraps the shared HTTP client.
    pub like_api: services::like_api::LikeApiClient,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
