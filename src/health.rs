//! Plain-text health endpoint for the hosting platform.
//!
//! Served independently of the gateway connection: it answers before the bot
//! is ready and keeps answering if the connection drops.

use axum::{extract::State, routing::get, Router};
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info};

const PLACEHOLDER_NAME: &str = "Loading...";

/// Read-only view of the bot's identity shared with the health server.
#[derive(Clone)]
pub struct HealthState {
    bot_name: Arc<RwLock<String>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            bot_name: Arc::new(RwLock::new(PLACEHOLDER_NAME.to_string())),
        }
    }

    pub fn set_bot_name(&self, name: &str) {
        let mut bot_name = self.bot_name.write().unwrap_or_else(PoisonError::into_inner);
        *bot_name = name.to_string();
    }

    pub fn status_line(&self) -> String {
        let bot_name = self.bot_name.read().unwrap_or_else(PoisonError::into_inner);
        format!("Bot {} is operational", bot_name)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/", get(home)).with_state(state)
}

async fn home(State(state): State<HealthState>) -> String {
    state.status_line()
}

pub async fn serve(port: u16, state: HealthState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Health server listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Run the health server in its own task. Failures are logged and never reach the bot.
pub fn spawn(port: u16, state: HealthState) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(port, state).await {
            error!("Health server stopped: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_path(state: HealthState, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_before_ready() {
        let (status, body) = get_path(HealthState::new(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Bot Loading... is operational");
    }

    #[tokio::test]
    async fn test_health_reports_bot_name() {
        let state = HealthState::new();
        state.set_bot_name("LikeBot");
        let (status, body) = get_path(state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Bot LikeBot is operational");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = get_path(HealthState::new(), "/status").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
