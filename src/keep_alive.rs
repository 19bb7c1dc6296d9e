use crate::ready::ReadyGate;
use reqwest::StatusCode;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

/// Pings an external URL so an idle host is not suspended.
pub struct KeepAlive<T> {
    http: reqwest::Client,
    url: String,
    period: Duration,
    ready: ReadyGate<T>,
}

impl<T: Clone> KeepAlive<T> {
    pub fn new(http: reqwest::Client, url: String, period: Duration, ready: ReadyGate<T>) -> Self {
        Self {
            http,
            url,
            period,
            ready,
        }
    }

    pub async fn run(mut self) {
        if self.ready.wait().await.is_none() {
            return;
        }
        info!("Keep-alive pinging {} every {:?}", self.url, self.period);

        let mut ticker = interval(self.period);
        loop {
            ticker.tick().await;
            match self.ping().await {
                Ok(status) => info!("Keep-alive ping status: {}", status.as_u16()),
                Err(e) => warn!("Keep-alive error: {}", e),
            }
        }
    }

    /// One ping. Any HTTP status counts as a response.
    pub async fn ping(&self) -> Result<StatusCode, reqwest::Error> {
        let response = self.http.get(&self.url).send().await?;
        Ok(response.status())
    }
}
