use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use pv_core::ids::ConfigurationHandle;
use pv_core::ports::{NetworkPresencePort, PresenceError, PresenceSnapshot, PresenceSubscription};

use crate::dashboard_url;

const SNAPSHOT_BUFFER: usize = 4;

/// Presence monitor that polls the dashboard's `GET /ping` endpoint.
///
/// Each subscription owns one polling task; unsubscribing aborts it.
pub struct PollingPresenceMonitor {
    client: Client,
    ping_url: Url,
    interval: Duration,
}

impl PollingPresenceMonitor {
    pub fn new(dashboard_url: &str, interval: Duration) -> anyhow::Result<Self> {
        let base = dashboard_url::parse_base(dashboard_url)?;
        let ping_url = dashboard_url::extend(&base, &["ping"])?;
        Ok(Self {
            client: Client::new(),
            ping_url,
            interval,
        })
    }
}

async fn poll_once(client: &Client, url: &Url) -> anyhow::Result<PresenceSnapshot> {
    let states: HashMap<String, bool> = client
        .get(url.clone())
        .send()
        .await
        .context("ping request failed")?
        .error_for_status()
        .context("ping rejected")?
        .json()
        .await
        .context("failed to parse ping response")?;

    Ok(states
        .into_iter()
        .map(|(name, online)| (ConfigurationHandle::from(name), online))
        .collect())
}

#[async_trait]
impl NetworkPresencePort for PollingPresenceMonitor {
    async fn subscribe(&self) -> Result<PresenceSubscription, PresenceError> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let client = self.client.clone();
        let url = self.ping_url.clone();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let handle = tokio::spawn(async move {
            loop {
                ticker.tick().await;
                match poll_once(&client, &url).await {
                    Ok(snapshot) => {
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    // Transient; keep polling.
                    Err(err) => warn!(error = %err, "presence poll failed"),
                }
            }
            debug!("presence polling stopped");
        });

        let abort = handle.abort_handle();
        debug!(
            url = %self.ping_url,
            interval_ms = self.interval.as_millis() as u64,
            "presence polling started"
        );
        Ok(PresenceSubscription::new(rx, move || abort.abort()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_ping_snapshots() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"kitchen":true,"garage":false}"#)
            .create_async()
            .await;

        let monitor =
            PollingPresenceMonitor::new(&server.url(), Duration::from_millis(10)).unwrap();
        let mut subscription = monitor.subscribe().await.unwrap();
        let snapshot = subscription.next().await.unwrap();

        assert_eq!(
            snapshot.get(&ConfigurationHandle::from("kitchen")),
            Some(&true)
        );
        assert_eq!(
            snapshot.get(&ConfigurationHandle::from("garage")),
            Some(&false)
        );
        subscription.unsubscribe();
    }

    #[tokio::test]
    async fn polls_under_dashboard_base_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/dash/ping")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"kitchen":true}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let monitor = PollingPresenceMonitor::new(
            &format!("{}/dash", server.url()),
            Duration::from_millis(10),
        )
        .unwrap();
        let mut subscription = monitor.subscribe().await.unwrap();
        let snapshot = tokio::time::timeout(Duration::from_secs(2), subscription.next())
            .await
            .expect("no snapshot from /dash/ping")
            .unwrap();
        subscription.unsubscribe();

        assert_eq!(
            snapshot.get(&ConfigurationHandle::from("kitchen")),
            Some(&true)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_polls_keep_subscription_open() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(502)
            .create_async()
            .await;

        let monitor =
            PollingPresenceMonitor::new(&server.url(), Duration::from_millis(10)).unwrap();
        let mut subscription = monitor.subscribe().await.unwrap();

        let next = tokio::time::timeout(Duration::from_millis(100), subscription.next()).await;
        assert!(next.is_err(), "no snapshot expected, got {next:?}");
    }
}
