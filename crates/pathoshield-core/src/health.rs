//! Backend connectivity monitor.
//!
//! A background task polls `DataSource::health` at a fixed interval and
//! publishes the result on a watch channel. The task lives exactly as long as
//! its `HealthMonitor`: it is aborted on `shutdown` or when the monitor is
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use pathoshield_contracts::health::ConnectionState;

use crate::traits::DataSource;

/// Run one health check and translate it into a `ConnectionState`.
pub async fn probe(source: &dyn DataSource) -> ConnectionState {
    match source.health().await {
        Ok(status) => ConnectionState::Online {
            message: status.message,
        },
        Err(e) => ConnectionState::Offline {
            reason: e.to_string(),
        },
    }
}

pub struct HealthMonitor {
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Start polling. Must be called from within a Tokio runtime.
    ///
    /// The first check runs immediately.
    pub fn spawn(source: Arc<dyn DataSource>, every: Duration) -> Self {
        let (tx, rx) = watch::channel(ConnectionState::Unknown);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let next = probe(source.as_ref()).await;
                let changed = *tx.borrow() != next;
                if changed {
                    info!(source = source.label(), state = next.label(), "backend connectivity changed");
                }
                if tx.send(next).is_err() {
                    debug!("health monitor has no subscribers; stopping");
                    break;
                }
            }
        });

        Self { state: rx, task }
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn current(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop polling and wait for the task to wind down.
    pub async fn shutdown(&mut self) {
        self.task.abort();
        // Aborting resolves the handle with a cancellation error.
        let _ = (&mut self.task).await;
        debug!("health monitor stopped");
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubSource;

    #[tokio::test]
    async fn publishes_online_then_offline() {
        let stub = StubSource::new();
        let mut monitor = HealthMonitor::spawn(Arc::new(stub.clone()), Duration::from_millis(10));
        let mut rx = monitor.subscribe();

        rx.wait_for(|s| s.is_online()).await.unwrap();
        assert_eq!(
            monitor.current(),
            ConnectionState::Online {
                message: "AMR Prediction API is running".to_string()
            }
        );

        stub.set_healthy(false);
        rx.wait_for(|s| matches!(s, ConnectionState::Offline { .. })).await.unwrap();
        assert_eq!(monitor.current().label(), "offline");

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn stops_polling_after_shutdown() {
        let stub = StubSource::new();
        let mut monitor = HealthMonitor::spawn(Arc::new(stub.clone()), Duration::from_millis(5));
        monitor.subscribe().wait_for(|s| s.is_online()).await.unwrap();

        monitor.shutdown().await;
        assert!(!monitor.is_running());

        let calls = stub.health_calls();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(stub.health_calls(), calls, "no health checks after shutdown");
    }

    #[tokio::test]
    async fn drop_aborts_the_task() {
        let stub = StubSource::new();
        let monitor = HealthMonitor::spawn(Arc::new(stub.clone()), Duration::from_millis(5));
        let mut rx = monitor.subscribe();
        rx.wait_for(|s| s.is_online()).await.unwrap();

        drop(monitor);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let calls = stub.health_calls();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(stub.health_calls(), calls);
    }

    #[tokio::test]
    async fn probe_reports_offline_reason() {
        let stub = StubSource::new();
        stub.set_healthy(false);
        let state = probe(&stub).await;
        assert_eq!(
            state,
            ConnectionState::Offline {
                reason: "network error: connection refused".to_string()
            }
        );
    }
}
