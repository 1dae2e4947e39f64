//! Backend availability polling.

use std::{fmt, sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::{JoinHandle, JoinSet},
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{config::ClientSettings, gateway::SequenceGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Availability {
    #[default]
    Checking,
    Online,
    Offline,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProbeId(u64);

/// Folds probe completions into a signal.
///
/// Probes may overlap. Completions are applied in the order they arrive, so
/// the state always reflects the most recently completed probe.
#[derive(Debug, Default)]
pub struct AvailabilityTracker {
    state: Availability,
    started: u64,
}

impl AvailabilityTracker {
    pub fn state(&self) -> Availability {
        self.state
    }

    pub fn begin_probe(&mut self) -> ProbeId {
        self.started += 1;
        ProbeId(self.started)
    }

    /// Returns the new state when the completion changed it.
    pub fn complete_probe(&mut self, probe: ProbeId, healthy: bool) -> Option<Availability> {
        if probe.0 < self.started {
            debug!(probe = probe.0, latest = self.started, "applying overlapped health probe");
        }

        let next = if healthy {
            Availability::Online
        } else {
            Availability::Offline
        };
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    pub period: Duration,
    pub probe_timeout: Duration,
}

impl From<&ClientSettings> for MonitorOptions {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            period: settings.health_poll_interval,
            probe_timeout: settings.probe_timeout,
        }
    }
}

/// Polls the gateway health probe until dropped.
pub struct AvailabilityMonitor {
    state: watch::Receiver<Availability>,
    task: JoinHandle<()>,
}

impl AvailabilityMonitor {
    /// Probes immediately, then once per `options.period`.
    pub fn spawn(gateway: Arc<dyn SequenceGateway>, options: MonitorOptions) -> Self {
        let (tx, state) = watch::channel(Availability::Checking);
        let task = tokio::spawn(run_monitor(gateway, options, tx));
        Self { state, task }
    }

    pub fn current(&self) -> Availability {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Availability> {
        self.state.clone()
    }
}

impl Drop for AvailabilityMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_monitor(
    gateway: Arc<dyn SequenceGateway>,
    options: MonitorOptions,
    tx: watch::Sender<Availability>,
) {
    let mut ticker = tokio::time::interval(options.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut probes = JoinSet::new();
    let mut tracker = AvailabilityTracker::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let probe = tracker.begin_probe();
                let gateway = Arc::clone(&gateway);
                let probe_timeout = options.probe_timeout;
                probes.spawn(async move {
                    let healthy = match tokio::time::timeout(probe_timeout, gateway.health_check()).await {
                        Ok(Ok(health)) => {
                            debug!(probe = probe.0, status = %health.status, "health probe succeeded");
                            true
                        }
                        Ok(Err(err)) => {
                            debug!(probe = probe.0, error = %err, "health probe failed");
                            false
                        }
                        Err(_) => {
                            debug!(probe = probe.0, "health probe timed out");
                            false
                        }
                    };
                    (probe, healthy)
                });
            }
            Some(joined) = probes.join_next() => match joined {
                Ok((probe, healthy)) => {
                    if let Some(next) = tracker.complete_probe(probe, healthy) {
                        info!(availability = %next, "backend availability changed");
                        tx.send_replace(next);
                    }
                }
                Err(err) => warn!(error = %err, "health probe task failed"),
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/availability_tests.rs"]
mod tests;
