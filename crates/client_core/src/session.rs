//! Session runtime: one task owns the state, the debounce timer, the
//! availability monitor and every in-flight request.

use std::{collections::HashMap, sync::Arc};

use anyhow::anyhow;
use shared::{
    domain::ToolId,
    protocol::{SequenceInput, SequenceStats, TransformResult},
};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::{self, JoinError, JoinHandle, JoinSet},
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::{
    availability::{Availability, AvailabilityMonitor, MonitorOptions},
    config::ClientSettings,
    gateway::{GatewayError, SequenceGateway, FALLBACK_ERROR_MESSAGE},
    generation::Generation,
    invocation::{InvocationPhase, InvocationRejected, InvocationTicket, SessionState},
    stats_pipeline::{StatsAction, StatsAutoFetch},
    tools::ToolDescriptor,
};

const COMMAND_QUEUE_DEPTH: usize = 64;

pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> anyhow::Result<()>;
}

pub struct MissingClipboard;

impl ClipboardSink for MissingClipboard {
    fn set_text(&self, _text: &str) -> anyhow::Result<()> {
        Err(anyhow!("clipboard is unavailable"))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub sequence: String,
    pub result: String,
    pub stats: Option<SequenceStats>,
    pub error: String,
    /// Count of errors surfaced so far; distinguishes a repeated identical error.
    pub failures: u64,
    pub loading: bool,
    pub phase: InvocationPhase,
    pub availability: Availability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SetSequence(String),
    InvokeTool(ToolId),
    ClearAll,
    CopyResult,
    Shutdown,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has shut down")]
    Closed,
}

/// Front-end side of a running session. Dropping it tears the session down.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    pub async fn set_sequence(&self, sequence: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::SetSequence(sequence.into())).await
    }

    pub async fn invoke_tool(&self, tool: ToolId) -> Result<(), SessionError> {
        self.send(SessionCommand::InvokeTool(tool)).await
    }

    pub async fn clear_all(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ClearAll).await
    }

    pub async fn copy_result(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::CopyResult).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn availability(&self) -> Availability {
        self.snapshots.borrow().availability
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the session after the commands already queued are handled.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(SessionCommand::Shutdown).await;
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    error!(error = %err, "session task failed");
                }
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct Session;

impl Session {
    pub fn spawn(
        gateway: Arc<dyn SequenceGateway>,
        clipboard: Arc<dyn ClipboardSink>,
        settings: &ClientSettings,
    ) -> SessionHandle {
        let monitor = AvailabilityMonitor::spawn(Arc::clone(&gateway), MonitorOptions::from(settings));
        let availability = monitor.subscribe();
        let (snapshot_tx, snapshots) = watch::channel(SessionSnapshot::default());
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);

        let worker = SessionWorker {
            gateway,
            clipboard,
            state: SessionState::default(),
            stats: StatsAutoFetch::new(settings.stats_debounce),
            _monitor: monitor,
            availability,
            snapshots: snapshot_tx,
            inflight: JoinSet::new(),
            tool_tasks: HashMap::new(),
        };
        let task = tokio::spawn(worker.run(command_rx));

        SessionHandle {
            commands,
            snapshots,
            task: Some(task),
        }
    }
}

enum Completion {
    Stats {
        generation: Generation,
        outcome: Result<SequenceStats, GatewayError>,
    },
    Tool {
        ticket: InvocationTicket,
        outcome: Result<TransformResult, GatewayError>,
    },
}

struct SessionWorker {
    gateway: Arc<dyn SequenceGateway>,
    clipboard: Arc<dyn ClipboardSink>,
    state: SessionState,
    stats: StatsAutoFetch,
    _monitor: AvailabilityMonitor,
    availability: watch::Receiver<Availability>,
    snapshots: watch::Sender<SessionSnapshot>,
    inflight: JoinSet<Completion>,
    /// Tickets of in-flight tool tasks, so a panicked task still ends its invocation.
    tool_tasks: HashMap<task::Id, InvocationTicket>,
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl SessionWorker {
    async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        info!("session started");
        let mut watching_availability = true;

        loop {
            let deadline = self.stats.deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                changed = self.availability.changed(), if watching_availability => {
                    if changed.is_ok() {
                        self.availability.borrow_and_update();
                        self.stats.observe_change(Instant::now());
                    } else {
                        warn!("availability monitor stopped; statistics stay paused");
                        watching_availability = false;
                    }
                }
                _ = sleep_until_deadline(deadline) => self.settle_stats(),
                Some(joined) = self.inflight.join_next_with_id() => self.handle_completion(joined),
            }
            self.publish();
        }

        self.stats.cancel();
        self.inflight.abort_all();
        self.tool_tasks.clear();
        info!("session closed");
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SetSequence(sequence) => {
                if self.state.set_sequence(sequence) {
                    self.stats.observe_change(Instant::now());
                }
            }
            SessionCommand::InvokeTool(tool) => self.invoke_tool(tool),
            SessionCommand::ClearAll => {
                let had_sequence = !self.state.sequence().is_empty();
                self.state.clear_all();
                self.stats.invalidate();
                if had_sequence {
                    self.stats.observe_change(Instant::now());
                }
                debug!("session cleared");
            }
            SessionCommand::CopyResult => self.copy_result(),
            SessionCommand::Shutdown => {}
        }
    }

    fn invoke_tool(&mut self, tool: ToolId) {
        let ticket = match self.state.begin_invocation(tool) {
            Ok(ticket) => ticket,
            Err(InvocationRejected::Busy) => {
                debug!(tool = %tool, "ignoring tool trigger while another invocation is loading");
                return;
            }
            Err(InvocationRejected::EmptySequence) => {
                debug!(tool = %tool, "tool invoked without a sequence");
                return;
            }
        };

        info!(tool = %tool, token = ticket.token.value(), "invoking tool");
        let gateway = Arc::clone(&self.gateway);
        let sequence = self.state.sequence().to_string();
        let handle = self.inflight.spawn(async move {
            let outcome = ToolDescriptor::for_id(ticket.tool)
                .invoke(gateway.as_ref(), &sequence)
                .await;
            Completion::Tool { ticket, outcome }
        });
        self.tool_tasks.insert(handle.id(), ticket);
    }

    fn copy_result(&self) {
        let result = self.state.result();
        if result.is_empty() {
            return;
        }
        match self.clipboard.set_text(result) {
            Ok(()) => debug!(chars = result.len(), "copied result to clipboard"),
            Err(err) => warn!(error = %err, "failed to copy result to clipboard"),
        }
    }

    fn settle_stats(&mut self) {
        let availability = *self.availability.borrow();
        match self
            .stats
            .fire(Instant::now(), self.state.sequence(), availability)
        {
            None => {}
            Some(StatsAction::Clear) => self.state.clear_stats(),
            Some(StatsAction::Fetch {
                generation,
                sequence,
            }) => {
                debug!(generation = generation.value(), "requesting sequence statistics");
                let gateway = Arc::clone(&self.gateway);
                self.inflight.spawn(async move {
                    let outcome = gateway.get_stats(&SequenceInput::new(sequence)).await;
                    Completion::Stats {
                        generation,
                        outcome,
                    }
                });
            }
        }
    }

    fn handle_completion(&mut self, joined: Result<(task::Id, Completion), JoinError>) {
        let completion = match joined {
            Ok((id, completion)) => {
                self.tool_tasks.remove(&id);
                completion
            }
            Err(err) => {
                let ticket = self.tool_tasks.remove(&err.id());
                if err.is_cancelled() {
                    return;
                }
                error!(error = %err, "session request task failed");
                if let Some(ticket) = ticket {
                    self.state.complete_invocation(
                        ticket,
                        Err(GatewayError::Transport(FALLBACK_ERROR_MESSAGE.to_string())),
                    );
                }
                return;
            }
        };

        match completion {
            Completion::Stats {
                generation,
                outcome,
            } => {
                if !self.stats.accepts(generation) {
                    debug!(generation = generation.value(), "discarding stale statistics response");
                    return;
                }
                match outcome {
                    Ok(stats) => self.state.apply_stats(stats),
                    Err(err) => warn!(error = %err, "failed to fetch sequence statistics"),
                }
            }
            Completion::Tool { ticket, outcome } => {
                if let Err(err) = &outcome {
                    info!(tool = %ticket.tool, error = %err, "tool invocation failed");
                }
                self.state.complete_invocation(ticket, outcome);
            }
        }
    }

    fn publish(&self) {
        let next = SessionSnapshot {
            sequence: self.state.sequence().to_string(),
            result: self.state.result().to_string(),
            stats: self.state.stats().cloned(),
            error: self.state.error().to_string(),
            failures: self.state.failures(),
            loading: self.state.loading(),
            phase: self.state.phase(),
            availability: *self.availability.borrow(),
        };
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
