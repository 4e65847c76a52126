use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::Duration,
};

use crate::{
    core::state::{CollectionState, FetchTicket, Ignored, LoadError, LoadOutcome},
    fetch::{FetchResult, PageFetcher, TransportError},
    item::Page,
    query::QueryDescriptor,
    types::{Generation, Offset},
};

use super::events::{LoaderEvent, LoaderSnapshot};

/// Failures talking to the loader task.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The task has stopped; no further commands are accepted.
    #[error("loader task is no longer running")]
    ChannelClosed,
}

/// Tuning for [`spawn_loader`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Per-page budget; a slower fetch completes as [`TransportError::Timeout`].
    pub fetch_timeout_ms: u64,
    /// Bound of the command channel.
    pub command_queue_bound: usize,
    /// Broadcast buffer; slow subscribers see `Lagged`.
    pub event_capacity: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            command_queue_bound: 64,
            event_capacity: 256,
        }
    }
}

/// Result of [`LoaderHandle::set_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    /// The new query equals the current one; nothing was reset.
    Unchanged,
    /// State was cleared and the first page of the new query requested.
    Reset {
        /// Generation of the new query.
        generation: Generation,
    },
}

/// Result of [`LoaderHandle::near_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A fetch was started.
    Issued {
        /// Offset being requested.
        offset: Offset,
    },
    /// The signal was dropped.
    Ignored(Ignored),
}

/// Cloneable handle to the loader task.
pub struct LoaderHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LoaderEvent>,
}

impl Clone for LoaderHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    SetQuery {
        query: QueryDescriptor,
        resp: oneshot::Sender<QueryChange>,
    },
    NearEnd {
        resp: oneshot::Sender<TriggerOutcome>,
    },
    Snapshot {
        resp: oneshot::Sender<LoaderSnapshot>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

struct Completed {
    ticket: FetchTicket,
    result: FetchResult<Page>,
}

/// Spawns the task that exclusively owns `state`.
pub fn spawn_loader(
    state: CollectionState,
    fetcher: Arc<dyn PageFetcher>,
    config: LoaderConfig,
) -> LoaderHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<LoaderEvent>(config.event_capacity);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed>();

    let events_tx_loop = events_tx.clone();
    let timeout = Duration::from_millis(config.fetch_timeout_ms);

    tokio::spawn(async move {
        let mut state = state;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    let done = handle_command(
                        cmd,
                        &mut state,
                        &events_tx_loop,
                        &fetcher,
                        &done_tx,
                        timeout,
                    );
                    if done {
                        break;
                    }
                }
                completed = done_rx.recv() => {
                    if let Some(completed) = completed {
                        handle_completion(completed, &mut state, &events_tx_loop);
                    }
                }
            }
        }
        tracing::debug!("loader task stopped");
    });

    LoaderHandle { cmd_tx, events_tx }
}

impl LoaderHandle {
    /// Subscribes to state changes and load failures.
    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events_tx.subscribe()
    }

    /// Replaces the active query. Any fetch still in flight for the old
    /// query is discarded when it resolves.
    pub async fn set_query(&self, query: QueryDescriptor) -> Result<QueryChange, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetQuery { query, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Proximity signal: the viewport is near the end of the rendered list.
    pub async fn near_end(&self) -> Result<TriggerOutcome, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::NearEnd { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Current state as seen by the task.
    pub async fn snapshot(&self) -> Result<LoaderSnapshot, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Snapshot { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Stops the task once queued commands ahead of this one are handled.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    state: &mut CollectionState,
    events_tx: &broadcast::Sender<LoaderEvent>,
    fetcher: &Arc<dyn PageFetcher>,
    done_tx: &mpsc::UnboundedSender<Completed>,
    timeout: Duration,
) -> bool {
    match cmd {
        Command::SetQuery { query, resp } => {
            let change = match state.replace_query(query) {
                Some(ticket) => {
                    tracing::debug!(
                        generation = ticket.generation,
                        term = ?ticket.query.term(),
                        category = ?ticket.query.category(),
                        sort = ticket.query.sort().token(),
                        "query replaced"
                    );
                    let generation = ticket.generation;
                    spawn_fetch(ticket, Arc::clone(fetcher), done_tx.clone(), timeout);
                    let _ = events_tx.send(LoaderEvent::StateChanged(LoaderSnapshot::capture(state)));
                    QueryChange::Reset { generation }
                }
                None => QueryChange::Unchanged,
            };
            let _ = resp.send(change);
        }
        Command::NearEnd { resp } => {
            let outcome = match state.request_next() {
                Ok(ticket) => {
                    let offset = ticket.offset;
                    tracing::debug!(offset, generation = ticket.generation, "fetching next page");
                    spawn_fetch(ticket, Arc::clone(fetcher), done_tx.clone(), timeout);
                    let _ = events_tx.send(LoaderEvent::StateChanged(LoaderSnapshot::capture(state)));
                    TriggerOutcome::Issued { offset }
                }
                Err(reason) => TriggerOutcome::Ignored(reason),
            };
            let _ = resp.send(outcome);
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(LoaderSnapshot::capture(state));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn handle_completion(
    completed: Completed,
    state: &mut CollectionState,
    events_tx: &broadcast::Sender<LoaderEvent>,
) {
    let Completed { ticket, result } = completed;
    match state.complete(&ticket, result) {
        Ok(LoadOutcome::Appended { received, next_offset }) => {
            tracing::debug!(received, next_offset, loaded = state.items().len(), "page appended");
            let _ = events_tx.send(LoaderEvent::StateChanged(LoaderSnapshot::capture(state)));
        }
        Ok(LoadOutcome::Exhausted { received }) => {
            tracing::info!(received, loaded = state.items().len(), "catalog exhausted for query");
            let _ = events_tx.send(LoaderEvent::StateChanged(LoaderSnapshot::capture(state)));
        }
        Err(LoadError::Transport(err)) => {
            tracing::warn!(offset = ticket.offset, error = %err, "failed to load more");
            let _ = events_tx.send(LoaderEvent::StateChanged(LoaderSnapshot::capture(state)));
            let _ = events_tx.send(LoaderEvent::LoadFailed {
                offset: ticket.offset,
                message: err.to_string(),
            });
        }
        Err(LoadError::StaleResult { issued, current }) => {
            tracing::trace!(issued, current, offset = ticket.offset, "dropping stale page");
        }
    }
}

fn spawn_fetch(
    ticket: FetchTicket,
    fetcher: Arc<dyn PageFetcher>,
    done_tx: mpsc::UnboundedSender<Completed>,
    timeout: Duration,
) {
    tokio::spawn(async move {
        let result = match tokio::time::timeout(timeout, fetcher.fetch_page(&ticket.query, ticket.offset)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        let _ = done_tx.send(Completed { ticket, result });
    });
}
