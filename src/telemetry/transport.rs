//! Live log transport
//!
//! Holds one streaming connection to a per-container log endpoint and keeps
//! it alive across drops: any closure (server close, network failure, failed
//! connect) transitions the connection state to `Closed`, fires the caller's
//! disconnect hook exactly once for that closure, and schedules exactly one
//! reconnect attempt after a fixed interval. Closing the handle is terminal.
//!
//! A reconnect starts a fresh event sequence — events received before the
//! drop are not replayed. Consumers that need the full log of a finished step
//! use the static historical log instead. The backend, not this transport, is
//! the source of truth for whether a step actually finished; that is why the
//! disconnect hook exists: owners re-fetch authoritative status on every
//! closure, which switches a finished step out of live mode and stops the
//! retry cycle.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::api::AuthContext;
use crate::telemetry::connector::{LogEndpoint, LogStreamConnector};
use crate::telemetry::event::{parse_log_event, LogEvent};

/// Connection lifecycle of one transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Hook invoked once per transition into `Closed`
pub type DisconnectHook = Arc<dyn Fn() + Send + Sync>;

/// Handle to a live log stream.
///
/// Dropping the handle cancels the underlying task; [`LogTransport::close`]
/// does the same but waits for the teardown to complete.
pub struct LogTransport {
    events: mpsc::UnboundedReceiver<LogEvent>,
    state_rx: watch::Receiver<ConnectionState>,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LogTransport {
    /// Open a transport for one endpoint identity and start streaming.
    ///
    /// The transport retries the same endpoint after `reconnect_interval`
    /// whenever the stream closes, until [`close`](Self::close) is called,
    /// the handle is dropped, or the auth context is logged out.
    pub fn open<C: LogStreamConnector>(
        connector: Arc<C>,
        endpoint: LogEndpoint,
        auth: AuthContext,
        on_disconnected: DisconnectHook,
        reconnect_interval: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let task = tokio::spawn(run_transport(
            connector,
            endpoint,
            auth,
            on_disconnected,
            reconnect_interval,
            events_tx,
            state_tx,
            cancel_rx,
        ));

        Self {
            events: events_rx,
            state_rx,
            cancel_tx,
            task,
        }
    }

    /// Receive the next log event, in arrival order.
    ///
    /// Returns `None` once the transport is terminally closed and all
    /// buffered events have been drained.
    pub async fn next_event(&mut self) -> Option<LogEvent> {
        self.events.recv().await
    }

    /// Drain any already-buffered event without waiting
    pub fn try_next_event(&mut self) -> Option<LogEvent> {
        self.events.try_recv().ok()
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch connection-state transitions
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Tear the transport down and wait until the task has stopped.
    ///
    /// Terminal: no reconnect is attempted afterwards.
    pub async fn close(mut self) {
        let _ = self.cancel_tx.send(true);
        let _ = (&mut self.task).await;
    }
}

impl Drop for LogTransport {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
    }
}

/// Resolve once cancellation has been requested
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    if *cancel_rx.borrow() {
        return;
    }
    while cancel_rx.changed().await.is_ok() {
        if *cancel_rx.borrow() {
            return;
        }
    }
    // Sender dropped: the handle is gone, stop streaming
}

#[allow(clippy::too_many_arguments)]
async fn run_transport<C: LogStreamConnector>(
    connector: Arc<C>,
    endpoint: LogEndpoint,
    auth: AuthContext,
    on_disconnected: DisconnectHook,
    reconnect_interval: Duration,
    events_tx: mpsc::UnboundedSender<LogEvent>,
    state_tx: watch::Sender<ConnectionState>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    loop {
        let _ = state_tx.send(ConnectionState::Connecting);
        let mut torn_down = false;

        let connect_result = tokio::select! {
            _ = cancelled(&mut cancel_rx) => None,
            _ = auth.logged_out() => None,
            result = connector.connect(&endpoint) => Some(result),
        };

        match connect_result {
            Some(Ok(mut frames)) => {
                let _ = state_tx.send(ConnectionState::Open);
                tracing::info!(
                    submission_id = %endpoint.submission_id,
                    container_id = %endpoint.container_id,
                    "log stream open"
                );

                loop {
                    tokio::select! {
                        _ = cancelled(&mut cancel_rx) => {
                            torn_down = true;
                            let _ = state_tx.send(ConnectionState::Closing);
                            break;
                        }
                        _ = auth.logged_out() => {
                            torn_down = true;
                            let _ = state_tx.send(ConnectionState::Closing);
                            break;
                        }
                        frame = frames.next() => match frame {
                            Some(Ok(text)) => match parse_log_event(&text) {
                                Ok(event) => {
                                    if events_tx.send(event).is_err() {
                                        // Consumer gone; nothing left to stream to
                                        torn_down = true;
                                        let _ = state_tx.send(ConnectionState::Closing);
                                        break;
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "dropping malformed log frame");
                                }
                            },
                            Some(Err(e)) => {
                                tracing::warn!(error = %e, "log stream failed");
                                break;
                            }
                            None => {
                                tracing::debug!(
                                    container_id = %endpoint.container_id,
                                    "log stream ended"
                                );
                                break;
                            }
                        },
                    }
                }
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "log stream connect failed");
            }
            None => {
                torn_down = true;
                let _ = state_tx.send(ConnectionState::Closing);
            }
        }

        // One closure event per loop pass: transition to Closed and fire the
        // hook exactly once, whether the drop was voluntary or not.
        let _ = state_tx.send(ConnectionState::Closed);
        on_disconnected();

        if torn_down || *cancel_rx.borrow() {
            break;
        }

        // Fixed-interval retry; a teardown arriving during the wait wins and
        // no further reconnect is attempted.
        tokio::select! {
            _ = cancelled(&mut cancel_rx) => break,
            _ = auth.logged_out() => break,
            _ = tokio::time::sleep(reconnect_interval) => {}
        }
    }
}
