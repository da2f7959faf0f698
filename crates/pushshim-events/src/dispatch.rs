// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dispatch contexts: where a subscriber's callback runs.
//
// A `DispatchQueue` is a named serial queue: a single tokio task draining an
// unbounded channel, so jobs run one at a time in submission order.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace};

use pushshim_core::error::{Result, ShimError};

/// Unit of work submitted to a queue.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

enum QueueMsg {
    Run(Job),
    Flush(oneshot::Sender<()>),
}

/// Named serial queue backed by a tokio task.
#[derive(Clone)]
pub struct DispatchQueue {
    label: Arc<str>,
    tx: mpsc::UnboundedSender<QueueMsg>,
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("label", &self.label)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl DispatchQueue {
    /// Spawn a queue on the ambient tokio runtime.
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| ShimError::NoRuntime)?;
        Ok(Self::with_handle(label, &handle))
    }

    /// Spawn a queue on an explicit runtime.
    pub fn with_handle(label: impl Into<String>, handle: &Handle) -> Self {
        let label: Arc<str> = Arc::from(label.into());
        let (tx, mut rx) = mpsc::unbounded_channel::<QueueMsg>();

        let worker_label = Arc::clone(&label);
        handle.spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    QueueMsg::Run(job) => {
                        if catch_unwind(AssertUnwindSafe(job)).is_err() {
                            error!(queue = %worker_label, "queued job panicked");
                        }
                    }
                    QueueMsg::Flush(done) => {
                        // The flusher may have given up waiting.
                        let _ = done.send(());
                    }
                }
            }
            debug!(queue = %worker_label, "dispatch queue drained and closed");
        });

        debug!(queue = %label, "dispatch queue started");
        Self { label, tx }
    }

    /// Name given at creation, used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Enqueue a job behind everything already submitted.
    pub fn dispatch(&self, job: Job) -> Result<()> {
        trace!(queue = %self.label, "job enqueued");
        self.tx
            .send(QueueMsg::Run(job))
            .map_err(|_| ShimError::QueueClosed(self.label.to_string()))
    }

    /// Resolve once every job submitted before this call has run.
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(QueueMsg::Flush(done_tx))
            .map_err(|_| ShimError::QueueClosed(self.label.to_string()))?;
        done_rx
            .await
            .map_err(|_| ShimError::QueueClosed(self.label.to_string()))
    }
}

/// Where a subscription's callback is invoked.
#[derive(Debug, Clone)]
pub enum DispatchContext {
    /// Synchronously on the publishing thread, before `publish` returns.
    Immediate,
    /// On a serial queue; `publish` only enqueues.
    Queue(DispatchQueue),
}

impl DispatchContext {
    pub fn label(&self) -> &str {
        match self {
            Self::Immediate => "immediate",
            Self::Queue(queue) => queue.label(),
        }
    }
}
