//! Asynchronous message boundary for the capacity calculator.
//!
//! The calculator is the heaviest computation in the core, so it runs behind
//! a strict request/response protocol on a dedicated task. The handler is a
//! stateless free function; nothing persists in the worker between requests,
//! and a failure inside the worker is reported as a structured `error`
//! response rather than surfacing as a crash.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use super::calculator::{
    calculate_capacity, CalculatorInput, CapacityError, ResourceCapacityResult,
};

/// Request message, wire shape `{"type": "calculate", "payload": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum CalculatorRequest {
    Calculate(CalculatorInput),
}

/// Response message: `{"type": "result", ...}` or `{"type": "error", ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum CalculatorResponse {
    Result(Vec<ResourceCapacityResult>),
    Error(String),
}

type Job = (CalculatorRequest, oneshot::Sender<CalculatorResponse>);

/// Handle to a running capacity worker.
///
/// The protocol is strictly one response per request, with no streaming,
/// no cancellation, and no correlation id; callers that need concurrent
/// in-flight calculations should hold one handle per logical stream.
#[derive(Clone)]
pub struct CapacityWorker {
    tx: mpsc::Sender<Job>,
}

impl CapacityWorker {
    /// Spawn a worker task on the current tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(run_worker(rx));
        Self { tx }
    }

    /// Send a raw protocol request and await its single response.
    pub async fn submit(
        &self,
        request: CalculatorRequest,
    ) -> Result<CalculatorResponse, CapacityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| CapacityError::WorkerClosed)?;
        reply_rx.await.map_err(|_| CapacityError::WorkerClosed)
    }

    /// Convenience wrapper around [`submit`](Self::submit) that unwraps the
    /// protocol envelope.
    pub async fn calculate(
        &self,
        input: CalculatorInput,
    ) -> Result<Vec<ResourceCapacityResult>, CapacityError> {
        match self.submit(CalculatorRequest::Calculate(input)).await? {
            CalculatorResponse::Result(results) => Ok(results),
            CalculatorResponse::Error(message) => Err(CapacityError::Boundary(message)),
        }
    }
}

async fn run_worker(mut rx: mpsc::Receiver<Job>) {
    debug!("capacity worker started");
    while let Some((request, reply)) = rx.recv().await {
        let response = handle_request(request);
        // A dropped receiver just means the caller gave up waiting.
        let _ = reply.send(response);
    }
    debug!("capacity worker stopped");
}

/// Stateless request handler. Validation failures and panics both come back
/// as the protocol's `error` response; the host never observes worker
/// termination.
pub fn handle_request(request: CalculatorRequest) -> CalculatorResponse {
    let outcome = catch_unwind(AssertUnwindSafe(|| match request {
        CalculatorRequest::Calculate(input) => calculate_capacity(&input),
    }));
    match outcome {
        Ok(Ok(results)) => CalculatorResponse::Result(results),
        Ok(Err(err)) => CalculatorResponse::Error(err.to_string()),
        Err(_) => {
            error!("capacity calculation panicked");
            CalculatorResponse::Error("capacity calculation panicked".to_string())
        }
    }
}
