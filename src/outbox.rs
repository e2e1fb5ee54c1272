use std::fmt::Display;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::engine::Operation;

/// Producer side of the advisory message stream.
///
/// Each event operation gets a clone; the consumer (a notifier) drains the
/// receiver. Messages from one producer keep their order.
#[derive(Clone, Debug)]
pub struct Outbox {
    tx: UnboundedSender<String>,
}

impl Outbox {
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, msg: impl Into<String>) {
        if let Err(e) = self.tx.send(msg.into()) {
            tracing::error!(msg = %e.0, "message stream closed, dropping message");
        }
    }

    /// Error messages always carry the originating operation in brackets.
    pub fn error(&self, op: Operation, err: impl Display) {
        let msg = format!("[{op}] {err}");
        tracing::warn!(%op, error = %err, "event operation failed");
        self.send(msg);
    }
}
